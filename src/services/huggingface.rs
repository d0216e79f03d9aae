use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde_json::{json, Value};
use tracing::debug;

use super::{status_error, with_timeout, ServiceError, Summarizer, ZeroShotClassifier};

/// Shared connection to a Hugging Face Inference API endpoint.
#[derive(Clone)]
pub struct InferenceApi {
    client: Client,
    endpoint: String,
    token: Option<String>,
    timeout: Duration,
}

impl InferenceApi {
    pub fn new(client: Client, endpoint: impl Into<String>, token: Option<String>, timeout: Duration) -> Self {
        Self {
            client,
            endpoint: endpoint.into().trim_end_matches('/').to_string(),
            token,
            timeout,
        }
    }

    async fn post(&self, model: &str, body: Value) -> Result<Value, ServiceError> {
        let url = format!("{}/{}", self.endpoint, model);
        debug!("inference request to {}", url);

        with_timeout(self.timeout, async {
            let mut request = self
                .client
                .post(&url)
                .header("User-Agent", concat!("terms-checkr/", env!("CARGO_PKG_VERSION")))
                .json(&body);
            if let Some(token) = &self.token {
                request = request.bearer_auth(token);
            }

            let response = request.send().await?;
            let status = response.status().as_u16();
            if !response.status().is_success() {
                let body = response.text().await.unwrap_or_default();
                return Err(status_error(status, body));
            }

            Ok(response.json::<Value>().await?)
        })
        .await
    }
}

pub struct HfSummarizer {
    api: InferenceApi,
    model: String,
}

impl HfSummarizer {
    pub fn new(api: InferenceApi, model: impl Into<String>) -> Self {
        Self {
            api,
            model: model.into(),
        }
    }
}

#[async_trait]
impl Summarizer for HfSummarizer {
    async fn summarize(&self, text: &str, max_len: usize, min_len: usize) -> Result<String, ServiceError> {
        let body = json!({
            "inputs": text,
            "parameters": {
                "max_length": max_len,
                "min_length": min_len,
                "do_sample": false,
                "truncation": true,
            },
        });
        let data = self.api.post(&self.model, body).await?;
        parse_summary(&data)
    }
}

/// `[{"summary_text": "..."}]`
fn parse_summary(data: &Value) -> Result<String, ServiceError> {
    data.get(0)
        .and_then(|item| item.get("summary_text"))
        .and_then(Value::as_str)
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .ok_or_else(|| ServiceError::Malformed("missing [0].summary_text".into()))
}

pub struct HfClassifier {
    api: InferenceApi,
    model: String,
}

impl HfClassifier {
    pub fn new(api: InferenceApi, model: impl Into<String>) -> Self {
        Self {
            api,
            model: model.into(),
        }
    }
}

#[async_trait]
impl ZeroShotClassifier for HfClassifier {
    async fn classify(&self, text: &str, labels: &[&str]) -> Result<Vec<(String, f64)>, ServiceError> {
        let body = json!({
            "inputs": text,
            "parameters": {
                "candidate_labels": labels,
                "multi_label": true,
            },
        });
        let data = self.api.post(&self.model, body).await?;
        parse_zero_shot(&data)
    }
}

/// Accepts both `{"labels": [..], "scores": [..]}` and `[{"label", "score"}, ..]`.
fn parse_zero_shot(data: &Value) -> Result<Vec<(String, f64)>, ServiceError> {
    if let Some(items) = data.as_array() {
        return items
            .iter()
            .map(|item| {
                let label = item.get("label").and_then(Value::as_str);
                let score = item.get("score").and_then(Value::as_f64);
                match (label, score) {
                    (Some(l), Some(s)) => Ok((l.to_string(), s)),
                    _ => Err(ServiceError::Malformed("expected {label, score} entries".into())),
                }
            })
            .collect();
    }

    let labels = data.get("labels").and_then(Value::as_array);
    let scores = data.get("scores").and_then(Value::as_array);
    let (Some(labels), Some(scores)) = (labels, scores) else {
        return Err(ServiceError::Malformed("missing labels/scores".into()));
    };
    if labels.len() != scores.len() {
        return Err(ServiceError::Malformed(format!(
            "{} labels but {} scores",
            labels.len(),
            scores.len()
        )));
    }

    labels
        .iter()
        .zip(scores)
        .map(|(l, s)| match (l.as_str(), s.as_f64()) {
            (Some(l), Some(s)) => Ok((l.to_string(), s)),
            _ => Err(ServiceError::Malformed("non-string label or non-numeric score".into())),
        })
        .collect()
}
