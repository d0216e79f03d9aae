use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde_json::{json, Value};

use super::{status_error, with_timeout, ServiceError, Translator};

/// Translator backed by a LibreTranslate-compatible `/translate` endpoint.
pub struct LibreTranslate {
    client: Client,
    url: String,
    api_key: Option<String>,
    timeout: Duration,
}

impl LibreTranslate {
    pub fn new(client: Client, url: impl Into<String>, api_key: Option<String>, timeout: Duration) -> Self {
        Self {
            client,
            url: url.into(),
            api_key,
            timeout,
        }
    }
}

#[async_trait]
impl Translator for LibreTranslate {
    async fn translate(&self, sentence: &str, target: &str) -> Result<String, ServiceError> {
        let mut body = json!({
            "q": sentence,
            "source": "auto",
            "target": target,
            "format": "text",
        });
        if let Some(key) = &self.api_key {
            body["api_key"] = json!(key);
        }

        with_timeout(self.timeout, async {
            let response = self.client.post(&self.url).json(&body).send().await?;
            let status = response.status().as_u16();
            if !response.status().is_success() {
                let body = response.text().await.unwrap_or_default();
                return Err(status_error(status, body));
            }

            let data: Value = response.json().await?;
            data.get("translatedText")
                .and_then(Value::as_str)
                .map(str::to_string)
                .ok_or_else(|| ServiceError::Malformed("missing translatedText".into()))
        })
        .await
    }
}
