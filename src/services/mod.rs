//! Remote collaborators used by the online pipeline.
//!
//! - [`huggingface`]: summarization and zero-shot classification via the Inference API.
//! - [`libretranslate`]: sentence translation via a LibreTranslate-compatible endpoint.
//!
//! Every call is bounded by a timeout and reports failures as [`ServiceError`]; the
//! caller decides the fallback. Nothing here retries.

use std::future::Future;
use std::time::Duration;

use async_trait::async_trait;

use crate::text::sentences::SentenceSplitter;

pub mod huggingface;
pub mod libretranslate;

/// Errors raised by a remote collaborator.
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("service returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("request timed out after {0:?}")]
    Timeout(Duration),

    #[error("malformed response: {0}")]
    Malformed(String),

    #[error("service unavailable: {0}")]
    Unavailable(String),
}

/// Error for a non-success HTTP status; 503 means the model or server is not ready.
pub(crate) fn status_error(status: u16, body: String) -> ServiceError {
    if status == 503 {
        ServiceError::Unavailable(body)
    } else {
        ServiceError::Status { status, body }
    }
}

#[async_trait]
pub trait Summarizer: Send + Sync {
    /// Abstractive summary of `text`, bounded to `min_len..=max_len` model tokens.
    async fn summarize(&self, text: &str, max_len: usize, min_len: usize) -> Result<String, ServiceError>;
}

#[async_trait]
pub trait ZeroShotClassifier: Send + Sync {
    /// Score `text` against every label independently.
    async fn classify(&self, text: &str, labels: &[&str]) -> Result<Vec<(String, f64)>, ServiceError>;
}

#[async_trait]
pub trait Translator: Send + Sync {
    async fn translate(&self, sentence: &str, target: &str) -> Result<String, ServiceError>;
}

/// Run `fut`, failing with [`ServiceError::Timeout`] once `limit` elapses.
pub async fn with_timeout<T, F>(limit: Duration, fut: F) -> Result<T, ServiceError>
where
    F: Future<Output = Result<T, ServiceError>>,
{
    match tokio::time::timeout(limit, fut).await {
        Ok(result) => result,
        Err(_) => Err(ServiceError::Timeout(limit)),
    }
}

/// Text translated sentence by sentence.
#[derive(Debug, Clone, PartialEq)]
pub struct Translated {
    pub text: String,
    /// Sentences that kept their original wording.
    pub fallbacks: usize,
}

/// Translate `text` one sentence at a time; failed sentences keep the original.
pub async fn translate_sentences(
    translator: &dyn Translator,
    splitter: &dyn SentenceSplitter,
    text: &str,
    target: &str,
) -> Translated {
    let mut out = Vec::new();
    let mut fallbacks = 0;

    for sentence in splitter.split(text) {
        match translator.translate(sentence, target).await {
            Ok(translated) if !translated.trim().is_empty() => out.push(translated),
            Ok(_) => {
                fallbacks += 1;
                out.push(sentence.to_string());
            }
            Err(e) => {
                tracing::warn!("translation to '{}' failed, keeping original sentence: {}", target, e);
                fallbacks += 1;
                out.push(sentence.to_string());
            }
        }
    }

    Translated {
        text: out.join(" "),
        fallbacks,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::text::sentences::PunctuationSplitter;

    /// Uppercases sentences, failing on any that mention "fail".
    struct Shouting;

    #[async_trait]
    impl Translator for Shouting {
        async fn translate(&self, sentence: &str, _target: &str) -> Result<String, ServiceError> {
            if sentence.contains("fail") {
                Err(ServiceError::Unavailable("down".into()))
            } else {
                Ok(sentence.to_uppercase())
            }
        }
    }

    #[tokio::test]
    async fn test_translate_all_sentences() {
        let t = translate_sentences(&Shouting, &PunctuationSplitter, "One. Two.", "de").await;
        assert_eq!(t.text, "ONE. TWO.");
        assert_eq!(t.fallbacks, 0);
    }

    #[tokio::test]
    async fn test_translate_falls_back_per_sentence() {
        let t = translate_sentences(&Shouting, &PunctuationSplitter, "One. This will fail. Three.", "de").await;
        assert_eq!(t.text, "ONE. This will fail. THREE.");
        assert_eq!(t.fallbacks, 1);
    }

    #[test]
    fn test_status_error_maps_503_to_unavailable() {
        let err = status_error(503, "model is loading".into());
        assert!(matches!(&err, ServiceError::Unavailable(body) if body == "model is loading"));
        assert_eq!(err.to_string(), "service unavailable: model is loading");

        let err = status_error(401, "bad token".into());
        assert!(matches!(err, ServiceError::Status { status: 401, .. }));
    }

    #[tokio::test]
    async fn test_with_timeout_elapses() {
        let slow = async {
            tokio::time::sleep(Duration::from_millis(200)).await;
            Ok::<_, ServiceError>(())
        };
        let err = with_timeout(Duration::from_millis(10), slow).await.unwrap_err();
        assert!(matches!(err, ServiceError::Timeout(_)));

        let fast = with_timeout(Duration::from_secs(1), async { Ok::<_, ServiceError>(7) }).await;
        assert_eq!(fast.unwrap(), 7);
    }
}
