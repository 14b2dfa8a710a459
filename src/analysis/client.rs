//! Transport to the generative-text endpoint.
//!
//! [`TextGenerator`] is the seam between the pipeline and the network:
//! production uses [`GeminiClient`] (reqwest, per-attempt timeout), tests
//! inject mocks. [`generate_with_retry`] wraps any generator with the
//! exponential-backoff retry policy for transient overload.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, warn};

use crate::config::GeminiConfig;

/// Backoff delay cap, milliseconds.
const MAX_BACKOFF_MS: u64 = 10_000;

/// Error taxonomy for a single generation attempt.
#[derive(Debug, Error)]
pub enum GenerateError {
    /// Transient endpoint overload ("overloaded" / "try again") — retryable.
    #[error("endpoint overloaded: {0}")]
    Overloaded(String),
    /// Endpoint rejected the request; not retryable.
    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },
    /// Connection-level failure (includes per-attempt timeouts) — retryable.
    #[error("network error: {0}")]
    Network(String),
}

impl GenerateError {
    /// Whether the retry loop may reissue the request after this failure.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Overloaded(_) | Self::Network(_))
    }
}

/// Trait for producing model output from a prompt.
///
/// One call corresponds to one request attempt; retrying is the caller's
/// concern (see [`generate_with_retry`]).
#[async_trait]
pub trait TextGenerator: Send + Sync {
    async fn generate(&self, prompt: &str) -> Result<String, GenerateError>;
}

#[derive(Serialize)]
struct GenerateRequest {
    contents: Vec<Content>,
}

#[derive(Serialize, Deserialize)]
struct Content {
    parts: Vec<Part>,
}

#[derive(Serialize, Deserialize)]
struct Part {
    text: String,
}

#[derive(Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    content: Content,
}

#[derive(Deserialize)]
struct ApiErrorBody {
    error: ApiErrorDetail,
}

#[derive(Deserialize)]
struct ApiErrorDetail {
    #[serde(default)]
    message: String,
}

/// Whether an endpoint error message signals transient overload.
fn is_overload_message(message: &str) -> bool {
    message.contains("overloaded") || message.contains("try again")
}

/// HTTP client for a Gemini-style `generateContent` endpoint.
pub struct GeminiClient {
    client: Client,
    config: GeminiConfig,
}

impl GeminiClient {
    /// Build a client with the configured per-attempt timeout.
    pub fn new(config: &GeminiConfig) -> Result<Self, GenerateError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| GenerateError::Network(format!("failed to create HTTP client: {e}")))?;
        Ok(Self {
            client,
            config: config.clone(),
        })
    }
}

#[async_trait]
impl TextGenerator for GeminiClient {
    async fn generate(&self, prompt: &str) -> Result<String, GenerateError> {
        let url = format!(
            "{}/models/{}:generateContent",
            self.config.api_url, self.config.model
        );
        let request = GenerateRequest {
            contents: vec![Content {
                parts: vec![Part {
                    text: prompt.to_string(),
                }],
            }],
        };

        debug!(model = %self.config.model, "sending generation request");

        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", &self.config.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| GenerateError::Network(format!("failed to send request: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ApiErrorBody>(&error_text)
                .map(|body| body.error.message)
                .unwrap_or(error_text);

            if is_overload_message(&message) {
                return Err(GenerateError::Overloaded(message));
            }
            return Err(GenerateError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let completion: GenerateResponse = response.json().await.map_err(|e| {
            GenerateError::Api {
                status: status.as_u16(),
                message: format!("failed to parse response: {e}"),
            }
        })?;

        // Missing candidates yield empty text; the response normalizer turns
        // that into the fallback result downstream.
        let text = completion
            .candidates
            .into_iter()
            .next()
            .and_then(|c| c.content.parts.into_iter().next())
            .map(|p| p.text)
            .unwrap_or_default();

        Ok(text)
    }
}

/// Retry parameters for [`generate_with_retry`].
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Retries after the first attempt.
    pub max_retries: u32,
    /// Base delay in milliseconds; doubled each retry, capped at 10 s.
    pub backoff_base_ms: u64,
}

impl From<&GeminiConfig> for RetryPolicy {
    fn from(config: &GeminiConfig) -> Self {
        Self {
            max_retries: config.max_retries,
            backoff_base_ms: config.backoff_base_ms,
        }
    }
}

/// Delay before retry number `attempt` (0-based): `min(base × 2^attempt, 10 s)`.
pub fn backoff_delay(attempt: u32, base_ms: u64) -> Duration {
    let millis = base_ms.saturating_mul(1u64 << attempt.min(20));
    Duration::from_millis(millis.min(MAX_BACKOFF_MS))
}

/// Issue the request, retrying sequentially on retryable failures with
/// exponential backoff. Non-retryable failures abort on first occurrence.
pub async fn generate_with_retry(
    generator: &dyn TextGenerator,
    prompt: &str,
    policy: &RetryPolicy,
) -> Result<String, GenerateError> {
    let mut attempt = 0u32;
    loop {
        match generator.generate(prompt).await {
            Ok(text) => return Ok(text),
            Err(err) if err.is_retryable() && attempt < policy.max_retries => {
                let delay = backoff_delay(attempt, policy.backoff_base_ms);
                warn!(
                    attempt = attempt + 1,
                    delay_ms = delay.as_millis() as u64,
                    error = %err,
                    "generation attempt failed, retrying"
                );
                tokio::time::sleep(delay).await;
                attempt += 1;
            }
            Err(err) => return Err(err),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    /// Generator that fails a fixed number of times before succeeding.
    struct FlakyGenerator {
        calls: AtomicU32,
        failures: u32,
    }

    #[async_trait]
    impl TextGenerator for FlakyGenerator {
        async fn generate(&self, _prompt: &str) -> Result<String, GenerateError> {
            let call = self.calls.fetch_add(1, Ordering::SeqCst);
            if call < self.failures {
                Err(GenerateError::Overloaded("model overloaded".into()))
            } else {
                Ok("ok".into())
            }
        }
    }

    struct AlwaysApiError;

    #[async_trait]
    impl TextGenerator for AlwaysApiError {
        async fn generate(&self, _prompt: &str) -> Result<String, GenerateError> {
            Err(GenerateError::Api {
                status: 400,
                message: "bad request".into(),
            })
        }
    }

    #[test]
    fn backoff_doubles_and_caps() {
        assert_eq!(backoff_delay(0, 1000), Duration::from_millis(1000));
        assert_eq!(backoff_delay(1, 1000), Duration::from_millis(2000));
        assert_eq!(backoff_delay(2, 1000), Duration::from_millis(4000));
        assert_eq!(backoff_delay(3, 1000), Duration::from_millis(8000));
        // Capped at 10 s from the fourth retry on
        assert_eq!(backoff_delay(4, 1000), Duration::from_millis(10_000));
        assert_eq!(backoff_delay(30, 1000), Duration::from_millis(10_000));
    }

    #[test]
    fn overload_message_detection() {
        assert!(is_overload_message("The model is overloaded"));
        assert!(is_overload_message("please try again later"));
        assert!(!is_overload_message("invalid API key"));
    }

    #[test]
    fn retryable_classification() {
        assert!(GenerateError::Overloaded("x".into()).is_retryable());
        assert!(GenerateError::Network("x".into()).is_retryable());
        assert!(!GenerateError::Api {
            status: 400,
            message: "x".into()
        }
        .is_retryable());
    }

    #[tokio::test]
    async fn retries_then_succeeds() {
        let generator = FlakyGenerator {
            calls: AtomicU32::new(0),
            failures: 2,
        };
        let policy = RetryPolicy {
            max_retries: 3,
            backoff_base_ms: 1,
        };
        let text = generate_with_retry(&generator, "p", &policy).await.unwrap();
        assert_eq!(text, "ok");
        assert_eq!(generator.calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn exhausts_retries_after_four_attempts() {
        let generator = FlakyGenerator {
            calls: AtomicU32::new(0),
            failures: u32::MAX,
        };
        let policy = RetryPolicy {
            max_retries: 3,
            backoff_base_ms: 1,
        };
        let err = generate_with_retry(&generator, "p", &policy)
            .await
            .unwrap_err();
        assert!(matches!(err, GenerateError::Overloaded(_)));
        // 1 initial attempt + 3 retries
        assert_eq!(generator.calls.load(Ordering::SeqCst), 4);
    }

    #[tokio::test]
    async fn non_retryable_aborts_immediately() {
        let policy = RetryPolicy {
            max_retries: 3,
            backoff_base_ms: 1,
        };
        let err = generate_with_retry(&AlwaysApiError, "p", &policy)
            .await
            .unwrap_err();
        assert!(matches!(err, GenerateError::Api { status: 400, .. }));
    }
}
