/// Inference client: the single entry point for hosted text-generation calls.
///
/// No other module talks to the inference API directly. Prompts live in
/// `prompts.rs`; response post-processing in `feedback.rs`.
use std::time::Duration;

use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

use crate::config::Config;

pub mod feedback;
pub mod handlers;
pub mod prompts;

const MAX_NEW_TOKENS: u32 = 512;
const TEMPERATURE: f32 = 0.7;
const MAX_ATTEMPTS: u32 = 3;
const REQUEST_TIMEOUT_SECS: u64 = 120;

#[derive(Debug, Error)]
pub enum InferenceError {
    #[error("Inference API key is not configured")]
    NotConfigured,

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Rate limited after {retries} attempts")]
    RateLimited { retries: u32 },

    #[error("Model returned empty content")]
    EmptyContent,
}

#[derive(Debug, Serialize)]
struct GenerationRequest<'a> {
    inputs: &'a str,
    parameters: GenerationParameters,
}

#[derive(Debug, Serialize)]
struct GenerationParameters {
    max_new_tokens: u32,
    temperature: f32,
    return_full_text: bool,
}

#[derive(Debug, Deserialize)]
struct Generation {
    generated_text: Option<String>,
}

/// Some deployments answer with a bare object instead of a one-element array.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum GenerationResponse {
    Many(Vec<Generation>),
    One(Generation),
}

impl GenerationResponse {
    fn into_text(self) -> Option<String> {
        let first = match self {
            GenerationResponse::Many(items) => items.into_iter().next(),
            GenerationResponse::One(item) => Some(item),
        };
        first
            .and_then(|g| g.generated_text)
            .filter(|t| !t.trim().is_empty())
    }
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    error: String,
}

#[derive(Clone)]
pub struct InferenceClient {
    client: Client,
    endpoint: String,
    api_key: Option<String>,
}

impl InferenceClient {
    pub fn new(
        api_url: &str,
        model: &str,
        api_key: Option<String>,
    ) -> Result<Self, InferenceError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()?;
        Ok(Self {
            client,
            endpoint: model_endpoint(api_url, model),
            api_key,
        })
    }

    pub fn from_config(config: &Config) -> Result<Self, InferenceError> {
        Self::new(
            &config.huggingface_api_url,
            &config.huggingface_model,
            config.huggingface_api_key.clone(),
        )
    }

    pub fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Sends `prompt` and returns the generated continuation.
    /// Retries on 429, 503 and other 5xx responses with exponential backoff.
    pub async fn generate(&self, prompt: &str) -> Result<String, InferenceError> {
        let api_key = self.api_key.as_deref().ok_or(InferenceError::NotConfigured)?;

        let request_body = GenerationRequest {
            inputs: prompt,
            parameters: GenerationParameters {
                max_new_tokens: MAX_NEW_TOKENS,
                temperature: TEMPERATURE,
                return_full_text: false,
            },
        };

        let mut last_error: Option<InferenceError> = None;

        for attempt in 0..MAX_ATTEMPTS {
            if attempt > 0 {
                // 1s, 2s
                let delay = Duration::from_millis(1000 * (1 << (attempt - 1)));
                warn!(
                    "Inference attempt {} failed, retrying after {}ms...",
                    attempt,
                    delay.as_millis()
                );
                tokio::time::sleep(delay).await;
            }

            let response = self
                .client
                .post(&self.endpoint)
                .bearer_auth(api_key)
                .json(&request_body)
                .send()
                .await;

            let response = match response {
                Ok(r) => r,
                Err(e) => {
                    last_error = Some(InferenceError::Http(e));
                    continue;
                }
            };

            let status = response.status();

            if status.as_u16() == 429 || status.is_server_error() {
                let body = response.text().await.unwrap_or_default();
                warn!("Inference API returned {}: {}", status, body);
                last_error = Some(InferenceError::Api {
                    status: status.as_u16(),
                    message: error_message(&body),
                });
                continue;
            }

            if !status.is_success() {
                let body = response.text().await.unwrap_or_default();
                return Err(InferenceError::Api {
                    status: status.as_u16(),
                    message: error_message(&body),
                });
            }

            let body = response.text().await?;
            let parsed: GenerationResponse = serde_json::from_str(&body)?;
            let text = parsed.into_text().ok_or(InferenceError::EmptyContent)?;

            debug!("Inference call succeeded: {} chars generated", text.len());
            return Ok(text);
        }

        Err(last_error.unwrap_or(InferenceError::RateLimited {
            retries: MAX_ATTEMPTS,
        }))
    }
}

fn model_endpoint(api_url: &str, model: &str) -> String {
    format!(
        "{}/{}",
        api_url.trim_end_matches('/'),
        model.trim_start_matches('/')
    )
}

fn error_message(body: &str) -> String {
    serde_json::from_str::<ApiErrorBody>(body)
        .map(|e| e.error)
        .unwrap_or_else(|_| body.to_string())
}

/// Strips ```json ... ``` or ``` ... ``` code fences from model output.
pub fn strip_json_fences(text: &str) -> &str {
    let text = text.trim();
    let inner = text
        .strip_prefix("```json")
        .or_else(|| text.strip_prefix("```"));
    match inner {
        Some(stripped) => stripped
            .trim_start()
            .strip_suffix("```")
            .map(|s| s.trim())
            .unwrap_or(stripped.trim_start()),
        None => text,
    }
}

/// Returns the first balanced `{...}` block in `text`.
///
/// Braces inside JSON strings (including escaped quotes) do not count.
pub fn extract_json_object(text: &str) -> Option<&str> {
    let text = strip_json_fences(text);
    let start = text.find('{')?;

    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (offset, c) in text[start..].char_indices() {
        if in_string {
            match c {
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                '"' => in_string = false,
                _ => {}
            }
            continue;
        }
        match c {
            '"' => in_string = true,
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(&text[start..start + offset + 1]);
                }
            }
            _ => {}
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_json_fences_with_json_tag() {
        let input = "```json\n{\"key\": \"value\"}\n```";
        assert_eq!(strip_json_fences(input), "{\"key\": \"value\"}");
    }

    #[test]
    fn test_strip_json_fences_without_tag() {
        let input = "```\n{\"key\": \"value\"}\n```";
        assert_eq!(strip_json_fences(input), "{\"key\": \"value\"}");
    }

    #[test]
    fn test_strip_json_fences_no_fences() {
        let input = "{\"key\": \"value\"}";
        assert_eq!(strip_json_fences(input), "{\"key\": \"value\"}");
    }

    #[test]
    fn test_extract_json_object_from_prose() {
        let text = "Sure! Here is the evaluation:\n{\"score\": 7, \"nested\": {\"a\": 1}} Hope it helps.";
        assert_eq!(
            extract_json_object(text),
            Some("{\"score\": 7, \"nested\": {\"a\": 1}}")
        );
    }

    #[test]
    fn test_extract_json_object_ignores_braces_in_strings() {
        let text = r#"{"summary": "uses {braces} and \"quotes\" }", "score": 5} trailing }"#;
        assert_eq!(
            extract_json_object(text),
            Some(r#"{"summary": "uses {braces} and \"quotes\" }", "score": 5}"#)
        );
    }

    #[test]
    fn test_extract_json_object_unbalanced_or_missing() {
        assert_eq!(extract_json_object("{\"score\": 7"), None);
        assert_eq!(extract_json_object("no json at all"), None);
    }

    #[test]
    fn test_extract_json_object_inside_fences() {
        let text = "```json\n{\"score\": 9}\n```";
        assert_eq!(extract_json_object(text), Some("{\"score\": 9}"));
    }

    #[test]
    fn test_generation_response_shapes() {
        let many: GenerationResponse =
            serde_json::from_str(r#"[{"generated_text": "hello"}]"#).unwrap();
        assert_eq!(many.into_text().as_deref(), Some("hello"));

        let one: GenerationResponse =
            serde_json::from_str(r#"{"generated_text": "hi"}"#).unwrap();
        assert_eq!(one.into_text().as_deref(), Some("hi"));

        let empty: GenerationResponse = serde_json::from_str("[]").unwrap();
        assert!(empty.into_text().is_none());
    }

    #[test]
    fn test_model_endpoint_joins_cleanly() {
        assert_eq!(
            model_endpoint("https://api.example/models/", "org/model"),
            "https://api.example/models/org/model"
        );
    }

    #[test]
    fn test_error_message_prefers_error_field() {
        assert_eq!(error_message(r#"{"error": "Model is loading"}"#), "Model is loading");
        assert_eq!(error_message("plain failure"), "plain failure");
    }

    #[tokio::test]
    async fn test_generate_without_key_is_not_configured() {
        let client = InferenceClient::new("http://127.0.0.1:9", "m", None).unwrap();
        assert!(!client.is_configured());
        let err = client.generate("hi").await.unwrap_err();
        assert!(matches!(err, InferenceError::NotConfigured));
    }
}
