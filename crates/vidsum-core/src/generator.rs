use async_trait::async_trait;

use crate::config::GenerationOptions;
use crate::error::{Result, VidsumError};
use crate::provider::Provider;
use crate::retry;

/// Text-generation capability. Returns one or more candidate completions
/// for a (system instruction, user text) prompt pair.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    async fn complete(
        &self,
        system: &str,
        user: &str,
        options: &GenerationOptions,
    ) -> Result<Vec<String>>;
}

const MAX_RETRIES: u32 = 3;
const INITIAL_BACKOFF_MS: u64 = 300;

/// Generator speaking the OpenAI-compatible chat-completions protocol.
/// Transient failures (timeouts, connection errors, 429, 5xx) are retried
/// with exponential backoff; auth and validation errors are not.
pub struct ChatCompletionsGenerator {
    provider: Provider,
    client: reqwest::Client,
}

impl ChatCompletionsGenerator {
    pub fn new(provider: Provider) -> Self {
        Self {
            provider,
            client: reqwest::Client::new(),
        }
    }

    async fn request_once(
        &self,
        api_key: &str,
        system: &str,
        user: &str,
        options: &GenerationOptions,
    ) -> Result<Vec<String>> {
        let config = self.provider.config();
        let response = self
            .client
            .post(config.api_url)
            .header("Content-Type", "application/json")
            .header("Authorization", format!("Bearer {}", api_key))
            .json(&serde_json::json!({
                "model": options.model,
                "messages": [
                    {
                        "role": "system",
                        "content": system,
                    },
                    {
                        "role": "user",
                        "content": user,
                    },
                ],
                "temperature": options.temperature,
                "max_tokens": options.max_tokens,
                "top_p": options.top_p,
            }))
            .send()
            .await?
            .error_for_status()?
            .json::<serde_json::Value>()
            .await?;

        let choices = response["choices"]
            .as_array()
            .filter(|arr| !arr.is_empty())
            .ok_or_else(|| VidsumError::Summarization {
                reason: format!("Invalid API response: {:?}", response),
            })?;

        choices
            .iter()
            .map(|choice| {
                choice["message"]["content"]
                    .as_str()
                    .map(str::to_string)
                    .ok_or_else(|| VidsumError::Summarization {
                        reason: format!("Invalid API response: {:?}", response),
                    })
            })
            .collect()
    }
}

fn is_retryable(error: &VidsumError) -> bool {
    match error {
        VidsumError::ApiError(e) => {
            if e.is_timeout() || e.is_connect() {
                return true;
            }
            e.status()
                .map(|s| s.as_u16() == 429 || s.is_server_error())
                .unwrap_or(false)
        }
        _ => false,
    }
}

#[async_trait]
impl TextGenerator for ChatCompletionsGenerator {
    async fn complete(
        &self,
        system: &str,
        user: &str,
        options: &GenerationOptions,
    ) -> Result<Vec<String>> {
        let api_key = self.provider.validate_api_key()?;
        retry::with_backoff(
            MAX_RETRIES,
            INITIAL_BACKOFF_MS,
            || self.request_once(&api_key, system, user, options),
            is_retryable,
        )
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn non_http_errors_are_fatal() {
        assert!(!is_retryable(&VidsumError::Summarization {
            reason: "malformed response".into()
        }));
        assert!(!is_retryable(&VidsumError::MissingApiKey {
            env_var: "OPENAI_API_KEY".into()
        }));
        assert!(!is_retryable(&VidsumError::Input {
            reason: "empty".into()
        }));
    }
}
