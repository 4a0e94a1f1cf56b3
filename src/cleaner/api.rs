//! [`ApiCleaner`] — cleanup via any OpenAI-compatible chat endpoint.
//!
//! Ollama (OpenAI mode), OpenAI, Groq, LM Studio, vLLM — anything that
//! speaks the `/v1/chat/completions` wire format.  All connection details
//! come from [`CleanerConfig`]; nothing is hardcoded.

use async_trait::async_trait;

use crate::cleaner::{AiCleaner, CleanError};
use crate::config::CleanerConfig;

/// System prompt sent with every cleanup request.  The model must only tidy
/// the dictation, never answer it or add content.
const SYSTEM_PROMPT: &str = "You clean up dictated text. Fix punctuation and \
obvious dictation artifacts (filler words, false starts). Never add content, \
never answer questions in the text, never explain. Reply with the cleaned \
text only.";

// ---------------------------------------------------------------------------
// ApiCleaner
// ---------------------------------------------------------------------------

/// Calls an OpenAI-compatible `/v1/chat/completions` endpoint to polish a
/// finalized utterance.
pub struct ApiCleaner {
    client: reqwest::Client,
    config: CleanerConfig,
}

impl ApiCleaner {
    /// Build an `ApiCleaner` from config.
    ///
    /// The HTTP client carries the per-request timeout from
    /// `config.timeout_secs`; the worker additionally races the whole call
    /// against the same budget, so a stalled connection can never hold up a
    /// session.
    pub fn from_config(config: &CleanerConfig) -> Self {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());

        Self {
            client,
            config: config.clone(),
        }
    }
}

#[async_trait]
impl AiCleaner for ApiCleaner {
    /// Send `text` to the configured endpoint for cleanup.
    ///
    /// The `Authorization: Bearer …` header is attached only when
    /// `config.api_key` is a non-empty string — safe for Ollama and other
    /// local providers that require no authentication.
    async fn clean(&self, text: &str) -> Result<String, CleanError> {
        let url = format!("{}/v1/chat/completions", self.config.base_url);

        let body = serde_json::json!({
            "model":       self.config.model,
            "messages": [
                { "role": "system", "content": SYSTEM_PROMPT },
                { "role": "user",   "content": text          }
            ],
            "stream":      false,
            "temperature": self.config.temperature,
            "max_tokens":  512
        });

        let mut req = self.client.post(&url).json(&body);

        let key = self.config.api_key.as_deref().unwrap_or("");
        if !key.is_empty() {
            req = req.bearer_auth(key);
        }

        let response = req.send().await?;

        let json: serde_json::Value = response
            .json()
            .await
            .map_err(|e| CleanError::Parse(e.to_string()))?;

        let cleaned = json["choices"][0]["message"]["content"]
            .as_str()
            .ok_or(CleanError::EmptyResponse)?
            .trim()
            .to_owned();

        if cleaned.is_empty() {
            return Err(CleanError::EmptyResponse);
        }

        Ok(cleaned)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
