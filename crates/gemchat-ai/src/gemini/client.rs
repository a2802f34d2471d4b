//! Gemini API client struct, request building, and response parsing.

use std::time::Duration;

use tracing::warn;

use crate::GenerationError;

use super::config::GeminiConfig;

/// Gemini API client.
///
/// Holds only the immutable configuration and a pooled HTTP client, so a
/// fresh instance can be built whenever the credential or model changes.
pub struct GeminiClient {
    pub(crate) config: GeminiConfig,
    pub(crate) http: reqwest::Client,
}

impl GeminiClient {
    /// Build a client. Fails with `InvalidCredential` for a blank API key,
    /// before any network activity.
    pub fn new(config: GeminiConfig) -> Result<Self, GenerationError> {
        if config.api_key.trim().is_empty() {
            warn!("Gemini API key is required");
            return Err(GenerationError::InvalidCredential);
        }

        // The whole-request deadline is set per request: a streamed reply
        // may legitimately outlive it.
        let http = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
            .build()
            .map_err(|e| GenerationError::Unknown(format!("failed to build HTTP client: {e}")))?;

        Ok(Self { config, http })
    }

    /// The model identifier this client talks to.
    pub fn model(&self) -> &str {
        &self.config.model
    }

    pub(crate) fn api_url(&self, stream: bool) -> String {
        let method = if stream {
            "streamGenerateContent"
        } else {
            "generateContent"
        };
        format!(
            "{}/{}:{}",
            self.config.base_url.trim_end_matches('/'),
            self.config.model,
            method
        )
    }

    /// Build the JSON request body for a single-turn prompt.
    pub(crate) fn build_request_body(&self, prompt: &str) -> serde_json::Value {
        serde_json::json!({
            "contents": [{
                "role": "user",
                "parts": [{ "text": prompt }]
            }],
            "generationConfig": {
                "maxOutputTokens": self.config.max_tokens,
                "temperature": self.config.temperature,
            }
        })
    }

    /// Parse a non-streaming response into its reply text.
    pub(crate) fn parse_response(&self, json: &serde_json::Value) -> Result<String, GenerationError> {
        let text = extract_text(json);
        if text.trim().is_empty() {
            return Err(GenerationError::EmptyResponse);
        }
        Ok(text)
    }
}

/// Concatenate the text parts of the first candidate.
pub(crate) fn extract_text(json: &serde_json::Value) -> String {
    let mut content = String::new();
    if let Some(parts) = json["candidates"][0]["content"]["parts"].as_array() {
        for part in parts {
            if let Some(text) = part["text"].as_str() {
                content.push_str(text);
            }
        }
    }
    content
}
