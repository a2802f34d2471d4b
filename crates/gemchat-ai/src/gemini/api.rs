//! AiClient trait implementation for GeminiClient (generate + streaming).

use std::time::Duration;

use async_trait::async_trait;
use futures_util::future;
use futures_util::stream::{BoxStream, StreamExt};
use tracing::{debug, warn};

use crate::prompt::build_prompt;
use crate::streaming::{response_reader, sse_events, SseEvent};
use crate::{AiClient, GenerationError, Message, TextStream};

use super::client::{extract_text, GeminiClient};

impl GeminiClient {
    /// POST `prompt` and return the response once it has a success status.
    async fn post_prompt(
        &self,
        prompt: &str,
        stream: bool,
    ) -> Result<reqwest::Response, GenerationError> {
        let body = self.build_request_body(prompt);
        let url = if stream {
            format!("{}?alt=sse", self.api_url(true))
        } else {
            self.api_url(false)
        };

        debug!(model = %self.config.model, stream, "Gemini API request");

        let mut request = self
            .http
            .post(&url)
            .header("content-type", "application/json")
            .header("x-goog-api-key", &self.config.api_key)
            .json(&body);
        if !stream {
            request = request.timeout(Duration::from_secs(self.config.timeout_secs));
        }

        let response = request
            .send()
            .await
            .map_err(|e| {
                let err = GenerationError::classify(&e.to_string());
                warn!(error = %e, "Gemini API transport failure");
                err
            })?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            let err = GenerationError::classify(&format!("HTTP {status}: {text}"));
            warn!(%status, error = ?err, "Gemini API request failed");
            return Err(err);
        }

        Ok(response)
    }
}

#[async_trait]
impl AiClient for GeminiClient {
    async fn generate(
        &self,
        utterance: &str,
        history: &[Message],
    ) -> Result<String, GenerationError> {
        let prompt = build_prompt(utterance, history);
        let response = self.post_prompt(&prompt, false).await?;

        let json: serde_json::Value = response
            .json()
            .await
            .map_err(|e| GenerationError::Unknown(format!("invalid response body: {e}")))?;

        self.parse_response(&json)
    }

    async fn generate_stream(
        &self,
        utterance: &str,
        history: &[Message],
    ) -> Result<TextStream, GenerationError> {
        let prompt = build_prompt(utterance, history);
        let response = self.post_prompt(&prompt, true).await?;
        Ok(text_chunks(sse_events(response_reader(response))))
    }
}

/// Map Gemini SSE events to their non-empty text chunks.
///
/// The stream ends after the first error, whether it came from the
/// transport or from an `error` object sent in place of a chunk.
pub(crate) fn text_chunks(
    events: BoxStream<'static, Result<SseEvent, GenerationError>>,
) -> TextStream {
    events
        .filter_map(|event| {
            let chunk = match event {
                Ok(event) => match serde_json::from_str::<serde_json::Value>(&event.data) {
                    Ok(data) if data.get("error").is_some() => {
                        let err = GenerationError::classify(&data["error"].to_string());
                        warn!(error = ?err, "Gemini API stream failed");
                        Some(Err(err))
                    }
                    Ok(data) => {
                        let text = extract_text(&data);
                        (!text.is_empty()).then_some(Ok(text))
                    }
                    Err(e) => {
                        debug!(error = %e, "skipping non-JSON SSE event");
                        None
                    }
                },
                Err(e) => Some(Err(e)),
            };
            future::ready(chunk)
        })
        .scan(false, |failed, item| {
            if *failed {
                return future::ready(None);
            }
            *failed = item.is_err();
            future::ready(Some(item))
        })
        .boxed()
}
