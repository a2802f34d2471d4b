//! Server-Sent Events (SSE) streaming parser.
//!
//! Turns a line-oriented byte source into a lazy stream of SSE events.
//! Nothing is read until the stream is polled, and dropping the stream
//! drops the source with it.

use futures_util::stream::{self, BoxStream, StreamExt};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, Lines};
use tokio_util::io::StreamReader;

use crate::GenerationError;

/// A single SSE event parsed from the stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SseEvent {
    /// The event type, if the server sent an `event:` field.
    pub event: Option<String>,
    /// The event data (JSON string for Gemini).
    pub data: String,
}

/// Adapt a reqwest response body into a buffered async reader.
pub fn response_reader(
    response: reqwest::Response,
) -> impl AsyncBufRead + Unpin + Send + 'static {
    let byte_stream = response
        .bytes_stream()
        .map(|result| result.map_err(std::io::Error::other));
    tokio::io::BufReader::new(StreamReader::new(byte_stream))
}

struct ParserState<R> {
    lines: Lines<R>,
    event: Option<String>,
    data: String,
}

impl<R> ParserState<R> {
    fn take_event(&mut self) -> SseEvent {
        SseEvent {
            event: self.event.take(),
            data: std::mem::take(&mut self.data),
        }
    }
}

/// Parse SSE events from `reader`.
///
/// The stream ends when the source reaches EOF. A read error is yielded
/// once as `GenerationError::Unknown` and terminates the stream.
pub fn sse_events<R>(reader: R) -> BoxStream<'static, Result<SseEvent, GenerationError>>
where
    R: AsyncBufRead + Unpin + Send + 'static,
{
    let state = ParserState {
        lines: reader.lines(),
        event: None,
        data: String::new(),
    };

    stream::unfold(Some(state), |state| async move {
        let mut state = state?;
        loop {
            let line = match state.lines.next_line().await {
                Ok(Some(line)) => line,
                Ok(None) => {
                    // Flush any trailing event without a blank terminator
                    if state.data.is_empty() {
                        return None;
                    }
                    let event = state.take_event();
                    return Some((Ok(event), None));
                }
                Err(e) => {
                    return Some((Err(GenerationError::Unknown(e.to_string())), None));
                }
            };

            let line = line.strip_suffix('\r').unwrap_or(&line);
            if line.is_empty() {
                if state.data.is_empty() {
                    state.event = None;
                    continue;
                }
                let event = state.take_event();
                return Some((Ok(event), Some(state)));
            }

            if let Some(event_type) = line.strip_prefix("event:") {
                state.event = Some(event_type.trim_start().to_string());
            } else if let Some(data) = line.strip_prefix("data:") {
                if !state.data.is_empty() {
                    state.data.push('\n');
                }
                state.data.push_str(data.strip_prefix(' ').unwrap_or(data));
            }
            // id:, retry: and comments are ignored
        }
    })
    .boxed()
}
