//! Incremental parser for the chat event stream.
//!
//! The backend delivers the response as a plain text stream in which every
//! consumable line is prefixed with `data: ` followed by a JSON object. The
//! parser buffers raw bytes across transport chunk boundaries and only
//! decodes complete lines, so multi-byte UTF-8 sequences split across chunks
//! are never corrupted.
//!
//! Per-line failures (bad UTF-8, malformed JSON) skip the line and keep the
//! stream alive; transport failures terminate it.

use std::pin::Pin;
use std::task::{Context, Poll};

use anyhow::Result;
use futures_util::Stream;
use serde_json::Value;

/// Literal prefix marking a consumable event line.
const DATA_PREFIX: &str = "data: ";

/// Events emitted by the chat stream parser.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StreamEvent {
    /// A content fragment to append to the accumulator.
    Content { text: String },
    /// In-band failure reported by the backend.
    Error { message: String },
}

/// Line-oriented parser that converts a byte stream into `StreamEvent`s.
///
/// State machine: carryover bytes -> drain complete lines -> decode ->
/// dispatch per line. Testable by feeding byte chunks directly.
pub struct ChatStreamParser<S> {
    inner: S,
    buffer: Vec<u8>,
}

impl<S> ChatStreamParser<S> {
    pub fn new(stream: S) -> Self {
        Self {
            inner: stream,
            buffer: Vec::new(),
        }
    }

    /// Drains complete lines from the buffer until one yields an event.
    /// Returns None when no complete line remains.
    fn next_buffered_event(&mut self) -> Option<StreamEvent> {
        while let Some(newline) = self.buffer.iter().position(|&b| b == b'\n') {
            let line_bytes: Vec<u8> = self.buffer.drain(..=newline).collect();
            if let Some(event) = parse_line_bytes(&line_bytes) {
                return Some(event);
            }
        }
        None
    }

    /// Parses whatever is left in the buffer as a final unterminated line.
    fn flush_trailing(&mut self) -> Option<StreamEvent> {
        if self.buffer.iter().all(u8::is_ascii_whitespace) {
            self.buffer.clear();
            return None;
        }
        let rest = std::mem::take(&mut self.buffer);
        parse_line_bytes(&rest)
    }
}

impl<S, E> Stream for ChatStreamParser<S>
where
    S: Stream<Item = std::result::Result<bytes::Bytes, E>> + Unpin,
    E: std::error::Error + Send + Sync + 'static,
{
    type Item = Result<StreamEvent>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        loop {
            if let Some(event) = self.next_buffered_event() {
                return Poll::Ready(Some(Ok(event)));
            }

            let inner = Pin::new(&mut self.inner);
            match inner.poll_next(cx) {
                Poll::Ready(Some(Ok(bytes))) => {
                    self.buffer.extend_from_slice(&bytes);
                    // Loop to parse what we have so far
                }
                Poll::Ready(Some(Err(e))) => {
                    return Poll::Ready(Some(Err(anyhow::anyhow!("Stream error: {}", e))));
                }
                Poll::Ready(None) => {
                    // Transport EOF - the final line may lack a newline
                    if let Some(event) = self.flush_trailing() {
                        return Poll::Ready(Some(Ok(event)));
                    }
                    return Poll::Ready(None);
                }
                Poll::Pending => return Poll::Pending,
            }
        }
    }
}

/// Decodes one raw line and dispatches it.
fn parse_line_bytes(line_bytes: &[u8]) -> Option<StreamEvent> {
    // Decode only complete lines; a line with invalid UTF-8 is malformed
    // input and is skipped like any other bad payload.
    match std::str::from_utf8(line_bytes) {
        Ok(line) => parse_line(line),
        Err(e) => {
            tracing::warn!("Skipping non-UTF-8 event line: {}", e);
            None
        }
    }
}

/// Parses a single decoded line into an event.
///
/// Lines without the `data: ` prefix are ignored. A prefixed line whose
/// payload fails to parse is skipped (logged), never fatal.
pub fn parse_line(line: &str) -> Option<StreamEvent> {
    let line = line.trim_end_matches(['\n', '\r']);
    let payload = line.strip_prefix(DATA_PREFIX)?;
    let payload = payload.trim();
    if payload.is_empty() {
        return None;
    }

    let value = match serde_json::from_str::<Value>(payload) {
        Ok(value) => value,
        Err(e) => {
            tracing::warn!("Skipping malformed event payload: {}", e);
            return None;
        }
    };

    if let Some(message) = value.get("error").and_then(Value::as_str) {
        return Some(StreamEvent::Error {
            message: message.to_string(),
        });
    }

    let text = value.get("content").and_then(Value::as_str)?;
    if text.is_empty() {
        return None;
    }
    Some(StreamEvent::Content {
        text: text.to_string(),
    })
}
