//! HTTP client for the streaming chat endpoint.

use std::pin::Pin;

use anyhow::Result;
use futures_util::Stream;
use serde::Serialize;

use crate::error::ClientError;
use crate::session::ModelId;
use crate::stream::{ChatStreamParser, StreamEvent};

/// JSON body for `POST /chat`.
#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    message: &'a str,
    model: &'a str,
}

/// Chat backend client.
///
/// One outbound request per turn; the response body is consumed as an
/// incremental byte stream and parsed into [`StreamEvent`]s.
#[derive(Debug, Clone)]
pub struct ChatClient {
    base_url: String,
    http: reqwest::Client,
}

impl ChatClient {
    /// Creates a new client for the given backend base URL.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            http: reqwest::Client::new(),
        }
    }

    /// Returns the configured base URL.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Sends a message and returns an async stream of events.
    ///
    /// The stream is finite and not restartable; a new call starts a fresh
    /// request. Non-2xx responses and transport failures surface as
    /// [`ClientError`]s.
    pub async fn send_message_stream(
        &self,
        message: &str,
        model: ModelId,
    ) -> Result<Pin<Box<dyn Stream<Item = Result<StreamEvent>> + Send>>> {
        let request = ChatRequest {
            message,
            model: model.tag(),
        };

        let url = format!("{}/chat", self.base_url.trim_end_matches('/'));

        let response = self
            .http
            .post(&url)
            .header("content-type", "application/json")
            .header("accept", "text/event-stream")
            .json(&request)
            .send()
            .await
            .map_err(|e| ClientError::classify_reqwest_error(&e))?;

        let status = response.status();
        if !status.is_success() {
            let error_body = response.text().await.unwrap_or_default();
            return Err(ClientError::http_status(status.as_u16(), &error_body).into());
        }

        let byte_stream = response.bytes_stream();
        let event_stream = ChatStreamParser::new(byte_stream);
        Ok(Box::pin(event_stream))
    }
}
