//! Turn driver: pumps one response stream into an event channel.
//!
//! A turn is one submit -> stream -> commit/fail cycle. The driver owns the
//! response stream for its whole life; dropping the receiving end of the
//! channel cancels the turn, which drops the reader and buffers with it.

use std::pin::Pin;

use anyhow::Result;
use futures_util::{Stream, StreamExt};
use tokio::sync::mpsc;

use crate::client::ChatClient;
use crate::error::{ClientError, ClientErrorKind};
use crate::events::TurnEvent;
use crate::session::ModelId;
use crate::stream::StreamEvent;

/// Channel capacity for turn events. Fragments are small; the UI drains the
/// channel once per frame.
const EVENT_CHANNEL_CAPACITY: usize = 256;

/// Creates the channel a turn reports through.
pub fn create_event_channel() -> (mpsc::Sender<TurnEvent>, mpsc::Receiver<TurnEvent>) {
    mpsc::channel(EVENT_CHANNEL_CAPACITY)
}

/// Spawns a turn task and returns the receiving end of its event channel.
///
/// Dropping the receiver cancels the turn: the task observes the closed
/// channel on its next send and exits.
pub fn spawn_turn(client: ChatClient, message: String, model: ModelId) -> mpsc::Receiver<TurnEvent> {
    let (tx, rx) = create_event_channel();
    tokio::spawn(async move {
        run_turn(&client, &message, model, &tx).await;
    });
    rx
}

/// Runs a single turn to completion, reporting through `tx`.
pub async fn run_turn(
    client: &ChatClient,
    message: &str,
    model: ModelId,
    tx: &mpsc::Sender<TurnEvent>,
) {
    match client.send_message_stream(message, model).await {
        Ok(stream) => drive_stream(stream, tx).await,
        Err(e) => {
            tracing::warn!("Chat request failed: {:#}", e);
            let _ = tx.send(failure_event(&e)).await;
        }
    }
}

/// Drains the event stream, accumulating fragments and forwarding deltas.
///
/// Send failures mean the receiver was dropped (reset or quit); the stream
/// is released by returning.
async fn drive_stream(
    mut stream: Pin<Box<dyn Stream<Item = Result<StreamEvent>> + Send>>,
    tx: &mpsc::Sender<TurnEvent>,
) {
    let mut full_text = String::new();

    while let Some(event_result) = stream.next().await {
        match event_result {
            Ok(StreamEvent::Content { text }) => {
                full_text.push_str(&text);
                if tx.send(TurnEvent::Delta { text }).await.is_err() {
                    return; // receiver dropped: turn cancelled
                }
            }
            Ok(StreamEvent::Error { message }) => {
                tracing::warn!("Backend reported stream error: {}", message);
                let _ = tx
                    .send(TurnEvent::Failed {
                        kind: ClientErrorKind::Api,
                        message,
                    })
                    .await;
                return;
            }
            Err(e) => {
                tracing::warn!("Stream aborted: {:#}", e);
                let _ = tx.send(failure_event(&e)).await;
                return;
            }
        }
    }

    let _ = tx
        .send(TurnEvent::Completed {
            final_text: full_text,
        })
        .await;
}

fn failure_event(error: &anyhow::Error) -> TurnEvent {
    let kind = error
        .downcast_ref::<ClientError>()
        .map_or(ClientErrorKind::Transport, |e| e.kind.clone());
    TurnEvent::Failed {
        kind,
        message: format!("{:#}", error),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stream::ChatStreamParser;

    fn boxed_stream(data: &str) -> Pin<Box<dyn Stream<Item = Result<StreamEvent>> + Send>> {
        let chunks: Vec<std::result::Result<bytes::Bytes, std::io::Error>> = data
            .as_bytes()
            .chunks(11)
            .map(|c| Ok(bytes::Bytes::copy_from_slice(c)))
            .collect();
        Box::pin(ChatStreamParser::new(futures_util::stream::iter(chunks)))
    }

    async fn drain(rx: &mut mpsc::Receiver<TurnEvent>) -> Vec<TurnEvent> {
        let mut events = Vec::new();
        while let Some(event) = rx.recv().await {
            events.push(event);
        }
        events
    }

    #[tokio::test]
    async fn test_drive_stream_emits_deltas_then_completed() {
        let data = "data: {\"content\": \"Hel\"}\n\
data: {\"content\": \"lo, \"}\n\
data: {\"content\": \"world\"}\n";
        let (tx, mut rx) = create_event_channel();

        drive_stream(boxed_stream(data), &tx).await;
        drop(tx);

        let events = drain(&mut rx).await;
        assert_eq!(events.len(), 4);
        assert_eq!(
            events[0],
            TurnEvent::Delta {
                text: "Hel".to_string()
            }
        );
        assert_eq!(
            events[1],
            TurnEvent::Delta {
                text: "lo, ".to_string()
            }
        );
        assert_eq!(
            events[2],
            TurnEvent::Delta {
                text: "world".to_string()
            }
        );
        assert_eq!(
            events[3],
            TurnEvent::Completed {
                final_text: "Hello, world".to_string()
            }
        );
    }

    #[tokio::test]
    async fn test_drive_stream_malformed_line_does_not_fail_turn() {
        let data = "data: {malformed json\n\
data: {\"content\": \"ok\"}\n";
        let (tx, mut rx) = create_event_channel();

        drive_stream(boxed_stream(data), &tx).await;
        drop(tx);

        let events = drain(&mut rx).await;
        assert_eq!(
            events,
            vec![
                TurnEvent::Delta {
                    text: "ok".to_string()
                },
                TurnEvent::Completed {
                    final_text: "ok".to_string()
                },
            ]
        );
    }

    #[tokio::test]
    async fn test_drive_stream_backend_error_fails_turn() {
        let data = "data: {\"content\": \"Hel\"}\n\
data: {\"error\": \"boom\"}\n\
data: {\"content\": \"never seen\"}\n";
        let (tx, mut rx) = create_event_channel();

        drive_stream(boxed_stream(data), &tx).await;
        drop(tx);

        let events = drain(&mut rx).await;
        assert_eq!(events.len(), 2);
        assert!(matches!(
            &events[1],
            TurnEvent::Failed {
                kind: ClientErrorKind::Api,
                message
            } if message == "boom"
        ));
    }

    #[tokio::test]
    async fn test_drive_stream_stops_when_receiver_dropped() {
        let data = "data: {\"content\": \"a\"}\n\
data: {\"content\": \"b\"}\n";
        let (tx, rx) = create_event_channel();
        drop(rx);

        // Must return promptly without panicking once the channel is closed.
        drive_stream(boxed_stream(data), &tx).await;
    }

    #[tokio::test]
    async fn test_drive_stream_empty_body_completes_with_empty_text() {
        let (tx, mut rx) = create_event_channel();

        drive_stream(boxed_stream(""), &tx).await;
        drop(tx);

        let events = drain(&mut rx).await;
        assert_eq!(
            events,
            vec![TurnEvent::Completed {
                final_text: String::new()
            }]
        );
    }
}
