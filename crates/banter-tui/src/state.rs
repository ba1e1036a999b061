//! Application state composition.
//!
//! State hierarchy:
//!
//! ```text
//! AppState
//! ├── tui: TuiState
//! │   ├── input: InputState          (text field, history)
//! │   ├── transcript: TranscriptState (cells, scroll, wrap cache)
//! │   ├── session: ChatSession       (conversation, stream, model)
//! │   ├── agent_state: AgentState    (idle, waiting, streaming)
//! │   └── sidebar/chat-list toggles
//! └── overlay: Option<Overlay>       (modal overlays)
//! ```
//!
//! State is split between `TuiState` and `Option<Overlay>` so overlay
//! handlers can take `&mut self` and `&mut TuiState` simultaneously.

use banter_core::config::Config;
use banter_core::events::TurnEvent;
use banter_core::session::{ChatSession, ModelId};
use tokio::sync::mpsc;

use crate::input::InputState;
use crate::overlays::Overlay;
use crate::transcript::{CellId, TranscriptState};

/// Combined application state for the TUI.
pub struct AppState {
    pub tui: TuiState,
    pub overlay: Option<Overlay>,
}

impl AppState {
    /// Creates a new `AppState` from loaded configuration.
    pub fn new(config: Config) -> Self {
        Self {
            tui: TuiState::new(config),
            overlay: None,
        }
    }
}

/// Turn execution state.
///
/// Tracks the in-flight turn task and its event channel. The task sends
/// `Completed`/`Failed` when done.
#[derive(Debug)]
pub enum AgentState {
    /// No turn running, ready for input.
    Idle,
    /// Request sent, no content fragment has arrived yet.
    Waiting { rx: mpsc::Receiver<TurnEvent> },
    /// Streaming response in progress.
    Streaming {
        /// Receiver for turn events.
        rx: mpsc::Receiver<TurnEvent>,
        /// ID of the streaming assistant cell in the transcript.
        cell_id: CellId,
        /// Buffered delta text to apply on the next frame (coalescing).
        pending_delta: String,
    },
}

impl AgentState {
    /// Returns true if a turn is currently running (waiting or streaming).
    pub fn is_running(&self) -> bool {
        !matches!(self, AgentState::Idle)
    }
}

/// A cleared conversation remembered for the sidebar list (session-only).
#[derive(Debug, Clone)]
pub struct PastChat {
    /// First user message, truncated for display.
    pub title: String,
    /// Number of messages the conversation had.
    pub message_count: usize,
}

/// TUI application state (non-overlay).
pub struct TuiState {
    /// Flag indicating the app should quit.
    pub should_quit: bool,
    /// User input state (text field, history).
    pub input: InputState,
    /// Transcript display state (cells, scroll, layout, cache).
    pub transcript: TranscriptState,
    /// Chat session (conversation, stream accumulator, model).
    pub session: ChatSession,
    /// Loaded configuration.
    pub config: Config,
    /// Current turn execution state.
    pub agent_state: AgentState,
    /// Spinner animation frame counter.
    pub spinner_frame: usize,
    /// Whether the sidebar panel is open.
    pub sidebar_open: bool,
    /// Conversations cleared this session, newest last. Never persisted.
    pub past_chats: Vec<PastChat>,
}

impl TuiState {
    pub fn new(config: Config) -> Self {
        let model = ModelId::from_tag(&config.model).unwrap_or_default();
        Self {
            should_quit: false,
            input: InputState::new(),
            transcript: TranscriptState::new(),
            session: ChatSession::new(model),
            config,
            agent_state: AgentState::Idle,
            spinner_frame: 0,
            sidebar_open: false,
            past_chats: Vec::new(),
        }
    }

    /// Records the current conversation in the sidebar list before a reset.
    pub fn remember_current_chat(&mut self) {
        let messages = self.session.conversation().messages();
        if messages.is_empty() {
            return;
        }
        let title = messages
            .first()
            .map(|m| truncate_title(&m.content))
            .unwrap_or_default();
        self.past_chats.push(PastChat {
            title,
            message_count: messages.len(),
        });
    }
}

/// Shortens a chat title to one sidebar-friendly line.
fn truncate_title(text: &str) -> String {
    const MAX_CHARS: usize = 28;
    let first_line = text.lines().next().unwrap_or_default();
    if first_line.chars().count() <= MAX_CHARS {
        return first_line.to_string();
    }
    let truncated: String = first_line.chars().take(MAX_CHARS - 1).collect();
    format!("{}…", truncated)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_model_falls_back_to_default_for_unknown_tag() {
        let config = Config {
            model: "made-up-model".to_string(),
            ..Default::default()
        };
        let state = TuiState::new(config);
        assert_eq!(state.session.model(), ModelId::default());
    }

    #[test]
    fn test_remember_current_chat_titles_from_first_message() {
        let mut state = TuiState::new(Config::default());
        state.session.submit("what is the airspeed of a swallow?").unwrap();
        state.session.apply_delta("African or European?");
        state.session.complete();

        state.remember_current_chat();

        assert_eq!(state.past_chats.len(), 1);
        assert_eq!(state.past_chats[0].message_count, 2);
        assert!(state.past_chats[0].title.starts_with("what is the airspeed"));
    }

    #[test]
    fn test_remember_current_chat_skips_empty_conversation() {
        let mut state = TuiState::new(Config::default());
        state.remember_current_chat();
        assert!(state.past_chats.is_empty());
    }
}
