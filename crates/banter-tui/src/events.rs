//! UI event types.
//!
//! All external inputs (terminal, turn task, async results) are converted to
//! `UiEvent` before being processed by the reducer.

use banter_core::events::TurnEvent;
use crossterm::event::Event as CrosstermEvent;
use tokio::sync::mpsc;

/// Unified event enum for the TUI.
///
/// The reducer (`update`) pattern-matches on these events to update state.
#[derive(Debug)]
pub enum UiEvent {
    /// Timer tick (for animation, polling).
    Tick,

    /// Frame event for per-frame state updates (layout, delta coalescing).
    ///
    /// Emitted once per frame before other events are processed.
    /// Contains terminal dimensions for layout calculations.
    Frame { width: u16, height: u16 },

    /// Terminal input event (key, mouse, paste, resize).
    Terminal(CrosstermEvent),

    /// Turn event (streaming delta, completion, failure).
    Turn(TurnEvent),

    /// Turn task spawned; reducer should set agent state to Waiting.
    TurnSpawned { rx: mpsc::Receiver<TurnEvent> },
}
