//! Turn event types.
//!
//! This module defines the contract for events emitted while a turn is in
//! flight. Events are serializable for future JSON output mode support.

use serde::{Deserialize, Serialize};

use crate::error::ClientErrorKind;

/// Events emitted by the turn driver during execution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TurnEvent {
    /// Incremental text fragment from the assistant.
    Delta { text: String },

    /// Turn completed; carries the full accumulated text.
    Completed { final_text: String },

    /// Turn failed; the partial accumulator must be discarded.
    Failed {
        kind: ClientErrorKind,
        message: String,
    },
}
