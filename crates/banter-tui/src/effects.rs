//! UI effect types.
//!
//! Effects are commands returned by the reducer that the runtime executes.
//! They represent I/O and task spawning only; the reducer itself never
//! performs I/O or spawns tasks.

use banter_core::session::ModelId;

/// Effects returned by the reducer for the runtime to execute.
#[derive(Debug)]
pub enum UiEffect {
    /// Quit the application.
    Quit,

    /// Start a turn with the validated input text.
    StartTurn { text: String },

    /// Copy text to the system clipboard.
    CopyToClipboard { text: String },

    /// Persist the model preference to config.
    PersistModel { model: ModelId },
}
