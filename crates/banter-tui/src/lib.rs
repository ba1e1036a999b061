//! Full-screen terminal chat UI.
//!
//! Architecture: a single reducer (`update`) mutates state and returns
//! effects; the runtime owns the terminal, drains event sources once per
//! frame, and executes effects (spawning turn tasks, clipboard writes,
//! config persistence). Rendering is pure (`view`).

pub mod clipboard;
pub mod effects;
pub mod events;
pub mod input;
pub mod markdown;
pub mod overlays;
pub mod runtime;
pub mod state;
pub mod terminal;
pub mod transcript;
pub mod update;
pub mod view;

use anyhow::Result;
use banter_core::config::Config;

use crate::runtime::TuiRuntime;

/// Launches the chat TUI with the given configuration.
///
/// Must be called from within a tokio runtime.
pub fn run(config: Config) -> Result<()> {
    let mut runtime = TuiRuntime::new(config)?;
    runtime.run()
}
