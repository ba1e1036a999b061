//! TUI runtime - owns the terminal, runs the event loop, executes effects.
//!
//! This is the boundary where side effects happen: the reducer stays pure
//! and produces effects; this module executes them. Must run inside a tokio
//! runtime (turn tasks are spawned onto it).

use std::io::Stdout;

use anyhow::{Context, Result};
use banter_core::client::ChatClient;
use banter_core::config::Config;
use banter_core::turn;
use crossterm::event;
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use tokio::sync::mpsc;

use crate::clipboard::Clipboard;
use crate::effects::UiEffect;
use crate::events::UiEvent;
use crate::state::{AgentState, AppState};
use crate::{terminal, update, view};

/// Target frame rate for streaming updates (60fps = ~16ms per frame).
const FRAME_DURATION: std::time::Duration = std::time::Duration::from_millis(16);

/// Poll duration when idle (no turn running). Longer timeout reduces CPU
/// usage when nothing is happening.
const IDLE_POLL_DURATION: std::time::Duration = std::time::Duration::from_millis(100);

/// Full-screen TUI runtime.
///
/// Owns the terminal and state. Terminal state is restored on drop, panic,
/// or Ctrl+C.
pub struct TuiRuntime {
    terminal: Terminal<CrosstermBackend<Stdout>>,
    state: AppState,
    client: ChatClient,
}

impl TuiRuntime {
    /// Creates a new TUI runtime from loaded configuration.
    pub fn new(config: Config) -> Result<Self> {
        let base_url = config.effective_base_url()?;
        let client = ChatClient::new(base_url);

        // Panic hook goes in BEFORE entering the alternate screen
        terminal::install_panic_hook();
        let terminal = terminal::setup_terminal().context("Failed to setup terminal")?;

        let state = AppState::new(config);

        Ok(Self {
            terminal,
            state,
            client,
        })
    }

    /// Runs the main event loop.
    pub fn run(&mut self) -> Result<()> {
        terminal::enable_input_features()?;

        let result = self.event_loop();

        let _ = terminal::disable_input_features();

        result
    }

    fn event_loop(&mut self) -> Result<()> {
        let mut dirty = true; // Ensure initial render

        while !self.state.tui.should_quit {
            let mut events = self.collect_events()?;

            // Frame event goes first so layout/delta updates happen before
            // other events are processed
            let size = self.terminal.size()?;
            events.insert(
                0,
                UiEvent::Frame {
                    width: size.width,
                    height: size.height,
                },
            );

            for event in events {
                // Tick only redraws while something is animating
                let marks_dirty = match &event {
                    UiEvent::Tick => self.state.tui.agent_state.is_running(),
                    UiEvent::Frame { .. } => false,
                    _ => true,
                };
                let effects = update::update(&mut self.state, event);
                if marks_dirty || !effects.is_empty() {
                    dirty = true;
                }
                self.execute_effects(effects);
            }

            if dirty {
                self.terminal.draw(|frame| {
                    view::render(&self.state, frame);
                })?;
                dirty = false;
            }
        }

        Ok(())
    }

    // ========================================================================
    // Event Collection
    // ========================================================================

    /// Collects events from all sources (tick, turn channel, terminal).
    fn collect_events(&mut self) -> Result<Vec<UiEvent>> {
        let mut events = Vec::new();

        // Always emit a tick for animation
        events.push(UiEvent::Tick);

        self.collect_turn_events(&mut events);

        let poll_duration = if self.state.tui.agent_state.is_running() {
            FRAME_DURATION
        } else {
            IDLE_POLL_DURATION
        };

        // Batch ALL available terminal events to avoid one-event-per-frame
        // lag on fast scroll
        if event::poll(poll_duration)? {
            events.push(UiEvent::Terminal(event::read()?));
            while event::poll(std::time::Duration::ZERO)? {
                events.push(UiEvent::Terminal(event::read()?));
            }
        }

        Ok(events)
    }

    /// Drains turn events from the active channel.
    fn collect_turn_events(&mut self, events: &mut Vec<UiEvent>) {
        while let AgentState::Waiting { rx } | AgentState::Streaming { rx, .. } =
            &mut self.state.tui.agent_state
        {
            let event = match rx.try_recv() {
                Ok(ev) => ev,
                Err(mpsc::error::TryRecvError::Empty | mpsc::error::TryRecvError::Disconnected) => {
                    break;
                }
            };

            events.push(UiEvent::Turn(event));
        }
    }

    // ========================================================================
    // Effect Dispatch
    // ========================================================================

    fn execute_effects(&mut self, effects: Vec<UiEffect>) {
        for effect in effects {
            self.execute_effect(effect);
        }
    }

    fn dispatch_event(&mut self, event: UiEvent) {
        let effects = update::update(&mut self.state, event);
        if !effects.is_empty() {
            self.execute_effects(effects);
        }
    }

    fn execute_effect(&mut self, effect: UiEffect) {
        match effect {
            UiEffect::Quit => {
                self.state.tui.should_quit = true;
            }
            UiEffect::StartTurn { text } => {
                let rx = turn::spawn_turn(self.client.clone(), text, self.state.tui.session.model());
                self.dispatch_event(UiEvent::TurnSpawned { rx });
            }
            UiEffect::CopyToClipboard { text } => {
                if let Err(e) = Clipboard::copy(&text) {
                    // Copy failures are log-only, never surfaced
                    tracing::warn!("Clipboard copy failed: {}", e);
                }
            }
            UiEffect::PersistModel { model } => {
                if let Err(e) = Config::save_model(model.tag()) {
                    tracing::warn!("Failed to persist model selection: {:#}", e);
                }
            }
        }
    }
}

impl Drop for TuiRuntime {
    fn drop(&mut self) {
        let _ = terminal::restore_terminal();
    }
}
