//! TUI reducer (update function).
//!
//! All state mutations happen here. The runtime calls `update(app, event)`
//! and executes the returned effects. This is the single source of truth for
//! how events modify state.

use banter_core::events::TurnEvent;
use crossterm::event::{Event, KeyCode, KeyEvent, KeyModifiers, MouseEventKind};

use crate::effects::UiEffect;
use crate::events::UiEvent;
use crate::overlays::{Overlay, OverlayAction};
use crate::state::{AgentState, AppState, TuiState};
use crate::transcript::HistoryCell;
use crate::view;

/// Lines to scroll per mouse wheel tick.
const MOUSE_SCROLL_LINES: usize = 3;

/// The main reducer function.
///
/// Takes the current state and an event, mutates state, and returns effects
/// for the runtime to execute.
pub fn update(app: &mut AppState, event: UiEvent) -> Vec<UiEffect> {
    match event {
        UiEvent::Tick => {
            app.tui.spinner_frame = app.tui.spinner_frame.wrapping_add(1);
            vec![]
        }
        UiEvent::Frame { width, height } => {
            handle_frame(&mut app.tui, width, height);
            vec![]
        }
        UiEvent::Terminal(term_event) => handle_terminal_event(app, term_event),
        UiEvent::Turn(turn_event) => handle_turn_event(&mut app.tui, turn_event),
        UiEvent::TurnSpawned { rx } => {
            app.tui.agent_state = AgentState::Waiting { rx };
            vec![]
        }
    }
}

// ============================================================================
// Frame Handler (layout, delta coalescing, line count)
// ============================================================================

/// Per-frame housekeeping: layout updates, delta coalescing, and the cached
/// line count that drives scroll math.
fn handle_frame(tui: &mut TuiState, width: u16, height: u16) {
    let viewport_height = view::calculate_transcript_height(height);
    tui.transcript
        .update_layout((width, height), viewport_height);

    // Apply any pending streaming text delta (coalescing)
    apply_pending_delta(tui);

    // Apply accumulated mouse scroll delta (coalescing)
    apply_scroll_delta(tui);

    let content_width = view::transcript_content_width(tui, width);
    let total_lines = view::count_transcript_lines(tui, content_width);
    tui.transcript.scroll.update_line_count(total_lines);
}

// ============================================================================
// Terminal Event Handlers
// ============================================================================

fn handle_terminal_event(app: &mut AppState, event: Event) -> Vec<UiEffect> {
    match event {
        Event::Key(key) => handle_key(app, key),
        Event::Mouse(mouse) => {
            handle_mouse(&mut app.tui, &mouse);
            vec![]
        }
        Event::Paste(text) => {
            app.tui.input.insert_str(&text);
            vec![]
        }
        Event::Resize(_, _) => {
            // Line wrapping depends on width
            app.tui.transcript.wrap_cache.clear();
            vec![]
        }
        _ => vec![],
    }
}

fn handle_mouse(tui: &mut TuiState, mouse: &crossterm::event::MouseEvent) {
    match mouse.kind {
        MouseEventKind::ScrollUp => {
            tui.transcript
                .scroll_accumulator
                .accumulate(-(MOUSE_SCROLL_LINES as i32));
        }
        MouseEventKind::ScrollDown => {
            tui.transcript
                .scroll_accumulator
                .accumulate(MOUSE_SCROLL_LINES as i32);
        }
        _ => {}
    }
}

fn handle_key(app: &mut AppState, key: KeyEvent) -> Vec<UiEffect> {
    // Route to the active overlay first
    if let Some(overlay) = app.overlay.as_mut() {
        return match overlay.handle_key(&mut app.tui, key) {
            None => vec![],
            Some(OverlayAction::Close(effects)) => {
                app.overlay = None;
                effects
            }
            Some(OverlayAction::Effects(effects)) => effects,
        };
    }

    handle_main_key(app, key)
}

/// Handles main key input when no overlay is active.
fn handle_main_key(app: &mut AppState, key: KeyEvent) -> Vec<UiEffect> {
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);

    // Overlay opening touches both halves of the split state
    if ctrl && key.code == KeyCode::Char('o') {
        app.overlay = Some(Overlay::model_picker(&app.tui));
        return vec![];
    }

    let tui = &mut app.tui;

    match key.code {
        KeyCode::Enter => submit_input(tui),
        KeyCode::Char('c') if ctrl => {
            // Ctrl+C: clear input first, quit on empty
            if tui.input.is_empty() {
                vec![UiEffect::Quit]
            } else {
                tui.input.clear();
                vec![]
            }
        }
        KeyCode::Char('n') if ctrl => {
            new_chat(tui);
            vec![]
        }
        KeyCode::Char('b') if ctrl => {
            tui.sidebar_open = !tui.sidebar_open;
            vec![]
        }
        KeyCode::Char('y') if ctrl => copy_last_assistant(tui),
        KeyCode::Esc => {
            tui.input.clear();
            vec![]
        }
        KeyCode::Backspace => {
            tui.input.backspace();
            vec![]
        }
        KeyCode::Up => {
            tui.input.history_prev();
            vec![]
        }
        KeyCode::Down => {
            tui.input.history_next();
            vec![]
        }
        KeyCode::PageUp => {
            tui.transcript.page_up();
            vec![]
        }
        KeyCode::PageDown => {
            tui.transcript.page_down();
            vec![]
        }
        KeyCode::Home if ctrl => {
            tui.transcript.scroll.scroll_to_top();
            vec![]
        }
        KeyCode::End if ctrl => {
            tui.transcript.scroll.scroll_to_bottom();
            vec![]
        }
        KeyCode::Char(ch) if !ctrl => {
            tui.input.insert_char(ch);
            vec![]
        }
        _ => vec![],
    }
}

/// Validates and dispatches the current input.
///
/// Rejections (empty input, stream already active) leave all state untouched.
fn submit_input(tui: &mut TuiState) -> Vec<UiEffect> {
    let Ok(text) = tui.session.submit(tui.input.text()) else {
        return vec![];
    };

    tui.input.take_for_submit();
    tui.transcript.cells.push(HistoryCell::user(&text));
    tui.transcript.scroll.scroll_to_bottom();

    vec![UiEffect::StartTurn { text }]
}

/// Clears the conversation and starts a fresh chat.
///
/// Cancels any in-flight stream: dropping the receiver makes the turn task
/// exit on its next send.
fn new_chat(tui: &mut TuiState) {
    tui.remember_current_chat();
    tui.session.reset();
    tui.transcript.reset();
    tui.agent_state = AgentState::Idle;
}

/// Copies the most recent assistant message (streaming or committed).
fn copy_last_assistant(tui: &mut TuiState) -> Vec<UiEffect> {
    apply_pending_delta(tui);
    match tui.transcript.last_assistant() {
        Some(cell) => vec![UiEffect::CopyToClipboard {
            text: cell.raw_content().to_string(),
        }],
        None => vec![],
    }
}

// ============================================================================
// Turn Event Handlers
// ============================================================================

fn handle_turn_event(tui: &mut TuiState, event: TurnEvent) -> Vec<UiEffect> {
    match event {
        TurnEvent::Delta { text } => {
            tui.session.apply_delta(&text);

            match &mut tui.agent_state {
                AgentState::Waiting { .. } => {
                    // First fragment: create the streaming cell
                    let cell = HistoryCell::assistant_streaming("");
                    let cell_id = cell.id();
                    tui.transcript.cells.push(cell);

                    let old_state = std::mem::replace(&mut tui.agent_state, AgentState::Idle);
                    if let AgentState::Waiting { rx } = old_state {
                        tui.agent_state = AgentState::Streaming {
                            rx,
                            cell_id,
                            pending_delta: text,
                        };
                    }
                }
                AgentState::Streaming { pending_delta, .. } => {
                    pending_delta.push_str(&text);
                }
                AgentState::Idle => {
                    // Stale fragment after reset; session ignored it too
                }
            }
            vec![]
        }
        TurnEvent::Completed { .. } => {
            // Apply any buffered delta before finalizing so no content is
            // lost when Completed arrives in the same frame as a Delta.
            apply_pending_delta(tui);

            if let AgentState::Streaming { cell_id, .. } = &tui.agent_state
                && let Some(cell) = tui.transcript.cells.iter_mut().find(|c| c.id() == *cell_id)
            {
                cell.finalize_assistant();
            }

            if let Some(final_text) = tui.session.complete() {
                // Completion without any fragment still commits a message;
                // give it a cell so the transcript matches the conversation.
                if !matches!(tui.agent_state, AgentState::Streaming { .. }) {
                    tui.transcript.cells.push(HistoryCell::assistant(final_text));
                }
            }

            tui.agent_state = AgentState::Idle;
            vec![]
        }
        TurnEvent::Failed { kind, message } => {
            // Partial output is discarded, not committed
            if let AgentState::Streaming { cell_id, .. } = &tui.agent_state {
                let cell_id = *cell_id;
                tui.transcript.cells.retain(|c| c.id() != cell_id);
            }
            tui.session.fail();

            tracing::warn!("Turn failed ({}): {}", kind, message);
            tui.transcript
                .cells
                .push(HistoryCell::system(format!("Error: {}", message)));

            tui.agent_state = AgentState::Idle;
            vec![]
        }
    }
}

/// Applies any pending delta to the streaming cell (coalescing).
pub fn apply_pending_delta(tui: &mut TuiState) {
    if let AgentState::Streaming {
        cell_id,
        pending_delta,
        ..
    } = &mut tui.agent_state
        && !pending_delta.is_empty()
    {
        if let Some(cell) = tui.transcript.cells.iter_mut().find(|c| c.id() == *cell_id) {
            cell.append_assistant_delta(pending_delta);
        }
        pending_delta.clear();
    }
}

/// Applies any accumulated scroll delta from mouse events.
///
/// Called once per frame so rapid trackpad events coalesce into one scroll.
pub fn apply_scroll_delta(tui: &mut TuiState) {
    let delta = tui.transcript.scroll_accumulator.take_delta();
    if delta == 0 {
        return;
    }

    let lines = delta.unsigned_abs() as usize;
    if delta < 0 {
        tui.transcript.scroll_up(lines);
    } else {
        tui.transcript.scroll_down(lines);
    }
}
