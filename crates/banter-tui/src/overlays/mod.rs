//! Modal overlays.
//!
//! Overlays capture key input while open and render on top of the main
//! layout. The reducer routes keys to the active overlay first; an overlay
//! returns `OverlayAction::Close` to dismiss itself, optionally with effects
//! for the runtime.

mod model_picker;

use crossterm::event::KeyEvent;
use ratatui::Frame;
use ratatui::layout::Rect;

pub use model_picker::ModelPickerState;

use crate::effects::UiEffect;
use crate::state::TuiState;

/// Action returned from an overlay key handler.
pub enum OverlayAction {
    /// Close the overlay, then execute the effects.
    Close(Vec<UiEffect>),
    /// Keep the overlay open, execute the effects.
    Effects(Vec<UiEffect>),
}

/// The active modal overlay, if any.
pub enum Overlay {
    ModelPicker(ModelPickerState),
}

impl Overlay {
    /// Opens the model picker seeded with the current selection.
    pub fn model_picker(tui: &TuiState) -> Self {
        Overlay::ModelPicker(ModelPickerState::new(tui.session.model()))
    }

    /// Handles a key event. Returns None when the overlay consumed the key
    /// with no further action.
    pub fn handle_key(&mut self, tui: &mut TuiState, key: KeyEvent) -> Option<OverlayAction> {
        match self {
            Overlay::ModelPicker(picker) => picker.handle_key(tui, key),
        }
    }

    /// Renders the overlay on top of the main layout.
    pub fn render(&self, frame: &mut Frame, area: Rect) {
        match self {
            Overlay::ModelPicker(picker) => picker.render(frame, area),
        }
    }
}
