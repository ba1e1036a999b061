//! Model selection overlay.
//!
//! Lists the fixed set of model tags with their descriptions. Enter applies
//! the selection to the session and persists it to config; Esc dismisses.

use banter_core::session::ModelId;
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph};

use super::OverlayAction;
use crate::effects::UiEffect;
use crate::state::TuiState;

pub struct ModelPickerState {
    selected: usize,
}

impl ModelPickerState {
    pub fn new(current: ModelId) -> Self {
        let selected = ModelId::ALL
            .iter()
            .position(|m| *m == current)
            .unwrap_or(0);
        Self { selected }
    }

    pub fn handle_key(&mut self, tui: &mut TuiState, key: KeyEvent) -> Option<OverlayAction> {
        match key.code {
            KeyCode::Up | KeyCode::Char('k') => {
                self.selected = self.selected.saturating_sub(1);
                None
            }
            KeyCode::Down | KeyCode::Char('j') => {
                self.selected = (self.selected + 1).min(ModelId::ALL.len() - 1);
                None
            }
            KeyCode::Enter => {
                let model = ModelId::ALL[self.selected];
                tui.session.set_model(model);
                Some(OverlayAction::Close(vec![UiEffect::PersistModel { model }]))
            }
            KeyCode::Esc => Some(OverlayAction::Close(vec![])),
            _ => None,
        }
    }

    pub fn render(&self, frame: &mut Frame, area: Rect) {
        let width = 46.min(area.width);
        // Two rows per entry plus borders and title row
        let height = (ModelId::ALL.len() as u16 * 2 + 3).min(area.height);
        let popup = Rect {
            x: area.x + (area.width.saturating_sub(width)) / 2,
            y: area.y + (area.height.saturating_sub(height)) / 2,
            width,
            height,
        };

        frame.render_widget(Clear, popup);

        let mut lines: Vec<Line> = vec![Line::from(Span::styled(
            "Select a model",
            Style::default().fg(Color::DarkGray),
        ))];
        for (i, model) in ModelId::ALL.iter().enumerate() {
            let marker = if i == self.selected { "› " } else { "  " };
            let name_style = if i == self.selected {
                Style::default()
                    .fg(Color::Cyan)
                    .add_modifier(Modifier::BOLD)
            } else {
                Style::default()
            };
            lines.push(Line::from(vec![
                Span::raw(marker),
                Span::styled(model.tag(), name_style),
            ]));
            lines.push(Line::from(Span::styled(
                format!("    {}", model.description()),
                Style::default().fg(Color::DarkGray),
            )));
        }

        let block = Block::default()
            .borders(Borders::ALL)
            .title(" Model ")
            .border_style(Style::default().fg(Color::DarkGray));
        frame.render_widget(Paragraph::new(lines).block(block), popup);
    }
}
