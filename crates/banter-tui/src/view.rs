//! Pure view/render functions for the TUI.
//!
//! Functions here take state by immutable reference, draw to a ratatui
//! Frame, and never mutate state or return effects. The reducer calls the
//! layout helpers so scroll math and rendering agree on dimensions.

use ratatui::Frame;
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Position, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph};
use unicode_width::UnicodeWidthStr;

use crate::state::{AgentState, AppState, TuiState};
use crate::transcript::{Style as TranscriptStyle, StyledLine};

/// Height of the status line below the input.
const STATUS_HEIGHT: u16 = 1;

/// Height of the bordered input field.
const INPUT_HEIGHT: u16 = 3;

/// Horizontal margin for the transcript area (left and right).
pub const TRANSCRIPT_MARGIN: u16 = 1;

/// Width of the sidebar panel when open.
const SIDEBAR_WIDTH: u16 = 26;

/// Spinner frames for status line animation.
const SPINNER_FRAMES: &[&str] = &["◐", "◓", "◑", "◒"];

/// Spinner speed divisor (render frames per spinner frame).
const SPINNER_SPEED_DIVISOR: usize = 6;

/// Renders the entire TUI to the frame.
pub fn render(app: &AppState, frame: &mut Frame) {
    let area = frame.area();
    let state = &app.tui;

    let main_area = if state.sidebar_open {
        let chunks = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Length(SIDEBAR_WIDTH), Constraint::Min(1)])
            .split(area);
        render_sidebar(state, frame, chunks[0]);
        chunks[1]
    } else {
        area
    };

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(1),                // Transcript
            Constraint::Length(INPUT_HEIGHT),  // Input
            Constraint::Length(STATUS_HEIGHT), // Status line
        ])
        .split(main_area);

    render_transcript(state, frame, chunks[0]);
    render_input(state, frame, chunks[1]);
    render_status_line(state, frame, chunks[2]);

    // Overlay renders last, on top
    if let Some(overlay) = &app.overlay {
        overlay.render(frame, area);
    }
}

// ============================================================================
// Layout helpers shared with the reducer
// ============================================================================

/// Available height for the transcript viewport.
pub fn calculate_transcript_height(terminal_height: u16) -> usize {
    terminal_height.saturating_sub(INPUT_HEIGHT + STATUS_HEIGHT) as usize
}

/// Content width available to transcript cells for the given terminal width.
pub fn transcript_content_width(state: &TuiState, terminal_width: u16) -> usize {
    let main_width = if state.sidebar_open {
        terminal_width.saturating_sub(SIDEBAR_WIDTH)
    } else {
        terminal_width
    };
    main_width.saturating_sub(TRANSCRIPT_MARGIN * 2) as usize
}

/// Total display line count for the current transcript.
///
/// Must agree with what `render_transcript` draws: each cell's wrapped lines
/// plus one blank separator, plus the pending indicator while waiting.
pub fn count_transcript_lines(state: &TuiState, content_width: usize) -> usize {
    let mut total = 0;
    for cell in &state.transcript.cells {
        total += cell
            .display_lines_cached(content_width, &state.transcript.wrap_cache)
            .len()
            + 1;
    }
    if matches!(state.agent_state, AgentState::Waiting { .. }) {
        total += 1;
    }
    total
}

// ============================================================================
// Transcript
// ============================================================================

fn render_transcript(state: &TuiState, frame: &mut Frame, area: Rect) {
    let content_width = area.width.saturating_sub(TRANSCRIPT_MARGIN * 2) as usize;
    let viewport_height = area.height as usize;

    let mut all_lines: Vec<Line<'static>> = Vec::new();
    for cell in &state.transcript.cells {
        let styled_lines = cell.display_lines_cached(content_width, &state.transcript.wrap_cache);
        for styled_line in styled_lines {
            all_lines.push(convert_styled_line(styled_line));
        }
        all_lines.push(Line::default());
    }

    // Pending indicator: request sent, no fragment yet
    if matches!(state.agent_state, AgentState::Waiting { .. }) {
        let spinner = spinner_frame(state.spinner_frame);
        all_lines.push(Line::from(vec![
            Span::styled(spinner, Style::default().fg(Color::Yellow)),
            Span::styled(" Thinking...", Style::default().fg(Color::DarkGray)),
        ]));
    }

    let total_lines = all_lines.len();
    let scroll_offset = state.transcript.scroll.get_offset(viewport_height);
    let visible_end = (scroll_offset + viewport_height).min(total_lines);
    let content_lines: Vec<Line<'static>> = all_lines
        .into_iter()
        .skip(scroll_offset)
        .take(visible_end.saturating_sub(scroll_offset))
        .collect();

    // Bottom-align: pad at the top when content doesn't fill the viewport
    let visible_lines: Vec<Line<'static>> = if content_lines.len() < viewport_height {
        let padding_count = viewport_height - content_lines.len();
        let mut padded = vec![Line::default(); padding_count];
        padded.extend(content_lines);
        padded
    } else {
        content_lines
    };

    // No .wrap() here: content is pre-wrapped to the content width
    let transcript = Paragraph::new(visible_lines).block(Block::default().borders(Borders::NONE));
    let transcript_area = Rect {
        x: area.x + TRANSCRIPT_MARGIN,
        y: area.y,
        width: area.width.saturating_sub(TRANSCRIPT_MARGIN * 2),
        height: area.height,
    };
    frame.render_widget(transcript, transcript_area);
}

// ============================================================================
// Input
// ============================================================================

fn render_input(state: &TuiState, frame: &mut Frame, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray))
        .title(format!(" {} ", state.session.model().tag()));

    let inner_width = area.width.saturating_sub(2) as usize;
    let text = state.input.text();

    // Show the tail when the text is wider than the field
    let visible: String = if text.width() > inner_width.saturating_sub(1) {
        let mut tail: Vec<char> = Vec::new();
        let mut width = 0;
        for ch in text.chars().rev() {
            let ch_width = unicode_width::UnicodeWidthChar::width(ch).unwrap_or(0);
            if width + ch_width > inner_width.saturating_sub(1) {
                break;
            }
            width += ch_width;
            tail.push(ch);
        }
        tail.into_iter().rev().collect()
    } else {
        text.to_string()
    };

    let cursor_x = area.x + 1 + visible.width() as u16;
    let paragraph = Paragraph::new(visible).block(block);
    frame.render_widget(paragraph, area);
    frame.set_cursor_position(Position::new(cursor_x.min(area.right().saturating_sub(2)), area.y + 1));
}

// ============================================================================
// Status line
// ============================================================================

fn spinner_frame(frame_counter: usize) -> &'static str {
    SPINNER_FRAMES[(frame_counter / SPINNER_SPEED_DIVISOR) % SPINNER_FRAMES.len()]
}

fn render_status_line(state: &TuiState, frame: &mut Frame, area: Rect) {
    let spinner = spinner_frame(state.spinner_frame);

    let spans: Vec<Span> = match &state.agent_state {
        AgentState::Idle => {
            vec![
                Span::styled("Enter", Style::default().fg(Color::DarkGray)),
                Span::raw(" send  "),
                Span::styled("^O", Style::default().fg(Color::DarkGray)),
                Span::raw(" model  "),
                Span::styled("^B", Style::default().fg(Color::DarkGray)),
                Span::raw(" sidebar  "),
                Span::styled("^N", Style::default().fg(Color::DarkGray)),
                Span::raw(" new  "),
                Span::styled("^Y", Style::default().fg(Color::DarkGray)),
                Span::raw(" copy  "),
                Span::styled("^C", Style::default().fg(Color::DarkGray)),
                Span::raw(" quit"),
            ]
        }
        AgentState::Waiting { .. } => {
            vec![
                Span::styled(spinner, Style::default().fg(Color::Yellow)),
                Span::raw(" "),
                Span::styled("Thinking...", Style::default().fg(Color::Yellow)),
            ]
        }
        AgentState::Streaming { .. } => {
            vec![
                Span::styled(spinner, Style::default().fg(Color::Cyan)),
                Span::raw(" "),
                Span::styled("Streaming...", Style::default().fg(Color::Cyan)),
            ]
        }
    };

    let status = Paragraph::new(Line::from(spans)).alignment(Alignment::Left);
    frame.render_widget(status, area);
}

// ============================================================================
// Sidebar
// ============================================================================

fn render_sidebar(state: &TuiState, frame: &mut Frame, area: Rect) {
    let mut lines: Vec<Line> = vec![
        Line::from(Span::styled(
            "banter",
            Style::default().add_modifier(Modifier::BOLD),
        )),
        Line::default(),
        Line::from(vec![
            Span::raw("New Chat  "),
            Span::styled("Ctrl+N", Style::default().fg(Color::DarkGray)),
        ]),
        Line::default(),
        Line::from(Span::styled(
            "Previous chats",
            Style::default().fg(Color::DarkGray),
        )),
    ];

    if state.past_chats.is_empty() {
        lines.push(Line::from(Span::styled(
            "  (none this session)",
            Style::default().fg(Color::DarkGray),
        )));
    } else {
        for chat in state.past_chats.iter().rev() {
            lines.push(Line::from(vec![
                Span::raw("  "),
                Span::raw(chat.title.clone()),
            ]));
        }
    }

    let block = Block::default()
        .borders(Borders::RIGHT)
        .border_style(Style::default().fg(Color::DarkGray));
    frame.render_widget(Paragraph::new(lines).block(block), area);
}

// ============================================================================
// Style conversion
// ============================================================================

/// Converts a transcript StyledLine to a ratatui Line.
fn convert_styled_line(styled_line: StyledLine) -> Line<'static> {
    let spans: Vec<Span<'static>> = styled_line
        .spans
        .into_iter()
        .map(|s| {
            let style = convert_style(s.style);
            Span::styled(s.text, style)
        })
        .collect();
    Line::from(spans)
}

/// Converts a transcript Style to a ratatui Style.
fn convert_style(style: TranscriptStyle) -> Style {
    match style {
        TranscriptStyle::Plain => Style::default(),
        TranscriptStyle::UserPrefix => Style::default()
            .fg(Color::Green)
            .add_modifier(Modifier::BOLD),
        TranscriptStyle::User => Style::default()
            .fg(Color::Green)
            .add_modifier(Modifier::ITALIC),
        TranscriptStyle::Assistant => Style::default().fg(Color::White),
        TranscriptStyle::StreamingCursor => Style::default()
            .fg(Color::Yellow)
            .add_modifier(Modifier::SLOW_BLINK),
        TranscriptStyle::System => Style::default().fg(Color::DarkGray),

        // Markdown styles
        TranscriptStyle::CodeInline => Style::default().fg(Color::Cyan),
        TranscriptStyle::CodeBlock => Style::default().fg(Color::Cyan),
        TranscriptStyle::CodeFence => Style::default().fg(Color::DarkGray),
        TranscriptStyle::Emphasis => Style::default().add_modifier(Modifier::ITALIC),
        TranscriptStyle::Strong => Style::default().add_modifier(Modifier::BOLD),
        TranscriptStyle::H1 => Style::default().add_modifier(Modifier::BOLD | Modifier::UNDERLINED),
        TranscriptStyle::H2 => Style::default().add_modifier(Modifier::BOLD),
        TranscriptStyle::H3 => Style::default()
            .add_modifier(Modifier::ITALIC)
            .fg(Color::White),
        TranscriptStyle::Link => Style::default()
            .fg(Color::Cyan)
            .add_modifier(Modifier::UNDERLINED),
        TranscriptStyle::BlockQuote => Style::default()
            .fg(Color::Green)
            .add_modifier(Modifier::ITALIC),
        TranscriptStyle::QuoteMarker => Style::default().fg(Color::DarkGray),
        TranscriptStyle::ListBullet => Style::default().fg(Color::Yellow),
        TranscriptStyle::ListNumber => Style::default().fg(Color::Yellow),
    }
}

#[cfg(test)]
mod tests {
    use banter_core::config::Config;

    use super::*;
    use crate::transcript::HistoryCell;

    #[test]
    fn test_count_matches_cells_plus_separators() {
        let mut state = TuiState::new(Config::default());
        state.transcript.cells.push(HistoryCell::user("one"));
        state.transcript.cells.push(HistoryCell::assistant("two"));

        // One line each at a wide width, plus a blank after each cell
        assert_eq!(count_transcript_lines(&state, 80), 4);
    }

    #[test]
    fn test_count_includes_pending_indicator() {
        let mut state = TuiState::new(Config::default());
        let (_tx, rx) = banter_core::turn::create_event_channel();
        state.agent_state = AgentState::Waiting { rx };

        assert_eq!(count_transcript_lines(&state, 80), 1);
    }

    #[test]
    fn test_content_width_accounts_for_sidebar() {
        let mut state = TuiState::new(Config::default());
        let without_sidebar = transcript_content_width(&state, 100);
        state.sidebar_open = true;
        let with_sidebar = transcript_content_width(&state, 100);

        assert_eq!(without_sidebar - with_sidebar, SIDEBAR_WIDTH as usize);
    }

    #[test]
    fn test_transcript_height_leaves_room_for_input_and_status() {
        assert_eq!(calculate_transcript_height(24), 20);
        assert_eq!(calculate_transcript_height(3), 0);
    }
}
