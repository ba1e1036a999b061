//! Transcript cells.
//!
//! Each cell is one logical block of the transcript: a user message, an
//! assistant response (streaming or final), or a system notice. Cells are
//! width-agnostic; wrapping happens at display time for the current
//! terminal width.

use std::sync::atomic::{AtomicU64, Ordering};

use chrono::{DateTime, Utc};

use super::style::{Style, StyledLine, StyledSpan};
use super::wrap::{WrapCache, render_prefixed_content};
use crate::markdown::render_markdown;

/// Global counter for generating unique cell IDs.
static CELL_ID_COUNTER: AtomicU64 = AtomicU64::new(1);

/// Unique identifier for a transcript cell.
///
/// IDs are monotonically increasing and unique within a process. Used for
/// streaming-cell addressing and wrap cache keying.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CellId(pub u64);

impl CellId {
    pub fn new() -> Self {
        CellId(CELL_ID_COUNTER.fetch_add(1, Ordering::Relaxed))
    }
}

impl Default for CellId {
    fn default() -> Self {
        Self::new()
    }
}

/// A logical unit in the transcript.
#[derive(Debug, Clone, PartialEq)]
pub enum HistoryCell {
    /// User input message.
    User {
        id: CellId,
        created_at: DateTime<Utc>,
        content: String,
    },

    /// Assistant response.
    ///
    /// During streaming, `content` accumulates deltas.
    /// `is_streaming` indicates if more content is expected.
    Assistant {
        id: CellId,
        created_at: DateTime<Utc>,
        content: String,
        is_streaming: bool,
    },

    /// System notice (e.g., a surfaced turn failure).
    System {
        id: CellId,
        created_at: DateTime<Utc>,
        content: String,
    },
}

impl HistoryCell {
    /// Returns the cell's unique ID.
    pub fn id(&self) -> CellId {
        match self {
            HistoryCell::User { id, .. }
            | HistoryCell::Assistant { id, .. }
            | HistoryCell::System { id, .. } => *id,
        }
    }

    /// Creates a new user cell.
    pub fn user(content: impl Into<String>) -> Self {
        HistoryCell::User {
            id: CellId::new(),
            created_at: Utc::now(),
            content: content.into(),
        }
    }

    /// Creates a new assistant cell (finalized, not streaming).
    pub fn assistant(content: impl Into<String>) -> Self {
        HistoryCell::Assistant {
            id: CellId::new(),
            created_at: Utc::now(),
            content: content.into(),
            is_streaming: false,
        }
    }

    /// Creates a new streaming assistant cell.
    pub fn assistant_streaming(content: impl Into<String>) -> Self {
        HistoryCell::Assistant {
            id: CellId::new(),
            created_at: Utc::now(),
            content: content.into(),
            is_streaming: true,
        }
    }

    /// Creates a system notice cell.
    pub fn system(content: impl Into<String>) -> Self {
        HistoryCell::System {
            id: CellId::new(),
            created_at: Utc::now(),
            content: content.into(),
        }
    }

    /// Raw source text of the cell (markdown for assistant cells).
    pub fn raw_content(&self) -> &str {
        match self {
            HistoryCell::User { content, .. }
            | HistoryCell::Assistant { content, .. }
            | HistoryCell::System { content, .. } => content,
        }
    }

    /// Appends text to an assistant cell's content.
    ///
    /// Panics if called on a non-assistant cell.
    pub fn append_assistant_delta(&mut self, delta: &str) {
        match self {
            HistoryCell::Assistant { content, .. } => {
                content.push_str(delta);
            }
            _ => panic!("append_assistant_delta called on non-assistant cell"),
        }
    }

    /// Marks an assistant cell as finalized (no longer streaming).
    ///
    /// Panics if called on a non-assistant cell.
    pub fn finalize_assistant(&mut self) {
        match self {
            HistoryCell::Assistant { is_streaming, .. } => {
                *is_streaming = false;
            }
            _ => panic!("finalize_assistant called on non-assistant cell"),
        }
    }

    /// Renders this cell into display lines for the given width.
    pub fn display_lines(&self, width: usize) -> Vec<StyledLine> {
        match self {
            HistoryCell::User { content, .. } => {
                render_prefixed_content("| ", content, width, Style::UserPrefix, Style::User, true)
            }
            HistoryCell::Assistant {
                content,
                is_streaming,
                ..
            } => {
                let mut lines = render_markdown(content, width);

                // Trailing cursor while more content is expected
                if *is_streaming
                    && !content.is_empty()
                    && let Some(last) = lines.last_mut()
                {
                    last.spans.push(StyledSpan {
                        text: "▌".to_string(),
                        style: Style::StreamingCursor,
                    });
                }
                lines
            }
            HistoryCell::System { content, .. } => {
                render_prefixed_content("· ", content, width, Style::System, Style::System, false)
            }
        }
    }

    /// Cached variant of [`display_lines`]; the content length keys cache
    /// invalidation while a cell is streaming.
    pub fn display_lines_cached(&self, width: usize, cache: &WrapCache) -> Vec<StyledLine> {
        let content_len = self.raw_content().len();
        if let Some(lines) = cache.get(self.id(), width, content_len) {
            return lines;
        }
        let lines = self.display_lines(width);
        cache.insert(self.id(), width, content_len, lines.clone());
        lines
    }
}
