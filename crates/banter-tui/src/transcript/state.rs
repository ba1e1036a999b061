//! Transcript display state.
//!
//! Manages the cell list, scroll position, viewport dimensions, and the
//! wrap cache for the transcript area.

use banter_core::session::{Conversation, Role};

use super::cell::HistoryCell;
use super::wrap::WrapCache;

/// How close to the bottom (in lines) the view must be for scrolling down to
/// re-engage follow mode. Terminal analog of a pixel proximity threshold.
pub const NEAR_BOTTOM_LINES: usize = 3;

/// Scroll mode for the transcript.
#[derive(Debug, Clone)]
pub enum ScrollMode {
    /// Auto-scroll to show latest content (bottom of transcript).
    FollowLatest,
    /// User scrolled manually; offset is line index from top.
    Anchored { offset: usize },
}

/// Scroll state for the transcript pane.
///
/// Encapsulates scroll mode, cached line count, and all scroll navigation
/// logic. This keeps scroll math in one place and simplifies the reducer.
#[derive(Debug, Clone)]
pub struct ScrollState {
    /// Current scroll mode (follow latest or anchored at offset).
    pub mode: ScrollMode,
    /// Cached total line count from last render (for scroll calculations).
    pub cached_line_count: usize,
}

impl Default for ScrollState {
    fn default() -> Self {
        Self {
            mode: ScrollMode::FollowLatest,
            cached_line_count: 0,
        }
    }
}

impl ScrollState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true if currently following output (auto-scroll engaged).
    pub fn is_following(&self) -> bool {
        matches!(self.mode, ScrollMode::FollowLatest)
    }

    /// Returns the current scroll offset for rendering.
    ///
    /// In FollowLatest mode, calculates the offset that shows the bottom of
    /// the content. In Anchored mode, returns the stored offset clamped to
    /// the valid range.
    pub fn get_offset(&self, viewport_height: usize) -> usize {
        match &self.mode {
            ScrollMode::FollowLatest => self.cached_line_count.saturating_sub(viewport_height),
            ScrollMode::Anchored { offset } => {
                let max_offset = self.cached_line_count.saturating_sub(viewport_height);
                (*offset).min(max_offset)
            }
        }
    }

    /// Scrolls up by the given number of lines, disengaging follow mode.
    pub fn scroll_up(&mut self, lines: usize, viewport_height: usize) {
        let current_offset = self.get_offset(viewport_height);
        let new_offset = current_offset.saturating_sub(lines);
        self.mode = ScrollMode::Anchored { offset: new_offset };
    }

    /// Scrolls down by the given number of lines.
    ///
    /// Re-engages follow mode when the view lands within
    /// [`NEAR_BOTTOM_LINES`] of the bottom.
    pub fn scroll_down(&mut self, lines: usize, viewport_height: usize) {
        if matches!(self.mode, ScrollMode::FollowLatest) {
            return; // Already at bottom
        }

        let current_offset = self.get_offset(viewport_height);
        let max_offset = self.cached_line_count.saturating_sub(viewport_height);
        let new_offset = (current_offset + lines).min(max_offset);

        if new_offset + NEAR_BOTTOM_LINES >= max_offset {
            self.mode = ScrollMode::FollowLatest;
        } else {
            self.mode = ScrollMode::Anchored { offset: new_offset };
        }
    }

    /// Scrolls to the top of the transcript.
    pub fn scroll_to_top(&mut self) {
        self.mode = ScrollMode::Anchored { offset: 0 };
    }

    /// Scrolls to the bottom of the transcript (enables follow mode).
    pub fn scroll_to_bottom(&mut self) {
        self.mode = ScrollMode::FollowLatest;
    }

    /// Scrolls up by one page.
    pub fn page_up(&mut self, viewport_height: usize) {
        self.scroll_up(viewport_height.max(1), viewport_height);
    }

    /// Scrolls down by one page.
    pub fn page_down(&mut self, viewport_height: usize) {
        self.scroll_down(viewport_height.max(1), viewport_height);
    }

    /// Updates the cached line count.
    ///
    /// Call this after rendering to keep scroll calculations accurate.
    pub fn update_line_count(&mut self, line_count: usize) {
        self.cached_line_count = line_count;
    }

    /// Resets scroll state to follow mode (e.g., after clearing the chat).
    pub fn reset(&mut self) {
        self.mode = ScrollMode::FollowLatest;
        self.cached_line_count = 0;
    }
}

/// Accumulator for mouse scroll deltas.
///
/// Coalesces rapid scroll events (especially from trackpads) into a single
/// scroll operation per frame.
///
/// Convention: positive delta = scroll down, negative delta = scroll up.
#[derive(Debug, Clone, Default)]
pub struct ScrollAccumulator {
    pending_delta: i32,
}

impl ScrollAccumulator {
    /// Accumulates a scroll delta.
    pub fn accumulate(&mut self, delta: i32) {
        self.pending_delta += delta;
    }

    /// Takes the accumulated delta, resetting it to zero.
    pub fn take_delta(&mut self) -> i32 {
        std::mem::take(&mut self.pending_delta)
    }

    #[cfg(test)]
    pub fn peek_delta(&self) -> i32 {
        self.pending_delta
    }
}

/// Transcript display state: cells, scroll, layout, wrap cache.
#[derive(Debug)]
pub struct TranscriptState {
    /// Transcript cells (in-memory display).
    pub cells: Vec<HistoryCell>,

    /// Scroll state (mode, cached line count).
    pub scroll: ScrollState,

    /// Accumulator for mouse scroll deltas (coalesced once per frame).
    pub scroll_accumulator: ScrollAccumulator,

    /// Cache for wrapped line rendering.
    pub wrap_cache: WrapCache,

    /// Available height for the transcript viewport.
    pub viewport_height: usize,

    /// Current terminal dimensions (width, height).
    pub terminal_size: (u16, u16),
}

impl Default for TranscriptState {
    fn default() -> Self {
        Self {
            cells: Vec::new(),
            scroll: ScrollState::default(),
            scroll_accumulator: ScrollAccumulator::default(),
            wrap_cache: WrapCache::new(),
            viewport_height: 20,
            terminal_size: (80, 24),
        }
    }
}

impl TranscriptState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resets the transcript to an empty state (new chat).
    ///
    /// Clears cells, scroll, and wrap cache. Keeps viewport/terminal size.
    pub fn reset(&mut self) {
        self.cells.clear();
        self.scroll.reset();
        self.wrap_cache.clear();
    }

    pub fn scroll_up(&mut self, lines: usize) {
        self.scroll.scroll_up(lines, self.viewport_height);
    }

    pub fn scroll_down(&mut self, lines: usize) {
        self.scroll.scroll_down(lines, self.viewport_height);
    }

    pub fn page_up(&mut self) {
        self.scroll.page_up(self.viewport_height);
    }

    pub fn page_down(&mut self) {
        self.scroll.page_down(self.viewport_height);
    }

    /// Updates layout dimensions based on terminal size and input height.
    pub fn update_layout(&mut self, terminal_size: (u16, u16), viewport_height: usize) {
        self.terminal_size = terminal_size;
        self.viewport_height = viewport_height;
    }

    /// The most recent assistant cell, streaming or committed.
    pub fn last_assistant(&self) -> Option<&HistoryCell> {
        self.cells
            .iter()
            .rev()
            .find(|c| matches!(c, HistoryCell::Assistant { .. }))
    }
}

/// Builds transcript cells from a committed conversation.
///
/// Deterministic mapping used when rebuilding the display wholesale; the
/// in-flight streaming cell is appended by the reducer, not here.
pub fn build_cells(conversation: &Conversation) -> Vec<HistoryCell> {
    conversation
        .messages()
        .iter()
        .map(|message| match message.role {
            Role::User => HistoryCell::user(&message.content),
            Role::Assistant => HistoryCell::assistant(&message.content),
        })
        .collect()
}
