//! User input state.
//!
//! A single-line text buffer with grapheme-aware editing and ↑/↓ history
//! navigation over previously submitted messages.

use unicode_segmentation::UnicodeSegmentation;

/// User input state.
#[derive(Debug, Default)]
pub struct InputState {
    /// Current input text.
    text: String,

    /// Submission history for ↑/↓ navigation.
    pub history: Vec<String>,

    /// Current position in history (None = not navigating).
    history_index: Option<usize>,

    /// Draft text saved when navigation starts.
    draft: Option<String>,
}

impl InputState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    pub fn insert_char(&mut self, ch: char) {
        self.text.push(ch);
        self.history_index = None;
    }

    pub fn insert_str(&mut self, s: &str) {
        self.text.push_str(s);
        self.history_index = None;
    }

    /// Removes the last grapheme cluster.
    pub fn backspace(&mut self) {
        if let Some((offset, _)) = self.text.grapheme_indices(true).next_back() {
            self.text.truncate(offset);
        }
        self.history_index = None;
    }

    pub fn clear(&mut self) {
        self.text.clear();
        self.history_index = None;
        self.draft = None;
    }

    /// Takes the current text, records it in history, and clears the field.
    pub fn take_for_submit(&mut self) -> String {
        let text = std::mem::take(&mut self.text);
        if !text.trim().is_empty() {
            self.history.push(text.clone());
        }
        self.history_index = None;
        self.draft = None;
        text
    }

    /// Steps back through history (↑).
    pub fn history_prev(&mut self) {
        if self.history.is_empty() {
            return;
        }
        let next_index = match self.history_index {
            None => {
                self.draft = Some(std::mem::take(&mut self.text));
                self.history.len() - 1
            }
            Some(0) => 0,
            Some(i) => i - 1,
        };
        self.history_index = Some(next_index);
        self.text = self.history[next_index].clone();
    }

    /// Steps forward through history (↓), restoring the draft at the end.
    pub fn history_next(&mut self) {
        let Some(index) = self.history_index else {
            return;
        };
        if index + 1 < self.history.len() {
            self.history_index = Some(index + 1);
            self.text = self.history[index + 1].clone();
        } else {
            self.history_index = None;
            self.text = self.draft.take().unwrap_or_default();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backspace_removes_whole_grapheme() {
        let mut input = InputState::new();
        input.insert_str("hi👨‍👩‍👧");
        input.backspace();
        assert_eq!(input.text(), "hi");
    }

    #[test]
    fn test_take_for_submit_records_history() {
        let mut input = InputState::new();
        input.insert_str("hello");

        let taken = input.take_for_submit();

        assert_eq!(taken, "hello");
        assert!(input.is_empty());
        assert_eq!(input.history, vec!["hello"]);
    }

    #[test]
    fn test_history_navigation_round_trip() {
        let mut input = InputState::new();
        input.insert_str("one");
        input.take_for_submit();
        input.insert_str("two");
        input.take_for_submit();

        input.insert_str("draft");
        input.history_prev();
        assert_eq!(input.text(), "two");
        input.history_prev();
        assert_eq!(input.text(), "one");
        input.history_prev();
        assert_eq!(input.text(), "one"); // clamped at oldest

        input.history_next();
        assert_eq!(input.text(), "two");
        input.history_next();
        assert_eq!(input.text(), "draft"); // draft restored
    }

    #[test]
    fn test_whitespace_only_submit_not_recorded() {
        let mut input = InputState::new();
        input.insert_str("   ");
        input.take_for_submit();
        assert!(input.history.is_empty());
    }
}
