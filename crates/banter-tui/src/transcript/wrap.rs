//! Width-aware wrapping for transcript cells.
//!
//! Wrapping happens at display time for the current terminal width. A small
//! cache keyed by (cell, width, content length) avoids re-wrapping unchanged
//! cells on every frame; the content length component invalidates entries
//! while a cell is still streaming.

use std::cell::RefCell;
use std::collections::HashMap;

use unicode_width::UnicodeWidthStr;

use super::cell::CellId;
use super::style::{Style, StyledLine, StyledSpan};

/// Cache for wrapped lines to avoid re-computing on every frame.
#[derive(Debug, Default)]
pub struct WrapCache {
    /// Maps (cell_id, width, content_len) -> cached styled lines
    cache: RefCell<HashMap<(CellId, usize, usize), Vec<StyledLine>>>,
}

impl WrapCache {
    pub fn new() -> Self {
        Self {
            cache: RefCell::new(HashMap::new()),
        }
    }

    /// Clears all cached entries.
    ///
    /// Call this on terminal resize to invalidate width-dependent caches.
    pub fn clear(&self) {
        self.cache.borrow_mut().clear();
    }

    pub(crate) fn get(
        &self,
        cell_id: CellId,
        width: usize,
        content_len: usize,
    ) -> Option<Vec<StyledLine>> {
        self.cache
            .borrow()
            .get(&(cell_id, width, content_len))
            .cloned()
    }

    pub(crate) fn insert(
        &self,
        cell_id: CellId,
        width: usize,
        content_len: usize,
        lines: Vec<StyledLine>,
    ) {
        self.cache
            .borrow_mut()
            .insert((cell_id, width, content_len), lines);
    }
}

/// Renders content with a prefix, handling line wrapping.
///
/// The prefix appears on the first line; wrapped continuation lines are
/// indented to align with the content start, or repeat the prefix when
/// `repeat_prefix` is set (used for the user message gutter).
pub(crate) fn render_prefixed_content(
    prefix: &str,
    content: &str,
    width: usize,
    prefix_style: Style,
    content_style: Style,
    repeat_prefix: bool,
) -> Vec<StyledLine> {
    let mut lines = Vec::new();
    let prefix_display_width = prefix.width();

    // Minimum usable width
    let min_width = prefix_display_width + 10;
    let effective_width = width.max(min_width);
    let content_width = effective_width.saturating_sub(prefix_display_width);

    for paragraph in content.split('\n') {
        if paragraph.is_empty() {
            let line_prefix = if repeat_prefix || lines.is_empty() {
                StyledSpan {
                    text: prefix.to_string(),
                    style: prefix_style,
                }
            } else {
                StyledSpan {
                    text: " ".repeat(prefix_display_width),
                    style: Style::Plain,
                }
            };
            lines.push(StyledLine {
                spans: vec![line_prefix],
            });
            continue;
        }

        for wrapped_line in wrap_text(paragraph, content_width) {
            let mut spans = Vec::new();

            if repeat_prefix || lines.is_empty() {
                spans.push(StyledSpan {
                    text: prefix.to_string(),
                    style: prefix_style,
                });
            } else {
                spans.push(StyledSpan {
                    text: " ".repeat(prefix_display_width),
                    style: Style::Plain,
                });
            }

            spans.push(StyledSpan {
                text: wrapped_line,
                style: content_style,
            });

            lines.push(StyledLine { spans });
        }
    }

    if lines.is_empty() {
        lines.push(StyledLine {
            spans: vec![StyledSpan {
                text: prefix.to_string(),
                style: prefix_style,
            }],
        });
    }

    lines
}

/// Wraps text to fit within the given display width.
///
/// Uses unicode display width so CJK (double-width), emoji, and zero-width
/// characters land on the right columns. No hyphenation.
pub(crate) fn wrap_text(text: &str, width: usize) -> Vec<String> {
    if width == 0 {
        return vec![text.to_string()];
    }

    let mut lines = Vec::new();
    let mut current_line = String::new();
    let mut current_width: usize = 0;

    for word in text.split_whitespace() {
        let word_width = word.width();

        if current_line.is_empty() {
            if word_width > width {
                let mut broken = wrap_chars(word, width);
                if let Some(last) = broken.pop() {
                    lines.extend(broken);
                    current_width = last.width();
                    current_line = last;
                }
            } else {
                current_line = word.to_string();
                current_width = word_width;
            }
        } else if current_width + 1 + word_width <= width {
            current_line.push(' ');
            current_line.push_str(word);
            current_width += 1 + word_width;
        } else {
            lines.push(std::mem::take(&mut current_line));
            if word_width > width {
                let mut broken = wrap_chars(word, width);
                if let Some(last) = broken.pop() {
                    lines.extend(broken);
                    current_width = last.width();
                    current_line = last;
                }
            } else {
                current_line = word.to_string();
                current_width = word_width;
            }
        }
    }

    if !current_line.is_empty() {
        lines.push(current_line);
    }

    if lines.is_empty() {
        lines.push(String::new());
    }

    lines
}

/// Breaks a string into parts that fit within the given display width.
///
/// Used for hard wrapping (code, long words) where exact width matters more
/// than word boundaries. Breaks at character boundaries.
pub(crate) fn wrap_chars(text: &str, width: usize) -> Vec<String> {
    use unicode_width::UnicodeWidthChar;

    let mut parts = Vec::new();
    let mut current = String::new();
    let mut current_width: usize = 0;

    for ch in text.chars() {
        let ch_width = ch.width().unwrap_or(0);

        // Zero-width characters stay with the current part
        if ch_width == 0 {
            current.push(ch);
            continue;
        }

        if current_width + ch_width > width && !current.is_empty() {
            parts.push(current);
            current = String::new();
            current_width = 0;
        }

        current.push(ch);
        current_width += ch_width;
    }

    if !current.is_empty() {
        parts.push(current);
    }

    if parts.is_empty() {
        parts.push(String::new());
    }

    parts
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wrap_text_basic() {
        let wrapped = wrap_text("hello world", 20);
        assert_eq!(wrapped, vec!["hello world"]);
    }

    #[test]
    fn test_wrap_text_split() {
        let wrapped = wrap_text("hello world", 8);
        assert_eq!(wrapped, vec!["hello", "world"]);
    }

    #[test]
    fn test_wrap_text_long_word() {
        let wrapped = wrap_text("supercalifragilistic", 10);
        assert_eq!(wrapped, vec!["supercalif", "ragilistic"]);
    }

    #[test]
    fn test_wrap_text_cjk_double_width() {
        // 4 CJK characters, 8 display columns
        let wrapped = wrap_text("你好世界", 6);
        assert_eq!(wrapped.len(), 2);
        assert_eq!(wrapped[0], "你好世");
        assert_eq!(wrapped[1], "界");
    }

    #[test]
    fn test_wrap_chars_cjk() {
        let parts = wrap_chars("你好世界很长", 4);
        assert_eq!(parts.len(), 3);
        assert_eq!(parts[0], "你好");
        assert_eq!(parts[1], "世界");
        assert_eq!(parts[2], "很长");
    }

    #[test]
    fn test_render_prefixed_content_repeats_gutter() {
        let lines =
            render_prefixed_content("| ", "one\ntwo", 40, Style::UserPrefix, Style::User, true);
        assert_eq!(lines.len(), 2);
        assert!(
            lines
                .iter()
                .all(|l| l.spans.first().is_some_and(|s| s.text == "| "))
        );
    }

    #[test]
    fn test_render_prefixed_content_indents_continuation() {
        let lines = render_prefixed_content(
            "> ",
            "a long quoted sentence that definitely wraps",
            16,
            Style::QuoteMarker,
            Style::BlockQuote,
            false,
        );
        assert!(lines.len() > 1);
        assert_eq!(lines[0].spans[0].text, "> ");
        assert_eq!(lines[1].spans[0].text, "  ");
    }
}
