//! Style-preserving wrapping for markdown spans.

use unicode_width::UnicodeWidthStr;

use crate::transcript::{Style, StyledLine, StyledSpan};

/// Options for wrapping styled spans with hanging indents.
#[derive(Debug, Clone, Default)]
pub struct WrapOptions {
    /// Maximum display width for lines.
    pub width: usize,
    /// Prefix spans for the first line (e.g., "- " for list bullet).
    pub first_prefix: Vec<StyledSpan>,
    /// Prefix spans for continuation lines (e.g., "  " for alignment).
    pub rest_prefix: Vec<StyledSpan>,
}

impl WrapOptions {
    /// Creates wrap options with just a width (no prefixes).
    pub fn new(width: usize) -> Self {
        Self {
            width,
            first_prefix: vec![],
            rest_prefix: vec![],
        }
    }
}

/// Calculates the display width of a slice of styled spans.
fn spans_display_width(spans: &[StyledSpan]) -> usize {
    spans.iter().map(|s| s.text.width()).sum()
}

/// Context for wrapping operations.
struct WrapContext<'a> {
    /// Completed lines.
    lines: Vec<StyledLine>,
    /// Spans for the current line being built.
    current_line_spans: Vec<StyledSpan>,
    /// Display width of current line content.
    current_line_width: usize,
    /// Whether we're on the first line.
    is_first_line: bool,
    /// Available width for continuation lines.
    rest_width: usize,
    first_prefix: &'a [StyledSpan],
    rest_prefix: &'a [StyledSpan],
}

impl<'a> WrapContext<'a> {
    fn new(opts: &'a WrapOptions, content_width_rest: usize) -> Self {
        Self {
            lines: Vec::new(),
            current_line_spans: Vec::new(),
            current_line_width: 0,
            is_first_line: true,
            rest_width: content_width_rest,
            first_prefix: &opts.first_prefix,
            rest_prefix: &opts.rest_prefix,
        }
    }

    /// Flush the current line to the lines vec.
    fn flush_line(&mut self) {
        let prefix = if self.is_first_line {
            self.first_prefix.to_vec()
        } else {
            self.rest_prefix.to_vec()
        };

        let mut final_spans = prefix;
        final_spans.append(&mut self.current_line_spans);
        self.lines.push(StyledLine { spans: final_spans });
        self.is_first_line = false;
    }

    /// Get current available width based on line position.
    fn current_avail(&self, first_line_width: usize) -> usize {
        if self.is_first_line {
            first_line_width
        } else {
            self.rest_width
        }
    }
}

/// Breaks a styled span into character-by-width fragments.
fn break_span_by_width(span: &StyledSpan, max_width: usize) -> Vec<StyledSpan> {
    use unicode_width::UnicodeWidthChar;

    let mut parts = Vec::new();
    let mut current = String::new();
    let mut current_width: usize = 0;

    for ch in span.text.chars() {
        let ch_width = ch.width().unwrap_or(0);

        if ch_width == 0 {
            current.push(ch);
            continue;
        }

        if current_width + ch_width > max_width && !current.is_empty() {
            parts.push(StyledSpan {
                text: std::mem::take(&mut current),
                style: span.style,
            });
            current_width = 0;
        }

        current.push(ch);
        current_width += ch_width;
    }

    if !current.is_empty() {
        parts.push(StyledSpan {
            text: current,
            style: span.style,
        });
    }

    if parts.is_empty() {
        parts.push(StyledSpan {
            text: String::new(),
            style: span.style,
        });
    }

    parts
}

/// Wraps styled spans while preserving styles across line breaks.
///
/// - Wraps at word boundaries for normal text
/// - Preserves whitespace for inline code
/// - Handles hanging indents via `WrapOptions`
pub fn wrap_styled_spans(spans: &[StyledSpan], opts: &WrapOptions) -> Vec<StyledLine> {
    if opts.width == 0 || spans.is_empty() {
        // Degenerate case: just return spans as a single line
        let mut all_spans = opts.first_prefix.clone();
        all_spans.extend(spans.iter().cloned());
        return vec![StyledLine { spans: all_spans }];
    }

    let first_prefix_width = spans_display_width(&opts.first_prefix);
    let rest_prefix_width = spans_display_width(&opts.rest_prefix);

    let content_width_first = opts.width.saturating_sub(first_prefix_width);
    let content_width_rest = opts.width.saturating_sub(rest_prefix_width);

    let mut ctx = WrapContext::new(opts, content_width_rest);

    for span in spans {
        // Hard breaks (newlines in span text) force line flushes
        if span.text.contains('\n') {
            for (i, part) in span.text.split('\n').enumerate() {
                if i > 0 {
                    ctx.flush_line();
                    ctx.current_line_width = 0;
                }

                if !part.is_empty() {
                    let part_span = StyledSpan {
                        text: part.to_string(),
                        style: span.style,
                    };
                    process_span(&part_span, &mut ctx, content_width_first);
                }
            }
            continue;
        }

        process_span(span, &mut ctx, content_width_first);
    }

    if !ctx.current_line_spans.is_empty() {
        ctx.flush_line();
    }

    if ctx.lines.is_empty() {
        ctx.lines.push(StyledLine {
            spans: opts.first_prefix.clone(),
        });
    }

    ctx.lines
}

fn process_span(span: &StyledSpan, ctx: &mut WrapContext, first_line_width: usize) {
    let is_code = matches!(span.style, Style::CodeInline | Style::CodeBlock);

    if is_code {
        process_code_span(span, ctx, first_line_width);
    } else {
        process_text_span(span, ctx, first_line_width);
    }
}

/// Process a code span (preserve whitespace, break by character).
fn process_code_span(span: &StyledSpan, ctx: &mut WrapContext, first_line_width: usize) {
    let span_width = span.text.width();
    let available_width = ctx.current_avail(first_line_width);

    if ctx.current_line_width + span_width <= available_width {
        ctx.current_line_spans.push(span.clone());
        ctx.current_line_width += span_width;
    } else if span_width <= ctx.rest_width && ctx.current_line_width > 0 {
        // Doesn't fit but would fit on a fresh line
        ctx.flush_line();
        ctx.current_line_width = 0;
        ctx.current_line_spans.push(span.clone());
        ctx.current_line_width = span_width;
    } else {
        let remaining_width = available_width.saturating_sub(ctx.current_line_width);
        let fragments = break_span_by_width(span, remaining_width.max(1));

        for (i, frag) in fragments.into_iter().enumerate() {
            let frag_width = frag.text.width();
            let current_avail = ctx.current_avail(first_line_width);

            if i > 0 && ctx.current_line_width + frag_width > current_avail {
                ctx.flush_line();
                ctx.current_line_width = 0;
            }

            if !frag.text.is_empty() {
                ctx.current_line_spans.push(frag.clone());
                ctx.current_line_width += frag_width;
            }
        }
    }
}

/// Process a normal text span (word boundaries, collapse whitespace).
fn process_text_span(span: &StyledSpan, ctx: &mut WrapContext, first_line_width: usize) {
    let has_leading_space = span.text.starts_with(|c: char| c.is_whitespace());
    let has_trailing_space = span.text.ends_with(|c: char| c.is_whitespace());

    let words: Vec<&str> = span.text.split_whitespace().collect();

    if words.is_empty() {
        // Only whitespace - add a single space if we have content
        if !ctx.current_line_spans.is_empty() {
            let space_span = StyledSpan {
                text: " ".to_string(),
                style: span.style,
            };
            let current_avail = ctx.current_avail(first_line_width);
            if ctx.current_line_width < current_avail {
                ctx.current_line_spans.push(space_span);
                ctx.current_line_width += 1;
            }
        }
        return;
    }

    if has_leading_space && !ctx.current_line_spans.is_empty() {
        let current_avail = ctx.current_avail(first_line_width);
        if ctx.current_line_width < current_avail {
            ctx.current_line_spans.push(StyledSpan {
                text: " ".to_string(),
                style: span.style,
            });
            ctx.current_line_width += 1;
        }
    }

    for (i, word) in words.iter().enumerate() {
        let word_width = word.width();
        let current_avail = ctx.current_avail(first_line_width);

        if i > 0 {
            if ctx.current_line_width + 1 + word_width <= current_avail {
                ctx.current_line_spans.push(StyledSpan {
                    text: " ".to_string(),
                    style: span.style,
                });
                ctx.current_line_width += 1;
            } else {
                ctx.flush_line();
                ctx.current_line_width = 0;
            }
        }

        let current_avail = ctx.current_avail(first_line_width);

        if word_width <= current_avail.saturating_sub(ctx.current_line_width) {
            ctx.current_line_spans.push(StyledSpan {
                text: (*word).to_string(),
                style: span.style,
            });
            ctx.current_line_width += word_width;
        } else if word_width <= ctx.rest_width && ctx.current_line_width > 0 {
            ctx.flush_line();
            ctx.current_line_width = 0;
            ctx.current_line_spans.push(StyledSpan {
                text: (*word).to_string(),
                style: span.style,
            });
            ctx.current_line_width = word_width;
        } else {
            // Word is too long, break it
            if ctx.current_line_width > 0 {
                ctx.flush_line();
                ctx.current_line_width = 0;
            }

            let word_span = StyledSpan {
                text: (*word).to_string(),
                style: span.style,
            };
            let break_width = ctx.current_avail(first_line_width);
            let fragments = break_span_by_width(&word_span, break_width);

            for frag in fragments {
                let frag_width = frag.text.width();
                let current_avail = ctx.current_avail(first_line_width);
                if ctx.current_line_width + frag_width > current_avail && ctx.current_line_width > 0
                {
                    ctx.flush_line();
                    ctx.current_line_width = 0;
                }
                if !frag.text.is_empty() {
                    ctx.current_line_spans.push(frag);
                    ctx.current_line_width += frag_width;
                }
            }
        }
    }

    if has_trailing_space {
        let current_avail = ctx.current_avail(first_line_width);
        if ctx.current_line_width < current_avail {
            ctx.current_line_spans.push(StyledSpan {
                text: " ".to_string(),
                style: span.style,
            });
            ctx.current_line_width += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wrap_styled_spans_basic() {
        let spans = vec![StyledSpan {
            text: "hello world".to_string(),
            style: Style::Assistant,
        }];
        let opts = WrapOptions::new(20);
        let lines = wrap_styled_spans(&spans, &opts);

        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].text(), "hello world");
        assert!(lines[0].spans.iter().all(|s| s.style == Style::Assistant));
    }

    #[test]
    fn test_wrap_styled_spans_split() {
        let spans = vec![StyledSpan {
            text: "hello world".to_string(),
            style: Style::Assistant,
        }];
        let opts = WrapOptions::new(8);
        let lines = wrap_styled_spans(&spans, &opts);

        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0].spans[0].text, "hello");
        assert_eq!(lines[1].spans[0].text, "world");
    }

    #[test]
    fn test_wrap_styled_spans_mid_span_break_keeps_style() {
        let spans = vec![
            StyledSpan {
                text: "hello ".to_string(),
                style: Style::Assistant,
            },
            StyledSpan {
                text: "world".to_string(),
                style: Style::Strong,
            },
        ];
        let opts = WrapOptions::new(8);
        let lines = wrap_styled_spans(&spans, &opts);

        assert_eq!(lines.len(), 2);
        let last_line = &lines[1];
        assert!(last_line.spans.iter().any(|s| s.style == Style::Strong));
    }

    #[test]
    fn test_wrap_styled_spans_inline_code_whitespace() {
        // Inline code should preserve spaces
        let spans = vec![StyledSpan {
            text: "foo  bar".to_string(),
            style: Style::CodeInline,
        }];
        let opts = WrapOptions::new(20);
        let lines = wrap_styled_spans(&spans, &opts);

        assert_eq!(lines[0].spans[0].text, "foo  bar");
    }

    #[test]
    fn test_wrap_styled_spans_hard_break() {
        let spans = vec![StyledSpan {
            text: "line1\nline2".to_string(),
            style: Style::Assistant,
        }];
        let opts = WrapOptions::new(20);
        let lines = wrap_styled_spans(&spans, &opts);

        assert_eq!(lines.len(), 2);
    }

    #[test]
    fn test_wrap_styled_spans_hanging_indent() {
        let spans = vec![StyledSpan {
            text: "this is a longer text that should wrap".to_string(),
            style: Style::Assistant,
        }];
        let opts = WrapOptions {
            width: 20,
            first_prefix: vec![StyledSpan {
                text: "• ".to_string(),
                style: Style::ListBullet,
            }],
            rest_prefix: vec![StyledSpan {
                text: "  ".to_string(),
                style: Style::Plain,
            }],
        };
        let lines = wrap_styled_spans(&spans, &opts);

        assert_eq!(lines[0].spans[0].text, "• ");
        if lines.len() > 1 {
            assert_eq!(lines[1].spans[0].text, "  ");
        }
    }
}
