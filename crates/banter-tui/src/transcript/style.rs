//! Display styles for transcript lines.
//!
//! `Style` is a tagged variant over every node kind the renderer produces;
//! the view layer maps each variant to a concrete terminal style in one
//! place. Rendering never inspects content types at runtime.

/// Semantic style for a span of transcript text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Style {
    /// No styling.
    Plain,
    /// User message prefix ("| ").
    UserPrefix,
    /// User message content.
    User,
    /// Assistant message content.
    Assistant,
    /// Streaming cursor indicator.
    StreamingCursor,
    /// System/notice line content.
    System,

    // Markdown styles
    /// Inline code.
    CodeInline,
    /// Fenced code block content.
    CodeBlock,
    /// Code fence line (``` plus language).
    CodeFence,
    /// Emphasis (italic).
    Emphasis,
    /// Strong (bold).
    Strong,
    /// Level-1 heading.
    H1,
    /// Level-2 heading.
    H2,
    /// Level-3+ heading.
    H3,
    /// Hyperlink text.
    Link,
    /// Block quote content.
    BlockQuote,
    /// Block quote left border marker.
    QuoteMarker,
    /// Unordered list marker.
    ListBullet,
    /// Ordered list marker.
    ListNumber,
}

/// A styled fragment of one display line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StyledSpan {
    pub text: String,
    pub style: Style,
}

/// One display line composed of styled spans.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct StyledLine {
    pub spans: Vec<StyledSpan>,
}

impl StyledLine {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Concatenated text of all spans, styling stripped.
    pub fn text(&self) -> String {
        self.spans.iter().map(|s| s.text.as_str()).collect()
    }
}
