//! Markdown parsing and rendering for assistant responses.
//!
//! - `render_markdown()`: parse markdown text into styled lines
//! - `wrap_styled_spans()`: wrap styled spans while preserving styles across
//!   line breaks
//!
//! Uses pulldown-cmark for parsing. Plain text renders as-is.

mod parse;
mod wrap;

pub use parse::render_markdown;
pub use wrap::{WrapOptions, wrap_styled_spans};
