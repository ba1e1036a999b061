//! Stream-body fixture helpers for integration tests.
//!
//! Builds the backend's `data: `-line response bodies.

#![allow(dead_code)]

use wiremock::ResponseTemplate;

/// Builds a stream body delivering the given content fragments.
pub fn chat_stream_body(fragments: &[&str]) -> String {
    let mut body = String::new();
    for fragment in fragments {
        body.push_str(&format!(
            "data: {{\"content\": \"{}\"}}\n\n",
            escape_json(fragment)
        ));
    }
    body
}

/// Builds a stream body that fails mid-stream after some fragments.
pub fn chat_stream_body_with_error(fragments: &[&str], error: &str) -> String {
    let mut body = chat_stream_body(fragments);
    body.push_str(&format!("data: {{\"error\": \"{}\"}}\n\n", escape_json(error)));
    body
}

/// Wraps a stream body in a ResponseTemplate.
pub fn stream_response(body: &str) -> ResponseTemplate {
    ResponseTemplate::new(200)
        .insert_header("content-type", "text/event-stream")
        .set_body_string(body.to_string())
}

/// Convenience: fragment list wrapped in a ResponseTemplate.
pub fn text_response(fragments: &[&str]) -> ResponseTemplate {
    stream_response(&chat_stream_body(fragments))
}

/// Escape special characters for JSON string embedding.
fn escape_json(s: &str) -> String {
    s.replace('\\', "\\\\")
        .replace('"', "\\\"")
        .replace('\n', "\\n")
        .replace('\r', "\\r")
        .replace('\t', "\\t")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chat_stream_body_one_line_per_fragment() {
        let body = chat_stream_body(&["Hel", "lo"]);
        assert_eq!(body.matches("data: ").count(), 2);
        assert!(body.contains(r#"{"content": "Hel"}"#));
    }

    #[test]
    fn test_escape_json_handles_quotes_and_newlines() {
        assert_eq!(escape_json(r#"say "hi""#), r#"say \"hi\""#);
        assert_eq!(escape_json("a\nb"), r"a\nb");
    }

    #[test]
    fn test_error_body_ends_with_error_line() {
        let body = chat_stream_body_with_error(&["x"], "boom");
        assert!(body.ends_with("data: {\"error\": \"boom\"}\n\n"));
    }
}
