//! Conversation and stream state owned by a UI session.
//!
//! `ChatSession` is the single explicit state struct passed through the
//! controller: it owns the committed conversation, the in-flight stream
//! accumulator, and the selected model. It performs no I/O, so submit /
//! commit / discard semantics are unit-testable without a UI host.

use std::fmt;

/// Who authored a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    User,
    Assistant,
}

/// A committed chat message. Immutable once appended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub role: Role,
    pub content: String,
}

impl Message {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

/// Ordered, append-only sequence of messages for the current chat.
#[derive(Debug, Clone, Default)]
pub struct Conversation {
    messages: Vec<Message>,
}

impl Conversation {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, message: Message) {
        self.messages.push(message);
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// Replaces the conversation with an empty sequence.
    pub fn clear(&mut self) {
        self.messages.clear();
    }
}

/// Accumulator for the in-flight assistant turn.
///
/// Exactly one StreamState may be active at a time; the open assistant
/// message lives here, not in the conversation, until finalized.
#[derive(Debug, Clone, Default)]
pub struct StreamState {
    accumulated: String,
    active: bool,
}

impl StreamState {
    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn accumulated(&self) -> &str {
        &self.accumulated
    }

    fn open(&mut self) {
        self.accumulated.clear();
        self.active = true;
    }

    fn append(&mut self, fragment: &str) {
        if self.active {
            self.accumulated.push_str(fragment);
        }
    }

    /// Closes the stream, returning the accumulated text.
    fn close(&mut self) -> String {
        self.active = false;
        std::mem::take(&mut self.accumulated)
    }
}

/// Fixed set of model tags the backend accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ModelId {
    /// Deeper reasoning, slower responses.
    O3Mini,
    /// Faster, more concise responses.
    #[default]
    Gpt4oMini,
}

impl ModelId {
    pub const ALL: [ModelId; 2] = [ModelId::O3Mini, ModelId::Gpt4oMini];

    /// The opaque tag sent to the backend.
    pub fn tag(self) -> &'static str {
        match self {
            ModelId::O3Mini => "o3-mini",
            ModelId::Gpt4oMini => "gpt-4o-mini",
        }
    }

    /// Short description shown in the model picker.
    pub fn description(self) -> &'static str {
        match self {
            ModelId::O3Mini => "Most capable model, better at complex tasks",
            ModelId::Gpt4oMini => "Faster responses, more concise",
        }
    }

    /// Parses a config/CLI tag, if recognized.
    pub fn from_tag(tag: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|m| m.tag() == tag)
    }
}

impl fmt::Display for ModelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.tag())
    }
}

/// Why a submission was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitError {
    /// Input was empty after trimming.
    Empty,
    /// A stream is already active; submission is disabled until it ends.
    Busy,
}

impl fmt::Display for SubmitError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SubmitError::Empty => write!(f, "message is empty"),
            SubmitError::Busy => write!(f, "a response is still streaming"),
        }
    }
}

impl std::error::Error for SubmitError {}

/// Session state for one chat surface: conversation + stream + model.
#[derive(Debug, Clone, Default)]
pub struct ChatSession {
    conversation: Conversation,
    stream: StreamState,
    model: ModelId,
}

impl ChatSession {
    pub fn new(model: ModelId) -> Self {
        Self {
            conversation: Conversation::new(),
            stream: StreamState::default(),
            model,
        }
    }

    pub fn conversation(&self) -> &Conversation {
        &self.conversation
    }

    pub fn model(&self) -> ModelId {
        self.model
    }

    /// Changes the model for subsequent requests. Messages already sent are
    /// unaffected.
    pub fn set_model(&mut self, model: ModelId) {
        self.model = model;
    }

    pub fn is_streaming(&self) -> bool {
        self.stream.is_active()
    }

    /// The in-flight partial text, if a stream is active.
    pub fn streaming_text(&self) -> Option<&str> {
        self.stream.is_active().then(|| self.stream.accumulated())
    }

    /// Validates and records a submission.
    ///
    /// Appends exactly one user message and opens the stream state. Returns
    /// the trimmed text for the caller to dispatch.
    pub fn submit(&mut self, text: &str) -> Result<String, SubmitError> {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return Err(SubmitError::Empty);
        }
        if self.stream.is_active() {
            return Err(SubmitError::Busy);
        }

        self.conversation.push(Message::user(trimmed));
        self.stream.open();
        Ok(trimmed.to_string())
    }

    /// Appends a fragment to the accumulator. No-op when idle.
    pub fn apply_delta(&mut self, fragment: &str) {
        self.stream.append(fragment);
    }

    /// Commits the accumulator as an assistant message and returns it.
    ///
    /// Returns None when no stream was active.
    pub fn complete(&mut self) -> Option<String> {
        if !self.stream.is_active() {
            return None;
        }
        let text = self.stream.close();
        self.conversation.push(Message::assistant(text.clone()));
        Some(text)
    }

    /// Discards the accumulator without appending anything.
    pub fn fail(&mut self) {
        self.stream.close();
    }

    /// Clears the conversation and cancels any in-flight stream.
    ///
    /// The accumulator is discarded; callers must also drop their turn-event
    /// receiver so the producer task winds down.
    pub fn reset(&mut self) {
        self.conversation.clear();
        self.stream.close();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_submit_appends_exactly_one_user_message() {
        let mut session = ChatSession::default();

        let sent = session.submit("  hello there  ").unwrap();

        assert_eq!(sent, "hello there");
        assert_eq!(session.conversation().len(), 1);
        assert_eq!(session.conversation().messages()[0].role, Role::User);
        assert_eq!(session.conversation().messages()[0].content, "hello there");
        assert!(session.is_streaming());
    }

    #[test]
    fn test_submit_rejects_empty_input() {
        let mut session = ChatSession::default();

        assert_eq!(session.submit("   "), Err(SubmitError::Empty));
        assert!(session.conversation().is_empty());
        assert!(!session.is_streaming());
    }

    #[test]
    fn test_submit_rejected_while_streaming() {
        let mut session = ChatSession::default();
        session.submit("first").unwrap();

        assert_eq!(session.submit("second"), Err(SubmitError::Busy));
        // Conversation unchanged by the rejected submit
        assert_eq!(session.conversation().len(), 1);
    }

    #[test]
    fn test_fragments_accumulate_and_commit_in_order() {
        let mut session = ChatSession::default();
        session.submit("hi").unwrap();

        let mut partials = Vec::new();
        for fragment in ["Hel", "lo, ", "world"] {
            session.apply_delta(fragment);
            partials.push(session.streaming_text().unwrap().to_string());
        }

        assert_eq!(partials, vec!["Hel", "Hello, ", "Hello, world"]);

        let final_text = session.complete().unwrap();
        assert_eq!(final_text, "Hello, world");
        assert!(!session.is_streaming());

        let messages = session.conversation().messages();
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[1].role, Role::Assistant);
        assert_eq!(messages[1].content, "Hello, world");
    }

    #[test]
    fn test_failure_discards_partial_accumulation() {
        let mut session = ChatSession::default();
        session.submit("hi").unwrap();
        session.apply_delta("Hel");

        session.fail();

        assert!(!session.is_streaming());
        // No assistant message was appended
        assert_eq!(session.conversation().len(), 1);
        assert_eq!(session.conversation().messages()[0].role, Role::User);
    }

    #[test]
    fn test_apply_delta_is_noop_when_idle() {
        let mut session = ChatSession::default();
        session.apply_delta("ghost");
        assert_eq!(session.streaming_text(), None);
        assert!(session.complete().is_none());
        assert!(session.conversation().is_empty());
    }

    #[test]
    fn test_reset_clears_conversation_and_is_idempotent() {
        let mut session = ChatSession::default();
        session.submit("one").unwrap();
        session.apply_delta("reply");
        session.complete();
        session.submit("two").unwrap();
        session.complete();
        assert_eq!(session.conversation().len(), 4);

        session.reset();
        assert_eq!(session.conversation().len(), 0);

        session.reset();
        assert_eq!(session.conversation().len(), 0);
    }

    #[test]
    fn test_reset_cancels_in_flight_stream() {
        let mut session = ChatSession::default();
        session.submit("hi").unwrap();
        session.apply_delta("partial");

        session.reset();

        assert!(!session.is_streaming());
        assert!(session.conversation().is_empty());
        // Late fragments from the dying task are ignored
        session.apply_delta("stale");
        assert_eq!(session.streaming_text(), None);
    }

    #[test]
    fn test_set_model_does_not_touch_messages() {
        let mut session = ChatSession::new(ModelId::Gpt4oMini);
        session.submit("hi").unwrap();
        session.complete();

        session.set_model(ModelId::O3Mini);

        assert_eq!(session.model(), ModelId::O3Mini);
        assert_eq!(session.conversation().len(), 2);
    }

    #[test]
    fn test_model_tag_round_trip() {
        for model in ModelId::ALL {
            assert_eq!(ModelId::from_tag(model.tag()), Some(model));
        }
        assert_eq!(ModelId::from_tag("gpt-5"), None);
    }
}
