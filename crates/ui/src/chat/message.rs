/// Stable identifier for one transcript message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MessageId(pub u64);

impl MessageId {
    /// Creates a typed message identifier.
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }
}

/// Transcript speaker role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Role {
    User,
    System,
}

/// Lifecycle status for one message.
///
/// `Thinking` marks the transient placeholder appended while a query is in
/// flight; it is replaced in place, never left behind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageStatus {
    Thinking,
    Done,
}

/// One transcript entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatMessage {
    pub id: MessageId,
    pub role: Role,
    pub content: String,
    pub status: MessageStatus,
}

impl ChatMessage {
    pub fn new(
        id: MessageId,
        role: Role,
        content: impl Into<String>,
        status: MessageStatus,
    ) -> Self {
        Self {
            id,
            role,
            content: content.into(),
            status,
        }
    }

    /// True for replies that should render with alert styling.
    pub fn is_emergency_alert(&self) -> bool {
        self.role == Role::System && self.content.contains("EMERGENCY ALERT")
    }
}

/// Greeting shown on start and after a session reset.
pub const GREETING: &str =
    "Hi! I am your Skycast assistant. Ask me about weather conditions from anywhere!";

/// Canned reply for unexpected pipeline failures.
pub const ERROR_REPLY: &str =
    "Sorry, I encountered an error processing your request. Please try again.";

/// Ordered, growing message list with typed placeholder handling.
///
/// Messages are never mutated except for resolving the thinking placeholder;
/// the whole list resets only on an explicit new-session action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transcript {
    messages: Vec<ChatMessage>,
    next_id: u64,
}

impl Transcript {
    /// Creates a transcript seeded with the greeting message.
    pub fn with_greeting() -> Self {
        let mut transcript = Self {
            messages: Vec::new(),
            next_id: 1,
        };
        transcript.push_system(GREETING);
        transcript
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    pub fn push_user(&mut self, content: impl Into<String>) -> MessageId {
        self.push(Role::User, content, MessageStatus::Done)
    }

    pub fn push_system(&mut self, content: impl Into<String>) -> MessageId {
        self.push(Role::System, content, MessageStatus::Done)
    }

    /// Appends the transient placeholder shown while a query is in flight.
    pub fn push_thinking(&mut self) -> MessageId {
        self.push(Role::System, String::new(), MessageStatus::Thinking)
    }

    /// Replaces the placeholder content in place. Returns false when the id no
    /// longer names a thinking placeholder (e.g. after a session reset).
    pub fn resolve_thinking(&mut self, id: MessageId, content: impl Into<String>) -> bool {
        let Some(message) = self
            .messages
            .iter_mut()
            .find(|message| message.id == id && message.status == MessageStatus::Thinking)
        else {
            return false;
        };

        message.content = content.into();
        message.status = MessageStatus::Done;
        true
    }

    /// Clears the transcript back to the greeting.
    pub fn reset(&mut self) {
        self.messages.clear();
        self.push_system(GREETING);
    }

    fn push(
        &mut self,
        role: Role,
        content: impl Into<String>,
        status: MessageStatus,
    ) -> MessageId {
        let id = MessageId::new(self.next_id);
        self.next_id = self.next_id.saturating_add(1);
        self.messages.push(ChatMessage::new(id, role, content, status));
        id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_with_the_greeting() {
        let transcript = Transcript::with_greeting();
        assert_eq!(transcript.messages().len(), 1);
        assert_eq!(transcript.messages()[0].content, GREETING);
        assert_eq!(transcript.messages()[0].role, Role::System);
    }

    #[test]
    fn thinking_placeholder_is_replaced_in_place() {
        let mut transcript = Transcript::with_greeting();
        transcript.push_user("flood near Chennai?");
        let placeholder = transcript.push_thinking();
        assert_eq!(transcript.messages().len(), 3);

        assert!(transcript.resolve_thinking(placeholder, "Flood warning issued."));
        assert_eq!(transcript.messages().len(), 3);

        let resolved = &transcript.messages()[2];
        assert_eq!(resolved.content, "Flood warning issued.");
        assert_eq!(resolved.status, MessageStatus::Done);
    }

    #[test]
    fn resolving_twice_or_after_reset_is_a_no_op() {
        let mut transcript = Transcript::with_greeting();
        let placeholder = transcript.push_thinking();
        assert!(transcript.resolve_thinking(placeholder, "done"));
        assert!(!transcript.resolve_thinking(placeholder, "again"));

        let mut transcript = Transcript::with_greeting();
        let placeholder = transcript.push_thinking();
        transcript.reset();
        assert!(!transcript.resolve_thinking(placeholder, "stale"));
        assert_eq!(transcript.messages().len(), 1);
    }

    #[test]
    fn message_ids_keep_growing_across_resets() {
        let mut transcript = Transcript::with_greeting();
        let before = transcript.push_user("one");
        transcript.reset();
        let after = transcript.push_user("two");
        assert!(after > before);
    }

    #[test]
    fn emergency_alert_detection_is_system_only() {
        let system = ChatMessage::new(
            MessageId::new(1),
            Role::System,
            "EMERGENCY ALERT: flooding",
            MessageStatus::Done,
        );
        let user = ChatMessage::new(
            MessageId::new(2),
            Role::User,
            "EMERGENCY ALERT: flooding",
            MessageStatus::Done,
        );
        assert!(system.is_emergency_alert());
        assert!(!user.is_emergency_alert());
    }
}
