/// Stable identifier for one transcript entry.
///
/// Never reused within a controller lifetime, including across resets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MessageId(pub u64);

impl MessageId {
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }
}

/// Chat speaker role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Role {
    User,
    Bot,
}

/// What a transcript entry currently renders.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MessageBody {
    /// Three-dot indicator shown until the first answer chunk arrives.
    Typing,
    /// Display text. For bot entries this is already formatted.
    Text(String),
    /// Literal error shown in place of an answer.
    Error(String),
}

impl MessageBody {
    pub fn text(&self) -> Option<&str> {
        match self {
            Self::Text(text) | Self::Error(text) => Some(text),
            Self::Typing => None,
        }
    }

    pub fn is_typing(&self) -> bool {
        matches!(self, Self::Typing)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub id: MessageId,
    pub role: Role,
    pub body: MessageBody,
}

impl Message {
    pub fn new(id: MessageId, role: Role, body: MessageBody) -> Self {
        Self { id, role, body }
    }

    pub fn user(id: MessageId, text: impl Into<String>) -> Self {
        Self::new(id, Role::User, MessageBody::Text(text.into()))
    }

    /// Creates the bot placeholder shown while waiting for the answer.
    pub fn bot_typing(id: MessageId) -> Self {
        Self::new(id, Role::Bot, MessageBody::Typing)
    }
}

/// Ordered history of the current session. Append-only between resets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transcript {
    messages: Vec<Message>,
    next_message_id: u64,
}

impl Default for Transcript {
    fn default() -> Self {
        Self::new()
    }
}

impl Transcript {
    pub fn new() -> Self {
        Self {
            messages: Vec::new(),
            next_message_id: 1,
        }
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

    pub fn get(&self, id: MessageId) -> Option<&Message> {
        self.messages.iter().find(|message| message.id == id)
    }

    /// Appends a new entry and returns a copy of it.
    pub fn push(&mut self, role: Role, body: MessageBody) -> Message {
        let message = Message::new(self.alloc_message_id(), role, body);
        self.messages.push(message.clone());
        message
    }

    /// Replaces the body of an existing entry. Returns false when the entry
    /// is gone, e.g. after a reset.
    pub fn update(&mut self, id: MessageId, body: MessageBody) -> bool {
        match self.messages.iter_mut().find(|message| message.id == id) {
            Some(message) => {
                message.body = body;
                true
            }
            None => false,
        }
    }

    pub fn clear(&mut self) {
        self.messages.clear();
    }

    fn alloc_message_id(&mut self) -> MessageId {
        let id = MessageId::new(self.next_message_id);
        self.next_message_id = self.next_message_id.saturating_add(1);
        id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_keep_growing_across_clear() {
        let mut transcript = Transcript::new();
        let first = transcript.push(Role::User, MessageBody::Text("a".to_string()));
        transcript.clear();
        let second = transcript.push(Role::User, MessageBody::Text("b".to_string()));

        assert!(second.id > first.id);
        assert_eq!(transcript.len(), 1);
    }

    #[test]
    fn update_after_clear_is_dropped() {
        let mut transcript = Transcript::new();
        let placeholder = transcript.push(Role::Bot, MessageBody::Typing);
        transcript.clear();

        assert!(!transcript.update(placeholder.id, MessageBody::Text("late".to_string())));
        assert!(transcript.is_empty());
    }

    #[test]
    fn update_replaces_body_in_place() {
        let mut transcript = Transcript::new();
        transcript.push(Role::User, MessageBody::Text("question".to_string()));
        let placeholder = transcript.push(Role::Bot, MessageBody::Typing);

        assert!(transcript.update(placeholder.id, MessageBody::Text("réponse".to_string())));
        assert_eq!(
            transcript.get(placeholder.id).map(|message| &message.body),
            Some(&MessageBody::Text("réponse".to_string()))
        );
        assert_eq!(transcript.messages()[0].role, Role::User);
    }
}
