use serde::{Deserialize, Serialize};

use super::ids::{ContextId, MessageId, UserId};

/// Why a message was sent; drives the label shown next to it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageKind {
    #[default]
    General,
    Inquiry,
    Application,
    System,
}

impl MessageKind {
    /// Returns a display label for the kind, or None for plain messages.
    pub fn display_label(&self) -> Option<&'static str> {
        match self {
            MessageKind::General => None,
            MessageKind::Inquiry => Some("[Inquiry]"),
            MessageKind::Application => Some("[Application]"),
            MessageKind::System => Some("[System]"),
        }
    }
}

/// A persisted message row. Everything except `read_at` is immutable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub id: MessageId,
    #[serde(default)]
    pub context_id: Option<ContextId>,
    pub sender_id: UserId,
    pub recipient_id: UserId,
    pub text: String,
    #[serde(default)]
    pub kind: MessageKind,
    pub created_at_ms: i64,
    #[serde(default)]
    pub read_at_ms: Option<i64>,
}

impl Message {
    pub fn is_read(&self) -> bool {
        self.read_at_ms.is_some()
    }

    /// Sets `read_at` once. Returns false when it was already set.
    pub fn mark_read(&mut self, now_ms: i64) -> bool {
        if self.read_at_ms.is_some() {
            return false;
        }
        self.read_at_ms = Some(now_ms);
        true
    }

    pub fn is_from(&self, user: &UserId) -> bool {
        &self.sender_id == user
    }

    /// Unread from the point of view of `viewer`: addressed to them and not yet read.
    pub fn is_unread_for(&self, viewer: &UserId) -> bool {
        &self.recipient_id == viewer && self.read_at_ms.is_none()
    }

    /// The other participant, or None when `viewer` is not (exactly one of) the pair.
    pub fn counterpart(&self, viewer: &UserId) -> Option<&UserId> {
        if self.sender_id == self.recipient_id {
            return None;
        }

        if &self.sender_id == viewer {
            Some(&self.recipient_id)
        } else if &self.recipient_id == viewer {
            Some(&self.sender_id)
        } else {
            None
        }
    }

    /// Returns the display content: kind label + text, or just text for plain messages.
    pub fn display_content(&self) -> String {
        match (self.kind.display_label(), self.text.is_empty()) {
            (Some(label), true) => label.to_owned(),
            (Some(label), false) => format!("{} {}", label, self.text),
            (None, _) => self.text.clone(),
        }
    }
}

/// A message as submitted by the sender, before the store assigns an id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewMessage {
    pub context_id: Option<ContextId>,
    pub sender_id: UserId,
    pub recipient_id: UserId,
    pub text: String,
    pub kind: MessageKind,
    pub created_at_ms: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn msg(sender: &str, recipient: &str) -> Message {
        Message {
            id: MessageId::new(1),
            context_id: None,
            sender_id: UserId::new(sender),
            recipient_id: UserId::new(recipient),
            text: "hi".to_owned(),
            kind: MessageKind::General,
            created_at_ms: 1_000,
            read_at_ms: None,
        }
    }

    #[test]
    fn mark_read_sets_timestamp_exactly_once() {
        let mut message = msg("a", "b");

        assert!(message.mark_read(5_000));
        assert!(!message.mark_read(9_000));
        assert_eq!(message.read_at_ms, Some(5_000));
    }

    #[test]
    fn counterpart_is_the_other_participant() {
        let message = msg("a", "b");

        assert_eq!(message.counterpart(&UserId::new("a")), Some(&UserId::new("b")));
        assert_eq!(message.counterpart(&UserId::new("b")), Some(&UserId::new("a")));
        assert_eq!(message.counterpart(&UserId::new("c")), None);
    }

    #[test]
    fn self_addressed_message_has_no_counterpart() {
        let message = msg("a", "a");

        assert_eq!(message.counterpart(&UserId::new("a")), None);
    }

    #[test]
    fn own_messages_are_never_unread_for_sender() {
        let message = msg("a", "b");

        assert!(!message.is_unread_for(&UserId::new("a")));
        assert!(message.is_unread_for(&UserId::new("b")));
    }

    #[test]
    fn display_content_prefixes_kind_label() {
        let mut message = msg("a", "b");
        message.kind = MessageKind::Inquiry;

        assert_eq!(message.display_content(), "[Inquiry] hi");

        message.text.clear();
        assert_eq!(message.display_content(), "[Inquiry]");
    }

    #[test]
    fn kind_deserializes_from_lowercase_names() {
        let kind: MessageKind = toml::Value::String("application".to_owned())
            .try_into()
            .expect("kind should parse");

        assert_eq!(kind, MessageKind::Application);
    }
}
