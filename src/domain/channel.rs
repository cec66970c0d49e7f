use std::fmt;

use super::{
    ids::{context_key, ContextId},
    message::Message,
    presence::PresenceRecord,
    typing::TypingIndicator,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ChannelKind {
    Messages,
    Typing,
    Presence,
}

impl ChannelKind {
    pub fn as_label(self) -> &'static str {
        match self {
            Self::Messages => "messages",
            Self::Typing => "typing",
            Self::Presence => "presence",
        }
    }
}

/// Identity used to deduplicate push subscriptions: one live channel per value.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ChannelIdentity {
    pub kind: ChannelKind,
    pub context_id: Option<ContextId>,
}

impl ChannelIdentity {
    pub fn new(kind: ChannelKind, context_id: Option<ContextId>) -> Self {
        Self { kind, context_id }
    }

    /// Transport-level channel name, e.g. `typing:listing-42`.
    pub fn channel_key(&self) -> String {
        format!(
            "{}:{}",
            self.kind.as_label(),
            context_key(self.context_id.as_ref())
        )
    }
}

impl fmt::Display for ChannelIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.channel_key())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChangeKind {
    Insert,
    Update,
}

/// Server-side filter attached to a channel when it is opened.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventFilter {
    pub kind: ChannelKind,
    pub context_id: Option<ContextId>,
    pub changes: Vec<ChangeKind>,
}

impl EventFilter {
    pub fn for_identity(identity: &ChannelIdentity, changes: &[ChangeKind]) -> Self {
        Self {
            kind: identity.kind,
            context_id: identity.context_id.clone(),
            changes: changes.to_vec(),
        }
    }

    /// Presence rows are user-scoped, so presence filters ignore the context.
    pub fn matches(&self, event: &ChannelEvent) -> bool {
        if event.channel_kind() != self.kind || !self.changes.contains(&event.change_kind()) {
            return false;
        }

        match event {
            ChannelEvent::MessageInserted(message) | ChannelEvent::MessageUpdated(message) => {
                message.context_id == self.context_id
            }
            ChannelEvent::TypingChanged(indicator) => indicator.context_id == self.context_id,
            ChannelEvent::PresenceChanged(_) => true,
        }
    }
}

/// A server-pushed change delivered over a channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChannelEvent {
    MessageInserted(Message),
    MessageUpdated(Message),
    TypingChanged(TypingIndicator),
    PresenceChanged(PresenceRecord),
}

impl ChannelEvent {
    pub fn channel_kind(&self) -> ChannelKind {
        match self {
            Self::MessageInserted(_) | Self::MessageUpdated(_) => ChannelKind::Messages,
            Self::TypingChanged(_) => ChannelKind::Typing,
            Self::PresenceChanged(_) => ChannelKind::Presence,
        }
    }

    /// Typing and presence rows are upserts; the first write counts as an insert.
    pub fn change_kind(&self) -> ChangeKind {
        match self {
            Self::MessageInserted(_) => ChangeKind::Insert,
            _ => ChangeKind::Update,
        }
    }
}
