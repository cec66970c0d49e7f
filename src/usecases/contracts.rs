//! Contracts between the conversation core and its collaborators.

use anyhow::Result;

use crate::domain::{
    events::AppEvent,
    ids::{MessageId, UserId},
    message::{Message, NewMessage},
    presence::PresenceRecord,
    shell_state::ShellState,
    typing::TypingIndicator,
};

use super::conversation::ConversationController;

pub trait AppEventSource {
    fn next_event(&mut self) -> Result<Option<AppEvent>>;
}

/// Borrowed state handed to the renderer for one frame.
pub struct ShellView<'a> {
    pub shell: &'a ShellState,
    pub conversation: &'a mut ConversationController,
    pub now_ms: i64,
}

pub trait ShellOrchestrator {
    fn state(&self) -> &ShellState;
    fn handle_event(&mut self, event: AppEvent) -> Result<()>;
    fn view(&mut self) -> ShellView<'_>;
    fn shutdown(&mut self);
}

/// Failures reported by any backend store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    Unauthorized,
    Unavailable,
    NotFound,
    /// Requester is not allowed to perform the write (e.g. deleting someone else's message).
    Forbidden,
    InvalidData,
}

impl StoreError {
    pub fn code(&self) -> &'static str {
        match self {
            Self::Unauthorized => "STORE_UNAUTHORIZED",
            Self::Unavailable => "STORE_UNAVAILABLE",
            Self::NotFound => "STORE_NOT_FOUND",
            Self::Forbidden => "STORE_FORBIDDEN",
            Self::InvalidData => "STORE_INVALID_DATA",
        }
    }
}

/// Selects the message rows visible to one participant, newest first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageQuery {
    pub participant: UserId,
    /// Keyset cursor `(created_at_ms, id)`: only rows strictly older are returned.
    pub before: Option<(i64, MessageId)>,
    pub limit: usize,
}

impl MessageQuery {
    pub fn involving(participant: UserId, limit: usize) -> Self {
        Self {
            participant,
            before: None,
            limit,
        }
    }

    /// The query for the page that follows `last`, the oldest row of the current page.
    pub fn after_page(&self, last: &Message) -> Self {
        Self {
            before: Some((last.created_at_ms, last.id)),
            ..self.clone()
        }
    }

    pub fn matches(&self, message: &Message) -> bool {
        let involved =
            message.sender_id == self.participant || message.recipient_id == self.participant;
        let older = match self.before {
            None => true,
            Some(cursor) => (message.created_at_ms, message.id) < cursor,
        };
        involved && older
    }
}

/// Persisted message rows. Each call is transactional on its own.
pub trait MessageStore {
    fn insert(&self, message: NewMessage) -> Result<Message, StoreError>;
    /// Sets `read_at` if unset and returns the stored row.
    fn mark_read(&self, id: MessageId, read_at_ms: i64) -> Result<Message, StoreError>;
    fn query(&self, query: &MessageQuery) -> Result<Vec<Message>, StoreError>;
    /// Only the sender may delete; anyone else gets `Forbidden`.
    fn delete(&self, id: MessageId, requester: &UserId) -> Result<(), StoreError>;
}

pub trait TypingStore {
    fn upsert(&self, indicator: TypingIndicator) -> Result<(), StoreError>;
}

pub trait PresenceStore {
    fn upsert(&self, record: PresenceRecord) -> Result<(), StoreError>;
    fn fetch(&self, user_ids: &[UserId]) -> Result<Vec<PresenceRecord>, StoreError>;
}

pub trait IdentityProvider {
    fn current_user_id(&self) -> Option<UserId>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NotificationError {
    Rejected,
    Unavailable,
}

/// Out-of-band notification (email/push) after a message is stored.
pub trait NotificationDispatcher {
    fn notify_new_message(&self, message: &Message) -> Result<(), NotificationError>;
}

pub trait Clock {
    fn now_ms(&self) -> i64;
}
