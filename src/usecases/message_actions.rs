//! Mark-read and sender-only delete.

use crate::domain::{ids::UserId, message::Message};

use super::contracts::{MessageStore, StoreError};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MarkReadOutcome {
    /// The store accepted the write; carries the updated row.
    Marked(Message),
    /// Already read or not addressed to the viewer. No write was issued.
    Unchanged,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MessageActionError {
    NotSender,
    NotFound,
    Unauthorized,
    TemporarilyUnavailable,
}

impl MessageActionError {
    pub fn user_message(&self) -> &'static str {
        match self {
            Self::NotSender => "Only the sender can delete a message.",
            Self::NotFound => "Message no longer exists.",
            Self::Unauthorized => "Not signed in.",
            Self::TemporarilyUnavailable => "Action failed. Check connection and retry.",
        }
    }
}

/// Marks `message` read for `viewer`. Idempotent: a read message, or one the
/// viewer sent, never reaches the store.
pub fn mark_read(
    store: &dyn MessageStore,
    message: &Message,
    viewer: &UserId,
    now_ms: i64,
) -> Result<MarkReadOutcome, MessageActionError> {
    if !message.is_unread_for(viewer) {
        return Ok(MarkReadOutcome::Unchanged);
    }

    store
        .mark_read(message.id, now_ms)
        .map(MarkReadOutcome::Marked)
        .map_err(map_store_error)
}

/// Deletes `message` if `requester` sent it.
pub fn delete_message(
    store: &dyn MessageStore,
    message: &Message,
    requester: &UserId,
) -> Result<(), MessageActionError> {
    if !message.is_from(requester) {
        return Err(MessageActionError::NotSender);
    }

    store
        .delete(message.id, requester)
        .map_err(map_store_error)
}

fn map_store_error(error: StoreError) -> MessageActionError {
    match error {
        StoreError::Forbidden => MessageActionError::NotSender,
        StoreError::NotFound => MessageActionError::NotFound,
        StoreError::Unauthorized => MessageActionError::Unauthorized,
        StoreError::Unavailable | StoreError::InvalidData => {
            MessageActionError::TemporarilyUnavailable
        }
    }
}
