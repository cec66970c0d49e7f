//! Use case for sending a message within a thread.
//!
//! The store write is the only thing that can fail the send. The follow-up
//! notification is dispatched after the write and its outcome is only logged.

use crate::domain::{
    ids::{ContextId, UserId},
    message::{Message, MessageKind, NewMessage},
};

use super::contracts::{MessageStore, NotificationDispatcher, StoreError};

const SEND_NOTIFICATION_FAILED: &str = "SEND_NOTIFICATION_FAILED";

/// Command to send a message to the counterpart of a thread.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SendMessageCommand {
    pub context_id: Option<ContextId>,
    pub sender_id: UserId,
    pub recipient_id: UserId,
    pub text: String,
    pub kind: MessageKind,
    pub now_ms: i64,
}

/// Domain-level errors for the send operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SendMessageError {
    /// Message text is empty after trimming whitespace.
    EmptyMessage,
    /// Sender and recipient are the same user.
    SelfAddressed,
    /// No thread is open to send into.
    NoActiveThread,
    Unauthorized,
    TemporarilyUnavailable,
    Rejected,
}

impl SendMessageError {
    pub fn user_message(&self) -> &'static str {
        match self {
            Self::EmptyMessage => "Message is empty.",
            Self::SelfAddressed => "You cannot message yourself.",
            Self::NoActiveThread => "Open a conversation first.",
            Self::Unauthorized => "Not signed in. Message was not sent.",
            Self::TemporarilyUnavailable => "Message not sent. Check connection and retry.",
            Self::Rejected => "Message was rejected by the server.",
        }
    }
}

/// Validates, stores and then notifies. Returns the stored row.
pub fn send_message(
    store: &dyn MessageStore,
    notifier: &dyn NotificationDispatcher,
    command: SendMessageCommand,
) -> Result<Message, SendMessageError> {
    let text = command.text.trim();
    if text.is_empty() {
        return Err(SendMessageError::EmptyMessage);
    }
    if command.sender_id == command.recipient_id {
        return Err(SendMessageError::SelfAddressed);
    }

    let stored = store
        .insert(NewMessage {
            context_id: command.context_id,
            sender_id: command.sender_id,
            recipient_id: command.recipient_id,
            text: text.to_owned(),
            kind: command.kind,
            created_at_ms: command.now_ms,
        })
        .map_err(map_store_error)?;

    if let Err(error) = notifier.notify_new_message(&stored) {
        tracing::warn!(
            code = SEND_NOTIFICATION_FAILED,
            message_id = %stored.id,
            error = ?error,
            "notification dispatch failed; message stays sent"
        );
    }

    Ok(stored)
}

fn map_store_error(error: StoreError) -> SendMessageError {
    match error {
        StoreError::Unauthorized => SendMessageError::Unauthorized,
        StoreError::Unavailable => SendMessageError::TemporarilyUnavailable,
        StoreError::Forbidden | StoreError::NotFound | StoreError::InvalidData => {
            SendMessageError::Rejected
        }
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;

    use super::*;
    use crate::{
        domain::ids::MessageId,
        usecases::contracts::{MessageQuery, NotificationError},
    };

    struct StubStore {
        result: Result<(), StoreError>,
        captured: RefCell<Option<NewMessage>>,
    }

    impl StubStore {
        fn with_result(result: Result<(), StoreError>) -> Self {
            Self {
                result,
                captured: RefCell::new(None),
            }
        }
    }

    impl MessageStore for StubStore {
        fn insert(&self, message: NewMessage) -> Result<Message, StoreError> {
            *self.captured.borrow_mut() = Some(message.clone());
            self.result.clone().map(|()| Message {
                id: MessageId::new(7),
                context_id: message.context_id,
                sender_id: message.sender_id,
                recipient_id: message.recipient_id,
                text: message.text,
                kind: message.kind,
                created_at_ms: message.created_at_ms,
                read_at_ms: None,
            })
        }

        fn mark_read(&self, _id: MessageId, _read_at_ms: i64) -> Result<Message, StoreError> {
            Err(StoreError::Unavailable)
        }

        fn query(&self, _query: &MessageQuery) -> Result<Vec<Message>, StoreError> {
            Ok(vec![])
        }

        fn delete(&self, _id: MessageId, _requester: &UserId) -> Result<(), StoreError> {
            Ok(())
        }
    }

    struct StubNotifier {
        result: Result<(), NotificationError>,
        calls: RefCell<u32>,
    }

    impl StubNotifier {
        fn with_result(result: Result<(), NotificationError>) -> Self {
            Self {
                result,
                calls: RefCell::new(0),
            }
        }
    }

    impl NotificationDispatcher for StubNotifier {
        fn notify_new_message(&self, _message: &Message) -> Result<(), NotificationError> {
            *self.calls.borrow_mut() += 1;
            self.result.clone()
        }
    }

    fn command(text: &str) -> SendMessageCommand {
        SendMessageCommand {
            context_id: Some(ContextId::new("P1")),
            sender_id: UserId::new("a"),
            recipient_id: UserId::new("b"),
            text: text.to_owned(),
            kind: MessageKind::General,
            now_ms: 42,
        }
    }

    #[test]
    fn rejects_whitespace_only_message() {
        let store = StubStore::with_result(Ok(()));
        let notifier = StubNotifier::with_result(Ok(()));

        let result = send_message(&store, &notifier, command("  \n\t "));

        assert_eq!(result, Err(SendMessageError::EmptyMessage));
        assert!(store.captured.borrow().is_none());
    }

    #[test]
    fn rejects_self_addressed_message() {
        let store = StubStore::with_result(Ok(()));
        let notifier = StubNotifier::with_result(Ok(()));
        let mut cmd = command("hi");
        cmd.recipient_id = UserId::new("a");

        assert_eq!(
            send_message(&store, &notifier, cmd),
            Err(SendMessageError::SelfAddressed)
        );
    }

    #[test]
    fn trims_text_and_stamps_creation_time() {
        let store = StubStore::with_result(Ok(()));
        let notifier = StubNotifier::with_result(Ok(()));

        let stored = send_message(&store, &notifier, command("  hello  ")).expect("send");

        assert_eq!(stored.text, "hello");
        assert_eq!(stored.created_at_ms, 42);
        assert_eq!(*notifier.calls.borrow(), 1);
    }

    #[test]
    fn notification_failure_does_not_fail_send() {
        let store = StubStore::with_result(Ok(()));
        let notifier = StubNotifier::with_result(Err(NotificationError::Unavailable));

        let result = send_message(&store, &notifier, command("hello"));

        assert!(result.is_ok());
        assert_eq!(*notifier.calls.borrow(), 1);
    }

    #[test]
    fn store_failure_skips_notification() {
        let store = StubStore::with_result(Err(StoreError::Unavailable));
        let notifier = StubNotifier::with_result(Ok(()));

        let result = send_message(&store, &notifier, command("hello"));

        assert_eq!(result, Err(SendMessageError::TemporarilyUnavailable));
        assert_eq!(*notifier.calls.borrow(), 0);
    }

    #[test]
    fn maps_unauthorized_error() {
        let store = StubStore::with_result(Err(StoreError::Unauthorized));
        let notifier = StubNotifier::with_result(Ok(()));

        assert_eq!(
            send_message(&store, &notifier, command("hello")),
            Err(SendMessageError::Unauthorized)
        );
    }
}
