//! Conversation threads derived from the flat message store.
//!
//! There is no persisted conversation entity. A thread is the set of messages
//! sharing a context id and the same counterpart, as seen by one viewer, and
//! is recomputed from scratch on every refresh.

use std::collections::BTreeMap;

use super::{
    ids::{context_key, ContextId, UserId},
    message::Message,
};

/// Grouping key for a thread from the viewer's point of view.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ThreadKey {
    pub context_id: Option<ContextId>,
    pub other_user_id: UserId,
}

impl ThreadKey {
    pub fn new(context_id: Option<ContextId>, other_user_id: UserId) -> Self {
        Self {
            context_id,
            other_user_id,
        }
    }

    /// Key of the thread `message` belongs to for `viewer`.
    pub fn for_message(message: &Message, viewer: &UserId) -> Option<Self> {
        message
            .counterpart(viewer)
            .map(|other| Self::new(message.context_id.clone(), other.clone()))
    }

    /// Stable string id over the context and the unordered participant pair.
    pub fn thread_id(&self, viewer: &UserId) -> String {
        let (low, high) = if viewer <= &self.other_user_id {
            (viewer, &self.other_user_id)
        } else {
            (&self.other_user_id, viewer)
        };
        format!("{}:{}:{}", context_key(self.context_id.as_ref()), low, high)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Thread {
    pub id: String,
    pub key: ThreadKey,
    pub participants: [UserId; 2],
    /// Ordered by `(created_at, id)` ascending.
    pub messages: Vec<Message>,
    pub unread_count: u32,
}

impl Thread {
    pub fn context_id(&self) -> Option<&ContextId> {
        self.key.context_id.as_ref()
    }

    pub fn other_user_id(&self) -> &UserId {
        &self.key.other_user_id
    }

    /// Message with the greatest `created_at`; equal timestamps fall back to the larger id.
    pub fn last_message(&self) -> Option<&Message> {
        self.messages.last()
    }

    pub fn last_activity_ms(&self) -> i64 {
        self.last_message()
            .map(|message| message.created_at_ms)
            .unwrap_or_default()
    }
}

/// Groups the viewer's messages into threads, newest activity first.
///
/// Messages that do not have the viewer as exactly one of two distinct
/// participants are skipped; every other message lands in exactly one thread.
pub fn aggregate_threads(messages: &[Message], viewer: &UserId) -> Vec<Thread> {
    let mut groups: BTreeMap<ThreadKey, Vec<Message>> = BTreeMap::new();

    for message in messages {
        match ThreadKey::for_message(message, viewer) {
            Some(key) => groups.entry(key).or_default().push(message.clone()),
            None => tracing::debug!(
                message_id = %message.id,
                viewer = %viewer,
                "skipping message without a distinct counterpart for viewer"
            ),
        }
    }

    let mut threads: Vec<Thread> = groups
        .into_iter()
        .map(|(key, mut messages)| {
            messages.sort_by_key(|message| (message.created_at_ms, message.id));
            let unread_count = messages
                .iter()
                .filter(|message| message.is_unread_for(viewer))
                .count() as u32;

            Thread {
                id: key.thread_id(viewer),
                participants: [viewer.clone(), key.other_user_id.clone()],
                key,
                messages,
                unread_count,
            }
        })
        .collect();

    threads.sort_by(|left, right| {
        right
            .last_activity_ms()
            .cmp(&left.last_activity_ms())
            .then_with(|| left.id.cmp(&right.id))
    });

    threads
}
