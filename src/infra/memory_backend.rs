//! In-process stand-in for the hosted backend.
//!
//! Holds message, typing and presence rows behind one lock and fans every
//! insert/update out to the open channels whose filter matches. Clones share
//! the same state, so one backend can be handed to several ports.

use std::{
    collections::{BTreeMap, HashMap},
    sync::{Arc, Mutex, MutexGuard},
};

use crate::{
    domain::{
        channel::{ChannelEvent, EventFilter},
        ids::{ContextId, MessageId, UserId},
        message::{Message, NewMessage},
        presence::PresenceRecord,
        typing::TypingIndicator,
    },
    realtime::transport::{ChannelTransport, DeliverySink, TransportError, TransportHandle},
    usecases::contracts::{MessageQuery, MessageStore, PresenceStore, StoreError, TypingStore},
};

type TypingRowKey = (UserId, Option<ContextId>, UserId);

struct OpenChannel {
    channel_key: String,
    filter: EventFilter,
    sink: DeliverySink,
}

#[derive(Default)]
struct BackendState {
    messages: BTreeMap<MessageId, Message>,
    next_message_id: i64,
    typing: HashMap<TypingRowKey, TypingIndicator>,
    presence: HashMap<UserId, PresenceRecord>,
    channels: HashMap<TransportHandle, OpenChannel>,
    next_handle: u64,
    unavailable: bool,
    refuse_channels: bool,
}

impl BackendState {
    fn publish(&mut self, event: ChannelEvent) {
        self.channels.retain(|_, channel| {
            !channel.filter.matches(&event) || channel.sink.deliver(event.clone())
        });
    }

    fn ensure_available(&self) -> Result<(), StoreError> {
        if self.unavailable {
            Err(StoreError::Unavailable)
        } else {
            Ok(())
        }
    }
}

#[derive(Clone, Default)]
pub struct InMemoryBackend {
    inner: Arc<Mutex<BackendState>>,
}

impl InMemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    #[cfg(test)]
    /// Simulates an outage: every store call fails with `Unavailable`.
    pub fn set_unavailable(&self, unavailable: bool) {
        if let Ok(mut state) = self.inner.lock() {
            state.unavailable = unavailable;
        }
    }

    #[cfg(test)]
    /// Makes the transport refuse to confirm new channels.
    pub fn set_refuse_channels(&self, refuse: bool) {
        if let Ok(mut state) = self.inner.lock() {
            state.refuse_channels = refuse;
        }
    }

    /// Stores a row as-is, keeping its id. Used for seeding.
    pub fn seed_message(&self, message: Message) {
        if let Ok(mut state) = self.inner.lock() {
            state.next_message_id = state.next_message_id.max(message.id.get());
            state.messages.insert(message.id, message);
        }
    }

    pub fn seed_presence(&self, record: PresenceRecord) {
        if let Ok(mut state) = self.inner.lock() {
            state.presence.insert(record.user_id.clone(), record);
        }
    }

    #[cfg(test)]
    pub fn open_channel_keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self
            .inner
            .lock()
            .map(|state| {
                state
                    .channels
                    .values()
                    .map(|channel| channel.channel_key.clone())
                    .collect()
            })
            .unwrap_or_default();
        keys.sort();
        keys
    }

    #[cfg(test)]
    pub fn typing_row(
        &self,
        actor_id: &UserId,
        context_id: Option<&ContextId>,
        target_id: &UserId,
    ) -> Option<TypingIndicator> {
        let key = (actor_id.clone(), context_id.cloned(), target_id.clone());
        self.inner
            .lock()
            .ok()
            .and_then(|state| state.typing.get(&key).cloned())
    }

    #[cfg(test)]
    pub fn presence_row(&self, user_id: &UserId) -> Option<PresenceRecord> {
        self.inner
            .lock()
            .ok()
            .and_then(|state| state.presence.get(user_id).cloned())
    }

    fn lock(&self) -> Result<MutexGuard<'_, BackendState>, StoreError> {
        let state = self.inner.lock().map_err(|_| StoreError::Unavailable)?;
        state.ensure_available()?;
        Ok(state)
    }
}

impl MessageStore for InMemoryBackend {
    fn insert(&self, message: NewMessage) -> Result<Message, StoreError> {
        let mut state = self.lock()?;
        if message.sender_id == message.recipient_id {
            return Err(StoreError::InvalidData);
        }

        state.next_message_id += 1;
        let stored = Message {
            id: MessageId::new(state.next_message_id),
            context_id: message.context_id,
            sender_id: message.sender_id,
            recipient_id: message.recipient_id,
            text: message.text,
            kind: message.kind,
            created_at_ms: message.created_at_ms,
            read_at_ms: None,
        };
        state.messages.insert(stored.id, stored.clone());
        state.publish(ChannelEvent::MessageInserted(stored.clone()));
        Ok(stored)
    }

    fn mark_read(&self, id: MessageId, read_at_ms: i64) -> Result<Message, StoreError> {
        let mut state = self.lock()?;
        let row = state.messages.get_mut(&id).ok_or(StoreError::NotFound)?;
        if !row.mark_read(read_at_ms) {
            return Ok(row.clone());
        }

        let updated = row.clone();
        state.publish(ChannelEvent::MessageUpdated(updated.clone()));
        Ok(updated)
    }

    /// Newest `limit` rows visible to the participant and older than the cursor.
    fn query(&self, query: &MessageQuery) -> Result<Vec<Message>, StoreError> {
        let state = self.lock()?;
        let mut rows: Vec<Message> = state
            .messages
            .values()
            .filter(|message| query.matches(message))
            .cloned()
            .collect();
        rows.sort_by(|a, b| {
            b.created_at_ms
                .cmp(&a.created_at_ms)
                .then_with(|| b.id.cmp(&a.id))
        });
        rows.truncate(query.limit);
        Ok(rows)
    }

    fn delete(&self, id: MessageId, requester: &UserId) -> Result<(), StoreError> {
        let mut state = self.lock()?;
        let row = state.messages.get(&id).ok_or(StoreError::NotFound)?;
        if &row.sender_id != requester {
            return Err(StoreError::Forbidden);
        }
        state.messages.remove(&id);
        Ok(())
    }
}

impl TypingStore for InMemoryBackend {
    fn upsert(&self, indicator: TypingIndicator) -> Result<(), StoreError> {
        let mut state = self.lock()?;
        let key = (
            indicator.actor_id.clone(),
            indicator.context_id.clone(),
            indicator.target_id.clone(),
        );
        state.typing.insert(key, indicator.clone());
        state.publish(ChannelEvent::TypingChanged(indicator));
        Ok(())
    }
}

impl PresenceStore for InMemoryBackend {
    fn upsert(&self, record: PresenceRecord) -> Result<(), StoreError> {
        let mut state = self.lock()?;
        state.presence.insert(record.user_id.clone(), record.clone());
        state.publish(ChannelEvent::PresenceChanged(record));
        Ok(())
    }

    fn fetch(&self, user_ids: &[UserId]) -> Result<Vec<PresenceRecord>, StoreError> {
        let state = self.lock()?;
        Ok(user_ids
            .iter()
            .filter_map(|user_id| state.presence.get(user_id).cloned())
            .collect())
    }
}

impl ChannelTransport for InMemoryBackend {
    fn open(
        &self,
        channel_key: &str,
        filter: EventFilter,
        sink: DeliverySink,
    ) -> Result<TransportHandle, TransportError> {
        let mut state = self.inner.lock().map_err(|_| TransportError::Unavailable)?;
        if state.unavailable {
            return Err(TransportError::Unavailable);
        }
        if state.refuse_channels {
            return Err(TransportError::NotConfirmed);
        }

        state.next_handle += 1;
        let handle = TransportHandle::new(state.next_handle);
        state.channels.insert(
            handle,
            OpenChannel {
                channel_key: channel_key.to_owned(),
                filter,
                sink,
            },
        );
        Ok(handle)
    }

    fn close(&self, handle: TransportHandle) {
        if let Ok(mut state) = self.inner.lock() {
            state.channels.remove(&handle);
        }
    }
}
