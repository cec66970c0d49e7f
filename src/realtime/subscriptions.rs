//! Push subscriptions owned by one conversation view.
//!
//! At most one live subscription exists per [`ChannelIdentity`]. Re-subscribing
//! tears the old one down first, and every delivery carries the generation of
//! the subscription that produced it so late events from a closed channel are
//! dropped instead of reaching the current handlers.

use std::{
    collections::HashMap,
    sync::mpsc::{self, Receiver, Sender},
};

use crate::domain::channel::{ChangeKind, ChannelEvent, ChannelIdentity, EventFilter};

use super::transport::{ChannelTransport, Delivery, DeliverySink, TransportHandle};

const REALTIME_SUBSCRIBE_FAILED: &str = "REALTIME_SUBSCRIBE_FAILED";
const REALTIME_SUBSCRIBED: &str = "REALTIME_SUBSCRIBED";
const REALTIME_UNSUBSCRIBED: &str = "REALTIME_UNSUBSCRIBED";
const REALTIME_STALE_DELIVERY_DROPPED: &str = "REALTIME_STALE_DELIVERY_DROPPED";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct ActiveSubscription {
    handle: TransportHandle,
    generation: u64,
}

pub struct SubscriptionManager {
    transport: Box<dyn ChannelTransport>,
    active: HashMap<ChannelIdentity, ActiveSubscription>,
    inbox_tx: Sender<Delivery>,
    inbox_rx: Receiver<Delivery>,
    next_generation: u64,
}

impl SubscriptionManager {
    pub fn new(transport: Box<dyn ChannelTransport>) -> Self {
        let (inbox_tx, inbox_rx) = mpsc::channel();
        Self {
            transport,
            active: HashMap::new(),
            inbox_tx,
            inbox_rx,
            next_generation: 1,
        }
    }

    /// Opens a channel for `identity`, replacing any live one.
    ///
    /// Returns false when the transport did not confirm; the caller then has
    /// no push delivery for this identity and relies on polling.
    pub fn subscribe(&mut self, identity: ChannelIdentity, changes: &[ChangeKind]) -> bool {
        self.unsubscribe(&identity);

        let generation = self.next_generation;
        self.next_generation += 1;

        let channel_key = identity.channel_key();
        let filter = EventFilter::for_identity(&identity, changes);
        let sink = DeliverySink::new(generation, self.inbox_tx.clone());

        match self.transport.open(&channel_key, filter, sink) {
            Ok(handle) => {
                tracing::debug!(
                    code = REALTIME_SUBSCRIBED,
                    channel = %channel_key,
                    generation,
                    "channel subscription opened"
                );
                self.active
                    .insert(identity, ActiveSubscription { handle, generation });
                true
            }
            Err(error) => {
                tracing::warn!(
                    code = REALTIME_SUBSCRIBE_FAILED,
                    channel = %channel_key,
                    error = error.code(),
                    "channel subscription not confirmed; relying on polling"
                );
                false
            }
        }
    }

    /// Releases the channel for `identity`. Returns false if nothing was open.
    pub fn unsubscribe(&mut self, identity: &ChannelIdentity) -> bool {
        let Some(subscription) = self.active.remove(identity) else {
            return false;
        };

        self.transport.close(subscription.handle);
        tracing::debug!(
            code = REALTIME_UNSUBSCRIBED,
            channel = %identity,
            generation = subscription.generation,
            "channel subscription closed"
        );
        true
    }

    pub fn teardown_all(&mut self) {
        let identities: Vec<ChannelIdentity> = self.active.keys().cloned().collect();
        for identity in identities {
            self.unsubscribe(&identity);
        }
    }

    #[cfg(test)]
    pub fn is_subscribed(&self, identity: &ChannelIdentity) -> bool {
        self.active.contains_key(identity)
    }

    #[cfg(test)]
    pub fn active_count(&self) -> usize {
        self.active.len()
    }

    /// Takes every pending event that belongs to a still-active subscription.
    pub fn drain(&mut self) -> Vec<ChannelEvent> {
        let mut events = Vec::new();
        while let Ok(delivery) = self.inbox_rx.try_recv() {
            if self.is_live_generation(delivery.generation) {
                events.push(delivery.event);
            } else {
                tracing::debug!(
                    code = REALTIME_STALE_DELIVERY_DROPPED,
                    generation = delivery.generation,
                    "dropping delivery from a closed subscription"
                );
            }
        }
        events
    }

    fn is_live_generation(&self, generation: u64) -> bool {
        self.active
            .values()
            .any(|subscription| subscription.generation == generation)
    }
}

impl Drop for SubscriptionManager {
    fn drop(&mut self) {
        self.teardown_all();
    }
}
