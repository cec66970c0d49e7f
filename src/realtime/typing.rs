//! Typing indicators: publishing our own state and interpreting the counterpart's.
//!
//! Everything here is best-effort. Publish failures are logged and dropped;
//! they never block or fail a send.

use std::collections::HashMap;

use crate::{
    domain::{
        ids::UserId,
        thread::ThreadKey,
        typing::{TypingIndicator, TypingSession, TypingSignal, TypingTimings},
    },
    usecases::contracts::TypingStore,
};

const TYPING_PUBLISH_FAILED: &str = "TYPING_PUBLISH_FAILED";

pub struct TypingCoordinator {
    viewer: UserId,
    timings: TypingTimings,
    sessions: HashMap<ThreadKey, TypingSession>,
}

impl TypingCoordinator {
    pub fn new(viewer: UserId, timings: TypingTimings) -> Self {
        Self {
            viewer,
            timings,
            sessions: HashMap::new(),
        }
    }

    #[cfg(test)]
    pub fn is_typing(&self, key: &ThreadKey) -> bool {
        self.sessions
            .get(key)
            .is_some_and(TypingSession::is_typing)
    }

    pub fn on_input(&mut self, store: &dyn TypingStore, key: &ThreadKey, input_empty: bool, now_ms: i64) {
        let signal = self
            .sessions
            .entry(key.clone())
            .or_default()
            .on_input(input_empty, now_ms, self.timings);
        self.publish(store, key, signal, now_ms);
    }

    /// Sending ends typing immediately.
    pub fn on_send(&mut self, store: &dyn TypingStore, key: &ThreadKey, now_ms: i64) {
        let signal = self
            .sessions
            .get_mut(key)
            .map_or(TypingSignal::None, TypingSession::force_idle);
        self.publish(store, key, signal, now_ms);
    }

    pub fn tick(&mut self, store: &dyn TypingStore, now_ms: i64) {
        let fired: Vec<ThreadKey> = self
            .sessions
            .iter_mut()
            .filter_map(|(key, session)| match session.on_tick(now_ms) {
                TypingSignal::Publish(_) => Some(key.clone()),
                TypingSignal::None => None,
            })
            .collect();

        for key in fired {
            self.publish(store, &key, TypingSignal::Publish(false), now_ms);
        }
        self.sessions.retain(|_, session| session.is_typing());
    }

    /// Forces every session idle, publishing `false` for those that were typing.
    pub fn clear_all(&mut self, store: &dyn TypingStore, now_ms: i64) {
        let sessions: Vec<(ThreadKey, TypingSession)> = self.sessions.drain().collect();
        for (key, mut session) in sessions {
            let signal = session.force_idle();
            self.publish(store, &key, signal, now_ms);
        }
    }

    fn publish(&self, store: &dyn TypingStore, key: &ThreadKey, signal: TypingSignal, now_ms: i64) {
        let TypingSignal::Publish(is_typing) = signal else {
            return;
        };

        let indicator = TypingIndicator {
            actor_id: self.viewer.clone(),
            context_id: key.context_id.clone(),
            target_id: key.other_user_id.clone(),
            is_typing,
            updated_at_ms: now_ms,
        };

        if let Err(error) = store.upsert(indicator) {
            tracing::debug!(
                code = TYPING_PUBLISH_FAILED,
                error = error.code(),
                is_typing,
                "typing publish failed; ignoring"
            );
        }
    }
}

/// Windows applied to indicators received from the other side.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RemoteTypingWindows {
    /// Max age of `updated_at` before an indicator counts as stale.
    pub stale_after_ms: i64,
    /// Max time since we last heard from the typist.
    pub clear_after_ms: i64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct ReceivedIndicator {
    indicator: TypingIndicator,
    received_at_ms: i64,
}

/// Counterpart typing state for the conversation currently on screen.
pub struct RemoteTypingTracker {
    viewer: UserId,
    windows: RemoteTypingWindows,
    watching: Option<ThreadKey>,
    latest: Option<ReceivedIndicator>,
}

impl RemoteTypingTracker {
    pub fn new(viewer: UserId, windows: RemoteTypingWindows) -> Self {
        Self {
            viewer,
            windows,
            watching: None,
            latest: None,
        }
    }

    pub fn watch(&mut self, key: Option<ThreadKey>) {
        if self.watching != key {
            self.latest = None;
        }
        self.watching = key;
    }

    /// Accepts only indicators from the watched counterpart, aimed at the viewer,
    /// in the watched context. Returns whether the indicator was kept.
    pub fn apply(&mut self, indicator: TypingIndicator, now_ms: i64) -> bool {
        let Some(key) = &self.watching else {
            return false;
        };

        let relevant = indicator.actor_id != self.viewer
            && indicator.actor_id == key.other_user_id
            && indicator.target_id == self.viewer
            && indicator.context_id == key.context_id;
        if !relevant {
            return false;
        }

        let newer = self
            .latest
            .as_ref()
            .map_or(true, |latest| indicator.updated_at_ms >= latest.indicator.updated_at_ms);
        if newer {
            self.latest = Some(ReceivedIndicator {
                indicator,
                received_at_ms: now_ms,
            });
        }
        newer
    }

    /// The counterpart, if they should be shown as typing right now.
    pub fn active_typist(&self, now_ms: i64) -> Option<&UserId> {
        let latest = self.latest.as_ref()?;
        let heard_recently =
            now_ms.saturating_sub(latest.received_at_ms) < self.windows.clear_after_ms;

        (latest.indicator.is_active(now_ms, self.windows.stale_after_ms) && heard_recently)
            .then_some(&latest.indicator.actor_id)
    }
}
