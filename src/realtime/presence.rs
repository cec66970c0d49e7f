//! Presence: heartbeat for the current user and a last-write-wins cache of
//! the rows of users that were resolved. Pushed rows for anyone else are dropped.
//!
//! The unload write is an optimization only. Readers never trust a stale
//! `is_online` flag, so a lost unload write just ages out.

use std::collections::{HashMap, HashSet};

use crate::{
    domain::{
        ids::UserId,
        presence::{presence_display, PresenceDisplay, PresenceRecord, PresenceWindows},
    },
    usecases::contracts::PresenceStore,
};

const PRESENCE_WRITE_FAILED: &str = "PRESENCE_WRITE_FAILED";
const PRESENCE_FETCH_FAILED: &str = "PRESENCE_FETCH_FAILED";

pub struct PresenceTracker {
    viewer: UserId,
    heartbeat_interval_ms: i64,
    windows: PresenceWindows,
    visible: bool,
    next_heartbeat_at_ms: Option<i64>,
    watched: HashSet<UserId>,
    known: HashMap<UserId, PresenceRecord>,
}

impl PresenceTracker {
    pub fn new(viewer: UserId, heartbeat_interval_ms: i64, windows: PresenceWindows) -> Self {
        Self {
            viewer,
            heartbeat_interval_ms,
            windows,
            visible: false,
            next_heartbeat_at_ms: None,
            watched: HashSet::new(),
            known: HashMap::new(),
        }
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    #[cfg(test)]
    pub fn next_heartbeat_at_ms(&self) -> Option<i64> {
        self.next_heartbeat_at_ms
    }

    pub fn start(&mut self, store: &dyn PresenceStore, now_ms: i64) {
        self.on_visibility_changed(store, true, now_ms);
    }

    /// Writes a heartbeat when one is due and the view is visible.
    pub fn tick(&mut self, store: &dyn PresenceStore, now_ms: i64) {
        let due = self
            .next_heartbeat_at_ms
            .is_some_and(|deadline| now_ms >= deadline);
        if self.visible && due {
            self.write(store, true, now_ms);
            self.next_heartbeat_at_ms = Some(now_ms + self.heartbeat_interval_ms);
        }
    }

    pub fn on_visibility_changed(&mut self, store: &dyn PresenceStore, visible: bool, now_ms: i64) {
        self.visible = visible;
        self.write(store, visible, now_ms);
        self.next_heartbeat_at_ms = visible.then_some(now_ms + self.heartbeat_interval_ms);
    }

    /// Best-effort offline write on the way out.
    pub fn on_unload(&mut self, store: &dyn PresenceStore, now_ms: i64) {
        self.visible = false;
        self.next_heartbeat_at_ms = None;
        self.write(store, false, now_ms);
    }

    /// Starts watching `user_ids` and fetches their rows; on failure the cached
    /// rows stay as they were.
    pub fn resolve(&mut self, store: &dyn PresenceStore, user_ids: &[UserId]) {
        self.watched.extend(user_ids.iter().cloned());

        match store.fetch(user_ids) {
            Ok(records) => {
                for record in records {
                    self.apply(record);
                }
            }
            Err(error) => tracing::debug!(
                code = PRESENCE_FETCH_FAILED,
                error = error.code(),
                users = user_ids.len(),
                "presence fetch failed; keeping cached rows"
            ),
        }
    }

    /// Merges a row for the viewer or a watched user, keeping whichever was
    /// seen last. Returns whether the row was taken.
    pub fn apply(&mut self, record: PresenceRecord) -> bool {
        if record.user_id != self.viewer && !self.watched.contains(&record.user_id) {
            return false;
        }

        match self.known.get(&record.user_id) {
            Some(existing) if existing.last_seen_at_ms > record.last_seen_at_ms => false,
            _ => {
                self.known.insert(record.user_id.clone(), record);
                true
            }
        }
    }

    #[cfg(test)]
    pub fn cached_count(&self) -> usize {
        self.known.len()
    }

    #[cfg(test)]
    pub fn record(&self, user_id: &UserId) -> Option<&PresenceRecord> {
        self.known.get(user_id)
    }

    pub fn display(&self, user_id: &UserId, now_ms: i64) -> PresenceDisplay {
        presence_display(self.known.get(user_id), now_ms, self.windows)
    }

    fn write(&mut self, store: &dyn PresenceStore, is_online: bool, now_ms: i64) {
        let record = PresenceRecord {
            user_id: self.viewer.clone(),
            is_online,
            last_seen_at_ms: now_ms,
        };
        self.apply(record.clone());

        if let Err(error) = store.upsert(record) {
            tracing::debug!(
                code = PRESENCE_WRITE_FAILED,
                error = error.code(),
                is_online,
                "presence write failed; ignoring"
            );
        }
    }
}
