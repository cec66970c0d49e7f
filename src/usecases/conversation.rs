//! Conversation view controller.
//!
//! Owns everything one mounted conversation view needs: the last known
//! message set and the threads derived from it, the open thread, its push
//! subscriptions and the typing/presence trackers. All time-dependent work is
//! driven by `tick(now_ms)`, so the controller never reads a clock itself.

use crate::{
    domain::{
        active_thread_state::ActiveThreadState,
        channel::{ChangeKind, ChannelEvent, ChannelIdentity, ChannelKind},
        ids::{ContextId, MessageId, UserId},
        message::{Message, MessageKind},
        presence::{PresenceDisplay, PresenceWindows},
        thread::{aggregate_threads, Thread},
        thread_list_state::ThreadListState,
        typing::TypingTimings,
    },
    realtime::{
        presence::PresenceTracker,
        subscriptions::SubscriptionManager,
        transport::ChannelTransport,
        typing::{RemoteTypingTracker, RemoteTypingWindows, TypingCoordinator},
    },
};

use super::{
    contracts::{MessageStore, NotificationDispatcher, PresenceStore, TypingStore},
    load_threads::{load_threads, LoadThreadsQuery},
    message_actions::{self, MarkReadOutcome, MessageActionError},
    send_message::{send_message, SendMessageCommand, SendMessageError},
};

const THREADS_REFRESH_FAILED: &str = "THREADS_REFRESH_FAILED";
const MARK_READ_FAILED: &str = "MARK_READ_FAILED";
const TARGET_THREAD_NOT_FOUND: &str = "TARGET_THREAD_NOT_FOUND";

/// Timing and sizing knobs, all sourced from configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConversationSettings {
    pub poll_interval_ms: i64,
    pub target_retry_delay_ms: i64,
    pub page_size: usize,
    pub typing: TypingTimings,
    pub remote_typing: RemoteTypingWindows,
    pub heartbeat_interval_ms: i64,
    pub presence: PresenceWindows,
}

impl Default for ConversationSettings {
    fn default() -> Self {
        Self {
            poll_interval_ms: 10_000,
            target_retry_delay_ms: 1_000,
            page_size: 500,
            typing: TypingTimings {
                idle_timeout_ms: 1_000,
                refresh_interval_ms: 3_000,
            },
            remote_typing: RemoteTypingWindows {
                stale_after_ms: 10_000,
                clear_after_ms: 5_000,
            },
            heartbeat_interval_ms: 30_000,
            presence: PresenceWindows {
                online_fresh_ms: 60_000,
                recently_active_ms: 300_000,
            },
        }
    }
}

/// External collaborators the controller talks to.
pub struct ConversationPorts {
    pub messages: Box<dyn MessageStore>,
    pub typing: Box<dyn TypingStore>,
    pub presence: Box<dyn PresenceStore>,
    pub transport: Box<dyn ChannelTransport>,
    pub notifier: Box<dyn NotificationDispatcher>,
}

/// Thread requested through navigation (e.g. "message the owner of listing X").
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct NavigationTarget {
    pub participant: Option<UserId>,
    pub context_id: Option<ContextId>,
}

impl NavigationTarget {
    pub fn is_empty(&self) -> bool {
        self.participant.is_none() && self.context_id.is_none()
    }

    fn matches(&self, thread: &Thread) -> bool {
        let participant_ok = self
            .participant
            .as_ref()
            .map_or(true, |participant| thread.other_user_id() == participant);
        let context_ok = self
            .context_id
            .as_ref()
            .map_or(true, |context_id| thread.context_id() == Some(context_id));
        participant_ok && context_ok
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TargetResolution {
    /// Not mounted yet.
    Pending,
    /// Mounted without a navigation target.
    NoTarget,
    RetryAt {
        target: NavigationTarget,
        deadline_ms: i64,
    },
    Resolved,
    GaveUp,
}

pub struct ConversationController {
    viewer: UserId,
    settings: ConversationSettings,
    message_store: Box<dyn MessageStore>,
    typing_store: Box<dyn TypingStore>,
    presence_store: Box<dyn PresenceStore>,
    notifier: Box<dyn NotificationDispatcher>,
    subscriptions: SubscriptionManager,
    typing: TypingCoordinator,
    remote_typing: RemoteTypingTracker,
    presence: PresenceTracker,
    messages: Vec<Message>,
    thread_list: ThreadListState,
    active: ActiveThreadState,
    next_refresh_at_ms: Option<i64>,
    target: TargetResolution,
}

impl ConversationController {
    pub fn new(viewer: UserId, settings: ConversationSettings, ports: ConversationPorts) -> Self {
        Self {
            typing: TypingCoordinator::new(viewer.clone(), settings.typing),
            remote_typing: RemoteTypingTracker::new(viewer.clone(), settings.remote_typing),
            presence: PresenceTracker::new(
                viewer.clone(),
                settings.heartbeat_interval_ms,
                settings.presence,
            ),
            subscriptions: SubscriptionManager::new(ports.transport),
            message_store: ports.messages,
            typing_store: ports.typing,
            presence_store: ports.presence,
            notifier: ports.notifier,
            viewer,
            settings,
            messages: Vec::new(),
            thread_list: ThreadListState::default(),
            active: ActiveThreadState::default(),
            next_refresh_at_ms: None,
            target: TargetResolution::Pending,
        }
    }

    pub fn viewer(&self) -> &UserId {
        &self.viewer
    }

    pub fn thread_list(&self) -> &ThreadListState {
        &self.thread_list
    }

    pub fn thread_list_mut(&mut self) -> &mut ThreadListState {
        &mut self.thread_list
    }

    pub fn active(&self) -> &ActiveThreadState {
        &self.active
    }

    pub fn active_mut(&mut self) -> &mut ActiveThreadState {
        &mut self.active
    }

    pub fn target_resolution(&self) -> &TargetResolution {
        &self.target
    }

    #[cfg(test)]
    pub fn subscriptions(&self) -> &SubscriptionManager {
        &self.subscriptions
    }

    #[cfg(test)]
    pub fn is_typing_locally(&self) -> bool {
        self.active
            .key()
            .is_some_and(|key| self.typing.is_typing(key))
    }

    #[cfg(test)]
    pub fn cached_presence_count(&self) -> usize {
        self.presence.cached_count()
    }

    /// Loads threads, starts presence and tries to open the navigation target.
    pub fn mount(&mut self, target: Option<NavigationTarget>, now_ms: i64) {
        self.presence.start(self.presence_store.as_ref(), now_ms);
        self.refresh(now_ms);
        self.next_refresh_at_ms = Some(now_ms + self.settings.poll_interval_ms);

        let Some(target) = target.filter(|target| !target.is_empty()) else {
            self.target = TargetResolution::NoTarget;
            return;
        };

        if self.try_open_target(&target, now_ms) {
            self.target = TargetResolution::Resolved;
        } else {
            self.target = TargetResolution::RetryAt {
                target,
                deadline_ms: now_ms + self.settings.target_retry_delay_ms,
            };
        }
    }

    /// Tears down subscriptions and timers. Safe to call more than once.
    pub fn unmount(&mut self, now_ms: i64) {
        self.close_thread(now_ms);
        self.subscriptions.teardown_all();
        self.on_unload(now_ms);
        self.next_refresh_at_ms = None;
    }

    /// Process is going away: clear typing and write presence offline, best effort.
    pub fn on_unload(&mut self, now_ms: i64) {
        self.typing.clear_all(self.typing_store.as_ref(), now_ms);
        self.presence.on_unload(self.presence_store.as_ref(), now_ms);
    }

    /// Re-fetches the thread list. On failure the previous list stays on screen.
    pub fn refresh(&mut self, now_ms: i64) -> bool {
        let query = LoadThreadsQuery {
            viewer: self.viewer.clone(),
            page_size: self.settings.page_size,
        };

        match load_threads(self.message_store.as_ref(), query) {
            Ok(output) => {
                self.messages = output.messages;
                self.apply_threads(output.threads);
                if self.active.is_open() {
                    self.mark_active_read_logged(now_ms, "could not mark polled messages read");
                }
                true
            }
            Err(error) => {
                tracing::warn!(
                    code = THREADS_REFRESH_FAILED,
                    error = error.code(),
                    now_ms,
                    "thread refresh failed; keeping last known threads"
                );
                self.thread_list.set_refresh_failed();
                false
            }
        }
    }

    pub fn tick(&mut self, now_ms: i64) {
        self.typing.tick(self.typing_store.as_ref(), now_ms);
        self.presence.tick(self.presence_store.as_ref(), now_ms);

        if self
            .next_refresh_at_ms
            .is_some_and(|deadline| now_ms >= deadline)
        {
            self.refresh(now_ms);
            self.next_refresh_at_ms = Some(now_ms + self.settings.poll_interval_ms);
        }

        self.retry_target_if_due(now_ms);
        self.pump_deliveries(now_ms);
    }

    /// Opens the thread with `thread_id`, replacing any open one, and marks
    /// its incoming messages read.
    ///
    /// `Ok(false)` means no such thread. An error means the thread is open but
    /// marking it read failed.
    pub fn open_thread(&mut self, thread_id: &str, now_ms: i64) -> Result<bool, MessageActionError> {
        let Some(thread) = self.thread_list.find(thread_id).cloned() else {
            return Ok(false);
        };

        if self.active.thread_id() != Some(thread.id.as_str()) {
            self.close_thread(now_ms);
        }

        self.active.open(&thread);
        self.thread_list.select_thread(&thread.id);
        self.remote_typing.watch(Some(thread.key.clone()));

        for kind in [ChannelKind::Messages, ChannelKind::Typing, ChannelKind::Presence] {
            self.subscriptions.subscribe(
                ChannelIdentity::new(kind, thread.context_id().cloned()),
                &[ChangeKind::Insert, ChangeKind::Update],
            );
        }

        self.presence.resolve(
            self.presence_store.as_ref(),
            std::slice::from_ref(thread.other_user_id()),
        );

        self.mark_active_thread_read(now_ms).map(|_| true)
    }

    pub fn close_thread(&mut self, now_ms: i64) {
        if !self.active.is_open() {
            return;
        }

        self.typing.clear_all(self.typing_store.as_ref(), now_ms);
        self.subscriptions.teardown_all();
        self.remote_typing.watch(None);
        self.active.clear();
    }

    /// Composer text changed for the open thread.
    pub fn on_input_changed(&mut self, text: &str, now_ms: i64) {
        if let Some(key) = self.active.key().cloned() {
            let input_empty = text.trim().is_empty();
            self.typing
                .on_input(self.typing_store.as_ref(), &key, input_empty, now_ms);
        }
    }

    pub fn send(&mut self, text: &str, now_ms: i64) -> Result<Message, SendMessageError> {
        let Some(key) = self.active.key().cloned() else {
            return Err(SendMessageError::NoActiveThread);
        };

        self.typing.on_send(self.typing_store.as_ref(), &key, now_ms);

        let stored = send_message(
            self.message_store.as_ref(),
            self.notifier.as_ref(),
            SendMessageCommand {
                context_id: key.context_id.clone(),
                sender_id: self.viewer.clone(),
                recipient_id: key.other_user_id.clone(),
                text: text.to_owned(),
                kind: MessageKind::General,
                now_ms,
            },
        )?;

        self.merge_message(stored.clone());
        self.recompute();
        Ok(stored)
    }

    /// Marks one message read. Returns whether a write happened.
    pub fn mark_read(&mut self, id: MessageId, now_ms: i64) -> Result<bool, MessageActionError> {
        let Some(message) = self.messages.iter().find(|m| m.id == id).cloned() else {
            return Err(MessageActionError::NotFound);
        };

        let changed = self.mark_read_local(&message, now_ms)?;
        if changed {
            self.recompute();
        }
        Ok(changed)
    }

    /// Marks every unread incoming message of the open thread. Returns how many changed.
    pub fn mark_active_thread_read(&mut self, now_ms: i64) -> Result<usize, MessageActionError> {
        let unread: Vec<Message> = self
            .active
            .messages()
            .iter()
            .filter(|message| message.is_unread_for(&self.viewer))
            .cloned()
            .collect();

        let mut marked = 0;
        let mut first_error = None;
        for message in &unread {
            match self.mark_read_local(message, now_ms) {
                Ok(true) => marked += 1,
                Ok(false) => {}
                Err(error) => {
                    first_error.get_or_insert(error);
                }
            }
        }

        if marked > 0 {
            self.recompute();
        }
        match first_error {
            Some(error) => Err(error),
            None => Ok(marked),
        }
    }

    pub fn delete_message(&mut self, id: MessageId) -> Result<(), MessageActionError> {
        let Some(message) = self.messages.iter().find(|m| m.id == id).cloned() else {
            return Err(MessageActionError::NotFound);
        };

        message_actions::delete_message(self.message_store.as_ref(), &message, &self.viewer)?;
        self.messages.retain(|m| m.id != id);
        self.recompute();
        Ok(())
    }

    pub fn on_visibility_changed(&mut self, visible: bool, now_ms: i64) {
        if visible == self.presence.is_visible() {
            return;
        }

        self.presence
            .on_visibility_changed(self.presence_store.as_ref(), visible, now_ms);
        if visible {
            self.refresh(now_ms);
        } else {
            self.typing.clear_all(self.typing_store.as_ref(), now_ms);
        }
    }

    /// Applies pushed events from live subscriptions.
    pub fn pump_deliveries(&mut self, now_ms: i64) {
        let mut messages_changed = false;

        for event in self.subscriptions.drain() {
            match event {
                ChannelEvent::MessageInserted(message) | ChannelEvent::MessageUpdated(message) => {
                    if message.counterpart(&self.viewer).is_some() {
                        messages_changed |= self.merge_message(message);
                    }
                }
                ChannelEvent::TypingChanged(indicator) => {
                    self.remote_typing.apply(indicator, now_ms);
                }
                ChannelEvent::PresenceChanged(record) => {
                    self.presence.apply(record);
                }
            }
        }

        if messages_changed {
            self.recompute();
            self.mark_active_read_logged(now_ms, "could not mark pushed messages read");
        }
    }

    /// Label for the typing line of the open thread.
    pub fn typing_label(&self, now_ms: i64) -> Option<String> {
        self.remote_typing
            .active_typist(now_ms)
            .map(|user| format!("{user} is typing..."))
    }

    pub fn counterpart_presence(&self, now_ms: i64) -> Option<PresenceDisplay> {
        self.active
            .key()
            .map(|key| self.presence.display(&key.other_user_id, now_ms))
    }

    fn try_open_target(&mut self, target: &NavigationTarget, now_ms: i64) -> bool {
        let found = self
            .thread_list
            .threads()
            .iter()
            .find(|thread| target.matches(thread))
            .map(|thread| thread.id.clone());

        let Some(thread_id) = found else {
            return false;
        };

        match self.open_thread(&thread_id, now_ms) {
            Ok(opened) => opened,
            Err(error) => {
                tracing::warn!(
                    code = MARK_READ_FAILED,
                    error = ?error,
                    thread_id = %thread_id,
                    "target thread opened but could not be marked read"
                );
                true
            }
        }
    }

    /// One delayed retry, then a full refresh and a last attempt.
    fn retry_target_if_due(&mut self, now_ms: i64) {
        let TargetResolution::RetryAt {
            target,
            deadline_ms,
        } = &self.target
        else {
            return;
        };
        if now_ms < *deadline_ms {
            return;
        }

        let target = target.clone();
        if self.try_open_target(&target, now_ms) {
            self.target = TargetResolution::Resolved;
            return;
        }

        self.refresh(now_ms);
        if self.try_open_target(&target, now_ms) {
            self.target = TargetResolution::Resolved;
        } else {
            tracing::info!(
                code = TARGET_THREAD_NOT_FOUND,
                participant = ?target.participant,
                context_id = ?target.context_id,
                "navigation target not found; leaving no thread selected"
            );
            self.target = TargetResolution::GaveUp;
        }
    }

    /// Delivery paths keep the open thread read; failures only reach the log.
    fn mark_active_read_logged(&mut self, now_ms: i64, message: &'static str) {
        if let Err(error) = self.mark_active_thread_read(now_ms) {
            tracing::warn!(code = MARK_READ_FAILED, error = ?error, "{}", message);
        }
    }

    fn mark_read_local(&mut self, message: &Message, now_ms: i64) -> Result<bool, MessageActionError> {
        match message_actions::mark_read(self.message_store.as_ref(), message, &self.viewer, now_ms)? {
            MarkReadOutcome::Marked(updated) => {
                self.merge_message(updated);
                Ok(true)
            }
            MarkReadOutcome::Unchanged => Ok(false),
        }
    }

    /// Inserts or replaces by id. A known `read_at` is never cleared by an older copy.
    fn merge_message(&mut self, mut message: Message) -> bool {
        match self.messages.iter_mut().find(|m| m.id == message.id) {
            Some(existing) => {
                if message.read_at_ms.is_none() {
                    message.read_at_ms = existing.read_at_ms;
                }
                if *existing == message {
                    return false;
                }
                *existing = message;
                true
            }
            None => {
                self.messages.push(message);
                true
            }
        }
    }

    fn recompute(&mut self) {
        let threads = aggregate_threads(&self.messages, &self.viewer);
        self.apply_threads(threads);
    }

    fn apply_threads(&mut self, threads: Vec<Thread>) {
        self.thread_list.set_ready(threads);
        if let Some(thread_id) = self.active.thread_id().map(str::to_owned) {
            if let Some(thread) = self.thread_list.find(&thread_id) {
                self.active.sync(thread);
            }
            self.thread_list.select_thread(&thread_id);
        }
    }
}
