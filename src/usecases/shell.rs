use anyhow::Result;

use crate::domain::{
    events::{AppEvent, KeyInput},
    shell_state::{ActivePane, ShellState},
};

use super::{
    contracts::{Clock, ShellOrchestrator, ShellView},
    conversation::ConversationController,
};

const BANNER_TTL_MS: i64 = 5_000;

pub struct DefaultShellOrchestrator {
    state: ShellState,
    conversation: ConversationController,
    clock: Box<dyn Clock>,
}

impl DefaultShellOrchestrator {
    pub fn new(conversation: ConversationController, clock: Box<dyn Clock>) -> Self {
        let mut state = ShellState::default();
        if conversation.active().is_open() {
            state.set_active_pane(ActivePane::Messages);
        }

        Self {
            state,
            conversation,
            clock,
        }
    }

    fn quit(&mut self, now_ms: i64) {
        self.conversation.unmount(now_ms);
        self.state.stop();
    }

    fn show_failure(&mut self, text: &str, now_ms: i64) {
        self.state.show_banner(text, now_ms + BANNER_TTL_MS);
    }

    fn handle_navigation_key(&mut self, key: &KeyInput, now_ms: i64) {
        let pane = self.state.active_pane();
        match key.key.as_str() {
            "q" => self.quit(now_ms),
            "j" | "down" => match pane {
                ActivePane::ThreadList => self.conversation.thread_list_mut().select_next(),
                _ => self.conversation.active_mut().select_next(),
            },
            "k" | "up" => match pane {
                ActivePane::ThreadList => self.conversation.thread_list_mut().select_previous(),
                _ => self.conversation.active_mut().select_previous(),
            },
            "enter" | "l" if pane == ActivePane::ThreadList => self.open_selected(now_ms),
            "i" if self.conversation.active().is_open() => {
                self.state.set_active_pane(ActivePane::Compose);
            }
            "h" | "esc" if pane == ActivePane::Messages => {
                self.state.set_active_pane(ActivePane::ThreadList);
            }
            "r" => {
                self.conversation.refresh(now_ms);
            }
            "d" => self.delete_newest_own(now_ms),
            _ => {}
        }
    }

    fn handle_compose_key(&mut self, key: &KeyInput, now_ms: i64) {
        match key.key.as_str() {
            "esc" => self.state.set_active_pane(ActivePane::Messages),
            "enter" => self.send_input(now_ms),
            "backspace" => {
                if self.state.message_input_mut().delete_char_before() {
                    self.input_changed(now_ms);
                }
            }
            "left" => self.state.message_input_mut().move_cursor_left(),
            "right" => self.state.message_input_mut().move_cursor_right(),
            text if !key.ctrl => {
                let mut chars = text.chars();
                if let (Some(ch), None) = (chars.next(), chars.next()) {
                    if self.state.message_input_mut().insert_char(ch) {
                        self.input_changed(now_ms);
                    }
                }
            }
            _ => {}
        }
    }

    fn open_selected(&mut self, now_ms: i64) {
        let Some(thread_id) = self
            .conversation
            .thread_list()
            .selected_thread()
            .map(|thread| thread.id.clone())
        else {
            return;
        };

        match self.conversation.open_thread(&thread_id, now_ms) {
            Ok(true) => self.state.set_active_pane(ActivePane::Messages),
            Ok(false) => {}
            Err(error) => {
                self.state.set_active_pane(ActivePane::Messages);
                self.show_failure(error.user_message(), now_ms);
            }
        }
    }

    fn send_input(&mut self, now_ms: i64) {
        let text = self.state.message_input().text().to_owned();
        match self.conversation.send(&text, now_ms) {
            Ok(_) => {
                self.state.message_input_mut().take();
            }
            Err(error) => self.show_failure(error.user_message(), now_ms),
        }
    }

    fn input_changed(&mut self, now_ms: i64) {
        let text = self.state.message_input().text().to_owned();
        self.conversation.on_input_changed(&text, now_ms);
    }

    fn delete_newest_own(&mut self, now_ms: i64) {
        let viewer = self.conversation.viewer().clone();
        let Some(id) = self
            .conversation
            .active()
            .messages()
            .iter()
            .rev()
            .find(|message| message.is_from(&viewer))
            .map(|message| message.id)
        else {
            return;
        };

        if let Err(error) = self.conversation.delete_message(id) {
            self.show_failure(error.user_message(), now_ms);
        }
    }
}

impl ShellOrchestrator for DefaultShellOrchestrator {
    fn state(&self) -> &ShellState {
        &self.state
    }

    fn handle_event(&mut self, event: AppEvent) -> Result<()> {
        let now_ms = self.clock.now_ms();

        match event {
            AppEvent::Tick => {
                self.conversation.tick(now_ms);
                self.state.expire_banner(now_ms);
            }
            AppEvent::QuitRequested => self.quit(now_ms),
            AppEvent::Resized { width } => self.state.set_width(width),
            AppEvent::FocusChanged { visible } => {
                self.conversation.on_visibility_changed(visible, now_ms);
            }
            AppEvent::InputKey(key) => match self.state.active_pane() {
                ActivePane::Compose => self.handle_compose_key(&key, now_ms),
                ActivePane::ThreadList | ActivePane::Messages => {
                    self.handle_navigation_key(&key, now_ms)
                }
            },
        }

        Ok(())
    }

    fn view(&mut self) -> ShellView<'_> {
        ShellView {
            shell: &self.state,
            conversation: &mut self.conversation,
            now_ms: self.clock.now_ms(),
        }
    }

    fn shutdown(&mut self) {
        let now_ms = self.clock.now_ms();
        self.conversation.unmount(now_ms);
    }
}

#[cfg(test)]
mod tests {
    use std::{cell::Cell, rc::Rc};

    use super::*;
    use crate::{
        domain::{
            ids::{ContextId, MessageId, UserId},
            message::{Message, MessageKind},
        },
        infra::{memory_backend::InMemoryBackend, notifier::LogNotifier},
        usecases::conversation::{
            ConversationPorts, ConversationSettings, NavigationTarget,
        },
    };

    #[derive(Clone, Default)]
    struct StubClock {
        now: Rc<Cell<i64>>,
    }

    impl StubClock {
        fn set(&self, now_ms: i64) {
            self.now.set(now_ms);
        }
    }

    impl Clock for StubClock {
        fn now_ms(&self) -> i64 {
            self.now.get()
        }
    }

    fn seed(backend: &InMemoryBackend, id: i64, from: &str, to: &str, ctx: &str, at: i64) {
        backend.seed_message(Message {
            id: MessageId::new(id),
            context_id: Some(ContextId::new(ctx)),
            sender_id: UserId::new(from),
            recipient_id: UserId::new(to),
            text: format!("m{id}"),
            kind: MessageKind::General,
            created_at_ms: at,
            read_at_ms: None,
        });
    }

    fn orchestrator(
        backend: &InMemoryBackend,
        target: Option<NavigationTarget>,
    ) -> (DefaultShellOrchestrator, StubClock) {
        let clock = StubClock::default();
        clock.set(1_000);
        let mut conversation = ConversationController::new(
            UserId::new("A"),
            ConversationSettings::default(),
            ConversationPorts {
                messages: Box::new(backend.clone()),
                typing: Box::new(backend.clone()),
                presence: Box::new(backend.clone()),
                transport: Box::new(backend.clone()),
                notifier: Box::new(LogNotifier),
            },
        );
        conversation.mount(target, clock.now_ms());
        (
            DefaultShellOrchestrator::new(conversation, Box::new(clock.clone())),
            clock,
        )
    }

    fn key(orchestrator: &mut DefaultShellOrchestrator, key: &str) {
        orchestrator
            .handle_event(AppEvent::InputKey(KeyInput::new(key, false)))
            .expect("key must be handled");
    }

    fn type_text(orchestrator: &mut DefaultShellOrchestrator, text: &str) {
        for ch in text.chars() {
            key(orchestrator, &ch.to_string());
        }
    }

    #[test]
    fn stops_on_quit_event_and_releases_channels() {
        let backend = InMemoryBackend::new();
        seed(&backend, 1, "B", "A", "P1", 10);
        let (mut orchestrator, _) = orchestrator(
            &backend,
            Some(NavigationTarget {
                participant: Some(UserId::new("B")),
                context_id: None,
            }),
        );
        assert_eq!(backend.open_channel_keys().len(), 3);

        orchestrator
            .handle_event(AppEvent::QuitRequested)
            .expect("event must be handled");

        assert!(!orchestrator.state().is_running());
        assert!(backend.open_channel_keys().is_empty());
    }

    #[test]
    fn q_types_into_composer_instead_of_quitting() {
        let backend = InMemoryBackend::new();
        seed(&backend, 1, "B", "A", "P1", 10);
        let (mut orchestrator, _) = orchestrator(&backend, None);

        key(&mut orchestrator, "enter");
        key(&mut orchestrator, "i");
        key(&mut orchestrator, "q");

        assert!(orchestrator.state().is_running());
        assert_eq!(orchestrator.state().message_input().text(), "q");
    }

    #[test]
    fn enter_opens_selected_thread_and_esc_goes_back() {
        let backend = InMemoryBackend::new();
        seed(&backend, 1, "B", "A", "P1", 10);
        seed(&backend, 2, "C", "A", "P2", 20);
        let (mut orchestrator, _) = orchestrator(&backend, None);
        orchestrator
            .handle_event(AppEvent::Resized { width: 60 })
            .expect("resize");

        key(&mut orchestrator, "j");
        key(&mut orchestrator, "enter");

        assert_eq!(orchestrator.state().active_pane(), ActivePane::Messages);
        assert!(!orchestrator.state().shows_thread_list());
        let view = orchestrator.view();
        assert_eq!(
            view.conversation
                .active()
                .key()
                .and_then(|key| key.context_id.as_ref())
                .map(ContextId::as_str),
            Some("P1")
        );

        key(&mut orchestrator, "esc");
        assert_eq!(orchestrator.state().active_pane(), ActivePane::ThreadList);
        assert!(orchestrator.state().shows_thread_list());
    }

    #[test]
    fn compose_and_send_clears_input() {
        let backend = InMemoryBackend::new();
        seed(&backend, 1, "B", "A", "P1", 10);
        let (mut orchestrator, clock) = orchestrator(&backend, None);
        key(&mut orchestrator, "enter");
        key(&mut orchestrator, "i");

        clock.set(2_000);
        type_text(&mut orchestrator, "Still free?");
        key(&mut orchestrator, "enter");

        assert!(orchestrator.state().message_input().is_empty());
        let view = orchestrator.view();
        assert_eq!(
            view.conversation
                .active()
                .messages()
                .last()
                .map(|m| m.text.as_str()),
            Some("Still free?")
        );
    }

    #[test]
    fn failed_send_keeps_text_and_shows_banner_until_expiry() {
        let backend = InMemoryBackend::new();
        seed(&backend, 1, "B", "A", "P1", 10);
        let (mut orchestrator, clock) = orchestrator(&backend, None);
        key(&mut orchestrator, "enter");
        key(&mut orchestrator, "i");
        type_text(&mut orchestrator, "hi");

        backend.set_unavailable(true);
        key(&mut orchestrator, "enter");

        assert_eq!(orchestrator.state().message_input().text(), "hi");
        assert_eq!(
            orchestrator.state().banner().map(|b| b.text.as_str()),
            Some("Message not sent. Check connection and retry.")
        );

        clock.set(1_000 + BANNER_TTL_MS);
        orchestrator.handle_event(AppEvent::Tick).expect("tick");
        assert!(orchestrator.state().banner().is_none());
    }

    #[test]
    fn d_deletes_newest_own_message_only() {
        let backend = InMemoryBackend::new();
        seed(&backend, 1, "A", "B", "P1", 10);
        seed(&backend, 2, "A", "B", "P1", 20);
        seed(&backend, 3, "B", "A", "P1", 30);
        let (mut orchestrator, _) = orchestrator(&backend, None);
        key(&mut orchestrator, "enter");

        key(&mut orchestrator, "d");

        let view = orchestrator.view();
        let ids: Vec<i64> = view
            .conversation
            .active()
            .messages()
            .iter()
            .map(|m| m.id.get())
            .collect();
        assert_eq!(ids, vec![1, 3]);
    }

    #[test]
    fn focus_lost_writes_offline_presence() {
        let backend = InMemoryBackend::new();
        let (mut orchestrator, _) = orchestrator(&backend, None);

        orchestrator
            .handle_event(AppEvent::FocusChanged { visible: false })
            .expect("focus");

        assert_eq!(
            backend.presence_row(&UserId::new("A")).map(|r| r.is_online),
            Some(false)
        );
    }
}
