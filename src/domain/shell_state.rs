use super::message_input_state::MessageInputState;

/// Terminals narrower than this show one pane at a time.
pub const NARROW_WIDTH_THRESHOLD: u16 = 80;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ActivePane {
    #[default]
    ThreadList,
    Messages,
    Compose,
}

/// Transient notice shown in the status line, e.g. a failed send.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Banner {
    pub text: String,
    pub expires_at_ms: i64,
}

/// Presentation-only state; conversation data lives in the controller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShellState {
    running: bool,
    active_pane: ActivePane,
    narrow: bool,
    message_input: MessageInputState,
    banner: Option<Banner>,
}

impl Default for ShellState {
    fn default() -> Self {
        Self {
            running: true,
            active_pane: ActivePane::ThreadList,
            narrow: false,
            message_input: MessageInputState::default(),
            banner: None,
        }
    }
}

impl ShellState {
    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn stop(&mut self) {
        self.running = false;
    }

    pub fn active_pane(&self) -> ActivePane {
        self.active_pane
    }

    pub fn set_active_pane(&mut self, pane: ActivePane) {
        self.active_pane = pane;
    }

    #[cfg(test)]
    pub fn is_narrow(&self) -> bool {
        self.narrow
    }

    pub fn set_width(&mut self, width: u16) {
        self.narrow = width < NARROW_WIDTH_THRESHOLD;
    }

    /// On narrow terminals only one pane is drawn; it follows focus.
    pub fn shows_thread_list(&self) -> bool {
        !self.narrow || self.active_pane == ActivePane::ThreadList
    }

    pub fn shows_thread_pane(&self) -> bool {
        !self.narrow || self.active_pane != ActivePane::ThreadList
    }

    pub fn message_input(&self) -> &MessageInputState {
        &self.message_input
    }

    pub fn message_input_mut(&mut self) -> &mut MessageInputState {
        &mut self.message_input
    }

    pub fn banner(&self) -> Option<&Banner> {
        self.banner.as_ref()
    }

    pub fn show_banner(&mut self, text: impl Into<String>, expires_at_ms: i64) {
        self.banner = Some(Banner {
            text: text.into(),
            expires_at_ms,
        });
    }

    pub fn expire_banner(&mut self, now_ms: i64) {
        if self
            .banner
            .as_ref()
            .is_some_and(|banner| now_ms >= banner.expires_at_ms)
        {
            self.banner = None;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wide_terminal_shows_both_panes() {
        let mut state = ShellState::default();
        state.set_width(120);

        assert!(state.shows_thread_list());
        assert!(state.shows_thread_pane());
    }

    #[test]
    fn narrow_terminal_swaps_panes_with_focus() {
        let mut state = ShellState::default();
        state.set_width(60);

        assert!(state.shows_thread_list());
        assert!(!state.shows_thread_pane());

        state.set_active_pane(ActivePane::Messages);
        assert!(!state.shows_thread_list());
        assert!(state.shows_thread_pane());
    }

    #[test]
    fn banner_expires_after_deadline() {
        let mut state = ShellState::default();
        state.show_banner("Send failed", 1_000);

        state.expire_banner(999);
        assert!(state.banner().is_some());

        state.expire_banner(1_000);
        assert!(state.banner().is_none());
    }
}
