//! Composer state for the active thread.

/// Maximum accepted message length, in characters.
const MAX_INPUT_LENGTH: usize = 2000;

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct MessageInputState {
    text: String,
    /// Character index, not byte.
    cursor: usize,
}

impl MessageInputState {
    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn cursor_position(&self) -> usize {
        self.cursor
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    /// Returns false when the input is already at the length limit.
    pub fn insert_char(&mut self, ch: char) -> bool {
        if self.text.chars().count() >= MAX_INPUT_LENGTH {
            return false;
        }
        let at = self.byte_index(self.cursor);
        self.text.insert(at, ch);
        self.cursor += 1;
        true
    }

    pub fn delete_char_before(&mut self) -> bool {
        if self.cursor == 0 {
            return false;
        }
        self.cursor -= 1;
        let start = self.byte_index(self.cursor);
        let end = self.byte_index(self.cursor + 1);
        self.text.drain(start..end);
        true
    }

    pub fn move_cursor_left(&mut self) {
        self.cursor = self.cursor.saturating_sub(1);
    }

    pub fn move_cursor_right(&mut self) {
        self.cursor = (self.cursor + 1).min(self.text.chars().count());
    }

    /// Clears the composer and hands back what was typed.
    pub fn take(&mut self) -> String {
        self.cursor = 0;
        std::mem::take(&mut self.text)
    }

    fn byte_index(&self, char_index: usize) -> usize {
        self.text
            .char_indices()
            .nth(char_index)
            .map(|(byte_index, _)| byte_index)
            .unwrap_or(self.text.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insert_and_delete_respect_cursor() {
        let mut state = MessageInputState::default();
        state.insert_char('h');
        state.insert_char('i');
        state.move_cursor_left();
        state.insert_char('é');

        assert_eq!(state.text(), "héi");
        assert!(state.delete_char_before());
        assert_eq!(state.text(), "hi");
        assert_eq!(state.cursor_position(), 1);
    }

    #[test]
    fn delete_at_start_is_noop() {
        let mut state = MessageInputState::default();

        assert!(!state.delete_char_before());
        assert!(state.is_empty());
    }

    #[test]
    fn take_returns_text_and_resets() {
        let mut state = MessageInputState::default();
        state.insert_char('o');
        state.insert_char('k');

        assert_eq!(state.take(), "ok");
        assert!(state.is_empty());
        assert_eq!(state.cursor_position(), 0);
    }

    #[test]
    fn rejects_input_beyond_limit() {
        let mut state = MessageInputState::default();
        for _ in 0..MAX_INPUT_LENGTH {
            assert!(state.insert_char('x'));
        }

        assert!(!state.insert_char('y'));
    }

    #[test]
    fn cursor_right_stops_at_end() {
        let mut state = MessageInputState::default();
        state.insert_char('a');

        state.move_cursor_right();

        assert_eq!(state.cursor_position(), 1);
    }
}
