//! Message input field rendering.

use ratatui::{
    layout::Rect,
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};
use unicode_width::UnicodeWidthStr;

use crate::domain::{message_input_state::MessageInputState, shell_state::ActivePane};

use super::styles;

const PLACEHOLDER_TEXT: &str = "Press 'i' to type a message...";

const PROMPT_SYMBOL: &str = "> ";

/// Renders the compose box; the cursor is only placed while composing.
pub fn render_message_input(
    frame: &mut Frame<'_>,
    area: Rect,
    input_state: &MessageInputState,
    active_pane: ActivePane,
) {
    let is_focused = active_pane == ActivePane::Compose;

    let border_style = if is_focused {
        styles::active_panel_border_style()
    } else {
        styles::inactive_panel_border_style()
    };

    let line = build_input_line(input_state, is_focused);

    let paragraph = Paragraph::new(line).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(border_style),
    );

    frame.render_widget(paragraph, area);

    if is_focused {
        let cursor_x = area
            .x
            .saturating_add(1)
            .saturating_add(PROMPT_SYMBOL.len() as u16)
            .saturating_add(cursor_column(input_state).min(u16::MAX as usize) as u16);
        let cursor_y = area.y.saturating_add(1);
        frame.set_cursor_position((cursor_x, cursor_y));
    }
}

/// Terminal columns before the cursor; wide characters take two.
fn cursor_column(input_state: &MessageInputState) -> usize {
    let before: String = input_state
        .text()
        .chars()
        .take(input_state.cursor_position())
        .collect();
    before.width()
}

/// Builds the line content for the input field.
fn build_input_line(input_state: &MessageInputState, is_focused: bool) -> Line<'static> {
    let prompt_style = styles::input_prompt_style();

    let body = if !is_focused && input_state.is_empty() {
        Span::styled(PLACEHOLDER_TEXT.to_owned(), styles::input_placeholder_style())
    } else {
        Span::styled(input_state.text().to_owned(), styles::input_text_style())
    };

    Line::from(vec![Span::styled(PROMPT_SYMBOL.to_owned(), prompt_style), body])
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line_text(line: &Line<'_>) -> String {
        line.spans.iter().map(|s| s.content.as_ref()).collect()
    }

    fn typed(text: &str) -> MessageInputState {
        let mut state = MessageInputState::default();
        for ch in text.chars() {
            state.insert_char(ch);
        }
        state
    }

    #[test]
    fn idle_empty_composer_shows_placeholder() {
        let text = line_text(&build_input_line(&MessageInputState::default(), false));

        assert_eq!(text, format!("{PROMPT_SYMBOL}{PLACEHOLDER_TEXT}"));
    }

    #[test]
    fn composing_with_no_text_shows_bare_prompt() {
        let text = line_text(&build_input_line(&MessageInputState::default(), true));

        assert_eq!(text, PROMPT_SYMBOL);
    }

    #[test]
    fn draft_survives_leaving_compose() {
        let state = typed("Is parking included?");

        let text = line_text(&build_input_line(&state, false));

        assert_eq!(text, format!("{PROMPT_SYMBOL}Is parking included?"));
    }

    #[test]
    fn cursor_column_counts_wide_characters_twice() {
        let mut state = typed("a\u{4F60}b");
        state.move_cursor_left();

        assert_eq!(cursor_column(&state), 3);
    }

    #[test]
    fn placeholder_points_at_the_compose_key() {
        assert!(PLACEHOLDER_TEXT.contains("'i'"));
    }
}
