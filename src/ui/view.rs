use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::Style,
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph},
    Frame,
};
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

use crate::{
    domain::{
        ids::{context_label, UserId},
        presence::PresenceDisplay,
        shell_state::{ActivePane, ShellState},
        thread::Thread,
        thread_list_state::{ThreadListState, ThreadListUiState},
    },
    usecases::{
        contracts::ShellView,
        conversation::{ConversationController, TargetResolution},
    },
};

use super::message_input::render_message_input;
use super::message_rendering::{
    build_message_list_elements, element_to_list_item, message_index_to_element_index,
};
use super::styles;

const ELLIPSIS: &str = "...";

pub fn render(frame: &mut Frame<'_>, view: ShellView<'_>) {
    let ShellView {
        shell,
        conversation,
        now_ms,
    } = view;

    let [content_area, status_area] = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(1), Constraint::Length(1)])
        .areas(frame.area());

    match (shell.shows_thread_list(), shell.shows_thread_pane()) {
        (true, true) => {
            let [list_area, thread_area] = Layout::default()
                .direction(Direction::Horizontal)
                .constraints([Constraint::Percentage(35), Constraint::Percentage(65)])
                .areas(content_area);
            render_thread_list_panel(frame, list_area, conversation, shell.active_pane(), now_ms);
            render_thread_pane(frame, thread_area, shell, conversation, now_ms);
        }
        (true, false) => {
            render_thread_list_panel(frame, content_area, conversation, shell.active_pane(), now_ms)
        }
        _ => render_thread_pane(frame, content_area, shell, conversation, now_ms),
    }

    frame.render_widget(Paragraph::new(status_line(shell)), status_area);
}

fn border_style(is_active: bool) -> Style {
    if is_active {
        styles::active_panel_border_style()
    } else {
        styles::inactive_panel_border_style()
    }
}

fn render_thread_list_panel(
    frame: &mut Frame<'_>,
    area: Rect,
    conversation: &ConversationController,
    active_pane: ActivePane,
    now_ms: i64,
) {
    let thread_list = conversation.thread_list();
    let block = Block::default()
        .title(thread_list_title(thread_list))
        .borders(Borders::ALL)
        .border_style(border_style(active_pane == ActivePane::ThreadList));

    let placeholder = match thread_list.ui_state() {
        ThreadListUiState::Loading => Some("Loading conversations..."),
        ThreadListUiState::Empty => Some("No conversations yet."),
        ThreadListUiState::Error => Some("Failed to load conversations. Press r to retry."),
        ThreadListUiState::Ready => None,
    };

    if let Some(text) = placeholder {
        frame.render_widget(Paragraph::new(text).block(block), area);
        return;
    }

    let inner_width = area.width.saturating_sub(2) as usize;
    let viewer = conversation.viewer();
    let items: Vec<ListItem<'static>> = thread_list
        .threads()
        .iter()
        .map(|thread| ListItem::new(thread_list_item_line(thread, viewer, inner_width, now_ms)))
        .collect();

    let list = List::new(items)
        .block(block)
        .highlight_style(styles::selection_style());

    let mut list_state = ListState::default();
    list_state.select(thread_list.selected_index());
    frame.render_stateful_widget(list, area, &mut list_state);
}

fn thread_list_title(thread_list: &ThreadListState) -> Line<'static> {
    let mut spans = vec![Span::raw(match thread_list.ui_state() {
        ThreadListUiState::Ready => format!("Conversations ({})", thread_list.threads().len()),
        _ => "Conversations".to_owned(),
    })];
    if thread_list.is_stale() {
        spans.push(Span::styled(" [stale]", styles::stale_marker_style()));
    }
    Line::from(spans)
}

fn thread_list_item_line(thread: &Thread, viewer: &UserId, width: usize, now_ms: i64) -> Line<'static> {
    let timestamp = thread
        .last_message()
        .map(|message| format_thread_timestamp(message.created_at_ms, now_ms))
        .unwrap_or_else(|| "     ".to_owned());

    let name = thread.other_user_id().to_string();
    let context = format!(" [{}] ", context_label(thread.context_id()));

    let raw_preview = thread
        .last_message()
        .map(|message| {
            let content = normalize_preview(&message.display_content());
            if message.is_from(viewer) {
                format!("You: {content}")
            } else {
                content
            }
        })
        .filter(|text| !text.is_empty())
        .unwrap_or_else(|| "No messages yet".to_owned());

    let unread_badge = if thread.unread_count > 0 {
        format!(" [{}]", thread.unread_count)
    } else {
        String::new()
    };

    // timestamp (5) + " | " (3)
    let fixed_len = 8 + name.width() + context.width();
    let available = width.saturating_sub(fixed_len + unread_badge.width());
    let preview = truncate_to_width(&raw_preview, available);
    let padding = available.saturating_sub(preview.width());

    let mut spans = vec![
        Span::styled(format!("{timestamp:>5}"), styles::timestamp_style()),
        Span::styled(" | ", styles::separator_style()),
        Span::styled(name, styles::thread_name_style()),
        Span::styled(context, styles::thread_context_style()),
        Span::styled(preview, styles::thread_preview_style()),
    ];

    if padding > 0 {
        spans.push(Span::raw(" ".repeat(padding)));
    }

    if !unread_badge.is_empty() {
        spans.push(Span::styled(unread_badge, styles::unread_count_style()));
    }

    Line::from(spans)
}

/// Cuts `text` to at most `max_width` terminal columns, ending in "..." when shortened.
fn truncate_to_width(text: &str, max_width: usize) -> String {
    if text.width() <= max_width {
        return text.to_owned();
    }

    let budget = max_width.saturating_sub(ELLIPSIS.len());
    let mut used = 0;
    let mut out = String::new();
    for ch in text.chars() {
        let ch_width = ch.width().unwrap_or(0);
        if used + ch_width > budget {
            break;
        }
        used += ch_width;
        out.push(ch);
    }

    if max_width >= ELLIPSIS.len() {
        out.push_str(ELLIPSIS);
    }
    out
}

fn format_thread_timestamp(timestamp_ms: i64, now_ms: i64) -> String {
    use chrono::{Local, TimeZone};

    let datetime = match Local.timestamp_millis_opt(timestamp_ms) {
        chrono::LocalResult::Single(dt) => dt,
        chrono::LocalResult::Ambiguous(dt, _) => dt,
        chrono::LocalResult::None => return "     ".to_owned(),
    };

    let today = match Local.timestamp_millis_opt(now_ms) {
        chrono::LocalResult::Single(dt) | chrono::LocalResult::Ambiguous(dt, _) => dt.date_naive(),
        chrono::LocalResult::None => Local::now().date_naive(),
    };

    if datetime.date_naive() == today {
        datetime.format("%H:%M").to_string()
    } else {
        datetime.format("%d.%m").to_string()
    }
}

fn normalize_preview(preview: &str) -> String {
    preview.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn render_thread_pane(
    frame: &mut Frame<'_>,
    area: Rect,
    shell: &ShellState,
    conversation: &mut ConversationController,
    now_ms: i64,
) {
    let [messages_area, indicator_area, input_area] = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(1),
            Constraint::Length(1),
            Constraint::Length(3),
        ])
        .areas(area);

    let active_pane = shell.active_pane();
    render_messages_panel(frame, messages_area, conversation, active_pane);

    let presence = conversation.counterpart_presence(now_ms);
    let typing = conversation.typing_label(now_ms);
    frame.render_widget(
        Paragraph::new(indicator_line(presence, typing.as_deref(), now_ms)),
        indicator_area,
    );

    render_message_input(frame, input_area, shell.message_input(), active_pane);
}

fn render_messages_panel(
    frame: &mut Frame<'_>,
    area: Rect,
    conversation: &mut ConversationController,
    active_pane: ActivePane,
) {
    let block = Block::default()
        .title(thread_pane_title(conversation))
        .borders(Borders::ALL)
        .border_style(border_style(active_pane == ActivePane::Messages));

    if !conversation.active().is_open() {
        let text = closed_pane_text(conversation.target_resolution());
        frame.render_widget(Paragraph::new(text).block(block), area);
        return;
    }

    if conversation.active().messages().is_empty() {
        frame.render_widget(Paragraph::new("No messages yet").block(block), area);
        return;
    }

    let elements = build_message_list_elements(conversation.active().messages(), conversation.viewer());
    let items: Vec<ListItem<'static>> = elements.iter().map(element_to_list_item).collect();

    let viewport_height = area.height.saturating_sub(2) as usize;
    let element_index = conversation
        .active()
        .selected_index()
        .and_then(|index| message_index_to_element_index(&elements, index));

    if let Some(index) = element_index {
        conversation
            .active_mut()
            .update_scroll_offset(index, viewport_height);
    }

    let list = List::new(items)
        .block(block)
        .highlight_style(styles::selection_style());

    let mut list_state = ListState::default();
    list_state.select(element_index);
    *list_state.offset_mut() = conversation.active().scroll_offset();
    frame.render_stateful_widget(list, area, &mut list_state);
}

fn thread_pane_title(conversation: &ConversationController) -> String {
    match conversation.active().key() {
        Some(key) => format!(
            "{} [{}]",
            key.other_user_id,
            context_label(key.context_id.as_ref())
        ),
        None => "Conversation".to_owned(),
    }
}

fn closed_pane_text(resolution: &TargetResolution) -> &'static str {
    match resolution {
        TargetResolution::Pending | TargetResolution::RetryAt { .. } => "Looking for the conversation...",
        TargetResolution::NoTarget | TargetResolution::Resolved | TargetResolution::GaveUp => {
            "Select a conversation to view messages"
        }
    }
}

/// Presence of the counterpart on the left, typing notice after it.
fn indicator_line(presence: Option<PresenceDisplay>, typing: Option<&str>, now_ms: i64) -> Line<'static> {
    let mut spans = Vec::new();

    if let Some(presence) = presence {
        let (dot, style) = match presence {
            PresenceDisplay::Online => ("\u{25CF} ", styles::presence_online_style()),
            PresenceDisplay::RecentlyActive { .. } => ("\u{25CF} ", styles::presence_recent_style()),
            PresenceDisplay::Offline { .. } => ("\u{25CB} ", styles::presence_offline_style()),
        };
        spans.push(Span::styled(format!("{dot}{}", presence.label(now_ms)), style));
    }

    if let Some(typing) = typing {
        if !spans.is_empty() {
            spans.push(Span::raw("  "));
        }
        spans.push(Span::styled(typing.to_owned(), styles::typing_style()));
    }

    Line::from(spans)
}

fn status_line(shell: &ShellState) -> Line<'static> {
    if let Some(banner) = shell.banner() {
        return Line::from(Span::styled(banner.text.clone(), styles::banner_style()));
    }

    let hint = match shell.active_pane() {
        ActivePane::ThreadList => "j/k: navigate | l/Enter: open | r: refresh | q: quit",
        ActivePane::Messages => {
            "j/k: navigate | i: compose | d: delete last sent | h/Esc: back | q: quit"
        }
        ActivePane::Compose => "Enter: send | Esc: stop composing | Ctrl+C: quit",
    };
    Line::from(Span::styled(hint, styles::status_hint_style()))
}
