//! Style definitions for the UI components.

use ratatui::style::{Color, Modifier, Style};

// =============================================================================
// Panel styles
// =============================================================================

pub fn active_panel_border_style() -> Style {
    Style::default().fg(Color::Cyan)
}

pub fn inactive_panel_border_style() -> Style {
    Style::default().fg(Color::DarkGray)
}

/// Highlight for the selected row in any list.
pub fn selection_style() -> Style {
    Style::default().add_modifier(Modifier::REVERSED | Modifier::BOLD)
}

// =============================================================================
// Thread list styles
// =============================================================================

/// Style for the counterpart name (bold, bright).
pub fn thread_name_style() -> Style {
    Style::default()
        .fg(Color::White)
        .add_modifier(Modifier::BOLD)
}

/// Style for the listing or "direct" tag after the name.
pub fn thread_context_style() -> Style {
    Style::default().fg(Color::Cyan)
}

/// Style for message preview text (dimmed).
pub fn thread_preview_style() -> Style {
    Style::default().fg(Color::DarkGray)
}

/// Style for unread count badge (green).
pub fn unread_count_style() -> Style {
    Style::default().fg(Color::Green)
}

/// Style for timestamp column.
pub fn timestamp_style() -> Style {
    Style::default().fg(Color::DarkGray)
}

/// Style for separator between timestamp and content.
pub fn separator_style() -> Style {
    Style::default().fg(Color::DarkGray)
}

/// Shown in the thread list title while a refresh keeps failing.
pub fn stale_marker_style() -> Style {
    Style::default().fg(Color::Yellow)
}

// =============================================================================
// Message list styles
// =============================================================================

/// Style for message sender name (white, bold).
pub fn message_sender_style() -> Style {
    Style::default()
        .fg(Color::White)
        .add_modifier(Modifier::BOLD)
}

/// Style for message time in the messages panel.
pub fn message_time_style() -> Style {
    Style::default().fg(Color::DarkGray)
}

/// Style for message text content.
pub fn message_text_style() -> Style {
    Style::default().fg(Color::White)
}

/// Style for kind labels like [Inquiry], [Booking].
pub fn message_kind_style() -> Style {
    Style::default().fg(Color::Cyan)
}

/// Style for date separator line.
pub fn date_separator_style() -> Style {
    Style::default().fg(Color::DarkGray)
}

pub fn read_receipt_style() -> Style {
    Style::default().fg(Color::Green)
}

pub fn unread_receipt_style() -> Style {
    Style::default().fg(Color::DarkGray)
}

pub fn typing_style() -> Style {
    Style::default()
        .fg(Color::DarkGray)
        .add_modifier(Modifier::ITALIC)
}

// =============================================================================
// Presence styles
// =============================================================================

pub fn presence_online_style() -> Style {
    Style::default().fg(Color::Green)
}

pub fn presence_recent_style() -> Style {
    Style::default().fg(Color::Yellow)
}

pub fn presence_offline_style() -> Style {
    Style::default().fg(Color::DarkGray)
}

// =============================================================================
// Input and status styles
// =============================================================================

pub fn input_prompt_style() -> Style {
    Style::default()
        .fg(Color::Cyan)
        .add_modifier(Modifier::BOLD)
}

pub fn input_text_style() -> Style {
    Style::default().fg(Color::White)
}

pub fn input_placeholder_style() -> Style {
    Style::default().fg(Color::DarkGray)
}

pub fn status_hint_style() -> Style {
    Style::default().fg(Color::DarkGray)
}

/// Transient failure notice in the status line.
pub fn banner_style() -> Style {
    Style::default()
        .fg(Color::White)
        .bg(Color::Red)
        .add_modifier(Modifier::BOLD)
}
