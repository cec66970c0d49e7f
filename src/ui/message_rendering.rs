//! Message list rendering for the active thread.
//!
//! Consecutive messages from one sender share a header, a date separator
//! starts every new day, and the viewer's own messages carry a read mark.

use chrono::{Local, TimeZone};
use ratatui::{
    layout::Alignment,
    text::{Line, Span},
    widgets::ListItem,
};

use crate::domain::{ids::UserId, message::Message};

use super::styles;

const INDENT: &str = "      ";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MessageListElement {
    DateSeparator(String),
    Message {
        time: String,
        sender: Option<String>,
        content: String,
        /// `Some` only for the viewer's own messages.
        read: Option<bool>,
    },
}

pub fn build_message_list_elements(messages: &[Message], viewer: &UserId) -> Vec<MessageListElement> {
    let mut elements = Vec::new();
    let mut prev_date: Option<chrono::NaiveDate> = None;
    let mut prev_sender: Option<&UserId> = None;

    for message in messages {
        let msg_date = timestamp_to_date(message.created_at_ms);

        if prev_date != Some(msg_date) {
            elements.push(MessageListElement::DateSeparator(format_date(msg_date)));
            prev_sender = None;
        }

        let sender = (prev_sender != Some(&message.sender_id))
            .then(|| sender_label(message, viewer).to_owned());

        elements.push(MessageListElement::Message {
            time: format_time(message.created_at_ms),
            sender,
            content: message.display_content(),
            read: message.is_from(viewer).then(|| message.is_read()),
        });

        prev_date = Some(msg_date);
        prev_sender = Some(&message.sender_id);
    }

    elements
}

/// Element index of the `message_index`-th message, skipping separators.
pub fn message_index_to_element_index(
    elements: &[MessageListElement],
    message_index: usize,
) -> Option<usize> {
    elements
        .iter()
        .enumerate()
        .filter(|(_, element)| matches!(element, MessageListElement::Message { .. }))
        .nth(message_index)
        .map(|(index, _)| index)
}

pub fn element_to_list_item(element: &MessageListElement) -> ListItem<'static> {
    match element {
        MessageListElement::DateSeparator(date) => date_separator_item(date),
        MessageListElement::Message {
            time,
            sender,
            content,
            read,
        } => ListItem::new(message_lines(time, sender.as_deref(), content, *read)),
    }
}

fn date_separator_item(date: &str) -> ListItem<'static> {
    let line = Line::from(vec![Span::styled(
        format!("--- {date} ---"),
        styles::date_separator_style(),
    )])
    .alignment(Alignment::Center);
    ListItem::new(vec![Line::default(), line])
}

fn message_lines(time: &str, sender: Option<&str>, content: &str, read: Option<bool>) -> Vec<Line<'static>> {
    let mut lines = Vec::new();
    let mut content_lines = content.lines();
    let time_span = Span::styled(format!("{time:>5} "), styles::message_time_style());

    match sender {
        Some(name) => {
            lines.push(Line::from(vec![
                time_span,
                Span::styled(format!("{name}:"), styles::message_sender_style()),
            ]));
            if let Some(first) = content_lines.next() {
                lines.push(indented(first));
            }
        }
        None => {
            let mut spans = vec![time_span];
            spans.extend(build_content_line_spans(content_lines.next().unwrap_or_default()));
            lines.push(Line::from(spans));
        }
    }

    lines.extend(content_lines.map(indented));

    if let (Some(read), Some(last)) = (read, lines.last_mut()) {
        let (mark, style) = if read {
            (" \u{2713}", styles::read_receipt_style())
        } else {
            (" \u{2022}", styles::unread_receipt_style())
        };
        last.spans.push(Span::styled(mark.to_owned(), style));
    }

    lines
}

fn indented(text: &str) -> Line<'static> {
    let mut spans = vec![Span::raw(INDENT.to_owned())];
    spans.extend(build_content_line_spans(text));
    Line::from(spans)
}

/// Highlights a leading kind label such as `[Inquiry]`.
fn build_content_line_spans(text: &str) -> Vec<Span<'static>> {
    if text.starts_with('[') {
        if let Some(end_bracket) = text.find(']') {
            let label = &text[..=end_bracket];
            let rest = text[end_bracket + 1..].trim_start();

            let mut spans = vec![Span::styled(label.to_owned(), styles::message_kind_style())];
            if !rest.is_empty() {
                spans.push(Span::raw(" ".to_owned()));
                spans.push(Span::styled(rest.to_owned(), styles::message_text_style()));
            }
            return spans;
        }
    }

    vec![Span::styled(text.to_owned(), styles::message_text_style())]
}

fn sender_label<'a>(message: &'a Message, viewer: &UserId) -> &'a str {
    if message.is_from(viewer) {
        "You"
    } else {
        message.sender_id.as_str()
    }
}

fn timestamp_to_date(timestamp_ms: i64) -> chrono::NaiveDate {
    match Local.timestamp_millis_opt(timestamp_ms) {
        chrono::LocalResult::Single(dt) => dt.date_naive(),
        chrono::LocalResult::Ambiguous(dt, _) => dt.date_naive(),
        chrono::LocalResult::None => Local::now().date_naive(),
    }
}

fn format_date(date: chrono::NaiveDate) -> String {
    date.format("%-d %b %Y").to_string()
}

fn format_time(timestamp_ms: i64) -> String {
    match Local.timestamp_millis_opt(timestamp_ms) {
        chrono::LocalResult::Single(dt) => dt.format("%H:%M").to_string(),
        chrono::LocalResult::Ambiguous(dt, _) => dt.format("%H:%M").to_string(),
        chrono::LocalResult::None => "??:??".to_owned(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{
        ids::MessageId,
        message::MessageKind,
    };

    // UTC instants; rendering uses the local zone, but day boundaries between
    // these two stay distinct in every zone.
    const FEB_14_2026_10AM: i64 = 1771063200000;
    const FEB_15_2026_1PM: i64 = 1771160400000;

    fn msg(id: i64, sender: &str, text: &str, ts_ms: i64) -> Message {
        let recipient = if sender == "me" { "them" } else { "me" };
        Message {
            id: MessageId::new(id),
            context_id: None,
            sender_id: UserId::new(sender),
            recipient_id: UserId::new(recipient),
            text: text.to_owned(),
            kind: MessageKind::General,
            created_at_ms: ts_ms,
            read_at_ms: None,
        }
    }

    fn me() -> UserId {
        UserId::new("me")
    }

    fn line_text(line: &Line<'_>) -> String {
        line.spans.iter().map(|s| s.content.as_ref()).collect()
    }

    #[test]
    fn builds_date_separator_for_first_message() {
        let elements = build_message_list_elements(&[msg(1, "them", "Hello", FEB_14_2026_10AM)], &me());

        assert_eq!(elements.len(), 2);
        assert!(matches!(&elements[0], MessageListElement::DateSeparator(_)));
    }

    #[test]
    fn groups_consecutive_messages_from_same_sender() {
        let messages = vec![
            msg(1, "them", "First", FEB_14_2026_10AM),
            msg(2, "them", "Second", FEB_14_2026_10AM + 60_000),
        ];

        let elements = build_message_list_elements(&messages, &me());

        assert!(matches!(&elements[1], MessageListElement::Message { sender: Some(_), .. }));
        assert!(matches!(&elements[2], MessageListElement::Message { sender: None, .. }));
    }

    #[test]
    fn own_messages_show_you_and_a_read_mark() {
        let mut read = msg(1, "me", "Is it free?", FEB_14_2026_10AM);
        read.read_at_ms = Some(FEB_14_2026_10AM + 1);
        let messages = vec![read, msg(2, "them", "Yes", FEB_14_2026_10AM + 60_000)];

        let elements = build_message_list_elements(&messages, &me());

        assert!(matches!(
            &elements[1],
            MessageListElement::Message { sender: Some(name), read: Some(true), .. } if name == "You"
        ));
        assert!(matches!(
            &elements[2],
            MessageListElement::Message { sender: Some(name), read: None, .. } if name == "them"
        ));
    }

    #[test]
    fn new_day_starts_with_separator_and_fresh_header() {
        let messages = vec![
            msg(1, "them", "Day one", FEB_14_2026_10AM),
            msg(2, "them", "Day two", FEB_15_2026_1PM),
        ];

        let elements = build_message_list_elements(&messages, &me());

        assert_eq!(elements.len(), 4);
        assert!(matches!(&elements[2], MessageListElement::DateSeparator(_)));
        assert!(matches!(&elements[3], MessageListElement::Message { sender: Some(_), .. }));
    }

    #[test]
    fn kind_label_is_split_from_text() {
        let spans = build_content_line_spans("[Inquiry] Still available?");

        assert_eq!(spans.len(), 3);
        assert_eq!(spans[0].content.as_ref(), "[Inquiry]");
        assert_eq!(spans[0].style, styles::message_kind_style());
    }

    #[test]
    fn unread_own_message_ends_with_bullet() {
        let lines = message_lines("10:00", Some("You"), "hi", Some(false));

        assert_eq!(lines.len(), 2);
        assert!(line_text(&lines[1]).ends_with("hi \u{2022}"));
    }

    #[test]
    fn grouped_multiline_message_keeps_time_on_first_line() {
        let lines = message_lines("10:01", None, "one\ntwo", None);

        assert_eq!(line_text(&lines[0]), "10:01 one");
        assert_eq!(line_text(&lines[1]), format!("{INDENT}two"));
    }

    #[test]
    fn message_index_skips_separators() {
        let messages = vec![
            msg(1, "them", "a", FEB_14_2026_10AM),
            msg(2, "them", "b", FEB_15_2026_1PM),
        ];
        let elements = build_message_list_elements(&messages, &me());

        assert_eq!(message_index_to_element_index(&elements, 0), Some(1));
        assert_eq!(message_index_to_element_index(&elements, 1), Some(3));
        assert_eq!(message_index_to_element_index(&elements, 2), None);
        assert_eq!(message_index_to_element_index(&[], 0), None);
    }
}
