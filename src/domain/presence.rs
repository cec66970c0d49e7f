use chrono::{DateTime, Local};

use super::ids::UserId;

const MINUTE_MS: i64 = 60_000;
const HOUR_MS: i64 = 60 * MINUTE_MS;
const DAY_MS: i64 = 24 * HOUR_MS;
const WEEK_MS: i64 = 7 * DAY_MS;

/// Last-write-wins presence row for one user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PresenceRecord {
    pub user_id: UserId,
    pub is_online: bool,
    pub last_seen_at_ms: i64,
}

/// Recency windows used to interpret a presence row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PresenceWindows {
    pub online_fresh_ms: i64,
    pub recently_active_ms: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PresenceDisplay {
    Online,
    RecentlyActive { last_seen_at_ms: i64 },
    Offline { last_seen_at_ms: Option<i64> },
}

impl PresenceDisplay {
    pub fn label(&self, now_ms: i64) -> String {
        match self {
            Self::Online => "Online".to_owned(),
            Self::RecentlyActive { .. } => "Recently active".to_owned(),
            Self::Offline {
                last_seen_at_ms: Some(at),
            } => format!("Last seen {}", format_relative(*at, now_ms)),
            Self::Offline {
                last_seen_at_ms: None,
            } => "Offline".to_owned(),
        }
    }
}

/// An `is_online` flag is only trusted while `last_seen_at` is fresh; a stale
/// online row degrades to recently active or offline.
pub fn presence_display(
    record: Option<&PresenceRecord>,
    now_ms: i64,
    windows: PresenceWindows,
) -> PresenceDisplay {
    let Some(record) = record else {
        return PresenceDisplay::Offline {
            last_seen_at_ms: None,
        };
    };

    let age = now_ms.saturating_sub(record.last_seen_at_ms);
    if record.is_online && age < windows.online_fresh_ms {
        PresenceDisplay::Online
    } else if age < windows.recently_active_ms {
        PresenceDisplay::RecentlyActive {
            last_seen_at_ms: record.last_seen_at_ms,
        }
    } else {
        PresenceDisplay::Offline {
            last_seen_at_ms: Some(record.last_seen_at_ms),
        }
    }
}

/// "Just now", "5m ago", "3h ago", "2d ago", then a calendar date.
pub fn format_relative(timestamp_ms: i64, now_ms: i64) -> String {
    let age = now_ms.saturating_sub(timestamp_ms).max(0);

    match age {
        age if age < MINUTE_MS => "Just now".to_owned(),
        age if age < HOUR_MS => format!("{}m ago", age / MINUTE_MS),
        age if age < DAY_MS => format!("{}h ago", age / HOUR_MS),
        age if age < WEEK_MS => format!("{}d ago", age / DAY_MS),
        _ => match DateTime::from_timestamp_millis(timestamp_ms) {
            Some(at) => at.with_timezone(&Local).format("%b %-d, %Y").to_string(),
            None => "a long time ago".to_owned(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const WINDOWS: PresenceWindows = PresenceWindows {
        online_fresh_ms: 60_000,
        recently_active_ms: 5 * 60_000,
    };

    fn record(is_online: bool, last_seen_at_ms: i64) -> PresenceRecord {
        PresenceRecord {
            user_id: UserId::new("B"),
            is_online,
            last_seen_at_ms,
        }
    }

    #[test]
    fn fresh_online_record_displays_online() {
        let now = 1_000_000;

        let display = presence_display(Some(&record(true, now - 20_000)), now, WINDOWS);

        assert_eq!(display, PresenceDisplay::Online);
        assert_eq!(display.label(now), "Online");
    }

    #[test]
    fn stale_online_record_degrades_to_recently_active() {
        let now = 1_000_000;

        let display = presence_display(Some(&record(true, now - 2 * 60_000)), now, WINDOWS);

        assert!(matches!(display, PresenceDisplay::RecentlyActive { .. }));
        assert_eq!(display.label(now), "Recently active");
    }

    #[test]
    fn online_flag_six_minutes_old_falls_through_to_last_seen() {
        let now = 10_000_000;

        let display = presence_display(Some(&record(true, now - 6 * 60_000)), now, WINDOWS);

        assert_eq!(
            display,
            PresenceDisplay::Offline {
                last_seen_at_ms: Some(now - 6 * 60_000)
            }
        );
        assert_eq!(display.label(now), "Last seen 6m ago");
    }

    #[test]
    fn missing_record_is_offline() {
        let display = presence_display(None, 0, WINDOWS);

        assert_eq!(display.label(0), "Offline");
    }

    #[test]
    fn relative_time_tiers() {
        let now = 100 * DAY_MS;

        assert_eq!(format_relative(now - 30_000, now), "Just now");
        assert_eq!(format_relative(now - 5 * MINUTE_MS, now), "5m ago");
        assert_eq!(format_relative(now - 3 * HOUR_MS, now), "3h ago");
        assert_eq!(format_relative(now - 2 * DAY_MS, now), "2d ago");
    }

    #[test]
    fn relative_time_uses_calendar_date_after_a_week() {
        let now = 1_700_000_000_000;

        let label = format_relative(now - 30 * DAY_MS, now);

        assert!(!label.ends_with("ago"));
        assert!(label.contains("2023"));
    }

    #[test]
    fn future_timestamps_read_as_just_now() {
        assert_eq!(format_relative(5_000, 1_000), "Just now");
    }
}
