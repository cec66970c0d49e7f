use std::path::PathBuf;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct AppConfig {
    pub logging: LogConfig,
    pub identity: IdentityConfig,
    pub realtime: RealtimeConfig,
    pub typing: TypingConfig,
    pub presence: PresenceConfig,
    pub backend: BackendConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LogConfig {
    pub level: String,
    /// Directory for the rolling log file. Defaults to the state dir.
    pub dir: Option<PathBuf>,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "info".to_owned(),
            dir: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct IdentityConfig {
    pub user_id: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RealtimeConfig {
    pub poll_interval_ms: u64,
    pub target_retry_delay_ms: u64,
    pub page_size: usize,
}

impl Default for RealtimeConfig {
    fn default() -> Self {
        Self {
            poll_interval_ms: 10_000,
            target_retry_delay_ms: 1_000,
            page_size: 500,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TypingConfig {
    pub idle_timeout_ms: u64,
    pub refresh_interval_ms: u64,
    pub clear_after_ms: u64,
    pub stale_after_ms: u64,
}

impl Default for TypingConfig {
    fn default() -> Self {
        Self {
            idle_timeout_ms: 1_000,
            refresh_interval_ms: 3_000,
            clear_after_ms: 5_000,
            stale_after_ms: 10_000,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PresenceConfig {
    pub heartbeat_interval_ms: u64,
    pub online_fresh_ms: u64,
    pub recently_active_ms: u64,
}

impl Default for PresenceConfig {
    fn default() -> Self {
        Self {
            heartbeat_interval_ms: 30_000,
            online_fresh_ms: 60_000,
            recently_active_ms: 300_000,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct BackendConfig {
    pub seed_file: Option<PathBuf>,
}
