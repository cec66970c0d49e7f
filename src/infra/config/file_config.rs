use std::path::PathBuf;

use serde::Deserialize;

use crate::infra::config::{
    AppConfig, BackendConfig, IdentityConfig, LogConfig, PresenceConfig, RealtimeConfig,
    TypingConfig,
};

#[derive(Debug, Deserialize, Default)]
pub struct FileConfig {
    pub logging: Option<FileLogConfig>,
    pub identity: Option<FileIdentityConfig>,
    pub realtime: Option<FileRealtimeConfig>,
    pub typing: Option<FileTypingConfig>,
    pub presence: Option<FilePresenceConfig>,
    pub backend: Option<FileBackendConfig>,
}

impl FileConfig {
    pub fn merge_into(self, config: &mut AppConfig) {
        if let Some(logging) = self.logging {
            logging.merge_into(&mut config.logging);
        }

        if let Some(identity) = self.identity {
            identity.merge_into(&mut config.identity);
        }

        if let Some(realtime) = self.realtime {
            realtime.merge_into(&mut config.realtime);
        }

        if let Some(typing) = self.typing {
            typing.merge_into(&mut config.typing);
        }

        if let Some(presence) = self.presence {
            presence.merge_into(&mut config.presence);
        }

        if let Some(backend) = self.backend {
            backend.merge_into(&mut config.backend);
        }
    }
}

#[derive(Debug, Deserialize, Default)]
pub struct FileLogConfig {
    pub level: Option<String>,
    pub dir: Option<PathBuf>,
}

impl FileLogConfig {
    fn merge_into(self, config: &mut LogConfig) {
        if let Some(level) = self.level {
            config.level = level;
        }

        if let Some(dir) = self.dir {
            config.dir = Some(dir);
        }
    }
}

#[derive(Debug, Deserialize, Default)]
pub struct FileIdentityConfig {
    pub user_id: Option<String>,
}

impl FileIdentityConfig {
    fn merge_into(self, config: &mut IdentityConfig) {
        if let Some(user_id) = self.user_id.filter(|id| !id.trim().is_empty()) {
            config.user_id = Some(user_id);
        }
    }
}

#[derive(Debug, Deserialize, Default)]
pub struct FileRealtimeConfig {
    pub poll_interval_ms: Option<u64>,
    pub target_retry_delay_ms: Option<u64>,
    pub page_size: Option<usize>,
}

impl FileRealtimeConfig {
    fn merge_into(self, config: &mut RealtimeConfig) {
        if let Some(interval) = self.poll_interval_ms {
            config.poll_interval_ms = interval;
        }

        if let Some(delay) = self.target_retry_delay_ms {
            config.target_retry_delay_ms = delay;
        }

        if let Some(page_size) = self.page_size {
            config.page_size = page_size;
        }
    }
}

#[derive(Debug, Deserialize, Default)]
pub struct FileTypingConfig {
    pub idle_timeout_ms: Option<u64>,
    pub refresh_interval_ms: Option<u64>,
    pub clear_after_ms: Option<u64>,
    pub stale_after_ms: Option<u64>,
}

impl FileTypingConfig {
    fn merge_into(self, config: &mut TypingConfig) {
        if let Some(timeout) = self.idle_timeout_ms {
            config.idle_timeout_ms = timeout;
        }

        if let Some(interval) = self.refresh_interval_ms {
            config.refresh_interval_ms = interval;
        }

        if let Some(window) = self.clear_after_ms {
            config.clear_after_ms = window;
        }

        if let Some(window) = self.stale_after_ms {
            config.stale_after_ms = window;
        }
    }
}

#[derive(Debug, Deserialize, Default)]
pub struct FilePresenceConfig {
    pub heartbeat_interval_ms: Option<u64>,
    pub online_fresh_ms: Option<u64>,
    pub recently_active_ms: Option<u64>,
}

impl FilePresenceConfig {
    fn merge_into(self, config: &mut PresenceConfig) {
        if let Some(interval) = self.heartbeat_interval_ms {
            config.heartbeat_interval_ms = interval;
        }

        if let Some(window) = self.online_fresh_ms {
            config.online_fresh_ms = window;
        }

        if let Some(window) = self.recently_active_ms {
            config.recently_active_ms = window;
        }
    }
}

#[derive(Debug, Deserialize, Default)]
pub struct FileBackendConfig {
    pub seed_file: Option<PathBuf>,
}

impl FileBackendConfig {
    fn merge_into(self, config: &mut BackendConfig) {
        if let Some(path) = self.seed_file {
            config.seed_file = Some(path);
        }
    }
}
