mod adapter;
mod app_config;
mod file_config;
mod loader;

pub use adapter::FileConfigAdapter;
pub use app_config::{
    AppConfig, BackendConfig, IdentityConfig, LogConfig, PresenceConfig, RealtimeConfig,
    TypingConfig,
};
pub use loader::load;
