use crate::{domain::ids::UserId, infra::config::AppConfig};

#[derive(Debug)]
pub struct AppContext {
    pub config: AppConfig,
    pub viewer: UserId,
}

impl AppContext {
    pub fn new(config: AppConfig, viewer: UserId) -> Self {
        Self { config, viewer }
    }
}
