use std::path::{Path, PathBuf};

use anyhow::Result;

use crate::infra::{
    config::{load, AppConfig},
    contracts::ConfigAdapter,
};

/// Loads `config.toml` and layers command-line overrides on top.
#[derive(Debug, Clone, Default)]
pub struct FileConfigAdapter {
    path: Option<PathBuf>,
    user_override: Option<String>,
}

impl FileConfigAdapter {
    pub fn new(path: Option<&Path>) -> Self {
        Self {
            path: path.map(Path::to_path_buf),
            user_override: None,
        }
    }

    /// `--as USER` wins over `identity.user_id` from the file.
    pub fn with_user_override(mut self, user_id: Option<&str>) -> Self {
        self.user_override = user_id
            .map(str::trim)
            .filter(|id| !id.is_empty())
            .map(str::to_owned);
        self
    }
}

impl ConfigAdapter for FileConfigAdapter {
    fn load(&self) -> Result<AppConfig> {
        let mut config = load(self.path.as_deref())?;
        if let Some(user_id) = &self.user_override {
            config.identity.user_id = Some(user_id.clone());
        }
        Ok(config)
    }
}
