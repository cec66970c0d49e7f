use std::{fs, path::Path};

use crate::infra::{
    config::{file_config::FileConfig, AppConfig},
    error::AppError,
};

/// Defaults overlaid with whatever the file sets. A missing file is not an error.
pub fn load(path: Option<&Path>) -> Result<AppConfig, AppError> {
    let mut config = AppConfig::default();
    let Some(config_path) = path.filter(|path| path.exists()) else {
        return Ok(config);
    };

    let raw = fs::read_to_string(config_path).map_err(|source| AppError::ConfigRead {
        path: config_path.to_path_buf(),
        source,
    })?;

    let file_config: FileConfig = toml::from_str(&raw).map_err(|source| AppError::ConfigParse {
        path: config_path.to_path_buf(),
        source,
    })?;

    file_config.merge_into(&mut config);
    Ok(config)
}
