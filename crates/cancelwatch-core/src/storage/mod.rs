mod config;

pub use config::{ApiConfig, Config, CountdownConfig};

use std::path::PathBuf;

use crate::error::ConfigError;

/// Returns `~/.config/cancelwatch[-dev]/` based on CANCELWATCH_ENV.
///
/// Set CANCELWATCH_ENV=dev to use the development directory.
///
/// # Errors
/// Returns an error if creating the directory fails.
pub fn data_dir() -> Result<PathBuf, ConfigError> {
    let base_dir = dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config");

    let env = std::env::var("CANCELWATCH_ENV").unwrap_or_else(|_| "production".to_string());

    let dir = if env == "dev" {
        base_dir.join("cancelwatch-dev")
    } else {
        base_dir.join("cancelwatch")
    };

    std::fs::create_dir_all(&dir).map_err(|source| ConfigError::DataDir {
        path: dir.clone(),
        source,
    })?;
    Ok(dir)
}
