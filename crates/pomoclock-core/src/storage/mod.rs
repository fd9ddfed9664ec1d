mod config;

pub use config::{LoggingSettings, ScheduleSettings, Settings};

use std::path::PathBuf;

/// Returns `~/.config/pomoclock[-dev]/` based on POMOCLOCK_ENV.
///
/// Set POMOCLOCK_ENV=dev to use development data directory.
///
/// # Errors
/// Returns an error if creating the config directory fails.
pub fn data_dir() -> crate::Result<PathBuf> {
    let base_dir = dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config");

    let env = std::env::var("POMOCLOCK_ENV").unwrap_or_else(|_| "production".to_string());

    let dir = if env == "dev" {
        base_dir.join("pomoclock-dev")
    } else {
        base_dir.join("pomoclock")
    };

    std::fs::create_dir_all(&dir)?;
    Ok(dir)
}

/// Default location of the settings file.
pub fn default_settings_path() -> crate::Result<PathBuf> {
    Ok(data_dir()?.join("config.toml"))
}
