//! TOML-based user settings.
//!
//! Stores the user's schedule preferences (in minutes) and logging level.
//! Schedule values are kept loosely typed: whatever the file holds is handed
//! to [`Configuration::validate`], which substitutes defaults for anything
//! unusable.
//!
//! Settings are stored at `~/.config/pomoclock/config.toml` by default.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::path::Path;

use crate::config::{
    RawConfig, DEFAULT_AUTO_ADVANCE, DEFAULT_CYCLE_COUNT, DEFAULT_LONG_BREAK_DURATION_MS,
    DEFAULT_SHORT_BREAK_DURATION_MS, DEFAULT_WORK_DURATION_MS,
};
use crate::error::{ConfigError, Result};
use crate::Configuration;

const MS_PER_MINUTE: u64 = 60 * 1000;

/// Schedule preferences.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduleSettings {
    #[serde(default = "default_cycle_count")]
    pub cycle_count: Value,
    #[serde(default = "default_work_minutes")]
    pub work_minutes: Value,
    #[serde(default = "default_short_break_minutes")]
    pub short_break_minutes: Value,
    #[serde(default = "default_long_break_minutes")]
    pub long_break_minutes: Value,
    #[serde(default = "default_auto_advance")]
    pub auto_advance: Value,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingSettings {
    #[serde(default = "default_log_level")]
    pub level: String,
}

/// User settings document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub schedule: ScheduleSettings,
    #[serde(default)]
    pub logging: LoggingSettings,
}

// Default functions
fn default_cycle_count() -> Value {
    DEFAULT_CYCLE_COUNT.into()
}
fn default_work_minutes() -> Value {
    (DEFAULT_WORK_DURATION_MS / MS_PER_MINUTE).into()
}
fn default_short_break_minutes() -> Value {
    (DEFAULT_SHORT_BREAK_DURATION_MS / MS_PER_MINUTE).into()
}
fn default_long_break_minutes() -> Value {
    (DEFAULT_LONG_BREAK_DURATION_MS / MS_PER_MINUTE).into()
}
fn default_auto_advance() -> Value {
    DEFAULT_AUTO_ADVANCE.into()
}
fn default_log_level() -> String {
    "warn".into()
}

impl Default for ScheduleSettings {
    fn default() -> Self {
        Self {
            cycle_count: default_cycle_count(),
            work_minutes: default_work_minutes(),
            short_break_minutes: default_short_break_minutes(),
            long_break_minutes: default_long_break_minutes(),
            auto_advance: default_auto_advance(),
        }
    }
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

impl Settings {
    fn get_json_value_by_path<'a>(root: &'a Value, key: &str) -> Option<&'a Value> {
        if key.is_empty() {
            return None;
        }

        let mut current = root;
        for part in key.split('.') {
            current = current.get(part)?;
        }
        Some(current)
    }

    fn set_json_value_by_path(root: &mut Value, key: &str, value: &str) -> Result<()> {
        let unknown = || ConfigError::UnknownKey(key.to_string());
        let (parent, leaf) = match key.rsplit_once('.') {
            Some((parent, leaf)) => (Some(parent), leaf),
            None => (None, key),
        };
        if leaf.is_empty() {
            return Err(unknown().into());
        }

        let mut current = root;
        if let Some(parent) = parent {
            for part in parent.split('.') {
                current = current.get_mut(part).ok_or_else(unknown)?;
            }
        }
        let obj = current.as_object_mut().ok_or_else(unknown)?;
        if !obj.contains_key(leaf) {
            return Err(unknown().into());
        }
        obj.insert(leaf.to_string(), parse_scalar(value));
        Ok(())
    }

    /// Load from `path`, or return defaults if the file does not exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = match std::fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "no settings file, using defaults");
                return Ok(Self::default());
            }
            Err(e) => {
                return Err(ConfigError::LoadFailed {
                    path: path.to_path_buf(),
                    message: e.to_string(),
                }
                .into())
            }
        };
        toml::from_str(&content).map_err(|e| {
            ConfigError::LoadFailed {
                path: path.to_path_buf(),
                message: e.to_string(),
            }
            .into()
        })
    }

    /// Load from `path`, returning defaults on error.
    /// This is a convenience method that never fails.
    pub fn load_or_default(path: &Path) -> Self {
        Self::load_from(path).unwrap_or_else(|e| {
            tracing::warn!(error = %e, "ignoring unreadable settings");
            Self::default()
        })
    }

    /// Persist to `path`, creating parent directories as needed.
    ///
    /// # Errors
    ///
    /// Returns an error if the settings cannot be serialized or written.
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Get a settings value as string by dot-separated key.
    pub fn get(&self, key: &str) -> Option<String> {
        let json = serde_json::to_value(self).ok()?;
        let val = Self::get_json_value_by_path(&json, key)?;
        match val {
            Value::String(s) => Some(s.clone()),
            other => Some(other.to_string()),
        }
    }

    /// Set a value by dot-separated key. Returns error if the key is unknown.
    ///
    /// # Errors
    ///
    /// Returns an error if the key is unknown or the resulting document no
    /// longer deserializes.
    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        let mut json = serde_json::to_value(&*self)?;
        Self::set_json_value_by_path(&mut json, key, value)?;
        *self = serde_json::from_value(json).map_err(|e| ConfigError::InvalidValue {
            key: key.to_string(),
            message: e.to_string(),
        })?;
        Ok(())
    }

    /// Schedule preferences in the scheduler's millisecond terms.
    pub fn raw_config(&self) -> RawConfig {
        let s = &self.schedule;
        RawConfig {
            cycle_count: Some(s.cycle_count.clone()),
            work_duration_ms: Some(minutes_to_ms(&s.work_minutes)),
            short_break_duration_ms: Some(minutes_to_ms(&s.short_break_minutes)),
            long_break_duration_ms: Some(minutes_to_ms(&s.long_break_minutes)),
            auto_advance: Some(s.auto_advance.clone()),
        }
    }

    pub fn configuration(&self) -> Configuration {
        Configuration::validate(&self.raw_config())
    }
}

/// Parse a command-line value as bool, integer, float or string, in that order.
fn parse_scalar(value: &str) -> Value {
    if let Ok(b) = value.parse::<bool>() {
        return Value::Bool(b);
    }
    if let Ok(n) = value.parse::<i64>() {
        return Value::Number(n.into());
    }
    if let Some(n) = value.parse::<f64>().ok().and_then(serde_json::Number::from_f64) {
        return Value::Number(n);
    }
    Value::String(value.to_string())
}

/// Convert a numeric minutes value to milliseconds. Anything else is passed
/// through unchanged for validation to reject.
fn minutes_to_ms(value: &Value) -> Value {
    let minutes = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    match minutes.filter(|m| m.is_finite()) {
        Some(m) if m >= 0.0 && m.fract() == 0.0 => Value::from((m as u64).saturating_mul(MS_PER_MINUTE)),
        Some(m) => serde_json::Number::from_f64(m * MS_PER_MINUTE as f64)
            .map(Value::Number)
            .unwrap_or_else(|| value.clone()),
        None => value.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn default_settings_roundtrip() {
        let settings = Settings::default();
        let toml_str = toml::to_string_pretty(&settings).unwrap();
        let parsed: Settings = toml::from_str(&toml_str).unwrap();
        assert_eq!(parsed, settings);
        assert_eq!(parsed.logging.level, "warn");
    }

    #[test]
    fn default_settings_yield_default_configuration() {
        assert_eq!(Settings::default().configuration(), Configuration::default());
    }

    #[test]
    fn partial_file_fills_defaults() {
        let settings: Settings = toml::from_str("[schedule]\nwork_minutes = 50\n").unwrap();
        let cfg = settings.configuration();
        assert_eq!(cfg.work_duration_ms(), 50 * 60 * 1000);
        assert_eq!(cfg.cycle_count(), 4);
    }

    #[test]
    fn garbage_schedule_values_fall_back() {
        let settings: Settings =
            toml::from_str("[schedule]\ncycle_count = \"many\"\nshort_break_minutes = -1\n").unwrap();
        let cfg = settings.configuration();
        assert_eq!(cfg.cycle_count(), DEFAULT_CYCLE_COUNT);
        assert_eq!(cfg.short_break_duration_ms(), DEFAULT_SHORT_BREAK_DURATION_MS);
    }

    #[test]
    fn fractional_minutes_convert() {
        assert_eq!(minutes_to_ms(&json!(1.5)), json!(90000.0));
        assert_eq!(minutes_to_ms(&json!("2")), json!(120000));
        assert_eq!(minutes_to_ms(&json!(true)), json!(true));
    }

    #[test]
    fn get_supports_dot_path_keys() {
        let settings = Settings::default();
        assert_eq!(settings.get("schedule.work_minutes").as_deref(), Some("25"));
        assert_eq!(settings.get("logging.level").as_deref(), Some("warn"));
        assert!(settings.get("schedule.missing_key").is_none());
    }

    #[test]
    fn set_parses_scalars() {
        let mut settings = Settings::default();
        settings.set("schedule.auto_advance", "true").unwrap();
        settings.set("schedule.cycle_count", "6").unwrap();
        settings.set("logging.level", "debug").unwrap();
        assert_eq!(settings.schedule.auto_advance, json!(true));
        assert_eq!(settings.schedule.cycle_count, json!(6));
        assert_eq!(settings.logging.level, "debug");
    }

    #[test]
    fn set_rejects_unknown_key() {
        let mut settings = Settings::default();
        assert!(matches!(
            settings.set("schedule.nonexistent", "1"),
            Err(crate::CoreError::Config(ConfigError::UnknownKey(_)))
        ));
        assert!(settings.set("", "1").is_err());
    }

    #[test]
    fn set_rejects_invalid_type() {
        let mut settings = Settings::default();
        assert!(settings.set("logging.level", "3").is_err());
        assert_eq!(settings.logging.level, "warn");
    }
}
