use clap::Args;
use std::path::{Path, PathBuf};

use pomoclock_core::{Configuration, Settings};

pub mod completions;
pub mod config;
pub mod plan;
pub mod run;
pub mod simulate;

pub type CliResult = Result<(), Box<dyn std::error::Error>>;

/// Resolve the settings file: `--config`, then `POMOCLOCK_CONFIG`, then the data dir.
pub fn settings_path(flag: Option<&Path>) -> Result<PathBuf, Box<dyn std::error::Error>> {
    if let Some(path) = flag {
        return Ok(path.to_path_buf());
    }
    if let Some(path) = std::env::var_os("POMOCLOCK_CONFIG").filter(|p| !p.is_empty()) {
        return Ok(PathBuf::from(path));
    }
    Ok(pomoclock_core::storage::default_settings_path()?)
}

/// Command-line overrides for the schedule settings.
#[derive(Args, Debug, Clone, Default)]
pub struct ScheduleArgs {
    /// Number of work/break cycles in a run
    #[arg(long)]
    pub cycles: Option<u32>,
    /// Work session length in minutes
    #[arg(long)]
    pub work_min: Option<f64>,
    /// Short break length in minutes
    #[arg(long)]
    pub short_break_min: Option<f64>,
    /// Long break length in minutes
    #[arg(long)]
    pub long_break_min: Option<f64>,
    /// Start each following session automatically
    #[arg(long, num_args = 0..=1, default_missing_value = "true")]
    pub auto_advance: Option<bool>,
}

impl ScheduleArgs {
    /// Settings with these overrides applied, validated into a configuration.
    pub fn configuration(&self, settings: &Settings) -> Configuration {
        let mut settings = settings.clone();
        let schedule = &mut settings.schedule;
        if let Some(cycles) = self.cycles {
            schedule.cycle_count = cycles.into();
        }
        if let Some(work) = self.work_min {
            schedule.work_minutes = work.into();
        }
        if let Some(short) = self.short_break_min {
            schedule.short_break_minutes = short.into();
        }
        if let Some(long) = self.long_break_min {
            schedule.long_break_minutes = long.into();
        }
        if let Some(auto) = self.auto_advance {
            schedule.auto_advance = auto.into();
        }
        settings.configuration()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn overrides_win_over_settings() {
        let args = ScheduleArgs {
            cycles: Some(2),
            work_min: Some(0.5),
            auto_advance: Some(true),
            ..Default::default()
        };
        let cfg = args.configuration(&Settings::default());
        assert_eq!(cfg.cycle_count(), 2);
        assert_eq!(cfg.work_duration_ms(), 30_000);
        assert_eq!(cfg.short_break_duration_ms(), 5 * 60 * 1000);
        assert!(cfg.auto_advance());
    }

    #[test]
    fn flag_path_takes_precedence() {
        let path = settings_path(Some(Path::new("/tmp/custom.toml"))).unwrap();
        assert_eq!(path, PathBuf::from("/tmp/custom.toml"));
    }
}
