use clap::Subcommand;
use std::path::Path;

use pomoclock_core::Settings;

use super::CliResult;

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Get a settings value
    Get {
        /// Settings key (e.g. "schedule.work_minutes", "logging.level")
        key: String,
    },
    /// Set a settings value
    Set {
        /// Settings key
        key: String,
        /// New value
        value: String,
    },
    /// Show the settings file and the configuration it validates to
    Show,
    /// Print the settings file path
    Path,
    /// Reset settings to defaults
    Reset,
}

pub fn run(action: ConfigAction, path: &Path) -> CliResult {
    match action {
        ConfigAction::Get { key } => {
            let settings = Settings::load_from(path)?;
            match settings.get(&key) {
                Some(value) => println!("{value}"),
                None => return Err(format!("unknown key: {key}").into()),
            }
        }
        ConfigAction::Set { key, value } => {
            let mut settings = Settings::load_from(path)?;
            settings.set(&key, &value)?;
            settings.save_to(path)?;
            tracing::info!(key = %key, path = %path.display(), "settings updated");
            println!("ok");
        }
        ConfigAction::Show => {
            let settings = Settings::load_from(path)?;
            let json = serde_json::json!({
                "settings": settings,
                "configuration": settings.configuration(),
            });
            println!("{}", serde_json::to_string_pretty(&json)?);
        }
        ConfigAction::Path => println!("{}", path.display()),
        ConfigAction::Reset => {
            Settings::default().save_to(path)?;
            println!("settings reset to defaults");
        }
    }
    Ok(())
}
