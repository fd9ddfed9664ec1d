use clap::{CommandFactory, Parser, Subcommand};
use std::path::PathBuf;

mod commands;
mod display;

#[derive(Parser)]
#[command(name = "pomoclock", version, about = "Work/break session timer")]
struct Cli {
    /// Settings file (defaults to $POMOCLOCK_CONFIG, then ~/.config/pomoclock/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Log level filter when RUST_LOG is unset (e.g. "info", "pomoclock_core=debug")
    #[arg(long, global = true)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a live session in the terminal
    Run(commands::run::RunArgs),
    /// Replay a run on a virtual clock and print events as JSON lines
    Simulate(commands::simulate::SimulateArgs),
    /// Show the planned segments of a run
    Plan(commands::plan::PlanArgs),
    /// Settings management
    Config {
        #[command(subcommand)]
        action: commands::config::ConfigAction,
    },
    /// Print shell completions
    Completions {
        shell: clap_complete::Shell,
    },
}

fn main() {
    let cli = Cli::parse();
    let result = commands::settings_path(cli.config.as_deref()).and_then(|path| {
        let settings = pomoclock_core::Settings::load_or_default(&path);
        init_logging(cli.log_level.as_deref().unwrap_or(&settings.logging.level));

        match cli.command {
            Commands::Run(args) => commands::run::run(args, &settings),
            Commands::Simulate(args) => commands::simulate::run(args, &settings),
            Commands::Plan(args) => commands::plan::run(args, &settings),
            Commands::Config { action } => commands::config::run(action, &path),
            Commands::Completions { shell } => {
                commands::completions::run(shell, &mut Cli::command());
                Ok(())
            }
        }
    });

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}

fn init_logging(default_level: &str) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .or_else(|_| tracing_subscriber::EnvFilter::try_new(default_level))
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
