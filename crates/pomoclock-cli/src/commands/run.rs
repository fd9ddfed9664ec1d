use clap::Args;
use std::cell::Cell;
use std::io::Write;
use std::rc::Rc;
use std::str::FromStr;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::time::MissedTickBehavior;

use pomoclock_core::{
    Event, EventKind, Notifier, SessionKind, SessionScheduler, Settings, WallClockTicker,
};

use super::{CliResult, ScheduleArgs};
use crate::display;

/// The host loop drains the ticker this many times per quantum.
const PUMPS_PER_QUANTUM: u32 = 5;

const HELP: &str = "commands: s=start p=pause t=toggle k=skip r=restart ?=status q=quit";

#[derive(Args, Debug)]
pub struct RunArgs {
    #[command(flatten)]
    pub schedule: ScheduleArgs,
    /// Begin the first session immediately
    #[arg(long)]
    pub start: bool,
    /// Exit once the run completes instead of starting over
    #[arg(long)]
    pub exit_on_complete: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Control {
    Start,
    Pause,
    Toggle,
    Skip,
    Restart,
    Status,
    Help,
    Quit,
}

impl FromStr for Control {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "s" | "start" => Ok(Control::Start),
            "p" | "pause" => Ok(Control::Pause),
            "t" | "toggle" | "" => Ok(Control::Toggle),
            "k" | "skip" => Ok(Control::Skip),
            "r" | "restart" => Ok(Control::Restart),
            "?" | "status" => Ok(Control::Status),
            "h" | "help" => Ok(Control::Help),
            "q" | "quit" | "exit" => Ok(Control::Quit),
            other => Err(format!("unknown command '{other}'")),
        }
    }
}

pub fn run(args: RunArgs, settings: &Settings) -> CliResult {
    let config = args.schedule.configuration(settings);
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;
    runtime.block_on(session_loop(args, config))
}

fn display_listeners(completed: Rc<Cell<bool>>) -> Notifier {
    let mut notifier = Notifier::new();
    for kind in [EventKind::Tick, EventKind::StateChanged] {
        notifier.subscribe(kind, |event| {
            if let Event::Tick(snap) | Event::StateChanged(snap) = event {
                let mut out = std::io::stdout().lock();
                write!(out, "\r\x1b[2K{}", display::status_line(snap))?;
                out.flush()?;
            }
            Ok(())
        });
    }
    notifier.subscribe(EventKind::SessionEnd, |event| {
        if let Event::SessionEnd { session_kind, cycle_index } = event {
            // Terminal bell is the alarm.
            println!("\r\x1b[2K\x07{}", session_end_message(*session_kind, *cycle_index));
        }
        Ok(())
    });
    notifier.subscribe(EventKind::RunComplete, move |event| {
        if let Event::RunComplete { total_duration_ms, .. } = event {
            println!(
                "\r\x1b[2Krun complete ({} planned)",
                display::format_clock(*total_duration_ms)
            );
        }
        completed.set(true);
        Ok(())
    });
    notifier
}

fn session_end_message(kind: SessionKind, cycle_index: u32) -> String {
    let next = if kind.is_break() { "back to work" } else { "take a break" };
    format!("{kind} {cycle_index} finished, {next}")
}

async fn session_loop(args: RunArgs, config: pomoclock_core::Configuration) -> CliResult {
    eprintln!("{HELP}");
    let completed = Rc::new(Cell::new(false));
    let notifier = display_listeners(Rc::clone(&completed));
    let mut scheduler = SessionScheduler::with_notifier(config, WallClockTicker::new(), notifier);
    if args.start {
        scheduler.start();
    }

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut interval = tokio::time::interval(scheduler.ticker().quantum() / PUMPS_PER_QUANTUM);
    interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        tokio::select! {
            _ = interval.tick() => {
                scheduler.pump();
            }
            line = lines.next_line() => {
                let Some(line) = line? else {
                    tracing::debug!("stdin closed");
                    break;
                };
                match line.parse::<Control>() {
                    Ok(Control::Start) => scheduler.start(),
                    Ok(Control::Pause) => scheduler.pause(),
                    Ok(Control::Toggle) => {
                        if scheduler.is_running() {
                            scheduler.pause();
                        } else {
                            scheduler.start();
                        }
                    }
                    Ok(Control::Skip) => scheduler.skip(),
                    Ok(Control::Restart) => scheduler.restart(),
                    Ok(Control::Status) => {
                        let next_tick_ms = scheduler
                            .ticker()
                            .until_next()
                            .map(|d| u64::try_from(d.as_millis()).unwrap_or(u64::MAX));
                        let status = serde_json::json!({
                            "snapshot": scheduler.snapshot(),
                            "nextTickMs": next_tick_ms,
                        });
                        println!("{status}");
                    }
                    Ok(Control::Help) => eprintln!("{HELP}"),
                    Ok(Control::Quit) => break,
                    Err(e) => eprintln!("{e}; {HELP}"),
                }
            }
        }
        if args.exit_on_complete && completed.get() {
            break;
        }
    }
    println!();
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_short_and_long_commands() {
        assert_eq!("s".parse::<Control>(), Ok(Control::Start));
        assert_eq!(" Pause ".parse::<Control>(), Ok(Control::Pause));
        assert_eq!("".parse::<Control>(), Ok(Control::Toggle));
        assert_eq!("k".parse::<Control>(), Ok(Control::Skip));
        assert_eq!("exit".parse::<Control>(), Ok(Control::Quit));
        assert!("jump".parse::<Control>().is_err());
    }

    #[test]
    fn session_end_message_names_what_comes_next() {
        assert_eq!(session_end_message(SessionKind::Work, 2), "Work 2 finished, take a break");
        assert_eq!(
            session_end_message(SessionKind::LongBreak, 4),
            "Long Break 4 finished, back to work"
        );
    }
}
