use clap::Args;
use std::cell::Cell;
use std::io::Write;
use std::rc::Rc;

use pomoclock_core::{EventKind, ManualTicker, Notifier, SessionScheduler, Settings};

use super::{CliResult, ScheduleArgs};

#[derive(Args, Debug)]
pub struct SimulateArgs {
    #[command(flatten)]
    pub schedule: ScheduleArgs,
    /// Number of one-second quanta to simulate (default: until the run completes)
    #[arg(long, conflicts_with = "until_complete")]
    pub ticks: Option<u64>,
    /// Simulate until the run completes
    #[arg(long)]
    pub until_complete: bool,
    /// Also print a line for every tick
    #[arg(long)]
    pub include_ticks: bool,
    /// Only print these events (comma separated, e.g. "sessionEnd,runComplete")
    #[arg(long, value_delimiter = ',')]
    pub events: Vec<EventKind>,
    /// Tick offsets at which the current session is skipped (comma separated)
    #[arg(long, value_delimiter = ',')]
    pub skip_at: Vec<u64>,
}

fn printed_kinds(events: &[EventKind], include_ticks: bool) -> Vec<EventKind> {
    EventKind::ALL
        .into_iter()
        .filter(|kind| match kind {
            EventKind::Tick => include_ticks || events.contains(kind),
            _ => events.is_empty() || events.contains(kind),
        })
        .collect()
}

fn json_lines(kinds: &[EventKind], completed: Rc<Cell<bool>>) -> Notifier {
    let mut notifier = Notifier::new();
    for &kind in kinds {
        notifier.subscribe(kind, |event| {
            let line = serde_json::to_string(event)?;
            writeln!(std::io::stdout().lock(), "{line}")?;
            Ok(())
        });
    }
    notifier.subscribe(EventKind::RunComplete, move |_| {
        completed.set(true);
        Ok(())
    });
    notifier
}

/// Replays a run on a virtual clock. Every paused session is started right
/// away, as if the user pressed start each time.
pub fn run(args: SimulateArgs, settings: &Settings) -> CliResult {
    let config = args.schedule.configuration(settings);
    let completed = Rc::new(Cell::new(false));
    let kinds = printed_kinds(&args.events, args.include_ticks);
    let notifier = json_lines(&kinds, Rc::clone(&completed));
    let mut scheduler = SessionScheduler::with_notifier(config, ManualTicker::new(), notifier);

    // Zero-length sessions consume one extra tick each.
    let full_run = (config.total_duration_ms() / 1000)
        .saturating_add(config.segment_count())
        .saturating_add(1);
    let limit = args.ticks.unwrap_or(full_run);
    let stop_on_complete = args.until_complete || args.ticks.is_none();

    let mut elapsed = 0;
    while elapsed < limit {
        if args.skip_at.contains(&elapsed) {
            scheduler.skip();
        }
        if stop_on_complete && completed.get() {
            break;
        }
        scheduler.start();
        scheduler.ticker_mut().advance(1);
        scheduler.pump();
        elapsed += 1;
        if stop_on_complete && completed.get() {
            break;
        }
    }

    tracing::info!(ticks = elapsed, "simulation finished");
    let summary = serde_json::json!({
        "type": "final",
        "ticks": elapsed,
        "snapshot": scheduler.snapshot(),
    });
    println!("{summary}");
    Ok(())
}
