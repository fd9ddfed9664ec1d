use clap::Args;
use std::io::Write;

use pomoclock_core::Settings;

use super::{CliResult, ScheduleArgs};
use crate::display::format_clock;

#[derive(Args, Debug)]
pub struct PlanArgs {
    #[command(flatten)]
    pub schedule: ScheduleArgs,
    /// Print the plan as JSON
    #[arg(long)]
    pub json: bool,
}

pub fn run(args: PlanArgs, settings: &Settings) -> CliResult {
    let config = args.schedule.configuration(settings);

    if args.json {
        let mut out = std::io::stdout().lock();
        serde_json::to_writer_pretty(&mut out, &config.plan())?;
        writeln!(out)?;
        return Ok(());
    }

    println!("{:>3}  {:>5}  {:<12}  {:>8}", "#", "cycle", "session", "length");
    for (i, segment) in config.segments().enumerate() {
        println!(
            "{:>3}  {:>5}  {:<12}  {:>8}",
            i + 1,
            segment.cycle_index,
            segment.kind.label(),
            format_clock(segment.duration_ms)
        );
    }
    println!(
        "total {} ({} ms), auto-advance {}",
        format_clock(config.total_duration_ms()),
        config.total_duration_ms(),
        if config.auto_advance() { "on" } else { "off" }
    );
    Ok(())
}
