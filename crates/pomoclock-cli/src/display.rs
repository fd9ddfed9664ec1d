//! Terminal rendering of scheduler snapshots.

use chrono::{Duration, Local};
use pomoclock_core::Snapshot;

const BAR_WIDTH: usize = 20;

/// `MM:SS`, minutes uncapped.
pub fn format_clock(ms: u64) -> String {
    let minutes = ms / 60_000;
    let seconds = (ms % 60_000) / 1000;
    format!("{minutes:02}:{seconds:02}")
}

pub fn progress_bar(progress: f64) -> String {
    let filled = ((progress.clamp(0.0, 1.0) * BAR_WIDTH as f64).round() as usize).min(BAR_WIDTH);
    format!("[{}{}]", "#".repeat(filled), "-".repeat(BAR_WIDTH - filled))
}

/// Local wall-clock time at which the current session ends if left running.
pub fn session_eta(snapshot: &Snapshot) -> String {
    let remaining = Duration::milliseconds(i64::try_from(snapshot.remaining_session_ms).unwrap_or(i64::MAX));
    Local::now()
        .checked_add_signed(remaining)
        .map(|at| at.format("%H:%M").to_string())
        .unwrap_or_else(|| "--:--".to_string())
}

/// One-line status, e.g. `Work 1/4  24:59 [#---] running, ends 14:32`.
pub fn status_line(snapshot: &Snapshot) -> String {
    let state = if snapshot.running {
        format!("running, ends {}", session_eta(snapshot))
    } else {
        "paused".to_string()
    };
    format!(
        "{} {}/{}  {} {} {}",
        snapshot.session_kind,
        snapshot.cycle_index,
        snapshot.cycle_count,
        format_clock(snapshot.remaining_session_ms),
        progress_bar(snapshot.progress()),
        state
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use pomoclock_core::SessionKind;

    #[test]
    fn clock_formatting() {
        assert_eq!(format_clock(0), "00:00");
        assert_eq!(format_clock(1_500_000), "25:00");
        assert_eq!(format_clock(59_999), "00:59");
        assert_eq!(format_clock(130 * 60_000), "130:00");
    }

    #[test]
    fn progress_bar_bounds() {
        assert_eq!(progress_bar(0.0), format!("[{}]", "-".repeat(BAR_WIDTH)));
        assert_eq!(progress_bar(1.5), format!("[{}]", "#".repeat(BAR_WIDTH)));
    }

    #[test]
    fn paused_status_line() {
        let snap = Snapshot {
            session_kind: SessionKind::ShortBreak,
            cycle_index: 2,
            cycle_count: 4,
            remaining_session_ms: 300_000,
            remaining_total_ms: 300_000,
            total_duration_ms: 600_000,
            running: false,
        };
        let line = status_line(&snap);
        assert!(line.starts_with("Short Break 2/4  05:00 [##########----------]"));
        assert!(line.ends_with("paused"));
    }
}
