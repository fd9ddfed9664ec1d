//! Periodic time sources.
//!
//! A [`Ticker`] reports elapsed quanta to the scheduler that owns it. Hosts
//! call [`SessionScheduler::pump`](super::SessionScheduler::pump) from their
//! event loop, which drains the ticker one quantum at a time. No thread or
//! timer is spawned here.

use std::time::{Duration, Instant};

/// Timer resolution in milliseconds.
pub const QUANTUM_MS: u64 = 1000;

pub trait Ticker {
    /// Begin counting quanta. No-op if already armed.
    fn arm(&mut self);

    /// Stop counting and drop any pending quanta. Idempotent.
    fn disarm(&mut self);

    fn is_armed(&self) -> bool;

    /// Consume one elapsed quantum, if any.
    fn take_tick(&mut self) -> bool;
}

/// Ticker backed by the monotonic clock.
///
/// Counts whole quanta since it was armed and keeps the sub-quantum
/// remainder, so polling frequency does not matter. Disarming discards the
/// partial quantum in progress.
#[derive(Debug, Clone)]
pub struct WallClockTicker {
    quantum: Duration,
    /// Instant at which the next quantum is due.
    next_due: Option<Instant>,
}

impl WallClockTicker {
    pub fn new() -> Self {
        Self::with_quantum(Duration::from_millis(QUANTUM_MS))
    }

    pub fn with_quantum(quantum: Duration) -> Self {
        Self {
            quantum,
            next_due: None,
        }
    }

    pub fn quantum(&self) -> Duration {
        self.quantum
    }

    /// Time left until the next quantum elapses, if armed.
    pub fn until_next(&self) -> Option<Duration> {
        self.next_due
            .map(|due| due.saturating_duration_since(Instant::now()))
    }
}

impl Default for WallClockTicker {
    fn default() -> Self {
        Self::new()
    }
}

impl Ticker for WallClockTicker {
    fn arm(&mut self) {
        if self.next_due.is_none() {
            self.next_due = Some(Instant::now() + self.quantum);
        }
    }

    fn disarm(&mut self) {
        self.next_due = None;
    }

    fn is_armed(&self) -> bool {
        self.next_due.is_some()
    }

    fn take_tick(&mut self) -> bool {
        match self.next_due {
            Some(due) if Instant::now() >= due => {
                self.next_due = Some(due + self.quantum);
                true
            }
            _ => false,
        }
    }
}

/// Manually advanced virtual clock.
#[derive(Debug, Clone, Default)]
pub struct ManualTicker {
    armed: bool,
    pending: u64,
}

impl ManualTicker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Let `quanta` quanta elapse. Ignored while disarmed.
    pub fn advance(&mut self, quanta: u64) {
        if self.armed {
            self.pending = self.pending.saturating_add(quanta);
        }
    }

    pub fn pending(&self) -> u64 {
        self.pending
    }
}

impl Ticker for ManualTicker {
    fn arm(&mut self) {
        self.armed = true;
    }

    fn disarm(&mut self) {
        self.armed = false;
        self.pending = 0;
    }

    fn is_armed(&self) -> bool {
        self.armed
    }

    fn take_tick(&mut self) -> bool {
        if self.armed && self.pending > 0 {
            self.pending -= 1;
            true
        } else {
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn manual_ticker_ignores_time_while_disarmed() {
        let mut ticker = ManualTicker::new();
        ticker.advance(3);
        assert!(!ticker.take_tick());

        ticker.arm();
        ticker.advance(2);
        assert!(ticker.take_tick());
        assert!(ticker.take_tick());
        assert!(!ticker.take_tick());
    }

    #[test]
    fn manual_ticker_disarm_drops_pending() {
        let mut ticker = ManualTicker::new();
        ticker.arm();
        ticker.advance(5);
        ticker.disarm();
        ticker.disarm();
        assert!(!ticker.is_armed());
        assert_eq!(ticker.pending(), 0);
    }

    #[test]
    fn wall_clock_default_quantum_is_one_second() {
        let ticker = WallClockTicker::new();
        assert_eq!(ticker.quantum(), Duration::from_millis(QUANTUM_MS));
        assert_eq!(ticker.until_next(), None);
    }

    #[test]
    fn wall_clock_ticker_counts_elapsed_quanta() {
        let mut ticker = WallClockTicker::with_quantum(Duration::from_millis(5));
        assert!(!ticker.take_tick());
        ticker.arm();
        assert!(ticker.is_armed());
        std::thread::sleep(Duration::from_millis(12));
        assert!(ticker.take_tick());
        assert!(ticker.take_tick());
        ticker.disarm();
        assert!(!ticker.take_tick());
        assert!(ticker.until_next().is_none());
    }

    #[test]
    fn wall_clock_rearm_is_noop() {
        let mut ticker = WallClockTicker::new();
        ticker.arm();
        let first = ticker.until_next().unwrap();
        ticker.arm();
        assert!(ticker.until_next().unwrap() <= first);
    }
}
