//! Session scheduler implementation.
//!
//! The scheduler is a single-threaded state machine over the cross product of
//! [`SessionKind`] and running/paused. It does not spawn threads; the host
//! calls [`SessionScheduler::pump`] from its event loop (or [`SessionScheduler::tick`]
//! directly) to let time pass.
//!
//! ## Lifecycle
//!
//! ```text
//! Idle -> Running -> (Paused <-> Running) -> SessionExpired -> (NextSession | RunComplete -> Idle)
//! ```
//!
//! ## Usage
//!
//! ```ignore
//! let mut scheduler = SessionScheduler::new(Configuration::default());
//! scheduler.subscribe(EventKind::SessionEnd, |event| { ring_bell(event); Ok(()) });
//! scheduler.start();
//! // In the host loop:
//! scheduler.pump();
//! ```
//!
//! Listeners receive `&Event` and cannot reach back into the scheduler while
//! it dispatches.

use super::kind::SessionKind;
use super::ticker::{Ticker, WallClockTicker, QUANTUM_MS};
use super::transition::{next_transition, Transition};
use crate::config::Configuration;
use crate::events::{Event, EventKind, Snapshot};
use crate::notifier::{ListenerError, Notifier, SubscriptionId};

/// Mutable per-run state, replaced by every restart.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct SchedulerState {
    cycle_index: u32,
    session_kind: SessionKind,
    total_duration_ms: u64,
    remaining_total_ms: u64,
    remaining_session_ms: u64,
    running: bool,
}

impl SchedulerState {
    fn initial(config: &Configuration) -> Self {
        let total_duration_ms = config.total_duration_ms();
        Self {
            cycle_index: 1,
            session_kind: SessionKind::Work,
            total_duration_ms,
            remaining_total_ms: total_duration_ms,
            remaining_session_ms: config.work_duration_ms(),
            running: false,
        }
    }
}

/// Work/break session scheduler.
pub struct SessionScheduler<T: Ticker = WallClockTicker> {
    config: Configuration,
    ticker: T,
    notifier: Notifier,
    state: SchedulerState,
}

impl<T: Ticker> std::fmt::Debug for SessionScheduler<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionScheduler")
            .field("config", &self.config)
            .field("state", &self.state)
            .field("notifier", &self.notifier)
            .finish()
    }
}

impl SessionScheduler<WallClockTicker> {
    /// Create a scheduler driven by the monotonic clock.
    pub fn new(config: Configuration) -> Self {
        Self::with_ticker(config, WallClockTicker::new())
    }
}

impl<T: Ticker> SessionScheduler<T> {
    pub fn with_ticker(config: Configuration, ticker: T) -> Self {
        Self::with_notifier(config, ticker, Notifier::new())
    }

    /// Create a scheduler whose listeners are already registered, so they
    /// observe the initial `newRun`.
    pub fn with_notifier(config: Configuration, ticker: T, notifier: Notifier) -> Self {
        let mut scheduler = Self {
            state: SchedulerState::initial(&config),
            config,
            ticker,
            notifier,
        };
        scheduler.restart();
        scheduler
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            session_kind: self.state.session_kind,
            cycle_index: self.state.cycle_index,
            cycle_count: self.config.cycle_count(),
            remaining_session_ms: self.state.remaining_session_ms,
            remaining_total_ms: self.state.remaining_total_ms,
            total_duration_ms: self.state.total_duration_ms,
            running: self.state.running,
        }
    }

    pub fn configuration(&self) -> &Configuration {
        &self.config
    }

    pub fn is_running(&self) -> bool {
        self.state.running
    }

    pub fn ticker(&self) -> &T {
        &self.ticker
    }

    pub fn ticker_mut(&mut self) -> &mut T {
        &mut self.ticker
    }

    pub fn subscribe<F>(&mut self, kind: EventKind, listener: F) -> SubscriptionId
    where
        F: FnMut(&Event) -> Result<(), ListenerError> + 'static,
    {
        self.notifier.subscribe(kind, listener)
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.notifier.unsubscribe(id)
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Begin a fresh run, paused on the first work session.
    pub fn restart(&mut self) {
        self.ticker.disarm();
        self.state = SchedulerState::initial(&self.config);
        tracing::info!(
            cycles = self.config.cycle_count(),
            total_ms = self.state.total_duration_ms,
            "new run"
        );
        self.notifier.emit(&Event::NewRun {
            configuration: self.config,
        });
        // The first session of a run never auto-starts.
        self.load_session(SessionKind::Work);
        self.notify_state_changed();
    }

    pub fn start(&mut self) {
        if self.state.running {
            return;
        }
        self.arm();
        self.notify_state_changed();
    }

    pub fn pause(&mut self) {
        if !self.state.running {
            return;
        }
        self.disarm();
        self.notify_state_changed();
    }

    /// End the current session now. Only elapsed time counts toward the run.
    pub fn skip(&mut self) {
        tracing::debug!(
            kind = %self.state.session_kind,
            remaining_ms = self.state.remaining_session_ms,
            "skipping session"
        );
        self.end_session();
    }

    /// Advance by one quantum.
    pub fn tick(&mut self) {
        if self.state.remaining_session_ms == 0 {
            self.end_session();
            return;
        }
        let step = self.state.remaining_session_ms.min(QUANTUM_MS);
        self.state.remaining_session_ms -= step;
        self.state.remaining_total_ms = self.state.remaining_total_ms.saturating_sub(step);
        tracing::trace!(remaining_ms = self.state.remaining_session_ms, "tick");
        let snapshot = self.snapshot();
        self.notifier.emit(&Event::Tick(snapshot));
        // Expiry is handled on the tick that reaches zero, not on the following
        // one, so a session lasts exactly `duration / QUANTUM_MS` ticks.
        if self.state.remaining_session_ms == 0 {
            self.end_session();
        }
    }

    /// Run one `tick` for every quantum the ticker reports, while running.
    /// Returns the number of ticks processed.
    pub fn pump(&mut self) -> u64 {
        let mut ticks = 0;
        while self.state.running && self.ticker.take_tick() {
            self.tick();
            ticks += 1;
        }
        ticks
    }

    // ── Internal ─────────────────────────────────────────────────────

    fn arm(&mut self) {
        self.ticker.arm();
        self.state.running = true;
        tracing::debug!(kind = %self.state.session_kind, cycle = self.state.cycle_index, "started");
    }

    fn disarm(&mut self) {
        self.ticker.disarm();
        if self.state.running {
            tracing::debug!(kind = %self.state.session_kind, cycle = self.state.cycle_index, "paused");
        }
        self.state.running = false;
    }

    fn end_session(&mut self) {
        self.disarm();

        let unused = self.state.remaining_session_ms;
        self.state.remaining_total_ms = self.state.remaining_total_ms.saturating_sub(unused);
        self.state.remaining_session_ms = 0;

        let ended = self.state.session_kind;
        let cycle_index = self.state.cycle_index;
        tracing::info!(kind = %ended, cycle = cycle_index, unused_ms = unused, "session ended");
        self.notifier.emit(&Event::SessionEnd {
            session_kind: ended,
            cycle_index,
        });

        match next_transition(ended, cycle_index, self.config.cycle_count()) {
            Transition::Advance { kind, cycle_index } => {
                self.state.cycle_index = cycle_index;
                self.load_session(kind);
                self.notify_state_changed();
            }
            Transition::RunComplete => {
                tracing::info!(total_ms = self.state.total_duration_ms, "run complete");
                self.notifier.emit(&Event::RunComplete {
                    total_duration_ms: self.state.total_duration_ms,
                    configuration: self.config,
                });
                self.restart();
            }
        }
    }

    fn load_session(&mut self, kind: SessionKind) {
        self.disarm();
        self.state.session_kind = kind;
        self.state.remaining_session_ms = self.config.session_duration_ms(kind);

        let first_of_run = self.state.cycle_index == 1 && kind == SessionKind::Work;
        if self.config.auto_advance() && !first_of_run {
            self.arm();
        }
    }

    fn notify_state_changed(&mut self) {
        let snapshot = self.snapshot();
        self.notifier.emit(&Event::StateChanged(snapshot));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::timer::ManualTicker;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn scenario_config() -> Configuration {
        Configuration::new(4, 1_500_000, 300_000, 900_000, false)
    }

    fn manual(config: Configuration) -> SessionScheduler<ManualTicker> {
        SessionScheduler::with_ticker(config, ManualTicker::new())
    }

    fn record(
        scheduler: &mut SessionScheduler<ManualTicker>,
        kind: EventKind,
    ) -> Rc<RefCell<Vec<Event>>> {
        let log = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&log);
        scheduler.subscribe(kind, move |event| {
            sink.borrow_mut().push(event.clone());
            Ok(())
        });
        log
    }

    #[test]
    fn restart_loads_first_work_session() {
        let scheduler = manual(scenario_config());
        let snap = scheduler.snapshot();
        assert_eq!(snap.session_kind, SessionKind::Work);
        assert_eq!(snap.cycle_index, 1);
        assert_eq!(snap.remaining_session_ms, 1_500_000);
        assert_eq!(snap.total_duration_ms, 7_800_000);
        assert_eq!(snap.remaining_total_ms, 7_800_000);
        assert!(!snap.running);
    }

    #[test]
    fn start_pause_toggle_ticker() {
        let mut scheduler = manual(scenario_config());
        scheduler.start();
        assert!(scheduler.is_running());
        assert!(scheduler.ticker().is_armed());
        scheduler.pause();
        assert!(!scheduler.is_running());
        assert!(!scheduler.ticker().is_armed());
    }

    #[test]
    fn tick_decrements_both_counters() {
        let mut scheduler = manual(scenario_config());
        let ticks = record(&mut scheduler, EventKind::Tick);
        scheduler.tick();
        let snap = scheduler.snapshot();
        assert_eq!(snap.remaining_session_ms, 1_499_000);
        assert_eq!(snap.remaining_total_ms, 7_799_000);
        assert_eq!(*ticks.borrow(), vec![Event::Tick(snap)]);
    }

    #[test]
    fn pump_only_consumes_while_running() {
        let mut scheduler = manual(scenario_config());
        scheduler.ticker_mut().advance(5);
        assert_eq!(scheduler.pump(), 0);

        scheduler.start();
        scheduler.ticker_mut().advance(5);
        assert_eq!(scheduler.pump(), 5);
        assert_eq!(scheduler.snapshot().remaining_session_ms, 1_495_000);
    }

    #[test]
    fn partial_quantum_keeps_totals_consistent() {
        let mut scheduler = manual(Configuration::new(1, 1_500, 0, 1_000, false));
        scheduler.tick();
        scheduler.tick();
        let snap = scheduler.snapshot();
        assert_eq!(snap.session_kind, SessionKind::LongBreak);
        assert_eq!(snap.remaining_total_ms, 1_000);
    }

    #[test]
    fn zero_length_break_ends_on_next_tick() {
        let mut scheduler = manual(Configuration::new(2, 1_000, 0, 1_000, false));
        scheduler.tick();
        assert_eq!(scheduler.snapshot().session_kind, SessionKind::ShortBreak);
        assert_eq!(scheduler.snapshot().remaining_session_ms, 0);
        scheduler.tick();
        let snap = scheduler.snapshot();
        assert_eq!(snap.session_kind, SessionKind::Work);
        assert_eq!(snap.cycle_index, 2);
        assert_eq!(snap.remaining_session_ms, 1_000);
    }

    #[test]
    fn auto_advance_starts_following_sessions() {
        let mut scheduler = manual(Configuration::new(2, 2_000, 1_000, 1_000, true));
        assert!(!scheduler.is_running());
        scheduler.skip();
        assert_eq!(scheduler.snapshot().session_kind, SessionKind::ShortBreak);
        assert!(scheduler.is_running());
        assert!(scheduler.ticker().is_armed());
    }

    #[test]
    fn run_complete_restarts_paused_even_with_auto_advance() {
        let mut scheduler = manual(Configuration::new(1, 1_000, 0, 1_000, true));
        let done = record(&mut scheduler, EventKind::RunComplete);
        scheduler.skip();
        scheduler.skip();
        assert_eq!(done.borrow().len(), 1);
        let snap = scheduler.snapshot();
        assert_eq!(snap.session_kind, SessionKind::Work);
        assert_eq!(snap.cycle_index, 1);
        assert!(!snap.running);
    }

    #[test]
    fn state_changed_follows_session_end() {
        let mut scheduler = manual(scenario_config());
        let order = Rc::new(RefCell::new(Vec::new()));
        for kind in [EventKind::SessionEnd, EventKind::StateChanged] {
            let order = Rc::clone(&order);
            scheduler.subscribe(kind, move |event| {
                order.borrow_mut().push(event.kind());
                Ok(())
            });
        }
        scheduler.skip();
        assert_eq!(*order.borrow(), vec![EventKind::SessionEnd, EventKind::StateChanged]);
    }

    #[test]
    fn redundant_start_and_pause_emit_nothing() {
        let mut scheduler = manual(scenario_config());
        let changes = record(&mut scheduler, EventKind::StateChanged);
        scheduler.pause();
        scheduler.start();
        scheduler.start();
        assert_eq!(changes.borrow().len(), 1);
    }
}
