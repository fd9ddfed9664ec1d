use serde::Serialize;
use std::fmt;
use std::str::FromStr;

use crate::config::Configuration;
use crate::timer::SessionKind;

/// Read-only view of the scheduler state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    pub session_kind: SessionKind,
    pub cycle_index: u32,
    pub cycle_count: u32,
    pub remaining_session_ms: u64,
    pub remaining_total_ms: u64,
    pub total_duration_ms: u64,
    pub running: bool,
}

impl Snapshot {
    pub fn elapsed_total_ms(&self) -> u64 {
        self.total_duration_ms.saturating_sub(self.remaining_total_ms)
    }

    /// 0.0 .. 1.0 progress across the whole run.
    pub fn progress(&self) -> f64 {
        if self.total_duration_ms == 0 {
            return 0.0;
        }
        (self.elapsed_total_ms() as f64 / self.total_duration_ms as f64).min(1.0)
    }
}

/// Every state change of the scheduler produces an Event.
/// Display layers subscribe to them through the [`Notifier`](crate::Notifier).
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum Event {
    NewRun {
        configuration: Configuration,
    },
    SessionEnd {
        session_kind: SessionKind,
        cycle_index: u32,
    },
    RunComplete {
        total_duration_ms: u64,
        configuration: Configuration,
    },
    Tick(Snapshot),
    /// The displayed state changed outside of a plain tick.
    StateChanged(Snapshot),
}

impl Event {
    pub fn kind(&self) -> EventKind {
        match self {
            Event::NewRun { .. } => EventKind::NewRun,
            Event::SessionEnd { .. } => EventKind::SessionEnd,
            Event::RunComplete { .. } => EventKind::RunComplete,
            Event::Tick(_) => EventKind::Tick,
            Event::StateChanged(_) => EventKind::StateChanged,
        }
    }
}

/// Event names listeners subscribe to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum EventKind {
    #[serde(rename = "newRun")]
    NewRun,
    #[serde(rename = "sessionEnd")]
    SessionEnd,
    #[serde(rename = "runComplete")]
    RunComplete,
    #[serde(rename = "tick")]
    Tick,
    #[serde(rename = "stateChanged")]
    StateChanged,
}

impl EventKind {
    pub const ALL: [EventKind; 5] = [
        EventKind::NewRun,
        EventKind::SessionEnd,
        EventKind::RunComplete,
        EventKind::Tick,
        EventKind::StateChanged,
    ];

    pub fn name(self) -> &'static str {
        match self {
            EventKind::NewRun => "newRun",
            EventKind::SessionEnd => "sessionEnd",
            EventKind::RunComplete => "runComplete",
            EventKind::Tick => "tick",
            EventKind::StateChanged => "stateChanged",
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown event name: {0}")]
pub struct UnknownEventKind(pub String);

impl FromStr for EventKind {
    type Err = UnknownEventKind;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "newRun" | "new_run" => Ok(EventKind::NewRun),
            "sessionEnd" | "session_end" => Ok(EventKind::SessionEnd),
            "runComplete" | "run_complete" => Ok(EventKind::RunComplete),
            "tick" => Ok(EventKind::Tick),
            "stateChanged" | "state_changed" => Ok(EventKind::StateChanged),
            other => Err(UnknownEventKind(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot() -> Snapshot {
        Snapshot {
            session_kind: SessionKind::Work,
            cycle_index: 1,
            cycle_count: 4,
            remaining_session_ms: 1_000,
            remaining_total_ms: 3_000,
            total_duration_ms: 4_000,
            running: true,
        }
    }

    #[test]
    fn event_names_roundtrip() {
        for kind in EventKind::ALL {
            assert_eq!(kind.name().parse::<EventKind>(), Ok(kind));
        }
        assert_eq!("session_end".parse::<EventKind>(), Ok(EventKind::SessionEnd));
        let err = "alarm".parse::<EventKind>().unwrap_err();
        assert_eq!(err.to_string(), "unknown event name: alarm");
    }

    #[test]
    fn tick_serializes_with_type_tag() {
        let value = serde_json::to_value(Event::Tick(snapshot())).unwrap();
        assert_eq!(value["type"], "tick");
        assert_eq!(value["sessionKind"], "work");
        assert_eq!(value["remainingTotalMs"], 3_000);
    }

    #[test]
    fn session_end_payload() {
        let event = Event::SessionEnd {
            session_kind: SessionKind::LongBreak,
            cycle_index: 4,
        };
        assert_eq!(event.kind(), EventKind::SessionEnd);
        let value = serde_json::to_value(&event).unwrap();
        assert_eq!(value["type"], "sessionEnd");
        assert_eq!(value["sessionKind"], "long_break");
        assert_eq!(value["cycleIndex"], 4);
    }

    #[test]
    fn progress_is_fraction_consumed() {
        let snap = snapshot();
        assert_eq!(snap.elapsed_total_ms(), 1_000);
        assert!((snap.progress() - 0.25).abs() < f64::EPSILON);

        let empty = Snapshot { total_duration_ms: 0, remaining_total_ms: 0, ..snap };
        assert_eq!(empty.progress(), 0.0);
    }
}
