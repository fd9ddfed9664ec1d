use super::kind::SessionKind;

/// Outcome of a session ending.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// Load `kind` as the next session of cycle `cycle_index`.
    Advance { kind: SessionKind, cycle_index: u32 },
    /// The long break of the final cycle finished.
    RunComplete,
}

/// Decide what follows the session `kind` of cycle `cycle_index`.
///
/// Work is followed by a short break, or by the long break on the last cycle.
/// A break moves to the next cycle's work session, except on the last cycle
/// where the run is complete.
pub fn next_transition(kind: SessionKind, cycle_index: u32, cycle_count: u32) -> Transition {
    let last_cycle = cycle_index >= cycle_count;
    match kind {
        SessionKind::Work => Transition::Advance {
            kind: if last_cycle {
                SessionKind::LongBreak
            } else {
                SessionKind::ShortBreak
            },
            cycle_index,
        },
        SessionKind::ShortBreak | SessionKind::LongBreak => {
            if last_cycle {
                Transition::RunComplete
            } else {
                Transition::Advance {
                    kind: SessionKind::Work,
                    cycle_index: cycle_index + 1,
                }
            }
        }
    }
}
