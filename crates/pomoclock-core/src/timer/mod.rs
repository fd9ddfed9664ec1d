mod engine;
mod kind;
mod ticker;
mod transition;

pub use engine::SessionScheduler;
pub use kind::SessionKind;
pub use ticker::{ManualTicker, Ticker, WallClockTicker, QUANTUM_MS};
pub use transition::{next_transition, Transition};
