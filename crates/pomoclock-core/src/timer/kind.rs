use serde::{Deserialize, Serialize};
use std::fmt;

/// The kind of a single timed session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionKind {
    Work,
    ShortBreak,
    LongBreak,
}

impl SessionKind {
    pub fn is_break(self) -> bool {
        matches!(self, SessionKind::ShortBreak | SessionKind::LongBreak)
    }

    pub fn label(self) -> &'static str {
        match self {
            SessionKind::Work => "Work",
            SessionKind::ShortBreak => "Short Break",
            SessionKind::LongBreak => "Long Break",
        }
    }
}

impl fmt::Display for SessionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn breaks_are_breaks() {
        assert!(!SessionKind::Work.is_break());
        assert!(SessionKind::ShortBreak.is_break());
        assert!(SessionKind::LongBreak.is_break());
    }

    #[test]
    fn serializes_snake_case() {
        let json = serde_json::to_string(&SessionKind::ShortBreak).unwrap();
        assert_eq!(json, "\"short_break\"");
    }
}
