//! Run configuration.
//!
//! A [`Configuration`] is an immutable, validated set of durations and counts.
//! It is only ever built through validation, which substitutes the documented
//! default for every field that is absent, non-numeric or out of its domain.
//! Validation never fails.

use serde::ser::{SerializeStruct, Serializer};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::timer::SessionKind;

pub const DEFAULT_CYCLE_COUNT: u32 = 4;
pub const DEFAULT_WORK_DURATION_MS: u64 = 25 * 60 * 1000;
pub const DEFAULT_SHORT_BREAK_DURATION_MS: u64 = 5 * 60 * 1000;
pub const DEFAULT_LONG_BREAK_DURATION_MS: u64 = 15 * 60 * 1000;
pub const DEFAULT_AUTO_ADVANCE: bool = false;

/// Unvalidated configuration input.
///
/// Every field is optional and loosely typed so that any JSON or TOML document
/// can be handed to [`Configuration::validate`]. Keys are accepted in both
/// snake_case and camelCase.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RawConfig {
    #[serde(alias = "cycleCount", skip_serializing_if = "Option::is_none")]
    pub cycle_count: Option<Value>,
    #[serde(alias = "workDurationMs", skip_serializing_if = "Option::is_none")]
    pub work_duration_ms: Option<Value>,
    #[serde(alias = "shortBreakDurationMs", skip_serializing_if = "Option::is_none")]
    pub short_break_duration_ms: Option<Value>,
    #[serde(alias = "longBreakDurationMs", skip_serializing_if = "Option::is_none")]
    pub long_break_duration_ms: Option<Value>,
    #[serde(alias = "autoAdvance", skip_serializing_if = "Option::is_none")]
    pub auto_advance: Option<Value>,
}

impl RawConfig {
    /// Read a raw config out of an arbitrary JSON value.
    ///
    /// Anything that is not an object yields an empty raw config.
    pub fn from_json(value: &Value) -> Self {
        if !value.is_object() {
            return Self::default();
        }
        serde_json::from_value(value.clone()).unwrap_or_default()
    }
}

/// A planned segment of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Segment {
    pub cycle_index: u32,
    pub kind: SessionKind,
    pub duration_ms: u64,
}

/// Validated run configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Configuration {
    cycle_count: u32,
    work_duration_ms: u64,
    short_break_duration_ms: u64,
    long_break_duration_ms: u64,
    auto_advance: bool,
}

impl Default for Configuration {
    fn default() -> Self {
        Self {
            cycle_count: DEFAULT_CYCLE_COUNT,
            work_duration_ms: DEFAULT_WORK_DURATION_MS,
            short_break_duration_ms: DEFAULT_SHORT_BREAK_DURATION_MS,
            long_break_duration_ms: DEFAULT_LONG_BREAK_DURATION_MS,
            auto_advance: DEFAULT_AUTO_ADVANCE,
        }
    }
}

impl Configuration {
    /// Build from typed values, applying the same defaulting policy as
    /// [`Configuration::validate`].
    pub fn new(
        cycle_count: u32,
        work_duration_ms: u64,
        short_break_duration_ms: u64,
        long_break_duration_ms: u64,
        auto_advance: bool,
    ) -> Self {
        Self::validate(&RawConfig {
            cycle_count: Some(cycle_count.into()),
            work_duration_ms: Some(work_duration_ms.into()),
            short_break_duration_ms: Some(short_break_duration_ms.into()),
            long_break_duration_ms: Some(long_break_duration_ms.into()),
            auto_advance: Some(auto_advance.into()),
        })
    }

    /// Validate raw input into a usable configuration.
    pub fn validate(raw: &RawConfig) -> Self {
        let cycle_count = field("cycle_count", raw.cycle_count.as_ref(), parse_cycle_count)
            .unwrap_or(DEFAULT_CYCLE_COUNT);
        let work_duration_ms = field("work_duration_ms", raw.work_duration_ms.as_ref(), |v| {
            parse_duration(v).filter(|ms| *ms > 0)
        })
        .unwrap_or(DEFAULT_WORK_DURATION_MS);
        let short_break_duration_ms = field(
            "short_break_duration_ms",
            raw.short_break_duration_ms.as_ref(),
            parse_duration,
        )
        .unwrap_or(DEFAULT_SHORT_BREAK_DURATION_MS);
        let long_break_duration_ms = field(
            "long_break_duration_ms",
            raw.long_break_duration_ms.as_ref(),
            parse_duration,
        )
        .unwrap_or(DEFAULT_LONG_BREAK_DURATION_MS);
        let auto_advance = field("auto_advance", raw.auto_advance.as_ref(), parse_bool)
            .unwrap_or(DEFAULT_AUTO_ADVANCE);

        Self {
            cycle_count,
            work_duration_ms,
            short_break_duration_ms,
            long_break_duration_ms,
            auto_advance,
        }
    }

    /// Validate a JSON document directly.
    pub fn from_json(value: &Value) -> Self {
        Self::validate(&RawConfig::from_json(value))
    }

    pub fn cycle_count(&self) -> u32 {
        self.cycle_count
    }

    pub fn work_duration_ms(&self) -> u64 {
        self.work_duration_ms
    }

    pub fn short_break_duration_ms(&self) -> u64 {
        self.short_break_duration_ms
    }

    pub fn long_break_duration_ms(&self) -> u64 {
        self.long_break_duration_ms
    }

    pub fn auto_advance(&self) -> bool {
        self.auto_advance
    }

    /// Configured duration of a session kind.
    pub fn session_duration_ms(&self, kind: SessionKind) -> u64 {
        match kind {
            SessionKind::Work => self.work_duration_ms,
            SessionKind::ShortBreak => self.short_break_duration_ms,
            SessionKind::LongBreak => self.long_break_duration_ms,
        }
    }

    /// `cycles * work + (cycles - 1) * short_break + long_break`.
    ///
    /// Uses saturating arithmetic to prevent overflow with large values.
    pub fn total_duration_ms(&self) -> u64 {
        let cycles = u64::from(self.cycle_count);
        cycles
            .saturating_mul(self.work_duration_ms)
            .saturating_add(
                cycles
                    .saturating_sub(1)
                    .saturating_mul(self.short_break_duration_ms),
            )
            .saturating_add(self.long_break_duration_ms)
    }

    /// Number of sessions in one run.
    pub fn segment_count(&self) -> u64 {
        2 * u64::from(self.cycle_count)
    }

    /// The planned run, in order. Lazily yielded; a run may be very long.
    pub fn segments(&self) -> impl Iterator<Item = Segment> {
        let config = *self;
        (1..=config.cycle_count).flat_map(move |cycle_index| {
            let brk = if cycle_index == config.cycle_count {
                SessionKind::LongBreak
            } else {
                SessionKind::ShortBreak
            };
            [SessionKind::Work, brk].map(|kind| Segment {
                cycle_index,
                kind,
                duration_ms: config.session_duration_ms(kind),
            })
        })
    }

    pub fn plan(&self) -> Plan {
        Plan { configuration: *self }
    }
}

/// Serializable run plan: `{configuration, segments, totalDurationMs}`.
/// Segments are written one at a time as the plan is serialized.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Plan {
    configuration: Configuration,
}

impl Serialize for Plan {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        struct Segments(Configuration);

        impl Serialize for Segments {
            fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                serializer.collect_seq(self.0.segments())
            }
        }

        let mut plan = serializer.serialize_struct("Plan", 3)?;
        plan.serialize_field("configuration", &self.configuration)?;
        plan.serialize_field("segments", &Segments(self.configuration))?;
        plan.serialize_field("totalDurationMs", &self.configuration.total_duration_ms())?;
        plan.end()
    }
}

fn field<T>(name: &str, value: Option<&Value>, parse: impl Fn(&Value) -> Option<T>) -> Option<T> {
    let value = value?;
    let parsed = parse(value);
    if parsed.is_none() {
        tracing::debug!(field = name, value = %value, "invalid config value, using default");
    }
    parsed
}

fn parse_number(value: &Value) -> Option<f64> {
    let n = match value {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => s.trim().parse::<f64>().ok()?,
        _ => return None,
    };
    n.is_finite().then_some(n)
}

fn parse_cycle_count(value: &Value) -> Option<u32> {
    if let Some(n) = value.as_u64() {
        return u32::try_from(n).ok().filter(|n| *n >= 1);
    }
    let n = parse_number(value)?;
    if n.fract() != 0.0 || n < 1.0 || n > f64::from(u32::MAX) {
        return None;
    }
    Some(n as u32)
}

fn parse_duration(value: &Value) -> Option<u64> {
    if let Some(n) = value.as_u64() {
        return Some(n);
    }
    let n = parse_number(value)?;
    if n < 0.0 {
        return None;
    }
    Some(n.trunc() as u64)
}

fn parse_bool(value: &Value) -> Option<bool> {
    match value {
        Value::Bool(b) => Some(*b),
        Value::String(s) => s.trim().parse::<bool>().ok(),
        _ => None,
    }
}
