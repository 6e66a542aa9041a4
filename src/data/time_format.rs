//! Elapsed-time labels for the playback cursor.
//!
//! Trace timestamps are integers in a fixed unit (picoseconds for the LED testbench).
//! [`ElapsedFormatter`] rescales them to a human unit with fixed decimals.

use std::fmt;

use serde::{Deserialize, Serialize};

// ─────────────────────────────────────────────────────────────────────────────
// TimeUnit
// ─────────────────────────────────────────────────────────────────────────────

/// A unit of simulated time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimeUnit {
    #[default]
    Picoseconds,
    Nanoseconds,
    Microseconds,
    Milliseconds,
    Seconds,
}

impl TimeUnit {
    /// How many of this unit make up one second.
    ///
    /// ```
    /// # use dutyscope::data::time_format::TimeUnit;
    /// assert_eq!(TimeUnit::Milliseconds.units_per_second(), 1_000.0);
    /// assert_eq!(TimeUnit::Picoseconds.units_per_second(), 1e12);
    /// ```
    pub fn units_per_second(&self) -> f64 {
        match self {
            TimeUnit::Picoseconds => 1e12,
            TimeUnit::Nanoseconds => 1e9,
            TimeUnit::Microseconds => 1e6,
            TimeUnit::Milliseconds => 1e3,
            TimeUnit::Seconds => 1.0,
        }
    }

    /// Convert `value` expressed in this unit into `target`.
    pub fn convert(&self, value: f64, target: TimeUnit) -> f64 {
        value / self.units_per_second() * target.units_per_second()
    }
}

impl fmt::Display for TimeUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TimeUnit::Picoseconds => write!(f, "ps"),
            TimeUnit::Nanoseconds => write!(f, "ns"),
            TimeUnit::Microseconds => write!(f, "µs"),
            TimeUnit::Milliseconds => write!(f, "ms"),
            TimeUnit::Seconds => write!(f, "s"),
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// ElapsedFormatter
// ─────────────────────────────────────────────────────────────────────────────

/// Formats a raw timestamp as elapsed time, e.g. `3.00 ms`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ElapsedFormatter {
    /// Unit of the raw values passed to [`format`](Self::format).
    pub source_unit: TimeUnit,
    /// Unit the label is rendered in.
    pub display_unit: TimeUnit,
    /// Digits after the decimal point.
    pub decimal_places: usize,
}

impl Default for ElapsedFormatter {
    fn default() -> Self {
        Self {
            source_unit: TimeUnit::Picoseconds,
            display_unit: TimeUnit::Milliseconds,
            decimal_places: 2,
        }
    }
}

impl ElapsedFormatter {
    /// ```
    /// # use dutyscope::data::time_format::ElapsedFormatter;
    /// let f = ElapsedFormatter::default();
    /// assert_eq!(f.format(3_000_000_000), "3.00 ms");
    /// ```
    pub fn format(&self, value: u64) -> String {
        let scaled = self.source_unit.convert(value as f64, self.display_unit);
        format!("{:.*} {}", self.decimal_places, scaled, self.display_unit)
    }

    /// The readout shown next to the playback controls.
    pub fn label(&self, value: u64) -> String {
        format!("Time: {}", self.format(value))
    }
}
