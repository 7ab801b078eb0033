// crates/squad-gate-core/src/core/metric.rs
// ============================================================================
// Module: Squad Gate Metric Kinds
// Description: Metric kinds, better-direction table, and trend labels.
// Purpose: Keep every comparison-direction decision in a single data table.
// Dependencies: serde
// ============================================================================

//! ## Overview
//! A metric kind names the unit a measurement value is recorded in. Whether a
//! lower or a higher value is the better performance is a fixed property of
//! the kind, stored in [`DIRECTION_TABLE`]. Best-value selection, trend
//! labelling, and leaderboard ordering all consult [`MetricKind::better_direction`]
//! so a new kind only needs one table row.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use serde::Deserialize;
use serde::Serialize;

// ============================================================================
// SECTION: Metric Kinds
// ============================================================================

/// Unit a measurement value is recorded in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MetricKind {
    /// Elapsed time in seconds.
    Seconds,
    /// Repetition count.
    Repetitions,
    /// Load in kilograms.
    Kilograms,
    /// Distance in meters.
    Meters,
    /// Distance in centimeters.
    Centimeters,
}

/// Which end of the numeric scale represents the better performance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BetterDirection {
    /// Smaller values are better (e.g. sprint times).
    Lower,
    /// Larger values are better (e.g. lifted weight).
    Higher,
}

/// Direction table keyed by metric kind.
pub const DIRECTION_TABLE: [(MetricKind, BetterDirection); 5] = [
    (MetricKind::Seconds, BetterDirection::Lower),
    (MetricKind::Repetitions, BetterDirection::Higher),
    (MetricKind::Kilograms, BetterDirection::Higher),
    (MetricKind::Meters, BetterDirection::Higher),
    (MetricKind::Centimeters, BetterDirection::Higher),
];

impl MetricKind {
    /// All metric kinds in declaration order.
    pub const ALL: [Self; 5] =
        [Self::Seconds, Self::Repetitions, Self::Kilograms, Self::Meters, Self::Centimeters];

    /// Returns the better direction for this kind from [`DIRECTION_TABLE`].
    #[must_use]
    pub fn better_direction(self) -> BetterDirection {
        DIRECTION_TABLE
            .iter()
            .find(|(kind, _)| *kind == self)
            .map_or(BetterDirection::Higher, |(_, direction)| *direction)
    }

    /// Returns the stable wire label.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Seconds => "seconds",
            Self::Repetitions => "repetitions",
            Self::Kilograms => "kilograms",
            Self::Meters => "meters",
            Self::Centimeters => "centimeters",
        }
    }
}

impl fmt::Display for MetricKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MetricKind {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str() == value)
            .ok_or_else(|| format!("unknown metric kind: {value}"))
    }
}

// ============================================================================
// SECTION: Direction Semantics
// ============================================================================

impl BetterDirection {
    /// Returns true when `candidate` strictly beats `incumbent`.
    #[must_use]
    pub fn is_better(self, candidate: f64, incumbent: f64) -> bool {
        match self {
            Self::Lower => candidate < incumbent,
            Self::Higher => candidate > incumbent,
        }
    }

    /// Orders two values best-first (usable directly as a sort comparator).
    #[must_use]
    pub fn best_first(self, left: f64, right: f64) -> Ordering {
        match self {
            Self::Lower => left.total_cmp(&right),
            Self::Higher => right.total_cmp(&left),
        }
    }

    /// Labels the movement from an early average to a late average.
    #[must_use]
    pub fn trend(self, early: f64, late: f64) -> Trend {
        if self.is_better(late, early) {
            Trend::Improving
        } else if self.is_better(early, late) {
            Trend::Worsening
        } else {
            Trend::Stable
        }
    }
}

// ============================================================================
// SECTION: Trend
// ============================================================================

/// Three-way performance trend label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Trend {
    /// Late values beat early values.
    Improving,
    /// Early values beat late values.
    Worsening,
    /// Early and late averages are equal.
    Stable,
}

impl Trend {
    /// Returns the stable wire label.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Improving => "improving",
            Self::Worsening => "worsening",
            Self::Stable => "stable",
        }
    }
}

// ============================================================================
// SECTION: Tests
// ============================================================================

#[cfg(test)]
mod tests {
    //! Direction table and trend labelling tests.

    use super::BetterDirection;
    use super::DIRECTION_TABLE;
    use super::MetricKind;
    use super::Trend;

    #[test]
    fn every_kind_has_exactly_one_table_row() {
        for kind in MetricKind::ALL {
            let rows = DIRECTION_TABLE.iter().filter(|(row, _)| *row == kind).count();
            assert_eq!(rows, 1, "{kind} must appear once");
        }
    }

    #[test]
    fn only_seconds_is_lower_is_better() {
        assert_eq!(MetricKind::Seconds.better_direction(), BetterDirection::Lower);
        for kind in [
            MetricKind::Repetitions,
            MetricKind::Kilograms,
            MetricKind::Meters,
            MetricKind::Centimeters,
        ] {
            assert_eq!(kind.better_direction(), BetterDirection::Higher);
        }
    }

    #[test]
    fn trend_respects_direction() {
        assert_eq!(BetterDirection::Lower.trend(10.0, 9.0), Trend::Improving);
        assert_eq!(BetterDirection::Higher.trend(10.0, 9.0), Trend::Worsening);
        assert_eq!(BetterDirection::Higher.trend(3.0, 3.0), Trend::Stable);
    }

    #[test]
    fn wire_labels_parse_back() {
        for kind in MetricKind::ALL {
            assert_eq!(kind.as_str().parse::<MetricKind>(), Ok(kind));
        }
        assert!("furlongs".parse::<MetricKind>().is_err());
    }
}
