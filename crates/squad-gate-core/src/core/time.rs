// crates/squad-gate-core/src/core/time.rs
// ============================================================================
// Module: Squad Gate Time Model
// Description: Canonical timestamps and inclusive time ranges.
// Purpose: Provide ordered, serializable time values for measurements and logs.
// Dependencies: serde, thiserror, time
// ============================================================================

//! ## Overview
//! Squad Gate stores every instant as unix epoch milliseconds. The engine
//! never reads wall-clock time while evaluating a request; callers supply
//! filter bounds explicitly and stores supply record timestamps. RFC 3339
//! conversion exists for the boundary where filters arrive as text.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Errors raised when converting between text and timestamps.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TimeError {
    /// Input was not a valid RFC 3339 timestamp.
    #[error("invalid rfc3339 timestamp: {0}")]
    Parse(String),
    /// Timestamp falls outside the representable range.
    #[error("timestamp out of range")]
    OutOfRange,
    /// Range lower bound is after its upper bound.
    #[error("time range lower bound is after upper bound")]
    InvertedRange,
}

// ============================================================================
// SECTION: Timestamp
// ============================================================================

/// Instant expressed as unix epoch milliseconds.
///
/// # Invariants
/// - Ordering matches chronological ordering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Timestamp(i64);

impl Timestamp {
    /// Creates a timestamp from unix epoch milliseconds.
    #[must_use]
    pub const fn from_unix_millis(millis: i64) -> Self {
        Self(millis)
    }

    /// Returns the timestamp as unix epoch milliseconds.
    #[must_use]
    pub const fn as_unix_millis(self) -> i64 {
        self.0
    }

    /// Parses an RFC 3339 timestamp (e.g. `2024-03-01T10:00:00Z`).
    ///
    /// # Errors
    ///
    /// Returns [`TimeError`] when the input is malformed or out of range.
    pub fn parse_rfc3339(value: &str) -> Result<Self, TimeError> {
        let parsed = OffsetDateTime::parse(value.trim(), &Rfc3339)
            .map_err(|err| TimeError::Parse(err.to_string()))?;
        let millis = parsed.unix_timestamp_nanos() / 1_000_000;
        i64::try_from(millis).map(Self).map_err(|_| TimeError::OutOfRange)
    }

    /// Formats the timestamp as RFC 3339 in UTC.
    ///
    /// # Errors
    ///
    /// Returns [`TimeError`] when the instant cannot be represented.
    pub fn to_rfc3339(self) -> Result<String, TimeError> {
        let nanos = i128::from(self.0) * 1_000_000;
        let instant =
            OffsetDateTime::from_unix_timestamp_nanos(nanos).map_err(|_| TimeError::OutOfRange)?;
        instant.format(&Rfc3339).map_err(|err| TimeError::Parse(err.to_string()))
    }
}

// ============================================================================
// SECTION: Time Range
// ============================================================================

/// Inclusive time range with optional bounds.
///
/// # Invariants
/// - When both bounds are present, `from <= to` (enforced by [`TimeRange::new`]).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeRange {
    /// Inclusive lower bound.
    pub from: Option<Timestamp>,
    /// Inclusive upper bound.
    pub to: Option<Timestamp>,
}

impl TimeRange {
    /// Range without bounds.
    pub const UNBOUNDED: Self = Self {
        from: None,
        to: None,
    };

    /// Builds a validated range.
    ///
    /// # Errors
    ///
    /// Returns [`TimeError::InvertedRange`] when `from` is after `to`.
    pub fn new(from: Option<Timestamp>, to: Option<Timestamp>) -> Result<Self, TimeError> {
        if let (Some(lower), Some(upper)) = (from, to)
            && lower > upper
        {
            return Err(TimeError::InvertedRange);
        }
        Ok(Self {
            from,
            to,
        })
    }

    /// Re-checks bound order on a range that bypassed [`TimeRange::new`]
    /// (for example one built by deserialization).
    ///
    /// # Errors
    ///
    /// Returns [`TimeError::InvertedRange`] when `from` is after `to`.
    pub fn validate(&self) -> Result<(), TimeError> {
        Self::new(self.from, self.to).map(|_| ())
    }

    /// Returns true when the instant lies within the range.
    #[must_use]
    pub fn contains(&self, instant: Timestamp) -> bool {
        self.from.is_none_or(|lower| instant >= lower) && self.to.is_none_or(|upper| instant <= upper)
    }
}

// ============================================================================
// SECTION: Tests
// ============================================================================
