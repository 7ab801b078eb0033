// crates/squad-gate-core/src/core/identifiers.rs
// ============================================================================
// Module: Squad Gate Identifiers
// Description: Canonical numeric identifiers for roster, measurement, and log records.
// Purpose: Provide strongly typed, serializable identifiers with stable wire forms.
// Dependencies: serde
// ============================================================================

//! ## Overview
//! This module defines the identifiers used throughout Squad Gate. Every
//! record in the backing store is keyed by a positive integer; the wrappers
//! below keep player, team, and user keys from being mixed up at call sites.
//! Numeric identifiers enforce non-zero, 1-based invariants at construction
//! boundaries and serialize as plain numbers on the wire.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;
use std::num::NonZeroU64;

use serde::Deserialize;
use serde::Serialize;

// ============================================================================
// SECTION: Identifier Macro
// ============================================================================

/// Declares a 1-based numeric identifier wrapper.
macro_rules! numeric_identifier {
    ($(#[$meta:meta])* $name:ident, $label:literal) => {
        $(#[$meta])*
        ///
        /// # Invariants
        /// - Always >= 1 (non-zero, 1-based).
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(NonZeroU64);

        impl $name {
            #[doc = concat!("Creates a new ", $label, " identifier from a non-zero value.")]
            #[must_use]
            pub const fn new(id: NonZeroU64) -> Self {
                Self(id)
            }

            #[doc = concat!("Creates a ", $label, " identifier from a raw value (returns `None` if zero).")]
            #[must_use]
            pub const fn from_raw(raw: u64) -> Option<Self> {
                match NonZeroU64::new(raw) {
                    Some(id) => Some(Self(id)),
                    None => None,
                }
            }

            /// Returns the raw identifier value (always >= 1).
            #[must_use]
            pub const fn get(self) -> u64 {
                self.0.get()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                self.0.get().fmt(f)
            }
        }
    };
}

// ============================================================================
// SECTION: Identifier Types
// ============================================================================

numeric_identifier!(
    /// Account identifier for any authenticated user (admin, coach, or player).
    UserId,
    "user"
);

numeric_identifier!(
    /// Player profile identifier.
    PlayerId,
    "player"
);

numeric_identifier!(
    /// Coach profile identifier.
    CoachId,
    "coach"
);

numeric_identifier!(
    /// Team identifier.
    TeamId,
    "team"
);

numeric_identifier!(
    /// Exercise identifier.
    ExerciseId,
    "exercise"
);

numeric_identifier!(
    /// Measurement record identifier.
    MeasurementId,
    "measurement"
);

numeric_identifier!(
    /// Activity log entry identifier.
    LogEntryId,
    "log entry"
);

// ============================================================================
// SECTION: Tests
// ============================================================================

#[cfg(test)]
mod tests {
    //! Identifier construction and wire-format tests.

    #![allow(clippy::unwrap_used, reason = "Test-only assertions are permitted.")]

    use super::PlayerId;
    use super::TeamId;

    #[test]
    fn zero_is_rejected() {
        assert!(PlayerId::from_raw(0).is_none());
        assert_eq!(TeamId::from_raw(7).map(TeamId::get), Some(7));
    }

    #[test]
    fn serializes_as_plain_number() {
        let id = PlayerId::from_raw(42).unwrap();
        assert_eq!(serde_json::to_string(&id).unwrap(), "42");
        let parsed: PlayerId = serde_json::from_str("42").unwrap();
        assert_eq!(parsed, id);
        assert!(serde_json::from_str::<PlayerId>("0").is_err());
    }
}
