// crates/squad-gate-core/src/interfaces/mod.rs
// ============================================================================
// Module: Squad Gate Interfaces
// Description: Backend-agnostic read interfaces over roster, logs, and measurements.
// Purpose: Define the contract surfaces the access engine queries.
// Dependencies: crate::core, thiserror
// ============================================================================

//! ## Overview
//! The engine owns no schema. It reads team memberships, measurements, and
//! the append-only activity log through the traits below, handing stores
//! declarative predicates ([`LogQuery`], [`MeasurementQuery`]) rather than
//! query text. Implementations must honour the ordering contracts documented
//! on those predicates and must read memberships fresh on every call.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeSet;

use thiserror::Error;

use crate::core::ActivityLogEntry;
use crate::core::CoachId;
use crate::core::Exercise;
use crate::core::ExerciseId;
use crate::core::LogQuery;
use crate::core::Measurement;
use crate::core::MeasurementId;
use crate::core::MeasurementQuery;
use crate::core::NewActivityLog;
use crate::core::PlayerId;
use crate::core::TeamId;

// ============================================================================
// SECTION: Store Errors
// ============================================================================

/// Store errors surfaced unchanged to engine callers.
///
/// # Invariants
/// - Variants are stable for programmatic handling.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// Store I/O error.
    #[error("roster store io error: {0}")]
    Io(String),
    /// Store data is corrupted or fails integrity checks.
    #[error("roster store corruption: {0}")]
    Corrupt(String),
    /// Store data is invalid.
    #[error("roster store invalid data: {0}")]
    Invalid(String),
    /// Store reported an error.
    #[error("roster store error: {0}")]
    Store(String),
}

// ============================================================================
// SECTION: Membership
// ============================================================================

/// Team membership reads used by scope resolution.
pub trait MembershipReader {
    /// Returns the teams the coach currently belongs to.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the read fails.
    fn teams_for_coach(&self, coach_id: CoachId) -> Result<BTreeSet<TeamId>, StoreError>;

    /// Returns the union of current players across the given teams.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the read fails.
    fn players_in_teams(&self, teams: &BTreeSet<TeamId>) -> Result<BTreeSet<PlayerId>, StoreError>;

    /// Returns the teams the player currently belongs to.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the read fails.
    fn teams_for_player(&self, player_id: PlayerId) -> Result<BTreeSet<TeamId>, StoreError>;

    /// Returns true when a team record exists (active or not).
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the read fails.
    fn team_exists(&self, team_id: TeamId) -> Result<bool, StoreError>;

    /// Returns true when a player record exists (active or not).
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the read fails.
    fn player_exists(&self, player_id: PlayerId) -> Result<bool, StoreError>;
}

// ============================================================================
// SECTION: Activity Log
// ============================================================================

/// Append-only activity log access.
pub trait ActivityLogStore {
    /// Returns matching entries newest first (ties by ID descending), with
    /// the query window applied after ordering.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the read fails.
    fn query_logs(&self, query: &LogQuery) -> Result<Vec<ActivityLogEntry>, StoreError>;

    /// Appends an entry and returns it with its assigned identifier.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the write fails.
    fn append_log(&self, entry: NewActivityLog) -> Result<ActivityLogEntry, StoreError>;
}

// ============================================================================
// SECTION: Measurements
// ============================================================================

/// Exercise and measurement reads.
pub trait MeasurementStore {
    /// Loads an exercise by identifier, including soft-deleted ones.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the read fails.
    fn exercise(&self, exercise_id: ExerciseId) -> Result<Option<Exercise>, StoreError>;

    /// Loads a measurement by identifier, including soft-deleted ones.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the read fails.
    fn measurement(&self, measurement_id: MeasurementId)
    -> Result<Option<Measurement>, StoreError>;

    /// Returns matching measurements oldest first (ties by ID ascending),
    /// with the query window applied after ordering.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the read fails.
    fn query_measurements(&self, query: &MeasurementQuery)
    -> Result<Vec<Measurement>, StoreError>;
}

// ============================================================================
// SECTION: Combined Store
// ============================================================================

/// Every read surface the access engine needs.
pub trait RosterStore: MembershipReader + ActivityLogStore + MeasurementStore {
    /// Reports store readiness for liveness/readiness probes.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the store is unavailable.
    fn readiness(&self) -> Result<(), StoreError> {
        Ok(())
    }
}
