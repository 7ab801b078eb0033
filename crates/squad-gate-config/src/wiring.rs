// crates/squad-gate-config/src/wiring.rs
// ============================================================================
// Module: Squad Gate Wiring
// Description: Builds the configured store, audit sink, and access engine.
// Purpose: Turn a validated config into a ready engine.
// Dependencies: squad-gate-core, squad-gate-store-sqlite
// ============================================================================

//! ## Overview
//! [`ConfiguredStore`] lets one engine type serve either backend. It only
//! delegates; ordering and predicate semantics stay with each store.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeSet;

use squad_gate_core::AccessEngine;
use squad_gate_core::ActivityLogEntry;
use squad_gate_core::ActivityLogStore;
use squad_gate_core::CoachId;
use squad_gate_core::Exercise;
use squad_gate_core::ExerciseId;
use squad_gate_core::InMemoryRosterStore;
use squad_gate_core::LogQuery;
use squad_gate_core::Measurement;
use squad_gate_core::MeasurementId;
use squad_gate_core::MeasurementQuery;
use squad_gate_core::MeasurementStore;
use squad_gate_core::MembershipReader;
use squad_gate_core::NewActivityLog;
use squad_gate_core::PlayerId;
use squad_gate_core::RosterStore;
use squad_gate_core::StoreError;
use squad_gate_core::TeamId;
use squad_gate_store_sqlite::SqliteRosterStore;
use squad_gate_store_sqlite::SqliteStoreError;

use crate::config::ConfigError;
use crate::config::SquadGateConfig;

// ============================================================================
// SECTION: Store Selection
// ============================================================================

/// Store chosen by configuration.
pub enum ConfiguredStore {
    /// In-memory store.
    Memory(InMemoryRosterStore),
    /// `SQLite` store.
    Sqlite(SqliteRosterStore),
}

impl SquadGateConfig {
    /// Opens the configured roster store.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when the config is invalid or the store cannot be opened.
    pub fn open_store(&self) -> Result<ConfiguredStore, ConfigError> {
        self.validate()?;
        match self.store.sqlite() {
            Some(sqlite) => SqliteRosterStore::new(&sqlite)
                .map(ConfiguredStore::Sqlite)
                .map_err(|err| match err {
                    SqliteStoreError::Invalid(message) => ConfigError::Invalid(message),
                    other => ConfigError::Io(other.to_string()),
                }),
            None => Ok(ConfiguredStore::Memory(InMemoryRosterStore::new())),
        }
    }

    /// Builds an engine over the configured store, sink, and limits.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when any configured component cannot be built.
    pub fn build_engine(&self) -> Result<AccessEngine<ConfiguredStore>, ConfigError> {
        let limits = self.engine.limits()?;
        let audit = self.audit.build_sink()?;
        let store = self.open_store()?;
        Ok(AccessEngine::new(store, audit, limits))
    }
}

// ============================================================================
// SECTION: Delegation
// ============================================================================

impl MembershipReader for ConfiguredStore {
    fn teams_for_coach(&self, coach_id: CoachId) -> Result<BTreeSet<TeamId>, StoreError> {
        match self {
            Self::Memory(store) => store.teams_for_coach(coach_id),
            Self::Sqlite(store) => store.teams_for_coach(coach_id),
        }
    }

    fn players_in_teams(&self, teams: &BTreeSet<TeamId>) -> Result<BTreeSet<PlayerId>, StoreError> {
        match self {
            Self::Memory(store) => store.players_in_teams(teams),
            Self::Sqlite(store) => store.players_in_teams(teams),
        }
    }

    fn teams_for_player(&self, player_id: PlayerId) -> Result<BTreeSet<TeamId>, StoreError> {
        match self {
            Self::Memory(store) => store.teams_for_player(player_id),
            Self::Sqlite(store) => store.teams_for_player(player_id),
        }
    }

    fn team_exists(&self, team_id: TeamId) -> Result<bool, StoreError> {
        match self {
            Self::Memory(store) => store.team_exists(team_id),
            Self::Sqlite(store) => store.team_exists(team_id),
        }
    }

    fn player_exists(&self, player_id: PlayerId) -> Result<bool, StoreError> {
        match self {
            Self::Memory(store) => store.player_exists(player_id),
            Self::Sqlite(store) => store.player_exists(player_id),
        }
    }
}

impl ActivityLogStore for ConfiguredStore {
    fn query_logs(&self, query: &LogQuery) -> Result<Vec<ActivityLogEntry>, StoreError> {
        match self {
            Self::Memory(store) => store.query_logs(query),
            Self::Sqlite(store) => store.query_logs(query),
        }
    }

    fn append_log(&self, entry: NewActivityLog) -> Result<ActivityLogEntry, StoreError> {
        match self {
            Self::Memory(store) => store.append_log(entry),
            Self::Sqlite(store) => store.append_log(entry),
        }
    }
}

impl MeasurementStore for ConfiguredStore {
    fn exercise(&self, exercise_id: ExerciseId) -> Result<Option<Exercise>, StoreError> {
        match self {
            Self::Memory(store) => store.exercise(exercise_id),
            Self::Sqlite(store) => store.exercise(exercise_id),
        }
    }

    fn measurement(
        &self,
        measurement_id: MeasurementId,
    ) -> Result<Option<Measurement>, StoreError> {
        match self {
            Self::Memory(store) => store.measurement(measurement_id),
            Self::Sqlite(store) => store.measurement(measurement_id),
        }
    }

    fn query_measurements(&self, query: &MeasurementQuery) -> Result<Vec<Measurement>, StoreError> {
        match self {
            Self::Memory(store) => store.query_measurements(query),
            Self::Sqlite(store) => store.query_measurements(query),
        }
    }
}

impl RosterStore for ConfiguredStore {
    fn readiness(&self) -> Result<(), StoreError> {
        match self {
            Self::Memory(store) => store.readiness(),
            Self::Sqlite(store) => store.readiness(),
        }
    }
}
