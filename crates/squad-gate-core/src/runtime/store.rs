// crates/squad-gate-core/src/runtime/store.rs
// ============================================================================
// Module: Squad Gate In-Memory Store
// Description: Mutex-guarded in-memory implementation of the roster interfaces.
// Purpose: Back tests and embedded callers without a database.
// Dependencies: crate::core, crate::interfaces
// ============================================================================

//! ## Overview
//! [`InMemoryRosterStore`] evaluates the declarative predicates with the same
//! `matches` helpers the core types expose, so its results define the
//! reference behaviour durable stores are compared against.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::collections::BTreeSet;
use std::sync::Mutex;
use std::sync::MutexGuard;

use crate::core::ActivityLogEntry;
use crate::core::CoachId;
use crate::core::Exercise;
use crate::core::ExerciseId;
use crate::core::LogEntryId;
use crate::core::LogQuery;
use crate::core::Measurement;
use crate::core::MeasurementId;
use crate::core::MeasurementQuery;
use crate::core::NewActivityLog;
use crate::core::PlayerId;
use crate::core::Team;
use crate::core::TeamId;
use crate::core::query::newest_first;
use crate::core::query::oldest_first;
use crate::interfaces::ActivityLogStore;
use crate::interfaces::MeasurementStore;
use crate::interfaces::MembershipReader;
use crate::interfaces::RosterStore;
use crate::interfaces::StoreError;

// ============================================================================
// SECTION: State
// ============================================================================

/// Mutable roster tables.
#[derive(Debug, Default)]
struct RosterState {
    /// Team records by ID.
    teams: BTreeMap<TeamId, Team>,
    /// Known player profiles.
    players: BTreeSet<PlayerId>,
    /// Coach-to-team memberships.
    coach_teams: BTreeSet<(CoachId, TeamId)>,
    /// Player-to-team memberships.
    player_teams: BTreeSet<(PlayerId, TeamId)>,
    /// Exercise records by ID.
    exercises: BTreeMap<ExerciseId, Exercise>,
    /// Measurement records by ID.
    measurements: BTreeMap<MeasurementId, Measurement>,
    /// Append-only log in insertion order.
    logs: Vec<ActivityLogEntry>,
}

/// In-memory roster store.
///
/// # Invariants
/// - Log entry IDs are assigned sequentially from 1.
#[derive(Debug, Default)]
pub struct InMemoryRosterStore {
    /// Guarded roster tables.
    state: Mutex<RosterState>,
}

impl InMemoryRosterStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Locks the roster tables.
    fn state(&self) -> Result<MutexGuard<'_, RosterState>, StoreError> {
        self.state.lock().map_err(|_| StoreError::Io("in-memory store mutex poisoned".to_string()))
    }

    /// Inserts or replaces a team.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the store lock is poisoned.
    pub fn put_team(&self, team: Team) -> Result<(), StoreError> {
        self.state()?.teams.insert(team.id, team);
        Ok(())
    }

    /// Registers a player profile.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the store lock is poisoned.
    pub fn put_player(&self, player_id: PlayerId) -> Result<(), StoreError> {
        self.state()?.players.insert(player_id);
        Ok(())
    }

    /// Adds or removes a coach membership.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the store lock is poisoned.
    pub fn set_coach_membership(
        &self,
        coach_id: CoachId,
        team_id: TeamId,
        member: bool,
    ) -> Result<(), StoreError> {
        let mut state = self.state()?;
        if member {
            state.coach_teams.insert((coach_id, team_id));
        } else {
            state.coach_teams.remove(&(coach_id, team_id));
        }
        Ok(())
    }

    /// Adds or removes a player membership.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the store lock is poisoned.
    pub fn set_player_membership(
        &self,
        player_id: PlayerId,
        team_id: TeamId,
        member: bool,
    ) -> Result<(), StoreError> {
        let mut state = self.state()?;
        if member {
            state.player_teams.insert((player_id, team_id));
        } else {
            state.player_teams.remove(&(player_id, team_id));
        }
        Ok(())
    }

    /// Inserts or replaces an exercise.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the store lock is poisoned.
    pub fn put_exercise(&self, exercise: Exercise) -> Result<(), StoreError> {
        self.state()?.exercises.insert(exercise.id, exercise);
        Ok(())
    }

    /// Inserts or replaces a measurement.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the store lock is poisoned.
    pub fn put_measurement(&self, measurement: Measurement) -> Result<(), StoreError> {
        self.state()?.measurements.insert(measurement.id, measurement);
        Ok(())
    }

    /// Soft-deletes a measurement. Returns false when it does not exist.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the store lock is poisoned.
    pub fn deactivate_measurement(&self, measurement_id: MeasurementId) -> Result<bool, StoreError> {
        let mut state = self.state()?;
        Ok(state.measurements.get_mut(&measurement_id).is_some_and(|measurement| {
            measurement.is_active = false;
            true
        }))
    }
}

// ============================================================================
// SECTION: Interface Implementations
// ============================================================================

impl MembershipReader for InMemoryRosterStore {
    fn teams_for_coach(&self, coach_id: CoachId) -> Result<BTreeSet<TeamId>, StoreError> {
        let state = self.state()?;
        Ok(state
            .coach_teams
            .iter()
            .filter(|(coach, _)| *coach == coach_id)
            .map(|(_, team)| *team)
            .collect())
    }

    fn players_in_teams(&self, teams: &BTreeSet<TeamId>) -> Result<BTreeSet<PlayerId>, StoreError> {
        let state = self.state()?;
        Ok(state
            .player_teams
            .iter()
            .filter(|(_, team)| teams.contains(team))
            .map(|(player, _)| *player)
            .collect())
    }

    fn teams_for_player(&self, player_id: PlayerId) -> Result<BTreeSet<TeamId>, StoreError> {
        let state = self.state()?;
        Ok(state
            .player_teams
            .iter()
            .filter(|(player, _)| *player == player_id)
            .map(|(_, team)| *team)
            .collect())
    }

    fn team_exists(&self, team_id: TeamId) -> Result<bool, StoreError> {
        Ok(self.state()?.teams.contains_key(&team_id))
    }

    fn player_exists(&self, player_id: PlayerId) -> Result<bool, StoreError> {
        Ok(self.state()?.players.contains(&player_id))
    }
}

impl ActivityLogStore for InMemoryRosterStore {
    fn query_logs(&self, query: &LogQuery) -> Result<Vec<ActivityLogEntry>, StoreError> {
        let state = self.state()?;
        let mut matched: Vec<ActivityLogEntry> =
            state.logs.iter().filter(|entry| query.matches(entry)).cloned().collect();
        matched.sort_by(newest_first);
        Ok(match query.window {
            Some(page) => page.apply(matched),
            None => matched,
        })
    }

    fn append_log(&self, entry: NewActivityLog) -> Result<ActivityLogEntry, StoreError> {
        let mut state = self.state()?;
        let next = u64::try_from(state.logs.len())
            .ok()
            .and_then(|len| len.checked_add(1))
            .and_then(LogEntryId::from_raw)
            .ok_or_else(|| StoreError::Store("log entry id space exhausted".to_string()))?;
        let stored = ActivityLogEntry {
            id: next,
            action: entry.action,
            user_id: entry.user_id,
            target_player_id: entry.target_player_id,
            target_exercise_id: entry.target_exercise_id,
            target_team_id: entry.target_team_id,
            description: entry.description,
            created_at: entry.created_at,
        };
        state.logs.push(stored.clone());
        Ok(stored)
    }
}

impl MeasurementStore for InMemoryRosterStore {
    fn exercise(&self, exercise_id: ExerciseId) -> Result<Option<Exercise>, StoreError> {
        Ok(self.state()?.exercises.get(&exercise_id).cloned())
    }

    fn measurement(
        &self,
        measurement_id: MeasurementId,
    ) -> Result<Option<Measurement>, StoreError> {
        Ok(self.state()?.measurements.get(&measurement_id).cloned())
    }

    fn query_measurements(&self, query: &MeasurementQuery) -> Result<Vec<Measurement>, StoreError> {
        let state = self.state()?;
        let members: Option<BTreeSet<PlayerId>> = query.team_id.map(|team_id| {
            state
                .player_teams
                .iter()
                .filter(|(_, team)| *team == team_id)
                .map(|(player, _)| *player)
                .collect()
        });
        let mut matched: Vec<Measurement> = state
            .measurements
            .values()
            .filter(|measurement| query.matches_record(measurement))
            .filter(|measurement| {
                members.as_ref().is_none_or(|members| members.contains(&measurement.player_id))
            })
            .cloned()
            .collect();
        matched.sort_by(oldest_first);
        Ok(match query.window {
            Some(page) => page.apply(matched),
            None => matched,
        })
    }
}

impl RosterStore for InMemoryRosterStore {}
