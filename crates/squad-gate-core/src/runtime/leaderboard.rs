// crates/squad-gate-core/src/runtime/leaderboard.rs
// ============================================================================
// Module: Squad Gate Leaderboard
// Description: Per-player best values ranked by the exercise's primary metric.
// Purpose: Reduce scoped measurement streams into a ranked board.
// Dependencies: crate::core, crate::interfaces, serde
// ============================================================================

//! ## Overview
//! The primary metric is the first metric the exercise declares. Each
//! qualifying measurement contributes its primary value when present and
//! parsable; a running best per player is kept with the metric's direction.
//! Players without a single usable value are left off the board.
//!
//! # Invariants
//! - Equal bests keep the earliest record in recorded order.
//! - Players with equal bests are ordered by player ID ascending.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;

use serde::Deserialize;
use serde::Serialize;

use crate::core::ExerciseId;
use crate::core::Measurement;
use crate::core::MeasurementId;
use crate::core::MeasurementQuery;
use crate::core::MetricKind;
use crate::core::PlayerId;
use crate::core::Scope;
use crate::core::TeamId;
use crate::core::Timestamp;
use crate::interfaces::MeasurementStore;
use crate::runtime::error::AccessError;
use crate::runtime::stats::parse_metric_value;

// ============================================================================
// SECTION: Types
// ============================================================================

/// One ranked player.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LeaderboardEntry {
    /// Ranked player.
    pub player_id: PlayerId,
    /// Player's best primary-metric value.
    pub best_value: f64,
    /// When the best value was recorded.
    pub recorded_at: Timestamp,
    /// Measurement holding the best value.
    pub measurement_id: MeasurementId,
}

/// Ranked board for one exercise.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Leaderboard {
    /// Ranked exercise.
    pub exercise_id: ExerciseId,
    /// Primary metric, absent when the exercise declares none.
    pub metric: Option<MetricKind>,
    /// Entries best first.
    pub entries: Vec<LeaderboardEntry>,
}

// ============================================================================
// SECTION: Reduction
// ============================================================================

/// Ranks players by their best value for the primary metric.
///
/// `measurements` must be in recorded order for tie handling to hold.
#[must_use]
pub fn rank_leaderboard<'a, I>(primary: MetricKind, measurements: I) -> Vec<LeaderboardEntry>
where
    I: IntoIterator<Item = &'a Measurement>,
{
    let direction = primary.better_direction();
    let mut best: BTreeMap<PlayerId, LeaderboardEntry> = BTreeMap::new();
    for measurement in measurements {
        let Some(value) = measurement.value_for(primary).and_then(parse_metric_value) else {
            continue;
        };
        let candidate = LeaderboardEntry {
            player_id: measurement.player_id,
            best_value: value,
            recorded_at: measurement.recorded_at,
            measurement_id: measurement.id,
        };
        match best.get_mut(&measurement.player_id) {
            Some(incumbent) if direction.is_better(value, incumbent.best_value) => {
                *incumbent = candidate;
            }
            Some(_) => {}
            None => {
                best.insert(measurement.player_id, candidate);
            }
        }
    }
    // Map order is player ascending; the stable sort keeps it for ties.
    let mut ranked: Vec<LeaderboardEntry> = best.into_values().collect();
    ranked.sort_by(|left, right| direction.best_first(left.best_value, right.best_value));
    ranked
}

// ============================================================================
// SECTION: Scoped Operation
// ============================================================================

/// Builds the leaderboard for an exercise within a scope.
///
/// An explicit team is expected to have passed scope resolution; coach
/// scopes are re-checked here.
///
/// # Errors
///
/// Returns [`AccessError::NotFound`] when the exercise does not exist,
/// [`AccessError::Forbidden`] when a coach names a team outside scope, and
/// [`AccessError::Store`] on store failure.
pub fn compute_leaderboard<S>(
    store: &S,
    scope: &Scope,
    exercise_id: ExerciseId,
    team_id: Option<TeamId>,
) -> Result<Leaderboard, AccessError>
where
    S: MeasurementStore + ?Sized,
{
    let exercise = store
        .exercise(exercise_id)?
        .ok_or_else(|| AccessError::NotFound(format!("exercise {exercise_id}")))?;
    let metric = exercise.primary_metric();
    let mut board = Leaderboard {
        exercise_id,
        metric,
        entries: Vec::new(),
    };
    let Some(primary) = metric else {
        return Ok(board);
    };
    if let (Scope::ScopedTo(_), Some(team)) = (scope, team_id)
        && !scope.permits_team(team)
    {
        return Err(AccessError::Forbidden(format!("team {team} is outside scope")));
    }
    if scope.is_empty() {
        return Ok(board);
    }
    let query = MeasurementQuery {
        exercise_id: Some(exercise_id),
        team_id,
        players: scope.player_allow_list(),
        ..MeasurementQuery::default()
    };
    let measurements = store.query_measurements(&query)?;
    board.entries = rank_leaderboard(primary, &measurements);
    Ok(board)
}
