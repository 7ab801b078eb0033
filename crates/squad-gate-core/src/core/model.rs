// crates/squad-gate-core/src/core/model.rs
// ============================================================================
// Module: Squad Gate Record Model
// Description: Actors, roster records, measurements, and activity log entries.
// Purpose: Define the read model the access engine evaluates against.
// Dependencies: serde
// ============================================================================

//! ## Overview
//! These records mirror the externally owned relational tables the engine
//! reads. They carry only the attributes the engine consumes. Validation of
//! record contents (metric coverage, foreign keys) is the writer's concern;
//! the engine assumes stored data is already valid.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;
use std::str::FromStr;

use serde::Deserialize;
use serde::Serialize;

use crate::core::identifiers::CoachId;
use crate::core::identifiers::ExerciseId;
use crate::core::identifiers::LogEntryId;
use crate::core::identifiers::MeasurementId;
use crate::core::identifiers::PlayerId;
use crate::core::identifiers::TeamId;
use crate::core::identifiers::UserId;
use crate::core::metric::MetricKind;
use crate::core::time::Timestamp;

// ============================================================================
// SECTION: Actors
// ============================================================================

/// Account role. Fixed for the lifetime of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Unrestricted administrator.
    Admin,
    /// Coach scoped to the teams they belong to.
    Coach,
    /// Player scoped to their own profile.
    Player,
}

impl Role {
    /// Returns the stable wire label.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Admin => "admin",
            Self::Coach => "coach",
            Self::Player => "player",
        }
    }
}

/// Profile record linked to an account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "role", content = "profile_id", rename_all = "snake_case")]
pub enum ActorProfile {
    /// Admin accounts carry no profile.
    Admin,
    /// Coach account linked to exactly one coach profile.
    Coach(CoachId),
    /// Player account linked to exactly one player profile.
    Player(PlayerId),
}

/// Authenticated caller.
///
/// # Invariants
/// - Coach and player actors always link exactly one profile record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Actor {
    /// Account identifier.
    pub user_id: UserId,
    /// Linked profile, which also fixes the role.
    pub profile: ActorProfile,
}

impl Actor {
    /// Builds an admin actor.
    #[must_use]
    pub const fn admin(user_id: UserId) -> Self {
        Self {
            user_id,
            profile: ActorProfile::Admin,
        }
    }

    /// Builds a coach actor.
    #[must_use]
    pub const fn coach(user_id: UserId, coach_id: CoachId) -> Self {
        Self {
            user_id,
            profile: ActorProfile::Coach(coach_id),
        }
    }

    /// Builds a player actor.
    #[must_use]
    pub const fn player(user_id: UserId, player_id: PlayerId) -> Self {
        Self {
            user_id,
            profile: ActorProfile::Player(player_id),
        }
    }

    /// Returns the actor role.
    #[must_use]
    pub const fn role(&self) -> Role {
        match self.profile {
            ActorProfile::Admin => Role::Admin,
            ActorProfile::Coach(_) => Role::Coach,
            ActorProfile::Player(_) => Role::Player,
        }
    }
}

// ============================================================================
// SECTION: Roster
// ============================================================================

/// Team record. Memberships live in separate join tables.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Team {
    /// Team identifier.
    pub id: TeamId,
    /// Display name.
    pub name: String,
    /// Season label (e.g. `2024/25`).
    pub season: String,
    /// Soft-delete flag.
    pub is_active: bool,
}

// ============================================================================
// SECTION: Exercises and Measurements
// ============================================================================

/// Metric declaration on an exercise.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExerciseMetric {
    /// Declared metric kind.
    pub kind: MetricKind,
    /// Whether every measurement must carry a value for this kind.
    pub required: bool,
}

/// Exercise owned by a coach.
///
/// # Invariants
/// - `metrics` preserves declaration order; the first entry is the primary metric.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Exercise {
    /// Exercise identifier.
    pub id: ExerciseId,
    /// Owning coach.
    pub owner_coach_id: CoachId,
    /// Display name.
    pub name: String,
    /// Declared metrics in declaration order.
    pub metrics: Vec<ExerciseMetric>,
    /// Soft-delete flag. Inactive exercises stay queryable for history.
    pub is_active: bool,
}

impl Exercise {
    /// Returns the primary metric (first declared), if any.
    #[must_use]
    pub fn primary_metric(&self) -> Option<MetricKind> {
        self.metrics.first().map(|metric| metric.kind)
    }

    /// Returns true when the exercise declares the metric kind.
    #[must_use]
    pub fn declares(&self, kind: MetricKind) -> bool {
        self.metrics.iter().any(|metric| metric.kind == kind)
    }
}

/// Raw recorded value for one metric kind.
///
/// Values are stored as text; they are parsed only when aggregated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetricValue {
    /// Metric kind.
    pub kind: MetricKind,
    /// Raw value as stored.
    pub raw: String,
}

impl MetricValue {
    /// Builds a metric value.
    #[must_use]
    pub fn new(kind: MetricKind, raw: impl Into<String>) -> Self {
        Self {
            kind,
            raw: raw.into(),
        }
    }
}

/// Measurement of one player performing one exercise at one instant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Measurement {
    /// Measurement identifier.
    pub id: MeasurementId,
    /// Measured player.
    pub player_id: PlayerId,
    /// Performed exercise.
    pub exercise_id: ExerciseId,
    /// When the performance happened.
    pub recorded_at: Timestamp,
    /// Recorded values, at most one per metric kind.
    pub values: Vec<MetricValue>,
    /// Account that entered the measurement.
    pub created_by: UserId,
    /// Free-text notes.
    pub notes: Option<String>,
    /// Soft-delete flag.
    pub is_active: bool,
}

impl Measurement {
    /// Returns the raw value recorded for the metric kind.
    #[must_use]
    pub fn value_for(&self, kind: MetricKind) -> Option<&str> {
        self.values.iter().find(|value| value.kind == kind).map(|value| value.raw.as_str())
    }
}

// ============================================================================
// SECTION: Activity Log
// ============================================================================

/// Kind of mutating action recorded in the activity log.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionKind {
    /// Player recorded their own measurement.
    PlayerEntry,
    /// Coach added a measurement for a player.
    CoachAddMeasurement,
    /// Coach edited a measurement.
    CoachEditMeasurement,
    /// Coach created a player.
    CoachCreatePlayer,
    /// Coach deactivated a player.
    CoachDeactivatePlayer,
    /// Coach edited an exercise.
    CoachEditExercise,
    /// Any administrative action.
    AdminAction,
}

impl ActionKind {
    /// All action kinds.
    pub const ALL: [Self; 7] = [
        Self::PlayerEntry,
        Self::CoachAddMeasurement,
        Self::CoachEditMeasurement,
        Self::CoachCreatePlayer,
        Self::CoachDeactivatePlayer,
        Self::CoachEditExercise,
        Self::AdminAction,
    ];

    /// Returns the stable wire label.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::PlayerEntry => "player_entry",
            Self::CoachAddMeasurement => "coach_add_measurement",
            Self::CoachEditMeasurement => "coach_edit_measurement",
            Self::CoachCreatePlayer => "coach_create_player",
            Self::CoachDeactivatePlayer => "coach_deactivate_player",
            Self::CoachEditExercise => "coach_edit_exercise",
            Self::AdminAction => "admin_action",
        }
    }
}

impl fmt::Display for ActionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ActionKind {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str() == value)
            .ok_or_else(|| format!("unknown action kind: {value}"))
    }
}

/// Immutable audit trail entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActivityLogEntry {
    /// Entry identifier.
    pub id: LogEntryId,
    /// Action kind.
    pub action: ActionKind,
    /// Account that performed the action.
    pub user_id: UserId,
    /// Targeted player, if any.
    pub target_player_id: Option<PlayerId>,
    /// Targeted exercise, if any.
    pub target_exercise_id: Option<ExerciseId>,
    /// Targeted team, if any.
    pub target_team_id: Option<TeamId>,
    /// Free-text description.
    pub description: String,
    /// Creation instant.
    pub created_at: Timestamp,
}

/// Activity log entry prior to persistence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewActivityLog {
    /// Action kind.
    pub action: ActionKind,
    /// Account that performed the action.
    pub user_id: UserId,
    /// Targeted player, if any.
    pub target_player_id: Option<PlayerId>,
    /// Targeted exercise, if any.
    pub target_exercise_id: Option<ExerciseId>,
    /// Targeted team, if any.
    pub target_team_id: Option<TeamId>,
    /// Free-text description.
    pub description: String,
    /// Creation instant supplied by the caller.
    pub created_at: Timestamp,
}
