// crates/squad-gate-core/src/core/query.rs
// ============================================================================
// Module: Squad Gate Declarative Queries
// Description: Filters, pagination, and store-level query predicates.
// Purpose: Describe reads declaratively so every store applies identical rules.
// Dependencies: serde
// ============================================================================

//! ## Overview
//! Caller-facing filters ([`LogFilter`], [`MeasurementFilter`]) are combined
//! with a resolved scope into store-level predicates ([`LogQuery`],
//! [`MeasurementQuery`]). Stores must honour the ordering contracts below:
//! - log queries return entries by `created_at` descending, ties by ID descending;
//! - measurement queries return records by `recorded_at` ascending, ties by ID ascending.
//!
//! An allow-list that is present but empty matches nothing.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::cmp::Ordering;
use std::collections::BTreeSet;

use serde::Deserialize;
use serde::Serialize;

use crate::core::identifiers::ExerciseId;
use crate::core::identifiers::PlayerId;
use crate::core::identifiers::TeamId;
use crate::core::identifiers::UserId;
use crate::core::model::ActionKind;
use crate::core::model::ActivityLogEntry;
use crate::core::model::Measurement;
use crate::core::time::TimeRange;
use crate::core::time::Timestamp;

// ============================================================================
// SECTION: Pagination
// ============================================================================

/// Offset/limit window over an ordered result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Page {
    /// Number of leading entries to skip.
    pub offset: usize,
    /// Maximum number of entries to return.
    pub limit: usize,
}

impl Page {
    /// Builds a page window.
    #[must_use]
    pub const fn new(offset: usize, limit: usize) -> Self {
        Self {
            offset,
            limit,
        }
    }

    /// Returns the exclusive end index of the window.
    #[must_use]
    pub const fn end(&self) -> usize {
        self.offset.saturating_add(self.limit)
    }

    /// Returns the window `[0, end)`; the prefix needed to cut this page later.
    #[must_use]
    pub const fn prefix(&self) -> Self {
        Self {
            offset: 0,
            limit: self.end(),
        }
    }

    /// Applies the window to an already ordered list.
    #[must_use]
    pub fn apply<T>(&self, items: Vec<T>) -> Vec<T> {
        items.into_iter().skip(self.offset).take(self.limit).collect()
    }
}

/// Caller-supplied pagination; absent fields take engine defaults.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageRequest {
    /// Requested offset (default 0).
    pub offset: Option<usize>,
    /// Requested limit (default from engine limits).
    pub limit: Option<usize>,
}

impl PageRequest {
    /// Builds an explicit request.
    #[must_use]
    pub const fn new(offset: usize, limit: usize) -> Self {
        Self {
            offset: Some(offset),
            limit: Some(limit),
        }
    }
}

// ============================================================================
// SECTION: Activity Log Queries
// ============================================================================

/// Caller-supplied activity log filters.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogFilter {
    /// Acting user.
    pub user_id: Option<UserId>,
    /// Target player.
    pub player_id: Option<PlayerId>,
    /// Target team.
    pub team_id: Option<TeamId>,
    /// Target exercise.
    pub exercise_id: Option<ExerciseId>,
    /// Action kind.
    pub action: Option<ActionKind>,
    /// Creation-time bounds.
    pub created: TimeRange,
}

/// Target allow-lists: an entry matches when its target player is in
/// `players` or its target team is in `teams`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TargetScope {
    /// Allowed target players.
    pub players: BTreeSet<PlayerId>,
    /// Allowed target teams.
    pub teams: BTreeSet<TeamId>,
}

impl TargetScope {
    /// Returns true when the entry targets an allowed player or team.
    #[must_use]
    pub fn matches(&self, entry: &ActivityLogEntry) -> bool {
        entry.target_player_id.is_some_and(|player| self.players.contains(&player))
            || entry.target_team_id.is_some_and(|team| self.teams.contains(&team))
    }

    /// Returns true when no entry can match.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.players.is_empty() && self.teams.is_empty()
    }
}

/// Store-level activity log predicate.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogQuery {
    /// Acting user equality.
    pub user_id: Option<UserId>,
    /// Target player equality.
    pub player_id: Option<PlayerId>,
    /// Target team equality.
    pub team_id: Option<TeamId>,
    /// Target exercise equality.
    pub exercise_id: Option<ExerciseId>,
    /// Action kind equality.
    pub action: Option<ActionKind>,
    /// Creation-time bounds.
    pub created: TimeRange,
    /// Optional target allow-lists.
    pub targets: Option<TargetScope>,
    /// Optional window applied after ordering.
    pub window: Option<Page>,
}

impl LogQuery {
    /// Returns true when the entry satisfies every predicate (window excluded).
    #[must_use]
    pub fn matches(&self, entry: &ActivityLogEntry) -> bool {
        self.user_id.is_none_or(|user| entry.user_id == user)
            && self.player_id.is_none_or(|player| entry.target_player_id == Some(player))
            && self.team_id.is_none_or(|team| entry.target_team_id == Some(team))
            && self.exercise_id.is_none_or(|exercise| entry.target_exercise_id == Some(exercise))
            && self.action.is_none_or(|action| entry.action == action)
            && self.created.contains(entry.created_at)
            && self.targets.as_ref().is_none_or(|targets| targets.matches(entry))
    }
}

/// Canonical log ordering: newest first, ties by entry ID descending.
#[must_use]
pub fn newest_first(left: &ActivityLogEntry, right: &ActivityLogEntry) -> Ordering {
    right.created_at.cmp(&left.created_at).then_with(|| right.id.cmp(&left.id))
}

// ============================================================================
// SECTION: Measurement Queries
// ============================================================================

/// Caller-supplied measurement listing filters.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MeasurementFilter {
    /// Measured player.
    pub player_id: Option<PlayerId>,
    /// Explicit player list (e.g. chart comparisons).
    pub player_ids: Option<Vec<PlayerId>>,
    /// Performed exercise.
    pub exercise_id: Option<ExerciseId>,
    /// Team whose current members are included.
    pub team_id: Option<TeamId>,
    /// Recorded-time bounds.
    pub recorded: TimeRange,
}

/// Store-level measurement predicate.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MeasurementQuery {
    /// Measured player equality.
    pub player_id: Option<PlayerId>,
    /// Player allow-list.
    pub players: Option<BTreeSet<PlayerId>>,
    /// Exercise equality.
    pub exercise_id: Option<ExerciseId>,
    /// Restrict to current members of the team.
    pub team_id: Option<TeamId>,
    /// Recorded-time bounds.
    pub recorded: TimeRange,
    /// Include soft-deleted measurements.
    pub include_inactive: bool,
    /// Optional window applied after ordering.
    pub window: Option<Page>,
}

impl MeasurementQuery {
    /// Returns true when the record satisfies every predicate except the team join.
    #[must_use]
    pub fn matches_record(&self, measurement: &Measurement) -> bool {
        (self.include_inactive || measurement.is_active)
            && self.player_id.is_none_or(|player| measurement.player_id == player)
            && self.players.as_ref().is_none_or(|players| players.contains(&measurement.player_id))
            && self.exercise_id.is_none_or(|exercise| measurement.exercise_id == exercise)
            && self.recorded.contains(measurement.recorded_at)
    }
}

/// Canonical measurement ordering: oldest first, ties by ID ascending.
#[must_use]
pub fn oldest_first(left: &Measurement, right: &Measurement) -> Ordering {
    left.recorded_at.cmp(&right.recorded_at).then_with(|| left.id.cmp(&right.id))
}

/// One raw metric value in a time-ordered series.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeriesPoint {
    /// Raw stored value.
    pub raw: String,
    /// When the value was recorded.
    pub recorded_at: Timestamp,
}
