// crates/squad-gate-core/src/runtime/measurements.rs
// ============================================================================
// Module: Squad Gate Measurement Access
// Description: Scoped measurement listing and measurement input checks.
// Purpose: Apply the same scope rules to raw measurement reads and writes.
// Dependencies: crate::core, crate::interfaces
// ============================================================================

//! ## Overview
//! Listing narrows to the caller's scope; an explicit player list entry
//! outside the scope is `Forbidden`, and an explicit empty list yields an
//! empty result. Admins and coaches get `NotFound` for a listed player that
//! does not exist. The helpers at the bottom validate caller input before it
//! reaches a write path.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeSet;

use crate::core::Exercise;
use crate::core::Measurement;
use crate::core::MeasurementFilter;
use crate::core::MeasurementQuery;
use crate::core::MetricKind;
use crate::core::MetricValue;
use crate::core::Page;
use crate::core::PlayerId;
use crate::core::Scope;
use crate::interfaces::MeasurementStore;
use crate::interfaces::MembershipReader;
use crate::runtime::error::AccessError;

// ============================================================================
// SECTION: Listing
// ============================================================================

/// Lists active measurements visible to the scope, oldest first.
///
/// # Errors
///
/// Returns [`AccessError::NotFound`] when an admin or coach lists a player
/// that does not exist, [`AccessError::Forbidden`] for explicit players or a
/// coach team outside scope, [`AccessError::Validation`] for an inverted range, and
/// [`AccessError::Store`] on store failure.
pub fn list_measurements<S>(
    store: &S,
    scope: &Scope,
    filter: &MeasurementFilter,
    page: Page,
) -> Result<Vec<Measurement>, AccessError>
where
    S: MembershipReader + MeasurementStore + ?Sized,
{
    filter.recorded.validate()?;
    let explicit: Option<BTreeSet<PlayerId>> =
        filter.player_ids.as_ref().map(|ids| ids.iter().copied().collect());
    if !matches!(scope, Scope::SelfOnly(_)) {
        for player_id in explicit.iter().flatten() {
            if !store.player_exists(*player_id)? {
                return Err(AccessError::NotFound(format!("player {player_id}")));
            }
        }
    }
    for player_id in filter.player_id.iter().chain(explicit.iter().flatten()) {
        if !scope.permits_player(*player_id) {
            return Err(AccessError::Forbidden(format!("player {player_id} is outside scope")));
        }
    }
    if let (Scope::ScopedTo(_), Some(team)) = (scope, filter.team_id)
        && !scope.permits_team(team)
    {
        return Err(AccessError::Forbidden(format!("team {team} is outside scope")));
    }
    if scope.is_empty() || explicit.as_ref().is_some_and(BTreeSet::is_empty) || page.limit == 0 {
        return Ok(Vec::new());
    }
    // Every explicit player is already inside the scope, so the explicit
    // list is the narrower allow-list when both are present.
    let players = explicit.or_else(|| scope.player_allow_list());
    let query = MeasurementQuery {
        player_id: filter.player_id,
        players,
        exercise_id: filter.exercise_id,
        team_id: filter.team_id,
        recorded: filter.recorded,
        include_inactive: false,
        window: Some(page),
    };
    Ok(store.query_measurements(&query)?)
}

// ============================================================================
// SECTION: Input Checks
// ============================================================================

/// Parses a comma-separated player ID list such as `"1, 2,3"`.
///
/// Blank input yields an empty list. Duplicates are dropped, first occurrence wins.
///
/// # Errors
///
/// Returns [`AccessError::Validation`] when any segment is empty, non-numeric, or zero.
pub fn parse_player_ids(raw: &str) -> Result<Vec<PlayerId>, AccessError> {
    if raw.trim().is_empty() {
        return Ok(Vec::new());
    }
    let mut seen = BTreeSet::new();
    let mut ids = Vec::new();
    for segment in raw.split(',') {
        let segment = segment.trim();
        let id = segment
            .parse::<u64>()
            .ok()
            .and_then(PlayerId::from_raw)
            .ok_or_else(|| AccessError::Validation(format!("invalid player id: {segment:?}")))?;
        if seen.insert(id) {
            ids.push(id);
        }
    }
    Ok(ids)
}

/// Checks recorded values against an exercise's metric declarations.
///
/// # Errors
///
/// Returns [`AccessError::NotFound`] when the exercise is soft-deleted and
/// [`AccessError::Validation`] for duplicate kinds, undeclared kinds, or a
/// missing required kind.
pub fn validate_measurement_values(
    exercise: &Exercise,
    values: &[MetricValue],
) -> Result<(), AccessError> {
    if !exercise.is_active {
        return Err(AccessError::NotFound(format!("exercise {}", exercise.id)));
    }
    let mut provided: BTreeSet<MetricKind> = BTreeSet::new();
    for value in values {
        if !exercise.declares(value.kind) {
            return Err(AccessError::Validation(format!(
                "metric {} is not declared by exercise {}",
                value.kind, exercise.id
            )));
        }
        if !provided.insert(value.kind) {
            return Err(AccessError::Validation(format!("metric {} given twice", value.kind)));
        }
    }
    if let Some(missing) =
        exercise.metrics.iter().find(|declared| declared.required && !provided.contains(&declared.kind))
    {
        return Err(AccessError::Validation(format!("required metric {} is missing", missing.kind)));
    }
    Ok(())
}
