// crates/squad-gate-core/src/runtime/activity.rs
// ============================================================================
// Module: Squad Gate Activity Log Engine
// Description: Scoped activity log queries with merge-by-ID pagination.
// Purpose: Return deduplicated, newest-first log pages for any scope.
// Dependencies: crate::core, crate::interfaces
// ============================================================================

//! ## Overview
//! Admins query the store directly. Coaches and players issue two scoped
//! sub-queries and merge them:
//! - entries targeting an allowed player or team, intersected with every
//!   caller filter;
//! - entries the caller authored, intersected with the exercise, action, and
//!   date filters only.
//!
//! Each sub-query fetches the prefix `[0, offset + limit)`. The top
//! `offset + limit` entries of the union are always contained in the union of
//! the two prefixes, so paginating the merged list afterwards is exact.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::collections::BTreeSet;

use crate::core::ActivityLogEntry;
use crate::core::LogEntryId;
use crate::core::LogFilter;
use crate::core::LogQuery;
use crate::core::Page;
use crate::core::Scope;
use crate::core::TargetScope;
use crate::core::UserId;
use crate::core::query::newest_first;
use crate::interfaces::ActivityLogStore;
use crate::runtime::error::AccessError;

// ============================================================================
// SECTION: Merge
// ============================================================================

/// Unions two entry lists by ID, orders them newest first, then applies the page.
///
/// An entry present in both inputs appears once.
#[must_use]
pub fn merge_by_id(
    left: Vec<ActivityLogEntry>,
    right: Vec<ActivityLogEntry>,
    page: Page,
) -> Vec<ActivityLogEntry> {
    let mut unique: BTreeMap<LogEntryId, ActivityLogEntry> = BTreeMap::new();
    for entry in left.into_iter().chain(right) {
        unique.entry(entry.id).or_insert(entry);
    }
    let mut merged: Vec<ActivityLogEntry> = unique.into_values().collect();
    merged.sort_by(newest_first);
    page.apply(merged)
}

// ============================================================================
// SECTION: Query
// ============================================================================

/// Runs a scoped activity log query.
///
/// Explicit player and team filters are expected to have been checked by
/// scope resolution already.
///
/// # Errors
///
/// Returns [`AccessError::Validation`] for an inverted creation range and
/// [`AccessError::Store`] when the store fails.
pub fn query_activity_logs<S>(
    store: &S,
    scope: &Scope,
    filter: &LogFilter,
    page: Page,
) -> Result<Vec<ActivityLogEntry>, AccessError>
where
    S: ActivityLogStore + ?Sized,
{
    filter.created.validate()?;
    match scope {
        Scope::Unrestricted => {
            let mut query = filtered_query(filter);
            query.window = Some(page);
            Ok(store.query_logs(&query)?)
        }
        Scope::ScopedTo(sets) => {
            if scope.is_empty() {
                return Ok(Vec::new());
            }
            let targets = TargetScope {
                players: sets.players.clone(),
                teams: sets.teams.clone(),
            };
            merged_query(store, filter, targets, sets.user_id, page)
        }
        Scope::SelfOnly(own) => {
            let targets = TargetScope {
                players: BTreeSet::from([own.player_id]),
                teams: BTreeSet::new(),
            };
            merged_query(store, filter, targets, own.user_id, page)
        }
    }
}

/// Executes the in-scope and own-actions sub-queries and merges them.
fn merged_query<S>(
    store: &S,
    filter: &LogFilter,
    targets: TargetScope,
    author: UserId,
    page: Page,
) -> Result<Vec<ActivityLogEntry>, AccessError>
where
    S: ActivityLogStore + ?Sized,
{
    if page.limit == 0 {
        return Ok(Vec::new());
    }
    let window = Some(page.prefix());

    let mut in_scope = filtered_query(filter);
    in_scope.targets = Some(targets);
    in_scope.window = window;
    let targeted = store.query_logs(&in_scope)?;

    let authored = if filter.user_id.is_none_or(|user| user == author) {
        let own_actions = LogQuery {
            user_id: Some(author),
            exercise_id: filter.exercise_id,
            action: filter.action,
            created: filter.created,
            window,
            ..LogQuery::default()
        };
        store.query_logs(&own_actions)?
    } else {
        Vec::new()
    };

    Ok(merge_by_id(targeted, authored, page))
}

/// Translates caller filters into a store predicate without scope or window.
fn filtered_query(filter: &LogFilter) -> LogQuery {
    LogQuery {
        user_id: filter.user_id,
        player_id: filter.player_id,
        team_id: filter.team_id,
        exercise_id: filter.exercise_id,
        action: filter.action,
        created: filter.created,
        targets: None,
        window: None,
    }
}
