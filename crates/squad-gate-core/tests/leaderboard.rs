// crates/squad-gate-core/tests/leaderboard.rs
// ============================================================================
// Module: Leaderboard Tests
// Description: Per-player best reduction and scoped leaderboard reads.
// Purpose: Validate direction-aware ranking, exclusion, and tie handling.
// Dependencies: squad-gate-core
// ============================================================================

//! ## Overview
//! Ranking cases use `rank_leaderboard` directly; scoped cases go through
//! `compute_leaderboard` with resolved scopes.

#![allow(
    clippy::panic,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::use_debug,
    clippy::float_cmp,
    reason = "Test-only assertions and helpers are permitted."
)]

mod helpers;

use helpers::admin;
use helpers::coach;
use helpers::eid;
use helpers::exercise;
use helpers::measurement;
use helpers::mid;
use helpers::other_player;
use helpers::pid;
use helpers::roster;
use helpers::teamless_coach;
use helpers::tid;
use helpers::ts;
use squad_gate_core::AccessError;
use squad_gate_core::InMemoryRosterStore;
use squad_gate_core::MetricKind;
use squad_gate_core::ScopeRequest;
use squad_gate_core::runtime::compute_leaderboard;
use squad_gate_core::runtime::rank_leaderboard;
use squad_gate_core::runtime::resolve_scope;

// ============================================================================
// SECTION: Ranking
// ============================================================================

#[test]
fn lower_is_better_ranks_ascending() {
    let rows = [
        measurement(1, 1, 1, 100, &[(MetricKind::Seconds, "12.1")]),
        measurement(2, 2, 1, 100, &[(MetricKind::Seconds, "11.4")]),
        measurement(3, 1, 1, 200, &[(MetricKind::Seconds, "10.9")]),
        measurement(4, 3, 1, 100, &[(MetricKind::Seconds, "13.0")]),
    ];
    let board = rank_leaderboard(MetricKind::Seconds, &rows);
    let order: Vec<(u64, f64)> = board.iter().map(|e| (e.player_id.get(), e.best_value)).collect();
    assert_eq!(order, vec![(1, 10.9), (2, 11.4), (3, 13.0)]);
    assert_eq!(board[0].measurement_id, mid(3));
    assert_eq!(board[0].recorded_at, ts(200));
}

#[test]
fn higher_is_better_ranks_descending() {
    let rows = [
        measurement(1, 1, 1, 100, &[(MetricKind::Repetitions, "20")]),
        measurement(2, 2, 1, 100, &[(MetricKind::Repetitions, "25")]),
        measurement(3, 1, 1, 200, &[(MetricKind::Repetitions, "18")]),
    ];
    let board = rank_leaderboard(MetricKind::Repetitions, &rows);
    let order: Vec<u64> = board.iter().map(|e| e.player_id.get()).collect();
    assert_eq!(order, vec![2, 1]);
    assert_eq!(board[1].best_value, 20.0);
}

#[test]
fn players_without_usable_values_are_excluded() {
    let rows = [
        measurement(1, 1, 1, 100, &[(MetricKind::Kilograms, "heavy")]),
        measurement(2, 1, 1, 200, &[(MetricKind::Kilograms, "")]),
        measurement(3, 2, 1, 100, &[(MetricKind::Kilograms, "60")]),
        measurement(4, 3, 1, 100, &[(MetricKind::Meters, "5")]),
    ];
    let board = rank_leaderboard(MetricKind::Kilograms, &rows);
    let players: Vec<u64> = board.iter().map(|e| e.player_id.get()).collect();
    assert_eq!(players, vec![2]);
}

#[test]
fn ties_keep_earliest_record_and_order_by_player() {
    let rows = [
        measurement(1, 3, 1, 100, &[(MetricKind::Meters, "7")]),
        measurement(2, 3, 1, 200, &[(MetricKind::Meters, "7")]),
        measurement(3, 1, 1, 150, &[(MetricKind::Meters, "7")]),
    ];
    let board = rank_leaderboard(MetricKind::Meters, &rows);
    let players: Vec<u64> = board.iter().map(|e| e.player_id.get()).collect();
    assert_eq!(players, vec![1, 3]);
    assert_eq!(board[1].measurement_id, mid(1));
}

// ============================================================================
// SECTION: Scoped Leaderboards
// ============================================================================

fn lift_roster() -> InMemoryRosterStore {
    let store = roster();
    store.put_exercise(exercise(1, &[MetricKind::Kilograms, MetricKind::Repetitions])).unwrap();
    store.put_measurement(measurement(1, 1, 1, 100, &[(MetricKind::Kilograms, "90")])).unwrap();
    store.put_measurement(measurement(2, 2, 1, 100, &[(MetricKind::Kilograms, "120")])).unwrap();
    store
}

#[test]
fn admin_board_covers_everyone_by_primary_metric() {
    let store = lift_roster();
    let scope = resolve_scope(&store, &admin(), ScopeRequest::NONE).unwrap();
    let board = compute_leaderboard(&store, &scope, eid(1), None).unwrap();
    assert_eq!(board.metric, Some(MetricKind::Kilograms));
    let players: Vec<u64> = board.entries.iter().map(|e| e.player_id.get()).collect();
    assert_eq!(players, vec![2, 1]);
}

#[test]
fn team_filter_narrows_to_current_members() {
    let store = lift_roster();
    let scope = resolve_scope(&store, &admin(), ScopeRequest::team(tid(1))).unwrap();
    let board = compute_leaderboard(&store, &scope, eid(1), Some(tid(1))).unwrap();
    let players: Vec<u64> = board.entries.iter().map(|e| e.player_id.get()).collect();
    assert_eq!(players, vec![1]);
}

#[test]
fn coach_and_player_boards_are_scoped() {
    let store = lift_roster();
    let scope = resolve_scope(&store, &coach(), ScopeRequest::NONE).unwrap();
    let board = compute_leaderboard(&store, &scope, eid(1), None).unwrap();
    assert_eq!(board.entries.len(), 1);
    assert_eq!(board.entries[0].player_id, pid(1));

    let scope = resolve_scope(&store, &other_player(), ScopeRequest::NONE).unwrap();
    let board = compute_leaderboard(&store, &scope, eid(1), None).unwrap();
    assert_eq!(board.entries.len(), 1);
    assert_eq!(board.entries[0].player_id, pid(2));
}

#[test]
fn teamless_coach_gets_empty_board() {
    let store = lift_roster();
    let scope = resolve_scope(&store, &teamless_coach(), ScopeRequest::NONE).unwrap();
    let board = compute_leaderboard(&store, &scope, eid(1), None).unwrap();
    assert!(board.entries.is_empty());
}

#[test]
fn missing_exercise_is_not_found_and_metricless_is_empty() {
    let store = lift_roster();
    let scope = resolve_scope(&store, &admin(), ScopeRequest::NONE).unwrap();
    let err = compute_leaderboard(&store, &scope, eid(9), None).unwrap_err();
    assert!(matches!(err, AccessError::NotFound(_)), "{err:?}");

    store.put_exercise(exercise(2, &[])).unwrap();
    let board = compute_leaderboard(&store, &scope, eid(2), None).unwrap();
    assert_eq!(board.metric, None);
    assert!(board.entries.is_empty());
}

#[test]
fn soft_deleted_exercise_still_ranks() {
    let store = lift_roster();
    let mut retired = exercise(1, &[MetricKind::Kilograms]);
    retired.is_active = false;
    store.put_exercise(retired).unwrap();
    let scope = resolve_scope(&store, &admin(), ScopeRequest::NONE).unwrap();
    let board = compute_leaderboard(&store, &scope, eid(1), None).unwrap();
    assert_eq!(board.entries.len(), 2);
}
