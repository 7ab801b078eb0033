// crates/squad-gate-store-sqlite/tests/sqlite_store_unit.rs
// ============================================================================
// Module: SQLite Roster Store Unit Tests
// Description: Path safety, schema versioning, and predicate parity tests.
// Purpose: Validate that SQLite reads match the engine's ordering and scope rules.
// ============================================================================

//! ## Overview
//! Unit-level tests for the `SQLite` roster store:
//! - Path safety checks (length/component/directory rejection)
//! - Schema version validation on reopen
//! - Membership, log, and measurement predicates rendered to SQL
//! - Engine scenarios run end to end over the durable store
//! - Corrupt rows fail closed

#![allow(
    clippy::panic,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::use_debug,
    reason = "Test-only assertions and helpers are permitted."
)]

use std::collections::BTreeSet;
use std::path::Path;
use std::path::PathBuf;
use std::sync::Arc;

use rusqlite::Connection;
use rusqlite::params;
use squad_gate_core::AccessEngine;
use squad_gate_core::AccessError;
use squad_gate_core::ActionKind;
use squad_gate_core::ActivityLogEntry;
use squad_gate_core::ActivityLogStore;
use squad_gate_core::Actor;
use squad_gate_core::CoachId;
use squad_gate_core::EngineLimits;
use squad_gate_core::Exercise;
use squad_gate_core::ExerciseId;
use squad_gate_core::ExerciseMetric;
use squad_gate_core::LogFilter;
use squad_gate_core::LogQuery;
use squad_gate_core::Measurement;
use squad_gate_core::MeasurementFilter;
use squad_gate_core::MeasurementId;
use squad_gate_core::MeasurementQuery;
use squad_gate_core::MeasurementStore;
use squad_gate_core::MembershipReader;
use squad_gate_core::MetricKind;
use squad_gate_core::MetricValue;
use squad_gate_core::NewActivityLog;
use squad_gate_core::NoopAuditSink;
use squad_gate_core::Page;
use squad_gate_core::PageRequest;
use squad_gate_core::PlayerId;
use squad_gate_core::RosterStore;
use squad_gate_core::StoreError;
use squad_gate_core::TargetScope;
use squad_gate_core::Team;
use squad_gate_core::TeamId;
use squad_gate_core::TimeRange;
use squad_gate_core::Timestamp;
use squad_gate_core::UserId;
use squad_gate_store_sqlite::SqliteRosterStore;
use squad_gate_store_sqlite::SqliteStoreConfig;
use squad_gate_store_sqlite::SqliteStoreError;
use squad_gate_store_sqlite::SqliteStoreMode;
use squad_gate_store_sqlite::SqliteSyncMode;
use tempfile::TempDir;

// ============================================================================
// SECTION: Helpers
// ============================================================================

fn uid(raw: u64) -> UserId {
    UserId::from_raw(raw).expect("nonzero user id")
}

fn pid(raw: u64) -> PlayerId {
    PlayerId::from_raw(raw).expect("nonzero player id")
}

fn cid(raw: u64) -> CoachId {
    CoachId::from_raw(raw).expect("nonzero coach id")
}

fn tid(raw: u64) -> TeamId {
    TeamId::from_raw(raw).expect("nonzero team id")
}

fn eid(raw: u64) -> ExerciseId {
    ExerciseId::from_raw(raw).expect("nonzero exercise id")
}

fn mid(raw: u64) -> MeasurementId {
    MeasurementId::from_raw(raw).expect("nonzero measurement id")
}

fn config_for_path(path: PathBuf) -> SqliteStoreConfig {
    SqliteStoreConfig {
        path,
        busy_timeout_ms: 1_000,
        journal_mode: SqliteStoreMode::Wal,
        sync_mode: SqliteSyncMode::Full,
    }
}

fn store_for(path: &Path) -> SqliteRosterStore {
    SqliteRosterStore::new(&config_for_path(path.to_path_buf())).expect("store init")
}

/// Seeds team 1 {coach 1, player 1} and team 2 {coach 2, player 2}, plus a
/// teamless coach 3.
fn seed_roster(store: &SqliteRosterStore) {
    for (team, name) in [(1, "Senior A"), (2, "Youth B")] {
        store
            .upsert_team(&Team {
                id: tid(team),
                name: name.to_string(),
                season: "2024/25".to_string(),
                is_active: true,
            })
            .unwrap();
    }
    store.insert_player(pid(1), Some(uid(20)), "Ada").unwrap();
    store.insert_player(pid(2), Some(uid(21)), "Ben").unwrap();
    store.insert_coach(cid(1), Some(uid(10)), "Coach One").unwrap();
    store.insert_coach(cid(2), Some(uid(11)), "Coach Two").unwrap();
    store.insert_coach(cid(3), Some(uid(12)), "Coach Three").unwrap();
    store.set_coach_membership(cid(1), tid(1), true).unwrap();
    store.set_coach_membership(cid(2), tid(2), true).unwrap();
    store.set_player_membership(pid(1), tid(1), true).unwrap();
    store.set_player_membership(pid(2), tid(2), true).unwrap();
}

fn exercise(id: u64, metrics: &[MetricKind]) -> Exercise {
    Exercise {
        id: eid(id),
        owner_coach_id: cid(1),
        name: format!("exercise-{id}"),
        metrics: metrics
            .iter()
            .map(|kind| ExerciseMetric {
                kind: *kind,
                required: true,
            })
            .collect(),
        is_active: true,
    }
}

fn measurement(
    id: u64,
    player: u64,
    exercise: u64,
    recorded_at: i64,
    values: &[(MetricKind, &str)],
) -> Measurement {
    Measurement {
        id: mid(id),
        player_id: pid(player),
        exercise_id: eid(exercise),
        recorded_at: Timestamp::from_unix_millis(recorded_at),
        values: values.iter().map(|(kind, raw)| MetricValue::new(*kind, *raw)).collect(),
        created_by: uid(10),
        notes: None,
        is_active: true,
    }
}

fn log(
    store: &SqliteRosterStore,
    author: u64,
    action: ActionKind,
    player: Option<u64>,
    team: Option<u64>,
    created_at: i64,
) -> ActivityLogEntry {
    store
        .append_log(NewActivityLog {
            action,
            user_id: uid(author),
            target_player_id: player.map(pid),
            target_exercise_id: None,
            target_team_id: team.map(tid),
            description: format!("{action} at {created_at}"),
            created_at: Timestamp::from_unix_millis(created_at),
        })
        .unwrap()
}

/// Seeds the five-entry log scenario used by the engine tests.
fn seed_five_entries(store: &SqliteRosterStore) {
    log(store, 1, ActionKind::AdminAction, Some(1), None, 100);
    log(store, 1, ActionKind::AdminAction, Some(1), None, 200);
    log(store, 1, ActionKind::AdminAction, Some(2), None, 300);
    log(store, 10, ActionKind::CoachEditExercise, None, None, 400);
    log(store, 11, ActionKind::CoachAddMeasurement, Some(1), None, 500);
}

fn engine(store: SqliteRosterStore) -> AccessEngine<SqliteRosterStore> {
    AccessEngine::new(store, Arc::new(NoopAuditSink), EngineLimits::default())
}

fn ids(entries: &[ActivityLogEntry]) -> Vec<u64> {
    entries.iter().map(|entry| entry.id.get()).collect()
}

fn measurement_ids(measurements: &[Measurement]) -> Vec<u64> {
    measurements.iter().map(|measurement| measurement.id.get()).collect()
}

// ============================================================================
// SECTION: Path Validation
// ============================================================================

#[test]
fn sqlite_store_rejects_directory_path() {
    let temp = TempDir::new().unwrap();
    let Err(err) = SqliteRosterStore::new(&config_for_path(temp.path().to_path_buf())) else {
        panic!("expected invalid directory path to fail");
    };
    assert!(matches!(err, SqliteStoreError::Invalid(_)));
}

#[test]
fn sqlite_store_rejects_empty_path() {
    let Err(err) = SqliteRosterStore::new(&config_for_path(PathBuf::new())) else {
        panic!("expected empty path to fail");
    };
    assert!(matches!(err, SqliteStoreError::Invalid(_)));
}

#[test]
fn sqlite_store_rejects_overlong_component() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("a".repeat(300)).join("store.db");
    let Err(err) = SqliteRosterStore::new(&config_for_path(path)) else {
        panic!("expected overlong component to fail");
    };
    assert!(matches!(err, SqliteStoreError::Invalid(_)));
}

#[test]
fn sqlite_store_rejects_overlong_total_path() {
    let temp = TempDir::new().unwrap();
    let mut path = temp.path().to_path_buf();
    for _ in 0 .. 20 {
        path.push("b".repeat(250));
    }
    path.push("store.db");
    let Err(err) = SqliteRosterStore::new(&config_for_path(path)) else {
        panic!("expected overlong path to fail");
    };
    assert!(matches!(err, SqliteStoreError::Invalid(_)));
}

#[test]
fn sqlite_store_creates_missing_parent_directories() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("nested").join("deeper").join("roster.db");
    let store = store_for(&path);
    assert!(store.readiness().is_ok());
    assert!(path.exists());
}

// ============================================================================
// SECTION: Schema Versioning
// ============================================================================

#[test]
fn sqlite_store_rejects_unknown_schema_version() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("roster.db");
    drop(store_for(&path));
    let connection = Connection::open(&path).unwrap();
    connection.execute("UPDATE store_meta SET version = ?1", params![99_i64]).unwrap();
    drop(connection);
    let Err(err) = SqliteRosterStore::new(&config_for_path(path)) else {
        panic!("expected version mismatch");
    };
    assert_eq!(err, SqliteStoreError::VersionMismatch("unsupported schema version: 99".to_string()));
}

#[test]
fn sqlite_store_reopen_keeps_rows() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("roster.db");
    {
        let store = store_for(&path);
        seed_roster(&store);
        seed_five_entries(&store);
    }
    let store = store_for(&path);
    assert_eq!(store.teams_for_coach(cid(1)).unwrap(), BTreeSet::from([tid(1)]));
    let entries = store.query_logs(&LogQuery::default()).unwrap();
    assert_eq!(ids(&entries), vec![5, 4, 3, 2, 1]);
    let appended = log(&store, 10, ActionKind::CoachEditExercise, None, None, 600);
    assert_eq!(appended.id.get(), 6);
}

// ============================================================================
// SECTION: Membership Reads
// ============================================================================

#[test]
fn membership_reads_follow_current_rows() {
    let temp = TempDir::new().unwrap();
    let store = store_for(&temp.path().join("roster.db"));
    seed_roster(&store);

    assert_eq!(store.teams_for_coach(cid(3)).unwrap(), BTreeSet::new());
    assert_eq!(store.teams_for_player(pid(2)).unwrap(), BTreeSet::from([tid(2)]));
    assert_eq!(
        store.players_in_teams(&BTreeSet::from([tid(1), tid(2)])).unwrap(),
        BTreeSet::from([pid(1), pid(2)])
    );
    assert_eq!(store.players_in_teams(&BTreeSet::new()).unwrap(), BTreeSet::new());
    assert!(store.team_exists(tid(2)).unwrap());
    assert!(!store.team_exists(tid(9)).unwrap());
    assert!(store.player_exists(pid(1)).unwrap());
    assert!(!store.player_exists(pid(9)).unwrap());

    store.set_coach_membership(cid(1), tid(2), true).unwrap();
    store.set_coach_membership(cid(1), tid(1), false).unwrap();
    assert_eq!(store.teams_for_coach(cid(1)).unwrap(), BTreeSet::from([tid(2)]));
}

// ============================================================================
// SECTION: Activity Log Predicates
// ============================================================================

#[test]
fn log_queries_order_newest_first_with_id_tiebreak() {
    let temp = TempDir::new().unwrap();
    let store = store_for(&temp.path().join("roster.db"));
    seed_roster(&store);
    log(&store, 1, ActionKind::AdminAction, Some(1), None, 100);
    log(&store, 1, ActionKind::AdminAction, Some(1), None, 100);
    log(&store, 1, ActionKind::AdminAction, Some(2), None, 50);
    let entries = store.query_logs(&LogQuery::default()).unwrap();
    assert_eq!(ids(&entries), vec![2, 1, 3]);
}

#[test]
fn target_scope_matches_player_or_team_and_empty_matches_nothing() {
    let temp = TempDir::new().unwrap();
    let store = store_for(&temp.path().join("roster.db"));
    seed_roster(&store);
    log(&store, 1, ActionKind::AdminAction, Some(1), None, 100);
    log(&store, 1, ActionKind::AdminAction, None, Some(2), 200);
    log(&store, 1, ActionKind::AdminAction, Some(2), None, 300);

    let query = LogQuery {
        targets: Some(TargetScope {
            players: BTreeSet::from([pid(1)]),
            teams: BTreeSet::from([tid(2)]),
        }),
        ..LogQuery::default()
    };
    assert_eq!(ids(&store.query_logs(&query).unwrap()), vec![2, 1]);

    let empty = LogQuery {
        targets: Some(TargetScope::default()),
        ..LogQuery::default()
    };
    assert!(store.query_logs(&empty).unwrap().is_empty());
}

#[test]
fn log_filters_bind_action_and_range() {
    let temp = TempDir::new().unwrap();
    let store = store_for(&temp.path().join("roster.db"));
    seed_roster(&store);
    seed_five_entries(&store);

    let by_action = LogQuery {
        action: Some(ActionKind::AdminAction),
        created: TimeRange::new(
            Some(Timestamp::from_unix_millis(150)),
            Some(Timestamp::from_unix_millis(300)),
        )
        .unwrap(),
        ..LogQuery::default()
    };
    assert_eq!(ids(&store.query_logs(&by_action).unwrap()), vec![3, 2]);

    let by_author = LogQuery {
        user_id: Some(uid(11)),
        ..LogQuery::default()
    };
    assert_eq!(ids(&store.query_logs(&by_author).unwrap()), vec![5]);
}

#[test]
fn huge_page_offset_returns_empty_page() {
    let temp = TempDir::new().unwrap();
    let store = store_for(&temp.path().join("roster.db"));
    seed_roster(&store);
    seed_five_entries(&store);
    let logs = LogQuery {
        window: Some(Page::new(usize::MAX, 10)),
        ..LogQuery::default()
    };
    assert!(store.query_logs(&logs).unwrap().is_empty());

    let engine = engine(store);
    let admin = Actor::admin(uid(1));
    let page = PageRequest::new(usize::MAX, 10);
    let entries = engine.query_activity_logs(&admin, &LogFilter::default(), page).unwrap();
    assert!(entries.is_empty());
}

#[test]
fn corrupt_action_label_fails_closed() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("roster.db");
    drop(store_for(&path));
    let connection = Connection::open(&path).unwrap();
    connection
        .execute(
            "INSERT INTO activity_logs (action, user_id, description, created_at)
             VALUES ('teleport', 1, 'x', 1)",
            params![],
        )
        .unwrap();
    drop(connection);
    let store = store_for(&path);
    let err = store.query_logs(&LogQuery::default()).unwrap_err();
    assert!(matches!(err, StoreError::Corrupt(_)));
}

// ============================================================================
// SECTION: Engine Scenarios
// ============================================================================

#[test]
fn coach_sees_scoped_and_own_entries_over_sqlite() {
    let temp = TempDir::new().unwrap();
    let store = store_for(&temp.path().join("roster.db"));
    seed_roster(&store);
    seed_five_entries(&store);
    let engine = engine(store);
    let coach = Actor::coach(uid(10), cid(1));

    let all = engine.query_activity_logs(&coach, &LogFilter::default(), PageRequest::default()).unwrap();
    assert_eq!(ids(&all), vec![5, 4, 2, 1]);

    let first = engine.query_activity_logs(&coach, &LogFilter::default(), PageRequest::new(0, 2)).unwrap();
    let second = engine.query_activity_logs(&coach, &LogFilter::default(), PageRequest::new(2, 2)).unwrap();
    let third = engine.query_activity_logs(&coach, &LogFilter::default(), PageRequest::new(4, 2)).unwrap();
    assert_eq!(ids(&first), vec![5, 4]);
    assert_eq!(ids(&second), vec![2, 1]);
    assert!(third.is_empty());

    let teamless = Actor::coach(uid(12), cid(3));
    assert!(
        engine
            .query_activity_logs(&teamless, &LogFilter::default(), PageRequest::default())
            .unwrap()
            .is_empty()
    );

    let foreign = LogFilter {
        team_id: Some(tid(2)),
        ..LogFilter::default()
    };
    assert!(matches!(
        engine.query_activity_logs(&coach, &foreign, PageRequest::default()),
        Err(AccessError::Forbidden(_))
    ));
}

#[test]
fn measurements_and_leaderboard_over_sqlite() {
    let temp = TempDir::new().unwrap();
    let store = store_for(&temp.path().join("roster.db"));
    seed_roster(&store);
    store.insert_exercise(&exercise(1, &[MetricKind::Seconds, MetricKind::Meters])).unwrap();
    store
        .insert_measurement(&measurement(
            1,
            1,
            1,
            300,
            &[(MetricKind::Seconds, "12.1"), (MetricKind::Meters, "100")],
        ))
        .unwrap();
    store.insert_measurement(&measurement(2, 2, 1, 100, &[(MetricKind::Seconds, "11.4")])).unwrap();
    store.insert_measurement(&measurement(3, 1, 1, 100, &[(MetricKind::Seconds, "11.9")])).unwrap();
    store.insert_measurement(&measurement(4, 1, 1, 200, &[(MetricKind::Seconds, "10.0")])).unwrap();
    assert!(store.deactivate_measurement(mid(4)).unwrap());
    assert!(!store.deactivate_measurement(mid(9)).unwrap());

    let loaded = store.measurement(mid(1)).unwrap().unwrap();
    assert_eq!(loaded.values[0].kind, MetricKind::Seconds);
    assert_eq!(loaded.values[1].raw, "100");
    assert!(!store.measurement(mid(4)).unwrap().unwrap().is_active);

    let stored = store.exercise(eid(1)).unwrap().unwrap();
    assert_eq!(stored.primary_metric(), Some(MetricKind::Seconds));

    let by_team = MeasurementQuery {
        team_id: Some(tid(2)),
        ..MeasurementQuery::default()
    };
    assert_eq!(measurement_ids(&store.query_measurements(&by_team).unwrap()), vec![2]);

    let engine = engine(store);
    let admin = Actor::admin(uid(1));
    let coach = Actor::coach(uid(10), cid(1));

    let listed = engine
        .list_measurements(&admin, &MeasurementFilter::default(), PageRequest::default())
        .unwrap();
    assert_eq!(measurement_ids(&listed), vec![2, 3, 1]);
    let coach_listed = engine
        .list_measurements(&coach, &MeasurementFilter::default(), PageRequest::default())
        .unwrap();
    assert_eq!(measurement_ids(&coach_listed), vec![3, 1]);

    let board = engine.compute_leaderboard(&admin, eid(1), None).unwrap();
    let ranked: Vec<(u64, f64)> =
        board.entries.iter().map(|entry| (entry.player_id.get(), entry.best_value)).collect();
    assert_eq!(ranked, vec![(2, 11.4), (1, 11.9)]);

    let stats = engine
        .compute_stats(&coach, pid(1), eid(1), MetricKind::Seconds, TimeRange::UNBOUNDED)
        .unwrap();
    assert_eq!(stats.count, 2);
    assert_eq!(stats.best, Some(11.9));
}

#[test]
fn exercise_soft_delete_is_visible_to_reads() {
    let temp = TempDir::new().unwrap();
    let store = store_for(&temp.path().join("roster.db"));
    seed_roster(&store);
    store.insert_exercise(&exercise(1, &[MetricKind::Repetitions])).unwrap();
    assert!(store.set_exercise_active(eid(1), false).unwrap());
    assert!(!store.exercise(eid(1)).unwrap().unwrap().is_active);
    assert!(store.exercise(eid(2)).unwrap().is_none());
}
