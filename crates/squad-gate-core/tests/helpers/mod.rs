// crates/squad-gate-core/tests/helpers/mod.rs
// ============================================================================
// Module: Squad Gate Test Fixtures
// Description: Shared roster fixtures for core integration tests.
// Purpose: Build small rosters, exercises, and logs with readable IDs.
// Dependencies: squad-gate-core
// ============================================================================

//! ## Overview
//! Fixture IDs are plain integers wrapped by the helpers below. The default
//! roster has one coach on one team with one player, plus an out-of-scope
//! team and player.

#![allow(
    dead_code,
    clippy::unwrap_used,
    clippy::expect_used,
    reason = "Each test binary uses a subset of the shared fixtures."
)]

use std::sync::Arc;
use std::sync::Mutex;

use squad_gate_core::AccessAuditEvent;
use squad_gate_core::AccessAuditSink;
use squad_gate_core::AccessEngine;
use squad_gate_core::ActionKind;
use squad_gate_core::ActivityLogEntry;
use squad_gate_core::ActivityLogStore;
use squad_gate_core::Actor;
use squad_gate_core::CoachId;
use squad_gate_core::EngineLimits;
use squad_gate_core::Exercise;
use squad_gate_core::ExerciseId;
use squad_gate_core::ExerciseMetric;
use squad_gate_core::InMemoryRosterStore;
use squad_gate_core::Measurement;
use squad_gate_core::MeasurementId;
use squad_gate_core::MetricKind;
use squad_gate_core::MetricValue;
use squad_gate_core::NewActivityLog;
use squad_gate_core::PlayerId;
use squad_gate_core::Team;
use squad_gate_core::TeamId;
use squad_gate_core::Timestamp;
use squad_gate_core::UserId;

// ============================================================================
// SECTION: Identifiers
// ============================================================================

/// Builds a user ID.
pub fn uid(raw: u64) -> UserId {
    UserId::from_raw(raw).expect("nonzero user id")
}

/// Builds a player ID.
pub fn pid(raw: u64) -> PlayerId {
    PlayerId::from_raw(raw).expect("nonzero player id")
}

/// Builds a coach ID.
pub fn cid(raw: u64) -> CoachId {
    CoachId::from_raw(raw).expect("nonzero coach id")
}

/// Builds a team ID.
pub fn tid(raw: u64) -> TeamId {
    TeamId::from_raw(raw).expect("nonzero team id")
}

/// Builds an exercise ID.
pub fn eid(raw: u64) -> ExerciseId {
    ExerciseId::from_raw(raw).expect("nonzero exercise id")
}

/// Builds a measurement ID.
pub fn mid(raw: u64) -> MeasurementId {
    MeasurementId::from_raw(raw).expect("nonzero measurement id")
}

/// Builds a timestamp from unix millis.
pub const fn ts(millis: i64) -> Timestamp {
    Timestamp::from_unix_millis(millis)
}

// ============================================================================
// SECTION: Roster
// ============================================================================

/// Admin account.
pub fn admin() -> Actor {
    Actor::admin(uid(1))
}

/// Coach on team 1 (user 10, coach 1).
pub fn coach() -> Actor {
    Actor::coach(uid(10), cid(1))
}

/// Coach on team 2 only (user 11, coach 2).
pub fn other_coach() -> Actor {
    Actor::coach(uid(11), cid(2))
}

/// Coach with no teams (user 12, coach 3).
pub fn teamless_coach() -> Actor {
    Actor::coach(uid(12), cid(3))
}

/// Player 1 on team 1 (user 20).
pub fn player() -> Actor {
    Actor::player(uid(20), pid(1))
}

/// Player 2 on team 2 (user 21).
pub fn other_player() -> Actor {
    Actor::player(uid(21), pid(2))
}

/// Builds the default roster: team 1 {coach 1, player 1}, team 2 {coach 2, player 2}.
pub fn roster() -> InMemoryRosterStore {
    let store = InMemoryRosterStore::new();
    for (team, name) in [(1, "Senior A"), (2, "Youth B")] {
        store
            .put_team(Team {
                id: tid(team),
                name: name.to_string(),
                season: "2024/25".to_string(),
                is_active: true,
            })
            .unwrap();
    }
    store.put_player(pid(1)).unwrap();
    store.put_player(pid(2)).unwrap();
    store.set_coach_membership(cid(1), tid(1), true).unwrap();
    store.set_coach_membership(cid(2), tid(2), true).unwrap();
    store.set_player_membership(pid(1), tid(1), true).unwrap();
    store.set_player_membership(pid(2), tid(2), true).unwrap();
    store
}

// ============================================================================
// SECTION: Exercises and Measurements
// ============================================================================

/// Builds an active exercise owned by coach 1 declaring the given metrics
/// (first is primary, all required).
pub fn exercise(id: u64, metrics: &[MetricKind]) -> Exercise {
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

/// Builds an active measurement with one value per `(kind, raw)` pair.
pub fn measurement(
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
        recorded_at: ts(recorded_at),
        values: values.iter().map(|(kind, raw)| MetricValue::new(*kind, *raw)).collect(),
        created_by: uid(10),
        notes: None,
        is_active: true,
    }
}

// ============================================================================
// SECTION: Activity Log
// ============================================================================

/// Appends a log entry and returns it.
pub fn log(
    store: &InMemoryRosterStore,
    author: UserId,
    action: ActionKind,
    player: Option<PlayerId>,
    team: Option<TeamId>,
    created_at: i64,
) -> ActivityLogEntry {
    store
        .append_log(NewActivityLog {
            action,
            user_id: author,
            target_player_id: player,
            target_exercise_id: None,
            target_team_id: team,
            description: format!("{action} at {created_at}"),
            created_at: ts(created_at),
        })
        .unwrap()
}

// ============================================================================
// SECTION: Engine
// ============================================================================

/// Audit sink that keeps events in memory.
#[derive(Default)]
pub struct RecordingSink {
    /// Recorded events in order.
    pub events: Mutex<Vec<AccessAuditEvent>>,
}

impl AccessAuditSink for RecordingSink {
    fn record(&self, event: &AccessAuditEvent) {
        self.events.lock().unwrap().push(event.clone());
    }
}

/// Builds an engine with default limits and a recording sink.
pub fn engine(store: InMemoryRosterStore) -> (AccessEngine<InMemoryRosterStore>, Arc<RecordingSink>) {
    let sink = Arc::new(RecordingSink::default());
    let engine = AccessEngine::new(store, sink.clone(), EngineLimits::default());
    (engine, sink)
}
