// crates/squad-gate-store-sqlite/src/store.rs
// ============================================================================
// Module: SQLite Roster Store
// Description: Durable roster, measurement, and activity log store backed by SQLite.
// Purpose: Answer the engine's declarative predicates with bound-parameter SQL.
// Dependencies: squad-gate-core, rusqlite, serde, thiserror
// ============================================================================

//! ## Overview
//! [`SqliteRosterStore`] implements the core read interfaces over a single
//! guarded `SQLite` connection. Predicates arrive as [`LogQuery`] and
//! [`MeasurementQuery`] values and are rendered into `WHERE` clauses whose
//! values are always bound, never interpolated. Row contents are untrusted:
//! identifiers of zero, unknown action labels, and unknown metric kinds are
//! reported as corruption instead of being skipped.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeSet;
use std::path::Path;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::MutexGuard;

use rusqlite::Connection;
use rusqlite::OpenFlags;
use rusqlite::OptionalExtension;
use rusqlite::params;
use rusqlite::params_from_iter;
use rusqlite::types::Value;
use serde::Deserialize;
use squad_gate_core::ActionKind;
use squad_gate_core::ActivityLogEntry;
use squad_gate_core::ActivityLogStore;
use squad_gate_core::CoachId;
use squad_gate_core::Exercise;
use squad_gate_core::ExerciseId;
use squad_gate_core::ExerciseMetric;
use squad_gate_core::LogEntryId;
use squad_gate_core::LogQuery;
use squad_gate_core::Measurement;
use squad_gate_core::MeasurementId;
use squad_gate_core::MeasurementQuery;
use squad_gate_core::MeasurementStore;
use squad_gate_core::MembershipReader;
use squad_gate_core::MetricKind;
use squad_gate_core::MetricValue;
use squad_gate_core::NewActivityLog;
use squad_gate_core::Page;
use squad_gate_core::PlayerId;
use squad_gate_core::RosterStore;
use squad_gate_core::StoreError;
use squad_gate_core::Team;
use squad_gate_core::TeamId;
use squad_gate_core::TimeRange;
use squad_gate_core::Timestamp;
use squad_gate_core::UserId;
use thiserror::Error;

// ============================================================================
// SECTION: Limits
// ============================================================================

/// Default busy timeout for `SQLite` connections (ms).
pub const DEFAULT_BUSY_TIMEOUT_MS: u64 = 5_000;
/// Maximum length of a single path component.
const MAX_PATH_COMPONENT_LENGTH: usize = 255;
/// Maximum total path length.
const MAX_TOTAL_PATH_LENGTH: usize = 4_096;
/// Current schema version written to `store_meta`.
pub const SCHEMA_VERSION: i64 = 1;

// ============================================================================
// SECTION: Config
// ============================================================================

/// `SQLite` journal mode configuration.
///
/// # Invariants
/// - Values map 1:1 to `SQLite` `journal_mode` pragma settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SqliteStoreMode {
    /// WAL journal mode.
    #[default]
    Wal,
    /// Delete journal mode.
    Delete,
}

impl SqliteStoreMode {
    /// Returns the `SQLite` pragma value.
    #[must_use]
    pub const fn pragma_value(self) -> &'static str {
        match self {
            Self::Wal => "wal",
            Self::Delete => "delete",
        }
    }
}

/// `SQLite` sync mode configuration.
///
/// # Invariants
/// - Values map 1:1 to `SQLite` `synchronous` pragma settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SqliteSyncMode {
    /// Full synchronous mode.
    #[default]
    Full,
    /// Normal synchronous mode.
    Normal,
}

impl SqliteSyncMode {
    /// Returns the `SQLite` pragma value.
    #[must_use]
    pub const fn pragma_value(self) -> &'static str {
        match self {
            Self::Full => "full",
            Self::Normal => "normal",
        }
    }
}

/// Configuration for the `SQLite` roster store.
///
/// # Invariants
/// - `path` must resolve to a file path (not a directory).
/// - `busy_timeout_ms` is interpreted as milliseconds.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SqliteStoreConfig {
    /// Path to the `SQLite` database file.
    pub path: PathBuf,
    /// Busy timeout in milliseconds.
    #[serde(default = "default_busy_timeout_ms")]
    pub busy_timeout_ms: u64,
    /// `SQLite` journal mode.
    #[serde(default)]
    pub journal_mode: SqliteStoreMode,
    /// `SQLite` sync mode.
    #[serde(default)]
    pub sync_mode: SqliteSyncMode,
}

impl SqliteStoreConfig {
    /// Builds a config with default pragmas for the given path.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            busy_timeout_ms: DEFAULT_BUSY_TIMEOUT_MS,
            journal_mode: SqliteStoreMode::default(),
            sync_mode: SqliteSyncMode::default(),
        }
    }
}

/// Returns the default busy timeout for `SQLite` connections.
const fn default_busy_timeout_ms() -> u64 {
    DEFAULT_BUSY_TIMEOUT_MS
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// `SQLite` store errors.
///
/// # Invariants
/// - Error messages avoid embedding measurement values or log descriptions.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SqliteStoreError {
    /// Store I/O error.
    #[error("sqlite store io error: {0}")]
    Io(String),
    /// `SQLite` engine error.
    #[error("sqlite store db error: {0}")]
    Db(String),
    /// Stored rows failed decoding.
    #[error("sqlite store corruption: {0}")]
    Corrupt(String),
    /// Store schema version mismatch.
    #[error("sqlite store version mismatch: {0}")]
    VersionMismatch(String),
    /// Invalid caller input or configuration.
    #[error("sqlite store invalid data: {0}")]
    Invalid(String),
}

impl From<SqliteStoreError> for StoreError {
    fn from(error: SqliteStoreError) -> Self {
        match error {
            SqliteStoreError::Io(message) => Self::Io(message),
            SqliteStoreError::Db(message) => Self::Store(message),
            SqliteStoreError::Corrupt(message) | SqliteStoreError::VersionMismatch(message) => {
                Self::Corrupt(message)
            }
            SqliteStoreError::Invalid(message) => Self::Invalid(message),
        }
    }
}

/// Maps a rusqlite error into a store error.
#[allow(clippy::needless_pass_by_value, reason = "Used as a map_err function pointer.")]
fn db_error(err: rusqlite::Error) -> SqliteStoreError {
    SqliteStoreError::Db(err.to_string())
}

// ============================================================================
// SECTION: Store
// ============================================================================

/// `SQLite`-backed roster store.
///
/// # Invariants
/// - All access goes through one mutex-guarded connection.
/// - Activity log rows are only ever inserted.
#[derive(Clone)]
pub struct SqliteRosterStore {
    /// Shared connection guarded for serialized access.
    connection: Arc<Mutex<Connection>>,
}

impl SqliteRosterStore {
    /// Opens (or creates) a store at the configured path.
    ///
    /// # Errors
    ///
    /// Returns [`SqliteStoreError`] when the path is unsafe, the database
    /// cannot be opened, or the schema version is unsupported.
    pub fn new(config: &SqliteStoreConfig) -> Result<Self, SqliteStoreError> {
        validate_store_path(&config.path)?;
        ensure_parent_dir(&config.path)?;
        let mut connection = open_connection(config)?;
        initialize_schema(&mut connection)?;
        Ok(Self {
            connection: Arc::new(Mutex::new(connection)),
        })
    }

    /// Locks the shared connection.
    fn connection(&self) -> Result<MutexGuard<'_, Connection>, SqliteStoreError> {
        self.connection
            .lock()
            .map_err(|_| SqliteStoreError::Io("sqlite connection mutex poisoned".to_string()))
    }

    // ------------------------------------------------------------------------
    // Roster writes
    // ------------------------------------------------------------------------

    /// Inserts or replaces a team.
    ///
    /// # Errors
    ///
    /// Returns [`SqliteStoreError`] when the write fails.
    pub fn upsert_team(&self, team: &Team) -> Result<(), SqliteStoreError> {
        let guard = self.connection()?;
        guard
            .execute(
                "INSERT INTO teams (id, name, season, is_active) VALUES (?1, ?2, ?3, ?4)
                 ON CONFLICT(id) DO UPDATE SET
                    name = excluded.name, season = excluded.season, is_active = excluded.is_active",
                params![sql_id(team.id.get())?, team.name, team.season, team.is_active],
            )
            .map_err(db_error)?;
        Ok(())
    }

    /// Registers a player profile.
    ///
    /// # Errors
    ///
    /// Returns [`SqliteStoreError`] when the write fails.
    pub fn insert_player(
        &self,
        player_id: PlayerId,
        user_id: Option<UserId>,
        name: &str,
    ) -> Result<(), SqliteStoreError> {
        let user = user_id.map(|user| sql_id(user.get())).transpose()?;
        let guard = self.connection()?;
        guard
            .execute(
                "INSERT INTO players (id, user_id, name) VALUES (?1, ?2, ?3)",
                params![sql_id(player_id.get())?, user, name],
            )
            .map_err(db_error)?;
        Ok(())
    }

    /// Registers a coach profile.
    ///
    /// # Errors
    ///
    /// Returns [`SqliteStoreError`] when the write fails.
    pub fn insert_coach(
        &self,
        coach_id: CoachId,
        user_id: Option<UserId>,
        name: &str,
    ) -> Result<(), SqliteStoreError> {
        let user = user_id.map(|user| sql_id(user.get())).transpose()?;
        let guard = self.connection()?;
        guard
            .execute(
                "INSERT INTO coaches (id, user_id, name) VALUES (?1, ?2, ?3)",
                params![sql_id(coach_id.get())?, user, name],
            )
            .map_err(db_error)?;
        Ok(())
    }

    /// Adds or removes a coach membership.
    ///
    /// # Errors
    ///
    /// Returns [`SqliteStoreError`] when the write fails.
    pub fn set_coach_membership(
        &self,
        coach_id: CoachId,
        team_id: TeamId,
        member: bool,
    ) -> Result<(), SqliteStoreError> {
        let sql = if member {
            "INSERT OR IGNORE INTO team_coaches (coach_id, team_id) VALUES (?1, ?2)"
        } else {
            "DELETE FROM team_coaches WHERE coach_id = ?1 AND team_id = ?2"
        };
        let guard = self.connection()?;
        guard
            .execute(sql, params![sql_id(coach_id.get())?, sql_id(team_id.get())?])
            .map_err(db_error)?;
        Ok(())
    }

    /// Adds or removes a player membership.
    ///
    /// # Errors
    ///
    /// Returns [`SqliteStoreError`] when the write fails.
    pub fn set_player_membership(
        &self,
        player_id: PlayerId,
        team_id: TeamId,
        member: bool,
    ) -> Result<(), SqliteStoreError> {
        let sql = if member {
            "INSERT OR IGNORE INTO team_players (player_id, team_id) VALUES (?1, ?2)"
        } else {
            "DELETE FROM team_players WHERE player_id = ?1 AND team_id = ?2"
        };
        let guard = self.connection()?;
        guard
            .execute(sql, params![sql_id(player_id.get())?, sql_id(team_id.get())?])
            .map_err(db_error)?;
        Ok(())
    }

    // ------------------------------------------------------------------------
    // Exercise and measurement writes
    // ------------------------------------------------------------------------

    /// Inserts an exercise and its ordered metric declarations.
    ///
    /// # Errors
    ///
    /// Returns [`SqliteStoreError`] when the write fails.
    pub fn insert_exercise(&self, exercise: &Exercise) -> Result<(), SqliteStoreError> {
        let id = sql_id(exercise.id.get())?;
        let mut guard = self.connection()?;
        let tx = guard.transaction().map_err(db_error)?;
        tx.execute(
            "INSERT INTO exercises (id, coach_id, name, is_active) VALUES (?1, ?2, ?3, ?4)",
            params![id, sql_id(exercise.owner_coach_id.get())?, exercise.name, exercise.is_active],
        )
        .map_err(db_error)?;
        for (position, metric) in exercise.metrics.iter().enumerate() {
            tx.execute(
                "INSERT INTO exercise_metrics (exercise_id, position, kind, required)
                 VALUES (?1, ?2, ?3, ?4)",
                params![id, sql_index(position)?, metric.kind.as_str(), metric.required],
            )
            .map_err(db_error)?;
        }
        tx.commit().map_err(db_error)?;
        Ok(())
    }

    /// Marks an exercise active or soft-deleted. Returns false when it does not exist.
    ///
    /// # Errors
    ///
    /// Returns [`SqliteStoreError`] when the write fails.
    pub fn set_exercise_active(
        &self,
        exercise_id: ExerciseId,
        is_active: bool,
    ) -> Result<bool, SqliteStoreError> {
        let guard = self.connection()?;
        let changed = guard
            .execute(
                "UPDATE exercises SET is_active = ?1 WHERE id = ?2",
                params![is_active, sql_id(exercise_id.get())?],
            )
            .map_err(db_error)?;
        Ok(changed > 0)
    }

    /// Inserts a measurement and its values.
    ///
    /// # Errors
    ///
    /// Returns [`SqliteStoreError`] when the write fails.
    pub fn insert_measurement(&self, measurement: &Measurement) -> Result<(), SqliteStoreError> {
        let id = sql_id(measurement.id.get())?;
        let mut guard = self.connection()?;
        let tx = guard.transaction().map_err(db_error)?;
        tx.execute(
            "INSERT INTO measurements
                (id, player_id, exercise_id, recorded_at, created_by, notes, is_active)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                id,
                sql_id(measurement.player_id.get())?,
                sql_id(measurement.exercise_id.get())?,
                measurement.recorded_at.as_unix_millis(),
                sql_id(measurement.created_by.get())?,
                measurement.notes,
                measurement.is_active,
            ],
        )
        .map_err(db_error)?;
        for (position, value) in measurement.values.iter().enumerate() {
            tx.execute(
                "INSERT INTO measurement_values (measurement_id, position, kind, value)
                 VALUES (?1, ?2, ?3, ?4)",
                params![id, sql_index(position)?, value.kind.as_str(), value.raw],
            )
            .map_err(db_error)?;
        }
        tx.commit().map_err(db_error)?;
        Ok(())
    }

    /// Soft-deletes a measurement. Returns false when it does not exist.
    ///
    /// # Errors
    ///
    /// Returns [`SqliteStoreError`] when the write fails.
    pub fn deactivate_measurement(
        &self,
        measurement_id: MeasurementId,
    ) -> Result<bool, SqliteStoreError> {
        let guard = self.connection()?;
        let changed = guard
            .execute(
                "UPDATE measurements SET is_active = 0 WHERE id = ?1",
                params![sql_id(measurement_id.get())?],
            )
            .map_err(db_error)?;
        Ok(changed > 0)
    }

    // ------------------------------------------------------------------------
    // Reads
    // ------------------------------------------------------------------------

    /// Collects one ID column for a single bound key.
    fn id_column(&self, sql: &str, key: u64) -> Result<Vec<u64>, SqliteStoreError> {
        let guard = self.connection()?;
        let mut stmt = guard.prepare_cached(sql).map_err(db_error)?;
        let rows = stmt
            .query_map(params![sql_id(key)?], |row| row.get::<_, i64>(0))
            .map_err(db_error)?;
        rows.map(|row| row.map_err(db_error).and_then(raw_id)).collect()
    }

    /// Returns true when a single bound key selects a row.
    fn row_exists(&self, sql: &str, key: u64) -> Result<bool, SqliteStoreError> {
        let guard = self.connection()?;
        let found: Option<i64> =
            guard.query_row(sql, params![sql_id(key)?], |row| row.get(0)).optional().map_err(db_error)?;
        Ok(found.is_some())
    }

    /// Loads an exercise with its metric declarations.
    fn load_exercise(&self, exercise_id: ExerciseId) -> Result<Option<Exercise>, SqliteStoreError> {
        let id = sql_id(exercise_id.get())?;
        let guard = self.connection()?;
        let header: Option<(i64, String, bool)> = guard
            .query_row(
                "SELECT coach_id, name, is_active FROM exercises WHERE id = ?1",
                params![id],
                |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)),
            )
            .optional()
            .map_err(db_error)?;
        let Some((coach_id, name, is_active)) = header else {
            return Ok(None);
        };
        let mut stmt = guard
            .prepare_cached(
                "SELECT kind, required FROM exercise_metrics
                 WHERE exercise_id = ?1 ORDER BY position ASC",
            )
            .map_err(db_error)?;
        let rows = stmt
            .query_map(params![id], |row| Ok((row.get::<_, String>(0)?, row.get::<_, bool>(1)?)))
            .map_err(db_error)?;
        let mut metrics = Vec::new();
        for row in rows {
            let (kind, required) = row.map_err(db_error)?;
            metrics.push(ExerciseMetric {
                kind: metric_kind(&kind)?,
                required,
            });
        }
        Ok(Some(Exercise {
            id: exercise_id,
            owner_coach_id: decode_id(coach_id, CoachId::from_raw, "coach")?,
            name,
            metrics,
            is_active,
        }))
    }

    /// Runs a measurement select and attaches each row's values.
    fn load_measurements(
        &self,
        sql: &str,
        values: &[Value],
    ) -> Result<Vec<Measurement>, SqliteStoreError> {
        let guard = self.connection()?;
        let mut stmt = guard.prepare(sql).map_err(db_error)?;
        let rows = stmt.query_map(params_from_iter(values.iter()), map_measurement_row).map_err(db_error)?;
        let headers = rows.collect::<Result<Vec<MeasurementRow>, _>>().map_err(db_error)?;
        let mut value_stmt = guard
            .prepare_cached(
                "SELECT kind, value FROM measurement_values
                 WHERE measurement_id = ?1 ORDER BY position ASC",
            )
            .map_err(db_error)?;
        let mut measurements = Vec::with_capacity(headers.len());
        for header in headers {
            let value_rows = value_stmt
                .query_map(params![header.id], |row| {
                    Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
                })
                .map_err(db_error)?;
            let mut metric_values = Vec::new();
            for value_row in value_rows {
                let (kind, raw) = value_row.map_err(db_error)?;
                metric_values.push(MetricValue::new(metric_kind(&kind)?, raw));
            }
            measurements.push(header.into_measurement(metric_values)?);
        }
        Ok(measurements)
    }
}

// ============================================================================
// SECTION: Interface Implementations
// ============================================================================

impl MembershipReader for SqliteRosterStore {
    fn teams_for_coach(&self, coach_id: CoachId) -> Result<BTreeSet<TeamId>, StoreError> {
        let ids =
            self.id_column("SELECT team_id FROM team_coaches WHERE coach_id = ?1", coach_id.get())?;
        Ok(ids.into_iter().filter_map(TeamId::from_raw).collect())
    }

    fn players_in_teams(&self, teams: &BTreeSet<TeamId>) -> Result<BTreeSet<PlayerId>, StoreError> {
        if teams.is_empty() {
            return Ok(BTreeSet::new());
        }
        let mut filter = SqlFilter::default();
        filter.push_in("team_id", teams.iter().map(|team| team.get()))?;
        let sql = format!("SELECT DISTINCT player_id FROM team_players{}", filter.where_sql());
        let guard = self.connection()?;
        let mut stmt = guard.prepare(&sql).map_err(db_error)?;
        let rows = stmt
            .query_map(params_from_iter(filter.params.iter()), |row| row.get::<_, i64>(0))
            .map_err(db_error)?;
        let mut players = BTreeSet::new();
        for row in rows {
            let raw = row.map_err(db_error)?;
            players.insert(decode_id(raw, PlayerId::from_raw, "player")?);
        }
        Ok(players)
    }

    fn teams_for_player(&self, player_id: PlayerId) -> Result<BTreeSet<TeamId>, StoreError> {
        let ids = self
            .id_column("SELECT team_id FROM team_players WHERE player_id = ?1", player_id.get())?;
        Ok(ids.into_iter().filter_map(TeamId::from_raw).collect())
    }

    fn team_exists(&self, team_id: TeamId) -> Result<bool, StoreError> {
        Ok(self.row_exists("SELECT id FROM teams WHERE id = ?1", team_id.get())?)
    }

    fn player_exists(&self, player_id: PlayerId) -> Result<bool, StoreError> {
        Ok(self.row_exists("SELECT id FROM players WHERE id = ?1", player_id.get())?)
    }
}

impl ActivityLogStore for SqliteRosterStore {
    fn query_logs(&self, query: &LogQuery) -> Result<Vec<ActivityLogEntry>, StoreError> {
        let mut filter = log_filter(query)?;
        let mut sql = format!(
            "SELECT id, action, user_id, target_player_id, target_exercise_id, target_team_id,
                    description, created_at
             FROM activity_logs{} ORDER BY created_at DESC, id DESC",
            filter.where_sql()
        );
        filter.push_window(&mut sql, query.window);
        let guard = self.connection()?;
        let mut stmt = guard.prepare(&sql).map_err(db_error)?;
        let rows = stmt
            .query_map(params_from_iter(filter.params.iter()), map_log_row)
            .map_err(db_error)?;
        let mut entries = Vec::new();
        for row in rows {
            entries.push(row.map_err(db_error)?.into_entry()?);
        }
        Ok(entries)
    }

    fn append_log(&self, entry: NewActivityLog) -> Result<ActivityLogEntry, StoreError> {
        let player = entry.target_player_id.map(|id| sql_id(id.get())).transpose()?;
        let exercise = entry.target_exercise_id.map(|id| sql_id(id.get())).transpose()?;
        let team = entry.target_team_id.map(|id| sql_id(id.get())).transpose()?;
        let guard = self.connection()?;
        guard
            .execute(
                "INSERT INTO activity_logs
                    (action, user_id, target_player_id, target_exercise_id, target_team_id,
                     description, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
                params![
                    entry.action.as_str(),
                    sql_id(entry.user_id.get())?,
                    player,
                    exercise,
                    team,
                    entry.description,
                    entry.created_at.as_unix_millis(),
                ],
            )
            .map_err(db_error)?;
        let id = decode_id(guard.last_insert_rowid(), LogEntryId::from_raw, "log entry")?;
        Ok(ActivityLogEntry {
            id,
            action: entry.action,
            user_id: entry.user_id,
            target_player_id: entry.target_player_id,
            target_exercise_id: entry.target_exercise_id,
            target_team_id: entry.target_team_id,
            description: entry.description,
            created_at: entry.created_at,
        })
    }
}

impl MeasurementStore for SqliteRosterStore {
    fn exercise(&self, exercise_id: ExerciseId) -> Result<Option<Exercise>, StoreError> {
        Ok(self.load_exercise(exercise_id)?)
    }

    fn measurement(
        &self,
        measurement_id: MeasurementId,
    ) -> Result<Option<Measurement>, StoreError> {
        let sql = format!("{MEASUREMENT_COLUMNS} WHERE m.id = ?");
        let mut found = self.load_measurements(&sql, &[Value::Integer(sql_id(measurement_id.get())?)])?;
        Ok(found.pop())
    }

    fn query_measurements(&self, query: &MeasurementQuery) -> Result<Vec<Measurement>, StoreError> {
        let mut filter = measurement_filter(query)?;
        let mut sql = format!(
            "{MEASUREMENT_COLUMNS}{} ORDER BY m.recorded_at ASC, m.id ASC",
            filter.where_sql()
        );
        filter.push_window(&mut sql, query.window);
        Ok(self.load_measurements(&sql, &filter.params)?)
    }
}

impl RosterStore for SqliteRosterStore {
    fn readiness(&self) -> Result<(), StoreError> {
        let guard = self.connection()?;
        guard
            .query_row("SELECT 1", params![], |row| row.get::<_, i64>(0))
            .map_err(db_error)?;
        Ok(())
    }
}

// ============================================================================
// SECTION: Predicate Rendering
// ============================================================================

/// Shared measurement projection.
const MEASUREMENT_COLUMNS: &str = "SELECT m.id, m.player_id, m.exercise_id, m.recorded_at, \
                                   m.created_by, m.notes, m.is_active FROM measurements m";

/// `WHERE` clauses joined by `AND` plus their positional parameters.
#[derive(Debug, Default)]
struct SqlFilter {
    /// Clauses using `?` placeholders.
    clauses: Vec<String>,
    /// Bound values in placeholder order.
    params: Vec<Value>,
}

impl SqlFilter {
    /// Adds a clause with one bound value.
    fn push(&mut self, clause: &str, value: Value) {
        self.clauses.push(clause.to_string());
        self.params.push(value);
    }

    /// Adds an optional ID equality clause.
    fn push_id(&mut self, column: &str, id: Option<u64>) -> Result<(), SqliteStoreError> {
        if let Some(id) = id {
            self.push(&format!("{column} = ?"), Value::Integer(sql_id(id)?));
        }
        Ok(())
    }

    /// Adds inclusive time bounds on a millisecond column.
    fn push_range(&mut self, column: &str, range: TimeRange) {
        if let Some(from) = range.from {
            self.push(&format!("{column} >= ?"), Value::Integer(from.as_unix_millis()));
        }
        if let Some(to) = range.to {
            self.push(&format!("{column} <= ?"), Value::Integer(to.as_unix_millis()));
        }
    }

    /// Adds an `IN` clause; an empty list matches nothing.
    fn push_in(
        &mut self,
        column: &str,
        ids: impl Iterator<Item = u64>,
    ) -> Result<(), SqliteStoreError> {
        let clause = self.in_clause(column, ids)?;
        self.clauses.push(clause);
        Ok(())
    }

    /// Renders an `IN` clause and binds its values without pushing it.
    fn in_clause(
        &mut self,
        column: &str,
        ids: impl Iterator<Item = u64>,
    ) -> Result<String, SqliteStoreError> {
        let mut count = 0_usize;
        for id in ids {
            self.params.push(Value::Integer(sql_id(id)?));
            count += 1;
        }
        if count == 0 {
            return Ok("0".to_string());
        }
        Ok(format!("{column} IN ({})", vec!["?"; count].join(", ")))
    }

    /// Renders the `WHERE` suffix.
    fn where_sql(&self) -> String {
        if self.clauses.is_empty() {
            String::new()
        } else {
            format!(" WHERE {}", self.clauses.join(" AND "))
        }
    }

    /// Appends `LIMIT`/`OFFSET` for a window.
    fn push_window(&mut self, sql: &mut String, window: Option<Page>) {
        if let Some(page) = window {
            sql.push_str(" LIMIT ? OFFSET ?");
            self.params.push(Value::Integer(sql_count(page.limit)));
            self.params.push(Value::Integer(sql_count(page.offset)));
        }
    }
}

/// Renders an activity log predicate.
fn log_filter(query: &LogQuery) -> Result<SqlFilter, SqliteStoreError> {
    let mut filter = SqlFilter::default();
    filter.push_id("user_id", query.user_id.map(UserId::get))?;
    filter.push_id("target_player_id", query.player_id.map(PlayerId::get))?;
    filter.push_id("target_team_id", query.team_id.map(TeamId::get))?;
    filter.push_id("target_exercise_id", query.exercise_id.map(ExerciseId::get))?;
    if let Some(action) = query.action {
        filter.push("action = ?", Value::Text(action.as_str().to_string()));
    }
    filter.push_range("created_at", query.created);
    if let Some(targets) = &query.targets {
        let players = filter.in_clause("target_player_id", targets.players.iter().map(|id| id.get()))?;
        let teams = filter.in_clause("target_team_id", targets.teams.iter().map(|id| id.get()))?;
        filter.clauses.push(format!("({players} OR {teams})"));
    }
    Ok(filter)
}

/// Renders a measurement predicate.
fn measurement_filter(query: &MeasurementQuery) -> Result<SqlFilter, SqliteStoreError> {
    let mut filter = SqlFilter::default();
    if !query.include_inactive {
        filter.clauses.push("m.is_active = 1".to_string());
    }
    filter.push_id("m.player_id", query.player_id.map(PlayerId::get))?;
    if let Some(players) = &query.players {
        filter.push_in("m.player_id", players.iter().map(|id| id.get()))?;
    }
    filter.push_id("m.exercise_id", query.exercise_id.map(ExerciseId::get))?;
    if let Some(team) = query.team_id {
        filter.push(
            "m.player_id IN (SELECT player_id FROM team_players WHERE team_id = ?)",
            Value::Integer(sql_id(team.get())?),
        );
    }
    filter.push_range("m.recorded_at", query.recorded);
    Ok(filter)
}

// ============================================================================
// SECTION: Row Decoding
// ============================================================================

/// Raw activity log row.
struct LogRow {
    /// Row ID.
    id: i64,
    /// Action label.
    action: String,
    /// Acting user.
    user_id: i64,
    /// Target player.
    target_player_id: Option<i64>,
    /// Target exercise.
    target_exercise_id: Option<i64>,
    /// Target team.
    target_team_id: Option<i64>,
    /// Free-form description.
    description: String,
    /// Creation time (ms).
    created_at: i64,
}

/// Reads a raw activity log row.
fn map_log_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<LogRow> {
    Ok(LogRow {
        id: row.get(0)?,
        action: row.get(1)?,
        user_id: row.get(2)?,
        target_player_id: row.get(3)?,
        target_exercise_id: row.get(4)?,
        target_team_id: row.get(5)?,
        description: row.get(6)?,
        created_at: row.get(7)?,
    })
}

impl LogRow {
    /// Decodes the row into a typed entry.
    fn into_entry(self) -> Result<ActivityLogEntry, SqliteStoreError> {
        let action = self
            .action
            .parse::<ActionKind>()
            .map_err(SqliteStoreError::Corrupt)?;
        Ok(ActivityLogEntry {
            id: decode_id(self.id, LogEntryId::from_raw, "log entry")?,
            action,
            user_id: decode_id(self.user_id, UserId::from_raw, "user")?,
            target_player_id: decode_optional(self.target_player_id, PlayerId::from_raw, "player")?,
            target_exercise_id: decode_optional(
                self.target_exercise_id,
                ExerciseId::from_raw,
                "exercise",
            )?,
            target_team_id: decode_optional(self.target_team_id, TeamId::from_raw, "team")?,
            description: self.description,
            created_at: Timestamp::from_unix_millis(self.created_at),
        })
    }
}

/// Raw measurement header row.
struct MeasurementRow {
    /// Row ID.
    id: i64,
    /// Measured player.
    player_id: i64,
    /// Performed exercise.
    exercise_id: i64,
    /// Recorded time (ms).
    recorded_at: i64,
    /// Recording user.
    created_by: i64,
    /// Optional notes.
    notes: Option<String>,
    /// Soft-delete flag.
    is_active: bool,
}

/// Reads a raw measurement header row.
fn map_measurement_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<MeasurementRow> {
    Ok(MeasurementRow {
        id: row.get(0)?,
        player_id: row.get(1)?,
        exercise_id: row.get(2)?,
        recorded_at: row.get(3)?,
        created_by: row.get(4)?,
        notes: row.get(5)?,
        is_active: row.get(6)?,
    })
}

impl MeasurementRow {
    /// Decodes the row into a typed measurement.
    fn into_measurement(self, values: Vec<MetricValue>) -> Result<Measurement, SqliteStoreError> {
        Ok(Measurement {
            id: decode_id(self.id, MeasurementId::from_raw, "measurement")?,
            player_id: decode_id(self.player_id, PlayerId::from_raw, "player")?,
            exercise_id: decode_id(self.exercise_id, ExerciseId::from_raw, "exercise")?,
            recorded_at: Timestamp::from_unix_millis(self.recorded_at),
            values,
            created_by: decode_id(self.created_by, UserId::from_raw, "user")?,
            notes: self.notes,
            is_active: self.is_active,
        })
    }
}

/// Parses a stored metric kind label.
fn metric_kind(label: &str) -> Result<MetricKind, SqliteStoreError> {
    label.parse::<MetricKind>().map_err(SqliteStoreError::Corrupt)
}

/// Converts a stored integer into a raw nonzero ID.
fn raw_id(value: i64) -> Result<u64, SqliteStoreError> {
    u64::try_from(value)
        .ok()
        .filter(|raw| *raw > 0)
        .ok_or_else(|| SqliteStoreError::Corrupt(format!("invalid stored id: {value}")))
}

/// Decodes a stored integer into a typed ID.
fn decode_id<T>(
    value: i64,
    from_raw: impl Fn(u64) -> Option<T>,
    label: &str,
) -> Result<T, SqliteStoreError> {
    raw_id(value)
        .ok()
        .and_then(from_raw)
        .ok_or_else(|| SqliteStoreError::Corrupt(format!("invalid stored {label} id: {value}")))
}

/// Decodes a nullable stored ID.
fn decode_optional<T>(
    value: Option<i64>,
    from_raw: impl Fn(u64) -> Option<T>,
    label: &str,
) -> Result<Option<T>, SqliteStoreError> {
    value.map(|value| decode_id(value, from_raw, label)).transpose()
}

/// Converts an ID into an `SQLite` integer.
fn sql_id(raw: u64) -> Result<i64, SqliteStoreError> {
    i64::try_from(raw).map_err(|_| SqliteStoreError::Invalid(format!("id out of range: {raw}")))
}

/// Converts an index or offset into an `SQLite` integer.
fn sql_index(value: usize) -> Result<i64, SqliteStoreError> {
    i64::try_from(value)
        .map_err(|_| SqliteStoreError::Invalid(format!("index out of range: {value}")))
}

/// Converts a page limit or offset into an `SQLite` integer, saturating on overflow.
fn sql_count(value: usize) -> i64 {
    i64::try_from(value).unwrap_or(i64::MAX)
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Ensures the parent directory for the store exists.
fn ensure_parent_dir(path: &Path) -> Result<(), SqliteStoreError> {
    let Some(parent) = path.parent() else {
        return Err(SqliteStoreError::Io("store path missing parent directory".to_string()));
    };
    if parent.as_os_str().is_empty() {
        return Ok(());
    }
    std::fs::create_dir_all(parent).map_err(|err| SqliteStoreError::Io(err.to_string()))
}

/// Validates store paths for safety limits.
fn validate_store_path(path: &Path) -> Result<(), SqliteStoreError> {
    if path.as_os_str().is_empty() {
        return Err(SqliteStoreError::Invalid("store path must not be empty".to_string()));
    }
    let path_string = path.display().to_string();
    if path_string.len() > MAX_TOTAL_PATH_LENGTH {
        return Err(SqliteStoreError::Invalid("store path exceeds length limit".to_string()));
    }
    for component in path.components() {
        let name = component.as_os_str().to_string_lossy();
        if name.len() > MAX_PATH_COMPONENT_LENGTH {
            return Err(SqliteStoreError::Invalid(
                "store path contains an overlong component".to_string(),
            ));
        }
    }
    if path.is_dir() {
        return Err(SqliteStoreError::Invalid(
            "store path must be a file, not a directory".to_string(),
        ));
    }
    Ok(())
}

/// Opens an `SQLite` connection with secure defaults.
fn open_connection(config: &SqliteStoreConfig) -> Result<Connection, SqliteStoreError> {
    let flags = OpenFlags::SQLITE_OPEN_READ_WRITE
        | OpenFlags::SQLITE_OPEN_CREATE
        | OpenFlags::SQLITE_OPEN_FULL_MUTEX;
    let connection = Connection::open_with_flags(&config.path, flags).map_err(db_error)?;
    apply_pragmas(&connection, config)?;
    Ok(connection)
}

/// Applies `SQLite` pragmas required for durability.
fn apply_pragmas(
    connection: &Connection,
    config: &SqliteStoreConfig,
) -> Result<(), SqliteStoreError> {
    connection.execute_batch("PRAGMA foreign_keys = ON;").map_err(db_error)?;
    connection
        .execute_batch(&format!("PRAGMA journal_mode = {};", config.journal_mode.pragma_value()))
        .map_err(db_error)?;
    connection
        .execute_batch(&format!("PRAGMA synchronous = {};", config.sync_mode.pragma_value()))
        .map_err(db_error)?;
    connection
        .busy_timeout(std::time::Duration::from_millis(config.busy_timeout_ms))
        .map_err(db_error)?;
    Ok(())
}

/// Initializes the `SQLite` schema or validates the existing version.
fn initialize_schema(connection: &mut Connection) -> Result<(), SqliteStoreError> {
    let tx = connection.transaction().map_err(db_error)?;
    tx.execute_batch("CREATE TABLE IF NOT EXISTS store_meta (version INTEGER NOT NULL);")
        .map_err(db_error)?;
    let version: Option<i64> = tx
        .query_row("SELECT version FROM store_meta LIMIT 1", params![], |row| row.get(0))
        .optional()
        .map_err(db_error)?;
    match version {
        None => {
            tx.execute("INSERT INTO store_meta (version) VALUES (?1)", params![SCHEMA_VERSION])
                .map_err(db_error)?;
            tx.execute_batch(
                "CREATE TABLE IF NOT EXISTS teams (
                    id INTEGER PRIMARY KEY,
                    name TEXT NOT NULL,
                    season TEXT NOT NULL,
                    is_active INTEGER NOT NULL DEFAULT 1
                );
                CREATE TABLE IF NOT EXISTS players (
                    id INTEGER PRIMARY KEY,
                    user_id INTEGER UNIQUE,
                    name TEXT NOT NULL,
                    is_active INTEGER NOT NULL DEFAULT 1
                );
                CREATE TABLE IF NOT EXISTS coaches (
                    id INTEGER PRIMARY KEY,
                    user_id INTEGER UNIQUE,
                    name TEXT NOT NULL
                );
                CREATE TABLE IF NOT EXISTS team_coaches (
                    team_id INTEGER NOT NULL REFERENCES teams(id) ON DELETE CASCADE,
                    coach_id INTEGER NOT NULL REFERENCES coaches(id) ON DELETE CASCADE,
                    PRIMARY KEY (team_id, coach_id)
                );
                CREATE INDEX IF NOT EXISTS idx_team_coaches_coach ON team_coaches (coach_id);
                CREATE TABLE IF NOT EXISTS team_players (
                    team_id INTEGER NOT NULL REFERENCES teams(id) ON DELETE CASCADE,
                    player_id INTEGER NOT NULL REFERENCES players(id) ON DELETE CASCADE,
                    PRIMARY KEY (team_id, player_id)
                );
                CREATE INDEX IF NOT EXISTS idx_team_players_player ON team_players (player_id);
                CREATE TABLE IF NOT EXISTS exercises (
                    id INTEGER PRIMARY KEY,
                    coach_id INTEGER NOT NULL REFERENCES coaches(id),
                    name TEXT NOT NULL,
                    is_active INTEGER NOT NULL DEFAULT 1
                );
                CREATE TABLE IF NOT EXISTS exercise_metrics (
                    exercise_id INTEGER NOT NULL REFERENCES exercises(id) ON DELETE CASCADE,
                    position INTEGER NOT NULL,
                    kind TEXT NOT NULL,
                    required INTEGER NOT NULL,
                    PRIMARY KEY (exercise_id, kind)
                );
                CREATE TABLE IF NOT EXISTS measurements (
                    id INTEGER PRIMARY KEY,
                    player_id INTEGER NOT NULL REFERENCES players(id),
                    exercise_id INTEGER NOT NULL REFERENCES exercises(id),
                    recorded_at INTEGER NOT NULL,
                    created_by INTEGER NOT NULL,
                    notes TEXT,
                    is_active INTEGER NOT NULL DEFAULT 1
                );
                CREATE INDEX IF NOT EXISTS idx_measurements_player
                    ON measurements (player_id, exercise_id, recorded_at);
                CREATE TABLE IF NOT EXISTS measurement_values (
                    measurement_id INTEGER NOT NULL REFERENCES measurements(id) ON DELETE CASCADE,
                    position INTEGER NOT NULL,
                    kind TEXT NOT NULL,
                    value TEXT NOT NULL,
                    PRIMARY KEY (measurement_id, kind)
                );
                CREATE TABLE IF NOT EXISTS activity_logs (
                    id INTEGER PRIMARY KEY AUTOINCREMENT,
                    action TEXT NOT NULL,
                    user_id INTEGER NOT NULL,
                    target_player_id INTEGER,
                    target_exercise_id INTEGER,
                    target_team_id INTEGER,
                    description TEXT NOT NULL,
                    created_at INTEGER NOT NULL
                );
                CREATE INDEX IF NOT EXISTS idx_activity_logs_created
                    ON activity_logs (created_at, id);
                CREATE INDEX IF NOT EXISTS idx_activity_logs_user ON activity_logs (user_id);
                CREATE INDEX IF NOT EXISTS idx_activity_logs_player
                    ON activity_logs (target_player_id);
                CREATE INDEX IF NOT EXISTS idx_activity_logs_team ON activity_logs (target_team_id);",
            )
            .map_err(db_error)?;
        }
        Some(value) if value == SCHEMA_VERSION => {}
        Some(value) => {
            return Err(SqliteStoreError::VersionMismatch(format!(
                "unsupported schema version: {value}"
            )));
        }
    }
    tx.commit().map_err(db_error)?;
    Ok(())
}
