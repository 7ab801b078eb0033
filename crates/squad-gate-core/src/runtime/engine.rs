// crates/squad-gate-core/src/runtime/engine.rs
// ============================================================================
// Module: Squad Gate Access Engine
// Description: Actor-facing facade over scope resolution and the engines.
// Purpose: Resolve scope per call, run the operation, and audit the outcome.
// Dependencies: crate::core, crate::interfaces, crate::runtime
// ============================================================================

//! ## Overview
//! [`AccessEngine`] is the public surface HTTP handlers call. Each method
//! resolves a fresh [`Scope`] for the actor, delegates to the matching
//! engine component, and records exactly one [`AccessAuditEvent`]. The engine
//! keeps no mutable state between calls; concurrent calls rely only on the
//! store's own read consistency.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::sync::Arc;

use crate::core::ActivityLogEntry;
use crate::core::Actor;
use crate::core::ExerciseId;
use crate::core::LogFilter;
use crate::core::Measurement;
use crate::core::MeasurementFilter;
use crate::core::MeasurementId;
use crate::core::MetricKind;
use crate::core::NewActivityLog;
use crate::core::Page;
use crate::core::PageRequest;
use crate::core::PlayerId;
use crate::core::Scope;
use crate::core::ScopeRequest;
use crate::core::TeamId;
use crate::core::TimeRange;
use crate::interfaces::RosterStore;
use crate::runtime::activity;
use crate::runtime::audit::AccessAuditEvent;
use crate::runtime::audit::AccessAuditSink;
use crate::runtime::error::AccessError;
use crate::runtime::leaderboard;
use crate::runtime::leaderboard::Leaderboard;
use crate::runtime::measurements;
use crate::runtime::scope;
use crate::runtime::stats;
use crate::runtime::stats::PlayerOverview;
use crate::runtime::stats::SeriesStats;

// ============================================================================
// SECTION: Limits
// ============================================================================

/// Default page size when the caller gives none.
pub const DEFAULT_PAGE_LIMIT: usize = 100;
/// Hard ceiling for any configured page limit.
pub const MAX_PAGE_LIMIT_CEILING: usize = 1_000;

/// Pagination limits applied to caller requests.
///
/// # Invariants
/// - `1 <= default_page_limit <= max_page_limit <= MAX_PAGE_LIMIT_CEILING`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EngineLimits {
    /// Limit used when the request has none.
    default_page_limit: usize,
    /// Largest accepted limit.
    max_page_limit: usize,
}

impl Default for EngineLimits {
    fn default() -> Self {
        Self {
            default_page_limit: DEFAULT_PAGE_LIMIT,
            max_page_limit: DEFAULT_PAGE_LIMIT,
        }
    }
}

impl EngineLimits {
    /// Builds validated limits.
    ///
    /// # Errors
    ///
    /// Returns [`AccessError::Validation`] when the invariants do not hold.
    pub fn new(default_page_limit: usize, max_page_limit: usize) -> Result<Self, AccessError> {
        if max_page_limit == 0 || max_page_limit > MAX_PAGE_LIMIT_CEILING {
            return Err(AccessError::Validation(format!(
                "max_page_limit must be between 1 and {MAX_PAGE_LIMIT_CEILING}"
            )));
        }
        if default_page_limit == 0 || default_page_limit > max_page_limit {
            return Err(AccessError::Validation(
                "default_page_limit must be between 1 and max_page_limit".to_string(),
            ));
        }
        Ok(Self {
            default_page_limit,
            max_page_limit,
        })
    }

    /// Returns the default page limit.
    #[must_use]
    pub const fn default_page_limit(&self) -> usize {
        self.default_page_limit
    }

    /// Returns the maximum page limit.
    #[must_use]
    pub const fn max_page_limit(&self) -> usize {
        self.max_page_limit
    }

    /// Resolves a caller request into a concrete page.
    ///
    /// # Errors
    ///
    /// Returns [`AccessError::Validation`] when the limit is zero or above the maximum.
    pub fn page(&self, request: PageRequest) -> Result<Page, AccessError> {
        let limit = request.limit.unwrap_or(self.default_page_limit);
        if limit == 0 || limit > self.max_page_limit {
            return Err(AccessError::Validation(format!(
                "limit must be between 1 and {}",
                self.max_page_limit
            )));
        }
        Ok(Page::new(request.offset.unwrap_or(0), limit))
    }
}

// ============================================================================
// SECTION: Engine
// ============================================================================

/// Role-scoped access and aggregation engine.
pub struct AccessEngine<S> {
    /// Backing store.
    store: S,
    /// Audit sink receiving one event per call.
    audit: Arc<dyn AccessAuditSink>,
    /// Pagination limits.
    limits: EngineLimits,
}

impl<S> AccessEngine<S>
where
    S: RosterStore,
{
    /// Creates an engine over a store.
    #[must_use]
    pub fn new(store: S, audit: Arc<dyn AccessAuditSink>, limits: EngineLimits) -> Self {
        Self {
            store,
            audit,
            limits,
        }
    }

    /// Returns the backing store.
    #[must_use]
    pub const fn store(&self) -> &S {
        &self.store
    }

    /// Returns the pagination limits.
    #[must_use]
    pub const fn limits(&self) -> &EngineLimits {
        &self.limits
    }

    /// Resolves the actor's scope for an explicit request.
    ///
    /// # Errors
    ///
    /// See [`scope::resolve_scope`].
    pub fn resolve_scope(&self, actor: &Actor, request: ScopeRequest) -> Result<Scope, AccessError> {
        self.audited(actor, "resolve_scope", request, |_| 1, || {
            scope::resolve_scope(&self.store, actor, request)
        })
    }

    /// Returns one page of activity log entries visible to the actor.
    ///
    /// # Errors
    ///
    /// Returns [`AccessError`] for scope violations, invalid pagination or
    /// ranges, and store failures.
    pub fn query_activity_logs(
        &self,
        actor: &Actor,
        filter: &LogFilter,
        page: PageRequest,
    ) -> Result<Vec<ActivityLogEntry>, AccessError> {
        let request = ScopeRequest {
            player_id: filter.player_id,
            team_id: filter.team_id,
        };
        self.audited(actor, "query_activity_logs", request, Vec::len, || {
            let page = self.limits.page(page)?;
            let scope = scope::resolve_scope(&self.store, actor, request)?;
            activity::query_activity_logs(&self.store, &scope, filter, page)
        })
    }

    /// Computes statistics for one player, exercise, and metric.
    ///
    /// # Errors
    ///
    /// Returns [`AccessError`] for scope violations, unknown resources,
    /// invalid input, and store failures.
    pub fn compute_stats(
        &self,
        actor: &Actor,
        player_id: PlayerId,
        exercise_id: ExerciseId,
        metric: MetricKind,
        recorded: TimeRange,
    ) -> Result<SeriesStats, AccessError> {
        let request = ScopeRequest::player(player_id);
        let count = |series: &SeriesStats| series.count;
        self.audited(actor, "compute_stats", request, count, || {
            let scope = scope::resolve_scope(&self.store, actor, request)?;
            stats::compute_stats(&self.store, &scope, player_id, exercise_id, metric, recorded)
        })
    }

    /// Builds the leaderboard for an exercise, optionally limited to a team.
    ///
    /// # Errors
    ///
    /// Returns [`AccessError`] for scope violations, unknown resources, and
    /// store failures.
    pub fn compute_leaderboard(
        &self,
        actor: &Actor,
        exercise_id: ExerciseId,
        team_id: Option<TeamId>,
    ) -> Result<Leaderboard, AccessError> {
        let request = team_id.map_or(ScopeRequest::NONE, ScopeRequest::team);
        let count = |board: &Leaderboard| board.entries.len();
        self.audited(actor, "compute_leaderboard", request, count, || {
            let scope = scope::resolve_scope(&self.store, actor, request)?;
            leaderboard::compute_leaderboard(&self.store, &scope, exercise_id, team_id)
        })
    }

    /// Lists active measurements visible to the actor.
    ///
    /// # Errors
    ///
    /// Returns [`AccessError`] for scope violations, invalid input, and
    /// store failures.
    pub fn list_measurements(
        &self,
        actor: &Actor,
        filter: &MeasurementFilter,
        page: PageRequest,
    ) -> Result<Vec<Measurement>, AccessError> {
        let request = ScopeRequest {
            player_id: filter.player_id,
            team_id: filter.team_id,
        };
        self.audited(actor, "list_measurements", request, Vec::len, || {
            let page = self.limits.page(page)?;
            let scope = scope::resolve_scope(&self.store, actor, request)?;
            measurements::list_measurements(&self.store, &scope, filter, page)
        })
    }

    /// Computes statistics for every exercise the player has measurements for.
    ///
    /// # Errors
    ///
    /// Returns [`AccessError`] for scope violations, invalid ranges, and
    /// store failures.
    pub fn player_overview(
        &self,
        actor: &Actor,
        player_id: PlayerId,
        recorded: TimeRange,
    ) -> Result<PlayerOverview, AccessError> {
        let request = ScopeRequest::player(player_id);
        let count = |overview: &PlayerOverview| overview.exercises.len();
        self.audited(actor, "player_overview", request, count, || {
            let scope = scope::resolve_scope(&self.store, actor, request)?;
            stats::player_overview(&self.store, &scope, player_id, recorded)
        })
    }

    /// Loads one active measurement the actor may access.
    ///
    /// # Errors
    ///
    /// Returns [`AccessError::NotFound`] when the measurement is missing or
    /// soft-deleted, [`AccessError::Forbidden`] when its player is outside
    /// scope, and [`AccessError::Store`] on store failure.
    pub fn authorize_measurement(
        &self,
        actor: &Actor,
        measurement_id: MeasurementId,
    ) -> Result<Measurement, AccessError> {
        self.audited(actor, "authorize_measurement", ScopeRequest::NONE, |_| 1, || {
            let measurement = self
                .store
                .measurement(measurement_id)?
                .filter(|measurement| measurement.is_active)
                .ok_or_else(|| AccessError::NotFound(format!("measurement {measurement_id}")))?;
            scope::authorize_measurement(&self.store, actor, &measurement)?;
            Ok(measurement)
        })
    }

    /// Appends an activity log entry authored by the actor.
    ///
    /// # Errors
    ///
    /// Returns [`AccessError::Validation`] when the entry names a different
    /// author, and [`AccessError::Store`] when the append fails.
    pub fn record_activity(
        &self,
        actor: &Actor,
        entry: NewActivityLog,
    ) -> Result<ActivityLogEntry, AccessError> {
        let request = ScopeRequest {
            player_id: entry.target_player_id,
            team_id: entry.target_team_id,
        };
        self.audited(actor, "record_activity", request, |_| 1, || {
            if entry.user_id != actor.user_id {
                return Err(AccessError::Validation(
                    "activity must be recorded by the acting user".to_string(),
                ));
            }
            Ok(self.store.append_log(entry)?)
        })
    }

    /// Runs an operation and records its audit event.
    fn audited<T>(
        &self,
        actor: &Actor,
        operation: &'static str,
        request: ScopeRequest,
        count: impl FnOnce(&T) -> usize,
        run: impl FnOnce() -> Result<T, AccessError>,
    ) -> Result<T, AccessError> {
        let result = run();
        let mut event = AccessAuditEvent::new(actor.user_id, actor.role(), operation);
        event.requested_player_id = request.player_id;
        event.requested_team_id = request.team_id;
        match &result {
            Ok(value) => event.result_count = Some(count(value)),
            Err(error) => {
                event.outcome = error.outcome_label();
                event.reason = Some(error.to_string());
            }
        }
        self.audit.record(&event);
        result
    }
}
