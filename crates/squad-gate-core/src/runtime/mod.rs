// crates/squad-gate-core/src/runtime/mod.rs
// ============================================================================
// Module: Squad Gate Runtime
// Description: Scope resolution, query engines, aggregation, and audit.
// Purpose: Evaluate role-scoped reads against the store interfaces.
// Dependencies: crate::core, crate::interfaces
// ============================================================================

//! ## Overview
//! Runtime components are synchronous and hold no state across calls. Each
//! component branches on the resolved [`crate::core::Scope`] exactly once.

// ============================================================================
// SECTION: Submodules
// ============================================================================

pub mod activity;
pub mod audit;
pub mod engine;
pub mod error;
pub mod leaderboard;
pub mod measurements;
pub mod scope;
pub mod stats;
pub mod store;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use activity::merge_by_id;
pub use activity::query_activity_logs;
pub use audit::AccessAuditEvent;
pub use audit::AccessAuditSink;
pub use audit::FileAuditSink;
pub use audit::NoopAuditSink;
pub use audit::StderrAuditSink;
pub use engine::AccessEngine;
pub use engine::DEFAULT_PAGE_LIMIT;
pub use engine::EngineLimits;
pub use engine::MAX_PAGE_LIMIT_CEILING;
pub use error::AccessError;
pub use leaderboard::Leaderboard;
pub use leaderboard::LeaderboardEntry;
pub use leaderboard::compute_leaderboard;
pub use leaderboard::rank_leaderboard;
pub use measurements::list_measurements;
pub use measurements::parse_player_ids;
pub use measurements::validate_measurement_values;
pub use scope::authorize_measurement;
pub use scope::resolve_scope;
pub use stats::PlayerOverview;
pub use stats::SeriesStats;
pub use stats::compute_series_stats;
pub use stats::compute_stats;
pub use stats::parse_metric_value;
pub use stats::player_overview;
pub use store::InMemoryRosterStore;
