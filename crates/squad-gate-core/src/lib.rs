// crates/squad-gate-core/src/lib.rs
// ============================================================================
// Module: Squad Gate Core
// Description: Role-scoped data access and aggregation engine.
// Purpose: Decide which roster records a caller may see and aggregate them.
// Dependencies: serde, serde_json, thiserror, time
// ============================================================================

//! ## Overview
//! Squad Gate sits between an HTTP layer and externally owned roster storage.
//! For every request it resolves the caller's [`Scope`], then answers activity
//! log, statistics, leaderboard, and measurement reads within that scope.
//! Invariants:
//! - An explicit identifier outside scope is [`AccessError::Forbidden`]; an
//!   absent identifier narrows silently.
//! - An empty coach scope yields empty results, never unrestricted ones.
//! - Better-direction decisions come from [`core::DIRECTION_TABLE`] only.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod core;
pub mod interfaces;
pub mod runtime;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use crate::core::CoachId;
pub use crate::core::ExerciseId;
pub use crate::core::LogEntryId;
pub use crate::core::MeasurementId;
pub use crate::core::PlayerId;
pub use crate::core::TeamId;
pub use crate::core::UserId;
pub use crate::core::BetterDirection;
pub use crate::core::DIRECTION_TABLE;
pub use crate::core::MetricKind;
pub use crate::core::Trend;
pub use crate::core::ActionKind;
pub use crate::core::ActivityLogEntry;
pub use crate::core::Actor;
pub use crate::core::ActorProfile;
pub use crate::core::Exercise;
pub use crate::core::ExerciseMetric;
pub use crate::core::Measurement;
pub use crate::core::MetricValue;
pub use crate::core::NewActivityLog;
pub use crate::core::Role;
pub use crate::core::Team;
pub use crate::core::LogFilter;
pub use crate::core::LogQuery;
pub use crate::core::MeasurementFilter;
pub use crate::core::MeasurementQuery;
pub use crate::core::Page;
pub use crate::core::PageRequest;
pub use crate::core::SeriesPoint;
pub use crate::core::TargetScope;
pub use crate::core::Scope;
pub use crate::core::ScopeRequest;
pub use crate::core::ScopedSets;
pub use crate::core::SelfScope;
pub use crate::core::TimeError;
pub use crate::core::TimeRange;
pub use crate::core::Timestamp;
pub use crate::interfaces::ActivityLogStore;
pub use crate::interfaces::MeasurementStore;
pub use crate::interfaces::MembershipReader;
pub use crate::interfaces::RosterStore;
pub use crate::interfaces::StoreError;
pub use crate::runtime::AccessAuditEvent;
pub use crate::runtime::AccessAuditSink;
pub use crate::runtime::AccessEngine;
pub use crate::runtime::AccessError;
pub use crate::runtime::DEFAULT_PAGE_LIMIT;
pub use crate::runtime::EngineLimits;
pub use crate::runtime::FileAuditSink;
pub use crate::runtime::InMemoryRosterStore;
pub use crate::runtime::Leaderboard;
pub use crate::runtime::LeaderboardEntry;
pub use crate::runtime::MAX_PAGE_LIMIT_CEILING;
pub use crate::runtime::NoopAuditSink;
pub use crate::runtime::PlayerOverview;
pub use crate::runtime::SeriesStats;
pub use crate::runtime::StderrAuditSink;
