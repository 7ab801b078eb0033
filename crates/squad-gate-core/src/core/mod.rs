// crates/squad-gate-core/src/core/mod.rs
// ============================================================================
// Module: Squad Gate Core Types
// Description: Canonical identifiers, records, scopes, and query predicates.
// Purpose: Provide stable, serializable types shared by engines and stores.
// Dependencies: serde, time
// ============================================================================

//! ## Overview
//! Core types define the read model, the resolved access scope, and the
//! declarative queries stores execute. They are the single source of truth
//! for any derived API surface.

// ============================================================================
// SECTION: Submodules
// ============================================================================

pub mod identifiers;
pub mod metric;
pub mod model;
pub mod query;
pub mod scope;
pub mod time;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use identifiers::CoachId;
pub use identifiers::ExerciseId;
pub use identifiers::LogEntryId;
pub use identifiers::MeasurementId;
pub use identifiers::PlayerId;
pub use identifiers::TeamId;
pub use identifiers::UserId;
pub use metric::BetterDirection;
pub use metric::DIRECTION_TABLE;
pub use metric::MetricKind;
pub use metric::Trend;
pub use model::ActionKind;
pub use model::ActivityLogEntry;
pub use model::Actor;
pub use model::ActorProfile;
pub use model::Exercise;
pub use model::ExerciseMetric;
pub use model::Measurement;
pub use model::MetricValue;
pub use model::NewActivityLog;
pub use model::Role;
pub use model::Team;
pub use query::LogFilter;
pub use query::LogQuery;
pub use query::MeasurementFilter;
pub use query::MeasurementQuery;
pub use query::Page;
pub use query::PageRequest;
pub use query::SeriesPoint;
pub use query::TargetScope;
pub use scope::Scope;
pub use scope::ScopeRequest;
pub use scope::ScopedSets;
pub use scope::SelfScope;
pub use time::TimeError;
pub use time::TimeRange;
pub use time::Timestamp;
