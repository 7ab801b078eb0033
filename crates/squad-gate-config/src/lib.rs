// crates/squad-gate-config/src/lib.rs
// ============================================================================
// Module: Squad Gate Config Library
// Description: Canonical config model, validation, and engine wiring.
// Purpose: Single source of truth for squad-gate.toml semantics.
// Dependencies: squad-gate-core, squad-gate-store-sqlite, serde, toml
// ============================================================================

//! ## Overview
//! `squad-gate-config` defines the configuration model for Squad Gate:
//! pagination limits, the roster store backend, and the access audit sink.
//! Validation is strict and fails closed.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod config;
pub mod wiring;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use config::AuditConfig;
pub use config::AuditSinkType;
pub use config::CONFIG_ENV_VAR;
pub use config::ConfigError;
pub use config::EngineConfig;
pub use config::MAX_CONFIG_FILE_SIZE;
pub use config::SquadGateConfig;
pub use config::StoreConfig;
pub use config::StoreType;
pub use wiring::ConfiguredStore;
