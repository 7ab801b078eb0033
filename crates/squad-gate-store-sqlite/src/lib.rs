// crates/squad-gate-store-sqlite/src/lib.rs
// ============================================================================
// Module: Squad Gate SQLite Store
// Description: Durable roster store backed by SQLite.
// Purpose: Expose the SQLite implementation of the core roster interfaces.
// Dependencies: squad-gate-core, rusqlite
// ============================================================================

//! ## Overview
//! `SQLite` implementation of the Squad Gate roster, measurement, and activity
//! log interfaces. Schema versions are checked on open and unknown versions
//! fail closed.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod store;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use store::DEFAULT_BUSY_TIMEOUT_MS;
pub use store::SCHEMA_VERSION;
pub use store::SqliteRosterStore;
pub use store::SqliteStoreConfig;
pub use store::SqliteStoreError;
pub use store::SqliteStoreMode;
pub use store::SqliteSyncMode;
