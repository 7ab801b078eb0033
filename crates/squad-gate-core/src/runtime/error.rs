// crates/squad-gate-core/src/runtime/error.rs
// ============================================================================
// Module: Squad Gate Access Errors
// Description: Terminal outcomes returned by the access engine.
// Purpose: Separate permission, existence, and validation failures.
// Dependencies: thiserror
// ============================================================================

//! ## Overview
//! Every engine operation returns [`AccessError`] on failure. The variants are
//! terminal and synchronous; none are retried. Callers map them to transport
//! status codes (403/404/400); storage failures pass through unchanged.
//! Messages carry identifiers only, never descriptions or notes.

// ============================================================================
// SECTION: Imports
// ============================================================================

use thiserror::Error;

use crate::core::TimeError;
use crate::interfaces::StoreError;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Access engine errors.
///
/// # Invariants
/// - `Forbidden` means the resource may exist but is outside the caller's scope.
/// - `NotFound` means the resource does not exist at all.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AccessError {
    /// Explicitly requested resource is outside the caller's scope.
    #[error("forbidden: {0}")]
    Forbidden(String),
    /// Requested resource does not exist.
    #[error("not found: {0}")]
    NotFound(String),
    /// Malformed caller input.
    #[error("validation failed: {0}")]
    Validation(String),
    /// Backing store failure.
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl AccessError {
    /// Returns a stable outcome label for audit records.
    #[must_use]
    pub const fn outcome_label(&self) -> &'static str {
        match self {
            Self::Forbidden(_) => "denied",
            Self::NotFound(_) => "not_found",
            Self::Validation(_) => "invalid",
            Self::Store(_) => "error",
        }
    }
}

impl From<TimeError> for AccessError {
    fn from(error: TimeError) -> Self {
        Self::Validation(error.to_string())
    }
}
