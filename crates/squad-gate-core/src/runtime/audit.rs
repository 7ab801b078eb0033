// crates/squad-gate-core/src/runtime/audit.rs
// ============================================================================
// Module: Squad Gate Access Audit
// Description: Structured audit events for access decisions.
// Purpose: Emit one JSON-lines record per engine call without hard deps.
// Dependencies: serde, serde_json
// ============================================================================

//! ## Overview
//! Each engine facade call records exactly one [`AccessAuditEvent`] through an
//! [`AccessAuditSink`]. Events carry identifiers, the role, the operation name,
//! and the outcome; they never embed log descriptions or measurement notes.
//! Sinks swallow their own I/O failures so auditing never changes an engine
//! result.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fs::File;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::Path;
use std::sync::Mutex;
use std::time::SystemTime;
use std::time::UNIX_EPOCH;

use serde::Serialize;

use crate::core::PlayerId;
use crate::core::Role;
use crate::core::TeamId;
use crate::core::UserId;

// ============================================================================
// SECTION: Events
// ============================================================================

/// Audit record for one access decision.
///
/// # Invariants
/// - `event` is always `"access_decision"`.
/// - `result_count` is present only when the call succeeded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AccessAuditEvent {
    /// Event discriminator.
    pub event: &'static str,
    /// Wall-clock timestamp in unix milliseconds.
    pub timestamp_ms: u64,
    /// Calling account.
    pub actor_user_id: UserId,
    /// Calling role.
    pub role: Role,
    /// Engine operation name.
    pub operation: &'static str,
    /// Outcome label (`allowed`, `denied`, `not_found`, `invalid`, `error`).
    pub outcome: &'static str,
    /// Error message when the call failed.
    pub reason: Option<String>,
    /// Explicitly requested player, if any.
    pub requested_player_id: Option<PlayerId>,
    /// Explicitly requested team, if any.
    pub requested_team_id: Option<TeamId>,
    /// Number of records returned on success.
    pub result_count: Option<usize>,
}

impl AccessAuditEvent {
    /// Builds an event stamped with the current wall-clock time.
    #[must_use]
    pub fn new(actor_user_id: UserId, role: Role, operation: &'static str) -> Self {
        Self {
            event: "access_decision",
            timestamp_ms: now_millis(),
            actor_user_id,
            role,
            operation,
            outcome: "allowed",
            reason: None,
            requested_player_id: None,
            requested_team_id: None,
            result_count: None,
        }
    }
}

/// Returns the current unix time in milliseconds, or zero before the epoch.
fn now_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |duration| u64::try_from(duration.as_millis()).unwrap_or(u64::MAX))
}

// ============================================================================
// SECTION: Sinks
// ============================================================================

/// Audit sink for access decisions.
pub trait AccessAuditSink: Send + Sync {
    /// Records an access decision.
    fn record(&self, event: &AccessAuditEvent);
}

/// Writes JSON lines to stderr.
pub struct StderrAuditSink;

impl AccessAuditSink for StderrAuditSink {
    fn record(&self, event: &AccessAuditEvent) {
        if let Ok(line) = serde_json::to_string(event) {
            let mut stderr = std::io::stderr().lock();
            let _ = writeln!(stderr, "{line}");
        }
    }
}

/// Appends JSON lines to a file.
pub struct FileAuditSink {
    /// Open file handle, append mode.
    file: Mutex<File>,
}

impl FileAuditSink {
    /// Opens or creates the audit log for appending.
    ///
    /// # Errors
    ///
    /// Returns [`std::io::Error`] when the file cannot be opened.
    pub fn new(path: &Path) -> std::io::Result<Self> {
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        Ok(Self {
            file: Mutex::new(file),
        })
    }
}

impl AccessAuditSink for FileAuditSink {
    fn record(&self, event: &AccessAuditEvent) {
        if let Ok(line) = serde_json::to_string(event)
            && let Ok(mut file) = self.file.lock()
        {
            let _ = writeln!(file, "{line}");
            let _ = file.flush();
        }
    }
}

/// Discards all events.
pub struct NoopAuditSink;

impl AccessAuditSink for NoopAuditSink {
    fn record(&self, _event: &AccessAuditEvent) {}
}
