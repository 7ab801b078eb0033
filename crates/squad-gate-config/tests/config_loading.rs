//! Config loading and wiring tests for squad-gate-config.
// crates/squad-gate-config/tests/config_loading.rs
// =============================================================================
// Module: Config Loading Tests
// Description: Load configs from disk and build engines from them.
// Purpose: Ensure file limits apply and configured components are wired.
// =============================================================================

#![allow(clippy::use_debug, reason = "Test-only diagnostics are permitted.")]

use std::fs;

use squad_gate_config::ConfigError;
use squad_gate_config::ConfiguredStore;
use squad_gate_config::MAX_CONFIG_FILE_SIZE;
use squad_gate_config::SquadGateConfig;
use squad_gate_core::Actor;
use squad_gate_core::LogFilter;
use squad_gate_core::PageRequest;
use squad_gate_core::RosterStore;
use squad_gate_core::UserId;
use tempfile::TempDir;

mod common;

use common::TestResult;
use common::assert_invalid;

#[test]
fn load_reads_explicit_path() -> TestResult {
    let temp = TempDir::new().map_err(|err| err.to_string())?;
    let path = temp.path().join("squad-gate.toml");
    fs::write(&path, "[engine]\ndefault_page_limit = 10\n").map_err(|err| err.to_string())?;
    let config = SquadGateConfig::load(Some(&path)).map_err(|err| err.to_string())?;
    if config.engine.default_page_limit != 10 {
        return Err("default_page_limit not loaded".to_string());
    }
    Ok(())
}

#[test]
fn load_missing_file_is_io_error() -> TestResult {
    let temp = TempDir::new().map_err(|err| err.to_string())?;
    match SquadGateConfig::load(Some(&temp.path().join("absent.toml"))) {
        Err(ConfigError::Io(_)) => Ok(()),
        other => Err(format!("expected io error, got {other:?}")),
    }
}

#[test]
fn load_rejects_oversized_file() -> TestResult {
    let temp = TempDir::new().map_err(|err| err.to_string())?;
    let path = temp.path().join("big.toml");
    let padding = format!("# {}\n", "x".repeat(MAX_CONFIG_FILE_SIZE));
    fs::write(&path, padding).map_err(|err| err.to_string())?;
    assert_invalid(SquadGateConfig::load(Some(&path)), "exceeds size limit")
}

#[test]
fn load_rejects_non_utf8() -> TestResult {
    let temp = TempDir::new().map_err(|err| err.to_string())?;
    let path = temp.path().join("bad.toml");
    fs::write(&path, [0xff_u8, 0xfe, 0x00]).map_err(|err| err.to_string())?;
    assert_invalid(SquadGateConfig::load(Some(&path)), "utf-8")
}

#[test]
fn build_engine_over_sqlite_with_file_audit() -> TestResult {
    let temp = TempDir::new().map_err(|err| err.to_string())?;
    let db = temp.path().join("data").join("roster.db");
    let audit = temp.path().join("audit.log");
    let text = format!(
        "[store]\ntype = \"sqlite\"\npath = {db:?}\n\n[audit]\nsink = \"file\"\npath = {audit:?}\n"
    );
    let config = SquadGateConfig::from_toml(&text).map_err(|err| err.to_string())?;
    let engine = config.build_engine().map_err(|err| err.to_string())?;
    if !matches!(engine.store(), ConfiguredStore::Sqlite(_)) {
        return Err("expected sqlite store".to_string());
    }
    engine.store().readiness().map_err(|err| err.to_string())?;
    let admin = Actor::admin(UserId::from_raw(1).ok_or("nonzero user id")?);
    let entries = engine
        .query_activity_logs(&admin, &LogFilter::default(), PageRequest::default())
        .map_err(|err| err.to_string())?;
    if !entries.is_empty() {
        return Err("fresh store must have no log entries".to_string());
    }
    let written = fs::read_to_string(&audit).map_err(|err| err.to_string())?;
    if written.lines().count() != 1 || !written.contains("\"query_activity_logs\"") {
        return Err(format!("unexpected audit log: {written}"));
    }
    Ok(())
}

#[test]
fn build_engine_defaults_to_memory() -> TestResult {
    let config = common::minimal_config().map_err(|err| err.to_string())?;
    let engine = config.build_engine().map_err(|err| err.to_string())?;
    if !matches!(engine.store(), ConfiguredStore::Memory(_)) {
        return Err("expected memory store".to_string());
    }
    Ok(())
}
