//! Config load validation tests for logic-graph-config.
// crates/logic-graph-config/tests/load_validation.rs
// =============================================================================
// Module: Config Load Validation Tests
// Description: Validate config loading guards (path, size, encoding, fields).
// Purpose: Ensure config input handling is strict and fail-closed.
// =============================================================================

#![allow(
    clippy::use_debug,
    clippy::panic_in_result_fn,
    reason = "Test-only output and panic-based assertions are permitted."
)]

use std::io::Write;
use std::path::Path;

use logic_graph_config::ConfigError;
use logic_graph_config::LogicGraphConfig;
use tempfile::NamedTempFile;

type TestResult = Result<(), String>;

fn assert_invalid(result: Result<LogicGraphConfig, ConfigError>, needle: &str) -> TestResult {
    match result {
        Err(error) => {
            let message = error.to_string();
            if message.contains(needle) {
                Ok(())
            } else {
                Err(format!("error {message} did not contain {needle}"))
            }
        }
        Ok(_) => Err("expected invalid config load".to_string()),
    }
}

fn write_config(content: &str) -> Result<NamedTempFile, String> {
    let mut file = NamedTempFile::new().map_err(|err| err.to_string())?;
    file.write_all(content.as_bytes()).map_err(|err| err.to_string())?;
    Ok(file)
}

#[test]
fn load_rejects_path_too_long() -> TestResult {
    let long_path = "a".repeat(5_000);
    assert_invalid(
        LogicGraphConfig::load(Some(Path::new(&long_path))),
        "config path exceeds max length",
    )
}

#[test]
fn load_rejects_path_component_too_long() -> TestResult {
    let long_component = "a".repeat(300);
    assert_invalid(
        LogicGraphConfig::load(Some(Path::new(&long_component))),
        "config path component too long",
    )
}

#[test]
fn load_rejects_oversized_file() -> TestResult {
    let file = write_config(&"#".repeat(1_048_577))?;
    assert_invalid(LogicGraphConfig::load(Some(file.path())), "config file exceeds size limit")
}

#[test]
fn load_rejects_non_utf8_file() -> TestResult {
    let mut file = NamedTempFile::new().map_err(|err| err.to_string())?;
    file.write_all(&[0xFF, 0xFE, 0xFF]).map_err(|err| err.to_string())?;
    assert_invalid(LogicGraphConfig::load(Some(file.path())), "config file must be utf-8")
}

#[test]
fn load_reports_missing_file_as_io() -> TestResult {
    let dir = tempfile::tempdir().map_err(|err| err.to_string())?;
    match LogicGraphConfig::load(Some(&dir.path().join("absent.toml"))) {
        Err(ConfigError::Io(_)) => Ok(()),
        other => Err(format!("expected io error, got {other:?}")),
    }
}

#[test]
fn load_rejects_unknown_fields() -> TestResult {
    let file = write_config("[exemptions]\nsufixes = [\" owl\"]\n")?;
    match LogicGraphConfig::load(Some(file.path())) {
        Err(ConfigError::Parse(message)) if message.contains("sufixes") => Ok(()),
        other => Err(format!("expected parse error, got {other:?}")),
    }
}

#[test]
fn load_rejects_invalid_pattern() -> TestResult {
    let file = write_config("[exemptions]\npatterns = [\"d[1-8\"]\n")?;
    assert_invalid(LogicGraphConfig::load(Some(file.path())), "exemptions.patterns")
}

#[test]
fn load_rejects_empty_exemption_entry() -> TestResult {
    let file = write_config("[exemptions]\nprefixes = [\"\"]\n")?;
    assert_invalid(
        LogicGraphConfig::load(Some(file.path())),
        "exemptions.prefixes entries must be non-empty",
    )
}

#[test]
fn load_rejects_out_of_range_rounds() -> TestResult {
    for rounds in ["0", "4097"] {
        let file = write_config(&format!("[limits]\nmax_flatten_rounds = {rounds}\n"))?;
        assert_invalid(LogicGraphConfig::load(Some(file.path())), "limits.max_flatten_rounds")?;
    }
    Ok(())
}

#[test]
fn load_rejects_file_sink_without_path() -> TestResult {
    let file = write_config("[logging]\nsink = \"file\"\n")?;
    assert_invalid(LogicGraphConfig::load(Some(file.path())), "requires logging.path")
}

#[test]
fn load_rejects_path_without_file_sink() -> TestResult {
    let file = write_config("[logging]\nsink = \"stderr\"\npath = \"compile.jsonl\"\n")?;
    assert_invalid(LogicGraphConfig::load(Some(file.path())), "only valid with logging.sink")
}
