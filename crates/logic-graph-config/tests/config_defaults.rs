//! Config defaults and compiler wiring tests for logic-graph-config.
// crates/logic-graph-config/tests/config_defaults.rs
// =============================================================================
// Module: Config Defaults Tests
// Description: Defaults, the shipped sample config and compiler construction.
// Purpose: Ensure a validated config produces the compiler it describes.
// =============================================================================

#![allow(
    clippy::use_debug,
    clippy::panic_in_result_fn,
    reason = "Test-only output and panic-based assertions are permitted."
)]

use std::path::PathBuf;

use logic_graph::ExemptionRule;
use logic_graph::and;
use logic_graph::and_slot;
use logic_graph::root;
use logic_graph::rule_table;
use logic_graph_config::LogSinkKind;
use logic_graph_config::LogicGraphConfig;

type TestResult = Result<(), String>;

/// Path of the workspace sample config.
fn sample_config() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("..").join("..").join("logic-graph.toml")
}

#[test]
fn empty_config_uses_defaults() -> TestResult {
    let config = LogicGraphConfig::from_toml_str("").map_err(|err| err.to_string())?;
    if config.limits.max_flatten_rounds != 64 {
        return Err(format!("rounds {}", config.limits.max_flatten_rounds));
    }
    if config.logging.sink != LogSinkKind::None || config.logging.path.is_some() {
        return Err("logging should default to none".to_string());
    }
    let policy = config.exemption_policy().map_err(|err| err.to_string())?;
    if !policy.rules().is_empty() {
        return Err("default policy exempts nothing".to_string());
    }
    Ok(())
}

#[test]
fn sample_config_loads_and_exempts_known_sentinels() -> TestResult {
    let config = LogicGraphConfig::load(Some(&sample_config())).map_err(|err| err.to_string())?;
    let policy = config.exemption_policy().map_err(|err| err.to_string())?;
    let expectations = [
        ("done", Some(ExemptionRule::Name("done".to_string()))),
        ("maku tree old man", Some(ExemptionRule::Suffix("old man".to_string()))),
        ("village rupee room", Some(ExemptionRule::Contains("rupee".to_string()))),
        ("eyeglass lake default summer", Some(ExemptionRule::Contains(" default ".to_string()))),
        ("d4 entrance", Some(ExemptionRule::Pattern("d[1-8] entrance".to_string()))),
        ("d1 boss", None),
    ];
    for (name, expected) in expectations {
        let actual = policy.exemption_for(name);
        if actual != expected {
            return Err(format!("{name}: expected {expected:?}, got {actual:?}"));
        }
    }
    Ok(())
}

#[test]
fn configured_compiler_applies_policy_and_limits() -> TestResult {
    let config = LogicGraphConfig::from_toml_str(
        "[exemptions]\nnames = [\"done\"]\n[limits]\nmax_flatten_rounds = 1\n",
    )
    .map_err(|err| err.to_string())?;
    if config.compile_limits().max_flatten_rounds != 1 {
        return Err("limits not carried".to_string());
    }
    let compiled = config
        .compiler()
        .map_err(|err| err.to_string())?
        .with_table(rule_table!("t";
            "start" => root!(),
            "chest" => and_slot!("start"),
            "done" => and!("chest"),
        ))
        .compile()
        .map_err(|err| err.to_string())?;
    if compiled.table().len() != 3 {
        return Err("three nodes expected".to_string());
    }
    Ok(())
}

#[test]
fn file_sink_receives_compile_events() -> TestResult {
    let dir = tempfile::tempdir().map_err(|err| err.to_string())?;
    let log = dir.path().join("compile.jsonl");
    let text = format!("[logging]\nsink = \"file\"\npath = {:?}\n", log.display().to_string());
    let config = LogicGraphConfig::from_toml_str(&text).map_err(|err| err.to_string())?;
    let _ = config
        .compiler()
        .map_err(|err| err.to_string())?
        .with_table(rule_table!("t"; "start" => root!(), "chest" => and_slot!("start")))
        .compile()
        .map_err(|err| err.to_string())?;
    let written = std::fs::read_to_string(&log).map_err(|err| err.to_string())?;
    if !written.contains("\"validation_passed\"") {
        return Err(format!("log missing validation event: {written}"));
    }
    Ok(())
}
