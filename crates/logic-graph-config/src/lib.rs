// crates/logic-graph-config/src/lib.rs
// ============================================================================
// Module: Logic Graph Config Library
// Description: Configuration model and validation for the rule compiler.
// Purpose: Single source of truth for logic-graph.toml semantics.
// Dependencies: logic-graph, serde, toml
// ============================================================================

//! ## Overview
//! `logic-graph-config` loads `logic-graph.toml`: the dead-end exemption
//! allow-list, compiler limits and compile event logging. Validation is
//! strict and fail-closed, and a validated config builds a ready
//! [`logic_graph::LogicCompiler`].

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod config;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use config::CONFIG_ENV_VAR;
pub use config::ConfigError;
pub use config::ExemptionsConfig;
pub use config::LimitsConfig;
pub use config::LogSinkKind;
pub use config::LoggingConfig;
pub use config::LogicGraphConfig;
