// crates/logic-graph-config/src/config.rs
// ============================================================================
// Module: Logic Graph Configuration
// Description: Configuration loading and validation for the rule compiler.
// Purpose: Provide strict, fail-closed config parsing with hard limits.
// Dependencies: logic-graph, serde, thiserror, toml
// ============================================================================

//! ## Overview
//! Configuration is loaded from a TOML file with strict size and path limits.
//! The file names the dead-end exemption allow-list, compiler safety limits
//! and where compile events go. Invalid configuration fails closed: a bad
//! pattern or an empty affix is an error, never a silent no-op.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::env;
use std::fs;
use std::path::Path;
use std::path::PathBuf;
use std::sync::Arc;

use logic_graph::CompileLimits;
use logic_graph::CompileSink;
use logic_graph::ExemptionPolicy;
use logic_graph::FileCompileSink;
use logic_graph::LogicCompiler;
use logic_graph::NoopCompileSink;
use logic_graph::StderrCompileSink;
use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Default configuration filename when no path is specified.
const DEFAULT_CONFIG_NAME: &str = "logic-graph.toml";
/// Environment variable used to override the config path.
pub const CONFIG_ENV_VAR: &str = "LOGIC_GRAPH_CONFIG";
/// Maximum configuration file size in bytes.
pub(crate) const MAX_CONFIG_FILE_SIZE: usize = 1024 * 1024;
/// Maximum length of a single path component.
pub(crate) const MAX_PATH_COMPONENT_LENGTH: usize = 255;
/// Maximum total path length.
pub(crate) const MAX_TOTAL_PATH_LENGTH: usize = 4096;
/// Maximum entries per exemption list.
pub(crate) const MAX_EXEMPTION_ENTRIES: usize = 1024;
/// Maximum length of one exemption entry.
pub(crate) const MAX_EXEMPTION_ENTRY_LENGTH: usize = 256;
/// Default flattening round cap.
const DEFAULT_MAX_FLATTEN_ROUNDS: usize = logic_graph::DEFAULT_MAX_FLATTEN_ROUNDS;
/// Smallest accepted flattening round cap.
pub(crate) const MIN_MAX_FLATTEN_ROUNDS: usize = 1;
/// Largest accepted flattening round cap.
pub(crate) const MAX_MAX_FLATTEN_ROUNDS: usize = 4096;

// ============================================================================
// SECTION: Configuration Types
// ============================================================================

/// Logic graph compiler configuration.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LogicGraphConfig {
    /// Dead-end exemption allow-list.
    #[serde(default)]
    pub exemptions: ExemptionsConfig,
    /// Compiler safety limits.
    #[serde(default)]
    pub limits: LimitsConfig,
    /// Compile event destination.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl LogicGraphConfig {
    /// Loads configuration from disk using the default resolution rules.
    ///
    /// Resolution order: `path`, then `LOGIC_GRAPH_CONFIG`, then
    /// `logic-graph.toml` in the working directory.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when loading or validation fails.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let resolved = resolve_path(path, env::var(CONFIG_ENV_VAR).ok())?;
        validate_path(&resolved)?;
        let bytes = fs::read(&resolved).map_err(|err| ConfigError::Io(err.to_string()))?;
        if bytes.len() > MAX_CONFIG_FILE_SIZE {
            return Err(ConfigError::Invalid("config file exceeds size limit".to_string()));
        }
        let content = std::str::from_utf8(&bytes)
            .map_err(|_| ConfigError::Invalid("config file must be utf-8".to_string()))?;
        Self::from_toml_str(content)
    }

    /// Parses and validates configuration text.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when parsing or validation fails.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: Self =
            toml::from_str(content).map_err(|err| ConfigError::Parse(err.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Validates the configuration for internal consistency.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when configuration is invalid.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.exemptions.validate()?;
        self.limits.validate()?;
        self.logging.validate()?;
        Ok(())
    }

    /// Builds the configured exemption policy.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] when a pattern does not compile.
    pub fn exemption_policy(&self) -> Result<ExemptionPolicy, ConfigError> {
        self.exemptions.policy()
    }

    /// Returns the configured compiler limits.
    #[must_use]
    pub const fn compile_limits(&self) -> CompileLimits {
        CompileLimits {
            max_flatten_rounds: self.limits.max_flatten_rounds,
        }
    }

    /// Opens the configured compile event sink.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] when the log file cannot be opened.
    pub fn build_sink(&self) -> Result<Arc<dyn CompileSink>, ConfigError> {
        self.logging.build_sink()
    }

    /// Builds a compiler carrying the configured policy, limits and sink.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when the policy or sink cannot be built.
    pub fn compiler(&self) -> Result<LogicCompiler, ConfigError> {
        Ok(LogicCompiler::new()
            .with_policy(self.exemption_policy()?)
            .with_limits(self.compile_limits())
            .with_sink(self.build_sink()?))
    }
}

// ============================================================================
// SECTION: Exemptions
// ============================================================================

/// Names allowed to go unreferenced.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ExemptionsConfig {
    /// Exact node names.
    #[serde(default)]
    pub names: Vec<String>,
    /// Name prefixes.
    #[serde(default)]
    pub prefixes: Vec<String>,
    /// Name suffixes.
    #[serde(default)]
    pub suffixes: Vec<String>,
    /// Name substrings.
    #[serde(default)]
    pub contains: Vec<String>,
    /// Regular expressions matched anywhere in the name.
    #[serde(default)]
    pub patterns: Vec<String>,
}

impl ExemptionsConfig {
    /// Validates exemption lists.
    fn validate(&self) -> Result<(), ConfigError> {
        let lists: [(&str, &[String]); 5] = [
            ("names", &self.names),
            ("prefixes", &self.prefixes),
            ("suffixes", &self.suffixes),
            ("contains", &self.contains),
            ("patterns", &self.patterns),
        ];
        for (field, entries) in lists {
            if entries.len() > MAX_EXEMPTION_ENTRIES {
                return Err(ConfigError::Invalid(format!(
                    "exemptions.{field} exceeds {MAX_EXEMPTION_ENTRIES} entries"
                )));
            }
            for entry in entries {
                if entry.is_empty() {
                    return Err(ConfigError::Invalid(format!(
                        "exemptions.{field} entries must be non-empty"
                    )));
                }
                if entry.len() > MAX_EXEMPTION_ENTRY_LENGTH {
                    return Err(ConfigError::Invalid(format!(
                        "exemptions.{field} entry exceeds max length"
                    )));
                }
            }
        }
        self.policy().map(|_| ())
    }

    /// Builds an exemption policy from the lists.
    fn policy(&self) -> Result<ExemptionPolicy, ConfigError> {
        let mut policy = ExemptionPolicy::new();
        for name in &self.names {
            policy = policy.name(name.as_str());
        }
        for prefix in &self.prefixes {
            policy = policy.prefix(prefix.as_str());
        }
        for suffix in &self.suffixes {
            policy = policy.suffix(suffix.as_str());
        }
        for needle in &self.contains {
            policy = policy.contains(needle.as_str());
        }
        for pattern in &self.patterns {
            policy = policy
                .pattern(pattern)
                .map_err(|err| ConfigError::Invalid(format!("exemptions.patterns: {err}")))?;
        }
        policy.check().map_err(|err| ConfigError::Invalid(format!("exemptions: {err}")))?;
        Ok(policy)
    }
}

// ============================================================================
// SECTION: Limits
// ============================================================================

/// Compiler safety limits.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct LimitsConfig {
    /// Flattening round cap; raised to the deepest inline nesting of the input.
    #[serde(default = "default_max_flatten_rounds")]
    pub max_flatten_rounds: usize,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_flatten_rounds: default_max_flatten_rounds(),
        }
    }
}

impl LimitsConfig {
    /// Validates limit ranges.
    fn validate(&self) -> Result<(), ConfigError> {
        if !(MIN_MAX_FLATTEN_ROUNDS ..= MAX_MAX_FLATTEN_ROUNDS).contains(&self.max_flatten_rounds) {
            return Err(ConfigError::Invalid(format!(
                "limits.max_flatten_rounds must be between {MIN_MAX_FLATTEN_ROUNDS} and \
                 {MAX_MAX_FLATTEN_ROUNDS}"
            )));
        }
        Ok(())
    }
}

/// Default flattening round cap.
const fn default_max_flatten_rounds() -> usize {
    DEFAULT_MAX_FLATTEN_ROUNDS
}

// ============================================================================
// SECTION: Logging
// ============================================================================

/// Compile event destinations.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LogSinkKind {
    /// Drop events.
    #[default]
    None,
    /// JSON lines on stderr.
    Stderr,
    /// JSON lines appended to `logging.path`.
    File,
}

/// Compile event logging configuration.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct LoggingConfig {
    /// Event destination.
    #[serde(default)]
    pub sink: LogSinkKind,
    /// Log file path, required for the file sink.
    #[serde(default)]
    pub path: Option<String>,
}

impl LoggingConfig {
    /// Validates sink selection against the path.
    fn validate(&self) -> Result<(), ConfigError> {
        match (self.sink, &self.path) {
            (LogSinkKind::File, None) => Err(ConfigError::Invalid(
                "logging.sink = \"file\" requires logging.path".to_string(),
            )),
            (LogSinkKind::File, Some(path)) => validate_path_string("logging.path", path),
            (LogSinkKind::None | LogSinkKind::Stderr, Some(_)) => Err(ConfigError::Invalid(
                "logging.path is only valid with logging.sink = \"file\"".to_string(),
            )),
            (LogSinkKind::None | LogSinkKind::Stderr, None) => Ok(()),
        }
    }

    /// Opens the configured sink.
    fn build_sink(&self) -> Result<Arc<dyn CompileSink>, ConfigError> {
        match (self.sink, &self.path) {
            (LogSinkKind::Stderr, _) => Ok(Arc::new(StderrCompileSink)),
            (LogSinkKind::File, Some(path)) => {
                let sink = FileCompileSink::new(Path::new(path.trim()))
                    .map_err(|err| ConfigError::Io(err.to_string()))?;
                Ok(Arc::new(sink))
            }
            (LogSinkKind::File, None) => Err(ConfigError::Invalid(
                "logging.sink = \"file\" requires logging.path".to_string(),
            )),
            (LogSinkKind::None, _) => Ok(Arc::new(NoopCompileSink)),
        }
    }
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Configuration errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// I/O failure while reading configuration.
    #[error("config io error: {0}")]
    Io(String),
    /// TOML parsing error.
    #[error("config parse error: {0}")]
    Parse(String),
    /// Invalid configuration data.
    #[error("invalid config: {0}")]
    Invalid(String),
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Resolves the config path from the argument or environment defaults.
fn resolve_path(path: Option<&Path>, env_path: Option<String>) -> Result<PathBuf, ConfigError> {
    if let Some(path) = path {
        return Ok(path.to_path_buf());
    }
    if let Some(env_path) = env_path {
        if env_path.len() > MAX_TOTAL_PATH_LENGTH {
            return Err(ConfigError::Invalid("config path exceeds max length".to_string()));
        }
        return Ok(PathBuf::from(env_path));
    }
    Ok(PathBuf::from(DEFAULT_CONFIG_NAME))
}

/// Validates the resolved path against length limits.
fn validate_path(path: &Path) -> Result<(), ConfigError> {
    let text = path.to_string_lossy();
    if text.len() > MAX_TOTAL_PATH_LENGTH {
        return Err(ConfigError::Invalid("config path exceeds max length".to_string()));
    }
    for component in path.components() {
        let value = component.as_os_str().to_string_lossy();
        if value.len() > MAX_PATH_COMPONENT_LENGTH {
            return Err(ConfigError::Invalid("config path component too long".to_string()));
        }
    }
    Ok(())
}

/// Validates a path string against length constraints.
fn validate_path_string(field: &str, value: &str) -> Result<(), ConfigError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ConfigError::Invalid(format!("{field} must be non-empty")));
    }
    if trimmed.len() > MAX_TOTAL_PATH_LENGTH {
        return Err(ConfigError::Invalid(format!("{field} exceeds max length")));
    }
    for component in Path::new(trimmed).components() {
        if component.as_os_str().len() > MAX_PATH_COMPONENT_LENGTH {
            return Err(ConfigError::Invalid(format!("{field} path component too long")));
        }
    }
    Ok(())
}
