// crates/logic-graph/src/exemption.rs
// ============================================================================
// Module: Dead-End Exemption Policy
// Description: Explicit allow-list of nodes that may go unreferenced.
// Purpose: Keep exemptions reviewable instead of buried in the validator.
// Dependencies: regex_lite, thiserror
// ============================================================================

//! ## Overview
//! Some nodes exist only to be wired up after compilation: goal sentinels,
//! default-season facts, cost bookkeeping, cosmetic cross references. They are
//! legitimately unreferenced inside the rule set. The policy names them
//! explicitly through exact names, affixes, substrings, or patterns, and
//! reports which rule matched so every exemption can be audited.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeSet;
use std::fmt;

use regex_lite::Regex;
use thiserror::Error;

use crate::flatten::FlatTable;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Errors raised while building an exemption policy.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExemptionError {
    /// A pattern failed to compile.
    #[error("invalid exemption pattern `{pattern}`: {message}")]
    InvalidPattern {
        /// Pattern source text.
        pattern: String,
        /// Compiler diagnostic.
        message: String,
    },
    /// An empty string was supplied where it would exempt everything.
    #[error("empty exemption {field} entry")]
    Empty {
        /// Which list held the empty entry.
        field: &'static str,
    },
}

// ============================================================================
// SECTION: Rules
// ============================================================================

/// The policy entry that exempted a node.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub enum ExemptionRule {
    /// Exact name match.
    Name(String),
    /// Name starts with the prefix.
    Prefix(String),
    /// Name ends with the suffix.
    Suffix(String),
    /// Name contains the substring.
    Contains(String),
    /// Name matches the pattern.
    Pattern(String),
}

impl fmt::Display for ExemptionRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Name(value) => write!(f, "name `{value}`"),
            Self::Prefix(value) => write!(f, "prefix `{value}`"),
            Self::Suffix(value) => write!(f, "suffix `{value}`"),
            Self::Contains(value) => write!(f, "substring `{value}`"),
            Self::Pattern(value) => write!(f, "pattern `{value}`"),
        }
    }
}

// ============================================================================
// SECTION: Policy
// ============================================================================

/// Allow-list of names exempt from the dead-end check.
#[derive(Debug, Clone, Default)]
pub struct ExemptionPolicy {
    /// Exact names.
    names: BTreeSet<String>,
    /// Name prefixes.
    prefixes: Vec<String>,
    /// Name suffixes.
    suffixes: Vec<String>,
    /// Name substrings.
    contains: Vec<String>,
    /// Compiled patterns.
    patterns: Vec<Regex>,
}

impl ExemptionPolicy {
    /// Creates a policy that exempts nothing.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Exempts an exact name.
    #[must_use]
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.names.insert(name.into());
        self
    }

    /// Exempts every name starting with `prefix`.
    #[must_use]
    pub fn prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefixes.push(prefix.into());
        self
    }

    /// Exempts every name ending with `suffix`.
    #[must_use]
    pub fn suffix(mut self, suffix: impl Into<String>) -> Self {
        self.suffixes.push(suffix.into());
        self
    }

    /// Exempts every name containing `needle`.
    #[must_use]
    pub fn contains(mut self, needle: impl Into<String>) -> Self {
        self.contains.push(needle.into());
        self
    }

    /// Exempts every name matching `pattern`.
    ///
    /// # Errors
    ///
    /// Returns [`ExemptionError::InvalidPattern`] when the pattern does not compile.
    pub fn pattern(mut self, pattern: &str) -> Result<Self, ExemptionError> {
        let regex = Regex::new(pattern).map_err(|err| ExemptionError::InvalidPattern {
            pattern: pattern.to_string(),
            message: err.to_string(),
        })?;
        self.patterns.push(regex);
        Ok(self)
    }

    /// Rejects empty affix or substring entries, which would exempt every node.
    ///
    /// # Errors
    ///
    /// Returns [`ExemptionError::Empty`] naming the offending list.
    pub fn check(&self) -> Result<(), ExemptionError> {
        let lists: [(&'static str, &[String]); 3] =
            [("prefix", &self.prefixes), ("suffix", &self.suffixes), ("contains", &self.contains)];
        for (field, entries) in lists {
            if entries.iter().any(String::is_empty) {
                return Err(ExemptionError::Empty {
                    field,
                });
            }
        }
        if self.names.iter().any(String::is_empty) {
            return Err(ExemptionError::Empty {
                field: "name",
            });
        }
        Ok(())
    }

    /// Returns the first rule exempting `name`, checking exact names first.
    #[must_use]
    pub fn exemption_for(&self, name: &str) -> Option<ExemptionRule> {
        if self.names.contains(name) {
            return Some(ExemptionRule::Name(name.to_string()));
        }
        if let Some(prefix) = self.prefixes.iter().find(|prefix| name.starts_with(prefix.as_str()))
        {
            return Some(ExemptionRule::Prefix(prefix.clone()));
        }
        if let Some(suffix) = self.suffixes.iter().find(|suffix| name.ends_with(suffix.as_str())) {
            return Some(ExemptionRule::Suffix(suffix.clone()));
        }
        if let Some(needle) = self.contains.iter().find(|needle| name.contains(needle.as_str())) {
            return Some(ExemptionRule::Contains(needle.clone()));
        }
        self.patterns
            .iter()
            .find(|regex| regex.is_match(name))
            .map(|regex| ExemptionRule::Pattern(regex.as_str().to_string()))
    }

    /// Returns true when `name` is exempt.
    #[must_use]
    pub fn is_exempt(&self, name: &str) -> bool {
        self.exemption_for(name).is_some()
    }

    /// Every rule in the policy.
    #[must_use]
    pub fn rules(&self) -> Vec<ExemptionRule> {
        let mut rules = Vec::new();
        rules.extend(self.names.iter().cloned().map(ExemptionRule::Name));
        rules.extend(self.prefixes.iter().cloned().map(ExemptionRule::Prefix));
        rules.extend(self.suffixes.iter().cloned().map(ExemptionRule::Suffix));
        rules.extend(self.contains.iter().cloned().map(ExemptionRule::Contains));
        rules.extend(
            self.patterns.iter().map(|regex| ExemptionRule::Pattern(regex.as_str().into())),
        );
        rules
    }

    /// Rules that match no defined node in `table`; candidates for removal.
    #[must_use]
    pub fn unused_rules(&self, table: &FlatTable) -> Vec<ExemptionRule> {
        let names: Vec<&str> = table.defined().map(|(symbol, _)| table.name(symbol)).collect();
        let mut unused = Vec::new();
        for name in &self.names {
            if !names.contains(&name.as_str()) {
                unused.push(ExemptionRule::Name(name.clone()));
            }
        }
        for prefix in &self.prefixes {
            if !names.iter().any(|name| name.starts_with(prefix.as_str())) {
                unused.push(ExemptionRule::Prefix(prefix.clone()));
            }
        }
        for suffix in &self.suffixes {
            if !names.iter().any(|name| name.ends_with(suffix.as_str())) {
                unused.push(ExemptionRule::Suffix(suffix.clone()));
            }
        }
        for needle in &self.contains {
            if !names.iter().any(|name| name.contains(needle.as_str())) {
                unused.push(ExemptionRule::Contains(needle.clone()));
            }
        }
        for regex in &self.patterns {
            if !names.iter().any(|name| regex.is_match(name)) {
                unused.push(ExemptionRule::Pattern(regex.as_str().to_string()));
            }
        }
        unused
    }
}
