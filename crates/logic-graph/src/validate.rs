// crates/logic-graph/src/validate.rs
// ============================================================================
// Module: Structural Validation
// Description: Missing-parent and dead-end checks over a flattened table.
// Purpose: Report every structural defect in one pass before freezing.
// Dependencies: crate::{exemption, flatten}
// ============================================================================

//! ## Overview
//! Both checks run over every defined node and all violations are collected,
//! so a rule author sees the full defect list per compilation attempt.
//!
//! - Missing parents: a non-`Root` node with an empty parent list.
//! - Dead end: a non-slot node that no other node names as a parent and that
//!   the [`ExemptionPolicy`] does not cover.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;

use crate::exemption::ExemptionPolicy;
use crate::flatten::FlatTable;

// ============================================================================
// SECTION: Issues
// ============================================================================

/// Which structural invariant a node violates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum IssueKind {
    /// Non-root node without parents.
    MissingParents,
    /// Non-slot node that nothing references.
    DeadEnd,
}

impl IssueKind {
    /// Invariant wording used in reports.
    #[must_use]
    pub const fn describe(self) -> &'static str {
        match self {
            Self::MissingParents => "non-root node has no parents",
            Self::DeadEnd => "non-slot node is never referenced as a parent",
        }
    }
}

/// One structural violation.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct ValidationIssue {
    /// Offending node.
    pub node: String,
    /// Violated invariant.
    pub kind: IssueKind,
    /// Table that defined the node.
    pub source: String,
}

impl fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "node `{}` ({}): {}", self.node, self.source, self.kind.describe())
    }
}

/// Every violation found in one validation run.
///
/// # Invariants
/// - Non-empty when returned as an error.
/// - Sorted by node name, then issue kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationReport {
    /// Collected issues.
    issues: Vec<ValidationIssue>,
}

impl ValidationReport {
    /// All issues, sorted.
    #[must_use]
    pub fn issues(&self) -> &[ValidationIssue] {
        &self.issues
    }

    /// Number of issues.
    #[must_use]
    pub fn len(&self) -> usize {
        self.issues.len()
    }

    /// Returns true when there are no issues.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.issues.is_empty()
    }

    /// Returns true when `node` has an issue of `kind`.
    #[must_use]
    pub fn has(&self, node: &str, kind: IssueKind) -> bool {
        self.issues.iter().any(|issue| issue.node == node && issue.kind == kind)
    }

    /// Names of nodes with an issue of `kind`.
    #[must_use]
    pub fn nodes_with(&self, kind: IssueKind) -> Vec<&str> {
        self.issues
            .iter()
            .filter(|issue| issue.kind == kind)
            .map(|issue| issue.node.as_str())
            .collect()
    }
}

impl fmt::Display for ValidationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} validation issue(s)", self.issues.len())?;
        for issue in &self.issues {
            write!(f, "\n  - {issue}")?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationReport {}

// ============================================================================
// SECTION: Validation
// ============================================================================

/// Checks the structural invariants of a flattened table.
///
/// # Errors
///
/// Returns a [`ValidationReport`] holding every violation when any check fails.
pub fn validate(table: &FlatTable, policy: &ExemptionPolicy) -> Result<(), ValidationReport> {
    let mut referenced = vec![false; table.symbols().len()];
    for (_, node) in table.defined() {
        for parent in &node.parents {
            if let Some(flag) = referenced.get_mut(parent.index()) {
                *flag = true;
            }
        }
    }

    let mut issues = Vec::new();
    for (symbol, node) in table.defined() {
        let name = table.name(symbol);
        if !node.kind.is_root() && node.parents.is_empty() {
            issues.push(ValidationIssue {
                node: name.to_string(),
                kind: IssueKind::MissingParents,
                source: node.source.clone(),
            });
        }
        let is_referenced = referenced.get(symbol.index()).copied().unwrap_or(false);
        if !node.kind.is_slot() && !is_referenced && !policy.is_exempt(name) {
            issues.push(ValidationIssue {
                node: name.to_string(),
                kind: IssueKind::DeadEnd,
                source: node.source.clone(),
            });
        }
    }

    if issues.is_empty() {
        return Ok(());
    }
    issues.sort();
    Err(ValidationReport {
        issues,
    })
}
