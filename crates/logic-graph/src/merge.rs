// crates/logic-graph/src/merge.rs
// ============================================================================
// Module: Namespace Merge
// Description: Disjoint union of independently authored rule tables.
// Purpose: Build the single global vocabulary, rejecting any name collision.
// Dependencies: crate::{node, table}, thiserror
// ============================================================================

//! ## Overview
//! Tables routinely reference names defined in other tables, so merging runs
//! before anything tries to resolve a reference. A name defined twice is a
//! fatal authoring defect: the merge stops at the first collision rather than
//! letting one definition shadow another.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::collections::BTreeSet;

use thiserror::Error;

use crate::node::Node;
use crate::table::RuleTable;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Fatal merge failure.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MergeError {
    /// The same name is defined more than once.
    #[error("duplicate logic key `{name}` (defined in `{first_table}` and `{second_table}`)")]
    DuplicateName {
        /// Colliding rule name.
        name: String,
        /// Table holding the first definition.
        first_table: String,
        /// Table holding the conflicting definition.
        second_table: String,
    },
}

// ============================================================================
// SECTION: Merged Table
// ============================================================================

/// The global rule table produced by [`merge_tables`].
///
/// # Invariants
/// - Every name appears exactly once.
/// - `provenance` and `rules` have identical key sets.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MergedTable {
    /// Rules keyed by name, in stable order.
    pub(crate) rules: BTreeMap<String, Node>,
    /// Source table label per rule name.
    pub(crate) provenance: BTreeMap<String, String>,
    /// Names contributed by placeable tables.
    pub(crate) placeable: BTreeSet<String>,
}

impl MergedTable {
    /// Number of rules.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// Returns true when no rules were merged.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Looks up a rule by name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Node> {
        self.rules.get(name)
    }

    /// Returns true when the name is defined.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.rules.contains_key(name)
    }

    /// Label of the table that defined `name`.
    #[must_use]
    pub fn source_of(&self, name: &str) -> Option<&str> {
        self.provenance.get(name).map(String::as_str)
    }

    /// Returns true when `name` came from a placeable table.
    #[must_use]
    pub fn is_placeable(&self, name: &str) -> bool {
        self.placeable.contains(name)
    }

    /// Iterates rules in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Node)> {
        self.rules.iter().map(|(name, node)| (name.as_str(), node))
    }
}

// ============================================================================
// SECTION: Merge
// ============================================================================

/// Merges tables into one, failing on the first duplicate name.
///
/// Input tables are borrowed and never mutated.
///
/// # Errors
///
/// Returns [`MergeError::DuplicateName`] when a name is defined more than once,
/// whether across tables or within one table.
pub fn merge_tables(tables: &[RuleTable]) -> Result<MergedTable, MergeError> {
    let mut merged = MergedTable::default();
    for table in tables {
        for (name, node) in table.iter() {
            if let Some(first) = merged.provenance.get(name) {
                return Err(MergeError::DuplicateName {
                    name: name.to_string(),
                    first_table: first.clone(),
                    second_table: table.name().to_string(),
                });
            }
            merged.rules.insert(name.to_string(), node.clone());
            merged.provenance.insert(name.to_string(), table.name().to_string());
            if table.is_placeable() {
                merged.placeable.insert(name.to_string());
            }
        }
    }
    Ok(merged)
}
