// crates/logic-graph/src/table.rs
// ============================================================================
// Module: Rule Tables
// Description: Named, authored associations from rule names to nodes.
// Purpose: Carry one thematic partition of the rule set into the merge.
// Dependencies: crate::node::Node
// ============================================================================

//! ## Overview
//! A [`RuleTable`] is authoring input: a label for diagnostics, a placeable
//! flag, and entries in authoring order. Entries are kept as a list so that
//! a name written twice in the same table is caught by the merge instead of
//! silently overwriting the earlier definition.

use crate::node::Node;

/// One authored rule table.
///
/// # Invariants
/// - Entries preserve authoring order; duplicates are allowed here and
///   rejected by [`crate::merge::merge_tables`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleTable {
    /// Provenance label used in diagnostics.
    name: String,
    /// Whether `Root` entries are extra items that may be placed into slots.
    placeable: bool,
    /// Authored entries.
    entries: Vec<(String, Node)>,
}

impl RuleTable {
    /// Creates an empty table.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            placeable: false,
            entries: Vec::new(),
        }
    }

    /// Creates an empty table whose `Root` entries are placeable items.
    #[must_use]
    pub fn placeable(name: impl Into<String>) -> Self {
        Self {
            placeable: true,
            ..Self::new(name)
        }
    }

    /// Sets the placeable flag.
    #[must_use]
    pub fn with_placeable(mut self, placeable: bool) -> Self {
        self.placeable = placeable;
        self
    }

    /// Adds an entry and returns the table for chaining.
    #[must_use]
    pub fn with(mut self, name: impl Into<String>, node: Node) -> Self {
        self.insert(name, node);
        self
    }

    /// Adds an entry.
    pub fn insert(&mut self, name: impl Into<String>, node: Node) {
        self.entries.push((name.into(), node));
    }

    /// Provenance label.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Whether this table contributes placeable items.
    #[must_use]
    pub const fn is_placeable(&self) -> bool {
        self.placeable
    }

    /// Number of entries, counting duplicates.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true when the table has no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns the first entry with the given name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Node> {
        self.entries.iter().find(|(key, _)| key == name).map(|(_, node)| node)
    }

    /// Iterates entries in authoring order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Node)> {
        self.entries.iter().map(|(name, node)| (name.as_str(), node))
    }
}

impl Extend<(String, Node)> for RuleTable {
    fn extend<T: IntoIterator<Item = (String, Node)>>(&mut self, iter: T) {
        self.entries.extend(iter);
    }
}
