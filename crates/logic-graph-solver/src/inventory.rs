// crates/logic-graph-solver/src/inventory.rs
// ============================================================================
// Module: Inventory and Difficulty
// Description: Solver inputs: granted facts and the hard-logic flag.
// Purpose: Describe the state a reachability query starts from.
// Dependencies: serde
// ============================================================================

//! ## Overview
//! An [`Inventory`] is the set of node names treated as satisfied before
//! evaluation starts (starting items, already-collected treasures).
//! [`Difficulty`] decides whether hard-logic gates may ever hold.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeSet;

use serde::Deserialize;
use serde::Serialize;

// ============================================================================
// SECTION: Difficulty
// ============================================================================

/// Process-wide logic difficulty.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Difficulty {
    /// Hard-logic gates never hold.
    #[default]
    Normal,
    /// Hard-logic gates behave like their plain counterparts.
    Hard,
}

impl Difficulty {
    /// Returns true when hard-logic gates may hold.
    #[must_use]
    pub const fn allows_hard(self) -> bool {
        matches!(self, Self::Hard)
    }
}

// ============================================================================
// SECTION: Inventory
// ============================================================================

/// Names granted as satisfied before evaluation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Inventory {
    /// Granted names.
    items: BTreeSet<String>,
}

impl Inventory {
    /// Creates an empty inventory.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an item and returns the inventory for chaining.
    #[must_use]
    pub fn with(mut self, item: impl Into<String>) -> Self {
        self.items.insert(item.into());
        self
    }

    /// Adds an item; returns false if it was already present.
    pub fn insert(&mut self, item: impl Into<String>) -> bool {
        self.items.insert(item.into())
    }

    /// Returns true when the item is granted.
    #[must_use]
    pub fn contains(&self, item: &str) -> bool {
        self.items.contains(item)
    }

    /// Number of granted items.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Returns true when nothing is granted.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Iterates granted items in name order.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.items.iter().map(String::as_str)
    }
}

impl<S: Into<String>> FromIterator<S> for Inventory {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self {
            items: iter.into_iter().map(Into::into).collect(),
        }
    }
}
