// crates/logic-graph/src/linkage.rs
// ============================================================================
// Module: Late-Binding Linkage
// Description: Attaches item-placement records to compiled treasure nodes.
// Purpose: Close the graph over run-specific placements before freezing.
// Dependencies: crate::{flatten, node}, serde, smallvec
// ============================================================================

//! ## Overview
//! Each [`PlacementRecord`] says "the treasure is found at this location", one
//! more way to obtain it. Locations are kept apart from the authored parents,
//! in the node's placement list, and the node holds once its authored gate
//! holds or any placement does. A node with placements but no authored parents
//! is obtained only through a placement, so a placed `Root` item is no longer
//! free.
//!
//! When no node is named after the treasure, an `And` node is created whose
//! only edge is the location. Kinds are never changed and an edge already
//! present is never added twice, so applying the same records again is a
//! no-op.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Deserialize;
use serde::Serialize;
use smallvec::SmallVec;
use smallvec::smallvec;

use crate::flatten::FlatNode;
use crate::flatten::FlatTable;
use crate::node::NodeKind;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Provenance label for nodes created by linkage.
pub const LINKAGE_SOURCE: &str = "linkage";

// ============================================================================
// SECTION: Types
// ============================================================================

/// One resolved item placement.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PlacementRecord {
    /// Location (slot) name the treasure was placed into.
    pub location: String,
    /// Treasure name as it appears in the rule set.
    pub treasure: String,
}

impl PlacementRecord {
    /// Creates a placement record.
    #[must_use]
    pub fn new(location: impl Into<String>, treasure: impl Into<String>) -> Self {
        Self {
            location: location.into(),
            treasure: treasure.into(),
        }
    }
}

/// Counters reported by one linkage pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct LinkStats {
    /// Placement edges appended to existing nodes.
    pub edges_added: usize,
    /// Treasure nodes created because none existed.
    pub nodes_created: usize,
    /// Records whose edge was already present.
    pub unchanged: usize,
}

impl LinkStats {
    /// Returns true when the pass changed nothing.
    #[must_use]
    pub const fn is_noop(&self) -> bool {
        self.edges_added == 0 && self.nodes_created == 0
    }
}

// ============================================================================
// SECTION: Linkage
// ============================================================================

/// Applies placement records to a flat table.
pub(crate) fn link(table: &mut FlatTable, records: &[PlacementRecord]) -> LinkStats {
    let mut stats = LinkStats::default();
    for record in records {
        let location = table.intern(&record.location);
        let treasure = table.intern(&record.treasure);
        if let Some(node) = table.node_mut(treasure) {
            if node.placements.contains(&location) {
                stats.unchanged += 1;
            } else {
                node.placements.push(location);
                stats.edges_added += 1;
            }
            continue;
        }
        table.define(
            treasure,
            FlatNode {
                kind: NodeKind::And,
                parents: SmallVec::new(),
                placements: smallvec![location],
                source: LINKAGE_SOURCE.to_string(),
            },
        );
        stats.nodes_created += 1;
    }
    stats
}
