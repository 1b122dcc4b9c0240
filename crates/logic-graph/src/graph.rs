// crates/logic-graph/src/graph.rs
// ============================================================================
// Module: Frozen Logic Graph
// Description: Immutable, shareable compiled graph and its read contract.
// Purpose: Hand the solver dense, lock-free, read-only graph state.
// Dependencies: crate::{flatten, node, symbol}, ron, serde, serde_json, smallvec,
//              thiserror
// ============================================================================

//! ## Overview
//! [`LogicGraph`] is produced by freezing a linked [`FlatTable`]. Freezing
//! resolves every reference; a name that is referenced but never defined is a
//! lookup failure here rather than a silent dead end. The graph lives behind an
//! [`Arc`], has no interior mutability, and is `Send + Sync`, so any number of
//! solver threads may read it concurrently without locking.
//!
//! [`LogicReader`] is the contract the reachability solver consumes.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use serde::Deserialize;
use serde::Serialize;
use smallvec::SmallVec;
use thiserror::Error;

use crate::flatten::FlatTable;
use crate::node::NodeKind;
use crate::symbol::Symbol;

// ============================================================================
// SECTION: Identifiers
// ============================================================================

/// Dense index of a node in a [`LogicGraph`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[repr(transparent)]
pub struct NodeId(usize);

impl NodeId {
    /// Creates an id from a dense index.
    #[must_use]
    pub const fn new(index: usize) -> Self {
        Self(index)
    }

    /// Dense index of this node.
    #[must_use]
    pub const fn index(self) -> usize {
        self.0
    }
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// A reference to a name that no node defines.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct UnresolvedReference {
    /// Node holding the reference.
    pub node: String,
    /// Name that could not be resolved.
    pub missing: String,
}

impl fmt::Display for UnresolvedReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "node `{}` references nonexistent node `{}`", self.node, self.missing)
    }
}

/// Failure to freeze a compiled table.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FreezeError {
    /// One or more parents name undefined nodes.
    #[error("{} unresolved reference(s): {}", .0.len(), render_references(.0))]
    UnresolvedReferences(Vec<UnresolvedReference>),
}

/// Joins references for the error message.
fn render_references(references: &[UnresolvedReference]) -> String {
    references.iter().map(ToString::to_string).collect::<Vec<_>>().join("; ")
}

/// Failure to serialize a graph export.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExportError {
    /// JSON serialization failed.
    #[error("json export failed: {0}")]
    Json(String),
    /// RON serialization failed.
    #[error("ron export failed: {0}")]
    Ron(String),
}

// ============================================================================
// SECTION: Export Types
// ============================================================================

/// Read-only copy of one compiled node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportedNode {
    /// Node variant.
    pub kind: NodeKind,
    /// Parent names, in order.
    pub parents: Vec<String>,
    /// Placement locations attached by linkage, in order.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub placements: Vec<String>,
    /// Table that defined the node.
    pub source: String,
}

/// Read-only copy of a compiled table, keyed by name.
pub type GraphExport = BTreeMap<String, ExportedNode>;

/// Copies every defined node of a flat table.
pub(crate) fn export_flat(table: &FlatTable, filter: impl Fn(Symbol) -> bool) -> GraphExport {
    let names = |symbols: &[Symbol]| -> Vec<String> {
        symbols.iter().map(|symbol| table.name(*symbol).to_string()).collect()
    };
    table
        .defined()
        .filter(|(symbol, _)| filter(*symbol))
        .map(|(symbol, node)| {
            let exported = ExportedNode {
                kind: node.kind,
                parents: names(&node.parents),
                placements: names(&node.placements),
                source: node.source.clone(),
            };
            (table.name(symbol).to_string(), exported)
        })
        .collect()
}

// ============================================================================
// SECTION: Reader Contract
// ============================================================================

/// Read contract between the compiled graph and a reachability solver.
///
/// Out-of-range ids yield empty slices and `None`; ids obtained from the
/// same reader are always in range.
pub trait LogicReader {
    /// Number of nodes; ids are `0..node_count()`.
    fn node_count(&self) -> usize;

    /// Resolves a name.
    fn lookup(&self, name: &str) -> Option<NodeId>;

    /// Name of a node.
    fn name(&self, id: NodeId) -> &str;

    /// Kind of a node.
    fn kind(&self, id: NodeId) -> Option<NodeKind>;

    /// Parents of a node, in authoring order.
    fn parents(&self, id: NodeId) -> &[NodeId];

    /// Placement locations linked to a node; any one of them yields it.
    fn placements(&self, id: NodeId) -> &[NodeId];

    /// Nodes whose satisfaction may change when `id` becomes satisfied.
    ///
    /// Includes direct children, nodes placed at `id`, and every `Count` node
    /// whose resource lists `id` as a producer. Producers of a resource are
    /// its parents followed by its placements.
    fn dependents(&self, id: NodeId) -> &[NodeId];
}

// ============================================================================
// SECTION: Logic Graph
// ============================================================================

/// Immutable storage behind a [`LogicGraph`].
#[derive(Debug)]
struct GraphInner {
    /// Names by id.
    names: Vec<String>,
    /// Reverse name lookup.
    index: HashMap<String, NodeId>,
    /// Kinds by id.
    kinds: Vec<NodeKind>,
    /// Parents by id.
    parents: Vec<SmallVec<[NodeId; 4]>>,
    /// Placement locations by id.
    placements: Vec<SmallVec<[NodeId; 2]>>,
    /// Dependents by id.
    dependents: Vec<Vec<NodeId>>,
    /// Defining table by id.
    sources: Vec<String>,
    /// Placeable flag by id.
    placeable: Vec<bool>,
}

/// Frozen compiled graph; cheap to clone and safe to share across threads.
#[derive(Debug, Clone)]
pub struct LogicGraph {
    /// Shared immutable storage.
    inner: Arc<GraphInner>,
}

impl LogicGraph {
    /// Freezes a flat table, resolving every reference.
    ///
    /// # Errors
    ///
    /// Returns [`FreezeError::UnresolvedReferences`] listing every parent or
    /// placement that names an undefined node.
    pub(crate) fn freeze(table: &FlatTable) -> Result<Self, FreezeError> {
        let mut unresolved = Vec::new();
        for (symbol, node) in table.defined() {
            for parent in node.parents.iter().chain(&node.placements) {
                if table.node(*parent).is_none() {
                    unresolved.push(UnresolvedReference {
                        node: table.name(symbol).to_string(),
                        missing: table.name(*parent).to_string(),
                    });
                }
            }
        }
        if !unresolved.is_empty() {
            unresolved.sort();
            unresolved.dedup();
            return Err(FreezeError::UnresolvedReferences(unresolved));
        }

        // Every symbol is defined, so symbol indices are dense node ids.
        let count = table.symbols().len();
        let mut names = Vec::with_capacity(count);
        let mut index = HashMap::with_capacity(count);
        let mut kinds = Vec::with_capacity(count);
        let mut parents = Vec::with_capacity(count);
        let mut placements = Vec::with_capacity(count);
        let mut sources = Vec::with_capacity(count);
        let mut placeable = Vec::with_capacity(count);
        for (symbol, node) in table.defined() {
            let id = NodeId(symbol.index());
            names.push(table.name(symbol).to_string());
            index.insert(table.name(symbol).to_string(), id);
            kinds.push(node.kind);
            parents.push(node.parents.iter().map(|parent| NodeId(parent.index())).collect());
            placements.push(node.placements.iter().map(|place| NodeId(place.index())).collect());
            sources.push(node.source.clone());
            placeable.push(table.is_placeable(symbol));
        }

        let dependents = build_dependents(&kinds, &parents, &placements);
        Ok(Self {
            inner: Arc::new(GraphInner {
                names,
                index,
                kinds,
                parents,
                placements,
                dependents,
                sources,
                placeable,
            }),
        })
    }

    /// Number of nodes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.names.len()
    }

    /// Returns true when the graph has no nodes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inner.names.is_empty()
    }

    /// Iterates every node id.
    pub fn ids(&self) -> impl Iterator<Item = NodeId> + '_ {
        (0 .. self.len()).map(NodeId)
    }

    /// Table that defined a node.
    #[must_use]
    pub fn source(&self, id: NodeId) -> Option<&str> {
        self.inner.sources.get(id.0).map(String::as_str)
    }

    /// Item-placement locations.
    pub fn slots(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.ids().filter(|id| self.kind(*id).is_some_and(NodeKind::is_slot))
    }

    /// Routing milestones.
    pub fn steps(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.ids().filter(|id| self.kind(*id).is_some_and(NodeKind::is_step))
    }

    /// Read-only copy of the entire graph.
    #[must_use]
    pub fn export(&self) -> GraphExport {
        self.export_where(|_| true)
    }

    /// Read-only copy of `Root` nodes contributed by placeable tables.
    #[must_use]
    pub fn extra_items(&self) -> GraphExport {
        self.export_where(|id| {
            self.inner.placeable.get(id.0).copied().unwrap_or(false)
                && self.kind(id).is_some_and(NodeKind::is_root)
        })
    }

    /// Serializes the full export as pretty JSON.
    ///
    /// # Errors
    ///
    /// Returns [`ExportError::Json`] when serialization fails.
    pub fn to_json(&self) -> Result<String, ExportError> {
        serde_json::to_string_pretty(&self.export())
            .map_err(|err| ExportError::Json(err.to_string()))
    }

    /// Serializes the full export as pretty RON.
    ///
    /// # Errors
    ///
    /// Returns [`ExportError::Ron`] when serialization fails.
    pub fn to_ron(&self) -> Result<String, ExportError> {
        ron::ser::to_string_pretty(&self.export(), ron::ser::PrettyConfig::default())
            .map_err(|err| ExportError::Ron(err.to_string()))
    }

    /// Exports the nodes accepted by `filter`.
    fn export_where(&self, filter: impl Fn(NodeId) -> bool) -> GraphExport {
        let names = |ids: &[NodeId]| -> Vec<String> {
            ids.iter().map(|id| self.name(*id).to_string()).collect()
        };
        self.ids()
            .filter(|id| filter(*id))
            .map(|id| {
                let node = ExportedNode {
                    kind: self.inner.kinds[id.0],
                    parents: names(self.parents(id)),
                    placements: names(self.placements(id)),
                    source: self.inner.sources[id.0].clone(),
                };
                (self.name(id).to_string(), node)
            })
            .collect()
    }
}

impl LogicReader for LogicGraph {
    fn node_count(&self) -> usize {
        self.len()
    }

    fn lookup(&self, name: &str) -> Option<NodeId> {
        self.inner.index.get(name).copied()
    }

    fn name(&self, id: NodeId) -> &str {
        self.inner.names.get(id.0).map_or("", String::as_str)
    }

    fn kind(&self, id: NodeId) -> Option<NodeKind> {
        self.inner.kinds.get(id.0).copied()
    }

    fn parents(&self, id: NodeId) -> &[NodeId] {
        self.inner.parents.get(id.0).map_or(&[], |parents| parents.as_slice())
    }

    fn placements(&self, id: NodeId) -> &[NodeId] {
        self.inner.placements.get(id.0).map_or(&[], |placements| placements.as_slice())
    }

    fn dependents(&self, id: NodeId) -> &[NodeId] {
        self.inner.dependents.get(id.0).map_or(&[], Vec::as_slice)
    }
}

/// Builds the reverse adjacency used for frontier expansion.
fn build_dependents(
    kinds: &[NodeKind],
    parents: &[SmallVec<[NodeId; 4]>],
    placements: &[SmallVec<[NodeId; 2]>],
) -> Vec<Vec<NodeId>> {
    let sources_of = move |id: NodeId| {
        let authored = parents.get(id.0).map_or(&[][..], |list| list.as_slice());
        let placed = placements.get(id.0).map_or(&[][..], |list| list.as_slice());
        authored.iter().chain(placed)
    };
    let mut dependents: Vec<Vec<NodeId>> = vec![Vec::new(); kinds.len()];
    for (child, kind) in kinds.iter().enumerate() {
        for source in sources_of(NodeId(child)) {
            if let Some(list) = dependents.get_mut(source.0) {
                list.push(NodeId(child));
            }
        }
        if matches!(kind, NodeKind::Count { .. }) {
            // A count gate re-evaluates whenever a producer of its resource does.
            for resource in sources_of(NodeId(child)) {
                for producer in sources_of(*resource) {
                    if let Some(list) = dependents.get_mut(producer.0) {
                        list.push(NodeId(child));
                    }
                }
            }
        }
    }
    for list in &mut dependents {
        list.sort_unstable();
        list.dedup();
    }
    dependents
}
