// crates/logic-graph-solver/src/reachability.rs
// ============================================================================
// Module: Reachability
// Description: Monotone fixed-point evaluation over a frozen logic graph.
// Purpose: Decide which nodes hold for an inventory and difficulty.
// Dependencies: crate::inventory, logic-graph, thiserror
// ============================================================================

//! ## Overview
//! [`Reachability`] walks any [`LogicReader`] with a worklist. A node, once
//! satisfied, is never revisited, and satisfying a node requeues its
//! dependents. Because `Count` gates are listed as dependents of every
//! producer of their resource, a threshold is re-checked each time another
//! producer becomes reachable, so the result does not depend on the order in
//! which nodes are processed.
//!
//! Evaluation per kind:
//! - `Root`, `And`, slots and steps of the `And` family: every parent holds
//!   (no parents holds trivially).
//! - `Or` family: some parent holds (no parents never holds).
//! - `HardAnd`/`HardOr`: as above, and only under [`Difficulty::Hard`].
//! - `Count { min }`: at least `min` distinct producers of the resource node
//!   hold. Producers are the resource's parents and placements.
//!
//! A node with placements also holds once any placement holds, whatever its
//! kind or the difficulty; with placements and no parents it holds only that
//! way. Names in the [`Inventory`] hold unconditionally.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::VecDeque;

use logic_graph::Combinator;
use logic_graph::LogicReader;
use logic_graph::NodeId;
use thiserror::Error;

use crate::inventory::Difficulty;
use crate::inventory::Inventory;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Failure to run a reachability query.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SolveError {
    /// An inventory entry names no node in the graph.
    #[error("inventory item `{0}` is not a node in the graph")]
    UnknownItem(String),
    /// A queried name is not a node in the graph.
    #[error("unknown node `{0}`")]
    UnknownNode(String),
}

// ============================================================================
// SECTION: Reachable Set
// ============================================================================

/// Nodes satisfied by one query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReachableSet {
    /// Satisfaction by node index.
    reached: Vec<bool>,
    /// Satisfied nodes in discovery order.
    order: Vec<NodeId>,
}

impl ReachableSet {
    /// Returns true when the node was satisfied.
    #[must_use]
    pub fn contains(&self, id: NodeId) -> bool {
        self.reached.get(id.index()).copied().unwrap_or(false)
    }

    /// Returns true when the named node was satisfied.
    #[must_use]
    pub fn contains_name<R: LogicReader + ?Sized>(&self, graph: &R, name: &str) -> bool {
        graph.lookup(name).is_some_and(|id| self.contains(id))
    }

    /// Number of satisfied nodes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.order.len()
    }

    /// Returns true when nothing was satisfied.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Satisfied nodes in the order they were discovered.
    pub fn iter(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.order.iter().copied()
    }

    /// Satisfied nodes of the given graph for which `keep` holds, by name.
    pub fn names_where<'g, R: LogicReader + ?Sized>(
        &self,
        graph: &'g R,
        keep: impl Fn(NodeId) -> bool,
    ) -> Vec<&'g str> {
        let mut names: Vec<&str> =
            self.iter().filter(|id| keep(*id)).map(|id| graph.name(id)).collect();
        names.sort_unstable();
        names
    }
}

// ============================================================================
// SECTION: Evaluator
// ============================================================================

/// Reachability evaluator bound to one graph and difficulty.
pub struct Reachability<'g, R: ?Sized> {
    /// Graph under evaluation.
    graph: &'g R,
    /// Whether hard-logic gates may hold.
    difficulty: Difficulty,
}

impl<'g, R: LogicReader + ?Sized> Reachability<'g, R> {
    /// Creates an evaluator.
    #[must_use]
    pub const fn new(graph: &'g R, difficulty: Difficulty) -> Self {
        Self {
            graph,
            difficulty,
        }
    }

    /// Difficulty this evaluator applies.
    #[must_use]
    pub const fn difficulty(&self) -> Difficulty {
        self.difficulty
    }

    /// Computes every node satisfied from `inventory`.
    ///
    /// # Errors
    /// Returns [`SolveError::UnknownItem`] when an inventory entry is not a
    /// node of the graph.
    pub fn solve(&self, inventory: &Inventory) -> Result<ReachableSet, SolveError> {
        let count = self.graph.node_count();
        let mut set = ReachableSet {
            reached: vec![false; count],
            order: Vec::new(),
        };
        let mut queue: VecDeque<NodeId> = VecDeque::with_capacity(count);

        for item in inventory.iter() {
            let id =
                self.graph.lookup(item).ok_or_else(|| SolveError::UnknownItem(item.to_string()))?;
            self.mark(&mut set, &mut queue, id);
        }
        queue.extend((0 .. count).map(NodeId::new));

        while let Some(id) = queue.pop_front() {
            if set.contains(id) {
                continue;
            }
            if self.holds(id, &set) {
                self.mark(&mut set, &mut queue, id);
            }
        }
        Ok(set)
    }

    /// Answers whether one named node is satisfied from `inventory`.
    ///
    /// # Errors
    /// Returns [`SolveError::UnknownNode`] for an unknown name and
    /// [`SolveError::UnknownItem`] for an unknown inventory entry.
    pub fn is_reachable(&self, inventory: &Inventory, name: &str) -> Result<bool, SolveError> {
        let id = self.graph.lookup(name).ok_or_else(|| SolveError::UnknownNode(name.to_string()))?;
        Ok(self.solve(inventory)?.contains(id))
    }

    /// Records `id` as satisfied and queues everything it may unlock.
    fn mark(&self, set: &mut ReachableSet, queue: &mut VecDeque<NodeId>, id: NodeId) {
        let Some(slot) = set.reached.get_mut(id.index()) else {
            return;
        };
        if *slot {
            return;
        }
        *slot = true;
        set.order.push(id);
        queue.extend(self.graph.dependents(id).iter().copied());
    }

    /// Evaluates one node against the current satisfied set.
    fn holds(&self, id: NodeId, set: &ReachableSet) -> bool {
        let Some(kind) = self.graph.kind(id) else {
            return false;
        };
        let parents = self.graph.parents(id);
        let placements = self.graph.placements(id);
        if placements.iter().any(|place| set.contains(*place)) {
            return true;
        }
        if !placements.is_empty() && parents.is_empty() {
            return false;
        }
        if kind.is_hard() && !self.difficulty.allows_hard() {
            return false;
        }
        match kind.combinator() {
            Combinator::All => parents.iter().all(|parent| set.contains(*parent)),
            Combinator::Any => parents.iter().any(|parent| set.contains(*parent)),
            Combinator::AtLeast(min) => {
                let Ok(min) = usize::try_from(min) else {
                    return false;
                };
                if min == 0 {
                    return true;
                }
                let Some(resource) = parents.first() else {
                    return false;
                };
                let authored = self.graph.parents(*resource);
                let placed = self.graph.placements(*resource);
                let mut satisfied = 0usize;
                let mut remaining = authored.len() + placed.len();
                let extra = placed.iter().filter(|place| !authored.contains(*place));
                for producer in authored.iter().chain(extra) {
                    if set.contains(*producer) {
                        satisfied += 1;
                        if satisfied >= min {
                            return true;
                        }
                    }
                    remaining = remaining.saturating_sub(1);
                    if satisfied + remaining < min {
                        return false;
                    }
                }
                satisfied >= min
            }
        }
    }
}
