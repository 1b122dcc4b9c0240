// crates/logic-graph/src/builder.rs
// ============================================================================
// Module: Node Constructors
// Description: Factory functions and a fluent builder for rule nodes.
// Purpose: Build unvalidated expression-model values from argument lists.
// Dependencies: crate::node::{Node, NodeKind, Parent}
// ============================================================================

//! ## Overview
//! One constructor per [`NodeKind`]. Constructors are pure: they perform no
//! validation and never touch shared state. The variadic authoring macros
//! (`and!`, `or!`, `count!`, ...) expand to these functions.

use smallvec::SmallVec;

use crate::node::Node;
use crate::node::NodeKind;
use crate::node::Parent;

// ============================================================================
// SECTION: Constructors
// ============================================================================

impl Node {
    /// Creates a node from an already-converted parent list.
    #[must_use]
    pub fn from_parents(kind: NodeKind, parents: Vec<Parent>) -> Self {
        Self {
            kind,
            parents: SmallVec::from_vec(parents),
        }
    }

    /// Creates an unconditional root fact with no recorded dependencies.
    #[must_use]
    pub fn root() -> Self {
        Self::from_parents(NodeKind::Root, Vec::new())
    }
}

/// Root fact that also records an implicit And-dependency on `parents`.
pub fn root<I, P>(parents: I) -> Node
where
    I: IntoIterator<Item = P>,
    P: Into<Parent>,
{
    Node::new(NodeKind::Root, parents)
}

/// All parents must hold.
pub fn and<I, P>(parents: I) -> Node
where
    I: IntoIterator<Item = P>,
    P: Into<Parent>,
{
    Node::new(NodeKind::And, parents)
}

/// Any parent must hold.
pub fn or<I, P>(parents: I) -> Node
where
    I: IntoIterator<Item = P>,
    P: Into<Parent>,
{
    Node::new(NodeKind::Or, parents)
}

/// Placement location gated by all parents.
pub fn and_slot<I, P>(parents: I) -> Node
where
    I: IntoIterator<Item = P>,
    P: Into<Parent>,
{
    Node::new(NodeKind::AndSlot, parents)
}

/// Placement location gated by any parent.
pub fn or_slot<I, P>(parents: I) -> Node
where
    I: IntoIterator<Item = P>,
    P: Into<Parent>,
{
    Node::new(NodeKind::OrSlot, parents)
}

/// Routing milestone gated by all parents.
pub fn and_step<I, P>(parents: I) -> Node
where
    I: IntoIterator<Item = P>,
    P: Into<Parent>,
{
    Node::new(NodeKind::AndStep, parents)
}

/// Routing milestone gated by any parent.
pub fn or_step<I, P>(parents: I) -> Node
where
    I: IntoIterator<Item = P>,
    P: Into<Parent>,
{
    Node::new(NodeKind::OrStep, parents)
}

/// All parents must hold, and only under hard difficulty.
pub fn hard_and<I, P>(parents: I) -> Node
where
    I: IntoIterator<Item = P>,
    P: Into<Parent>,
{
    Node::new(NodeKind::HardAnd, parents)
}

/// Any parent must hold, and only under hard difficulty.
pub fn hard_or<I, P>(parents: I) -> Node
where
    I: IntoIterator<Item = P>,
    P: Into<Parent>,
{
    Node::new(NodeKind::HardOr, parents)
}

/// At least `min` independently reachable producers of `resource`.
pub fn count(min: u32, resource: impl Into<String>) -> Node {
    Node::from_parents(
        NodeKind::Count {
            min,
        },
        vec![Parent::Named(resource.into())],
    )
}

// ============================================================================
// SECTION: Fluent Builder
// ============================================================================

/// Fluent builder for assembling a node one parent at a time.
///
/// Useful when parents are computed (for example per-dungeon key chains)
/// rather than written literally.
#[derive(Debug, Clone)]
pub struct NodeBuilder {
    /// Kind of the node under construction.
    kind: NodeKind,
    /// Parents collected so far.
    parents: Vec<Parent>,
}

impl NodeBuilder {
    /// Starts a builder for the given kind.
    #[must_use]
    pub const fn new(kind: NodeKind) -> Self {
        Self {
            kind,
            parents: Vec::new(),
        }
    }

    /// Appends a named parent.
    #[must_use]
    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.parents.push(Parent::Named(name.into()));
        self
    }

    /// Appends an inline sub-expression.
    #[must_use]
    pub fn inline(mut self, node: Node) -> Self {
        self.parents.push(Parent::Inline(Box::new(node)));
        self
    }

    /// Appends every parent from an iterator.
    #[must_use]
    pub fn with_all<I, P>(mut self, parents: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<Parent>,
    {
        self.parents.extend(parents.into_iter().map(Into::into));
        self
    }

    /// Finishes the node.
    #[must_use]
    pub fn build(self) -> Node {
        Node::from_parents(self.kind, self.parents)
    }
}
