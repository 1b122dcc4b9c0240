// crates/logic-graph/src/node.rs
// ============================================================================
// Module: Expression Model
// Description: Node kinds, parent references, and unflattened rule nodes.
// Purpose: Define the closed set of rule node variants authored in tables.
// Dependencies: serde::{Deserialize, Serialize}, smallvec::SmallVec
// ============================================================================

//! ## Overview
//! A rule node pairs a [`NodeKind`] with an ordered list of [`Parent`]
//! references. Before flattening a parent may be an anonymous inline
//! sub-expression; after flattening every parent is a name.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;

use serde::Deserialize;
use serde::Serialize;
use smallvec::SmallVec;

// ============================================================================
// SECTION: Node Kind
// ============================================================================

/// Closed set of rule node variants.
///
/// # Invariants
/// - `Count` is the only variant carrying a scalar; its resource name is the
///   node's sole parent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeKind {
    /// Unconditional fact, conjoined with any recorded parents.
    Root,
    /// All parents must hold.
    And,
    /// At least one parent must hold.
    Or,
    /// Item-placement location gated by all parents.
    AndSlot,
    /// Item-placement location gated by any parent.
    OrSlot,
    /// Routing milestone gated by all parents.
    AndStep,
    /// Routing milestone gated by any parent.
    OrStep,
    /// Like `And`, but only satisfiable under hard difficulty.
    HardAnd,
    /// Like `Or`, but only satisfiable under hard difficulty.
    HardOr,
    /// At least `min` independently reachable producers of the resource.
    Count {
        /// Threshold of distinct reachable producers.
        min: u32,
    },
}

/// How a node combines the truth of its parents.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Combinator {
    /// Every parent must hold (empty is true).
    All,
    /// Some parent must hold (empty is false).
    Any,
    /// At least this many producers of the single parent resource must hold.
    AtLeast(u32),
}

impl NodeKind {
    /// Returns true for item-placement locations.
    #[must_use]
    pub const fn is_slot(self) -> bool {
        matches!(self, Self::AndSlot | Self::OrSlot)
    }

    /// Returns true for routing milestones.
    #[must_use]
    pub const fn is_step(self) -> bool {
        matches!(self, Self::AndStep | Self::OrStep)
    }

    /// Returns true for nodes gated on the hard-logic difficulty flag.
    #[must_use]
    pub const fn is_hard(self) -> bool {
        matches!(self, Self::HardAnd | Self::HardOr)
    }

    /// Returns true for root facts.
    #[must_use]
    pub const fn is_root(self) -> bool {
        matches!(self, Self::Root)
    }

    /// Returns the parent-combination rule for this kind.
    #[must_use]
    pub const fn combinator(self) -> Combinator {
        match self {
            Self::Root | Self::And | Self::AndSlot | Self::AndStep | Self::HardAnd => {
                Combinator::All
            }
            Self::Or | Self::OrSlot | Self::OrStep | Self::HardOr => Combinator::Any,
            Self::Count {
                min,
            } => Combinator::AtLeast(min),
        }
    }

    /// Stable lowercase label used by table sources and exports.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Root => "root",
            Self::And => "and",
            Self::Or => "or",
            Self::AndSlot => "and_slot",
            Self::OrSlot => "or_slot",
            Self::AndStep => "and_step",
            Self::OrStep => "or_step",
            Self::HardAnd => "hard_and",
            Self::HardOr => "hard_or",
            Self::Count {
                ..
            } => "count",
        }
    }

    /// Parses a non-`Count` label produced by [`NodeKind::label`].
    #[must_use]
    pub fn from_label(label: &str) -> Option<Self> {
        let kind = match label {
            "root" => Self::Root,
            "and" => Self::And,
            "or" => Self::Or,
            "and_slot" => Self::AndSlot,
            "or_slot" => Self::OrSlot,
            "and_step" => Self::AndStep,
            "or_step" => Self::OrStep,
            "hard_and" => Self::HardAnd,
            "hard_or" => Self::HardOr,
            _ => return None,
        };
        Some(kind)
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Count {
                min,
            } => write!(f, "count({min})"),
            other => f.write_str(other.label()),
        }
    }
}

// ============================================================================
// SECTION: Parent References
// ============================================================================

/// A reference from a node to one of its parents.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Parent {
    /// Reference to another node by name.
    Named(String),
    /// Anonymous sub-expression, lifted to a named node by flattening.
    Inline(Box<Node>),
}

impl Parent {
    /// Returns the referenced name for `Named` parents.
    #[must_use]
    pub fn as_name(&self) -> Option<&str> {
        match self {
            Self::Named(name) => Some(name),
            Self::Inline(_) => None,
        }
    }

    /// Returns true for inline sub-expressions.
    #[must_use]
    pub const fn is_inline(&self) -> bool {
        matches!(self, Self::Inline(_))
    }
}

impl From<&str> for Parent {
    fn from(name: &str) -> Self {
        Self::Named(name.to_string())
    }
}

impl From<String> for Parent {
    fn from(name: String) -> Self {
        Self::Named(name)
    }
}

impl From<&String> for Parent {
    fn from(name: &String) -> Self {
        Self::Named(name.clone())
    }
}

impl From<Node> for Parent {
    fn from(node: Node) -> Self {
        Self::Inline(Box::new(node))
    }
}

// ============================================================================
// SECTION: Rule Node
// ============================================================================

/// Unvalidated rule node as authored in a table.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Node {
    /// Node variant.
    pub kind: NodeKind,
    /// Ordered parent references.
    pub parents: SmallVec<[Parent; 4]>,
}

impl Node {
    /// Creates a node from a kind and parent references.
    pub fn new<I, P>(kind: NodeKind, parents: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<Parent>,
    {
        Self {
            kind,
            parents: parents.into_iter().map(Into::into).collect(),
        }
    }

    /// Returns true when any parent is an inline sub-expression.
    #[must_use]
    pub fn has_inline(&self) -> bool {
        self.parents.iter().any(Parent::is_inline)
    }

    /// Iterates the names of `Named` parents, skipping inline expressions.
    pub fn named_parents(&self) -> impl Iterator<Item = &str> {
        self.parents.iter().filter_map(Parent::as_name)
    }

    /// Depth of inline nesting below this node (0 when every parent is named).
    #[must_use]
    pub fn inline_depth(&self) -> usize {
        self.parents
            .iter()
            .map(|parent| match parent {
                Parent::Named(_) => 0,
                Parent::Inline(node) => node.inline_depth() + 1,
            })
            .max()
            .unwrap_or(0)
    }
}
