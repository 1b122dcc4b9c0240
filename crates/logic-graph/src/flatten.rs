// crates/logic-graph/src/flatten.rs
// ============================================================================
// Module: Flattening
// Description: Fixed-point lifting of inline sub-expressions into named nodes.
// Purpose: Produce an interned table whose parents are all symbolic references.
// Dependencies: crate::{merge, node, symbol, table}, smallvec
// ============================================================================

//! ## Overview
//! Each round visits owners in name order and gives every inline parent a
//! synthetic name `"{owner} {k}"`, `k` counting from 1 per owner. A lifted
//! node may carry inline parents of its own, so the next round visits only
//! the nodes added by the previous one. The loop ends when a round lifts
//! nothing.
//!
//! Synthetic names are checked against the whole merged vocabulary, defined
//! and referenced; when a candidate is already taken, `k` keeps advancing
//! until a free name appears. Given the same merged table the output is
//! identical run to run.
//!
//! Each round removes exactly one level of nesting, so the number of rounds
//! equals the deepest inline nesting in the input. The round cap is raised to
//! that depth, which leaves the panic reachable only through a defect here.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::collections::BTreeSet;

use smallvec::SmallVec;

use crate::merge::MergedTable;
use crate::node::Node;
use crate::node::NodeKind;
use crate::node::Parent;
use crate::symbol::Symbol;
use crate::symbol::SymbolTable;
use crate::table::RuleTable;

// ============================================================================
// SECTION: Flat Types
// ============================================================================

/// A node whose parents are all interned references.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlatNode {
    /// Node variant.
    pub kind: NodeKind,
    /// Parent references, in authoring order.
    pub parents: SmallVec<[Symbol; 4]>,
    /// Placement locations attached by linkage; any one of them yields the
    /// node regardless of `kind`.
    pub placements: SmallVec<[Symbol; 2]>,
    /// Label of the table that defined the node (or its inline owner).
    pub source: String,
}

/// Counters reported by a flattening run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FlattenStats {
    /// Rounds that lifted at least one inline expression.
    pub rounds: usize,
    /// Synthetic nodes added across all rounds.
    pub synthesized: usize,
}

/// Flattened, interned rule table.
///
/// # Invariants
/// - `defs.len() == symbols.len()`.
/// - `defs[s]` is `None` when `s` is referenced but not defined.
/// - No inline parents remain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlatTable {
    /// Interned names, defined and referenced.
    pub(crate) symbols: SymbolTable,
    /// Definitions indexed by symbol.
    pub(crate) defs: Vec<Option<FlatNode>>,
    /// Symbols contributed by placeable tables.
    pub(crate) placeable: BTreeSet<Symbol>,
    /// Counters from the run that produced this table.
    pub(crate) stats: FlattenStats,
}

impl FlatTable {
    /// Interned names.
    #[must_use]
    pub const fn symbols(&self) -> &SymbolTable {
        &self.symbols
    }

    /// Definition for a symbol, if any.
    #[must_use]
    pub fn node(&self, symbol: Symbol) -> Option<&FlatNode> {
        self.defs.get(symbol.index()).and_then(Option::as_ref)
    }

    /// Definition for a name, if any.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&FlatNode> {
        self.symbols.get(name).and_then(|symbol| self.node(symbol))
    }

    /// Returns true when `name` is defined.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Name of a symbol.
    #[must_use]
    pub fn name(&self, symbol: Symbol) -> &str {
        self.symbols.name(symbol)
    }

    /// Iterates defined nodes in symbol order.
    pub fn defined(&self) -> impl Iterator<Item = (Symbol, &FlatNode)> {
        self.symbols
            .iter()
            .filter_map(|(symbol, _)| self.node(symbol).map(|node| (symbol, node)))
    }

    /// Number of defined nodes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.defs.iter().filter(|def| def.is_some()).count()
    }

    /// Returns true when nothing is defined.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns true when the symbol came from a placeable table.
    #[must_use]
    pub fn is_placeable(&self, symbol: Symbol) -> bool {
        self.placeable.contains(&symbol)
    }

    /// Counters from the flattening run.
    #[must_use]
    pub const fn stats(&self) -> FlattenStats {
        self.stats
    }

    /// Renders the flat table back into a rule table of named references.
    ///
    /// Placement edges attached by linkage are not rendered.
    #[must_use]
    pub fn to_rule_table(&self, label: impl Into<String>) -> RuleTable {
        let mut table = RuleTable::new(label);
        for (symbol, node) in self.defined() {
            let parents = node
                .parents
                .iter()
                .map(|parent| Parent::Named(self.name(*parent).to_string()))
                .collect::<Vec<_>>();
            table.insert(self.name(symbol), Node::from_parents(node.kind, parents));
        }
        table
    }

    /// Interns `name`, growing the definition slots as needed.
    pub(crate) fn intern(&mut self, name: &str) -> Symbol {
        let symbol = self.symbols.intern(name);
        if self.defs.len() < self.symbols.len() {
            self.defs.resize(self.symbols.len(), None);
        }
        symbol
    }

    /// Mutable access to a definition.
    pub(crate) fn node_mut(&mut self, symbol: Symbol) -> Option<&mut FlatNode> {
        self.defs.get_mut(symbol.index()).and_then(Option::as_mut)
    }

    /// Defines (or replaces) the node for a symbol.
    pub(crate) fn define(&mut self, symbol: Symbol, node: FlatNode) {
        if let Some(slot) = self.defs.get_mut(symbol.index()) {
            *slot = Some(node);
        }
    }
}

// ============================================================================
// SECTION: Flatten
// ============================================================================

/// Lifts every inline sub-expression to a named node and interns the result.
///
/// # Panics
///
/// Panics when more lifting rounds run than the cap allows. The cap is the
/// larger of `max_rounds` and the deepest inline nesting in `merged`, and
/// every round removes one level of nesting, so this indicates a compiler
/// defect rather than a rule-authoring error.
#[must_use]
#[allow(clippy::panic, reason = "Exceeding the round cap is an internal defect, not a data error.")]
pub fn flatten(merged: MergedTable, max_rounds: usize) -> FlatTable {
    let MergedTable {
        mut rules,
        mut provenance,
        placeable,
    } = merged;

    let deepest = rules.values().map(Node::inline_depth).max().unwrap_or(0);
    let max_rounds = max_rounds.max(deepest);
    let mut referenced = BTreeSet::new();
    for node in rules.values() {
        collect_references(node, &mut referenced);
    }

    let mut stats = FlattenStats::default();
    let mut pending: Vec<String> = rules.keys().cloned().collect();

    loop {
        let mut lifted: BTreeMap<String, Node> = BTreeMap::new();
        for owner in &pending {
            let Some(mut node) = rules.remove(owner) else {
                continue;
            };
            let mut discriminator = 0usize;
            for parent in &mut node.parents {
                if !parent.is_inline() {
                    continue;
                }
                let name = loop {
                    discriminator += 1;
                    let candidate = format!("{owner} {discriminator}");
                    if candidate != *owner
                        && !rules.contains_key(&candidate)
                        && !lifted.contains_key(&candidate)
                        && !referenced.contains(&candidate)
                    {
                        break candidate;
                    }
                };
                if let Parent::Inline(sub) = std::mem::replace(parent, Parent::Named(name.clone()))
                {
                    let source = provenance.get(owner).cloned().unwrap_or_default();
                    provenance.insert(name.clone(), source);
                    lifted.insert(name, *sub);
                }
            }
            rules.insert(owner.clone(), node);
        }

        if lifted.is_empty() {
            break;
        }
        stats.rounds += 1;
        stats.synthesized += lifted.len();
        if stats.rounds > max_rounds {
            panic!(
                "flattening exceeded {max_rounds} rounds; inline expressions failed to converge"
            );
        }
        pending = lifted.keys().cloned().collect();
        rules.extend(lifted);
    }

    intern(rules, &provenance, &placeable, stats)
}

/// Adds every name referenced by `node`, including inside inline parents.
fn collect_references(node: &Node, referenced: &mut BTreeSet<String>) {
    for parent in &node.parents {
        match parent {
            Parent::Named(name) => {
                referenced.insert(name.clone());
            }
            Parent::Inline(sub) => collect_references(sub, referenced),
        }
    }
}

/// Converts the fully named rule map into a dense, interned table.
fn intern(
    rules: BTreeMap<String, Node>,
    provenance: &BTreeMap<String, String>,
    placeable: &BTreeSet<String>,
    stats: FlattenStats,
) -> FlatTable {
    let mut table = FlatTable {
        symbols: SymbolTable::new(),
        defs: Vec::with_capacity(rules.len()),
        placeable: BTreeSet::new(),
        stats,
    };

    // Defined names take the low symbols, in name order.
    for name in rules.keys() {
        table.intern(name);
    }

    for (name, node) in &rules {
        let symbol = table.intern(name);
        let parents = node
            .parents
            .iter()
            .filter_map(Parent::as_name)
            .map(|parent| table.intern(parent))
            .collect::<SmallVec<[Symbol; 4]>>();
        let source = provenance.get(name).cloned().unwrap_or_default();
        table.define(
            symbol,
            FlatNode {
                kind: node.kind,
                parents,
                placements: SmallVec::new(),
                source,
            },
        );
        if placeable.contains(name) {
            table.placeable.insert(symbol);
        }
    }

    table
}
