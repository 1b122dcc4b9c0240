// crates/logic-graph/tests/proptest_flatten.rs
// ============================================================================
// Module: Merge and Flatten Property-Based Tests
// Description: Property tests for merge injectivity and flatten invariants.
// Purpose: Check structural guarantees across randomly nested rule sets.
// ============================================================================

//! Property-based tests for merge and flattening invariants.

#![allow(
    clippy::panic,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::use_debug,
    clippy::panic_in_result_fn,
    clippy::unwrap_in_result,
    reason = "Test-only assertions and helpers are permitted."
)]

use std::collections::BTreeMap;
use std::collections::BTreeSet;

use logic_graph::FlatTable;
use logic_graph::Node;
use logic_graph::NodeKind;
use logic_graph::Parent;
use logic_graph::RuleTable;
use logic_graph::flatten;
use logic_graph::merge_tables;
use proptest::prelude::*;

fn kind_strategy() -> impl Strategy<Value = NodeKind> {
    prop_oneof![
        Just(NodeKind::Root),
        Just(NodeKind::And),
        Just(NodeKind::Or),
        Just(NodeKind::AndSlot),
        Just(NodeKind::OrStep),
        Just(NodeKind::HardAnd),
        Just(NodeKind::HardOr),
    ]
}

fn node_strategy() -> impl Strategy<Value = Node> {
    let leaf = (kind_strategy(), prop::collection::vec("[a-f]{1,2}", 0 .. 3))
        .prop_map(|(kind, names)| Node::new(kind, names));
    leaf.prop_recursive(4, 32, 4, |inner| {
        let parent = prop_oneof!["[a-f]{1,2}".prop_map(Parent::from), inner.prop_map(Parent::from)];
        (kind_strategy(), prop::collection::vec(parent, 1 .. 4))
            .prop_map(|(kind, parents)| Node::new(kind, parents))
    })
}

fn table_strategy(label: &'static str) -> impl Strategy<Value = RuleTable> {
    prop::collection::btree_map("[a-h]{1,2}", node_strategy(), 0 .. 6).prop_map(move |rules| {
        let mut table = RuleTable::new(label);
        table.extend(rules);
        table
    })
}

/// Inline expressions anywhere below `node`.
fn inline_count(node: &Node) -> usize {
    node.parents
        .iter()
        .map(|parent| match parent {
            Parent::Named(_) => 0,
            Parent::Inline(inner) => 1 + inline_count(inner),
        })
        .sum()
}

/// Node kinds of `table`, keyed by name.
fn kinds_by_name(table: &FlatTable) -> BTreeMap<String, NodeKind> {
    table.defined().map(|(symbol, node)| (table.name(symbol).to_string(), node.kind)).collect()
}

proptest! {
    #[test]
    fn merge_succeeds_exactly_when_keys_are_disjoint(
        left in table_strategy("left"),
        right in table_strategy("right"),
    ) {
        let left_keys: BTreeSet<&str> = left.iter().map(|(name, _)| name).collect();
        let right_keys: BTreeSet<&str> = right.iter().map(|(name, _)| name).collect();
        let disjoint = left_keys.is_disjoint(&right_keys);
        let result = merge_tables(&[left.clone(), right.clone()]);
        prop_assert_eq!(result.is_ok(), disjoint);
        if let Ok(merged) = result {
            prop_assert_eq!(merged.len(), left.len() + right.len());
        }
    }

    #[test]
    fn flatten_lifts_every_inline_exactly_once(table in table_strategy("t")) {
        let expected_synthetic: usize = table.iter().map(|(_, node)| inline_count(node)).sum();
        let authored = table.len();
        let flat = flatten(merge_tables(&[table])?, 16);
        prop_assert_eq!(flat.stats().synthesized, expected_synthetic);
        prop_assert_eq!(flat.len(), authored + expected_synthetic);
        for (_, node) in flat.defined() {
            for parent in &node.parents {
                prop_assert_eq!(flat.symbols().get(flat.name(*parent)), Some(*parent));
            }
        }
    }

    #[test]
    fn flatten_is_idempotent_and_deterministic(table in table_strategy("t")) {
        let once = flatten(merge_tables(std::slice::from_ref(&table))?, 16);
        let repeat = flatten(merge_tables(&[table])?, 16);
        prop_assert_eq!(once.to_rule_table("t"), repeat.to_rule_table("t"));

        let again = flatten(merge_tables(&[once.to_rule_table("t")])?, 16);
        prop_assert_eq!(again.stats().synthesized, 0);
        prop_assert_eq!(kinds_by_name(&again), kinds_by_name(&once));
    }
}
