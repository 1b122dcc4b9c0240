// crates/logic-graph-solver/tests/proptest_count.rs
// ============================================================================
// Module: Count Threshold Property-Based Tests
// Description: Threshold gates across random producer sets and table orders.
// Purpose: Check that thresholds count producers and ignore evaluation order.
// ============================================================================

//! Property-based tests for `Count` evaluation.

#![allow(
    clippy::panic,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::use_debug,
    clippy::panic_in_result_fn,
    clippy::unwrap_in_result,
    reason = "Test-only assertions and helpers are permitted."
)]

use logic_graph::ExemptionPolicy;
use logic_graph::LogicCompiler;
use logic_graph::Node;
use logic_graph::RuleTable;
use logic_graph::and_slot;
use logic_graph::and_step;
use logic_graph::builder;
use logic_graph::count;
use logic_graph::hard_and;
use logic_graph::root;
use logic_graph_solver::Difficulty;
use logic_graph_solver::Inventory;
use logic_graph_solver::Reachability;
use proptest::prelude::*;

/// Number of producers of the key.
const PRODUCERS: usize = 6;

/// Rule entries for a door needing `min` of [`PRODUCERS`] sealed chests.
fn entries(min: u32) -> Vec<(String, Node)> {
    let chests: Vec<String> = (0 .. PRODUCERS).map(|index| format!("chest {index}")).collect();
    let mut entries = vec![
        ("start".to_string(), root!()),
        ("sealed".to_string(), hard_and!("start")),
        ("key".to_string(), builder::or(chests.iter().map(String::as_str))),
        ("door".to_string(), count!(min, "key")),
        ("goal".to_string(), and_step!("door")),
    ];
    entries.extend(chests.iter().map(|chest| (chest.clone(), and_slot!("start", "sealed"))));
    entries
}

proptest! {
    #[test]
    fn door_opens_exactly_at_the_threshold(
        min in 1u32 ..= 4,
        granted in prop::collection::btree_set(0 .. PRODUCERS, 0 ..= PRODUCERS),
        order in Just((0 .. PRODUCERS + 5).collect::<Vec<usize>>()).prop_shuffle(),
    ) {
        let mut pool: Vec<Option<(String, Node)>> = entries(min).into_iter().map(Some).collect();
        let mut table = RuleTable::new("shuffled");
        table.extend(order.iter().filter_map(|index| pool[*index].take()));

        let logic = LogicCompiler::new()
            .with_table(table)
            .with_policy(ExemptionPolicy::new().name("goal"))
            .compile()?;
        let graph = logic.freeze()?;
        let inventory: Inventory = granted.iter().map(|index| format!("chest {index}")).collect();
        let open = Reachability::new(&graph, Difficulty::Normal).is_reachable(&inventory, "door")?;
        let expected = u32::try_from(granted.len()).unwrap() >= min;
        prop_assert_eq!(open, expected);
    }
}
