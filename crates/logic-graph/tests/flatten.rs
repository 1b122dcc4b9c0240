// crates/logic-graph/tests/flatten.rs
// ============================================================================
// Module: Flattening Tests
// Description: Inline lifting, synthetic naming, fixed point and round cap.
// ============================================================================
//! ## Overview
//! Integration tests for lifting nested expressions into named nodes.

#![allow(
    clippy::panic,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::use_debug,
    clippy::panic_in_result_fn,
    clippy::unwrap_in_result,
    reason = "Test-only output and panic-based assertions are permitted."
)]

mod support;

use logic_graph::FlatTable;
use logic_graph::NodeKind;
use logic_graph::RuleTable;
use logic_graph::and;
use logic_graph::and_slot;
use logic_graph::flatten;
use logic_graph::hard_and;
use logic_graph::merge_tables;
use logic_graph::or;
use logic_graph::root;
use logic_graph::rule_table;
use support::TestResult;
use support::ensure;

/// Merges and flattens `tables` with a generous round cap.
fn flat(tables: &[RuleTable]) -> TestResult<FlatTable> {
    Ok(flatten(merge_tables(tables)?, 16))
}

/// Parent names of `node` in `table`.
fn parent_names(table: &FlatTable, node: &str) -> Vec<String> {
    table
        .get(node)
        .map(|flat| flat.parents.iter().map(|parent| table.name(*parent).to_string()).collect())
        .unwrap_or_default()
}

#[test]
fn nested_expressions_get_owner_derived_names() -> TestResult {
    let table = rule_table!("d1";
        "d1 boss" => and!("d1 boss door", or!("d1 map chest", hard_and!("bombs", "start"))),
        "d1 ring chest" => and_slot!("enter d1", or!("ember satchel", "mystery satchel")),
    );
    let flat = flat(&[table])?;

    ensure(parent_names(&flat, "d1 boss") == ["d1 boss door", "d1 boss 1"], "d1 boss rewritten")?;
    let second = parent_names(&flat, "d1 boss 1");
    ensure(second == ["d1 map chest", "d1 boss 1 1"], "second level named")?;
    ensure(flat.get("d1 boss 1 1").map(|node| node.kind) == Some(NodeKind::HardAnd), "kind kept")?;
    ensure(flat.get("d1 ring chest 1").map(|node| node.kind) == Some(NodeKind::Or), "slot child")?;
    ensure(flat.stats().rounds == 2, format!("rounds {}", flat.stats().rounds))?;
    ensure(flat.stats().synthesized == 3, format!("synthesized {}", flat.stats().synthesized))?;
    Ok(())
}

#[test]
fn discriminator_counts_per_owner() -> TestResult {
    let table = rule_table!("t"; "gate" => or!(and!("a", "b"), "c", and!("d", "e")));
    let flat = flat(&[table])?;
    ensure(parent_names(&flat, "gate") == ["gate 1", "c", "gate 2"], "k increments per inline")?;
    Ok(())
}

#[test]
fn synthetic_names_skip_taken_names() -> TestResult {
    let authored = rule_table!("t";
        "gate" => or!(and!("a"), and!("b")),
        "gate 1" => root!(),
    );
    let flat = flat(&[authored])?;
    ensure(parent_names(&flat, "gate") == ["gate 2", "gate 3"], "gate 1 is taken")?;
    let kept = flat.get("gate 1").map(|node| node.kind);
    ensure(kept == Some(NodeKind::Root), "authored gate 1 kept")?;
    Ok(())
}

#[test]
fn synthetic_names_skip_referenced_names() -> TestResult {
    let table = rule_table!("t";
        "x" => and!(or!("a", "b")),
        "gate" => and!("x 1"),
    );
    let flat = flat(&[table])?;
    ensure(parent_names(&flat, "x") == ["x 2"], "x 1 is referenced elsewhere")?;
    ensure(!flat.contains("x 1"), "x 1 stays free for linkage")?;
    ensure(parent_names(&flat, "gate") == ["x 1"], "reference unchanged")?;
    Ok(())
}

#[test]
fn synthetic_nodes_inherit_owner_provenance() -> TestResult {
    let table = rule_table!("dungeons"; "d1 boss" => and!(or!("a", "b")));
    let flat = flat(&[table])?;
    ensure(flat.get("d1 boss 1").map(|node| node.source.as_str()) == Some("dungeons"), "source")?;
    Ok(())
}

#[test]
fn no_inline_parent_survives_and_every_parent_is_interned() -> TestResult {
    let table = rule_table!("t";
        "x" => and!(or!(and!(or!("deep")))),
        "y" => or!("x", and!("z")),
    );
    let flat = flat(&[table])?;
    for (symbol, node) in flat.defined() {
        for parent in &node.parents {
            ensure(flat.symbols().get(flat.name(*parent)) == Some(*parent), "parent interned")?;
        }
        ensure(!flat.name(symbol).is_empty(), "defined symbols are named")?;
    }
    ensure(flat.get("x 1 1 1").is_some(), "third-level lift present")?;
    Ok(())
}

#[test]
fn flattening_is_deterministic() -> TestResult {
    let build = || {
        vec![
            rule_table!("a"; "m" => or!(and!("p", "q"), "r")),
            rule_table!("b"; "n" => and!(or!("m", and!("s")))),
        ]
    };
    let first = flat(&build())?.to_rule_table("out");
    let second = flat(&build())?.to_rule_table("out");
    ensure(first == second, "two runs must agree")?;
    Ok(())
}

#[test]
fn flattening_a_flat_table_is_a_no_op() -> TestResult {
    let table = rule_table!("t"; "x" => and!(or!("a", and!("b", "c"))), "a" => root!());
    let once = flat(&[table])?;
    let again = flat(&[once.to_rule_table("t")])?;
    ensure(again.stats().synthesized == 0, "no new nodes on second pass")?;
    ensure(again.len() == once.len(), "same node count")?;
    ensure(again.to_rule_table("t") == once.to_rule_table("t"), "same shape")?;
    Ok(())
}

#[test]
fn undefined_references_are_interned_but_not_defined() -> TestResult {
    let flat = flat(&[rule_table!("t"; "door" => and!("d1 small key"))])?;
    ensure(flat.symbols().get("d1 small key").is_some(), "reference interned")?;
    ensure(!flat.contains("d1 small key"), "but not defined")?;
    ensure(flat.len() == 1, "one defined node")?;
    Ok(())
}

#[test]
fn nesting_deeper_than_the_round_cap_still_converges() -> TestResult {
    let table = rule_table!("t"; "chest" => and_slot!(or!("a", and!("b", or!("c")))));
    let flat = flatten(merge_tables(&[table])?, 1);
    ensure(flat.stats().rounds == 3, format!("rounds {}", flat.stats().rounds))?;
    ensure(parent_names(&flat, "chest 1 1") == ["b", "chest 1 1 1"], "deepest level lifted")?;
    ensure(parent_names(&flat, "chest 1 1 1") == ["c"], "innermost node named")?;
    Ok(())
}
