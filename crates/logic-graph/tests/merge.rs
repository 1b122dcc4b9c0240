// crates/logic-graph/tests/merge.rs
// ============================================================================
// Module: Namespace Merge Tests
// Description: Disjoint-union merge and duplicate-name rejection.
// ============================================================================
//! ## Overview
//! Integration tests for combining rule tables into one namespace.

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

use logic_graph::MergeError;
use logic_graph::and;
use logic_graph::merge_tables;
use logic_graph::or;
use logic_graph::root;
use logic_graph::rule_table;
use support::TestResult;
use support::ensure;

#[test]
fn disjoint_tables_merge_with_every_entry() -> TestResult {
    let items = rule_table!(placeable "items"; "sword" => root!(), "bombs" => root!());
    let d1 = rule_table!("d1"; "enter d1" => and!("sword"), "d1 boss" => or!("bombs", "enter d1"));

    let merged = merge_tables(&[items.clone(), d1.clone()])?;
    ensure(merged.len() == 4, "expected all four entries")?;
    for (name, node) in items.iter().chain(d1.iter()) {
        ensure(merged.get(name) == Some(node), format!("entry {name} should survive unchanged"))?;
    }
    ensure(merged.source_of("sword") == Some("items"), "sword comes from items")?;
    ensure(merged.source_of("d1 boss") == Some("d1"), "d1 boss comes from d1")?;
    Ok(())
}

#[test]
fn duplicate_across_tables_is_fatal() -> TestResult {
    let first = rule_table!("overworld"; "enter d1" => root!());
    let second = rule_table!("d1"; "enter d1" => and!("sword"));

    let err = merge_tables(&[first, second]).unwrap_err();
    ensure(
        err == MergeError::DuplicateName {
            name: "enter d1".to_string(),
            first_table: "overworld".to_string(),
            second_table: "d1".to_string(),
        },
        format!("unexpected error {err:?}"),
    )?;
    ensure(err.to_string().contains("enter d1"), "message names the duplicate")?;
    Ok(())
}

#[test]
fn duplicate_within_one_table_is_fatal() -> TestResult {
    let table = rule_table!("d1"; "d1 key" => root!(), "d1 key" => and!("d1 key chest"));
    let result = merge_tables(&[table]);
    ensure(
        matches!(result, Err(MergeError::DuplicateName { ref first_table, ref second_table, .. })
            if first_table == "d1" && second_table == "d1"),
        "same-table duplicate should be rejected",
    )?;
    Ok(())
}

#[test]
fn inputs_are_not_mutated() -> TestResult {
    let items = rule_table!("items"; "sword" => root!());
    let before = items.clone();
    let _ = merge_tables(std::slice::from_ref(&items))?;
    ensure(items == before, "merge must borrow tables without changing them")?;
    Ok(())
}

#[test]
fn placeable_flag_follows_table() -> TestResult {
    let items = rule_table!(placeable "items"; "sword" => root!());
    let world = rule_table!("world"; "start" => root!());
    let merged = merge_tables(&[items, world])?;
    ensure(merged.contains("sword") && merged.contains("start"), "both names present")?;
    ensure(merged.is_placeable("sword"), "items entries are placeable")?;
    ensure(!merged.is_placeable("start"), "world entries are not placeable")?;
    Ok(())
}
