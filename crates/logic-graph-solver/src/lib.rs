// crates/logic-graph-solver/src/lib.rs
// ============================================================================
// Module: Logic Graph Solver Root
// Description: Reference reachability evaluator for frozen logic graphs.
// Purpose: Make the compiled graph's evaluation semantics testable end to end.
// Dependencies: crate::{inventory, reachability}
// ============================================================================

//! ## Overview
//! Evaluates any [`logic_graph::LogicReader`] against an [`Inventory`] and a
//! [`Difficulty`]. This is a reachability check, not a randomizer: it answers
//! which nodes hold, nothing more.
//!
//! ```ignore
//! let graph = compiled.freeze()?;
//! let reached = Reachability::new(&graph, Difficulty::Normal).solve(&Inventory::new())?;
//! assert!(reached.contains_name(&graph, "d1 boss"));
//! ```

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod inventory;
pub mod reachability;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use inventory::Difficulty;
pub use inventory::Inventory;
pub use reachability::Reachability;
pub use reachability::ReachableSet;
pub use reachability::SolveError;
