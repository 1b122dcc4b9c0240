// crates/logic-graph/src/lib.rs
// ============================================================================
// Module: Logic Graph Root
// Description: Public API surface for the rule-graph compiler.
// Purpose: Wire together the model, compile stages, frozen graph and macros.
// Dependencies: crate::{builder, compiler, events, exemption, flatten, graph, linkage,
//              merge, node, source, symbol, table, validate}
// ============================================================================

//! ## Overview
//! Rule authors describe completion logic as tables of named, possibly nested
//! boolean and threshold expressions. This crate merges those tables, lifts
//! nested expressions into named nodes, validates the structure, links
//! run-specific placements and freezes the result into an immutable graph that
//! reachability solvers read through [`LogicReader`].
//!
//! ```ignore
//! let dungeon = rule_table!("d1";
//!     "d1 entrance" => and!("gale seeds"),
//!     "d1 boss" => and_slot!("d1 entrance", or!("sword", "bombs")),
//! );
//! let items = rule_table!(placeable "items";
//!     "gale seeds" => root!(),
//!     "sword" => root!(),
//!     "bombs" => root!(),
//! );
//! let compiled = LogicCompiler::new().with_table(items).with_table(dungeon).compile()?;
//! let graph = compiled.freeze()?;
//! ```

// ============================================================================
// SECTION: Core Modules
// ============================================================================

pub mod builder;
pub mod compiler;
pub mod events;
pub mod exemption;
pub mod flatten;
pub mod graph;
pub mod linkage;
pub mod merge;
pub mod node;
pub mod source;
pub mod symbol;
pub mod table;
pub mod validate;


// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use builder::NodeBuilder;
pub use compiler::CompileError;
pub use compiler::CompileLimits;
pub use compiler::CompiledLogic;
pub use compiler::DEFAULT_MAX_FLATTEN_ROUNDS;
pub use compiler::LogicCompiler;
pub use events::CompileEvent;
pub use events::CompileSink;
pub use events::CompileStage;
pub use events::FileCompileSink;
pub use events::MemoryCompileSink;
pub use events::NoopCompileSink;
pub use events::StderrCompileSink;
pub use exemption::ExemptionError;
pub use exemption::ExemptionPolicy;
pub use exemption::ExemptionRule;
pub use flatten::FlatNode;
pub use flatten::FlatTable;
pub use flatten::FlattenStats;
pub use flatten::flatten;
pub use graph::ExportError;
pub use graph::ExportedNode;
pub use graph::FreezeError;
pub use graph::GraphExport;
pub use graph::LogicGraph;
pub use graph::LogicReader;
pub use graph::NodeId;
pub use graph::UnresolvedReference;
pub use linkage::LinkStats;
pub use linkage::PlacementRecord;
pub use merge::MergeError;
pub use merge::MergedTable;
pub use merge::merge_tables;
pub use node::Combinator;
pub use node::Node;
pub use node::NodeKind;
pub use node::Parent;
pub use source::SourceError;
pub use source::TableFormat;
pub use source::load_table_file;
pub use source::load_table_str;
pub use symbol::Symbol;
pub use symbol::SymbolTable;
pub use table::RuleTable;
pub use validate::IssueKind;
pub use validate::ValidationIssue;
pub use validate::ValidationReport;
pub use validate::validate;

// ============================================================================
// SECTION: Authoring Macros
// ============================================================================

/// Expands a kind and a list of parents into a [`Node`].
///
/// Parents may be names (`&str`, `String`) or nested [`Node`] expressions.
#[doc(hidden)]
#[macro_export]
macro_rules! __node {
    ($kind:expr; $($parent:expr),* $(,)?) => {
        $crate::node::Node::from_parents(
            $kind,
            ::std::vec![$($crate::node::Parent::from($parent)),*],
        )
    };
}

/// Root fact, conjoined with any listed parents.
#[macro_export]
macro_rules! root {
    ($($parent:expr),* $(,)?) => { $crate::__node!($crate::node::NodeKind::Root; $($parent),*) };
}

/// All parents must hold.
#[macro_export]
macro_rules! and {
    ($($parent:expr),* $(,)?) => { $crate::__node!($crate::node::NodeKind::And; $($parent),*) };
}

/// Any parent must hold.
#[macro_export]
macro_rules! or {
    ($($parent:expr),* $(,)?) => { $crate::__node!($crate::node::NodeKind::Or; $($parent),*) };
}

/// Item-placement location gated by all parents.
#[macro_export]
macro_rules! and_slot {
    ($($parent:expr),* $(,)?) => { $crate::__node!($crate::node::NodeKind::AndSlot; $($parent),*) };
}

/// Item-placement location gated by any parent.
#[macro_export]
macro_rules! or_slot {
    ($($parent:expr),* $(,)?) => { $crate::__node!($crate::node::NodeKind::OrSlot; $($parent),*) };
}

/// Routing milestone gated by all parents.
#[macro_export]
macro_rules! and_step {
    ($($parent:expr),* $(,)?) => { $crate::__node!($crate::node::NodeKind::AndStep; $($parent),*) };
}

/// Routing milestone gated by any parent.
#[macro_export]
macro_rules! or_step {
    ($($parent:expr),* $(,)?) => { $crate::__node!($crate::node::NodeKind::OrStep; $($parent),*) };
}

/// `and!` that only holds under hard difficulty.
#[macro_export]
macro_rules! hard_and {
    ($($parent:expr),* $(,)?) => { $crate::__node!($crate::node::NodeKind::HardAnd; $($parent),*) };
}

/// `or!` that only holds under hard difficulty.
#[macro_export]
macro_rules! hard_or {
    ($($parent:expr),* $(,)?) => { $crate::__node!($crate::node::NodeKind::HardOr; $($parent),*) };
}

/// At least `min` reachable producers of `resource`.
#[macro_export]
macro_rules! count {
    ($min:expr, $resource:expr $(,)?) => {
        $crate::builder::count($min, $resource)
    };
}

/// Literal rule table.
///
/// ```ignore
/// let table = rule_table!("d1"; "d1 entrance" => and!("gale seeds"));
/// let items = rule_table!(placeable "items"; "gale seeds" => root!());
/// ```
#[macro_export]
macro_rules! rule_table {
    (placeable $label:expr; $($name:expr => $node:expr),* $(,)?) => {
        $crate::table::RuleTable::placeable($label)$(.with($name, $node))*
    };
    ($label:expr; $($name:expr => $node:expr),* $(,)?) => {
        $crate::table::RuleTable::new($label)$(.with($name, $node))*
    };
}
