// crates/logic-graph/src/compiler.rs
// ============================================================================
// Module: Compile Pipeline
// Description: Explicit compiler value running merge, flatten and validate.
// Purpose: Produce validated logic that hosts link and freeze for solvers.
// Dependencies: crate::{events, exemption, flatten, graph, linkage, merge, table,
//              validate}, thiserror
// ============================================================================

//! ## Overview
//! [`LogicCompiler`] is an ordinary value: build one per rule set, hand it the
//! tables, an [`ExemptionPolicy`] and [`CompileLimits`], then call
//! [`LogicCompiler::compile`]. Independent compilers share nothing, so several
//! rule sets (or tests) can compile concurrently.
//!
//! Stages run strictly in order: MERGE, FLATTEN, VALIDATE. The result is a
//! [`CompiledLogic`] that the host may link with placement records and then
//! freeze into a [`LogicGraph`].

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::sync::Arc;

use thiserror::Error;

use crate::events::CompileEvent;
use crate::events::CompileSink;
use crate::events::CompileStage;
use crate::events::NoopCompileSink;
use crate::exemption::ExemptionPolicy;
use crate::exemption::ExemptionRule;
use crate::flatten::FlatTable;
use crate::flatten::flatten;
use crate::graph::FreezeError;
use crate::graph::GraphExport;
use crate::graph::LogicGraph;
use crate::graph::export_flat;
use crate::linkage::LinkStats;
use crate::linkage::PlacementRecord;
use crate::linkage::link;
use crate::merge::MergeError;
use crate::merge::merge_tables;
use crate::table::RuleTable;
use crate::validate::ValidationReport;
use crate::validate::validate;

// ============================================================================
// SECTION: Limits
// ============================================================================

/// Default flattening round cap.
pub const DEFAULT_MAX_FLATTEN_ROUNDS: usize = 64;

/// Safety limits for a compilation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CompileLimits {
    /// Flattening round cap; raised to the deepest inline nesting of the
    /// input, so only a compiler defect can exceed it.
    pub max_flatten_rounds: usize,
}

impl Default for CompileLimits {
    fn default() -> Self {
        Self {
            max_flatten_rounds: DEFAULT_MAX_FLATTEN_ROUNDS,
        }
    }
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Compilation failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CompileError {
    /// Two tables define the same name.
    #[error(transparent)]
    Merge(#[from] MergeError),
    /// Structural validation found defects.
    #[error(transparent)]
    Validation(#[from] ValidationReport),
}

// ============================================================================
// SECTION: Compiler
// ============================================================================

/// Compiler for one rule set.
pub struct LogicCompiler {
    /// Tables in authoring order.
    tables: Vec<RuleTable>,
    /// Dead-end exemption policy.
    policy: ExemptionPolicy,
    /// Safety limits.
    limits: CompileLimits,
    /// Event destination.
    sink: Arc<dyn CompileSink>,
}

impl Default for LogicCompiler {
    fn default() -> Self {
        Self::new()
    }
}

impl LogicCompiler {
    /// Creates a compiler with no tables, an empty policy and default limits.
    #[must_use]
    pub fn new() -> Self {
        Self {
            tables: Vec::new(),
            policy: ExemptionPolicy::new(),
            limits: CompileLimits::default(),
            sink: Arc::new(NoopCompileSink),
        }
    }

    /// Adds a table.
    #[must_use]
    pub fn with_table(mut self, table: RuleTable) -> Self {
        self.tables.push(table);
        self
    }

    /// Adds several tables.
    #[must_use]
    pub fn with_tables(mut self, tables: impl IntoIterator<Item = RuleTable>) -> Self {
        self.tables.extend(tables);
        self
    }

    /// Replaces the exemption policy.
    #[must_use]
    pub fn with_policy(mut self, policy: ExemptionPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Replaces the safety limits.
    #[must_use]
    pub const fn with_limits(mut self, limits: CompileLimits) -> Self {
        self.limits = limits;
        self
    }

    /// Routes compile events to `sink`.
    #[must_use]
    pub fn with_sink(mut self, sink: Arc<dyn CompileSink>) -> Self {
        self.sink = sink;
        self
    }

    /// Adds a table in place.
    pub fn add_table(&mut self, table: RuleTable) {
        self.tables.push(table);
    }

    /// Tables registered so far.
    #[must_use]
    pub fn tables(&self) -> &[RuleTable] {
        &self.tables
    }

    /// Active exemption policy.
    #[must_use]
    pub const fn policy(&self) -> &ExemptionPolicy {
        &self.policy
    }

    /// Runs merge, flatten and validate.
    ///
    /// # Errors
    ///
    /// Returns [`CompileError::Merge`] on the first duplicate name, or
    /// [`CompileError::Validation`] with every structural defect.
    pub fn compile(&self) -> Result<CompiledLogic, CompileError> {
        let merged = match merge_tables(&self.tables) {
            Ok(merged) => merged,
            Err(err) => {
                self.sink.record(
                    &CompileEvent::new(CompileStage::Merge, "merge_failed").error(&err),
                );
                return Err(err.into());
            }
        };
        self.sink.record(
            &CompileEvent::new(CompileStage::Merge, "merge_completed")
                .count("tables", self.tables.len())
                .count("nodes", merged.len()),
        );

        let table = flatten(merged, self.limits.max_flatten_rounds);
        let stats = table.stats();
        self.sink.record(
            &CompileEvent::new(CompileStage::Flatten, "flatten_completed")
                .count("rounds", stats.rounds)
                .count("synthesized", stats.synthesized)
                .count("nodes", table.len())
                .count("symbols", table.symbols().len()),
        );

        if let Err(report) = validate(&table, &self.policy) {
            self.sink.record(
                &CompileEvent::new(CompileStage::Validate, "validation_failed")
                    .count("issues", report.len())
                    .issues(report.issues()),
            );
            return Err(report.into());
        }
        let unused = self.policy.unused_rules(&table);
        self.sink.record(
            &CompileEvent::new(CompileStage::Validate, "validation_passed")
                .count("nodes", table.len())
                .count("unused_exemptions", unused.len())
                .issues(unused.iter().map(|rule| format!("unused exemption {rule}"))),
        );

        Ok(CompiledLogic {
            table,
            unused_exemptions: unused,
            sink: Arc::clone(&self.sink),
        })
    }
}

// ============================================================================
// SECTION: Compiled Logic
// ============================================================================

/// Validated logic owned by the host until it is frozen.
pub struct CompiledLogic {
    /// Flat, interned, validated table.
    table: FlatTable,
    /// Exemption rules that matched nothing.
    unused_exemptions: Vec<ExemptionRule>,
    /// Event destination inherited from the compiler.
    sink: Arc<dyn CompileSink>,
}

impl CompiledLogic {
    /// Flat table backing this compilation.
    #[must_use]
    pub const fn table(&self) -> &FlatTable {
        &self.table
    }

    /// Exemption rules that exempted no node.
    #[must_use]
    pub fn unused_exemptions(&self) -> &[ExemptionRule] {
        &self.unused_exemptions
    }

    /// Read-only copy of every compiled node.
    #[must_use]
    pub fn export(&self) -> GraphExport {
        export_flat(&self.table, |_| true)
    }

    /// Read-only copy of `Root` nodes contributed by placeable tables.
    #[must_use]
    pub fn extra_items(&self) -> GraphExport {
        let table = &self.table;
        export_flat(table, |symbol| {
            table.is_placeable(symbol) && table.node(symbol).is_some_and(|node| node.kind.is_root())
        })
    }

    /// Attaches placement records; repeated application adds nothing.
    pub fn link(&mut self, records: &[PlacementRecord]) -> LinkStats {
        let stats = link(&mut self.table, records);
        self.sink.record(
            &CompileEvent::new(CompileStage::Link, "link_applied")
                .count("records", records.len())
                .count("edges_added", stats.edges_added)
                .count("nodes_created", stats.nodes_created)
                .count("unchanged", stats.unchanged),
        );
        stats
    }

    /// Resolves every reference and freezes the graph for shared reads.
    ///
    /// # Errors
    ///
    /// Returns [`FreezeError::UnresolvedReferences`] listing every parent that
    /// names an undefined node.
    pub fn freeze(self) -> Result<LogicGraph, FreezeError> {
        match LogicGraph::freeze(&self.table) {
            Ok(graph) => {
                self.sink.record(
                    &CompileEvent::new(CompileStage::Freeze, "graph_frozen")
                        .count("nodes", graph.len()),
                );
                Ok(graph)
            }
            Err(err) => {
                let FreezeError::UnresolvedReferences(references) = &err;
                self.sink.record(
                    &CompileEvent::new(CompileStage::Freeze, "freeze_failed")
                        .count("unresolved", references.len())
                        .issues(references)
                        .error(&err),
                );
                Err(err)
            }
        }
    }
}
