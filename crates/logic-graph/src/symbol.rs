// crates/logic-graph/src/symbol.rs
// ============================================================================
// Module: Symbol Interning
// Description: Dense integer handles for rule names.
// Purpose: Let flattening, validation, and the frozen graph work on indices.
// Dependencies: serde::{Deserialize, Serialize}
// ============================================================================

//! ## Overview
//! Every name seen during flattening (defined or merely referenced) receives a
//! [`Symbol`]. Symbols are dense, so per-node data lives in plain vectors.

use std::collections::HashMap;
use std::fmt;

use serde::Deserialize;
use serde::Serialize;

/// Dense handle for an interned rule name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[repr(transparent)]
pub struct Symbol(usize);

impl Symbol {
    /// Position of this symbol in its table.
    #[must_use]
    pub const fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Bidirectional name/symbol map.
///
/// # Invariants
/// - `names[s.index()]` is the name interned as `s`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SymbolTable {
    /// Names in interning order.
    names: Vec<String>,
    /// Reverse lookup.
    ids: HashMap<String, Symbol>,
}

impl SymbolTable {
    /// Creates an empty table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the symbol for `name`, interning it on first sight.
    pub fn intern(&mut self, name: &str) -> Symbol {
        if let Some(symbol) = self.ids.get(name) {
            return *symbol;
        }
        let symbol = Symbol(self.names.len());
        self.names.push(name.to_string());
        self.ids.insert(name.to_string(), symbol);
        symbol
    }

    /// Looks up an already-interned name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<Symbol> {
        self.ids.get(name).copied()
    }

    /// Name for a symbol issued by this table.
    #[must_use]
    pub fn name(&self, symbol: Symbol) -> &str {
        self.names.get(symbol.0).map_or("", String::as_str)
    }

    /// Number of interned names.
    #[must_use]
    pub fn len(&self) -> usize {
        self.names.len()
    }

    /// Returns true when nothing has been interned.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Iterates symbols with their names in interning order.
    pub fn iter(&self) -> impl Iterator<Item = (Symbol, &str)> {
        self.names.iter().enumerate().map(|(index, name)| (Symbol(index), name.as_str()))
    }
}
