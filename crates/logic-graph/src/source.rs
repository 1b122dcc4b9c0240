// crates/logic-graph/src/source.rs
// ============================================================================
// Module: Table Sources
// Description: YAML and JSON authoring format for rule tables.
// Purpose: Load rule tables from data files with strict size and depth limits.
// Dependencies: crate::{node, table}, serde, serde_json, serde_yaml, thiserror
// ============================================================================

//! ## Overview
//! A table file is a mapping from rule name to expression:
//!
//! ```yaml
//! sword: null                       # root()
//! d1 entrance: [gale seeds]         # and(...)
//! d1 boss:
//!   and_slot:
//!     - d1 entrance
//!     - or: [sword, bombs]          # inline sub-expression
//! d1 key door:
//!   count: [2, d1 small key]
//! ```
//!
//! A string is `and(name)`, a list is `and(...)`, `null` is `root()`, and a
//! single-key map selects the kind. Nested lists and maps become inline
//! expressions. Entries keep file order so a name repeated in one file is
//! rejected by the merge rather than silently replaced.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;
use std::fs;
use std::path::Path;

use serde::Deserialize;
use serde::Deserializer;
use serde::de::MapAccess;
use serde::de::Visitor;
use serde_json::Value;
use thiserror::Error;

use crate::node::Node;
use crate::node::NodeKind;
use crate::node::Parent;
use crate::table::RuleTable;

// ============================================================================
// SECTION: Limits
// ============================================================================

/// Maximum table source size in bytes.
pub const MAX_SOURCE_BYTES: usize = 1024 * 1024;
/// Maximum inline nesting depth of one expression.
pub const MAX_EXPRESSION_DEPTH: usize = 32;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Table source loading errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SourceError {
    /// File could not be read.
    #[error("table source io error: {0}")]
    Io(String),
    /// Source exceeds the size limit.
    #[error("table source is {size} bytes, limit is {limit}")]
    TooLarge {
        /// Actual size.
        size: usize,
        /// Allowed size.
        limit: usize,
    },
    /// Source is not valid YAML/JSON or not UTF-8.
    #[error("table source parse error: {0}")]
    Parse(String),
    /// Extension does not name a supported format.
    #[error("unsupported table source extension: {0}")]
    UnsupportedFormat(String),
    /// A rule expression has an invalid shape.
    #[error("rule `{rule}`: {message}")]
    Shape {
        /// Rule being parsed.
        rule: String,
        /// What was wrong.
        message: String,
    },
    /// A rule expression nests deeper than allowed.
    #[error("rule `{rule}` nests deeper than {limit} levels")]
    TooDeep {
        /// Rule being parsed.
        rule: String,
        /// Allowed depth.
        limit: usize,
    },
}

// ============================================================================
// SECTION: Formats
// ============================================================================

/// Supported table source formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableFormat {
    /// YAML document.
    Yaml,
    /// JSON document.
    Json,
}

impl TableFormat {
    /// Selects a format from a file extension.
    #[must_use]
    pub fn from_path(path: &Path) -> Option<Self> {
        match path.extension()?.to_str()? {
            "yaml" | "yml" => Some(Self::Yaml),
            "json" => Some(Self::Json),
            _ => None,
        }
    }
}

// ============================================================================
// SECTION: Loading
// ============================================================================

/// Parses a rule table from text.
///
/// # Errors
///
/// Returns [`SourceError`] when the text is too large, does not parse, or
/// contains an invalid expression.
pub fn load_table_str(
    name: &str,
    text: &str,
    format: TableFormat,
) -> Result<RuleTable, SourceError> {
    if text.len() > MAX_SOURCE_BYTES {
        return Err(SourceError::TooLarge {
            size: text.len(),
            limit: MAX_SOURCE_BYTES,
        });
    }
    let entries: OrderedEntries = match format {
        TableFormat::Yaml => {
            serde_yaml::from_str(text).map_err(|err| SourceError::Parse(err.to_string()))?
        }
        TableFormat::Json => {
            serde_json::from_str(text).map_err(|err| SourceError::Parse(err.to_string()))?
        }
    };
    let mut table = RuleTable::new(name);
    for (rule, value) in entries.0 {
        let node = parse_node(&rule, &value, 0)?;
        table.insert(rule, node);
    }
    Ok(table)
}

/// Loads a rule table from a `.yaml`, `.yml` or `.json` file.
///
/// The table is labelled with the file stem.
///
/// # Errors
///
/// Returns [`SourceError`] when the file cannot be read or parsed.
pub fn load_table_file(path: &Path) -> Result<RuleTable, SourceError> {
    let format = TableFormat::from_path(path)
        .ok_or_else(|| SourceError::UnsupportedFormat(path.display().to_string()))?;
    let bytes = fs::read(path).map_err(|err| SourceError::Io(err.to_string()))?;
    if bytes.len() > MAX_SOURCE_BYTES {
        return Err(SourceError::TooLarge {
            size: bytes.len(),
            limit: MAX_SOURCE_BYTES,
        });
    }
    let text = std::str::from_utf8(&bytes)
        .map_err(|_| SourceError::Parse("table source must be utf-8".to_string()))?;
    let name = path
        .file_stem()
        .map_or_else(|| path.display().to_string(), |stem| stem.to_string_lossy().into_owned());
    load_table_str(&name, text, format)
}

// ============================================================================
// SECTION: Expression Parsing
// ============================================================================

/// Converts one expression value into a node.
fn parse_node(rule: &str, value: &Value, depth: usize) -> Result<Node, SourceError> {
    if depth > MAX_EXPRESSION_DEPTH {
        return Err(SourceError::TooDeep {
            rule: rule.to_string(),
            limit: MAX_EXPRESSION_DEPTH,
        });
    }
    match value {
        Value::Null => Ok(Node::root()),
        Value::String(name) => {
            Ok(Node::from_parents(NodeKind::And, vec![Parent::Named(name.clone())]))
        }
        Value::Array(items) => {
            Ok(Node::from_parents(NodeKind::And, parse_parents(rule, items, depth)?))
        }
        Value::Object(map) => {
            let mut fields = map.iter();
            let (Some((key, body)), None) = (fields.next(), fields.next()) else {
                return Err(shape(rule, format!("expected a single kind key, found {}", map.len())));
            };
            if key == "count" {
                return parse_count(rule, body);
            }
            let kind = NodeKind::from_label(key)
                .ok_or_else(|| shape(rule, format!("unknown node kind `{key}`")))?;
            let parents = match body {
                Value::Null => Vec::new(),
                Value::String(name) => vec![Parent::Named(name.clone())],
                Value::Array(items) => parse_parents(rule, items, depth)?,
                Value::Object(_) => {
                    vec![Parent::Inline(Box::new(parse_node(rule, body, depth + 1)?))]
                }
                Value::Bool(_) | Value::Number(_) => {
                    return Err(shape(rule, format!("`{key}` expects a name or a list")));
                }
            };
            Ok(Node::from_parents(kind, parents))
        }
        Value::Bool(_) | Value::Number(_) => {
            Err(shape(rule, "expected a name, list, map, or null".to_string()))
        }
    }
}

/// Converts a list of parent values.
fn parse_parents(rule: &str, items: &[Value], depth: usize) -> Result<Vec<Parent>, SourceError> {
    items
        .iter()
        .map(|item| match item {
            Value::String(name) => Ok(Parent::Named(name.clone())),
            other => Ok(Parent::Inline(Box::new(parse_node(rule, other, depth + 1)?))),
        })
        .collect()
}

/// Parses `count: [n, resource]`.
fn parse_count(rule: &str, body: &Value) -> Result<Node, SourceError> {
    let expected = || shape(rule, "`count` expects [threshold, resource]".to_string());
    let Value::Array(items) = body else {
        return Err(expected());
    };
    let [threshold, Value::String(resource)] = items.as_slice() else {
        return Err(expected());
    };
    let min = threshold.as_u64().and_then(|value| u32::try_from(value).ok()).ok_or_else(|| {
        shape(rule, "`count` threshold must be a non-negative integer".to_string())
    })?;
    Ok(Node::from_parents(NodeKind::Count { min }, vec![Parent::Named(resource.clone())]))
}

/// Builds a shape error.
fn shape(rule: &str, message: String) -> SourceError {
    SourceError::Shape {
        rule: rule.to_string(),
        message,
    }
}

// ============================================================================
// SECTION: Ordered Entries
// ============================================================================

/// Top-level mapping entries in document order, duplicates kept.
struct OrderedEntries(Vec<(String, Value)>);

impl<'de> Deserialize<'de> for OrderedEntries {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_map(OrderedEntriesVisitor)
    }
}

/// Visitor collecting map entries without deduplication.
struct OrderedEntriesVisitor;

impl<'de> Visitor<'de> for OrderedEntriesVisitor {
    type Value = OrderedEntries;

    fn expecting(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str("a mapping from rule name to expression")
    }

    fn visit_unit<E>(self) -> Result<Self::Value, E>
    where
        E: serde::de::Error,
    {
        Ok(OrderedEntries(Vec::new()))
    }

    fn visit_map<A>(self, mut map: A) -> Result<Self::Value, A::Error>
    where
        A: MapAccess<'de>,
    {
        let mut entries = Vec::with_capacity(map.size_hint().unwrap_or(0));
        while let Some((key, value)) = map.next_entry::<String, Value>()? {
            entries.push((key, value));
        }
        Ok(OrderedEntries(entries))
    }
}
