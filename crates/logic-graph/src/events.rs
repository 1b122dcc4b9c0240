// crates/logic-graph/src/events.rs
// ============================================================================
// Module: Compile Events
// Description: Structured events emitted by the compile pipeline.
// Purpose: Log merge/flatten/validate/link/freeze outcomes as JSON lines.
// Dependencies: serde, serde_json
// ============================================================================

//! ## Overview
//! The pipeline reports each stage through a [`CompileSink`], one event at a
//! time. The bundled sinks write JSON lines to stderr or a file, collect
//! events in memory, or drop them.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::fs::OpenOptions;
use std::io;
use std::io::Write;
use std::path::Path;
use std::sync::Mutex;
use std::sync::PoisonError;
use std::time::SystemTime;
use std::time::UNIX_EPOCH;

use serde::Serialize;

// ============================================================================
// SECTION: Event Types
// ============================================================================

/// Pipeline stage that produced an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CompileStage {
    /// Namespace merge.
    Merge,
    /// Inline lifting and interning.
    Flatten,
    /// Structural validation.
    Validate,
    /// Late-binding placement linkage.
    Link,
    /// Reference resolution and freezing.
    Freeze,
}

/// One structured compile event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CompileEvent {
    /// Event identifier.
    pub event: &'static str,
    /// Event timestamp (milliseconds since epoch).
    pub timestamp_ms: u128,
    /// Stage that produced the event.
    pub stage: CompileStage,
    /// Named counters.
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub counts: BTreeMap<&'static str, usize>,
    /// Rendered issues, for failed validation or freezing.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub issues: Vec<String>,
    /// Fatal error text.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl CompileEvent {
    /// Creates an event with a consistent timestamp.
    #[must_use]
    pub fn new(stage: CompileStage, event: &'static str) -> Self {
        let timestamp_ms =
            SystemTime::now().duration_since(UNIX_EPOCH).unwrap_or_default().as_millis();
        Self {
            event,
            timestamp_ms,
            stage,
            counts: BTreeMap::new(),
            issues: Vec::new(),
            error: None,
        }
    }

    /// Adds a named counter.
    #[must_use]
    pub fn count(mut self, key: &'static str, value: usize) -> Self {
        self.counts.insert(key, value);
        self
    }

    /// Adds rendered issues.
    #[must_use]
    pub fn issues<I, S>(mut self, issues: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: ToString,
    {
        self.issues.extend(issues.into_iter().map(|issue| issue.to_string()));
        self
    }

    /// Attaches a fatal error message.
    #[must_use]
    pub fn error(mut self, error: impl ToString) -> Self {
        self.error = Some(error.to_string());
        self
    }
}

// ============================================================================
// SECTION: Sinks
// ============================================================================

/// Destination for compile events.
pub trait CompileSink: Send + Sync {
    /// Record an event.
    fn record(&self, event: &CompileEvent);
}

/// Sink that writes JSON lines to stderr.
pub struct StderrCompileSink;

impl CompileSink for StderrCompileSink {
    fn record(&self, event: &CompileEvent) {
        if let Ok(payload) = serde_json::to_string(event) {
            let _ = writeln!(std::io::stderr(), "{payload}");
        }
    }
}

/// Sink that appends JSON lines to a file.
pub struct FileCompileSink {
    /// File handle used for append-only logging.
    file: Mutex<std::fs::File>,
}

impl FileCompileSink {
    /// Opens the log file in append mode.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be opened.
    pub fn new(path: &Path) -> io::Result<Self> {
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        Ok(Self {
            file: Mutex::new(file),
        })
    }
}

impl CompileSink for FileCompileSink {
    fn record(&self, event: &CompileEvent) {
        if let Ok(payload) = serde_json::to_string(event)
            && let Ok(mut file) = self.file.lock()
        {
            let _ = writeln!(file, "{payload}");
            let _ = file.flush();
        }
    }
}

/// Sink that drops every event.
pub struct NoopCompileSink;

impl CompileSink for NoopCompileSink {
    fn record(&self, _event: &CompileEvent) {}
}

/// Sink that keeps events in memory, for tests and aggregating hosts.
#[derive(Default)]
pub struct MemoryCompileSink {
    /// Recorded events in arrival order.
    events: Mutex<Vec<CompileEvent>>,
}

impl MemoryCompileSink {
    /// Creates an empty sink.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of recorded events.
    #[must_use]
    pub fn events(&self) -> Vec<CompileEvent> {
        self.events.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }

    /// Labels of recorded events, in order.
    #[must_use]
    pub fn labels(&self) -> Vec<&'static str> {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .map(|event| event.event)
            .collect()
    }
}

impl CompileSink for MemoryCompileSink {
    fn record(&self, event: &CompileEvent) {
        self.events.lock().unwrap_or_else(PoisonError::into_inner).push(event.clone());
    }
}
