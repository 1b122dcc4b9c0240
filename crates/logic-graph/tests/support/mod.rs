// crates/logic-graph/tests/support/mod.rs
// ============================================================================
// Module: Test Support
// Description: Shared result helpers for logic-graph integration tests.
// ============================================================================
//! ## Overview
//! Result-based assertions so tests report a message instead of panicking.

#![allow(
    clippy::panic,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::use_debug,
    clippy::panic_in_result_fn,
    clippy::unwrap_in_result,
    reason = "Test-only output and panic-based assertions are permitted."
)]

use std::error::Error;
use std::fmt;

// ========================================================================
// Test Result Helpers
// ========================================================================

/// Result type used across logic-graph integration tests.
pub type TestResult<T = ()> = Result<T, Box<dyn Error>>;

/// Assertion failure carrying a message.
#[derive(Debug)]
struct AssertionFailed(String);

impl fmt::Display for AssertionFailed {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(&self.0)
    }
}

impl Error for AssertionFailed {}

/// Fails with `message` unless `condition` holds.
///
/// # Errors
/// Returns an assertion error when the condition is false.
pub fn ensure(condition: bool, message: impl Into<String>) -> TestResult {
    if condition { Ok(()) } else { Err(Box::new(AssertionFailed(message.into()))) }
}
