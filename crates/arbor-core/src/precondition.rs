//! Fail-fast policy for programmer errors.
//!
//! Structural and lifecycle violations (starting a non-idle flow, driving
//! a dismissed surface, double-preparing the lifecycle adapter) are not
//! recoverable conditions and are never surfaced as `Result`s. Debug
//! builds halt with diagnostics; release builds log and continue.

/// Report a violated precondition.
///
/// Panics in debug builds. In release builds the violation is logged at
/// error level and execution continues with the operation skipped by the
/// caller.
#[track_caller]
pub fn precondition_failure(message: &str) {
    if cfg!(debug_assertions) {
        panic!("precondition violated: {message}");
    } else {
        tracing::error!(precondition = message, "precondition violated");
    }
}
