//! Job status transitions
//!
//! ```text
//! pending ──→ processing ──→ completed
//!    │             │
//!    └─────────────┴───────→ failed
//! ```
//!
//! Terminal states have no outgoing transitions.

use crate::error::TransitionError;
use crate::job::JobStatus;

/// Validate a status change
///
/// # Errors
/// Returns `TransitionError` if `to` is not reachable from `from`.
pub fn validate_transition(from: JobStatus, to: JobStatus) -> Result<(), TransitionError> {
    if allowed_transitions(from).contains(&to) {
        Ok(())
    } else {
        Err(TransitionError { from, to })
    }
}

/// Statuses reachable from `from` in one step
#[must_use]
pub fn allowed_transitions(from: JobStatus) -> &'static [JobStatus] {
    use JobStatus::{Completed, Failed, Pending, Processing};
    match from {
        Pending => &[Processing, Failed],
        Processing => &[Completed, Failed],
        Completed | Failed => &[],
    }
}
