//! Error types for reqforge jobs

use crate::job::{JobId, JobStatus};

/// Illegal job status change
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("illegal job transition: {from} -> {to}")]
pub struct TransitionError {
    /// Current status
    pub from: JobStatus,
    /// Requested status
    pub to: JobStatus,
}

/// Job store failure
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    /// No job with this id
    #[error("job {0} not found")]
    NotFound(JobId),

    /// A job with this id already exists
    #[error("job {0} already exists")]
    Duplicate(JobId),

    /// Update rejected by the lifecycle
    #[error(transparent)]
    Transition(#[from] TransitionError),

    /// Backend failure; the message is surfaced to users verbatim
    #[error("{0}")]
    Backend(String),
}

/// Job service failure
#[derive(Debug, thiserror::Error)]
pub enum JobError {
    /// Submission text empty or whitespace-only
    #[error("input text is required")]
    EmptyInput,

    /// A job with this id exists or is running
    #[error("job {0} already submitted")]
    Duplicate(JobId),

    /// No job with this id
    #[error("job {0} not found")]
    NotFound(JobId),

    /// Store failure
    #[error("job store error: {0}")]
    Store(#[from] StoreError),
}

impl JobError {
    /// Check if the caller supplied bad input
    #[inline]
    #[must_use]
    pub fn is_client_error(&self) -> bool {
        matches!(self, Self::EmptyInput | Self::Duplicate(_) | Self::NotFound(_))
    }
}

/// Polling failure, distinct from a job that ended `failed`
#[derive(Debug, thiserror::Error)]
pub enum PollError {
    /// Job never appeared
    #[error("job {0} not found")]
    NotFound(JobId),

    /// Job ended in `failed`
    #[error("job {id} failed: {message}")]
    JobFailed {
        /// Job id
        id: JobId,
        /// Stored error message
        message: String,
    },

    /// Attempt cap reached before a terminal status
    #[error("job {id} still {last_status} after {attempts} polls")]
    TimedOut {
        /// Job id
        id: JobId,
        /// Polls made
        attempts: u32,
        /// Status seen on the last poll
        last_status: JobStatus,
    },

    /// Store failure while polling
    #[error("job store error: {0}")]
    Store(#[from] StoreError),
}

impl PollError {
    /// Check if polling gave up without a terminal status
    #[inline]
    #[must_use]
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::TimedOut { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn backend_message_is_verbatim() {
        assert_eq!(StoreError::Backend("disk full".into()).to_string(), "disk full");
    }

    #[test]
    fn transition_error_names_states() {
        let err = StoreError::from(TransitionError {
            from: JobStatus::Completed,
            to: JobStatus::Failed,
        });
        assert_eq!(err.to_string(), "illegal job transition: completed -> failed");
    }

    #[test]
    fn timeout_is_distinct_from_failure() {
        let id = JobId::new();
        let timeout = PollError::TimedOut { id, attempts: 30, last_status: JobStatus::Processing };
        let failed = PollError::JobFailed { id, message: "boom".into() };
        assert!(timeout.is_timeout());
        assert!(!failed.is_timeout());
    }

    #[test]
    fn client_errors() {
        assert!(JobError::EmptyInput.is_client_error());
        assert!(!JobError::Store(StoreError::Backend("x".into())).is_client_error());
    }
}
