//! Job record and status updates

use crate::error::TransitionError;
use crate::state_machine::validate_transition;
use chrono::{DateTime, Utc};
use reqforge_core::SpecSource;
use reqforge_spec::AppSpec;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use ulid::Ulid;

/// Unique job identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct JobId(pub Ulid);

impl JobId {
    /// Generate new job ID
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self(Ulid::new())
    }
}

impl Default for JobId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for JobId {
    type Err = ulid::DecodeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ulid::from_string(s.trim()).map(Self)
    }
}

/// Job lifecycle status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    /// Created, extraction not started
    Pending,
    /// Extraction running
    Processing,
    /// Result stored
    Completed,
    /// Ended with an error message
    Failed,
}

impl JobStatus {
    /// Whether no further transitions are possible
    #[inline]
    #[must_use]
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Failed)
    }

    /// Wire name
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Processing => "processing",
            Self::Completed => "completed",
            Self::Failed => "failed",
        }
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Persistent extraction job
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Job {
    /// Job id
    pub id: JobId,
    /// Trimmed submission text
    pub input_text: String,
    /// Lifecycle status
    pub status: JobStatus,
    /// Extracted specification (completed jobs)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<AppSpec>,
    /// Whether the result came from the live generator or the fallback
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<SpecSource>,
    /// Failure message (failed jobs)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
    /// Creation time
    pub created_at: DateTime<Utc>,
    /// Last update time
    pub updated_at: DateTime<Utc>,
}

impl Job {
    /// Create a pending job
    #[must_use]
    pub fn new(id: JobId, input_text: impl Into<String>, now: DateTime<Utc>) -> Self {
        Self {
            id,
            input_text: input_text.into(),
            status: JobStatus::Pending,
            result: None,
            source: None,
            error_message: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Whether the job reached a terminal status
    #[inline]
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }

    /// Apply a status update
    ///
    /// # Errors
    /// Returns `TransitionError` if the lifecycle forbids the change; the job
    /// is left untouched.
    pub fn apply(&mut self, patch: JobPatch, now: DateTime<Utc>) -> Result<(), TransitionError> {
        validate_transition(self.status, patch.status)?;

        self.status = patch.status;
        if patch.result.is_some() {
            self.result = patch.result;
        }
        if patch.source.is_some() {
            self.source = patch.source;
        }
        if patch.error_message.is_some() {
            self.error_message = patch.error_message;
        }
        self.updated_at = now;
        Ok(())
    }
}

/// Status update written by the lifecycle
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobPatch {
    /// New status
    pub status: JobStatus,
    /// Result to store
    pub result: Option<AppSpec>,
    /// Result provenance
    pub source: Option<SpecSource>,
    /// Error message to store
    pub error_message: Option<String>,
}

impl JobPatch {
    /// Extraction started
    #[inline]
    #[must_use]
    pub fn processing() -> Self {
        Self {
            status: JobStatus::Processing,
            result: None,
            source: None,
            error_message: None,
        }
    }

    /// Extraction finished with a result
    #[inline]
    #[must_use]
    pub fn completed(result: AppSpec, source: SpecSource) -> Self {
        Self {
            status: JobStatus::Completed,
            result: Some(result),
            source: Some(source),
            error_message: None,
        }
    }

    /// Job failed
    #[inline]
    #[must_use]
    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            status: JobStatus::Failed,
            result: None,
            source: None,
            error_message: Some(message.into()),
        }
    }
}
