//! Bounded job polling
//!
//! Fixed-interval retry loop with a hard attempt cap. Giving up is reported
//! as [`PollError::TimedOut`], never as a failed job; dropping the future
//! leaves the job untouched.

use crate::error::PollError;
use crate::job::{Job, JobId, JobStatus};
use crate::store::JobStore;
use reqforge_spec::AppSpec;
use std::sync::Arc;
use std::time::Duration;

/// Default attempt cap
pub const DEFAULT_MAX_ATTEMPTS: u32 = 30;

/// Polls a job until it reaches a terminal status
#[derive(Debug, Clone)]
pub struct JobPoller {
    store: Arc<dyn JobStore>,
    interval: Duration,
    max_attempts: u32,
}

impl JobPoller {
    /// Create poller with the default attempt cap
    #[inline]
    #[must_use]
    pub fn new(store: Arc<dyn JobStore>, interval: Duration) -> Self {
        Self {
            store,
            interval,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
        }
    }

    /// With attempt cap (at least one)
    #[inline]
    #[must_use]
    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts.max(1);
        self
    }

    /// Wait for a terminal job (`completed` or `failed`)
    ///
    /// # Errors
    /// - `PollError::NotFound` if the job does not exist
    /// - `PollError::TimedOut` if the cap is reached first
    /// - `PollError::Store` on store failure
    pub async fn wait(&self, id: JobId) -> Result<Job, PollError> {
        let mut last_status = JobStatus::Pending;
        for attempt in 1..=self.max_attempts {
            let job = self.store.get(id).await?.ok_or(PollError::NotFound(id))?;
            if job.is_terminal() {
                tracing::debug!(job_id = %id, attempt, status = %job.status, "job finished");
                return Ok(job);
            }
            last_status = job.status;
            if attempt < self.max_attempts {
                tokio::time::sleep(self.interval).await;
            }
        }

        tracing::warn!(job_id = %id, attempts = self.max_attempts, "gave up polling job");
        Err(PollError::TimedOut {
            id,
            attempts: self.max_attempts,
            last_status,
        })
    }

    /// Wait for the job's extracted specification
    ///
    /// # Errors
    /// As [`wait`](Self::wait), plus `PollError::JobFailed` if the job
    /// ended `failed`.
    pub async fn wait_for_spec(&self, id: JobId) -> Result<AppSpec, PollError> {
        let job = self.wait(id).await?;
        match (job.status, job.result) {
            (JobStatus::Completed, Some(spec)) => Ok(spec),
            (_, _) => Err(PollError::JobFailed {
                id,
                message: job
                    .error_message
                    .unwrap_or_else(|| "job finished without a result".to_owned()),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::job::JobPatch;
    use crate::store::InMemoryJobStore;
    use chrono::Utc;

    async fn store_with(status_patches: Vec<JobPatch>) -> (Arc<InMemoryJobStore>, JobId) {
        let store = Arc::new(InMemoryJobStore::new());
        let id = JobId::new();
        store.create(Job::new(id, "x", Utc::now())).await.unwrap();
        for patch in status_patches {
            store.update(id, patch).await.unwrap();
        }
        (store, id)
    }

    #[tokio::test]
    async fn failed_job_is_returned_not_timed_out() {
        let (store, id) = store_with(vec![JobPatch::failed("disk full")]).await;
        let poller = JobPoller::new(store, Duration::from_millis(1));

        let job = poller.wait(id).await.unwrap();
        assert_eq!(job.status, JobStatus::Failed);

        match poller.wait_for_spec(id).await {
            Err(PollError::JobFailed { message, .. }) => assert_eq!(message, "disk full"),
            other => panic!("expected job failure, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn stuck_job_times_out() {
        let (store, id) = store_with(vec![JobPatch::processing()]).await;
        let poller = JobPoller::new(store, Duration::from_millis(1)).with_max_attempts(3);

        let err = poller.wait(id).await.unwrap_err();
        assert!(err.is_timeout());
        assert!(matches!(
            err,
            PollError::TimedOut { attempts: 3, last_status: JobStatus::Processing, .. }
        ));
    }

    #[tokio::test]
    async fn missing_job_is_not_found() {
        let store = Arc::new(InMemoryJobStore::new());
        let poller = JobPoller::new(store, Duration::from_millis(1));
        assert!(matches!(poller.wait(JobId::new()).await, Err(PollError::NotFound(_))));
    }
}
