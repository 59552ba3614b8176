//! Job lifecycle service
//!
//! Accepts submissions, persists them, and runs extraction in the background:
//! - Submission validates and stores the job, then returns immediately
//! - A spawned task moves the job `pending → processing → completed`
//! - Store failures while recording progress mark the job `failed`
//! - Concurrency is capped by a semaphore; ids are never run twice

use crate::config::JobsConfig;
use crate::error::{JobError, StoreError};
use crate::job::{Job, JobId, JobPatch, JobStatus};
use crate::poller::JobPoller;
use crate::store::{InMemoryJobStore, JobStore};
use chrono::Utc;
use dashmap::DashMap;
use reqforge_core::{Extractor, GeneratorStatus};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::Semaphore;
use tracing::Instrument;

/// Accepted submission
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Submission {
    /// Job id to poll
    pub id: JobId,
    /// Always `processing`: extraction has been scheduled
    pub status: JobStatus,
}

/// Extraction job service
#[derive(Debug, Clone)]
pub struct JobService {
    inner: Arc<Inner>,
}

#[derive(Debug)]
struct Inner {
    store: Arc<dyn JobStore>,
    extractor: Extractor,
    config: JobsConfig,
    permits: Arc<Semaphore>,
    in_flight: DashMap<JobId, ()>,
}

impl JobService {
    /// Create a service over a store
    #[must_use]
    pub fn new(store: Arc<dyn JobStore>, extractor: Extractor, config: JobsConfig) -> Self {
        let permits = Arc::new(Semaphore::new(config.max_concurrent_jobs.max(1)));
        Self {
            inner: Arc::new(Inner {
                store,
                extractor,
                config,
                permits,
                in_flight: DashMap::new(),
            }),
        }
    }

    /// Create a service with an [`InMemoryJobStore`]
    #[must_use]
    pub fn in_memory(extractor: Extractor, config: JobsConfig) -> Self {
        Self::new(Arc::new(InMemoryJobStore::new()), extractor, config)
    }

    /// Configuration
    #[inline]
    #[must_use]
    pub fn config(&self) -> &JobsConfig {
        &self.inner.config
    }

    /// Underlying store
    #[inline]
    #[must_use]
    pub fn store(&self) -> Arc<dyn JobStore> {
        Arc::clone(&self.inner.store)
    }

    /// Submit text for extraction
    ///
    /// Must be called from within a tokio runtime.
    ///
    /// # Errors
    /// - `JobError::EmptyInput` if the text is empty or whitespace-only
    /// - `JobError::Store` if the job cannot be created
    pub async fn submit(&self, input_text: &str) -> Result<Submission, JobError> {
        self.submit_with_id(JobId::new(), input_text).await
    }

    /// Submit text under a caller-chosen id
    ///
    /// # Errors
    /// - `JobError::EmptyInput` if the text is empty or whitespace-only
    /// - `JobError::Duplicate` if the id exists or is running
    /// - `JobError::Store` if the job cannot be created
    pub async fn submit_with_id(
        &self,
        id: JobId,
        input_text: &str,
    ) -> Result<Submission, JobError> {
        let text = input_text.trim();
        if text.is_empty() {
            return Err(JobError::EmptyInput);
        }
        if self.inner.in_flight.insert(id, ()).is_some() {
            return Err(JobError::Duplicate(id));
        }

        if let Err(e) = self.inner.store.create(Job::new(id, text, Utc::now())).await {
            self.inner.in_flight.remove(&id);
            return Err(match e {
                StoreError::Duplicate(id) => JobError::Duplicate(id),
                other => JobError::Store(other),
            });
        }

        tracing::info!(job_id = %id, chars = text.len(), "job submitted");
        let span = tracing::info_span!("job", job_id = %id);
        tokio::spawn(run_job(Arc::clone(&self.inner), id, text.to_owned()).instrument(span));

        Ok(Submission {
            id,
            status: JobStatus::Processing,
        })
    }

    /// Current job snapshot
    ///
    /// # Errors
    /// - `JobError::NotFound` if no such job exists
    /// - `JobError::Store` on store failure
    pub async fn get_job(&self, id: JobId) -> Result<Job, JobError> {
        self.inner
            .store
            .get(id)
            .await?
            .ok_or(JobError::NotFound(id))
    }

    /// Most recent jobs, newest first, capped at `list_limit`
    ///
    /// # Errors
    /// - `JobError::Store` on store failure
    pub async fn list_jobs(&self) -> Result<Vec<Job>, JobError> {
        Ok(self.inner.store.list_recent(self.inner.config.list_limit).await?)
    }

    /// Whether an extraction for `id` is scheduled or running
    #[inline]
    #[must_use]
    pub fn is_in_flight(&self, id: JobId) -> bool {
        self.inner.in_flight.contains_key(&id)
    }

    /// Live generator availability
    #[inline]
    #[must_use]
    pub fn status(&self) -> GeneratorStatus {
        self.inner.extractor.status()
    }

    /// Poller using the configured interval and attempt cap
    #[must_use]
    pub fn poller(&self) -> JobPoller {
        JobPoller::new(self.store(), self.inner.config.poll_interval())
            .with_max_attempts(self.inner.config.poll_max_attempts)
    }
}

async fn run_job(inner: Arc<Inner>, id: JobId, text: String) {
    let Ok(_permit) = Arc::clone(&inner.permits).acquire_owned().await else {
        mark_failed(&inner, id, "job queue closed".to_owned()).await;
        inner.in_flight.remove(&id);
        return;
    };

    match inner.store.update(id, JobPatch::processing()).await {
        Ok(_) => {
            tracing::debug!("extraction started");
            let extraction = inner.extractor.extract_with_source(&text).await;
            let live = extraction.source.is_live();
            match inner
                .store
                .update(id, JobPatch::completed(extraction.spec, extraction.source))
                .await
            {
                Ok(_) => tracing::info!(live, "job completed"),
                Err(e) => {
                    tracing::error!(error = %e, "failed to store result");
                    mark_failed(&inner, id, e.to_string()).await;
                }
            }
        }
        Err(e) => {
            tracing::error!(error = %e, "failed to mark job processing");
            mark_failed(&inner, id, e.to_string()).await;
        }
    }

    inner.in_flight.remove(&id);
}

async fn mark_failed(inner: &Inner, id: JobId, message: String) {
    match inner.store.update(id, JobPatch::failed(message)).await {
        Ok(_) => tracing::warn!("job failed"),
        Err(e) => tracing::error!(error = %e, "failed to record job failure"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn service() -> JobService {
        JobService::in_memory(Extractor::offline(), JobsConfig::new())
    }

    #[tokio::test]
    async fn whitespace_submission_creates_no_job() {
        let service = service();
        for text in ["", "   ", "\n\t "] {
            assert!(matches!(service.submit(text).await, Err(JobError::EmptyInput)));
        }
        assert!(service.list_jobs().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn submission_returns_processing_and_stores_trimmed_text() {
        let service = service();
        let submission = service.submit("  inventory tracker  ").await.unwrap();
        assert_eq!(submission.status, JobStatus::Processing);

        let job = service.get_job(submission.id).await.unwrap();
        assert_eq!(job.input_text, "inventory tracker");
    }

    #[tokio::test]
    async fn unknown_job_is_not_found() {
        let id = JobId::new();
        assert!(matches!(
            service().get_job(id).await,
            Err(JobError::NotFound(found)) if found == id
        ));
    }

    #[test]
    fn status_reflects_extractor() {
        assert!(!service().status().configured);
    }
}
