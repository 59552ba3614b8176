//! Job persistence
//!
//! The store is the only shared mutable state of the job service. Writes are
//! last-write-wins per job; there are no multi-job transactions.

use crate::error::StoreError;
use crate::job::{Job, JobId, JobPatch};
use async_trait::async_trait;
use chrono::Utc;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use std::fmt::Debug;

/// Job persistence backend
#[async_trait]
pub trait JobStore: Send + Sync + Debug {
    /// Insert a new job
    ///
    /// # Errors
    /// - `StoreError::Duplicate` if the id is taken
    async fn create(&self, job: Job) -> Result<(), StoreError>;

    /// Apply a lifecycle update and return the updated job
    ///
    /// # Errors
    /// - `StoreError::NotFound` if the job does not exist
    /// - `StoreError::Transition` if the lifecycle forbids the update
    async fn update(&self, id: JobId, patch: JobPatch) -> Result<Job, StoreError>;

    /// Fetch a job snapshot
    async fn get(&self, id: JobId) -> Result<Option<Job>, StoreError>;

    /// Most recent jobs, newest first
    async fn list_recent(&self, limit: usize) -> Result<Vec<Job>, StoreError>;
}

/// In-process job store
#[derive(Debug, Default)]
pub struct InMemoryJobStore {
    jobs: DashMap<JobId, Job>,
}

impl InMemoryJobStore {
    /// Create empty store
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored jobs
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.jobs.len()
    }

    /// Whether the store is empty
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.jobs.is_empty()
    }
}

#[async_trait]
impl JobStore for InMemoryJobStore {
    async fn create(&self, job: Job) -> Result<(), StoreError> {
        match self.jobs.entry(job.id) {
            Entry::Occupied(_) => Err(StoreError::Duplicate(job.id)),
            Entry::Vacant(slot) => {
                slot.insert(job);
                Ok(())
            }
        }
    }

    async fn update(&self, id: JobId, patch: JobPatch) -> Result<Job, StoreError> {
        let mut job = self.jobs.get_mut(&id).ok_or(StoreError::NotFound(id))?;
        job.apply(patch, Utc::now())?;
        Ok(job.value().clone())
    }

    async fn get(&self, id: JobId) -> Result<Option<Job>, StoreError> {
        Ok(self.jobs.get(&id).map(|job| job.value().clone()))
    }

    async fn list_recent(&self, limit: usize) -> Result<Vec<Job>, StoreError> {
        let mut jobs: Vec<Job> = self.jobs.iter().map(|entry| entry.value().clone()).collect();
        jobs.sort_by(|a, b| b.created_at.cmp(&a.created_at).then_with(|| b.id.cmp(&a.id)));
        jobs.truncate(limit);
        Ok(jobs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::job::JobStatus;
    use chrono::Duration;
    use reqforge_core::{MockGenerator, SpecSource};

    #[tokio::test]
    async fn create_rejects_duplicates() {
        let store = InMemoryJobStore::new();
        let job = Job::new(JobId::new(), "x", Utc::now());
        store.create(job.clone()).await.unwrap();
        assert_eq!(store.create(job.clone()).await, Err(StoreError::Duplicate(job.id)));
        assert_eq!(store.len(), 1);
    }

    #[tokio::test]
    async fn update_unknown_job() {
        let store = InMemoryJobStore::new();
        let id = JobId::new();
        let err = store.update(id, JobPatch::processing()).await.unwrap_err();
        assert_eq!(err, StoreError::NotFound(id));
    }

    #[tokio::test]
    async fn completed_job_absorbs_later_writes() {
        let store = InMemoryJobStore::new();
        let id = JobId::new();
        store.create(Job::new(id, "inventory", Utc::now())).await.unwrap();
        store.update(id, JobPatch::processing()).await.unwrap();

        let spec = MockGenerator::new().generate("inventory");
        let source = SpecSource::Fallback { reason: "offline".into() };
        store.update(id, JobPatch::completed(spec, source)).await.unwrap();

        let err = store.update(id, JobPatch::failed("late")).await.unwrap_err();
        assert!(matches!(err, StoreError::Transition(_)));

        let job = store.get(id).await.unwrap().unwrap();
        assert_eq!(job.status, JobStatus::Completed);
        assert!(job.error_message.is_none());
    }

    #[tokio::test]
    async fn list_recent_is_newest_first_and_capped() {
        let store = InMemoryJobStore::new();
        let base = Utc::now();
        let mut ids = Vec::new();
        for offset in 0..5 {
            let id = JobId::new();
            ids.push(id);
            store
                .create(Job::new(id, format!("job {offset}"), base + Duration::seconds(offset)))
                .await
                .unwrap();
        }

        let recent = store.list_recent(3).await.unwrap();
        let listed: Vec<JobId> = recent.iter().map(|job| job.id).collect();
        assert_eq!(listed, vec![ids[4], ids[3], ids[2]]);
        assert!(store.list_recent(0).await.unwrap().is_empty());
    }
}
