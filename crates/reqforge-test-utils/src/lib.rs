//! Testing utilities for reqforge workspace
//!
//! Scripted generators, faulty job stores, and response fixtures.

#![allow(missing_docs)]

use async_trait::async_trait;
use reqforge_core::{Extractor, Generator, GeneratorError};
use reqforge_jobs::{InMemoryJobStore, Job, JobId, JobPatch, JobStatus, JobStore, StoreError};
use serde_json::json;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// What a [`ScriptedGenerator`] does on every call
#[derive(Debug, Clone)]
pub enum Script {
    Respond(String),
    Fail(String),
    Panic,
    Hang,
}

/// Generator with a fixed behaviour that counts its calls
#[derive(Debug)]
pub struct ScriptedGenerator {
    script: Script,
    calls: AtomicUsize,
}

impl ScriptedGenerator {
    pub fn new(script: Script) -> Self {
        Self {
            script,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn responding(raw: impl Into<String>) -> Self {
        Self::new(Script::Respond(raw.into()))
    }

    pub fn failing(message: impl Into<String>) -> Self {
        Self::new(Script::Fail(message.into()))
    }

    pub fn panicking() -> Self {
        Self::new(Script::Panic)
    }

    pub fn hanging() -> Self {
        Self::new(Script::Hang)
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Generator for ScriptedGenerator {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn generate(&self, _description: &str) -> Result<String, GeneratorError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match &self.script {
            Script::Respond(raw) => Ok(raw.clone()),
            Script::Fail(message) => Err(GeneratorError::Other(message.clone())),
            Script::Panic => panic!("scripted generator panic"),
            Script::Hang => futures::future::pending().await,
        }
    }
}

/// Extractor backed by a scripted generator
pub fn extractor_with(generator: ScriptedGenerator) -> (Extractor, Arc<ScriptedGenerator>) {
    let generator = Arc::new(generator);
    let extractor = Extractor::with_generator(Arc::clone(&generator) as Arc<dyn Generator>);
    (extractor, generator)
}

/// In-memory store whose updates to one status always fail
#[derive(Debug)]
pub struct FaultyJobStore {
    inner: InMemoryJobStore,
    fail_on: JobStatus,
    message: String,
}

impl FaultyJobStore {
    pub fn failing_on(fail_on: JobStatus, message: impl Into<String>) -> Self {
        Self {
            inner: InMemoryJobStore::new(),
            fail_on,
            message: message.into(),
        }
    }
}

#[async_trait]
impl JobStore for FaultyJobStore {
    async fn create(&self, job: Job) -> Result<(), StoreError> {
        self.inner.create(job).await
    }

    async fn update(&self, id: JobId, patch: JobPatch) -> Result<Job, StoreError> {
        if patch.status == self.fail_on {
            return Err(StoreError::Backend(self.message.clone()));
        }
        self.inner.update(id, patch).await
    }

    async fn get(&self, id: JobId) -> Result<Option<Job>, StoreError> {
        self.inner.get(id).await
    }

    async fn list_recent(&self, limit: usize) -> Result<Vec<Job>, StoreError> {
        self.inner.list_recent(limit).await
    }
}

pub const COURSE_DESCRIPTION: &str = "course management with students and teachers";

/// Live response with array-form permissions, a missing role, and no editor
pub fn manager_employee_response() -> String {
    json!({
        "appName": "Stock Room",
        "entities": [
            { "name": "Product", "fields": [{ "name": "Name", "type": "text", "required": true }] },
            { "name": "Supplier", "fields": [{ "name": "Email", "type": "email", "required": false }] }
        ],
        "roles": ["Manager", "Employee"],
        "features": ["Track stock"],
        "rolePermissions": [
            { "role": "Manager", "canCreate": ["Product"], "canView": [], "canEdit": [] }
        ]
    })
    .to_string()
}

/// Outputs no repair can save
pub fn unusable_responses() -> Vec<String> {
    vec![
        String::new(),
        "```json\n{}\n```".to_owned(),
        "[]".to_owned(),
        json!({ "appName": "X" }).to_string(),
        json!({
            "appName": "X",
            "entities": [{ "name": "Task" }],
            "roles": ["Owner"],
            "features": [],
            "rolePermissions": { "roleName": "Owner" }
        })
        .to_string(),
        json!({
            "appName": "X",
            "entities": [{ "name": "Task" }],
            "roles": ["Owner"],
            "features": [],
            "rolePermissions": { "role": "Owner" }
        })
        .to_string(),
        json!({
            "appName": "",
            "entities": [{ "name": "Task", "fields": [] }],
            "roles": ["Admin"],
            "features": [],
            "rolePermissions": {
                "Admin": { "canCreate": ["Task"], "canView": ["Task"], "canEdit": ["Task"] }
            }
        })
        .to_string(),
    ]
}
