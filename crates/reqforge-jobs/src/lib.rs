//! reqforge jobs - asynchronous extraction jobs
//!
//! Wraps the [`Extractor`](reqforge_core::Extractor) in a persistent job
//! lifecycle:
//! - [`JobService`]: submission, background extraction, lookup, listing
//! - [`JobStore`]: persistence seam, with [`InMemoryJobStore`]
//! - [`JobPoller`]: bounded polling until a terminal status
//!
//! # Example
//!
//! ```rust,no_run
//! use reqforge_core::Extractor;
//! use reqforge_jobs::{JobService, JobsConfig};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let service = JobService::in_memory(Extractor::offline(), JobsConfig::new());
//! let submission = service.submit("course management with students").await?;
//! let job = service.poller().wait(submission.id).await?;
//! println!("{}", job.status);
//! # Ok(())
//! # }
//! ```

#![warn(unreachable_pub)]

pub mod config;
pub mod error;
pub mod job;
pub mod poller;
pub mod service;
pub mod state_machine;
pub mod store;

pub use config::JobsConfig;
pub use error::{JobError, PollError, StoreError, TransitionError};
pub use job::{Job, JobId, JobPatch, JobStatus};
pub use poller::JobPoller;
pub use service::{JobService, Submission};
pub use state_machine::{allowed_transitions, validate_transition};
pub use store::{InMemoryJobStore, JobStore};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
