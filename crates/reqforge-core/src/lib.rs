//! reqforge core - requirement extraction pipeline
//!
//! Turns a free-form application description into a validated
//! [`AppSpec`](reqforge_spec::AppSpec):
//! - Calls a live [`Generator`] when one is configured
//! - Normalizes the raw response shape ([`normalize`])
//! - Repairs permission invariants ([`enforce`])
//! - Validates the result ([`check`])
//! - Falls back to the deterministic [`MockGenerator`] on any failure
//!
//! # Example
//!
//! ```rust
//! use reqforge_core::Extractor;
//!
//! # async fn example() {
//! let extractor = Extractor::offline();
//! let spec = extractor.extract("inventory tracker for products").await;
//! assert_eq!(spec.app_name, "Inventory Manager");
//! # }
//! ```

#![warn(unreachable_pub)]

pub mod config;
pub mod enforce;
pub mod error;
pub mod extractor;
pub mod generator;
pub mod mock;
pub mod normalize;
pub mod validate;

pub use config::GeneratorConfig;
pub use enforce::{enforce, Enforcement};
pub use error::{ExtractionError, GeneratorError, ValidationFailure};
pub use extractor::{process_raw, Extraction, Extractor, GeneratorStatus, SpecSource};
pub use generator::{GeminiGenerator, Generator};
pub use mock::{MockGenerator, MockTemplate};
pub use normalize::{normalize, normalize_in_place};
pub use validate::{check, is_valid};

/// Prelude module for common imports
pub mod prelude {
    //! Common imports for working with reqforge core
    pub use crate::{Extraction, Extractor, Generator, GeneratorConfig, GeneratorError, SpecSource};
    pub use reqforge_spec::AppSpec;
}

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
