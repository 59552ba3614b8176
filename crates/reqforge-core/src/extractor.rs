//! Extraction orchestrator
//!
//! Top-level policy: try the live generator, repair and validate its output,
//! and fall back to the [`MockGenerator`] on any failure. `extract` never
//! fails and its output always passes validation.
//!
//! # Workflow
//!
//! ```text
//! text → Generator → JSON → normalize → enforce → validate → AppSpec
//!            ↓ (any error)                              ↓ (invalid)
//!            └──────────────→ MockGenerator ←───────────┘
//! ```

use crate::config::GeneratorConfig;
use crate::enforce::enforce;
use crate::error::ExtractionError;
use crate::generator::{GeminiGenerator, Generator};
use crate::mock::MockGenerator;
use crate::normalize::normalize;
use crate::validate::check;
use futures::FutureExt;
use reqforge_spec::AppSpec;
use serde::{Deserialize, Serialize};
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

/// Where an extracted specification came from
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SpecSource {
    /// Live generator output, repaired and validated
    Live {
        /// Generator name
        generator: String,
    },
    /// Mock generator output
    Fallback {
        /// Why the live path was not used
        reason: String,
    },
}

impl SpecSource {
    /// Whether the live generator produced the result
    #[inline]
    #[must_use]
    pub fn is_live(&self) -> bool {
        matches!(self, Self::Live { .. })
    }
}

/// Extraction result with provenance
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Extraction {
    /// Validated specification
    pub spec: AppSpec,
    /// Provenance
    pub source: SpecSource,
}

/// Generator availability, for status queries
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneratorStatus {
    /// Whether a live generator is configured
    pub configured: bool,
    /// Human-readable summary
    pub message: String,
}

/// Parse, repair and validate raw generator output
///
/// # Errors
/// - `ExtractionError::MalformedJson` if `raw` is not JSON
/// - `ExtractionError::Invalid` if the repaired candidate fails validation
/// - `ExtractionError::SchemaMismatch` if it does not decode into [`AppSpec`]
pub fn process_raw(raw: &str) -> Result<AppSpec, ExtractionError> {
    let parsed = serde_json::from_str(raw).map_err(ExtractionError::MalformedJson)?;
    let mut candidate = normalize(parsed);
    let outcome = enforce(&mut candidate);
    tracing::debug!(?outcome, "permission enforcement");
    check(&candidate)?;
    serde_json::from_value(candidate).map_err(ExtractionError::SchemaMismatch)
}

/// Extraction orchestrator
#[derive(Debug, Clone, Default)]
pub struct Extractor {
    generator: Option<Arc<dyn Generator>>,
    mock: MockGenerator,
}

impl Extractor {
    /// Create with an optional live generator
    #[inline]
    #[must_use]
    pub fn new(generator: Option<Arc<dyn Generator>>) -> Self {
        Self {
            generator,
            mock: MockGenerator::new(),
        }
    }

    /// Create with a live generator
    #[inline]
    #[must_use]
    pub fn with_generator(generator: Arc<dyn Generator>) -> Self {
        Self::new(Some(generator))
    }

    /// Create without a live generator (mock only)
    #[inline]
    #[must_use]
    pub fn offline() -> Self {
        Self::new(None)
    }

    /// Create from configuration
    ///
    /// Builds a [`GeminiGenerator`] when an API key is configured; if the
    /// client cannot be built the extractor runs offline.
    #[must_use]
    pub fn from_config(config: &GeneratorConfig) -> Self {
        if !config.is_configured() {
            tracing::info!("API key not configured, using mock generator");
            return Self::offline();
        }
        match GeminiGenerator::new(config) {
            Ok(generator) => {
                tracing::info!(model = generator.model(), "live generator configured");
                Self::with_generator(Arc::new(generator))
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to build live generator, using mock generator");
                Self::offline()
            }
        }
    }

    /// Whether a live generator is configured
    #[inline]
    #[must_use]
    pub fn is_live(&self) -> bool {
        self.generator.is_some()
    }

    /// Generator availability
    #[must_use]
    pub fn status(&self) -> GeneratorStatus {
        match &self.generator {
            Some(generator) => GeneratorStatus {
                configured: true,
                message: format!("live generator `{}` is configured", generator.name()),
            },
            None => GeneratorStatus {
                configured: false,
                message: "using mock data (configure an API key for live extraction)".to_owned(),
            },
        }
    }

    /// Extract a specification; never fails
    pub async fn extract(&self, text: &str) -> AppSpec {
        self.extract_with_source(text).await.spec
    }

    /// Extract a specification and report its provenance
    pub async fn extract_with_source(&self, text: &str) -> Extraction {
        let Some(generator) = &self.generator else {
            return self.fallback(text, "live generator not configured".to_owned());
        };

        match self.try_live(generator.as_ref(), text).await {
            Ok(spec) => {
                let dangling = spec.dangling_references();
                if !dangling.is_empty() {
                    tracing::debug!(?dangling, "permissions reference undeclared entities");
                }
                Extraction {
                    spec,
                    source: SpecSource::Live {
                        generator: generator.name().to_owned(),
                    },
                }
            }
            Err(e) => {
                tracing::warn!(
                    error = %e,
                    kind = e.kind(),
                    retryable = e.is_retryable(),
                    "live extraction failed, falling back to mock data"
                );
                self.fallback(text, e.to_string())
            }
        }
    }

    /// One live attempt: generate, then [`process_raw`]
    ///
    /// # Errors
    /// Any [`ExtractionError`]; a panicking generator maps to
    /// `ExtractionError::GeneratorPanicked`.
    pub async fn try_live(
        &self,
        generator: &dyn Generator,
        text: &str,
    ) -> Result<AppSpec, ExtractionError> {
        let raw = AssertUnwindSafe(generator.generate(text))
            .catch_unwind()
            .await
            .map_err(|_| ExtractionError::GeneratorPanicked)??;
        process_raw(&raw)
    }

    fn fallback(&self, text: &str, reason: String) -> Extraction {
        Extraction {
            spec: self.mock.generate(text),
            source: SpecSource::Fallback { reason },
        }
    }
}
