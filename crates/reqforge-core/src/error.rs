//! Error types for reqforge core
//!
//! Every error here is absorbed by the [`Extractor`](crate::Extractor):
//! callers of `extract` never see them, but they are logged and reported
//! as the fallback reason.

/// Failure talking to the live generator
#[derive(Debug, thiserror::Error)]
pub enum GeneratorError {
    /// No API key configured
    #[error("live generator not configured")]
    NotConfigured,

    /// Transport failure (connect, timeout, body decode)
    #[error("generator request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Non-success HTTP status
    #[error("generator returned status {status}: {body}")]
    Status {
        /// HTTP status code
        status: u16,
        /// Response body (truncated)
        body: String,
    },

    /// Response carried no candidate text
    #[error("generator returned no content")]
    EmptyResponse,

    /// Implementation-specific failure
    #[error("generator failed: {0}")]
    Other(String),
}

impl GeneratorError {
    /// Check if a retry could plausibly succeed
    #[inline]
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Http(e) => e.is_timeout() || e.is_connect(),
            Self::Status { status, .. } => *status == 429 || *status >= 500,
            Self::EmptyResponse => true,
            Self::NotConfigured | Self::Other(_) => false,
        }
    }
}

/// Structural defect found by the validator
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationFailure {
    /// Candidate is not a JSON object
    #[error("specification is not an object")]
    NotAnObject,

    /// Required top-level field absent or null, or `appName` blank
    #[error("missing required field `{0}`")]
    MissingField(&'static str),

    /// `entities` absent, not a sequence, or empty
    #[error("entities must be a non-empty sequence")]
    NoEntities,

    /// `roles` not a sequence or empty
    #[error("roles must be a non-empty sequence")]
    NoRoles,

    /// Role entry is not a string
    #[error("role at index {0} is not a string")]
    RoleNotString(usize),

    /// `rolePermissions` not keyed by role
    #[error("rolePermissions is not a mapping keyed by role")]
    PermissionsNotKeyed,

    /// Permissions entry is not a mapping of lists
    #[error("permissions entry `{0}` is not a mapping")]
    MalformedEntry(String),

    /// Declared role has no permissions entry
    #[error("no permissions for role `{role}` (key `{key}`)")]
    MissingRolePermissions {
        /// Role as declared
        role: String,
        /// Canonical key looked up
        key: String,
    },

    /// Permissions entry lacks one of the three lists
    #[error("permissions for role `{role}` lack a `{list}` sequence")]
    MissingPermissionList {
        /// Role as declared
        role: String,
        /// Missing list name
        list: &'static str,
    },

    /// Role cannot see any entity
    #[error("role `{0}` cannot view any entity")]
    NoVisibility(String),

    /// Nobody can edit anything
    #[error("no role has edit permissions")]
    NoEditor,
}

/// Why a live extraction attempt was discarded
#[derive(Debug, thiserror::Error)]
pub enum ExtractionError {
    /// Generator call failed
    #[error(transparent)]
    Generator(#[from] GeneratorError),

    /// Generator panicked
    #[error("generator panicked")]
    GeneratorPanicked,

    /// Output was not JSON
    #[error("generator output is not valid JSON: {0}")]
    MalformedJson(#[source] serde_json::Error),

    /// Output failed validation after repair
    #[error("validation failed: {0}")]
    Invalid(#[from] ValidationFailure),

    /// Output passed validation but does not fit the typed model
    #[error("schema mismatch: {0}")]
    SchemaMismatch(#[source] serde_json::Error),
}

impl ExtractionError {
    /// Short machine-readable cause
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Generator(_) => "generator",
            Self::GeneratorPanicked => "panic",
            Self::MalformedJson(_) => "malformed_json",
            Self::Invalid(_) => "validation",
            Self::SchemaMismatch(_) => "schema",
        }
    }

    /// Check if a later attempt could plausibly succeed
    ///
    /// Only transient generator failures qualify; defective output does not.
    #[inline]
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Generator(e) if e.is_retryable())
    }
}
