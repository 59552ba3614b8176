//! Service configuration loading
//!
//! Layers, lowest precedence first: built-in defaults, an optional TOML
//! file, then `GEMINI_*` environment variables.

use reqforge_core::GeneratorConfig;
use reqforge_jobs::JobsConfig;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Configuration loading failure
#[derive(Debug, thiserror::Error)]
pub(crate) enum ConfigError {
    /// File could not be read
    #[error("cannot read config file {}: {source}", path.display())]
    Io {
        /// File path
        path: PathBuf,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },

    /// File is not valid TOML for this schema
    #[error("invalid config: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Full service configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub(crate) struct ServiceConfig {
    /// Live generator settings
    pub(crate) generator: GeneratorConfig,
    /// Job service settings
    pub(crate) jobs: JobsConfig,
}

impl ServiceConfig {
    /// Load defaults, then `path` if given, then the environment
    ///
    /// # Errors
    /// Returns `ConfigError` if the file cannot be read or parsed.
    pub(crate) fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let config = match path {
            Some(path) => Self::read_file(path)?,
            None => Self::default(),
        };
        Ok(config.with_env())
    }

    /// Parse a TOML file
    ///
    /// # Errors
    /// Returns `ConfigError` if the file cannot be read or parsed.
    pub(crate) fn read_file(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_owned(),
            source,
        })?;
        Self::from_toml(&text)
    }

    /// Parse TOML text
    ///
    /// # Errors
    /// Returns `ConfigError::Parse` on invalid TOML.
    pub(crate) fn from_toml(text: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(text)?)
    }

    /// Overlay `GEMINI_*` environment variables
    #[must_use]
    pub(crate) fn with_env(mut self) -> Self {
        self.generator = self.generator.with_env();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::io::Write;

    #[test]
    fn empty_file_is_defaults() {
        assert_eq!(ServiceConfig::from_toml("").unwrap(), ServiceConfig::default());
    }

    #[test]
    fn reads_sections_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
[generator]
model = "gemini-1.5-pro"
request_timeout_secs = 10

[jobs]
poll_max_attempts = 5
"#
        )
        .unwrap();

        let config = ServiceConfig::read_file(file.path()).unwrap();
        assert_eq!(config.generator.model, "gemini-1.5-pro");
        assert_eq!(config.generator.request_timeout_secs, 10);
        assert_eq!(config.jobs.poll_max_attempts, 5);
        assert_eq!(config.jobs.list_limit, 50);
    }

    #[test]
    fn missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = ServiceConfig::read_file(&dir.path().join("absent.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }

    #[test]
    fn malformed_toml_is_parse_error() {
        let err = ServiceConfig::from_toml("[jobs]\nlist_limit = \"many\"").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }
}
