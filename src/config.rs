//! Configuration for ferro-retriever
//!
//! Settings are an explicit value handed to [`Retriever`](crate::Retriever)
//! at call time; nothing is read from global state during a query.
//!
//! # Example Configuration
//!
//! ```toml
//! [sequence]
//! dir = "/data/sequences"
//!
//! [store]
//! database = "/data/annotation.db"
//!
//! [window]
//! flank = 5000
//!
//! [messages]
//! threshold = "warning"
//! log_file = "/var/log/ferro-retriever.log"
//! ```

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::RetrieverError;
use crate::messages::{MessageLog, Severity};

/// Main retriever configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq)]
pub struct RetrieverConfig {
    /// Flat sequence store
    #[serde(default)]
    pub sequence: SequenceConfig,
    /// Annotation store
    #[serde(default)]
    pub store: StoreConfig,
    /// Window resolution
    #[serde(default)]
    pub window: WindowConfig,
    /// Message persistence
    #[serde(default)]
    pub messages: MessagesConfig,
}

/// Sequence store configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq)]
pub struct SequenceConfig {
    /// Directory holding `<checksum>.sequence` files
    pub dir: Option<PathBuf>,
}

/// Annotation store configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq)]
pub struct StoreConfig {
    /// SQLite annotation database
    pub database: Option<PathBuf>,
}

/// Window resolution configuration
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct WindowConfig {
    /// Padding added on both sides of a positional query (default: 5000)
    #[serde(default = "default_flank")]
    pub flank: u64,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            flank: default_flank(),
        }
    }
}

fn default_flank() -> u64 {
    RetrieverConfig::DEFAULT_FLANK
}

/// Message persistence configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq)]
pub struct MessagesConfig {
    /// Lowest severity persisted to the log (default: warning)
    #[serde(default)]
    pub threshold: Severity,
    /// Optional file receiving persisted messages
    pub log_file: Option<PathBuf>,
}

impl RetrieverConfig {
    /// Default padding around positional queries (in bp)
    pub const DEFAULT_FLANK: u64 = 5000;

    /// Load configuration from TOML file
    pub fn from_file(path: &Path) -> Result<Self, RetrieverError> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            RetrieverError::configuration(format!(
                "Failed to read config {}: {}",
                path.display(),
                e
            ))
        })?;
        Self::parse(&content)
    }

    /// Parse configuration from TOML content
    pub fn parse(content: &str) -> Result<Self, RetrieverError> {
        Ok(toml::from_str(content)?)
    }

    /// Serialize configuration to TOML
    pub fn to_toml(&self) -> Result<String, RetrieverError> {
        toml::to_string_pretty(self).map_err(|e| RetrieverError::configuration(e.to_string()))
    }

    /// Returns an updated config with the given sequence directory
    pub fn with_sequence_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.sequence.dir = Some(dir.into());
        self
    }

    /// Returns an updated config with the given annotation database
    pub fn with_database(mut self, database: impl Into<PathBuf>) -> Self {
        self.store.database = Some(database.into());
        self
    }

    /// Returns an updated config with the given flank
    pub fn with_flank(mut self, flank: u64) -> Self {
        self.window.flank = flank;
        self
    }

    /// Returns an updated config with the given message threshold
    pub fn with_threshold(mut self, threshold: Severity) -> Self {
        self.messages.threshold = threshold;
        self
    }

    /// Sequence directory, or a configuration error if unset
    pub fn sequence_dir(&self) -> Result<&Path, RetrieverError> {
        self.sequence
            .dir
            .as_deref()
            .ok_or_else(|| RetrieverError::configuration("Sequence directory is not configured"))
    }

    /// Validate configuration
    ///
    /// Must pass before the annotation store is touched.
    pub fn validate(&self) -> Result<(), RetrieverError> {
        let dir = self.sequence_dir()?;
        if !dir.is_dir() {
            return Err(RetrieverError::configuration(format!(
                "Sequence directory does not exist: {}",
                dir.display()
            )));
        }

        if let Some(database) = &self.store.database {
            if !database.is_file() {
                return Err(RetrieverError::configuration(format!(
                    "Annotation database does not exist: {}",
                    database.display()
                )));
            }
        }

        Ok(())
    }

    /// Message log matching the `[messages]` section
    pub fn message_log(&self) -> Result<MessageLog, RetrieverError> {
        let log = MessageLog::new(self.messages.threshold);
        match &self.messages.log_file {
            Some(path) => log.with_file(path),
            None => Ok(log),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_empty_config() {
        let config = RetrieverConfig::parse("").unwrap();
        assert!(config.sequence.dir.is_none());
        assert_eq!(config.window.flank, 5000);
        assert_eq!(config.messages.threshold, Severity::Warning);
    }

    #[test]
    fn test_parse_full_config() {
        let content = r#"
[sequence]
dir = "/data/sequences"

[store]
database = "/data/annotation.db"

[window]
flank = 250

[messages]
threshold = "error"
"#;
        let config = RetrieverConfig::parse(content).unwrap();
        assert_eq!(config.sequence.dir, Some(PathBuf::from("/data/sequences")));
        assert_eq!(
            config.store.database,
            Some(PathBuf::from("/data/annotation.db"))
        );
        assert_eq!(config.window.flank, 250);
        assert_eq!(config.messages.threshold, Severity::Error);
    }

    #[test]
    fn test_parse_invalid_toml() {
        let result = RetrieverConfig::parse("[window]\nflank = \"wide\"");
        assert!(matches!(result, Err(RetrieverError::Configuration { .. })));
    }

    #[test]
    fn test_validate_requires_sequence_dir() {
        let config = RetrieverConfig::default();
        assert!(matches!(
            config.validate(),
            Err(RetrieverError::Configuration { .. })
        ));
    }

    #[test]
    fn test_validate_missing_dir() {
        let config = RetrieverConfig::default().with_sequence_dir("/nonexistent/ferro/sequences");
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_existing_dir() {
        let dir = tempfile::tempdir().unwrap();
        let config = RetrieverConfig::default().with_sequence_dir(dir.path());
        assert!(config.validate().is_ok());

        let config = config.with_database(dir.path().join("missing.db"));
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_toml_round_trip_keeps_flank() {
        let config = RetrieverConfig::default()
            .with_sequence_dir("/data/seq")
            .with_flank(10);
        let text = config.to_toml().unwrap();
        let parsed = RetrieverConfig::parse(&text).unwrap();
        assert_eq!(parsed, config);
    }
}
