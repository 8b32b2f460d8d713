//! Error types for ferro-retriever
//!
//! Every failure in the retrieval pipeline is a [`RetrieverError`]. Each
//! variant carries a numeric [`ErrorCode`] for programmatic handling and a
//! [`Severity`] used when the failure is reported to a
//! [`MessageSink`](crate::messages::MessageSink).

use std::fmt;
use thiserror::Error;

use crate::messages::Severity;

/// Error codes for categorizing errors
///
/// These codes are attached to every message sent to a message sink and can
/// be used for documentation lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u16)]
pub enum ErrorCode {
    // Query errors (E1xxx)
    /// Query could not be interpreted
    InvalidQuery = 1001,

    // Reference errors (E2xxx)
    /// Accession not present in the store
    UnknownAccession = 2001,
    /// Accession given without a version while several exist
    AmbiguousVersion = 2002,
    /// Requested version not present in the store
    UnknownVersion = 2003,
    /// Sequence file missing or unreadable
    SequenceUnavailable = 2004,

    // Annotation errors (E3xxx)
    /// More than one store row matched a unique lookup
    MultipleMatches = 3001,
    /// Exon start/stop lists disagree
    MalformedExonData = 3002,
    /// Protein linked without CDS coordinates
    MissingCds = 3003,
    /// Selector matched no transcripts
    NoTranscripts = 3004,

    // Environment errors (E9xxx)
    /// Settings missing or invalid
    Configuration = 9001,
    /// Annotation store failure
    StoreError = 9002,
    /// File IO error
    IoError = 9003,
    /// JSON serialization error
    JsonError = 9004,
}

impl ErrorCode {
    /// Get the error code as a string (e.g., "E2001")
    pub fn as_str(&self) -> String {
        format!("E{:04}", *self as u16)
    }

    /// Get a brief description of this error code
    pub fn description(&self) -> &'static str {
        match self {
            ErrorCode::InvalidQuery => "invalid query",
            ErrorCode::UnknownAccession => "unknown accession",
            ErrorCode::AmbiguousVersion => "accession version is ambiguous",
            ErrorCode::UnknownVersion => "unknown accession version",
            ErrorCode::SequenceUnavailable => "sequence not available",
            ErrorCode::MultipleMatches => "multiple store rows for a unique lookup",
            ErrorCode::MalformedExonData => "malformed exon data",
            ErrorCode::MissingCds => "protein without CDS coordinates",
            ErrorCode::NoTranscripts => "no transcripts for selector",
            ErrorCode::Configuration => "configuration error",
            ErrorCode::StoreError => "annotation store error",
            ErrorCode::IoError => "file I/O error",
            ErrorCode::JsonError => "JSON error",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Main error type for ferro-retriever operations
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RetrieverError {
    /// The accession has no versions in the store
    #[error("Unknown accession: {accession}")]
    UnknownAccession { accession: String },

    /// No version was requested and the accession has one or more
    #[error("Accession {accession} requires a version, available: {}", .versions.join(", "))]
    AmbiguousVersion {
        accession: String,
        versions: Vec<String>,
    },

    /// The requested version does not exist
    #[error("Unknown version {version} of {accession}, available: {}", .versions.join(", "))]
    UnknownVersion {
        accession: String,
        version: String,
        versions: Vec<String>,
    },

    /// A lookup that must be unique matched several rows
    #[error("Store consistency error: {count} rows match {what}")]
    MultipleMatches { what: String, count: usize },

    /// Sequence bytes could not be read
    #[error("Sequence unavailable for {path}: {msg}")]
    SequenceUnavailable { path: String, msg: String },

    /// Exon start/stop lists of a transcript disagree
    #[error("Malformed exon data for {transcript}: {starts} starts, {stops} stops")]
    MalformedExonData {
        transcript: String,
        starts: usize,
        stops: usize,
    },

    /// Settings are missing or invalid
    #[error("Configuration error: {msg}")]
    Configuration { msg: String },

    /// The query itself is not usable
    #[error("Invalid query: {msg}")]
    InvalidQuery { msg: String },

    /// Annotation store failure
    #[error("Store error: {msg}")]
    Store { msg: String },

    /// IO error (for file operations)
    #[error("IO error: {msg}")]
    Io { msg: String },

    /// JSON serialization error
    #[error("JSON error: {msg}")]
    Json { msg: String },
}

impl RetrieverError {
    /// Get the error code for this error
    pub fn code(&self) -> ErrorCode {
        match self {
            RetrieverError::UnknownAccession { .. } => ErrorCode::UnknownAccession,
            RetrieverError::AmbiguousVersion { .. } => ErrorCode::AmbiguousVersion,
            RetrieverError::UnknownVersion { .. } => ErrorCode::UnknownVersion,
            RetrieverError::MultipleMatches { .. } => ErrorCode::MultipleMatches,
            RetrieverError::SequenceUnavailable { .. } => ErrorCode::SequenceUnavailable,
            RetrieverError::MalformedExonData { .. } => ErrorCode::MalformedExonData,
            RetrieverError::Configuration { .. } => ErrorCode::Configuration,
            RetrieverError::InvalidQuery { .. } => ErrorCode::InvalidQuery,
            RetrieverError::Store { .. } => ErrorCode::StoreError,
            RetrieverError::Io { .. } => ErrorCode::IoError,
            RetrieverError::Json { .. } => ErrorCode::JsonError,
        }
    }

    /// Severity used when this error is sent to a message sink
    ///
    /// Store consistency violations are fatal; exon data problems only
    /// degrade the record.
    pub fn severity(&self) -> Severity {
        match self {
            RetrieverError::MultipleMatches { .. } | RetrieverError::Configuration { .. } => {
                Severity::Fatal
            }
            RetrieverError::MalformedExonData { .. } => Severity::Warning,
            _ => Severity::Error,
        }
    }

    /// Whether this error goes through the message sink before it is returned
    ///
    /// Sequence and configuration failures are returned to the caller only.
    pub fn is_reported(&self) -> bool {
        !matches!(
            self,
            RetrieverError::SequenceUnavailable { .. } | RetrieverError::Configuration { .. }
        )
    }

    /// Create a configuration error
    pub fn configuration(msg: impl Into<String>) -> Self {
        RetrieverError::Configuration { msg: msg.into() }
    }

    /// Create an invalid query error
    pub fn invalid_query(msg: impl Into<String>) -> Self {
        RetrieverError::InvalidQuery { msg: msg.into() }
    }
}

impl From<std::io::Error> for RetrieverError {
    fn from(err: std::io::Error) -> Self {
        RetrieverError::Io {
            msg: err.to_string(),
        }
    }
}

impl From<serde_json::Error> for RetrieverError {
    fn from(err: serde_json::Error) -> Self {
        RetrieverError::Json {
            msg: err.to_string(),
        }
    }
}

impl From<rusqlite::Error> for RetrieverError {
    fn from(err: rusqlite::Error) -> Self {
        RetrieverError::Store {
            msg: err.to_string(),
        }
    }
}

impl From<toml::de::Error> for RetrieverError {
    fn from(err: toml::de::Error) -> Self {
        RetrieverError::Configuration {
            msg: err.to_string(),
        }
    }
}
