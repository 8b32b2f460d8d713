//! Message reporting for retrieval runs
//!
//! The retrieval pipeline never prints. Conditions worth telling the caller
//! about (unknown accessions, ambiguous versions, degraded exon data) are
//! sent as [`Message`]s to a [`MessageSink`] supplied by the caller.
//!
//! [`MessageLog`] is the stock sink. It counts warnings and errors, keeps the
//! messages in memory, and persists every message at or above its threshold
//! to the `log` facade and, optionally, to a log file.
//!
//! # Example
//!
//! ```
//! use ferro_retriever::messages::{Message, MessageLog, MessageSink, Severity};
//!
//! let mut log = MessageLog::new(Severity::Warning);
//! log.report(Message::new("resolver", Severity::Warning, "E3002", "odd exons"));
//! assert_eq!(log.warning_count(), 1);
//! assert_eq!(log.error_count(), 0);
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::Path;

use crate::error::RetrieverError;

/// Message severity, ordered from least to most severe
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Debug = 0,
    Info = 1,
    #[default]
    Warning = 2,
    Error = 3,
    Fatal = 4,
}

impl Severity {
    /// Numeric level (0 = debug … 4 = fatal)
    pub fn level(self) -> u8 {
        self as u8
    }

    /// Severity for a numeric level, if in range
    pub fn from_level(level: u8) -> Option<Self> {
        match level {
            0 => Some(Severity::Debug),
            1 => Some(Severity::Info),
            2 => Some(Severity::Warning),
            3 => Some(Severity::Error),
            4 => Some(Severity::Fatal),
            _ => None,
        }
    }

    /// Matching level of the `log` facade
    pub fn log_level(self) -> log::Level {
        match self {
            Severity::Debug => log::Level::Debug,
            Severity::Info => log::Level::Info,
            Severity::Warning => log::Level::Warn,
            Severity::Error | Severity::Fatal => log::Level::Error,
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Severity::Debug => "Debug",
            Severity::Info => "Info",
            Severity::Warning => "Warning",
            Severity::Error => "Error",
            Severity::Fatal => "Fatal",
        };
        write!(f, "{}", name)
    }
}

impl std::str::FromStr for Severity {
    type Err = RetrieverError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "debug" | "0" => Ok(Severity::Debug),
            "info" | "1" => Ok(Severity::Info),
            "warning" | "warn" | "2" => Ok(Severity::Warning),
            "error" | "3" => Ok(Severity::Error),
            "fatal" | "4" => Ok(Severity::Fatal),
            _ => Err(RetrieverError::configuration(format!(
                "Unknown severity '{}'",
                s
            ))),
        }
    }
}

/// A single message produced while resolving a query
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    /// Component that raised the message (e.g. "accession")
    pub origin: String,
    pub severity: Severity,
    /// Error code string (e.g. "E2002")
    pub code: String,
    pub description: String,
}

impl Message {
    /// Create a new message
    pub fn new(
        origin: impl Into<String>,
        severity: Severity,
        code: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            origin: origin.into(),
            severity,
            code: code.into(),
            description: description.into(),
        }
    }

    /// Build a message from an error, using its code and severity
    pub fn from_error(origin: impl Into<String>, err: &RetrieverError) -> Self {
        Self::new(origin, err.severity(), err.code().as_str(), err.to_string())
    }
}

impl fmt::Display for Message {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} ({}) [{}]: {}",
            self.severity, self.origin, self.code, self.description
        )
    }
}

/// Receiver for messages produced during retrieval
pub trait MessageSink {
    /// Accept a message
    fn report(&mut self, message: Message);

    /// Convenience wrapper reporting an error with its own code and severity
    fn report_error(&mut self, origin: &str, err: &RetrieverError) {
        self.report(Message::from_error(origin, err));
    }
}

/// Sink that drops every message
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl MessageSink for NullSink {
    fn report(&mut self, _message: Message) {}
}

/// Counting, persisting message sink
#[derive(Debug, Default)]
pub struct MessageLog {
    threshold: Severity,
    messages: Vec<Message>,
    warnings: usize,
    errors: usize,
    file: Option<File>,
}

impl MessageLog {
    /// Create a log that persists messages at or above `threshold`
    pub fn new(threshold: Severity) -> Self {
        Self {
            threshold,
            ..Self::default()
        }
    }

    /// Also append persisted messages to the given file
    pub fn with_file(mut self, path: &Path) -> Result<Self, RetrieverError> {
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .map_err(|e| RetrieverError::Io {
                msg: format!("Failed to open log file {}: {}", path.display(), e),
            })?;
        self.file = Some(file);
        Ok(self)
    }

    /// Persistence threshold
    pub fn threshold(&self) -> Severity {
        self.threshold
    }

    /// Number of warnings seen
    pub fn warning_count(&self) -> usize {
        self.warnings
    }

    /// Number of errors and fatal errors seen
    pub fn error_count(&self) -> usize {
        self.errors
    }

    /// All messages received, in order
    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    /// Messages with the given code
    pub fn with_code<'a>(&'a self, code: &'a str) -> impl Iterator<Item = &'a Message> + 'a {
        self.messages.iter().filter(move |m| m.code == code)
    }

    fn persist(&mut self, message: &Message) {
        log::log!(target: "ferro_retriever::messages", message.severity.log_level(), "{}", message);
        if let Some(file) = self.file.as_mut() {
            if let Err(e) = writeln!(file, "{}", message) {
                log::warn!("Failed to write message log: {}", e);
            }
        }
    }
}

impl MessageSink for MessageLog {
    fn report(&mut self, message: Message) {
        match message.severity {
            Severity::Warning => self.warnings += 1,
            Severity::Error | Severity::Fatal => self.errors += 1,
            Severity::Debug | Severity::Info => {}
        }
        if message.severity >= self.threshold {
            self.persist(&message);
        }
        self.messages.push(message);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_severity_ordering() {
        assert!(Severity::Debug < Severity::Info);
        assert!(Severity::Warning < Severity::Error);
        assert!(Severity::Error < Severity::Fatal);
        assert_eq!(Severity::Fatal.level(), 4);
        assert_eq!(Severity::from_level(2), Some(Severity::Warning));
        assert_eq!(Severity::from_level(5), None);
    }

    #[test]
    fn test_severity_from_str() {
        assert_eq!("warn".parse::<Severity>().unwrap(), Severity::Warning);
        assert_eq!("FATAL".parse::<Severity>().unwrap(), Severity::Fatal);
        assert_eq!("3".parse::<Severity>().unwrap(), Severity::Error);
        assert!("loud".parse::<Severity>().is_err());
    }

    #[test]
    fn test_counters() {
        let mut log = MessageLog::new(Severity::Error);
        log.report(Message::new("a", Severity::Debug, "E0000", "debug"));
        log.report(Message::new("a", Severity::Info, "E0000", "info"));
        log.report(Message::new("a", Severity::Warning, "E3002", "warning"));
        log.report(Message::new("a", Severity::Error, "E2001", "error"));
        log.report(Message::new("a", Severity::Fatal, "E3001", "fatal"));

        assert_eq!(log.warning_count(), 1);
        assert_eq!(log.error_count(), 2);
        assert_eq!(log.messages().len(), 5);
        assert_eq!(log.with_code("E2001").count(), 1);
    }

    #[test]
    fn test_report_error_uses_code_and_severity() {
        let mut log = MessageLog::new(Severity::Warning);
        let err = RetrieverError::MultipleMatches {
            what: "NM_000001.1".to_string(),
            count: 2,
        };
        log.report_error("store", &err);

        let message = &log.messages()[0];
        assert_eq!(message.code, "E3001");
        assert_eq!(message.severity, Severity::Fatal);
        assert_eq!(message.origin, "store");
        assert_eq!(log.error_count(), 1);
    }

    #[test]
    fn test_persist_to_file_respects_threshold() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("messages.log");
        let mut log = MessageLog::new(Severity::Warning).with_file(&path).unwrap();
        log.report(Message::new("a", Severity::Info, "E0000", "quiet"));
        log.report(Message::new("a", Severity::Error, "E2001", "loud"));
        drop(log);

        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.contains("loud"));
        assert!(!content.contains("quiet"));
    }

    #[test]
    fn test_persisted_messages_written_once() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("messages.log");
        let mut log = MessageLog::new(Severity::Warning).with_file(&path).unwrap();
        log.report(Message::new("exons", Severity::Warning, "E3002", "bad exons"));
        log.report(Message::new("window", Severity::Debug, "E0000", "padded"));
        log.report(Message::new("accession", Severity::Error, "E2001", "no such"));
        assert_eq!(log.messages().len(), 3);
        drop(log);

        let content = std::fs::read_to_string(&path).unwrap();
        assert_eq!(content.lines().count(), 2);
        assert_eq!(content.matches("bad exons").count(), 1);
        assert_eq!(content.matches("no such").count(), 1);
    }

    #[test]
    fn test_message_display() {
        let message = Message::new("window", Severity::Info, "E3004", "nothing here");
        assert_eq!(
            message.to_string(),
            "Info (window) [E3004]: nothing here"
        );
    }
}
