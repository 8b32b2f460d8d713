// Copyright (c) 2024-2025 Fulcrum Genomics LLC
// SPDX-License-Identifier: MIT

//! ferro-retriever: genomic annotation record retrieval
//!
//! Part of the ferro bioinformatics toolkit.
//!
//! Resolves an accession, optionally scoped by positions, a gene or a
//! transcript, into a record of genes, transcripts, exon and CDS positions
//! and the underlying reference sequence.
//!
//! # Example
//!
//! ```
//! use ferro_retriever::{MessageLog, MockStore, Query, Retriever, RetrieverConfig, Severity};
//!
//! // Sequence files live in a directory named by the configuration
//! let dir = tempfile::tempdir().unwrap();
//! let sequence: Vec<u8> = b"ACGT".iter().copied().cycle().take(100_000).collect();
//! std::fs::write(dir.path().join("test-nc11.sequence"), sequence).unwrap();
//!
//! // Create a retriever with test data
//! let config = RetrieverConfig::default().with_sequence_dir(dir.path());
//! let retriever = Retriever::new(MockStore::with_test_data(), config);
//!
//! // Retrieve all transcripts of a gene
//! let mut log = MessageLog::new(Severity::Warning);
//! let record = retriever
//!     .retrieve(&Query::gene("NC_000011.10", "SDHD"), &mut log)
//!     .unwrap();
//! println!("{}", record.summary());
//! assert!(record.transcript("NM_003002.2").is_some());
//! ```

pub mod assemble;
pub mod cli;
pub mod config;
pub mod coords;
pub mod error;
pub mod messages;
pub mod reference;
pub mod resolve;
pub mod retriever;

// Re-export main types
pub use assemble::{Gene, Orientation, Record, Transcript};
pub use config::RetrieverConfig;
pub use error::{ErrorCode, RetrieverError};
pub use messages::{Message, MessageLog, MessageSink, NullSink, Severity};
pub use reference::{AnnotationStore, MockStore, Reference, SqliteStore, TranscriptRow};
pub use resolve::{Query, Selector};
pub use retriever::Retriever;

// Re-export coordinate types
pub use coords::{overlaps, Span};

/// Result type alias for ferro-retriever operations
pub type Result<T> = std::result::Result<T, RetrieverError>;
