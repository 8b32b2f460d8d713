//! Query retrieval pipeline
//!
//! [`Retriever::retrieve`] runs one query end to end:
//!
//! 1. validate the configuration
//! 2. resolve the accession token to a reference
//! 3. resolve the selector to a window and its overlapping transcripts
//! 4. assemble genes and transcripts from the rows
//! 5. slice the window from the sequence store
//!
//! Failures are sent to the caller's [`MessageSink`] before they are
//! returned, except for configuration and sequence failures, which are only
//! returned.

use crate::assemble::{Record, RecordAssembler};
use crate::config::RetrieverConfig;
use crate::error::{ErrorCode, RetrieverError};
use crate::messages::{Message, MessageSink, Severity};
use crate::reference::{AnnotationStore, SequenceStore, SqliteStore};
use crate::resolve::{AccessionResolver, Query, Selector, WindowResolver};

/// Resolves queries into annotation records
///
/// # Examples
///
/// ```
/// use ferro_retriever::{MessageLog, MockStore, Query, Retriever, RetrieverConfig, Severity};
///
/// let dir = tempfile::tempdir().unwrap();
/// let config = RetrieverConfig::default().with_sequence_dir(dir.path());
/// let retriever = Retriever::new(MockStore::with_test_data(), config);
///
/// // No version given: the accession is ambiguous and no record is built
/// let mut log = MessageLog::new(Severity::Warning);
/// assert!(retriever.retrieve(&Query::position("NC_000011", 100), &mut log).is_err());
/// assert_eq!(log.with_code("E2002").count(), 1);
///
/// // An unknown gene gives a gene-only record
/// let record = retriever
///     .retrieve(&Query::gene("NC_000011.10", "BRCA1"), &mut log)
///     .unwrap();
/// assert!(record.is_gene_only());
/// ```
#[derive(Debug)]
pub struct Retriever<S: AnnotationStore> {
    store: S,
    config: RetrieverConfig,
}

impl<S: AnnotationStore> Retriever<S> {
    /// Create a retriever over the given store
    pub fn new(store: S, config: RetrieverConfig) -> Self {
        Self { store, config }
    }

    /// Get the configuration
    pub fn config(&self) -> &RetrieverConfig {
        &self.config
    }

    /// Get the annotation store
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Retrieve the record for a query
    ///
    /// # Errors
    ///
    /// Any error means no record was produced. A gene or transcript selector
    /// that matches nothing is not an error: it yields a gene-only record.
    pub fn retrieve(
        &self,
        query: &Query,
        sink: &mut dyn MessageSink,
    ) -> Result<Record, RetrieverError> {
        self.config.validate()?;
        log::debug!("Retrieving {}", query);

        let reference = reported(
            sink,
            "accession",
            AccessionResolver::new(&self.store).resolve(&query.token),
        )?;

        let resolver = WindowResolver::new(&self.store, self.config.window.flank);
        let resolved = reported(sink, "window", resolver.resolve(&reference, &query.selector))?;
        let assembler = RecordAssembler::new(&reference);

        let Some(resolved) = resolved else {
            sink.report(Message::new(
                "window",
                Severity::Warning,
                ErrorCode::NoTranscripts.as_str(),
                format!(
                    "No transcripts for {} on {}",
                    query.selector,
                    reference.versioned()
                ),
            ));
            let record = assembler.gene_only(&gene_only_name(&query.selector));
            log::info!("{}", record.summary());
            return Ok(record);
        };

        let genes = assembler.genes(&resolved.transcripts, sink);

        let sequences = SequenceStore::new(self.config.sequence_dir()?);
        let sequence = sequences.fetch(&reference.sequence_checksum, resolved.window)?;

        let record = assembler.record(resolved.window, genes, sequence);
        log::info!("{}", record.summary());
        Ok(record)
    }
}

impl Retriever<SqliteStore> {
    /// Validate the configuration and open its annotation database
    ///
    /// # Errors
    ///
    /// Returns [`RetrieverError::Configuration`] if the configuration is
    /// invalid or names no database.
    pub fn open(config: RetrieverConfig) -> Result<Self, RetrieverError> {
        config.validate()?;
        let database = config
            .store
            .database
            .as_deref()
            .ok_or_else(|| RetrieverError::configuration("Annotation database is not configured"))?;
        let store = SqliteStore::open(database)?;
        Ok(Self::new(store, config))
    }
}

/// Send a failed step's error to the sink, then pass the result on
fn reported<T>(
    sink: &mut dyn MessageSink,
    origin: &str,
    result: Result<T, RetrieverError>,
) -> Result<T, RetrieverError> {
    if let Err(err) = &result {
        if err.is_reported() {
            sink.report_error(origin, err);
        }
    }
    result
}

/// Gene name of the record returned when a selector matches nothing
fn gene_only_name(selector: &Selector) -> String {
    match selector {
        Selector::Gene(gene) => gene.clone(),
        Selector::Transcript { accession, version } => format!("{}.{}", accession, version),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coords::Span;
    use crate::messages::{MessageLog, NullSink};
    use crate::reference::{MockStore, Strand, TranscriptRow};

    const SEQUENCE_LEN: usize = 100_000;

    // Writes a 100 kbp sequence for `test-nc11` whose byte at position p
    // (1-based) is "ACGT"[(p - 1) % 4]
    fn setup() -> (tempfile::TempDir, Retriever<MockStore>) {
        let dir = tempfile::tempdir().unwrap();
        let bytes: Vec<u8> = b"ACGT".iter().copied().cycle().take(SEQUENCE_LEN).collect();
        std::fs::write(dir.path().join("test-nc11.sequence"), bytes).unwrap();
        let config = RetrieverConfig::default().with_sequence_dir(dir.path());
        (dir, Retriever::new(MockStore::with_test_data(), config))
    }

    #[test]
    fn test_retrieve_position() {
        let (_dir, retriever) = setup();
        let mut log = MessageLog::new(Severity::Warning);

        let record = retriever
            .retrieve(&Query::position("NC_000011.10", 22_000), &mut log)
            .unwrap();
        // Padded to 17_000..27_000, snapped to SDHD's end, then TIMM8B joins
        assert_eq!(record.window, Some(Span::new(17_000, 28_000)));
        assert_eq!(record.sequence.len(), 11_001);
        assert_eq!(&record.sequence[..4], b"TACG");
        assert_eq!(record.genes.len(), 2);
        assert_eq!(record.genes[0].name, "SDHD");
        assert_eq!(record.genes[1].name, "TIMM8B");
        assert_eq!(log.messages().len(), 0);
    }

    #[test]
    fn test_retrieve_transcript_linkage() {
        let (_dir, retriever) = setup();
        let record = retriever
            .retrieve(&Query::gene("NC_000011.10", "SDHD"), &mut NullSink)
            .unwrap();

        let coding = record.transcript("NM_003002.2").unwrap();
        assert_eq!(coding.protein_id.as_deref(), Some("NP_002993.1"));
        assert_eq!(
            coding.cds_positions,
            Some(vec![20_100, 20_500, 22_000, 22_300, 24_000, 24_400, 27_000, 27_500])
        );
        let non_coding = record.transcript("NR_077060.1").unwrap();
        assert!(!non_coding.translate);
        assert_eq!(non_coding.locus_tag, "002");
    }

    #[test]
    fn test_retrieve_unknown_gene_is_gene_only() {
        let (_dir, retriever) = setup();
        let mut log = MessageLog::new(Severity::Warning);

        let record = retriever
            .retrieve(&Query::gene("NC_000011.10", "BRCA1"), &mut log)
            .unwrap();
        assert!(record.is_gene_only());
        assert_eq!(record.genes[0].name, "BRCA1");
        assert!(record.genes[0].transcripts.is_empty());
        assert!(record.sequence.is_empty());
        assert_eq!(log.with_code("E3004").count(), 1);
    }

    #[test]
    fn test_retrieve_unknown_transcript_is_gene_only() {
        let (_dir, retriever) = setup();
        let record = retriever
            .retrieve(
                &Query::transcript("NC_000011.10", "NM_000088", "3"),
                &mut NullSink,
            )
            .unwrap();
        assert!(record.is_gene_only());
        assert_eq!(record.genes[0].name, "NM_000088.3");
    }

    #[test]
    fn test_accession_errors_are_reported() {
        let (_dir, retriever) = setup();
        let mut log = MessageLog::new(Severity::Warning);

        let err = retriever
            .retrieve(&Query::position("NC_000011", 100), &mut log)
            .unwrap_err();
        assert!(matches!(err, RetrieverError::AmbiguousVersion { .. }));

        let err = retriever
            .retrieve(&Query::position("NC_000012.1", 100), &mut log)
            .unwrap_err();
        assert!(matches!(err, RetrieverError::UnknownAccession { .. }));

        assert_eq!(log.error_count(), 2);
        assert_eq!(log.messages()[0].origin, "accession");
    }

    #[test]
    fn test_multiple_matches_is_fatal() {
        let (dir, _) = setup();
        let mut store = MockStore::with_test_data();
        store.add_transcript(
            1,
            TranscriptRow::new("LONE", Strand::Plus, 80_000, 81_000, "NM_000999", "1"),
        );
        let retriever = Retriever::new(
            store,
            RetrieverConfig::default().with_sequence_dir(dir.path()),
        );
        let mut log = MessageLog::new(Severity::Warning);

        let result = retriever.retrieve(
            &Query::transcript("NC_000011.10", "NM_000999", "1"),
            &mut log,
        );
        assert!(matches!(result, Err(RetrieverError::MultipleMatches { .. })));
        assert_eq!(log.messages()[0].severity, Severity::Fatal);
    }

    #[test]
    fn test_missing_sequence_is_not_reported() {
        let dir = tempfile::tempdir().unwrap();
        let retriever = Retriever::new(
            MockStore::with_test_data(),
            RetrieverConfig::default().with_sequence_dir(dir.path()),
        );
        let mut log = MessageLog::new(Severity::Debug);

        let result = retriever.retrieve(&Query::position("NC_000011.10", 500), &mut log);
        assert!(matches!(
            result,
            Err(RetrieverError::SequenceUnavailable { .. })
        ));
        assert!(log.messages().is_empty());
    }

    #[test]
    fn test_configuration_checked_before_store() {
        let retriever = Retriever::new(MockStore::new(), RetrieverConfig::default());
        let mut log = MessageLog::new(Severity::Debug);

        // An empty store would give UnknownAccession if it were consulted
        let result = retriever.retrieve(&Query::position("NC_1.1", 1), &mut log);
        assert!(matches!(result, Err(RetrieverError::Configuration { .. })));
        assert!(log.messages().is_empty());
    }

    #[test]
    fn test_borrowed_store() {
        let (dir, _) = setup();
        let store = MockStore::with_test_data();
        let retriever = Retriever::new(
            &store,
            RetrieverConfig::default()
                .with_sequence_dir(dir.path())
                .with_flank(0),
        );
        let record = retriever
            .retrieve(&Query::range("NC_000011.10", 80_200, 80_300), &mut NullSink)
            .unwrap();
        assert_eq!(record.window, Some(Span::new(80_000, 81_000)));
        assert_eq!(record.genes[0].name, "LONE");
    }

    #[test]
    fn test_open_requires_database() {
        let dir = tempfile::tempdir().unwrap();
        let config = RetrieverConfig::default().with_sequence_dir(dir.path());
        assert!(matches!(
            Retriever::open(config),
            Err(RetrieverError::Configuration { .. })
        ));
    }
}
