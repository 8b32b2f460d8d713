//! Annotation store trait
//!
//! Defines the narrow interface the retriever needs from whatever holds
//! references and transcript mappings.

use crate::error::RetrieverError;
use crate::reference::row::{Reference, TranscriptRow};

/// Trait for querying reference and transcript annotation
///
/// Implementations include:
/// - [`MockStore`](crate::reference::MockStore) for testing
/// - [`SqliteStore`](crate::reference::SqliteStore) for an on-disk SQLite database
///
/// Store failures (I/O, corrupt data) are returned as errors. Absence is
/// not an error: lookups return `None` or an empty list.
pub trait AnnotationStore {
    /// Find a reference by accession and optional version
    ///
    /// When several rows share the same accession and version, the one
    /// with the lowest internal identifier is returned. Without a version,
    /// the lowest identifier over all versions is returned.
    fn find_reference(
        &self,
        accession: &str,
        version: Option<&str>,
    ) -> Result<Option<Reference>, RetrieverError>;

    /// List the distinct versions stored for an accession, in ascending order
    fn list_versions(&self, accession: &str) -> Result<Vec<String>, RetrieverError>;

    /// Transcripts whose extent overlaps `[start, end]` (inclusive)
    fn find_transcripts_overlapping(
        &self,
        reference_id: i64,
        start: u64,
        end: u64,
    ) -> Result<Vec<TranscriptRow>, RetrieverError>;

    /// Transcripts annotated with the given gene symbol
    fn find_transcripts_by_gene(
        &self,
        reference_id: i64,
        gene: &str,
    ) -> Result<Vec<TranscriptRow>, RetrieverError>;

    /// A single transcript by accession and version
    ///
    /// # Errors
    ///
    /// Returns [`RetrieverError::MultipleMatches`] if more than one row matches.
    fn find_transcript(
        &self,
        reference_id: i64,
        accession: &str,
        version: &str,
    ) -> Result<Option<TranscriptRow>, RetrieverError>;
}

/// Fail with `MultipleMatches` unless `rows` holds at most one row
pub(crate) fn expect_unique(
    mut rows: Vec<TranscriptRow>,
    what: impl FnOnce() -> String,
) -> Result<Option<TranscriptRow>, RetrieverError> {
    match rows.len() {
        0 => Ok(None),
        1 => Ok(rows.pop()),
        count => Err(RetrieverError::MultipleMatches {
            what: what(),
            count,
        }),
    }
}

/// Blanket implementation for shared references
impl<T: AnnotationStore + ?Sized> AnnotationStore for &T {
    fn find_reference(
        &self,
        accession: &str,
        version: Option<&str>,
    ) -> Result<Option<Reference>, RetrieverError> {
        (**self).find_reference(accession, version)
    }

    fn list_versions(&self, accession: &str) -> Result<Vec<String>, RetrieverError> {
        (**self).list_versions(accession)
    }

    fn find_transcripts_overlapping(
        &self,
        reference_id: i64,
        start: u64,
        end: u64,
    ) -> Result<Vec<TranscriptRow>, RetrieverError> {
        (**self).find_transcripts_overlapping(reference_id, start, end)
    }

    fn find_transcripts_by_gene(
        &self,
        reference_id: i64,
        gene: &str,
    ) -> Result<Vec<TranscriptRow>, RetrieverError> {
        (**self).find_transcripts_by_gene(reference_id, gene)
    }

    fn find_transcript(
        &self,
        reference_id: i64,
        accession: &str,
        version: &str,
    ) -> Result<Option<TranscriptRow>, RetrieverError> {
        (**self).find_transcript(reference_id, accession, version)
    }
}

/// Blanket implementation for boxed trait objects
impl AnnotationStore for Box<dyn AnnotationStore> {
    fn find_reference(
        &self,
        accession: &str,
        version: Option<&str>,
    ) -> Result<Option<Reference>, RetrieverError> {
        (**self).find_reference(accession, version)
    }

    fn list_versions(&self, accession: &str) -> Result<Vec<String>, RetrieverError> {
        (**self).list_versions(accession)
    }

    fn find_transcripts_overlapping(
        &self,
        reference_id: i64,
        start: u64,
        end: u64,
    ) -> Result<Vec<TranscriptRow>, RetrieverError> {
        (**self).find_transcripts_overlapping(reference_id, start, end)
    }

    fn find_transcripts_by_gene(
        &self,
        reference_id: i64,
        gene: &str,
    ) -> Result<Vec<TranscriptRow>, RetrieverError> {
        (**self).find_transcripts_by_gene(reference_id, gene)
    }

    fn find_transcript(
        &self,
        reference_id: i64,
        accession: &str,
        version: &str,
    ) -> Result<Option<TranscriptRow>, RetrieverError> {
        (**self).find_transcript(reference_id, accession, version)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reference::row::Strand;

    fn row(version: &str) -> TranscriptRow {
        TranscriptRow::new("G", Strand::Plus, 1, 10, "NM_1", version)
    }

    #[test]
    fn test_expect_unique() {
        assert_eq!(expect_unique(vec![], || "x".to_string()).unwrap(), None);
        assert_eq!(
            expect_unique(vec![row("1")], || "x".to_string()).unwrap(),
            Some(row("1"))
        );
        let err = expect_unique(vec![row("1"), row("1")], || "NM_1.1".to_string()).unwrap_err();
        assert_eq!(
            err,
            RetrieverError::MultipleMatches {
                what: "NM_1.1".to_string(),
                count: 2
            }
        );
    }
}
