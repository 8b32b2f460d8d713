//! Mock annotation store for testing

use crate::coords;
use crate::error::RetrieverError;
use crate::reference::provider::{expect_unique, AnnotationStore};
use crate::reference::row::{Reference, Strand, TranscriptRow};
use std::path::Path;

/// In-memory annotation store
///
/// Transcripts are kept in insertion order, which is the order every
/// query returns them in.
#[derive(Debug, Clone, Default)]
pub struct MockStore {
    references: Vec<Reference>,
    /// Transcript rows keyed by reference id
    transcripts: Vec<(i64, TranscriptRow)>,
}

/// JSON layout accepted by [`MockStore::from_json`]
#[derive(serde::Deserialize)]
struct MockData {
    references: Vec<Reference>,
    #[serde(default)]
    transcripts: Vec<MockTranscript>,
}

#[derive(serde::Deserialize)]
struct MockTranscript {
    reference_id: i64,
    #[serde(flatten)]
    row: TranscriptRow,
}

impl MockStore {
    /// Create an empty mock store
    pub fn new() -> Self {
        Self::default()
    }

    /// Load references and transcripts from a JSON file
    pub fn from_json(path: &Path) -> Result<Self, RetrieverError> {
        let content = std::fs::read_to_string(path)?;
        let data: MockData = serde_json::from_str(&content)?;

        let mut store = Self::new();
        for reference in data.references {
            store.add_reference(reference);
        }
        for tx in data.transcripts {
            store.add_transcript(tx.reference_id, tx.row);
        }
        Ok(store)
    }

    /// Add a reference to the store
    pub fn add_reference(&mut self, reference: Reference) {
        self.references.push(reference);
    }

    /// Add a transcript row to a reference
    pub fn add_transcript(&mut self, reference_id: i64, row: TranscriptRow) {
        self.transcripts.push((reference_id, row));
    }

    /// Create a store with a small test chromosome
    ///
    /// `NC_000011.10` (id 1, length 100 kbp, checksum `test-nc11`) carries:
    /// - `SDHD`: coding transcript NM_003002.2 on + with four exons, and a
    ///   non-coding NR_077060.1 sharing its locus
    /// - `TIMM8B`: coding NM_012459.2 on - with two exons, overlapping the
    ///   end of SDHD
    /// - `LONE`: single-exon coding NM_000999.1 far downstream
    ///
    /// `NC_000011.9` (id 2) exists without transcripts, so `NC_000011`
    /// without a version is ambiguous.
    pub fn with_test_data() -> Self {
        let mut store = Self::new();

        store.add_reference(Reference {
            id: 1,
            accession: "NC_000011".to_string(),
            version: "10".to_string(),
            length: 100_000,
            sequence_checksum: "test-nc11".to_string(),
            organism: Some("Homo sapiens".to_string()),
        });
        store.add_reference(Reference {
            id: 2,
            accession: "NC_000011".to_string(),
            version: "9".to_string(),
            length: 100_000,
            sequence_checksum: "test-nc11-v9".to_string(),
            organism: Some("Homo sapiens".to_string()),
        });

        store.add_transcript(
            1,
            TranscriptRow::new("SDHD", Strand::Plus, 20_000, 28_000, "NM_003002", "2")
                .with_exons(
                    vec![20_000, 22_000, 24_000, 27_000],
                    vec![20_500, 22_300, 24_400, 28_000],
                )
                .with_protein(20_100, 27_500, "NP_002993", "1"),
        );
        store.add_transcript(
            1,
            TranscriptRow::new("SDHD", Strand::Plus, 20_000, 26_000, "NR_077060", "1")
                .with_exons(vec![20_000, 25_000], vec![20_500, 26_000]),
        );
        store.add_transcript(
            1,
            TranscriptRow::new("TIMM8B", Strand::Minus, 27_800, 31_000, "NM_012459", "2")
                .with_exons(vec![30_000, 27_800], vec![31_000, 28_500])
                .with_protein(28_000, 30_500, "NP_036591", "2"),
        );
        store.add_transcript(
            1,
            TranscriptRow::new("LONE", Strand::Plus, 80_000, 81_000, "NM_000999", "1")
                .with_exons(vec![80_000], vec![81_000])
                .with_protein(80_100, 80_900, "NP_000990", "1"),
        );

        store
    }

    /// Number of transcript rows
    pub fn len(&self) -> usize {
        self.transcripts.len()
    }

    /// Check if the store holds no transcript rows
    pub fn is_empty(&self) -> bool {
        self.transcripts.is_empty()
    }

    fn rows_of(&self, reference_id: i64) -> impl Iterator<Item = &TranscriptRow> {
        self.transcripts
            .iter()
            .filter(move |(id, _)| *id == reference_id)
            .map(|(_, row)| row)
    }
}

impl AnnotationStore for MockStore {
    fn find_reference(
        &self,
        accession: &str,
        version: Option<&str>,
    ) -> Result<Option<Reference>, RetrieverError> {
        Ok(self
            .references
            .iter()
            .filter(|r| r.accession == accession)
            .filter(|r| version.map_or(true, |v| r.version == v))
            .min_by_key(|r| r.id)
            .cloned())
    }

    fn list_versions(&self, accession: &str) -> Result<Vec<String>, RetrieverError> {
        let mut versions: Vec<String> = self
            .references
            .iter()
            .filter(|r| r.accession == accession)
            .map(|r| r.version.clone())
            .collect();
        versions.sort_by(|a, b| compare_versions(a, b));
        versions.dedup();
        Ok(versions)
    }

    fn find_transcripts_overlapping(
        &self,
        reference_id: i64,
        start: u64,
        end: u64,
    ) -> Result<Vec<TranscriptRow>, RetrieverError> {
        Ok(self
            .rows_of(reference_id)
            .filter(|row| coords::overlaps(start, end, row.transcript_start, row.transcript_stop))
            .cloned()
            .collect())
    }

    fn find_transcripts_by_gene(
        &self,
        reference_id: i64,
        gene: &str,
    ) -> Result<Vec<TranscriptRow>, RetrieverError> {
        Ok(self
            .rows_of(reference_id)
            .filter(|row| row.gene == gene)
            .cloned()
            .collect())
    }

    fn find_transcript(
        &self,
        reference_id: i64,
        accession: &str,
        version: &str,
    ) -> Result<Option<TranscriptRow>, RetrieverError> {
        let rows = self
            .rows_of(reference_id)
            .filter(|row| row.is_transcript(accession, version))
            .cloned()
            .collect();
        expect_unique(rows, || format!("{}.{}", accession, version))
    }
}

/// Order versions numerically when both parse, lexically otherwise
pub(crate) fn compare_versions(a: &str, b: &str) -> std::cmp::Ordering {
    match (a.parse::<u64>(), b.parse::<u64>()) {
        (Ok(x), Ok(y)) => x.cmp(&y),
        _ => a.cmp(b),
    }
}
