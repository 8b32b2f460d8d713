//! Flat annotation rows as they come out of the store
//!
//! # Coordinate System
//!
//! All coordinates are **1-based inclusive** genomic positions on the
//! reference sequence:
//!
//! | Field | Notes |
//! |-------|-------|
//! | `transcript_start`, `transcript_stop` | Outer transcript extent |
//! | `exons_start`, `exons_stop` | Per-exon extents, paired by index |
//! | `cds_start`, `cds_stop` | Coding region extent |

use serde::{Deserialize, Serialize};

use crate::coords::Span;

/// A reference sequence known to the annotation store
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reference {
    /// Internal store identifier (lowest wins on duplicate accession.version)
    pub id: i64,
    /// Accession without version (e.g., "NC_000011")
    pub accession: String,
    /// Version (e.g., "10")
    pub version: String,
    /// Sequence length in bp
    pub length: u64,
    /// Checksum naming the flat sequence file
    pub sequence_checksum: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub organism: Option<String>,
}

impl Reference {
    /// Versioned accession (e.g., "NC_000011.10")
    pub fn versioned(&self) -> String {
        format!("{}.{}", self.accession, self.version)
    }

    /// The whole reference as a span
    pub fn span(&self) -> Span {
        Span::new(1, self.length)
    }
}

/// Strand orientation as stored
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum Strand {
    #[serde(rename = "+")]
    Plus,
    #[serde(rename = "-")]
    Minus,
    /// Anything other than `+` or `-`
    #[serde(rename = ".")]
    #[default]
    Unknown,
}

impl Strand {
    /// Parse a stored strand value; unrecognised values map to `Unknown`
    pub fn parse(s: &str) -> Self {
        match s.trim() {
            "+" => Strand::Plus,
            "-" => Strand::Minus,
            _ => Strand::Unknown,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Strand::Plus => "+",
            Strand::Minus => "-",
            Strand::Unknown => ".",
        }
    }
}

impl std::fmt::Display for Strand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One transcript mapping row
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TranscriptRow {
    /// Gene symbol (e.g., "SDHD")
    pub gene: String,
    pub strand: Strand,
    pub transcript_start: u64,
    pub transcript_stop: u64,
    /// Exon starts, decoded from the stored comma-separated list
    #[serde(default)]
    pub exons_start: Option<Vec<u64>>,
    /// Exon stops, decoded from the stored comma-separated list
    #[serde(default)]
    pub exons_stop: Option<Vec<u64>>,
    #[serde(default)]
    pub cds_start: Option<u64>,
    #[serde(default)]
    pub cds_stop: Option<u64>,
    pub transcript_accession: String,
    pub transcript_version: String,
    #[serde(default)]
    pub protein_accession: Option<String>,
    #[serde(default)]
    pub protein_version: Option<String>,
    #[serde(default)]
    pub transcript_product: Option<String>,
    #[serde(default)]
    pub protein_product: Option<String>,
}

impl TranscriptRow {
    /// Create a non-coding row without exon structure
    pub fn new(
        gene: impl Into<String>,
        strand: Strand,
        transcript_start: u64,
        transcript_stop: u64,
        transcript_accession: impl Into<String>,
        transcript_version: impl Into<String>,
    ) -> Self {
        Self {
            gene: gene.into(),
            strand,
            transcript_start,
            transcript_stop,
            exons_start: None,
            exons_stop: None,
            cds_start: None,
            cds_stop: None,
            transcript_accession: transcript_accession.into(),
            transcript_version: transcript_version.into(),
            protein_accession: None,
            protein_version: None,
            transcript_product: None,
            protein_product: None,
        }
    }

    /// Returns an updated row with the given exon lists
    pub fn with_exons(mut self, starts: Vec<u64>, stops: Vec<u64>) -> Self {
        self.exons_start = Some(starts);
        self.exons_stop = Some(stops);
        self
    }

    /// Returns an updated row with a CDS and its protein
    pub fn with_protein(
        mut self,
        cds_start: u64,
        cds_stop: u64,
        accession: impl Into<String>,
        version: impl Into<String>,
    ) -> Self {
        self.cds_start = Some(cds_start);
        self.cds_stop = Some(cds_stop);
        self.protein_accession = Some(accession.into());
        self.protein_version = Some(version.into());
        self
    }

    /// Versioned transcript accession (e.g., "NM_003002.2")
    pub fn transcript_id(&self) -> String {
        format!("{}.{}", self.transcript_accession, self.transcript_version)
    }

    /// Versioned protein accession, if both parts are present
    pub fn protein_id(&self) -> Option<String> {
        match (&self.protein_accession, &self.protein_version) {
            (Some(accession), Some(version)) => Some(format!("{}.{}", accession, version)),
            _ => None,
        }
    }

    /// Outer transcript extent
    pub fn span(&self) -> Span {
        Span::new(self.transcript_start, self.transcript_stop)
    }

    /// Check if this row is the given transcript
    pub fn is_transcript(&self, accession: &str, version: &str) -> bool {
        self.transcript_accession == accession && self.transcript_version == version
    }
}

/// Decode a stored comma-separated position list
///
/// Whitespace around items and a trailing comma are tolerated. Returns
/// `None` for an empty list or if any item is not a number.
///
/// ```
/// use ferro_retriever::reference::row::parse_positions;
///
/// assert_eq!(parse_positions("100,250,"), Some(vec![100, 250]));
/// assert_eq!(parse_positions("100,x"), None);
/// ```
pub fn parse_positions(csv: &str) -> Option<Vec<u64>> {
    let positions: Option<Vec<u64>> = csv
        .split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(|item| item.parse::<u64>().ok())
        .collect();
    positions.filter(|p| !p.is_empty())
}

/// Encode a position list for storage
pub fn format_positions(positions: &[u64]) -> String {
    positions
        .iter()
        .map(|p| p.to_string())
        .collect::<Vec<_>>()
        .join(",")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strand_parse() {
        assert_eq!(Strand::parse("+"), Strand::Plus);
        assert_eq!(Strand::parse(" - "), Strand::Minus);
        assert_eq!(Strand::parse("?"), Strand::Unknown);
        assert_eq!(Strand::parse(""), Strand::Unknown);
    }

    #[test]
    fn test_parse_positions() {
        assert_eq!(parse_positions("1,2,3"), Some(vec![1, 2, 3]));
        assert_eq!(parse_positions(" 10 , 20 ,"), Some(vec![10, 20]));
        assert_eq!(parse_positions(""), None);
        assert_eq!(parse_positions(","), None);
        assert_eq!(parse_positions("1,-2"), None);
    }

    #[test]
    fn test_format_positions() {
        assert_eq!(format_positions(&[5, 10, 15]), "5,10,15");
        assert_eq!(format_positions(&[]), "");
        assert_eq!(parse_positions(&format_positions(&[7, 9])), Some(vec![7, 9]));
    }

    #[test]
    fn test_row_identifiers() {
        let row = TranscriptRow::new("SDHD", Strand::Plus, 100, 900, "NM_003002", "2")
            .with_protein(150, 800, "NP_002993", "1");
        assert_eq!(row.transcript_id(), "NM_003002.2");
        assert_eq!(row.protein_id(), Some("NP_002993.1".to_string()));
        assert!(row.is_transcript("NM_003002", "2"));
        assert!(!row.is_transcript("NM_003002", "3"));
        assert_eq!(row.span(), Span::new(100, 900));
    }

    #[test]
    fn test_protein_id_requires_version() {
        let mut row = TranscriptRow::new("SDHD", Strand::Plus, 100, 900, "NM_003002", "2");
        row.protein_accession = Some("NP_002993".to_string());
        assert_eq!(row.protein_id(), None);
    }

    #[test]
    fn test_reference_helpers() {
        let reference = Reference {
            id: 1,
            accession: "NC_000011".to_string(),
            version: "10".to_string(),
            length: 1000,
            sequence_checksum: "abc".to_string(),
            organism: None,
        };
        assert_eq!(reference.versioned(), "NC_000011.10");
        assert_eq!(reference.span(), Span::new(1, 1000));
    }
}
