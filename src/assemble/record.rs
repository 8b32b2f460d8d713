//! Assembled annotation record
//!
//! A [`Record`] nests genes, transcripts and their position lists over a
//! slice of reference sequence. Positions stay in reference coordinates;
//! `window` says which part of the reference `sequence` covers.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::coords::Span;
use crate::reference::Strand;

/// Ascending list of alternating feature starts and ends
pub type PositionList = Vec<u64>;

/// Molecule type of genomic records
pub const MOL_TYPE_DNA: &str = "dna";

/// Link method of coding transcripts with an annotated protein
pub const LINK_METHOD_NCBI: &str = "ncbi";

/// Gene orientation, serialized as `1`, `-1` or `0`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(into = "i8", try_from = "i8")]
pub enum Orientation {
    Forward,
    Reverse,
    #[default]
    Unknown,
}

impl Orientation {
    pub fn as_i8(self) -> i8 {
        match self {
            Orientation::Forward => 1,
            Orientation::Reverse => -1,
            Orientation::Unknown => 0,
        }
    }
}

impl From<Strand> for Orientation {
    fn from(strand: Strand) -> Self {
        match strand {
            Strand::Plus => Orientation::Forward,
            Strand::Minus => Orientation::Reverse,
            Strand::Unknown => Orientation::Unknown,
        }
    }
}

impl From<Orientation> for i8 {
    fn from(orientation: Orientation) -> Self {
        orientation.as_i8()
    }
}

impl TryFrom<i8> for Orientation {
    type Error = String;

    fn try_from(value: i8) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(Orientation::Forward),
            -1 => Ok(Orientation::Reverse),
            0 => Ok(Orientation::Unknown),
            other => Err(format!("invalid orientation {}", other)),
        }
    }
}

impl fmt::Display for Orientation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Orientation::Forward => write!(f, "+1"),
            Orientation::Reverse => write!(f, "-1"),
            Orientation::Unknown => write!(f, "0"),
        }
    }
}

/// An assembled transcript
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transcript {
    /// Zero-padded index within the gene ("001", "002", ...)
    pub locus_tag: String,
    /// Versioned transcript accession
    pub transcript_id: String,
    pub mrna_positions: PositionList,
    pub exon_positions: PositionList,
    /// CDS start, internal splice sites, CDS end
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cds_positions: Option<PositionList>,
    /// Versioned protein accession
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub protein_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transcript_product: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub protein_product: Option<String>,
    pub transcribe: bool,
    pub translate: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub link_method: Option<String>,
}

impl Transcript {
    /// Check if the transcript has a linked protein and CDS
    pub fn is_coding(&self) -> bool {
        self.cds_positions.is_some()
    }

    /// Outer extent of the exons
    pub fn span(&self) -> Option<Span> {
        Span::covering(self.exon_positions.iter().copied())
    }
}

/// An assembled gene
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Gene {
    /// Gene symbol
    pub name: String,
    pub orientation: Orientation,
    pub transcripts: Vec<Transcript>,
}

impl Gene {
    /// A gene without transcripts
    pub fn empty(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            orientation: Orientation::Unknown,
            transcripts: Vec::new(),
        }
    }
}

/// Hierarchical annotation record over a slice of a reference sequence
///
/// # Examples
///
/// ```
/// use ferro_retriever::assemble::{Gene, Record};
///
/// let record = Record {
///     source_accession: "NC_000011".to_string(),
///     source_version: "10".to_string(),
///     organism: None,
///     mol_type: "dna".to_string(),
///     window: None,
///     genes: vec![Gene::empty("SDHD")],
///     sequence: Vec::new(),
/// };
/// assert!(record.is_gene_only());
/// assert_eq!(record.summary(), "NC_000011.10 (gene-only): 1 gene(s), 0 transcript(s)");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    pub source_accession: String,
    pub source_version: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub organism: Option<String>,
    pub mol_type: String,
    /// Part of the reference covered by `sequence`; `None` for gene-only records
    #[serde(default)]
    pub window: Option<Span>,
    pub genes: Vec<Gene>,
    /// Reference bytes of `window`; serialized as text, so they must be UTF-8
    #[serde(with = "sequence_text")]
    pub sequence: Vec<u8>,
}

impl Record {
    /// Versioned source accession
    pub fn source_id(&self) -> String {
        format!("{}.{}", self.source_accession, self.source_version)
    }

    /// Check if this record carries genes only (no transcripts, window or sequence)
    pub fn is_gene_only(&self) -> bool {
        self.window.is_none()
            && self.sequence.is_empty()
            && self.genes.iter().all(|g| g.transcripts.is_empty())
    }

    /// Find a gene by symbol
    pub fn gene(&self, name: &str) -> Option<&Gene> {
        self.genes.iter().find(|g| g.name == name)
    }

    /// Find a transcript by versioned accession
    pub fn transcript(&self, transcript_id: &str) -> Option<&Transcript> {
        self.transcripts().find(|t| t.transcript_id == transcript_id)
    }

    /// All transcripts, gene by gene
    pub fn transcripts(&self) -> impl Iterator<Item = &Transcript> {
        self.genes.iter().flat_map(|g| g.transcripts.iter())
    }

    /// One-line description for logs
    pub fn summary(&self) -> String {
        let genes = self.genes.len();
        let transcripts = self.transcripts().count();
        match self.window {
            Some(window) => format!(
                "{}:{}: {} gene(s), {} transcript(s), {} bp",
                self.source_id(),
                window,
                genes,
                transcripts,
                self.sequence.len()
            ),
            None => format!(
                "{} (gene-only): {} gene(s), {} transcript(s)",
                self.source_id(),
                genes,
                transcripts
            ),
        }
    }

    /// Serialize as pretty-printed JSON
    pub fn to_json(&self) -> Result<String, crate::error::RetrieverError> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// Serializes sequence bytes as a string; bytes that are not UTF-8 are an error
mod sequence_text {
    use serde::{ser, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        let text = std::str::from_utf8(bytes).map_err(|e| {
            ser::Error::custom(format!("sequence is not valid UTF-8: {}", e))
        })?;
        serializer.serialize_str(text)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        Ok(String::deserialize(deserializer)?.into_bytes())
    }
}
