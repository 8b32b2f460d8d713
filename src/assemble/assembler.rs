//! Record assembly from flat transcript rows

use std::collections::HashMap;

use crate::assemble::record::{
    Gene, Orientation, PositionList, Record, Transcript, LINK_METHOD_NCBI, MOL_TYPE_DNA,
};
use crate::assemble::splice::cds_position_list;
use crate::coords::Span;
use crate::error::{ErrorCode, RetrieverError};
use crate::messages::{Message, MessageSink, Severity};
use crate::reference::{Reference, TranscriptRow};

const ORIGIN: &str = "assembler";

/// Builds [`Record`]s for one reference
///
/// # Examples
///
/// ```
/// use ferro_retriever::assemble::RecordAssembler;
/// use ferro_retriever::coords::Span;
/// use ferro_retriever::messages::NullSink;
/// use ferro_retriever::reference::{AnnotationStore, MockStore};
///
/// let store = MockStore::with_test_data();
/// let reference = store.find_reference("NC_000011", Some("10")).unwrap().unwrap();
/// let rows = store.find_transcripts_by_gene(reference.id, "SDHD").unwrap();
///
/// let assembler = RecordAssembler::new(&reference);
/// let genes = assembler.genes(&rows, &mut NullSink);
/// assert_eq!(genes.len(), 1);
/// assert_eq!(genes[0].transcripts[0].locus_tag, "001");
/// assert_eq!(genes[0].transcripts[1].locus_tag, "002");
/// ```
#[derive(Debug)]
pub struct RecordAssembler<'a> {
    reference: &'a Reference,
}

impl<'a> RecordAssembler<'a> {
    pub fn new(reference: &'a Reference) -> Self {
        Self { reference }
    }

    /// Group rows by gene, in order of first appearance
    ///
    /// Degraded rows (mismatched exon lists, protein without CDS) are
    /// reported to `sink` as warnings and assembled from what is usable.
    pub fn genes(&self, rows: &[TranscriptRow], sink: &mut dyn MessageSink) -> Vec<Gene> {
        let mut genes: Vec<Gene> = Vec::new();
        let mut index: HashMap<&str, usize> = HashMap::new();

        for row in rows {
            let slot = *index.entry(row.gene.as_str()).or_insert_with(|| {
                genes.push(Gene {
                    name: row.gene.clone(),
                    orientation: Orientation::from(row.strand),
                    transcripts: Vec::new(),
                });
                genes.len() - 1
            });

            let gene = &mut genes[slot];
            let locus_tag = format!("{:03}", gene.transcripts.len() + 1);
            gene.transcripts.push(transcript(row, locus_tag, sink));
        }

        genes
    }

    /// Build the record for a resolved window
    pub fn record(&self, window: Span, genes: Vec<Gene>, sequence: Vec<u8>) -> Record {
        Record {
            source_accession: self.reference.accession.clone(),
            source_version: self.reference.version.clone(),
            organism: self.reference.organism.clone(),
            mol_type: MOL_TYPE_DNA.to_string(),
            window: Some(window),
            genes,
            sequence,
        }
    }

    /// Build a record naming a single gene, without transcripts or sequence
    pub fn gene_only(&self, name: &str) -> Record {
        Record {
            source_accession: self.reference.accession.clone(),
            source_version: self.reference.version.clone(),
            organism: self.reference.organism.clone(),
            mol_type: MOL_TYPE_DNA.to_string(),
            window: None,
            genes: vec![Gene::empty(name)],
            sequence: Vec::new(),
        }
    }
}

/// Assemble one transcript row
fn transcript(row: &TranscriptRow, locus_tag: String, sink: &mut dyn MessageSink) -> Transcript {
    let transcript_id = row.transcript_id();
    let exon_positions = exon_positions(row, sink);
    let mrna_positions = exon_positions.clone();

    let coding = match (row.protein_id(), row.cds_start, row.cds_stop) {
        (Some(protein_id), Some(cds_start), Some(cds_stop)) => {
            Some((protein_id, cds_position_list(&mrna_positions, (cds_start, cds_stop))))
        }
        (Some(protein_id), _, _) => {
            sink.report(Message::new(
                ORIGIN,
                Severity::Warning,
                ErrorCode::MissingCds.as_str(),
                format!(
                    "{} links protein {} without CDS coordinates, treated as non-coding",
                    transcript_id, protein_id
                ),
            ));
            None
        }
        (None, _, _) => None,
    };

    match coding {
        Some((protein_id, cds_positions)) => Transcript {
            locus_tag,
            transcript_id,
            mrna_positions,
            exon_positions,
            cds_positions: Some(cds_positions),
            protein_id: Some(protein_id),
            transcript_product: row.transcript_product.clone(),
            protein_product: row.protein_product.clone(),
            transcribe: true,
            translate: true,
            link_method: Some(LINK_METHOD_NCBI.to_string()),
        },
        None => Transcript {
            locus_tag,
            transcript_id,
            mrna_positions,
            exon_positions,
            cds_positions: None,
            protein_id: None,
            transcript_product: row.transcript_product.clone(),
            protein_product: None,
            transcribe: true,
            translate: false,
            link_method: None,
        },
    }
}

/// Sorted exon position list of a row
///
/// Paired exon starts and stops are interleaved and sorted. Without usable
/// exon lists the transcript extent stands in as a single exon; unequal list
/// lengths are reported as [`RetrieverError::MalformedExonData`].
pub fn exon_positions(row: &TranscriptRow, sink: &mut dyn MessageSink) -> PositionList {
    let fallback = vec![row.transcript_start, row.transcript_stop];

    match (&row.exons_start, &row.exons_stop) {
        (Some(starts), Some(stops)) if starts.is_empty() && stops.is_empty() => fallback,
        (Some(starts), Some(stops)) if starts.len() == stops.len() => {
            let mut positions: PositionList = starts
                .iter()
                .zip(stops)
                .flat_map(|(&start, &stop)| [start, stop])
                .collect();
            positions.sort_unstable();
            positions
        }
        (None, None) => fallback,
        (starts, stops) => {
            let err = RetrieverError::MalformedExonData {
                transcript: row.transcript_id(),
                starts: starts.as_ref().map_or(0, Vec::len),
                stops: stops.as_ref().map_or(0, Vec::len),
            };
            log::debug!("{}, using transcript extent", err);
            sink.report_error(ORIGIN, &err);
            fallback
        }
    }
}
