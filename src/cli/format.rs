//! Output formatting utilities for CLI operations

use crate::assemble::{Record, Transcript};
use crate::error::RetrieverError;
use std::io::{self, Write};
use std::str::FromStr;

/// Output format for CLI results
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    /// Plain text format (default)
    #[default]
    Text,
    /// JSON format
    Json,
}

impl FromStr for OutputFormat {
    type Err = std::convert::Infallible;

    /// Parse an output format from a string
    ///
    /// # Examples
    ///
    /// ```
    /// use ferro_retriever::cli::OutputFormat;
    /// use std::str::FromStr;
    ///
    /// assert!(matches!(OutputFormat::from_str("json").unwrap(), OutputFormat::Json));
    /// assert!(matches!(OutputFormat::from_str("text").unwrap(), OutputFormat::Text));
    /// assert!(matches!(OutputFormat::from_str("other").unwrap(), OutputFormat::Text));
    /// ```
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s.to_lowercase().as_str() {
            "json" => OutputFormat::Json,
            _ => OutputFormat::Text,
        })
    }
}

/// Write a record to the output
///
/// Text output lists genes and transcripts without the sequence; JSON
/// output is the full serialized record.
///
/// # Examples
///
/// ```
/// use ferro_retriever::assemble::{Gene, Record};
/// use ferro_retriever::cli::{output_record, OutputFormat};
/// use std::io::Cursor;
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
/// let mut buffer = Cursor::new(Vec::new());
/// output_record(&mut buffer, &record, OutputFormat::Text).unwrap();
/// let result = String::from_utf8(buffer.into_inner()).unwrap();
/// assert!(result.contains("gene SDHD"));
/// ```
pub fn output_record<W: Write>(
    writer: &mut W,
    record: &Record,
    format: OutputFormat,
) -> io::Result<()> {
    match format {
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(record)
                .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
            writeln!(writer, "{}", json)
        }
        OutputFormat::Text => {
            writeln!(writer, "{}", record.summary())?;
            for gene in &record.genes {
                writeln!(writer, "gene {} {}", gene.name, gene.orientation)?;
                for transcript in &gene.transcripts {
                    writeln!(writer, "  {}", transcript_line(transcript))?;
                }
            }
            Ok(())
        }
    }
}

/// Write an error to the output
///
/// # Examples
///
/// ```
/// use ferro_retriever::cli::{output_error, OutputFormat};
/// use ferro_retriever::RetrieverError;
/// use std::io::Cursor;
///
/// let mut buffer = Cursor::new(Vec::new());
/// let error = RetrieverError::UnknownAccession { accession: "NC_1".to_string() };
/// output_error(&mut buffer, "NC_1", &error, OutputFormat::Json).unwrap();
/// let result = String::from_utf8(buffer.into_inner()).unwrap();
/// assert!(result.contains(r#""code":"E2001""#));
/// ```
pub fn output_error<W: Write>(
    writer: &mut W,
    input: &str,
    error: &RetrieverError,
    format: OutputFormat,
) -> io::Result<()> {
    match format {
        OutputFormat::Json => {
            let value = serde_json::json!({
                "input": input,
                "error": error.to_string(),
                "code": error.code().as_str(),
                "status": "error",
            });
            writeln!(writer, "{}", value)
        }
        OutputFormat::Text => writeln!(writer, "ERROR [{}]: {} - {}", error.code(), input, error),
    }
}

fn transcript_line(transcript: &Transcript) -> String {
    let mut line = format!(
        "{} {} exons {}",
        transcript.locus_tag,
        transcript.transcript_id,
        pairs(&transcript.exon_positions)
    );
    if let (Some(cds), Some(protein)) = (&transcript.cds_positions, &transcript.protein_id) {
        line.push_str(&format!(" cds {} protein {}", pairs(cds), protein));
    } else {
        line.push_str(" non-coding");
    }
    line
}

/// Render a position list as `s1_e1,s2_e2,...`
fn pairs(positions: &[u64]) -> String {
    positions
        .chunks(2)
        .map(|pair| match pair {
            [start, end] => format!("{}_{}", start, end),
            [single] => single.to_string(),
            _ => String::new(),
        })
        .collect::<Vec<_>>()
        .join(",")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assemble::{Gene, Orientation};
    use crate::coords::Span;
    use std::io::Cursor;

    fn record() -> Record {
        Record {
            source_accession: "NC_1".to_string(),
            source_version: "1".to_string(),
            organism: None,
            mol_type: "dna".to_string(),
            window: Some(Span::new(1, 8)),
            genes: vec![Gene {
                name: "G".to_string(),
                orientation: Orientation::Forward,
                transcripts: vec![Transcript {
                    locus_tag: "001".to_string(),
                    transcript_id: "NM_1.1".to_string(),
                    mrna_positions: vec![1, 3, 5, 8],
                    exon_positions: vec![1, 3, 5, 8],
                    cds_positions: Some(vec![2, 3, 5, 7]),
                    protein_id: Some("NP_1.1".to_string()),
                    transcript_product: None,
                    protein_product: None,
                    transcribe: true,
                    translate: true,
                    link_method: Some("ncbi".to_string()),
                }],
            }],
            sequence: b"ACGTACGT".to_vec(),
        }
    }

    fn render(record: &Record, format: OutputFormat) -> String {
        let mut buffer = Cursor::new(Vec::new());
        output_record(&mut buffer, record, format).unwrap();
        String::from_utf8(buffer.into_inner()).unwrap()
    }

    #[test]
    fn test_text_output() {
        let text = render(&record(), OutputFormat::Text);
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "NC_1.1:1_8: 1 gene(s), 1 transcript(s), 8 bp");
        assert_eq!(lines[1], "gene G +1");
        assert_eq!(lines[2], "  001 NM_1.1 exons 1_3,5_8 cds 2_3,5_7 protein NP_1.1");
    }

    #[test]
    fn test_json_output() {
        let json = render(&record(), OutputFormat::Json);
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["sequence"], "ACGTACGT");
        assert_eq!(value["genes"][0]["transcripts"][0]["protein_id"], "NP_1.1");
    }

    #[test]
    fn test_error_output() {
        let mut buffer = Cursor::new(Vec::new());
        let error = RetrieverError::AmbiguousVersion {
            accession: "NC_1".to_string(),
            versions: vec!["1".to_string(), "2".to_string()],
        };
        output_error(&mut buffer, "NC_1", &error, OutputFormat::Text).unwrap();
        let text = String::from_utf8(buffer.into_inner()).unwrap();
        assert!(text.starts_with("ERROR [E2002]: NC_1 - "));
        assert!(text.contains("1, 2"));
    }

    #[test]
    fn test_pairs() {
        assert_eq!(pairs(&[10, 20, 30, 40]), "10_20,30_40");
        assert_eq!(pairs(&[10]), "10");
        assert_eq!(pairs(&[]), "");
    }
}
