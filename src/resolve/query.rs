//! Query types
//!
//! A query names a reference by its accession token and scopes it with a
//! [`Selector`].

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::coords::Span;
use crate::error::RetrieverError;

/// What part of a reference a query asks for
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Selector {
    /// One or more positions (1-based)
    Positions(Vec<u64>),
    /// One or more `(start, end)` ranges, e.g. the operations of several variants
    Ranges(Vec<(u64, u64)>),
    /// All transcripts of a gene symbol
    Gene(String),
    /// A single transcript by accession and version
    Transcript { accession: String, version: String },
    /// The whole reference, without padding
    Whole,
}

impl Selector {
    /// Smallest span covering every position a positional selector refers to
    ///
    /// Returns `Ok(None)` for gene, transcript and whole-reference selectors.
    ///
    /// # Errors
    ///
    /// Returns [`RetrieverError::InvalidQuery`] for an empty selector, a
    /// position of 0, or a range whose start is after its end.
    pub fn position_span(&self) -> Result<Option<Span>, RetrieverError> {
        let span = match self {
            Selector::Positions(positions) => Span::covering(positions.iter().copied()),
            Selector::Ranges(ranges) => {
                if let Some((start, end)) = ranges.iter().find(|(s, e)| s > e) {
                    return Err(RetrieverError::invalid_query(format!(
                        "range start {} is after end {}",
                        start, end
                    )));
                }
                Span::covering(ranges.iter().flat_map(|&(s, e)| [s, e]))
            }
            Selector::Gene(_) | Selector::Transcript { .. } | Selector::Whole => return Ok(None),
        };

        match span {
            None => Err(RetrieverError::invalid_query("no positions given")),
            Some(span) if span.start == 0 => Err(RetrieverError::invalid_query(
                "positions are 1-based, 0 is not a position",
            )),
            Some(span) => Ok(Some(span)),
        }
    }
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Selector::Positions(positions) => {
                let items: Vec<String> = positions.iter().map(|p| p.to_string()).collect();
                write!(f, "positions {}", items.join(","))
            }
            Selector::Ranges(ranges) => {
                let items: Vec<String> = ranges.iter().map(|(s, e)| format!("{}_{}", s, e)).collect();
                write!(f, "ranges {}", items.join(","))
            }
            Selector::Gene(gene) => write!(f, "gene {}", gene),
            Selector::Transcript { accession, version } => {
                write!(f, "transcript {}.{}", accession, version)
            }
            Selector::Whole => write!(f, "whole reference"),
        }
    }
}

/// A retrieval request
///
/// # Examples
///
/// ```
/// use ferro_retriever::resolve::{Query, Selector};
///
/// let query = Query::parse_transcript("NC_000011.10", "NM_003002.2").unwrap();
/// assert_eq!(
///     query.selector,
///     Selector::Transcript {
///         accession: "NM_003002".to_string(),
///         version: "2".to_string()
///     }
/// );
/// assert_eq!(query.to_string(), "NC_000011.10 (transcript NM_003002.2)");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Query {
    /// Accession token, `ACCESSION` or `ACCESSION.VERSION`
    pub token: String,
    pub selector: Selector,
}

impl Query {
    /// Create a query with an explicit selector
    pub fn new(token: impl Into<String>, selector: Selector) -> Self {
        Self {
            token: token.into(),
            selector,
        }
    }

    /// Query around a single position
    pub fn position(token: impl Into<String>, position: u64) -> Self {
        Self::new(token, Selector::Positions(vec![position]))
    }

    /// Query around several positions
    pub fn positions(token: impl Into<String>, positions: Vec<u64>) -> Self {
        Self::new(token, Selector::Positions(positions))
    }

    /// Query around a single range
    pub fn range(token: impl Into<String>, start: u64, end: u64) -> Self {
        Self::new(token, Selector::Ranges(vec![(start, end)]))
    }

    /// Query around several ranges
    pub fn ranges(token: impl Into<String>, ranges: Vec<(u64, u64)>) -> Self {
        Self::new(token, Selector::Ranges(ranges))
    }

    /// Query for all transcripts of a gene
    pub fn gene(token: impl Into<String>, gene: impl Into<String>) -> Self {
        Self::new(token, Selector::Gene(gene.into()))
    }

    /// Query for a transcript given as separate accession and version
    pub fn transcript(
        token: impl Into<String>,
        accession: impl Into<String>,
        version: impl Into<String>,
    ) -> Self {
        Self::new(
            token,
            Selector::Transcript {
                accession: accession.into(),
                version: version.into(),
            },
        )
    }

    /// Query for the whole reference
    pub fn whole(token: impl Into<String>) -> Self {
        Self::new(token, Selector::Whole)
    }

    /// Query for a transcript given as `ACCESSION.VERSION`
    ///
    /// # Errors
    ///
    /// Returns [`RetrieverError::InvalidQuery`] if either part is missing.
    pub fn parse_transcript(token: impl Into<String>, transcript: &str) -> Result<Self, RetrieverError> {
        match transcript.trim().split_once('.') {
            Some((accession, version)) if !accession.is_empty() && !version.is_empty() => {
                Ok(Self::transcript(token, accession, version))
            }
            _ => Err(RetrieverError::invalid_query(format!(
                "transcript '{}' must be ACCESSION.VERSION",
                transcript
            ))),
        }
    }
}

impl fmt::Display for Query {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.token, self.selector)
    }
}

/// Parse a range written as `START-END` or `START_END`
///
/// A single number is a one-position range.
///
/// ```
/// use ferro_retriever::resolve::query::parse_range;
///
/// assert_eq!(parse_range("100-200").unwrap(), (100, 200));
/// assert_eq!(parse_range("100_200").unwrap(), (100, 200));
/// assert_eq!(parse_range("42").unwrap(), (42, 42));
/// assert!(parse_range("200-100").is_err());
/// ```
pub fn parse_range(s: &str) -> Result<(u64, u64), RetrieverError> {
    let s = s.trim();
    let invalid = || RetrieverError::invalid_query(format!("invalid range '{}'", s));
    let number = |part: &str| part.trim().parse::<u64>().map_err(|_| invalid());

    let (start, end) = match s.split_once(['-', '_']) {
        Some((start, end)) => (number(start)?, number(end)?),
        None => {
            let pos = number(s)?;
            (pos, pos)
        }
    };

    if start == 0 || start > end {
        return Err(invalid());
    }
    Ok((start, end))
}
