//! CLI utilities for ferro-retriever
//!
//! This module provides testable functions used by the CLI binary.
//! Argument handling that does not need a terminal lives here so that it can
//! be unit tested without end-to-end CLI tests.

pub mod format;

// Re-export commonly used items
pub use format::{output_error, output_record, OutputFormat};

use std::path::{Path, PathBuf};

use crate::config::RetrieverConfig;
use crate::error::RetrieverError;
use crate::resolve::{parse_range, Query, Selector};

/// Build a query from the selector arguments of `retrieve`
///
/// At most one kind of selector may be given: a gene, a transcript, or any
/// mix of positions and ranges. Without a selector the whole reference is
/// queried.
///
/// # Examples
///
/// ```
/// use ferro_retriever::cli::build_query;
/// use ferro_retriever::resolve::Selector;
///
/// let query = build_query("NC_000011.10", None, None, &[120], &["200-300".to_string()]).unwrap();
/// assert_eq!(query.selector, Selector::Ranges(vec![(120, 120), (200, 300)]));
///
/// let query = build_query("NC_000011.10", Some("SDHD"), None, &[], &[]).unwrap();
/// assert_eq!(query.selector, Selector::Gene("SDHD".to_string()));
///
/// assert!(build_query("NC_000011.10", Some("SDHD"), None, &[120], &[]).is_err());
/// ```
pub fn build_query(
    token: &str,
    gene: Option<&str>,
    transcript: Option<&str>,
    positions: &[u64],
    ranges: &[String],
) -> Result<Query, RetrieverError> {
    let positional = !positions.is_empty() || !ranges.is_empty();
    let given = [gene.is_some(), transcript.is_some(), positional]
        .iter()
        .filter(|&&g| g)
        .count();
    if given > 1 {
        return Err(RetrieverError::invalid_query(
            "--gene, --transcript and --position/--range are mutually exclusive",
        ));
    }

    if let Some(gene) = gene {
        return Ok(Query::gene(token, gene));
    }
    if let Some(transcript) = transcript {
        return Query::parse_transcript(token, transcript);
    }
    if ranges.is_empty() {
        if positions.is_empty() {
            return Ok(Query::whole(token));
        }
        return Ok(Query::new(token, Selector::Positions(positions.to_vec())));
    }

    let mut parsed: Vec<(u64, u64)> = positions.iter().map(|&p| (p, p)).collect();
    for range in ranges {
        parsed.push(parse_range(range)?);
    }
    Ok(Query::ranges(token, parsed))
}

/// Load the configuration file, if any, and apply command-line overrides
///
/// # Examples
///
/// ```
/// use ferro_retriever::cli::build_config;
///
/// let config = build_config(None, None, Some("/data/seq".as_ref()), Some(100)).unwrap();
/// assert_eq!(config.window.flank, 100);
/// assert!(config.store.database.is_none());
/// ```
pub fn build_config(
    config_file: Option<&Path>,
    database: Option<&Path>,
    sequence_dir: Option<&Path>,
    flank: Option<u64>,
) -> Result<RetrieverConfig, RetrieverError> {
    let mut config = match config_file {
        Some(path) => RetrieverConfig::from_file(path)?,
        None => RetrieverConfig::default(),
    };
    if let Some(database) = database {
        config = config.with_database(PathBuf::from(database));
    }
    if let Some(dir) = sequence_dir {
        config = config.with_sequence_dir(PathBuf::from(dir));
    }
    if let Some(flank) = flank {
        config = config.with_flank(flank);
    }
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_query_whole() {
        let query = build_query("NC_1.1", None, None, &[], &[]).unwrap();
        assert_eq!(query.selector, Selector::Whole);
    }

    #[test]
    fn test_build_query_positions_only() {
        let query = build_query("NC_1.1", None, None, &[5, 9], &[]).unwrap();
        assert_eq!(query.selector, Selector::Positions(vec![5, 9]));
    }

    #[test]
    fn test_build_query_transcript() {
        let query = build_query("NC_1.1", None, Some("NM_2.3"), &[], &[]).unwrap();
        assert_eq!(
            query.selector,
            Selector::Transcript {
                accession: "NM_2".to_string(),
                version: "3".to_string()
            }
        );
        assert!(build_query("NC_1.1", None, Some("NM_2"), &[], &[]).is_err());
    }

    #[test]
    fn test_build_query_conflicts_and_bad_ranges() {
        assert!(build_query("NC_1.1", Some("G"), Some("NM_2.3"), &[], &[]).is_err());
        assert!(build_query("NC_1.1", None, Some("NM_2.3"), &[], &["1-2".to_string()]).is_err());
        assert!(build_query("NC_1.1", None, None, &[], &["9-2".to_string()]).is_err());
    }

    #[test]
    fn test_build_config_overrides_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("retriever.toml");
        std::fs::write(&path, "[sequence]\ndir = \"/from/file\"\n\n[window]\nflank = 10\n").unwrap();

        let config = build_config(Some(&path), None, None, None).unwrap();
        assert_eq!(config.sequence.dir, Some(PathBuf::from("/from/file")));
        assert_eq!(config.window.flank, 10);

        let config = build_config(Some(&path), None, Some(Path::new("/cli")), Some(20)).unwrap();
        assert_eq!(config.sequence.dir, Some(PathBuf::from("/cli")));
        assert_eq!(config.window.flank, 20);
    }

    #[test]
    fn test_build_config_missing_file() {
        let result = build_config(Some(Path::new("/nonexistent/retriever.toml")), None, None, None);
        assert!(matches!(result, Err(RetrieverError::Configuration { .. })));
    }
}
