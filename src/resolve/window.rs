//! Query window resolution
//!
//! A positional query is widened by a flank, checked against the transcripts
//! it overlaps, and then snapped outward once so that no overlapping
//! transcript is cut off. The overlap query is re-issued on the final window
//! and its rows become the transcript set of the record.
//!
//! ```text
//! positions        |----|
//! padded      |--------------|
//! transcripts   |=========|      |=====|
//!                       |==============|
//! snapped     |------------------------|
//! ```
//!
//! The snap happens exactly once. A transcript that only overlaps the
//! snapped window is included in the final set, but the window is not
//! widened again to cover it.

use crate::coords::Span;
use crate::error::RetrieverError;
use crate::reference::{AnnotationStore, Reference, TranscriptRow};
use crate::resolve::query::Selector;

/// Result of window resolution
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedWindow {
    /// Window before snapping (after padding, for positional queries)
    pub initial: Span,
    /// Final window, never smaller than `initial`
    pub window: Span,
    /// Transcripts overlapping the final window, in store order
    pub transcripts: Vec<TranscriptRow>,
}

/// Computes query windows against an annotation store
#[derive(Debug)]
pub struct WindowResolver<'a, S: AnnotationStore + ?Sized> {
    store: &'a S,
    flank: u64,
}

impl<'a, S: AnnotationStore + ?Sized> WindowResolver<'a, S> {
    pub fn new(store: &'a S, flank: u64) -> Self {
        Self { store, flank }
    }

    /// Resolve the window for a selector on a reference
    ///
    /// Returns `Ok(None)` when a gene or transcript selector matches nothing;
    /// the caller then builds a gene-only record.
    ///
    /// # Errors
    ///
    /// - [`RetrieverError::InvalidQuery`] for an empty or out-of-range
    ///   positional selector
    /// - [`RetrieverError::MultipleMatches`] if a transcript selector matches
    ///   more than one row
    /// - any store error
    pub fn resolve(
        &self,
        reference: &Reference,
        selector: &Selector,
    ) -> Result<Option<ResolvedWindow>, RetrieverError> {
        match selector {
            Selector::Positions(_) | Selector::Ranges(_) => {
                let span = selector
                    .position_span()?
                    .ok_or_else(|| RetrieverError::invalid_query("no positions given"))?;
                self.resolve_positions(reference, span).map(Some)
            }
            Selector::Gene(gene) => {
                let rows = self.store.find_transcripts_by_gene(reference.id, gene)?;
                log::debug!("Gene {} has {} transcript(s)", gene, rows.len());
                match extent(&rows) {
                    Some(span) => self.snap(reference, span.clamp(reference.length)).map(Some),
                    None => Ok(None),
                }
            }
            Selector::Transcript { accession, version } => {
                let row = self
                    .store
                    .find_transcript(reference.id, accession, version)?;
                match row {
                    Some(row) => self
                        .snap(reference, row.span().clamp(reference.length))
                        .map(Some),
                    None => {
                        log::debug!("Transcript {}.{} not found", accession, version);
                        Ok(None)
                    }
                }
            }
            Selector::Whole => self.snap(reference, reference.span()).map(Some),
        }
    }

    /// Pad a span of query positions by the flank, then snap
    ///
    /// # Errors
    ///
    /// Returns [`RetrieverError::InvalidQuery`] if the positions start past
    /// the end of the reference.
    pub fn resolve_positions(
        &self,
        reference: &Reference,
        positions: Span,
    ) -> Result<ResolvedWindow, RetrieverError> {
        if positions.start == 0 || positions.start > reference.length {
            return Err(RetrieverError::invalid_query(format!(
                "positions {} are outside {} (length {})",
                positions,
                reference.versioned(),
                reference.length
            )));
        }
        let padded = positions.pad(self.flank, reference.length);
        log::debug!("Padded {} by {} to {}", positions, self.flank, padded);
        self.snap(reference, padded)
    }

    /// Query transcripts overlapping `initial`, snap once, and query again
    ///
    /// The snapped window is bounded by the reference, even when a stored
    /// transcript runs past its end.
    pub fn snap(
        &self,
        reference: &Reference,
        initial: Span,
    ) -> Result<ResolvedWindow, RetrieverError> {
        let rows = self.overlapping(reference, initial)?;
        let window = match extent(&rows) {
            Some(found) => initial.hull(&found).clamp(reference.length),
            None => initial,
        };
        if window != initial {
            log::debug!("Snapped window {} to {}", initial, window);
        }

        let transcripts = self.overlapping(reference, window)?;
        Ok(ResolvedWindow {
            initial,
            window,
            transcripts,
        })
    }

    fn overlapping(
        &self,
        reference: &Reference,
        window: Span,
    ) -> Result<Vec<TranscriptRow>, RetrieverError> {
        let rows = self
            .store
            .find_transcripts_overlapping(reference.id, window.start, window.end)?;
        log::debug!(
            "{} transcript(s) overlap {}:{}",
            rows.len(),
            reference.versioned(),
            window
        );
        Ok(rows)
    }
}

/// Smallest span covering the extents of all rows
fn extent(rows: &[TranscriptRow]) -> Option<Span> {
    rows.iter().map(TranscriptRow::span).reduce(|a, b| a.hull(&b))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reference::{MockStore, Strand};

    fn nc11(store: &MockStore) -> Reference {
        store.find_reference("NC_000011", Some("10")).unwrap().unwrap()
    }

    fn ids(rows: &[TranscriptRow]) -> Vec<String> {
        rows.iter().map(TranscriptRow::transcript_id).collect()
    }

    #[test]
    fn test_pad_clamps_to_reference() {
        let store = MockStore::with_test_data();
        let reference = nc11(&store);
        let resolver = WindowResolver::new(&store, 5000);

        let resolved = resolver
            .resolve_positions(&reference, Span::new(100, 200))
            .unwrap();
        assert_eq!(resolved.initial, Span::new(1, 5200));
        assert_eq!(resolved.window, Span::new(1, 5200));
        assert!(resolved.transcripts.is_empty());

        let resolved = resolver
            .resolve_positions(&reference, Span::new(99_000, 99_990))
            .unwrap();
        assert_eq!(resolved.window, Span::new(94_000, 100_000));
    }

    #[test]
    fn test_snap_extends_to_transcripts() {
        let store = MockStore::with_test_data();
        let reference = nc11(&store);
        let resolver = WindowResolver::new(&store, 100);

        // Padded to 21_900..22_100, inside NM_003002.2 and NR_077060.1 only
        let resolved = resolver
            .resolve_positions(&reference, Span::point(22_000))
            .unwrap();
        assert_eq!(resolved.initial, Span::new(21_900, 22_100));
        assert_eq!(resolved.window, Span::new(20_000, 28_000));
        // The re-query picks up TIMM8B, which overlaps the snapped window
        assert_eq!(
            ids(&resolved.transcripts),
            vec!["NM_003002.2", "NR_077060.1", "NM_012459.2"]
        );
    }

    #[test]
    fn test_snap_happens_once() {
        let store = MockStore::with_test_data();
        let reference = nc11(&store);
        let resolver = WindowResolver::new(&store, 0);

        // TIMM8B reaches 31_000 but is only found by the second query
        let resolved = resolver
            .resolve_positions(&reference, Span::point(21_000))
            .unwrap();
        assert_eq!(resolved.window, Span::new(20_000, 28_000));
        assert_eq!(resolved.transcripts.len(), 3);
    }

    #[test]
    fn test_window_never_shrinks() {
        let store = MockStore::with_test_data();
        let reference = nc11(&store);

        for flank in [0, 10, 1000, 5000, 50_000] {
            let resolver = WindowResolver::new(&store, flank);
            for pos in [1, 20_000, 27_900, 50_000, 80_500, 100_000] {
                let resolved = resolver
                    .resolve_positions(&reference, Span::point(pos))
                    .unwrap();
                assert!(resolved.window.start <= resolved.initial.start);
                assert!(resolved.window.end >= resolved.initial.end);
                assert!(resolved.window.contains_span(&resolved.initial));
            }
        }
    }

    #[test]
    fn test_snap_stays_within_reference() {
        let mut store = MockStore::new();
        let reference = Reference {
            id: 1,
            accession: "NC_1".to_string(),
            version: "1".to_string(),
            length: 1000,
            sequence_checksum: "seq".to_string(),
            organism: None,
        };
        store.add_reference(reference.clone());
        store.add_transcript(
            1,
            TranscriptRow::new("G", Strand::Plus, 900, 1200, "NM_1", "1"),
        );
        let resolver = WindowResolver::new(&store, 10);

        let resolved = resolver
            .resolve_positions(&reference, Span::point(950))
            .unwrap();
        assert_eq!(resolved.initial, Span::new(940, 960));
        assert_eq!(resolved.window, Span::new(900, 1000));

        let resolved = resolver
            .resolve(&reference, &Selector::Gene("G".to_string()))
            .unwrap()
            .unwrap();
        assert_eq!(resolved.initial, Span::new(900, 1000));
        assert_eq!(resolved.window, Span::new(900, 1000));
    }

    #[test]
    fn test_out_of_range_positions() {
        let store = MockStore::with_test_data();
        let reference = nc11(&store);
        let resolver = WindowResolver::new(&store, 5000);
        assert!(matches!(
            resolver.resolve_positions(&reference, Span::new(100_001, 100_010)),
            Err(RetrieverError::InvalidQuery { .. })
        ));
    }

    #[test]
    fn test_resolve_ranges_union() {
        let store = MockStore::with_test_data();
        let reference = nc11(&store);
        let resolver = WindowResolver::new(&store, 0);

        let selector = Selector::Ranges(vec![(50_000, 50_010), (80_200, 80_210)]);
        let resolved = resolver.resolve(&reference, &selector).unwrap().unwrap();
        assert_eq!(resolved.initial, Span::new(50_000, 80_210));
        assert_eq!(resolved.window, Span::new(50_000, 81_000));
        assert_eq!(ids(&resolved.transcripts), vec!["NM_000999.1"]);
    }

    #[test]
    fn test_resolve_gene_keeps_neighbours() {
        let store = MockStore::with_test_data();
        let reference = nc11(&store);
        let resolver = WindowResolver::new(&store, 5000);

        let resolved = resolver
            .resolve(&reference, &Selector::Gene("SDHD".to_string()))
            .unwrap()
            .unwrap();
        assert_eq!(resolved.initial, Span::new(20_000, 28_000));
        assert_eq!(resolved.window, Span::new(20_000, 31_000));
        assert_eq!(resolved.transcripts.len(), 3);
    }

    #[test]
    fn test_resolve_unknown_gene_or_transcript() {
        let store = MockStore::with_test_data();
        let reference = nc11(&store);
        let resolver = WindowResolver::new(&store, 5000);

        assert!(resolver
            .resolve(&reference, &Selector::Gene("BRCA1".to_string()))
            .unwrap()
            .is_none());
        let selector = Selector::Transcript {
            accession: "NM_000088".to_string(),
            version: "3".to_string(),
        };
        assert!(resolver.resolve(&reference, &selector).unwrap().is_none());
    }

    #[test]
    fn test_resolve_transcript() {
        let store = MockStore::with_test_data();
        let reference = nc11(&store);
        let resolver = WindowResolver::new(&store, 5000);

        let selector = Selector::Transcript {
            accession: "NM_000999".to_string(),
            version: "1".to_string(),
        };
        let resolved = resolver.resolve(&reference, &selector).unwrap().unwrap();
        assert_eq!(resolved.window, Span::new(80_000, 81_000));
        assert_eq!(ids(&resolved.transcripts), vec!["NM_000999.1"]);
    }

    #[test]
    fn test_resolve_transcript_duplicates() {
        let mut store = MockStore::with_test_data();
        store.add_transcript(
            1,
            TranscriptRow::new("LONE", Strand::Plus, 80_000, 81_000, "NM_000999", "1"),
        );
        let reference = nc11(&store);
        let resolver = WindowResolver::new(&store, 5000);

        let selector = Selector::Transcript {
            accession: "NM_000999".to_string(),
            version: "1".to_string(),
        };
        assert!(matches!(
            resolver.resolve(&reference, &selector),
            Err(RetrieverError::MultipleMatches { count: 2, .. })
        ));
    }

    #[test]
    fn test_resolve_whole_reference() {
        let store = MockStore::with_test_data();
        let reference = nc11(&store);
        let resolver = WindowResolver::new(&store, 5000);

        let resolved = resolver
            .resolve(&reference, &Selector::Whole)
            .unwrap()
            .unwrap();
        assert_eq!(resolved.window, Span::new(1, 100_000));
        assert_eq!(resolved.transcripts.len(), 4);
    }
}
