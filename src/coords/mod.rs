//! Genomic coordinate spans
//!
//! All positions handled by the retriever are **1-based, closed**: a span
//! `[start, end]` covers both `start` and `end`, and position 0 does not exist.
//! Sequence files are addressed by 0-based byte offsets, so [`Span::to_byte_range`]
//! is the single place where the two systems meet.
//!
//! # Examples
//!
//! ```
//! use ferro_retriever::coords::Span;
//!
//! let window = Span::new(100, 200);
//! let transcript = Span::new(150, 400);
//! assert!(window.overlaps(&transcript));
//! assert_eq!(window.hull(&transcript), Span::new(100, 400));
//! assert_eq!(Span::new(1, 5).to_byte_range(), 0..5);
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::Range;

/// A 1-based closed interval `[start, end]`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Span {
    pub start: u64,
    pub end: u64,
}

impl Span {
    /// Create a new span; `start` and `end` are inclusive
    pub const fn new(start: u64, end: u64) -> Self {
        Self { start, end }
    }

    /// Span covering exactly one position
    pub const fn point(pos: u64) -> Self {
        Self {
            start: pos,
            end: pos,
        }
    }

    /// Smallest span covering every position, or `None` for no positions
    pub fn covering<I: IntoIterator<Item = u64>>(positions: I) -> Option<Self> {
        positions.into_iter().fold(None, |acc, pos| match acc {
            None => Some(Span::point(pos)),
            Some(span) => Some(span.hull(&Span::point(pos))),
        })
    }

    /// Number of positions covered
    #[inline]
    pub const fn len(&self) -> u64 {
        if self.end < self.start {
            0
        } else {
            self.end - self.start + 1
        }
    }

    /// Check if the span covers nothing (end before start)
    #[inline]
    pub const fn is_empty(&self) -> bool {
        self.end < self.start
    }

    /// Check if a position lies within the span
    #[inline]
    pub const fn contains(&self, pos: u64) -> bool {
        pos >= self.start && pos <= self.end
    }

    /// Check if `other` lies entirely within this span
    #[inline]
    pub const fn contains_span(&self, other: &Span) -> bool {
        other.start >= self.start && other.end <= self.end
    }

    /// Inclusive overlap test
    ///
    /// True when one span contains the other or either edge is crossed;
    /// spans that share only a single boundary position overlap.
    #[inline]
    pub const fn overlaps(&self, other: &Span) -> bool {
        other.start <= self.end && other.end >= self.start
    }

    /// Smallest span covering both spans
    pub fn hull(&self, other: &Span) -> Span {
        Span {
            start: self.start.min(other.start),
            end: self.end.max(other.end),
        }
    }

    /// Widen by `flank` on both sides, staying within `[1, limit]`
    pub fn pad(&self, flank: u64, limit: u64) -> Span {
        Span {
            start: self.start.saturating_sub(flank).max(1),
            end: self.end.saturating_add(flank).min(limit),
        }
    }

    /// Restrict to `[1, limit]`
    pub fn clamp(&self, limit: u64) -> Span {
        Span {
            start: self.start.max(1),
            end: self.end.min(limit),
        }
    }

    /// 0-based half-open byte range for slicing a flat sequence file
    ///
    /// # Panics
    ///
    /// Panics if `start` is 0, which is not a valid 1-based position.
    pub fn to_byte_range(&self) -> Range<usize> {
        assert!(self.start > 0, "1-based position cannot be 0");
        (self.start - 1) as usize..self.end as usize
    }
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}_{}", self.start, self.end)
    }
}

/// Inclusive overlap predicate on raw coordinates
///
/// Same test as [`Span::overlaps`], for callers holding bare integers
/// (e.g. store rows).
#[inline]
pub const fn overlaps(a_start: u64, a_end: u64, b_start: u64, b_end: u64) -> bool {
    b_start <= a_end && b_end >= a_start
}
