//! Flat sequence store
//!
//! Each reference sequence is stored as a single file of raw nucleotide
//! bytes, without headers or line breaks, named `<checksum>.sequence`
//! under a common root directory. Byte `i` (0-based) of the file is
//! genomic position `i + 1`.
//!
//! Reads go through a memory map that lives only for the duration of one
//! call.

use std::fs::File;
use std::path::{Path, PathBuf};

use crate::coords::Span;
use crate::error::RetrieverError;

/// File extension of flat sequence files
pub const SEQUENCE_EXTENSION: &str = "sequence";

/// Directory of flat per-reference sequence files
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SequenceStore {
    root: PathBuf,
}

impl SequenceStore {
    /// Create a store rooted at `root`
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Path of the sequence file for a checksum
    pub fn path_for(&self, checksum: &str) -> PathBuf {
        self.root.join(format!("{}.{}", checksum, SEQUENCE_EXTENSION))
    }

    /// Read `[start, end]` (1-based, inclusive) of the sequence with this checksum
    pub fn fetch(&self, checksum: &str, span: Span) -> Result<Vec<u8>, RetrieverError> {
        slice(&self.path_for(checksum), span.start, span.end)
    }
}

/// Read the bytes at 1-based inclusive positions `[start, end]` of a flat file
///
/// Returns exactly `end - start + 1` bytes. The file is mapped, copied and
/// unmapped before returning, on success and failure alike.
///
/// # Errors
///
/// Returns [`RetrieverError::SequenceUnavailable`] if `start` is 0, `start`
/// is past `end`, the range runs past the end of the file, or the file cannot
/// be opened or mapped.
///
/// # Examples
///
/// ```
/// use ferro_retriever::reference::sequence::slice;
///
/// let dir = tempfile::tempdir().unwrap();
/// let path = dir.path().join("abc.sequence");
/// std::fs::write(&path, b"AAAATTTCC").unwrap();
///
/// assert_eq!(slice(&path, 1, 5).unwrap(), b"AAAAT");
/// assert_eq!(slice(&path, 8, 9).unwrap(), b"CC");
/// assert!(slice(&path, 8, 10).is_err());
/// ```
pub fn slice(path: &Path, start: u64, end: u64) -> Result<Vec<u8>, RetrieverError> {
    let unavailable = |msg: String| RetrieverError::SequenceUnavailable {
        path: path.display().to_string(),
        msg,
    };

    if start == 0 {
        return Err(unavailable("position 0 is not a 1-based position".to_string()));
    }
    if start > end {
        return Err(unavailable(format!("start {} is after end {}", start, end)));
    }

    let file = File::open(path).map_err(|e| unavailable(format!("Failed to open: {}", e)))?;

    // The mapping is read-only and dropped before this function returns.
    let mmap = unsafe {
        memmap2::Mmap::map(&file).map_err(|e| unavailable(format!("Failed to memory-map: {}", e)))?
    };

    if end > mmap.len() as u64 {
        return Err(unavailable(format!(
            "range {}-{} exceeds sequence length {}",
            start,
            end,
            mmap.len()
        )));
    }

    let range = Span::new(start, end).to_byte_range();
    Ok(mmap[range].to_vec())
}
