//! Query resolution
//!
//! Resolves the accession token of a query to a reference and its selector
//! to a window and the transcripts overlapping it.

pub mod accession;
pub mod query;
pub mod window;

pub use accession::{parse_token, AccessionResolver};
pub use query::{parse_range, Query, Selector};
pub use window::{ResolvedWindow, WindowResolver};
