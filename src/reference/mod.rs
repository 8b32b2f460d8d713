//! Reference data access
//!
//! The annotation store supplies references and flat transcript rows; the
//! sequence store supplies raw bytes by position.

pub mod mock;
pub mod provider;
pub mod row;
pub mod sequence;
pub mod sqlite;

pub use mock::MockStore;
pub use provider::AnnotationStore;
pub use row::{Reference, Strand, TranscriptRow};
pub use sequence::SequenceStore;
pub use sqlite::SqliteStore;
