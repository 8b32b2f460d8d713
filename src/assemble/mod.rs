//! Hierarchical record assembly
//!
//! Turns the flat transcript rows of a resolved window into a
//! gene → transcript → exon/CDS record.

pub mod assembler;
pub mod record;
pub mod splice;

pub use assembler::RecordAssembler;
pub use record::{Gene, Orientation, PositionList, Record, Transcript};
pub use splice::cds_position_list;
