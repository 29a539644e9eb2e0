pub use contig::Contig;
pub use region::{contains, overlaps, GenomicRegion};
pub use sequence::StrandedSequence;
pub use variant::Variant;

mod contig;
mod region;
mod sequence;
mod variant;
