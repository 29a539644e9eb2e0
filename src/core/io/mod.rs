use std::sync::Arc;

#[cfg(test)]
use mockall::automock;

use crate::core::error::Result;
use crate::core::genome::{Contig, GenomicRegion, StrandedSequence};
use crate::core::transcript::Transcript;

pub use annotation::TranscriptIndex;
pub use bedgraph::BedGraphTrack;
pub use fasta::FastaSequenceSource;
pub use memory::MemorySequenceSource;
#[cfg(test)]
pub use sink::MockResultSink;
pub use sink::{CollectingSink, ResultSink, TsvSink};

mod annotation;
pub mod bed;
mod bedgraph;
mod fasta;
pub(crate) mod memory;
mod sink;
pub(crate) mod utils;

/// Reference sequence provider.
#[cfg_attr(test, automock)]
pub trait SequenceSource: Send + Sync {
    fn contig(&self, name: &str) -> Option<Arc<Contig>>;

    /// Forward strand bases of the region. Regions exceeding the contig are clipped, callers must
    /// be prepared to get a shorter sequence.
    fn fetch(&self, region: &GenomicRegion) -> Result<StrandedSequence>;
}

/// Transcript models provider.
#[cfg_attr(test, automock)]
pub trait TranscriptSource: Send + Sync {
    /// Transcripts overlapping the region on any strand, ordered by their forward strand start.
    fn overlapping(&self, region: &GenomicRegion) -> Vec<Arc<Transcript>>;
}
