use std::collections::HashMap;
use std::sync::Arc;

use bio_types::strand::Strand;

use crate::core::dna;
use crate::core::error::{Result, SquirlsError};
use crate::core::genome::{Contig, GenomicRegion, StrandedSequence};

use super::SequenceSource;

/// Reference sequence kept in memory, mostly useful for small genomes and tests.
#[derive(Clone, Debug, Default)]
pub struct MemorySequenceSource {
    contigs: HashMap<String, (Arc<Contig>, Vec<u8>)>,
}

impl MemorySequenceSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: &str, bases: &[u8]) -> Arc<Contig> {
        let contig = Arc::new(Contig::new(name.to_string(), bases.len() as u64));
        self.contigs.insert(name.to_string(), (contig.clone(), dna::normalize(bases)));
        contig
    }
}

impl SequenceSource for MemorySequenceSource {
    fn contig(&self, name: &str) -> Option<Arc<Contig>> {
        self.contigs.get(name).map(|x| x.0.clone())
    }

    fn fetch(&self, region: &GenomicRegion) -> Result<StrandedSequence> {
        let name = region.contig().name();
        let (contig, bases) =
            self.contigs.get(name).ok_or_else(|| SquirlsError::Sequence(format!("unknown contig {}", name)))?;
        let range = region.range_on(Strand::Forward);
        let end = range.end.min(contig.length());
        let start = range.start.min(end);
        StrandedSequence::new(GenomicRegion::forward(contig.clone(), start, end)?, &bases[start as usize..end as usize])
    }
}
