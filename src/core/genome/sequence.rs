use std::ops::Range;

use bio_types::genome::Position;
use bio_types::strand::Strand;

use crate::core::dna;
use crate::core::error::{Result, SquirlsError};

use super::GenomicRegion;

/// Reference bases of a region, stored on the region's strand.
#[derive(Clone, Debug, PartialEq)]
pub struct StrandedSequence {
    region: GenomicRegion,
    bases: Vec<u8>,
}

impl StrandedSequence {
    pub fn new(region: GenomicRegion, bases: &[u8]) -> Result<Self> {
        if region.len() as usize != bases.len() {
            return Err(SquirlsError::Sequence(format!(
                "{} bases provided for region {} of length {}",
                bases.len(),
                region,
                region.len()
            )));
        }
        Ok(Self { region, bases: dna::normalize(bases) })
    }

    #[inline]
    pub fn region(&self) -> &GenomicRegion {
        &self.region
    }

    #[inline]
    pub fn bases(&self) -> &[u8] {
        &self.bases
    }

    #[inline]
    pub fn base(&self, pos: Position) -> Option<u8> {
        if pos < self.region.start() || pos >= self.region.end() {
            return None;
        }
        Some(self.bases[(pos - self.region.start()) as usize])
    }

    /// Bases of `range` (expressed on the sequence strand) or None if not entirely available.
    #[inline]
    pub fn subsequence(&self, range: Range<Position>) -> Option<&[u8]> {
        if range.start < self.region.start() || range.end > self.region.end() || range.start > range.end {
            return None;
        }
        let offset = self.region.start();
        Some(&self.bases[(range.start - offset) as usize..(range.end - offset) as usize])
    }

    pub fn to_opposite_strand(&self) -> Self {
        Self { region: self.region.to_opposite_strand(), bases: dna::revcomp(&self.bases) }
    }

    pub fn to_strand(&self, strand: Strand) -> Self {
        if (strand == Strand::Reverse) == self.region.is_reverse() {
            self.clone()
        } else {
            self.to_opposite_strand()
        }
    }
}
