use std::ops::Range;

use bio_types::genome::Position;
use itertools::Itertools;

use crate::core::dna::Nucleotide;
use crate::core::error::{Result, SquirlsError};
use crate::core::genome::{GenomicRegion, StrandedSequence, Variant};

/// Enumerates every SNV, deletion and insertion up to `max_length` bases.
///
/// Order is stable: positions ascend; at each position come SNVs (A, C, G, T), deletions starting
/// at the position (shortest first), then insertions in front of the position (shortest first,
/// lexicographic within a length). Positions with unknown bases produce insertions only.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct VariantGenerator {
    max_length: usize,
}

impl VariantGenerator {
    pub fn new(max_length: usize) -> Result<Self> {
        if max_length == 0 {
            return Err(SquirlsError::InvalidParameters("maximal variant length must be positive".into()));
        }
        Ok(Self { max_length })
    }

    #[inline]
    pub fn max_length(&self) -> usize {
        self.max_length
    }

    /// Number of variants generated for a single position with a known reference base.
    pub fn per_position(&self) -> usize {
        let insertions: usize = (1..=self.max_length as u32).map(|x| 4usize.pow(x)).sum();
        3 + self.max_length + insertions
    }

    /// Variants starting inside `range` (on the sequence strand). Positions outside the sequence are
    /// skipped, deletions never extend past `limit` or the sequence end.
    pub fn generate<'a>(
        &'a self,
        sequence: &'a StrandedSequence,
        range: Range<Position>,
        limit: Position,
    ) -> impl Iterator<Item = Variant> + 'a {
        let available = sequence.region().start()..sequence.region().end();
        let range = range.start.max(available.start)..range.end.min(available.end);
        let limit = limit.min(available.end).max(range.end);
        range.flat_map(move |pos| self.at(sequence, pos, limit))
    }

    fn at(&self, sequence: &StrandedSequence, pos: Position, end: Position) -> Vec<Variant> {
        let seqreg = sequence.region();
        let region = |start: Position, end: Position| {
            GenomicRegion::new(seqreg.contig().clone(), seqreg.strand(), start, end)
        };
        let anchor = pos.checked_sub(1).and_then(|x| sequence.base(x));
        let with_anchor = |variant: Variant| match anchor {
            Some(anchor) => variant.with_anchor(anchor),
            None => variant,
        };

        let mut variants = Vec::new();
        let known = |bases: &[u8]| bases.iter().all(|x| Nucleotide::from(*x) != Nucleotide::Unknown);

        if let Some(reference) = sequence.subsequence(pos..pos + 1).filter(|x| known(x)) {
            for alt in Nucleotide::KNOWN.map(|x| x.symbol()) {
                if alt != reference[0] {
                    variants.extend(region(pos, pos + 1).and_then(|r| Variant::new(r, reference, &[alt])).ok());
                }
            }
            for length in 1..=self.max_length as Position {
                if pos + length > end {
                    break;
                }
                let deleted = match sequence.subsequence(pos..pos + length).filter(|x| known(x)) {
                    Some(deleted) => deleted,
                    None => break,
                };
                let variant = region(pos, pos + length).and_then(|r| Variant::new(r, deleted, b""));
                variants.extend(variant.ok().map(with_anchor));
            }
        }

        for length in 1..=self.max_length {
            for inserted in itertools::repeat_n(Nucleotide::KNOWN, length).multi_cartesian_product() {
                let inserted: Vec<u8> = inserted.into_iter().map(|x| x.symbol()).collect();
                variants.extend(region(pos, pos).and_then(|r| Variant::new(r, b"", &inserted)).ok().map(with_anchor));
            }
        }
        variants
    }
}
