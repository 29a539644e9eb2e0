use std::fmt::{Display, Formatter};
use std::ops::Range;
use std::sync::Arc;

use bio_types::genome::{AbstractInterval, Position};
use bio_types::strand::Strand;

use crate::core::error::{Result, SquirlsError};

use super::Contig;

/// Overlap of two half-open ranges. An empty range `[p, p)` is an insertion point between
/// bases `p - 1` and `p` and overlaps a non-empty range only if both flanking bases are inside it.
#[inline]
pub fn overlaps(first: &Range<Position>, second: &Range<Position>) -> bool {
    match (first.is_empty(), second.is_empty()) {
        (true, true) => first.start == second.start,
        (true, false) => second.start < first.start && first.start < second.end,
        (false, true) => first.start < second.start && second.start < first.end,
        (false, false) => first.start < second.end && second.start < first.end,
    }
}

#[inline]
pub fn contains(outer: &Range<Position>, inner: &Range<Position>) -> bool {
    outer.start <= inner.start && inner.end <= outer.end
}

/// Stranded 0-based half-open interval on a contig. Coordinates are always expressed on the
/// region's own strand, i.e. reverse strand regions count from the contig end.
#[derive(Clone, Debug, PartialEq)]
pub struct GenomicRegion {
    contig: Arc<Contig>,
    strand: Strand,
    start: Position,
    end: Position,
}

impl GenomicRegion {
    pub fn new(contig: Arc<Contig>, strand: Strand, start: Position, end: Position) -> Result<Self> {
        if start > end {
            return Err(SquirlsError::InvalidRegion(format!(
                "{}:{}-{} start is greater than end",
                contig.name(),
                start,
                end
            )));
        }
        if end > contig.length() {
            return Err(SquirlsError::InvalidRegion(format!(
                "{}:{}-{} exceeds contig length {}",
                contig.name(),
                start,
                end,
                contig.length()
            )));
        }
        // Unknown strand is treated as the forward one
        let strand = match strand {
            Strand::Reverse => Strand::Reverse,
            Strand::Forward | Strand::Unknown => Strand::Forward,
        };
        Ok(Self { contig, strand, start, end })
    }

    pub fn forward(contig: Arc<Contig>, start: Position, end: Position) -> Result<Self> {
        Self::new(contig, Strand::Forward, start, end)
    }

    #[inline]
    pub fn contig(&self) -> &Arc<Contig> {
        &self.contig
    }

    #[inline]
    pub fn strand(&self) -> Strand {
        self.strand
    }

    #[inline]
    pub fn start(&self) -> Position {
        self.start
    }

    #[inline]
    pub fn end(&self) -> Position {
        self.end
    }

    #[inline]
    pub fn len(&self) -> Position {
        self.end - self.start
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    #[inline]
    pub fn is_reverse(&self) -> bool {
        self.strand == Strand::Reverse
    }

    pub fn to_opposite_strand(&self) -> Self {
        let length = self.contig.length();
        let strand = if self.is_reverse() { Strand::Forward } else { Strand::Reverse };
        Self { contig: self.contig.clone(), strand, start: length - self.end, end: length - self.start }
    }

    pub fn to_strand(&self, strand: Strand) -> Self {
        let reverse = strand == Strand::Reverse;
        if reverse == self.is_reverse() {
            self.clone()
        } else {
            self.to_opposite_strand()
        }
    }

    /// Coordinates of the region on the requested strand.
    pub fn range_on(&self, strand: Strand) -> Range<Position> {
        let reverse = strand == Strand::Reverse;
        if reverse == self.is_reverse() {
            self.start..self.end
        } else {
            let length = self.contig.length();
            length - self.end..length - self.start
        }
    }

    pub fn overlaps(&self, other: &GenomicRegion) -> bool {
        self.contig.name() == other.contig.name() && overlaps(&self.range(), &other.range_on(self.strand))
    }

    pub fn contains(&self, other: &GenomicRegion) -> bool {
        self.contig.name() == other.contig.name() && contains(&self.range(), &other.range_on(self.strand))
    }

    /// Extend the region by `padding` on both sides, clipping at contig boundaries.
    pub fn pad(&self, padding: Position) -> Self {
        Self {
            contig: self.contig.clone(),
            strand: self.strand,
            start: self.start.saturating_sub(padding),
            end: (self.end + padding).min(self.contig.length()),
        }
    }

    /// Smallest region (on self's strand) covering both regions.
    pub fn union(&self, other: &GenomicRegion) -> Self {
        let other = other.range_on(self.strand);
        Self {
            contig: self.contig.clone(),
            strand: self.strand,
            start: self.start.min(other.start),
            end: self.end.max(other.end),
        }
    }
}

impl AbstractInterval for GenomicRegion {
    fn contig(&self) -> &str {
        self.contig.name()
    }

    fn range(&self) -> Range<Position> {
        self.start..self.end
    }
}

impl Display for GenomicRegion {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let strand = if self.is_reverse() { '-' } else { '+' };
        write!(f, "{}:{}-{}({})", self.contig.name(), self.start + 1, self.end, strand)
    }
}
