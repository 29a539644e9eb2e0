use std::ops::Range;

use bio_types::genome::Position;
use derive_more::Constructor;

use crate::core::error::{Result, SquirlsError};
use crate::core::genome::GenomicRegion;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Constructor)]
pub struct Exon {
    pub start: Position,
    pub end: Position,
}

impl Exon {
    #[inline]
    pub fn range(&self) -> Range<Position> {
        self.start..self.end
    }

    #[inline]
    pub fn len(&self) -> Position {
        self.end - self.start
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }
}

/// Intron with the information content of its canonical donor and acceptor sites.
#[derive(Clone, Copy, Debug, PartialEq, Constructor)]
pub struct Intron {
    pub start: Position,
    pub end: Position,
    pub donor_score: f64,
    pub acceptor_score: f64,
}

impl Intron {
    #[inline]
    pub fn range(&self) -> Range<Position> {
        self.start..self.end
    }

    #[inline]
    pub fn len(&self) -> Position {
        self.end - self.start
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }
}

/// Transcript model. Exons and introns are ordered 5' -> 3' and expressed on the transcript strand,
/// the donor site of intron `i` is at `introns[i].start` and the acceptor at `introns[i].end`.
#[derive(Clone, Debug, PartialEq)]
pub struct Transcript {
    accession: String,
    region: GenomicRegion,
    exons: Vec<Exon>,
    introns: Vec<Intron>,
}

impl Transcript {
    pub fn new(accession: String, region: GenomicRegion, exons: Vec<Exon>, introns: Vec<Intron>) -> Result<Self> {
        let invalid = |reason: String| SquirlsError::InvalidTranscript { accession: accession.clone(), reason };

        if exons.is_empty() {
            return Err(invalid("transcript must have at least one exon".into()));
        }
        if introns.len() + 1 != exons.len() {
            return Err(invalid(format!("{} exons can't be separated by {} introns", exons.len(), introns.len())));
        }
        if exons[0].start != region.start() || exons[exons.len() - 1].end != region.end() {
            return Err(invalid(format!("exons don't span the transcript region {}", region)));
        }
        for exon in &exons {
            if exon.is_empty() || exon.start > exon.end {
                return Err(invalid(format!("empty exon {:?}", exon.range())));
            }
        }
        for (ind, intron) in introns.iter().enumerate() {
            if intron.start != exons[ind].end || intron.end != exons[ind + 1].start || intron.start >= intron.end {
                return Err(invalid(format!(
                    "intron {:?} doesn't separate exons {:?} and {:?}",
                    intron.range(),
                    exons[ind].range(),
                    exons[ind + 1].range()
                )));
            }
        }
        Ok(Self { accession, region, exons, introns })
    }

    /// Build a transcript from its exons, `score` maps an intron range to its (donor, acceptor) scores.
    pub fn from_exons(
        accession: String,
        region: GenomicRegion,
        exons: Vec<Exon>,
        mut score: impl FnMut(Range<Position>) -> (f64, f64),
    ) -> Result<Self> {
        let introns = exons
            .windows(2)
            .map(|pair| {
                let range = pair[0].end..pair[1].start;
                let (donor, acceptor) = score(range.clone());
                Intron::new(range.start, range.end, donor, acceptor)
            })
            .collect();
        Self::new(accession, region, exons, introns)
    }

    #[inline]
    pub fn accession(&self) -> &str {
        &self.accession
    }

    #[inline]
    pub fn region(&self) -> &GenomicRegion {
        &self.region
    }

    #[inline]
    pub fn exons(&self) -> &[Exon] {
        &self.exons
    }

    #[inline]
    pub fn introns(&self) -> &[Intron] {
        &self.introns
    }

    #[inline]
    pub fn is_single_exon(&self) -> bool {
        self.exons.len() == 1
    }
}
