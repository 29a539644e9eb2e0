use crate::core::dna::{self, Nucleotide};
use crate::core::genome::overlaps;
use crate::core::locator::Location;
use crate::core::params::SplicingParameters;

use super::alleles;
use super::{Feature, FeatureCalculator, SplicingContext};

// AG exclusion zone relative to the acceptor boundary
const AGEZ_BEGIN: u64 = 51;
const AGEZ_END: u64 = 12;

// Signed distance from the variant start to the closest of `boundaries`
fn closest(ctx: &SplicingContext, boundaries: impl Iterator<Item = u64>) -> f64 {
    let start = ctx.variant.start() as i64;
    boundaries.map(|x| start - x as i64).min_by_key(|x| x.abs()).map_or(0.0, |x| x as f64)
}

#[derive(Clone, Copy, Debug, Default)]
pub struct DonorOffset;

impl FeatureCalculator for DonorOffset {
    fn feature(&self) -> Feature {
        Feature::DonorOffset
    }

    fn score(&self, ctx: &SplicingContext) -> f64 {
        closest(ctx, ctx.transcript.introns().iter().map(|x| x.start))
    }
}

#[derive(Clone, Copy, Debug, Default)]
pub struct AcceptorOffset;

impl FeatureCalculator for AcceptorOffset {
    fn feature(&self) -> Feature {
        Feature::AcceptorOffset
    }

    fn score(&self, ctx: &SplicingContext) -> f64 {
        closest(ctx, ctx.transcript.introns().iter().map(|x| x.end))
    }
}

/// Length of the exon affected by the variant: the exon itself or the one adjacent to the splice site.
#[derive(Clone, Copy, Debug, Default)]
pub struct ExonLength;

impl FeatureCalculator for ExonLength {
    fn feature(&self) -> Feature {
        Feature::ExonLength
    }

    fn score(&self, ctx: &SplicingContext) -> f64 {
        let exon = match ctx.location {
            Location::Exon { exon } | Location::Donor { intron: exon } => exon,
            Location::Acceptor { intron } => intron + 1,
            Location::Intron { .. } | Location::Outside => return 0.0,
        };
        ctx.transcript.exons()[exon].len() as f64
    }
}

#[derive(Clone, Copy, Debug, Default)]
pub struct IntronLength;

impl FeatureCalculator for IntronLength {
    fn feature(&self) -> Feature {
        Feature::IntronLength
    }

    fn score(&self, ctx: &SplicingContext) -> f64 {
        match ctx.location {
            Location::Intron { intron } | Location::Donor { intron } | Location::Acceptor { intron } => {
                ctx.transcript.introns()[intron].len() as f64
            }
            Location::Exon { .. } | Location::Outside => 0.0,
        }
    }
}

fn count_ag(seq: &[u8]) -> usize {
    seq.windows(2).filter(|x| *x == b"AG").count()
}

/// 1 if the alternate allele creates a new AG dinucleotide inside the AG exclusion zone of the intron.
#[derive(Clone, Copy, Debug, Default)]
pub struct CreatesAgInAgez;

impl FeatureCalculator for CreatesAgInAgez {
    fn feature(&self) -> Feature {
        Feature::CreatesAgInAgez
    }

    fn score(&self, ctx: &SplicingContext) -> f64 {
        let intron = match ctx.location {
            Location::Intron { intron } | Location::Acceptor { intron } => &ctx.transcript.introns()[intron],
            _ => return 0.0,
        };
        let zone = intron.end.saturating_sub(AGEZ_BEGIN).max(intron.start)..intron.end.saturating_sub(AGEZ_END);
        if zone.start >= zone.end || !overlaps(&zone, &ctx.variant.range()) {
            return 0.0;
        }

        let reference = alleles::ref_snippet(ctx.sequence, ctx.variant, 1);
        let alternate = alleles::alt_snippet(ctx.sequence, ctx.variant, 1);
        match (reference, alternate) {
            (Some(reference), Some(alternate)) => (count_ag(&alternate) > count_ag(&reference)) as u8 as f64,
            _ => f64::NAN,
        }
    }
}

/// 1 if a deletion removes pyrimidines from the polypyrimidine tract (acceptor window intronic part
/// without the trailing YAG).
#[derive(Clone, Copy, Debug)]
pub struct PptIsTruncated {
    parameters: SplicingParameters,
}

impl PptIsTruncated {
    pub fn new(parameters: SplicingParameters) -> Self {
        Self { parameters }
    }
}

impl FeatureCalculator for PptIsTruncated {
    fn feature(&self) -> Feature {
        Feature::PptIsTruncated
    }

    fn score(&self, ctx: &SplicingContext) -> f64 {
        let intron = match ctx.location {
            Location::Intron { intron } | Location::Acceptor { intron } => &ctx.transcript.introns()[intron],
            _ => return 0.0,
        };
        let variant = ctx.variant;
        if variant.length_change() >= 0 {
            return 0.0;
        }
        let ppt = intron.end.saturating_sub(self.parameters.acceptor_intronic()).max(intron.start)
            ..intron.end.saturating_sub(3);
        if ppt.start >= ppt.end || !overlaps(&ppt, &variant.range()) {
            return 0.0;
        }
        let lost = dna::count_pyrimidines(variant.reference()) > dna::count_pyrimidines(variant.alternate());
        lost as u8 as f64
    }
}

/// 1 if the pyrimidine at the acceptor -3 position (Y of the YAG) is replaced by a purine.
#[derive(Clone, Copy, Debug, Default)]
pub struct YagAtAcceptorMinusThree;

impl FeatureCalculator for YagAtAcceptorMinusThree {
    fn feature(&self) -> Feature {
        Feature::YagAtAcceptorMinusThree
    }

    fn score(&self, ctx: &SplicingContext) -> f64 {
        let intron = match ctx.location {
            Location::Intron { intron } | Location::Acceptor { intron } => &ctx.transcript.introns()[intron],
            _ => return 0.0,
        };
        let variant = ctx.variant;
        let pos = match intron.end.checked_sub(3) {
            Some(pos) if variant.length_change() == 0 && variant.range().contains(&pos) => pos,
            _ => return 0.0,
        };
        let offset = (pos - variant.start()) as usize;
        let (reference, alternate) =
            (Nucleotide::from(variant.reference()[offset]), Nucleotide::from(variant.alternate()[offset]));
        (reference.is_pyrimidine() && alternate.is_purine()) as u8 as f64
    }
}
