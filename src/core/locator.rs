use derive_more::Constructor;

use crate::core::features::{Feature, FeatureSet};
use crate::core::genome::{contains, overlaps, Variant};
use crate::core::params::SplicingParameters;
use crate::core::transcript::Transcript;

/// Position of a variant relative to the exon/intron structure of a transcript.
/// Indices are 0-based and ordered 5' -> 3' on the transcript strand.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Location {
    Outside,
    Exon { exon: usize },
    Intron { intron: usize },
    Donor { intron: usize },
    Acceptor { intron: usize },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Constructor)]
pub struct LocatorConfig {
    /// Intronic variants further away from the closest splice site are not scored.
    pub max_intron_depth: u64,
}

impl Default for LocatorConfig {
    fn default() -> Self {
        Self { max_intron_depth: 500 }
    }
}

const COMMON: [Feature; 5] =
    [Feature::Phylop, Feature::DonorOffset, Feature::AcceptorOffset, Feature::ExonLength, Feature::IntronLength];

#[derive(Clone, Copy, Debug, PartialEq, Eq, Constructor)]
pub struct SplicingLocator {
    parameters: SplicingParameters,
    config: LocatorConfig,
}

impl SplicingLocator {
    #[inline]
    pub fn parameters(&self) -> &SplicingParameters {
        &self.parameters
    }

    #[inline]
    pub fn config(&self) -> &LocatorConfig {
        &self.config
    }

    /// `variant` must be oriented to the transcript strand. Splice site windows take precedence
    /// over exon/intron containment, donors are checked before acceptors.
    pub fn locate(&self, variant: &Variant, transcript: &Transcript) -> Location {
        let range = variant.range();
        if variant.contig() != transcript.region().contig().name()
            || !overlaps(&(transcript.region().start()..transcript.region().end()), &range)
        {
            return Location::Outside;
        }

        for (ind, intron) in transcript.introns().iter().enumerate() {
            if overlaps(&self.parameters.donor_window(intron.start), &range) {
                return Location::Donor { intron: ind };
            }
            if overlaps(&self.parameters.acceptor_window(intron.end), &range) {
                return Location::Acceptor { intron: ind };
            }
        }
        if let Some(ind) = transcript.introns().iter().position(|x| contains(&x.range(), &range)) {
            return Location::Intron { intron: ind };
        }
        if let Some(ind) = transcript.exons().iter().position(|x| contains(&x.range(), &range)) {
            return Location::Exon { exon: ind };
        }
        Location::Outside
    }

    /// Features that are informative for the variant at the given location.
    pub fn select(&self, location: Location, variant: &Variant, transcript: &Transcript) -> FeatureSet {
        let common = FeatureSet::empty().with(&COMMON);
        match location {
            Location::Outside => FeatureSet::empty(),
            Location::Donor { .. } => common.with(&[
                Feature::CanonicalDonor,
                Feature::CrypticDonor,
                Feature::Hexamer,
                Feature::Septamer,
            ]),
            Location::Acceptor { .. } => common.with(&[
                Feature::CanonicalAcceptor,
                Feature::CrypticAcceptor,
                Feature::PptIsTruncated,
                Feature::YagAtAcceptorMinusThree,
                Feature::CreatesAgInAgez,
                Feature::Hexamer,
                Feature::Septamer,
            ]),
            Location::Exon { exon } => {
                let mut selected = common.with(&[Feature::Hexamer, Feature::Septamer]);
                if exon + 1 < transcript.exons().len() {
                    selected.insert(Feature::CrypticDonor);
                }
                if exon > 0 {
                    selected.insert(Feature::CrypticAcceptor);
                }
                selected
            }
            Location::Intron { intron } => {
                let intron = &transcript.introns()[intron];
                let depth = variant.start().saturating_sub(intron.start).min(intron.end.saturating_sub(variant.end()));
                if depth > self.config.max_intron_depth {
                    FeatureSet::empty()
                } else {
                    common.with(&[Feature::CrypticDonor, Feature::CrypticAcceptor, Feature::CreatesAgInAgez])
                }
            }
        }
    }
}
