use std::fmt::{Display, Formatter};
use std::str::FromStr;

pub use annotator::SplicingAnnotator;
pub use canonical::{CanonicalAcceptor, CanonicalDonor};
#[cfg(test)]
pub use conservation::MockConservationTrack;
pub use conservation::{Conservation, ConservationTrack};
pub use cryptic::{CrypticAcceptor, CrypticDonor};
pub use motif::KmerDifferential;
pub use structural::{
    AcceptorOffset, CreatesAgInAgez, DonorOffset, ExonLength, IntronLength, PptIsTruncated, YagAtAcceptorMinusThree,
};

use crate::core::error::SquirlsError;
use crate::core::genome::{StrandedSequence, Variant};
use crate::core::locator::Location;
use crate::core::transcript::Transcript;

pub mod alleles;
mod annotator;
mod canonical;
mod conservation;
mod cryptic;
mod motif;
mod structural;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Feature {
    CanonicalDonor,
    CrypticDonor,
    CanonicalAcceptor,
    CrypticAcceptor,
    Hexamer,
    Septamer,
    Phylop,
    DonorOffset,
    AcceptorOffset,
    ExonLength,
    IntronLength,
    CreatesAgInAgez,
    PptIsTruncated,
    YagAtAcceptorMinusThree,
}

impl Feature {
    pub const COUNT: usize = 14;
    pub const ALL: [Feature; Feature::COUNT] = [
        Feature::CanonicalDonor,
        Feature::CrypticDonor,
        Feature::CanonicalAcceptor,
        Feature::CrypticAcceptor,
        Feature::Hexamer,
        Feature::Septamer,
        Feature::Phylop,
        Feature::DonorOffset,
        Feature::AcceptorOffset,
        Feature::ExonLength,
        Feature::IntronLength,
        Feature::CreatesAgInAgez,
        Feature::PptIsTruncated,
        Feature::YagAtAcceptorMinusThree,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Feature::CanonicalDonor => "canonical_donor",
            Feature::CrypticDonor => "cryptic_donor",
            Feature::CanonicalAcceptor => "canonical_acceptor",
            Feature::CrypticAcceptor => "cryptic_acceptor",
            Feature::Hexamer => "hexamer",
            Feature::Septamer => "septamer",
            Feature::Phylop => "phylop",
            Feature::DonorOffset => "donor_offset",
            Feature::AcceptorOffset => "acceptor_offset",
            Feature::ExonLength => "exon_length",
            Feature::IntronLength => "intron_length",
            Feature::CreatesAgInAgez => "creates_ag_in_agez",
            Feature::PptIsTruncated => "ppt_is_truncated",
            Feature::YagAtAcceptorMinusThree => "yag_at_acceptor_minus_three",
        }
    }

    #[inline]
    pub fn index(&self) -> usize {
        *self as usize
    }
}

impl FromStr for Feature {
    type Err = SquirlsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Feature::ALL
            .into_iter()
            .find(|x| x.name() == s)
            .ok_or_else(|| SquirlsError::UnknownFeature(s.to_string()))
    }
}

impl Display for Feature {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Compact set of features.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct FeatureSet(u32);

impl FeatureSet {
    pub fn empty() -> Self {
        Self(0)
    }

    pub fn all() -> Self {
        Feature::ALL.into_iter().collect()
    }

    #[inline]
    pub fn insert(&mut self, feature: Feature) {
        self.0 |= 1 << feature.index();
    }

    #[inline]
    pub fn with(mut self, features: &[Feature]) -> Self {
        for f in features {
            self.insert(*f);
        }
        self
    }

    #[inline]
    pub fn contains(&self, feature: Feature) -> bool {
        self.0 & (1 << feature.index()) != 0
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }

    pub fn len(&self) -> usize {
        self.0.count_ones() as usize
    }

    pub fn iter(&self) -> impl Iterator<Item = Feature> + '_ {
        Feature::ALL.into_iter().filter(move |x| self.contains(*x))
    }
}

impl FromIterator<Feature> for FeatureSet {
    fn from_iter<T: IntoIterator<Item = Feature>>(iter: T) -> Self {
        let mut set = FeatureSet::empty();
        for f in iter {
            set.insert(f);
        }
        set
    }
}

/// Feature values computed for a single variant/transcript pair. Unset features are missing.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct FeatureVector {
    values: [Option<f64>; Feature::COUNT],
}

impl FeatureVector {
    #[inline]
    pub fn get(&self, feature: Feature) -> Option<f64> {
        self.values[feature.index()]
    }

    #[inline]
    pub fn set(&mut self, feature: Feature, value: f64) {
        self.values[feature.index()] = Some(value);
    }

    pub fn contains(&self, feature: Feature) -> bool {
        self.values[feature.index()].is_some()
    }

    pub fn is_empty(&self) -> bool {
        self.values.iter().all(Option::is_none)
    }

    /// Features from `required` that have no value.
    pub fn missing(&self, required: &FeatureSet) -> FeatureSet {
        required.iter().filter(|x| !self.contains(*x)).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = (Feature, f64)> + '_ {
        Feature::ALL.into_iter().filter_map(|x| self.get(x).map(|v| (x, v)))
    }
}

/// Everything a calculator may look at. The variant and the sequence are oriented to the
/// transcript strand.
#[derive(Clone, Copy, Debug)]
pub struct SplicingContext<'a> {
    pub variant: &'a Variant,
    pub transcript: &'a Transcript,
    pub location: Location,
    pub sequence: &'a StrandedSequence,
}

impl<'a> SplicingContext<'a> {
    /// Intron whose donor site the variant may affect.
    pub fn donor_intron(&self) -> Option<usize> {
        let introns = self.transcript.introns().len();
        match self.location {
            Location::Donor { intron } | Location::Intron { intron } => Some(intron),
            Location::Exon { exon } if exon < introns => Some(exon),
            _ => None,
        }
    }

    /// Intron whose acceptor site the variant may affect.
    pub fn acceptor_intron(&self) -> Option<usize> {
        match self.location {
            Location::Acceptor { intron } | Location::Intron { intron } => Some(intron),
            Location::Exon { exon } if exon > 0 => Some(exon - 1),
            _ => None,
        }
    }
}

/// A single biological signal turned into a number.
pub trait FeatureCalculator: Send + Sync {
    fn feature(&self) -> Feature;

    /// Value reported when the calculator doesn't apply at the variant location.
    fn neutral(&self) -> f64 {
        0.0
    }

    fn score(&self, ctx: &SplicingContext) -> f64;
}
