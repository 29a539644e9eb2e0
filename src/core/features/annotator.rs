use std::sync::Arc;

use crate::core::genome::{StrandedSequence, Variant};
use crate::core::kmer::KmerTable;
use crate::core::locator::{Location, SplicingLocator};
use crate::core::pwm::SplicingPwms;
use crate::core::transcript::Transcript;

use super::*;

/// Locates a variant on a transcript and runs the feature calculators.
pub struct SplicingAnnotator {
    locator: SplicingLocator,
    calculators: Vec<Box<dyn FeatureCalculator>>,
}

impl SplicingAnnotator {
    pub fn new(locator: SplicingLocator, calculators: Vec<Box<dyn FeatureCalculator>>) -> Self {
        Self { locator, calculators }
    }

    /// Annotator with a calculator for every known feature.
    pub fn standard(
        locator: SplicingLocator,
        pwms: Arc<SplicingPwms>,
        hexamers: Arc<KmerTable>,
        septamers: Arc<KmerTable>,
        conservation: Arc<dyn ConservationTrack>,
    ) -> Self {
        let parameters = *pwms.parameters();
        let calculators: Vec<Box<dyn FeatureCalculator>> = vec![
            Box::new(CanonicalDonor::new(pwms.clone())),
            Box::new(CrypticDonor::new(pwms.clone())),
            Box::new(CanonicalAcceptor::new(pwms.clone())),
            Box::new(CrypticAcceptor::new(pwms)),
            Box::new(KmerDifferential::hexamer(hexamers)),
            Box::new(KmerDifferential::septamer(septamers)),
            Box::new(Conservation::new(conservation)),
            Box::new(DonorOffset),
            Box::new(AcceptorOffset),
            Box::new(ExonLength),
            Box::new(IntronLength),
            Box::new(CreatesAgInAgez),
            Box::new(PptIsTruncated::new(parameters)),
            Box::new(YagAtAcceptorMinusThree),
        ];
        Self::new(locator, calculators)
    }

    #[inline]
    pub fn locator(&self) -> &SplicingLocator {
        &self.locator
    }

    /// Features provided by the annotator.
    pub fn features(&self) -> FeatureSet {
        self.calculators.iter().map(|x| x.feature()).collect()
    }

    /// Variant and sequence must be oriented to the transcript strand. Calculators that don't apply
    /// at the variant location report their neutral value, locations without any applicable
    /// calculator produce an empty vector.
    pub fn annotate(
        &self,
        variant: &Variant,
        transcript: &Transcript,
        sequence: &StrandedSequence,
    ) -> (Location, FeatureVector) {
        let location = self.locator.locate(variant, transcript);
        let selected = self.locator.select(location, variant, transcript);

        let mut features = FeatureVector::default();
        if selected.is_empty() {
            return (location, features);
        }

        let ctx = SplicingContext { variant, transcript, location, sequence };
        for calculator in &self.calculators {
            let value = if selected.contains(calculator.feature()) { calculator.score(&ctx) } else { calculator.neutral() };
            features.set(calculator.feature(), value);
        }
        (location, features)
    }
}
