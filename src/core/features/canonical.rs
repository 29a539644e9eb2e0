use std::sync::Arc;

use crate::core::locator::Location;
use crate::core::pwm::SplicingPwms;

use super::alleles;
use super::{Feature, FeatureCalculator, SplicingContext};

/// Loss of the canonical donor site information content: ref window score - alt window score.
#[derive(Clone, Debug)]
pub struct CanonicalDonor {
    pwms: Arc<SplicingPwms>,
}

impl CanonicalDonor {
    pub fn new(pwms: Arc<SplicingPwms>) -> Self {
        Self { pwms }
    }
}

impl FeatureCalculator for CanonicalDonor {
    fn feature(&self) -> Feature {
        Feature::CanonicalDonor
    }

    fn score(&self, ctx: &SplicingContext) -> f64 {
        let intron = match ctx.location {
            Location::Donor { intron } => &ctx.transcript.introns()[intron],
            _ => return self.neutral(),
        };
        let params = self.pwms.parameters();
        let anchor = intron.start;

        let reference = ctx.sequence.subsequence(params.donor_window(anchor));
        let alternate =
            alleles::alt_window(ctx.sequence, ctx.variant, anchor, params.donor_exonic(), params.donor_intronic());
        match (reference, alternate) {
            (Some(reference), Some(alternate)) => {
                let pwm = self.pwms.donor();
                pwm.score(reference) - pwm.score(&alternate)
            }
            _ => f64::NAN,
        }
    }
}

/// Loss of the canonical acceptor site information content: ref window score - alt window score.
#[derive(Clone, Debug)]
pub struct CanonicalAcceptor {
    pwms: Arc<SplicingPwms>,
}

impl CanonicalAcceptor {
    pub fn new(pwms: Arc<SplicingPwms>) -> Self {
        Self { pwms }
    }
}

impl FeatureCalculator for CanonicalAcceptor {
    fn feature(&self) -> Feature {
        Feature::CanonicalAcceptor
    }

    fn score(&self, ctx: &SplicingContext) -> f64 {
        let intron = match ctx.location {
            Location::Acceptor { intron } => &ctx.transcript.introns()[intron],
            _ => return self.neutral(),
        };
        let params = self.pwms.parameters();
        let anchor = intron.end;

        let reference = ctx.sequence.subsequence(params.acceptor_window(anchor));
        let alternate = alleles::alt_window(
            ctx.sequence,
            ctx.variant,
            anchor,
            params.acceptor_intronic(),
            params.acceptor_exonic(),
        );
        match (reference, alternate) {
            (Some(reference), Some(alternate)) => {
                let pwm = self.pwms.acceptor();
                pwm.score(reference) - pwm.score(&alternate)
            }
            _ => f64::NAN,
        }
    }
}
