use std::ops::RangeInclusive;
use std::sync::Arc;

use crate::core::pwm::{PositionWeightMatrix, SplicingPwms};

use super::alleles;
use super::{Feature, FeatureCalculator, SplicingContext};

/// Offsets of the windows wholly containing an alternate allele of `altlen` bases in a snippet
/// padded with `width - 1` reference bases. Alleles longer than the window are scanned from the
/// inside. Deletions keep every window spanning the junction.
fn alt_offsets(altlen: usize, width: usize) -> RangeInclusive<usize> {
    if altlen == 0 {
        return 0..=width.saturating_sub(2);
    }
    let (first, last) = (altlen - 1, width - 1);
    first.min(last)..=first.max(last)
}

// Best alt window among those containing the alternate allele
fn best_alt_window(pwm: &PositionWeightMatrix, ctx: &SplicingContext) -> f64 {
    let width = pwm.len();
    let snippet = match alleles::alt_snippet(ctx.sequence, ctx.variant, (width - 1) as u64) {
        Some(snippet) => snippet,
        None => return f64::NAN,
    };
    let offsets = alt_offsets(ctx.variant.alternate().len(), width);
    match snippet.get(*offsets.start()..*offsets.end() + width) {
        Some(windows) => pwm.best_window(windows).map_or(f64::NAN, |(_, score)| score),
        None => f64::NAN,
    }
}

/// Strength of the best donor-like window created by the alternate allele relative to the
/// canonical donor of the nearest intron.
#[derive(Clone, Debug)]
pub struct CrypticDonor {
    pwms: Arc<SplicingPwms>,
}

impl CrypticDonor {
    pub fn new(pwms: Arc<SplicingPwms>) -> Self {
        Self { pwms }
    }
}

impl FeatureCalculator for CrypticDonor {
    fn feature(&self) -> Feature {
        Feature::CrypticDonor
    }

    fn neutral(&self) -> f64 {
        f64::NAN
    }

    fn score(&self, ctx: &SplicingContext) -> f64 {
        match ctx.donor_intron() {
            Some(ind) => best_alt_window(self.pwms.donor(), ctx) - ctx.transcript.introns()[ind].donor_score,
            None => self.neutral(),
        }
    }
}

/// Acceptor counterpart of [`CrypticDonor`].
#[derive(Clone, Debug)]
pub struct CrypticAcceptor {
    pwms: Arc<SplicingPwms>,
}

impl CrypticAcceptor {
    pub fn new(pwms: Arc<SplicingPwms>) -> Self {
        Self { pwms }
    }
}

impl FeatureCalculator for CrypticAcceptor {
    fn feature(&self) -> Feature {
        Feature::CrypticAcceptor
    }

    fn neutral(&self) -> f64 {
        f64::NAN
    }

    fn score(&self, ctx: &SplicingContext) -> f64 {
        match ctx.acceptor_intron() {
            Some(ind) => best_alt_window(self.pwms.acceptor(), ctx) - ctx.transcript.introns()[ind].acceptor_score,
            None => self.neutral(),
        }
    }
}

#[cfg(test)]
mod tests {
    use bio_types::strand::Strand;

    use crate::core::locator::Location;
    use crate::core::pwm::tests::pwms;
    use crate::core::transcript::tests::multi_exon;

    use super::super::tests::{insertion, sequence, snv};
    use super::*;

    #[test]
    fn donor() {
        let (tx, seq) = (multi_exon(Strand::Forward), sequence());
        let pwms = Arc::new(pwms());
        let calculator = CrypticDonor::new(pwms.clone());

        // Insertion of a perfect donor inside the first exon
        let variant = insertion(1100, b"CAGGTAAGT");
        let ctx = SplicingContext { variant: &variant, transcript: &tx, location: Location::Exon { exon: 0 }, sequence: &seq };
        let expected = pwms.donor().max_score() - tx.introns()[0].donor_score;
        assert!((calculator.score(&ctx) - expected).abs() < 1e-12);

        // The last exon has no downstream donor
        let ctx = SplicingContext { location: Location::Exon { exon: 2 }, ..ctx };
        assert!(calculator.score(&ctx).is_nan());

        // Acceptor locations are not scored for cryptic donors
        let ctx = SplicingContext { location: Location::Acceptor { intron: 0 }, ..ctx };
        assert!(calculator.score(&ctx).is_nan());
    }

    #[test]
    fn window_offsets() {
        // SNVs and short insertions: every window holding the whole allele
        assert_eq!(alt_offsets(1, 9), 0..=8);
        assert_eq!(alt_offsets(4, 9), 3..=8);
        assert_eq!(alt_offsets(9, 9), 8..=8);
        // long insertions: windows inside the allele
        assert_eq!(alt_offsets(12, 9), 8..=11);
        // deletions: every window spanning the junction
        assert_eq!(alt_offsets(0, 9), 0..=7);
    }

    #[test]
    fn partial_overlap() {
        let (tx, seq) = (multi_exon(Strand::Forward), sequence());
        let pwms = Arc::new(pwms());
        let calculator = CrypticDonor::new(pwms.clone());

        // CAGG|TTTTCAGG|TAAGT: CAGGTAAGT holds only half of the inserted bases and can't be used
        let variant = insertion(1201, b"TTTTCAGG");
        let ctx =
            SplicingContext { variant: &variant, transcript: &tx, location: Location::Donor { intron: 0 }, sequence: &seq };
        let donor = pwms.donor();
        let expected = donor.score(b"GTTTTCAGG").max(donor.score(b"TTTTCAGGT")) - tx.introns()[0].donor_score;
        let score = calculator.score(&ctx);
        assert!((score - expected).abs() < 1e-9, "{} != {}", score, expected);
        assert!(score < donor.max_score() - tx.introns()[0].donor_score);
    }

    #[test]
    fn acceptor() {
        let (tx, seq) = (multi_exon(Strand::Forward), sequence());
        let pwms = Arc::new(pwms());
        let calculator = CrypticAcceptor::new(pwms.clone());

        let variant = snv(1500, b"T");
        let ctx = SplicingContext { variant: &variant, transcript: &tx, location: Location::Exon { exon: 1 }, sequence: &seq };
        assert!(calculator.score(&ctx).is_finite());

        // The first exon has no upstream acceptor
        let ctx = SplicingContext { location: Location::Exon { exon: 0 }, ..ctx };
        assert!(calculator.score(&ctx).is_nan());
    }

    #[test]
    fn missing_sequence() {
        let (tx, seq) = (multi_exon(Strand::Forward), sequence());
        let calculator = CrypticAcceptor::new(Arc::new(pwms()));
        // the padded snippet would start before the fetched sequence
        let variant = snv(910, b"T");
        let ctx = SplicingContext { variant: &variant, transcript: &tx, location: Location::Intron { intron: 0 }, sequence: &seq };
        assert!(calculator.score(&ctx).is_nan());
    }
}
