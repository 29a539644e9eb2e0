use std::sync::Arc;

use crate::core::kmer::KmerTable;

use super::alleles;
use super::{Feature, FeatureCalculator, SplicingContext};

/// Difference of the k-mer scores summed over the reference and the alternate snippets.
#[derive(Clone, Debug)]
pub struct KmerDifferential {
    feature: Feature,
    table: Arc<KmerTable>,
}

impl KmerDifferential {
    pub fn hexamer(table: Arc<KmerTable>) -> Self {
        Self { feature: Feature::Hexamer, table }
    }

    pub fn septamer(table: Arc<KmerTable>) -> Self {
        Self { feature: Feature::Septamer, table }
    }
}

impl FeatureCalculator for KmerDifferential {
    fn feature(&self) -> Feature {
        self.feature
    }

    fn score(&self, ctx: &SplicingContext) -> f64 {
        let padding = (self.table.k() - 1) as u64;
        let reference = alleles::ref_snippet(ctx.sequence, ctx.variant, padding);
        let alternate = alleles::alt_snippet(ctx.sequence, ctx.variant, padding);
        match (reference, alternate) {
            (Some(reference), Some(alternate)) => self.table.sum(&reference) - self.table.sum(&alternate),
            _ => f64::NAN,
        }
    }
}
