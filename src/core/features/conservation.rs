use std::sync::Arc;

use bio_types::genome::Position;
use bio_types::strand::Strand;
#[cfg(test)]
use mockall::automock;

use super::{Feature, FeatureCalculator, SplicingContext};

/// Per-base conservation scores in forward genomic coordinates.
#[cfg_attr(test, automock)]
pub trait ConservationTrack: Send + Sync {
    fn value(&self, contig: &str, pos: Position) -> Option<f64>;
}

/// Mean conservation over the reference bases of the variant. Insertions use the two flanking bases.
#[derive(Clone)]
pub struct Conservation {
    track: Arc<dyn ConservationTrack>,
}

impl Conservation {
    pub fn new(track: Arc<dyn ConservationTrack>) -> Self {
        Self { track }
    }
}

impl FeatureCalculator for Conservation {
    fn feature(&self) -> Feature {
        Feature::Phylop
    }

    fn score(&self, ctx: &SplicingContext) -> f64 {
        let mut range = ctx.variant.region().range_on(Strand::Forward);
        if range.is_empty() {
            range = range.start.saturating_sub(1)..range.start + 1;
        }
        let contig = ctx.variant.contig();

        let mut total = 0.0;
        for pos in range.clone() {
            match self.track.value(contig, pos) {
                Some(x) => total += x,
                None => return f64::NAN,
            }
        }
        total / (range.end - range.start) as f64
    }
}
