use derive_getters::Getters;
use derive_more::Constructor;

use crate::core::classifier::Prediction;
use crate::core::features::FeatureVector;
use crate::core::genome::Variant;
use crate::core::locator::Location;

/// Prediction of the variant effect on a single transcript.
#[derive(Clone, Debug, PartialEq, Constructor, Getters)]
pub struct TranscriptPrediction {
    accession: String,
    location: Location,
    features: FeatureVector,
    prediction: Prediction,
}

impl TranscriptPrediction {
    #[inline]
    pub fn max_pathogenicity(&self) -> f64 {
        self.prediction.max_pathogenicity()
    }
}

/// Variant level verdict aggregated over transcripts. Only non-empty predictions are kept.
#[derive(Clone, Debug, PartialEq)]
pub struct SquirlsResult {
    variant: Variant,
    transcripts: Vec<TranscriptPrediction>,
}

impl SquirlsResult {
    pub fn new(variant: Variant) -> Self {
        Self { variant, transcripts: Vec::new() }
    }

    /// Returns false if the prediction is empty and was dropped.
    pub fn add(&mut self, prediction: TranscriptPrediction) -> bool {
        if prediction.prediction().is_empty() {
            return false;
        }
        self.transcripts.push(prediction);
        true
    }

    #[inline]
    pub fn variant(&self) -> &Variant {
        &self.variant
    }

    #[inline]
    pub fn transcripts(&self) -> &[TranscriptPrediction] {
        &self.transcripts
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.transcripts.is_empty()
    }

    /// NaN if no transcript was scored.
    pub fn max_pathogenicity(&self) -> f64 {
        self.max_transcript().map_or(f64::NAN, TranscriptPrediction::max_pathogenicity)
    }

    pub fn is_pathogenic(&self) -> bool {
        self.transcripts.iter().any(|x| x.prediction().is_positive())
    }

    /// Transcript with the highest pathogenicity, the first one wins ties.
    pub fn max_transcript(&self) -> Option<&TranscriptPrediction> {
        let mut best: Option<&TranscriptPrediction> = None;
        for tx in &self.transcripts {
            match best {
                Some(current) if !(tx.max_pathogenicity() > current.max_pathogenicity()) => {}
                _ => best = Some(tx),
            }
        }
        best
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use crate::core::classifier::PartialPrediction;
    use crate::core::genome::Contig;

    use super::*;

    fn prediction(accession: &str, probabilities: &[f64]) -> TranscriptPrediction {
        let partials = probabilities.iter().map(|x| PartialPrediction::new("donor".into(), *x, 0.5)).collect();
        TranscriptPrediction::new(
            accession.into(),
            Location::Exon { exon: 0 },
            FeatureVector::default(),
            Prediction::new(partials),
        )
    }

    fn variant() -> Variant {
        Variant::from_vcf(Arc::new(Contig::new("chr1".into(), 1_000)), 10, "A", "C").unwrap()
    }

    #[test]
    fn empty() {
        let mut result = SquirlsResult::new(variant());
        assert!(result.is_empty());
        assert!(result.max_pathogenicity().is_nan());
        assert!(!result.is_pathogenic());

        assert!(!result.add(prediction("TX1", &[])));
        assert!(result.is_empty());
    }

    #[test]
    fn aggregate() {
        let mut result = SquirlsResult::new(variant());
        assert!(result.add(prediction("TX1", &[0.1, 0.3])));
        assert!(result.add(prediction("TX2", &[0.7, 0.2])));
        assert!(result.add(prediction("TX3", &[0.7])));

        assert_eq!(result.max_pathogenicity(), 0.7);
        assert!(result.is_pathogenic());
        assert_eq!(result.max_transcript().unwrap().accession(), "TX2");
        assert_eq!(result.transcripts().len(), 3);
    }
}
