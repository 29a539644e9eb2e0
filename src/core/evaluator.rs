use std::sync::Arc;

use bio_types::genome::Position;
use bio_types::strand::Strand;

use crate::core::classifier::SquirlsClassifier;
use crate::core::error::{Result, SquirlsError};
use crate::core::features::SplicingAnnotator;
use crate::core::genome::{GenomicRegion, StrandedSequence, Variant};
use crate::core::io::{SequenceSource, TranscriptSource};
use crate::core::result::{SquirlsResult, TranscriptPrediction};
use crate::core::transcript::Transcript;

/// Reference bases fetched around the transcripts in addition to their own span.
pub const PADDING: Position = 100;

/// Reference window available on both strands.
#[derive(Clone, Debug)]
pub struct OrientedReference {
    forward: StrandedSequence,
    reverse: StrandedSequence,
}

impl OrientedReference {
    pub fn new(sequence: StrandedSequence) -> Self {
        let forward = sequence.to_strand(Strand::Forward);
        let reverse = forward.to_opposite_strand();
        Self { forward, reverse }
    }

    #[inline]
    pub fn on(&self, strand: Strand) -> &StrandedSequence {
        match strand {
            Strand::Reverse => &self.reverse,
            Strand::Forward | Strand::Unknown => &self.forward,
        }
    }

    #[inline]
    pub fn region(&self) -> &GenomicRegion {
        self.forward.region()
    }
}

/// Scores variants against transcripts: locate, annotate, classify, aggregate.
pub struct VariantSplicingEvaluator {
    annotator: SplicingAnnotator,
    classifier: SquirlsClassifier,
}

impl VariantSplicingEvaluator {
    /// Fails if the annotator can't provide every feature the classifier needs.
    pub fn new(annotator: SplicingAnnotator, classifier: SquirlsClassifier) -> Result<Self> {
        let provided = annotator.features();
        let missing: Vec<&str> =
            classifier.required().iter().filter(|x| !provided.contains(*x)).map(|x| x.name()).collect();
        if !missing.is_empty() {
            return Err(SquirlsError::InvalidModel(format!(
                "classifier requires features without a calculator: {}",
                missing.join(", ")
            )));
        }
        Ok(Self { annotator, classifier })
    }

    #[inline]
    pub fn annotator(&self) -> &SplicingAnnotator {
        &self.annotator
    }

    #[inline]
    pub fn classifier(&self) -> &SquirlsClassifier {
        &self.classifier
    }

    /// Transcripts that can be scored at all: multi-exon and overlapping the variant.
    pub fn is_relevant(variant: &Variant, transcript: &Transcript) -> bool {
        !transcript.is_single_exon() && transcript.region().overlaps(variant.region())
    }

    /// Score the variant with an already fetched reference window. Irrelevant transcripts are skipped
    /// and transcripts without a prediction don't contribute to the result.
    pub fn evaluate_with(
        &self,
        variant: &Variant,
        transcripts: &[Arc<Transcript>],
        reference: &OrientedReference,
    ) -> SquirlsResult {
        let mut result = SquirlsResult::new(variant.clone());
        for tx in transcripts.iter().filter(|tx| Self::is_relevant(variant, tx)) {
            let strand = tx.region().strand();
            let oriented = variant.to_strand(strand);
            let (location, features) = self.annotator.annotate(&oriented, tx, reference.on(strand));

            let prediction = self.classifier.predict(&features);
            result.add(TranscriptPrediction::new(tx.accession().to_string(), location, features, prediction));
        }
        result
    }

    /// Score a single variant, transcripts and the reference window are fetched from the sources.
    pub fn evaluate(
        &self,
        variant: &Variant,
        transcripts: &dyn TranscriptSource,
        sequences: &dyn SequenceSource,
    ) -> Result<SquirlsResult> {
        let transcripts: Vec<Arc<Transcript>> = transcripts
            .overlapping(variant.region())
            .into_iter()
            .filter(|tx| Self::is_relevant(variant, tx))
            .collect();
        if transcripts.is_empty() {
            return Ok(SquirlsResult::new(variant.clone()));
        }

        let window = reference_window(variant.region(), &transcripts, PADDING);
        let reference = OrientedReference::new(sequences.fetch(&window)?);
        Ok(self.evaluate_with(variant, &transcripts, &reference))
    }
}

/// Forward strand window covering the region and all transcripts.
pub fn reference_window(region: &GenomicRegion, transcripts: &[Arc<Transcript>], padding: Position) -> GenomicRegion {
    transcripts
        .iter()
        .fold(region.to_strand(Strand::Forward), |window, tx| window.union(tx.region()))
        .pad(padding)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use crate::core::classifier::tests::classifier;
    use crate::core::features::tests::{annotator, deletion, insertion, sequence, snv};
    use crate::core::features::Feature;
    use crate::core::io::memory::tests::genome;
    use crate::core::io::MockTranscriptSource;
    use crate::core::locator::Location;
    use crate::core::transcript::tests::{multi_exon, single_exon};

    use super::*;

    fn evaluator() -> VariantSplicingEvaluator {
        VariantSplicingEvaluator::new(annotator(), classifier()).unwrap()
    }

    fn transcripts() -> Vec<Arc<Transcript>> {
        vec![Arc::new(multi_exon(Strand::Forward)), Arc::new(single_exon())]
    }

    #[test]
    fn single_exon_is_empty() {
        let reference = OrientedReference::new(sequence());
        let evaluator = evaluator();
        for variant in [snv(1197, b"T"), snv(1500, b"G"), deletion(1198, 1202)] {
            let result = evaluator.evaluate_with(&variant, &[Arc::new(single_exon())], &reference);
            assert!(result.is_empty());
            assert!(result.max_pathogenicity().is_nan());
        }
    }

    #[test]
    fn donor() {
        let reference = OrientedReference::new(sequence());
        let result = evaluator().evaluate_with(&snv(1197, b"T"), &transcripts(), &reference);

        assert_eq!(result.transcripts().len(), 1);
        let tx = &result.transcripts()[0];
        assert_eq!(tx.accession(), "TX1");
        assert_eq!(tx.location(), &Location::Donor { intron: 0 });
        assert!(tx.features().get(Feature::CanonicalDonor).unwrap().is_finite());
        assert_eq!(tx.prediction().partials().len(), 2);
        assert!(!result.max_pathogenicity().is_nan());
    }

    #[test]
    fn outside() {
        let reference = OrientedReference::new(sequence());
        let evaluator = evaluator();
        for variant in [snv(950, b"T"), insertion(1000, b"A")] {
            assert!(evaluator.evaluate_with(&variant, &transcripts(), &reference).is_empty(), "{}", variant);
        }
    }

    #[test]
    fn sources() {
        let mut source = MockTranscriptSource::new();
        source.expect_overlapping().returning(|_| transcripts());
        let (evaluator, genome) = (evaluator(), genome());
        let reference = OrientedReference::new(sequence());

        for variant in [snv(1197, b"T"), snv(1390, b"A"), deletion(1598, 1601), insertion(1800, b"TT")] {
            let expected = evaluator.evaluate_with(&variant, &transcripts(), &reference);
            let result = evaluator.evaluate(&variant, &source, &genome).unwrap();
            assert_eq!(result.transcripts().len(), expected.transcripts().len(), "{}", variant);
            for (first, second) in result.transcripts().iter().zip(expected.transcripts()) {
                assert_eq!(first.location(), second.location());
                assert_eq!(first.prediction(), second.prediction());
            }
        }

        let mut empty = MockTranscriptSource::new();
        empty.expect_overlapping().returning(|_| vec![Arc::new(single_exon())]);
        assert!(evaluator.evaluate(&snv(1197, b"T"), &empty, &genome).unwrap().is_empty());
    }

    #[test]
    fn window() {
        let variant = snv(1197, b"T");
        let window = reference_window(variant.region(), &transcripts(), PADDING);
        assert_eq!((window.start(), window.end()), (900, 2100));

        let window = reference_window(variant.region(), &[], PADDING);
        assert_eq!((window.start(), window.end()), (1097, 1298));
    }
}
