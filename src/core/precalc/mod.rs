use std::cell::RefCell;
use std::cmp::min;
use std::fmt::{Display, Formatter};
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;

use bio_types::genome::{AbstractInterval, Interval, Position};
use bio_types::strand::Strand;
use derive_more::{Add, AddAssign, Constructor};
use indicatif::ProgressBar;
use thread_local::ThreadLocal;

pub use generator::VariantGenerator;

use crate::core::error::{Result, SquirlsError};
use crate::core::evaluator::{reference_window, OrientedReference, VariantSplicingEvaluator, PADDING};
use crate::core::genome::GenomicRegion;
use crate::core::io::{ResultSink, SequenceSource, TranscriptSource};
use crate::core::transcript::Transcript;

mod generator;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Constructor)]
pub struct PrecalcConfig {
    /// Region lists of this size or smaller are processed serially by a single worker.
    pub granularity: usize,
    pub max_variant_length: usize,
    /// Reference bases fetched around the transcripts.
    pub padding: Position,
    /// Regions longer than this are split into bins.
    pub binsize: Position,
    pub include_transcripts: bool,
}

impl Default for PrecalcConfig {
    fn default() -> Self {
        Self { granularity: 1, max_variant_length: 1, padding: PADDING, binsize: 10_000, include_transcripts: false }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Add, AddAssign)]
pub struct PrecalcSummary {
    pub regions: u64,
    pub skipped: u64,
    pub failed: u64,
    pub variants: u64,
    pub written: u64,
}

impl Display for PrecalcSummary {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} regions ({} without transcripts, {} failed), {} variants scored, {} written",
            self.regions, self.skipped, self.failed, self.variants, self.written
        )
    }
}

/// Part of a requested region. Variants start inside `interval`, deletions may extend up to `limit`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Bin {
    pub interval: Interval,
    pub limit: Position,
}

impl From<Interval> for Bin {
    fn from(interval: Interval) -> Self {
        let limit = interval.range().end;
        Self { interval, limit }
    }
}

/// Scores every synthetic variant in a list of regions and streams the non-empty results to the sink.
pub struct Precalculation<'a> {
    evaluator: &'a VariantSplicingEvaluator,
    transcripts: &'a dyn TranscriptSource,
    sequences: &'a dyn SequenceSource,
    sink: &'a dyn ResultSink,
    generator: VariantGenerator,
    config: PrecalcConfig,
}

impl<'a> Precalculation<'a> {
    pub fn new(
        evaluator: &'a VariantSplicingEvaluator,
        transcripts: &'a dyn TranscriptSource,
        sequences: &'a dyn SequenceSource,
        sink: &'a dyn ResultSink,
        config: PrecalcConfig,
    ) -> Result<Self> {
        if config.granularity == 0 || config.binsize == 0 {
            return Err(SquirlsError::InvalidParameters(format!(
                "granularity and bin size must be positive: {:?}",
                config
            )));
        }
        let generator = VariantGenerator::new(config.max_variant_length)?;
        Ok(Self { evaluator, transcripts, sequences, sink, generator, config })
    }

    /// Split regions into bins and group them by contig, keeping the input order otherwise.
    pub fn workload(&self, regions: &[Interval]) -> Vec<Vec<Bin>> {
        let mut groups: Vec<Vec<Bin>> = Vec::new();
        for region in regions {
            let bins = bin(region, self.config.binsize);
            match groups.iter_mut().find(|x| x[0].interval.contig() == region.contig()) {
                Some(group) => group.extend(bins),
                None if !bins.is_empty() => groups.push(bins),
                None => {}
            }
        }
        groups
    }

    /// Contigs are processed one after another, regions within a contig are processed in parallel
    /// on the current rayon pool.
    pub fn run(&self, regions: &[Interval], pbar: &ProgressBar) -> PrecalcSummary {
        let workload = self.workload(regions);
        pbar.set_length(workload.iter().map(|x| x.len() as u64).sum());

        let summaries = ThreadLocal::new();
        for group in &workload {
            let contig = group[0].interval.contig();
            log::debug!("Processing {} bins on {}", group.len(), contig);
            pbar.set_message(contig.to_owned());
            self.process(group, &summaries, pbar);
        }
        if let Err(err) = self.sink.flush() {
            log::error!("Failed to flush the output: {}", err);
        }
        summaries.into_iter().map(RefCell::into_inner).fold(PrecalcSummary::default(), |a, b| a + b)
    }

    fn process(&self, regions: &[Bin], summaries: &ThreadLocal<RefCell<PrecalcSummary>>, pbar: &ProgressBar) {
        if regions.len() <= self.config.granularity {
            for region in regions {
                let summary = self.isolated(region);
                *summaries.get_or_default().borrow_mut() += summary;
                pbar.inc(1);
            }
        } else {
            let (left, right) = regions.split_at(regions.len() / 2);
            rayon::join(|| self.process(left, summaries, pbar), || self.process(right, summaries, pbar));
        }
    }

    // Failures and panics are contained within the region
    fn isolated(&self, bin: &Bin) -> PrecalcSummary {
        let failed = PrecalcSummary { regions: 1, failed: 1, ..Default::default() };
        let region = &bin.interval;
        match catch_unwind(AssertUnwindSafe(|| self.region(bin))) {
            Ok(Ok(summary)) => summary,
            Ok(Err(err)) => {
                log::error!("Failed to process {}:{:?}: {}", region.contig(), region.range(), err);
                failed
            }
            Err(_) => {
                log::error!("Worker panicked while processing {}:{:?}", region.contig(), region.range());
                failed
            }
        }
    }

    /// Score all variants of a single bin. A sink failure stops the bin and marks it as failed,
    /// records written before the failure are still counted.
    pub fn region(&self, bin: &Bin) -> Result<PrecalcSummary> {
        let mut summary = PrecalcSummary { regions: 1, ..Default::default() };

        let interval = &bin.interval;
        let contig = self
            .sequences
            .contig(interval.contig())
            .ok_or_else(|| SquirlsError::Sequence(format!("unknown contig {}", interval.contig())))?;
        let range = interval.range();
        let end = min(range.end, contig.length());
        let limit = min(bin.limit, contig.length()).max(end);
        let region = GenomicRegion::forward(contig.clone(), min(range.start, end), end)?;

        // deletions starting at the last positions of the bin may reach past its end
        let reach = min(end + self.generator.max_length() as Position - 1, limit);
        let reach = GenomicRegion::forward(contig, region.start(), reach)?;

        let transcripts: Vec<Arc<Transcript>> =
            self.transcripts.overlapping(&reach).into_iter().filter(|x| !x.is_single_exon()).collect();
        if transcripts.is_empty() {
            summary.skipped = 1;
            return Ok(summary);
        }

        let window = reference_window(&reach, &transcripts, self.config.padding);
        let reference = OrientedReference::new(self.sequences.fetch(&window)?);
        let variants = self.generator.generate(reference.on(Strand::Forward), region.start()..region.end(), limit);
        for variant in variants {
            summary.variants += 1;
            let result = self.evaluator.evaluate_with(&variant, &transcripts, &reference);
            if result.is_empty() {
                continue;
            }
            if let Err(err) = self.sink.add(&result) {
                log::error!(
                    "Failed to write {} ({} records of {}:{:?} were already written): {}",
                    variant,
                    summary.written,
                    interval.contig(),
                    interval.range(),
                    err
                );
                summary.failed = 1;
                return Ok(summary);
            }
            summary.written += 1;
        }
        Ok(summary)
    }
}

fn bin(region: &Interval, binsize: Position) -> Vec<Bin> {
    let range = region.range();
    let mut bins = Vec::with_capacity((range.end.saturating_sub(range.start) / binsize + 1) as usize);
    let mut start = range.start;
    while start < range.end {
        let end = min(start + binsize, range.end);
        bins.push(Bin { interval: Interval::new(region.contig().to_owned(), start..end), limit: range.end });
        start = end;
    }
    bins
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use itertools::Itertools;
    use rayon::ThreadPoolBuilder;

    use crate::core::classifier::tests::classifier;
    use crate::core::features::tests::annotator;
    use crate::core::io::memory::tests::genome;
    use crate::core::io::{CollectingSink, MockResultSink, MockTranscriptSource};
    use crate::core::transcript::tests::{multi_exon, single_exon};

    use super::*;

    fn evaluator() -> VariantSplicingEvaluator {
        VariantSplicingEvaluator::new(annotator(), classifier()).unwrap()
    }

    fn transcripts() -> MockTranscriptSource {
        let mut source = MockTranscriptSource::new();
        source.expect_overlapping().returning(|region| {
            [multi_exon(Strand::Forward), single_exon()]
                .into_iter()
                .filter(|x| x.region().overlaps(region))
                .map(Arc::new)
                .collect()
        });
        source
    }

    fn interval(start: Position, end: Position) -> Interval {
        Interval::new("chr1".into(), start..end)
    }

    fn names(sink: CollectingSink) -> Vec<String> {
        sink.into_results().iter().map(|x| x.variant().to_string()).collect()
    }

    fn bins(limit: Position, intervals: &[(Position, Position)]) -> Vec<Bin> {
        intervals.iter().map(|(start, end)| Bin { interval: interval(*start, *end), limit }).collect()
    }

    #[test]
    fn binning() {
        assert_eq!(bin(&interval(0, 25), 10), bins(25, &[(0, 10), (10, 20), (20, 25)]));
        assert_eq!(bin(&interval(5, 10), 10), bins(10, &[(5, 10)]));
        assert!(bin(&interval(5, 5), 10).is_empty());
    }

    #[test]
    fn workload() {
        let (evaluator, transcripts, genome, sink) = (evaluator(), transcripts(), genome(), CollectingSink::new());
        let config = PrecalcConfig { binsize: 100, ..Default::default() };
        let precalc = Precalculation::new(&evaluator, &transcripts, &genome, &sink, config).unwrap();

        let regions = [interval(0, 150), Interval::new("chr2".into(), 0..10), interval(500, 510)];
        assert_eq!(
            precalc.workload(&regions),
            vec![
                vec![
                    Bin { interval: interval(0, 100), limit: 150 },
                    Bin { interval: interval(100, 150), limit: 150 },
                    Bin::from(interval(500, 510))
                ],
                vec![Bin::from(Interval::new("chr2".into(), 0..10))]
            ]
        );
    }

    #[test]
    fn serial_order() {
        let (evaluator, transcripts, genome, sink) = (evaluator(), transcripts(), genome(), CollectingSink::new());
        let config = PrecalcConfig { granularity: 2, ..Default::default() };
        let precalc = Precalculation::new(&evaluator, &transcripts, &genome, &sink, config).unwrap();

        let regions = [interval(1195, 1203), interval(1590, 1610)];
        let summary = precalc.run(&regions, &ProgressBar::hidden());
        assert_eq!(summary.regions, 2);
        assert_eq!(summary.failed, 0);
        assert_eq!(summary.variants, 28 * 8);

        let written = names(sink);
        assert_eq!(written.len() as u64, summary.written);
        assert!(!written.is_empty());

        // the second region comes strictly after the first one
        let expected: Vec<String> = regions
            .iter()
            .flat_map(|x| precalc_names(&evaluator, &transcripts, &genome, x))
            .collect();
        assert_eq!(written, expected);
    }

    fn precalc_names(
        evaluator: &VariantSplicingEvaluator,
        transcripts: &MockTranscriptSource,
        genome: &dyn SequenceSource,
        region: &Interval,
    ) -> Vec<String> {
        let sink = CollectingSink::new();
        let precalc = Precalculation::new(evaluator, transcripts, genome, &sink, PrecalcConfig::default()).unwrap();
        precalc.region(&Bin::from(region.clone())).unwrap();
        names(sink)
    }

    #[test]
    fn parallel_union() {
        let (evaluator, transcripts, genome) = (evaluator(), transcripts(), genome());
        let regions = (0..8).map(|x| interval(1190 + x * 5, 1195 + x * 5)).collect_vec();

        let serial = CollectingSink::new();
        let config = PrecalcConfig { granularity: regions.len(), ..Default::default() };
        Precalculation::new(&evaluator, &transcripts, &genome, &serial, config)
            .unwrap()
            .run(&regions, &ProgressBar::hidden());

        let parallel = CollectingSink::new();
        let pool = ThreadPoolBuilder::new().num_threads(4).build().unwrap();
        let summary = pool.install(|| {
            Precalculation::new(&evaluator, &transcripts, &genome, &parallel, PrecalcConfig::default())
                .unwrap()
                .run(&regions, &ProgressBar::hidden())
        });
        assert_eq!(summary.regions, 8);

        let (serial, parallel) = (names(serial), names(parallel));
        assert_eq!(serial.len(), parallel.len());
        assert_eq!(serial.into_iter().collect::<HashSet<_>>(), parallel.into_iter().collect::<HashSet<_>>());
    }

    #[test]
    fn binned_deletions() {
        let (evaluator, transcripts, genome) = (evaluator(), transcripts(), genome());
        let regions = [interval(1190, 1210)];

        let mut outcomes = Vec::new();
        for binsize in [10_000, 5] {
            let sink = CollectingSink::new();
            let config = PrecalcConfig { binsize, max_variant_length: 2, ..Default::default() };
            let summary = Precalculation::new(&evaluator, &transcripts, &genome, &sink, config)
                .unwrap()
                .run(&regions, &ProgressBar::hidden());
            assert_eq!(summary.failed, 0);
            outcomes.push((summary.variants, summary.written, names(sink).into_iter().collect::<HashSet<_>>()));
        }
        let (whole, binned) = (&outcomes[0], &outcomes[1]);
        assert_eq!(whole.0, 20 * VariantGenerator::new(2).unwrap().per_position() as u64);
        assert_eq!(whole, binned);
    }

    #[test]
    fn sink_failure() {
        let (evaluator, transcripts, genome) = (evaluator(), transcripts(), genome());
        let regions = [interval(1190, 1210)];

        let collected = CollectingSink::new();
        Precalculation::new(&evaluator, &transcripts, &genome, &collected, PrecalcConfig::default())
            .unwrap()
            .run(&regions, &ProgressBar::hidden());
        assert!(collected.into_results().len() > 3);

        let mut sink = MockResultSink::new();
        let mut calls = 0;
        sink.expect_add().returning(move |_| {
            calls += 1;
            if calls <= 3 {
                Ok(())
            } else {
                Err(SquirlsError::Sequence("disk is full".into()))
            }
        });
        sink.expect_flush().returning(|| Ok(()));

        let precalc = Precalculation::new(&evaluator, &transcripts, &genome, &sink, PrecalcConfig::default()).unwrap();
        let summary = precalc.run(&regions, &ProgressBar::hidden());
        assert_eq!(summary.regions, 1);
        assert_eq!(summary.failed, 1);
        assert_eq!(summary.written, 3);
    }

    // Single exon annotation that breaks down on a particular region
    struct Broken;

    impl TranscriptSource for Broken {
        fn overlapping(&self, region: &GenomicRegion) -> Vec<Arc<Transcript>> {
            if region.start() == 1500 {
                panic!("corrupted annotation");
            }
            [single_exon()].into_iter().filter(|x| x.region().overlaps(region)).map(Arc::new).collect()
        }
    }

    #[test]
    fn skipped_and_failed() {
        let (evaluator, genome, sink) = (evaluator(), genome(), CollectingSink::new());
        let precalc = Precalculation::new(&evaluator, &Broken, &genome, &sink, PrecalcConfig::default()).unwrap();

        let regions =
            [interval(1200, 1210), interval(1500, 1510), Interval::new("chrX".into(), 0..10), interval(50, 60)];
        let summary = precalc.run(&regions, &ProgressBar::hidden());
        assert_eq!(summary, PrecalcSummary { regions: 4, skipped: 2, failed: 2, variants: 0, written: 0 });
        assert!(sink.is_empty());
    }

    #[test]
    fn invalid_config() {
        let (evaluator, transcripts, genome, sink) = (evaluator(), transcripts(), genome(), CollectingSink::new());
        for config in [
            PrecalcConfig { granularity: 0, ..Default::default() },
            PrecalcConfig { max_variant_length: 0, ..Default::default() },
            PrecalcConfig { binsize: 0, ..Default::default() },
        ] {
            assert!(Precalculation::new(&evaluator, &transcripts, &genome, &sink, config).is_err());
        }
    }
}
