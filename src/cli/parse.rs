use std::fs::File;
use std::io::BufWriter;
use std::str::FromStr;
use std::sync::Arc;

use anyhow::{anyhow, Context};
use bio_types::genome::{AbstractInterval, Interval};
use clap::ArgMatches;
use indicatif::ProgressBar;

use crate::core::evaluator::PADDING;
use crate::core::features::ConservationTrack;
use crate::core::io::{bed, BedGraphTrack, FastaSequenceSource, TranscriptIndex};
use crate::core::locator::{LocatorConfig, SplicingLocator};
use crate::core::model::Model;
use crate::core::params::SplicingParameters;
use crate::core::precalc::PrecalcConfig;
use crate::core::pwm::SplicingPwms;

use super::args;

fn value<T>(matches: &ArgMatches, name: &str) -> anyhow::Result<T>
where
    T: FromStr,
    <T as FromStr>::Err: std::fmt::Display,
{
    let raw = matches.value_of(name).ok_or_else(|| anyhow!("--{} is required", name))?;
    raw.parse().map_err(|x| anyhow!("failed to parse --{} {}: {}", name, raw, x))
}

pub fn threads(pbar: ProgressBar, matches: &ArgMatches) -> anyhow::Result<usize> {
    pbar.set_message("Parsing the number of threads allowed...");
    let threads = value(matches, args::core::THREADS)?;
    pbar.finish_with_message(format!("Using thread pool with {} threads.", threads));
    Ok(threads)
}

pub fn model(pbar: ProgressBar, matches: &ArgMatches) -> anyhow::Result<Model> {
    let path: String = value(matches, args::core::MODEL)?;
    pbar.set_message(format!("Loading the model from {}...", path));
    let model = Model::load(&path).with_context(|| format!("failed to load the model {}", path))?;
    pbar.finish_with_message(format!(
        "Model {}: {} hexamers, {} septamers, {} features required.",
        model.version(),
        model.hexamers().len(),
        model.septamers().len(),
        model.classifier().required().len()
    ));
    Ok(model)
}

pub fn reference(pbar: ProgressBar, matches: &ArgMatches) -> anyhow::Result<FastaSequenceSource> {
    let path: String = value(matches, args::core::REFERENCE)?;
    pbar.set_message(format!("Indexing the reference assembly {}...", path));
    let reference = FastaSequenceSource::new(&path).with_context(|| format!("failed to open the reference {}", path))?;
    pbar.finish_with_message(format!("Reference assembly with {} contigs.", reference.contigs().count()));
    Ok(reference)
}

pub fn transcripts(
    pbar: ProgressBar,
    matches: &ArgMatches,
    reference: &FastaSequenceSource,
    pwms: &SplicingPwms,
) -> anyhow::Result<TranscriptIndex> {
    let path: String = value(matches, args::core::TRANSCRIPTS)?;
    pbar.set_message(format!("Parsing transcripts from {}...", path));
    let index = TranscriptIndex::from_bed12(&path, reference, pwms)
        .with_context(|| format!("failed to load transcripts {}", path))?;
    pbar.finish_with_message(format!("Loaded {} transcripts.", index.len()));
    Ok(index)
}

pub fn conservation(pbar: ProgressBar, matches: &ArgMatches) -> anyhow::Result<Arc<dyn ConservationTrack>> {
    pbar.set_message("Parsing the conservation track...");
    match matches.value_of(args::core::CONSERVATION) {
        None => {
            pbar.finish_with_message("Conservation track is not provided, phylop scores are unknown.");
            Ok(Arc::new(BedGraphTrack::default()))
        }
        Some(path) => {
            let track =
                BedGraphTrack::from_bedgraph(path).with_context(|| format!("failed to load the bedGraph {}", path))?;
            if track.is_empty() {
                log::warn!("Conservation track {} has no valid records", path);
            }
            pbar.finish_with_message(format!("Conservation scores loaded from {}.", path));
            Ok(Arc::new(track))
        }
    }
}

pub fn regions(pbar: ProgressBar, matches: &ArgMatches) -> anyhow::Result<Vec<Interval>> {
    pbar.set_message("Parsing regions...");
    let mut regions: Vec<Interval> = matches
        .values_of(args::precalc::REGION)
        .into_iter()
        .flatten()
        .filter_map(|x| match bed::parse_region(x) {
            Ok(region) => Some(region),
            Err(err) => {
                log::warn!("Skipping region {}: {}", x, err);
                None
            }
        })
        .collect();
    if let Some(path) = matches.value_of(args::precalc::REGIONS) {
        regions.extend(bed::parse(path).with_context(|| format!("failed to parse regions {}", path))?);
    }
    if regions.is_empty() {
        return Err(anyhow!("no valid regions to precalculate"));
    }

    let total: u64 = regions.iter().map(|x| x.range().end - x.range().start).sum();
    pbar.finish_with_message(format!("Will precalculate {} regions, {}bp in total.", regions.len(), total));
    Ok(regions)
}

pub fn locator(
    pbar: ProgressBar,
    matches: &ArgMatches,
    parameters: SplicingParameters,
) -> anyhow::Result<SplicingLocator> {
    pbar.set_message("Parsing locator options...");
    let config = LocatorConfig::new(value(matches, args::locator::MAX_INTRON_DEPTH)?);
    pbar.finish_with_message(format!(
        "Intronic variants deeper than {}bp from the closest splice site are not scored.",
        config.max_intron_depth
    ));
    Ok(SplicingLocator::new(parameters, config))
}

pub fn precalc(pbar: ProgressBar, matches: &ArgMatches) -> anyhow::Result<PrecalcConfig> {
    pbar.set_message("Parsing precalculation options...");
    let config = PrecalcConfig::new(
        value(matches, args::precalc::GRANULARITY)?,
        value(matches, args::precalc::LENGTH)?,
        PADDING,
        value(matches, args::precalc::BINSIZE)?,
        matches.is_present(args::precalc::INDIVIDUAL_TRANSCRIPTS),
    );
    let msg = format!(
        "Synthetic variants up to {}bp, {}bp bins, granularity {}. ",
        config.max_variant_length, config.binsize, config.granularity
    );
    if config.include_transcripts {
        pbar.finish_with_message(msg + "Per-transcript scores are reported.");
    } else {
        pbar.finish_with_message(msg + "Only maximal scores are reported.");
    }
    Ok(config)
}

pub fn saveto(pbar: ProgressBar, matches: &ArgMatches) -> anyhow::Result<BufWriter<File>> {
    pbar.set_message("Parsing output path...");
    let path: String = value(matches, args::core::SAVETO)?;
    let file = BufWriter::new(File::create(&path).with_context(|| format!("failed to create {}", path))?);
    pbar.finish_with_message(format!("Result will be saved to {}", path));
    Ok(file)
}
