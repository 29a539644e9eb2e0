use clap::ArgMatches;
use indicatif::ProgressBar;
use rayon::ThreadPoolBuilder;

use crate::core::evaluator::VariantSplicingEvaluator;
use crate::core::features::SplicingAnnotator;
use crate::core::io::TsvSink;
use crate::core::precalc::Precalculation;

use super::{parse, style};

pub fn run(matches: &ArgMatches) -> anyhow::Result<()> {
    let factory = || {
        let pbar = ProgressBar::new_spinner().with_style(style::parse::with_progress());
        pbar.enable_steady_tick(100);
        pbar
    };

    let threads = parse::threads(factory(), matches)?;
    let pool = ThreadPoolBuilder::new().num_threads(threads).build()?;

    let (pwms, hexamers, septamers, classifier) = parse::model(factory(), matches)?.into_parts();
    let reference = parse::reference(factory(), matches)?;
    let transcripts = parse::transcripts(factory(), matches, &reference, &pwms)?;
    let conservation = parse::conservation(factory(), matches)?;
    let locator = parse::locator(factory(), matches, *pwms.parameters())?;
    let regions = parse::regions(factory(), matches)?;
    let config = parse::precalc(factory(), matches)?;
    let sink = TsvSink::new(parse::saveto(factory(), matches)?, config.include_transcripts);

    let annotator = SplicingAnnotator::standard(locator, pwms, hexamers, septamers, conservation);
    let evaluator = VariantSplicingEvaluator::new(annotator, classifier)?;

    let pbar = ProgressBar::new(0).with_style(style::run::running());
    pbar.set_draw_delta(threads as u64);
    let summary = pool.install(|| -> anyhow::Result<_> {
        let precalc = Precalculation::new(&evaluator, &transcripts, &reference, &sink, config)?;
        Ok(precalc.run(&regions, &pbar))
    })?;
    sink.into_inner()?;

    pbar.set_style(style::run::finished());
    pbar.finish_with_message(format!("Finished: {}", summary));
    if summary.failed > 0 {
        log::warn!("{} regions failed, see the errors above", summary.failed);
    }
    Ok(())
}
