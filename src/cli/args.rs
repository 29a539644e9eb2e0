use clap::Arg;

use super::validate;

pub mod core {
    use super::*;

    pub const MODEL: &str = "model";
    pub const REFERENCE: &str = "reference";
    pub const TRANSCRIPTS: &str = "transcripts";
    pub const CONSERVATION: &str = "conservation";
    pub const SAVETO: &str = "saveto";
    pub const THREADS: &str = "threads";

    pub const SECTION_NAME: &str = "Core";

    pub fn args<'a>() -> Vec<Arg<'a>> {
        let args = vec![
            Arg::new(MODEL)
                .short('m')
                .long(MODEL)
                .takes_value(true)
                .required(true)
                .validator(validate::path)
                .long_help("Pre-trained model in the JSON transfer format (may be gzipped): PWMs, splicing parameters, k-mer tables and the donor/acceptor random forests."),
            Arg::new(REFERENCE)
                .short('r')
                .long(REFERENCE)
                .takes_value(true)
                .required(true)
                .validator(validate::path)
                .long_help("Indexed fasta file with the reference genome assembly. Contig names must match the names used by transcripts and regions."),
            Arg::new(TRANSCRIPTS)
                .short('a')
                .long(TRANSCRIPTS)
                .takes_value(true)
                .required(true)
                .validator(validate::path)
                .long_help("Transcript models in the BED12 format (may be gzipped). Single-exon transcripts are loaded but never scored."),
            Arg::new(CONSERVATION)
                .short('c')
                .long(CONSERVATION)
                .takes_value(true)
                .validator(validate::path)
                .long_help("Per-base conservation scores (PhyloP) in the bedGraph format. Without it, the phylop feature is always unknown."),
            Arg::new(SAVETO)
                .short('o')
                .long(SAVETO)
                .takes_value(true)
                .validator(validate::writable)
                .default_value("/dev/stdout")
                .long_help("Path to the output tsv file. By default, the results are printed to stdout."),
            Arg::new(THREADS)
                .short('t')
                .long(THREADS)
                .takes_value(true)
                .validator(validate::numeric(1, usize::MAX))
                .default_value("1")
                .long_help("Maximum number of threads to spawn at once."),
        ];
        args.into_iter().map(|x| x.help_heading(Some(SECTION_NAME))).collect()
    }
}

pub mod precalc {
    use super::*;

    pub const REGION: &str = "region";
    pub const REGIONS: &str = "regions";
    pub const LENGTH: &str = "length";
    pub const GRANULARITY: &str = "granularity";
    pub const BINSIZE: &str = "binsize";
    pub const INDIVIDUAL_TRANSCRIPTS: &str = "individual-transcripts";

    pub const SECTION_NAME: &str = "Precalculation";

    pub fn args<'a>() -> Vec<Arg<'a>> {
        let args = vec![
            Arg::new(REGION)
                .index(1)
                .takes_value(true)
                .multiple_values(true)
                .required_unless_present(REGIONS)
                .long_help(
                    "Regions to precalculate in the chr:start-end format (1-based, inclusive). \
                    Malformed regions are skipped with a warning.",
                ),
            Arg::new(REGIONS)
                .long(REGIONS)
                .takes_value(true)
                .validator(validate::path)
                .long_help("BED file with additional regions to precalculate (0-based, half-open)."),
            Arg::new(LENGTH)
                .short('l')
                .long(LENGTH)
                .takes_value(true)
                .validator(validate::numeric(1usize, 10usize))
                .default_value("1")
                .long_help(
                    "Maximal length of the synthetic variants. Every SNV, deletion and insertion up to this length \
                    is scored at each position of the regions.",
                ),
            Arg::new(GRANULARITY)
                .long(GRANULARITY)
                .takes_value(true)
                .validator(validate::numeric(1usize, usize::MAX))
                .default_value("1")
                .long_help("Number of genomic bins processed serially by a worker thread before splitting the job."),
            Arg::new(BINSIZE)
                .long(BINSIZE)
                .takes_value(true)
                .validator(validate::numeric(1u64, 1_000_000u64))
                .default_value("10000")
                .long_help("Regions are split into genomic bins of approximately the specified size (in base pairs)."),
            Arg::new(INDIVIDUAL_TRANSCRIPTS).long(INDIVIDUAL_TRANSCRIPTS).takes_value(false).long_help(
                "Report pathogenicity for each overlapping transcript in addition to the maximal one.",
            ),
        ];
        args.into_iter().map(|x| x.help_heading(Some(SECTION_NAME))).collect()
    }
}

pub mod locator {
    use super::*;

    pub const MAX_INTRON_DEPTH: &str = "max-intron-depth";

    pub const SECTION_NAME: &str = "Locator";

    pub fn args<'a>() -> Vec<Arg<'a>> {
        let args = vec![Arg::new(MAX_INTRON_DEPTH)
            .long(MAX_INTRON_DEPTH)
            .takes_value(true)
            .validator(validate::numeric(0u64, u64::MAX))
            .default_value("500")
            .long_help("Intronic variants further away from the closest splice site are not scored.")];
        args.into_iter().map(|x| x.help_heading(Some(SECTION_NAME))).collect()
    }
}

pub fn all<'a>() -> Vec<Arg<'a>> {
    core::args().into_iter().chain(precalc::args()).chain(locator::args()).collect()
}
