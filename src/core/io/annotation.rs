use std::collections::HashSet;
use std::io::BufRead;
use std::ops::Range;
use std::path::Path;
use std::sync::Arc;

use bio::data_structures::annot_map::AnnotMap;
use bio_types::annot::contig::Contig as Query;
use bio_types::genome::Position;
use bio_types::strand::Strand;
use itertools::Itertools;

use crate::core::error::{Result, SquirlsError};
use crate::core::genome::GenomicRegion;
use crate::core::pwm::{PositionWeightMatrix, SplicingPwms};
use crate::core::transcript::{Exon, Transcript};

use super::utils::read_compressed;
use super::{SequenceSource, TranscriptSource};

/// Transcripts indexed by their forward strand coordinates.
pub struct TranscriptIndex {
    index: AnnotMap<String, Arc<Transcript>>,
    size: usize,
}

impl TranscriptIndex {
    pub fn new(transcripts: Vec<Transcript>) -> Self {
        let mut index = AnnotMap::new();
        let size = transcripts.len();
        for tx in transcripts {
            let forward = tx.region().range_on(Strand::Forward);
            let record = Query::new(
                tx.region().contig().name().to_string(),
                forward.start as isize,
                (forward.end - forward.start) as usize,
                Strand::Unknown,
            );
            index.insert_at(Arc::new(tx), &record);
        }
        Self { index, size }
    }

    /// Load transcripts from a BED12 file. Intron donor/acceptor scores are computed with the PWMs
    /// from the reference sequence. Lines with unknown contigs or malformed blocks are skipped.
    pub fn from_bed12(bed12: impl AsRef<Path>, sequences: &dyn SequenceSource, pwms: &SplicingPwms) -> Result<Self> {
        let transcripts = read_compressed!(bed12, parse_bed12, sequences, pwms)?;
        log::info!("Loaded {} transcripts", transcripts.len());
        Ok(Self::new(transcripts))
    }

    pub fn len(&self) -> usize {
        self.size
    }

    pub fn is_empty(&self) -> bool {
        self.size == 0
    }
}

impl TranscriptSource for TranscriptIndex {
    fn overlapping(&self, region: &GenomicRegion) -> Vec<Arc<Transcript>> {
        let forward = region.range_on(Strand::Forward);
        // widened to catch insertions located right at the transcript boundaries
        let start = forward.start.saturating_sub(1);
        let query = Query::new(
            region.contig().name().to_string(),
            start as isize,
            (forward.end + 1 - start) as usize,
            Strand::Unknown,
        );
        self.index
            .find(&query)
            .map(|x| x.data())
            .filter(|tx| tx.region().overlaps(region))
            .sorted_by(|a, b| {
                let (a_start, b_start) =
                    (a.region().range_on(Strand::Forward).start, b.region().range_on(Strand::Forward).start);
                a_start.cmp(&b_start).then_with(|| a.accession().cmp(b.accession()))
            })
            .cloned()
            .collect()
    }
}

struct Bed12Record<'a> {
    contig: &'a str,
    accession: &'a str,
    strand: Strand,
    start: Position,
    end: Position,
    // forward strand, ascending
    blocks: Vec<(Position, Position)>,
}

fn parse_line(line: &str) -> Option<Bed12Record> {
    let split: Vec<&str> = line.split('\t').collect();
    if split.len() < 12 {
        return None;
    }
    let (start, end): (Position, Position) = (split[1].parse().ok()?, split[2].parse().ok()?);
    let strand = match split[5] {
        "+" => Strand::Forward,
        "-" => Strand::Reverse,
        _ => return None,
    };
    let count: usize = split[9].parse().ok()?;
    let parse_list = |text: &str| -> Option<Vec<Position>> {
        text.split(',').filter(|x| !x.is_empty()).map(|x| x.parse().ok()).collect()
    };
    let (sizes, starts) = (parse_list(split[10])?, parse_list(split[11])?);
    if count == 0 || sizes.len() != count || starts.len() != count {
        return None;
    }
    let blocks = starts.iter().zip(sizes.iter()).map(|(offset, size)| (start + offset, start + offset + size)).collect();
    Some(Bed12Record { contig: split[0], accession: split[3], strand, start, end, blocks })
}

fn build(
    record: Bed12Record,
    sequences: &dyn SequenceSource,
    pwms: &SplicingPwms,
) -> std::result::Result<Transcript, String> {
    let contig = sequences.contig(record.contig).ok_or_else(|| format!("unknown contig {}", record.contig))?;
    let forward = GenomicRegion::forward(contig, record.start, record.end).map_err(|x| x.to_string())?;

    let region = forward.to_strand(record.strand);
    let length = forward.contig().length();
    let mut exons: Vec<Exon> = record
        .blocks
        .iter()
        .map(|&(start, end)| match record.strand {
            Strand::Reverse => Exon::new(length - end, length - start),
            _ => Exon::new(start, end),
        })
        .collect();
    if record.strand == Strand::Reverse {
        exons.reverse();
    }

    let params = pwms.parameters();
    let padding = params.donor_length().max(params.acceptor_length());
    let sequence = sequences.fetch(&forward.pad(padding)).map_err(|x| x.to_string())?.to_strand(record.strand);

    Transcript::from_exons(record.accession.to_string(), region, exons, |intron| {
        let score = |window: Range<Position>, pwm: &PositionWeightMatrix| {
            sequence.subsequence(window).map_or(f64::NAN, |x| pwm.score(x))
        };
        (
            score(params.donor_window(intron.start), pwms.donor()),
            score(params.acceptor_window(intron.end), pwms.acceptor()),
        )
    })
    .map_err(|x| x.to_string())
}

fn parse_bed12<T: BufRead>(reader: T, sequences: &dyn SequenceSource, pwms: &SplicingPwms) -> Result<Vec<Transcript>> {
    let mut transcripts = Vec::new();
    let mut accessions = HashSet::new();
    let mut skipped = 0;

    for (ind, line) in reader.lines().enumerate() {
        let line = line?;
        let line = line.trim_end();
        if line.is_empty() || line.starts_with('#') || line.starts_with("track") || line.starts_with("browser") {
            continue;
        }
        let result = parse_line(line)
            .ok_or_else(|| "malformed BED12 record".to_string())
            .and_then(|record| build(record, sequences, pwms));
        match result {
            Ok(tx) => {
                if !accessions.insert(tx.accession().to_string()) {
                    log::warn!("Duplicated transcript accession {} (line {})", tx.accession(), ind + 1);
                }
                transcripts.push(tx);
            }
            Err(reason) => {
                skipped += 1;
                log::warn!("Skipping BED12 line {}: {}", ind + 1, reason);
            }
        }
    }
    if skipped > 0 {
        log::warn!("{} BED12 lines were skipped", skipped);
    }
    if transcripts.is_empty() && skipped > 0 {
        return Err(SquirlsError::InvalidTranscript {
            accession: "*".into(),
            reason: "none of the BED12 records describes a valid transcript".into(),
        });
    }
    Ok(transcripts)
}

#[cfg(test)]
mod tests {
    use std::io::BufReader;

    use crate::core::io::memory::tests::genome;
    use crate::core::pwm::tests::pwms;
    use crate::core::transcript::tests::{chr1, multi_exon};

    use super::*;

    fn load(bed12: &str) -> Result<Vec<Transcript>> {
        parse_bed12(BufReader::new(bed12.as_bytes()), &genome(), &pwms())
    }

    #[test]
    fn forward() {
        let bed12 = "chr1\t1000\t2000\tTX1\t0\t+\t1000\t2000\t0\t3\t200,200,200,\t0,400,800,\n";
        let transcripts = load(bed12).unwrap();
        assert_eq!(transcripts.len(), 1);

        let (tx, expected) = (&transcripts[0], multi_exon(Strand::Forward));
        assert_eq!(tx.accession(), "TX1");
        assert_eq!(tx.region(), expected.region());
        assert_eq!(tx.exons(), expected.exons());
        // consensus donors at 1200/1600 and acceptors at 1400/1800
        let pwms = pwms();
        for intron in tx.introns() {
            assert!((intron.donor_score - pwms.donor().max_score()).abs() < 1e-9, "{:?}", intron);
            assert!((intron.acceptor_score - pwms.acceptor().max_score()).abs() < 1e-9, "{:?}", intron);
        }
    }

    #[test]
    fn reverse() {
        let bed12 = "chr1\t1000\t2000\tTX1\t0\t-\t1000\t2000\t0\t3\t200,200,200\t0,400,800\n";
        let transcripts = load(bed12).unwrap();
        let expected = GenomicRegion::new(chr1(), Strand::Reverse, 8000, 9000).unwrap();
        assert_eq!(transcripts[0].region(), &expected);
        assert_eq!(transcripts[0].exons(), &[Exon::new(8000, 8200), Exon::new(8400, 8600), Exon::new(8800, 9000)]);
        assert_eq!(transcripts[0].introns().len(), 2);
    }

    #[test]
    fn skipped() {
        let bed12 = "\
        # comment\n\
        track name=transcripts\n\
        chr1\t1000\t2000\tTX1\t0\t+\t1000\t2000\t0\t3\t200,200,200\t0,400,800\n\
        chr2\t1000\t2000\tTX2\t0\t+\t1000\t2000\t0\t1\t1000\t0\n\
        chr1\t1000\t2000\tTX3\t0\t.\t1000\t2000\t0\t1\t1000\t0\n\
        chr1\t1000\t2000\tTX4\t0\t+\t1000\t2000\t0\t2\t200,200\t0,400\n\
        chr1\t1000\t2000\tTX5\t0\t+\t1000\t2000\t0\t1\t1000\n";
        let transcripts = load(bed12).unwrap();
        assert_eq!(transcripts.iter().map(|x| x.accession()).collect_vec(), vec!["TX1"]);

        assert!(load("chr2\t1000\t2000\tTX2\t0\t+\t1000\t2000\t0\t1\t1000\t0\n").is_err());
        assert!(load("").unwrap().is_empty());
    }

    #[test]
    fn overlapping() {
        let contig = chr1();
        let region = GenomicRegion::forward(contig.clone(), 1500, 1600).unwrap();
        let other = Transcript::from_exons(
            "TX0".into(),
            GenomicRegion::forward(contig.clone(), 1500, 3000).unwrap(),
            vec![Exon::new(1500, 3000)],
            |_| (0.0, 0.0),
        )
        .unwrap();
        let index = TranscriptIndex::new(vec![other, multi_exon(Strand::Reverse)]);
        assert_eq!(index.len(), 2);

        // reverse transcript 1000-2000 sits at 8000-9000 on the forward strand
        let hits = index.overlapping(&region);
        assert_eq!(hits.iter().map(|x| x.accession()).collect_vec(), vec!["TX0"]);

        let region = GenomicRegion::forward(contig.clone(), 8500, 8501).unwrap();
        let hits = index.overlapping(&region.to_opposite_strand());
        assert_eq!(hits.iter().map(|x| x.accession()).collect_vec(), vec!["TX1"]);

        // insertion points: inside vs at the boundary
        for (pos, expected) in [(1500, 0), (1501, 1), (2999, 1), (3000, 0), (8000, 0), (8001, 1)] {
            let point = GenomicRegion::forward(contig.clone(), pos, pos).unwrap();
            assert_eq!(index.overlapping(&point).len(), expected, "{}", pos);
        }
    }
}
