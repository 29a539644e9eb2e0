use std::io::BufRead;
use std::ops::Range;
use std::path::Path;

use bio_types::genome::{AbstractInterval, Interval};

use crate::core::error::{Result, SquirlsError};

use super::utils::read_compressed;

fn _parse<T: BufRead>(reader: T) -> Result<Vec<Interval>> {
    let mut records = Vec::new();

    for (ind, line) in reader.lines().enumerate() {
        let line = line?;
        let line = line.trim_end();
        if line.is_empty() || line.starts_with('#') || line.starts_with("track") || line.starts_with("browser") {
            continue;
        }
        let split: Vec<&str> = line.split('\t').take(3).collect();
        let parsed = match split[..] {
            [contig, start, end] => start.parse::<u64>().ok().zip(end.parse::<u64>().ok()).map(|(start, end)| (contig, start, end)),
            _ => None,
        };
        match parsed {
            Some((contig, start, end)) if start < end => {
                records.push(Interval::new(contig.to_owned(), Range { start, end }));
            }
            _ => log::warn!("Skipping malformed BED line {}: {}", ind + 1, line),
        }
    }
    Ok(records)
}

/// BED intervals (only the first 3 columns are used). Malformed lines are skipped with a warning.
pub fn parse(bed: impl AsRef<Path>) -> Result<Vec<Interval>> {
    read_compressed!(bed, _parse)
}

/// Parse `chr:start-end` with 1-based inclusive coordinates into a 0-based half-open interval.
pub fn parse_region(text: &str) -> Result<Interval> {
    let invalid = || SquirlsError::InvalidRegion(format!("{} (expected chr:start-end)", text));

    let (contig, range) = text.trim().rsplit_once(':').ok_or_else(invalid)?;
    let (start, end) = range.split_once('-').ok_or_else(invalid)?;
    let (start, end): (u64, u64) = (
        start.replace(',', "").parse().map_err(|_| invalid())?,
        end.replace(',', "").parse().map_err(|_| invalid())?,
    );
    if contig.is_empty() || start == 0 || start > end {
        return Err(invalid());
    }
    Ok(Interval::new(contig.to_string(), start - 1..end))
}

/// Stable order of intervals: by contig name, then by coordinates.
pub fn sort(intervals: &mut [Interval]) {
    intervals.sort_by(|a, b| {
        a.contig().cmp(b.contig()).then(a.range().start.cmp(&b.range().start)).then(a.range().end.cmp(&b.range().end))
    });
}

#[cfg(test)]
mod tests {
    use std::io::BufReader;

    use bio_types::genome::Position;

    use super::*;

    fn interval(chr: &str, range: Range<Position>) -> Interval {
        Interval::new(chr.to_string(), range)
    }

    #[test]
    fn empty() {
        let bed = "";
        assert!(_parse(BufReader::new(bed.as_bytes())).unwrap().is_empty());
    }

    #[test]
    fn correct() {
        let bed = "\
        chr1\t10\t20\tReg1\n\
        chr1\t50\t60\tIII\n\
        chr1\t30\t40\t2\n\
        chr2\t70\t80\n";
        let records = vec![
            interval("chr1", 10..20),
            interval("chr1", 50..60),
            interval("chr1", 30..40),
            interval("chr2", 70..80),
        ];
        assert_eq!(records, _parse(BufReader::new(bed.as_bytes())).unwrap());
    }

    #[test]
    fn malformed() {
        let bed = "\
        track name=regions\n\
        \n\
        MT\t10\t12\t1R1\n\
        chr1\tstart\t100\n\
        chr1\t100\t50\n\
        chr1\t100\n\
        1\t30\t301\t.\n";
        let records = vec![interval("MT", 10..12), interval("1", 30..301)];
        assert_eq!(records, _parse(BufReader::new(bed.as_bytes())).unwrap());
    }

    #[test]
    fn region() {
        for (text, expected) in [
            ("chr1:100-200", interval("chr1", 99..200)),
            ("chr1:1-1", interval("chr1", 0..1)),
            ("HLA-A*01:01:1,000-2,000", interval("HLA-A*01:01", 999..2000)),
        ] {
            assert_eq!(parse_region(text).unwrap(), expected, "{}", text);
        }
        for text in ["chr1", "chr1:100", "chr1:0-10", "chr1:200-100", ":1-2", "chr1:a-b"] {
            assert!(parse_region(text).is_err(), "{}", text);
        }
    }

    #[test]
    fn sorting() {
        let mut intervals = vec![interval("chr2", 0..10), interval("chr1", 5..10), interval("chr1", 0..10)];
        sort(&mut intervals);
        assert_eq!(intervals, vec![interval("chr1", 0..10), interval("chr1", 5..10), interval("chr2", 0..10)]);
    }
}
