use std::collections::HashMap;
use std::io::BufRead;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use bio_types::strand::Strand;
use rust_htslib::faidx;
use thread_local::ThreadLocal;

use crate::core::error::{Result, SquirlsError};
use crate::core::genome::{Contig, GenomicRegion, StrandedSequence};

use super::utils::read_compressed;
use super::SequenceSource;

// htslib readers are not thread safe, each worker thread opens its own one
struct FaidxReader(faidx::Reader);
unsafe impl Send for FaidxReader {}

/// Indexed FASTA (`.fai` next to the file) with one reader per worker thread.
pub struct FastaSequenceSource {
    path: PathBuf,
    contigs: HashMap<String, Arc<Contig>>,
    readers: ThreadLocal<FaidxReader>,
}

impl FastaSequenceSource {
    pub fn new(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let mut index = path.clone().into_os_string();
        index.push(".fai");
        let index = PathBuf::from(index);
        let contigs = read_compressed!(&index, parse_fai)?;

        let source = Self { path, contigs, readers: ThreadLocal::new() };
        // fail early on broken files
        source.reader()?;
        Ok(source)
    }

    pub fn contigs(&self) -> impl Iterator<Item = &Arc<Contig>> {
        self.contigs.values()
    }

    fn reader(&self) -> Result<&FaidxReader> {
        self.readers.get_or_try(|| {
            faidx::Reader::from_path(&self.path).map(FaidxReader).map_err(|x| {
                SquirlsError::Sequence(format!("failed to open the indexed FASTA {}: {}", self.path.display(), x))
            })
        })
    }
}

fn parse_fai<T: BufRead>(reader: T) -> Result<HashMap<String, Arc<Contig>>> {
    let mut contigs = HashMap::new();
    for line in reader.lines() {
        let line = line?;
        if line.is_empty() {
            continue;
        }
        let split: Vec<&str> = line.split('\t').take(2).collect();
        let length = split.get(1).and_then(|x| x.parse().ok()).ok_or_else(|| {
            SquirlsError::Sequence(format!("malformed FASTA index line: {}", line))
        })?;
        contigs.insert(split[0].to_string(), Arc::new(Contig::new(split[0].to_string(), length)));
    }
    Ok(contigs)
}

impl SequenceSource for FastaSequenceSource {
    fn contig(&self, name: &str) -> Option<Arc<Contig>> {
        self.contigs.get(name).cloned()
    }

    fn fetch(&self, region: &GenomicRegion) -> Result<StrandedSequence> {
        let name = region.contig().name();
        let contig = self.contig(name).ok_or_else(|| SquirlsError::Sequence(format!("unknown contig {}", name)))?;
        let range = region.range_on(Strand::Forward);
        let end = range.end.min(contig.length());
        let start = range.start.min(end);

        let forward = GenomicRegion::forward(contig, start, end)?;
        if forward.is_empty() {
            return StrandedSequence::new(forward, &[]);
        }
        // htslib uses inclusive coordinates
        let bases = self
            .reader()?
            .0
            .fetch_seq(name, start as usize, end as usize - 1)
            .map_err(|x| SquirlsError::Sequence(format!("{}: {}", forward, x)))?;
        StrandedSequence::new(forward, &bases)
    }
}

#[cfg(test)]
mod tests {
    use std::io::BufReader;

    use super::*;

    #[test]
    fn fai() {
        let fai = "chr1\t248956422\t112\t70\t71\nchrM\t16569\t252513167\t70\t71\n\n";
        let contigs = parse_fai(BufReader::new(fai.as_bytes())).unwrap();
        assert_eq!(contigs.len(), 2);
        assert_eq!(contigs["chrM"].length(), 16569);

        assert!(parse_fai(BufReader::new("chr1\tabc\n".as_bytes())).is_err());
    }
}
