use std::collections::HashMap;
use std::io::BufRead;
use std::path::Path;

use bio_types::genome::Position;

use crate::core::error::Result;
use crate::core::features::ConservationTrack;

use super::utils::read_compressed;

#[derive(Clone, Copy, Debug, PartialEq)]
struct Block {
    start: Position,
    end: Position,
    value: f64,
}

/// Per-base conservation scores loaded from a bedGraph file. An empty track has no values at all.
#[derive(Clone, Debug, Default)]
pub struct BedGraphTrack {
    // sorted, non-overlapping blocks per contig
    blocks: HashMap<String, Vec<Block>>,
}

impl BedGraphTrack {
    pub fn from_bedgraph(path: impl AsRef<Path>) -> Result<Self> {
        let track = read_compressed!(path, Self::parse)?;
        log::info!("Loaded conservation scores for {} contigs", track.blocks.len());
        Ok(track)
    }

    fn parse<T: BufRead>(reader: T) -> Result<Self> {
        let mut blocks: HashMap<String, Vec<Block>> = HashMap::new();

        for (ind, line) in reader.lines().enumerate() {
            let line = line?;
            let line = line.trim_end();
            if line.is_empty() || line.starts_with('#') || line.starts_with("track") || line.starts_with("browser") {
                continue;
            }
            let split: Vec<&str> = line.split_whitespace().take(4).collect();
            let parsed = match split[..] {
                [contig, start, end, value] => {
                    match (start.parse::<Position>(), end.parse::<Position>(), value.parse::<f64>()) {
                        (Ok(start), Ok(end), Ok(value)) if start < end && value.is_finite() => {
                            Some((contig, start, end, value))
                        }
                        _ => None,
                    }
                }
                _ => None,
            };
            match parsed {
                Some((contig, start, end, value)) => {
                    blocks.entry(contig.to_string()).or_default().push(Block { start, end, value })
                }
                None => log::warn!("Skipping malformed bedGraph line {}: {}", ind + 1, line),
            }
        }

        for (contig, track) in blocks.iter_mut() {
            track.sort_by_key(|x| x.start);
            let (resolved, overlapping) = shadow(std::mem::take(track));
            if overlapping > 0 {
                log::warn!("{} overlapping bedGraph blocks on {}", overlapping, contig);
            }
            *track = resolved;
        }
        Ok(Self { blocks })
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }
}

// Blocks sorted by start, later blocks shadow the overlapped part of earlier ones.
// Returns non-overlapping blocks and the number of blocks that covered something.
fn shadow(blocks: Vec<Block>) -> (Vec<Block>, usize) {
    let mut resolved: Vec<Block> = Vec::with_capacity(blocks.len());
    let mut overlapping = 0;
    for next in blocks {
        let first = resolved.partition_point(|x| x.end <= next.start);
        let covered = resolved.split_off(first);
        if !covered.is_empty() {
            overlapping += 1;
        }
        // at most one covered block starts before the new one
        resolved.extend(covered.iter().filter(|x| x.start < next.start).map(|x| Block { end: next.start, ..*x }));
        resolved.push(next);
        resolved.extend(
            covered.iter().filter(|x| x.end > next.end).map(|x| Block { start: x.start.max(next.end), ..*x }),
        );
    }
    (resolved, overlapping)
}

impl ConservationTrack for BedGraphTrack {
    fn value(&self, contig: &str, pos: Position) -> Option<f64> {
        let blocks = self.blocks.get(contig)?;
        let ind = blocks.partition_point(|x| x.end <= pos);
        blocks.get(ind).filter(|x| x.start <= pos).map(|x| x.value)
    }
}
