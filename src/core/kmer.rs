use std::collections::HashMap;

use crate::core::dna;
use crate::core::error::{Result, SquirlsError};

/// Immutable k-mer -> motif strength table (hexamers, septamers).
#[derive(Clone, Debug, PartialEq)]
pub struct KmerTable {
    k: usize,
    scores: HashMap<Vec<u8>, f64>,
}

impl KmerTable {
    pub fn new(k: usize, scores: HashMap<String, f64>) -> Result<Self> {
        if k == 0 {
            return Err(SquirlsError::InvalidKmers("k must be positive".into()));
        }
        let mut table = HashMap::with_capacity(scores.len());
        for (kmer, score) in scores {
            let bytes = kmer.as_bytes();
            if bytes.len() != k {
                return Err(SquirlsError::InvalidKmers(format!("{} is not a {}-mer", kmer, k)));
            }
            if !bytes.iter().all(|x| matches!(x.to_ascii_uppercase(), b'A' | b'C' | b'G' | b'T')) {
                return Err(SquirlsError::InvalidKmers(format!("{} contains non-ACGT symbols", kmer)));
            }
            table.insert(dna::normalize(bytes), score);
        }
        Ok(Self { k, scores: table })
    }

    #[inline]
    pub fn k(&self) -> usize {
        self.k
    }

    pub fn len(&self) -> usize {
        self.scores.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scores.is_empty()
    }

    #[inline]
    pub fn get(&self, kmer: &[u8]) -> Option<f64> {
        self.scores.get(kmer).copied()
    }

    /// Sum of scores over all sliding k-mers of `seq` (upper-cased). Any k-mer missing from
    /// the table turns the whole sum into NaN.
    pub fn sum(&self, seq: &[u8]) -> f64 {
        let mut total = 0.0;
        for kmer in seq.windows(self.k) {
            match self.get(kmer) {
                Some(x) => total += x,
                None => return f64::NAN,
            }
        }
        total
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use itertools::Itertools;

    use crate::core::dna::Nucleotide;

    use super::*;

    /// Complete table where every k-mer scores the number of G/C bases it contains.
    pub fn gc_table(k: usize) -> KmerTable {
        let scores = itertools::repeat_n(Nucleotide::KNOWN, k)
            .multi_cartesian_product()
            .map(|kmer| {
                let kmer: String = kmer.iter().map(|x| x.symbol() as char).collect();
                let gc = kmer.chars().filter(|x| *x == 'G' || *x == 'C').count();
                (kmer, gc as f64)
            })
            .collect();
        KmerTable::new(k, scores).unwrap()
    }

    #[test]
    fn new() {
        let scores = HashMap::from([("acgtac".to_string(), 1.0), ("TTTTTT".to_string(), -1.0)]);
        let table = KmerTable::new(6, scores).unwrap();
        assert_eq!(table.len(), 2);
        assert_eq!(table.get(b"ACGTAC"), Some(1.0));

        let scores = HashMap::from([("ACGTA".to_string(), 1.0)]);
        assert!(KmerTable::new(6, scores).is_err());

        let scores = HashMap::from([("ACGTAN".to_string(), 1.0)]);
        assert!(KmerTable::new(6, scores).is_err());
    }

    #[test]
    fn sum() {
        let table = gc_table(6);
        assert_eq!(table.len(), 4096);
        // ACGTACG -> ACGTAC (3) + CGTACG (4)
        assert_eq!(table.sum(b"ACGTACG"), 7.0);
        assert_eq!(table.sum(b"ACGTA"), 0.0);
        assert!(table.sum(b"ACGTNCG").is_nan());
    }
}
