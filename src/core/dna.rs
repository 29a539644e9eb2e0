use std::fmt::{Display, Formatter};

#[derive(Clone, Copy, Eq, PartialEq, PartialOrd, Ord, Debug, Hash)]
#[allow(non_snake_case)]
pub enum Nucleotide {
    A,
    C,
    G,
    T,
    Unknown,
}

impl Nucleotide {
    pub const KNOWN: [Nucleotide; 4] = [Nucleotide::A, Nucleotide::C, Nucleotide::G, Nucleotide::T];

    pub fn symbol(&self) -> u8 {
        match self {
            Nucleotide::A => b'A',
            Nucleotide::C => b'C',
            Nucleotide::G => b'G',
            Nucleotide::T => b'T',
            Nucleotide::Unknown => b'N',
        }
    }

    /// Row of the nucleotide in A, C, G, T ordered matrices.
    #[inline]
    pub fn index(&self) -> Option<usize> {
        match self {
            Nucleotide::A => Some(0),
            Nucleotide::C => Some(1),
            Nucleotide::G => Some(2),
            Nucleotide::T => Some(3),
            Nucleotide::Unknown => None,
        }
    }

    pub fn complement(&self) -> Nucleotide {
        match self {
            Nucleotide::A => Nucleotide::T,
            Nucleotide::C => Nucleotide::G,
            Nucleotide::G => Nucleotide::C,
            Nucleotide::T => Nucleotide::A,
            Nucleotide::Unknown => Nucleotide::Unknown,
        }
    }

    pub fn is_purine(&self) -> bool {
        matches!(self, Nucleotide::A | Nucleotide::G)
    }

    pub fn is_pyrimidine(&self) -> bool {
        matches!(self, Nucleotide::C | Nucleotide::T)
    }
}

impl Display for Nucleotide {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.symbol() as char)
    }
}

impl Default for Nucleotide {
    fn default() -> Self {
        Nucleotide::Unknown
    }
}

impl From<u8> for Nucleotide {
    #[inline]
    fn from(symbol: u8) -> Self {
        match symbol {
            b'A' | b'a' => Nucleotide::A,
            b'C' | b'c' => Nucleotide::C,
            b'G' | b'g' => Nucleotide::G,
            b'T' | b't' => Nucleotide::T,
            _ => Nucleotide::Unknown,
        }
    }
}

/// Upper-cased reverse complement; anything outside ACGT becomes N.
pub fn revcomp(seq: &[u8]) -> Vec<u8> {
    seq.iter().rev().map(|x| Nucleotide::from(*x).complement().symbol()).collect()
}

pub fn normalize(seq: &[u8]) -> Vec<u8> {
    seq.iter().map(|x| Nucleotide::from(*x).symbol()).collect()
}

/// Allele strings may only contain ACGTN (case-insensitive).
pub fn is_allele(seq: &[u8]) -> bool {
    seq.iter().all(|x| matches!(x.to_ascii_uppercase(), b'A' | b'C' | b'G' | b'T' | b'N'))
}

pub fn count_pyrimidines(seq: &[u8]) -> usize {
    seq.iter().filter(|x| Nucleotide::from(**x).is_pyrimidine()).count()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_symbol() {
        for (symbol, expected) in [
            (b'A', Nucleotide::A),
            (b'c', Nucleotide::C),
            (b'G', Nucleotide::G),
            (b't', Nucleotide::T),
            (b'N', Nucleotide::Unknown),
            (b'-', Nucleotide::Unknown),
        ] {
            assert_eq!(Nucleotide::from(symbol), expected);
        }
    }

    #[test]
    fn reverse_complement() {
        assert_eq!(revcomp(b"ACGTN"), b"NACGT".to_vec());
        assert_eq!(revcomp(b"aacg"), b"CGTT".to_vec());
        assert!(revcomp(b"").is_empty());
    }

    #[test]
    fn alleles() {
        assert!(is_allele(b"ACGTNacgtn"));
        assert!(is_allele(b""));
        assert!(!is_allele(b"ACGU"));
        assert!(!is_allele(b"A*"));
    }

    #[test]
    fn chemistry() {
        assert!(Nucleotide::A.is_purine() && Nucleotide::G.is_purine());
        assert!(Nucleotide::C.is_pyrimidine() && Nucleotide::T.is_pyrimidine());
        assert!(!Nucleotide::Unknown.is_purine() && !Nucleotide::Unknown.is_pyrimidine());
        assert_eq!(count_pyrimidines(b"CTTAGCn"), 4);
    }
}
