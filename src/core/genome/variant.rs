use std::fmt::{Display, Formatter};
use std::ops::Range;
use std::sync::Arc;

use bio_types::genome::Position;
use bio_types::strand::Strand;

use crate::core::dna;
use crate::core::error::{Result, SquirlsError};

use super::{Contig, GenomicRegion};

/// Sequence variant in trimmed form: shared allele prefix/suffix removed, so either allele may be
/// empty. The region spans the reference allele; insertions have an empty region `[p, p)`.
/// The optional anchor is the reference base preceding the variant, kept for VCF-style output.
#[derive(Clone, Debug, PartialEq)]
pub struct Variant {
    region: GenomicRegion,
    reference: Vec<u8>,
    alternate: Vec<u8>,
    anchor: Option<u8>,
}

impl Variant {
    pub fn new(region: GenomicRegion, reference: &[u8], alternate: &[u8]) -> Result<Self> {
        if !dna::is_allele(reference) || !dna::is_allele(alternate) {
            return Err(SquirlsError::InvalidVariant(format!(
                "{} alleles must contain only ACGTN symbols",
                region
            )));
        }
        if region.len() as usize != reference.len() {
            return Err(SquirlsError::InvalidVariant(format!(
                "reference allele length {} doesn't match the region {}",
                reference.len(),
                region
            )));
        }
        let (reference, alternate) = (dna::normalize(reference), dna::normalize(alternate));
        if reference == alternate {
            return Err(SquirlsError::InvalidVariant(format!("{} reference and alternate alleles are identical", region)));
        }
        Ok(Self { region, reference, alternate, anchor: None })
    }

    /// Build a variant from 1-based VCF-like coordinates and alleles, trimming shared bases.
    pub fn from_vcf(contig: Arc<Contig>, pos: Position, reference: &str, alternate: &str) -> Result<Self> {
        if pos == 0 {
            return Err(SquirlsError::InvalidVariant(format!("{}:0 VCF positions are 1-based", contig.name())));
        }
        let (mut reference, mut alternate) = (reference.as_bytes(), alternate.as_bytes());

        while !reference.is_empty()
            && !alternate.is_empty()
            && reference[reference.len() - 1].eq_ignore_ascii_case(&alternate[alternate.len() - 1])
        {
            reference = &reference[..reference.len() - 1];
            alternate = &alternate[..alternate.len() - 1];
        }

        let mut start = pos - 1;
        let mut anchor = None;
        while !reference.is_empty() && !alternate.is_empty() && reference[0].eq_ignore_ascii_case(&alternate[0]) {
            anchor = Some(reference[0].to_ascii_uppercase());
            reference = &reference[1..];
            alternate = &alternate[1..];
            start += 1;
        }

        let region = GenomicRegion::forward(contig, start, start + reference.len() as Position)?;
        let mut variant = Self::new(region, reference, alternate)?;
        variant.anchor = anchor;
        Ok(variant)
    }

    pub fn with_anchor(mut self, anchor: u8) -> Self {
        self.anchor = Some(anchor.to_ascii_uppercase());
        self
    }

    #[inline]
    pub fn region(&self) -> &GenomicRegion {
        &self.region
    }

    #[inline]
    pub fn contig(&self) -> &str {
        self.region.contig().name()
    }

    #[inline]
    pub fn strand(&self) -> Strand {
        self.region.strand()
    }

    #[inline]
    pub fn start(&self) -> Position {
        self.region.start()
    }

    #[inline]
    pub fn end(&self) -> Position {
        self.region.end()
    }

    #[inline]
    pub fn range(&self) -> Range<Position> {
        self.region.start()..self.region.end()
    }

    #[inline]
    pub fn reference(&self) -> &[u8] {
        &self.reference
    }

    #[inline]
    pub fn alternate(&self) -> &[u8] {
        &self.alternate
    }

    #[inline]
    pub fn anchor(&self) -> Option<u8> {
        self.anchor
    }

    pub fn is_snv(&self) -> bool {
        self.reference.len() == 1 && self.alternate.len() == 1
    }

    pub fn is_insertion(&self) -> bool {
        self.reference.is_empty()
    }

    pub fn is_deletion(&self) -> bool {
        self.alternate.is_empty()
    }

    /// Change of the sequence length introduced by the variant.
    pub fn length_change(&self) -> i64 {
        self.alternate.len() as i64 - self.reference.len() as i64
    }

    pub fn to_opposite_strand(&self) -> Self {
        Self {
            region: self.region.to_opposite_strand(),
            reference: dna::revcomp(&self.reference),
            alternate: dna::revcomp(&self.alternate),
            anchor: None,
        }
    }

    pub fn to_strand(&self, strand: Strand) -> Self {
        if (strand == Strand::Reverse) == self.region.is_reverse() {
            self.clone()
        } else {
            self.to_opposite_strand()
        }
    }

    /// 1-based position and alleles with the anchor base prepended to empty alleles.
    /// Unknown anchors are reported as N.
    pub fn vcf_fields(&self) -> (Position, String, String) {
        let region = self.region.to_strand(Strand::Forward);
        let (reference, alternate) = if self.region.is_reverse() {
            (dna::revcomp(&self.reference), dna::revcomp(&self.alternate))
        } else {
            (self.reference.clone(), self.alternate.clone())
        };

        if reference.is_empty() || alternate.is_empty() {
            let anchor = self.anchor.unwrap_or(b'N');
            let mut vcfref = vec![anchor];
            vcfref.extend_from_slice(&reference);
            let mut vcfalt = vec![anchor];
            vcfalt.extend_from_slice(&alternate);
            (region.start(), String::from_utf8_lossy(&vcfref).into(), String::from_utf8_lossy(&vcfalt).into())
        } else {
            (
                region.start() + 1,
                String::from_utf8_lossy(&reference).into(),
                String::from_utf8_lossy(&alternate).into(),
            )
        }
    }
}

impl Display for Variant {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let (pos, reference, alternate) = self.vcf_fields();
        write!(f, "{}:{}{}>{}", self.contig(), pos, reference, alternate)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chr1() -> Arc<Contig> {
        Arc::new(Contig::new("chr1".into(), 1_000))
    }

    #[test]
    fn new() {
        let region = GenomicRegion::forward(chr1(), 10, 11).unwrap();
        assert!(Variant::new(region.clone(), b"A", b"G").is_ok());
        assert!(Variant::new(region.clone(), b"A", b"A").is_err());
        assert!(Variant::new(region.clone(), b"AC", b"G").is_err());
        assert!(Variant::new(region, b"A", b"U").is_err());

        let variant = Variant::new(GenomicRegion::forward(chr1(), 10, 11).unwrap(), b"a", b"t").unwrap();
        assert_eq!(variant.reference(), b"A");
        assert_eq!(variant.alternate(), b"T");
    }

    #[test]
    fn from_vcf() {
        // SNV
        let snv = Variant::from_vcf(chr1(), 101, "C", "T").unwrap();
        assert_eq!((snv.start(), snv.end()), (100, 101));
        assert!(snv.is_snv());
        assert_eq!(snv.anchor(), None);

        // Deletion with an anchor base
        let deletion = Variant::from_vcf(chr1(), 101, "CAG", "C").unwrap();
        assert_eq!((deletion.start(), deletion.end()), (101, 103));
        assert_eq!(deletion.reference(), b"AG");
        assert!(deletion.is_deletion());
        assert_eq!(deletion.anchor(), Some(b'C'));
        assert_eq!(deletion.length_change(), -2);

        // Insertion with an anchor base
        let insertion = Variant::from_vcf(chr1(), 101, "C", "CTT").unwrap();
        assert_eq!((insertion.start(), insertion.end()), (101, 101));
        assert!(insertion.is_insertion());
        assert_eq!(insertion.alternate(), b"TT");

        // Shared suffix
        let mnv = Variant::from_vcf(chr1(), 101, "ACGT", "AGGT").unwrap();
        assert_eq!((mnv.start(), mnv.end()), (101, 102));
        assert_eq!((mnv.reference(), mnv.alternate()), (&b"C"[..], &b"G"[..]));

        assert!(Variant::from_vcf(chr1(), 0, "A", "C").is_err());
        assert!(Variant::from_vcf(chr1(), 10, "AC", "AC").is_err());
    }

    #[test]
    fn vcf_fields() {
        for (pos, reference, alternate) in [(101, "C", "T"), (101, "CAG", "C"), (101, "C", "CTT")] {
            let variant = Variant::from_vcf(chr1(), pos, reference, alternate).unwrap();
            assert_eq!(variant.vcf_fields(), (pos, reference.to_string(), alternate.to_string()));
        }

        let region = GenomicRegion::forward(chr1(), 5, 5).unwrap();
        let unanchored = Variant::new(region, b"", b"A").unwrap();
        assert_eq!(unanchored.vcf_fields(), (5, "N".to_string(), "NA".to_string()));
    }

    #[test]
    fn opposite_strand() {
        let variant = Variant::from_vcf(chr1(), 101, "CAG", "C").unwrap();
        let reverse = variant.to_opposite_strand();
        assert_eq!(reverse.strand(), Strand::Reverse);
        assert_eq!((reverse.start(), reverse.end()), (897, 899));
        assert_eq!(reverse.reference(), b"CT");
        assert_eq!(reverse.to_strand(Strand::Forward).reference(), b"AG");
        assert_eq!(variant.to_strand(Strand::Forward), variant);
    }
}
