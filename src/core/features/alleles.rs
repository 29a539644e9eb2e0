//! Reference and alternate allele snippets. Positions are on the strand of the sequence and
//! the variant, which must match.

use bio_types::genome::Position;

use crate::core::genome::{StrandedSequence, Variant};

/// Reference bases of the variant with `padding` bases on both sides.
pub fn ref_snippet(sequence: &StrandedSequence, variant: &Variant, padding: Position) -> Option<Vec<u8>> {
    let start = variant.start().checked_sub(padding)?;
    sequence.subsequence(start..variant.end() + padding).map(|x| x.to_vec())
}

/// Alternate allele with `padding` reference bases on both sides.
pub fn alt_snippet(sequence: &StrandedSequence, variant: &Variant, padding: Position) -> Option<Vec<u8>> {
    let start = variant.start().checked_sub(padding)?;
    let upstream = sequence.subsequence(start..variant.start())?;
    let downstream = sequence.subsequence(variant.end()..variant.end() + padding)?;
    Some([upstream, variant.alternate(), downstream].concat())
}

/// Position of the reference coordinate `anchor` in the sequence with the alternate allele applied.
/// Anchors inside the replaced reference bases are clipped to the alternate allele.
pub fn alt_coordinate(variant: &Variant, anchor: Position) -> Position {
    let (start, end) = (variant.start(), variant.end());
    let altlen = variant.alternate().len() as Position;
    if anchor <= start {
        anchor
    } else if anchor >= end {
        anchor + altlen - (end - start)
    } else {
        start + (anchor - start).min(altlen)
    }
}

/// Base at the alternate sequence coordinate `pos`.
pub fn alt_base(sequence: &StrandedSequence, variant: &Variant, pos: Position) -> Option<u8> {
    let start = variant.start();
    let alternate = variant.alternate();
    let altlen = alternate.len() as Position;
    if pos < start {
        sequence.base(pos)
    } else if pos < start + altlen {
        Some(alternate[(pos - start) as usize])
    } else {
        sequence.base(pos - altlen + variant.reference().len() as Position)
    }
}

/// Window of the alternate sequence spanning `upstream` bases before and `downstream` bases after
/// the reference coordinate `anchor` (e.g. an exon/intron boundary).
pub fn alt_window(
    sequence: &StrandedSequence,
    variant: &Variant,
    anchor: Position,
    upstream: Position,
    downstream: Position,
) -> Option<Vec<u8>> {
    let anchor = alt_coordinate(variant, anchor);
    let start = anchor.checked_sub(upstream)?;
    (start..anchor + downstream).map(|pos| alt_base(sequence, variant, pos)).collect()
}
