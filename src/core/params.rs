use std::ops::Range;

use bio_types::genome::Position;
use serde::Deserialize;

use crate::core::error::{Result, SquirlsError};

/// Geometry of the donor and acceptor windows around the exon/intron boundaries.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
pub struct SplicingParameters {
    donor_exonic: Position,
    donor_intronic: Position,
    acceptor_exonic: Position,
    acceptor_intronic: Position,
}

impl SplicingParameters {
    pub fn new(
        donor_exonic: Position,
        donor_intronic: Position,
        acceptor_exonic: Position,
        acceptor_intronic: Position,
    ) -> Result<Self> {
        let params = Self { donor_exonic, donor_intronic, acceptor_exonic, acceptor_intronic };
        params.validate()?;
        Ok(params)
    }

    pub fn validate(&self) -> Result<()> {
        if self.donor_length() == 0 || self.acceptor_length() == 0 {
            return Err(SquirlsError::InvalidParameters(format!(
                "donor and acceptor windows must not be empty: {:?}",
                self
            )));
        }
        Ok(())
    }

    #[inline]
    pub fn donor_exonic(&self) -> Position {
        self.donor_exonic
    }

    #[inline]
    pub fn donor_intronic(&self) -> Position {
        self.donor_intronic
    }

    #[inline]
    pub fn acceptor_exonic(&self) -> Position {
        self.acceptor_exonic
    }

    #[inline]
    pub fn acceptor_intronic(&self) -> Position {
        self.acceptor_intronic
    }

    #[inline]
    pub fn donor_length(&self) -> Position {
        self.donor_exonic + self.donor_intronic
    }

    #[inline]
    pub fn acceptor_length(&self) -> Position {
        self.acceptor_exonic + self.acceptor_intronic
    }

    /// Donor window around the exon|intron boundary at `anchor`.
    #[inline]
    pub fn donor_window(&self, anchor: Position) -> Range<Position> {
        anchor.saturating_sub(self.donor_exonic)..anchor + self.donor_intronic
    }

    /// Acceptor window around the intron|exon boundary at `anchor`.
    #[inline]
    pub fn acceptor_window(&self, anchor: Position) -> Range<Position> {
        anchor.saturating_sub(self.acceptor_intronic)..anchor + self.acceptor_exonic
    }
}

impl Default for SplicingParameters {
    fn default() -> Self {
        Self { donor_exonic: 3, donor_intronic: 6, acceptor_exonic: 2, acceptor_intronic: 25 }
    }
}
