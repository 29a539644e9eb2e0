use crate::core::dna::Nucleotide;
use crate::core::error::{Result, SquirlsError};
use crate::core::params::SplicingParameters;

/// Maximal allowed deviation of a PWM column sum from 1.
pub const EPSILON: f64 = 0.004;

const BACKGROUND: f64 = 0.25;
// Zero frequencies are floored to keep log-odds finite
const FREQUENCY_FLOOR: f64 = 1e-6;

/// Positional weight matrix stored as per-position log2-odds against a uniform background.
#[derive(Clone, Debug, PartialEq)]
pub struct PositionWeightMatrix {
    name: String,
    logodds: Vec<[f64; 4]>,
    consensus: Vec<u8>,
}

impl PositionWeightMatrix {
    /// `rows` hold nucleotide frequencies in the A, C, G, T order, one value per motif position.
    pub fn new(name: &str, rows: &[Vec<f64>]) -> Result<Self> {
        let corrupted = |reason: String| SquirlsError::CorruptedPwm { name: name.to_string(), reason };

        if rows.len() != 4 {
            return Err(corrupted(format!("expected 4 rows (A, C, G, T), got {}", rows.len())));
        }
        let width = rows[0].len();
        if width == 0 {
            return Err(corrupted("matrix has no columns".into()));
        }
        if let Some(row) = rows.iter().find(|x| x.len() != width) {
            return Err(corrupted(format!("rows have different lengths: {} vs {}", width, row.len())));
        }

        let mut logodds = Vec::with_capacity(width);
        let mut consensus = Vec::with_capacity(width);
        for pos in 0..width {
            let column = [rows[0][pos], rows[1][pos], rows[2][pos], rows[3][pos]];
            if column.iter().any(|x| !x.is_finite() || *x < 0.0) {
                return Err(corrupted(format!("column {} contains invalid frequencies {:?}", pos, column)));
            }
            let total: f64 = column.iter().sum();
            if (total - 1.0).abs() > EPSILON {
                return Err(corrupted(format!("column {} sums to {}", pos, total)));
            }

            logodds.push(column.map(|x| (x.max(FREQUENCY_FLOOR) / BACKGROUND).log2()));
            // first maximum wins
            let mut best = 0;
            for (ind, freq) in column.iter().enumerate().skip(1) {
                if *freq > column[best] {
                    best = ind;
                }
            }
            consensus.push(Nucleotide::KNOWN[best].symbol());
        }
        Ok(Self { name: name.to_string(), logodds, consensus })
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.logodds.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.logodds.is_empty()
    }

    /// Sequence made of the most frequent nucleotide at each position.
    pub fn consensus(&self) -> &[u8] {
        &self.consensus
    }

    /// Information content of the window: sum of log2(freq / 0.25) over positions.
    /// NaN if the window length differs from the matrix width or it contains non-ACGT symbols.
    pub fn score(&self, window: &[u8]) -> f64 {
        if window.len() != self.logodds.len() {
            return f64::NAN;
        }
        let mut total = 0.0;
        for (column, symbol) in self.logodds.iter().zip(window) {
            match Nucleotide::from(*symbol).index() {
                Some(ind) => total += column[ind],
                None => return f64::NAN,
            }
        }
        total
    }

    pub fn max_score(&self) -> f64 {
        self.logodds.iter().map(|x| x.iter().copied().fold(f64::NEG_INFINITY, f64::max)).sum()
    }

    /// Offset and score of the best scoring window in `seq`. Ties are resolved in favor of the
    /// lowest offset, windows with unknown symbols are skipped.
    pub fn best_window(&self, seq: &[u8]) -> Option<(usize, f64)> {
        let mut best: Option<(usize, f64)> = None;
        for (offset, window) in seq.windows(self.len()).enumerate() {
            let score = self.score(window);
            if score.is_nan() {
                continue;
            }
            match best {
                Some((_, current)) if score <= current => {}
                _ => best = Some((offset, score)),
            }
        }
        best
    }
}

/// Donor and acceptor matrices bound to the window geometry they were trained for.
#[derive(Clone, Debug, PartialEq)]
pub struct SplicingPwms {
    parameters: SplicingParameters,
    donor: PositionWeightMatrix,
    acceptor: PositionWeightMatrix,
}

impl SplicingPwms {
    pub fn new(
        parameters: SplicingParameters,
        donor: PositionWeightMatrix,
        acceptor: PositionWeightMatrix,
    ) -> Result<Self> {
        for (pwm, expected) in [(&donor, parameters.donor_length()), (&acceptor, parameters.acceptor_length())] {
            if pwm.len() as u64 != expected {
                return Err(SquirlsError::CorruptedPwm {
                    name: pwm.name().to_string(),
                    reason: format!("matrix width {} doesn't match the window length {}", pwm.len(), expected),
                });
            }
        }
        Ok(Self { parameters, donor, acceptor })
    }

    #[inline]
    pub fn parameters(&self) -> &SplicingParameters {
        &self.parameters
    }

    #[inline]
    pub fn donor(&self) -> &PositionWeightMatrix {
        &self.donor
    }

    #[inline]
    pub fn acceptor(&self) -> &PositionWeightMatrix {
        &self.acceptor
    }
}
