use derive_getters::Getters;
use derive_more::Constructor;

/// Output of a single thresholded sub-model.
#[derive(Clone, Debug, PartialEq, Constructor, Getters)]
pub struct PartialPrediction {
    name: String,
    probability: f64,
    threshold: f64,
}

impl PartialPrediction {
    #[inline]
    pub fn is_pathogenic(&self) -> bool {
        self.probability > self.threshold
    }
}

/// Combined sub-model predictions for a single variant/transcript pair.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Prediction {
    partials: Vec<PartialPrediction>,
}

impl Prediction {
    pub fn new(partials: Vec<PartialPrediction>) -> Self {
        Self { partials }
    }

    /// Prediction without any partials, produced when the features are incomplete.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn add(&mut self, partial: PartialPrediction) {
        self.partials.push(partial);
    }

    pub fn clear(&mut self) {
        self.partials.clear();
    }

    #[inline]
    pub fn partials(&self) -> &[PartialPrediction] {
        &self.partials
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.partials.is_empty()
    }

    pub fn is_positive(&self) -> bool {
        self.partials.iter().any(PartialPrediction::is_pathogenic)
    }

    /// Maximal probability across partials, NaN if there are none.
    pub fn max_pathogenicity(&self) -> f64 {
        self.partials.iter().map(|x| x.probability).reduce(f64::max).unwrap_or(f64::NAN)
    }
}
