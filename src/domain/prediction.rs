//! Per-request prediction types.
//!
//! A request flows through three shapes: the [`FeatureVector`] produced by an
//! extractor, the raw [`ModelOutput`] returned by a classifier, and the
//! uniform [`PredictionResult`] handed back to the caller.

use crate::domain::ClassLabel;
use ndarray::{Array2, Array4};
use serde::Serialize;
use std::collections::BTreeMap;

/// Numeric model input.
///
/// Shape and value range are part of each family's artifact contract.
#[derive(Debug, Clone, PartialEq)]
pub enum FeatureVector {
    /// Batched pixel tensor scaled into [0, 1], `[1, H, W, C]` or `[1, C, H, W]`.
    Tensor(Array4<f32>),
    /// Batched gradient-histogram row, `[1, N]`.
    Histogram(Array2<f32>),
}

impl FeatureVector {
    /// Returns the tensor shape.
    pub fn shape(&self) -> &[usize] {
        match self {
            FeatureVector::Tensor(t) => t.shape(),
            FeatureVector::Histogram(h) => h.shape(),
        }
    }

    /// Short name of the representation, used in logs and error messages.
    pub fn kind_name(&self) -> &'static str {
        match self {
            FeatureVector::Tensor(_) => "pixel tensor",
            FeatureVector::Histogram(_) => "gradient histogram",
        }
    }
}

/// Raw classifier output before normalization.
#[derive(Debug, Clone, PartialEq)]
pub enum ModelOutput {
    /// Dense per-class scores aligned with [`ClassLabel::ALL`].
    Scores(Vec<f32>),
    /// A discrete class index with no probability estimate.
    Label(i64),
    /// A discrete class index plus per-class probabilities in [0, 1].
    LabelWithProbabilities {
        /// Class index the model voted for.
        label: i64,
        /// Per-class probabilities aligned with [`ClassLabel::ALL`].
        probabilities: Vec<f32>,
    },
}

/// Uniform prediction returned to the caller.
///
/// Created fresh per request and immutable afterwards. `probabilities` holds
/// percentages; it covers every label only when the model produced a real
/// distribution, and holds just the predicted label for label-only models.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PredictionResult {
    prediction: ClassLabel,
    confidence: Option<f32>,
    probabilities: BTreeMap<ClassLabel, f32>,
}

impl PredictionResult {
    /// Builds a result from the predicted label and a percentage mapping.
    ///
    /// Confidence is the largest percentage in the mapping, or `None` when the
    /// mapping is empty.
    pub fn new(prediction: ClassLabel, probabilities: BTreeMap<ClassLabel, f32>) -> Self {
        let confidence = probabilities.values().copied().reduce(f32::max);
        Self {
            prediction,
            confidence,
            probabilities,
        }
    }

    /// The predicted label.
    pub fn prediction(&self) -> ClassLabel {
        self.prediction
    }

    /// Confidence in percent, `None` when unknown.
    pub fn confidence(&self) -> Option<f32> {
        self.confidence
    }

    /// Per-class percentages.
    pub fn probabilities(&self) -> &BTreeMap<ClassLabel, f32> {
        &self.probabilities
    }

    /// Consumes the result into its parts.
    pub fn into_parts(self) -> (ClassLabel, Option<f32>, BTreeMap<ClassLabel, f32>) {
        (self.prediction, self.confidence, self.probabilities)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_confidence_is_max_percentage() {
        let probabilities = BTreeMap::from([
            (ClassLabel::Benign, 70.0),
            (ClassLabel::Malignant, 20.0),
            (ClassLabel::Normal, 10.0),
        ]);
        let result = PredictionResult::new(ClassLabel::Benign, probabilities);
        assert_eq!(result.confidence(), Some(70.0));
    }

    #[test]
    fn test_empty_mapping_has_unknown_confidence() {
        let result = PredictionResult::new(ClassLabel::Normal, BTreeMap::new());
        assert_eq!(result.confidence(), None);
        assert!(result.probabilities().is_empty());
    }

    #[test]
    fn test_feature_vector_shape() {
        let features = FeatureVector::Histogram(Array2::zeros((1, 512)));
        assert_eq!(features.shape(), &[1, 512]);
        assert_eq!(features.kind_name(), "gradient histogram");
    }
}
