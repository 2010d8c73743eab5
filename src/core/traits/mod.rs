//! Traits at the seams of the inference pipeline.
//!
//! ```text
//! ┌────────────────┐    ┌────────────┐    ┌────────────┐
//! │FeatureExtractor│───▶│ Classifier │───▶│ Normalizer │
//! │• extract       │    │• predict   │    │• normalize │
//! └────────────────┘    └────────────┘    └────────────┘
//! ```
//!
//! Extractors are pure functions of the image bytes. Classifiers wrap a loaded
//! artifact and are shared across threads once loaded, so both require
//! `Send + Sync`.

use crate::core::errors::InferenceResult;
use crate::domain::{FeatureVector, ModelOutput};
use std::fmt::Debug;

/// Turns encoded image bytes into the numeric input of one model family.
pub trait FeatureExtractor: Send + Sync + Debug {
    /// Decodes `image_bytes` and computes the feature vector.
    ///
    /// Undecodable input yields [`InferenceError::ImageDecode`]; a valid image
    /// that cannot be processed yields [`InferenceError::FeatureExtraction`].
    ///
    /// [`InferenceError::ImageDecode`]: crate::core::errors::InferenceError::ImageDecode
    /// [`InferenceError::FeatureExtraction`]: crate::core::errors::InferenceError::FeatureExtraction
    fn extract(&self, image_bytes: &[u8]) -> InferenceResult<FeatureVector>;

    /// Shape of the vectors this extractor produces.
    fn output_shape(&self) -> Vec<usize>;
}

/// What a classifier can report besides its decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Capability {
    /// Dense per-class scores.
    Scores,
    /// A discrete label only.
    LabelOnly,
    /// A discrete label plus per-class probabilities.
    LabelWithProbabilities,
}

/// A loaded model artifact.
pub trait Classifier: Send + Sync + Debug {
    /// Model name used in logs and errors.
    fn name(&self) -> &str;

    /// Output capability, fixed at load time.
    fn capability(&self) -> Capability;

    /// Runs one prediction.
    ///
    /// Any runtime failure is reported as
    /// [`InferenceError::InferenceExecution`](crate::core::errors::InferenceError::InferenceExecution).
    fn predict(&self, features: &FeatureVector) -> InferenceResult<ModelOutput>;
}
