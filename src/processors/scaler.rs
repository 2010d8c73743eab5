//! Per-feature standardization for the classical model.
//!
//! The scaler file holds the statistics fitted on the training descriptors:
//!
//! ```json
//! { "mean": [0.12, 0.08, ...], "scale": [0.05, 0.04, ...] }
//! ```

use crate::core::errors::{InferenceError, InferenceResult};
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

/// Mismatch between a feature vector and the fitted statistics.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("scaler expects {expected} features, got {actual}")]
pub struct ScalerMismatch {
    /// Length the scaler was fitted on.
    pub expected: usize,
    /// Length of the vector passed in.
    pub actual: usize,
}

/// Standardizes features as `(x - mean) / scale`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureScaler {
    mean: Vec<f32>,
    scale: Vec<f32>,
}

impl FeatureScaler {
    /// Creates a scaler from fitted statistics.
    ///
    /// Zero scale entries (constant training features) are replaced by 1.
    pub fn new(mean: Vec<f32>, scale: Vec<f32>) -> InferenceResult<Self> {
        if mean.is_empty() {
            return Err(InferenceError::config_error("scaler mean must not be empty"));
        }
        if mean.len() != scale.len() {
            return Err(InferenceError::config_error(format!(
                "scaler mean has {} entries but scale has {}",
                mean.len(),
                scale.len()
            )));
        }
        if mean.iter().chain(&scale).any(|v| !v.is_finite()) {
            return Err(InferenceError::config_error(
                "scaler statistics must be finite",
            ));
        }
        let scale = scale
            .into_iter()
            .map(|s| if s == 0.0 { 1.0 } else { s })
            .collect();
        Ok(Self { mean, scale })
    }

    /// Loads a scaler from a JSON file.
    pub fn from_file(path: &Path) -> InferenceResult<Self> {
        let json = std::fs::read_to_string(path).map_err(|e| {
            InferenceError::model_load(path, "failed to read feature scaler", None, Some(e))
        })?;
        let raw: FeatureScaler = serde_json::from_str(&json).map_err(|e| {
            InferenceError::model_load(
                path,
                "failed to parse feature scaler",
                Some("expected {\"mean\": [...], \"scale\": [...]}"),
                Some(e),
            )
        })?;
        Self::new(raw.mean, raw.scale).map_err(|e| {
            InferenceError::model_load(path, "invalid feature scaler", None, Some(e))
        })
    }

    /// Standardizes `features` in place.
    pub fn transform(&self, features: &mut [f32]) -> Result<(), ScalerMismatch> {
        if features.len() != self.mean.len() {
            return Err(ScalerMismatch {
                expected: self.mean.len(),
                actual: features.len(),
            });
        }
        for ((x, mean), scale) in features.iter_mut().zip(&self.mean).zip(&self.scale) {
            *x = (*x - mean) / scale;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transform() {
        let scaler = FeatureScaler::new(vec![1.0, 2.0, 0.0], vec![2.0, 0.0, 0.5]).unwrap();
        let mut features = vec![3.0, 5.0, 1.0];
        scaler.transform(&mut features).unwrap();
        assert_eq!(features, vec![1.0, 3.0, 2.0]);
    }

    #[test]
    fn test_length_mismatch() {
        let scaler = FeatureScaler::new(vec![0.0; 4], vec![1.0; 4]).unwrap();
        let err = scaler.transform(&mut [0.0; 3]).unwrap_err();
        assert_eq!(
            err,
            ScalerMismatch {
                expected: 4,
                actual: 3
            }
        );
    }

    #[test]
    fn test_rejects_inconsistent_statistics() {
        assert!(FeatureScaler::new(vec![0.0; 2], vec![1.0; 3]).is_err());
        assert!(FeatureScaler::new(vec![], vec![]).is_err());
        assert!(FeatureScaler::new(vec![f32::NAN], vec![1.0]).is_err());
    }

    #[test]
    fn test_missing_file_is_load_error() {
        let err = FeatureScaler::from_file(Path::new("no/such/scaler.json")).unwrap_err();
        assert!(matches!(err, InferenceError::ModelLoad { .. }));
    }
}
