//! DenseNet121 classifier.
//!
//! Runs the convolutional model on a batched pixel tensor and returns the
//! dense per-class scores of its softmax head.

use crate::core::config::NeuralNetworkConfig;
use crate::core::errors::{InferenceError, InferenceResult};
use crate::core::inference::OrtInfer;
use crate::core::traits::{Capability, Classifier};
use crate::domain::{FeatureVector, ModelOutput, NUM_CLASSES};
use std::path::Path;
use tracing::{debug, info, warn};

/// Neural-network model handle.
#[derive(Debug)]
pub struct DenseNetClassifier {
    /// ONNX Runtime inference engine
    inference: OrtInfer,
    /// Output tensor holding the class scores
    output_name: String,
}

impl DenseNetClassifier {
    /// Loads the artifact at `model_path`.
    ///
    /// A declared input shape that disagrees with the configured one is only
    /// logged; the runtime rejects truly incompatible tensors on first use.
    pub fn load(config: &NeuralNetworkConfig, model_path: &Path) -> InferenceResult<Self> {
        let inference =
            OrtInfer::from_config(&config.session, model_path, config.input_name.as_deref())?;

        let output_name = match &config.output_name {
            Some(name) if inference.has_output(name) => name.clone(),
            Some(name) => {
                return Err(InferenceError::model_load::<ort::Error>(
                    model_path,
                    format!(
                        "model has no output named '{}' (outputs: {:?})",
                        name,
                        inference.output_names()
                    ),
                    Some("fix neural_network.output_name or leave it unset"),
                    None,
                ));
            }
            None => inference.output_names()[0].clone(),
        };

        if let Some(shape) = inference
            .primary_input_shape()
            .filter(|shape| !input_shape_compatible(shape, config.input_shape))
        {
            warn!(
                model = inference.model_name(),
                declared = ?shape,
                configured = ?config.input_shape,
                "declared input shape differs from configured input shape"
            );
        }

        info!(
            model = inference.model_name(),
            path = %inference.model_path().display(),
            input = inference.input_name(),
            output = %output_name,
            "DenseNet artifact inspected"
        );

        Ok(Self {
            inference,
            output_name,
        })
    }
}

/// Whether a declared `[N, H, W, C]` or `[N, C, H, W]` shape admits the
/// configured `(height, width)`. Dynamic dimensions match anything.
fn input_shape_compatible(declared: &[i64], (height, width): (u32, u32)) -> bool {
    let matches = |dim: i64, expected: u32| dim < 0 || dim == i64::from(expected);
    match declared {
        [_, a, b, c] => {
            (matches(*a, height) && matches(*b, width))
                || (matches(*b, height) && matches(*c, width))
        }
        _ => false,
    }
}

/// Checks that the score row covers every class.
fn scores_output(model_name: &str, scores: Vec<f32>) -> InferenceResult<ModelOutput> {
    if scores.len() != NUM_CLASSES {
        return Err(InferenceError::inference_mismatch(
            model_name,
            format!(
                "expected {} class scores, got {}",
                NUM_CLASSES,
                scores.len()
            ),
        ));
    }
    Ok(ModelOutput::Scores(scores))
}

impl Classifier for DenseNetClassifier {
    fn name(&self) -> &str {
        self.inference.model_name()
    }

    fn capability(&self) -> Capability {
        Capability::Scores
    }

    fn predict(&self, features: &FeatureVector) -> InferenceResult<ModelOutput> {
        let FeatureVector::Tensor(tensor) = features else {
            return Err(InferenceError::inference_mismatch(
                self.name(),
                format!("expected a pixel tensor, got a {}", features.kind_name()),
            ));
        };

        let scores = self
            .inference
            .infer_row(tensor.view().into_dyn(), &self.output_name)?;
        debug!(model = self.name(), ?scores, "raw neural network scores");
        scores_output(self.name(), scores)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::errors::FailureKind;

    #[test]
    fn test_input_shape_compatibility() {
        assert!(input_shape_compatible(&[1, 224, 224, 3], (224, 224)));
        assert!(input_shape_compatible(&[-1, 224, 224, 3], (224, 224)));
        assert!(input_shape_compatible(&[1, 3, 224, 224], (224, 224)));
        assert!(input_shape_compatible(&[-1, -1, -1, 3], (224, 224)));
        assert!(!input_shape_compatible(&[1, 299, 299, 3], (224, 224)));
        assert!(!input_shape_compatible(&[1, 150528], (224, 224)));
    }

    #[test]
    fn test_scores_must_cover_every_class() {
        assert_eq!(
            scores_output("densenet", vec![0.1, 0.2, 0.7]).unwrap(),
            ModelOutput::Scores(vec![0.1, 0.2, 0.7])
        );

        let err = scores_output("densenet", vec![0.5, 0.5]).unwrap_err();
        assert_eq!(err.kind(), FailureKind::InferenceExecution);
        assert!(err.to_string().contains("expected 3 class scores, got 2"));
    }
}
