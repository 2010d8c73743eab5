//! Support vector machine classifier.
//!
//! The SVM is served from an ONNX export with an `i64` label output and, when
//! it was trained with probability estimates, an `f32` probability output.
//! Which of the two shapes the artifact has is decided once, at load time.

use crate::core::config::SvmConfig;
use crate::core::errors::{InferenceError, InferenceResult};
use crate::core::inference::{OrtInfer, OutputTensor, OutputType, first_row};
use crate::core::traits::{Capability, Classifier};
use crate::domain::{FeatureVector, ModelOutput};
use crate::processors::FeatureScaler;
use ndarray::Array2;
use std::path::Path;
use tracing::{debug, info};

/// Classical model handle.
#[derive(Debug)]
pub struct SvmClassifier {
    /// ONNX Runtime inference engine
    inference: OrtInfer,
    /// Name of the label output
    label_output: String,
    /// Name of the probability output, if the artifact has one
    probability_output: Option<String>,
    /// Standardization applied before prediction
    scaler: Option<FeatureScaler>,
}

impl SvmClassifier {
    /// Loads the artifact at `model_path` and the optional scaler.
    pub fn load(
        config: &SvmConfig,
        model_path: &Path,
        scaler_path: Option<&Path>,
    ) -> InferenceResult<Self> {
        let inference =
            OrtInfer::from_config(&config.session, model_path, config.input_name.as_deref())?;

        if !inference.has_output(&config.label_output) {
            return Err(InferenceError::model_load::<ort::Error>(
                model_path,
                format!(
                    "model has no label output '{}' (outputs: {:?})",
                    config.label_output,
                    inference.output_names()
                ),
                Some("fix svm.label_output"),
                None,
            ));
        }

        let probability_output =
            detect_probability_output(inference.output_names(), &config.probability_output);
        let scaler = scaler_path.map(FeatureScaler::from_file).transpose()?;

        info!(
            model = inference.model_name(),
            path = %inference.model_path().display(),
            input = inference.input_name(),
            capability = ?capability_of(probability_output.as_deref()),
            scaled = scaler.is_some(),
            "SVM artifact inspected"
        );

        Ok(Self {
            inference,
            label_output: config.label_output.clone(),
            probability_output,
            scaler,
        })
    }
}

/// Returns the configured probability output if the artifact declares it.
fn detect_probability_output(output_names: &[String], configured: &str) -> Option<String> {
    output_names
        .iter()
        .any(|name| name == configured)
        .then(|| configured.to_string())
}

fn capability_of(probability_output: Option<&str>) -> Capability {
    match probability_output {
        Some(_) => Capability::LabelWithProbabilities,
        None => Capability::LabelOnly,
    }
}

/// Applies the scaler, if any, to a `[1, N]` histogram.
fn scale_histogram(
    model_name: &str,
    scaler: Option<&FeatureScaler>,
    histogram: &Array2<f32>,
) -> InferenceResult<Array2<f32>> {
    let Some(scaler) = scaler else {
        return Ok(histogram.clone());
    };
    let mut values: Vec<f32> = histogram.iter().copied().collect();
    scaler.transform(&mut values).map_err(|e| {
        InferenceError::inference_execution(model_name, "feature scaling failed", e)
    })?;
    Array2::from_shape_vec(histogram.raw_dim(), values).map_err(|e| {
        InferenceError::inference_execution(model_name, "scaled feature reshape failed", e)
    })
}

/// Turns the run results (label first, then probabilities when requested)
/// into a [`ModelOutput`].
fn decode_outputs(
    model_name: &str,
    label_output: &str,
    probability_output: Option<&str>,
    outputs: Vec<OutputTensor>,
) -> InferenceResult<ModelOutput> {
    let mut outputs = outputs.into_iter();

    let label = match outputs.next() {
        Some(OutputTensor::I64 { shape, data }) => match data.as_slice() {
            [label] => *label,
            _ => {
                return Err(InferenceError::inference_mismatch(
                    model_name,
                    format!("expected one label, got shape {shape:?}"),
                ));
            }
        },
        _ => {
            return Err(InferenceError::inference_mismatch(
                model_name,
                format!("label output '{label_output}' is not an i64 tensor"),
            ));
        }
    };

    match (probability_output, outputs.next()) {
        (None, _) => Ok(ModelOutput::Label(label)),
        (Some(name), Some(OutputTensor::F32 { shape, data })) => {
            let probabilities = first_row(model_name, name, &shape, data)?;
            Ok(ModelOutput::LabelWithProbabilities {
                label,
                probabilities,
            })
        }
        (Some(name), _) => Err(InferenceError::inference_mismatch(
            model_name,
            format!("probability output '{name}' is not an f32 tensor"),
        )),
    }
}

impl Classifier for SvmClassifier {
    fn name(&self) -> &str {
        self.inference.model_name()
    }

    fn capability(&self) -> Capability {
        capability_of(self.probability_output.as_deref())
    }

    fn predict(&self, features: &FeatureVector) -> InferenceResult<ModelOutput> {
        let FeatureVector::Histogram(histogram) = features else {
            return Err(InferenceError::inference_mismatch(
                self.name(),
                format!("expected a gradient histogram, got a {}", features.kind_name()),
            ));
        };
        let input = scale_histogram(self.name(), self.scaler.as_ref(), histogram)?;

        let mut requested = vec![(self.label_output.as_str(), OutputType::I64)];
        if let Some(name) = &self.probability_output {
            requested.push((name.as_str(), OutputType::F32));
        }
        let outputs = self.inference.run(input.view().into_dyn(), &requested)?;

        let output = decode_outputs(
            self.name(),
            &self.label_output,
            self.probability_output.as_deref(),
            outputs,
        )?;
        debug!(model = self.name(), ?output, "raw SVM output");
        Ok(output)
    }
}
