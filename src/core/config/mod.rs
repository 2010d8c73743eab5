//! Configuration for the inference service.
//!
//! Every field has a default, so an empty JSON object is a valid
//! configuration that looks for artifacts under `./models`.
//!
//! ```rust
//! use breast_aware::core::config::ServiceConfig;
//!
//! let config = ServiceConfig::from_json_str(r#"{ "models_dir": "/srv/models" }"#).unwrap();
//! assert_eq!(
//!     config.neural_network_model_path(),
//!     std::path::Path::new("/srv/models/densenet121_model.onnx"),
//! );
//! ```

pub mod onnx;

pub use onnx::*;

use crate::core::errors::{InferenceError, InferenceResult};
use crate::processors::{ChannelOrder, ResizeFilter};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Default upper bound on accepted image size (20 MiB).
pub const DEFAULT_MAX_IMAGE_BYTES: usize = 20 * 1024 * 1024;

/// How raw neural-network scores are treated before normalization.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScorePolicy {
    /// Use scores as-is.
    Trust,
    /// Check that scores form a distribution; apply softmax when they do not.
    #[default]
    Verify,
}

/// Top-level service configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    /// Directory holding both model artifacts.
    pub models_dir: PathBuf,
    /// Largest accepted image payload in bytes.
    pub max_image_bytes: usize,
    /// Treatment of neural-network scores.
    pub score_policy: ScorePolicy,
    /// Deep-learning family settings.
    pub neural_network: NeuralNetworkConfig,
    /// Classical family settings.
    pub svm: SvmConfig,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            models_dir: PathBuf::from("./models"),
            max_image_bytes: DEFAULT_MAX_IMAGE_BYTES,
            score_policy: ScorePolicy::default(),
            neural_network: NeuralNetworkConfig::default(),
            svm: SvmConfig::default(),
        }
    }
}

/// Settings for the convolutional model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NeuralNetworkConfig {
    /// Artifact file name, relative to `models_dir` unless absolute.
    pub model_file: PathBuf,
    /// Input shape (height, width).
    pub input_shape: (u32, u32),
    /// Resize interpolation.
    pub resize_filter: ResizeFilter,
    /// Layout of the input tensor.
    pub channel_order: ChannelOrder,
    /// Input tensor name; discovered from the session when unset.
    pub input_name: Option<String>,
    /// Output tensor name; the first session output when unset.
    pub output_name: Option<String>,
    /// ONNX Runtime session options.
    pub session: OrtSessionConfig,
}

impl Default for NeuralNetworkConfig {
    fn default() -> Self {
        Self {
            model_file: PathBuf::from("densenet121_model.onnx"),
            input_shape: (224, 224),
            resize_filter: ResizeFilter::CatmullRom,
            channel_order: ChannelOrder::HWC,
            input_name: None,
            output_name: None,
            session: OrtSessionConfig::default(),
        }
    }
}

/// Settings for the support vector machine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SvmConfig {
    /// Artifact file name, relative to `models_dir` unless absolute.
    pub model_file: PathBuf,
    /// Optional standard-scaler file (`{"mean": [...], "scale": [...]}`).
    pub scaler_file: Option<PathBuf>,
    /// Input tensor name; discovered from the session when unset.
    pub input_name: Option<String>,
    /// Name of the `i64` label output.
    pub label_output: String,
    /// Name of the `f32` probability output, when the model has one.
    pub probability_output: String,
    /// Gradient-histogram geometry.
    pub hog: HogConfig,
    /// ONNX Runtime session options.
    pub session: OrtSessionConfig,
}

impl Default for SvmConfig {
    fn default() -> Self {
        Self {
            model_file: PathBuf::from("breast_cancer_svm_model.onnx"),
            scaler_file: None,
            input_name: None,
            label_output: "label".to_string(),
            probability_output: "probabilities".to_string(),
            hog: HogConfig::default(),
            session: OrtSessionConfig::default(),
        }
    }
}

/// Per-block normalization applied to the gradient histogram.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BlockNorm {
    /// Plain L2 normalization.
    L2,
    /// L2, clip every value at 0.2, then L2 again.
    #[default]
    L2Hys,
}

/// Gradient-histogram geometry.
///
/// Defaults follow the training-time descriptor: 128x128 input, 8 unsigned
/// bins, 16-pixel cells, 1x1-cell blocks and L2-Hys block normalization.
///
/// Orientation binning comes from [`imageproc::hog`], which splits each
/// gradient between the two nearest bins. Training used hard assignment to a
/// single bin, so per-bin values differ slightly even with identical geometry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HogConfig {
    /// Resize target (height, width).
    pub input_shape: (u32, u32),
    /// Number of orientation bins.
    pub orientations: usize,
    /// Use signed (0-360) rather than unsigned (0-180) gradients.
    pub signed: bool,
    /// Cell side in pixels.
    pub cell_side: usize,
    /// Block side in cells.
    pub block_side: usize,
    /// Block stride in cells.
    pub block_stride: usize,
    /// Block normalization scheme.
    pub block_norm: BlockNorm,
    /// Resize interpolation.
    pub resize_filter: ResizeFilter,
}

impl Default for HogConfig {
    fn default() -> Self {
        Self {
            input_shape: (128, 128),
            orientations: 8,
            signed: false,
            cell_side: 16,
            block_side: 1,
            block_stride: 1,
            block_norm: BlockNorm::L2Hys,
            resize_filter: ResizeFilter::CatmullRom,
        }
    }
}

impl HogConfig {
    /// Number of values in the descriptor, or `None` when the geometry
    /// cannot produce one.
    pub fn descriptor_len(&self) -> Option<usize> {
        let (height, width) = (self.input_shape.0 as usize, self.input_shape.1 as usize);
        if self.cell_side == 0 || self.block_side == 0 || self.block_stride == 0 {
            return None;
        }
        if width % self.cell_side != 0 || height % self.cell_side != 0 {
            return None;
        }
        let cells_wide = width / self.cell_side;
        let cells_high = height / self.cell_side;
        if cells_wide < self.block_side || cells_high < self.block_side {
            return None;
        }
        if (cells_wide - self.block_side) % self.block_stride != 0
            || (cells_high - self.block_side) % self.block_stride != 0
        {
            return None;
        }
        let blocks_wide = (cells_wide - self.block_side) / self.block_stride + 1;
        let blocks_high = (cells_high - self.block_side) / self.block_stride + 1;
        Some(blocks_wide * blocks_high * self.block_side * self.block_side * self.orientations)
    }
}

impl ServiceConfig {
    /// Parses and validates a JSON configuration.
    pub fn from_json_str(json: &str) -> InferenceResult<Self> {
        let config: Self = serde_json::from_str(json)
            .map_err(|e| InferenceError::config_error(format!("invalid JSON: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    /// Reads, parses and validates a JSON configuration file.
    pub fn from_file(path: impl AsRef<Path>) -> InferenceResult<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)?;
        Self::from_json_str(&json).map_err(|e| match e {
            InferenceError::Config { message } => {
                InferenceError::config_error(format!("{}: {message}", path.display()))
            }
            other => other,
        })
    }

    /// Resolved path of the neural-network artifact.
    pub fn neural_network_model_path(&self) -> PathBuf {
        self.models_dir.join(&self.neural_network.model_file)
    }

    /// Resolved path of the SVM artifact.
    pub fn svm_model_path(&self) -> PathBuf {
        self.models_dir.join(&self.svm.model_file)
    }

    /// Resolved path of the SVM feature scaler, if configured.
    pub fn svm_scaler_path(&self) -> Option<PathBuf> {
        self.svm
            .scaler_file
            .as_ref()
            .map(|file| self.models_dir.join(file))
    }

    /// Checks the configuration for values that can never work.
    pub fn validate(&self) -> InferenceResult<()> {
        if self.max_image_bytes == 0 {
            return Err(InferenceError::config_error_with_context(
                "max_image_bytes",
                "0",
                "must be greater than 0",
            ));
        }

        let nn = &self.neural_network;
        if nn.model_file.as_os_str().is_empty() {
            return Err(InferenceError::config_error(
                "neural_network.model_file must not be empty",
            ));
        }
        if nn.input_shape.0 == 0 || nn.input_shape.1 == 0 {
            return Err(InferenceError::config_error_with_context(
                "neural_network.input_shape",
                &format!("{:?}", nn.input_shape),
                "dimensions must be greater than 0",
            ));
        }
        validate_session("neural_network.session", &nn.session)?;

        let svm = &self.svm;
        if svm.model_file.as_os_str().is_empty() {
            return Err(InferenceError::config_error(
                "svm.model_file must not be empty",
            ));
        }
        if svm.label_output.is_empty() {
            return Err(InferenceError::config_error(
                "svm.label_output must not be empty",
            ));
        }
        if svm.hog.orientations == 0 {
            return Err(InferenceError::config_error_with_context(
                "svm.hog.orientations",
                "0",
                "must be greater than 0",
            ));
        }
        if svm.hog.descriptor_len().is_none() {
            return Err(InferenceError::config_error_with_context(
                "svm.hog",
                &format!("{:?}", svm.hog),
                "input shape must be divisible into cells and fit at least one block",
            ));
        }
        validate_session("svm.session", &svm.session)?;

        Ok(())
    }
}

fn validate_session(field: &str, session: &OrtSessionConfig) -> InferenceResult<()> {
    if session.session_pool_size == 0 {
        return Err(InferenceError::config_error_with_context(
            &format!("{field}.session_pool_size"),
            "0",
            "must be at least 1",
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_json_is_default() {
        let config = ServiceConfig::from_json_str("{}").unwrap();
        assert_eq!(config, ServiceConfig::default());
        assert_eq!(
            config.neural_network_model_path(),
            Path::new("./models/densenet121_model.onnx")
        );
        assert_eq!(
            config.svm_model_path(),
            Path::new("./models/breast_cancer_svm_model.onnx")
        );
        assert_eq!(config.svm_scaler_path(), None);
    }

    #[test]
    fn test_partial_override() {
        let config = ServiceConfig::from_json_str(
            r#"{
                "score_policy": "trust",
                "neural_network": { "channel_order": "CHW", "session": { "session_pool_size": 4 } },
                "svm": { "scaler_file": "scaler.json", "hog": { "orientations": 9 } }
            }"#,
        )
        .unwrap();

        assert_eq!(config.score_policy, ScorePolicy::Trust);
        assert_eq!(config.neural_network.channel_order, ChannelOrder::CHW);
        assert_eq!(config.neural_network.input_shape, (224, 224));
        assert_eq!(config.neural_network.session.session_pool_size, 4);
        assert_eq!(config.svm.hog.orientations, 9);
        assert_eq!(config.svm.hog.cell_side, 16);
        assert_eq!(
            config.svm_scaler_path(),
            Some(PathBuf::from("./models/scaler.json"))
        );
    }

    #[test]
    fn test_default_descriptor_length() {
        assert_eq!(HogConfig::default().descriptor_len(), Some(512));
    }

    #[test]
    fn test_block_norm_defaults_to_l2_hys() {
        assert_eq!(HogConfig::default().block_norm, BlockNorm::L2Hys);
        let config =
            ServiceConfig::from_json_str(r#"{ "svm": { "hog": { "block_norm": "l2" } } }"#)
                .unwrap();
        assert_eq!(config.svm.hog.block_norm, BlockNorm::L2);
    }

    #[test]
    fn test_rejects_hog_geometry_without_cells() {
        let err = ServiceConfig::from_json_str(r#"{ "svm": { "hog": { "input_shape": [8, 8] } } }"#)
            .unwrap_err();
        assert!(err.to_string().contains("svm.hog"));
    }

    #[test]
    fn test_rejects_zero_pool_size() {
        let mut config = ServiceConfig::default();
        config.svm.session.session_pool_size = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_rejects_malformed_json() {
        let err = ServiceConfig::from_json_str("{ not json").unwrap_err();
        assert!(matches!(err, InferenceError::Config { .. }));
    }
}
