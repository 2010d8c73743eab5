//! Error types for the inference pipeline.
//!
//! Every failure a request can hit is one variant of [`InferenceError`]. The
//! dispatcher never lets one escape as a panic: callers get the error back,
//! and [`InferenceError::kind`] collapses it onto the small [`FailureKind`]
//! set that the response surface exposes.
//!
//! # Usage
//!
//! ```rust
//! use breast_aware::core::errors::{FailureKind, InferenceError};
//!
//! let error = InferenceError::unknown_model("random-model");
//! assert_eq!(error.kind(), FailureKind::UnknownModel);
//!
//! let error = InferenceError::feature_extraction(
//!     "hog",
//!     "image is smaller than a single cell",
//! );
//! assert_eq!(error.kind(), FailureKind::FeatureExtraction);
//! ```

use crate::domain::ModelFamily;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Boxed source error carried by variants that wrap foreign failures.
pub type BoxedError = Box<dyn std::error::Error + Send + Sync>;

/// Convenient result alias for inference operations.
pub type InferenceResult<T> = Result<T, InferenceError>;

/// Coarse failure category reported to callers.
///
/// The variants let a caller tell bad input apart from missing
/// infrastructure and from runtime faults.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    /// The submitted bytes are not a decodable image.
    ImageDecode,
    /// A valid image could not be turned into model features.
    FeatureExtraction,
    /// The model identifier is not registered.
    UnknownModel,
    /// The requested model family failed to load.
    ModelUnavailable,
    /// The model ran but prediction failed.
    InferenceExecution,
    /// The service itself is misconfigured.
    Configuration,
}

impl std::fmt::Display for FailureKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FailureKind::ImageDecode => write!(f, "image decode"),
            FailureKind::FeatureExtraction => write!(f, "feature extraction"),
            FailureKind::UnknownModel => write!(f, "unknown model"),
            FailureKind::ModelUnavailable => write!(f, "model unavailable"),
            FailureKind::InferenceExecution => write!(f, "inference execution"),
            FailureKind::Configuration => write!(f, "configuration"),
        }
    }
}

/// Enum representing every error the inference core can produce.
#[derive(Error, Debug)]
pub enum InferenceError {
    /// The input bytes could not be decoded as an image.
    #[error("image decode: {message}")]
    ImageDecode {
        /// What went wrong.
        message: String,
        /// Decoder error, when the `image` crate produced one.
        #[source]
        source: Option<image::ImageError>,
    },

    /// Feature extraction failed on an otherwise valid image.
    #[error("feature extraction failed in {stage}: {message}")]
    FeatureExtraction {
        /// Extraction stage that failed (e.g. `hog`, `resize`).
        stage: &'static str,
        /// What went wrong.
        message: String,
    },

    /// The caller asked for a model identifier that is not registered.
    #[error("unknown model id '{model_id}'")]
    UnknownModel {
        /// The identifier as supplied by the caller.
        model_id: String,
    },

    /// The model family is known but its artifact is not loaded.
    #[error("{family} model not available: {reason}")]
    ModelUnavailable {
        /// The family that cannot serve requests.
        family: ModelFamily,
        /// The recorded load failure.
        reason: String,
    },

    /// The model ran but prediction failed.
    #[error("inference failed for model '{model_name}': {context}")]
    InferenceExecution {
        /// Name of the model that failed.
        model_name: String,
        /// Additional context about the failure.
        context: String,
        /// The underlying runtime error, if any.
        #[source]
        source: Option<BoxedError>,
    },

    /// A model artifact could not be loaded from disk.
    #[error("failed to load model from '{}': {context}{}", path.display(), suggestion.as_deref().map(|s| format!(" ({s})")).unwrap_or_default())]
    ModelLoad {
        /// Path of the artifact.
        path: PathBuf,
        /// What went wrong.
        context: String,
        /// Hint for the operator.
        suggestion: Option<String>,
        /// The underlying loader error, if any.
        #[source]
        source: Option<BoxedError>,
    },

    /// Invalid configuration.
    #[error("configuration: {message}")]
    Config {
        /// A message describing the configuration error.
        message: String,
    },

    /// IO error while reading configuration or auxiliary files.
    #[error("io: {0}")]
    Io(#[from] std::io::Error),
}

impl InferenceError {
    /// Returns the caller-facing category of this error.
    pub fn kind(&self) -> FailureKind {
        match self {
            InferenceError::ImageDecode { .. } => FailureKind::ImageDecode,
            InferenceError::FeatureExtraction { .. } => FailureKind::FeatureExtraction,
            InferenceError::UnknownModel { .. } => FailureKind::UnknownModel,
            InferenceError::ModelUnavailable { .. } | InferenceError::ModelLoad { .. } => {
                FailureKind::ModelUnavailable
            }
            InferenceError::InferenceExecution { .. } => FailureKind::InferenceExecution,
            InferenceError::Config { .. } | InferenceError::Io(_) => FailureKind::Configuration,
        }
    }

    /// Creates an error for input that is not an image.
    pub fn image_decode(message: impl Into<String>) -> Self {
        Self::ImageDecode {
            message: message.into(),
            source: None,
        }
    }

    /// Wraps a decoder error from the `image` crate.
    pub fn image_decode_with(error: image::ImageError) -> Self {
        Self::ImageDecode {
            message: error.to_string(),
            source: Some(error),
        }
    }

    /// Creates an error for a failed extraction stage.
    pub fn feature_extraction(stage: &'static str, message: impl Into<String>) -> Self {
        Self::FeatureExtraction {
            stage,
            message: message.into(),
        }
    }

    /// Creates an error for an unrecognized model identifier.
    pub fn unknown_model(model_id: impl Into<String>) -> Self {
        Self::UnknownModel {
            model_id: model_id.into(),
        }
    }

    /// Creates an error for a family whose artifact failed to load.
    pub fn model_unavailable(family: ModelFamily, reason: impl Into<String>) -> Self {
        Self::ModelUnavailable {
            family,
            reason: reason.into(),
        }
    }

    /// Creates an error for a failed prediction with the runtime error attached.
    pub fn inference_execution(
        model_name: &str,
        context: impl Into<String>,
        error: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::InferenceExecution {
            model_name: model_name.to_string(),
            context: context.into(),
            source: Some(Box::new(error)),
        }
    }

    /// Creates an error for a failed prediction that has no underlying source,
    /// such as an output of the wrong shape.
    pub fn inference_mismatch(model_name: &str, context: impl Into<String>) -> Self {
        Self::InferenceExecution {
            model_name: model_name.to_string(),
            context: context.into(),
            source: None,
        }
    }

    /// Creates an error for an artifact that could not be loaded.
    ///
    /// # Arguments
    ///
    /// * `path` - Artifact location.
    /// * `context` - What failed.
    /// * `suggestion` - Optional hint for the operator.
    /// * `error` - Optional underlying error.
    pub fn model_load<E>(
        path: &Path,
        context: impl Into<String>,
        suggestion: Option<&str>,
        error: Option<E>,
    ) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::ModelLoad {
            path: path.to_path_buf(),
            context: context.into(),
            suggestion: suggestion.map(str::to_string),
            source: error.map(|e| Box::new(e) as BoxedError),
        }
    }

    /// Creates an error for configuration problems.
    pub fn config_error(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Creates a configuration error naming the offending field.
    pub fn config_error_with_context(field: &str, value: &str, reason: &str) -> Self {
        Self::Config {
            message: format!(
                "Configuration error in field '{}' with value '{}': {}",
                field, value, reason
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_mapping() {
        assert_eq!(
            InferenceError::image_decode("empty").kind(),
            FailureKind::ImageDecode
        );
        assert_eq!(
            InferenceError::model_unavailable(ModelFamily::Svm, "missing").kind(),
            FailureKind::ModelUnavailable
        );
        assert_eq!(
            InferenceError::model_load::<std::io::Error>(
                Path::new("models/x.onnx"),
                "failed",
                None,
                None
            )
            .kind(),
            FailureKind::ModelUnavailable
        );
        assert_eq!(
            InferenceError::inference_mismatch("svm", "bad shape").kind(),
            FailureKind::InferenceExecution
        );
        assert_eq!(
            InferenceError::config_error("zero").kind(),
            FailureKind::Configuration
        );
    }

    #[test]
    fn test_io_message_keeps_cause() {
        let error = InferenceError::from(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            "scan.png: no such file",
        ));
        assert_eq!(error.kind(), FailureKind::Configuration);
        assert_eq!(error.to_string(), "io: scan.png: no such file");
    }

    #[test]
    fn test_model_load_message_includes_suggestion() {
        let error = InferenceError::model_load::<std::io::Error>(
            Path::new("models/densenet.onnx"),
            "failed to create ONNX session",
            Some("verify the model file exists"),
            None,
        );
        let message = error.to_string();
        assert!(message.contains("models/densenet.onnx"));
        assert!(message.contains("verify the model file exists"));
    }

    #[test]
    fn test_failure_kind_serializes_snake_case() {
        let json = serde_json::to_string(&FailureKind::ModelUnavailable).unwrap();
        assert_eq!(json, "\"model_unavailable\"");
    }
}
