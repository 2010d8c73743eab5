//! Caller-facing response shapes.
//!
//! These mirror the JSON documents the surrounding service layer returns:
//! one per prediction request and one for the health check.

use crate::core::errors::{FailureKind, InferenceError};
use crate::domain::{ClassLabel, ModelFamily, PredictionResult};
use serde::Serialize;
use std::collections::BTreeMap;

/// Outcome of a single prediction request.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InferenceResponse {
    /// Whether a prediction was produced.
    pub success: bool,
    /// Prediction fields on success, error fields on failure.
    #[serde(flatten)]
    pub body: ResponseBody,
    /// The model identifier exactly as the caller supplied it.
    pub model_name: String,
}

/// Variant part of an [`InferenceResponse`].
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ResponseBody {
    /// A successful prediction.
    Prediction {
        /// Predicted label.
        prediction: ClassLabel,
        /// Confidence in percent; `null` when unknown.
        confidence: Option<f32>,
        /// Per-class percentages.
        probabilities: BTreeMap<ClassLabel, f32>,
    },
    /// A rejected request.
    Failure {
        /// Human-readable message.
        error: String,
        /// Failure category.
        #[serde(rename = "errorKind")]
        error_kind: FailureKind,
    },
}

impl InferenceResponse {
    /// Builds a positive response.
    pub fn success(model_id: impl Into<String>, result: PredictionResult) -> Self {
        let (prediction, confidence, probabilities) = result.into_parts();
        Self {
            success: true,
            body: ResponseBody::Prediction {
                prediction,
                confidence,
                probabilities,
            },
            model_name: model_id.into(),
        }
    }

    /// Builds a negative response from a typed failure.
    pub fn failure(model_id: impl Into<String>, error: &InferenceError) -> Self {
        Self {
            success: false,
            body: ResponseBody::Failure {
                error: error.to_string(),
                error_kind: error.kind(),
            },
            model_name: model_id.into(),
        }
    }

    /// Returns the failure category of a negative response.
    pub fn error_kind(&self) -> Option<FailureKind> {
        match &self.body {
            ResponseBody::Failure { error_kind, .. } => Some(*error_kind),
            ResponseBody::Prediction { .. } => None,
        }
    }
}

/// Liveness report for the health-check surface.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HealthStatus {
    /// Fixed liveness message.
    pub status: String,
    /// Whether the neural-network artifact is loaded.
    pub neural_network_loaded: bool,
    /// Whether the SVM artifact is loaded.
    pub svm_loaded: bool,
}

impl HealthStatus {
    /// Builds a report from a per-family loaded predicate.
    pub fn from_fn(is_loaded: impl Fn(ModelFamily) -> bool) -> Self {
        Self {
            status: "API is running".to_string(),
            neural_network_loaded: is_loaded(ModelFamily::NeuralNetwork),
            svm_loaded: is_loaded(ModelFamily::Svm),
        }
    }
}
