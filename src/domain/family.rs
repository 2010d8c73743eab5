//! Model family selection.
//!
//! Caller-supplied identifiers are parsed exactly once, at the boundary, into
//! the closed [`ModelFamily`] set. Anything not in the alias table is an
//! [`InferenceError::UnknownModel`].

use crate::core::errors::InferenceError;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// One of the two interchangeable classifier implementations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ModelFamily {
    /// Convolutional network over raw pixel tensors.
    NeuralNetwork,
    /// Support vector machine over gradient-histogram features.
    Svm,
}

impl ModelFamily {
    /// Every family, in registry order.
    pub const ALL: [ModelFamily; 2] = [ModelFamily::NeuralNetwork, ModelFamily::Svm];

    /// Canonical identifier.
    pub fn id(self) -> &'static str {
        match self {
            ModelFamily::NeuralNetwork => "neural-network",
            ModelFamily::Svm => "svm",
        }
    }

    /// Accepted identifiers for this family.
    pub fn aliases(self) -> &'static [&'static str] {
        match self {
            ModelFamily::NeuralNetwork => &["neural-network", "DenseNet121"],
            ModelFamily::Svm => &["svm", "SVM"],
        }
    }

    /// Parses a caller-supplied identifier.
    ///
    /// Matching is exact; `"Svm"` or `"densenet121"` are rejected.
    pub fn parse(model_id: &str) -> Result<Self, InferenceError> {
        Self::ALL
            .into_iter()
            .find(|family| family.aliases().contains(&model_id))
            .ok_or_else(|| InferenceError::unknown_model(model_id))
    }
}

impl std::fmt::Display for ModelFamily {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ModelFamily::NeuralNetwork => write!(f, "Neural network"),
            ModelFamily::Svm => write!(f, "SVM"),
        }
    }
}

impl FromStr for ModelFamily {
    type Err = InferenceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}
