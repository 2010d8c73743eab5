//! Model families served by the pipeline.
//!
//! Each family wraps one ONNX artifact and implements
//! [`Classifier`](crate::core::traits::Classifier). The loader functions are
//! what the registry calls on first use of a family.

mod densenet;
mod svm;

pub use densenet::DenseNetClassifier;
pub use svm::SvmClassifier;

use crate::core::config::ServiceConfig;
use crate::core::errors::InferenceResult;
use crate::core::traits::Classifier;
use std::sync::Arc;

/// Loads the neural-network artifact named by `config`.
pub fn load_neural_network(config: &ServiceConfig) -> InferenceResult<Arc<dyn Classifier>> {
    let path = config.neural_network_model_path();
    let classifier = DenseNetClassifier::load(&config.neural_network, &path)?;
    Ok(Arc::new(classifier))
}

/// Loads the SVM artifact named by `config`, with its scaler when configured.
pub fn load_svm(config: &ServiceConfig) -> InferenceResult<Arc<dyn Classifier>> {
    let path = config.svm_model_path();
    let scaler = config.svm_scaler_path();
    let classifier = SvmClassifier::load(&config.svm, &path, scaler.as_deref())?;
    Ok(Arc::new(classifier))
}
