//! # Breast Aware
//!
//! Breast ultrasound classification over two interchangeable model families.
//!
//! An encoded image and a model identifier go in; a uniform prediction over
//! the labels `Benign`, `Malignant` and `Normal` comes out, with a confidence
//! and per-class percentages. Two families are served, both as ONNX artifacts
//! through ONNX Runtime:
//!
//! - **Neural network** (DenseNet121): fed a `[1, 224, 224, 3]` pixel tensor,
//!   returns dense class scores.
//! - **SVM**: fed a 512-long gradient orientation histogram, returns a label
//!   and, when trained with probability estimates, class probabilities.
//!
//! Each family is loaded lazily, once per process, and a family whose artifact
//! fails to load is reported unavailable without affecting the other.
//!
//! ## Modules
//!
//! * [`core`] - Configuration, errors, ONNX Runtime sessions and the pipeline traits
//! * [`domain`] - Labels, model families, predictions and response documents
//! * [`models`] - ONNX-backed classifiers for each family
//! * [`pipeline`] - Extractors, registry, normalizer and dispatcher
//! * [`processors`] - Pixel normalization, HOG descriptor and feature scaling
//! * [`utils`] - Image decoding helpers
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use breast_aware::prelude::*;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = ServiceConfig::from_json_str(r#"{ "models_dir": "models" }"#)?;
//! let dispatcher = InferenceDispatcher::from_config(config)?;
//!
//! let bytes = std::fs::read("scan.png")?;
//! let result = dispatcher.dispatch(&bytes, "neural-network")?;
//! println!("{} ({:?}%)", result.prediction(), result.confidence());
//!
//! let response = dispatcher.respond(&bytes, "svm");
//! println!("{}", serde_json::to_string_pretty(&response)?);
//! # Ok(())
//! # }
//! ```

pub mod core;
pub mod domain;
pub mod models;
pub mod pipeline;
pub mod processors;
pub mod utils;

/// Prelude module for convenient imports.
///
/// ```rust
/// use breast_aware::prelude::*;
/// ```
///
/// Included items cover the request path: configuration, the dispatcher,
/// result and response types, and the error types. Traits and model handles
/// live in `breast_aware::core::traits` and `breast_aware::models`.
pub mod prelude {
    pub use crate::core::{
        FailureKind, InferenceError, InferenceResult, ScorePolicy, ServiceConfig,
    };
    pub use crate::domain::{
        ClassLabel, HealthStatus, InferenceResponse, ModelFamily, PredictionResult,
    };
    pub use crate::pipeline::{InferenceDispatcher, ModelRegistry};
}
