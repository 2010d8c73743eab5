//! The core module of the inference pipeline.
//!
//! This module contains the fundamental components shared by every model
//! family:
//! - Configuration management
//! - Error handling
//! - ONNX Runtime integration
//! - Traits defining the extractor and classifier seams
//!
//! It also provides re-exports of commonly used types for convenience.

pub mod config;
pub mod errors;
pub mod inference;
pub mod traits;

pub use config::{
    BlockNorm, HogConfig, NeuralNetworkConfig, OrtSessionConfig, ScorePolicy, ServiceConfig,
    SvmConfig,
};
pub use errors::{FailureKind, InferenceError, InferenceResult};
pub use inference::OrtInfer;
pub use traits::{Capability, Classifier, FeatureExtractor};

/// Initializes the tracing subscriber for logging.
///
/// This function sets up the tracing subscriber with environment filter and formatting layer.
/// Log lines go to stderr so stdout stays free for JSON output. The level is
/// controlled by `RUST_LOG`.
pub fn init_tracing() {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::from_default_env())
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}
