//! The inference pipeline.
//!
//! [`InferenceDispatcher`] is the entry point. It asks the [`ModelRegistry`]
//! for a family handle, runs the family's feature extractor, and passes the
//! model output through the [`PredictionNormalizer`].

pub mod dispatcher;
pub mod extractors;
pub mod normalizer;
pub mod registry;

pub use dispatcher::InferenceDispatcher;
pub use extractors::{HistogramExtractor, TensorExtractor};
pub use normalizer::PredictionNormalizer;
pub use registry::{ModelLoader, ModelRegistry, SlotState};
