//! Domain-level structures shared across the inference pipeline.
//!
//! This module groups the diagnostic label set, the closed set of model
//! families, the per-request prediction types and the caller-facing
//! response shapes.

pub mod family;
pub mod label;
pub mod prediction;
pub mod response;

pub use family::*;
pub use label::*;
pub use prediction::*;
pub use response::*;
