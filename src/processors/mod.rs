//! Image processing for model inputs.
//!
//! # Modules
//!
//! * `hog` - Gradient-histogram descriptor for the classical model
//! * `normalization` - Pixel scaling into batched tensors for the neural network
//! * `scaler` - Feature standardization fitted alongside the classical model
//! * `types` - Type definitions used across the processors module

mod hog;
mod normalization;
mod scaler;
pub mod types;

pub use hog::*;
pub use normalization::*;
pub use scaler::*;
pub use types::*;
