//! Structures and helpers for ONNX Runtime inference.
//!
//! This module centralizes session creation and the low level inference
//! engine shared by both model families.

pub mod ort_infer;
pub mod session;

pub use ort_infer::{OrtInfer, OutputTensor, OutputType, first_row};
pub use session::load_session_with;
