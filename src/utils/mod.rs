//! Utility functions for the inference pipeline.
//!
//! This module provides image decoding and conversion helpers shared by the
//! feature extractors.

pub mod image;

pub use image::{decode_image, dynamic_to_gray, dynamic_to_rgb, load_image_bytes};
