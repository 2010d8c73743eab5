//! Types used in image processing operations
//!
//! This module defines the enums that configure how images are resized and
//! laid out before they reach a model.

use image::imageops::FilterType;
use serde::{Deserialize, Serialize};

/// Specifies the order of channels in an image tensor
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ChannelOrder {
    /// Channel, Height, Width order (common in PyTorch)
    CHW,
    /// Height, Width, Channel order (common in TensorFlow)
    #[default]
    HWC,
}

/// Interpolation used when resizing to a model's input size.
///
/// Serializable counterpart of [`FilterType`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResizeFilter {
    /// Nearest neighbour.
    Nearest,
    /// Bilinear.
    Triangle,
    /// Bicubic (Catmull-Rom).
    #[default]
    CatmullRom,
    /// Gaussian.
    Gaussian,
    /// Lanczos with window 3.
    Lanczos3,
}

impl From<ResizeFilter> for FilterType {
    fn from(filter: ResizeFilter) -> Self {
        match filter {
            ResizeFilter::Nearest => FilterType::Nearest,
            ResizeFilter::Triangle => FilterType::Triangle,
            ResizeFilter::CatmullRom => FilterType::CatmullRom,
            ResizeFilter::Gaussian => FilterType::Gaussian,
            ResizeFilter::Lanczos3 => FilterType::Lanczos3,
        }
    }
}
