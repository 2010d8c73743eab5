//! Image normalization into model input tensors.
//!
//! Each channel value `v` becomes `v * alpha + beta` where
//! `alpha = scale / std` and `beta = -mean / std`. With the default
//! parameters (`scale = 1/255`, mean 0, std 1) pixel intensities are scaled
//! linearly into [0, 1].

use crate::core::errors::{InferenceError, InferenceResult};
use crate::processors::types::ChannelOrder;
use image::RgbImage;
use ndarray::Array4;

/// Normalizes RGB images into batched `f32` tensors.
#[derive(Debug, Clone)]
pub struct NormalizeImage {
    /// Scaling factors for each channel (alpha = scale / std)
    pub alpha: Vec<f32>,
    /// Offset values for each channel (beta = -mean / std)
    pub beta: Vec<f32>,
    /// Channel ordering (CHW or HWC)
    pub order: ChannelOrder,
}

impl NormalizeImage {
    /// Creates a new NormalizeImage instance with the specified parameters.
    ///
    /// # Arguments
    ///
    /// * `scale` - Optional scaling factor (defaults to 1.0/255.0)
    /// * `mean` - Optional mean values for each channel (defaults to [0.0, 0.0, 0.0])
    /// * `std` - Optional standard deviation values for each channel (defaults to [1.0, 1.0, 1.0])
    /// * `order` - Optional channel ordering (defaults to HWC)
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// * Scale is less than or equal to 0
    /// * Mean or std vectors don't have exactly 3 elements
    /// * Any standard deviation value is less than or equal to 0
    pub fn new(
        scale: Option<f32>,
        mean: Option<Vec<f32>>,
        std: Option<Vec<f32>>,
        order: Option<ChannelOrder>,
    ) -> InferenceResult<Self> {
        let scale = scale.unwrap_or(1.0 / 255.0);
        let mean = mean.unwrap_or_else(|| vec![0.0, 0.0, 0.0]);
        let std = std.unwrap_or_else(|| vec![1.0, 1.0, 1.0]);
        let order = order.unwrap_or_default();

        if scale <= 0.0 {
            return Err(InferenceError::config_error("Scale must be greater than 0"));
        }

        if mean.len() != 3 {
            return Err(InferenceError::config_error(
                "Mean must have exactly 3 elements for RGB",
            ));
        }

        if std.len() != 3 {
            return Err(InferenceError::config_error(
                "Std must have exactly 3 elements for RGB",
            ));
        }

        for (i, &s) in std.iter().enumerate() {
            if s <= 0.0 {
                return Err(InferenceError::config_error(format!(
                    "Standard deviation at index {i} must be greater than 0, got {s}"
                )));
            }
        }

        let alpha: Vec<f32> = std.iter().map(|s| scale / s).collect();
        let beta: Vec<f32> = mean.iter().zip(&std).map(|(m, s)| -m / s).collect();

        Ok(Self { alpha, beta, order })
    }

    /// Plain `[0, 1]` scaling in the given channel order.
    pub fn unit_scale(order: ChannelOrder) -> InferenceResult<Self> {
        Self::new(None, None, None, Some(order))
    }

    /// Normalizes a single image into a tensor with a leading batch axis of 1.
    ///
    /// The result is `[1, H, W, 3]` for HWC and `[1, 3, H, W]` for CHW.
    pub fn normalize_to(&self, img: &RgbImage) -> InferenceResult<Array4<f32>> {
        let (width, height) = img.dimensions();
        let (w, h) = (width as usize, height as usize);
        let channels = 3usize;

        let mut result = vec![0.0f32; channels * h * w];
        for (x, y, pixel) in img.enumerate_pixels() {
            let (x, y) = (x as usize, y as usize);
            for c in 0..channels {
                let dst_idx = match self.order {
                    ChannelOrder::CHW => c * h * w + y * w + x,
                    ChannelOrder::HWC => y * w * channels + x * channels + c,
                };
                result[dst_idx] = pixel[c] as f32 * self.alpha[c] + self.beta[c];
            }
        }

        let shape = match self.order {
            ChannelOrder::CHW => (1, channels, h, w),
            ChannelOrder::HWC => (1, h, w, channels),
        };
        Array4::from_shape_vec(shape, result).map_err(|e| {
            InferenceError::feature_extraction("normalization", format!("tensor reshape: {e}"))
        })
    }
}
