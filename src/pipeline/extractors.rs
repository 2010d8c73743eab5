//! Feature extractors, one per model family.
//!
//! Both are pure: the same bytes always give the same vector.

use crate::core::config::{HogConfig, NeuralNetworkConfig};
use crate::core::errors::{InferenceError, InferenceResult};
use crate::core::traits::FeatureExtractor;
use crate::domain::FeatureVector;
use crate::processors::{ChannelOrder, HogDescriptor, NormalizeImage};
use crate::utils::{decode_image, dynamic_to_gray, dynamic_to_rgb};
use image::imageops::{self, FilterType};
use ndarray::Array2;
use tracing::debug;

/// Pixel-tensor extractor for the neural network.
///
/// RGB conversion, resize to the input shape, linear scaling into [0, 1] and
/// a leading batch axis.
#[derive(Debug, Clone)]
pub struct TensorExtractor {
    input_shape: (u32, u32),
    filter: FilterType,
    normalizer: NormalizeImage,
    max_image_bytes: usize,
}

impl TensorExtractor {
    /// Builds the extractor from the neural-network settings.
    pub fn new(config: &NeuralNetworkConfig, max_image_bytes: usize) -> InferenceResult<Self> {
        Ok(Self {
            input_shape: config.input_shape,
            filter: config.resize_filter.into(),
            normalizer: NormalizeImage::unit_scale(config.channel_order)?,
            max_image_bytes,
        })
    }
}

impl FeatureExtractor for TensorExtractor {
    fn extract(&self, image_bytes: &[u8]) -> InferenceResult<FeatureVector> {
        let img = dynamic_to_rgb(decode_image(image_bytes, self.max_image_bytes)?);
        let (height, width) = self.input_shape;
        let resized = imageops::resize(&img, width, height, self.filter);
        let tensor = self.normalizer.normalize_to(&resized)?;
        debug!(shape = ?tensor.shape(), "extracted pixel tensor");
        Ok(FeatureVector::Tensor(tensor))
    }

    fn output_shape(&self) -> Vec<usize> {
        let (h, w) = (self.input_shape.0 as usize, self.input_shape.1 as usize);
        match self.normalizer.order {
            ChannelOrder::HWC => vec![1, h, w, 3],
            ChannelOrder::CHW => vec![1, 3, h, w],
        }
    }
}

/// Gradient-histogram extractor for the SVM.
///
/// Grayscale conversion, resize to the configured shape and a HOG descriptor
/// flattened into a single row.
#[derive(Debug, Clone)]
pub struct HistogramExtractor {
    input_shape: (u32, u32),
    filter: FilterType,
    descriptor: HogDescriptor,
    max_image_bytes: usize,
}

impl HistogramExtractor {
    /// Builds the extractor from the HOG settings.
    pub fn new(config: &HogConfig, max_image_bytes: usize) -> Self {
        Self {
            input_shape: config.input_shape,
            filter: config.resize_filter.into(),
            descriptor: HogDescriptor::new(config),
            max_image_bytes,
        }
    }
}

impl FeatureExtractor for HistogramExtractor {
    fn extract(&self, image_bytes: &[u8]) -> InferenceResult<FeatureVector> {
        let img = dynamic_to_gray(decode_image(image_bytes, self.max_image_bytes)?);
        let (height, width) = self.input_shape;
        let resized = imageops::resize(&img, width, height, self.filter);
        let features = self.descriptor.compute(&resized)?;
        let len = features.len();
        let row = Array2::from_shape_vec((1, len), features).map_err(|e| {
            InferenceError::feature_extraction(
                "flatten",
                format!("descriptor reshape: {e}"),
            )
        })?;
        debug!(len, "extracted gradient histogram");
        Ok(FeatureVector::Histogram(row))
    }

    fn output_shape(&self) -> Vec<usize> {
        let (h, w) = self.input_shape;
        vec![1, self.descriptor.descriptor_len(w, h).unwrap_or(0)]
    }
}
