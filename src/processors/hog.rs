//! Histogram-of-oriented-gradients descriptor.
//!
//! Wraps [`imageproc::hog`] with geometry checks up front, so a bad cell or
//! block layout surfaces as a typed extraction error rather than a string.
//! `imageproc` L2-normalizes each block; [`BlockNorm::L2Hys`] additionally
//! clips and renormalizes every block.

use crate::core::config::{BlockNorm, HogConfig};
use crate::core::errors::{InferenceError, InferenceResult};
use image::GrayImage;
use imageproc::hog::{HogOptions, hog};

/// Largest value a block entry may keep under L2-Hys.
const HYS_CLIP: f32 = 0.2;
/// Regularizer added to the squared block norm.
const NORM_EPS: f32 = 1e-5;

/// Computes gradient-orientation histograms with a fixed geometry.
#[derive(Debug, Clone)]
pub struct HogDescriptor {
    orientations: usize,
    signed: bool,
    cell_side: usize,
    block_side: usize,
    block_stride: usize,
    block_norm: BlockNorm,
}

impl HogDescriptor {
    /// Creates a descriptor from the configured geometry.
    pub fn new(config: &HogConfig) -> Self {
        Self {
            orientations: config.orientations,
            signed: config.signed,
            cell_side: config.cell_side,
            block_side: config.block_side,
            block_stride: config.block_stride,
            block_norm: config.block_norm,
        }
    }

    /// Descriptor length for an image of the given size, or `None` when the
    /// geometry does not fit.
    pub fn descriptor_len(&self, width: u32, height: u32) -> Option<usize> {
        HogConfig {
            input_shape: (height, width),
            orientations: self.orientations,
            signed: self.signed,
            cell_side: self.cell_side,
            block_side: self.block_side,
            block_stride: self.block_stride,
            ..HogConfig::default()
        }
        .descriptor_len()
    }

    /// Values per block in the flattened descriptor.
    fn block_len(&self) -> usize {
        self.block_side * self.block_side * self.orientations
    }

    /// Computes the flattened descriptor of `image`.
    ///
    /// # Errors
    ///
    /// Returns [`InferenceError::FeatureExtraction`] when the image is smaller
    /// than one block or its sides are not multiples of the cell size.
    pub fn compute(&self, image: &GrayImage) -> InferenceResult<Vec<f32>> {
        let (width, height) = image.dimensions();
        let expected = self.descriptor_len(width, height).ok_or_else(|| {
            InferenceError::feature_extraction(
                "hog",
                format!(
                    "{}x{} image does not fit {}px cells in {}-cell blocks",
                    width, height, self.cell_side, self.block_side
                ),
            )
        })?;

        let options = HogOptions::new(
            self.orientations,
            self.signed,
            self.cell_side,
            self.block_side,
            self.block_stride,
        );
        let mut features =
            hog(image, options).map_err(|e| InferenceError::feature_extraction("hog", e))?;

        if features.len() != expected {
            return Err(InferenceError::feature_extraction(
                "hog",
                format!(
                    "descriptor has {} values, expected {}",
                    features.len(),
                    expected
                ),
            ));
        }

        // A block with no gradient has zero norm; it describes as all zeros.
        for value in features.iter_mut().filter(|v| !v.is_finite()) {
            *value = 0.0;
        }
        if self.block_norm == BlockNorm::L2Hys {
            for block in features.chunks_mut(self.block_len()) {
                l2_hys(block);
            }
        }
        Ok(features)
    }
}

fn l2_normalize(block: &mut [f32]) {
    let norm = (block.iter().map(|v| v * v).sum::<f32>() + NORM_EPS * NORM_EPS).sqrt();
    for value in block.iter_mut() {
        *value /= norm;
    }
}

/// L2 normalization, clipping at 0.2, then L2 normalization again.
fn l2_hys(block: &mut [f32]) {
    l2_normalize(block);
    for value in block.iter_mut() {
        *value = value.min(HYS_CLIP);
    }
    l2_normalize(block);
}
