use image::DynamicImage;
use std::io::{Error, ErrorKind};
use thiserror::Error as ThisError;

/// Number of equal-width subdivisions applied to each RGB channel by
/// default, giving `4³ = 64` histogram dimensions.
pub const DEFAULT_BLOCKS: u32 = 4;

#[derive(Debug, ThisError, PartialEq, Eq)]
pub enum FeatureError {
    #[error("unsupported color mode; expected 8-bit RGB")]
    UnsupportedMode,
    #[error("image contains no pixels")]
    EmptyImage,
}

/// Normalized color-occupancy histogram of an RGB image, flattened to
/// one dimension.
///
/// Components are non-negative and sum to 1.0 (one share per pixel).
/// A vector is only ever produced by [`ColorHistogram::extract`] and is
/// immutable afterwards.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureVector(Vec<f64>);

impl FeatureVector {
    pub(crate) fn new(components: Vec<f64>) -> Self {
        Self(components)
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Deterministic feature extractor for 8-bit RGB images.
///
/// Each channel is partitioned into `blocks` buckets of width
/// `256 / blocks`; a pixel contributes one count to the combined bucket
/// `r + g·blocks + b·blocks²`, and the counts are divided by the pixel
/// total. Identical image data always yields an identical vector.
#[derive(Debug, Clone, Copy)]
pub struct ColorHistogram {
    blocks: u32,
}

impl Default for ColorHistogram {
    fn default() -> Self {
        Self {
            blocks: DEFAULT_BLOCKS,
        }
    }
}

impl ColorHistogram {
    /// Creates an extractor with a custom channel subdivision count.
    ///
    /// `blocks` must evenly divide the 256-value channel range so that
    /// every bucket has the same width.
    pub fn new(blocks: u32) -> Result<Self, Error> {
        if blocks == 0 || blocks > 256 || 256 % blocks != 0 {
            return Err(Error::new(
                ErrorKind::InvalidInput,
                "blocks must be a divisor of 256 in [1, 256]",
            ));
        }
        Ok(Self { blocks })
    }

    /// Dimensionality of vectors produced by this extractor.
    pub fn dimensions(&self) -> usize {
        (self.blocks * self.blocks * self.blocks) as usize
    }

    /// Turns a decoded image into its feature vector.
    ///
    /// Only plain 8-bit RGB images are accepted; grayscale, paletted,
    /// and alpha-carrying images are rejected rather than coerced. An
    /// image with zero pixels is also a rejection.
    pub fn extract(&self, image: &DynamicImage) -> Result<FeatureVector, FeatureError> {
        let DynamicImage::ImageRgb8(rgb) = image else {
            return Err(FeatureError::UnsupportedMode);
        };

        let pixel_count = (rgb.width() as u64) * (rgb.height() as u64);
        if pixel_count == 0 {
            return Err(FeatureError::EmptyImage);
        }

        let blocks = self.blocks as usize;
        let bucket_width = 256 / blocks;
        let mut counts = vec![0u64; self.dimensions()];
        for pixel in rgb.pixels() {
            let [r, g, b] = pixel.0;
            let idx = (r as usize / bucket_width)
                + (g as usize / bucket_width) * blocks
                + (b as usize / bucket_width) * blocks * blocks;
            counts[idx] += 1;
        }

        let total = pixel_count as f64;
        Ok(FeatureVector(
            counts.into_iter().map(|c| c as f64 / total).collect(),
        ))
    }
}
