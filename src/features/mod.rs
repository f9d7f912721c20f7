mod color_histogram;

pub use color_histogram::{ColorHistogram, DEFAULT_BLOCKS, FeatureError, FeatureVector};
