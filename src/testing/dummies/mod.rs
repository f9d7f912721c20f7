pub mod images;

pub use images::{noise_rgb, png_bytes, solid_rgb, two_tone_rgb};
