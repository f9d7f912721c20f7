use image::{DynamicImage, ImageFormat, Rgb, RgbImage};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::io::Cursor;

/// A `width × height` image where every pixel has the given color.
pub fn solid_rgb(color: [u8; 3], width: u32, height: u32) -> DynamicImage {
    DynamicImage::ImageRgb8(RgbImage::from_pixel(width, height, Rgb(color)))
}

/// An 8×8 image whose first `primary_pixels` pixels (row-major) carry
/// `primary` and the remaining pixels carry `secondary`.
pub fn two_tone_rgb(primary: [u8; 3], secondary: [u8; 3], primary_pixels: u32) -> DynamicImage {
    let image = RgbImage::from_fn(8, 8, |x, y| {
        if y * 8 + x < primary_pixels {
            Rgb(primary)
        } else {
            Rgb(secondary)
        }
    });
    DynamicImage::ImageRgb8(image)
}

/// A reproducible pseudo-random RGB image.
pub fn noise_rgb(seed: u64, width: u32, height: u32) -> DynamicImage {
    let mut rng = StdRng::seed_from_u64(seed);
    let image = RgbImage::from_fn(width, height, |_, _| {
        Rgb([rng.random(), rng.random(), rng.random()])
    });
    DynamicImage::ImageRgb8(image)
}

/// PNG encoding of an image, as a client would send it on the wire.
pub fn png_bytes(image: &DynamicImage) -> Vec<u8> {
    let mut out = Cursor::new(Vec::new());
    image
        .write_to(&mut out, ImageFormat::Png)
        .expect("png encoding of an in-memory image");
    out.into_inner()
}
