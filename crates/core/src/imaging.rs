//! Photo normalization: flatten alpha, cap size, re-encode as JPEG.
//!
//! Decoding and resampling use the `image` crate. Encoding goes through
//! `jpeg-encoder` because it can emit optimized Huffman tables.

use image::imageops::FilterType;
use image::{DynamicImage, Rgb, RgbImage};
use jpeg_encoder::{ColorType, Encoder};

use crate::error::CoreError;

/// Normalize arbitrary image bytes into an opaque, size-capped JPEG.
///
/// Fails with [`CoreError::UnsupportedImage`] when the bytes cannot be
/// decoded or the result cannot be encoded. This is CPU-bound; async callers
/// should run it on the blocking pool.
pub fn normalize_image(bytes: &[u8], max_side: u32, quality: u8) -> Result<Vec<u8>, CoreError> {
    let decoded = image::load_from_memory(bytes)
        .map_err(|e| CoreError::UnsupportedImage(e.to_string()))?;

    let rgb = flatten_onto_white(decoded);

    let (width, height) = scaled_dimensions(rgb.width(), rgb.height(), max_side);
    let rgb = if (width, height) != (rgb.width(), rgb.height()) {
        image::imageops::resize(&rgb, width, height, FilterType::Lanczos3)
    } else {
        rgb
    };

    encode_jpeg(&rgb, quality)
}

/// Convert to RGB, compositing any alpha channel onto opaque white.
fn flatten_onto_white(img: DynamicImage) -> RgbImage {
    if !img.color().has_alpha() {
        return img.to_rgb8();
    }

    let rgba = img.to_rgba8();
    RgbImage::from_fn(rgba.width(), rgba.height(), |x, y| {
        let [r, g, b, a] = rgba.get_pixel(x, y).0;
        Rgb([blend_white(r, a), blend_white(g, a), blend_white(b, a)])
    })
}

/// Blend one channel over white: `(c * a + 255 * (255 - a)) / 255`, rounded.
fn blend_white(channel: u8, alpha: u8) -> u8 {
    let c = u32::from(channel);
    let a = u32::from(alpha);
    ((c * a + 255 * (255 - a) + 127) / 255) as u8
}

/// Dimensions after capping the longer side at `max_side`.
///
/// Returns the input unchanged when it already fits.
pub fn scaled_dimensions(width: u32, height: u32, max_side: u32) -> (u32, u32) {
    let longer = width.max(height);
    if longer <= max_side || max_side == 0 {
        return (width, height);
    }

    let scale = |side: u32| -> u32 {
        let scaled = (f64::from(side) * f64::from(max_side) / f64::from(longer)).round();
        (scaled as u32).max(1)
    };

    if width >= height {
        (max_side, scale(height))
    } else {
        (scale(width), max_side)
    }
}

fn encode_jpeg(rgb: &RgbImage, quality: u8) -> Result<Vec<u8>, CoreError> {
    let width = u16::try_from(rgb.width())
        .map_err(|_| CoreError::UnsupportedImage(format!("width {} too large", rgb.width())))?;
    let height = u16::try_from(rgb.height())
        .map_err(|_| CoreError::UnsupportedImage(format!("height {} too large", rgb.height())))?;

    let mut out = Vec::new();
    let mut encoder = Encoder::new(&mut out, quality.clamp(1, 100));
    encoder.set_optimized_huffman_tables(true);
    encoder
        .encode(rgb.as_raw(), width, height, ColorType::Rgb)
        .map_err(|e| CoreError::UnsupportedImage(format!("JPEG encode failed: {e}")))?;

    Ok(out)
}
