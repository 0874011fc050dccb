//! White-backed compositing of a stylized image and its original.
//!
//! Drawing order:
//! 1. fill the canvas with opaque white
//! 2. draw the stylized image, source-over, at its own alpha
//! 3. draw the original with the chosen blend mode at `alpha * (1 - mix)`
//!
//! The canvas is opaque after step 1, so translucent content lightens toward
//! white instead of turning see-through. The output is always opaque.
use tracing::debug;

use crate::core::bitmap::{Bitmap, alloc_pixels};
use crate::core::processing::blend::{Rgb, blend_rgb};
use crate::error::{Error, Result};
use crate::types::{BlendMode, MixCoefficient, PixelLayout};

const WHITE: Rgb = [1.0, 1.0, 1.0];

fn unit(v: u8) -> f32 {
    v as f32 / 255.0
}

fn quantize(v: f32) -> u8 {
    (v.clamp(0.0, 1.0) * 255.0).round() as u8
}

fn mix_over(backdrop: Rgb, color: Rgb, alpha: f32) -> Rgb {
    [
        alpha * color[0] + (1.0 - alpha) * backdrop[0],
        alpha * color[1] + (1.0 - alpha) * backdrop[1],
        alpha * color[2] + (1.0 - alpha) * backdrop[2],
    ]
}

/// Composite a single pixel pair. Both inputs are straight RGBA.
pub fn composite_pixel(
    original: [u8; 4],
    stylized: [u8; 4],
    mode: BlendMode,
    mix: MixCoefficient,
) -> [u8; 4] {
    let sty_rgb = [unit(stylized[0]), unit(stylized[1]), unit(stylized[2])];
    let canvas = mix_over(WHITE, sty_rgb, unit(stylized[3]));

    let orig_rgb = [unit(original[0]), unit(original[1]), unit(original[2])];
    let alpha = unit(original[3]) * mix.original_alpha();
    let blended = blend_rgb(canvas, orig_rgb, mode);
    let out = mix_over(canvas, blended, alpha);

    [quantize(out[0]), quantize(out[1]), quantize(out[2]), 255]
}

/// Blend `original` over `stylized` (white-backed) with `mode` at opacity
/// `1 - mix`. Both bitmaps must have identical dimensions; layouts may differ.
/// Returns a new opaque straight-RGBA bitmap.
pub fn composite(
    original: &Bitmap,
    stylized: &Bitmap,
    mode: BlendMode,
    mix: MixCoefficient,
) -> Result<Bitmap> {
    if original.size() != stylized.size() {
        return Err(Error::DimensionMismatch {
            original: original.size(),
            stylized: stylized.size(),
        });
    }

    debug!(
        "Compositing {} with blend mode {} at mix {}",
        original.size(),
        mode,
        mix
    );

    let mut data = alloc_pixels(original.size())?;
    for ((dst, o), s) in data
        .chunks_exact_mut(4)
        .zip(original.rgba_pixels())
        .zip(stylized.rgba_pixels())
    {
        dst.copy_from_slice(&composite_pixel(o, s, mode, mix));
    }

    Bitmap::new(original.width(), original.height(), PixelLayout::RGBA, data)
}
