use fast_image_resize::images::{Image, ImageRef};
use fast_image_resize::{FilterType, PixelType, ResizeAlg, ResizeOptions, Resizer};
use tracing::{debug, warn};

use crate::core::bitmap::{Bitmap, alloc_pixels};
use crate::error::{Error, Result};
use crate::types::{AlphaMode, ImageSize};

/// Scale `original` so its long side equals `target_long_side`, keeping the
/// aspect ratio. Never upscales.
pub fn calculate_resize_dimensions(original: ImageSize, target_long_side: u32) -> ImageSize {
    let short_side = original.height.min(original.width);
    let long_side = original.height.max(original.width);

    if target_long_side >= long_side {
        if target_long_side > long_side {
            warn!(
                "Target size {} is larger than original long side {}. Keeping original dimensions {}",
                target_long_side, long_side, original
            );
        }
        return original;
    }

    let scale_factor = target_long_side as f64 / long_side as f64;
    let new_short_side = ((short_side as f64 * scale_factor).round() as u32).max(1);

    if original.width > original.height {
        ImageSize::new(target_long_side, new_short_side)
    } else {
        ImageSize::new(new_short_side, target_long_side)
    }
}

/// Resample `bitmap` to exactly `target` with a fixed Lanczos3 filter.
///
/// The result keeps the source layout. Straight-alpha sources are
/// premultiplied inside the resampler so transparent pixels do not bleed color.
pub fn resize_bitmap(bitmap: &Bitmap, target: ImageSize) -> Result<Bitmap> {
    if target.is_empty() {
        return Err(Error::ZeroSize {
            width: target.width,
            height: target.height,
        });
    }
    if bitmap.size() == target {
        return bitmap.try_clone();
    }
    let dst_pixels = alloc_pixels(target)?;

    debug!("Resizing {} -> {}", bitmap.size(), target);

    let resize_options = ResizeOptions::new()
        .resize_alg(ResizeAlg::Convolution(FilterType::Lanczos3))
        .use_alpha(bitmap.layout().alpha == AlphaMode::Straight);
    let mut resizer = Resizer::new();

    let src_image = ImageRef::new(
        bitmap.width(),
        bitmap.height(),
        bitmap.as_bytes(),
        PixelType::U8x4,
    )
    .map_err(|e| Error::Resize(e.to_string()))?;
    let mut dst_image = Image::from_vec_u8(target.width, target.height, dst_pixels, PixelType::U8x4)
        .map_err(|e| Error::Resize(e.to_string()))?;
    resizer
        .resize(&src_image, &mut dst_image, &resize_options)
        .map_err(|e| Error::Resize(e.to_string()))?;

    Bitmap::new(
        target.width,
        target.height,
        bitmap.layout(),
        dst_image.into_vec(),
    )
}
