use std::path::Path;

use tracing::info;

use crate::core::bitmap::Bitmap;
use crate::error::{Error, Result};
use crate::types::PixelLayout;

/// Write `bitmap` as an 8-bit RGBA PNG (straight alpha).
pub fn write_png(output: &Path, bitmap: &Bitmap) -> Result<()> {
    let rgba = bitmap.to_layout(PixelLayout::RGBA)?;
    image::save_buffer_with_format(
        output,
        rgba.as_bytes(),
        rgba.width(),
        rgba.height(),
        image::ExtendedColorType::Rgba8,
        image::ImageFormat::Png,
    )
    .map_err(|e| match e {
        image::ImageError::IoError(io) => Error::write(output, io),
        other => Error::Encode(other.to_string()),
    })?;
    info!("Saved PNG {:?} ({}x{})", output, rgba.width(), rgba.height());
    Ok(())
}
