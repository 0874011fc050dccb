pub mod jpeg;
pub mod metadata;
pub mod png;

pub use metadata::{RenderMetadata, sidecar_path, write_metadata_sidecar};

use std::path::Path;

use crate::core::bitmap::Bitmap;
use crate::error::Result;
use crate::types::OutputFormat;

/// Encode `bitmap` to `output` in the requested format.
pub fn write_bitmap(
    bitmap: &Bitmap,
    output: &Path,
    format: OutputFormat,
    jpeg_quality: u8,
) -> Result<()> {
    match format {
        OutputFormat::Png => png::write_png(output, bitmap),
        OutputFormat::Jpeg => jpeg::write_rgb_jpeg(output, bitmap, jpeg_quality),
    }
}
