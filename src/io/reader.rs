use std::path::Path;

use tracing::debug;

use crate::core::bitmap::Bitmap;
use crate::error::{Error, Result};

fn from_dynamic(img: image::DynamicImage) -> Result<Bitmap> {
    let rgba = img.into_rgba8();
    let (width, height) = rgba.dimensions();
    Bitmap::from_rgba8(width, height, rgba.into_raw())
}

/// Decode an image file (any format the `image` crate understands) into a
/// straight-alpha RGBA bitmap.
pub fn load_bitmap(path: &Path) -> Result<Bitmap> {
    let img = image::ImageReader::open(path)
        .and_then(|reader| reader.with_guessed_format())
        .map_err(|e| Error::read(path, e))?
        .decode()
        .map_err(|source| Error::Decode {
            source_name: path.display().to_string(),
            source,
        })?;
    debug!(
        "Decoded {:?}: {}x{} {:?}",
        path,
        img.width(),
        img.height(),
        img.color()
    );
    from_dynamic(img)
}

/// Decode an in-memory encoded image.
pub fn decode_bitmap(bytes: &[u8]) -> Result<Bitmap> {
    let img = image::load_from_memory(bytes).map_err(|source| Error::Decode {
        source_name: format!("<{} bytes in memory>", bytes.len()),
        source,
    })?;
    from_dynamic(img)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn png_bytes(width: u32, height: u32, rgba: [u8; 4]) -> Vec<u8> {
        let img = image::RgbaImage::from_pixel(width, height, image::Rgba(rgba));
        let mut out = Cursor::new(Vec::new());
        img.write_to(&mut out, image::ImageFormat::Png).unwrap();
        out.into_inner()
    }

    #[test]
    fn decodes_png_bytes() {
        let bmp = decode_bitmap(&png_bytes(3, 2, [10, 20, 30, 40])).unwrap();
        assert_eq!((bmp.width(), bmp.height()), (3, 2));
        assert_eq!(bmp.rgba_at(2, 1), Some([10, 20, 30, 40]));
    }

    #[test]
    fn garbage_is_a_decode_error() {
        let err = decode_bitmap(b"definitely not an image").unwrap_err();
        assert!(matches!(err, Error::Decode { .. }));
        assert_eq!(err.stage(), Some(crate::error::PipelineStage::Input));
    }

    #[test]
    fn missing_file_is_an_input_read_error() {
        let err = load_bitmap(Path::new("/nonexistent/photo.png")).unwrap_err();
        assert!(matches!(err, Error::Read { .. }));
        assert_eq!(err.stage(), Some(crate::error::PipelineStage::Input));
    }
}
