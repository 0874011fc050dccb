//! Fixed-format pixel buffers exchanged with style models.
//!
//! Models consume and produce 32-bit BGRA with straight alpha, row-major with
//! no row padding. `to_pixel_buffer` is the only way a `Bitmap` reaches a
//! model; `PixelBuffer::to_bitmap` is the only way model output leaves one.
use tracing::debug;

use crate::core::bitmap::{Bitmap, alloc_pixels};
use crate::core::processing::resize::resize_bitmap;
use crate::error::{Error, Result};
use crate::types::{ImageSize, PixelLayout};

/// Layout every `PixelBuffer` uses.
pub const MODEL_PIXEL_LAYOUT: PixelLayout = PixelLayout::BGRA;

#[derive(Clone, PartialEq, Eq)]
pub struct PixelBuffer {
    size: ImageSize,
    data: Vec<u8>,
}

impl std::fmt::Debug for PixelBuffer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PixelBuffer")
            .field("size", &self.size)
            .field("bytes", &self.data.len())
            .finish()
    }
}

impl PixelBuffer {
    /// Wrap raw BGRA bytes, typically a model's output tensor.
    pub fn new(size: ImageSize, data: Vec<u8>) -> Result<Self> {
        if size.is_empty() {
            return Err(Error::BufferConversion(format!(
                "pixel buffer has empty size {}",
                size
            )));
        }
        let expected = size.rgba_len().ok_or(Error::Allocation {
            width: size.width,
            height: size.height,
        })?;
        if data.len() != expected {
            return Err(Error::BufferConversion(format!(
                "expected {} bytes for {} BGRA buffer, got {}",
                expected,
                size,
                data.len()
            )));
        }
        Ok(Self { size, data })
    }

    pub fn size(&self) -> ImageSize {
        self.size
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.data
    }

    /// Convert back into a straight-alpha BGRA `Bitmap`.
    pub fn to_bitmap(&self) -> Result<Bitmap> {
        let mut data = alloc_pixels(self.size)?;
        data.copy_from_slice(&self.data);
        Bitmap::new(self.size.width, self.size.height, MODEL_PIXEL_LAYOUT, data)
            .map_err(|e| Error::BufferConversion(e.to_string()))
    }
}

/// Resize `bitmap` to exactly `size` and convert it to the model pixel format.
pub fn to_pixel_buffer(bitmap: &Bitmap, size: ImageSize) -> Result<PixelBuffer> {
    if size.is_empty() {
        return Err(Error::ZeroSize {
            width: size.width,
            height: size.height,
        });
    }
    let resized = resize_bitmap(bitmap, size)?;
    let converted = resized.to_layout(MODEL_PIXEL_LAYOUT)?;
    debug!(
        "Prepared {} model input from {} {:?} bitmap",
        size,
        bitmap.size(),
        bitmap.layout()
    );
    PixelBuffer::new(size, converted.into_bytes())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn buffer_has_exact_model_size_and_bgra_order() {
        let red = Bitmap::solid(3, 7, [255, 0, 0, 255]).unwrap();
        let buf = to_pixel_buffer(&red, ImageSize::new(3, 7)).unwrap();
        assert_eq!(buf.size(), ImageSize::new(3, 7));
        assert_eq!(&buf.as_bytes()[..4], &[0, 0, 255, 255]);

        let scaled = to_pixel_buffer(&red, ImageSize::square(16)).unwrap();
        assert_eq!(scaled.size(), ImageSize::square(16));
        assert_eq!(scaled.as_bytes().len(), 16 * 16 * 4);
    }

    #[test]
    fn premultiplied_input_is_straightened() {
        let pm = Bitmap::new(1, 1, PixelLayout::RGBA_PREMULTIPLIED, vec![50, 0, 0, 128]).unwrap();
        let buf = to_pixel_buffer(&pm, ImageSize::square(1)).unwrap();
        assert_eq!(buf.as_bytes(), &[0, 0, 100, 128]);
    }

    #[test]
    fn zero_target_is_rejected() {
        let bmp = Bitmap::solid(2, 2, [0, 0, 0, 255]).unwrap();
        assert!(matches!(
            to_pixel_buffer(&bmp, ImageSize::new(512, 0)),
            Err(Error::ZeroSize { .. })
        ));
    }

    #[test]
    fn unallocatable_model_input_is_an_error() {
        let bmp = Bitmap::solid(4, 4, [10, 20, 30, 255]).unwrap();
        assert!(matches!(
            to_pixel_buffer(&bmp, ImageSize::square(1 << 20)),
            Err(Error::Allocation { .. })
        ));
    }

    #[test]
    fn malformed_model_output_is_a_conversion_error() {
        let err = PixelBuffer::new(ImageSize::square(2), vec![0; 12]).unwrap_err();
        assert!(matches!(err, Error::BufferConversion(_)));
    }

    #[test]
    fn to_bitmap_keeps_bgra_layout() {
        let buf = PixelBuffer::new(ImageSize::square(1), vec![1, 2, 3, 4]).unwrap();
        let bmp = buf.to_bitmap().unwrap();
        assert_eq!(bmp.layout(), MODEL_PIXEL_LAYOUT);
        assert_eq!(bmp.rgba_at(0, 0), Some([3, 2, 1, 4]));
    }
}
