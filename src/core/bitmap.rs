//! Immutable 4-channel, 8-bit bitmap with an explicit pixel layout.
//!
//! Channel order and premultiplication travel with the pixel data, so every
//! consumer can normalize before doing arithmetic on colors. Pipeline stages
//! never mutate a `Bitmap`; conversions return a new one.
use crate::error::{Error, Result};
use crate::types::{AlphaMode, ChannelOrder, ImageSize, PixelLayout};

#[derive(Clone, PartialEq, Eq)]
pub struct Bitmap {
    width: u32,
    height: u32,
    layout: PixelLayout,
    data: Vec<u8>,
}

impl std::fmt::Debug for Bitmap {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Bitmap")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("layout", &self.layout)
            .field("bytes", &self.data.len())
            .finish()
    }
}

/// Allocate a zeroed pixel vector for `size`, reporting failure instead of aborting.
pub(crate) fn alloc_pixels(size: ImageSize) -> Result<Vec<u8>> {
    if size.is_empty() {
        return Err(Error::ZeroSize {
            width: size.width,
            height: size.height,
        });
    }
    let len = size.rgba_len().ok_or(Error::Allocation {
        width: size.width,
        height: size.height,
    })?;
    let mut data = Vec::new();
    data.try_reserve_exact(len).map_err(|_| Error::Allocation {
        width: size.width,
        height: size.height,
    })?;
    data.resize(len, 0);
    Ok(data)
}

impl Bitmap {
    /// Wrap raw pixel bytes. `data` must hold exactly `width * height * 4` bytes.
    pub fn new(width: u32, height: u32, layout: PixelLayout, data: Vec<u8>) -> Result<Self> {
        let size = ImageSize::new(width, height);
        if size.is_empty() {
            return Err(Error::ZeroSize { width, height });
        }
        let expected = size.rgba_len().ok_or(Error::Allocation { width, height })?;
        if data.len() != expected {
            return Err(Error::InvalidDimensions {
                width,
                height,
                expected,
                actual: data.len(),
            });
        }
        Ok(Self {
            width,
            height,
            layout,
            data,
        })
    }

    pub fn from_rgba8(width: u32, height: u32, data: Vec<u8>) -> Result<Self> {
        Self::new(width, height, PixelLayout::RGBA, data)
    }

    /// Single-color bitmap; `rgba` is straight-alpha RGBA.
    pub fn solid(width: u32, height: u32, rgba: [u8; 4]) -> Result<Self> {
        let mut data = alloc_pixels(ImageSize::new(width, height))?;
        for px in data.chunks_exact_mut(4) {
            px.copy_from_slice(&rgba);
        }
        Self::from_rgba8(width, height, data)
    }

    /// Build a straight RGBA bitmap from a per-pixel function of `(x, y)`.
    pub fn from_fn<F>(width: u32, height: u32, mut f: F) -> Result<Self>
    where
        F: FnMut(u32, u32) -> [u8; 4],
    {
        let mut data = alloc_pixels(ImageSize::new(width, height))?;
        for (i, px) in data.chunks_exact_mut(4).enumerate() {
            let x = (i % width as usize) as u32;
            let y = (i / width as usize) as u32;
            px.copy_from_slice(&f(x, y));
        }
        Self::from_rgba8(width, height, data)
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn size(&self) -> ImageSize {
        ImageSize::new(self.width, self.height)
    }

    pub fn layout(&self) -> PixelLayout {
        self.layout
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.data
    }

    /// Raw pixel at `(x, y)` in this bitmap's own layout.
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let idx = (y as usize * self.width as usize + x as usize) * 4;
        let mut px = [0u8; 4];
        px.copy_from_slice(&self.data[idx..idx + 4]);
        Some(px)
    }

    /// Pixel at `(x, y)` as straight-alpha RGBA regardless of layout.
    pub fn rgba_at(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        self.pixel(x, y).map(|px| to_straight_rgba(px, self.layout))
    }

    /// Iterate pixels as straight-alpha RGBA in row-major order.
    pub fn rgba_pixels(&self) -> impl Iterator<Item = [u8; 4]> + '_ {
        let layout = self.layout;
        self.data
            .chunks_exact(4)
            .map(move |c| to_straight_rgba([c[0], c[1], c[2], c[3]], layout))
    }

    /// Copy of this bitmap whose pixel storage is reserved fallibly.
    pub fn try_clone(&self) -> Result<Bitmap> {
        let mut data = alloc_pixels(self.size())?;
        data.copy_from_slice(&self.data);
        Ok(Bitmap {
            width: self.width,
            height: self.height,
            layout: self.layout,
            data,
        })
    }

    /// Re-encode into `target` layout. Returns a copy when already there.
    pub fn to_layout(&self, target: PixelLayout) -> Result<Bitmap> {
        if self.layout == target {
            return self.try_clone();
        }
        let mut data = alloc_pixels(self.size())?;
        for (dst, c) in data.chunks_exact_mut(4).zip(self.data.chunks_exact(4)) {
            let rgba = to_straight_rgba([c[0], c[1], c[2], c[3]], self.layout);
            dst.copy_from_slice(&from_straight_rgba(rgba, target));
        }
        Ok(Bitmap {
            width: self.width,
            height: self.height,
            layout: target,
            data,
        })
    }

    /// True when every pixel has alpha 255.
    pub fn is_opaque(&self) -> bool {
        self.data.chunks_exact(4).all(|c| c[3] == 255)
    }
}

fn premultiply(c: u8, a: u8) -> u8 {
    ((c as u32 * a as u32 + 127) / 255) as u8
}

fn unpremultiply(c: u8, a: u8) -> u8 {
    if a == 0 {
        return 0;
    }
    ((c as u32 * 255 + a as u32 / 2) / a as u32).min(255) as u8
}

pub(crate) fn to_straight_rgba(px: [u8; 4], layout: PixelLayout) -> [u8; 4] {
    let [r, g, b, a] = match layout.order {
        ChannelOrder::Rgba => px,
        ChannelOrder::Bgra => [px[2], px[1], px[0], px[3]],
    };
    match layout.alpha {
        AlphaMode::Straight => [r, g, b, a],
        AlphaMode::Premultiplied => [
            unpremultiply(r, a),
            unpremultiply(g, a),
            unpremultiply(b, a),
            a,
        ],
    }
}

pub(crate) fn from_straight_rgba(rgba: [u8; 4], layout: PixelLayout) -> [u8; 4] {
    let [r, g, b, a] = rgba;
    let [r, g, b] = match layout.alpha {
        AlphaMode::Straight => [r, g, b],
        AlphaMode::Premultiplied => [premultiply(r, a), premultiply(g, a), premultiply(b, a)],
    };
    match layout.order {
        ChannelOrder::Rgba => [r, g, b, a],
        ChannelOrder::Bgra => [b, g, r, a],
    }
}
