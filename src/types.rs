//! Shared types and enums used across becasso.
//! Includes `BlendMode`, `MixCoefficient`, pixel layout descriptors
//! (`ChannelOrder`, `AlphaMode`, `PixelLayout`), `ImageSize`, `StylePreset`
//! and `OutputFormat`.
use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::error::Error;

#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
pub struct ImageSize {
    pub width: u32,
    pub height: u32,
}

impl ImageSize {
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    pub const fn square(side: u32) -> Self {
        Self::new(side, side)
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Number of bytes needed for 4-channel 8-bit pixels, or `None` on overflow.
    pub fn rgba_len(&self) -> Option<usize> {
        (self.width as usize)
            .checked_mul(self.height as usize)?
            .checked_mul(4)
    }
}

impl std::fmt::Display for ImageSize {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// Input size fed to style models unless configured otherwise.
pub const DEFAULT_MODEL_INPUT_SIZE: ImageSize = ImageSize::square(512);

#[derive(Copy, Clone, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub enum ChannelOrder {
    Rgba,
    Bgra,
}

#[derive(Copy, Clone, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub enum AlphaMode {
    Straight,
    Premultiplied,
}

/// Byte layout of a 4-channel, 8-bit pixel.
#[derive(Copy, Clone, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub struct PixelLayout {
    pub order: ChannelOrder,
    pub alpha: AlphaMode,
}

impl PixelLayout {
    pub const RGBA: Self = Self {
        order: ChannelOrder::Rgba,
        alpha: AlphaMode::Straight,
    };
    pub const RGBA_PREMULTIPLIED: Self = Self {
        order: ChannelOrder::Rgba,
        alpha: AlphaMode::Premultiplied,
    };
    pub const BGRA: Self = Self {
        order: ChannelOrder::Bgra,
        alpha: AlphaMode::Straight,
    };
    pub const BGRA_PREMULTIPLIED: Self = Self {
        order: ChannelOrder::Bgra,
        alpha: AlphaMode::Premultiplied,
    };
}

#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug, ValueEnum, Serialize, Deserialize)]
pub enum BlendMode {
    Normal,
    Color,
    Multiply,
    ColorBurn,
    Darken,
    HardLight,
    Luminosity,
    Overlay,
    Saturation,
    SoftLight,
    Hue,
}

impl BlendMode {
    /// Every supported mode, in picker order.
    pub const ALL: [BlendMode; 11] = [
        BlendMode::Normal,
        BlendMode::Color,
        BlendMode::Multiply,
        BlendMode::ColorBurn,
        BlendMode::Darken,
        BlendMode::HardLight,
        BlendMode::Luminosity,
        BlendMode::Overlay,
        BlendMode::Saturation,
        BlendMode::SoftLight,
        BlendMode::Hue,
    ];

    pub fn label(self) -> &'static str {
        match self {
            BlendMode::Normal => "Normal",
            BlendMode::Color => "Color",
            BlendMode::Multiply => "Multiply",
            BlendMode::ColorBurn => "Color Burn",
            BlendMode::Darken => "Darken",
            BlendMode::HardLight => "Hard Light",
            BlendMode::Luminosity => "Luminosity",
            BlendMode::Overlay => "Overlay",
            BlendMode::Saturation => "Saturation",
            BlendMode::SoftLight => "Soft Light",
            BlendMode::Hue => "Hue",
        }
    }
}

impl std::fmt::Display for BlendMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Weight of the stylized image in the final composite, in `[0, 1]`.
/// The original is drawn over the stylized image at alpha `1 - mix`.
#[derive(Copy, Clone, PartialEq, PartialOrd, Debug, Serialize, Deserialize)]
#[serde(try_from = "f32", into = "f32")]
pub struct MixCoefficient(f32);

impl MixCoefficient {
    pub const ORIGINAL: Self = Self(0.0);
    pub const STYLIZED: Self = Self(1.0);
    pub const HALF: Self = Self(0.5);

    pub fn new(value: f32) -> Result<Self, Error> {
        if value.is_nan() || !(0.0..=1.0).contains(&value) {
            return Err(Error::InvalidMixCoefficient { value });
        }
        Ok(Self(value))
    }

    pub fn value(self) -> f32 {
        self.0
    }

    /// Opacity applied to the original image during compositing.
    pub fn original_alpha(self) -> f32 {
        1.0 - self.0
    }
}

impl Default for MixCoefficient {
    fn default() -> Self {
        Self::HALF
    }
}

impl TryFrom<f32> for MixCoefficient {
    type Error = Error;

    fn try_from(value: f32) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<MixCoefficient> for f32 {
    fn from(mix: MixCoefficient) -> Self {
        mix.0
    }
}

impl std::fmt::Display for MixCoefficient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.3}", self.0)
    }
}

#[derive(Copy, Clone, PartialEq, Eq, Debug, ValueEnum, Serialize, Deserialize)]
pub enum StylePreset {
    OilPaint,
    Watercolor,
    PencilSketch,
    PopArt,
    Impressionist,
}

impl std::fmt::Display for StylePreset {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            StylePreset::OilPaint => "Oil Paint",
            StylePreset::Watercolor => "Watercolor",
            StylePreset::PencilSketch => "Pencil Sketch",
            StylePreset::PopArt => "Pop Art",
            StylePreset::Impressionist => "Impressionist",
        };
        write!(f, "{}", s)
    }
}

#[derive(Copy, Clone, PartialEq, Eq, Debug, ValueEnum, Serialize, Deserialize)]
pub enum OutputFormat {
    Png,
    Jpeg, // Lossy, drops alpha
}

impl OutputFormat {
    pub fn extension(self) -> &'static str {
        match self {
            OutputFormat::Png => "png",
            OutputFormat::Jpeg => "jpg",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blend_mode_labels_follow_picker() {
        let labels: Vec<&str> = BlendMode::ALL.iter().map(|m| m.label()).collect();
        assert_eq!(
            labels,
            [
                "Normal",
                "Color",
                "Multiply",
                "Color Burn",
                "Darken",
                "Hard Light",
                "Luminosity",
                "Overlay",
                "Saturation",
                "Soft Light",
                "Hue"
            ]
        );
        assert_eq!(BlendMode::SoftLight.to_string(), "Soft Light");
    }

    #[test]
    fn blend_mode_cli_names_are_kebab_case() {
        let parsed = BlendMode::from_str("color-burn", true).unwrap();
        assert_eq!(parsed, BlendMode::ColorBurn);
    }

    #[test]
    fn mix_rejects_out_of_range() {
        assert!(MixCoefficient::new(0.0).is_ok());
        assert!(MixCoefficient::new(1.0).is_ok());
        assert!(matches!(
            MixCoefficient::new(1.01),
            Err(Error::InvalidMixCoefficient { .. })
        ));
        assert!(MixCoefficient::new(-0.1).is_err());
        assert!(MixCoefficient::new(f32::NAN).is_err());
    }

    #[test]
    fn mix_deserialization_validates() {
        let ok: MixCoefficient = serde_json::from_str("0.25").unwrap();
        assert_eq!(ok.value(), 0.25);
        assert_eq!(ok.original_alpha(), 0.75);
        assert!(serde_json::from_str::<MixCoefficient>("2.0").is_err());
    }

    #[test]
    fn rgba_len_detects_overflow() {
        assert_eq!(ImageSize::new(3, 2).rgba_len(), Some(24));
        assert!(ImageSize::new(u32::MAX, u32::MAX).rgba_len().is_none());
    }
}
