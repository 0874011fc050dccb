use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::inference::FilterStyleModel;
use crate::types::{
    BlendMode, DEFAULT_MODEL_INPUT_SIZE, ImageSize, MixCoefficient, OutputFormat, StylePreset,
};

/// Render parameters suitable for config files and presets
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StyleParams {
    pub blend_mode: BlendMode,
    pub mix: MixCoefficient,
    /// Square side length fed to the style model
    pub model_input_size: u32,
    pub style: StylePreset,
    pub format: OutputFormat,
    /// JPEG quality 1-100; ignored for PNG
    pub jpeg_quality: u8,
    /// Downscale the photo so its long side is at most this many pixels; None keeps it
    pub max_size: Option<u32>,
    /// Write a `.json` metadata sidecar next to each output
    pub sidecar: bool,
}

impl Default for StyleParams {
    fn default() -> Self {
        Self {
            blend_mode: BlendMode::Normal,
            mix: MixCoefficient::HALF,
            model_input_size: DEFAULT_MODEL_INPUT_SIZE.width,
            style: StylePreset::OilPaint,
            format: OutputFormat::Png,
            jpeg_quality: 90,
            max_size: None,
            sidecar: false,
        }
    }
}

impl StyleParams {
    pub fn from_json_str(json: &str) -> Result<Self> {
        let params: Self = serde_json::from_str(json)?;
        params.validate()?;
        Ok(params)
    }

    pub fn from_json_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    pub fn to_json_string(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn validate(&self) -> Result<()> {
        if self.model_input_size == 0 {
            return Err(Error::ZeroSize {
                width: 0,
                height: 0,
            });
        }
        if !(1..=100).contains(&self.jpeg_quality) {
            return Err(Error::InvalidArgument {
                arg: "jpeg_quality",
                value: self.jpeg_quality.to_string(),
            });
        }
        if self.max_size == Some(0) {
            return Err(Error::InvalidArgument {
                arg: "max_size",
                value: "0".to_string(),
            });
        }
        Ok(())
    }

    pub fn model_size(&self) -> ImageSize {
        ImageSize::square(self.model_input_size)
    }

    /// Built-in filter model configured from these parameters.
    pub fn filter_model(&self) -> FilterStyleModel {
        FilterStyleModel::new(self.style, self.model_size())
    }
}
