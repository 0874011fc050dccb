//! Deterministic convolution-filter stand-in for a neural style model.
//!
//! Each preset is a fixed recipe of 3x3 Gaussian blur passes, Sobel edge
//! darkening, saturation boost and posterization. It needs no weights, so the
//! CLI can run the full pipeline without a trained network.
use crate::core::processing::pixel_buffer::PixelBuffer;
use crate::inference::{InferenceError, StyleModel};
use crate::types::{DEFAULT_MODEL_INPUT_SIZE, ImageSize, StylePreset};

type Kernel3x3 = [[f32; 3]; 3];

const BLUR: Kernel3x3 = [
    [1.0 / 16.0, 2.0 / 16.0, 1.0 / 16.0],
    [2.0 / 16.0, 4.0 / 16.0, 2.0 / 16.0],
    [1.0 / 16.0, 2.0 / 16.0, 1.0 / 16.0],
];
const SOBEL_X: Kernel3x3 = [[-1.0, 0.0, 1.0], [-2.0, 0.0, 2.0], [-1.0, 0.0, 1.0]];
const SOBEL_Y: Kernel3x3 = [[-1.0, -2.0, -1.0], [0.0, 0.0, 0.0], [1.0, 2.0, 1.0]];

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FilterRecipe {
    pub blur_passes: usize,
    /// Edge darkening strength (0-1)
    pub edge_strength: f32,
    /// Saturation multiplier around luminance; 1.0 leaves colors alone
    pub color_boost: f32,
    pub posterize_levels: u8,
}

impl FilterRecipe {
    pub fn for_preset(preset: StylePreset) -> Self {
        match preset {
            StylePreset::OilPaint => Self {
                blur_passes: 2,
                edge_strength: 0.3,
                color_boost: 1.2,
                posterize_levels: 8,
            },
            StylePreset::Watercolor => Self {
                blur_passes: 3,
                edge_strength: 0.1,
                color_boost: 0.9,
                posterize_levels: 12,
            },
            StylePreset::PencilSketch => Self {
                blur_passes: 1,
                edge_strength: 1.0,
                color_boost: 0.0,
                posterize_levels: 2,
            },
            StylePreset::PopArt => Self {
                blur_passes: 0,
                edge_strength: 0.5,
                color_boost: 2.0,
                posterize_levels: 4,
            },
            StylePreset::Impressionist => Self {
                blur_passes: 2,
                edge_strength: 0.2,
                color_boost: 1.1,
                posterize_levels: 16,
            },
        }
    }
}

pub struct FilterStyleModel {
    name: String,
    size: ImageSize,
    recipe: FilterRecipe,
}

impl FilterStyleModel {
    pub fn new(preset: StylePreset, size: ImageSize) -> Self {
        Self {
            name: format!("filter:{}", preset),
            size,
            recipe: FilterRecipe::for_preset(preset),
        }
    }

    pub fn with_recipe(name: impl Into<String>, recipe: FilterRecipe, size: ImageSize) -> Self {
        Self {
            name: name.into(),
            size,
            recipe,
        }
    }

    pub fn recipe(&self) -> FilterRecipe {
        self.recipe
    }
}

impl Default for FilterStyleModel {
    fn default() -> Self {
        Self::new(StylePreset::OilPaint, DEFAULT_MODEL_INPUT_SIZE)
    }
}

impl StyleModel for FilterStyleModel {
    fn name(&self) -> &str {
        &self.name
    }

    fn input_size(&self) -> ImageSize {
        self.size
    }

    fn predict(&self, input: &PixelBuffer) -> Result<PixelBuffer, InferenceError> {
        if input.size() != self.size {
            return Err(InferenceError::InvalidInput(format!(
                "expected {} buffer, got {}",
                self.size,
                input.size()
            )));
        }
        let width = self.size.width as usize;
        let height = self.size.height as usize;
        let bytes = input.as_bytes();

        let mut planes = Planes::from_bgra(bytes, width, height);
        let edges = if self.recipe.edge_strength > 0.0 {
            Some(planes.edge_magnitude())
        } else {
            None
        };

        for _ in 0..self.recipe.blur_passes {
            planes = planes.map_channels(|c| convolve(c, width, height, &BLUR));
        }

        let levels = f32::from(self.recipe.posterize_levels.max(1));
        let mut out = Vec::with_capacity(bytes.len());
        for i in 0..width * height {
            let mut rgb = [planes.r[i], planes.g[i], planes.b[i]];

            if let Some(edges) = &edges {
                let darken = edges[i] * self.recipe.edge_strength;
                rgb = rgb.map(|v| (v - darken).clamp(0.0, 1.0));
            }

            if (self.recipe.color_boost - 1.0).abs() > 0.01 {
                let lum = luminance(rgb);
                rgb = rgb.map(|v| (lum + (v - lum) * self.recipe.color_boost).clamp(0.0, 1.0));
            }

            if self.recipe.posterize_levels < 255 {
                rgb = rgb.map(|v| (v * levels).round() / levels);
            }

            let [r, g, b] = rgb.map(|v| (v.clamp(0.0, 1.0) * 255.0).round() as u8);
            out.extend_from_slice(&[b, g, r, bytes[i * 4 + 3]]);
        }

        PixelBuffer::new(self.size, out).map_err(|e| InferenceError::Runtime(e.to_string()))
    }
}

fn luminance(rgb: [f32; 3]) -> f32 {
    0.2126 * rgb[0] + 0.7152 * rgb[1] + 0.0722 * rgb[2]
}

struct Planes {
    r: Vec<f32>,
    g: Vec<f32>,
    b: Vec<f32>,
    width: usize,
    height: usize,
}

impl Planes {
    fn from_bgra(bytes: &[u8], width: usize, height: usize) -> Self {
        let n = width * height;
        let mut planes = Self {
            r: Vec::with_capacity(n),
            g: Vec::with_capacity(n),
            b: Vec::with_capacity(n),
            width,
            height,
        };
        for px in bytes.chunks_exact(4) {
            planes.b.push(px[0] as f32 / 255.0);
            planes.g.push(px[1] as f32 / 255.0);
            planes.r.push(px[2] as f32 / 255.0);
        }
        planes
    }

    fn map_channels(self, f: impl Fn(&[f32]) -> Vec<f32>) -> Self {
        Self {
            r: f(&self.r),
            g: f(&self.g),
            b: f(&self.b),
            width: self.width,
            height: self.height,
        }
    }

    fn edge_magnitude(&self) -> Vec<f32> {
        let gray: Vec<f32> = (0..self.r.len())
            .map(|i| luminance([self.r[i], self.g[i], self.b[i]]))
            .collect();
        let gx = convolve(&gray, self.width, self.height, &SOBEL_X);
        let gy = convolve(&gray, self.width, self.height, &SOBEL_Y);
        gx.iter()
            .zip(gy.iter())
            .map(|(&x, &y)| (x * x + y * y).sqrt().min(1.0))
            .collect()
    }
}

/// 3x3 convolution with border pixels replicated outward.
fn convolve(img: &[f32], width: usize, height: usize, kernel: &Kernel3x3) -> Vec<f32> {
    let mut output = vec![0.0; width * height];
    for y in 0..height {
        for x in 0..width {
            let mut sum = 0.0_f32;
            for (ky, row) in kernel.iter().enumerate() {
                let py = (y + ky).saturating_sub(1).min(height - 1);
                for (kx, weight) in row.iter().enumerate() {
                    let px = (x + kx).saturating_sub(1).min(width - 1);
                    sum += img[py * width + px] * weight;
                }
            }
            output[y * width + x] = sum;
        }
    }
    output
}

#[cfg(test)]
mod tests {
    use super::*;

    fn checker(size: ImageSize) -> PixelBuffer {
        let mut data = Vec::new();
        for y in 0..size.height {
            for x in 0..size.width {
                let v = if (x / 4 + y / 4) % 2 == 0 { 230 } else { 20 };
                data.extend_from_slice(&[v, 255 - v, v / 2, 200]);
            }
        }
        PixelBuffer::new(size, data).unwrap()
    }

    #[test]
    fn output_matches_declared_size_and_keeps_alpha() {
        let size = ImageSize::square(32);
        let model = FilterStyleModel::new(StylePreset::Watercolor, size);
        let out = model.predict(&checker(size)).unwrap();
        assert_eq!(out.size(), model.output_size());
        assert!(out.as_bytes().chunks_exact(4).all(|px| px[3] == 200));
    }

    #[test]
    fn is_deterministic() {
        let size = ImageSize::new(24, 16);
        let input = checker(size);
        for preset in [
            StylePreset::OilPaint,
            StylePreset::PencilSketch,
            StylePreset::PopArt,
            StylePreset::Impressionist,
        ] {
            let model = FilterStyleModel::new(preset, size);
            assert_eq!(model.predict(&input).unwrap(), model.predict(&input).unwrap());
        }
    }

    #[test]
    fn uniform_input_has_no_edges() {
        let size = ImageSize::square(8);
        let recipe = FilterRecipe {
            blur_passes: 2,
            edge_strength: 1.0,
            color_boost: 1.0,
            posterize_levels: 255,
        };
        let model = FilterStyleModel::with_recipe("flat", recipe, size);
        let input = PixelBuffer::new(size, [40, 80, 120, 255].repeat(64)).unwrap();
        let out = model.predict(&input).unwrap();
        assert_eq!(out, input);
    }

    #[test]
    fn pencil_sketch_is_grayscale() {
        let size = ImageSize::square(16);
        let model = FilterStyleModel::new(StylePreset::PencilSketch, size);
        let out = model.predict(&checker(size)).unwrap();
        assert!(out.as_bytes().chunks_exact(4).all(|px| px[0] == px[1] && px[1] == px[2]));
    }

    #[test]
    fn rejects_foreign_size() {
        let model = FilterStyleModel::new(StylePreset::PopArt, ImageSize::square(8));
        let err = model.predict(&checker(ImageSize::square(4))).unwrap_err();
        assert!(matches!(err, InferenceError::InvalidInput(_)));
    }
}
