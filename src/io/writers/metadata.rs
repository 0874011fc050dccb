use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::{Error, Result};
use crate::types::{BlendMode, ImageSize, MixCoefficient};

/// Everything needed to reproduce a render, written next to the output image.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RenderMetadata {
    pub blend_mode: String,
    pub mix: f32,
    pub model: String,
    pub model_input_size: ImageSize,
    pub width: u32,
    pub height: u32,
    pub source: Option<String>,
    pub created_at: String,
    pub software: String,
}

impl RenderMetadata {
    pub fn new(
        blend_mode: BlendMode,
        mix: MixCoefficient,
        model: &str,
        model_input_size: ImageSize,
        output_size: ImageSize,
    ) -> Self {
        Self {
            blend_mode: blend_mode.label().to_string(),
            mix: mix.value(),
            model: model.to_string(),
            model_input_size,
            width: output_size.width,
            height: output_size.height,
            source: None,
            created_at: chrono::Utc::now().to_rfc3339(),
            software: format!("becasso {}", env!("CARGO_PKG_VERSION")),
        }
    }

    pub fn with_source(mut self, source: &Path) -> Self {
        self.source = Some(source.display().to_string());
        self
    }
}

/// Sidecar location for an output image: same stem, `.json` extension.
pub fn sidecar_path(output_path: &Path) -> PathBuf {
    output_path.with_extension("json")
}

pub fn write_metadata_sidecar(output_path: &Path, meta: &RenderMetadata) -> Result<PathBuf> {
    let path = sidecar_path(output_path);
    let json_string = serde_json::to_string_pretty(meta)?;
    std::fs::write(&path, json_string).map_err(|e| Error::write(&path, e))?;
    info!("Created metadata sidecar: {:?}", path);
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sidecar_replaces_extension() {
        assert_eq!(
            sidecar_path(Path::new("/out/photo.jpg")),
            PathBuf::from("/out/photo.json")
        );
    }

    #[test]
    fn writes_readable_json() {
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("render.png");
        let meta = RenderMetadata::new(
            BlendMode::HardLight,
            MixCoefficient::HALF,
            "filter:Pop Art",
            ImageSize::square(512),
            ImageSize::new(640, 480),
        )
        .with_source(Path::new("in.jpg"));

        let path = write_metadata_sidecar(&output, &meta).unwrap();
        let text = std::fs::read_to_string(path).unwrap();
        let back: RenderMetadata = serde_json::from_str(&text).unwrap();
        assert_eq!(back, meta);
        assert_eq!(back.blend_mode, "Hard Light");
        assert!(chrono::DateTime::parse_from_rfc3339(&back.created_at).is_ok());
    }
}
