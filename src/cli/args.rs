use clap::Parser;
use std::path::PathBuf;

use becasso::{BlendMode, OutputFormat, StylePreset};

#[derive(Parser, Debug)]
#[command(name = "becasso", version, about = "Style-transfer a photo and blend it back onto the original")]
pub struct CliArgs {
    /// Input image file (single file mode)
    #[arg(short, long)]
    pub input: Option<PathBuf>,

    /// Input directory containing image files (batch mode)
    #[arg(long)]
    pub input_dir: Option<PathBuf>,

    /// Output filename (single file mode)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Output directory for batch processing (batch mode)
    #[arg(long)]
    pub output_dir: Option<PathBuf>,

    /// Output format (png or jpeg)
    #[arg(short = 'f', long, value_enum, default_value_t = OutputFormat::Png)]
    pub format: OutputFormat,

    /// Blend mode used to draw the original over the stylized image
    #[arg(short, long, value_enum, default_value_t = BlendMode::Normal)]
    pub blend_mode: BlendMode,

    /// Stylized weight in [0, 1]; the original is drawn at opacity 1 - mix
    #[arg(short, long, default_value_t = 0.5)]
    pub mix: f32,

    /// Built-in style preset
    #[arg(short, long, value_enum, default_value_t = StylePreset::OilPaint)]
    pub style: StylePreset,

    /// Square model input size in pixels
    #[arg(long, default_value_t = 512)]
    pub model_size: u32,

    /// Downscale photos so the long side is at most this many pixels
    #[arg(long)]
    pub max_size: Option<u32>,

    /// JPEG quality (1-100)
    #[arg(long, default_value_t = 90)]
    pub jpeg_quality: u8,

    /// Write a JSON metadata sidecar next to each output
    #[arg(long, default_value_t = false)]
    pub sidecar: bool,

    /// Load render parameters from a JSON file instead of the flags above
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Enable logging (RUST_LOG overrides the level)
    #[arg(long, default_value_t = false)]
    pub log: bool,

    /// Batch mode: continue processing other files when one fails
    #[arg(long, default_value_t = false)]
    pub batch: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn command_is_well_formed() {
        CliArgs::command().debug_assert();
    }

    #[test]
    fn parses_single_file_flags() {
        let args = CliArgs::try_parse_from([
            "becasso",
            "-i",
            "in.jpg",
            "-o",
            "out.jpg",
            "-f",
            "jpeg",
            "--blend-mode",
            "soft-light",
            "--mix",
            "0.25",
            "--style",
            "pop-art",
        ])
        .unwrap();
        assert_eq!(args.format, OutputFormat::Jpeg);
        assert_eq!(args.blend_mode, BlendMode::SoftLight);
        assert_eq!(args.style, StylePreset::PopArt);
        assert_eq!(args.mix, 0.25);
        assert_eq!(args.model_size, 512);
    }

    #[test]
    fn rejects_unknown_blend_mode() {
        assert!(CliArgs::try_parse_from(["becasso", "--blend-mode", "screen"]).is_err());
    }
}
