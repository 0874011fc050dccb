use std::path::Path;

use tracing::info;
use tracing_subscriber::EnvFilter;

use becasso::{MixCoefficient, StyleParams};
use becasso::api::{pipeline_from_params, process_directory_to_path, process_file_to_path};

use super::args::CliArgs;
use super::errors::AppError;

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug"));
    // A subscriber may already be installed when embedded; keep the existing one.
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}

/// Build render parameters from a config file, or from flags when none is given.
pub fn params_from_args(args: &CliArgs) -> Result<StyleParams, AppError> {
    if let Some(config) = &args.config {
        info!("Loading parameters from {:?}", config);
        return Ok(StyleParams::from_json_file(config)?);
    }

    let mix = MixCoefficient::new(args.mix).map_err(|_| AppError::InvalidMix { value: args.mix })?;
    if args.model_size == 0 {
        return Err(AppError::ZeroSize {
            size: args.model_size,
        });
    }
    if !(1..=100).contains(&args.jpeg_quality) {
        return Err(AppError::InvalidQuality {
            quality: args.jpeg_quality,
        });
    }

    let params = StyleParams {
        blend_mode: args.blend_mode,
        mix,
        model_input_size: args.model_size,
        style: args.style,
        format: args.format,
        jpeg_quality: args.jpeg_quality,
        max_size: args.max_size,
        sidecar: args.sidecar,
    };
    params.validate()?;
    Ok(params)
}

fn process_single_file(input: &Path, output: &Path, params: &StyleParams) -> Result<(), AppError> {
    let pipeline = pipeline_from_params(params);
    process_file_to_path(input, output, params, &pipeline)?;
    info!("Successfully processed: {:?} -> {:?}", input, output);
    Ok(())
}

pub fn run(args: CliArgs) -> Result<(), Box<dyn std::error::Error>> {
    if args.log {
        init_logging();
    }

    let params = params_from_args(&args)?;
    info!(
        "Blend mode {}, mix {}, style {}, model input {}",
        params.blend_mode,
        params.mix,
        params.style,
        params.model_size()
    );

    let batch_mode = args.batch || args.input_dir.is_some();

    if batch_mode {
        let input_dir = args.input_dir.ok_or(AppError::MissingArgument {
            arg: "--input-dir".to_string(),
        })?;
        let output_dir = args.output_dir.ok_or(AppError::MissingArgument {
            arg: "--output-dir".to_string(),
        })?;

        info!("Starting batch processing from directory: {:?}", input_dir);
        info!("Output directory: {:?}", output_dir);

        let pipeline = pipeline_from_params(&params);
        let report =
            process_directory_to_path(&input_dir, &output_dir, &params, &pipeline, args.batch)?;

        info!("Batch processing complete!");
        info!("Processed: {}", report.processed);
        info!("Skipped: {}", report.skipped);
        info!("Errors: {}", report.errors);
    } else {
        let input = args.input.ok_or(AppError::MissingArgument {
            arg: "--input".to_string(),
        })?;
        let output = args.output.ok_or(AppError::MissingArgument {
            arg: "--output".to_string(),
        })?;

        process_single_file(&input, &output, &params)?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn out_of_range_mix_is_reported() {
        let args = CliArgs::try_parse_from(["becasso", "--mix", "1.5"]).unwrap();
        assert!(matches!(
            params_from_args(&args),
            Err(AppError::InvalidMix { .. })
        ));
    }

    #[test]
    fn flags_become_params() {
        let args =
            CliArgs::try_parse_from(["becasso", "--model-size", "256", "--sidecar", "-b", "hue"])
                .unwrap();
        let params = params_from_args(&args).unwrap();
        assert_eq!(params.model_input_size, 256);
        assert!(params.sidecar);
        assert_eq!(params.blend_mode, becasso::BlendMode::Hue);
    }

    #[test]
    fn config_file_wins() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("params.json");
        std::fs::write(&path, r#"{ "blend_mode": "Darken", "mix": 0.1 }"#).unwrap();
        let args = CliArgs::try_parse_from([
            "becasso",
            "--config",
            path.to_str().unwrap(),
            "-b",
            "hue",
        ])
        .unwrap();
        let params = params_from_args(&args).unwrap();
        assert_eq!(params.blend_mode, becasso::BlendMode::Darken);
    }

    #[test]
    fn single_mode_requires_input() {
        let args = CliArgs::try_parse_from(["becasso", "-o", "out.png"]).unwrap();
        assert!(run(args).is_err());
    }
}
