//! High-level, ergonomic library API: stylize a photo file to a file or an
//! in-memory bitmap, and batch helpers for directories. Prefer these entry
//! points over the low-level `core` modules when integrating becasso.
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use tracing::{info, warn};

use crate::core::bitmap::Bitmap;
use crate::core::params::StyleParams;
use crate::core::processing::pipeline::{StylePipeline, StyleRequest};
use crate::core::processing::resize::{calculate_resize_dimensions, resize_bitmap};
use crate::error::Result;
use crate::inference::{FilterStyleModel, StyleModel};
use crate::io::reader::load_bitmap;
use crate::io::writers::{RenderMetadata, write_bitmap, write_metadata_sidecar};

/// Pipeline around the built-in filter model described by `params`.
pub fn pipeline_from_params(params: &StyleParams) -> StylePipeline<FilterStyleModel> {
    StylePipeline::new(params.filter_model())
}

/// Apply `params.max_size` to a freshly loaded photo.
pub fn prepare_original(bitmap: Bitmap, params: &StyleParams) -> Result<Bitmap> {
    match params.max_size {
        Some(long_side) => {
            let target = calculate_resize_dimensions(bitmap.size(), long_side);
            if target == bitmap.size() {
                Ok(bitmap)
            } else {
                info!("Downscaling photo from {} to {}", bitmap.size(), target);
                resize_bitmap(&bitmap, target)
            }
        }
        None => Ok(bitmap),
    }
}

/// Stylize an in-memory photo with the blend settings in `params`.
pub fn process_bitmap<M: StyleModel>(
    original: Bitmap,
    params: &StyleParams,
    pipeline: &StylePipeline<M>,
) -> Result<Bitmap> {
    params.validate()?;
    let original = prepare_original(original, params)?;
    pipeline.run(&StyleRequest::new(original, params.blend_mode, params.mix))
}

/// Decode `input` and stylize it, without touching the filesystem otherwise.
pub fn process_file_to_buffer<M: StyleModel>(
    input: &Path,
    params: &StyleParams,
    pipeline: &StylePipeline<M>,
) -> Result<Bitmap> {
    let original = load_bitmap(input)?;
    process_bitmap(original, params, pipeline)
}

/// Decode `input`, stylize it and write the result (and optional sidecar) to `output`.
pub fn process_file_to_path<M: StyleModel>(
    input: &Path,
    output: &Path,
    params: &StyleParams,
    pipeline: &StylePipeline<M>,
) -> Result<()> {
    let rendered = process_file_to_buffer(input, params, pipeline)?;
    write_bitmap(&rendered, output, params.format, params.jpeg_quality)?;

    if params.sidecar {
        let meta = RenderMetadata::new(
            params.blend_mode,
            params.mix,
            pipeline.model().name(),
            pipeline.model_input_size(),
            rendered.size(),
        )
        .with_source(input);
        write_metadata_sidecar(output, &meta)?;
    }
    Ok(())
}

/// Summary of a directory run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatchReport {
    pub processed: usize,
    pub skipped: usize,
    pub errors: usize,
}

fn is_image_path(path: &Path) -> bool {
    image::ImageFormat::from_path(path).is_ok()
}

/// Output path for `input` inside `output_dir`, with the format's extension.
pub fn batch_output_path(input: &Path, output_dir: &Path, params: &StyleParams) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "output".to_string());
    output_dir.join(format!("{}.{}", stem, params.format.extension()))
}

/// Stylize every image file directly inside `input_dir` into `output_dir`.
///
/// Subdirectories and files with unrecognized extensions are skipped, as is
/// any file whose output name would overwrite one of the inputs or an output
/// already written by this run (`a.png` and `a.jpg` both map to `a.png`). With
/// `continue_on_error`, a failing file is counted and the run moves on;
/// otherwise the first error is returned.
pub fn process_directory_to_path<M: StyleModel>(
    input_dir: &Path,
    output_dir: &Path,
    params: &StyleParams,
    pipeline: &StylePipeline<M>,
    continue_on_error: bool,
) -> Result<BatchReport> {
    params.validate()?;
    fs::create_dir_all(output_dir)?;

    let mut entries: Vec<PathBuf> = fs::read_dir(input_dir)?
        .map(|entry| entry.map(|e| e.path()))
        .collect::<std::io::Result<_>>()?;
    entries.sort();

    // Canonical paths, so `out/../in/a.png` still matches `in/a.png`.
    let input_files: HashSet<PathBuf> = entries
        .iter()
        .filter_map(|p| fs::canonicalize(p).ok())
        .collect();
    let mut claimed: HashSet<PathBuf> = HashSet::new();
    let mut report = BatchReport::default();
    for path in &entries {
        let path = path.as_path();
        if !path.is_file() || !is_image_path(path) {
            info!("Skipping non-image entry: {:?}", path);
            report.skipped += 1;
            continue;
        }

        let output_path = batch_output_path(path, output_dir, params);
        if fs::canonicalize(&output_path).is_ok_and(|p| input_files.contains(&p)) {
            warn!(
                "Skipping {:?}: output {:?} would overwrite an input file",
                path, output_path
            );
            report.skipped += 1;
            continue;
        }
        if !claimed.insert(output_path.clone()) {
            warn!(
                "Skipping {:?}: output {:?} was already written in this run",
                path, output_path
            );
            report.skipped += 1;
            continue;
        }
        info!("Processing: {:?} -> {:?}", path, output_path);
        match process_file_to_path(path, &output_path, params, pipeline) {
            Ok(()) => report.processed += 1,
            Err(e) if continue_on_error => {
                warn!("Error processing {:?}: {}", path, e);
                report.errors += 1;
            }
            Err(e) => return Err(e),
        }
    }

    info!(
        "Batch complete: processed={} skipped={} errors={}",
        report.processed, report.skipped, report.errors
    );
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{ImageSize, OutputFormat};

    #[test]
    fn max_size_downscales_long_side() {
        let params = StyleParams {
            max_size: Some(50),
            ..StyleParams::default()
        };
        let photo = Bitmap::solid(200, 100, [1, 2, 3, 255]).unwrap();
        let prepared = prepare_original(photo, &params).unwrap();
        assert_eq!(prepared.size(), ImageSize::new(50, 25));
    }

    #[test]
    fn batch_names_use_format_extension() {
        let params = StyleParams {
            format: OutputFormat::Jpeg,
            ..StyleParams::default()
        };
        assert_eq!(
            batch_output_path(Path::new("/in/holiday.png"), Path::new("/out"), &params),
            PathBuf::from("/out/holiday.jpg")
        );
    }

    #[test]
    fn filter_pipeline_uses_configured_size() {
        let params = StyleParams {
            model_input_size: 64,
            ..StyleParams::default()
        };
        let pipeline = pipeline_from_params(&params);
        assert_eq!(pipeline.model_input_size(), ImageSize::square(64));
        let out = process_bitmap(Bitmap::solid(30, 20, [90, 120, 200, 255]).unwrap(), &params, &pipeline)
            .unwrap();
        assert_eq!(out.size(), ImageSize::new(30, 20));
    }
}
