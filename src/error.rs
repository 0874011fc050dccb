//! Crate-level error type and `Result` alias for stable, structured error handling.
//! Input, inference and output-conversion failures get distinct variants so a
//! caller can report each one and keep the user's original image on screen.
use thiserror::Error;

use crate::inference::InferenceError;
use crate::types::ImageSize;

pub type Result<T> = std::result::Result<T, Error>;

/// Where in the pipeline an error originated.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum PipelineStage {
    /// Decoding, validating or allocating the input bitmap.
    Input,
    /// Running the style model.
    Inference,
    /// Turning model output (or the composite) back into a bitmap or file.
    Output,
}

#[derive(Debug, Error)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to read input {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write output {path}: {source}")]
    Write {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to decode image {source_name}: {source}")]
    Decode {
        source_name: String,
        #[source]
        source: image::ImageError,
    },

    #[error("Image dimensions must be greater than 0, got: {width}x{height}")]
    ZeroSize { width: u32, height: u32 },

    #[error("Cannot allocate a {width}x{height} pixel buffer")]
    Allocation { width: u32, height: u32 },

    #[error("Pixel data length {actual} does not match {width}x{height} (expected {expected})")]
    InvalidDimensions {
        width: u32,
        height: u32,
        expected: usize,
        actual: usize,
    },

    #[error("Style model error: {0}")]
    Inference(#[from] InferenceError),

    #[error("Model expects {expected} input, got {actual}")]
    ModelInputMismatch { expected: ImageSize, actual: ImageSize },

    #[error("Pixel buffer conversion failed: {0}")]
    BufferConversion(String),

    #[error("Original is {original} but stylized image is {stylized}")]
    DimensionMismatch {
        original: ImageSize,
        stylized: ImageSize,
    },

    #[error("Mix coefficient must be within [0, 1], got: {value}")]
    InvalidMixCoefficient { value: f32 },

    #[error("Resize error: {0}")]
    Resize(String),

    #[error("Encoding error: {0}")]
    Encode(String),

    #[error("Configuration error: {0}")]
    Config(#[from] serde_json::Error),

    #[error("Invalid argument: {arg}={value}")]
    InvalidArgument { arg: &'static str, value: String },

    #[error("Pipeline runner is no longer accepting work")]
    RunnerClosed,

    #[error("External error: {0}")]
    External(String),
}

impl Error {
    pub fn external<E: std::fmt::Display>(e: E) -> Self {
        Error::External(e.to_string())
    }

    pub fn read(path: &std::path::Path, source: std::io::Error) -> Self {
        Error::Read {
            path: path.display().to_string(),
            source,
        }
    }

    pub fn write(path: &std::path::Path, source: std::io::Error) -> Self {
        Error::Write {
            path: path.display().to_string(),
            source,
        }
    }

    /// Pipeline stage this error belongs to.
    ///
    /// `None` is reserved for failures outside a single render: bare `Io`
    /// from directory handling, configuration and argument errors, a closed
    /// runner and `External`. `Resize` is an input failure; resampling model
    /// output back to the photo size reports `BufferConversion`.
    pub fn stage(&self) -> Option<PipelineStage> {
        match self {
            Error::Read { .. }
            | Error::Decode { .. }
            | Error::ZeroSize { .. }
            | Error::Allocation { .. }
            | Error::InvalidDimensions { .. }
            | Error::DimensionMismatch { .. }
            | Error::Resize(_) => Some(PipelineStage::Input),
            Error::Inference(_) | Error::ModelInputMismatch { .. } => {
                Some(PipelineStage::Inference)
            }
            Error::BufferConversion(_) | Error::Encode(_) | Error::Write { .. } => {
                Some(PipelineStage::Output)
            }
            Error::Io(_)
            | Error::InvalidMixCoefficient { .. }
            | Error::Config(_)
            | Error::InvalidArgument { .. }
            | Error::RunnerClosed
            | Error::External(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stages_are_distinct() {
        assert_eq!(
            Error::ZeroSize { width: 0, height: 3 }.stage(),
            Some(PipelineStage::Input)
        );
        assert_eq!(
            Error::Inference(InferenceError::Runtime("boom".into())).stage(),
            Some(PipelineStage::Inference)
        );
        assert_eq!(
            Error::BufferConversion("short".into()).stage(),
            Some(PipelineStage::Output)
        );
        assert_eq!(Error::RunnerClosed.stage(), None);
    }

    #[test]
    fn render_io_and_resampling_have_stages() {
        let missing = || std::io::Error::from(std::io::ErrorKind::NotFound);
        assert_eq!(
            Error::read(std::path::Path::new("in.png"), missing()).stage(),
            Some(PipelineStage::Input)
        );
        assert_eq!(
            Error::write(std::path::Path::new("out.png"), missing()).stage(),
            Some(PipelineStage::Output)
        );
        assert_eq!(
            Error::Resize("bad buffer".into()).stage(),
            Some(PipelineStage::Input)
        );
        assert_eq!(Error::Io(missing()).stage(), None);
    }

    #[test]
    fn messages_carry_sizes() {
        let err = Error::DimensionMismatch {
            original: ImageSize::new(4, 4),
            stylized: ImageSize::new(2, 2),
        };
        assert_eq!(err.to_string(), "Original is 4x4 but stylized image is 2x2");
    }
}
