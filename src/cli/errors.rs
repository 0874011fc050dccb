use thiserror::Error;

/// Application-specific errors for the CLI
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Invalid mix value: {value}. Must be a number between 0 and 1")]
    InvalidMix { value: f32 },

    #[error("Model size must be greater than 0, got: {size}")]
    ZeroSize { size: u32 },

    #[error("JPEG quality must be between 1 and 100, got: {quality}")]
    InvalidQuality { quality: u8 },

    #[error("Missing required argument: {arg}")]
    MissingArgument { arg: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Library(#[from] becasso::Error),
}
