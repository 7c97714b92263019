use thiserror::Error;

#[derive(Error, Debug)]
pub enum PiecesError {
    #[error("Failed to load image: {0}")]
    ImageLoad(#[from] image::ImageError),

    #[error("Invalid detector configuration: {0}")]
    InvalidConfig(String),

    #[error("Image processing error: {0}")]
    ImageProcessing(String),

    #[error("Contour extraction failed: {0}")]
    ContourExtraction(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, PiecesError>;
