use thiserror::Error;

#[derive(Error, Debug)]
pub enum CarryError {
    #[error("Segmentation failed: {0}")]
    Segmentation(#[from] pieces::PiecesError),

    #[error("Hand tracking failed: {0}")]
    HandTracking(#[from] hand::HandError),

    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    #[error("Frame source error: {0}")]
    FrameSource(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, CarryError>;
