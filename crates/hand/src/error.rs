use thiserror::Error;

#[derive(Error, Debug)]
pub enum HandError {
    #[error("Expected {expected} keypoints, got {actual}")]
    KeypointCount { expected: usize, actual: usize },

    #[error("Invalid hand recording at line {line}: {source}")]
    Recording {
        line: usize,
        #[source]
        source: serde_json::Error,
    },

    #[error("Hand estimation failed: {0}")]
    Estimation(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, HandError>;
