use thiserror::Error;

#[derive(Error, Debug)]
pub enum DiffusionError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Shape mismatch from rank {rank}: expected {expected:?}, got {got:?}")]
    ShapeMismatch {
        rank: usize,
        expected: (usize, usize),
        got: (usize, usize),
    },

    #[error("Worker channel closed: {0}")]
    ChannelClosed(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Array write error: {0}")]
    ArrayWrite(#[from] ndarray_npy::WriteNpyError),
}

pub type DiffusionResult<T> = Result<T, DiffusionError>;
