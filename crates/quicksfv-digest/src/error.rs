use std::io;

#[derive(Debug, thiserror::Error)]
pub enum DigestError {
    #[error("invalid state: {0}")]
    InvalidState(&'static str),

    #[error("invalid hex digest '{0}'")]
    InvalidHex(String),

    #[error("digest length mismatch: expected {expected} bytes, got {actual}")]
    InvalidLength { expected: usize, actual: usize },

    #[error(transparent)]
    Io(#[from] io::Error),
}

pub type Result<T> = std::result::Result<T, DigestError>;
