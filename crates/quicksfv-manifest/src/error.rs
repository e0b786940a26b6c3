use std::io;

#[derive(Debug, thiserror::Error)]
pub enum ManifestError {
    /// `line` is 1-based; for archives it is the entry's position.
    #[error("malformed manifest line {line}: {reason}")]
    MalformedLine { line: usize, reason: String },

    #[error("unsupported manifest format")]
    UnsupportedFormat,

    #[error("manifest container is corrupted: {0}")]
    Corrupted(String),

    #[error(transparent)]
    Io(#[from] io::Error),
}

pub type Result<T> = std::result::Result<T, ManifestError>;
