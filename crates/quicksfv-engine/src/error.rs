use std::io;

use quicksfv_manifest::ManifestError;

/// Failures that stop a run before any entry is scheduled.
///
/// Per-entry problems never show up here; they are
/// [`Outcome`](crate::Outcome)s in the report.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("manifest error: {0}")]
    Manifest(#[source] ManifestError),

    #[error("cannot read manifest: {0}")]
    Io(#[from] io::Error),
}

impl From<ManifestError> for Error {
    fn from(err: ManifestError) -> Self {
        match err {
            ManifestError::Io(err) => Error::Io(err),
            other => Error::Manifest(other),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
