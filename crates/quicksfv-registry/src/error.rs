use std::path::PathBuf;

use quicksfv_digest::AlgorithmId;

#[derive(Debug, thiserror::Error)]
#[error("unsupported algorithm '{0}'")]
pub struct UnsupportedAlgorithm(pub AlgorithmId);

#[derive(Debug, thiserror::Error)]
pub enum PluginLoadError {
    #[error("failed to open plugin '{path}': {reason}")]
    Open { path: PathBuf, reason: String },

    #[error("plugin '{path}' does not export '{symbol}'")]
    MissingEntryPoint { path: PathBuf, symbol: &'static str },

    #[error("plugin entry point returned no provider")]
    Rejected,

    #[error("plugin ABI version {found} is incompatible with host version {expected}")]
    IncompatibleVersion { expected: u32, found: u32 },

    #[error("plugin declared an invalid algorithm id")]
    InvalidId,

    #[error("plugin vtable is incomplete: missing '{0}'")]
    IncompleteVTable(&'static str),

    #[error("a plugin already provides algorithm '{0}'")]
    DuplicateId(AlgorithmId),
}

pub type Result<T, E = PluginLoadError> = std::result::Result<T, E>;
