use quicksfv_digest::{AlgorithmId, DigestValue};

use crate::format::ManifestFormat;

/// One `(path, expected digest, algorithm)` record of a manifest.
///
/// Paths use `/` separators regardless of how the manifest spelled them.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ManifestEntry {
    path:         String,
    expected:     DigestValue,
    algorithm:    AlgorithmId,
    expected_len: Option<u64>,
}

impl ManifestEntry {
    pub fn new(path: impl Into<String>, expected: DigestValue, algorithm: AlgorithmId) -> Self {
        Self {
            path: path.into(),
            expected,
            algorithm,
            expected_len: None,
        }
    }

    pub fn with_expected_len(mut self, len: u64) -> Self {
        self.expected_len = Some(len);
        self
    }

    pub fn path(&self) -> &str { &self.path }

    pub fn expected(&self) -> &DigestValue { &self.expected }

    pub fn algorithm(&self) -> &AlgorithmId { &self.algorithm }

    pub fn expected_len(&self) -> Option<u64> { self.expected_len }
}

/// A line skipped under [`MalformedLinePolicy::Skip`](crate::MalformedLinePolicy::Skip).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Diagnostic {
    pub line:   usize,
    pub reason: String,
}

/// Parser output, entries in manifest order.
#[derive(Clone, Debug)]
pub struct ParsedManifest {
    pub format:      ManifestFormat,
    pub entries:     Vec<ManifestEntry>,
    pub diagnostics: Vec<Diagnostic>,
}

impl ParsedManifest {
    pub fn new(format: ManifestFormat) -> Self {
        Self {
            format,
            entries: Vec::new(),
            diagnostics: Vec::new(),
        }
    }

    pub fn len(&self) -> usize { self.entries.len() }

    pub fn is_empty(&self) -> bool { self.entries.is_empty() }
}
