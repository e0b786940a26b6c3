use std::borrow::Cow;
use std::fmt;

use crate::{DigestError, Result};

/// Identifier of a checksum algorithm, e.g. `crc32` or `sha1`.
///
/// Identifiers are case-insensitive and stored lowercase, so `"CRC32"` and
/// `"crc32"` name the same algorithm. This is the join key between manifest
/// entries and registered providers.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AlgorithmId(Cow<'static, str>);

impl AlgorithmId {
    pub const CRC32: Self = Self(Cow::Borrowed("crc32"));
    pub const SHA1: Self = Self(Cow::Borrowed("sha1"));
    pub const SHA256: Self = Self(Cow::Borrowed("sha256"));
    pub const MD5: Self = Self(Cow::Borrowed("md5"));

    pub fn new(id: impl AsRef<str>) -> Self {
        let id = id.as_ref().trim().to_ascii_lowercase();
        match id.as_str() {
            "crc32" => Self::CRC32,
            "sha1" => Self::SHA1,
            "sha256" => Self::SHA256,
            "md5" => Self::MD5,
            _ => Self(Cow::Owned(id)),
        }
    }

    pub fn as_str(&self) -> &str { &self.0 }

    /// Digest size in bytes for the well-known algorithms.
    ///
    /// Returns `None` for identifiers only a plugin knows about.
    pub fn digest_len(&self) -> Option<usize> {
        match self.as_str() {
            "crc32" => Some(4),
            "md5" => Some(16),
            "sha1" => Some(20),
            "sha256" => Some(32),
            _ => None,
        }
    }
}

impl fmt::Display for AlgorithmId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(&self.0) }
}

impl From<&str> for AlgorithmId {
    fn from(id: &str) -> Self { Self::new(id) }
}

/// Raw digest bytes produced by a provider.
///
/// The canonical text form is lowercase hex; parsing accepts either case.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DigestValue(Vec<u8>);

impl DigestValue {
    pub fn new(bytes: impl Into<Vec<u8>>) -> Self { Self(bytes.into()) }

    /// Parse hex text of any even length.
    pub fn from_hex(text: &str) -> Result<Self> {
        let text = text.trim();
        if text.is_empty() {
            return Err(DigestError::InvalidHex(text.to_string()));
        }
        hex::decode(text)
            .map(Self)
            .map_err(|_| DigestError::InvalidHex(text.to_string()))
    }

    /// Parse hex text that must decode to exactly `len` bytes.
    pub fn from_hex_len(text: &str, len: usize) -> Result<Self> {
        let value = Self::from_hex(text)?;
        if value.len() != len {
            return Err(DigestError::InvalidLength {
                expected: len,
                actual:   value.len(),
            });
        }
        Ok(value)
    }

    pub fn to_hex(&self) -> String { hex::encode(&self.0) }

    pub fn as_bytes(&self) -> &[u8] { &self.0 }

    pub fn len(&self) -> usize { self.0.len() }

    pub fn is_empty(&self) -> bool { self.0.is_empty() }
}

impl From<u32> for DigestValue {
    /// Big-endian, so the hex form matches SFV listings.
    fn from(crc: u32) -> Self { Self(crc.to_be_bytes().to_vec()) }
}

impl fmt::Display for DigestValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(&self.to_hex()) }
}

impl fmt::Debug for DigestValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "DigestValue({})", self.to_hex())
    }
}
