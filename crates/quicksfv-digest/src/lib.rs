//! Streaming digest providers for checksum verification.
//!
//! A [`DigestProvider`] computes one algorithm's digest incrementally with an
//! explicit begin/update/finalize lifecycle. Built-in providers cover CRC32,
//! SHA-1 and SHA-256; other algorithms plug in through the same trait.
//!
//! # Example
//!
//! ```
//! use quicksfv_digest::{DigestProvider, crc32};
//!
//! let mut provider = crc32();
//! provider.begin().unwrap();
//! provider.update(b"12345").unwrap();
//! provider.update(b"6789").unwrap();
//! let value = provider.finalize().unwrap();
//!
//! assert_eq!(provider.format(&value), "cbf43926");
//! assert_eq!(provider.parse("CBF43926").unwrap(), value);
//! ```

pub use self::error::{DigestError, Result};
pub use self::hasher::Hasher;
pub use self::provider::{DigestProvider, HasherProvider, digest_bytes};
pub use self::reader::{DigestReader, digest_reader};
pub use self::value::{AlgorithmId, DigestValue};

#[cfg(feature = "crc32")]
pub use self::hasher::Crc32Hasher;
#[cfg(feature = "crc32")]
pub use self::provider::crc32;

#[cfg(any(feature = "sha1", feature = "sha256"))]
pub use self::hasher::DigestHasher;

#[cfg(feature = "sha1")]
pub use self::hasher::Sha1Hasher;
#[cfg(feature = "sha1")]
pub use self::provider::sha1;

#[cfg(feature = "sha256")]
pub use self::hasher::Sha256Hasher;
#[cfg(feature = "sha256")]
pub use self::provider::sha256;

mod error;
mod hasher;
mod provider;
mod reader;
mod value;
