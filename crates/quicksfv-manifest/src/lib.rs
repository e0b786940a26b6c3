//! Checksum manifest parsing.
//!
//! A manifest lists `(path, expected digest, algorithm)` entries. Supported
//! layouts:
//!
//! - SFV text (`PATH CRC32`, `;` comments)
//! - hash lists (`DIGEST  PATH`, `#` comments, `.sha1` / `.sha256` / `.md5`)
//! - ZIP archives, whose entry headers already store a CRC32 per file
//!
//! Bad lines either fail the parse or are skipped with a [`Diagnostic`],
//! depending on [`ParseOptions`].
//!
//! ```
//! use quicksfv_manifest::{ManifestFormat, ParseOptions, parse_bytes};
//!
//! let parsed = parse_bytes(&ManifestFormat::Sfv, b"file.bin 5F3759DF\n", &ParseOptions::default())
//!     .unwrap();
//! assert_eq!(parsed.entries[0].path(), "file.bin");
//! assert_eq!(parsed.entries[0].expected().to_hex(), "5f3759df");
//! ```

pub use self::entry::{Diagnostic, ManifestEntry, ParsedManifest};
pub use self::error::{ManifestError, Result};
pub use self::format::{ManifestFormat, detect_format, detect_from_path, detect_from_reader};
pub use self::options::{MalformedLinePolicy, ParseOptions};
pub use self::parse::{
    HashListParser, ManifestParser, SfvParser, parse_bytes, parse_file, parse_reader, parser_for,
};
#[cfg(feature = "zip")]
pub use self::parse::ZipParser;
pub use self::render::{render_hash_list, render_sfv};
pub use self::sanitize::{is_enclosed, normalize_entry_path};

mod entry;
mod error;
mod format;
mod options;
mod parse;
mod render;
mod sanitize;
