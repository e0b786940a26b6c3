use quicksfv_digest::{AlgorithmId, DigestValue};

use crate::entry::{ManifestEntry, ParsedManifest};
use crate::error::Result;
use crate::format::ManifestFormat;
use crate::options::ParseOptions;
use crate::sanitize::normalize_entry_path;

/// `PATH<whitespace>HEXCRC32` lines, `;` comments.
///
/// The digest is the last whitespace-separated token, so paths may contain
/// spaces.
#[derive(Clone, Copy, Debug, Default)]
pub struct SfvParser;

impl SfvParser {
    pub fn parse(&self, text: &str, options: &ParseOptions) -> Result<ParsedManifest> {
        super::parse_lines(text, ManifestFormat::Sfv, ';', options, parse_line)
    }
}

fn parse_line(line: &str) -> std::result::Result<ManifestEntry, String> {
    let (path, hex) = line
        .rsplit_once(char::is_whitespace)
        .ok_or_else(|| format!("expected `PATH CRC32`, found `{line}`"))?;
    let path = normalize_entry_path(path.trim_end()).ok_or("empty path")?;
    let len = AlgorithmId::CRC32.digest_len().unwrap_or(4);
    let expected = DigestValue::from_hex_len(hex, len)
        .map_err(|err| format!("bad CRC32 `{hex}`: {err}"))?;
    Ok(ManifestEntry::new(path, expected, AlgorithmId::CRC32))
}
