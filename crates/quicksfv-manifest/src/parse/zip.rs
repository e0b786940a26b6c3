use std::io::{Read, Seek};

use quicksfv_digest::{AlgorithmId, DigestValue};

use crate::entry::{ManifestEntry, ParsedManifest};
use crate::error::{ManifestError, Result};
use crate::format::ManifestFormat;
use crate::options::ParseOptions;
use crate::sanitize::normalize_entry_path;

/// Reads the CRC32 and size each ZIP entry header already carries.
///
/// Entries are opened raw, so no payload is inflated and the container's own
/// CRC check never runs here.
#[derive(Clone, Copy, Debug, Default)]
pub struct ZipParser;

impl ZipParser {
    pub fn parse<R: Read + Seek>(&self, reader: R, options: &ParseOptions) -> Result<ParsedManifest> {
        let mut archive =
            ::zip::ZipArchive::new(reader).map_err(|err| ManifestError::Corrupted(err.to_string()))?;
        let mut parsed = ParsedManifest::new(ManifestFormat::Zip);

        for index in 0..archive.len() {
            let file = archive
                .by_index_raw(index)
                .map_err(|err| ManifestError::Corrupted(err.to_string()))?;
            if file.is_dir() {
                continue;
            }

            let path = match file.enclosed_name().and_then(|_| normalize_entry_path(file.name())) {
                Some(path) => path,
                None => {
                    let reason = format!("unsafe entry name `{}`", file.name());
                    super::malformed(&mut parsed, options, index + 1, reason)?;
                    continue;
                }
            };

            let entry = ManifestEntry::new(path, DigestValue::from(file.crc32()), AlgorithmId::CRC32)
                .with_expected_len(file.size());
            parsed.entries.push(entry);
        }

        tracing::debug!(entries = parsed.len(), "indexed zip manifest");
        Ok(parsed)
    }
}
