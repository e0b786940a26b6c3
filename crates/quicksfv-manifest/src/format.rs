use std::io::{self, Read, Seek};
use std::path::Path;

use quicksfv_digest::AlgorithmId;

/// Manifest layouts understood by the parsers.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ManifestFormat {
    /// `PATH HEXCRC32` per line, `;` comments.
    Sfv,
    /// `HEXDIGEST  PATH` per line, `#` comments, one algorithm per file.
    HashList(AlgorithmId),
    /// Checksums stored in the ZIP container's own entry headers.
    Zip,
}

impl ManifestFormat {
    /// Format implied by a file extension, case-insensitively.
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "sfv" => Some(Self::Sfv),
            "sha1" => Some(Self::HashList(AlgorithmId::SHA1)),
            "sha256" => Some(Self::HashList(AlgorithmId::SHA256)),
            "md5" => Some(Self::HashList(AlgorithmId::MD5)),
            "zip" => Some(Self::Zip),
            _ => None,
        }
    }
}

pub fn detect_format(data: &[u8]) -> Option<ManifestFormat> {
    match data {
        [0x50, 0x4B, 0x03, 0x04, ..] | [0x50, 0x4B, 0x05, 0x06, ..] => Some(ManifestFormat::Zip),
        _ => None,
    }
}

/// Extension first, then magic bytes.
pub fn detect_from_path<R: Read + Seek>(
    path: &Path,
    reader: &mut R,
) -> io::Result<Option<ManifestFormat>> {
    if let Some(format) = path
        .extension()
        .and_then(|ext| ext.to_str())
        .and_then(ManifestFormat::from_extension)
    {
        return Ok(Some(format));
    }
    detect_from_reader(reader)
}

pub fn detect_from_reader<R: Read + Seek>(reader: &mut R) -> io::Result<Option<ManifestFormat>> {
    let mut header = Vec::with_capacity(4);
    reader.by_ref().take(4).read_to_end(&mut header)?;
    reader.rewind()?;
    Ok(detect_format(&header))
}
