use std::fs::File;
use std::io::{BufReader, Cursor, Read, Seek};
use std::path::Path;

use crate::entry::{Diagnostic, ManifestEntry, ParsedManifest};
use crate::error::{ManifestError, Result};
use crate::format::{self, ManifestFormat};
use crate::options::{MalformedLinePolicy, ParseOptions};

mod hashlist;
mod sfv;
#[cfg(feature = "zip")]
mod zip;

pub use self::hashlist::HashListParser;
pub use self::sfv::SfvParser;
#[cfg(feature = "zip")]
pub use self::zip::ZipParser;

pub enum ManifestParser {
    Sfv(SfvParser),
    HashList(HashListParser),
    #[cfg(feature = "zip")]
    Zip(ZipParser),
}

impl ManifestParser {
    pub fn parse<R: Read + Seek>(&self, reader: R, options: &ParseOptions) -> Result<ParsedManifest> {
        match self {
            ManifestParser::Sfv(parser) => parser.parse(read_text(reader)?.as_str(), options),
            ManifestParser::HashList(parser) => {
                parser.parse(read_text(reader)?.as_str(), options)
            }
            #[cfg(feature = "zip")]
            ManifestParser::Zip(parser) => parser.parse(reader, options),
        }
    }
}

pub fn parser_for(format: &ManifestFormat) -> Result<ManifestParser> {
    match format {
        ManifestFormat::Sfv => Ok(ManifestParser::Sfv(SfvParser)),
        ManifestFormat::HashList(algorithm) => {
            Ok(ManifestParser::HashList(HashListParser::new(algorithm.clone())))
        }
        #[cfg(feature = "zip")]
        ManifestFormat::Zip => Ok(ManifestParser::Zip(ZipParser)),
        #[cfg(not(feature = "zip"))]
        ManifestFormat::Zip => Err(ManifestError::UnsupportedFormat),
    }
}

pub fn parse_reader<R: Read + Seek>(
    format: &ManifestFormat,
    reader: R,
    options: &ParseOptions,
) -> Result<ParsedManifest> {
    parser_for(format)?.parse(reader, options)
}

pub fn parse_bytes(
    format: &ManifestFormat,
    bytes: &[u8],
    options: &ParseOptions,
) -> Result<ParsedManifest> {
    parse_reader(format, Cursor::new(bytes), options)
}

/// Detect the format of the manifest at `path` and parse it.
pub fn parse_file(path: &Path, options: &ParseOptions) -> Result<ParsedManifest> {
    let mut reader = BufReader::new(File::open(path)?);
    let format =
        format::detect_from_path(path, &mut reader)?.ok_or(ManifestError::UnsupportedFormat)?;
    tracing::debug!(path = %path.display(), ?format, "parsing manifest");
    parse_reader(&format, reader, options)
}

/// UTF-8 with a lossy fallback; a leading BOM is dropped.
fn read_text<R: Read>(mut reader: R) -> Result<String> {
    let mut bytes = Vec::new();
    reader.read_to_end(&mut bytes)?;
    let bytes = bytes.strip_prefix(b"\xEF\xBB\xBF").unwrap_or(&bytes[..]);
    Ok(String::from_utf8_lossy(bytes).into_owned())
}

/// Shared driver for the line-oriented formats.
///
/// Blank lines and lines starting with `comment` are ignored. `parse_line`
/// receives the trimmed line.
fn parse_lines(
    text: &str,
    format: ManifestFormat,
    comment: char,
    options: &ParseOptions,
    mut parse_line: impl FnMut(&str) -> std::result::Result<ManifestEntry, String>,
) -> Result<ParsedManifest> {
    let mut parsed = ParsedManifest::new(format);
    for (index, raw) in text.lines().enumerate() {
        let line = raw.trim();
        if line.is_empty() || line.starts_with(comment) {
            continue;
        }
        match parse_line(line) {
            Ok(entry) => parsed.entries.push(entry),
            Err(reason) => malformed(&mut parsed, options, index + 1, reason)?,
        }
    }
    Ok(parsed)
}

fn malformed(
    parsed: &mut ParsedManifest,
    options: &ParseOptions,
    line: usize,
    reason: String,
) -> Result<()> {
    match options.malformed {
        MalformedLinePolicy::Reject => Err(ManifestError::MalformedLine { line, reason }),
        MalformedLinePolicy::Skip => {
            tracing::warn!(line, %reason, "skipping malformed manifest line");
            parsed.diagnostics.push(Diagnostic { line, reason });
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bom_is_stripped() {
        let text = read_text(Cursor::new(b"\xEF\xBB\xBFa.bin 00000000".to_vec())).unwrap();
        assert_eq!(text, "a.bin 00000000");
    }

    #[test]
    fn invalid_utf8_is_decoded_lossily() {
        let text = read_text(Cursor::new(b"caf\xE9.bin 00000000".to_vec())).unwrap();
        assert!(text.starts_with("caf"));
        assert!(text.ends_with(".bin 00000000"));
    }

    #[test]
    fn reject_policy_names_the_line() {
        let err = parse_bytes(
            &ManifestFormat::Sfv,
            b"; header\n\ngood.bin 00000000\nbad-line\n",
            &ParseOptions::default(),
        )
        .unwrap_err();
        assert!(matches!(err, ManifestError::MalformedLine { line: 4, .. }));
    }

    #[test]
    fn skip_policy_records_diagnostics() {
        let parsed = parse_bytes(
            &ManifestFormat::Sfv,
            b"bad-line\ngood.bin 00000000\nworse.bin XYZ\n",
            &ParseOptions::skip_malformed(),
        )
        .unwrap();
        assert_eq!(parsed.len(), 1);
        let lines: Vec<usize> = parsed.diagnostics.iter().map(|d| d.line).collect();
        assert_eq!(lines, vec![1, 3]);
    }

    #[cfg(not(feature = "zip"))]
    #[test]
    fn zip_without_feature_is_unsupported() {
        assert!(matches!(
            parser_for(&ManifestFormat::Zip),
            Err(ManifestError::UnsupportedFormat)
        ));
    }
}
