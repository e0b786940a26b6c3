use quicksfv_digest::{AlgorithmId, DigestValue};

use crate::entry::{ManifestEntry, ParsedManifest};
use crate::error::Result;
use crate::format::ManifestFormat;
use crate::options::ParseOptions;
use crate::sanitize::normalize_entry_path;

/// `sha1sum`-style listings: `HEXDIGEST  PATH` or `HEXDIGEST *PATH`.
///
/// One algorithm per file, usually implied by the extension. Digests of an
/// algorithm with an unknown length are accepted at any even length.
#[derive(Clone, Debug)]
pub struct HashListParser {
    algorithm: AlgorithmId,
}

impl HashListParser {
    pub fn new(algorithm: AlgorithmId) -> Self { Self { algorithm } }

    pub fn parse(&self, text: &str, options: &ParseOptions) -> Result<ParsedManifest> {
        let format = ManifestFormat::HashList(self.algorithm.clone());
        super::parse_lines(text, format, '#', options, |line| self.parse_line(line))
    }

    fn parse_line(&self, line: &str) -> std::result::Result<ManifestEntry, String> {
        let (hex, rest) = line
            .split_once(char::is_whitespace)
            .ok_or_else(|| format!("expected `DIGEST PATH`, found `{line}`"))?;
        // Any run of separators, then the optional binary-mode marker.
        let rest = rest.trim_start();
        let rest = rest.strip_prefix('*').unwrap_or(rest);
        let path = normalize_entry_path(rest).ok_or("empty path")?;

        let expected = match self.algorithm.digest_len() {
            Some(len) => DigestValue::from_hex_len(hex, len),
            None => DigestValue::from_hex(hex),
        }
        .map_err(|err| format!("bad {} digest `{hex}`: {err}", self.algorithm))?;
        Ok(ManifestEntry::new(path, expected, self.algorithm.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EMPTY_SHA1: &str = "da39a3ee5e6b4b0d3255bfef95601890afd80709";

    fn sha1_list(text: &str) -> Result<ParsedManifest> {
        HashListParser::new(AlgorithmId::SHA1).parse(text, &ParseOptions::default())
    }

    #[test]
    fn text_and_binary_markers() {
        let text = format!("{EMPTY_SHA1}  empty.txt\n{EMPTY_SHA1} *bin/empty.dat\n");
        let parsed = sha1_list(&text).unwrap();
        assert_eq!(parsed.format, ManifestFormat::HashList(AlgorithmId::SHA1));
        let paths: Vec<&str> = parsed.entries.iter().map(|e| e.path()).collect();
        assert_eq!(paths, ["empty.txt", "bin/empty.dat"]);
        assert!(parsed.entries.iter().all(|e| e.algorithm() == &AlgorithmId::SHA1));
        assert_eq!(parsed.entries[0].expected().to_hex(), EMPTY_SHA1);
    }

    #[test]
    fn path_keeps_inner_spaces() {
        let text = format!("{}  my file.txt", EMPTY_SHA1.to_uppercase());
        let parsed = sha1_list(&text).unwrap();
        assert_eq!(parsed.entries[0].path(), "my file.txt");
        assert_eq!(parsed.entries[0].expected().to_hex(), EMPTY_SHA1);
    }

    #[test]
    fn tab_separators_are_collapsed() {
        let text = format!("{EMPTY_SHA1}\t\tempty.txt\n{EMPTY_SHA1}\t*bin/empty.dat\n");
        let parsed = sha1_list(&text).unwrap();
        let paths: Vec<&str> = parsed.entries.iter().map(|e| e.path()).collect();
        assert_eq!(paths, ["empty.txt", "bin/empty.dat"]);
    }

    #[test]
    fn hash_comments_are_ignored() {
        let text = format!("# sha1 listing\n\n{EMPTY_SHA1}  a\n");
        assert_eq!(sha1_list(&text).unwrap().len(), 1);
    }

    #[test]
    fn digest_length_follows_algorithm() {
        assert!(sha1_list("cbf43926  short.bin").is_err());
        let sha256 = HashListParser::new(AlgorithmId::SHA256);
        assert!(sha256.parse(&format!("{EMPTY_SHA1}  a"), &ParseOptions::default()).is_err());
    }

    #[test]
    fn unknown_algorithm_accepts_any_even_length() {
        let parser = HashListParser::new(AlgorithmId::new("xxh64"));
        let parsed = parser.parse("0123456789abcdef  a.bin", &ParseOptions::default()).unwrap();
        assert_eq!(parsed.entries[0].expected().len(), 8);
        assert!(parser.parse("abc  a.bin", &ParseOptions::default()).is_err());
    }

    #[test]
    fn missing_path_is_rejected() {
        assert!(sha1_list(EMPTY_SHA1).is_err());
    }
}
