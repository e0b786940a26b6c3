use std::fs;
use std::io::{Cursor, Write};

use quicksfv_digest::{AlgorithmId, Crc32Hasher};
use quicksfv_manifest::{
    ManifestError, ManifestFormat, ParseOptions, parse_bytes, parse_file, parse_reader,
};
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

fn build_zip(files: &[(&str, &[u8])]) -> Vec<u8> {
    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
    let deflated = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);
    writer.add_directory("nested/", deflated).unwrap();
    for (name, data) in files {
        writer.start_file(*name, deflated).unwrap();
        writer.write_all(data).unwrap();
    }
    writer.finish().unwrap().into_inner()
}

#[test]
fn zip_headers_become_crc32_entries() {
    let payload = b"Hello, World!".repeat(100);
    let bytes = build_zip(&[("nested/hello.txt", &payload), ("check.txt", b"123456789")]);

    let parsed = parse_bytes(&ManifestFormat::Zip, &bytes, &ParseOptions::default()).unwrap();
    assert_eq!(parsed.format, ManifestFormat::Zip);
    assert_eq!(parsed.len(), 2, "directories are not entries");

    let hello = &parsed.entries[0];
    assert_eq!(hello.path(), "nested/hello.txt");
    assert_eq!(hello.algorithm(), &AlgorithmId::CRC32);
    assert_eq!(hello.expected().as_bytes(), Crc32Hasher::digest(&payload).to_be_bytes());
    assert_eq!(hello.expected_len(), Some(payload.len() as u64));

    let check = &parsed.entries[1];
    assert_eq!(check.path(), "check.txt");
    assert_eq!(check.expected().to_hex(), "cbf43926");
}

#[test]
fn zip_parse_does_not_inflate_payloads() {
    let mut bytes = build_zip(&[("data.bin", &[0x5Au8; 4096])]);
    // Scribble over the compressed payload; header metadata stays intact.
    let payload_at = find_local_payload(&bytes, "data.bin");
    bytes[payload_at] ^= 0xFF;
    bytes[payload_at + 1] ^= 0xFF;

    let parsed = parse_bytes(&ManifestFormat::Zip, &bytes, &ParseOptions::default()).unwrap();
    assert_eq!(parsed.entries[0].path(), "data.bin");
    assert_eq!(
        parsed.entries[0].expected().as_bytes(),
        Crc32Hasher::digest(&[0x5Au8; 4096]).to_be_bytes()
    );
}

fn find_local_payload(bytes: &[u8], name: &str) -> usize {
    let pos = bytes
        .windows(name.len())
        .position(|w| w == name.as_bytes())
        .unwrap();
    let header = pos - 30;
    assert_eq!(&bytes[header..header + 4], b"PK\x03\x04");
    let extra = u16::from_le_bytes([bytes[header + 28], bytes[header + 29]]) as usize;
    pos + name.len() + extra
}

#[test]
fn truncated_zip_is_corrupted() {
    let bytes = build_zip(&[("a.txt", b"abc")]);
    let result = parse_bytes(&ManifestFormat::Zip, &bytes[..bytes.len() / 2], &ParseOptions::default());
    assert!(matches!(result, Err(ManifestError::Corrupted(_))));
}

#[test]
fn unsafe_zip_names_follow_policy() {
    let bytes = build_zip(&[("../escape.txt", b"x"), ("safe.txt", b"y")]);

    let rejected = parse_bytes(&ManifestFormat::Zip, &bytes, &ParseOptions::default());
    assert!(matches!(rejected, Err(ManifestError::MalformedLine { .. })));

    let parsed = parse_bytes(&ManifestFormat::Zip, &bytes, &ParseOptions::skip_malformed()).unwrap();
    assert_eq!(parsed.len(), 1);
    assert_eq!(parsed.entries[0].path(), "safe.txt");
    assert_eq!(parsed.diagnostics.len(), 1);
}

#[test]
fn parse_file_detects_by_extension() {
    let dir = tempfile::tempdir().unwrap();

    let sfv = dir.path().join("album.sfv");
    fs::write(&sfv, "; comment\r\n01.flac AABBCCDD\r\n").unwrap();
    let parsed = parse_file(&sfv, &ParseOptions::default()).unwrap();
    assert_eq!(parsed.format, ManifestFormat::Sfv);
    assert_eq!(parsed.entries[0].expected().to_hex(), "aabbccdd");

    let sha = dir.path().join("SUMS.SHA256");
    let digest = "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855";
    fs::write(&sha, format!("{digest} *empty\n")).unwrap();
    let parsed = parse_file(&sha, &ParseOptions::default()).unwrap();
    assert_eq!(parsed.format, ManifestFormat::HashList(AlgorithmId::SHA256));
    assert_eq!(parsed.entries[0].path(), "empty");
}

#[test]
fn parse_file_falls_back_to_magic() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("bundle.dat");
    fs::write(&path, build_zip(&[("a.txt", b"123456789")])).unwrap();

    let parsed = parse_file(&path, &ParseOptions::default()).unwrap();
    assert_eq!(parsed.format, ManifestFormat::Zip);
    assert_eq!(parsed.entries[0].expected().to_hex(), "cbf43926");

    let unknown = dir.path().join("notes.txt");
    fs::write(&unknown, "file.bin 5F3759DF\n").unwrap();
    assert!(matches!(
        parse_file(&unknown, &ParseOptions::default()),
        Err(ManifestError::UnsupportedFormat)
    ));
}

#[test]
fn parse_reader_matches_parse_bytes() {
    let text = b"one.bin 00000001\ntwo.bin 00000002\n";
    let from_reader =
        parse_reader(&ManifestFormat::Sfv, Cursor::new(&text[..]), &ParseOptions::default()).unwrap();
    let from_bytes = parse_bytes(&ManifestFormat::Sfv, text, &ParseOptions::default()).unwrap();
    assert_eq!(from_reader.entries, from_bytes.entries);
}
