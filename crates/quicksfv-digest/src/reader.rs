use std::io::{self, Read};

use crate::{DigestProvider, DigestValue, Result};

/// Reader that feeds every byte it yields through a provider.
///
/// The provider is started on construction; [`finish`](Self::finish) hands back
/// the finalized digest.
pub struct DigestReader<R, P> {
    reader:    R,
    provider:  P,
    processed: u64,
}

impl<R, P: DigestProvider> DigestReader<R, P> {
    pub fn new(reader: R, mut provider: P) -> Result<Self> {
        provider.begin()?;
        Ok(Self {
            reader,
            provider,
            processed: 0,
        })
    }

    pub fn bytes_processed(&self) -> u64 { self.processed }

    pub fn finish(mut self) -> Result<DigestValue> { self.provider.finalize() }
}

impl<R: Read, P: DigestProvider> Read for DigestReader<R, P> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let n = self.reader.read(buf)?;
        if n > 0 {
            self.provider
                .update(&buf[..n])
                .map_err(|e| io::Error::other(e.to_string()))?;
            self.processed += n as u64;
        }
        Ok(n)
    }
}

/// Digest everything `reader` yields.
pub fn digest_reader<R: Read, P: DigestProvider>(reader: R, provider: P) -> Result<DigestValue> {
    let mut reader = DigestReader::new(reader, provider)?;
    io::copy(&mut reader, &mut io::sink())?;
    reader.finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[cfg(feature = "crc32")]
    #[test]
    fn digest_reader_crc32() {
        let value = digest_reader(Cursor::new(b"123456789"), crate::crc32()).unwrap();
        assert_eq!(value.to_hex(), "cbf43926");
    }

    #[cfg(feature = "sha256")]
    #[test]
    fn digest_reader_counts_bytes() {
        let data = b"test data for verification";
        let mut reader = DigestReader::new(Cursor::new(data), crate::sha256()).unwrap();

        let mut buffer = [0; 8];
        while reader.read(&mut buffer).unwrap() > 0 {}
        assert_eq!(reader.bytes_processed(), data.len() as u64);

        let mut whole = crate::sha256();
        let expected = crate::digest_bytes(&mut whole, data).unwrap();
        assert_eq!(reader.finish().unwrap(), expected);
    }

    #[cfg(feature = "sha1")]
    #[test]
    fn digest_reader_mismatch_is_visible() {
        let value = digest_reader(Cursor::new(b"test data"), crate::sha1()).unwrap();
        assert_ne!(value.as_bytes(), &[0u8; 20]);
    }
}
