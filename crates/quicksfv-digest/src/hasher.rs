#[cfg(any(feature = "sha1", feature = "sha256"))]
use digest::Digest;

/// Minimal incremental hash function.
///
/// Implementations carry no lifecycle checks; [`crate::HasherProvider`]
/// wraps one to enforce the begin/update/finalize contract.
pub trait Hasher: Send {
    fn update(&mut self, data: &[u8]);
    fn finalize(self) -> Vec<u8>;
}

#[cfg(feature = "crc32")]
#[derive(Default)]
pub struct Crc32Hasher(crc32fast::Hasher);

#[cfg(feature = "crc32")]
impl Crc32Hasher {
    pub fn new() -> Self { Self(crc32fast::Hasher::new()) }

    pub fn digest(data: &[u8]) -> u32 { crc32fast::hash(data) }
}

#[cfg(feature = "crc32")]
impl Hasher for Crc32Hasher {
    fn update(&mut self, data: &[u8]) { self.0.update(data); }
    fn finalize(self) -> Vec<u8> { self.0.finalize().to_be_bytes().to_vec() }
}

/// Adapter for any RustCrypto [`Digest`].
#[cfg(any(feature = "sha1", feature = "sha256"))]
#[derive(Default)]
pub struct DigestHasher<D: Digest + Send>(D);

#[cfg(any(feature = "sha1", feature = "sha256"))]
impl<D: Digest + Send> DigestHasher<D> {
    pub fn new() -> Self { Self(D::new()) }

    pub fn digest(data: &[u8]) -> Vec<u8> { D::digest(data).to_vec() }
}

#[cfg(any(feature = "sha1", feature = "sha256"))]
impl<D: Digest + Send> Hasher for DigestHasher<D> {
    fn update(&mut self, data: &[u8]) { Digest::update(&mut self.0, data); }
    fn finalize(self) -> Vec<u8> { self.0.finalize().to_vec() }
}

#[cfg(feature = "sha1")]
pub type Sha1Hasher = DigestHasher<sha1::Sha1>;

#[cfg(feature = "sha256")]
pub type Sha256Hasher = DigestHasher<sha2::Sha256>;

#[cfg(test)]
mod tests {
    use super::*;

    #[cfg(feature = "crc32")]
    #[test]
    fn crc32_check_value() {
        let mut hasher = Crc32Hasher::new();
        hasher.update(b"123456789");
        assert_eq!(hasher.finalize(), vec![0xCB, 0xF4, 0x39, 0x26]);
        assert_eq!(Crc32Hasher::digest(b"Hello, World!"), 0xEC4A_C3D0);
    }

    #[cfg(feature = "crc32")]
    #[test]
    fn crc32_empty_input() {
        assert_eq!(Crc32Hasher::new().finalize(), vec![0, 0, 0, 0]);
    }

    #[cfg(feature = "sha1")]
    #[test]
    fn sha1_known_vector() {
        let expected = hex::decode("2aae6c35c94fcfb415dbe95f408b9ce91ee846ed").unwrap();
        assert_eq!(Sha1Hasher::digest(b"hello world"), expected);
    }

    #[cfg(feature = "sha256")]
    #[test]
    fn sha256_known_vector() {
        let mut hasher = Sha256Hasher::new();
        hasher.update(b"hello world");
        let expected =
            hex::decode("b94d27b9934d3e08a52e52d7da7dabfac484efe37a5380ee9088f7ace2efcde9")
                .unwrap();
        assert_eq!(hasher.finalize(), expected);
    }
}
