use crate::{AlgorithmId, DigestError, DigestValue, Hasher, Result};

/// Streaming digest computation for one algorithm.
///
/// An instance is used for exactly one pass: [`begin`](Self::begin) once, any
/// number of [`update`](Self::update) calls, then [`finalize`](Self::finalize).
/// The final digest must not depend on how the input was split into chunks.
/// Calling out of order fails with [`DigestError::InvalidState`].
pub trait DigestProvider: Send {
    fn algorithm(&self) -> AlgorithmId;

    /// Size of the finalized digest in bytes.
    fn digest_len(&self) -> usize;

    fn begin(&mut self) -> Result<()>;

    /// Feed a chunk. Empty chunks are accepted and change nothing.
    fn update(&mut self, data: &[u8]) -> Result<()>;

    fn finalize(&mut self) -> Result<DigestValue>;

    fn format(&self, value: &DigestValue) -> String { value.to_hex() }

    fn parse(&self, text: &str) -> Result<DigestValue> {
        DigestValue::from_hex_len(text, self.digest_len())
    }
}

impl<P: DigestProvider + ?Sized> DigestProvider for Box<P> {
    fn algorithm(&self) -> AlgorithmId { (**self).algorithm() }

    fn digest_len(&self) -> usize { (**self).digest_len() }

    fn begin(&mut self) -> Result<()> { (**self).begin() }

    fn update(&mut self, data: &[u8]) -> Result<()> { (**self).update(data) }

    fn finalize(&mut self) -> Result<DigestValue> { (**self).finalize() }

    fn format(&self, value: &DigestValue) -> String { (**self).format(value) }

    fn parse(&self, text: &str) -> Result<DigestValue> { (**self).parse(text) }
}

impl std::fmt::Debug for dyn DigestProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DigestProvider")
            .field("algorithm", &self.algorithm())
            .finish_non_exhaustive()
    }
}

enum State<H> {
    Idle,
    Streaming(H),
    Finalized,
}

/// [`DigestProvider`] built from a plain [`Hasher`].
pub struct HasherProvider<H> {
    algorithm:  AlgorithmId,
    digest_len: usize,
    make:       fn() -> H,
    state:      State<H>,
}

impl<H: Hasher> HasherProvider<H> {
    pub fn new(algorithm: AlgorithmId, digest_len: usize, make: fn() -> H) -> Self {
        Self {
            algorithm,
            digest_len,
            make,
            state: State::Idle,
        }
    }
}

impl<H: Hasher> DigestProvider for HasherProvider<H> {
    fn algorithm(&self) -> AlgorithmId { self.algorithm.clone() }

    fn digest_len(&self) -> usize { self.digest_len }

    fn begin(&mut self) -> Result<()> {
        match self.state {
            State::Idle => {
                self.state = State::Streaming((self.make)());
                Ok(())
            }
            State::Streaming(_) => Err(DigestError::InvalidState("begin called twice")),
            State::Finalized => Err(DigestError::InvalidState("begin after finalize")),
        }
    }

    fn update(&mut self, data: &[u8]) -> Result<()> {
        match &mut self.state {
            State::Streaming(hasher) => {
                if !data.is_empty() {
                    hasher.update(data);
                }
                Ok(())
            }
            State::Idle => Err(DigestError::InvalidState("update before begin")),
            State::Finalized => Err(DigestError::InvalidState("update after finalize")),
        }
    }

    fn finalize(&mut self) -> Result<DigestValue> {
        match std::mem::replace(&mut self.state, State::Finalized) {
            State::Streaming(hasher) => Ok(DigestValue::new(hasher.finalize())),
            State::Idle => {
                self.state = State::Idle;
                Err(DigestError::InvalidState("finalize before begin"))
            }
            State::Finalized => Err(DigestError::InvalidState("finalize called twice")),
        }
    }
}

#[cfg(feature = "crc32")]
pub fn crc32() -> HasherProvider<crate::Crc32Hasher> {
    HasherProvider::new(AlgorithmId::CRC32, 4, crate::Crc32Hasher::new)
}

#[cfg(feature = "sha1")]
pub fn sha1() -> HasherProvider<crate::Sha1Hasher> {
    HasherProvider::new(AlgorithmId::SHA1, 20, crate::Sha1Hasher::new)
}

#[cfg(feature = "sha256")]
pub fn sha256() -> HasherProvider<crate::Sha256Hasher> {
    HasherProvider::new(AlgorithmId::SHA256, 32, crate::Sha256Hasher::new)
}

/// One-shot digest of `data` through `provider`.
pub fn digest_bytes(provider: &mut dyn DigestProvider, data: &[u8]) -> Result<DigestValue> {
    provider.begin()?;
    provider.update(data)?;
    provider.finalize()
}

#[cfg(all(test, feature = "crc32", feature = "sha1"))]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn builtins() -> Vec<Box<dyn DigestProvider>> {
        let mut all: Vec<Box<dyn DigestProvider>> = vec![Box::new(crc32()), Box::new(sha1())];
        #[cfg(feature = "sha256")]
        all.push(Box::new(sha256()));
        all
    }

    #[test]
    fn crc32_provider_matches_check_value() {
        let value = digest_bytes(&mut crc32(), b"123456789").unwrap();
        assert_eq!(value.to_hex(), "cbf43926");
    }

    #[test]
    fn crc32_of_known_bytes() {
        let data = [0x1a, 0x2b, 0x3c, 0x4f, 0x5a, 0x6b, 0x7c, 0x8d, 0x9e];
        assert_eq!(digest_bytes(&mut crc32(), &data).unwrap().to_hex(), "b0c3bbc7");
        assert_eq!(digest_bytes(&mut crc32(), &data[..5]).unwrap().to_hex(), "4a6fa7d5");
    }

    #[test]
    fn empty_update_is_a_no_op() {
        let mut provider = sha1();
        provider.begin().unwrap();
        provider.update(b"").unwrap();
        provider.update(b"abc").unwrap();
        provider.update(b"").unwrap();
        let value = provider.finalize().unwrap();
        assert_eq!(value.to_hex(), "a9993e364706816aba3e25717850c26c9cd0d89d");
    }

    #[test]
    fn finalize_twice_is_invalid_state() {
        let mut provider = crc32();
        provider.begin().unwrap();
        provider.finalize().unwrap();
        assert!(matches!(provider.finalize(), Err(DigestError::InvalidState(_))));
    }

    #[test]
    fn update_after_finalize_is_invalid_state() {
        let mut provider = sha1();
        provider.begin().unwrap();
        provider.finalize().unwrap();
        assert!(matches!(provider.update(b"x"), Err(DigestError::InvalidState(_))));
    }

    #[test]
    fn begin_twice_and_update_before_begin_are_invalid_state() {
        let mut provider = crc32();
        assert!(matches!(provider.update(b"x"), Err(DigestError::InvalidState(_))));
        provider.begin().unwrap();
        assert!(matches!(provider.begin(), Err(DigestError::InvalidState(_))));
    }

    #[test]
    fn parse_validates_length() {
        let provider = crc32();
        assert!(provider.parse("5F3759DF").is_ok());
        assert!(matches!(
            provider.parse("5f3759"),
            Err(DigestError::InvalidLength { .. })
        ));
        assert!(sha1().parse("5f3759df").is_err());
    }

    proptest! {
        #[test]
        fn chunk_boundaries_do_not_matter(
            data in proptest::collection::vec(any::<u8>(), 0..2048),
            split in any::<proptest::sample::Index>(),
        ) {
            let at = split.index(data.len() + 1);
            for mut whole in builtins() {
                let mut parts = builtins()
                    .into_iter()
                    .find(|p| p.algorithm() == whole.algorithm())
                    .unwrap();

                let expected = digest_bytes(whole.as_mut(), &data).unwrap();

                parts.begin().unwrap();
                parts.update(&data[..at]).unwrap();
                parts.update(&data[at..]).unwrap();
                prop_assert_eq!(parts.finalize().unwrap(), expected);
            }
        }

        #[test]
        fn format_then_parse_round_trips(data in proptest::collection::vec(any::<u8>(), 0..256)) {
            for mut provider in builtins() {
                let value = digest_bytes(provider.as_mut(), &data).unwrap();
                let text = provider.format(&value);
                prop_assert_eq!(provider.parse(&text).unwrap(), value.clone());
                prop_assert_eq!(provider.parse(&text.to_uppercase()).unwrap(), value);
            }
        }
    }
}
