//! Signer keys and master seeds.
//!
//! A [`Key`] is either generated independently from a secure random source, and then
//! has to be shared with the verifier out of band, or derived on demand from a
//! [`MasterSeed`] that only the verifier holds.
use crate::common::{check_index, HashSuite, BITFIELD_SIZE};
use crate::errors::Error;
use crate::mac::mac_into;
use rand_core::{CryptoRng, RngCore};
use std::fmt;
use zeroize::{Zeroize, ZeroizeOnDrop, Zeroizing};

#[cfg(feature = "serde_enabled")]
use {
    serde::{Deserialize, Serialize},
    std::convert::TryFrom,
};

/// Label prefixed to the little endian signer index in the key derivation.
pub const KDF_LABEL: &[u8; 7] = b"derived";

#[derive(Clone, Zeroize, ZeroizeOnDrop)]
#[cfg_attr(feature = "serde_enabled", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde_enabled", serde(try_from = "KeyRecord"))]
/// Secret key of the signer at `index`.
///
/// Deserialisation checks the index and that the secret has the key size of one of
/// the suites; the suite itself is checked when the key is used.
pub struct Key {
    pub(crate) index: u32,
    #[cfg_attr(
        feature = "serde_enabled",
        serde(with = "serde_with::As::<serde_with::Bytes>")
    )]
    pub(crate) secret: Vec<u8>,
}

/// Unchecked form of a deserialised [`Key`].
#[cfg(feature = "serde_enabled")]
#[derive(Deserialize, Zeroize, ZeroizeOnDrop)]
struct KeyRecord {
    index: u32,
    #[serde(with = "serde_with::As::<serde_with::Bytes>")]
    secret: Vec<u8>,
}

#[cfg(feature = "serde_enabled")]
impl TryFrom<KeyRecord> for Key {
    type Error = Error;

    fn try_from(mut record: KeyRecord) -> Result<Self, Self::Error> {
        let index = check_index(record.index)?;
        if !HashSuite::ALL
            .iter()
            .any(|suite| suite.key_bytes() == record.secret.len())
        {
            return Err(Error::InvalidKeySize(record.secret.len()));
        }
        Ok(Key {
            index,
            secret: std::mem::take(&mut record.secret),
        })
    }
}

impl Key {
    /// Generate a key for signer `index` by filling its secret with `suite.key_bytes()`
    /// bytes from `rng`.
    pub fn generate<R: RngCore + CryptoRng>(
        suite: HashSuite,
        index: u32,
        rng: &mut R,
    ) -> Result<Self, Error> {
        let index = check_index(index)?;
        let mut secret = vec![0u8; suite.key_bytes()];
        rng.fill_bytes(&mut secret);
        Ok(Key { index, secret })
    }

    /// Build a key from an index and a secret of `suite.key_bytes()` bytes.
    pub fn new(suite: HashSuite, index: u32, secret: &[u8]) -> Result<Self, Error> {
        let index = check_index(index)?;
        if secret.len() != suite.key_bytes() {
            return Err(Error::InvalidKeySize(secret.len()));
        }
        Ok(Key {
            index,
            secret: secret.to_vec(),
        })
    }

    /// An empty key to be filled by [`MasterSeed::derive_into`].
    pub fn empty() -> Self {
        Key {
            index: 0,
            secret: Vec::new(),
        }
    }

    /// Signer index of the key.
    pub fn index(&self) -> u32 {
        self.index
    }

    /// Secret bytes of the key.
    pub fn secret(&self) -> &[u8] {
        &self.secret
    }

    /// Checks that the key can be used under `suite`.
    pub(crate) fn check(&self, suite: HashSuite) -> Result<(), Error> {
        check_index(self.index)?;
        if self.secret.len() != suite.key_bytes() {
            return Err(Error::InvalidKeySize(self.secret.len()));
        }
        Ok(())
    }

    /// Convert the slice of bytes into `Self`.
    ///
    /// # Errors
    /// The function fails if
    /// * `bytes.len()` is not `4 + suite.key_bytes()`
    /// * the encoded index is not in `[0, 31]`
    pub fn from_bytes(suite: HashSuite, bytes: &[u8]) -> Result<Self, Error> {
        if bytes.len() != suite.encoded_key_bytes() {
            return Err(Error::InvalidEncodingSize(bytes.len()));
        }

        let mut index_bytes = [0u8; BITFIELD_SIZE];
        index_bytes.copy_from_slice(&bytes[..BITFIELD_SIZE]);
        Key::new(
            suite,
            u32::from_le_bytes(index_bytes),
            &bytes[BITFIELD_SIZE..],
        )
    }

    /// Convert `Self` into its byte representation `( index (u32 LE) || secret )`.
    pub fn to_bytes(&self) -> Zeroizing<Vec<u8>> {
        let mut out = Zeroizing::new(Vec::with_capacity(BITFIELD_SIZE + self.secret.len()));
        out.extend_from_slice(&self.index.to_le_bytes());
        out.extend_from_slice(&self.secret);
        out
    }
}

impl fmt::Debug for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Key")
            .field("index", &self.index)
            .field("secret", &"<redacted>")
            .finish()
    }
}

/// Root secret from which the keys of a whole signer group are derived.
///
/// The seed stays with the verifier. Anyone holding it can derive every signer's key.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct MasterSeed(pub(crate) Vec<u8>);

impl MasterSeed {
    /// Generate a seed of `suite.key_bytes()` bytes from `rng`.
    pub fn generate<R: RngCore + CryptoRng>(suite: HashSuite, rng: &mut R) -> Self {
        let mut seed = vec![0u8; suite.key_bytes()];
        rng.fill_bytes(&mut seed);
        MasterSeed(seed)
    }

    /// Convert the slice of bytes into `Self`.
    ///
    /// # Errors
    /// The function fails if `bytes.len()` is not `suite.key_bytes()`.
    pub fn from_bytes(suite: HashSuite, bytes: &[u8]) -> Result<Self, Error> {
        if bytes.len() != suite.key_bytes() {
            return Err(Error::InvalidSeedSize(bytes.len()));
        }
        Ok(MasterSeed(bytes.to_vec()))
    }

    /// Return the seed as a byte slice.
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Derive the key of signer `index` into `out`, reusing its allocation.
    ///
    /// The secret is the chain
    /// `block_0 = HMAC(seed, "derived" || index (u32 LE) || 0x00)`,
    /// `block_k = HMAC(seed, block_{k-1} || k)`,
    /// concatenated and cut to `suite.key_bytes()`.
    ///
    /// # Errors
    /// The function fails if the seed is not `suite.key_bytes()` long or `index` is
    /// not in `[0, 31]`; both are checked before `out` is touched.
    pub fn derive_into(&self, suite: HashSuite, index: u32, out: &mut Key) -> Result<(), Error> {
        let index = check_index(index)?;
        if self.0.len() != suite.key_bytes() {
            return Err(Error::InvalidSeedSize(self.0.len()));
        }

        let mut label = [0u8; 11];
        label[..KDF_LABEL.len()].copy_from_slice(KDF_LABEL);
        label[KDF_LABEL.len()..].copy_from_slice(&index.to_le_bytes());

        let key_bytes = suite.key_bytes();
        let mut block = Zeroizing::new(vec![0u8; suite.tag_bytes()]);
        let mut next = Zeroizing::new(vec![0u8; suite.tag_bytes()]);
        mac_into(suite, &self.0, &[&label[..], &[0x00][..]], &mut block)?;

        out.secret.zeroize();
        out.secret.resize(key_bytes, 0);
        out.index = index;

        let mut written = 0;
        let mut counter = 0u8;
        loop {
            let take = usize::min(block.len(), key_bytes - written);
            out.secret[written..written + take].copy_from_slice(&block[..take]);
            written += take;
            if written == key_bytes {
                break;
            }

            counter += 1;
            mac_into(suite, &self.0, &[&block[..], &[counter][..]], &mut next)?;
            std::mem::swap(&mut block, &mut next);
        }

        tracing::debug!(suite = %suite, index, "derived signer key");
        Ok(())
    }

    /// Derive the key of signer `index`.
    pub fn derive(&self, suite: HashSuite, index: u32) -> Result<Key, Error> {
        let mut key = Key::empty();
        self.derive_into(suite, index, &mut key)?;
        Ok(key)
    }
}

impl fmt::Debug for MasterSeed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("MasterSeed(<redacted>)")
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use rand_core::OsRng;

    #[test]
    fn generate_sizes() {
        for suite in HashSuite::ALL.iter().copied() {
            let key = Key::generate(suite, 31, &mut OsRng).unwrap();
            assert_eq!(key.index(), 31);
            assert_eq!(key.secret().len(), suite.key_bytes());

            let seed = MasterSeed::generate(suite, &mut OsRng);
            assert_eq!(seed.as_bytes().len(), suite.key_bytes());
        }
    }

    #[test]
    fn generate_rejects_index() {
        assert_eq!(
            Key::generate(HashSuite::Sha256, 32, &mut OsRng).unwrap_err(),
            Error::IndexOutOfRange(32)
        );
    }

    #[test]
    fn derive_is_deterministic() {
        for suite in HashSuite::ALL.iter().copied() {
            let seed = MasterSeed::generate(suite, &mut OsRng);
            for index in 0..32 {
                let k1 = seed.derive(suite, index).unwrap();
                let k2 = seed.derive(suite, index).unwrap();
                assert_eq!(k1.index(), index);
                assert_eq!(k1.secret().len(), suite.key_bytes());
                assert_eq!(k1.secret(), k2.secret());
            }
            let k0 = seed.derive(suite, 0).unwrap();
            let k1 = seed.derive(suite, 1).unwrap();
            assert_ne!(k0.secret(), k1.secret());
        }
    }

    #[test]
    fn derive_first_block_matches_hmac() {
        let suite = HashSuite::Sha256;
        let seed = MasterSeed::from_bytes(suite, &[7u8; 64]).unwrap();
        let key = seed.derive(suite, 3).unwrap();

        let mut block0 = [0u8; 32];
        let label = b"derived\x03\x00\x00\x00\x00";
        mac_into(suite, seed.as_bytes(), &[&label[..]], &mut block0).unwrap();
        let mut block1 = [0u8; 32];
        let parts = [&block0[..], &[1u8][..]];
        mac_into(suite, seed.as_bytes(), &parts, &mut block1).unwrap();

        assert_eq!(&key.secret()[..32], &block0[..]);
        assert_eq!(&key.secret()[32..], &block1[..]);
    }

    #[test]
    fn derive_into_reuses_key() {
        let suite = HashSuite::Sha512;
        let seed = MasterSeed::generate(suite, &mut OsRng);
        let mut key = Key::generate(HashSuite::Sha256, 9, &mut OsRng).unwrap();

        seed.derive_into(suite, 4, &mut key).unwrap();
        assert_eq!(key.index(), 4);
        assert_eq!(key.secret(), seed.derive(suite, 4).unwrap().secret());
    }

    #[test]
    fn derive_rejects_bad_input() {
        let seed = MasterSeed::generate(HashSuite::Sha256, &mut OsRng);
        assert_eq!(
            seed.derive(HashSuite::Sha256, 32).unwrap_err(),
            Error::IndexOutOfRange(32)
        );
        assert_eq!(
            seed.derive(HashSuite::Sha512, 0).unwrap_err(),
            Error::InvalidSeedSize(64)
        );
        assert_eq!(
            MasterSeed::from_bytes(HashSuite::Sha384, &[0u8; 64]).unwrap_err(),
            Error::InvalidSeedSize(64)
        );
    }

    #[test]
    fn key_bytes() {
        let suite = HashSuite::Sha384;
        let key = Key::generate(suite, 17, &mut OsRng).unwrap();
        let bytes = key.to_bytes();
        assert_eq!(bytes.len(), suite.encoded_key_bytes());
        assert_eq!(&bytes[..4], &[17, 0, 0, 0]);

        let parsed = Key::from_bytes(suite, &bytes).unwrap();
        assert_eq!(parsed.index(), 17);
        assert_eq!(parsed.secret(), key.secret());

        assert_eq!(
            Key::from_bytes(HashSuite::Sha256, &bytes).unwrap_err(),
            Error::InvalidEncodingSize(132)
        );

        let mut bad_index = bytes.to_vec();
        bad_index[..4].copy_from_slice(&40u32.to_le_bytes());
        assert_eq!(
            Key::from_bytes(suite, &bad_index).unwrap_err(),
            Error::IndexOutOfRange(40)
        );
    }

    #[test]
    fn debug_hides_secrets() {
        let key = Key::new(HashSuite::Sha256, 1, &[0xab; 64]).unwrap();
        let seed = MasterSeed::from_bytes(HashSuite::Sha256, &[0xab; 64]).unwrap();
        assert!(!format!("{:?}", key).contains("171"));
        assert_eq!(format!("{:?}", seed), "MasterSeed(<redacted>)");
    }
}
