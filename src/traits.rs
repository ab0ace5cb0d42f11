//! Traits that define where the verifier obtains signer keys
use crate::common::{Bitfield, HashSuite};
use crate::errors::Error;
use crate::keys::{Key, MasterSeed};

/// Source of the signer keys replayed during threshold verification.
///
/// # Example
/// ```
/// use multisig_hmac::{HashSuite, MultisigHmac};
///
/// let multisig = MultisigHmac::new(HashSuite::Sha256);
/// let seed = multisig.seedgen();
///
/// let k1 = multisig.derive_key(&seed, 1).unwrap();
/// let k3 = multisig.derive_key(&seed, 3).unwrap();
///
/// let message = b"Hello world";
/// let s1 = multisig.sign(&k1, message).unwrap();
/// let s3 = multisig.sign(&k3, message).unwrap();
/// let signature = multisig.combine(&[s1, s3]).unwrap();
///
/// // Keys handed out individually...
/// let keys = (0..4)
///     .map(|i| multisig.derive_key(&seed, i).unwrap())
///     .collect::<Vec<_>>();
/// assert!(multisig.verify(&keys, &signature, message, 2).unwrap());
/// // ...or recomputed from the seed.
/// assert!(multisig.verify_derived(&seed, &signature, message, 2).unwrap());
/// ```
pub trait KeySource {
    /// Check that the source can provide a key for every signer in `signers`.
    fn check(&self, suite: HashSuite, signers: Bitfield) -> Result<(), Error>;

    /// Key of signer `index`. Sources that compute keys on demand write them into
    /// `scratch` and return it.
    fn key<'a>(
        &'a self,
        suite: HashSuite,
        index: u32,
        scratch: &'a mut Key,
    ) -> Result<&'a Key, Error>;
}

impl KeySource for [Key] {
    fn check(&self, _: HashSuite, signers: Bitfield) -> Result<(), Error> {
        let needed = match signers.highest() {
            Some(highest) => usize::max(signers.count(), highest as usize + 1),
            None => 0,
        };
        if self.len() < needed {
            return Err(Error::InsufficientKeys {
                needed,
                provided: self.len(),
            });
        }
        Ok(())
    }

    fn key<'a>(&'a self, _: HashSuite, index: u32, _: &'a mut Key) -> Result<&'a Key, Error> {
        self.get(index as usize).ok_or(Error::InsufficientKeys {
            needed: index as usize + 1,
            provided: self.len(),
        })
    }
}

impl KeySource for MasterSeed {
    fn check(&self, suite: HashSuite, _: Bitfield) -> Result<(), Error> {
        if self.0.len() != suite.key_bytes() {
            return Err(Error::InvalidSeedSize(self.0.len()));
        }
        Ok(())
    }

    fn key<'a>(
        &'a self,
        suite: HashSuite,
        index: u32,
        scratch: &'a mut Key,
    ) -> Result<&'a Key, Error> {
        self.derive_into(suite, index, scratch)?;
        Ok(&*scratch)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn keyset_must_cover_highest_signer() {
        let suite = HashSuite::Sha256;
        let keys = (0..3)
            .map(|i| Key::new(suite, i, &[i as u8; 64]).unwrap())
            .collect::<Vec<_>>();

        assert!(keys[..].check(suite, Bitfield(0b101)).is_ok());
        assert!(keys[..].check(suite, Bitfield(0)).is_ok());
        assert_eq!(
            keys[..].check(suite, Bitfield(0b1001)),
            Err(Error::InsufficientKeys {
                needed: 4,
                provided: 3
            })
        );
        assert_eq!(
            keys[..2].check(suite, Bitfield(0b111)),
            Err(Error::InsufficientKeys {
                needed: 3,
                provided: 2
            })
        );
    }

    #[test]
    fn seed_source_derives() {
        let suite = HashSuite::Sha512_256;
        let seed = MasterSeed::from_bytes(suite, &[3u8; 128]).unwrap();
        assert!(seed.check(suite, Bitfield(u32::MAX)).is_ok());
        assert_eq!(
            seed.check(HashSuite::Sha256, Bitfield(1)),
            Err(Error::InvalidSeedSize(128))
        );

        let mut scratch = Key::empty();
        let key = seed.key(suite, 6, &mut scratch).unwrap();
        assert_eq!(key.index(), 6);
        assert_eq!(key.secret(), seed.derive(suite, 6).unwrap().secret());
    }
}
