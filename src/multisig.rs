//! Signing, combination and threshold verification.
//!
//! Each signer produces `HMAC(key, message)` together with a bitfield holding the
//! single bit of its index. Any number of such partial signatures from distinct
//! signers XOR into one combined signature of constant size. The verifier replays
//! the signature of every signer named in the combined bitfield and XORs it back
//! out; the signature is valid when both the bitfield and the tag return to zero and
//! at least `threshold` signers were named.
//!
//! All operations are pure functions of their inputs. The `*_into` variants write
//! into a caller-owned value and reuse its allocation; the `&mut` borrow gives the
//! call exclusive access to it.
use crate::common::{Bitfield, HashSuite, MAX_SIGNERS};
use crate::errors::Error;
use crate::keys::{Key, MasterSeed};
use crate::mac::mac_into;
use crate::signature::{CombinedSignature, PartialSignature};
use crate::traits::KeySource;
use rand_core::{CryptoRng, OsRng, RngCore};

/// HMAC multisignature scheme bound to one [`HashSuite`].
///
/// # Example
/// ```
/// use multisig_hmac::{HashSuite, MultisigHmac};
///
/// let multisig = MultisigHmac::new(HashSuite::Sha256);
/// let k0 = multisig.keygen(0).unwrap();
/// let k1 = multisig.keygen(1).unwrap();
/// let k2 = multisig.keygen(2).unwrap();
///
/// let message = b"hello world";
/// let s0 = multisig.sign(&k0, message).unwrap();
/// let s2 = multisig.sign(&k2, message).unwrap();
/// let combined = multisig.combine(&[s0, s2]).unwrap();
///
/// let keys = [k0, k1, k2];
/// assert!(multisig.verify(&keys, &combined, message, 2).unwrap());
/// assert!(!multisig.verify(&keys, &combined, message, 3).unwrap());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MultisigHmac {
    suite: HashSuite,
}

impl MultisigHmac {
    /// Scheme instance over `suite`.
    pub fn new(suite: HashSuite) -> Self {
        MultisigHmac { suite }
    }

    /// Hash suite of this instance.
    pub fn suite(&self) -> HashSuite {
        self.suite
    }

    /// Generate an independent key for signer `index` from the operating system RNG.
    ///
    /// The key has to reach the verifier over a secure channel.
    pub fn keygen(&self, index: u32) -> Result<Key, Error> {
        self.keygen_with_rng(index, &mut OsRng)
    }

    /// Generate an independent key for signer `index` from `rng`.
    pub fn keygen_with_rng<R: RngCore + CryptoRng>(
        &self,
        index: u32,
        rng: &mut R,
    ) -> Result<Key, Error> {
        Key::generate(self.suite, index, rng)
    }

    /// Generate a master seed from the operating system RNG.
    ///
    /// The seed must not be shared with signers.
    pub fn seedgen(&self) -> MasterSeed {
        self.seedgen_with_rng(&mut OsRng)
    }

    /// Generate a master seed from `rng`.
    pub fn seedgen_with_rng<R: RngCore + CryptoRng>(&self, rng: &mut R) -> MasterSeed {
        MasterSeed::generate(self.suite, rng)
    }

    /// Derive the key of signer `index` from `seed`.
    pub fn derive_key(&self, seed: &MasterSeed, index: u32) -> Result<Key, Error> {
        seed.derive(self.suite, index)
    }

    /// Derive the key of signer `index` from `seed` into `out`.
    pub fn derive_key_into(
        &self,
        seed: &MasterSeed,
        index: u32,
        out: &mut Key,
    ) -> Result<(), Error> {
        seed.derive_into(self.suite, index, out)
    }

    /// Sign `message` with `key`.
    ///
    /// The message is signed as is. Callers that need replay protection include a
    /// nonce in it.
    ///
    /// # Errors
    /// The function fails if the key index is not in `[0, 31]` or the secret is not
    /// `suite.key_bytes()` long.
    pub fn sign(&self, key: &Key, message: &[u8]) -> Result<PartialSignature, Error> {
        let mut out = PartialSignature::empty();
        self.sign_into(key, message, &mut out)?;
        Ok(out)
    }

    /// Sign `message` with `key` into `out`.
    pub fn sign_into(
        &self,
        key: &Key,
        message: &[u8],
        out: &mut PartialSignature,
    ) -> Result<(), Error> {
        key.check(self.suite)?;
        let bitfield = Bitfield::single(key.index)?;

        out.tag.resize(self.suite.tag_bytes(), 0);
        mac_into(self.suite, &key.secret, &[message], &mut out.tag)?;
        out.bitfield = bitfield.0;
        Ok(())
    }

    /// Combine partial signatures of distinct signers. Order does not matter.
    ///
    /// # Errors
    /// The function fails if
    /// * `partials` is empty
    /// * a partial has a tag of the wrong size or does not name exactly one signer
    /// * two partials name the same signer and cancelled each other
    /// * the combined tag is zero
    pub fn combine(&self, partials: &[PartialSignature]) -> Result<CombinedSignature, Error> {
        let mut out = CombinedSignature::empty();
        self.combine_into(partials, &mut out)?;
        Ok(out)
    }

    /// Combine partial signatures into `out`. On error `out` is left empty.
    pub fn combine_into(
        &self,
        partials: &[PartialSignature],
        out: &mut CombinedSignature,
    ) -> Result<(), Error> {
        out.bitfield = 0;
        out.tag.clear();

        if partials.is_empty() {
            return Err(Error::EmptySignatureSet);
        }
        for partial in partials {
            partial.check(self.suite)?;
        }

        out.tag.resize(self.suite.tag_bytes(), 0);
        for partial in partials {
            out.bitfield ^= partial.bitfield;
            xor_into(&mut out.tag, &partial.tag);
        }

        let found = out.bitfield().count();
        if found != partials.len() {
            tracing::warn!(
                expected = partials.len(),
                found,
                "partial signatures cancelled during combination"
            );
            out.bitfield = 0;
            out.tag.clear();
            return Err(Error::SignatureCancellation {
                expected: partials.len(),
                found,
            });
        }
        if is_zero(&out.tag) {
            tracing::warn!(signers = found, "combined tag is zero");
            out.bitfield = 0;
            out.tag.clear();
            return Err(Error::ZeroTag);
        }

        tracing::debug!(
            signers = found,
            bitfield = out.bitfield,
            "combined partial signatures"
        );
        Ok(())
    }

    /// Verify that `signature` over `message` was produced by at least `threshold`
    /// distinct signers, where the key of signer `i` is `keys[i]`.
    ///
    /// Returns `Ok(false)` for signatures that do not validate, including those with
    /// too few signers.
    ///
    /// # Errors
    /// The function fails if
    /// * `threshold` is not in `[1, 32]`
    /// * the signature tag is not `suite.tag_bytes()` long
    /// * `keys` holds fewer keys than the bitfield names, or has no key at the
    ///   highest index the bitfield names
    /// * a replayed key has the wrong size
    pub fn verify(
        &self,
        keys: &[Key],
        signature: &CombinedSignature,
        message: &[u8],
        threshold: u32,
    ) -> Result<bool, Error> {
        self.verify_with(keys, signature, message, threshold)
    }

    /// Verify `signature` like [`MultisigHmac::verify`], recomputing each signer's key
    /// from `seed`.
    ///
    /// # Errors
    /// The function fails if `threshold` is not in `[1, 32]`, the signature tag has
    /// the wrong size, or `seed` is not `suite.key_bytes()` long.
    pub fn verify_derived(
        &self,
        seed: &MasterSeed,
        signature: &CombinedSignature,
        message: &[u8],
        threshold: u32,
    ) -> Result<bool, Error> {
        self.verify_with(seed, signature, message, threshold)
    }

    fn verify_with<S: KeySource + ?Sized>(
        &self,
        keys: &S,
        signature: &CombinedSignature,
        message: &[u8],
        threshold: u32,
    ) -> Result<bool, Error> {
        if threshold == 0 || threshold > MAX_SIGNERS {
            return Err(Error::InvalidThreshold(threshold));
        }
        signature.check_tag(self.suite)?;

        let signers = signature.bitfield();
        keys.check(self.suite, signers)?;

        if signers.count() < threshold as usize {
            tracing::debug!(
                signers = signers.count(),
                threshold,
                "signature names fewer signers than the threshold"
            );
            return Ok(false);
        }

        let mut bitfield = signature.bitfield;
        let mut tag = signature.tag.clone();
        let mut scratch = Key::empty();
        let mut partial = PartialSignature::empty();
        for index in signers.indexes() {
            let key = keys.key(self.suite, index, &mut scratch)?;
            self.sign_into(key, message, &mut partial)?;

            bitfield ^= partial.bitfield;
            xor_into(&mut tag, &partial.tag);
        }

        let valid = (bitfield == 0) & is_zero(&tag);
        tracing::debug!(signers = signers.count(), threshold, valid, "verified signature");
        Ok(valid)
    }
}

fn xor_into(acc: &mut [u8], tag: &[u8]) {
    for (a, t) in acc.iter_mut().zip(tag) {
        *a ^= t;
    }
}

/// Whether every byte is zero, without exiting on the first non-zero byte.
fn is_zero(bytes: &[u8]) -> bool {
    bytes.iter().fold(0u8, |acc, b| acc | b) == 0
}
