//! Structures common to all operations of the multisignature scheme
use crate::errors::Error;
use std::fmt;
use std::str::FromStr;

#[cfg(feature = "serde_enabled")]
use serde::{Deserialize, Serialize};

/// Number of signers addressable by a bitfield.
pub const MAX_SIGNERS: u32 = 32;

/// Size of the serialised index or bitfield that prefixes keys and signatures.
pub const BITFIELD_SIZE: usize = 4;

/// Hash function underlying the HMAC, together with the key and tag sizes it fixes.
///
/// Keys, seeds and tags of one suite are never valid in another; mixing them is
/// caught as a size mismatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde_enabled", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde_enabled", serde(rename_all = "snake_case"))]
pub enum HashSuite {
    /// HMAC-SHA-256: 64 byte keys, 32 byte tags.
    Sha256,
    /// HMAC-SHA-384: 128 byte keys, 48 byte tags.
    Sha384,
    /// HMAC-SHA-512: 128 byte keys, 64 byte tags.
    Sha512,
    /// HMAC-SHA-512/256: 128 byte keys, 32 byte tags.
    Sha512_256,
}

impl HashSuite {
    /// All supported suites.
    pub const ALL: [HashSuite; 4] = [
        HashSuite::Sha256,
        HashSuite::Sha384,
        HashSuite::Sha512,
        HashSuite::Sha512_256,
    ];

    /// Byte size of keys and master seeds, which equals the block size of the hash.
    pub const fn key_bytes(self) -> usize {
        match self {
            HashSuite::Sha256 => 64,
            HashSuite::Sha384 | HashSuite::Sha512 | HashSuite::Sha512_256 => 128,
        }
    }

    /// Byte size of a tag, which equals the output size of the hash.
    pub const fn tag_bytes(self) -> usize {
        match self {
            HashSuite::Sha256 | HashSuite::Sha512_256 => 32,
            HashSuite::Sha384 => 48,
            HashSuite::Sha512 => 64,
        }
    }

    /// Canonical identifier of the suite.
    pub const fn name(self) -> &'static str {
        match self {
            HashSuite::Sha256 => "sha256",
            HashSuite::Sha384 => "sha384",
            HashSuite::Sha512 => "sha512",
            HashSuite::Sha512_256 => "sha512_256",
        }
    }

    /// Byte size of a serialised signature (`bitfield || tag`).
    pub const fn signature_bytes(self) -> usize {
        BITFIELD_SIZE + self.tag_bytes()
    }

    /// Byte size of a serialised key (`index || secret`).
    pub const fn encoded_key_bytes(self) -> usize {
        BITFIELD_SIZE + self.key_bytes()
    }
}

impl Default for HashSuite {
    fn default() -> Self {
        HashSuite::Sha256
    }
}

impl fmt::Display for HashSuite {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for HashSuite {
    type Err = Error;

    /// Parses a suite identifier. Case is ignored, and `-` and `_` are interchangeable.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalised = s.trim().to_ascii_lowercase().replace('-', "_");
        match normalised.as_str() {
            "sha256" => Ok(HashSuite::Sha256),
            "sha384" => Ok(HashSuite::Sha384),
            "sha512" => Ok(HashSuite::Sha512),
            "sha512_256" => Ok(HashSuite::Sha512_256),
            _ => Err(Error::UnknownSuite(s.to_string())),
        }
    }
}

/// Checks that `index` addresses a bit of the bitfield.
pub(crate) fn check_index(index: u32) -> Result<u32, Error> {
    if index < MAX_SIGNERS {
        Ok(index)
    } else {
        Err(Error::IndexOutOfRange(index))
    }
}

/// Set of signers, where bit `i` set means the signer with index `i` contributed.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Default)]
pub struct Bitfield(pub u32);

impl Bitfield {
    /// Bitfield naming the single signer `index`.
    pub fn single(index: u32) -> Result<Self, Error> {
        Ok(Bitfield(1 << check_index(index)?))
    }

    /// Number of signers in the set.
    pub fn count(self) -> usize {
        self.0.count_ones() as usize
    }

    /// Whether exactly one signer is in the set.
    pub fn is_single(self) -> bool {
        self.0.is_power_of_two()
    }

    /// Highest signer index in the set, or `None` when empty.
    pub fn highest(self) -> Option<u32> {
        if self.0 == 0 {
            None
        } else {
            Some(MAX_SIGNERS - 1 - self.0.leading_zeros())
        }
    }

    /// Signer indices in ascending order.
    pub fn indexes(self) -> impl Iterator<Item = u32> {
        (0..MAX_SIGNERS).filter(move |i| self.0 & (1 << i) != 0)
    }
}

impl From<u32> for Bitfield {
    fn from(bits: u32) -> Self {
        Bitfield(bits)
    }
}
