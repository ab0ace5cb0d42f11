//! Partial and combined signatures.
//!
//! Both share the wire layout `( bitfield (u32 LE) || tag )`. A partial signature
//! names exactly one signer; a combined signature names every signer whose tag was
//! folded into it.
use crate::common::{Bitfield, HashSuite, BITFIELD_SIZE};
use crate::errors::Error;

#[cfg(feature = "serde_enabled")]
use serde::{Deserialize, Serialize};

macro_rules! signature {
    ($name:ident, $doc:expr) => {
        #[derive(Debug, Clone, PartialEq, Eq)]
        #[cfg_attr(feature = "serde_enabled", derive(Serialize, Deserialize))]
        #[doc=$doc]
        pub struct $name {
            pub(crate) bitfield: u32,
            #[cfg_attr(
                feature = "serde_enabled",
                serde(with = "serde_with::As::<serde_with::Bytes>")
            )]
            pub(crate) tag: Vec<u8>,
        }

        impl $name {
            /// An empty signature, to be filled by one of the `*_into` operations.
            pub fn empty() -> Self {
                $name {
                    bitfield: 0,
                    tag: Vec::new(),
                }
            }

            /// Signers covered by the signature.
            pub fn bitfield(&self) -> Bitfield {
                Bitfield(self.bitfield)
            }

            /// Authentication tag.
            pub fn tag(&self) -> &[u8] {
                &self.tag
            }

            /// Convert `Self` into its byte representation. In particular, the encoding
            /// returns the following array of size `4 + tag.len()`:
            /// ( bitfield (u32 LE) || tag )
            pub fn to_bytes(&self) -> Vec<u8> {
                let mut out = Vec::with_capacity(BITFIELD_SIZE + self.tag.len());
                out.extend_from_slice(&self.bitfield.to_le_bytes());
                out.extend_from_slice(&self.tag);
                out
            }

            fn split_bytes(suite: HashSuite, bytes: &[u8]) -> Result<(u32, &[u8]), Error> {
                if bytes.len() != suite.signature_bytes() {
                    return Err(Error::InvalidEncodingSize(bytes.len()));
                }

                let mut bitfield = [0u8; BITFIELD_SIZE];
                bitfield.copy_from_slice(&bytes[..BITFIELD_SIZE]);
                Ok((u32::from_le_bytes(bitfield), &bytes[BITFIELD_SIZE..]))
            }

            pub(crate) fn check_tag(&self, suite: HashSuite) -> Result<(), Error> {
                if self.tag.len() != suite.tag_bytes() {
                    return Err(Error::InvalidTagSize(self.tag.len()));
                }
                Ok(())
            }
        }
    };
}

signature!(
    PartialSignature,
    "Signature of a single signer over a message."
);
signature!(
    CombinedSignature,
    "XOR of the partial signatures of a set of distinct signers."
);

impl PartialSignature {
    /// Index of the signer, or `None` for a signature that does not name exactly
    /// one signer, such as [`PartialSignature::empty`].
    pub fn index(&self) -> Option<u32> {
        if self.bitfield().is_single() {
            Some(self.bitfield.trailing_zeros())
        } else {
            None
        }
    }

    /// Convert the slice of bytes into `Self`.
    ///
    /// # Errors
    /// The function fails if
    /// * `bytes.len()` is not `4 + suite.tag_bytes()`
    /// * the bitfield does not have exactly one bit set
    pub fn from_bytes(suite: HashSuite, bytes: &[u8]) -> Result<Self, Error> {
        let (bitfield, tag) = Self::split_bytes(suite, bytes)?;
        if !Bitfield(bitfield).is_single() {
            return Err(Error::InvalidBitfield(bitfield));
        }
        Ok(PartialSignature {
            bitfield,
            tag: tag.to_vec(),
        })
    }

    pub(crate) fn check(&self, suite: HashSuite) -> Result<(), Error> {
        if !self.bitfield().is_single() {
            return Err(Error::InvalidBitfield(self.bitfield));
        }
        self.check_tag(suite)
    }
}

impl CombinedSignature {
    /// Build a combined signature from its bitfield and tag.
    ///
    /// # Errors
    /// The function fails if `tag.len()` is not `suite.tag_bytes()`.
    pub fn new(suite: HashSuite, bitfield: u32, tag: &[u8]) -> Result<Self, Error> {
        if tag.len() != suite.tag_bytes() {
            return Err(Error::InvalidTagSize(tag.len()));
        }
        Ok(CombinedSignature {
            bitfield,
            tag: tag.to_vec(),
        })
    }

    /// Convert the slice of bytes into `Self`.
    ///
    /// # Errors
    /// The function fails if `bytes.len()` is not `4 + suite.tag_bytes()`.
    pub fn from_bytes(suite: HashSuite, bytes: &[u8]) -> Result<Self, Error> {
        let (bitfield, tag) = Self::split_bytes(suite, bytes)?;
        Ok(CombinedSignature {
            bitfield,
            tag: tag.to_vec(),
        })
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn partial_bytes() {
        let suite = HashSuite::Sha384;
        let sig = PartialSignature {
            bitfield: 1 << 5,
            tag: vec![0x5a; 48],
        };
        let bytes = sig.to_bytes();
        assert_eq!(bytes.len(), 52);
        assert_eq!(&bytes[..4], &[0x20, 0, 0, 0]);
        assert_eq!(PartialSignature::from_bytes(suite, &bytes), Ok(sig.clone()));
        assert_eq!(sig.index(), Some(5));
        assert_eq!(PartialSignature::empty().index(), None);

        assert_eq!(
            PartialSignature::from_bytes(HashSuite::Sha256, &bytes),
            Err(Error::InvalidEncodingSize(52))
        );

        let mut two_signers = bytes.clone();
        two_signers[0] = 0x21;
        assert_eq!(
            PartialSignature::from_bytes(suite, &two_signers),
            Err(Error::InvalidBitfield(0x21))
        );
    }

    #[test]
    fn combined_bytes() {
        let suite = HashSuite::Sha256;
        let sig = CombinedSignature::new(suite, 0x8000_0005, &[1u8; 32]).unwrap();
        let bytes = sig.to_bytes();
        assert_eq!(&bytes[..4], &[0x05, 0, 0, 0x80]);
        assert_eq!(CombinedSignature::from_bytes(suite, &bytes), Ok(sig.clone()));
        assert_eq!(sig.bitfield().indexes().collect::<Vec<_>>(), vec![0, 2, 31]);

        assert_eq!(
            CombinedSignature::new(suite, 1, &[1u8; 64]),
            Err(Error::InvalidTagSize(64))
        );
    }
}
