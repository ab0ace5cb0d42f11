//! Errors specific to HMAC multisignatures
//!
//! Every variant is a usage fault. A signature that simply fails to verify is
//! reported as `Ok(false)` by the verifier, never through this type.

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
/// Enum of errors associated with HMAC multisignatures
pub enum Error {
    /// The suite identifier does not name one of the supported hash suites.
    #[error("unknown hash suite: {0}")]
    UnknownSuite(String),
    /// A signer index does not fit in the 32-bit bitfield.
    #[error("signer index {0} is out of range [0, 31]")]
    IndexOutOfRange(u32),
    /// Error occurs when the size of a key secret is not the expected.
    #[error("invalid key size: {0}")]
    InvalidKeySize(usize),
    /// Error occurs when the size of a master seed is not the expected.
    #[error("invalid master seed size: {0}")]
    InvalidSeedSize(usize),
    /// Error occurs when the size of a signature tag is not the expected.
    #[error("invalid tag size: {0}")]
    InvalidTagSize(usize),
    /// Error occurs when a serialised key or signature has the wrong length.
    #[error("invalid encoding size: {0}")]
    InvalidEncodingSize(usize),
    /// A partial signature's bitfield does not have exactly one bit set.
    #[error("invalid partial signature bitfield: {0:#010x}")]
    InvalidBitfield(u32),
    /// The threshold is zero or larger than the number of addressable signers.
    #[error("invalid threshold: {0}")]
    InvalidThreshold(u32),
    /// The keyset handed to the verifier cannot cover the signers named in the bitfield.
    #[error("insufficient keys: {needed} required, {provided} provided")]
    InsufficientKeys {
        /// Number of keys the bitfield requires.
        needed: usize,
        /// Number of keys supplied.
        provided: usize,
    },
    /// Combination was requested over an empty set of partial signatures.
    #[error("no partial signatures to combine")]
    EmptySignatureSet,
    /// Two or more partial signatures shared an index and cancelled under XOR.
    #[error("signature cancellation: {expected} signatures combined into {found} signers")]
    SignatureCancellation {
        /// Number of partial signatures given.
        expected: usize,
        /// Number of signers left in the combined bitfield.
        found: usize,
    },
    /// The combined tag is all zeroes.
    #[error("combined tag is zero")]
    ZeroTag,
}
