//! Threshold multisignatures from HMAC.
//!
//! Up to 32 signers each hold an independent HMAC key, or one derived from a master
//! seed held by the verifier. Each signer authenticates the same message, and the
//! partial tags of any set of signers XOR into a single signature of constant size.
//! The verifier, holding every key (or the seed), checks that at least a threshold
//! of distinct signers contributed without knowing in advance which ones.
//!
//! # Example
//! ```
//! use multisig_hmac::{HashSuite, MultisigHmac};
//!
//! let multisig = MultisigHmac::new(HashSuite::Sha256);
//! let keys = (0..3)
//!     .map(|i| multisig.keygen(i))
//!     .collect::<Result<Vec<_>, _>>()
//!     .unwrap();
//!
//! // The message should carry its own nonce when replays matter.
//! let message = b"Hello world";
//! let s0 = multisig.sign(&keys[0], message).unwrap();
//! let s2 = multisig.sign(&keys[2], message).unwrap();
//! let signature = multisig.combine(&[s0, s2]).unwrap();
//!
//! assert!(multisig.verify(&keys, &signature, message, 2).unwrap());
//! ```
//!
#![warn(missing_docs, rust_2018_idioms)]

mod common;
mod errors;
mod keys;
mod mac;
pub mod multisig;
mod signature;
pub mod traits;

pub use common::{Bitfield, HashSuite, BITFIELD_SIZE, MAX_SIGNERS};
pub use errors::Error;
pub use keys::{Key, MasterSeed, KDF_LABEL};
pub use multisig::MultisigHmac;
pub use signature::{CombinedSignature, PartialSignature};
