//! HMAC engine, dispatched on the hash suite.
use crate::common::HashSuite;
use crate::errors::Error;
use hmac::{Hmac, Mac};
use sha2::{Sha256, Sha384, Sha512, Sha512_256};

macro_rules! hmac_into {
    ($hash:ty, $key:expr, $parts:expr, $out:expr) => {{
        let mut mac = <Hmac<$hash> as Mac>::new_from_slice($key)
            .map_err(|_| Error::InvalidKeySize($key.len()))?;
        for part in $parts {
            mac.update(part);
        }
        $out.copy_from_slice(&mac.finalize().into_bytes());
    }};
}

/// Computes `HMAC(key, parts[0] || parts[1] || ...)` under `suite` and writes the tag
/// into `out`, which must be exactly `suite.tag_bytes()` long.
pub(crate) fn mac_into(
    suite: HashSuite,
    key: &[u8],
    parts: &[&[u8]],
    out: &mut [u8],
) -> Result<(), Error> {
    if out.len() != suite.tag_bytes() {
        return Err(Error::InvalidTagSize(out.len()));
    }

    match suite {
        HashSuite::Sha256 => hmac_into!(Sha256, key, parts, out),
        HashSuite::Sha384 => hmac_into!(Sha384, key, parts, out),
        HashSuite::Sha512 => hmac_into!(Sha512, key, parts, out),
        HashSuite::Sha512_256 => hmac_into!(Sha512_256, key, parts, out),
    }

    Ok(())
}
