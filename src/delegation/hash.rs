//! Delegation hash source
//!
//! Layout: `"RIVERSIG" || delegate public key || expiry (i64 little-endian)`.
//! Field order and widths are shared with every verifying node; changing
//! either invalidates all outstanding delegations.

use super::Expiry;
use crate::{Error, Result};

/// String 'RIVERSIG' as bytes
pub const DELEGATE_HASH_HEADER: [u8; 8] = *b"RIVERSIG";

/// Bytes the root signs (under the personal-message convention) to
/// authorize `delegate_public_key` until `expiry`.
///
/// Accepts 64-byte raw or 65-byte prefixed public keys.
pub fn delegate_hash_src(delegate_public_key: &[u8], expiry: Expiry) -> Result<Vec<u8>> {
    if expiry.epoch_ms() < 0 {
        return Err(Error::InvalidExpiry);
    }
    if delegate_public_key.len() != 64 && delegate_public_key.len() != 65 {
        return Err(Error::InvalidPublicKey(delegate_public_key.len()));
    }

    let mut buf = Vec::with_capacity(DELEGATE_HASH_HEADER.len() + delegate_public_key.len() + 8);
    buf.extend_from_slice(&DELEGATE_HASH_HEADER);
    buf.extend_from_slice(delegate_public_key);
    buf.extend_from_slice(&expiry.epoch_ms().to_le_bytes());
    Ok(buf)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layout() {
        let key = [0x04u8; 65];
        let src = delegate_hash_src(&key, Expiry::from_epoch_ms(0x0102_0304_0506_0708)).unwrap();

        assert_eq!(src.len(), 8 + 65 + 8);
        assert_eq!(&src[..8], b"RIVERSIG");
        assert_eq!(&src[8..73], &key[..]);
        assert_eq!(&src[73..], &[0x08, 0x07, 0x06, 0x05, 0x04, 0x03, 0x02, 0x01]);
    }

    #[test]
    fn test_deterministic() {
        let key = [7u8; 64];
        let expiry = Expiry::from_epoch_ms(1_700_000_000_000);

        assert_eq!(
            delegate_hash_src(&key, expiry).unwrap(),
            delegate_hash_src(&key, expiry).unwrap()
        );
        assert_ne!(
            delegate_hash_src(&key, expiry).unwrap(),
            delegate_hash_src(&key, Expiry::from_epoch_ms(1_700_000_000_001)).unwrap()
        );
    }

    #[test]
    fn test_rejects_bad_inputs() {
        assert!(matches!(
            delegate_hash_src(&[0u8; 33], Expiry::from_epoch_ms(1)),
            Err(Error::InvalidPublicKey(33))
        ));
        assert!(matches!(
            delegate_hash_src(&[0u8; 65], Expiry::from_epoch_ms(-1)),
            Err(Error::InvalidExpiry)
        ));
        // zero is a valid (legacy) expiry for hashing
        assert!(delegate_hash_src(&[0u8; 65], Expiry::from_epoch_ms(0)).is_ok());
    }
}
