//! Delegation verification
//!
//! Authenticity only. Neither function looks at the clock; rejecting an
//! expired delegation is the consumer's job (see [`Expiry::is_expired_at`]).

use super::{delegate_hash_src, Expiry};
use crate::crypto::{Address, CryptoPrimitives};
use crate::{Error, Result};

/// Address of whoever signed the delegation of `delegate_public_key` until
/// `expiry`. Tampering with any input yields a different address (or a
/// recovery error), never the original one.
pub fn recover_address<P: CryptoPrimitives>(
    primitives: &P,
    delegate_public_key: &[u8],
    signature: &[u8],
    expiry: Expiry,
) -> Result<Address> {
    let hash_src = delegate_hash_src(delegate_public_key, expiry)?;
    let digest = primitives.message_digest(&hash_src);
    let signer_public_key = primitives.recover_public_key(&digest, signature)?;
    Ok(primitives.address_of(&signer_public_key)?)
}

/// Require that the delegation was signed by `expected_address`.
///
/// A signature that fails to recover at all is reported as a mismatch too:
/// from the caller's side both mean the delegation is not from that identity.
pub fn verify<P: CryptoPrimitives>(
    primitives: &P,
    delegate_public_key: &[u8],
    signature: &[u8],
    expiry: Expiry,
    expected_address: &Address,
) -> Result<()> {
    let recovered = match recover_address(primitives, delegate_public_key, signature, expiry) {
        Ok(address) => address,
        Err(Error::Crypto(e)) => {
            tracing::debug!(error = %e, "Delegation signature did not recover");
            return Err(Error::DelegationMismatch);
        }
        Err(e) => return Err(e),
    };

    if recovered.as_bytes() != expected_address.as_bytes() {
        tracing::debug!(
            expected = %expected_address,
            recovered = %recovered,
            "Delegation signer mismatch"
        );
        return Err(Error::DelegationMismatch);
    }
    Ok(())
}
