//! Delegation Module - root-to-device signing authority
//!
//! A root identity signs `(delegate public key, expiry)`. Anyone holding the
//! delegate public key, the signature and the expiry can recover the root's
//! address without contacting it.

mod expiry;
mod hash;
mod issuer;
mod verifier;

pub use expiry::{Expiry, ExpiryDuration};
pub use hash::{delegate_hash_src, DELEGATE_HASH_HEADER};
pub use issuer::{issue, issue_from_duration, LocalSigner, RootSigner};
pub use verifier::{recover_address, verify};

use serde::{Deserialize, Serialize};

/// Root signature over a delegate key and an expiry.
///
/// The delegate key is not stored: it is part of the signed message, so the
/// delegation only verifies against the key it was issued for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Delegation {
    pub signature: Vec<u8>,
    pub expiry: Expiry,
}
