//! Delegation issuance
//!
//! The root key usually lives outside this process (browser wallet, hardware
//! device, remote KMS), so issuance goes through the async [`RootSigner`]
//! capability. One call, one signature: either a complete [`Delegation`] comes
//! back or nothing does.

use super::{delegate_hash_src, Delegation, Expiry, ExpiryDuration};
use crate::crypto::{Address, CryptoPrimitives};
use crate::identity::KeyPair;
use crate::{Error, Result};
use async_trait::async_trait;

/// Signing capability bound to the root private key.
#[async_trait]
pub trait RootSigner: Send + Sync {
    /// Address of the root identity
    async fn address(&self) -> Result<Address>;

    /// Sign `message` under the personal-message convention
    /// (the signer applies the length-prefixed hashing itself).
    async fn sign_message(&self, message: &[u8]) -> Result<Vec<u8>>;
}

/// [`RootSigner`] over an in-process key pair
#[derive(Clone, Debug)]
pub struct LocalSigner<P: CryptoPrimitives> {
    primitives: P,
    key_pair: KeyPair,
}

impl<P: CryptoPrimitives> LocalSigner<P> {
    pub fn new(primitives: P, key_pair: KeyPair) -> Self {
        Self {
            primitives,
            key_pair,
        }
    }

    pub fn key_pair(&self) -> &KeyPair {
        &self.key_pair
    }
}

#[async_trait]
impl<P: CryptoPrimitives> RootSigner for LocalSigner<P> {
    async fn address(&self) -> Result<Address> {
        Ok(self.key_pair.address())
    }

    async fn sign_message(&self, message: &[u8]) -> Result<Vec<u8>> {
        let digest = self.primitives.message_digest(message);
        Ok(self.primitives.sign(&digest, self.key_pair.private_key())?)
    }
}

/// Have `root` authorize `delegate_public_key` until `expiry`.
///
/// Rejects keys that are not the primitive's fixed length and expiries that
/// are not strictly positive.
pub async fn issue<P, R>(
    primitives: &P,
    root: &R,
    delegate_public_key: &[u8],
    expiry: Expiry,
) -> Result<Delegation>
where
    P: CryptoPrimitives,
    R: RootSigner + ?Sized,
{
    if delegate_public_key.len() != primitives.public_key_len() {
        return Err(Error::InvalidPublicKey(delegate_public_key.len()));
    }
    if expiry.epoch_ms() <= 0 {
        return Err(Error::InvalidExpiry);
    }

    let hash_src = delegate_hash_src(delegate_public_key, expiry)?;
    let signature = root.sign_message(&hash_src).await?;

    tracing::debug!(expiry = %expiry, "Delegation issued");
    Ok(Delegation { signature, expiry })
}

/// [`issue`] with `expiry = now + duration`. An empty duration is rejected
/// before the root signer is contacted.
pub async fn issue_from_duration<P, R>(
    primitives: &P,
    root: &R,
    delegate_public_key: &[u8],
    duration: &ExpiryDuration,
) -> Result<Delegation>
where
    P: CryptoPrimitives,
    R: RootSigner + ?Sized,
{
    let expiry = Expiry::after(duration)?;
    issue(primitives, root, delegate_public_key, expiry).await
}
