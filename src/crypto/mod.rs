//! Cryptography Module - signing primitives consumed by the delegation core
//!
//! The delegation, context and token layers never touch a curve directly.
//! They go through [`CryptoPrimitives`], so any sign/recover/address family
//! works as long as issuer and verifier share the same instance.

mod address;
mod hashing;
mod secp256k1;

pub use address::{Address, ADDRESS_LEN};
pub use hashing::{keccak256, DomainHash};
pub use secp256k1::Secp256k1;

use thiserror::Error;
use zeroize::Zeroizing;

#[derive(Error, Debug)]
pub enum CryptoError {
    #[error("Invalid private key: {0}")]
    InvalidPrivateKey(String),

    #[error("Invalid public key: {0}")]
    InvalidPublicKey(String),

    #[error("Invalid signature: {0}")]
    InvalidSignature(String),

    #[error("Signing failed: {0}")]
    SigningFailed(String),

    #[error("Could not recover public key from signature")]
    RecoveryFailed,

    #[error("Invalid address: {0}")]
    InvalidAddress(String),
}

/// Output of the primitive hash function (32 bytes)
pub type Digest = [u8; 32];

/// Sign / recover / address-of capability.
///
/// Implementations must be deterministic in everything except `sign` and
/// `generate_private_key`: two parties hashing or recovering the same bytes
/// must agree exactly.
pub trait CryptoPrimitives: Clone + Send + Sync + 'static {
    /// Fixed length of an encoded public key
    const PUBLIC_KEY_LEN: usize;

    /// Fixed length of an encoded signature
    const SIGNATURE_LEN: usize;

    /// Fixed length of a private key
    const PRIVATE_KEY_LEN: usize;

    /// Expected public key length, for callers holding a value rather than the type
    fn public_key_len(&self) -> usize {
        Self::PUBLIC_KEY_LEN
    }

    /// Whether `signature` is in the single encoding this family emits.
    ///
    /// Recovery may tolerate alternate encodings; stored credentials must not.
    fn is_canonical_signature(&self, signature: &[u8]) -> bool {
        signature.len() == Self::SIGNATURE_LEN
    }

    /// The length-fixed hash function
    fn hash(&self, data: &[u8]) -> Digest;

    /// Personal-message digest: length-prefixed and domain-separated before hashing
    fn message_digest(&self, message: &[u8]) -> Digest;

    /// Sign a digest with a raw private key
    fn sign(&self, digest: &Digest, private_key: &[u8]) -> Result<Vec<u8>, CryptoError>;

    /// Recover the signer's public key from a signature over `digest`
    fn recover_public_key(&self, digest: &Digest, signature: &[u8]) -> Result<Vec<u8>, CryptoError>;

    /// Derive the public key for a private key
    fn public_key_of(&self, private_key: &[u8]) -> Result<Vec<u8>, CryptoError>;

    /// Derive the address for a public key (one-way)
    fn address_of(&self, public_key: &[u8]) -> Result<Address, CryptoError>;

    /// Fresh private key from the OS randomness source
    fn generate_private_key(&self) -> Zeroizing<Vec<u8>>;
}

/// Current wall-clock time in milliseconds since the Unix epoch
pub fn now_epoch_ms() -> i64 {
    chrono::Utc::now().timestamp_millis()
}
