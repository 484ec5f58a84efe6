//! River Signer Core - self-certifying delegated signing credentials
//!
//! A long-lived root identity authorizes a short-lived device key for a
//! bounded time window. Anyone can later check that authorization from the
//! delegation's own bytes: no issuer contact, no server-side session table.
//!
//! - [`delegation`] builds, issues and verifies root-to-device delegations
//! - [`context`] bundles the active signing key with the creator identity
//! - [`token`] turns a delegated context into a portable bearer token
//! - [`crypto`] and [`identity`] provide the primitives and key handling
//!
//! Verification here is authenticity only. Receivers must still check the
//! recovered address against their own authorization policy and reject
//! delegations past their expiry.

pub mod context;
pub mod crypto;
pub mod delegation;
pub mod identity;
pub mod token;

pub use context::{verify_action, verify_action_at, ActiveSigner, SignedAction, SignerContext};
pub use crypto::{Address, CryptoPrimitives, DomainHash, Secp256k1};
pub use delegation::{Delegation, Expiry, ExpiryDuration, LocalSigner, RootSigner};
pub use identity::{KeyPair, WalletFiles};

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for delegation, context and token operations
#[derive(Error, Debug)]
pub enum Error {
    #[error("Invalid public key length: {0} bytes")]
    InvalidPublicKey(usize),

    #[error("Invalid expiry: must be positive and non-empty")]
    InvalidExpiry,

    #[error("Delegation signature does not match creator address")]
    DelegationMismatch,

    #[error("Delegation expired at {expiry} (now {now})")]
    DelegationExpired { expiry: i64, now: i64 },

    #[error("Malformed bearer token: {0}")]
    MalformedToken(String),

    #[error("Signer context is not delegated")]
    NotDelegated,

    #[error("Root signer failed: {0}")]
    RootSigner(String),

    #[error("Cryptographic error: {0}")]
    Crypto(#[from] crypto::CryptoError),

    #[error("Identity error: {0}")]
    Identity(#[from] identity::IdentityError),
}

pub type Result<T> = std::result::Result<T, Error>;

/// Signer configuration
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct SignerConfig {
    /// Lifetime of delegations created without an explicit expiry
    pub delegation_ttl: ExpiryDuration,

    /// Environment variable holding a hex root private key
    pub private_key_env_var: String,

    /// Directory holding persisted key files
    pub wallet_path: PathBuf,
}

impl Default for SignerConfig {
    fn default() -> Self {
        Self {
            delegation_ttl: ExpiryDuration::days(30),
            private_key_env_var: "RIVER_PRIVATE_KEY".to_string(),
            wallet_path: PathBuf::from("./wallet"),
        }
    }
}

impl SignerConfig {
    /// `now + delegation_ttl`
    pub fn delegation_expiry(&self) -> Result<Expiry> {
        Expiry::after(&self.delegation_ttl)
    }

    /// Key file locations under `wallet_path`
    pub fn wallet_files(&self) -> WalletFiles {
        WalletFiles::in_dir(&self.wallet_path)
    }
}
