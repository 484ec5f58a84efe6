//! Key pairs - root ("primary") and delegate ("device") keys

use crate::crypto::{Address, CryptoError, CryptoPrimitives};
use std::fmt;
use zeroize::Zeroizing;

/// A private key, its public key and the derived address.
///
/// The private bytes are zeroed when the pair is dropped.
#[derive(Clone)]
pub struct KeyPair {
    private_key: Zeroizing<Vec<u8>>,
    public_key: Vec<u8>,
    address: Address,
}

impl KeyPair {
    /// Generate a fresh random key pair
    pub fn generate<P: CryptoPrimitives>(primitives: &P) -> Result<Self, CryptoError> {
        let private_key = primitives.generate_private_key();
        Self::from_private_key(primitives, &private_key)
    }

    /// Rebuild a key pair from raw private key bytes
    pub fn from_private_key<P: CryptoPrimitives>(
        primitives: &P,
        private_key: &[u8],
    ) -> Result<Self, CryptoError> {
        let public_key = primitives.public_key_of(private_key)?;
        let address = primitives.address_of(&public_key)?;
        Ok(Self {
            private_key: Zeroizing::new(private_key.to_vec()),
            public_key,
            address,
        })
    }

    /// Parse a hex private key, `0x` prefix optional
    pub fn from_hex<P: CryptoPrimitives>(primitives: &P, private_key_hex: &str) -> Result<Self, CryptoError> {
        let trimmed = private_key_hex.trim();
        let trimmed = trimmed.strip_prefix("0x").unwrap_or(trimmed);
        let bytes = Zeroizing::new(
            hex::decode(trimmed).map_err(|e| CryptoError::InvalidPrivateKey(e.to_string()))?,
        );
        Self::from_private_key(primitives, &bytes)
    }

    /// Get the public key bytes
    pub fn public_key(&self) -> &[u8] {
        &self.public_key
    }

    /// Get the address derived from the public key
    pub fn address(&self) -> Address {
        self.address
    }

    /// Raw private key bytes. Keep the borrow short.
    pub(crate) fn private_key(&self) -> &[u8] {
        &self.private_key
    }

    /// Private key as lowercase hex, for persistence
    pub fn private_key_hex(&self) -> Zeroizing<String> {
        Zeroizing::new(hex::encode(&*self.private_key))
    }
}

impl fmt::Debug for KeyPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyPair")
            .field("address", &self.address)
            .field("private_key", &"<redacted>")
            .finish()
    }
}

impl PartialEq for KeyPair {
    fn eq(&self, other: &Self) -> bool {
        self.public_key == other.public_key
    }
}

impl Eq for KeyPair {}
