//! Account addresses - the canonical identity label derived from a public key

use super::{keccak256, CryptoError};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

pub const ADDRESS_LEN: usize = 20;

/// Fixed-length identifier derived one-way from a public key
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Address([u8; ADDRESS_LEN]);

impl Address {
    /// Create from raw bytes
    pub const fn from_bytes(bytes: [u8; ADDRESS_LEN]) -> Self {
        Self(bytes)
    }

    /// Create from a slice, which must be exactly 20 bytes
    pub fn from_slice(bytes: &[u8]) -> Result<Self, CryptoError> {
        let arr: [u8; ADDRESS_LEN] = bytes.try_into().map_err(|_| {
            CryptoError::InvalidAddress(format!(
                "expected {} bytes, got {}",
                ADDRESS_LEN,
                bytes.len()
            ))
        })?;
        Ok(Self(arr))
    }

    /// Get raw bytes
    pub fn as_bytes(&self) -> &[u8; ADDRESS_LEN] {
        &self.0
    }

    /// Lowercase hex without prefix
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// EIP-55 mixed-case checksum rendering, `0x` prefixed
    pub fn to_checksum_hex(&self) -> String {
        let lower = self.to_hex();
        let hash = keccak256(lower.as_bytes());

        let mut out = String::with_capacity(2 + lower.len());
        out.push_str("0x");
        for (i, c) in lower.chars().enumerate() {
            let nibble = (hash[i / 2] >> if i % 2 == 0 { 4 } else { 0 }) & 0x0f;
            if c.is_ascii_alphabetic() && nibble >= 8 {
                out.push(c.to_ascii_uppercase());
            } else {
                out.push(c);
            }
        }
        out
    }

    /// Parse from hex, with or without a `0x` prefix, any case
    pub fn from_hex(s: &str) -> Result<Self, CryptoError> {
        let trimmed = s.strip_prefix("0x").unwrap_or(s);
        let bytes = hex::decode(trimmed).map_err(|e| CryptoError::InvalidAddress(e.to_string()))?;
        Self::from_slice(&bytes)
    }
}

impl FromStr for Address {
    type Err = CryptoError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_hex(s)
    }
}

impl AsRef<[u8]> for Address {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl fmt::Debug for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Address({})", self.to_checksum_hex())
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_checksum_hex())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_checksum_matches_eip55_vector() {
        // Vector from EIP-55
        let addr = Address::from_hex("0x5aaeb6053f3e94c9b9a09f33669435e7ef1beaed").unwrap();
        assert_eq!(
            addr.to_checksum_hex(),
            "0x5aAeb6053F3E94C9b9A09f33669435E7Ef1BeAed"
        );
    }

    #[test]
    fn test_parse_with_and_without_prefix() {
        let a: Address = "0xfB6916095ca1df60bB79Ce92cE3Ea74c37c5d359".parse().unwrap();
        let b = Address::from_hex("fb6916095ca1df60bb79ce92ce3ea74c37c5d359").unwrap();

        assert_eq!(a, b);
        assert_eq!(a.to_string(), "0xfB6916095ca1df60bB79Ce92cE3Ea74c37c5d359");
    }

    #[test]
    fn test_rejects_wrong_length() {
        assert!(Address::from_hex("0xdeadbeef").is_err());
        assert!(Address::from_slice(&[0u8; 32]).is_err());
    }
}
