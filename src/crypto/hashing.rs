//! Keccak-256 and domain-separated hashing
//!
//! Every signed payload is hashed under an 8-byte tag so a signature made
//! for one kind of message can never be replayed as another kind.

use super::{CryptoPrimitives, Digest};
use sha3::{Digest as _, Keccak256};

/// String 'ABCDEFG>' as bytes
const HASH_SEPARATOR: [u8; 8] = *b"ABCDEFG>";

/// String '<GFEDCBA' as bytes
const HASH_FOOTER: [u8; 8] = *b"<GFEDCBA";

/// Legacy Keccak-256 (the EVM variant, not NIST SHA3-256)
pub fn keccak256(data: &[u8]) -> Digest {
    let mut hasher = Keccak256::new();
    hasher.update(data);
    hasher.finalize().into()
}

/// A hasher bound to an 8-byte domain tag
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct DomainHash([u8; 8]);

impl DomainHash {
    /// Prefix 'CSBLANCA', for stream events
    pub const EVENT: DomainHash = DomainHash(*b"CSBLANCA");

    /// Prefix 'SNAPSHOT', for stream snapshots
    pub const SNAPSHOT: DomainHash = DomainHash(*b"SNAPSHOT");

    /// Prefix 'INTRCERT', for node-to-node certificate hashes
    pub const CERTIFICATE: DomainHash = DomainHash(*b"INTRCERT");

    pub const fn new(tag: [u8; 8]) -> Self {
        Self(tag)
    }

    pub fn tag(&self) -> &[u8; 8] {
        &self.0
    }

    /// Bytes fed to the hash function: tag, payload length (u64 LE),
    /// separator, payload, footer
    pub fn source(&self, payload: &[u8]) -> Vec<u8> {
        let mut buf = Vec::with_capacity(8 + 8 + 8 + payload.len() + 8);
        buf.extend_from_slice(&self.0);
        buf.extend_from_slice(&(payload.len() as u64).to_le_bytes());
        buf.extend_from_slice(&HASH_SEPARATOR);
        buf.extend_from_slice(payload);
        buf.extend_from_slice(&HASH_FOOTER);
        buf
    }

    /// Hash a payload with the given primitives
    pub fn hash<P: CryptoPrimitives>(&self, primitives: &P, payload: &[u8]) -> Digest {
        primitives.hash(&self.source(payload))
    }
}
