//! secp256k1 + Keccak-256, the Ethereum-compatible primitive family
//!
//! Public keys are 65-byte uncompressed SEC1 points, signatures are
//! `r || s || v` with `v` in {27, 28}, and addresses are the last 20 bytes of
//! `keccak256(pubkey[1..])`.

use super::{keccak256, Address, CryptoError, CryptoPrimitives, Digest};
use k256::ecdsa::{RecoveryId, Signature, SigningKey, VerifyingKey};
use rand::rngs::OsRng;
use zeroize::Zeroizing;

const PERSONAL_MESSAGE_PREFIX: &[u8] = b"\x19Ethereum Signed Message:\n";

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Secp256k1;

impl Secp256k1 {
    fn signing_key(private_key: &[u8]) -> Result<SigningKey, CryptoError> {
        if private_key.len() != Self::PRIVATE_KEY_LEN {
            return Err(CryptoError::InvalidPrivateKey(format!(
                "expected {} bytes, got {}",
                Self::PRIVATE_KEY_LEN,
                private_key.len()
            )));
        }
        SigningKey::from_slice(private_key).map_err(|e| CryptoError::InvalidPrivateKey(e.to_string()))
    }

    fn encode_public_key(key: &VerifyingKey) -> Vec<u8> {
        key.to_encoded_point(false).as_bytes().to_vec()
    }
}

impl CryptoPrimitives for Secp256k1 {
    const PUBLIC_KEY_LEN: usize = 65;
    const SIGNATURE_LEN: usize = 65;
    const PRIVATE_KEY_LEN: usize = 32;

    fn is_canonical_signature(&self, signature: &[u8]) -> bool {
        signature.len() == Self::SIGNATURE_LEN && matches!(signature[64], 27 | 28)
    }

    fn hash(&self, data: &[u8]) -> Digest {
        keccak256(data)
    }

    fn message_digest(&self, message: &[u8]) -> Digest {
        let len = message.len().to_string();
        let mut buf = Vec::with_capacity(PERSONAL_MESSAGE_PREFIX.len() + len.len() + message.len());
        buf.extend_from_slice(PERSONAL_MESSAGE_PREFIX);
        buf.extend_from_slice(len.as_bytes());
        buf.extend_from_slice(message);
        keccak256(&buf)
    }

    fn sign(&self, digest: &Digest, private_key: &[u8]) -> Result<Vec<u8>, CryptoError> {
        let key = Self::signing_key(private_key)?;
        let (signature, recovery_id) = key
            .sign_prehash_recoverable(digest)
            .map_err(|e| CryptoError::SigningFailed(e.to_string()))?;

        let mut out = Vec::with_capacity(Self::SIGNATURE_LEN);
        out.extend_from_slice(&signature.to_bytes());
        out.push(recovery_id.to_byte() + 27);
        Ok(out)
    }

    fn recover_public_key(&self, digest: &Digest, signature: &[u8]) -> Result<Vec<u8>, CryptoError> {
        if signature.len() != Self::SIGNATURE_LEN {
            return Err(CryptoError::InvalidSignature(format!(
                "expected {} bytes, got {}",
                Self::SIGNATURE_LEN,
                signature.len()
            )));
        }

        // Wallets emit v as 27/28, raw signers as 0/1
        let v = signature[64];
        let v = if v >= 27 { v - 27 } else { v };
        let recovery_id = RecoveryId::from_byte(v)
            .ok_or_else(|| CryptoError::InvalidSignature(format!("bad recovery id {}", signature[64])))?;

        let sig = Signature::from_slice(&signature[..64])
            .map_err(|e| CryptoError::InvalidSignature(e.to_string()))?;

        let key = VerifyingKey::recover_from_prehash(digest, &sig, recovery_id)
            .map_err(|_| CryptoError::RecoveryFailed)?;
        Ok(Self::encode_public_key(&key))
    }

    fn public_key_of(&self, private_key: &[u8]) -> Result<Vec<u8>, CryptoError> {
        let key = Self::signing_key(private_key)?;
        Ok(Self::encode_public_key(key.verifying_key()))
    }

    fn address_of(&self, public_key: &[u8]) -> Result<Address, CryptoError> {
        if public_key.len() != Self::PUBLIC_KEY_LEN || public_key[0] != 0x04 {
            return Err(CryptoError::InvalidPublicKey(format!(
                "expected {}-byte uncompressed key, got {} bytes",
                Self::PUBLIC_KEY_LEN,
                public_key.len()
            )));
        }
        let hash = keccak256(&public_key[1..]);
        Address::from_slice(&hash[12..])
    }

    fn generate_private_key(&self) -> Zeroizing<Vec<u8>> {
        let key = SigningKey::random(&mut OsRng);
        Zeroizing::new(key.to_bytes().to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Well-known development key (hardhat/anvil account #0)
    const DEV_KEY: &str = "ac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";
    const DEV_ADDRESS: &str = "0xf39Fd6e51aad88F6F4ce6aB8827279cffFb92266";

    #[test]
    fn test_known_key_address() {
        let p = Secp256k1;
        let private_key = hex::decode(DEV_KEY).unwrap();
        let public_key = p.public_key_of(&private_key).unwrap();

        assert_eq!(public_key.len(), 65);
        assert_eq!(public_key[0], 0x04);
        assert_eq!(p.address_of(&public_key).unwrap().to_string(), DEV_ADDRESS);
    }

    #[test]
    fn test_signature_layout() {
        let p = Secp256k1;
        let private_key = p.generate_private_key();
        let signature = p.sign(&p.message_digest(b"layout"), &private_key).unwrap();

        assert_eq!(signature.len(), 65);
        assert!(signature[64] == 27 || signature[64] == 28);
    }

    #[test]
    fn test_recover_accepts_raw_recovery_id() {
        let p = Secp256k1;
        let private_key = p.generate_private_key();
        let public_key = p.public_key_of(&private_key).unwrap();
        let digest = p.hash(b"raw v");

        let mut signature = p.sign(&digest, &private_key).unwrap();
        signature[64] -= 27;

        assert_eq!(p.recover_public_key(&digest, &signature).unwrap(), public_key);
    }

    #[test]
    fn test_canonical_signature() {
        let p = Secp256k1;
        let private_key = p.generate_private_key();
        let mut signature = p.sign(&p.hash(b"canonical"), &private_key).unwrap();

        assert!(p.is_canonical_signature(&signature));

        signature[64] -= 27;
        assert!(!p.is_canonical_signature(&signature));
        assert!(!p.is_canonical_signature(&signature[..64]));
    }

    #[test]
    fn test_rejects_bad_inputs() {
        let p = Secp256k1;
        let digest = p.hash(b"x");

        assert!(p.sign(&digest, &[0u8; 31]).is_err());
        // zero is not a valid scalar
        assert!(p.sign(&digest, &[0u8; 32]).is_err());
        assert!(p.recover_public_key(&digest, &[1u8; 64]).is_err());

        let mut bad_v = vec![1u8; 65];
        bad_v[64] = 9;
        assert!(p.recover_public_key(&digest, &bad_v).is_err());

        assert!(p.address_of(&[4u8; 64]).is_err());
    }

    #[test]
    fn test_personal_message_prefix() {
        let p = Secp256k1;
        let mut expected = b"\x19Ethereum Signed Message:\n5".to_vec();
        expected.extend_from_slice(b"hello");

        assert_eq!(p.message_digest(b"hello"), keccak256(&expected));
    }
}
