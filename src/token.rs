//! Bearer tokens - portable, self-authenticating delegated credentials
//!
//! A token carries the delegate private key, the root's delegation signature
//! and the expiry. It does not carry the creator address: decoding recovers
//! it from the signature, so any edit to the token changes who it speaks for.
//!
//! Holding a token is holding signing authority until its expiry. Treat the
//! string like a private key.

use crate::context::SignerContext;
use crate::crypto::CryptoPrimitives;
use crate::delegation::{recover_address, Delegation, Expiry, RootSigner};
use crate::identity::KeyPair;
use crate::{Error, Result, SignerConfig};
use bincode::Options;
use serde::{Deserialize, Serialize};
use zeroize::{Zeroize, ZeroizeOnDrop};

/// Upper bound on a decoded record, far above any real key/signature size
const MAX_TOKEN_BYTES: u64 = 4 * 1024;

/// Binary record. Field order is part of the wire contract.
#[derive(Serialize, Deserialize, Zeroize, ZeroizeOnDrop)]
struct BearerToken {
    delegate_private_key: Vec<u8>,
    delegate_sig: Vec<u8>,
    expiry_epoch_ms: i64,
}

fn codec() -> impl Options {
    bincode::DefaultOptions::new()
        .with_fixint_encoding()
        .with_little_endian()
        .with_limit(MAX_TOKEN_BYTES)
        .reject_trailing_bytes()
}

/// Serialize a delegated context as lowercase hex.
///
/// Self-signed contexts are refused: exporting one would export the root key.
pub fn encode<P: CryptoPrimitives>(context: &SignerContext<P>) -> Result<String> {
    let (delegate_key_pair, delegation) = match context {
        SignerContext::Delegated {
            delegate_key_pair,
            delegation,
            ..
        } => (delegate_key_pair, delegation),
        SignerContext::SelfSigned { .. } => return Err(Error::NotDelegated),
    };

    let token = BearerToken {
        delegate_private_key: delegate_key_pair.private_key().to_vec(),
        delegate_sig: delegation.signature.clone(),
        expiry_epoch_ms: delegation.expiry.epoch_ms(),
    };

    let mut bytes = codec()
        .serialize(&token)
        .map_err(|e| Error::MalformedToken(e.to_string()))?;
    let encoded = hex::encode(&bytes);
    bytes.zeroize();
    Ok(encoded)
}

/// Rebuild a delegated context from a token string.
///
/// The creator address is recovered, never read from the token. Callers
/// must still check it against their authorization policy and check expiry.
pub fn decode<P: CryptoPrimitives>(primitives: P, token: &str) -> Result<SignerContext<P>> {
    if !token.bytes().all(|b| matches!(b, b'0'..=b'9' | b'a'..=b'f')) {
        return Err(Error::MalformedToken("token must be lowercase hex".into()));
    }
    let mut bytes = hex::decode(token).map_err(|e| Error::MalformedToken(e.to_string()))?;
    let parsed = codec().deserialize::<BearerToken>(&bytes);
    bytes.zeroize();
    let token = parsed.map_err(|e| Error::MalformedToken(e.to_string()))?;

    if !primitives.is_canonical_signature(&token.delegate_sig) {
        return Err(Error::MalformedToken(format!(
            "signature is not a canonical {}-byte encoding",
            P::SIGNATURE_LEN
        )));
    }

    let delegate_key_pair = KeyPair::from_private_key(&primitives, &token.delegate_private_key)
        .map_err(|e| Error::MalformedToken(e.to_string()))?;
    let expiry = Expiry::from_epoch_ms(token.expiry_epoch_ms);

    let creator_address = recover_address(
        &primitives,
        delegate_key_pair.public_key(),
        &token.delegate_sig,
        expiry,
    )
    .map_err(|e| Error::MalformedToken(e.to_string()))?;

    tracing::debug!(
        creator = %creator_address,
        delegate = %delegate_key_pair.address(),
        expiry = %expiry,
        "Signer context restored from bearer token"
    );
    Ok(SignerContext::Delegated {
        primitives,
        delegate_key_pair,
        creator_address,
        delegation: Delegation {
            signature: token.delegate_sig.clone(),
            expiry,
        },
    })
}

/// Generate a delegate for `root` and return it as a bearer token.
///
/// `expiry` defaults to `config.delegation_ttl` from now.
pub async fn make_bearer_token<P, R>(
    primitives: P,
    root: &R,
    expiry: Option<Expiry>,
    config: &SignerConfig,
) -> Result<String>
where
    P: CryptoPrimitives,
    R: RootSigner + ?Sized,
{
    let context = SignerContext::make_signer_delegate(primitives, root, expiry, config).await?;
    encode(&context)
}
