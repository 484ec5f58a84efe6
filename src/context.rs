//! Signer contexts - the credential bundle used to sign outgoing actions
//!
//! A context is either self-signed (the root key signs directly) or
//! delegated (a device key signs, and the root's delegation travels with
//! every action). Callers never see the private scalar; they get an
//! [`ActiveSigner`] that can only sign digests.

use crate::crypto::{now_epoch_ms, Address, CryptoPrimitives, Digest, DomainHash, Secp256k1};
use crate::delegation::{issue, recover_address, Delegation, Expiry, RootSigner};
use crate::identity::KeyPair;
use crate::{Error, Result, SignerConfig};
use serde::{Deserialize, Serialize};

/// Runtime signing credential
#[derive(Debug, Clone)]
pub enum SignerContext<P: CryptoPrimitives = Secp256k1> {
    /// Root key signs directly
    SelfSigned { primitives: P, key_pair: KeyPair },

    /// Device key signs on the root's behalf
    Delegated {
        primitives: P,
        delegate_key_pair: KeyPair,
        creator_address: Address,
        delegation: Delegation,
    },
}

/// Signing capability for the context's active key
pub struct ActiveSigner<'a, P: CryptoPrimitives> {
    primitives: &'a P,
    key_pair: &'a KeyPair,
}

impl<P: CryptoPrimitives> ActiveSigner<'_, P> {
    pub fn sign(&self, digest: &Digest) -> Result<Vec<u8>> {
        Ok(self.primitives.sign(digest, self.key_pair.private_key())?)
    }

    /// Public key matching the signatures this signer produces
    pub fn public_key(&self) -> &[u8] {
        self.key_pair.public_key()
    }
}

impl<P: CryptoPrimitives> SignerContext<P> {
    /// Issue a delegation from `root` to `delegate_key_pair` and wrap it.
    ///
    /// The fresh delegation is checked to recover to the root's address, so
    /// a root signer answering for a different account is caught here.
    pub async fn make_direct<R>(
        primitives: P,
        root: &R,
        delegate_key_pair: KeyPair,
        expiry: Expiry,
    ) -> Result<Self>
    where
        R: RootSigner + ?Sized,
    {
        let delegation = issue(&primitives, root, delegate_key_pair.public_key(), expiry).await?;
        let creator_address = root.address().await?;

        let recovered = recover_address(
            &primitives,
            delegate_key_pair.public_key(),
            &delegation.signature,
            delegation.expiry,
        )
        .map_err(|_| Error::DelegationMismatch)?;
        if recovered != creator_address {
            return Err(Error::DelegationMismatch);
        }

        tracing::debug!(
            creator = %creator_address,
            delegate = %delegate_key_pair.address(),
            expiry = %delegation.expiry,
            "Delegated signer context created"
        );
        Ok(Self::Delegated {
            primitives,
            delegate_key_pair,
            creator_address,
            delegation,
        })
    }

    /// Generate a random device key and delegate to it.
    ///
    /// `expiry` defaults to `config.delegation_ttl` from now.
    pub async fn make_signer_delegate<R>(
        primitives: P,
        root: &R,
        expiry: Option<Expiry>,
        config: &SignerConfig,
    ) -> Result<Self>
    where
        R: RootSigner + ?Sized,
    {
        let expiry = match expiry {
            Some(expiry) => expiry,
            None => config.delegation_expiry()?,
        };
        let delegate_key_pair = KeyPair::generate(&primitives)?;
        tracing::info!(delegate = %delegate_key_pair.address(), "Delegate key generated");
        Self::make_direct(primitives, root, delegate_key_pair, expiry).await
    }

    /// Context that signs with the root key itself
    pub fn make_self_signed(primitives: P, key_pair: KeyPair) -> Self {
        Self::SelfSigned {
            primitives,
            key_pair,
        }
    }

    /// Identity every action from this context is attributed to
    pub fn creator_address(&self) -> Address {
        match self {
            Self::SelfSigned { key_pair, .. } => key_pair.address(),
            Self::Delegated {
                creator_address, ..
            } => *creator_address,
        }
    }

    pub fn delegation(&self) -> Option<&Delegation> {
        match self {
            Self::SelfSigned { .. } => None,
            Self::Delegated { delegation, .. } => Some(delegation),
        }
    }

    pub fn is_delegated(&self) -> bool {
        matches!(self, Self::Delegated { .. })
    }

    pub fn primitives(&self) -> &P {
        match self {
            Self::SelfSigned { primitives, .. } | Self::Delegated { primitives, .. } => primitives,
        }
    }

    /// The key that signs outgoing actions
    pub fn active_signer(&self) -> ActiveSigner<'_, P> {
        match self {
            Self::SelfSigned {
                primitives,
                key_pair,
            } => ActiveSigner {
                primitives,
                key_pair,
            },
            Self::Delegated {
                primitives,
                delegate_key_pair,
                ..
            } => ActiveSigner {
                primitives,
                key_pair: delegate_key_pair,
            },
        }
    }

    /// Hash `payload` under `domain`, sign it with the active key, and attach
    /// the creator address and delegation so a remote party can verify it.
    pub fn sign_action(&self, domain: DomainHash, payload: &[u8]) -> Result<SignedAction> {
        let hash = domain.hash(self.primitives(), payload);
        let signature = self.active_signer().sign(&hash)?;
        Ok(SignedAction {
            hash,
            signature,
            creator_address: self.creator_address(),
            delegation: self.delegation().cloned(),
        })
    }
}

/// A signed outbound action and the credentials needed to check it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignedAction {
    pub hash: Digest,
    pub signature: Vec<u8>,
    pub creator_address: Address,
    pub delegation: Option<Delegation>,
}

/// Consumer-side check of a [`SignedAction`].
///
/// Recomputes the hash, recovers the signing key, authenticates it against
/// `creator_address` (directly, or through the delegation), and rejects a
/// lapsed delegation at `now_ms`. Whether `creator_address` may perform the
/// action is still the caller's decision.
pub fn verify_action_at<P: CryptoPrimitives>(
    primitives: &P,
    domain: DomainHash,
    payload: &[u8],
    action: &SignedAction,
    now_ms: i64,
) -> Result<()> {
    let hash = domain.hash(primitives, payload);
    if hash != action.hash {
        return Err(Error::DelegationMismatch);
    }

    let signer_public_key = primitives
        .recover_public_key(&hash, &action.signature)
        .map_err(|_| Error::DelegationMismatch)?;

    match &action.delegation {
        None => {
            let signer = primitives.address_of(&signer_public_key)?;
            if signer != action.creator_address {
                return Err(Error::DelegationMismatch);
            }
        }
        Some(delegation) => {
            crate::delegation::verify(
                primitives,
                &signer_public_key,
                &delegation.signature,
                delegation.expiry,
                &action.creator_address,
            )?;
            if delegation.expiry.is_expired_at(now_ms) {
                return Err(Error::DelegationExpired {
                    expiry: delegation.expiry.epoch_ms(),
                    now: now_ms,
                });
            }
        }
    }
    Ok(())
}

/// [`verify_action_at`] against the current clock
pub fn verify_action<P: CryptoPrimitives>(
    primitives: &P,
    domain: DomainHash,
    payload: &[u8],
    action: &SignedAction,
) -> Result<()> {
    verify_action_at(primitives, domain, payload, action, now_epoch_ms())
}
