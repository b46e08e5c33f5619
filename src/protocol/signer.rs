//! Key handling, signature production, and recovery.
//!
//! # Security
//! - Private keys are loaded from hex strings or environment variables only
//! - Keys are never logged or serialized
//!
//! Signing and recovery are synchronous and CPU-bound; nothing here
//! suspends. A signature is owned by a single relay attempt and must be
//! produced again whenever the nonce or deadline is rebuilt.

use alloy::primitives::{Address, Signature};
use alloy::signers::local::PrivateKeySigner;
use alloy::signers::SignerSync;
use alloy::sol_types::{Eip712Domain, SolStruct};

use crate::protocol::hash::signing_hash;
use crate::relay::types::{RelayError, RelayResult};

/// Environment variable holding the end user's private key.
pub const USER_KEY_ENV_VAR: &str = "RELAY_USER_PRIVATE_KEY";

/// Environment variable holding the fee-paying relayer's private key.
pub const RELAYER_KEY_ENV_VAR: &str = "RELAY_RELAYER_PRIVATE_KEY";

/// Signing session bound to one address.
#[derive(Debug, Clone)]
pub struct RelaySigner {
    signer: PrivateKeySigner,
}

impl RelaySigner {
    /// Create a signer from a hex-encoded private key (with or without a
    /// 0x prefix).
    pub fn from_private_key(private_key_hex: &str) -> RelayResult<Self> {
        let key_hex = private_key_hex.strip_prefix("0x").unwrap_or(private_key_hex);

        let signer: PrivateKeySigner = key_hex
            .parse()
            .map_err(|e| RelayError::Signing(format!("invalid private key format: {}", e)))?;

        Ok(Self { signer })
    }

    /// Load a signer from an environment variable.
    pub fn from_env(var: &str) -> RelayResult<Self> {
        let key = std::env::var(var)
            .map_err(|_| RelayError::Signing(format!("environment variable {} not set", var)))?;
        Self::from_private_key(&key)
    }

    /// The address this signer is bound to.
    pub fn address(&self) -> Address {
        self.signer.address()
    }

    /// Sign the structured hash of `payload` under `domain`.
    pub fn sign_typed<T: SolStruct>(
        &self,
        domain: &Eip712Domain,
        payload: &T,
    ) -> RelayResult<Signature> {
        let digest = signing_hash(domain, payload);
        self.signer
            .sign_hash_sync(&digest)
            .map_err(|e| RelayError::Signing(format!("signing failed: {}", e)))
    }

    /// The underlying key, for wiring into a transaction-sending wallet.
    pub(crate) fn inner(&self) -> PrivateKeySigner {
        self.signer.clone()
    }
}

/// Recover the signing address from a (domain, payload, signature) triple.
pub fn recover_signer<T: SolStruct>(
    domain: &Eip712Domain,
    payload: &T,
    signature: &Signature,
) -> RelayResult<Address> {
    let digest = signing_hash(domain, payload);
    signature
        .recover_address_from_prehash(&digest)
        .map_err(|e| RelayError::Recovery(e.to_string()))
}

/// Decode a 65-byte (r, s, v) signature from its raw encoding.
pub fn decode_signature(bytes: &[u8]) -> RelayResult<Signature> {
    Signature::from_raw(bytes).map_err(|e| RelayError::Recovery(e.to_string()))
}

/// The pre-submission correctness gate: recover the signer locally and
/// compare it to the expected sender.
///
/// A mismatch means the signature must never reach the executor — an
/// on-chain rejection after submission wastes the relayer's fee. The
/// failed signature is not retried; the request is rebuilt and re-signed.
pub fn verify_signer<T: SolStruct>(
    domain: &Eip712Domain,
    payload: &T,
    signature: &Signature,
    expected: Address,
) -> RelayResult<()> {
    let recovered = recover_signer(domain, payload, signature)?;
    if recovered != expected {
        return Err(RelayError::VerificationFailed {
            expected,
            recovered,
        });
    }
    Ok(())
}
