//! EIP-712 domain construction.

use alloy::primitives::{Address, U256};
use alloy::sol_types::Eip712Domain;
use std::borrow::Cow;

use crate::relay::types::{RelayError, RelayResult};

/// Build the domain-separation structure scoping every signature to one
/// protocol instance on one chain.
///
/// The four values must exactly match what the verifying contract hashes
/// internally. A mismatch does not fail here or at signing time; it
/// surfaces only as an on-chain rejection, so name and version are taken
/// from configuration rather than guessed. The chain id must match the
/// network the relay is connected to (verified at client startup); a
/// mismatch is a caller error the builder cannot recover from.
pub fn build_domain(
    name: &str,
    version: &str,
    chain_id: u64,
    verifying_contract: Address,
) -> RelayResult<Eip712Domain> {
    if name.is_empty() {
        return Err(RelayError::Configuration(
            "domain name must not be empty".to_string(),
        ));
    }
    if version.is_empty() {
        return Err(RelayError::Configuration(
            "domain version must not be empty".to_string(),
        ));
    }

    Ok(Eip712Domain::new(
        Some(Cow::Owned(name.to_string())),
        Some(Cow::Owned(version.to_string())),
        Some(U256::from(chain_id)),
        Some(verifying_contract),
        None,
    ))
}
