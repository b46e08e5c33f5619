//! Authoritative nonce reads against the executor.
//!
//! There is no write path here: the nonce advances only as an effect of
//! successful execution, observed indirectly through a changed read on the
//! next attempt. Reads are performed as the last step before signing to
//! keep the window small in which a concurrent transaction could advance
//! the nonce and invalidate the signature; a fetched nonce is never safe
//! to cache across a suspension point.
//!
//! # Concurrency
//! The read-then-sign window is a race when multiple attempts for the same
//! sender run concurrently: both read the same nonce, both sign, at most
//! one lands. Only one in-flight attempt per sender is safe without an
//! external sequencing discipline (e.g. a per-sender attempt queue).
//! Attempts for different senders are independent.

use alloy::primitives::{Address, U256};
use tokio::time::timeout;

use crate::chain::bindings::{Forwarder, SmartAccount};
use crate::chain::client::ChainClient;
use crate::chain::types::ChainError;
use crate::relay::types::{RelayError, RelayResult};

/// Read the forwarder's current nonce for `owner`.
pub async fn forwarder_nonce(
    client: &ChainClient,
    forwarder: Address,
    owner: Address,
) -> RelayResult<U256> {
    let instance = Forwarder::new(forwarder, client.provider());
    let call = instance.nonces(owner);
    let fut = call.call();
    match timeout(client.request_timeout(), fut).await {
        Ok(Ok(nonce)) => Ok(nonce),
        Ok(Err(e)) => Err(ChainError::Rpc(format!("nonce read failed: {}", e)).into()),
        Err(_) => Err(ChainError::Timeout(client.request_timeout().as_secs()).into()),
    }
}

/// Read a smart account's own nonce counter.
pub async fn account_nonce(client: &ChainClient, account: Address) -> RelayResult<U256> {
    let instance = SmartAccount::new(account, client.provider());
    let call = instance.nonce();
    let fut = call.call();
    match timeout(client.request_timeout(), fut).await {
        Ok(Ok(nonce)) => Ok(nonce),
        Ok(Err(e)) => Err(ChainError::Rpc(format!("account nonce read failed: {}", e)).into()),
        Err(_) => Err(ChainError::Timeout(client.request_timeout().as_secs()).into()),
    }
}

/// Compare an embedded nonce against a fresh authoritative read.
///
/// Used before resubmitting an already-signed request: if the executor has
/// moved past the embedded nonce, the request can never land and must be
/// rebuilt and re-signed.
pub fn check_fresh(sender: Address, embedded: U256, current: U256) -> RelayResult<()> {
    if embedded != current {
        return Err(RelayError::StaleNonce {
            sender,
            embedded,
            current,
        });
    }
    Ok(())
}
