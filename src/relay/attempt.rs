//! Relay-attempt state machine.
//!
//! One attempt walks `Built → Signed → Verified → Submitted` and ends
//! `Confirmed`, `Reverted`, or `TimedOut`. No transition skips a stage;
//! `Verified` is enforced structurally because the submitter only accepts
//! the signed-request types whose constructors run the recovery gate.
//!
//! Re-entry points after a failed submission:
//! - receipt timeout with the nonce confirmed unconsumed → resubmit the
//!   same signed request;
//! - stale nonce, expired deadline, or transport error → back to `Built`
//!   with a fresh nonce read, fresh deadline, and a new signature.
//!
//! Each attempt owns its request and signature; nothing is shared across
//! attempts. Only one in-flight attempt per sender is safe (see
//! [`crate::relay::nonce`]).

use alloy::primitives::{Address, U256};
use alloy::sol_types::Eip712Domain;
use rand::Rng;
use std::time::Duration;
use uuid::Uuid;

use crate::chain::client::ChainClient;
use crate::chain::types::ChainError;
use crate::config::schema::AttemptConfig;
use crate::protocol::request::{
    build_forward_request, build_user_op, ForwardIntent, UserOpIntent,
};
use crate::protocol::signer::RelaySigner;
use crate::relay::nonce::{account_nonce, check_fresh, forwarder_nonce};
use crate::relay::submitter::{SignedForwardRequest, SignedUserOp, Submitter};
use crate::relay::types::{AttemptError, RelayError, RelayReceipt, Stage};

/// Attempt pacing and bounds.
#[derive(Debug, Clone)]
pub struct AttemptPolicy {
    /// Request lifetime; `deadline = now + ttl_secs` at build time.
    pub ttl_secs: u64,
    /// Total submissions (including resubmissions) before giving up.
    pub max_attempts: u32,
    /// Gas limit for the relayer's outer transaction on the entry-point
    /// path (the forwarder path uses the request's own gas budget).
    pub submit_gas_limit: u64,
    /// Base delay for backoff between attempts, in milliseconds.
    pub base_delay_ms: u64,
    /// Cap on the backoff delay, in milliseconds.
    pub max_delay_ms: u64,
}

impl From<&AttemptConfig> for AttemptPolicy {
    fn from(config: &AttemptConfig) -> Self {
        Self {
            ttl_secs: config.ttl_secs,
            max_attempts: config.max_attempts,
            submit_gas_limit: config.submit_gas_limit,
            base_delay_ms: config.base_delay_ms,
            max_delay_ms: config.max_delay_ms,
        }
    }
}

/// How the driver re-enters the loop after a recoverable failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Recovery {
    /// Nonce confirmed unconsumed: the same signed request is still valid.
    Resubmit,
    /// Return to `Built`: fresh nonce, fresh deadline, new signature.
    Rebuild,
}

/// Drives relay attempts end to end.
pub struct Relay {
    client: ChainClient,
    submitter: Submitter,
    policy: AttemptPolicy,
}

impl Relay {
    pub fn new(client: ChainClient, submitter: Submitter, policy: AttemptPolicy) -> Self {
        Self {
            client,
            submitter,
            policy,
        }
    }

    /// Relay a forward request through the forwarder on behalf of
    /// `signer`, driving the attempt state machine to a terminal state.
    pub async fn relay_forward(
        &self,
        signer: &RelaySigner,
        domain: &Eip712Domain,
        forwarder: Address,
        intent: &ForwardIntent,
    ) -> Result<RelayReceipt, AttemptError> {
        let attempt_id = Uuid::new_v4();
        let mut signed = self
            .prepare_forward(signer, domain, forwarder, intent)
            .await?;
        let mut last: Option<AttemptError> = None;

        for attempt in 1..=self.policy.max_attempts {
            if attempt > 1 {
                tokio::time::sleep(backoff_delay(attempt - 1, &self.policy)).await;
            }
            tracing::info!(
                id = %attempt_id,
                attempt,
                sender = %intent.from,
                nonce = %signed.request().nonce,
                "Relaying forward request"
            );

            match self
                .submitter
                .submit_forward(forwarder, &signed, intent.gas)
                .await
            {
                Ok(receipt) => return Ok(receipt),
                Err(err) => {
                    let embedded = signed.request().nonce;
                    match self
                        .classify(err, intent.from, embedded, || {
                            forwarder_nonce(&self.client, forwarder, intent.from)
                        })
                        .await?
                    {
                        (Recovery::Resubmit, err) => last = Some(err),
                        (Recovery::Rebuild, err) => {
                            tracing::warn!(
                                id = %attempt_id,
                                attempt,
                                nonce = %embedded,
                                error = %err.source,
                                "Rebuilding forward request"
                            );
                            last = Some(err);
                            signed = self
                                .prepare_forward(signer, domain, forwarder, intent)
                                .await?;
                        }
                    }
                }
            }
        }

        Err(last.unwrap_or_else(|| {
            AttemptError::new(
                Stage::Built,
                RelayError::Configuration("max_attempts must be at least 1".to_string()),
            )
        }))
    }

    /// Relay a user operation through the entry point on behalf of the
    /// account's `owner`, with the relayer as gas beneficiary.
    pub async fn relay_user_op(
        &self,
        owner: &RelaySigner,
        domain: &Eip712Domain,
        entry_point: Address,
        intent: &UserOpIntent,
    ) -> Result<RelayReceipt, AttemptError> {
        let attempt_id = Uuid::new_v4();
        let beneficiary = self.submitter.relayer();
        let mut signed = self.prepare_user_op(owner, domain, intent).await?;
        let mut last: Option<AttemptError> = None;

        for attempt in 1..=self.policy.max_attempts {
            if attempt > 1 {
                tokio::time::sleep(backoff_delay(attempt - 1, &self.policy)).await;
            }
            tracing::info!(
                id = %attempt_id,
                attempt,
                account = %intent.account,
                nonce = %signed.op().nonce,
                "Relaying user operation"
            );

            let ops = std::slice::from_ref(&signed);
            match self
                .submitter
                .submit_user_ops(entry_point, ops, beneficiary, self.policy.submit_gas_limit)
                .await
            {
                Ok(receipt) => return Ok(receipt),
                Err(err) => {
                    let embedded = signed.op().nonce;
                    match self
                        .classify(err, intent.account, embedded, || {
                            account_nonce(&self.client, intent.account)
                        })
                        .await?
                    {
                        (Recovery::Resubmit, err) => last = Some(err),
                        (Recovery::Rebuild, err) => {
                            tracing::warn!(
                                id = %attempt_id,
                                attempt,
                                nonce = %embedded,
                                error = %err.source,
                                "Rebuilding user operation"
                            );
                            last = Some(err);
                            signed = self.prepare_user_op(owner, domain, intent).await?;
                        }
                    }
                }
            }
        }

        Err(last.unwrap_or_else(|| {
            AttemptError::new(
                Stage::Built,
                RelayError::Configuration("max_attempts must be at least 1".to_string()),
            )
        }))
    }

    /// `Built → Signed → Verified` for the forwarder path.
    ///
    /// The authoritative nonce read is the last step before signing.
    async fn prepare_forward(
        &self,
        signer: &RelaySigner,
        domain: &Eip712Domain,
        forwarder: Address,
        intent: &ForwardIntent,
    ) -> Result<SignedForwardRequest, AttemptError> {
        let nonce = forwarder_nonce(&self.client, forwarder, intent.from)
            .await
            .map_err(|e| AttemptError::new(Stage::Built, e))?;
        let request = build_forward_request(intent, nonce, self.policy.ttl_secs)
            .map_err(|e| AttemptError::new(Stage::Built, e))?;

        let signature = signer
            .sign_typed(domain, &request)
            .map_err(|e| AttemptError::new(Stage::Signed, e))?;

        SignedForwardRequest::new(domain, request, signature)
            .map_err(|e| AttemptError::new(Stage::Verified, e))
    }

    /// `Built → Signed → Verified` for the entry-point path.
    async fn prepare_user_op(
        &self,
        owner: &RelaySigner,
        domain: &Eip712Domain,
        intent: &UserOpIntent,
    ) -> Result<SignedUserOp, AttemptError> {
        let nonce = account_nonce(&self.client, intent.account)
            .await
            .map_err(|e| AttemptError::new(Stage::Built, e))?;
        let parts = build_user_op(intent, nonce);

        let signature = owner
            .sign_typed(domain, &parts.op)
            .map_err(|e| AttemptError::new(Stage::Signed, e))?;

        SignedUserOp::new(
            domain,
            parts.op,
            parts.call_data,
            intent.call_gas,
            signature,
            owner.address(),
        )
        .map_err(|e| AttemptError::new(Stage::Verified, e))
    }

    /// Decide how to re-enter the loop after a failed submission.
    ///
    /// A receipt timeout is resolved by re-reading the nonce: resubmission
    /// of the same signed request is only safe while the embedded nonce is
    /// confirmed unconsumed. Everything non-retryable aborts here.
    async fn classify<F, Fut>(
        &self,
        err: RelayError,
        sender: Address,
        embedded: U256,
        read_nonce: F,
    ) -> Result<(Recovery, AttemptError), AttemptError>
    where
        F: FnOnce() -> Fut,
        Fut: std::future::Future<Output = Result<U256, RelayError>>,
    {
        match err {
            RelayError::Chain(ChainError::Timeout(secs)) => {
                let current = read_nonce()
                    .await
                    .map_err(|e| AttemptError::new(Stage::Submitted, e))?;
                if let Err(stale) = check_fresh(sender, embedded, current) {
                    // Consumed while we waited: the signed request can
                    // never land. Rebuild instead of resubmitting.
                    return Ok((
                        Recovery::Rebuild,
                        AttemptError::new(Stage::Submitted, stale),
                    ));
                }
                tracing::warn!(
                    sender = %sender,
                    timeout_secs = secs,
                    "Receipt timed out, nonce unconsumed, resubmitting"
                );
                Ok((
                    Recovery::Resubmit,
                    AttemptError::new(Stage::Submitted, RelayError::Chain(ChainError::Timeout(secs))),
                ))
            }
            err if err.is_retryable() => Ok((
                Recovery::Rebuild,
                AttemptError::new(Stage::Submitted, err),
            )),
            fatal => Err(AttemptError::new(Stage::Submitted, fatal)),
        }
    }
}

/// Jittered exponential delay before re-entering the attempt loop.
fn backoff_delay(completed: u32, policy: &AttemptPolicy) -> Duration {
    let exponential = 2u64.saturating_pow(completed.saturating_sub(1));
    let delay_ms = policy
        .base_delay_ms
        .saturating_mul(exponential)
        .min(policy.max_delay_ms);

    // Apply jitter (0 to 10% of the delay)
    let jitter_range = delay_ms / 10;
    let jitter = if jitter_range > 0 {
        rand::thread_rng().gen_range(0..jitter_range)
    } else {
        0
    };

    Duration::from_millis(delay_ms + jitter)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn policy() -> AttemptPolicy {
        AttemptPolicy {
            ttl_secs: 3600,
            max_attempts: 3,
            submit_gas_limit: 3_000_000,
            base_delay_ms: 100,
            max_delay_ms: 2000,
        }
    }

    #[test]
    fn test_backoff_grows_and_caps() {
        let policy = policy();
        let b1 = backoff_delay(1, &policy);
        assert!(b1.as_millis() >= 100);

        let b2 = backoff_delay(2, &policy);
        assert!(b2.as_millis() >= 200);

        let capped = backoff_delay(10, &policy);
        assert!(capped.as_millis() >= 2000);
        assert!(capped.as_millis() < 2300);
    }

    #[test]
    fn test_policy_from_config() {
        let config = AttemptConfig::default();
        let policy = AttemptPolicy::from(&config);
        assert_eq!(policy.ttl_secs, config.ttl_secs);
        assert_eq!(policy.max_attempts, config.max_attempts);
        assert_eq!(policy.submit_gas_limit, config.submit_gas_limit);
    }
}
