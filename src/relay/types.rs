//! Relay error taxonomy, attempt stages, and receipt types.

use alloy::primitives::{Address, Bytes, TxHash, B256, U256};
use serde::Serialize;
use std::fmt;
use thiserror::Error;

use crate::chain::types::ChainError;

/// Errors that can occur while building, signing, verifying, or submitting
/// a relay request.
#[derive(Debug, Error)]
pub enum RelayError {
    /// Missing or invalid domain/address/ttl inputs. Not retryable; the
    /// caller must fix the configuration.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// Key unavailable or invalid.
    #[error("signing error: {0}")]
    Signing(String),

    /// Malformed signature encoding (wrong length, invalid recovery id).
    #[error("signature recovery error: {0}")]
    Recovery(String),

    /// Recovered address does not match the expected sender. The same
    /// signature must never be submitted or retried.
    #[error("verification failed: recovered {recovered}, expected {expected}")]
    VerificationFailed {
        expected: Address,
        recovered: Address,
    },

    /// The nonce embedded in the request no longer matches the executor.
    /// Recover by rebuilding the request with a fresh nonce and re-signing.
    #[error("stale nonce for {sender}: request carries {embedded}, executor expects {current}")]
    StaleNonce {
        sender: Address,
        embedded: U256,
        current: U256,
    },

    /// Deadline already passed; caught locally before submission cost is
    /// spent. Recover by rebuilding with a new deadline and re-signing.
    #[error("deadline {deadline} already passed (now {now})")]
    ExpiredDeadline { deadline: u64, now: u64 },

    /// The executor rejected the submitted request. Carries the decoded
    /// revert reason when available and the raw return data.
    #[error("execution reverted: {reason}")]
    ExecutionReverted { reason: String, raw: Bytes },

    /// Transport-layer failure. The only class eligible for automatic
    /// retry, and only after re-validating the nonce.
    #[error(transparent)]
    Chain(#[from] ChainError),
}

impl RelayError {
    /// Whether the attempt driver may recover from this error on its own.
    ///
    /// Transport errors are retried after nonce re-validation; stale nonces
    /// and expired deadlines are retried by rebuilding and re-signing.
    /// Cryptographic and structural errors abort immediately.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            RelayError::StaleNonce { .. }
                | RelayError::ExpiredDeadline { .. }
                | RelayError::Chain(ChainError::Rpc(_))
                | RelayError::Chain(ChainError::Timeout(_))
        )
    }
}

/// Result type for relay operations.
pub type RelayResult<T> = Result<T, RelayError>;

/// Stages of a single relay attempt.
///
/// No transition skips a stage; in particular `Verified` is mandatory
/// before `Submitted`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Stage {
    Built,
    Signed,
    Verified,
    Submitted,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Stage::Built => "built",
            Stage::Signed => "signed",
            Stage::Verified => "verified",
            Stage::Submitted => "submitted",
        };
        f.write_str(s)
    }
}

/// A relay attempt failure, reporting the stage the attempt reached so the
/// caller can decide whether to rebuild or resubmit.
#[derive(Debug, Error)]
#[error("relay attempt failed at stage {stage}: {source}")]
pub struct AttemptError {
    pub stage: Stage,
    #[source]
    pub source: RelayError,
}

impl AttemptError {
    pub fn new(stage: Stage, source: RelayError) -> Self {
        Self { stage, source }
    }
}

/// Settlement event correlated from receipt logs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum Settlement {
    /// `ExecutedForwardRequest` emitted by the forwarder.
    Forwarded {
        signer: Address,
        nonce: U256,
        success: bool,
    },
    /// `UserOpEvent` emitted by the entry point.
    UserOp {
        sender: Address,
        op_hash: B256,
        success: bool,
    },
}

/// Outcome of a confirmed submission.
#[derive(Debug, Clone, Serialize)]
pub struct RelayReceipt {
    /// Hash of the relayer's transaction.
    pub tx_hash: TxHash,
    /// Block the transaction was mined in.
    pub block_number: Option<u64>,
    /// Gas consumed by the relayer's transaction.
    pub gas_used: u64,
    /// Settlement event matched from the receipt logs, if any. Unmatched
    /// logs are ignored, not errors.
    pub settlement: Option<Settlement>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = RelayError::VerificationFailed {
            expected: Address::ZERO,
            recovered: Address::repeat_byte(0x11),
        };
        assert!(err.to_string().contains("verification failed"));

        let err = RelayError::StaleNonce {
            sender: Address::ZERO,
            embedded: U256::from(1),
            current: U256::from(2),
        };
        assert!(err.to_string().contains("stale nonce"));
        assert!(err.to_string().contains('2'));
    }

    #[test]
    fn test_attempt_error_reports_stage() {
        let err = AttemptError::new(
            Stage::Verified,
            RelayError::Signing("key unavailable".to_string()),
        );
        let msg = err.to_string();
        assert!(msg.contains("verified"));
        assert!(msg.contains("key unavailable"));
    }

    #[test]
    fn test_retryability() {
        assert!(RelayError::StaleNonce {
            sender: Address::ZERO,
            embedded: U256::ZERO,
            current: U256::from(1),
        }
        .is_retryable());
        assert!(RelayError::Chain(ChainError::Timeout(30)).is_retryable());
        assert!(!RelayError::Signing("bad key".to_string()).is_retryable());
        assert!(!RelayError::ExecutionReverted {
            reason: "nonce mismatch".to_string(),
            raw: Bytes::new(),
        }
        .is_retryable());
    }

    #[test]
    fn test_stage_order_is_fixed() {
        let stages = [Stage::Built, Stage::Signed, Stage::Verified, Stage::Submitted];
        let rendered: Vec<String> = stages.iter().map(|s| s.to_string()).collect();
        assert_eq!(rendered, ["built", "signed", "verified", "submitted"]);
    }
}
