//! Typed request payloads and builders.

use alloy::primitives::aliases::U48;
use alloy::primitives::{keccak256, Address, Bytes, B256, U256};
use alloy::sol;
use alloy::sol_types::SolValue;
use std::time::{SystemTime, UNIX_EPOCH};

use crate::relay::types::{RelayError, RelayResult};

sol! {
    /// Payload signed by the user for the forwarder path.
    ///
    /// Field order is part of the protocol contract: it must match the
    /// typehash the forwarder was compiled with, or the signature is
    /// silently unverifiable on-chain.
    #[derive(Debug)]
    struct ForwardRequest {
        address from;
        address to;
        uint256 value;
        uint256 gas;
        uint256 nonce;
        uint48 deadline;
        bytes data;
    }

    /// Payload signed by the account owner for the entry-point path.
    ///
    /// `dataHash` commits to the full `(target, value, innerData)` triple,
    /// so the relayer cannot redirect the authorization to a different
    /// target or value.
    #[derive(Debug)]
    struct UserOp {
        address sender;
        uint256 nonce;
        bytes32 dataHash;
    }
}

/// Caller intent for a forwarded call: everything except the nonce and
/// deadline, which are bound fresh per attempt.
#[derive(Debug, Clone)]
pub struct ForwardIntent {
    pub from: Address,
    pub to: Address,
    pub value: U256,
    /// Upper bound on the gas the inner call may consume. Under-
    /// provisioning causes an on-chain failure, not a local error.
    pub gas: u64,
    pub data: Bytes,
}

/// Caller intent for a user operation executed by a smart account.
#[derive(Debug, Clone)]
pub struct UserOpIntent {
    /// The smart account that will execute the call.
    pub account: Address,
    pub target: Address,
    pub value: U256,
    pub data: Bytes,
    /// Gas budget for the account's inner call.
    pub call_gas: u64,
}

/// Current unix time in seconds.
pub(crate) fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs()
}

/// Assemble a forward request with `deadline = now + ttl_secs`.
///
/// The nonce must be the executor's current value for `intent.from`,
/// read immediately beforehand; it is not safe to reuse across attempts.
pub fn build_forward_request(
    intent: &ForwardIntent,
    nonce: U256,
    ttl_secs: u64,
) -> RelayResult<ForwardRequest> {
    if ttl_secs == 0 {
        return Err(RelayError::Configuration(
            "request ttl must be positive".to_string(),
        ));
    }

    Ok(ForwardRequest {
        from: intent.from,
        to: intent.to,
        value: intent.value,
        gas: U256::from(intent.gas),
        nonce,
        deadline: U48::from(unix_now() + ttl_secs),
        data: intent.data.clone(),
    })
}

/// A built user operation: the typed payload to sign plus the call data
/// submitted alongside it.
#[derive(Debug)]
pub struct UserOpParts {
    pub op: UserOp,
    pub call_data: Bytes,
}

/// Assemble a user operation for `intent.account`.
///
/// `call_data` is `abi.encode(target, value, innerData)` and `dataHash`
/// its keccak hash; hashing the encoded triple rather than the inner
/// calldata alone keeps target and value inside the signed authorization.
pub fn build_user_op(intent: &UserOpIntent, nonce: U256) -> UserOpParts {
    let call_data: Bytes = (intent.target, intent.value, intent.data.clone())
        .abi_encode_params()
        .into();
    let data_hash: B256 = keccak256(&call_data);

    UserOpParts {
        op: UserOp {
            sender: intent.account,
            nonce,
            dataHash: data_hash,
        },
        call_data,
    }
}

/// Local deadline precondition.
///
/// The executor is the sole authority on enforcement, but an already
/// expired deadline fails here before any submission cost is spent.
pub fn check_deadline(deadline: U48) -> RelayResult<()> {
    let now = unix_now();
    let deadline = deadline.to::<u64>();
    if deadline <= now {
        return Err(RelayError::ExpiredDeadline { deadline, now });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn intent() -> ForwardIntent {
        ForwardIntent {
            from: Address::repeat_byte(0x01),
            to: Address::repeat_byte(0x02),
            value: U256::ZERO,
            gas: 1_000_000,
            data: Bytes::from_static(b"\x12\x34"),
        }
    }

    fn op_intent() -> UserOpIntent {
        UserOpIntent {
            account: Address::repeat_byte(0x03),
            target: Address::repeat_byte(0x04),
            value: U256::ZERO,
            data: Bytes::from_static(b"\xAB\xCD"),
            call_gas: 1_000_000,
        }
    }

    #[test]
    fn test_forward_request_deadline_in_future() {
        let request = build_forward_request(&intent(), U256::ZERO, 3600).unwrap();
        let deadline = request.deadline.to::<u64>();
        assert!(deadline > unix_now());
        assert!(deadline <= unix_now() + 3600);
        assert_eq!(request.gas, U256::from(1_000_000u64));
    }

    #[test]
    fn test_zero_ttl_rejected() {
        let result = build_forward_request(&intent(), U256::ZERO, 0);
        assert!(matches!(result, Err(RelayError::Configuration(_))));
    }

    #[test]
    fn test_data_hash_is_keccak_of_encoded_triple() {
        let intent = op_intent();
        let parts = build_user_op(&intent, U256::ZERO);
        assert_eq!(parts.op.dataHash, keccak256(&parts.call_data));
        assert_eq!(parts.op.sender, intent.account);
    }

    #[test]
    fn test_data_hash_binds_target_and_value() {
        let base = op_intent();
        let parts = build_user_op(&base, U256::ZERO);

        let mut other_target = base.clone();
        other_target.target = Address::repeat_byte(0x05);
        let other = build_user_op(&other_target, U256::ZERO);
        assert_ne!(parts.op.dataHash, other.op.dataHash);

        let mut other_value = base.clone();
        other_value.value = U256::from(1);
        let other = build_user_op(&other_value, U256::ZERO);
        assert_ne!(parts.op.dataHash, other.op.dataHash);
    }

    #[test]
    fn test_check_deadline() {
        let future = U48::from(unix_now() + 60);
        assert!(check_deadline(future).is_ok());

        let past = U48::from(unix_now() - 1);
        let err = check_deadline(past).unwrap_err();
        assert!(matches!(err, RelayError::ExpiredDeadline { .. }));
    }
}
