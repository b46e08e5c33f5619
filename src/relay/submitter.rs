//! Relay submission and receipt correlation.
//!
//! # Responsibilities
//! - Hold the wallet-backed provider for the fee-paying relayer identity
//! - Send verified requests to the executor's entry function
//! - Await the receipt within an independent timeout
//! - Correlate settlement events back to the originating request
//! - Decode the executor's revert reason when a submission is rejected

use alloy::network::{Ethereum, EthereumWallet};
use alloy::primitives::{Address, Bytes, Signature, U256};
use alloy::providers::{DynProvider, PendingTransactionBuilder, Provider, ProviderBuilder};
use alloy::sol_types::{Eip712Domain, Revert, SolError};
use std::time::Duration;
use tokio::time::timeout;

use crate::chain::bindings::{EntryPoint, Forwarder};
use crate::chain::types::ChainError;
use crate::protocol::request::{check_deadline, ForwardRequest, UserOp};
use crate::protocol::signer::{verify_signer, RelaySigner};
use crate::relay::events::find_settlement;
use crate::relay::types::{RelayError, RelayReceipt, RelayResult};

/// A forward request whose signature has been locally verified.
///
/// The only constructor runs the recovery gate, so an unverified
/// (request, signature) pair cannot reach the submitter.
#[derive(Debug)]
pub struct SignedForwardRequest {
    request: ForwardRequest,
    signature: Signature,
}

impl SignedForwardRequest {
    /// Verify `signature` against `request.from` and bind the pair.
    pub fn new(
        domain: &Eip712Domain,
        request: ForwardRequest,
        signature: Signature,
    ) -> RelayResult<Self> {
        verify_signer(domain, &request, &signature, request.from)?;
        Ok(Self { request, signature })
    }

    pub fn request(&self) -> &ForwardRequest {
        &self.request
    }

    /// Wire form accepted by `Forwarder.execute`: the nonce is omitted
    /// (the forwarder reads its own mapping) and the signature appended.
    fn to_wire(&self) -> Forwarder::ForwardRequestData {
        Forwarder::ForwardRequestData {
            from: self.request.from,
            to: self.request.to,
            value: self.request.value,
            gas: self.request.gas,
            deadline: self.request.deadline,
            data: self.request.data.clone(),
            signature: self.signature.as_bytes().into(),
        }
    }
}

/// A user operation whose signature has been locally verified against the
/// account owner.
#[derive(Debug)]
pub struct SignedUserOp {
    op: UserOp,
    call_data: Bytes,
    call_gas: u64,
    signature: Signature,
}

impl SignedUserOp {
    /// Verify `signature` against the account `owner` and bind the parts.
    pub fn new(
        domain: &Eip712Domain,
        op: UserOp,
        call_data: Bytes,
        call_gas: u64,
        signature: Signature,
        owner: Address,
    ) -> RelayResult<Self> {
        verify_signer(domain, &op, &signature, owner)?;
        Ok(Self {
            op,
            call_data,
            call_gas,
            signature,
        })
    }

    pub fn op(&self) -> &UserOp {
        &self.op
    }

    fn to_wire(&self) -> EntryPoint::UserOperation {
        EntryPoint::UserOperation {
            sender: self.op.sender,
            nonce: self.op.nonce,
            callData: self.call_data.clone(),
            callGas: U256::from(self.call_gas),
            signature: self.signature.as_bytes().into(),
        }
    }
}

/// Sends verified requests through the relayer's wallet and correlates
/// receipts.
#[derive(Clone)]
pub struct Submitter {
    provider: DynProvider,
    relayer: Address,
    receipt_timeout: Duration,
    confirmations: u64,
}

impl Submitter {
    /// Build the wallet-backed provider for the fee-paying relayer.
    pub fn connect(
        rpc_url: &str,
        relayer: &RelaySigner,
        receipt_timeout: Duration,
        confirmations: u64,
    ) -> RelayResult<Self> {
        let url: url::Url = rpc_url.parse().map_err(|e| {
            RelayError::Configuration(format!("invalid RPC URL '{}': {}", rpc_url, e))
        })?;
        let address = relayer.address();
        let wallet = EthereumWallet::from(relayer.inner());
        let provider = ProviderBuilder::new()
            .wallet(wallet)
            .connect_http(url)
            .erased();

        Ok(Self {
            provider,
            relayer: address,
            receipt_timeout,
            confirmations,
        })
    }

    /// Address of the fee-paying relayer identity.
    pub fn relayer(&self) -> Address {
        self.relayer
    }

    /// Execute a verified forward request through the forwarder.
    ///
    /// The expired-deadline precondition is re-checked here so a request
    /// held across a timeout window never spends submission cost.
    pub async fn submit_forward(
        &self,
        forwarder: Address,
        signed: &SignedForwardRequest,
        gas_limit: u64,
    ) -> RelayResult<RelayReceipt> {
        check_deadline(signed.request.deadline)?;

        let instance = Forwarder::new(forwarder, self.provider.clone());
        let wire = signed.to_wire();
        tracing::info!(
            forwarder = %forwarder,
            from = %wire.from,
            to = %wire.to,
            nonce = %signed.request.nonce,
            "Submitting forward request"
        );

        let pending = instance
            .execute(wire)
            .value(signed.request.value)
            .gas(gas_limit)
            .send()
            .await
            .map_err(decode_contract_error)?;

        self.await_receipt(pending).await
    }

    /// Execute verified user operations through the entry point, crediting
    /// gas to `beneficiary`.
    pub async fn submit_user_ops(
        &self,
        entry_point: Address,
        ops: &[SignedUserOp],
        beneficiary: Address,
        gas_limit: u64,
    ) -> RelayResult<RelayReceipt> {
        let instance = EntryPoint::new(entry_point, self.provider.clone());
        let wire: Vec<_> = ops.iter().map(SignedUserOp::to_wire).collect();
        tracing::info!(
            entry_point = %entry_point,
            ops = wire.len(),
            beneficiary = %beneficiary,
            "Submitting user operations"
        );

        let pending = instance
            .handleOps(wire, beneficiary)
            .gas(gas_limit)
            .send()
            .await
            .map_err(decode_contract_error)?;

        self.await_receipt(pending).await
    }

    async fn await_receipt(
        &self,
        pending: PendingTransactionBuilder<Ethereum>,
    ) -> RelayResult<RelayReceipt> {
        let tx_hash = *pending.tx_hash();
        let wait = pending
            .with_required_confirmations(self.confirmations)
            .get_receipt();

        match timeout(self.receipt_timeout, wait).await {
            Ok(Ok(receipt)) => {
                if !receipt.status() {
                    return Err(RelayError::ExecutionReverted {
                        reason: "transaction reverted on-chain".to_string(),
                        raw: Bytes::new(),
                    });
                }
                let settlement = find_settlement(receipt.inner.logs());
                tracing::info!(
                    tx_hash = %tx_hash,
                    block_number = ?receipt.block_number,
                    gas_used = receipt.gas_used,
                    "Request confirmed"
                );
                Ok(RelayReceipt {
                    tx_hash,
                    block_number: receipt.block_number,
                    gas_used: receipt.gas_used,
                    settlement,
                })
            }
            Ok(Err(e)) => Err(ChainError::Rpc(format!("receipt fetch failed: {}", e)).into()),
            Err(_) => Err(ChainError::Timeout(self.receipt_timeout.as_secs()).into()),
        }
    }
}

/// Map a contract send error, decoding the executor's `Error(string)`
/// revert reason when present.
fn decode_contract_error(err: alloy::contract::Error) -> RelayError {
    if let Some(raw) = err.as_revert_data() {
        let reason = Revert::abi_decode(&raw)
            .map(|r| r.reason)
            .unwrap_or_else(|_| "execution reverted".to_string());
        return RelayError::ExecutionReverted { reason, raw };
    }
    ChainError::Rpc(err.to_string()).into()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::domain::build_domain;
    use crate::protocol::request::{build_forward_request, build_user_op, ForwardIntent, UserOpIntent};

    const USER_KEY: &str = "ac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";
    const OTHER_KEY: &str = "59c6995e998f97a5a0044966f0945389dc9e86dae88c7a8412f4603b6b78690d";

    fn domain() -> Eip712Domain {
        build_domain("MyForwarder", "1", 80002, Address::repeat_byte(0xAA)).unwrap()
    }

    fn signed_request(signer: &RelaySigner) -> SignedForwardRequest {
        let intent = ForwardIntent {
            from: signer.address(),
            to: Address::repeat_byte(0x02),
            value: U256::ZERO,
            gas: 1_000_000,
            data: Bytes::from_static(b"\x01"),
        };
        let domain = domain();
        let request = build_forward_request(&intent, U256::ZERO, 3600).unwrap();
        let signature = signer.sign_typed(&domain, &request).unwrap();
        SignedForwardRequest::new(&domain, request, signature).unwrap()
    }

    #[test]
    fn test_signed_request_requires_matching_signer() {
        let user = RelaySigner::from_private_key(USER_KEY).unwrap();
        let other = RelaySigner::from_private_key(OTHER_KEY).unwrap();

        let intent = ForwardIntent {
            from: user.address(),
            to: Address::repeat_byte(0x02),
            value: U256::ZERO,
            gas: 1_000_000,
            data: Bytes::new(),
        };
        let domain = domain();
        let request = build_forward_request(&intent, U256::ZERO, 3600).unwrap();

        // Signed by the wrong key: the constructor must refuse the pair.
        let signature = other.sign_typed(&domain, &request).unwrap();
        let err = SignedForwardRequest::new(&domain, request, signature).unwrap_err();
        assert!(matches!(err, RelayError::VerificationFailed { .. }));
    }

    #[test]
    fn test_wire_form_drops_nonce_and_carries_signature() {
        let user = RelaySigner::from_private_key(USER_KEY).unwrap();
        let signed = signed_request(&user);
        let wire = signed.to_wire();

        assert_eq!(wire.from, user.address());
        assert_eq!(wire.deadline, signed.request().deadline);
        assert_eq!(wire.signature.len(), 65);
    }

    #[test]
    fn test_signed_user_op_gate_and_wire_form() {
        let owner = RelaySigner::from_private_key(USER_KEY).unwrap();
        let domain = build_domain("EntryPoint", "1", 80002, Address::repeat_byte(0xEE)).unwrap();

        let intent = UserOpIntent {
            account: Address::repeat_byte(0x03),
            target: Address::repeat_byte(0x04),
            value: U256::ZERO,
            data: Bytes::from_static(b"\xAB"),
            call_gas: 1_000_000,
        };
        let parts = build_user_op(&intent, U256::from(2));
        let signature = owner.sign_typed(&domain, &parts.op).unwrap();

        let signed = SignedUserOp::new(
            &domain,
            parts.op,
            parts.call_data.clone(),
            intent.call_gas,
            signature,
            owner.address(),
        )
        .unwrap();

        let wire = signed.to_wire();
        assert_eq!(wire.sender, intent.account);
        assert_eq!(wire.nonce, U256::from(2));
        assert_eq!(wire.callData, parts.call_data);
        assert_eq!(wire.callGas, U256::from(1_000_000u64));
        assert_eq!(wire.signature.len(), 65);
    }

    #[test]
    fn test_connect_rejects_invalid_url() {
        let relayer = RelaySigner::from_private_key(OTHER_KEY).unwrap();
        let result = Submitter::connect("not a url", &relayer, Duration::from_secs(1), 1);
        assert!(matches!(result, Err(RelayError::Configuration(_))));
    }
}
