//! Executor contract bindings.
//!
//! The forwarder and entry point are external collaborators. These bindings
//! mirror their ABI surface (nonce reads, execute entry functions, settlement
//! events); the on-chain verifier recomputes the structured hash itself and
//! is the authoritative enforcement point for signatures, nonces, and
//! deadlines.

use alloy::sol;

sol! {
    /// ERC-2771-style forwarder executing signed forward requests on behalf
    /// of their signer.
    #[derive(Debug)]
    #[sol(rpc)]
    contract Forwarder {
        /// Wire form of a forward request: the signed fields minus the
        /// nonce (read internally from `nonces`), plus the signature.
        struct ForwardRequestData {
            address from;
            address to;
            uint256 value;
            uint256 gas;
            uint48 deadline;
            bytes data;
            bytes signature;
        }

        function nonces(address owner) external view returns (uint256);
        function execute(ForwardRequestData calldata request) external payable;

        event ExecutedForwardRequest(address indexed signer, uint256 nonce, bool success);
    }

    /// Minimal account-abstraction entry point executing batched user
    /// operations and crediting gas to a beneficiary.
    #[derive(Debug)]
    #[sol(rpc)]
    contract EntryPoint {
        struct UserOperation {
            address sender;
            uint256 nonce;
            bytes callData;
            uint256 callGas;
            bytes signature;
        }

        function handleOps(UserOperation[] calldata ops, address payable beneficiary) external;

        event UserOpEvent(address indexed sender, bytes32 reqHash, bool success);
    }

    /// Owner-controlled smart account executed through the entry point.
    #[derive(Debug)]
    #[sol(rpc)]
    contract SmartAccount {
        function nonce() external view returns (uint256);
        function owner() external view returns (address);
    }
}
