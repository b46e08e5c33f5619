//! Canonical structured-hash computation.
//!
//! Implements the standard two-stage typed-data scheme: the domain
//! separator and the field-ordered struct hash are computed independently
//! and combined as `keccak256(0x19 0x01 || domainSeparator || structHash)`.
//! The result is what the user signs and what the executor recomputes
//! on-chain; both sides must agree bit-exactly.

use alloy::primitives::B256;
use alloy::sol_types::{Eip712Domain, SolStruct};

/// Hash of the domain-separation structure alone.
pub fn domain_separator(domain: &Eip712Domain) -> B256 {
    domain.hash_struct()
}

/// Schema-bound hash of the typed payload alone.
///
/// The field order baked into the payload's type schema is part of the
/// protocol contract; reordering fields, even with identical names and
/// types, produces a different hash.
pub fn struct_hash<T: SolStruct>(payload: &T) -> B256 {
    payload.eip712_hash_struct()
}

/// The canonical digest to sign for `payload` under `domain`.
///
/// Pure and deterministic: identical inputs yield identical output,
/// independent of process, machine, or time.
pub fn signing_hash<T: SolStruct>(domain: &Eip712Domain, payload: &T) -> B256 {
    payload.eip712_signing_hash(domain)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::domain::build_domain;
    use crate::protocol::request::{ForwardRequest, UserOp};
    use alloy::primitives::aliases::U48;
    use alloy::primitives::{keccak256, Address, Bytes, B256, U256};

    fn domain() -> Eip712Domain {
        build_domain("MyForwarder", "1", 80002, Address::repeat_byte(0xAA)).unwrap()
    }

    fn request() -> ForwardRequest {
        ForwardRequest {
            from: Address::repeat_byte(0x01),
            to: Address::repeat_byte(0x02),
            value: U256::ZERO,
            gas: U256::from(1_000_000u64),
            nonce: U256::ZERO,
            deadline: U48::from(1_900_000_000u64),
            data: Bytes::from_static(b"\xde\xad\xbe\xef"),
        }
    }

    #[test]
    fn test_signing_hash_is_deterministic() {
        let domain = domain();
        let request = request();
        assert_eq!(signing_hash(&domain, &request), signing_hash(&domain, &request));
    }

    #[test]
    fn test_signing_hash_matches_manual_assembly() {
        let domain = domain();
        let request = request();

        let mut preimage = Vec::with_capacity(66);
        preimage.extend_from_slice(&[0x19, 0x01]);
        preimage.extend_from_slice(domain_separator(&domain).as_slice());
        preimage.extend_from_slice(struct_hash(&request).as_slice());

        assert_eq!(signing_hash(&domain, &request), keccak256(&preimage));
    }

    #[test]
    fn test_type_schemas_are_pinned() {
        // These strings hash into the typehashes the executor contracts
        // were compiled with; any drift breaks every signature.
        assert_eq!(
            ForwardRequest::eip712_root_type(),
            "ForwardRequest(address from,address to,uint256 value,uint256 gas,uint256 nonce,uint48 deadline,bytes data)"
        );
        assert_eq!(
            UserOp::eip712_root_type(),
            "UserOp(address sender,uint256 nonce,bytes32 dataHash)"
        );
    }

    #[test]
    fn test_hash_binds_request_fields() {
        let domain = domain();
        let base = signing_hash(&domain, &request());

        let mut bumped_nonce = request();
        bumped_nonce.nonce = U256::from(1);
        assert_ne!(base, signing_hash(&domain, &bumped_nonce));

        let mut other_recipient = request();
        other_recipient.to = Address::repeat_byte(0x03);
        assert_ne!(base, signing_hash(&domain, &other_recipient));
    }

    #[test]
    fn test_hash_binds_domain() {
        let request = request();
        let other_chain = build_domain("MyForwarder", "1", 1, Address::repeat_byte(0xAA)).unwrap();
        assert_ne!(
            signing_hash(&domain(), &request),
            signing_hash(&other_chain, &request)
        );
    }

    #[test]
    fn test_user_op_hash_binds_data_hash() {
        let domain = build_domain("EntryPoint", "1", 80002, Address::repeat_byte(0xEE)).unwrap();
        let op = UserOp {
            sender: Address::repeat_byte(0x01),
            nonce: U256::ZERO,
            dataHash: B256::repeat_byte(0x01),
        };
        let other = UserOp {
            sender: Address::repeat_byte(0x01),
            nonce: U256::ZERO,
            dataHash: B256::repeat_byte(0x02),
        };
        assert_ne!(signing_hash(&domain, &op), signing_hash(&domain, &other));
    }
}
