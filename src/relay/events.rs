//! Typed settlement-event registry.
//!
//! Receipt logs are matched by topic signature against the known event
//! schemas and decoded into a tagged [`Settlement`]. Logs from other
//! contracts or schemas are ignored, not errors.

use alloy::rpc::types::Log;
use alloy::sol_types::SolEvent;

use crate::chain::bindings::{EntryPoint, Forwarder};
use crate::relay::types::Settlement;

/// Match one receipt log against the settlement schemas.
pub fn match_settlement(log: &Log) -> Option<Settlement> {
    let topic0 = *log.topics().first()?;

    if topic0 == Forwarder::ExecutedForwardRequest::SIGNATURE_HASH {
        let decoded = log.log_decode::<Forwarder::ExecutedForwardRequest>().ok()?;
        let event = decoded.inner;
        return Some(Settlement::Forwarded {
            signer: event.signer,
            nonce: event.nonce,
            success: event.success,
        });
    }

    if topic0 == EntryPoint::UserOpEvent::SIGNATURE_HASH {
        let decoded = log.log_decode::<EntryPoint::UserOpEvent>().ok()?;
        let event = decoded.inner;
        return Some(Settlement::UserOp {
            sender: event.sender,
            op_hash: event.reqHash,
            success: event.success,
        });
    }

    None
}

/// First settlement event among a receipt's logs, if any.
pub fn find_settlement<'a>(logs: impl IntoIterator<Item = &'a Log>) -> Option<Settlement> {
    logs.into_iter().find_map(match_settlement)
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy::primitives::{Address, B256, U256};

    fn wrap(address: Address, data: alloy::primitives::LogData) -> Log {
        Log {
            inner: alloy::primitives::Log { address, data },
            ..Default::default()
        }
    }

    #[test]
    fn test_matches_forward_settlement() {
        let event = Forwarder::ExecutedForwardRequest {
            signer: Address::repeat_byte(0x01),
            nonce: U256::from(7),
            success: true,
        };
        let log = wrap(Address::repeat_byte(0xAA), event.encode_log_data());

        let settlement = match_settlement(&log).unwrap();
        assert_eq!(
            settlement,
            Settlement::Forwarded {
                signer: Address::repeat_byte(0x01),
                nonce: U256::from(7),
                success: true,
            }
        );
    }

    #[test]
    fn test_matches_user_op_settlement() {
        let event = EntryPoint::UserOpEvent {
            sender: Address::repeat_byte(0x02),
            reqHash: B256::repeat_byte(0x33),
            success: false,
        };
        let log = wrap(Address::repeat_byte(0xEE), event.encode_log_data());

        let settlement = match_settlement(&log).unwrap();
        assert_eq!(
            settlement,
            Settlement::UserOp {
                sender: Address::repeat_byte(0x02),
                op_hash: B256::repeat_byte(0x33),
                success: false,
            }
        );
    }

    #[test]
    fn test_ignores_unrelated_logs() {
        // A foreign event schema must be skipped, not treated as an error.
        let data = alloy::primitives::LogData::new_unchecked(
            vec![B256::repeat_byte(0x99)],
            alloy::primitives::Bytes::new(),
        );
        let log = wrap(Address::repeat_byte(0x10), data);
        assert!(match_settlement(&log).is_none());

        let empty = wrap(Address::repeat_byte(0x10), alloy::primitives::LogData::default());
        assert!(match_settlement(&empty).is_none());
    }

    #[test]
    fn test_find_settlement_skips_to_first_match() {
        let noise = wrap(
            Address::repeat_byte(0x10),
            alloy::primitives::LogData::new_unchecked(
                vec![B256::repeat_byte(0x99)],
                alloy::primitives::Bytes::new(),
            ),
        );
        let event = Forwarder::ExecutedForwardRequest {
            signer: Address::repeat_byte(0x01),
            nonce: U256::ZERO,
            success: true,
        };
        let settled = wrap(Address::repeat_byte(0xAA), event.encode_log_data());

        let logs = vec![noise, settled];
        let settlement = find_settlement(logs.iter()).unwrap();
        assert!(matches!(settlement, Settlement::Forwarded { .. }));
    }
}
