//! Shared fixtures for integration tests.

use alloy::primitives::{Address, Bytes, U256};
use alloy::sol_types::Eip712Domain;

use metatx_relay::protocol::domain::build_domain;
use metatx_relay::protocol::request::ForwardIntent;
use metatx_relay::protocol::signer::RelaySigner;

// Well-known Anvil dev keys; never used outside tests.
pub const USER_KEY: &str = "ac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";
pub const RELAYER_KEY: &str = "59c6995e998f97a5a0044966f0945389dc9e86dae88c7a8412f4603b6b78690d";

pub const CHAIN_ID: u64 = 80002;

pub fn forwarder_address() -> Address {
    Address::repeat_byte(0xAA)
}

pub fn entry_point_address() -> Address {
    Address::repeat_byte(0xEE)
}

pub fn user() -> RelaySigner {
    RelaySigner::from_private_key(USER_KEY).unwrap()
}

#[allow(dead_code)]
pub fn relayer() -> RelaySigner {
    RelaySigner::from_private_key(RELAYER_KEY).unwrap()
}

pub fn forwarder_domain() -> Eip712Domain {
    build_domain("MyForwarder", "1", CHAIN_ID, forwarder_address()).unwrap()
}

pub fn entry_point_domain() -> Eip712Domain {
    build_domain("EntryPoint", "1", CHAIN_ID, entry_point_address()).unwrap()
}

/// A `setMessage("hi")`-shaped intent from the test user to a fixed target.
pub fn forward_intent(from: Address) -> ForwardIntent {
    ForwardIntent {
        from,
        to: Address::repeat_byte(0x42),
        value: U256::ZERO,
        gas: 1_000_000,
        data: Bytes::from_static(b"\x36\x8b\x87\x72hi"),
    }
}
