//! Signed meta-transaction relay core.
//!
//! Builds, signs, verifies, and submits authorization-delegated requests
//! (ERC-2771-style forward requests and account-abstraction user operations)
//! on behalf of a user, executed on-chain by a separate fee-paying relayer.

pub mod chain;
pub mod config;
pub mod observability;
pub mod protocol;
pub mod relay;

pub use config::schema::RelayConfig;
pub use protocol::signer::RelaySigner;
pub use relay::attempt::Relay;
pub use relay::types::{RelayError, RelayReceipt};
