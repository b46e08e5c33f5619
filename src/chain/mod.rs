//! Chain boundary: RPC access and executor contract bindings.
//!
//! # Data Flow
//! ```text
//! Configuration (RPC URLs, chain id)
//!     → client.rs (provider pool with timeouts and failover)
//!     → bindings.rs (forwarder / entry-point ABI surface)
//! ```
//!
//! # Security Constraints
//! - The connected chain id is verified against configuration at startup
//! - All RPC calls have configurable timeouts
//! - Private keys never enter this module (see `protocol::signer`)

pub mod bindings;
pub mod client;
pub mod types;

pub use client::ChainClient;
pub use types::{ChainConfig, ChainError, ChainId};
