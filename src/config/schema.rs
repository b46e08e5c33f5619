//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the relay.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

/// Root configuration for the relay.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct RelayConfig {
    /// Chain and RPC access settings.
    pub chain: ChainConfig,

    /// Forwarder deployment (meta-transaction path).
    pub forwarder: ForwarderConfig,

    /// Entry point + smart account deployment (user-operation path).
    pub entry_point: EntryPointConfig,

    /// Attempt pacing and bounds.
    pub attempt: AttemptConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Chain and RPC access configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ChainConfig {
    /// JSON-RPC endpoint URL.
    pub rpc_url: String,

    /// Failover JSON-RPC endpoint URLs.
    #[serde(default)]
    pub failover_urls: Vec<String>,

    /// Chain ID (e.g., 80002 for Polygon Amoy, 31337 for local Anvil).
    pub chain_id: u64,

    /// RPC request timeout in seconds.
    pub rpc_timeout_secs: u64,

    /// Number of block confirmations required for finality.
    pub confirmation_blocks: u32,
}

impl Default for ChainConfig {
    fn default() -> Self {
        Self {
            rpc_url: "http://localhost:8545".to_string(),
            failover_urls: Vec::new(),
            chain_id: 31337,
            rpc_timeout_secs: 10,
            confirmation_blocks: 1,
        }
    }
}

/// Forwarder deployment configuration.
///
/// The domain name and version must match the values the forwarder was
/// constructed with; they scope every signature to this deployment.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ForwarderConfig {
    /// Deployed forwarder contract address.
    pub address: String,

    /// EIP-712 domain name.
    pub domain_name: String,

    /// EIP-712 domain version.
    pub domain_version: String,
}

impl Default for ForwarderConfig {
    fn default() -> Self {
        Self {
            address: String::new(),
            domain_name: "MyForwarder".to_string(),
            domain_version: "1".to_string(),
        }
    }
}

/// Entry point and smart account deployment configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct EntryPointConfig {
    /// Deployed entry point contract address.
    pub address: String,

    /// Smart account executed through the entry point.
    pub account: String,

    /// EIP-712 domain name (must match the entry point's constructor).
    pub domain_name: String,

    /// EIP-712 domain version.
    pub domain_version: String,
}

impl Default for EntryPointConfig {
    fn default() -> Self {
        Self {
            address: String::new(),
            account: String::new(),
            domain_name: "EntryPoint".to_string(),
            domain_version: "1".to_string(),
        }
    }
}

/// Attempt pacing and bounds.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct AttemptConfig {
    /// Request lifetime in seconds (`deadline = now + ttl_secs`).
    pub ttl_secs: u64,

    /// Total submissions (including resubmissions) before giving up.
    pub max_attempts: u32,

    /// Time to wait for a receipt before treating the submission as
    /// timed out, in seconds.
    pub receipt_timeout_secs: u64,

    /// Gas limit for the relayer's outer transaction on the entry-point
    /// path.
    pub submit_gas_limit: u64,

    /// Base delay for backoff between attempts in milliseconds.
    pub base_delay_ms: u64,

    /// Maximum backoff delay in milliseconds.
    pub max_delay_ms: u64,
}

impl Default for AttemptConfig {
    fn default() -> Self {
        Self {
            ttl_secs: 3600,
            max_attempts: 3,
            receipt_timeout_secs: 120,
            submit_gas_limit: 3_000_000,
            base_delay_ms: 500,
            max_delay_ms: 10_000,
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
        }
    }
}
