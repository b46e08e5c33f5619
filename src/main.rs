//! Meta-transaction relay CLI.
//!
//! Relays one signed request per invocation:
//!
//! ```text
//! intent (CLI args)
//!     → nonce read (executor)
//!     → typed request + EIP-712 domain
//!     → sign with the user key
//!     → local verification
//!     → submit via the relayer key
//!     → receipt + settlement event
//! ```
//!
//! Private keys are read from `RELAY_USER_PRIVATE_KEY` and
//! `RELAY_RELAYER_PRIVATE_KEY`; everything else comes from the TOML config.

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::time::Duration;

use alloy::primitives::{Address, Bytes, U256};

use metatx_relay::chain::client::ChainClient;
use metatx_relay::config::loader::load_config;
use metatx_relay::protocol::domain::build_domain;
use metatx_relay::protocol::request::{ForwardIntent, UserOpIntent};
use metatx_relay::protocol::signer::{RelaySigner, RELAYER_KEY_ENV_VAR, USER_KEY_ENV_VAR};
use metatx_relay::relay::attempt::{AttemptPolicy, Relay};
use metatx_relay::relay::submitter::Submitter;

#[derive(Parser)]
#[command(name = "metatx-relay")]
#[command(about = "Relay signed meta-transactions and user operations", long_about = None)]
struct Cli {
    /// Path to the TOML configuration file.
    #[arg(short, long, default_value = "relay.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Relay a forward request through the forwarder
    Forward {
        /// Target contract address
        #[arg(long)]
        to: String,

        /// Native value to forward, in wei
        #[arg(long, default_value = "0")]
        value: String,

        /// Gas budget for the inner call
        #[arg(long, default_value_t = 1_000_000)]
        gas: u64,

        /// ABI-encoded calldata for the target, hex
        #[arg(long, default_value = "0x")]
        data: String,
    },
    /// Relay a user operation through the entry point
    UserOp {
        /// Target contract address for the account's inner call
        #[arg(long)]
        target: String,

        /// Native value for the inner call, in wei
        #[arg(long, default_value = "0")]
        value: String,

        /// ABI-encoded calldata for the target, hex
        #[arg(long, default_value = "0x")]
        data: String,

        /// Gas budget for the account's inner call
        #[arg(long, default_value_t = 1_000_000)]
        call_gas: u64,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let config = load_config(&cli.config)?;

    metatx_relay::observability::logging::init(&config.observability.log_level);

    let user = RelaySigner::from_env(USER_KEY_ENV_VAR)?;
    let relayer = RelaySigner::from_env(RELAYER_KEY_ENV_VAR)?;
    tracing::info!(
        user = %user.address(),
        relayer = %relayer.address(),
        "Signers loaded"
    );

    let client = ChainClient::new(config.chain.clone()).await?;
    let block = client.get_block_number().await?;
    tracing::info!(block, chain_id = config.chain.chain_id, "Connected");

    let submitter = Submitter::connect(
        &config.chain.rpc_url,
        &relayer,
        Duration::from_secs(config.attempt.receipt_timeout_secs),
        u64::from(config.chain.confirmation_blocks),
    )?;
    let relay = Relay::new(client, submitter, AttemptPolicy::from(&config.attempt));

    let receipt = match cli.command {
        Commands::Forward {
            to,
            value,
            gas,
            data,
        } => {
            let forwarder: Address = config.forwarder.address.parse()?;
            let domain = build_domain(
                &config.forwarder.domain_name,
                &config.forwarder.domain_version,
                config.chain.chain_id,
                forwarder,
            )?;
            let intent = ForwardIntent {
                from: user.address(),
                to: to.parse()?,
                value: value.parse::<U256>()?,
                gas,
                data: data.parse::<Bytes>()?,
            };
            relay.relay_forward(&user, &domain, forwarder, &intent).await?
        }
        Commands::UserOp {
            target,
            value,
            data,
            call_gas,
        } => {
            let entry_point: Address = config.entry_point.address.parse()?;
            let account: Address = config.entry_point.account.parse()?;
            let domain = build_domain(
                &config.entry_point.domain_name,
                &config.entry_point.domain_version,
                config.chain.chain_id,
                entry_point,
            )?;
            let intent = UserOpIntent {
                account,
                target: target.parse()?,
                value: value.parse::<U256>()?,
                data: data.parse::<Bytes>()?,
                call_gas,
            };
            relay.relay_user_op(&user, &domain, entry_point, &intent).await?
        }
    };

    println!("{}", serde_json::to_string_pretty(&receipt)?);
    Ok(())
}
