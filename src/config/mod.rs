//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML)
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → RelayConfig (validated, immutable)
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks
//! - Private keys are never part of the config file; they come from
//!   environment variables only

pub mod loader;
pub mod schema;
pub mod validation;

pub use schema::AttemptConfig;
pub use schema::ChainConfig;
pub use schema::RelayConfig;
