//! Observability subsystem.
//!
//! # Design Decisions
//! - Structured logging via the tracing crate
//! - Log level configurable via config and `RUST_LOG`
//! - Relay attempts carry a UUID so resubmissions of the same request can
//!   be correlated across log lines
//! - Private keys and signatures are never logged

pub mod logging;
