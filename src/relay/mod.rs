//! Relay subsystem: nonce reads, submission, receipt correlation, and the
//! attempt state machine.
//!
//! # Data Flow
//! ```text
//! caller intent
//!     → nonce.rs     (authoritative nonce read from the executor)
//!     → protocol::   (typed request, structured hash, sign, local verify)
//!     → submitter.rs (execute via the relayer's wallet, await receipt)
//!     → events.rs    (settlement correlation from receipt logs)
//!     → attempt.rs   (state machine: rebuild / resubmit re-entry points)
//! ```

pub mod attempt;
pub mod events;
pub mod nonce;
pub mod submitter;
pub mod types;

pub use attempt::{AttemptPolicy, Relay};
pub use submitter::{SignedForwardRequest, SignedUserOp, Submitter};
pub use types::{AttemptError, RelayError, RelayReceipt, RelayResult, Settlement, Stage};
