//! Protocol layer: typed-data construction, hashing, signing, verification.
//!
//! # Data Flow
//! ```text
//! caller intent + nonce
//!     → request.rs (typed ForwardRequest / UserOp payload)
//!     → domain.rs  (domain-separation structure)
//!     → hash.rs    (canonical structured hash)
//!     → signer.rs  (signature production, recovery, local verification)
//! ```
//!
//! Everything in this layer is synchronous and CPU-bound; suspension only
//! happens at the chain boundary (`crate::chain`, `crate::relay`).

pub mod domain;
pub mod hash;
pub mod request;
pub mod signer;

pub use domain::build_domain;
pub use request::{build_forward_request, build_user_op, ForwardIntent, ForwardRequest, UserOp};
pub use signer::RelaySigner;
