//! # Evidence validation, hash-chain verification, attestation & anchor
//!
//! Everything downstream of a bound execution plan: per-step evidence
//! checks, tamper-evident chain verification, completion derivation, runner
//! identity/attestation binding, and the session anchor that roots the
//! whole graph.

mod anchor;
mod chain;
mod evidence;
mod identity;
mod signing;

pub use anchor::{validate_anchor, AnchorExpectations};
pub use chain::{derive_completion_status, verify_evidence_chain};
pub use evidence::validate_evidence;
pub use identity::{compute_runner_identity_hash, verify_attestation};
pub use signing::{verify_signature, SigningError};
