//! # Approval bundle verification
//!
//! RSA-SHA256 signature verification over human-signed approval bundles,
//! with replay-resistant nonce checking scoped to a single validation
//! call rather than process-wide state.

mod bundle;
mod signature;

pub use bundle::{check_nonce_replay, compute_bundle_hash, verify_bundle, ApproverKeyResolver};
pub use signature::verify_signature_entry;
