//! # Artifact model & schema validators
//!
//! Every artifact clawforge reasons about (`DoD`, `DecisionLock`,
//! `ExecutionPlan`, evidence, identity, attestation, anchor, approval
//! bundle, review envelope/patch, policy), plus the structural validator for
//! each and the single error carrier they all report through.

pub mod artifacts;
pub mod error;
pub mod schema;
pub mod verification;

pub use artifacts::*;
pub use error::{ClawforgeError, ClawforgeResult, ErrorCode};
pub use verification::{is_recognized_verification_method, RECOGNIZED_VERIFICATION_METHODS};
