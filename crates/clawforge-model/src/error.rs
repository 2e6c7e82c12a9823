use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

/// Closed taxonomy of symbolic error codes. Every violation clawforge
/// detects surfaces as one of these; nothing here is raised for reasons
/// outside this list, and nothing outside this list is ever returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ErrorCode {
    DodSchemaInvalid,
    LockSchemaInvalid,
    PlanSchemaInvalid,
    EnvelopeSchemaInvalid,
    PatchSchemaInvalid,
    EvidenceSchemaInvalid,
    IdentitySchemaInvalid,
    AttestationSchemaInvalid,
    AnchorSchemaInvalid,
    BundleSchemaInvalid,
    SignatureSchemaInvalid,
    PolicySchemaInvalid,

    PlanHashMissing,
    PlanHashMismatch,
    AnchorInvalid,
    RunnerIdentityInvalid,

    EvidenceStepUnknown,
    EvidenceCapUnregistered,
    EvidenceCapNotAllowed,
    EvidenceHumanConfirmMissing,
    EvidenceTypeMismatch,
    EvidenceChainBroken,
    EvidenceDuplicate,

    AttestationInvalid,
    ApprovalSignatureInvalid,
    ApprovalNonceReplay,

    ReplayBundleInvalid,
}

impl ErrorCode {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::DodSchemaInvalid => "DOD_SCHEMA_INVALID",
            Self::LockSchemaInvalid => "LOCK_SCHEMA_INVALID",
            Self::PlanSchemaInvalid => "PLAN_SCHEMA_INVALID",
            Self::EnvelopeSchemaInvalid => "ENVELOPE_SCHEMA_INVALID",
            Self::PatchSchemaInvalid => "PATCH_SCHEMA_INVALID",
            Self::EvidenceSchemaInvalid => "EVIDENCE_SCHEMA_INVALID",
            Self::IdentitySchemaInvalid => "IDENTITY_SCHEMA_INVALID",
            Self::AttestationSchemaInvalid => "ATTESTATION_SCHEMA_INVALID",
            Self::AnchorSchemaInvalid => "ANCHOR_SCHEMA_INVALID",
            Self::BundleSchemaInvalid => "BUNDLE_SCHEMA_INVALID",
            Self::SignatureSchemaInvalid => "SIGNATURE_SCHEMA_INVALID",
            Self::PolicySchemaInvalid => "POLICY_SCHEMA_INVALID",
            Self::PlanHashMissing => "PLAN_HASH_MISSING",
            Self::PlanHashMismatch => "PLAN_HASH_MISMATCH",
            Self::AnchorInvalid => "ANCHOR_INVALID",
            Self::RunnerIdentityInvalid => "RUNNER_IDENTITY_INVALID",
            Self::EvidenceStepUnknown => "EVIDENCE_STEP_UNKNOWN",
            Self::EvidenceCapUnregistered => "EVIDENCE_CAP_UNREGISTERED",
            Self::EvidenceCapNotAllowed => "EVIDENCE_CAP_NOT_ALLOWED",
            Self::EvidenceHumanConfirmMissing => "EVIDENCE_HUMAN_CONFIRM_MISSING",
            Self::EvidenceTypeMismatch => "EVIDENCE_TYPE_MISMATCH",
            Self::EvidenceChainBroken => "EVIDENCE_CHAIN_BROKEN",
            Self::EvidenceDuplicate => "EVIDENCE_DUPLICATE",
            Self::AttestationInvalid => "ATTESTATION_INVALID",
            Self::ApprovalSignatureInvalid => "APPROVAL_SIGNATURE_INVALID",
            Self::ApprovalNonceReplay => "APPROVAL_NONCE_REPLAY",
            Self::ReplayBundleInvalid => "REPLAY_BUNDLE_INVALID",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The single error carrier used across the clawforge core: a symbolic code,
/// a human-readable message, and a structured details bag naming the
/// offending field(s).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClawforgeError {
    pub code: ErrorCode,
    pub message: String,
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub details: Map<String, Value>,
}

impl ClawforgeError {
    #[must_use]
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self { code, message: message.into(), details: Map::new() }
    }

    #[must_use]
    pub fn with_detail(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.details.insert(key.into(), value.into());
        self
    }

    #[must_use]
    pub fn field(code: ErrorCode, field: &str, message: impl Into<String>) -> Self {
        Self::new(code, message).with_detail("field", field)
    }
}

impl fmt::Display for ClawforgeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code, self.message)
    }
}

impl std::error::Error for ClawforgeError {}

pub type ClawforgeResult<T> = Result<T, ClawforgeError>;
