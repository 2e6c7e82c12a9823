use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

/// One verifiable condition within a [`DefinitionOfDone`].
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct DodItem {
    pub id: String,
    pub description: String,
    pub verification_method: String,
    #[serde(flatten, default, skip_serializing_if = "Map::is_empty")]
    pub extra: Map<String, Value>,
}

/// Definition-of-Done: the enumerated, verifiable conditions a session must
/// satisfy before the Execution Gate will pass.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct DefinitionOfDone {
    pub dod_id: Uuid,
    pub session_id: Uuid,
    pub items: Vec<DodItem>,
    #[serde(flatten, default, skip_serializing_if = "Map::is_empty")]
    pub extra: Map<String, Value>,
}

/// Binds a goal to a DoD and, once a plan exists, to that plan via
/// `plan_hash`. `plan_hash` is immutable once set.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct DecisionLock {
    pub lock_id: Uuid,
    pub session_id: Uuid,
    pub dod_id: Uuid,
    pub goal: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub plan_hash: Option<String>,
    #[serde(flatten, default, skip_serializing_if = "Map::is_empty")]
    pub extra: Map<String, Value>,
}

/// Verification descriptor attached to a plan step.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct StepVerification {
    pub method: String,
    #[serde(flatten, default, skip_serializing_if = "Map::is_empty")]
    pub extra: Map<String, Value>,
}

/// One step of an [`ExecutionPlan`].
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct PlanStep {
    pub step_id: String,
    pub ai_allowed: bool,
    #[serde(default)]
    pub references: Vec<String>,
    #[serde(default)]
    pub required_capabilities: Vec<String>,
    pub verification: StepVerification,
    #[serde(flatten, default, skip_serializing_if = "Map::is_empty")]
    pub extra: Map<String, Value>,
}

/// The externally-produced, locked plan a session's steps execute against.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ExecutionPlan {
    pub session_id: Uuid,
    pub dod_id: Uuid,
    pub lock_id: Uuid,
    pub steps: Vec<PlanStep>,
    #[serde(default)]
    pub allowed_capabilities: Vec<String>,
    pub forbidden_actions: Vec<String>,
    pub completion_criteria: Vec<String>,
    #[serde(flatten, default, skip_serializing_if = "Map::is_empty")]
    pub extra: Map<String, Value>,
}

impl ExecutionPlan {
    #[must_use]
    pub fn step(&self, step_id: &str) -> Option<&PlanStep> {
        self.steps.iter().find(|s| s.step_id == step_id)
    }
}

/// One piece of evidence asserting that a step satisfied a DoD item.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct RunnerEvidence {
    pub session_id: Uuid,
    pub step_id: String,
    pub evidence_id: Uuid,
    pub timestamp: String,
    pub evidence_type: String,
    pub artifact_hash: String,
    #[serde(default)]
    pub verification_metadata: Map<String, Value>,
    pub capability_used: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub human_confirmation_proof: Option<String>,
    pub plan_hash: String,
    #[serde(default)]
    pub prev_evidence_hash: Option<String>,
    pub evidence_hash: String,
    #[serde(flatten, default, skip_serializing_if = "Map::is_empty")]
    pub extra: Map<String, Value>,
}

impl RunnerEvidence {
    /// The evidence's own identity payload: every field except `evidenceHash`
    /// itself, used both to compute and to verify `evidence_hash`.
    #[must_use]
    pub fn identity_payload(&self) -> Value {
        let mut value = serde_json::to_value(self).expect("RunnerEvidence always serializes");
        if let Value::Object(map) = &mut value {
            map.remove("evidenceHash");
        }
        value
    }
}

/// Identity of the runner that executed a session's steps.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct RunnerIdentity {
    pub runner_id: String,
    pub runner_version: String,
    pub runner_public_key: String,
    pub environment_fingerprint: String,
    pub build_hash: String,
    #[serde(default)]
    pub allowed_capabilities_snapshot: Vec<String>,
    pub attestation_timestamp: String,
    /// Signature algorithm the runner attests with: `ed25519` or `rsa-sha256`.
    #[serde(default = "default_attestation_algorithm")]
    pub attestation_algorithm: String,
    #[serde(flatten, default, skip_serializing_if = "Map::is_empty")]
    pub extra: Map<String, Value>,
}

fn default_attestation_algorithm() -> String {
    "ed25519".to_string()
}

/// Runner-signed statement over the ordered evidence chain and runner
/// identity hash.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct RunnerAttestation {
    pub session_id: Uuid,
    pub runner_identity_hash: String,
    pub evidence_chain_hashes: Vec<String>,
    pub signed_payload_hash: String,
    pub signature: String,
    #[serde(flatten, default, skip_serializing_if = "Map::is_empty")]
    pub extra: Map<String, Value>,
}

/// The single root hash binding a session's plan, lock, evidence,
/// attestation, runner identity, and policy hashes.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SessionAnchor {
    pub session_id: Uuid,
    pub plan_hash: String,
    pub lock_id: Uuid,
    pub final_evidence_hash: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub final_attestation_hash: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub runner_identity_hash: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub policy_set_hash: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub policy_evaluation_hash: Option<String>,
    #[serde(flatten, default, skip_serializing_if = "Map::is_empty")]
    pub extra: Map<String, Value>,
}

/// A human-approver's signature over one artifact hash.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ApprovalSignature {
    pub signature_id: Uuid,
    pub approver_id: String,
    pub role: String,
    pub algorithm: String,
    pub artifact_type: String,
    pub artifact_hash: String,
    pub session_id: Uuid,
    pub timestamp: String,
    pub nonce: Uuid,
    pub signature: String,
    pub payload_hash: String,
    #[serde(flatten, default, skip_serializing_if = "Map::is_empty")]
    pub extra: Map<String, Value>,
}

impl ApprovalSignature {
    /// The signature's own identity payload: every field except `signature`
    /// and `payloadHash`.
    #[must_use]
    pub fn identity_payload(&self) -> Value {
        let mut value = serde_json::to_value(self).expect("ApprovalSignature always serializes");
        if let Value::Object(map) = &mut value {
            map.remove("signature");
            map.remove("payloadHash");
        }
        value
    }
}

/// A bundle of human approval signatures over a session's artifact hashes.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ApprovalBundle {
    pub schema_version: String,
    pub session_id: Uuid,
    pub bundle_id: Uuid,
    pub signatures: Vec<ApprovalSignature>,
    pub bundle_hash: String,
    #[serde(flatten, default, skip_serializing_if = "Map::is_empty")]
    pub extra: Map<String, Value>,
}

/// Describes the step under review: what files/symbols are in scope and
/// what evidence type is expected.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct StepEnvelope {
    pub step_id: String,
    pub lock_id: Uuid,
    pub session_id: Uuid,
    #[serde(default)]
    pub referenced_dod_items: Vec<String>,
    #[serde(default)]
    pub allowed_paths: Vec<String>,
    pub expected_evidence_type: String,
    #[serde(flatten, default, skip_serializing_if = "Map::is_empty")]
    pub extra: Map<String, Value>,
}

/// One file's change within a [`PatchArtifact`].
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct FileChange {
    pub path: String,
    pub added_lines: u32,
    pub removed_lines: u32,
    pub diff_text: String,
    #[serde(flatten, default, skip_serializing_if = "Map::is_empty")]
    pub extra: Map<String, Value>,
}

/// The patch a reviewer evaluates against a [`StepEnvelope`].
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct PatchArtifact {
    pub step_id: String,
    pub file_changes: Vec<FileChange>,
    #[serde(flatten, default, skip_serializing_if = "Map::is_empty")]
    pub extra: Map<String, Value>,
}

/// A named, versioned policy record. Anchor-level equality only; this core
/// never interprets policy content.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Policy {
    pub policy_id: String,
    #[serde(flatten, default, skip_serializing_if = "Map::is_empty")]
    pub extra: Map<String, Value>,
}
