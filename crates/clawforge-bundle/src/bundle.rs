use serde::{Deserialize, Serialize};
use serde_json::Value;

use clawforge_canon::sha256_hex_of_value;
use clawforge_model::{
    ClawforgeError, ClawforgeResult, DecisionLock, DefinitionOfDone, ErrorCode, ExecutionPlan, Policy, RunnerAttestation,
    RunnerEvidence, RunnerIdentity, SessionAnchor,
};

/// The full set of artifacts collected for one session, aggregated into a
/// single hashable whole. Optional artifacts that have not yet been
/// produced (no runner identity yet, no anchor yet, ...) are omitted on
/// normalization rather than emitted as null.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArtifactBundle {
    pub bundle_version: String,
    pub dod: DefinitionOfDone,
    pub decision_lock: DecisionLock,
    pub execution_plan: ExecutionPlan,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub runner_identity: Option<RunnerIdentity>,
    #[serde(default)]
    pub runner_evidence: Vec<RunnerEvidence>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub runner_attestation: Option<RunnerAttestation>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_anchor: Option<SessionAnchor>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub policies: Option<Vec<Policy>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub policy_evaluation: Option<Value>,
}

/// Normalizes a bundle for hashing: evidence-chain order is preserved as
/// stored (it is already meaningful — chain position, not alphabetical),
/// policies are sorted by `policyId`, and absent optional fields are
/// omitted by `#[serde(skip_serializing_if)]` rather than emitted as null.
#[must_use]
pub fn normalize(bundle: &ArtifactBundle) -> ArtifactBundle {
    let mut normalized = bundle.clone();
    if let Some(policies) = normalized.policies.as_mut() {
        policies.sort_by(|a, b| a.policy_id.cmp(&b.policy_id));
    }
    normalized
}

/// `computeBundleHash = sha256HexOf(normalize(bundle))`.
pub fn compute_bundle_hash(bundle: &ArtifactBundle) -> ClawforgeResult<String> {
    let normalized = normalize(bundle);
    sha256_hex_of_value(&serde_json::to_value(&normalized).map_err(|e| ClawforgeError::new(ErrorCode::BundleSchemaInvalid, e.to_string()))?)
        .map_err(|e| ClawforgeError::new(ErrorCode::BundleSchemaInvalid, e.to_string()))
}
