use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

/// One entry in a run's hash-chained audit log. `hash` is computed over
/// every other field; `prevHash` links this entry to the one before it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct AuditEvent {
    pub seq: u64,
    pub event_id: Uuid,
    pub run_id: Uuid,
    pub timestamp: String,
    pub payload: Value,
    #[serde(default)]
    pub prev_hash: Option<String>,
    pub hash: String,
}

impl AuditEvent {
    /// The value hashed to produce `hash`: every field except `hash` and
    /// `prevHash` themselves.
    #[must_use]
    pub fn hashed_payload(&self) -> Value {
        serde_json::json!({
            "seq": self.seq,
            "eventId": self.event_id,
            "runId": self.run_id,
            "timestamp": self.timestamp,
            "payload": self.payload,
        })
    }
}
