use clawforge_canon::sha256_hex_of_value;

use crate::error::{AuditError, AuditResult, ChainFailureKind};
use crate::event::AuditEvent;

/// Verifies a run's full event chain in stored order: the first event's
/// `prevHash` must be `None`, every later event's `prevHash` must equal
/// the previous event's `hash`, `seq` must be a gapless 1-based sequence,
/// and every `hash` must match the recomputed digest. Returns the first
/// failure found.
pub fn verify_chain(events: &[AuditEvent]) -> AuditResult<()> {
    for (index, event) in events.iter().enumerate() {
        let expected_seq = (index + 1) as u64;
        if event.seq != expected_seq {
            return Err(AuditError::ChainBroken { index, kind: ChainFailureKind::SeqGap });
        }

        if index == 0 {
            if event.prev_hash.is_some() {
                return Err(AuditError::ChainBroken { index, kind: ChainFailureKind::FirstEventPrevHashNotNull });
            }
        } else {
            let previous = &events[index - 1];
            if event.prev_hash.as_deref() != Some(previous.hash.as_str()) {
                return Err(AuditError::ChainBroken { index, kind: ChainFailureKind::PrevHashMismatch });
            }
        }

        let recomputed = sha256_hex_of_value(&event.hashed_payload())?;
        if recomputed != event.hash {
            return Err(AuditError::ChainBroken { index, kind: ChainFailureKind::HashMismatch });
        }
    }
    Ok(())
}
