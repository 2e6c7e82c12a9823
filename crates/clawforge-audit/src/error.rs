use std::fmt;

use thiserror::Error;

/// The specific way a chain verification step failed, reported alongside
/// the 0-based index of the offending event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChainFailureKind {
    HashMismatch,
    PrevHashMismatch,
    FirstEventPrevHashNotNull,
    SeqGap,
}

impl ChainFailureKind {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::HashMismatch => "hash_mismatch",
            Self::PrevHashMismatch => "prevHash_mismatch",
            Self::FirstEventPrevHashNotNull => "first_event_prevHash_not_null",
            Self::SeqGap => "seq_gap",
        }
    }
}

impl fmt::Display for ChainFailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Error, Debug)]
pub enum AuditError {
    #[error("audit database error: {0}")]
    Database(#[from] rusqlite::Error),
    #[error("run {0} not found")]
    RunNotFound(uuid::Uuid),
    #[error("failed to canonicalize audit event: {0}")]
    Canon(#[from] clawforge_canon::CanonError),
    #[error("audit chain broken at index {index}: {kind}")]
    ChainBroken { index: usize, kind: ChainFailureKind },
}

pub type AuditResult<T> = Result<T, AuditError>;
