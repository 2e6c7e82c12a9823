//! # Artifact bundle
//!
//! Aggregates a session's full artifact set into one normalized,
//! hashable whole — the session's final composite identity once every
//! downstream artifact has been produced.

mod bundle;

pub use bundle::{compute_bundle_hash, normalize, ArtifactBundle};
