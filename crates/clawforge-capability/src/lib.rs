//! # Capability registry
//!
//! A static, process-wide immutable table of every operation a runner may
//! request evidence credit for. There is no mutable or per-session registry:
//! the table below is the entire surface area a runner can ever exercise.

use serde::{Deserialize, Serialize};

/// Category an operation's capability belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Filesystem,
    Validation,
    Computation,
    Transformation,
    Verification,
    Metadata,
}

/// Severity of an unreviewed misuse of a capability.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
    Critical,
}

/// Actor role permitted to exercise a capability.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    AiAgent,
    HumanOperator,
    CiSystem,
}

/// One entry in the capability registry.
#[derive(Debug, Clone, Copy)]
pub struct CapabilityDefinition {
    pub id: &'static str,
    pub description: &'static str,
    pub category: Category,
    pub risk_level: RiskLevel,
    pub allowed_roles: &'static [Role],
    pub requires_human_confirmation: bool,
}

/// The compile-time capability table. Ids are unique, every entry has at
/// least one allowed role, at least one entry requires human confirmation,
/// and at least two distinct categories are represented (enforced by tests).
pub const CAPABILITIES: &[CapabilityDefinition] = &[
    CapabilityDefinition {
        id: "read_file",
        description: "Read the contents of a file within the workspace",
        category: Category::Filesystem,
        risk_level: RiskLevel::Low,
        allowed_roles: &[Role::AiAgent, Role::CiSystem, Role::HumanOperator],
        requires_human_confirmation: false,
    },
    CapabilityDefinition {
        id: "write_file",
        description: "Create or modify a file within the workspace",
        category: Category::Filesystem,
        risk_level: RiskLevel::Medium,
        allowed_roles: &[Role::AiAgent, Role::CiSystem],
        requires_human_confirmation: false,
    },
    CapabilityDefinition {
        id: "delete_file",
        description: "Remove a file from the workspace",
        category: Category::Filesystem,
        risk_level: RiskLevel::High,
        allowed_roles: &[Role::HumanOperator, Role::CiSystem],
        requires_human_confirmation: true,
    },
    CapabilityDefinition {
        id: "run_static_analysis",
        description: "Run a static analysis tool over changed files",
        category: Category::Validation,
        risk_level: RiskLevel::Low,
        allowed_roles: &[Role::AiAgent, Role::CiSystem],
        requires_human_confirmation: false,
    },
    CapabilityDefinition {
        id: "run_unit_tests",
        description: "Execute a unit test suite",
        category: Category::Verification,
        risk_level: RiskLevel::Low,
        allowed_roles: &[Role::AiAgent, Role::CiSystem],
        requires_human_confirmation: false,
    },
    CapabilityDefinition {
        id: "run_security_scan",
        description: "Execute a security scanning tool over changed files",
        category: Category::Verification,
        risk_level: RiskLevel::Medium,
        allowed_roles: &[Role::CiSystem],
        requires_human_confirmation: false,
    },
    CapabilityDefinition {
        id: "compute_diff_hash",
        description: "Compute a content hash over a patch artifact",
        category: Category::Computation,
        risk_level: RiskLevel::Low,
        allowed_roles: &[Role::AiAgent, Role::CiSystem, Role::HumanOperator],
        requires_human_confirmation: false,
    },
    CapabilityDefinition {
        id: "transform_patch",
        description: "Apply a code transformation (e.g. formatting, codemod)",
        category: Category::Transformation,
        risk_level: RiskLevel::Medium,
        allowed_roles: &[Role::AiAgent],
        requires_human_confirmation: false,
    },
    CapabilityDefinition {
        id: "record_metadata",
        description: "Attach structured metadata to a step's evidence",
        category: Category::Metadata,
        risk_level: RiskLevel::Low,
        allowed_roles: &[Role::AiAgent, Role::CiSystem, Role::HumanOperator],
        requires_human_confirmation: false,
    },
    CapabilityDefinition {
        id: "deploy_change",
        description: "Promote a reviewed change to a deployment target",
        category: Category::Transformation,
        risk_level: RiskLevel::Critical,
        allowed_roles: &[Role::HumanOperator],
        requires_human_confirmation: true,
    },
];

/// True if `capability_id` exists in the registry.
#[must_use]
pub fn is_registered(capability_id: &str) -> bool {
    lookup(capability_id).is_some()
}

/// Looks up a capability by id.
#[must_use]
pub fn lookup(capability_id: &str) -> Option<&'static CapabilityDefinition> {
    CAPABILITIES.iter().find(|c| c.id == capability_id)
}

/// True if the capability requires human confirmation before evidence
/// citing it can be accepted. Unregistered capabilities are conservatively
/// treated as requiring confirmation.
#[must_use]
pub fn requires_human_confirmation(capability_id: &str) -> bool {
    lookup(capability_id).map_or(true, |c| c.requires_human_confirmation)
}

/// True if `role` is permitted to exercise `capability_id`. Unregistered
/// capabilities are never allowed for any role.
#[must_use]
pub fn is_role_allowed_for_capability(capability_id: &str, role: Role) -> bool {
    lookup(capability_id).is_some_and(|c| c.allowed_roles.contains(&role))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn ids_are_unique() {
        let ids: HashSet<&str> = CAPABILITIES.iter().map(|c| c.id).collect();
        assert_eq!(ids.len(), CAPABILITIES.len());
    }

    #[test]
    fn every_entry_has_at_least_one_role() {
        assert!(CAPABILITIES.iter().all(|c| !c.allowed_roles.is_empty()));
    }

    #[test]
    fn at_least_one_entry_requires_confirmation() {
        assert!(CAPABILITIES.iter().any(|c| c.requires_human_confirmation));
    }

    #[test]
    fn at_least_two_distinct_categories_present() {
        let categories: HashSet<Category> = CAPABILITIES.iter().map(|c| c.category).collect();
        assert!(categories.len() >= 2);
    }

    #[test]
    fn queries_behave_as_expected() {
        assert!(is_registered("read_file"));
        assert!(!is_registered("launch_missiles"));
        assert!(requires_human_confirmation("delete_file"));
        assert!(!requires_human_confirmation("read_file"));
        assert!(is_role_allowed_for_capability("read_file", Role::AiAgent));
        assert!(!is_role_allowed_for_capability("deploy_change", Role::AiAgent));
    }
}
