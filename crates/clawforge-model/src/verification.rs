/// Recognized `verificationMethod` / `evidenceType` values (spec data model
/// section 3). The set is closed: schema validators check string shape, the
/// execution gate and evidence validator check membership here.
pub const RECOGNIZED_VERIFICATION_METHODS: &[&str] = &[
    "unit_test",
    "integration_test",
    "static_analysis",
    "manual_review",
    "security_scan",
    "lint",
    "e2e_test",
    "performance_benchmark",
];

#[must_use]
pub fn is_recognized_verification_method(method: &str) -> bool {
    RECOGNIZED_VERIFICATION_METHODS.contains(&method)
}
