use anyhow::Result;

use clawforge_capability::CAPABILITIES;

/// `clawctl list-capabilities`: prints the static capability registry.
pub fn handle_list_capabilities(json: bool) -> Result<i32> {
    if json {
        let entries: Vec<_> = CAPABILITIES
            .iter()
            .map(|c| {
                serde_json::json!({
                    "id": c.id,
                    "description": c.description,
                    "category": c.category,
                    "riskLevel": c.risk_level,
                    "allowedRoles": c.allowed_roles,
                    "requiresHumanConfirmation": c.requires_human_confirmation,
                })
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&entries)?);
    } else {
        for c in CAPABILITIES {
            println!("{} [{:?}/{:?}]{} — {}", c.id, c.category, c.risk_level, if c.requires_human_confirmation { " *confirm*" } else { "" }, c.description);
        }
    }
    Ok(0)
}
