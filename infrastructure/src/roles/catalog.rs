//! Built-in specialist roles, extendable from configuration.

use crate::config::FileRoleConfig;
use panel_application::ports::role_catalog::RoleCatalog;
use panel_domain::{RoleDefinition, RoleId};
use tracing::debug;

/// (id, name, description, icon, color, system prompt)
const BUILTIN_ROLES: &[(&str, &str, &str, &str, &str, &str)] = &[
    (
        "software_architect",
        "Software Architect",
        "System design, component boundaries, scalability and long-term maintainability",
        "building",
        "#2563EB",
        "You are a software architect. You reason about system structure, interfaces between components, data flow, scalability limits and the cost of change over time.",
    ),
    (
        "security_engineer",
        "Security Engineer",
        "Threat modelling, authentication, data protection and attack surface",
        "shield",
        "#DC2626",
        "You are a security engineer. You look for threats, abuse cases, weak trust boundaries and data exposure, and you propose proportionate mitigations.",
    ),
    (
        "product_manager",
        "Product Manager",
        "User value, prioritization, scope and go-to-market trade-offs",
        "compass",
        "#7C3AED",
        "You are a product manager. You focus on user problems, measurable outcomes, scope control and sequencing work for the earliest useful release.",
    ),
    (
        "ux_designer",
        "UX Designer",
        "User experience, interaction design, accessibility and usability",
        "palette",
        "#DB2777",
        "You are a UX designer. You evaluate flows, cognitive load, accessibility and how real users will experience the proposal.",
    ),
    (
        "data_scientist",
        "Data Scientist",
        "Statistics, experimentation, metrics and machine learning",
        "chart",
        "#059669",
        "You are a data scientist. You think in terms of evidence, measurement, experiment design, data quality and the limits of what the data can show.",
    ),
    (
        "devops_engineer",
        "DevOps Engineer",
        "Deployment, infrastructure, reliability, observability and operating cost",
        "server",
        "#EA580C",
        "You are a DevOps engineer. You consider how the system is built, deployed, monitored and operated, and what fails at 3 a.m.",
    ),
    (
        "legal_advisor",
        "Legal Advisor",
        "Contracts, licensing, privacy regulation and compliance exposure",
        "scale",
        "#4B5563",
        "You are a legal advisor. You identify regulatory, contractual, licensing and privacy obligations and flag where formal counsel is required. You do not give jurisdiction-specific legal advice as fact.",
    ),
    (
        "financial_analyst",
        "Financial Analyst",
        "Costs, budgets, pricing, return on investment and financial risk",
        "coins",
        "#CA8A04",
        "You are a financial analyst. You estimate costs and returns, expose hidden expenses, compare options on total cost and quantify financial risk.",
    ),
];

/// Role catalog holding built-in roles plus configured ones.
///
/// A configured role with a built-in id replaces the built-in definition.
#[derive(Debug, Clone)]
pub struct StaticRoleCatalog {
    roles: Vec<RoleDefinition>,
}

impl StaticRoleCatalog {
    pub fn builtin() -> Self {
        Self {
            roles: BUILTIN_ROLES
                .iter()
                .map(|(id, name, description, icon, color, prompt)| {
                    RoleDefinition::new(*id, *name, *description, *prompt)
                        .with_icon(*icon)
                        .with_color(*color)
                })
                .collect(),
        }
    }

    pub fn from_roles(roles: Vec<RoleDefinition>) -> Self {
        Self { roles }
    }

    /// Built-in roles merged with `[[roles]]` from the config file
    pub fn with_configured(configured: &[FileRoleConfig]) -> Self {
        let mut catalog = Self::builtin();
        for role in configured {
            catalog.upsert(role.to_definition());
        }
        catalog
    }

    pub fn upsert(&mut self, role: RoleDefinition) {
        match self.roles.iter_mut().find(|r| r.id == role.id) {
            Some(existing) => {
                debug!(role_id = %role.id, "Overriding built-in role");
                *existing = role;
            }
            None => self.roles.push(role),
        }
    }

    pub fn len(&self) -> usize {
        self.roles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.roles.is_empty()
    }
}

impl Default for StaticRoleCatalog {
    fn default() -> Self {
        Self::builtin()
    }
}

impl RoleCatalog for StaticRoleCatalog {
    fn lookup(&self, role_id: &RoleId) -> Option<RoleDefinition> {
        self.roles.iter().find(|r| &r.id == role_id).cloned()
    }

    fn list(&self) -> Vec<RoleDefinition> {
        self.roles.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_builtin_ids_are_unique_and_resolvable() {
        let catalog = StaticRoleCatalog::builtin();
        let ids: HashSet<_> = catalog.list().into_iter().map(|r| r.id).collect();
        assert_eq!(ids.len(), catalog.len());
        assert!(catalog.lookup(&RoleId::new("security_engineer")).is_some());
    }

    #[test]
    fn test_unknown_id_is_none() {
        let catalog = StaticRoleCatalog::builtin();
        assert!(catalog.lookup(&RoleId::new("astrologer")).is_none());
    }

    #[test]
    fn test_configured_roles_add_and_override() {
        let configured = vec![
            FileRoleConfig {
                id: "sre".to_string(),
                name: "SRE".to_string(),
                system_prompt: "You keep things running.".to_string(),
                ..Default::default()
            },
            FileRoleConfig {
                id: "legal_advisor".to_string(),
                name: "In-house Counsel".to_string(),
                system_prompt: "You are our counsel.".to_string(),
                ..Default::default()
            },
        ];

        let catalog = StaticRoleCatalog::with_configured(&configured);

        assert_eq!(catalog.len(), BUILTIN_ROLES.len() + 1);
        assert_eq!(catalog.lookup(&RoleId::new("sre")).unwrap().name, "SRE");
        assert_eq!(
            catalog.lookup(&RoleId::new("legal_advisor")).unwrap().name,
            "In-house Counsel"
        );
    }
}
