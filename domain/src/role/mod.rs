//! Specialist roles
//!
//! A role is a named persona (system prompt plus display metadata) that
//! the role catalog resolves from a [`RoleId`].

use serde::{Deserialize, Serialize};

/// Stable identifier of a role in the catalog
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RoleId(String);

impl RoleId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for RoleId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for RoleId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Depth the specialist is asked to answer at.
///
/// Selects the level-specific suffix appended to a role's base system prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExpertiseLevel {
    Junior,
    Mid,
    #[default]
    Senior,
    Expert,
}

impl ExpertiseLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            ExpertiseLevel::Junior => "junior",
            ExpertiseLevel::Mid => "mid",
            ExpertiseLevel::Senior => "senior",
            ExpertiseLevel::Expert => "expert",
        }
    }

    fn directive(&self) -> &'static str {
        match self {
            ExpertiseLevel::Junior => {
                "Answer as a junior practitioner: explain fundamentals plainly and flag where a more senior colleague should double-check."
            }
            ExpertiseLevel::Mid => {
                "Answer as an experienced practitioner: be practical, concrete and mention common pitfalls."
            }
            ExpertiseLevel::Senior => {
                "Answer as a senior practitioner: weigh trade-offs, call out risks and recommend a course of action."
            }
            ExpertiseLevel::Expert => {
                "Answer as a leading expert in the field: be rigorous, cite edge cases and challenge weak assumptions in the question."
            }
        }
    }
}

impl std::fmt::Display for ExpertiseLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ExpertiseLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "junior" => Ok(ExpertiseLevel::Junior),
            "mid" | "intermediate" => Ok(ExpertiseLevel::Mid),
            "senior" => Ok(ExpertiseLevel::Senior),
            "expert" => Ok(ExpertiseLevel::Expert),
            other => Err(format!("unknown expertise level: {}", other)),
        }
    }
}

/// A specialist persona from the role catalog (Entity)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleDefinition {
    pub id: RoleId,
    pub name: String,
    /// One-line summary shown to the proposing model
    pub description: String,
    pub icon: String,
    pub color: String,
    /// Base persona prompt, refined per [`ExpertiseLevel`]
    pub system_prompt: String,
}

impl RoleDefinition {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        description: impl Into<String>,
        system_prompt: impl Into<String>,
    ) -> Self {
        Self {
            id: RoleId::new(id),
            name: name.into(),
            description: description.into(),
            icon: "person".to_string(),
            color: "#6B7280".to_string(),
            system_prompt: system_prompt.into(),
        }
    }

    pub fn with_icon(mut self, icon: impl Into<String>) -> Self {
        self.icon = icon.into();
        self
    }

    pub fn with_color(mut self, color: impl Into<String>) -> Self {
        self.color = color.into();
        self
    }

    /// System prompt for a delegate consulted at the given level
    pub fn system_prompt_for(&self, level: ExpertiseLevel) -> String {
        format!("{}\n\n{}", self.system_prompt.trim_end(), level.directive())
    }
}
