//! Custom role definitions from TOML (`[[roles]]` array)

use panel_domain::RoleDefinition;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileRoleConfig {
    pub id: String,
    pub name: String,
    pub description: String,
    pub system_prompt: String,
    pub icon: Option<String>,
    pub color: Option<String>,
}

impl FileRoleConfig {
    pub fn to_definition(&self) -> RoleDefinition {
        let name = if self.name.trim().is_empty() {
            self.id.clone()
        } else {
            self.name.clone()
        };
        let mut role = RoleDefinition::new(
            self.id.trim(),
            name,
            self.description.clone(),
            self.system_prompt.clone(),
        );
        if let Some(icon) = &self.icon {
            role = role.with_icon(icon.clone());
        }
        if let Some(color) = &self.color {
            role = role.with_color(color.clone());
        }
        role
    }
}
