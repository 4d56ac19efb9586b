//! Role catalog port

use panel_domain::{RoleDefinition, RoleId};

/// Lookup of specialist roles.
///
/// An unknown id is `None` ("role unavailable"), never an error.
pub trait RoleCatalog: Send + Sync {
    fn lookup(&self, role_id: &RoleId) -> Option<RoleDefinition>;

    /// Every role the proposer may choose from
    fn list(&self) -> Vec<RoleDefinition>;
}
