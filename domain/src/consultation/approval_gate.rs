//! Approval gate over proposed roles.
//!
//! Pure and synchronous. Whether the gate may be used at all is decided by
//! the session status, not by the gate.

use super::value_objects::ProposedRole;
use crate::role::RoleId;

/// Accept/reject state transformer for a proposal's roles
pub struct ApprovalGate<'a> {
    roles: &'a mut [ProposedRole],
}

impl<'a> ApprovalGate<'a> {
    pub fn new(roles: &'a mut [ProposedRole]) -> Self {
        Self { roles }
    }

    /// Flip `is_approved` for the role with `role_id`.
    ///
    /// Returns `false` (and changes nothing) when no such role was proposed.
    pub fn toggle(&mut self, role_id: &RoleId) -> bool {
        match self.roles.iter_mut().find(|r| &r.role_id == role_id) {
            Some(role) => {
                role.is_approved = !role.is_approved;
                true
            }
            None => false,
        }
    }

    pub fn set_all(&mut self, approved: bool) {
        for role in self.roles.iter_mut() {
            role.is_approved = approved;
        }
    }

    /// Approved roles in their original proposal order
    pub fn approved_subset(roles: &[ProposedRole]) -> Vec<ProposedRole> {
        roles.iter().filter(|r| r.is_approved).cloned().collect()
    }
}
