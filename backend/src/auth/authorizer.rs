use subdesk_core::domain::value_objects::enums::roles::Role;
use thiserror::Error;

use super::AuthUser;

pub const ADMIN_ONLY: &[Role] = &[Role::Admin];

#[derive(Debug, Clone, Copy, Error, PartialEq, Eq)]
#[error("User role '{role}' is not authorized to access this resource")]
pub struct AccessDenied {
    pub role: Role,
}

pub fn authorize(role: Role, allowed: &[Role]) -> Result<(), AccessDenied> {
    if allowed.contains(&role) {
        Ok(())
    } else {
        Err(AccessDenied { role })
    }
}

impl AuthUser {
    pub fn require_any(&self, allowed: &[Role]) -> Result<(), AccessDenied> {
        authorize(self.role, allowed)
    }
}
