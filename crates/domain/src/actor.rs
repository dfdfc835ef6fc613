use common::{Role, UserId};

use crate::DomainError;

/// The authenticated caller of an operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Actor {
    pub user_id: UserId,
    pub role: Role,
}

impl Actor {
    pub fn new(user_id: UserId, role: Role) -> Self {
        Self { user_id, role }
    }

    pub fn user(user_id: UserId) -> Self {
        Self::new(user_id, Role::User)
    }

    pub fn admin(user_id: UserId) -> Self {
        Self::new(user_id, Role::Admin)
    }

    pub fn is_admin(&self) -> bool {
        self.role.is_admin()
    }

    /// Fails with [`DomainError::Forbidden`] unless the actor is an admin.
    pub fn require_admin(&self) -> Result<(), DomainError> {
        if self.is_admin() {
            Ok(())
        } else {
            Err(DomainError::Forbidden)
        }
    }

    /// Admins see everything; users see only what they own.
    pub fn can_see(&self, owner: UserId) -> bool {
        self.is_admin() || self.user_id == owner
    }
}
