//! Authorization decisions for mutating operations.

use uuid::Uuid;

use crate::domain::{Role, User};
use crate::error::DomainError;

/// The authenticated party performing an operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Actor {
    pub id: Uuid,
    pub username: String,
    pub role: Role,
}

impl Actor {
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}

impl From<&User> for Actor {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            username: user.username.clone(),
            role: user.role,
        }
    }
}

/// Mutations guarded by the gate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    CreatePost,
    UpdatePost,
    DeletePost,
    AddComment,
}

impl Action {
    fn allowed_roles(&self) -> &'static [Role] {
        match self {
            Action::CreatePost | Action::UpdatePost | Action::DeletePost => {
                &[Role::Author, Role::Admin]
            }
            Action::AddComment => &[Role::User, Role::Author, Role::Admin],
        }
    }

    fn requires_ownership(&self) -> bool {
        matches!(self, Action::UpdatePost | Action::DeletePost)
    }
}

/// Decide whether `actor` may perform `action`.
///
/// `owner` is the author of the targeted post for actions on an existing
/// post. Update and delete require ownership unless the actor is an admin.
pub fn authorize(actor: &Actor, action: Action, owner: Option<Uuid>) -> Result<(), DomainError> {
    if !action.allowed_roles().contains(&actor.role) {
        tracing::debug!(user_id = %actor.id, role = %actor.role, ?action, "Role not permitted");
        return Err(DomainError::Forbidden);
    }

    if action.requires_ownership() && !actor.is_admin() && owner != Some(actor.id) {
        tracing::debug!(user_id = %actor.id, ?action, "Actor does not own the resource");
        return Err(DomainError::Forbidden);
    }

    Ok(())
}
