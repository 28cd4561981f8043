//! Capability-based authorization.
//!
//! Every role-gated operation is a [`Capability`] with a fixed allowed-role
//! set, checked by one reusable function. Handlers call
//! [`authorize`] instead of encoding role lists inline, so the whole
//! permission surface is auditable in one table.

use crate::auth::AuthContext;
use crate::error::{ApiError, ApiResult};
use collabflow_core::Role;

/// A role-gated operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Capability {
    CreateTask,
    UpdateTask,
    DeleteTask,
    CreateProject,
    UpdateProject,
    DeleteProject,
    CreateWorkspace,
    UpdateWorkspace,
    DeleteWorkspace,
    ManageUsers,
}

impl Capability {
    /// Roles permitted to perform this operation.
    pub fn allowed_roles(&self) -> &'static [Role] {
        match self {
            Capability::CreateTask | Capability::UpdateTask => {
                &[Role::Admin, Role::ProjectManager, Role::Developer]
            }
            Capability::DeleteTask => &[Role::Admin, Role::ProjectManager],
            Capability::CreateProject => {
                &[Role::Admin, Role::WorkspaceOwner, Role::ProjectManager]
            }
            Capability::UpdateProject => &[Role::Admin, Role::ProjectManager],
            Capability::DeleteProject => &[Role::Admin],
            Capability::CreateWorkspace
            | Capability::UpdateWorkspace
            | Capability::DeleteWorkspace => &[Role::Admin, Role::WorkspaceOwner],
            Capability::ManageUsers => &[Role::Admin],
        }
    }

    /// Check whether a role may perform this operation.
    pub fn permits(&self, role: Role) -> bool {
        self.allowed_roles().contains(&role)
    }
}

/// Authorize the authenticated user for a capability.
///
/// Returns `Forbidden` when the user's role is not in the capability's
/// allowed set.
pub fn authorize(ctx: &AuthContext, capability: Capability) -> ApiResult<()> {
    if capability.permits(ctx.role) {
        Ok(())
    } else {
        Err(ApiError::forbidden(format!(
            "Role {} is not permitted to perform this operation",
            ctx.role
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ctx(role: Role) -> AuthContext {
        AuthContext {
            user_id: 1,
            email: "user@example.com".to_string(),
            role,
        }
    }

    #[test]
    fn test_task_capabilities() {
        for role in [Role::Admin, Role::ProjectManager, Role::Developer] {
            assert!(Capability::CreateTask.permits(role));
            assert!(Capability::UpdateTask.permits(role));
        }
        assert!(!Capability::CreateTask.permits(Role::Viewer));
        assert!(!Capability::CreateTask.permits(Role::WorkspaceOwner));

        assert!(Capability::DeleteTask.permits(Role::Admin));
        assert!(Capability::DeleteTask.permits(Role::ProjectManager));
        assert!(!Capability::DeleteTask.permits(Role::Developer));
    }

    #[test]
    fn test_project_capabilities() {
        assert!(Capability::CreateProject.permits(Role::WorkspaceOwner));
        assert!(Capability::CreateProject.permits(Role::ProjectManager));
        assert!(!Capability::CreateProject.permits(Role::Developer));

        assert!(Capability::UpdateProject.permits(Role::ProjectManager));
        assert!(!Capability::UpdateProject.permits(Role::WorkspaceOwner));

        // Only admins delete projects.
        for role in Role::all() {
            assert_eq!(Capability::DeleteProject.permits(role), role == Role::Admin);
        }
    }

    #[test]
    fn test_workspace_capabilities() {
        for cap in [
            Capability::CreateWorkspace,
            Capability::UpdateWorkspace,
            Capability::DeleteWorkspace,
        ] {
            assert!(cap.permits(Role::Admin));
            assert!(cap.permits(Role::WorkspaceOwner));
            assert!(!cap.permits(Role::ProjectManager));
            assert!(!cap.permits(Role::Developer));
            assert!(!cap.permits(Role::Viewer));
        }
    }

    #[test]
    fn test_manage_users_is_admin_only() {
        for role in Role::all() {
            assert_eq!(Capability::ManageUsers.permits(role), role == Role::Admin);
        }
    }

    #[test]
    fn test_authorize_returns_forbidden() {
        assert!(authorize(&ctx(Role::Admin), Capability::DeleteProject).is_ok());

        let err = authorize(&ctx(Role::Viewer), Capability::CreateTask).unwrap_err();
        assert_eq!(err.code, crate::error::ErrorCode::Forbidden);
    }
}
