//! Request and response types for the REST API.
//!
//! Success bodies follow the `{message, <entity-or-list>}` envelope; error
//! bodies are [`crate::error::ApiError`]. Listing envelopes double as the
//! cached payload shape: the serialized envelope is what the cache stores.

use chrono::NaiveDate;
use collabflow_core::{
    CommentWithAuthor, Project, Role, Task, UserSummary, Workspace, WorkspaceInvite,
};
use serde::{Deserialize, Serialize};

// ============================================================================
// AUTH
// ============================================================================

#[derive(Debug, Clone, Deserialize)]
pub struct RegisterRequest {
    pub name: String,
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub role: Option<Role>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisterResponse {
    pub message: String,
    pub user: UserSummary,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginResponse {
    pub message: String,
    pub token: String,
    pub user: UserSummary,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProfileResponse {
    pub message: String,
    pub user: UserSummary,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UsersResponse {
    pub message: String,
    pub users: Vec<UserSummary>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UpdateUserRoleRequest {
    pub role: Role,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserResponse {
    pub message: String,
    pub user: UserSummary,
}

// ============================================================================
// WORKSPACES
// ============================================================================

#[derive(Debug, Clone, Deserialize)]
pub struct CreateWorkspaceRequest {
    pub name: String,
    #[serde(default)]
    pub branding_logo: Option<String>,
    /// Emails to invite; an invite row is recorded per address.
    #[serde(default)]
    pub members: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UpdateWorkspaceRequest {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub branding_logo: Option<String>,
}

/// A workspace with its invites embedded, as listed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkspaceWithInvites {
    #[serde(flatten)]
    pub workspace: Workspace,
    pub invites: Vec<WorkspaceInvite>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkspaceResponse {
    pub message: String,
    pub workspace: Workspace,
}

/// Cached payload shape for `GET /api/workspaces`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkspacesListing {
    pub message: String,
    pub workspaces: Vec<WorkspaceWithInvites>,
}

// ============================================================================
// PROJECTS
// ============================================================================

#[derive(Debug, Clone, Deserialize)]
pub struct CreateProjectRequest {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub deadline: Option<NaiveDate>,
    pub workspace_id: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UpdateProjectRequest {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub deadline: Option<NaiveDate>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectResponse {
    pub message: String,
    pub project: Project,
}

/// Cached payload shape for `GET /api/projects/workspace/:id`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectsListing {
    pub message: String,
    pub projects: Vec<Project>,
}

// ============================================================================
// TASKS
// ============================================================================

#[derive(Debug, Clone, Deserialize)]
pub struct CreateTaskRequest {
    pub name: String,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub priority: Option<String>,
    #[serde(default)]
    pub labels: Option<String>,
    #[serde(default)]
    pub due_date: Option<NaiveDate>,
    #[serde(default)]
    pub assigned_to: Option<i64>,
    pub project_id: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UpdateTaskRequest {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub priority: Option<String>,
}

/// Query parameters for `GET /api/tasks`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskListQuery {
    #[serde(default)]
    pub project_id: Option<i64>,
    #[serde(default)]
    pub priority: Option<String>,
    #[serde(default)]
    pub due_date: Option<NaiveDate>,
}

/// Body for `PUT /api/tasks/:id/status`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusChangeRequest {
    pub new_status: String,
}

/// Response for a status transition: exactly the pair that is broadcast.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusChangeResponse {
    pub id: i64,
    pub new_status: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskResponse {
    pub message: String,
    pub task: Task,
}

/// Cached payload shape for `GET /api/tasks`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TasksListing {
    pub message: String,
    pub tasks: Vec<Task>,
}

// ============================================================================
// COMMENTS
// ============================================================================

#[derive(Debug, Clone, Deserialize)]
pub struct CreateCommentRequest {
    pub content: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommentResponse {
    pub message: String,
    pub comment: CommentWithAuthor,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommentsResponse {
    pub message: String,
    pub comments: Vec<CommentWithAuthor>,
}

// ============================================================================
// STATS & MISC
// ============================================================================

/// Dashboard statistics.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Stats {
    pub users: i64,
    pub tasks: i64,
    pub workspaces: i64,
    pub projects: i64,
    pub recent_projects: Vec<Project>,
    pub recent_tasks: Vec<Task>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatsResponse {
    pub message: String,
    pub stats: Stats,
}

/// Plain `{message}` envelope for deletes and similar acknowledgements.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_task_query_uses_camel_case() {
        let query: TaskListQuery =
            serde_json::from_str(r#"{"projectId": 3, "priority": "High", "dueDate": "2026-09-01"}"#)
                .unwrap();
        assert_eq!(query.project_id, Some(3));
        assert_eq!(query.priority.as_deref(), Some("High"));
        assert_eq!(query.due_date, NaiveDate::from_ymd_opt(2026, 9, 1));
    }

    #[test]
    fn test_status_change_wire_shape() {
        let req: StatusChangeRequest = serde_json::from_str(r#"{"newStatus": "done"}"#).unwrap();
        assert_eq!(req.new_status, "done");

        let resp = StatusChangeResponse {
            id: 42,
            new_status: "done".to_string(),
        };
        let value = serde_json::to_value(&resp).unwrap();
        assert_eq!(value["id"], 42);
        assert_eq!(value["newStatus"], "done");
    }

    #[test]
    fn test_workspace_with_invites_flattens() {
        use chrono::Utc;
        let listed = WorkspaceWithInvites {
            workspace: Workspace {
                id: 5,
                name: "Platform".to_string(),
                owner_id: 1,
                branding_logo: None,
                created_at: Utc::now(),
                updated_at: Utc::now(),
            },
            invites: vec![],
        };
        let value = serde_json::to_value(&listed).unwrap();
        assert_eq!(value["id"], 5);
        assert_eq!(value["name"], "Platform");
        assert!(value["invites"].as_array().unwrap().is_empty());
    }
}
