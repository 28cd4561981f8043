//! Entity definitions for the CollabFlow data model.
//!
//! These structs mirror the relational schema: users belong to workspaces,
//! workspaces contain projects, projects contain tasks, tasks carry
//! comments. All ids are store-assigned integers.

use crate::enums::Role;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

// ============================================================================
// USER
// ============================================================================

/// A registered user account.
///
/// The password hash never leaves the API layer; wire-facing views use
/// [`UserSummary`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub name: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub role: Role,
    pub is_verified: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Public view of a user, safe to embed in responses and tokens.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserSummary {
    pub id: i64,
    pub email: String,
    pub role: Role,
}

impl From<&User> for UserSummary {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            email: user.email.clone(),
            role: user.role,
        }
    }
}

// ============================================================================
// WORKSPACE
// ============================================================================

/// A workspace groups projects and members.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Workspace {
    pub id: i64,
    pub name: String,
    pub owner_id: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub branding_logo: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A pending membership invite recorded at workspace creation.
///
/// Email delivery is handled outside this system; the invite row is the
/// source of truth for acceptance state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkspaceInvite {
    pub id: i64,
    pub email: String,
    pub workspace_id: i64,
    pub role: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
    pub accepted: bool,
}

impl WorkspaceInvite {
    /// Default role string for new invites.
    pub const DEFAULT_ROLE: &'static str = "Member";
}

// ============================================================================
// PROJECT
// ============================================================================

/// A project within a workspace.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Project {
    pub id: i64,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deadline: Option<NaiveDate>,
    pub workspace_id: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// ============================================================================
// TASK
// ============================================================================

/// A task within a project.
///
/// `status` is stored verbatim; the board layer normalizes it for display.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    pub id: i64,
    pub name: String,
    pub status: String,
    pub priority: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub labels: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub due_date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assigned_to: Option<i64>,
    pub project_id: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Task {
    /// Status assigned to tasks created without one.
    pub const DEFAULT_STATUS: &'static str = "Todo";

    /// Priority assigned to tasks created without one.
    pub const DEFAULT_PRIORITY: &'static str = "Medium";
}

// ============================================================================
// TASK COMMENT
// ============================================================================

/// A comment on a task.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskComment {
    pub id: i64,
    pub content: String,
    pub task_id: i64,
    pub user_id: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Denormalized comment author embedded in comment payloads.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommentAuthor {
    pub id: i64,
    pub email: String,
}

/// A comment together with its author, as listed and broadcast.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommentWithAuthor {
    #[serde(flatten)]
    pub comment: TaskComment,
    pub author: CommentAuthor,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_user() -> User {
        User {
            id: 7,
            name: "Dana".to_string(),
            email: "dana@example.com".to_string(),
            password_hash: "$2b$10$secret".to_string(),
            role: Role::Developer,
            is_verified: true,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_password_hash_never_serialized() {
        let json = serde_json::to_string(&sample_user()).expect("serialize");
        assert!(!json.contains("password_hash"));
        assert!(!json.contains("$2b$10$secret"));
    }

    #[test]
    fn test_user_summary_projection() {
        let user = sample_user();
        let summary = UserSummary::from(&user);
        assert_eq!(summary.id, 7);
        assert_eq!(summary.email, "dana@example.com");
        assert_eq!(summary.role, Role::Developer);
    }

    #[test]
    fn test_comment_with_author_flattens() {
        let comment = CommentWithAuthor {
            comment: TaskComment {
                id: 1,
                content: "looks good".to_string(),
                task_id: 4,
                user_id: 7,
                created_at: Utc::now(),
                updated_at: Utc::now(),
            },
            author: CommentAuthor {
                id: 7,
                email: "dana@example.com".to_string(),
            },
        };

        let value = serde_json::to_value(&comment).expect("serialize");
        // Flattened: comment fields at the top level, author nested.
        assert_eq!(value["content"], "looks good");
        assert_eq!(value["author"]["id"], 7);
    }

    #[test]
    fn test_task_defaults() {
        assert_eq!(Task::DEFAULT_STATUS, "Todo");
        assert_eq!(Task::DEFAULT_PRIORITY, "Medium");
    }
}
