//! Enumerations for the CollabFlow data model.
//!
//! Roles gate mutations; board columns are the normalized projection of the
//! free-form task status strings stored by the backend.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

// ============================================================================
// ROLE
// ============================================================================

/// User role within the system.
///
/// Roles are stored and transmitted as their display strings (e.g.
/// `"ProjectManager"`); parsing is case-insensitive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Role {
    /// Full administrative access.
    Admin,

    /// Owns one or more workspaces.
    WorkspaceOwner,

    /// Manages projects and their tasks.
    ProjectManager,

    /// Works on assigned tasks. Default role for new accounts.
    Developer,

    /// Read-only participant.
    Viewer,
}

impl Default for Role {
    fn default() -> Self {
        Role::Developer
    }
}

impl Role {
    /// Get the canonical string form of this role.
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "Admin",
            Role::WorkspaceOwner => "WorkspaceOwner",
            Role::ProjectManager => "ProjectManager",
            Role::Developer => "Developer",
            Role::Viewer => "Viewer",
        }
    }

    /// All roles, for iteration in tests and capability tables.
    pub fn all() -> [Role; 5] {
        [
            Role::Admin,
            Role::WorkspaceOwner,
            Role::ProjectManager,
            Role::Developer,
            Role::Viewer,
        ]
    }
}

/// Error returned when a role string cannot be parsed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown role: {0}")]
pub struct RoleParseError(pub String);

impl FromStr for Role {
    type Err = RoleParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "admin" => Ok(Role::Admin),
            "workspaceowner" | "workspace_owner" | "owner" => Ok(Role::WorkspaceOwner),
            "projectmanager" | "project_manager" | "manager" => Ok(Role::ProjectManager),
            "developer" => Ok(Role::Developer),
            "viewer" => Ok(Role::Viewer),
            other => Err(RoleParseError(other.to_string())),
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// BOARD COLUMN
// ============================================================================

/// Normalized kanban column for a task.
///
/// Task status is stored as a free-form string; the board projects it onto
/// one of four columns. Unrecognized statuses land in `Todo` and the
/// fallback is logged so data-quality drift is visible.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BoardColumn {
    Todo,
    InProgress,
    Done,
    Tested,
}

impl BoardColumn {
    /// Normalize a raw status string to a column.
    ///
    /// Matching is case-insensitive. `"pending"` maps to `Todo`; both
    /// `"in progress"` and `"in_progress"` map to `InProgress`. Anything
    /// unrecognized maps to `Todo` with a warning.
    pub fn normalize(raw: &str) -> BoardColumn {
        match raw.trim().to_lowercase().as_str() {
            "todo" | "pending" => BoardColumn::Todo,
            "in progress" | "in_progress" => BoardColumn::InProgress,
            "done" => BoardColumn::Done,
            "tested" => BoardColumn::Tested,
            other => {
                tracing::warn!(status = other, "Unrecognized task status, defaulting to todo");
                BoardColumn::Todo
            }
        }
    }

    /// Canonical status string for this column.
    ///
    /// `normalize(column.as_str())` always returns the same column.
    pub fn as_str(&self) -> &'static str {
        match self {
            BoardColumn::Todo => "todo",
            BoardColumn::InProgress => "in_progress",
            BoardColumn::Done => "done",
            BoardColumn::Tested => "tested",
        }
    }
}

impl fmt::Display for BoardColumn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_role_round_trip() {
        for role in Role::all() {
            let parsed: Role = role.as_str().parse().expect("canonical form parses");
            assert_eq!(parsed, role);
        }
    }

    #[test]
    fn test_role_parse_aliases() {
        assert_eq!("manager".parse::<Role>(), Ok(Role::ProjectManager));
        assert_eq!("owner".parse::<Role>(), Ok(Role::WorkspaceOwner));
        assert_eq!("ADMIN".parse::<Role>(), Ok(Role::Admin));
        assert!("superuser".parse::<Role>().is_err());
    }

    #[test]
    fn test_default_role_is_developer() {
        assert_eq!(Role::default(), Role::Developer);
    }

    #[test]
    fn test_normalize_known_statuses() {
        assert_eq!(BoardColumn::normalize("Pending"), BoardColumn::Todo);
        assert_eq!(BoardColumn::normalize("todo"), BoardColumn::Todo);
        assert_eq!(BoardColumn::normalize("in progress"), BoardColumn::InProgress);
        assert_eq!(BoardColumn::normalize("in_progress"), BoardColumn::InProgress);
        assert_eq!(BoardColumn::normalize("done"), BoardColumn::Done);
        assert_eq!(BoardColumn::normalize("DONE"), BoardColumn::Done);
        assert_eq!(BoardColumn::normalize("Done"), BoardColumn::Done);
        assert_eq!(BoardColumn::normalize("tested"), BoardColumn::Tested);
    }

    #[test]
    fn test_normalize_unknown_status_falls_back_to_todo() {
        assert_eq!(BoardColumn::normalize("archived"), BoardColumn::Todo);
        assert_eq!(BoardColumn::normalize(""), BoardColumn::Todo);
        assert_eq!(BoardColumn::normalize("  blocked  "), BoardColumn::Todo);
    }

    #[test]
    fn test_normalize_canonical_round_trip() {
        for column in [
            BoardColumn::Todo,
            BoardColumn::InProgress,
            BoardColumn::Done,
            BoardColumn::Tested,
        ] {
            assert_eq!(BoardColumn::normalize(column.as_str()), column);
        }
    }

    proptest! {
        #[test]
        fn prop_normalize_never_panics(raw in ".*") {
            let _ = BoardColumn::normalize(&raw);
        }

        #[test]
        fn prop_normalize_is_case_insensitive(raw in "[a-zA-Z _]{0,24}") {
            prop_assert_eq!(
                BoardColumn::normalize(&raw),
                BoardColumn::normalize(&raw.to_uppercase())
            );
        }
    }
}
