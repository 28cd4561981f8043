//! CollabFlow Core - Shared Entity Types
//!
//! This crate defines the data model shared by every CollabFlow crate:
//! users, workspaces, projects, tasks, comments, and the enums that
//! classify them. It contains no I/O; persistence and transport live in
//! the storage and API crates.

pub mod entities;
pub mod enums;

pub use entities::{
    CommentAuthor, CommentWithAuthor, Project, Task, TaskComment, User, UserSummary, Workspace,
    WorkspaceInvite,
};
pub use enums::{BoardColumn, Role, RoleParseError};

/// Entity identifier type.
///
/// The store assigns sequential integer ids; cache keys and wire payloads
/// embed them verbatim.
pub type EntityId = i64;
