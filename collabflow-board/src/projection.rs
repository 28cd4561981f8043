//! Board projection and drag rules.
//!
//! The projection holds the task list for the active project, each task
//! annotated with its normalized column. Drags never mutate the projection
//! directly: a permitted drag yields a [`StatusChangeRequest`] for the
//! backend, and the projection changes only on confirmation or on receipt
//! of a broadcast event.

use crate::session::Session;
use collabflow_core::{BoardColumn, Role, Task};
use collabflow_events::ChangeEvent;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

/// A task as the board sees it: raw status plus its normalized column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoardTask {
    pub id: i64,
    pub name: String,
    pub status: String,
    pub column: BoardColumn,
    pub assigned_to: Option<i64>,
}

impl From<&Task> for BoardTask {
    fn from(task: &Task) -> Self {
        Self {
            id: task.id,
            name: task.name.clone(),
            status: task.status.clone(),
            column: BoardColumn::normalize(&task.status),
            assigned_to: task.assigned_to,
        }
    }
}

/// A status transition the board wants the backend to perform.
///
/// Produced by a permitted drag; the projection stays unchanged until the
/// transition is confirmed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusChangeRequest {
    pub task_id: i64,
    pub new_status: String,
}

/// Reason a drag was rejected locally.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MoveError {
    #[error("You do not have permission to move tasks")]
    RoleNotPermitted { role: Role },

    #[error("Developers can only move tasks assigned to them")]
    NotAssignee,

    #[error("Task {0} is not on this board")]
    UnknownTask(i64),
}

/// In-memory board for a single project.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BoardProjection {
    tasks: Vec<BoardTask>,
}

/// Roles allowed to drag cards at all.
const DRAG_ROLES: [Role; 4] = [
    Role::Admin,
    Role::ProjectManager,
    Role::Developer,
    Role::Viewer,
];

impl BoardProjection {
    /// Build the projection from a fetched task list.
    pub fn from_tasks(tasks: &[Task]) -> Self {
        Self {
            tasks: tasks.iter().map(BoardTask::from).collect(),
        }
    }

    /// All tasks currently in the given column.
    pub fn column(&self, column: BoardColumn) -> Vec<&BoardTask> {
        self.tasks.iter().filter(|t| t.column == column).collect()
    }

    /// Look up a task by id.
    pub fn task(&self, task_id: i64) -> Option<&BoardTask> {
        self.tasks.iter().find(|t| t.id == task_id)
    }

    /// Number of tasks on the board.
    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    /// Whether the board is empty.
    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Check a drag and produce the transition request it implies.
    ///
    /// The permission rule: the session's role must be one of Admin,
    /// ProjectManager, Developer, or Viewer, and a Developer may only move
    /// tasks assigned to them. A rejection carries a user-facing message
    /// and produces no request; the projection is unchanged either way.
    pub fn attempt_move(
        &self,
        session: &Session,
        task_id: i64,
        target: BoardColumn,
    ) -> Result<StatusChangeRequest, MoveError> {
        let task = self
            .task(task_id)
            .ok_or(MoveError::UnknownTask(task_id))?;

        if !DRAG_ROLES.contains(&session.role) {
            return Err(MoveError::RoleNotPermitted { role: session.role });
        }

        if session.role == Role::Developer && task.assigned_to != Some(session.user_id) {
            return Err(MoveError::NotAssignee);
        }

        Ok(StatusChangeRequest {
            task_id,
            new_status: target.as_str().to_string(),
        })
    }

    /// Apply a backend-confirmed status transition.
    ///
    /// Called with the `{id, newStatus}` pair from a successful status
    /// request. Unknown ids are ignored; a later listing refresh picks
    /// them up.
    pub fn confirm_status(&mut self, task_id: i64, new_status: &str) {
        if let Some(task) = self.tasks.iter_mut().find(|t| t.id == task_id) {
            task.status = new_status.to_string();
            task.column = BoardColumn::normalize(new_status);
        } else {
            debug!(task_id, "Status confirmation for task not on board");
        }
    }

    /// Reconcile the projection against a broadcast event.
    ///
    /// Applies regardless of originator: the board's own confirmed moves
    /// are idempotent under their echoed events.
    pub fn apply_event(&mut self, event: &ChangeEvent) {
        match event {
            ChangeEvent::NewTask(task) => {
                if self.tasks.iter().all(|t| t.id != task.id) {
                    self.tasks.push(BoardTask::from(task));
                }
            }
            ChangeEvent::TaskUpdated(task) => {
                if let Some(existing) = self.tasks.iter_mut().find(|t| t.id == task.id) {
                    *existing = BoardTask::from(task);
                }
            }
            ChangeEvent::TaskStatusUpdated { id, new_status } => {
                self.confirm_status(*id, new_status);
            }
            ChangeEvent::TaskDeleted { id } => {
                self.tasks.retain(|t| t.id != *id);
            }
            ChangeEvent::NewComment(_) => {
                // Comments do not affect board placement.
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn make_task(id: i64, status: &str, assigned_to: Option<i64>) -> Task {
        Task {
            id,
            name: format!("task-{}", id),
            status: status.to_string(),
            priority: "Medium".to_string(),
            labels: None,
            due_date: None,
            assigned_to,
            project_id: 3,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn session(role: Role) -> Session {
        Session::new(7, "dana@example.com", role, "tok")
    }

    #[test]
    fn test_projection_normalizes_columns() {
        let tasks = vec![
            make_task(1, "Pending", None),
            make_task(2, "in progress", None),
            make_task(3, "archived", None),
        ];
        let board = BoardProjection::from_tasks(&tasks);

        assert_eq!(board.column(BoardColumn::Todo).len(), 2); // Pending + fallback
        assert_eq!(board.column(BoardColumn::InProgress).len(), 1);
        assert_eq!(board.column(BoardColumn::Done).len(), 0);
    }

    #[test]
    fn test_permitted_drag_produces_request_without_mutation() {
        let board = BoardProjection::from_tasks(&[make_task(1, "todo", None)]);
        let before = board.clone();

        let request = board
            .attempt_move(&session(Role::Admin), 1, BoardColumn::Done)
            .expect("admin may drag");

        assert_eq!(request, StatusChangeRequest {
            task_id: 1,
            new_status: "done".to_string(),
        });
        // No optimistic update.
        assert_eq!(board, before);
    }

    #[test]
    fn test_developer_can_move_own_task_only() {
        let board = BoardProjection::from_tasks(&[
            make_task(1, "todo", Some(7)),
            make_task(2, "todo", Some(99)),
        ]);
        let dev = session(Role::Developer);

        assert!(board.attempt_move(&dev, 1, BoardColumn::InProgress).is_ok());
        assert_eq!(
            board.attempt_move(&dev, 2, BoardColumn::InProgress),
            Err(MoveError::NotAssignee)
        );
    }

    #[test]
    fn test_rejected_drag_leaves_column_membership_unchanged() {
        let mut board = BoardProjection::from_tasks(&[make_task(2, "todo", Some(99))]);
        let dev = session(Role::Developer);

        let result = board.attempt_move(&dev, 2, BoardColumn::Done);
        assert!(result.is_err());
        assert_eq!(board.column(BoardColumn::Todo).len(), 1);
        assert_eq!(board.column(BoardColumn::Done).len(), 0);

        // And nothing to confirm: state changes only on confirmed success.
        board.confirm_status(2, "done");
        assert_eq!(board.column(BoardColumn::Done).len(), 1);
    }

    #[test]
    fn test_workspace_owner_cannot_drag() {
        let board = BoardProjection::from_tasks(&[make_task(1, "todo", None)]);
        assert_eq!(
            board.attempt_move(&session(Role::WorkspaceOwner), 1, BoardColumn::Done),
            Err(MoveError::RoleNotPermitted {
                role: Role::WorkspaceOwner
            })
        );
    }

    #[test]
    fn test_unknown_task_is_rejected() {
        let board = BoardProjection::default();
        assert_eq!(
            board.attempt_move(&session(Role::Admin), 42, BoardColumn::Done),
            Err(MoveError::UnknownTask(42))
        );
    }

    #[test]
    fn test_status_event_reconciles_in_place() {
        let mut board = BoardProjection::from_tasks(&[make_task(1, "todo", None)]);

        board.apply_event(&ChangeEvent::TaskStatusUpdated {
            id: 1,
            new_status: "done".to_string(),
        });

        let task = board.task(1).unwrap();
        assert_eq!(task.status, "done");
        assert_eq!(task.column, BoardColumn::Done);
    }

    #[test]
    fn test_event_application_is_idempotent() {
        let mut board = BoardProjection::from_tasks(&[make_task(1, "todo", None)]);
        let event = ChangeEvent::TaskStatusUpdated {
            id: 1,
            new_status: "tested".to_string(),
        };

        board.apply_event(&event);
        let after_first = board.clone();
        board.apply_event(&event);
        assert_eq!(board, after_first);
    }

    #[test]
    fn test_new_task_and_delete_events() {
        let mut board = BoardProjection::default();

        board.apply_event(&ChangeEvent::NewTask(make_task(5, "Pending", None)));
        assert_eq!(board.len(), 1);
        assert_eq!(board.task(5).unwrap().column, BoardColumn::Todo);

        // Duplicate create events are ignored.
        board.apply_event(&ChangeEvent::NewTask(make_task(5, "Pending", None)));
        assert_eq!(board.len(), 1);

        board.apply_event(&ChangeEvent::TaskDeleted { id: 5 });
        assert!(board.is_empty());
    }

    #[test]
    fn test_confirm_round_trips_through_normalization() {
        // The request produced by a drag, when echoed back as newStatus,
        // lands the task in the dragged-to column.
        let mut board = BoardProjection::from_tasks(&[make_task(1, "todo", None)]);
        let request = board
            .attempt_move(&session(Role::Viewer), 1, BoardColumn::InProgress)
            .unwrap();

        board.confirm_status(request.task_id, &request.new_status);
        assert_eq!(board.task(1).unwrap().column, BoardColumn::InProgress);
    }
}
