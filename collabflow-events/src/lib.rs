//! CollabFlow Change Events
//!
//! This crate defines the events broadcast to connected clients after a
//! mutation commits. Events are ephemeral: they are never persisted, carry
//! no sequence numbers, and are reconcilable by entity id on the client.
//!
//! ## Wire format
//!
//! Events serialize as `{"event": "<name>", "data": {...}}`. Full-record
//! events (`new-task`, `task-updated`, `new-comment`) carry the entire
//! entity; `task-status-updated` and `task-deleted` carry minimal payloads.

use collabflow_core::{CommentWithAuthor, Task};
use serde::{Deserialize, Serialize};

/// A change event broadcast over the push channel.
///
/// Every successful mutation on a task or comment emits exactly one of
/// these to all connected clients, including the originator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data")]
pub enum ChangeEvent {
    /// A task was created. Carries the full created record.
    #[serde(rename = "new-task")]
    NewTask(Task),

    /// A task's fields were updated. Carries the full updated record.
    #[serde(rename = "task-updated")]
    TaskUpdated(Task),

    /// A task's status changed. Carries only the id and the new status,
    /// exactly as returned in the HTTP response for the same transition.
    #[serde(rename = "task-status-updated", rename_all = "camelCase")]
    TaskStatusUpdated { id: i64, new_status: String },

    /// A task was deleted.
    #[serde(rename = "task-deleted")]
    TaskDeleted { id: i64 },

    /// A comment was posted. Carries the full comment with its author.
    #[serde(rename = "new-comment")]
    NewComment(CommentWithAuthor),
}

impl ChangeEvent {
    /// Get the wire name of this event for logging.
    pub fn event_type(&self) -> &'static str {
        match self {
            ChangeEvent::NewTask(_) => "new-task",
            ChangeEvent::TaskUpdated(_) => "task-updated",
            ChangeEvent::TaskStatusUpdated { .. } => "task-status-updated",
            ChangeEvent::TaskDeleted { .. } => "task-deleted",
            ChangeEvent::NewComment(_) => "new-comment",
        }
    }
}
