//! CollabFlow Board - Kanban Projection
//!
//! This crate models the client-side kanban board as a pure projection of
//! the task list. It owns three rules the API and clients share:
//!
//! 1. Status strings normalize onto four columns (unknowns land in todo).
//! 2. A drag is permission-checked locally before any request is produced,
//!    and local state only changes once the backend confirms.
//! 3. Incoming status-change events reconcile the projection in place,
//!    regardless of which client originated them.
//!
//! Session state is an explicit value with a JSON load/save boundary, not
//! ambient global state.

pub mod projection;
pub mod session;

pub use projection::{BoardProjection, BoardTask, MoveError, StatusChangeRequest};
pub use session::{Session, SessionError};
