//! Task routes.
//!
//! Every task mutation runs the same sequence: authorize, write, evict
//! the project's task listing key, broadcast the change event, respond.
//! The status route's response body and its broadcast payload carry the
//! same `{id, newStatus}` pair.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, put},
    Json, Router,
};
use collabflow_cache::Mutation;
use collabflow_events::ChangeEvent;
use std::sync::Arc;

use crate::{
    auth::AuthContext,
    authz::{authorize, Capability},
    db::DbClient,
    error::{ApiError, ApiResult},
    listings::CachedListings,
    routes::cached_json,
    types::{
        CreateTaskRequest, MessageResponse, StatusChangeRequest, StatusChangeResponse,
        TaskListQuery, TaskResponse, UpdateTaskRequest,
    },
    ws::WsState,
};

// ============================================================================
// SHARED STATE
// ============================================================================

/// Shared application state for task routes.
#[derive(Clone)]
pub struct TaskState {
    pub db: DbClient,
    pub ws: Arc<WsState>,
    pub listings: CachedListings,
}

impl TaskState {
    pub fn new(db: DbClient, ws: Arc<WsState>, listings: CachedListings) -> Self {
        Self { db, ws, listings }
    }
}

// ============================================================================
// ROUTE HANDLERS
// ============================================================================

/// POST /api/tasks - Create a task
pub async fn create_task(
    State(state): State<Arc<TaskState>>,
    auth: AuthContext,
    Json(req): Json<CreateTaskRequest>,
) -> ApiResult<impl IntoResponse> {
    authorize(&auth, Capability::CreateTask)?;

    if req.name.trim().is_empty() {
        return Err(ApiError::missing_field("name"));
    }

    if state.db.project_get(req.project_id).await?.is_none() {
        return Err(ApiError::project_not_found(req.project_id));
    }

    let task = state.db.task_create(&req).await?;

    state
        .listings
        .invalidate(Mutation::TaskChanged {
            project_id: task.project_id,
        })
        .await;
    state.ws.broadcast(ChangeEvent::NewTask(task.clone()));

    tracing::info!(task_id = task.id, project_id = task.project_id, "Task created");

    Ok((
        StatusCode::CREATED,
        Json(TaskResponse {
            message: "Task created successfully".to_string(),
            task,
        }),
    ))
}

/// GET /api/tasks - List tasks with optional filters (cached)
pub async fn list_tasks(
    State(state): State<Arc<TaskState>>,
    Query(query): Query<TaskListQuery>,
) -> ApiResult<impl IntoResponse> {
    let payload = state.listings.tasks(&query).await?;
    Ok(cached_json(payload))
}

/// PUT /api/tasks/:id - Update a task's fields
pub async fn update_task(
    State(state): State<Arc<TaskState>>,
    auth: AuthContext,
    Path(task_id): Path<i64>,
    Json(req): Json<UpdateTaskRequest>,
) -> ApiResult<impl IntoResponse> {
    authorize(&auth, Capability::UpdateTask)?;

    let task = state
        .db
        .task_update(task_id, &req)
        .await?
        .ok_or_else(|| ApiError::task_not_found(task_id))?;

    state
        .listings
        .invalidate(Mutation::TaskChanged {
            project_id: task.project_id,
        })
        .await;
    state.ws.broadcast(ChangeEvent::TaskUpdated(task.clone()));

    Ok(Json(TaskResponse {
        message: "Task updated successfully".to_string(),
        task,
    }))
}

/// PUT /api/tasks/:id/status - Status-only transition (board drag)
pub async fn update_task_status(
    State(state): State<Arc<TaskState>>,
    auth: AuthContext,
    Path(task_id): Path<i64>,
    Json(req): Json<StatusChangeRequest>,
) -> ApiResult<impl IntoResponse> {
    authorize(&auth, Capability::UpdateTask)?;

    if req.new_status.trim().is_empty() {
        return Err(ApiError::missing_field("newStatus"));
    }

    let task = state
        .db
        .task_set_status(task_id, &req.new_status)
        .await?
        .ok_or_else(|| ApiError::task_not_found(task_id))?;

    state
        .listings
        .invalidate(Mutation::TaskChanged {
            project_id: task.project_id,
        })
        .await;

    // Broadcast and respond with the same pair; clients reconcile on either.
    state.ws.broadcast(ChangeEvent::TaskStatusUpdated {
        id: task.id,
        new_status: req.new_status.clone(),
    });

    Ok(Json(StatusChangeResponse {
        id: task.id,
        new_status: req.new_status,
    }))
}

/// DELETE /api/tasks/:id - Delete a task
pub async fn delete_task(
    State(state): State<Arc<TaskState>>,
    auth: AuthContext,
    Path(task_id): Path<i64>,
) -> ApiResult<impl IntoResponse> {
    authorize(&auth, Capability::DeleteTask)?;

    let task = state
        .db
        .task_delete(task_id)
        .await?
        .ok_or_else(|| ApiError::task_not_found(task_id))?;

    state
        .listings
        .invalidate(Mutation::TaskChanged {
            project_id: task.project_id,
        })
        .await;
    state.ws.broadcast(ChangeEvent::TaskDeleted { id: task.id });

    Ok(Json(MessageResponse::new("Task deleted successfully")))
}

// ============================================================================
// ROUTER CREATION
// ============================================================================

pub fn create_router(state: Arc<TaskState>) -> Router {
    Router::new()
        .route("/", get(list_tasks).post(create_task))
        .route("/:id", put(update_task).delete(delete_task))
        .route("/:id/status", put(update_task_status))
        .with_state(state)
}
