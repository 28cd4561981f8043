//! Task comment routes.
//!
//! Reads return the five most recent comments, newest first, with the
//! author's id and email joined in. New comments are broadcast with the
//! same author shape.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use collabflow_events::ChangeEvent;
use std::sync::Arc;

use crate::{
    auth::AuthContext,
    db::DbClient,
    error::{ApiError, ApiResult},
    types::{CommentResponse, CommentsResponse, CreateCommentRequest},
    ws::WsState,
};

// ============================================================================
// SHARED STATE
// ============================================================================

/// Shared application state for comment routes.
#[derive(Clone)]
pub struct CommentState {
    pub db: DbClient,
    pub ws: Arc<WsState>,
}

impl CommentState {
    pub fn new(db: DbClient, ws: Arc<WsState>) -> Self {
        Self { db, ws }
    }
}

// ============================================================================
// ROUTE HANDLERS
// ============================================================================

/// GET /api/comments/:task_id - Recent comments on a task
pub async fn list_comments(
    State(state): State<Arc<CommentState>>,
    Path(task_id): Path<i64>,
) -> ApiResult<impl IntoResponse> {
    if state.db.task_get(task_id).await?.is_none() {
        return Err(ApiError::task_not_found(task_id));
    }

    let comments = state.db.comment_list_recent(task_id).await?;

    Ok(Json(CommentsResponse {
        message: "Comments retrieved successfully".to_string(),
        comments,
    }))
}

/// POST /api/comments/:task_id - Add a comment as the authenticated user
pub async fn create_comment(
    State(state): State<Arc<CommentState>>,
    auth: AuthContext,
    Path(task_id): Path<i64>,
    Json(req): Json<CreateCommentRequest>,
) -> ApiResult<impl IntoResponse> {
    if req.content.trim().is_empty() {
        return Err(ApiError::missing_field("content"));
    }

    if state.db.task_get(task_id).await?.is_none() {
        return Err(ApiError::task_not_found(task_id));
    }

    let comment = state
        .db
        .comment_create(task_id, auth.user_id, &req.content)
        .await?;

    state.ws.broadcast(ChangeEvent::NewComment(comment.clone()));

    tracing::info!(task_id, user_id = auth.user_id, "Comment added");

    Ok((
        StatusCode::CREATED,
        Json(CommentResponse {
            message: "Comment added successfully".to_string(),
            comment,
        }),
    ))
}

// ============================================================================
// ROUTER CREATION
// ============================================================================

pub fn create_router(state: Arc<CommentState>) -> Router {
    Router::new()
        .route("/:task_id", get(list_comments).post(create_comment))
        .with_state(state)
}
