//! Workspace routes.
//!
//! The workspace listing is cached under a single key with a long TTL;
//! every workspace or invite mutation evicts it before responding.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, put},
    Json, Router,
};
use collabflow_cache::Mutation;
use std::sync::Arc;

use crate::{
    auth::AuthContext,
    authz::{authorize, Capability},
    db::DbClient,
    error::{ApiError, ApiResult},
    listings::CachedListings,
    routes::cached_json,
    types::{
        CreateWorkspaceRequest, MessageResponse, UpdateWorkspaceRequest, WorkspaceResponse,
    },
};

// ============================================================================
// SHARED STATE
// ============================================================================

/// Shared application state for workspace routes.
#[derive(Clone)]
pub struct WorkspaceState {
    pub db: DbClient,
    pub listings: CachedListings,
}

impl WorkspaceState {
    pub fn new(db: DbClient, listings: CachedListings) -> Self {
        Self { db, listings }
    }
}

// ============================================================================
// ROUTE HANDLERS
// ============================================================================

/// POST /api/workspaces - Create a workspace with optional member invites
pub async fn create_workspace(
    State(state): State<Arc<WorkspaceState>>,
    auth: AuthContext,
    Json(req): Json<CreateWorkspaceRequest>,
) -> ApiResult<impl IntoResponse> {
    authorize(&auth, Capability::CreateWorkspace)?;

    if req.name.trim().is_empty() {
        return Err(ApiError::missing_field("name"));
    }

    let workspace = state
        .db
        .workspace_create(&req.name, auth.user_id, req.branding_logo.as_deref())
        .await?;

    for email in &req.members {
        if email.trim().is_empty() {
            continue;
        }
        state.db.invite_create(email, workspace.id).await?;
    }

    state.listings.invalidate(Mutation::WorkspaceChanged).await;

    tracing::info!(workspace_id = workspace.id, "Workspace created");

    Ok((
        StatusCode::CREATED,
        Json(WorkspaceResponse {
            message: "Workspace created successfully".to_string(),
            workspace,
        }),
    ))
}

/// GET /api/workspaces - List workspaces with invites (cached)
pub async fn list_workspaces(
    State(state): State<Arc<WorkspaceState>>,
) -> ApiResult<impl IntoResponse> {
    let payload = state.listings.workspaces().await?;
    Ok(cached_json(payload))
}

/// PUT /api/workspaces/:id - Update a workspace
pub async fn update_workspace(
    State(state): State<Arc<WorkspaceState>>,
    auth: AuthContext,
    Path(workspace_id): Path<i64>,
    Json(req): Json<UpdateWorkspaceRequest>,
) -> ApiResult<impl IntoResponse> {
    authorize(&auth, Capability::UpdateWorkspace)?;

    let workspace = state
        .db
        .workspace_update(workspace_id, &req)
        .await?
        .ok_or_else(|| ApiError::workspace_not_found(workspace_id))?;

    state.listings.invalidate(Mutation::WorkspaceChanged).await;

    Ok(Json(WorkspaceResponse {
        message: "Workspace updated successfully".to_string(),
        workspace,
    }))
}

/// DELETE /api/workspaces/:id - Delete a workspace
pub async fn delete_workspace(
    State(state): State<Arc<WorkspaceState>>,
    auth: AuthContext,
    Path(workspace_id): Path<i64>,
) -> ApiResult<impl IntoResponse> {
    authorize(&auth, Capability::DeleteWorkspace)?;

    if !state.db.workspace_delete(workspace_id).await? {
        return Err(ApiError::workspace_not_found(workspace_id));
    }

    state.listings.invalidate(Mutation::WorkspaceChanged).await;

    Ok(Json(MessageResponse::new("Workspace deleted successfully")))
}

// ============================================================================
// ROUTER CREATION
// ============================================================================

pub fn create_router(state: Arc<WorkspaceState>) -> Router {
    Router::new()
        .route("/", get(list_workspaces).post(create_workspace))
        .route("/:id", put(update_workspace).delete(delete_workspace))
        .with_state(state)
}
