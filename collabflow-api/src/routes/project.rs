//! Project routes.
//!
//! Project listings are cached per workspace; a mutation evicts only the
//! owning workspace's key, so other workspaces keep their cached entries.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post, put},
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
    types::{CreateProjectRequest, MessageResponse, ProjectResponse, UpdateProjectRequest},
};

// ============================================================================
// SHARED STATE
// ============================================================================

/// Shared application state for project routes.
#[derive(Clone)]
pub struct ProjectState {
    pub db: DbClient,
    pub listings: CachedListings,
}

impl ProjectState {
    pub fn new(db: DbClient, listings: CachedListings) -> Self {
        Self { db, listings }
    }
}

// ============================================================================
// ROUTE HANDLERS
// ============================================================================

/// POST /api/projects - Create a project
pub async fn create_project(
    State(state): State<Arc<ProjectState>>,
    auth: AuthContext,
    Json(req): Json<CreateProjectRequest>,
) -> ApiResult<impl IntoResponse> {
    authorize(&auth, Capability::CreateProject)?;

    if req.name.trim().is_empty() {
        return Err(ApiError::missing_field("name"));
    }

    if state.db.workspace_get(req.workspace_id).await?.is_none() {
        return Err(ApiError::workspace_not_found(req.workspace_id));
    }

    let project = state.db.project_create(&req).await?;

    state
        .listings
        .invalidate(Mutation::ProjectChanged {
            workspace_id: project.workspace_id,
        })
        .await;

    tracing::info!(project_id = project.id, workspace_id = project.workspace_id, "Project created");

    Ok((
        StatusCode::CREATED,
        Json(ProjectResponse {
            message: "Project created successfully".to_string(),
            project,
        }),
    ))
}

/// GET /api/projects/workspace/:id - List a workspace's projects (cached)
pub async fn list_projects(
    State(state): State<Arc<ProjectState>>,
    Path(workspace_id): Path<i64>,
) -> ApiResult<impl IntoResponse> {
    let payload = state.listings.projects(workspace_id).await?;
    Ok(cached_json(payload))
}

/// PUT /api/projects/:id - Update a project
pub async fn update_project(
    State(state): State<Arc<ProjectState>>,
    auth: AuthContext,
    Path(project_id): Path<i64>,
    Json(req): Json<UpdateProjectRequest>,
) -> ApiResult<impl IntoResponse> {
    authorize(&auth, Capability::UpdateProject)?;

    let project = state
        .db
        .project_update(project_id, &req)
        .await?
        .ok_or_else(|| ApiError::project_not_found(project_id))?;

    state
        .listings
        .invalidate(Mutation::ProjectChanged {
            workspace_id: project.workspace_id,
        })
        .await;

    Ok(Json(ProjectResponse {
        message: "Project updated successfully".to_string(),
        project,
    }))
}

/// DELETE /api/projects/:id - Delete a project
pub async fn delete_project(
    State(state): State<Arc<ProjectState>>,
    auth: AuthContext,
    Path(project_id): Path<i64>,
) -> ApiResult<impl IntoResponse> {
    authorize(&auth, Capability::DeleteProject)?;

    let project = state
        .db
        .project_delete(project_id)
        .await?
        .ok_or_else(|| ApiError::project_not_found(project_id))?;

    state
        .listings
        .invalidate(Mutation::ProjectChanged {
            workspace_id: project.workspace_id,
        })
        .await;

    Ok(Json(MessageResponse::new("Project deleted successfully")))
}

// ============================================================================
// ROUTER CREATION
// ============================================================================

pub fn create_router(state: Arc<ProjectState>) -> Router {
    Router::new()
        .route("/", post(create_project))
        .route("/workspace/:id", get(list_projects))
        .route("/:id", put(update_project).delete(delete_project))
        .with_state(state)
}
