//! REST API routes.
//!
//! Route handlers are organized by entity. Assembly happens in
//! [`create_app`]: public routes (health, register, login) are merged
//! with the protected surface, which sits behind the auth middleware.
//! Rate limiting and CORS wrap the whole router.

pub mod auth;
pub mod comment;
pub mod health;
pub mod project;
pub mod stats;
pub mod task;
pub mod workspace;

use std::sync::Arc;
use std::time::Duration;

use axum::{
    http::{header, HeaderValue, Method},
    middleware::from_fn_with_state,
    response::IntoResponse,
    routing::get,
    Router,
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::auth::AuthConfig;
use crate::config::ApiConfig;
use crate::db::DbClient;
use crate::listings::CachedListings;
use crate::middleware::{
    auth_middleware, rate_limit_middleware, AuthMiddlewareState, RateLimitState,
};
use crate::ws::{ws_handler, WsState};

/// Respond with an already-serialized JSON payload.
///
/// Listing handlers serve the cached string as-is so hits are
/// byte-identical to the read that populated them.
pub(crate) fn cached_json(payload: String) -> impl IntoResponse {
    ([(header::CONTENT_TYPE, "application/json")], payload)
}

/// Build the CORS layer from configuration.
///
/// With no configured origins every origin is allowed (development).
/// Configured origins switch the layer to an explicit allow list.
fn cors_layer(config: &ApiConfig) -> CorsLayer {
    let layer = CorsLayer::new()
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
        .max_age(Duration::from_secs(config.cors_max_age_secs));

    if config.cors_origins.is_empty() {
        layer.allow_origin(Any)
    } else {
        let origins: Vec<HeaderValue> = config
            .cors_origins
            .iter()
            .filter_map(|origin| origin.parse().ok())
            .collect();
        layer.allow_origin(origins)
    }
}

/// Assemble the full application router.
pub fn create_app(
    db: DbClient,
    ws: Arc<WsState>,
    auth_config: AuthConfig,
    api_config: &ApiConfig,
) -> Router {
    let listings = CachedListings::new(db.clone());

    let auth_state = Arc::new(auth::AuthState::new(db.clone(), Arc::new(auth_config.clone())));
    let workspace_state = Arc::new(workspace::WorkspaceState::new(db.clone(), listings.clone()));
    let project_state = Arc::new(project::ProjectState::new(db.clone(), listings.clone()));
    let task_state = Arc::new(task::TaskState::new(db.clone(), ws.clone(), listings));
    let comment_state = Arc::new(comment::CommentState::new(db.clone(), ws.clone()));
    let stats_state = Arc::new(stats::StatsState::new(db.clone()));

    let auth_mw_state = AuthMiddlewareState::new(auth_config);
    let rate_limit_state = RateLimitState::new(api_config.clone());

    let protected = Router::new()
        .nest("/api/auth", auth::protected_router(auth_state.clone()))
        .nest("/api/workspaces", workspace::create_router(workspace_state))
        .nest("/api/projects", project::create_router(project_state))
        .nest("/api/tasks", task::create_router(task_state))
        .nest("/api/comments", comment::create_router(comment_state))
        .nest("/api/stats", stats::create_router(stats_state))
        .route("/api/ws", get(ws_handler).with_state(ws))
        .layer(from_fn_with_state(auth_mw_state, auth_middleware));

    Router::new()
        .merge(health::create_router(db))
        .nest("/api/auth", auth::public_router(auth_state))
        .merge(protected)
        .layer(from_fn_with_state(rate_limit_state, rate_limit_middleware))
        .layer(cors_layer(api_config))
        .layer(TraceLayer::new_for_http())
}
