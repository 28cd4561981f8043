//! Dashboard statistics route.

use axum::{extract::State, response::IntoResponse, routing::get, Json, Router};
use std::sync::Arc;

use crate::{
    db::{DbClient, StatsTable},
    error::ApiResult,
    types::{Stats, StatsResponse},
};

/// Shared application state for the stats route.
#[derive(Clone)]
pub struct StatsState {
    pub db: DbClient,
}

impl StatsState {
    pub fn new(db: DbClient) -> Self {
        Self { db }
    }
}

/// GET /api/stats - Entity counts and most recent projects and tasks
pub async fn get_stats(State(state): State<Arc<StatsState>>) -> ApiResult<impl IntoResponse> {
    let stats = Stats {
        users: state.db.count_table(StatsTable::Users).await?,
        tasks: state.db.count_table(StatsTable::Tasks).await?,
        workspaces: state.db.count_table(StatsTable::Workspaces).await?,
        projects: state.db.count_table(StatsTable::Projects).await?,
        recent_projects: state.db.recent_projects().await?,
        recent_tasks: state.db.recent_tasks().await?,
    };

    Ok(Json(StatsResponse {
        message: "Stats retrieved successfully".to_string(),
        stats,
    }))
}

pub fn create_router(state: Arc<StatsState>) -> Router {
    Router::new().route("/", get(get_stats)).with_state(state)
}
