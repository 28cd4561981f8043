//! CollabFlow API - REST + WebSocket backend
//!
//! The HTTP surface of CollabFlow: JWT-authenticated REST routes for
//! users, workspaces, projects, tasks, and comments; cached listing
//! reads; and a WebSocket endpoint streaming change events to every
//! connected client.
//!
//! ## Architecture
//!
//! - Axum routers per entity, assembled in [`routes::create_app`]
//! - deadpool-postgres connection pool behind [`DbClient`]
//! - Read-through listing cache from `collabflow-cache`
//! - Broadcast channel fan-out in [`ws::WsState`]

pub mod auth;
pub mod authz;
pub mod config;
pub mod db;
pub mod error;
pub mod listings;
pub mod middleware;
pub mod routes;
pub mod types;
pub mod ws;

pub use auth::{AuthConfig, AuthContext};
pub use config::ApiConfig;
pub use db::{DbClient, DbConfig};
pub use error::{ApiError, ApiResult, ErrorCode};
pub use routes::create_app;
