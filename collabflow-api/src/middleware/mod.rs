//! Axum middleware.

pub mod auth;

pub use auth::{
    auth_middleware, rate_limit_middleware, AuthMiddlewareState, RateLimitState,
};
