//! Authentication and user routes.
//!
//! Registration and login are public; profile and user administration sit
//! behind the auth middleware. Passwords never leave this module in any
//! response shape.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{delete, get, post, put},
    Json, Router,
};
use std::sync::Arc;

use crate::{
    auth::{generate_jwt_token, hash_password, verify_password, AuthConfig, AuthContext},
    authz::{authorize, Capability},
    db::DbClient,
    error::{ApiError, ApiResult},
    types::{
        LoginRequest, LoginResponse, MessageResponse, ProfileResponse, RegisterRequest,
        RegisterResponse, UpdateUserRoleRequest, UserResponse, UsersResponse,
    },
};
use collabflow_core::UserSummary;

// ============================================================================
// SHARED STATE
// ============================================================================

/// Shared application state for auth routes.
#[derive(Clone)]
pub struct AuthState {
    pub db: DbClient,
    pub auth_config: Arc<AuthConfig>,
}

impl AuthState {
    pub fn new(db: DbClient, auth_config: Arc<AuthConfig>) -> Self {
        Self { db, auth_config }
    }
}

// ============================================================================
// ROUTE HANDLERS
// ============================================================================

/// POST /api/auth/register - Register a new user
pub async fn register(
    State(state): State<Arc<AuthState>>,
    Json(req): Json<RegisterRequest>,
) -> ApiResult<impl IntoResponse> {
    if req.name.trim().is_empty() {
        return Err(ApiError::missing_field("name"));
    }
    if req.email.trim().is_empty() {
        return Err(ApiError::missing_field("email"));
    }
    if !req.email.contains('@') {
        return Err(ApiError::validation_failed("Email address is not valid"));
    }
    if req.password.is_empty() {
        return Err(ApiError::missing_field("password"));
    }

    if state.db.user_find_by_email(&req.email).await?.is_some() {
        return Err(ApiError::email_taken(&req.email));
    }

    let password_hash = hash_password(&req.password)?;
    let role = req.role.unwrap_or_default();
    let user = state
        .db
        .user_create(&req.name, &req.email, &password_hash, role)
        .await?;

    tracing::info!(user_id = user.id, email = %user.email, "User registered");

    Ok((
        StatusCode::CREATED,
        Json(RegisterResponse {
            message: "User registered successfully".to_string(),
            user: UserSummary::from(&user),
        }),
    ))
}

/// POST /api/auth/login - Authenticate and issue a JWT
pub async fn login(
    State(state): State<Arc<AuthState>>,
    Json(req): Json<LoginRequest>,
) -> ApiResult<impl IntoResponse> {
    if req.email.trim().is_empty() || req.password.is_empty() {
        return Err(ApiError::invalid_credentials());
    }

    // One error for both unknown email and wrong password.
    let user = state
        .db
        .user_find_by_email(&req.email)
        .await?
        .ok_or_else(ApiError::invalid_credentials)?;

    if !verify_password(&req.password, &user.password_hash)? {
        return Err(ApiError::invalid_credentials());
    }

    let token = generate_jwt_token(&state.auth_config, &user)?;

    tracing::info!(user_id = user.id, "User logged in");

    Ok(Json(LoginResponse {
        message: "Login successful".to_string(),
        token,
        user: UserSummary::from(&user),
    }))
}

/// GET /api/auth/profile - The authenticated user's profile
pub async fn profile(
    State(state): State<Arc<AuthState>>,
    auth: AuthContext,
) -> ApiResult<impl IntoResponse> {
    let user = state
        .db
        .user_get(auth.user_id)
        .await?
        .ok_or_else(|| ApiError::user_not_found(auth.user_id))?;

    Ok(Json(ProfileResponse {
        message: "Profile retrieved successfully".to_string(),
        user: UserSummary::from(&user),
    }))
}

/// GET /api/auth/users - List all users
pub async fn list_users(State(state): State<Arc<AuthState>>) -> ApiResult<impl IntoResponse> {
    let users = state.db.user_list().await?;

    Ok(Json(UsersResponse {
        message: "Users retrieved successfully".to_string(),
        users,
    }))
}

/// PUT /api/auth/users/:id/role - Change a user's role
pub async fn update_user_role(
    State(state): State<Arc<AuthState>>,
    auth: AuthContext,
    Path(user_id): Path<i64>,
    Json(req): Json<UpdateUserRoleRequest>,
) -> ApiResult<impl IntoResponse> {
    authorize(&auth, Capability::ManageUsers)?;

    let user = state
        .db
        .user_update_role(user_id, req.role)
        .await?
        .ok_or_else(|| ApiError::user_not_found(user_id))?;

    Ok(Json(UserResponse {
        message: "User role updated successfully".to_string(),
        user: UserSummary::from(&user),
    }))
}

/// DELETE /api/auth/users/:id - Remove a user
pub async fn delete_user(
    State(state): State<Arc<AuthState>>,
    auth: AuthContext,
    Path(user_id): Path<i64>,
) -> ApiResult<impl IntoResponse> {
    authorize(&auth, Capability::ManageUsers)?;

    if !state.db.user_delete(user_id).await? {
        return Err(ApiError::user_not_found(user_id));
    }

    Ok(Json(MessageResponse::new("User deleted successfully")))
}

// ============================================================================
// ROUTER CREATION
// ============================================================================

/// Public auth routes (no token required).
pub fn public_router(state: Arc<AuthState>) -> Router {
    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
        .with_state(state)
}

/// Protected auth routes (token required).
pub fn protected_router(state: Arc<AuthState>) -> Router {
    Router::new()
        .route("/profile", get(profile))
        .route("/users", get(list_users))
        .route("/users/:id/role", put(update_user_role))
        .route("/users/:id", delete(delete_user))
        .with_state(state)
}
