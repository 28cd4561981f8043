//! Authentication and rate-limiting middleware.
//!
//! The auth middleware validates the `Authorization: Bearer` token on
//! every protected route and injects an [`AuthContext`] into request
//! extensions, where handlers pick it up via the extractor impl below.
//! Rate limiting is per client IP with a token-bucket limiter.

use crate::auth::{validate_jwt_token, AuthConfig, AuthContext};
use crate::error::{ApiError, ApiResult};
use axum::{
    extract::{FromRequestParts, Request, State},
    http::request::Parts,
    middleware::Next,
    response::{IntoResponse, Response},
};
use std::sync::Arc;

// ============================================================================
// MIDDLEWARE STATE
// ============================================================================

/// Shared state for the authentication middleware.
#[derive(Debug, Clone)]
pub struct AuthMiddlewareState {
    /// Authentication configuration
    pub auth_config: Arc<AuthConfig>,
}

impl AuthMiddlewareState {
    /// Create new middleware state with the given auth configuration.
    pub fn new(auth_config: AuthConfig) -> Self {
        Self {
            auth_config: Arc::new(auth_config),
        }
    }
}

// ============================================================================
// MIDDLEWARE FUNCTION
// ============================================================================

/// Axum middleware for authentication.
///
/// Extracts the bearer token, validates it, and injects [`AuthContext`]
/// into request extensions. Returns 401 when the token is missing,
/// malformed, expired, or has a bad signature.
pub async fn auth_middleware(
    State(state): State<AuthMiddlewareState>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let auth_header = request
        .headers()
        .get("authorization")
        .and_then(|h| h.to_str().ok())
        .ok_or_else(|| {
            ApiError::unauthorized("Authentication required: provide an Authorization header")
        })?;

    let token = auth_header.strip_prefix("Bearer ").ok_or_else(|| {
        ApiError::invalid_token("Authorization header must use Bearer scheme")
    })?;

    let claims = validate_jwt_token(&state.auth_config, token)?;
    let auth_context = AuthContext::from(&claims);

    request.extensions_mut().insert(auth_context);

    Ok(next.run(request).await)
}

// ============================================================================
// TYPED EXTRACTOR
// ============================================================================

/// Extract [`AuthContext`] directly in handler signatures.
///
/// Requires `auth_middleware` on the route; without it the context is
/// absent from extensions and the extractor fails with a 500.
#[axum::async_trait]
impl<S> FromRequestParts<S> for AuthContext
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts.extensions.get::<AuthContext>().cloned().ok_or_else(|| {
            ApiError::internal_error(
                "AuthContext not found in request extensions. \
                 Ensure auth_middleware is applied to this route.",
            )
        })
    }
}

/// Extract AuthContext from request extensions.
pub fn extract_auth_context(request: &Request) -> ApiResult<&AuthContext> {
    request
        .extensions()
        .get::<AuthContext>()
        .ok_or_else(|| ApiError::unauthorized("Auth context missing from request"))
}

// ============================================================================
// RATE LIMITING MIDDLEWARE
// ============================================================================

use crate::config::ApiConfig;
use axum::http::StatusCode;
use dashmap::DashMap;
use governor::{clock::DefaultClock, Quota, RateLimiter};
use std::net::IpAddr;
use std::num::NonZeroU32;

/// Type alias for the rate limiter we use.
type DirectRateLimiter =
    RateLimiter<governor::state::NotKeyed, governor::state::InMemoryState, DefaultClock>;

/// State for the rate limiting middleware.
#[derive(Clone)]
pub struct RateLimitState {
    config: Arc<ApiConfig>,
    /// Per-IP rate limiters - DashMap for lock-free concurrent access
    limiters: Arc<DashMap<IpAddr, Arc<DirectRateLimiter>>>,
}

impl RateLimitState {
    /// Create new rate limit state from API configuration.
    pub fn new(config: ApiConfig) -> Self {
        Self {
            config: Arc::new(config),
            limiters: Arc::new(DashMap::new()),
        }
    }

    /// Get or create a rate limiter for the given client IP.
    fn get_or_create_limiter(&self, ip: IpAddr) -> Arc<DirectRateLimiter> {
        let limiter = self.limiters.entry(ip).or_insert_with(|| {
            let quota = Quota::per_minute(
                NonZeroU32::new(self.config.rate_limit_per_minute).unwrap_or(NonZeroU32::MIN),
            )
            .allow_burst(
                NonZeroU32::new(self.config.rate_limit_burst).unwrap_or(NonZeroU32::MIN),
            );

            Arc::new(RateLimiter::direct(quota))
        });

        limiter.clone()
    }
}

/// Error type for the rate limit middleware.
pub struct RateLimitError {
    /// Seconds until the limit resets
    pub retry_after: u64,
}

impl IntoResponse for RateLimitError {
    fn into_response(self) -> Response {
        use axum::http::HeaderValue;

        let error = ApiError::too_many_requests(Some(self.retry_after));

        let mut response = (StatusCode::TOO_MANY_REQUESTS, axum::Json(error)).into_response();
        response.headers_mut().insert(
            axum::http::header::HeaderName::from_static("retry-after"),
            HeaderValue::from_str(&self.retry_after.to_string())
                .unwrap_or_else(|_| HeaderValue::from_static("60")),
        );

        response
    }
}

/// Extract the client IP, considering proxy headers.
fn extract_client_ip(request: &Request, fallback: std::net::SocketAddr) -> IpAddr {
    // X-Forwarded-For can contain multiple IPs, take the first one
    if let Some(forwarded_for) = request
        .headers()
        .get("x-forwarded-for")
        .and_then(|h| h.to_str().ok())
    {
        if let Some(first_ip) = forwarded_for.split(',').next() {
            if let Ok(ip) = first_ip.trim().parse() {
                return ip;
            }
        }
    }

    if let Some(real_ip) = request
        .headers()
        .get("x-real-ip")
        .and_then(|h| h.to_str().ok())
    {
        if let Ok(ip) = real_ip.trim().parse() {
            return ip;
        }
    }

    fallback.ip()
}

/// Rate limiting middleware, keyed by client IP.
///
/// Returns 429 Too Many Requests with a Retry-After header when the
/// client exceeds its quota.
pub async fn rate_limit_middleware(
    State(state): State<RateLimitState>,
    axum::extract::ConnectInfo(addr): axum::extract::ConnectInfo<std::net::SocketAddr>,
    request: Request,
    next: Next,
) -> Result<Response, RateLimitError> {
    use axum::http::HeaderValue;

    if !state.config.rate_limit_enabled {
        return Ok(next.run(request).await);
    }

    let ip = extract_client_ip(&request, addr);
    let limiter = state.get_or_create_limiter(ip);

    match limiter.check() {
        Ok(_) => {
            let mut response = next.run(request).await;
            response.headers_mut().insert(
                axum::http::header::HeaderName::from_static("x-ratelimit-limit"),
                HeaderValue::from_str(&state.config.rate_limit_per_minute.to_string())
                    .unwrap_or_else(|_| HeaderValue::from_static("300")),
            );
            Ok(response)
        }
        Err(not_until) => {
            let retry_after = not_until
                .wait_time_from(governor::clock::Clock::now(&DefaultClock::default()))
                .as_secs()
                .max(1);

            Err(RateLimitError { retry_after })
        }
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::{generate_jwt_token, JwtSecret};
    use axum::{
        body::Body,
        http::{Request, StatusCode},
        middleware,
        routing::get,
        Router,
    };
    use chrono::Utc;
    use collabflow_core::{Role, User};
    use tower::ServiceExt; // for `oneshot`

    fn test_auth_config() -> AuthConfig {
        AuthConfig {
            jwt_secret: JwtSecret::new("test-secret-at-least-32-characters!!".to_string())
                .expect("test secret should be valid"),
            ..AuthConfig::default()
        }
    }

    fn test_user() -> User {
        User {
            id: 7,
            name: "Dana".to_string(),
            email: "dana@example.com".to_string(),
            password_hash: String::new(),
            role: Role::ProjectManager,
            is_verified: true,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn test_app() -> Router {
        let auth_state = AuthMiddlewareState::new(test_auth_config());

        Router::new()
            .route("/protected", get(|| async { "Protected resource" }))
            .layer(middleware::from_fn_with_state(auth_state, auth_middleware))
    }

    #[tokio::test]
    async fn test_middleware_with_valid_jwt() -> Result<(), String> {
        let auth_config = test_auth_config();
        let token = generate_jwt_token(&auth_config, &test_user()).map_err(|e| e.message)?;

        let auth_state = AuthMiddlewareState::new(auth_config);
        let app = Router::new()
            .route("/protected", get(|| async { "Protected resource" }))
            .layer(middleware::from_fn_with_state(auth_state, auth_middleware));

        let request = Request::builder()
            .uri("/protected")
            .header("authorization", format!("Bearer {}", token))
            .body(Body::empty())
            .map_err(|e| e.to_string())?;

        let response = app
            .oneshot(request)
            .await
            .map_err(|e| format!("Request failed: {:?}", e))?;

        assert_eq!(response.status(), StatusCode::OK);
        Ok(())
    }

    #[tokio::test]
    async fn test_middleware_without_authentication() -> Result<(), String> {
        let app = test_app();

        let request = Request::builder()
            .uri("/protected")
            .body(Body::empty())
            .map_err(|e| e.to_string())?;

        let response = app
            .oneshot(request)
            .await
            .map_err(|e| format!("Request failed: {:?}", e))?;

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        Ok(())
    }

    #[tokio::test]
    async fn test_middleware_with_invalid_jwt() -> Result<(), String> {
        let app = test_app();

        let request = Request::builder()
            .uri("/protected")
            .header("authorization", "Bearer invalid.jwt.token")
            .body(Body::empty())
            .map_err(|e| e.to_string())?;

        let response = app
            .oneshot(request)
            .await
            .map_err(|e| format!("Request failed: {:?}", e))?;

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        Ok(())
    }

    #[tokio::test]
    async fn test_middleware_with_malformed_auth_header() -> Result<(), String> {
        let app = test_app();

        let request = Request::builder()
            .uri("/protected")
            .header("authorization", "NotBearer token")
            .body(Body::empty())
            .map_err(|e| e.to_string())?;

        let response = app
            .oneshot(request)
            .await
            .map_err(|e| format!("Request failed: {:?}", e))?;

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        Ok(())
    }

    #[tokio::test]
    async fn test_auth_context_injection() -> Result<(), String> {
        let auth_config = test_auth_config();
        let token = generate_jwt_token(&auth_config, &test_user()).map_err(|e| e.message)?;

        async fn handler(auth: AuthContext) -> String {
            format!("User: {}, Role: {}", auth.user_id, auth.role)
        }

        let auth_state = AuthMiddlewareState::new(auth_config);
        let app = Router::new()
            .route("/protected", get(handler))
            .layer(middleware::from_fn_with_state(auth_state, auth_middleware));

        let request = Request::builder()
            .uri("/protected")
            .header("authorization", format!("Bearer {}", token))
            .body(Body::empty())
            .map_err(|e| e.to_string())?;

        let response = app
            .oneshot(request)
            .await
            .map_err(|e| format!("Request failed: {:?}", e))?;

        assert_eq!(response.status(), StatusCode::OK);

        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .map_err(|e| format!("Failed to read body: {:?}", e))?;
        let body_str = String::from_utf8(body.to_vec())
            .map_err(|e| format!("Invalid UTF-8 body: {}", e))?;

        assert!(body_str.contains("User: 7"));
        assert!(body_str.contains("Role: ProjectManager"));
        Ok(())
    }

    #[tokio::test]
    async fn test_extractor_without_middleware_is_server_error() -> Result<(), String> {
        async fn handler(_auth: AuthContext) -> String {
            "Should not reach here".to_string()
        }

        // Router WITHOUT auth middleware
        let app = Router::new().route("/unprotected", get(handler));

        let request = Request::builder()
            .uri("/unprotected")
            .body(Body::empty())
            .map_err(|e| e.to_string())?;

        let response = app
            .oneshot(request)
            .await
            .map_err(|e| format!("Request failed: {:?}", e))?;

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        Ok(())
    }

    #[test]
    fn test_extract_client_ip_prefers_forwarded_header() {
        let fallback: std::net::SocketAddr = "10.0.0.1:9999".parse().unwrap();

        let request = Request::builder()
            .uri("/")
            .header("x-forwarded-for", "203.0.113.9, 10.0.0.2")
            .body(Body::empty())
            .unwrap();
        assert_eq!(
            extract_client_ip(&request, fallback),
            "203.0.113.9".parse::<IpAddr>().unwrap()
        );

        let request = Request::builder().uri("/").body(Body::empty()).unwrap();
        assert_eq!(
            extract_client_ip(&request, fallback),
            "10.0.0.1".parse::<IpAddr>().unwrap()
        );
    }

    #[test]
    fn test_rate_limit_state_reuses_limiter_per_ip() {
        let state = RateLimitState::new(ApiConfig::default());
        let ip: IpAddr = "203.0.113.9".parse().unwrap();

        let first = state.get_or_create_limiter(ip);
        let second = state.get_or_create_limiter(ip);
        assert!(Arc::ptr_eq(&first, &second));

        let other = state.get_or_create_limiter("203.0.113.10".parse().unwrap());
        assert!(!Arc::ptr_eq(&first, &other));
    }
}
