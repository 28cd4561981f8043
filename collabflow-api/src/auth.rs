//! Authentication for the CollabFlow API.
//!
//! JWT bearer tokens (HS256) carry the user's id, email, and role. Tokens
//! are issued at login and verified by middleware on every protected route.
//! Time validation is done with an injectable clock so token tests are
//! deterministic; passwords are hashed with bcrypt.

use crate::error::{ApiError, ApiResult};
use collabflow_core::{Role, User};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// bcrypt cost factor for password hashing.
const BCRYPT_COST: u32 = 10;

// ============================================================================
// CLOCK ABSTRACTION
// ============================================================================

/// Clock abstraction for JWT time validation.
///
/// Owning time validation (instead of letting `jsonwebtoken` do it) keeps
/// token tests deterministic and avoids panicking on broken system clocks.
pub trait JwtClock: Send + Sync {
    /// Get current time as Unix epoch seconds.
    fn now_epoch_secs(&self) -> i64;
}

/// Production clock using system time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl JwtClock for SystemClock {
    fn now_epoch_secs(&self) -> i64 {
        chrono::Utc::now().timestamp()
    }
}

/// Fixed clock for deterministic tests.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub i64);

impl JwtClock for FixedClock {
    fn now_epoch_secs(&self) -> i64 {
        self.0
    }
}

// ============================================================================
// JWT SECRET (TYPE-SAFE)
// ============================================================================

/// Type-safe JWT secret that prevents accidental logging.
#[derive(Clone)]
pub struct JwtSecret(SecretString);

impl JwtSecret {
    /// Create a new JWT secret. Empty secrets are rejected.
    pub fn new(secret: String) -> ApiResult<Self> {
        if secret.is_empty() {
            return Err(ApiError::invalid_input("JWT secret must not be empty"));
        }
        Ok(Self(SecretString::new(secret.into())))
    }

    /// Expose the secret value (only for cryptographic operations).
    pub fn expose(&self) -> &str {
        self.0.expose_secret()
    }

    /// Get the length of the secret without exposing it.
    pub fn len(&self) -> usize {
        self.0.expose_secret().len()
    }

    /// Check if the secret is empty without exposing it.
    pub fn is_empty(&self) -> bool {
        self.0.expose_secret().is_empty()
    }

    /// Check if the secret is the insecure default.
    pub fn is_insecure_default(&self) -> bool {
        self.0.expose_secret() == INSECURE_DEFAULT_SECRET
    }
}

impl std::fmt::Debug for JwtSecret {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "JwtSecret([REDACTED, {} chars])", self.len())
    }
}

const INSECURE_DEFAULT_SECRET: &str = "INSECURE_DEFAULT_SECRET_CHANGE_IN_PRODUCTION";

fn build_jwt_secret(secret_str: String) -> JwtSecret {
    let normalized = if secret_str.trim().is_empty() {
        INSECURE_DEFAULT_SECRET.to_string()
    } else {
        secret_str
    };

    match JwtSecret::new(normalized) {
        Ok(secret) => secret,
        Err(_) => JwtSecret(SecretString::new(INSECURE_DEFAULT_SECRET.to_string().into())),
    }
}

// ============================================================================
// CONFIGURATION
// ============================================================================

/// Authentication configuration.
#[derive(Clone)]
pub struct AuthConfig {
    /// JWT secret key for signing and verification
    pub jwt_secret: JwtSecret,

    /// JWT algorithm (default: HS256)
    pub jwt_algorithm: Algorithm,

    /// JWT token expiration in seconds (default: 24 hours)
    pub jwt_expiration_secs: i64,

    /// JWT clock skew tolerance in seconds (default: 60)
    pub jwt_clock_skew_secs: i64,

    /// Clock for JWT time validation (injected for testing)
    pub clock: Arc<dyn JwtClock>,
}

impl std::fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthConfig")
            .field("jwt_secret", &self.jwt_secret)
            .field("jwt_algorithm", &self.jwt_algorithm)
            .field("jwt_expiration_secs", &self.jwt_expiration_secs)
            .field("jwt_clock_skew_secs", &self.jwt_clock_skew_secs)
            .field("clock", &"<JwtClock>")
            .finish()
    }
}

impl Default for AuthConfig {
    fn default() -> Self {
        let secret_str = std::env::var("COLLABFLOW_JWT_SECRET")
            .unwrap_or_else(|_| INSECURE_DEFAULT_SECRET.to_string());

        Self {
            jwt_secret: build_jwt_secret(secret_str),
            jwt_algorithm: Algorithm::HS256,
            jwt_expiration_secs: 86400, // 24 hours
            jwt_clock_skew_secs: 60,
            clock: Arc::new(SystemClock),
        }
    }
}

impl AuthConfig {
    /// Create authentication configuration from environment variables.
    ///
    /// # Environment Variables
    /// - `COLLABFLOW_JWT_SECRET`: JWT signing secret
    /// - `COLLABFLOW_JWT_EXPIRATION_SECS`: Token expiration (default: 86400)
    /// - `COLLABFLOW_JWT_CLOCK_SKEW_SECS`: Clock skew tolerance (default: 60)
    pub fn from_env() -> Self {
        let secret_str = std::env::var("COLLABFLOW_JWT_SECRET")
            .unwrap_or_else(|_| INSECURE_DEFAULT_SECRET.to_string());

        Self {
            jwt_secret: build_jwt_secret(secret_str),
            jwt_algorithm: Algorithm::HS256,
            jwt_expiration_secs: std::env::var("COLLABFLOW_JWT_EXPIRATION_SECS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(86400),
            jwt_clock_skew_secs: std::env::var("COLLABFLOW_JWT_CLOCK_SKEW_SECS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(60),
            clock: Arc::new(SystemClock),
        }
    }

    /// Validate the authentication configuration for production use.
    ///
    /// In production environments the insecure default secret and short
    /// secrets are rejected; in development they log a warning.
    pub fn validate_for_production(&self) -> ApiResult<()> {
        let environment = std::env::var("COLLABFLOW_ENVIRONMENT")
            .unwrap_or_else(|_| "development".to_string())
            .to_lowercase();

        let is_production = environment == "production" || environment == "prod";

        if self.jwt_secret.is_insecure_default() {
            if is_production {
                return Err(ApiError::invalid_input(
                    "Cannot start server in production with the insecure default JWT secret. \
                     Set COLLABFLOW_JWT_SECRET to a secure value.",
                ));
            }
            tracing::warn!(
                "Using insecure default JWT secret. Set COLLABFLOW_JWT_SECRET before deploying."
            );
        } else if self.jwt_secret.len() < 32 {
            if is_production {
                return Err(ApiError::invalid_input(format!(
                    "JWT secret is too short for production use ({} chars). \
                     It must be at least 32 characters long.",
                    self.jwt_secret.len()
                )));
            }
            tracing::warn!(
                chars = self.jwt_secret.len(),
                "JWT secret is short. Use at least 32 characters in production."
            );
        }

        Ok(())
    }
}

// ============================================================================
// JWT CLAIMS
// ============================================================================

/// JWT claims carried by CollabFlow tokens.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (user id)
    pub sub: i64,

    /// User's email address
    pub email: String,

    /// User's role
    pub role: Role,

    /// Issued at (Unix timestamp)
    pub iat: i64,

    /// Expiration time (Unix timestamp)
    pub exp: i64,
}

impl Claims {
    /// Create new claims for a user using a clock.
    pub fn new(user: &User, expiration_secs: i64, clock: &dyn JwtClock) -> Self {
        let now = clock.now_epoch_secs();

        Self {
            sub: user.id,
            email: user.email.clone(),
            role: user.role,
            iat: now,
            exp: now + expiration_secs,
        }
    }

    /// Check if the token has expired according to a clock.
    pub fn is_expired(&self, clock: &dyn JwtClock) -> bool {
        self.exp < clock.now_epoch_secs()
    }
}

// ============================================================================
// AUTHENTICATION CONTEXT
// ============================================================================

/// Authentication context extracted from a request.
///
/// Injected into Axum request extensions after successful authentication.
#[derive(Debug, Clone, PartialEq)]
pub struct AuthContext {
    /// User id (from the JWT sub claim)
    pub user_id: i64,

    /// User's email address
    pub email: String,

    /// User's role
    pub role: Role,
}

impl From<&Claims> for AuthContext {
    fn from(claims: &Claims) -> Self {
        Self {
            user_id: claims.sub,
            email: claims.email.clone(),
            role: claims.role,
        }
    }
}

// ============================================================================
// TOKEN FUNCTIONS
// ============================================================================

/// Validate JWT claim times using our own clock logic.
///
/// Separated from signature validation so tests are deterministic and
/// clock skew policy lives in one place.
fn validate_claim_times(now: i64, exp: i64, leeway_secs: i64) -> ApiResult<()> {
    if exp < now - leeway_secs {
        return Err(ApiError::token_expired());
    }
    Ok(())
}

/// Validate a JWT token and extract its claims.
///
/// Performs signature validation ONLY via `jsonwebtoken`, then applies
/// time validation with the configured clock and skew tolerance.
pub fn validate_jwt_token(config: &AuthConfig, token: &str) -> ApiResult<Claims> {
    let decoding_key = DecodingKey::from_secret(config.jwt_secret.expose().as_bytes());

    let mut validation = Validation::new(config.jwt_algorithm);
    validation.validate_exp = false; // We do this ourselves with our clock
    validation.validate_nbf = false;
    validation.required_spec_claims = std::collections::HashSet::from(["exp".to_string()]);

    let token_data =
        decode::<Claims>(token, &decoding_key, &validation).map_err(|e| match e.kind() {
            jsonwebtoken::errors::ErrorKind::InvalidToken => {
                ApiError::invalid_token("Token is invalid")
            }
            jsonwebtoken::errors::ErrorKind::InvalidSignature => {
                ApiError::invalid_token("Token signature is invalid")
            }
            _ => ApiError::invalid_token(format!("Token validation failed: {}", e)),
        })?;

    let claims = token_data.claims;
    let now = config.clock.now_epoch_secs();

    if now < 0 {
        tracing::error!(timestamp = now, "System clock returned pre-epoch time");
        return Err(ApiError::internal_error("Server time configuration error"));
    }

    validate_claim_times(now, claims.exp, config.jwt_clock_skew_secs)?;

    Ok(claims)
}

/// Generate a JWT token for a user.
pub fn generate_jwt_token(config: &AuthConfig, user: &User) -> ApiResult<String> {
    let claims = Claims::new(user, config.jwt_expiration_secs, &*config.clock);

    let encoding_key = EncodingKey::from_secret(config.jwt_secret.expose().as_bytes());
    let header = Header::new(config.jwt_algorithm);

    encode(&header, &claims, &encoding_key)
        .map_err(|e| ApiError::internal_error(format!("Failed to generate token: {}", e)))
}

// ============================================================================
// PASSWORD HASHING
// ============================================================================

/// Hash a plaintext password for storage.
pub fn hash_password(password: &str) -> ApiResult<String> {
    Ok(bcrypt::hash(password, BCRYPT_COST)?)
}

/// Verify a plaintext password against a stored hash.
pub fn verify_password(password: &str, hash: &str) -> ApiResult<bool> {
    Ok(bcrypt::verify(password, hash)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    // 2024-01-01 00:00:00 UTC
    const T0: i64 = 1704067200;

    fn test_config(clock: FixedClock) -> AuthConfig {
        AuthConfig {
            jwt_secret: JwtSecret::new("test-secret-at-least-32-characters!!".to_string()).unwrap(),
            jwt_algorithm: Algorithm::HS256,
            jwt_expiration_secs: 86400,
            jwt_clock_skew_secs: 60,
            clock: Arc::new(clock),
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

    #[test]
    fn test_token_round_trip() {
        let config = test_config(FixedClock(T0));
        let token = generate_jwt_token(&config, &test_user()).unwrap();
        let claims = validate_jwt_token(&config, &token).unwrap();

        assert_eq!(claims.sub, 7);
        assert_eq!(claims.email, "dana@example.com");
        assert_eq!(claims.role, Role::ProjectManager);
        assert_eq!(claims.iat, T0);
        assert_eq!(claims.exp, T0 + 86400);
    }

    #[test]
    fn test_expired_token_is_rejected() {
        let issue_config = test_config(FixedClock(T0));
        let token = generate_jwt_token(&issue_config, &test_user()).unwrap();

        // Validate two days later.
        let later_config = test_config(FixedClock(T0 + 2 * 86400));
        let err = validate_jwt_token(&later_config, &token).unwrap_err();
        assert_eq!(err.code, crate::error::ErrorCode::TokenExpired);
    }

    #[test]
    fn test_clock_skew_tolerated() {
        let issue_config = test_config(FixedClock(T0));
        let token = generate_jwt_token(&issue_config, &test_user()).unwrap();

        // Just past expiry but within the 60 s leeway.
        let config = test_config(FixedClock(T0 + 86400 + 30));
        assert!(validate_jwt_token(&config, &token).is_ok());
    }

    #[test]
    fn test_wrong_secret_is_rejected() {
        let issue_config = test_config(FixedClock(T0));
        let token = generate_jwt_token(&issue_config, &test_user()).unwrap();

        let mut other = test_config(FixedClock(T0));
        other.jwt_secret =
            JwtSecret::new("another-secret-also-32-characters!!!".to_string()).unwrap();
        assert!(validate_jwt_token(&other, &token).is_err());
    }

    #[test]
    fn test_garbage_token_is_rejected() {
        let config = test_config(FixedClock(T0));
        assert!(validate_jwt_token(&config, "not-a-token").is_err());
    }

    #[test]
    fn test_auth_context_from_claims() {
        let claims = Claims::new(&test_user(), 3600, &FixedClock(T0));
        let ctx = AuthContext::from(&claims);
        assert_eq!(ctx.user_id, 7);
        assert_eq!(ctx.role, Role::ProjectManager);
    }

    #[test]
    fn test_jwt_secret_debug_redacts() {
        let secret = JwtSecret::new("super-secret".to_string()).unwrap();
        let debug = format!("{:?}", secret);
        assert!(!debug.contains("super-secret"));
        assert!(debug.contains("REDACTED"));
    }

    #[test]
    fn test_password_hash_round_trip() {
        let hash = hash_password("hunter2").unwrap();
        assert!(verify_password("hunter2", &hash).unwrap());
        assert!(!verify_password("hunter3", &hash).unwrap());
    }
}
