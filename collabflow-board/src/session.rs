//! Explicit session context.
//!
//! The session is a plain value handed to the projection by its caller.
//! Persistence is an explicit serialize/deserialize boundary so hosts can
//! store it wherever they like (disk, browser storage, memory).

use collabflow_core::Role;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Error produced when loading a persisted session.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("malformed session payload: {0}")]
    Malformed(#[from] serde_json::Error),
}

/// The authenticated identity a board acts as.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub user_id: i64,
    pub email: String,
    pub role: Role,
    /// Bearer token for requests produced by the board.
    pub token: String,
}

impl Session {
    pub fn new(user_id: i64, email: impl Into<String>, role: Role, token: impl Into<String>) -> Self {
        Self {
            user_id,
            email: email.into(),
            role,
            token: token.into(),
        }
    }

    /// Serialize for persistence.
    pub fn to_json(&self) -> Result<String, SessionError> {
        Ok(serde_json::to_string(self)?)
    }

    /// Load a previously persisted session.
    pub fn from_json(payload: &str) -> Result<Self, SessionError> {
        Ok(serde_json::from_str(payload)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_round_trip() {
        let session = Session::new(7, "dana@example.com", Role::Developer, "tok");
        let json = session.to_json().unwrap();
        let back = Session::from_json(&json).unwrap();
        assert_eq!(back, session);
    }

    #[test]
    fn test_malformed_payload_is_an_error() {
        assert!(Session::from_json("{not json").is_err());
        assert!(Session::from_json(r#"{"user_id": "seven"}"#).is_err());
    }
}
