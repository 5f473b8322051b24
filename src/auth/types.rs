//! Authentication data types.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Role name granting admin rights.
pub const ROLE_ADMIN: &str = "ADMIN";

/// Username/password pair submitted at login.
#[derive(Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl Credentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"***")
            .finish()
    }
}

/// Body returned by the login endpoint on success.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LoginResponse {
    #[serde(rename = "accessToken")]
    pub access_token: String,
}

/// What the login endpoint said, when it answered at all.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoginOutcome {
    /// Credentials accepted.
    Granted(LoginResponse),
    /// Endpoint healthy but refused the credentials (4xx).
    Rejected { status: u16 },
}

/// Claims read from an access token.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct UserClaims {
    #[serde(default, alias = "username")]
    pub name: String,
    #[serde(default)]
    pub role: String,
}

impl UserClaims {
    pub fn is_admin(&self) -> bool {
        self.role == ROLE_ADMIN
    }
}

/// An authenticated session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub access_token: String,
    pub user: UserClaims,
}

/// Errors from the login flow.
#[derive(Debug, Error)]
pub enum AuthError {
    /// The circuit protecting the login endpoint is open.
    #[error("Authentication service temporarily unavailable")]
    ServiceUnavailable,

    /// The login endpoint did not answer within the call timeout.
    #[error("Authentication request timed out")]
    Timeout,

    /// The endpoint refused the credentials.
    #[error("Invalid username or password")]
    InvalidCredentials,

    /// Transport failure or 5xx from the endpoint.
    #[error("Authentication service error: {0}")]
    Upstream(String),

    /// The access token could not be decoded.
    #[error("Invalid access token: {0}")]
    InvalidToken(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_credentials_debug_hides_password() {
        let creds = Credentials::new("admin", "admin");
        let rendered = format!("{:?}", creds);
        assert!(rendered.contains("admin"));
        assert!(rendered.contains("***"));
        assert!(!rendered.contains("password: \"admin\""));
    }

    #[test]
    fn test_login_response_wire_name() {
        let resp: LoginResponse = serde_json::from_str(r#"{"accessToken":"abc"}"#).unwrap();
        assert_eq!(resp.access_token, "abc");
    }

    #[test]
    fn test_claims_accept_username_alias() {
        let claims: UserClaims =
            serde_json::from_str(r#"{"username":"johnd","role":"USER"}"#).unwrap();
        assert_eq!(claims.name, "johnd");
        assert!(!claims.is_admin());
    }
}
