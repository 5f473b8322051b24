//! Credential-verification endpoint client.
//!
//! # Design Decisions
//! - Transport errors and 5xx are failures
//! - 4xx is reported as [`LoginOutcome::Rejected`]; whether a rejection
//!   counts against the breaker is decided by
//!   [`AuthService`](crate::auth::AuthService)

use std::future::Future;
use std::time::Duration;

use serde::Serialize;
use url::Url;

use super::types::{AuthError, LoginOutcome, LoginResponse};

/// Something that can check a username/password pair.
pub trait CredentialVerifier: Send + Sync + 'static {
    fn login(
        &self,
        username: &str,
        password: &str,
    ) -> impl Future<Output = Result<LoginOutcome, AuthError>> + Send;
}

#[derive(Serialize)]
struct LoginRequest<'a> {
    username: &'a str,
    password: &'a str,
}

/// Verifier that POSTs JSON credentials to a login URL.
#[derive(Debug, Clone)]
pub struct HttpCredentialVerifier {
    client: reqwest::Client,
    login_url: Url,
}

impl HttpCredentialVerifier {
    pub fn new(login_url: &str) -> Result<Self, AuthError> {
        let login_url = Url::parse(login_url)
            .map_err(|e| AuthError::Upstream(format!("Invalid login URL '{}': {}", login_url, e)))?;
        let client = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(5))
            .build()
            .map_err(|e| AuthError::Upstream(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self { client, login_url })
    }
}

impl CredentialVerifier for HttpCredentialVerifier {
    async fn login(&self, username: &str, password: &str) -> Result<LoginOutcome, AuthError> {
        let response = self
            .client
            .post(self.login_url.clone())
            .json(&LoginRequest { username, password })
            .send()
            .await
            .map_err(|e| AuthError::Upstream(e.to_string()))?;

        let status = response.status();
        if status.is_server_error() {
            return Err(AuthError::Upstream(format!("server error: {}", status)));
        }
        if status.is_client_error() {
            tracing::debug!(username, status = %status, "Login rejected");
            return Ok(LoginOutcome::Rejected {
                status: status.as_u16(),
            });
        }
        if !status.is_success() {
            return Err(AuthError::Upstream(format!("unexpected status: {}", status)));
        }

        let body: LoginResponse = response
            .json()
            .await
            .map_err(|e| AuthError::Upstream(format!("malformed login response: {}", e)))?;
        Ok(LoginOutcome::Granted(body))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_invalid_url() {
        let err = HttpCredentialVerifier::new("::not a url::").unwrap_err();
        assert!(err.to_string().contains("Invalid login URL"));
    }

    #[tokio::test]
    async fn test_unreachable_endpoint_is_failure() {
        // Port 9 (discard) on localhost is closed on any sane test host.
        let verifier = HttpCredentialVerifier::new("http://127.0.0.1:9/login").unwrap();
        let result = verifier.login("admin", "admin").await;
        assert!(matches!(result, Err(AuthError::Upstream(_))));
    }
}
