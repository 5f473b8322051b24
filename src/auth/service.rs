//! Login orchestration.
//!
//! Every call to the credential-verification endpoint goes through the
//! shared circuit breaker. An open circuit fails the login immediately
//! instead of waiting for another timeout.
//!
//! By default a rejected login is a breaker failure, like any other non-2xx
//! answer. [`AuthService::with_rejections_tripping`] turns that off so only
//! transport errors, 5xx and timeouts count.

use std::sync::Arc;

use super::token::TokenDecoder;
use super::types::{AuthError, Credentials, LoginOutcome, Session};
use super::verifier::CredentialVerifier;
use crate::resilience::{CircuitBreaker, CircuitBreakerError};

pub struct AuthService<V, D> {
    verifier: Arc<V>,
    decoder: D,
    breaker: Arc<CircuitBreaker>,
    rejections_trip: bool,
}

impl<V, D> AuthService<V, D>
where
    V: CredentialVerifier,
    D: TokenDecoder,
{
    pub fn new(verifier: V, decoder: D, breaker: Arc<CircuitBreaker>) -> Self {
        Self {
            verifier: Arc::new(verifier),
            decoder,
            breaker,
            rejections_trip: true,
        }
    }

    /// Whether rejected credentials count as breaker failures.
    pub fn with_rejections_tripping(mut self, enabled: bool) -> Self {
        self.rejections_trip = enabled;
        self
    }

    /// The breaker guarding the login endpoint.
    pub fn breaker(&self) -> &Arc<CircuitBreaker> {
        &self.breaker
    }

    pub fn rejections_trip(&self) -> bool {
        self.rejections_trip
    }

    /// Verify credentials and decode the issued token.
    pub async fn login(&self, credentials: &Credentials) -> Result<Session, AuthError> {
        let verifier = self.verifier.clone();
        let username = credentials.username.clone();
        let password = credentials.password.clone();
        let rejections_trip = self.rejections_trip;

        let outcome = self
            .breaker
            .call(move || async move {
                match verifier.login(&username, &password).await? {
                    LoginOutcome::Rejected { status } if rejections_trip => {
                        tracing::info!(username = %username, status, "Login rejected");
                        Err(AuthError::InvalidCredentials)
                    }
                    outcome => Ok(outcome),
                }
            })
            .await
            .map_err(|e| match e {
                CircuitBreakerError::Open => {
                    tracing::warn!(
                        username = %credentials.username,
                        "Authentication service unavailable, circuit open"
                    );
                    AuthError::ServiceUnavailable
                }
                CircuitBreakerError::Timeout => AuthError::Timeout,
                CircuitBreakerError::Operation(e) => e,
                CircuitBreakerError::Aborted => {
                    AuthError::Upstream("login request aborted".to_string())
                }
            })?;

        match outcome {
            LoginOutcome::Granted(response) => {
                let user = self.decoder.decode(&response.access_token)?;
                tracing::info!(
                    username = %credentials.username,
                    role = %user.role,
                    "Login succeeded"
                );
                Ok(Session {
                    access_token: response.access_token,
                    user,
                })
            }
            LoginOutcome::Rejected { status } => {
                tracing::info!(username = %credentials.username, status, "Login rejected");
                Err(AuthError::InvalidCredentials)
            }
        }
    }
}
