//! Authentication orchestration.
//!
//! # Data Flow
//! ```text
//! AuthService::login(credentials)
//!     → CircuitBreaker::call (fail fast when open)
//!     → CredentialVerifier::login (HTTP POST to the login endpoint)
//!     → TokenDecoder::decode (claims from the issued token)
//!     → Session
//! ```

pub mod service;
pub mod token;
pub mod types;
pub mod verifier;

pub use service::AuthService;
pub use token::{JwtClaimsDecoder, TokenDecoder};
pub use types::{
    AuthError, Credentials, LoginOutcome, LoginResponse, Session, UserClaims, ROLE_ADMIN,
};
pub use verifier::{CredentialVerifier, HttpCredentialVerifier};
