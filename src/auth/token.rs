//! Access token decoding.

use jsonwebtoken::{DecodingKey, Validation};

use super::types::{AuthError, UserClaims};

/// Turns an access token into the user it was issued for.
pub trait TokenDecoder: Send + Sync {
    fn decode(&self, token: &str) -> Result<UserClaims, AuthError>;
}

/// Reads JWT claims without checking the signature or expiry.
///
/// The token was just handed to us by the login endpoint over the protected
/// call; this decoder only extracts display claims from it. Anything that
/// authorizes requests must verify tokens with the issuer's key instead.
#[derive(Debug, Clone, Copy, Default)]
pub struct JwtClaimsDecoder;

impl TokenDecoder for JwtClaimsDecoder {
    fn decode(&self, token: &str) -> Result<UserClaims, AuthError> {
        let mut validation = Validation::default();
        validation.insecure_disable_signature_validation();
        validation.validate_exp = false;
        validation.validate_aud = false;
        validation.required_spec_claims.clear();

        jsonwebtoken::decode::<UserClaims>(token, &DecodingKey::from_secret(&[]), &validation)
            .map(|data| data.claims)
            .map_err(|e| AuthError::InvalidToken(e.to_string()))
    }
}
