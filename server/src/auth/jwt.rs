//! JWT Token Generation and Validation
//!
//! HS256 tokens signed with the shared `JWT_SECRET`. The guard identifies the
//! caller by the `username` claim.

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use super::error::{AuthError, AuthResult};

/// JWT claims for access tokens.
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    /// Username of the principal.
    pub username: String,
    /// Expiration time (Unix timestamp).
    pub exp: i64,
    /// Issued at (Unix timestamp).
    #[serde(default)]
    pub iat: i64,
}

/// Issued access token.
#[derive(Debug)]
pub struct AccessToken {
    pub token: String,
    /// Validity in seconds.
    pub expires_in: i64,
}

/// Sign an access token for `username`.
pub fn generate_access_token(
    username: &str,
    secret: &str,
    expiry_seconds: i64,
) -> AuthResult<AccessToken> {
    let now = Utc::now();
    let claims = Claims {
        username: username.to_string(),
        exp: (now + Duration::seconds(expiry_seconds)).timestamp(),
        iat: now.timestamp(),
    };

    let token = encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )?;

    Ok(AccessToken {
        token,
        expires_in: expiry_seconds,
    })
}

/// Validate and decode an access token.
///
/// Returns an error if the signature does not match or the token is expired.
pub fn validate_access_token(token: &str, secret: &str) -> AuthResult<Claims> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.validate_exp = true;
    validation.leeway = 0;

    let token_data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &validation,
    )
    .map_err(|e| match e.kind() {
        jsonwebtoken::errors::ErrorKind::ExpiredSignature => AuthError::TokenExpired,
        _ => AuthError::InvalidToken,
    })?;

    Ok(token_data.claims)
}
