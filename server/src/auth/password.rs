//! Password hashing (bcrypt, cost 10).
//!
//! bcrypt is CPU-bound, so both operations run on the blocking pool.

use super::error::{AuthError, AuthResult};

/// bcrypt work factor.
pub const HASH_COST: u32 = 10;

/// Hash a plaintext password.
pub async fn hash_password(password: &str) -> AuthResult<String> {
    let password = password.to_owned();

    tokio::task::spawn_blocking(move || bcrypt::hash(password, HASH_COST))
        .await
        .map_err(|e| AuthError::Internal(format!("Hashing task failed: {e}")))?
        .map_err(|e| {
            tracing::error!(error = %e, "Failed to hash password");
            AuthError::PasswordHash
        })
}

/// Check a plaintext password against a stored hash.
///
/// A malformed stored hash counts as a mismatch.
pub async fn verify_password(password: &str, hash: &str) -> AuthResult<bool> {
    let password = password.to_owned();
    let hash = hash.to_owned();

    let verified = tokio::task::spawn_blocking(move || bcrypt::verify(password, &hash))
        .await
        .map_err(|e| AuthError::Internal(format!("Verification task failed: {e}")))?;

    Ok(verified.unwrap_or_else(|e| {
        tracing::warn!(error = %e, "Stored password hash could not be parsed");
        false
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_hash_and_verify() {
        let hash = hash_password("Password@01").await.unwrap();

        assert!(hash.starts_with("$2"));
        assert_ne!(hash, "Password@01");
        assert!(verify_password("Password@01", &hash).await.unwrap());
        assert!(!verify_password("Password@02", &hash).await.unwrap());
    }

    #[tokio::test]
    async fn test_malformed_hash_is_mismatch() {
        assert!(!verify_password("secret", "not-a-hash").await.unwrap());
    }
}
