use axum::http::header;
use axum::http::request::Parts;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult};

/// Claims embedded in every bearer token. Stateless: there is no server-side
/// session row, so revocation is approximated by re-checking `is_active`
/// against the users table on every authenticated request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// User id
    pub sub: String,
    pub email: String,
    pub username: String,
    /// Issued-at (Unix timestamp, seconds)
    pub iat: i64,
    /// Expiry (Unix timestamp, seconds)
    pub exp: i64,
}

pub fn issue_token(
    secret: &str,
    validity_days: i64,
    user_id: &str,
    email: &str,
    username: &str,
) -> AppResult<String> {
    let now = chrono::Utc::now().timestamp();
    let claims = Claims {
        sub: user_id.to_string(),
        email: email.to_string(),
        username: username.to_string(),
        iat: now,
        exp: now + validity_days * 24 * 60 * 60,
    };
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| AppError::Internal(format!("Token signing failed: {}", e)))
}

/// Checks signature and expiry. Any failure collapses to `Unauthenticated`;
/// callers never learn whether the signature or the expiry was at fault.
pub fn verify_token(secret: &str, token: &str) -> AppResult<Claims> {
    decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map(|data| data.claims)
    .map_err(|_| AppError::Unauthenticated("Invalid or expired token".into()))
}

/// Pull the token out of an `Authorization: Bearer <token>` header.
pub fn extract_bearer_token(parts: &Parts) -> Option<&str> {
    parts
        .headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "test-secret";

    #[test]
    fn issued_token_verifies() {
        let token = issue_token(SECRET, 7, "u1", "a@x.com", "alice").unwrap();
        let claims = verify_token(SECRET, &token).unwrap();
        assert_eq!(claims.sub, "u1");
        assert_eq!(claims.email, "a@x.com");
        assert_eq!(claims.username, "alice");
        assert_eq!(claims.exp - claims.iat, 7 * 24 * 60 * 60);
    }

    #[test]
    fn wrong_secret_is_rejected() {
        let token = issue_token(SECRET, 7, "u1", "a@x.com", "alice").unwrap();
        assert!(matches!(
            verify_token("other-secret", &token),
            Err(AppError::Unauthenticated(_))
        ));
    }

    #[test]
    fn garbage_token_is_rejected() {
        assert!(matches!(
            verify_token(SECRET, "not.a.jwt"),
            Err(AppError::Unauthenticated(_))
        ));
    }

    #[test]
    fn expired_token_is_rejected() {
        // Validation::default() allows 60s leeway, so expire well in the past
        let token = issue_token(SECRET, -1, "u1", "a@x.com", "alice").unwrap();
        assert!(matches!(
            verify_token(SECRET, &token),
            Err(AppError::Unauthenticated(_))
        ));
    }
}
