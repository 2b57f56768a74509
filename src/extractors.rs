use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use rusqlite::{params, OptionalExtension};

use crate::auth::token::{extract_bearer_token, verify_token};
use crate::error::AppError;
use crate::state::AppState;

/// Represents the currently authenticated user.
#[derive(Debug, Clone)]
pub struct CurrentUser {
    pub id: String,
    pub email: String,
    pub username: String,
}

/// Extractor that requires authentication.
/// Verifies the bearer token, then re-fetches the user row so that a
/// deactivated account is rejected even while its token is unexpired.
impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = extract_bearer_token(parts)
            .ok_or_else(|| AppError::Unauthenticated("Missing authentication token".into()))?;
        let claims = verify_token(&state.config.auth.token_secret, token)?;

        let conn = state.db.get()?;
        let user = conn
            .query_row(
                "SELECT id, email, username FROM users WHERE id = ?1 AND is_active = 1",
                params![claims.sub],
                |row| {
                    Ok(CurrentUser {
                        id: row.get(0)?,
                        email: row.get(1)?,
                        username: row.get(2)?,
                    })
                },
            )
            .optional()?
            .ok_or_else(|| AppError::Unauthenticated("Invalid authentication".into()))?;
        Ok(user)
    }
}

/// Optional user extractor — returns None instead of 401 when not
/// authenticated. Used where login merely enriches the response.
pub struct MaybeUser(pub Option<CurrentUser>);

impl FromRequestParts<AppState> for MaybeUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        match CurrentUser::from_request_parts(parts, state).await {
            Ok(user) => Ok(MaybeUser(Some(user))),
            Err(_) => Ok(MaybeUser(None)),
        }
    }
}
