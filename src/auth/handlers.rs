use axum::extract::State;
use axum::Json;
use rusqlite::{params, OptionalExtension};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::auth::credentials;
use crate::auth::token::issue_token;
use crate::db;
use crate::db::models::{EmailVerification, User};
use crate::error::{AppError, AppResult};
use crate::extractors::CurrentUser;
use crate::state::AppState;

// -- Request types --

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    pub username: String,
    pub display_name: Option<String>,
}

#[derive(Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Deserialize)]
pub struct VerifyEmailRequest {
    pub token: String,
}

fn find_user_by_email(conn: &rusqlite::Connection, email: &str) -> AppResult<Option<User>> {
    let sql = format!("SELECT {} FROM users WHERE email = ?1", User::COLUMNS);
    Ok(conn
        .query_row(&sql, params![email], User::from_row)
        .optional()?)
}

// -- Handlers --

/// POST /api/auth/register
pub async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> AppResult<Json<Value>> {
    credentials::validate_email(&req.email)?;
    credentials::validate_username(&req.username)?;
    credentials::validate_password(&req.password)?;

    let mut conn = state.db.get()?;

    if find_user_by_email(&conn, &req.email)?.is_some() {
        return Err(AppError::BadRequest("Email is already registered".into()));
    }

    let username_taken: bool = conn.query_row(
        "SELECT COUNT(*) > 0 FROM users WHERE username = ?1",
        params![req.username],
        |row| row.get(0),
    )?;
    if username_taken {
        return Err(AppError::BadRequest("Username is already taken".into()));
    }

    let password_hash = credentials::hash_password(&req.password)?;
    let user_id = uuid::Uuid::now_v7().to_string();
    let display_name = req.display_name.unwrap_or_else(|| req.username.clone());

    // Verification token; returned in the response body until mail delivery
    // is wired up.
    let verification_token = credentials::generate_verification_token();
    let expires_at = chrono::Utc::now()
        + chrono::Duration::hours(state.config.auth.verification_hours);

    // One transaction: a user row must never exist without its
    // verification row. The pre-checks above race with concurrent
    // registrations; the UNIQUE constraints are the real arbiter.
    let tx = conn.transaction()?;
    tx.execute(
        "INSERT INTO users (id, email, username, display_name, password_hash, is_verified, is_active)
         VALUES (?1, ?2, ?3, ?4, ?5, 0, 1)",
        params![user_id, req.email, req.username, display_name, password_hash],
    )
    .map_err(|e| match e.sqlite_error_code() {
        Some(rusqlite::ErrorCode::ConstraintViolation) => {
            AppError::BadRequest("Email or username is already taken".into())
        }
        _ => AppError::from_sqlite(e),
    })?;

    let created_at: String = tx.query_row(
        "SELECT created_at FROM users WHERE id = ?1",
        params![user_id],
        |row| row.get(0),
    )?;

    tx.execute(
        "INSERT INTO email_verifications (id, user_id, token, expires_at) VALUES (?1, ?2, ?3, ?4)",
        params![
            uuid::Uuid::now_v7().to_string(),
            user_id,
            verification_token,
            expires_at.format("%Y-%m-%dT%H:%M:%S%.3fZ").to_string()
        ],
    )?;
    tx.commit()?;

    let token = issue_token(
        &state.config.auth.token_secret,
        state.config.auth.token_days,
        &user_id,
        &req.email,
        &req.username,
    )?;

    tracing::info!(user_id = %user_id, "Registered new user");

    Ok(Json(json!({
        "success": true,
        "message": "Registration successful, please verify your email",
        "data": {
            "user": {
                "id": user_id,
                "email": req.email,
                "username": req.username,
                "displayName": display_name,
                "isVerified": false,
                "createdAt": created_at,
            },
            "token": token,
            "verificationToken": verification_token,
        }
    })))
}

/// POST /api/auth/login
pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> AppResult<Json<Value>> {
    let conn = state.db.get()?;

    // Unknown email and bad password are indistinguishable to the caller
    let user = find_user_by_email(&conn, &req.email)?
        .ok_or_else(|| AppError::Unauthenticated("Invalid email or password".into()))?;

    if !user.is_active {
        return Err(AppError::Unauthenticated("Account is disabled".into()));
    }

    if !credentials::verify_password(&req.password, &user.password_hash) {
        return Err(AppError::Unauthenticated("Invalid email or password".into()));
    }

    conn.execute(
        "UPDATE users SET last_login_at = ?1 WHERE id = ?2",
        params![db::now_utc(), user.id],
    )?;

    let token = issue_token(
        &state.config.auth.token_secret,
        state.config.auth.token_days,
        &user.id,
        &user.email,
        &user.username,
    )?;

    Ok(Json(json!({
        "success": true,
        "message": "Login successful",
        "data": {
            "user": {
                "id": user.id,
                "email": user.email,
                "username": user.username,
                "displayName": user.display_name,
                "isVerified": user.is_verified,
            },
            "token": token,
        }
    })))
}

/// POST /api/auth/verify-email
pub async fn verify_email(
    State(state): State<AppState>,
    Json(req): Json<VerifyEmailRequest>,
) -> AppResult<Json<Value>> {
    if req.token.is_empty() {
        return Err(AppError::BadRequest("Verification token is required".into()));
    }

    let conn = state.db.get()?;

    let sql = format!(
        "SELECT {} FROM email_verifications WHERE token = ?1",
        EmailVerification::COLUMNS
    );
    let verification = conn
        .query_row(&sql, params![req.token], EmailVerification::from_row)
        .optional()?
        .ok_or_else(|| AppError::BadRequest("Invalid verification token".into()))?;

    if verification.verified_at.is_some() {
        return Err(AppError::BadRequest("Email is already verified".into()));
    }

    if db::now_utc() > verification.expires_at {
        return Err(AppError::BadRequest("Verification token has expired".into()));
    }

    conn.execute(
        "UPDATE users SET is_verified = 1 WHERE id = ?1",
        params![verification.user_id],
    )?;
    conn.execute(
        "UPDATE email_verifications SET verified_at = ?1 WHERE id = ?2",
        params![db::now_utc(), verification.id],
    )?;

    Ok(Json(json!({
        "success": true,
        "message": "Email verified",
    })))
}

/// GET /api/auth/profile
pub async fn profile(
    State(state): State<AppState>,
    user: CurrentUser,
) -> AppResult<Json<Value>> {
    let conn = state.db.get()?;

    let sql = format!("SELECT {} FROM users WHERE id = ?1", User::COLUMNS);
    let row = conn.query_row(&sql, params![user.id], User::from_row)?;

    Ok(Json(json!({
        "success": true,
        "data": {
            "user": {
                "id": row.id,
                "email": row.email,
                "username": row.username,
                "displayName": row.display_name,
                "avatarUrl": row.avatar_url,
                "isVerified": row.is_verified,
                "createdAt": row.created_at,
            }
        }
    })))
}
