use lazy_static::lazy_static;
use rand::Rng;
use regex::Regex;

use crate::error::{AppError, AppResult};

lazy_static! {
    static ref EMAIL_RE: Regex = Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").unwrap();
    static ref USERNAME_RE: Regex = Regex::new(r"^[\w\p{Han}]{3,20}$").unwrap();
}

/// Hash a password with a per-user salt (bcrypt embeds the salt in the digest).
pub fn hash_password(plaintext: &str) -> AppResult<String> {
    bcrypt::hash(plaintext, bcrypt::DEFAULT_COST)
        .map_err(|e| AppError::Internal(format!("Password hashing failed: {}", e)))
}

pub fn verify_password(plaintext: &str, digest: &str) -> bool {
    bcrypt::verify(plaintext, digest).unwrap_or(false)
}

pub fn validate_email(email: &str) -> AppResult<()> {
    if EMAIL_RE.is_match(email) {
        Ok(())
    } else {
        Err(AppError::BadRequest("Invalid email format".into()))
    }
}

/// Usernames: 3-20 chars of letters, digits, underscore, or CJK.
pub fn validate_username(username: &str) -> AppResult<()> {
    if USERNAME_RE.is_match(username) {
        Ok(())
    } else {
        Err(AppError::BadRequest(
            "Username must be 3-20 letters, digits, underscores, or CJK characters".into(),
        ))
    }
}

/// Passwords: at least 8 chars, with at least one letter and one digit.
pub fn validate_password(password: &str) -> AppResult<()> {
    let long_enough = password.len() >= 8;
    let has_letter = password.chars().any(|c| c.is_ascii_alphabetic());
    let has_digit = password.chars().any(|c| c.is_ascii_digit());
    if long_enough && has_letter && has_digit {
        Ok(())
    } else {
        Err(AppError::BadRequest(
            "Password must be at least 8 characters and contain a letter and a digit".into(),
        ))
    }
}

/// Generate a cryptographically random 32-byte hex token for email verification.
pub fn generate_verification_token() -> String {
    let mut rng = rand::thread_rng();
    let bytes: [u8; 32] = rng.gen();
    hex::encode(bytes)
}
