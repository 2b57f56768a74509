use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub email: String,
    pub username: String,
    pub display_name: Option<String>,
    pub avatar_url: Option<String>,
    pub password_hash: String,
    pub is_verified: bool,
    pub is_active: bool,
    pub last_login_at: Option<String>,
    pub created_at: String,
}

impl User {
    /// Column list matching `from_row`, for SELECTs over the users table.
    pub const COLUMNS: &'static str = "id, email, username, display_name, avatar_url, \
         password_hash, is_verified, is_active, last_login_at, created_at";

    pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            email: row.get(1)?,
            username: row.get(2)?,
            display_name: row.get(3)?,
            avatar_url: row.get(4)?,
            password_hash: row.get(5)?,
            is_verified: row.get(6)?,
            is_active: row.get(7)?,
            last_login_at: row.get(8)?,
            created_at: row.get(9)?,
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmailVerification {
    pub id: String,
    pub user_id: String,
    pub token: String,
    pub expires_at: String,
    pub verified_at: Option<String>,
    pub created_at: String,
}

impl EmailVerification {
    pub const COLUMNS: &'static str = "id, user_id, token, expires_at, verified_at, created_at";

    pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            user_id: row.get(1)?,
            token: row.get(2)?,
            expires_at: row.get(3)?,
            verified_at: row.get(4)?,
            created_at: row.get(5)?,
        })
    }
}
