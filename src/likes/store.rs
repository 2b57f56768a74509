//! Like membership: one row per (user, resource), toggled on and off.
//!
//! The toggle is check-then-act, so the UNIQUE constraint on
//! (user_id, resource_type, resource_id) is the authority that prevents
//! duplicates under concurrent double-clicks: the DELETE is atomic by the
//! natural key, and the insert is `INSERT OR IGNORE` so a concurrent winner
//! is treated as "already liked", never surfaced as an error.
//!
//! Counts are always computed live from this table, for news and comments
//! alike; no cached counter to drift.

use rusqlite::params;
use serde::Serialize;

use crate::comments::{RESOURCE_COMMENT, RESOURCE_NEWS};
use crate::error::{AppError, AppResult};
use crate::state::DbPool;

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct LikeState {
    pub is_liked: bool,
    pub like_count: i64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LikeStatus {
    pub like_count: i64,
    pub is_liked: bool,
    pub requires_auth: bool,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserLike {
    pub id: String,
    pub resource_type: String,
    pub resource_id: String,
    pub created_at: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserLikesPage {
    pub likes: Vec<UserLike>,
    pub page: u32,
    pub limit: u32,
    pub total: i64,
    pub total_pages: i64,
}

fn ensure_likeable(resource_type: &str) -> AppResult<()> {
    if resource_type != RESOURCE_NEWS && resource_type != RESOURCE_COMMENT {
        return Err(AppError::UnsupportedResource(resource_type.into()));
    }
    Ok(())
}

/// Target must exist; soft-deleted comments are not valid like targets.
fn ensure_target_exists(
    conn: &rusqlite::Connection,
    resource_type: &str,
    resource_id: &str,
) -> AppResult<()> {
    let exists: bool = if resource_type == RESOURCE_NEWS {
        conn.query_row(
            "SELECT COUNT(*) > 0 FROM news WHERE id = ?1",
            params![resource_id],
            |row| row.get(0),
        )?
    } else {
        conn.query_row(
            "SELECT COUNT(*) > 0 FROM comments WHERE id = ?1 AND is_deleted = 0",
            params![resource_id],
            |row| row.get(0),
        )?
    };

    if !exists {
        return Err(AppError::ResourceNotFound(match resource_type {
            RESOURCE_NEWS => "News item does not exist".into(),
            _ => "Comment does not exist".into(),
        }));
    }
    Ok(())
}

fn count_likes(
    conn: &rusqlite::Connection,
    resource_type: &str,
    resource_id: &str,
) -> AppResult<i64> {
    let count = conn.query_row(
        "SELECT COUNT(*) FROM likes WHERE resource_type = ?1 AND resource_id = ?2",
        params![resource_type, resource_id],
        |row| row.get(0),
    )?;
    Ok(count)
}

/// Flip the caller's like for a resource and return the resulting state.
pub fn toggle(
    pool: &DbPool,
    user_id: &str,
    resource_type: &str,
    resource_id: &str,
) -> AppResult<LikeState> {
    ensure_likeable(resource_type)?;

    let conn = pool.get()?;
    ensure_target_exists(&conn, resource_type, resource_id)?;

    let removed = conn
        .execute(
            "DELETE FROM likes WHERE user_id = ?1 AND resource_type = ?2 AND resource_id = ?3",
            params![user_id, resource_type, resource_id],
        )
        .map_err(AppError::from_sqlite)?;

    let is_liked = if removed == 0 {
        // Not liked yet; OR IGNORE resolves the race where a concurrent
        // toggle inserted first — either way the row now exists.
        conn.execute(
            "INSERT OR IGNORE INTO likes (id, user_id, resource_type, resource_id)
             VALUES (?1, ?2, ?3, ?4)",
            params![
                uuid::Uuid::now_v7().to_string(),
                user_id,
                resource_type,
                resource_id
            ],
        )
        .map_err(AppError::from_sqlite)?;
        true
    } else {
        false
    };

    let like_count = count_likes(&conn, resource_type, resource_id)?;
    Ok(LikeState { is_liked, like_count })
}

/// Read-only like state. `is_liked` is always false (and `requires_auth`
/// true) without an authenticated caller.
pub fn status(
    pool: &DbPool,
    resource_type: &str,
    resource_id: &str,
    user_id: Option<&str>,
) -> AppResult<LikeStatus> {
    ensure_likeable(resource_type)?;

    let conn = pool.get()?;
    let like_count = count_likes(&conn, resource_type, resource_id)?;

    let is_liked = match user_id {
        Some(uid) => conn.query_row(
            "SELECT COUNT(*) > 0 FROM likes
             WHERE user_id = ?1 AND resource_type = ?2 AND resource_id = ?3",
            params![uid, resource_type, resource_id],
            |row| row.get(0),
        )?,
        None => false,
    };

    Ok(LikeStatus {
        like_count,
        is_liked,
        requires_auth: user_id.is_none(),
    })
}

/// The caller's likes, newest first, offset+limit paginated.
pub fn list_for_user(
    pool: &DbPool,
    user_id: &str,
    page: u32,
    limit: u32,
    resource_type: Option<&str>,
) -> AppResult<UserLikesPage> {
    let page = page.max(1);
    let limit = limit.clamp(1, 100);
    // i64 keeps the offset from overflowing on absurd page values
    let offset = (i64::from(page) - 1) * i64::from(limit);

    if let Some(rt) = resource_type {
        ensure_likeable(rt)?;
    }

    let conn = pool.get()?;
    // Filter collapses to a no-op when no resource type is given
    let type_filter = resource_type.unwrap_or("");

    let mut stmt = conn.prepare(
        "SELECT id, resource_type, resource_id, created_at FROM likes
         WHERE user_id = ?1 AND (?2 = '' OR resource_type = ?2)
         ORDER BY created_at DESC, id DESC
         LIMIT ?3 OFFSET ?4",
    )?;
    let likes = stmt
        .query_map(
            params![user_id, type_filter, limit, offset],
            |row| {
                Ok(UserLike {
                    id: row.get(0)?,
                    resource_type: row.get(1)?,
                    resource_id: row.get(2)?,
                    created_at: row.get(3)?,
                })
            },
        )?
        .collect::<Result<Vec<_>, _>>()?;

    let total: i64 = conn.query_row(
        "SELECT COUNT(*) FROM likes WHERE user_id = ?1 AND (?2 = '' OR resource_type = ?2)",
        params![user_id, type_filter],
        |row| row.get(0),
    )?;

    Ok(UserLikesPage {
        likes,
        page,
        limit,
        total,
        total_pages: (total + limit as i64 - 1) / limit as i64,
    })
}
