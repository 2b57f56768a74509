//! Comment persistence: flat listing, creation, edits, soft deletion.
//!
//! Validation happens here, before any mutation, so handlers stay thin.
//! Soft-deleted rows stay in storage to keep reply threads anchored but are
//! excluded from listings and from valid reply targets.

use rusqlite::{params, OptionalExtension};

use crate::comments::tree::{CommentAuthor, CommentRecord};
use crate::comments::RESOURCE_NEWS;
use crate::db;
use crate::error::{AppError, AppResult};
use crate::state::DbPool;

pub struct NewComment {
    pub resource_type: String,
    pub resource_id: String,
    pub content: String,
    pub parent_id: Option<String>,
}

/// Trim and bounds-check comment content (1-1000 chars after trim).
fn validate_content(raw: &str) -> AppResult<String> {
    let trimmed = raw.trim();
    let len = trimmed.chars().count();
    if len < 1 || len > 1000 {
        return Err(AppError::InvalidContent(
            "Comment must be between 1 and 1000 characters".into(),
        ));
    }
    Ok(trimmed.to_string())
}

fn ensure_commentable(resource_type: &str) -> AppResult<()> {
    // Only news items carry comment threads for now
    if resource_type != RESOURCE_NEWS {
        return Err(AppError::UnsupportedResource(resource_type.into()));
    }
    Ok(())
}

const RECORD_COLUMNS: &str = "
    c.id, c.parent_id, c.content,
    (SELECT COUNT(*) FROM likes l
       WHERE l.resource_type = 'comment' AND l.resource_id = c.id) AS like_count,
    c.created_at, c.updated_at,
    u.id, u.username, u.display_name, u.avatar_url";

fn record_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<CommentRecord> {
    Ok(CommentRecord {
        id: row.get(0)?,
        parent_id: row.get(1)?,
        content: row.get(2)?,
        like_count: row.get(3)?,
        created_at: row.get(4)?,
        updated_at: row.get(5)?,
        author: CommentAuthor {
            id: row.get(6)?,
            username: row.get(7)?,
            display_name: row.get(8)?,
            avatar_url: row.get(9)?,
        },
    })
}

/// Non-deleted comments for a resource, author fields joined in, ordered by
/// creation time (UUIDv7 ids break same-millisecond ties in insert order).
pub fn list(pool: &DbPool, resource_type: &str, resource_id: &str) -> AppResult<Vec<CommentRecord>> {
    ensure_commentable(resource_type)?;

    let conn = pool.get()?;
    let sql = format!(
        "SELECT {RECORD_COLUMNS}
         FROM comments c
         JOIN users u ON u.id = c.user_id
         WHERE c.resource_type = ?1 AND c.resource_id = ?2 AND c.is_deleted = 0
         ORDER BY c.created_at ASC, c.id ASC"
    );
    let mut stmt = conn.prepare(&sql)?;
    let records = stmt
        .query_map(params![resource_type, resource_id], record_from_row)?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(records)
}

/// Validate and insert a new comment, returning it with author fields.
pub fn create(pool: &DbPool, user_id: &str, new: &NewComment) -> AppResult<CommentRecord> {
    ensure_commentable(&new.resource_type)?;
    let content = validate_content(&new.content)?;

    let conn = pool.get()?;

    let target_exists: bool = conn.query_row(
        "SELECT COUNT(*) > 0 FROM news WHERE id = ?1",
        params![new.resource_id],
        |row| row.get(0),
    )?;
    if !target_exists {
        return Err(AppError::ResourceNotFound("News item does not exist".into()));
    }

    if let Some(parent_id) = &new.parent_id {
        // Parent must be live and on the same resource
        let parent_ok: bool = conn.query_row(
            "SELECT COUNT(*) > 0 FROM comments
             WHERE id = ?1 AND resource_type = ?2 AND resource_id = ?3 AND is_deleted = 0",
            params![parent_id, new.resource_type, new.resource_id],
            |row| row.get(0),
        )?;
        if !parent_ok {
            return Err(AppError::InvalidParent);
        }
    }

    let comment_id = uuid::Uuid::now_v7().to_string();
    conn.execute(
        "INSERT INTO comments (id, user_id, resource_type, resource_id, parent_id, content)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        params![
            comment_id,
            user_id,
            new.resource_type,
            new.resource_id,
            new.parent_id,
            content
        ],
    )
    .map_err(AppError::from_sqlite)?;

    let sql = format!(
        "SELECT {RECORD_COLUMNS}
         FROM comments c
         JOIN users u ON u.id = c.user_id
         WHERE c.id = ?1"
    );
    let record = conn.query_row(&sql, params![comment_id], record_from_row)?;
    Ok(record)
}

/// Ownership/liveness checks shared by update and soft_delete.
fn fetch_owned_live(
    conn: &rusqlite::Connection,
    user_id: &str,
    comment_id: &str,
    forbidden_msg: &str,
) -> AppResult<()> {
    let row = conn
        .query_row(
            "SELECT user_id, is_deleted FROM comments WHERE id = ?1",
            params![comment_id],
            |row| Ok((row.get::<_, String>(0)?, row.get::<_, bool>(1)?)),
        )
        .optional()?;

    let (owner_id, is_deleted) =
        row.ok_or_else(|| AppError::NotFound("Comment does not exist".into()))?;
    if is_deleted {
        return Err(AppError::AlreadyDeleted);
    }
    if owner_id != user_id {
        return Err(AppError::Forbidden(forbidden_msg.into()));
    }
    Ok(())
}

/// Edit a comment's content. Only the author may edit, and only while the
/// comment is live. Returns (content, updated_at).
pub fn update(
    pool: &DbPool,
    user_id: &str,
    comment_id: &str,
    content: &str,
) -> AppResult<(String, String)> {
    let conn = pool.get()?;
    fetch_owned_live(&conn, user_id, comment_id, "You can only edit your own comments")?;
    let content = validate_content(content)?;

    let updated_at = db::now_utc();
    conn.execute(
        "UPDATE comments SET content = ?1, updated_at = ?2 WHERE id = ?3",
        params![content, updated_at, comment_id],
    )
    .map_err(AppError::from_sqlite)?;

    Ok((content, updated_at))
}

/// Mark a comment deleted. The row stays so existing replies keep their
/// anchor; listings and reply-target checks exclude it.
pub fn soft_delete(pool: &DbPool, user_id: &str, comment_id: &str) -> AppResult<()> {
    let conn = pool.get()?;
    fetch_owned_live(&conn, user_id, comment_id, "You can only delete your own comments")?;

    conn.execute(
        "UPDATE comments SET is_deleted = 1, updated_at = ?1 WHERE id = ?2",
        params![db::now_utc(), comment_id],
    )
    .map_err(AppError::from_sqlite)?;

    Ok(())
}
