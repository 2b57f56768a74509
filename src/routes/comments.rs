use axum::extract::{Path, State};
use axum::routing::{delete, get, post, put};
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::comments::store::{self, NewComment};
use crate::comments::tree::build_tree;
use crate::error::AppResult;
use crate::extractors::CurrentUser;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/api/comments/{resource_type}/{resource_id}",
            get(list_comments),
        )
        .route("/api/comments", post(create_comment))
        .route("/api/comments/{comment_id}", put(update_comment))
        .route("/api/comments/{comment_id}", delete(delete_comment))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateCommentRequest {
    pub resource_type: String,
    pub resource_id: String,
    pub content: String,
    pub parent_id: Option<String>,
}

#[derive(Deserialize)]
pub struct UpdateCommentRequest {
    pub content: String,
}

/// GET /api/comments/{resourceType}/{resourceId} — public; nested tree plus
/// the flat total.
async fn list_comments(
    State(state): State<AppState>,
    Path((resource_type, resource_id)): Path<(String, String)>,
) -> AppResult<Json<Value>> {
    let records = store::list(&state.db, &resource_type, &resource_id)?;
    let total = records.len();
    let comments = build_tree(records);

    Ok(Json(json!({
        "success": true,
        "data": {
            "comments": comments,
            "total": total,
        }
    })))
}

/// POST /api/comments — auth required.
async fn create_comment(
    State(state): State<AppState>,
    user: CurrentUser,
    Json(req): Json<CreateCommentRequest>,
) -> AppResult<Json<Value>> {
    let record = store::create(
        &state.db,
        &user.id,
        &NewComment {
            resource_type: req.resource_type,
            resource_id: req.resource_id,
            content: req.content,
            parent_id: req.parent_id,
        },
    )?;

    Ok(Json(json!({
        "success": true,
        "message": "Comment created",
        "data": {
            "comment": {
                "id": record.id,
                "content": record.content,
                "parentId": record.parent_id,
                "likeCount": record.like_count,
                "createdAt": record.created_at,
                "updatedAt": record.updated_at,
                "user": record.author,
            }
        }
    })))
}

/// PUT /api/comments/{commentId} — auth required, owner only.
async fn update_comment(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(comment_id): Path<String>,
    Json(req): Json<UpdateCommentRequest>,
) -> AppResult<Json<Value>> {
    let (content, updated_at) = store::update(&state.db, &user.id, &comment_id, &req.content)?;

    Ok(Json(json!({
        "success": true,
        "message": "Comment updated",
        "data": {
            "comment": {
                "id": comment_id,
                "content": content,
                "updatedAt": updated_at,
            }
        }
    })))
}

/// DELETE /api/comments/{commentId} — auth required, owner only; soft delete.
async fn delete_comment(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(comment_id): Path<String>,
) -> AppResult<Json<Value>> {
    store::soft_delete(&state.db, &user.id, &comment_id)?;

    Ok(Json(json!({
        "success": true,
        "message": "Comment deleted",
    })))
}
