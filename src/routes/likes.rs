use axum::extract::{Path, Query, State};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::error::AppResult;
use crate::extractors::{CurrentUser, MaybeUser};
use crate::likes::store;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/likes/toggle", post(toggle_like))
        .route(
            "/api/likes/status/{resource_type}/{resource_id}",
            get(like_status),
        )
        .route("/api/likes/user", get(user_likes))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToggleLikeRequest {
    pub resource_type: String,
    pub resource_id: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserLikesQuery {
    #[serde(default = "default_page")]
    pub page: u32,
    #[serde(default = "default_limit")]
    pub limit: u32,
    pub resource_type: Option<String>,
}

fn default_page() -> u32 {
    1
}

fn default_limit() -> u32 {
    20
}

/// POST /api/likes/toggle — auth required.
async fn toggle_like(
    State(state): State<AppState>,
    user: CurrentUser,
    Json(req): Json<ToggleLikeRequest>,
) -> AppResult<Json<Value>> {
    let like = store::toggle(&state.db, &user.id, &req.resource_type, &req.resource_id)?;

    Ok(Json(json!({
        "success": true,
        "message": if like.is_liked { "Liked" } else { "Like removed" },
        "data": like,
    })))
}

/// GET /api/likes/status/{resourceType}/{resourceId} — login optional;
/// anonymous callers get `isLiked: false` and `requiresAuth: true`.
async fn like_status(
    State(state): State<AppState>,
    MaybeUser(user): MaybeUser,
    Path((resource_type, resource_id)): Path<(String, String)>,
) -> AppResult<Json<Value>> {
    let status = store::status(
        &state.db,
        &resource_type,
        &resource_id,
        user.as_ref().map(|u| u.id.as_str()),
    )?;

    Ok(Json(json!({
        "success": true,
        "data": status,
    })))
}

/// GET /api/likes/user — auth required; the caller's own likes, paginated.
async fn user_likes(
    State(state): State<AppState>,
    user: CurrentUser,
    Query(query): Query<UserLikesQuery>,
) -> AppResult<Json<Value>> {
    let page = store::list_for_user(
        &state.db,
        &user.id,
        query.page,
        query.limit,
        query.resource_type.as_deref(),
    )?;

    Ok(Json(json!({
        "success": true,
        "data": {
            "likes": page.likes,
            "pagination": {
                "page": page.page,
                "limit": page.limit,
                "total": page.total,
                "totalPages": page.total_pages,
            }
        }
    })))
}
