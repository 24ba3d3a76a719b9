use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    http::StatusCode,
};

use agrihub_types::models::{ForumPost, ForumReply};
use agrihub_types::{Actor, Envelope};

use crate::actions::{self, POST_GONE};
use crate::boards::ForumBoard;
use crate::error::{ApiError, ApiResult, found, ok};
use crate::filters::ForumFilter;
use crate::forms::{PostEditForm, PostForm, ReplyForm};
use crate::state::AppState;

pub async fn list_posts(
    State(state): State<AppState>,
    Query(filter): Query<ForumFilter>,
) -> ApiResult<Vec<ForumPost>> {
    let mut board = ForumBoard::new(state.db.clone());
    board.load().await;
    board.posts().status().map_err(ApiError::Upstream)?;
    ok(board.visible(&filter).into_iter().cloned().collect())
}

pub async fn get_post(
    State(state): State<AppState>,
    Path(post_id): Path<i64>,
) -> ApiResult<ForumPost> {
    let post = found(state.db.find_post(post_id).await, &format!("Post {post_id} not found"))?;
    ok(post)
}

pub async fn create_post(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Json(form): Json<PostForm>,
) -> Result<(StatusCode, Json<Envelope<ForumPost>>), ApiError> {
    let post = actions::create_post(&state.db, &actor, form).await?;
    Ok((StatusCode::CREATED, Json(Envelope::Success(post))))
}

pub async fn update_post(
    State(state): State<AppState>,
    Path(post_id): Path<i64>,
    Extension(actor): Extension<Actor>,
    Json(form): Json<PostEditForm>,
) -> ApiResult<ForumPost> {
    let post = actions::edit_post(&state.db, post_id, form, &actor).await?;
    ok(post)
}

pub async fn delete_post(
    State(state): State<AppState>,
    Path(post_id): Path<i64>,
    Extension(actor): Extension<Actor>,
) -> ApiResult<()> {
    let post = found(state.db.find_post(post_id).await, POST_GONE)?;
    actions::delete_post(&state.db, &post, &actor).await?;
    ok(())
}

pub async fn add_reply(
    State(state): State<AppState>,
    Path(post_id): Path<i64>,
    Extension(actor): Extension<Actor>,
    Json(form): Json<ReplyForm>,
) -> Result<(StatusCode, Json<Envelope<ForumReply>>), ApiError> {
    let reply = actions::add_reply(&state.db, &actor, post_id, form).await?;
    Ok((StatusCode::CREATED, Json(Envelope::Success(reply))))
}

pub async fn delete_reply(
    State(state): State<AppState>,
    Path(reply_id): Path<i64>,
    Extension(actor): Extension<Actor>,
) -> ApiResult<()> {
    actions::delete_reply(&state.db, reply_id, &actor).await?;
    ok(())
}
