//! Comment handlers: intake and the public (approved-only) listing.

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;

use crate::application::comments::NewComment;
use crate::infra::http::error::ApiError;
use crate::infra::http::models::CommentCreateRequest;
use crate::infra::http::state::HttpState;

pub async fn create(
    State(state): State<HttpState>,
    Path(slug): Path<String>,
    Json(payload): Json<CommentCreateRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let comment = state
        .comments
        .add_comment(
            &slug,
            NewComment {
                author_name: payload.author_name,
                email: payload.email,
                body: payload.body,
            },
        )
        .await?;

    Ok((StatusCode::CREATED, Json(comment)))
}

pub async fn list(
    State(state): State<HttpState>,
    Path(slug): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let comments = state.comments.list_comments(&slug).await?;
    Ok(Json(comments))
}
