//! Site-level handlers: categories, stats, and the bulk resync sweep.

use axum::Json;
use axum::extract::State;
use axum::response::IntoResponse;

use crate::infra::http::error::ApiError;
use crate::infra::http::state::HttpState;

pub async fn categories(State(state): State<HttpState>) -> Result<impl IntoResponse, ApiError> {
    let categories = state.sync.list_categories().await?;
    Ok(Json(categories))
}

pub async fn stats(State(state): State<HttpState>) -> Result<impl IntoResponse, ApiError> {
    let stats = state.sync.stats().await?;
    Ok(Json(stats))
}

pub async fn resync(State(state): State<HttpState>) -> Result<impl IntoResponse, ApiError> {
    let report = state.sync.resync_all().await?;
    Ok(Json(report))
}
