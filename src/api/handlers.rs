use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Path, Query, State,
    },
    Extension, Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{auth::AuthUser, error::ApiError, AppState};
use crate::{
    catalog::{resolver, CatalogFilter},
    extractors::episodes,
    models::{CatalogItem, EntryPreview, EpisodesResponse},
};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    pub user: String,
    pub access_code: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

pub async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({"status": "ok"}))
}

/// Resolves the entry, scrapes its page and returns the tokenised episodes.
pub async fn list_episodes(
    State(state): State<AppState>,
    Path((server, entry)): Path<(String, String)>,
) -> Result<Json<EpisodesResponse>, ApiError> {
    let resolved = resolver::resolve(&state.store, &server, &entry).await?;

    let episodes = episodes::load_episodes(&resolved.fetch_url, &state.codec)
        .await
        .map_err(|err| {
            log::error!("[episodes] fetching {} failed: {err:#}", resolved.fetch_url);
            ApiError::internal("failed to fetch source page")
        })?;

    log::debug!(
        "[episodes] {server}/{entry}: {} episodes from {}",
        episodes.len(),
        resolved.fetch_url
    );

    let preview = resolved.preview;
    Ok(Json(EpisodesResponse {
        server,
        entry,
        title: preview.title,
        synopsis: preview.synopsis,
        cover: preview.cover,
        episode_count: preview.episode_count,
        genres: preview.genres,
        total_extracted: episodes.len(),
        episodes,
    }))
}

pub async fn list_catalog(
    State(state): State<AppState>,
    Path(server): Path<String>,
    filter: Result<Query<CatalogFilter>, QueryRejection>,
) -> Result<Json<Vec<CatalogItem>>, ApiError> {
    let Query(filter) = filter.map_err(|err| ApiError::bad_request(err.body_text()))?;

    Ok(Json(resolver::list(&state.store, &server, &filter).await?))
}

pub async fn preview_entry(
    State(state): State<AppState>,
    Path((server, entry)): Path<(String, String)>,
) -> Result<Json<EntryPreview>, ApiError> {
    Ok(Json(resolver::preview(&state.store, &server, &entry).await?))
}

pub async fn login(
    State(state): State<AppState>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<Json<LoginResponse>, ApiError> {
    let Json(request) = payload.map_err(|err| ApiError::bad_request(err.body_text()))?;

    let record = resolver::lookup_user(&state.store, &request.user).await?;

    match record {
        None => {
            log::warn!("[auth] login attempt for unknown user {}", request.user);
            return Err(ApiError::invalid_credentials());
        }
        Some(record) if record.access_code != request.access_code => {
            log::warn!("[auth] wrong access code for user {}", request.user);
            return Err(ApiError::invalid_credentials());
        }
        Some(_) => {}
    }

    let (token, expires_at) = state.auth.issue(&request.user).map_err(|err| {
        log::error!("[auth] cannot sign session token: {err}");
        ApiError::internal("internal error")
    })?;

    log::info!("[auth] {} logged in", request.user);

    Ok(Json(LoginResponse { token, expires_at }))
}

pub async fn me(Extension(user): Extension<AuthUser>) -> Json<AuthUser> {
    Json(user)
}
