use crate::error::{AppError, Result};
use crate::model::{
    BatchRequestItem, BatchResponseItem, ShortenRequest, ShortenResponse, UserUrlResponse,
};
use crate::state::AppState;
use axum::extract::{Path, State};
use axum::http::header::CONTENT_TYPE;
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Redirect, Response};
use axum::{Extension, Json};
use shortie_core::{OwnerId, ShortId};
use shortie_shortener::{BatchItem, ShortenerError, Shortened};

/// 201 for a new mapping, 409 when the URL was shortened before.
fn creation_status(shortened: &Shortened) -> StatusCode {
    if shortened.created {
        StatusCode::CREATED
    } else {
        StatusCode::CONFLICT
    }
}

pub async fn create_text_handler(
    State(state): State<AppState>,
    Extension(owner): Extension<OwnerId>,
    headers: HeaderMap,
    body: String,
) -> Result<Response> {
    if let Some(content_type) = headers.get(CONTENT_TYPE) {
        let is_text = content_type
            .to_str()
            .is_ok_and(|value| value.starts_with("text/plain"));
        if !is_text {
            return Err(AppError::BadRequest(
                "Content-Type must be text/plain".to_string(),
            ));
        }
    }

    let shortened = state.shortener().shorten(body.trim(), &owner).await?;
    Ok((
        creation_status(&shortened),
        [(CONTENT_TYPE, "text/plain; charset=utf-8")],
        shortened.short_url,
    )
        .into_response())
}

pub async fn create_json_handler(
    State(state): State<AppState>,
    Extension(owner): Extension<OwnerId>,
    Json(request): Json<ShortenRequest>,
) -> Result<Response> {
    let shortened = state.shortener().shorten(request.url.trim(), &owner).await?;
    Ok((
        creation_status(&shortened),
        Json(ShortenResponse {
            result: shortened.short_url,
        }),
    )
        .into_response())
}

pub async fn create_batch_handler(
    State(state): State<AppState>,
    Extension(owner): Extension<OwnerId>,
    Json(request): Json<Vec<BatchRequestItem>>,
) -> Result<(StatusCode, Json<Vec<BatchResponseItem>>)> {
    let items: Vec<BatchItem> = request.into_iter().map(BatchItem::from).collect();
    let shortened = state.shortener().shorten_batch(&items, &owner).await?;

    Ok((
        StatusCode::CREATED,
        Json(shortened.into_iter().map(BatchResponseItem::from).collect()),
    ))
}

pub async fn redirect_handler(
    Path(id): Path<String>,
    State(state): State<AppState>,
) -> Result<Redirect> {
    // Restored ids need not match the generated alphabet, so only an empty
    // id is ruled out up front.
    if id.is_empty() {
        return Err(ShortenerError::NotFound(id).into());
    }
    let id = ShortId::new_unchecked(id);
    let original_url = state.shortener().resolve(&id).await?;
    Ok(Redirect::temporary(&original_url))
}

pub async fn list_user_urls_handler(
    State(state): State<AppState>,
    Extension(owner): Extension<OwnerId>,
) -> Result<Response> {
    let urls = state.shortener().list(&owner).await?;
    if urls.is_empty() {
        return Ok(StatusCode::NO_CONTENT.into_response());
    }

    let urls: Vec<UserUrlResponse> = urls.into_iter().map(UserUrlResponse::from).collect();
    Ok(Json(urls).into_response())
}

pub async fn delete_user_urls_handler(
    State(state): State<AppState>,
    Extension(owner): Extension<OwnerId>,
    Json(ids): Json<Vec<String>>,
) -> Result<StatusCode> {
    let ids: Vec<ShortId> = ids
        .into_iter()
        .filter(|id| !id.is_empty())
        .map(ShortId::new_unchecked)
        .collect();
    state.shortener().delete(&owner, &ids).await?;
    Ok(StatusCode::ACCEPTED)
}
