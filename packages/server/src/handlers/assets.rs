use axum::body::Body;
use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode, header};
use axum::response::{IntoResponse, Response};
use tokio_util::io::ReaderStream;
use tracing::instrument;

use crate::entity::content_item::ContentKind;
use crate::error::{AppError, ErrorBody};
use crate::services::assets::{AssetField, AssetRef, AssetStream, AssetStreamer};
use crate::state::AppState;

#[utoipa::path(
    get,
    path = "/{kind}/{id}/assets/{field}",
    tag = "Assets",
    operation_id = "streamAsset",
    summary = "Stream a thumbnail or video",
    description = "Streams the stored bytes with a fixed media type (`image/jpeg` for thumbnails, \
        `video/mp4` for videos). An item without the requested asset yields 200 with an empty \
        body. Supports `If-None-Match` conditional requests via the `ETag` header.",
    params(
        ("kind" = ContentKind, Path, description = "series, episode or movie"),
        ("id" = i32, Path, description = "Content ID"),
        ("field" = AssetField, Path, description = "thumbnail or video"),
    ),
    responses(
        (status = 200, description = "Asset bytes, possibly empty"),
        (status = 304, description = "Not modified"),
        (status = 400, description = "The kind has no such field (VALIDATION_ERROR)", body = ErrorBody),
        (status = 404, description = "Content not found (NOT_FOUND)", body = ErrorBody),
    ),
)]
#[instrument(skip(state, headers))]
pub async fn stream_asset(
    State(state): State<AppState>,
    Path((kind, id, field)): Path<(ContentKind, i32, AssetField)>,
    headers: HeaderMap,
) -> Result<Response, AppError> {
    let streamer = AssetStreamer::new(&state.db, state.blob_store.as_ref());

    if let Some(if_none_match) = headers.get(header::IF_NONE_MATCH)
        && let Ok(val) = if_none_match.to_str()
        && let Some(asset) = streamer.locate(kind, id, field).await?
        && (val == etag_of(&asset) || val == "*")
    {
        return Ok(StatusCode::NOT_MODIFIED.into_response());
    }

    match streamer.stream(kind, id, field).await? {
        AssetStream::Present { asset, reader } => {
            build_asset_response(&asset, Body::from_stream(ReaderStream::new(reader)))
        }
        AssetStream::Absent => empty_asset_response(field),
    }
}

fn etag_of(asset: &AssetRef) -> String {
    format!("\"{}\"", asset.hash)
}

fn build_asset_response(asset: &AssetRef, body: Body) -> Result<Response, AppError> {
    Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, asset.media_type)
        .header(header::CONTENT_LENGTH, asset.size.to_string())
        .header(header::ETAG, etag_of(asset))
        .header(header::CACHE_CONTROL, "public, max-age=3600")
        .body(body)
        .map_err(|e| AppError::Internal(format!("Failed to build response: {e}")))
}

/// A present item with a null asset field: success, no bytes.
fn empty_asset_response(field: AssetField) -> Result<Response, AppError> {
    Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, field.media_type())
        .header(header::CONTENT_LENGTH, "0")
        .body(Body::empty())
        .map_err(|e| AppError::Internal(format!("Failed to build response: {e}")))
}
