use std::io;

use axum::Json;
use axum::extract::multipart::Field;
use axum::extract::{Multipart, Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use common::storage::{BlobStore, BoxReader, StoredBlob};
use futures::{StreamExt, TryStreamExt, stream};
use tokio_util::io::StreamReader;
use tracing::{instrument, warn};

use crate::entity::content_item::ContentKind;
use crate::error::{AppError, ErrorBody};
use crate::models::content::*;
use crate::services::content::{ContentStore, NewContent};
use crate::services::engagement::EngagementLedger;
use crate::services::identity::Identity;
use crate::state::AppState;

#[utoipa::path(
    get,
    path = "/{kind}",
    tag = "Content",
    operation_id = "listApprovedContent",
    summary = "List approved items of a kind",
    description = "Returns approved items of the given kind, oldest first.",
    params(("kind" = ContentKind, Path, description = "series, episode or movie")),
    responses(
        (status = 200, description = "Approved items", body = ContentListResponse),
    ),
)]
#[instrument(skip(state))]
pub async fn list_approved(
    State(state): State<AppState>,
    Path(kind): Path<ContentKind>,
) -> Result<Json<ContentListResponse>, AppError> {
    let items = ContentStore::new(&state.db, state.gate())
        .list_approved(kind)
        .await?;
    Ok(Json(ContentListResponse::from(items)))
}

#[utoipa::path(
    post,
    path = "/{kind}",
    tag = "Content",
    operation_id = "submitContent",
    summary = "Submit a series or movie",
    description = "Creates a pending item owned by the caller. Multipart fields: `title` and \
        `description` (required), `private_description`, `season` (series only, defaults to \
        \"Season 1\"), `thumbnail` and `video` (movie only) files. Episodes are submitted \
        through `POST /series/{id}/episodes`.",
    params(("kind" = ContentKind, Path, description = "series or movie")),
    request_body(content_type = "multipart/form-data", description = "Content fields and files"),
    responses(
        (status = 201, description = "Item created, pending approval", body = PrivateContentResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (AUTHENTICATION_REQUIRED, TOKEN_INVALID)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, identity, multipart), fields(user_id = identity.user_id))]
pub async fn submit_content(
    identity: Identity,
    State(state): State<AppState>,
    Path(kind): Path<ContentKind>,
    multipart: Multipart,
) -> Result<impl IntoResponse, AppError> {
    if kind == ContentKind::Episode {
        return Err(AppError::Validation(
            "Episodes are submitted under their series".into(),
        ));
    }
    let fields = read_submission(multipart, &state).await?;
    let uploads = fields.uploads();
    let result = ContentStore::new(&state.db, state.gate())
        .submit(kind, fields, &identity)
        .await;
    let item = discard_on_error(&state, &uploads, result).await?;
    Ok((StatusCode::CREATED, Json(PrivateContentResponse::from(item))))
}

#[utoipa::path(
    get,
    path = "/{kind}/{id}",
    tag = "Content",
    operation_id = "getContent",
    summary = "Get an item",
    description = "Returns the public view of an item regardless of its approval state, with its \
        like count. `liked` is included when the caller is signed in.",
    params(
        ("kind" = ContentKind, Path, description = "series, episode or movie"),
        ("id" = i32, Path, description = "Content ID"),
    ),
    responses(
        (status = 200, description = "Item", body = ContentDetailResponse),
        (status = 401, description = "Invalid token (TOKEN_INVALID)", body = ErrorBody),
        (status = 404, description = "Not found (NOT_FOUND)", body = ErrorBody),
    ),
)]
#[instrument(skip(state, identity))]
pub async fn get_content(
    identity: Option<Identity>,
    State(state): State<AppState>,
    Path((kind, id)): Path<(ContentKind, i32)>,
) -> Result<Json<ContentDetailResponse>, AppError> {
    let item = ContentStore::new(&state.db, state.gate()).get(kind, id).await?;

    let ledger = EngagementLedger::new(&state.db, state.gate());
    let like_count = ledger.like_count(kind, id).await?;
    let liked = match &identity {
        Some(identity) => Some(ledger.has_liked(identity.user_id, kind, id).await?),
        None => None,
    };

    Ok(Json(ContentDetailResponse {
        content: ContentResponse::from(item),
        like_count,
        liked,
    }))
}

#[utoipa::path(
    get,
    path = "/{kind}/{id}/private",
    tag = "Content",
    operation_id = "getPrivateContent",
    summary = "Get an item with private fields",
    description = "Owner or admin view, including `private_description`.",
    params(
        ("kind" = ContentKind, Path, description = "series, episode or movie"),
        ("id" = i32, Path, description = "Content ID"),
    ),
    responses(
        (status = 200, description = "Item", body = PrivateContentResponse),
        (status = 401, description = "Unauthorized (AUTHENTICATION_REQUIRED, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, identity), fields(user_id = identity.user_id))]
pub async fn get_private_content(
    identity: Identity,
    State(state): State<AppState>,
    Path((kind, id)): Path<(ContentKind, i32)>,
) -> Result<Json<PrivateContentResponse>, AppError> {
    let item = ContentStore::new(&state.db, state.gate())
        .get_private(kind, id, &identity)
        .await?;
    Ok(Json(PrivateContentResponse::from(item)))
}

#[utoipa::path(
    get,
    path = "/{id}/episodes",
    tag = "Content",
    operation_id = "listSeriesEpisodes",
    summary = "List approved episodes of a series",
    params(("id" = i32, Path, description = "Series ID")),
    responses(
        (status = 200, description = "Approved episodes, oldest first", body = ContentListResponse),
        (status = 404, description = "Series not found (NOT_FOUND)", body = ErrorBody),
    ),
)]
#[instrument(skip(state))]
pub async fn list_series_episodes(
    State(state): State<AppState>,
    Path(series_id): Path<i32>,
) -> Result<Json<ContentListResponse>, AppError> {
    let items = ContentStore::new(&state.db, state.gate())
        .list_series_episodes(series_id)
        .await?;
    Ok(Json(ContentListResponse::from(items)))
}

#[utoipa::path(
    post,
    path = "/{id}/episodes",
    tag = "Content",
    operation_id = "submitEpisode",
    summary = "Submit an episode under a series",
    description = "Creates a pending episode. Who may add episodes is governed by the configured \
        episode policy (by default, the series creator only). Multipart fields as for \
        `POST /content/movie`.",
    params(("id" = i32, Path, description = "Series ID")),
    request_body(content_type = "multipart/form-data", description = "Episode fields and files"),
    responses(
        (status = 201, description = "Episode created, pending approval", body = PrivateContentResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (AUTHENTICATION_REQUIRED, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Series not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, identity, multipart), fields(user_id = identity.user_id))]
pub async fn submit_episode(
    identity: Identity,
    State(state): State<AppState>,
    Path(series_id): Path<i32>,
    multipart: Multipart,
) -> Result<impl IntoResponse, AppError> {
    let store = ContentStore::new(&state.db, state.gate());
    // Refuse before any file part is read.
    store.authorize_episode(series_id, &identity).await?;

    let fields = read_submission(multipart, &state).await?;
    let uploads = fields.uploads();
    let result = store.submit_episode(series_id, fields, &identity).await;
    let item = discard_on_error(&state, &uploads, result).await?;
    Ok((StatusCode::CREATED, Json(PrivateContentResponse::from(item))))
}

#[utoipa::path(
    get,
    path = "/search",
    tag = "Content",
    operation_id = "searchContent",
    summary = "Search approved series and movies",
    params(SearchQuery),
    responses(
        (status = 200, description = "Matching items", body = ContentListResponse),
    ),
)]
#[instrument(skip(state, query), fields(q = query.q.as_deref().unwrap_or("")))]
pub async fn search(
    State(state): State<AppState>,
    Query(query): Query<SearchQuery>,
) -> Result<Json<ContentListResponse>, AppError> {
    let items = ContentStore::new(&state.db, state.gate())
        .search(query.q.as_deref().unwrap_or(""))
        .await?;
    Ok(Json(ContentListResponse::from(items)))
}

/// Collect a multipart submission. Files are written to the blob store as
/// they arrive; text fields are kept. If the form turns out to be invalid,
/// files already written are discarded.
async fn read_submission(mut multipart: Multipart, state: &AppState) -> Result<NewContent, AppError> {
    let mut fields = NewContent::default();
    if let Err(e) = collect_fields(&mut multipart, state, &mut fields).await {
        discard_uploads(state, &fields.uploads()).await;
        return Err(e);
    }
    Ok(fields)
}

async fn collect_fields(
    multipart: &mut Multipart,
    state: &AppState,
    fields: &mut NewContent,
) -> Result<(), AppError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(format!("Multipart error: {e}")))?
    {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "title" => fields.title = read_text(field).await?,
            "description" => fields.description = read_text(field).await?,
            "private_description" => fields.private_description = Some(read_text(field).await?),
            "season" => fields.season = Some(read_text(field).await?),
            "thumbnail" => {
                reject_repeated(&fields.thumbnail, &name)?;
                fields.thumbnail = stream_field_to_store(field, state.blob_store.as_ref()).await?;
            }
            "video" | "video_data" => {
                reject_repeated(&fields.video, &name)?;
                fields.video = stream_field_to_store(field, state.blob_store.as_ref()).await?;
            }
            other => {
                return Err(AppError::Validation(format!("Unknown field '{other}'")));
            }
        }
    }

    Ok(())
}

fn reject_repeated(slot: &Option<StoredBlob>, name: &str) -> Result<(), AppError> {
    match slot {
        Some(_) => Err(AppError::Validation(format!("Field '{name}' given more than once"))),
        None => Ok(()),
    }
}

async fn read_text(field: Field<'_>) -> Result<String, AppError> {
    field
        .text()
        .await
        .map_err(|e| AppError::Validation(format!("Upload read error: {e}")))
}

/// Stream a multipart file field straight into blob storage. The store
/// enforces the size limit while hashing.
///
/// An empty file part (a form submitted without choosing a file) counts as no
/// file.
async fn stream_field_to_store(
    mut field: Field<'_>,
    blob_store: &dyn BlobStore,
) -> Result<Option<StoredBlob>, AppError> {
    let Some(first) = field
        .chunk()
        .await
        .map_err(|e| AppError::Validation(format!("Upload read error: {e}")))?
    else {
        return Ok(None);
    };

    let chunks = stream::iter([Ok(first)]).chain(field.map_err(io::Error::other));
    let reader: BoxReader<'_> = Box::new(StreamReader::new(chunks));
    Ok(Some(blob_store.put_stream(reader).await?))
}

async fn discard_on_error<T>(
    state: &AppState,
    uploads: &[StoredBlob],
    result: Result<T, AppError>,
) -> Result<T, AppError> {
    if result.is_err() {
        discard_uploads(state, uploads).await;
    }
    result
}

/// Delete blobs written for a rejected submission. Blobs that existed before
/// the request, or that some item references, stay.
async fn discard_uploads(state: &AppState, uploads: &[StoredBlob]) {
    let store = ContentStore::new(&state.db, state.gate());
    for blob in uploads.iter().filter(|blob| blob.created) {
        match store.references_blob(&blob.hash).await {
            Ok(true) => {}
            Ok(false) => {
                if let Err(e) = state.blob_store.remove(&blob.hash).await {
                    warn!(hash = %blob.hash, "Failed to discard upload: {}", e);
                }
            }
            Err(e) => warn!(hash = %blob.hash, "Failed to check blob references: {:?}", e),
        }
    }
}
