use axum::Json;
use axum::extract::{Path, State};
use tracing::instrument;

use crate::entity::content_item::ContentKind;
use crate::error::{AppError, ErrorBody};
use crate::models::content::{PendingResponse, PrivateContentResponse};
use crate::services::content::ContentStore;
use crate::services::identity::Identity;
use crate::state::AppState;

#[utoipa::path(
    post,
    path = "/{kind}/{id}/approve",
    tag = "Moderation",
    operation_id = "approveContent",
    summary = "Approve an item",
    description = "Marks an item approved so it appears in listings and search. Admin only. \
        Approving an already approved item succeeds without change.",
    params(
        ("kind" = ContentKind, Path, description = "series, episode or movie"),
        ("id" = i32, Path, description = "Content ID"),
    ),
    responses(
        (status = 200, description = "Approved item", body = PrivateContentResponse),
        (status = 401, description = "Unauthorized (AUTHENTICATION_REQUIRED, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, identity), fields(user_id = identity.user_id))]
pub async fn approve_content(
    identity: Identity,
    State(state): State<AppState>,
    Path((kind, id)): Path<(ContentKind, i32)>,
) -> Result<Json<PrivateContentResponse>, AppError> {
    let item = ContentStore::new(&state.db, state.gate())
        .approve(kind, id, &identity)
        .await?;
    Ok(Json(PrivateContentResponse::from(item)))
}

#[utoipa::path(
    get,
    path = "/pending",
    tag = "Moderation",
    operation_id = "listPending",
    summary = "Moderation queue",
    description = "All unapproved items grouped by kind, oldest first. Admin only.",
    responses(
        (status = 200, description = "Pending items", body = PendingResponse),
        (status = 401, description = "Unauthorized (AUTHENTICATION_REQUIRED, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, identity), fields(user_id = identity.user_id))]
pub async fn list_pending(
    identity: Identity,
    State(state): State<AppState>,
) -> Result<Json<PendingResponse>, AppError> {
    let queue = ContentStore::new(&state.db, state.gate())
        .list_pending(&identity)
        .await?;
    Ok(Json(PendingResponse::from(queue)))
}
