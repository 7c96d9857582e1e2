use axum::Json;
use axum::extract::{Path, Query, State};
use tracing::instrument;

use crate::entity::content_item::ContentKind;
use crate::error::{AppError, ErrorBody};
use crate::models::engagement::{LikeQuery, LikeResponse, MegaLikeResponse};
use crate::services::engagement::EngagementLedger;
use crate::services::identity::Identity;
use crate::state::AppState;

#[utoipa::path(
    post,
    path = "/{kind}/{id}/like",
    tag = "Engagement",
    operation_id = "likeContent",
    summary = "Like an item",
    description = "Records the caller's like. In `toggle` mode an existing like is removed; in \
        `add_once` mode it is left alone. The mode defaults to the server configuration.",
    params(
        ("kind" = ContentKind, Path, description = "series, episode or movie"),
        ("id" = i32, Path, description = "Content ID"),
        LikeQuery,
    ),
    responses(
        (status = 200, description = "Like state after the request", body = LikeResponse),
        (status = 401, description = "Unauthorized (AUTHENTICATION_REQUIRED, TOKEN_INVALID)", body = ErrorBody),
        (status = 404, description = "Not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, identity, query))]
pub async fn like_content(
    identity: Option<Identity>,
    State(state): State<AppState>,
    Path((kind, id)): Path<(ContentKind, i32)>,
    Query(query): Query<LikeQuery>,
) -> Result<Json<LikeResponse>, AppError> {
    let mode = query.mode.unwrap_or(state.config.engagement.like_mode);
    let result = EngagementLedger::new(&state.db, state.gate())
        .toggle_or_add(identity.as_ref(), kind, id, mode)
        .await?;
    Ok(Json(LikeResponse::from(result)))
}

#[utoipa::path(
    post,
    path = "/{id}/mega-like",
    tag = "Engagement",
    operation_id = "megaLike",
    summary = "Make every user like a series",
    description = "Adds a like from every registered user who does not already like the series. \
        Never removes likes. Admin only.",
    params(("id" = i32, Path, description = "Series ID")),
    responses(
        (status = 200, description = "Number of likes added", body = MegaLikeResponse),
        (status = 401, description = "Unauthorized (AUTHENTICATION_REQUIRED, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Series not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, identity), fields(user_id = identity.user_id))]
pub async fn mega_like(
    identity: Identity,
    State(state): State<AppState>,
    Path(series_id): Path<i32>,
) -> Result<Json<MegaLikeResponse>, AppError> {
    let inserted = EngagementLedger::new(&state.db, state.gate())
        .mega_like(series_id, &identity)
        .await?;
    Ok(Json(MegaLikeResponse { inserted }))
}
