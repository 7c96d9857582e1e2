use axum::extract::DefaultBodyLimit;
use utoipa_axum::router::OpenApiRouter;
use utoipa_axum::routes;

use crate::config::AppConfig;
use crate::handlers;
use crate::state::AppState;

/// Room for the text fields and multipart framing of a submission.
const FORM_OVERHEAD: usize = 1024 * 1024;

pub fn routes(config: &AppConfig) -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .nest("/auth", auth_routes())
        .nest("/content", content_routes(config))
        .nest("/series", series_routes(config))
        .nest("/moderation", moderation_routes())
        .routes(routes!(handlers::content::search))
}

/// A submission carries up to two files (thumbnail and video).
fn upload_limit(config: &AppConfig) -> DefaultBodyLimit {
    let per_file = usize::try_from(config.storage.max_blob_size).unwrap_or(usize::MAX);
    DefaultBodyLimit::max(per_file.saturating_mul(2).saturating_add(FORM_OVERHEAD))
}

fn auth_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(handlers::auth::register))
        .routes(routes!(handlers::auth::login))
        .routes(routes!(handlers::auth::me))
}

fn content_routes(config: &AppConfig) -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(
            handlers::content::list_approved,
            handlers::content::submit_content
        ))
        .routes(routes!(handlers::content::get_content))
        .routes(routes!(handlers::content::get_private_content))
        .routes(routes!(handlers::moderation::approve_content))
        .routes(routes!(handlers::engagement::like_content))
        .routes(routes!(handlers::assets::stream_asset))
        .layer(upload_limit(config))
}

fn series_routes(config: &AppConfig) -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(
            handlers::content::list_series_episodes,
            handlers::content::submit_episode
        ))
        .routes(routes!(handlers::engagement::mega_like))
        .layer(upload_limit(config))
}

fn moderation_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new().routes(routes!(handlers::moderation::list_pending))
}
