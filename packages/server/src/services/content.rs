use chrono::Utc;
use common::storage::{ContentHash, StoredBlob};
use sea_orm::prelude::Expr;
use sea_orm::sea_query::{Func, LikeExpr};
use sea_orm::*;
use tracing::info;

use crate::entity::content_item::{self, ContentKind, DEFAULT_SEASON};
use crate::error::AppError;
use crate::models::shared::{escape_like, validate_non_blank, validate_season, validate_title};

use super::identity::Identity;
use super::moderation::{Action, ModerationGate};

/// Caller-supplied fields of a new content item.
///
/// Assets arrive already written to the blob store; only their references are
/// persisted here.
#[derive(Debug, Clone, Default)]
pub struct NewContent {
    pub title: String,
    pub description: String,
    pub private_description: Option<String>,
    /// Series only. Ignored for other kinds.
    pub season: Option<String>,
    pub thumbnail: Option<StoredBlob>,
    /// Episodes and movies only.
    pub video: Option<StoredBlob>,
}

impl NewContent {
    pub fn validate(&self, kind: ContentKind) -> Result<(), AppError> {
        validate_title(&self.title)?;
        validate_non_blank(&self.description, "Description")?;
        if kind == ContentKind::Series {
            if let Some(season) = self.season.as_deref().filter(|s| !s.trim().is_empty()) {
                validate_season(season)?;
            }
        }
        if !kind.has_video() && self.video.is_some() {
            return Err(AppError::Validation(format!("A {kind} has no video field")));
        }
        Ok(())
    }

    /// Blobs this submission wrote to the store.
    pub fn uploads(&self) -> Vec<StoredBlob> {
        self.thumbnail.into_iter().chain(self.video).collect()
    }

    fn into_active_model(
        self,
        kind: ContentKind,
        series_id: Option<i32>,
        creator: &Identity,
    ) -> content_item::ActiveModel {
        let season = (kind == ContentKind::Series).then(|| {
            self.season
                .as_deref()
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .unwrap_or(DEFAULT_SEASON)
                .to_string()
        });
        let private_description = self
            .private_description
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty());

        content_item::ActiveModel {
            kind: Set(kind),
            title: Set(self.title.trim().to_string()),
            description: Set(self.description.trim().to_string()),
            private_description: Set(private_description),
            season: Set(season),
            series_id: Set(series_id),
            thumbnail_hash: Set(self.thumbnail.map(|b| b.hash.to_hex())),
            thumbnail_size: Set(self.thumbnail.map(|b| b.size as i64)),
            video_hash: Set(self.video.map(|b| b.hash.to_hex())),
            video_size: Set(self.video.map(|b| b.size as i64)),
            approved: Set(false),
            creator_id: Set(creator.user_id),
            created_at: Set(Utc::now()),
            ..Default::default()
        }
    }
}

/// Unapproved items, grouped by kind.
#[derive(Debug, Default)]
pub struct PendingQueue {
    pub series: Vec<content_item::Model>,
    pub episodes: Vec<content_item::Model>,
    pub movies: Vec<content_item::Model>,
}

pub fn not_found(kind: ContentKind) -> AppError {
    let label = match kind {
        ContentKind::Series => "Series",
        ContentKind::Episode => "Episode",
        ContentKind::Movie => "Movie",
    };
    AppError::NotFound(format!("{label} not found"))
}

/// Find an item of the given kind, or `None`.
pub async fn find_item<C: ConnectionTrait>(
    conn: &C,
    kind: ContentKind,
    id: i32,
) -> Result<Option<content_item::Model>, DbErr> {
    content_item::Entity::find_by_id(id)
        .filter(content_item::Column::Kind.eq(kind))
        .one(conn)
        .await
}

/// Find an item of the given kind, or fail with `NotFound`.
pub async fn require_item<C: ConnectionTrait>(
    conn: &C,
    kind: ContentKind,
    id: i32,
) -> Result<content_item::Model, AppError> {
    find_item(conn, kind, id).await?.ok_or_else(|| not_found(kind))
}

/// Lifecycle of series, episodes and movies.
pub struct ContentStore<'a, C: ConnectionTrait> {
    conn: &'a C,
    gate: ModerationGate,
}

impl<'a, C: ConnectionTrait> ContentStore<'a, C> {
    pub fn new(conn: &'a C, gate: ModerationGate) -> Self {
        Self { conn, gate }
    }

    /// Create a pending series or movie. Episodes go through
    /// [`submit_episode`](Self::submit_episode).
    pub async fn submit(
        &self,
        kind: ContentKind,
        fields: NewContent,
        creator: &Identity,
    ) -> Result<content_item::Model, AppError> {
        if kind == ContentKind::Episode {
            return Err(AppError::Validation(
                "Episodes are submitted under their series".into(),
            ));
        }
        fields.validate(kind)?;

        let item = fields
            .into_active_model(kind, None, creator)
            .insert(self.conn)
            .await?;
        info!(id = item.id, %kind, creator_id = creator.user_id, "content submitted");
        Ok(item)
    }

    /// Create a pending episode under an existing series.
    pub async fn submit_episode(
        &self,
        series_id: i32,
        fields: NewContent,
        creator: &Identity,
    ) -> Result<content_item::Model, AppError> {
        let series = self.authorize_episode(series_id, creator).await?;
        fields.validate(ContentKind::Episode)?;

        let item = fields
            .into_active_model(ContentKind::Episode, Some(series.id), creator)
            .insert(self.conn)
            .await?;
        info!(id = item.id, series_id, creator_id = creator.user_id, "episode submitted");
        Ok(item)
    }

    /// Resolve a series and check that `creator` may add episodes to it.
    pub async fn authorize_episode(
        &self,
        series_id: i32,
        creator: &Identity,
    ) -> Result<content_item::Model, AppError> {
        let series = require_item(self.conn, ContentKind::Series, series_id).await?;
        self.gate
            .require(creator, Action::CreateEpisodeUnder(&series))?;
        Ok(series)
    }

    /// Whether any item, approved or not, points at a stored blob.
    pub async fn references_blob(&self, hash: &ContentHash) -> Result<bool, AppError> {
        let hex = hash.to_hex();
        let count = content_item::Entity::find()
            .filter(
                Condition::any()
                    .add(content_item::Column::ThumbnailHash.eq(hex.clone()))
                    .add(content_item::Column::VideoHash.eq(hex)),
            )
            .count(self.conn)
            .await?;
        Ok(count > 0)
    }

    /// Mark an item approved. Approving an approved item is a no-op.
    pub async fn approve(
        &self,
        kind: ContentKind,
        id: i32,
        actor: &Identity,
    ) -> Result<content_item::Model, AppError> {
        self.gate.require(actor, Action::ApproveContent)?;

        content_item::Entity::update_many()
            .col_expr(content_item::Column::Approved, Expr::value(true))
            .filter(content_item::Column::Id.eq(id))
            .filter(content_item::Column::Kind.eq(kind))
            .exec(self.conn)
            .await?;

        let item = require_item(self.conn, kind, id).await?;
        info!(id, %kind, admin_id = actor.user_id, "content approved");
        Ok(item)
    }

    /// Fetch an item regardless of approval state.
    pub async fn get(&self, kind: ContentKind, id: i32) -> Result<content_item::Model, AppError> {
        require_item(self.conn, kind, id).await
    }

    /// Fetch an item for a caller allowed to see its private fields.
    pub async fn get_private(
        &self,
        kind: ContentKind,
        id: i32,
        actor: &Identity,
    ) -> Result<content_item::Model, AppError> {
        let item = require_item(self.conn, kind, id).await?;
        self.gate.require(actor, Action::ViewPrivateFields(&item))?;
        Ok(item)
    }

    pub async fn list_approved(&self, kind: ContentKind) -> Result<Vec<content_item::Model>, AppError> {
        self.list_by_state(kind, true).await
    }

    /// The moderation queue. Admin only.
    pub async fn list_pending(&self, actor: &Identity) -> Result<PendingQueue, AppError> {
        self.gate.require(actor, Action::ApproveContent)?;

        Ok(PendingQueue {
            series: self.list_by_state(ContentKind::Series, false).await?,
            episodes: self.list_by_state(ContentKind::Episode, false).await?,
            movies: self.list_by_state(ContentKind::Movie, false).await?,
        })
    }

    /// Approved episodes of a series, oldest first.
    pub async fn list_series_episodes(
        &self,
        series_id: i32,
    ) -> Result<Vec<content_item::Model>, AppError> {
        require_item(self.conn, ContentKind::Series, series_id).await?;

        Ok(content_item::Entity::find()
            .filter(content_item::Column::Kind.eq(ContentKind::Episode))
            .filter(content_item::Column::SeriesId.eq(series_id))
            .filter(content_item::Column::Approved.eq(true))
            .order_by_asc(content_item::Column::CreatedAt)
            .order_by_asc(content_item::Column::Id)
            .all(self.conn)
            .await?)
    }

    /// Case-insensitive title substring match over approved series and movies.
    pub async fn search(&self, query: &str) -> Result<Vec<content_item::Model>, AppError> {
        let term = escape_like(query.trim());

        Ok(content_item::Entity::find()
            .filter(content_item::Column::Approved.eq(true))
            .filter(
                content_item::Column::Kind.is_in([ContentKind::Series, ContentKind::Movie]),
            )
            .filter(
                Expr::expr(Func::lower(Expr::col(content_item::Column::Title)))
                    .like(LikeExpr::new(format!("%{}%", term.to_lowercase())).escape('\\')),
            )
            .order_by_asc(content_item::Column::CreatedAt)
            .order_by_asc(content_item::Column::Id)
            .all(self.conn)
            .await?)
    }

    async fn list_by_state(
        &self,
        kind: ContentKind,
        approved: bool,
    ) -> Result<Vec<content_item::Model>, AppError> {
        Ok(content_item::Entity::find()
            .filter(content_item::Column::Kind.eq(kind))
            .filter(content_item::Column::Approved.eq(approved))
            .order_by_asc(content_item::Column::CreatedAt)
            .order_by_asc(content_item::Column::Id)
            .all(self.conn)
            .await?)
    }
}
