use chrono::Utc;
use sea_orm::sea_query::OnConflict;
use sea_orm::*;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::entity::content_item::ContentKind;
use crate::entity::{like, user};
use crate::error::AppError;

use super::content::require_item;
use super::identity::Identity;
use super::moderation::{Action, ModerationGate};

/// How a like request treats an existing like.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum LikeMode {
    /// Remove the like if present, otherwise add it.
    #[default]
    Toggle,
    /// Add the like if absent; never remove.
    AddOnce,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum LikeOutcome {
    Added,
    Removed,
    AlreadyLiked,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LikeResult {
    pub outcome: LikeOutcome,
    /// Whether the user likes the item after the operation.
    pub liked: bool,
    pub like_count: u64,
}

/// Records likes, keyed by (user, content type, content id).
pub struct EngagementLedger<'a, C: ConnectionTrait + TransactionTrait> {
    conn: &'a C,
    gate: ModerationGate,
}

impl<'a, C: ConnectionTrait + TransactionTrait> EngagementLedger<'a, C> {
    pub fn new(conn: &'a C, gate: ModerationGate) -> Self {
        Self { conn, gate }
    }

    pub async fn toggle_or_add(
        &self,
        user: Option<&Identity>,
        kind: ContentKind,
        content_id: i32,
        mode: LikeMode,
    ) -> Result<LikeResult, AppError> {
        let user = user.ok_or(AppError::AuthenticationRequired)?;
        require_item(self.conn, kind, content_id).await?;

        let txn = self.conn.begin().await?;
        let outcome = match mode {
            LikeMode::Toggle => {
                let removed = like::Entity::delete_many()
                    .filter(like::Column::UserId.eq(user.user_id))
                    .filter(like::Column::ContentType.eq(kind))
                    .filter(like::Column::ContentId.eq(content_id))
                    .exec(&txn)
                    .await?
                    .rows_affected;
                if removed > 0 {
                    LikeOutcome::Removed
                } else if insert_if_absent(&txn, user.user_id, kind, content_id).await? {
                    LikeOutcome::Added
                } else {
                    LikeOutcome::AlreadyLiked
                }
            }
            LikeMode::AddOnce => {
                if insert_if_absent(&txn, user.user_id, kind, content_id).await? {
                    LikeOutcome::Added
                } else {
                    LikeOutcome::AlreadyLiked
                }
            }
        };
        txn.commit().await?;

        let like_count = self.like_count(kind, content_id).await?;
        tracing::debug!(user_id = user.user_id, %kind, content_id, ?outcome, "like recorded");
        Ok(LikeResult {
            outcome,
            liked: outcome != LikeOutcome::Removed,
            like_count,
        })
    }

    /// Make every known user like a series. Returns the number of likes that
    /// did not exist before.
    pub async fn mega_like(&self, series_id: i32, actor: &Identity) -> Result<u64, AppError> {
        self.gate.require(actor, Action::BulkEngage)?;
        require_item(self.conn, ContentKind::Series, series_id).await?;

        let txn = self.conn.begin().await?;
        let user_ids: Vec<i32> = user::Entity::find()
            .select_only()
            .column(user::Column::Id)
            .order_by_asc(user::Column::Id)
            .into_tuple::<i32>()
            .all(&txn)
            .await?;

        let mut inserted = 0u64;
        for user_id in &user_ids {
            if insert_if_absent(&txn, *user_id, ContentKind::Series, series_id).await? {
                inserted += 1;
            }
        }
        txn.commit().await?;

        info!(
            series_id,
            admin_id = actor.user_id,
            users = user_ids.len(),
            inserted,
            "mega like applied"
        );
        Ok(inserted)
    }

    pub async fn like_count(&self, kind: ContentKind, content_id: i32) -> Result<u64, AppError> {
        Ok(like::Entity::find()
            .filter(like::Column::ContentType.eq(kind))
            .filter(like::Column::ContentId.eq(content_id))
            .count(self.conn)
            .await?)
    }

    pub async fn has_liked(
        &self,
        user_id: i32,
        kind: ContentKind,
        content_id: i32,
    ) -> Result<bool, AppError> {
        let found = like::Entity::find()
            .filter(like::Column::UserId.eq(user_id))
            .filter(like::Column::ContentType.eq(kind))
            .filter(like::Column::ContentId.eq(content_id))
            .one(self.conn)
            .await?;
        Ok(found.is_some())
    }
}

/// Insert a like unless its key already exists. Returns whether a row was
/// written. Safe under concurrent callers: the unique index decides.
async fn insert_if_absent<C: ConnectionTrait>(
    conn: &C,
    user_id: i32,
    kind: ContentKind,
    content_id: i32,
) -> Result<bool, DbErr> {
    let row = like::ActiveModel {
        user_id: Set(user_id),
        content_type: Set(kind),
        content_id: Set(content_id),
        created_at: Set(Utc::now()),
        ..Default::default()
    };

    let result = like::Entity::insert(row)
        .on_conflict(
            OnConflict::columns([
                like::Column::UserId,
                like::Column::ContentType,
                like::Column::ContentId,
            ])
            .do_nothing()
            .to_owned(),
        )
        .exec_without_returning(conn)
        .await;

    match result {
        Ok(rows) => Ok(rows > 0),
        Err(DbErr::RecordNotInserted) => Ok(false),
        Err(e) => Err(e),
    }
}
