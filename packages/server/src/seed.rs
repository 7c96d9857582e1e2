use sea_orm::sea_query::{Index, IndexCreateStatement};
use sea_orm::{ConnectionTrait, DatabaseConnection, DbErr};
use tracing::{info, warn};

use crate::entity::{content_item, like};

/// Ensure the indexes schema sync does not derive from the entities exist.
///
/// Every like insert targets the composite unique index, so failing to create
/// it aborts startup. The lookup indexes only warn.
pub async fn ensure_indexes(db: &DatabaseConnection) -> Result<(), DbErr> {
    let like_key = Index::create()
        .if_not_exists()
        .unique()
        .name("uq_content_like_user_content")
        .table(like::Entity)
        .col(like::Column::UserId)
        .col(like::Column::ContentType)
        .col(like::Column::ContentId)
        .to_owned();
    create_index(db, &like_key).await?;
    info!("Ensured index uq_content_like_user_content exists");

    // Listing and moderation queue queries:
    // WHERE kind = ? AND approved = ? ORDER BY created_at
    let listing = Index::create()
        .if_not_exists()
        .name("idx_content_item_kind_approved_created")
        .table(content_item::Entity)
        .col(content_item::Column::Kind)
        .col(content_item::Column::Approved)
        .col(content_item::Column::CreatedAt)
        .to_owned();
    if let Err(e) = create_index(db, &listing).await {
        warn!("Failed to create index idx_content_item_kind_approved_created: {}", e);
    }

    // Episodes of a series.
    let episodes = Index::create()
        .if_not_exists()
        .name("idx_content_item_series")
        .table(content_item::Entity)
        .col(content_item::Column::SeriesId)
        .to_owned();
    if let Err(e) = create_index(db, &episodes).await {
        warn!("Failed to create index idx_content_item_series: {}", e);
    }

    Ok(())
}

async fn create_index(db: &DatabaseConnection, stmt: &IndexCreateStatement) -> Result<(), DbErr> {
    let sql = db.get_database_backend().build(stmt).to_string();
    db.execute_unprepared(&sql).await.map(|_| ())
}
