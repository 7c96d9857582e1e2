use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::content_item::ContentKind;

/// One user's like of one content item.
///
/// `(user_id, content_type, content_id)` is unique; the index is created in
/// `seed::ensure_indexes` because schema sync only knows single-column keys.
#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "content_like")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    pub user_id: i32,
    #[sea_orm(belongs_to, from = "user_id", to = "id")]
    pub user: HasOne<super::user::Entity>,

    pub content_type: ContentKind,
    pub content_id: i32,

    pub created_at: DateTimeUtc,
}

impl ActiveModelBehavior for ActiveModel {}
