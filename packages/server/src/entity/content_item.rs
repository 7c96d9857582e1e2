use std::fmt;

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// The three kinds of catalog entry. Also the `content_type` of a like.
#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    Hash,
    EnumIter,
    DeriveActiveEnum,
    Serialize,
    Deserialize,
    utoipa::ToSchema,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "lowercase")]
pub enum ContentKind {
    #[sea_orm(string_value = "series")]
    Series,
    #[sea_orm(string_value = "episode")]
    Episode,
    #[sea_orm(string_value = "movie")]
    Movie,
}

impl ContentKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ContentKind::Series => "series",
            ContentKind::Episode => "episode",
            ContentKind::Movie => "movie",
        }
    }

    /// Whether items of this kind carry a video payload.
    pub fn has_video(self) -> bool {
        !matches!(self, ContentKind::Series)
    }
}

impl fmt::Display for ContentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A series, episode or movie, stored in a single table.
///
/// Kind-specific columns are nullable here; [`Model::details`] is the typed
/// view of them.
#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "content_item")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    pub kind: ContentKind,
    pub title: String,
    #[sea_orm(column_type = "Text")]
    pub description: String,
    /// Visible to the creator and to admins only.
    #[sea_orm(column_type = "Text")]
    pub private_description: Option<String>,

    /// Series only.
    pub season: Option<String>,
    /// Episode only. Set at creation, never updated.
    pub series_id: Option<i32>,

    pub thumbnail_hash: Option<String>,
    pub thumbnail_size: Option<i64>,
    pub video_hash: Option<String>,
    pub video_size: Option<i64>,

    pub approved: bool,

    pub creator_id: i32,
    #[sea_orm(belongs_to, from = "creator_id", to = "id")]
    pub creator: HasOne<super::user::Entity>,

    pub created_at: DateTimeUtc,
}

impl ActiveModelBehavior for ActiveModel {}

/// Kind-specific part of a content item.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, utoipa::ToSchema)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum ContentDetails {
    Series { season: String },
    Episode { series_id: i32 },
    Movie {},
}

pub const DEFAULT_SEASON: &str = "Season 1";

impl Model {
    pub fn details(&self) -> ContentDetails {
        match self.kind {
            ContentKind::Series => ContentDetails::Series {
                season: self
                    .season
                    .clone()
                    .unwrap_or_else(|| DEFAULT_SEASON.to_string()),
            },
            // A row without its parent id cannot be produced by the store;
            // 0 never matches a real series.
            ContentKind::Episode => ContentDetails::Episode {
                series_id: self.series_id.unwrap_or_default(),
            },
            ContentKind::Movie => ContentDetails::Movie {},
        }
    }
}
