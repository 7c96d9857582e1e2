use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::entity::content_item::{self, ContentDetails};

/// Public view of a content item. Never carries the private description.
#[derive(Serialize, utoipa::ToSchema)]
pub struct ContentResponse {
    #[schema(example = 1)]
    pub id: i32,
    #[serde(flatten)]
    pub details: ContentDetails,
    #[schema(example = "Cosmos")]
    pub title: String,
    #[schema(example = "A personal voyage")]
    pub description: String,
    pub approved: bool,
    #[schema(example = 42)]
    pub creator_id: i32,
    pub has_thumbnail: bool,
    pub has_video: bool,
    pub created_at: DateTime<Utc>,
}

impl From<&content_item::Model> for ContentResponse {
    fn from(item: &content_item::Model) -> Self {
        Self {
            id: item.id,
            details: item.details(),
            title: item.title.clone(),
            description: item.description.clone(),
            approved: item.approved,
            creator_id: item.creator_id,
            has_thumbnail: item.thumbnail_hash.is_some(),
            has_video: item.video_hash.is_some(),
            created_at: item.created_at,
        }
    }
}

impl From<content_item::Model> for ContentResponse {
    fn from(item: content_item::Model) -> Self {
        Self::from(&item)
    }
}

/// Owner/admin view of a content item.
#[derive(Serialize, utoipa::ToSchema)]
pub struct PrivateContentResponse {
    #[serde(flatten)]
    pub content: ContentResponse,
    #[schema(example = "Working notes for the producer")]
    pub private_description: Option<String>,
}

impl From<content_item::Model> for PrivateContentResponse {
    fn from(item: content_item::Model) -> Self {
        Self {
            content: ContentResponse::from(&item),
            private_description: item.private_description,
        }
    }
}

/// A single item with its engagement figures.
#[derive(Serialize, utoipa::ToSchema)]
pub struct ContentDetailResponse {
    #[serde(flatten)]
    pub content: ContentResponse,
    #[schema(example = 3)]
    pub like_count: u64,
    /// Whether the caller likes the item. Omitted for anonymous callers.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub liked: Option<bool>,
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct ContentListResponse {
    pub data: Vec<ContentResponse>,
}

impl From<Vec<content_item::Model>> for ContentListResponse {
    fn from(items: Vec<content_item::Model>) -> Self {
        Self {
            data: items.into_iter().map(ContentResponse::from).collect(),
        }
    }
}

/// The moderation queue, grouped by kind.
#[derive(Serialize, utoipa::ToSchema)]
pub struct PendingResponse {
    pub series: Vec<PrivateContentResponse>,
    pub episodes: Vec<PrivateContentResponse>,
    pub movies: Vec<PrivateContentResponse>,
}

impl From<crate::services::content::PendingQueue> for PendingResponse {
    fn from(queue: crate::services::content::PendingQueue) -> Self {
        let convert = |items: Vec<content_item::Model>| {
            items
                .into_iter()
                .map(PrivateContentResponse::from)
                .collect()
        };
        Self {
            series: convert(queue.series),
            episodes: convert(queue.episodes),
            movies: convert(queue.movies),
        }
    }
}

/// Query parameters for title search.
#[derive(Deserialize, utoipa::IntoParams)]
pub struct SearchQuery {
    /// Case-insensitive title substring. Empty matches everything.
    #[param(example = "cosmos")]
    pub q: Option<String>,
}
