use common::storage::{BlobStore, BoxReader, ContentHash};
use sea_orm::ConnectionTrait;
use serde::Deserialize;

use crate::entity::content_item::{self, ContentKind};
use crate::error::AppError;

use super::content::require_item;

/// A binary field of a content item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum AssetField {
    Thumbnail,
    Video,
}

impl AssetField {
    /// Declared media type. Fixed per field, never sniffed.
    pub fn media_type(self) -> &'static str {
        match self {
            AssetField::Thumbnail => "image/jpeg",
            AssetField::Video => "video/mp4",
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            AssetField::Thumbnail => "thumbnail",
            AssetField::Video => "video",
        }
    }
}

/// Where a present asset lives, without opening it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AssetRef {
    pub media_type: &'static str,
    pub hash: ContentHash,
    pub size: u64,
}

pub enum AssetStream {
    Present { asset: AssetRef, reader: BoxReader<'static> },
    /// The item exists but the field is empty.
    Absent,
}

pub struct AssetStreamer<'a, C: ConnectionTrait> {
    conn: &'a C,
    blobs: &'a dyn BlobStore,
}

impl<'a, C: ConnectionTrait> AssetStreamer<'a, C> {
    pub fn new(conn: &'a C, blobs: &'a dyn BlobStore) -> Self {
        Self { conn, blobs }
    }

    /// Resolve the asset reference of an item's field.
    pub async fn locate(
        &self,
        kind: ContentKind,
        id: i32,
        field: AssetField,
    ) -> Result<Option<AssetRef>, AppError> {
        if field == AssetField::Video && !kind.has_video() {
            return Err(AppError::Validation(format!("A {kind} has no video field")));
        }

        let item = require_item(self.conn, kind, id).await?;
        asset_ref(&item, field)
    }

    /// Open a located asset for a single sequential read.
    pub async fn open(&self, asset: &AssetRef) -> Result<BoxReader<'static>, AppError> {
        Ok(self.blobs.open(&asset.hash).await?)
    }

    pub async fn stream(
        &self,
        kind: ContentKind,
        id: i32,
        field: AssetField,
    ) -> Result<AssetStream, AppError> {
        match self.locate(kind, id, field).await? {
            Some(asset) => {
                let reader = self.open(&asset).await?;
                Ok(AssetStream::Present { asset, reader })
            }
            None => Ok(AssetStream::Absent),
        }
    }
}

fn asset_ref(item: &content_item::Model, field: AssetField) -> Result<Option<AssetRef>, AppError> {
    let (hash, size) = match field {
        AssetField::Thumbnail => (&item.thumbnail_hash, item.thumbnail_size),
        AssetField::Video => (&item.video_hash, item.video_size),
    };
    let Some(hash) = hash else {
        return Ok(None);
    };

    let hash: ContentHash = hash.parse().map_err(|e| {
        AppError::Internal(format!(
            "Corrupt {} reference on content {}: {}",
            field.as_str(),
            item.id,
            e
        ))
    })?;

    Ok(Some(AssetRef {
        media_type: field.media_type(),
        hash,
        size: size.unwrap_or_default().max(0) as u64,
    }))
}
