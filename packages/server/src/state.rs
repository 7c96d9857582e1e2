use std::sync::Arc;

use common::storage::BlobStore;
use sea_orm::DatabaseConnection;

use crate::config::AppConfig;
use crate::services::moderation::ModerationGate;

#[derive(Clone)]
pub struct AppState {
    pub db: DatabaseConnection,
    pub config: AppConfig,
    pub blob_store: Arc<dyn BlobStore>,
}

impl AppState {
    pub fn gate(&self) -> ModerationGate {
        ModerationGate::new(self.config.moderation.episode_policy)
    }
}
