use serde::Deserialize;

use crate::entity::content_item::{self, ContentKind};
use crate::error::AppError;

use super::identity::Identity;

/// Who may add episodes to a series.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EpisodePolicy {
    /// Only the series' creator.
    #[default]
    SeriesCreator,
    /// Any signed-in user.
    AnyUser,
}

/// Something an actor wants to do that needs a moderation decision.
#[derive(Debug, Clone, Copy)]
pub enum Action<'a> {
    ApproveContent,
    BulkEngage,
    CreateEpisodeUnder(&'a content_item::Model),
    ViewPrivateFields(&'a content_item::Model),
}

/// Stateless authorization decisions for the catalog.
#[derive(Debug, Clone, Copy, Default)]
pub struct ModerationGate {
    episode_policy: EpisodePolicy,
}

impl ModerationGate {
    pub fn new(episode_policy: EpisodePolicy) -> Self {
        Self { episode_policy }
    }

    pub fn episode_policy(&self) -> EpisodePolicy {
        self.episode_policy
    }

    pub fn can(&self, actor: &Identity, action: Action<'_>) -> bool {
        match action {
            Action::ApproveContent | Action::BulkEngage => actor.is_admin,
            Action::CreateEpisodeUnder(series) => {
                series.kind == ContentKind::Series
                    && match self.episode_policy {
                        EpisodePolicy::SeriesCreator => actor.user_id == series.creator_id,
                        EpisodePolicy::AnyUser => true,
                    }
            }
            Action::ViewPrivateFields(item) => actor.is_admin || actor.user_id == item.creator_id,
        }
    }

    /// [`can`](Self::can), with a refusal turned into `PermissionDenied`.
    pub fn require(&self, actor: &Identity, action: Action<'_>) -> Result<(), AppError> {
        if self.can(actor, action) {
            Ok(())
        } else {
            tracing::debug!(user_id = actor.user_id, ?action, "moderation gate refused");
            Err(AppError::PermissionDenied)
        }
    }
}
