use serde::{Deserialize, Serialize};

use crate::services::engagement::{LikeMode, LikeOutcome, LikeResult};

/// Query parameters for the like endpoint.
#[derive(Deserialize, utoipa::IntoParams)]
pub struct LikeQuery {
    /// Overrides the configured like mode for this request.
    pub mode: Option<LikeMode>,
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct LikeResponse {
    pub outcome: LikeOutcome,
    /// Whether the caller likes the item after this request.
    pub liked: bool,
    #[schema(example = 5)]
    pub like_count: u64,
}

impl From<LikeResult> for LikeResponse {
    fn from(result: LikeResult) -> Self {
        Self {
            outcome: result.outcome,
            liked: result.liked,
            like_count: result.like_count,
        }
    }
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct MegaLikeResponse {
    /// Likes that did not exist before this call.
    #[schema(example = 3)]
    pub inserted: u64,
}
