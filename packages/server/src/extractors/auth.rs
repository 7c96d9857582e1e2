use axum::extract::{FromRequestParts, OptionalFromRequestParts};
use axum::http::request::Parts;

use crate::error::AppError;
use crate::services::identity::Identity;
use crate::state::AppState;
use crate::utils::jwt;

fn bearer_token(parts: &Parts) -> Option<Result<&str, AppError>> {
    let header = parts.headers.get("Authorization")?;
    Some(
        header
            .to_str()
            .ok()
            .and_then(|v| v.strip_prefix("Bearer "))
            .ok_or(AppError::TokenInvalid),
    )
}

/// Resolved caller from the `Authorization: Bearer <token>` header.
///
/// Take `Identity` as a handler parameter to require a caller, or
/// `Option<Identity>` when anonymous calls are allowed. A header that is
/// present but invalid is rejected either way.
impl FromRequestParts<AppState> for Identity {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let token = bearer_token(parts).ok_or(AppError::AuthenticationRequired)??;
        jwt::verify(token, &state.config.auth.jwt_secret).map_err(|_| AppError::TokenInvalid)
    }
}

impl OptionalFromRequestParts<AppState> for Identity {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Option<Self>, Self::Rejection> {
        match bearer_token(parts) {
            None => Ok(None),
            Some(token) => jwt::verify(token?, &state.config.auth.jwt_secret)
                .map(Some)
                .map_err(|_| AppError::TokenInvalid),
        }
    }
}
