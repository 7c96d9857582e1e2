use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use common::storage::StorageError;
use sea_orm::DbErr;
use serde::Serialize;

/// Structured error response returned by all endpoints on failure.
#[derive(Serialize, utoipa::ToSchema)]
pub struct ErrorBody {
    /// Machine-readable error code. One of: `VALIDATION_ERROR`,
    /// `AUTHENTICATION_REQUIRED`, `TOKEN_INVALID`, `INVALID_CREDENTIALS`,
    /// `PERMISSION_DENIED`, `NOT_FOUND`, `USERNAME_TAKEN`, `EMAIL_TAKEN`,
    /// `INTERNAL_ERROR`.
    #[schema(example = "PERMISSION_DENIED")]
    pub code: &'static str,
    /// Human-readable error description.
    #[schema(example = "Insufficient permissions")]
    pub message: String,
}

/// Application-level error type.
///
/// Core operations return these directly; the HTTP mapping lives in
/// [`IntoResponse`] below and nowhere else.
#[derive(Debug)]
pub enum AppError {
    Validation(String),
    /// No resolved identity for an operation that needs one.
    AuthenticationRequired,
    TokenInvalid,
    InvalidCredentials,
    PermissionDenied,
    NotFound(String),
    UsernameTaken,
    EmailTaken,
    Internal(String),
}

impl AppError {
    pub fn code(&self) -> &'static str {
        match self {
            AppError::Validation(_) => "VALIDATION_ERROR",
            AppError::AuthenticationRequired => "AUTHENTICATION_REQUIRED",
            AppError::TokenInvalid => "TOKEN_INVALID",
            AppError::InvalidCredentials => "INVALID_CREDENTIALS",
            AppError::PermissionDenied => "PERMISSION_DENIED",
            AppError::NotFound(_) => "NOT_FOUND",
            AppError::UsernameTaken => "USERNAME_TAKEN",
            AppError::EmailTaken => "EMAIL_TAKEN",
            AppError::Internal(_) => "INTERNAL_ERROR",
        }
    }

    fn status_and_body(self) -> (StatusCode, ErrorBody) {
        let code = self.code();
        let (status, message) = match self {
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::AuthenticationRequired => {
                (StatusCode::UNAUTHORIZED, "Authentication required".into())
            }
            AppError::TokenInvalid => (StatusCode::UNAUTHORIZED, "Invalid or expired token".into()),
            AppError::InvalidCredentials => (
                StatusCode::UNAUTHORIZED,
                "Invalid username or password".into(),
            ),
            AppError::PermissionDenied => (StatusCode::FORBIDDEN, "Insufficient permissions".into()),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            AppError::UsernameTaken => (StatusCode::CONFLICT, "Username is already taken".into()),
            AppError::EmailTaken => (
                StatusCode::CONFLICT,
                "Email is already registered".into(),
            ),
            AppError::Internal(detail) => {
                tracing::error!("Internal error: {}", detail);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "An unexpected error occurred".into(),
                )
            }
        };
        (status, ErrorBody { code, message })
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, body) = self.status_and_body();
        (status, Json(body)).into_response()
    }
}

impl From<DbErr> for AppError {
    fn from(err: DbErr) -> Self {
        AppError::Internal(err.to_string())
    }
}

impl From<StorageError> for AppError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::TooLarge { limit } => {
                AppError::Validation(format!("File exceeds maximum size of {limit} bytes"))
            }
            other => AppError::Internal(other.to_string()),
        }
    }
}
