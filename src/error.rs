use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;

use crate::repository::RepoError;

/// ApiError
///
/// The user-visible error taxonomy. Every variant carries a short
/// machine-readable reason string and maps to exactly one HTTP status:
/// validation 400, credential failures 401, forbidden 403, absent target 404,
/// uniqueness conflicts 409. Anything else is a generic 500 whose detail is
/// logged but never returned to the client.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Malformed or semantically invalid input (400).
    #[error("{0}")]
    Validation(String),

    /// Missing or invalid bearer credential (401).
    #[error("unauthorized")]
    Unauthorized,

    /// Login failure. Deliberately identical for unknown email and wrong
    /// password so accounts cannot be enumerated (401).
    #[error("invalid_credentials")]
    InvalidCredentials,

    /// Authenticated actor lacking rights for this operation (403).
    #[error("{0}")]
    Forbidden(&'static str),

    /// Target entity absent (404). Reported before any authorization check.
    #[error("not_found")]
    NotFound,

    /// Uniqueness violation: duplicate email, amenity name or review (409).
    #[error("{0}")]
    Conflict(&'static str),

    /// Unexpected backend failure (500). The reason is logged, not exposed.
    #[error("internal_error")]
    Internal(String),
}

/// JSON body shape shared by every error response.
#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized | ApiError::InvalidCredentials => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden(_) => StatusCode::FORBIDDEN,
            ApiError::NotFound => StatusCode::NOT_FOUND,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if let ApiError::Internal(detail) = &self {
            tracing::error!("internal error: {detail}");
        }
        let body = ErrorBody {
            error: self.to_string(),
        };
        (self.status(), Json(body)).into_response()
    }
}

impl From<RepoError> for ApiError {
    fn from(e: RepoError) -> Self {
        match e {
            RepoError::Duplicate(reason) => ApiError::Conflict(reason),
            RepoError::NotFound => ApiError::NotFound,
            RepoError::Backend(detail) => ApiError::Internal(detail),
        }
    }
}

impl From<validator::ValidationErrors> for ApiError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let mut fields: Vec<String> = errors
            .field_errors()
            .keys()
            .map(|field| field.to_string())
            .collect();
        fields.sort_unstable();
        ApiError::Validation(format!("invalid_fields:{}", fields.join(",")))
    }
}
