/// HTTP error mapping
///
/// Handlers return `ApiResult<T>`; every failure becomes a JSON body of
/// the shape `{ "error": "...", "message": "...", "details": [...] }`
/// with the matching status code.
///
/// Coordinator failures map as: authorization failures to `Forbidden`
/// (403), missing entities to `NotFound` (404), persistence failures to
/// `InternalError` (500). Activity-log failures never reach this type;
/// the coordinator traces and swallows them.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::coordinator::MutationError;

/// API result type alias
pub type ApiResult<T> = Result<T, ApiError>;

/// Unified API error type
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("bad request: {0}")]
    BadRequest(String),

    /// No actor could be identified from the request
    #[error("unauthorized: {0}")]
    Unauthorized(String),

    /// The actor is not owner or member of the target board
    #[error("forbidden: {0}")]
    Forbidden(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("conflict: {0}")]
    Conflict(String),

    #[error("validation failed on {} field(s)", .0.len())]
    ValidationError(Vec<ValidationErrorDetail>),

    #[error("internal error: {0}")]
    InternalError(String),
}

/// One field that failed request validation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationErrorDetail {
    pub field: String,
    pub message: String,
}

/// JSON body of every error response
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Stable machine-readable code ("forbidden", "not_found", ...)
    pub error: String,

    /// Human-readable message
    pub message: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Vec<ValidationErrorDetail>>,
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden(_) => StatusCode::FORBIDDEN,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::ValidationError(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::InternalError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn code(&self) -> &'static str {
        match self {
            ApiError::BadRequest(_) => "bad_request",
            ApiError::Unauthorized(_) => "unauthorized",
            ApiError::Forbidden(_) => "forbidden",
            ApiError::NotFound(_) => "not_found",
            ApiError::Conflict(_) => "conflict",
            ApiError::ValidationError(_) => "validation_error",
            ApiError::InternalError(_) => "internal_error",
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let code = self.code();

        let (message, details) = match self {
            // Internal detail stays in the log, not the response
            ApiError::InternalError(msg) => {
                tracing::error!("internal error: {msg}");
                ("An internal error occurred".to_string(), None)
            }
            ApiError::ValidationError(details) => {
                ("Request validation failed".to_string(), Some(details))
            }
            other => (other.to_string(), None),
        };

        let body = ErrorResponse { error: code.to_string(), message, details };
        (status, Json(body)).into_response()
    }
}

impl From<sqlx::Error> for ApiError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => ApiError::NotFound("resource not found".to_string()),
            sqlx::Error::Database(db_err) if db_err.constraint().is_some() => {
                let constraint = db_err.constraint().unwrap_or_default().to_string();
                ApiError::Conflict(format!("constraint violation: {constraint}"))
            }
            other => ApiError::InternalError(format!("database error: {other}")),
        }
    }
}

impl From<MutationError> for ApiError {
    fn from(err: MutationError) -> Self {
        match err {
            MutationError::Unauthorized { board_id, user_id } => ApiError::Forbidden(format!(
                "user {user_id} is not an owner or member of board {board_id}"
            )),
            MutationError::NotFound(what) => ApiError::NotFound(what),
            MutationError::Persistence(e) => ApiError::from(e),
        }
    }
}

impl From<validator::ValidationErrors> for ApiError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let details = errors
            .field_errors()
            .into_iter()
            .flat_map(|(field, errs)| {
                errs.iter().map(move |e| ValidationErrorDetail {
                    field: field.to_string(),
                    message: e
                        .message
                        .as_ref()
                        .map(|m| m.to_string())
                        .unwrap_or_else(|| format!("invalid value for {field}")),
                })
            })
            .collect();
        ApiError::ValidationError(details)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[test]
    fn test_unauthorized_mutation_maps_to_forbidden() {
        let err = MutationError::Unauthorized {
            board_id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
        };
        let api: ApiError = err.into();
        assert_eq!(api.status(), StatusCode::FORBIDDEN);
        assert_eq!(api.code(), "forbidden");
    }

    #[test]
    fn test_row_not_found_maps_to_not_found() {
        let api: ApiError = sqlx::Error::RowNotFound.into();
        assert_eq!(api.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_internal_detail_not_exposed() {
        let api = ApiError::InternalError("connection reset by postgres".to_string());
        assert_eq!(api.status(), StatusCode::INTERNAL_SERVER_ERROR);
        // The wire message is generic; the detail goes to the log only
        let response = api.into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
