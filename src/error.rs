use actix_web::{error, http::StatusCode, HttpRequest, HttpResponse};
use thiserror::Error;

use crate::core::MatchError;
use crate::models::{ErrorResponse, UserId};
use crate::services::StoreError;

/// Errors surfaced at the HTTP boundary
///
/// Every variant renders as `{"error": "<message>"}`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("{0}")]
    Validation(String),

    #[error("User {0} not found")]
    MatchNotFound(UserId),

    #[error("User {0} not found")]
    UserNotFound(UserId),

    #[error("User {0} cannot be matched with themselves")]
    SelfMatch(UserId),

    #[error("A user with email {0} already exists")]
    Conflict(String),

    #[error("Storage service unavailable")]
    Transport(#[source] StoreError),
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::DuplicateEmail(email) => AppError::Conflict(email),
            StoreError::NotFound(user_id) => AppError::UserNotFound(user_id),
            other => AppError::Transport(other),
        }
    }
}

impl From<MatchError> for AppError {
    fn from(err: MatchError) -> Self {
        match err {
            MatchError::NotFound(user_id) => AppError::MatchNotFound(user_id),
            MatchError::SelfMatch(user_id) => AppError::SelfMatch(user_id),
        }
    }
}

impl error::ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::Validation(_) | AppError::SelfMatch(_) => StatusCode::BAD_REQUEST,
            AppError::MatchNotFound(_) | AppError::UserNotFound(_) => StatusCode::NOT_FOUND,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::Transport(_) => StatusCode::SERVICE_UNAVAILABLE,
        }
    }

    fn error_response(&self) -> HttpResponse {
        if let AppError::Transport(source) = self {
            tracing::error!("Storage failure: {}", source);
        }

        HttpResponse::build(self.status_code()).json(ErrorResponse {
            error: self.to_string(),
        })
    }
}

/// Handle JSON payload errors
pub fn handle_json_payload_error(
    err: error::JsonPayloadError,
    req: &HttpRequest,
) -> actix_web::Error {
    tracing::info!("JSON payload error on {}: {}", req.path(), err);
    AppError::Validation(format!("Invalid JSON: {}", err)).into()
}

/// Handle path extraction errors, e.g. a non-numeric user id
pub fn handle_path_error(err: error::PathError, req: &HttpRequest) -> actix_web::Error {
    tracing::info!("Path error on {}: {}", req.path(), err);
    AppError::Validation(format!("Invalid path: {}", err)).into()
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::ResponseError;

    #[test]
    fn test_status_codes() {
        assert_eq!(
            AppError::Validation("Name is required".into()).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(AppError::MatchNotFound(999).status_code(), StatusCode::NOT_FOUND);
        assert_eq!(
            AppError::Conflict("a@example.com".into()).status_code(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            AppError::from(StoreError::SqlxError(sqlx::Error::PoolTimedOut)).status_code(),
            StatusCode::SERVICE_UNAVAILABLE
        );
    }

    #[test]
    fn test_store_error_mapping() {
        assert!(matches!(
            AppError::from(StoreError::NotFound(3)),
            AppError::UserNotFound(3)
        ));
        assert!(matches!(
            AppError::from(StoreError::DuplicateEmail("a@example.com".into())),
            AppError::Conflict(_)
        ));
    }

    #[test]
    fn test_transport_message_is_generic() {
        let err = AppError::from(StoreError::SqlxError(sqlx::Error::PoolTimedOut));
        assert_eq!(err.to_string(), "Storage service unavailable");
    }

    #[test]
    fn test_match_error_mapping() {
        let err = AppError::from(MatchError::NotFound(999));
        assert_eq!(err.to_string(), "User 999 not found");
        assert_eq!(err.status_code(), StatusCode::NOT_FOUND);
    }
}
