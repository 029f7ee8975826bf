use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;

use crate::application::error::ServiceError;
use crate::application::repos::RepoError;
use crate::domain::error::DomainError;

#[derive(Debug, Serialize)]
pub struct ApiErrorBody {
    pub error: ApiErrorMessage,
}

pub mod codes {
    pub const BAD_REQUEST: &str = "bad_request";
    pub const NOT_FOUND: &str = "not_found";
    pub const DUPLICATE: &str = "duplicate";
    pub const INVALID_INPUT: &str = "invalid_input";
    pub const DB_TIMEOUT: &str = "db_timeout";
    pub const REPO: &str = "repo_error";
}

#[derive(Debug, Serialize)]
pub struct ApiErrorMessage {
    pub code: String,
    pub message: String,
}

#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    code: &'static str,
    message: String,
}

impl ApiError {
    pub fn new(status: StatusCode, code: &'static str, message: impl Into<String>) -> Self {
        Self {
            status,
            code,
            message: message.into(),
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, codes::BAD_REQUEST, message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, codes::NOT_FOUND, message)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ApiErrorBody {
            error: ApiErrorMessage {
                code: self.code.to_string(),
                message: self.message,
            },
        };
        (self.status, Json(body)).into_response()
    }
}

impl From<ServiceError> for ApiError {
    fn from(err: ServiceError) -> Self {
        match err {
            ServiceError::Domain(DomainError::NotFound { entity }) => {
                Self::not_found(format!("{entity} not found"))
            }
            ServiceError::Domain(DomainError::Validation { message }) => {
                Self::new(StatusCode::BAD_REQUEST, codes::INVALID_INPUT, message)
            }
            ServiceError::Store(RepoError::NotFound) => Self::not_found("resource not found"),
            ServiceError::Store(RepoError::Duplicate { constraint }) => Self::new(
                StatusCode::CONFLICT,
                codes::DUPLICATE,
                format!("duplicate record violates `{constraint}`"),
            ),
            ServiceError::Store(RepoError::InvalidInput { message }) => {
                Self::new(StatusCode::BAD_REQUEST, codes::INVALID_INPUT, message)
            }
            ServiceError::Store(RepoError::Timeout) => Self::new(
                StatusCode::SERVICE_UNAVAILABLE,
                codes::DB_TIMEOUT,
                "database timeout",
            ),
            ServiceError::Store(RepoError::Persistence(message)) => {
                Self::new(StatusCode::INTERNAL_SERVER_ERROR, codes::REPO, message)
            }
        }
    }
}
