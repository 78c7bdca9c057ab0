//! Typed errors and HTTP mapping.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use std::collections::BTreeMap;
use thiserror::Error;

/// Message returned for every integrity violation. Database detail is never echoed.
pub const CONFLICT_MESSAGE: &str = "duplicate or invalid record";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("missing environment variable: {0}")]
    Missing(&'static str),
    #[error("invalid value for {name}: {reason}")]
    Invalid { name: &'static str, reason: String },
}

/// Field name -> list of messages, as returned in the `details` of a 422.
pub type FieldErrors = BTreeMap<String, Vec<String>>;

#[derive(Error, Debug)]
pub enum AppError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("{0}")]
    NotFound(String),
    #[error("request validation failed")]
    Validation(FieldErrors),
    #[error("database: {0}")]
    Db(#[from] sqlx::Error),
    #[error("{0}")]
    Conflict(String),
    #[error("{0}")]
    BadRequest(String),
    #[error("{0}")]
    Unauthorized(String),
    #[error("{0}")]
    Forbidden(String),
    #[error("internal: {0}")]
    Internal(String),
}

impl AppError {
    pub fn unauthorized() -> Self {
        AppError::Unauthorized("missing or invalid bearer token".into())
    }

    pub fn forbidden() -> Self {
        AppError::Forbidden("insufficient permissions".into())
    }

    /// Translate a failed write. Integrity violations (SQLSTATE class 23) become a generic 409.
    pub fn from_write(err: sqlx::Error) -> Self {
        if is_integrity_violation(&err) {
            tracing::info!(error = %err, "write rejected by constraint");
            return AppError::Conflict(CONFLICT_MESSAGE.into());
        }
        Self::from_read(err)
    }

    /// Translate a failed read. Bad literal input (SQLSTATE class 22) becomes a 400.
    pub fn from_read(err: sqlx::Error) -> Self {
        if sqlstate(&err).is_some_and(|c| c.starts_with("22")) {
            return AppError::BadRequest("invalid value for column".into());
        }
        AppError::Db(err)
    }
}

fn sqlstate(err: &sqlx::Error) -> Option<String> {
    match err {
        sqlx::Error::Database(db) => db.code().map(|c| c.into_owned()),
        _ => None,
    }
}

fn is_integrity_violation(err: &sqlx::Error) -> bool {
    sqlstate(err).is_some_and(|c| c.starts_with("23"))
}

#[derive(Serialize)]
pub struct ErrorBody {
    pub error: ErrorDetail,
}

#[derive(Serialize)]
pub struct ErrorDetail {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl AppError {
    fn status_and_code(&self) -> (StatusCode, &'static str) {
        match self {
            AppError::Config(_) => (StatusCode::INTERNAL_SERVER_ERROR, "config_error"),
            AppError::NotFound(_) => (StatusCode::NOT_FOUND, "not_found"),
            AppError::Validation(_) => (StatusCode::UNPROCESSABLE_ENTITY, "validation_error"),
            AppError::Db(e) => {
                if let sqlx::Error::RowNotFound = e {
                    (StatusCode::NOT_FOUND, "not_found")
                } else {
                    (StatusCode::INTERNAL_SERVER_ERROR, "database_error")
                }
            }
            AppError::Conflict(_) => (StatusCode::CONFLICT, "conflict"),
            AppError::BadRequest(_) => (StatusCode::BAD_REQUEST, "bad_request"),
            AppError::Unauthorized(_) => (StatusCode::UNAUTHORIZED, "unauthorized"),
            AppError::Forbidden(_) => (StatusCode::FORBIDDEN, "forbidden"),
            AppError::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "internal_error"),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code) = self.status_and_code();
        if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
        }
        let message = match &self {
            AppError::Db(_) | AppError::Internal(_) | AppError::Config(_) => "internal server error".to_string(),
            other => other.to_string(),
        };
        let details = match &self {
            AppError::Validation(fields) => serde_json::to_value(fields).ok(),
            _ => None,
        };
        let body = ErrorBody {
            error: ErrorDetail {
                code: code.to_string(),
                message,
                details,
            },
        };
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_maps_to_422_with_field_details() {
        let mut fields = FieldErrors::new();
        fields.insert("email".into(), vec!["must be a valid email".into()]);
        let err = AppError::Validation(fields);
        let (status, code) = err.status_and_code();
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(code, "validation_error");
    }

    #[test]
    fn row_not_found_is_404() {
        let err = AppError::Db(sqlx::Error::RowNotFound);
        assert_eq!(err.status_and_code().0, StatusCode::NOT_FOUND);
    }

    #[test]
    fn non_database_write_errors_are_not_conflicts() {
        let err = AppError::from_write(sqlx::Error::PoolTimedOut);
        assert!(matches!(err, AppError::Db(_)));
    }

    #[test]
    fn auth_errors_map_to_401_and_403() {
        assert_eq!(AppError::unauthorized().status_and_code().0, StatusCode::UNAUTHORIZED);
        assert_eq!(AppError::forbidden().status_and_code().0, StatusCode::FORBIDDEN);
    }
}
