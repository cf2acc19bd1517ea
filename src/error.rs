// src/error.rs
use axum::{http::StatusCode, response::{IntoResponse, Response}, Json};
use serde::Serialize;
use serde_json::json;
use tracing::error;

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ErrorDetail {
    pub field: String,
    pub message: String,
}

#[derive(Debug)]
pub enum AppError {
    Validation(Vec<ErrorDetail>),
    Unauthorized,
    Forbidden(String),
    NotFound(String),
    Conflict(Vec<ErrorDetail>),
    Database(sqlx::Error),
}

impl AppError {
    pub fn validation(field: &str, message: &str) -> Self {
        AppError::Validation(vec![ErrorDetail {
            field: field.to_string(),
            message: message.to_string(),
        }])
    }

    pub fn forbidden(message: &str) -> Self {
        AppError::Forbidden(message.to_string())
    }

    pub fn not_found(message: &str) -> Self {
        AppError::NotFound(message.to_string())
    }

    pub fn duplicate_sku() -> Self {
        AppError::Conflict(vec![ErrorDetail {
            field: "sku".to_string(),
            message: "value already exists".to_string(),
        }])
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message, details) = match self {
            AppError::Validation(details) => (
                StatusCode::BAD_REQUEST,
                "VALIDATION_ERROR",
                "Validation failed".to_string(),
                details,
            ),
            AppError::Unauthorized => (
                StatusCode::UNAUTHORIZED,
                "UNAUTHORIZED",
                "Unauthorized access".to_string(),
                vec![ErrorDetail {
                    field: "X-User-Role".to_string(),
                    message: "X-User-Role header is missing or invalid".to_string(),
                }],
            ),
            AppError::Forbidden(msg) => (
                StatusCode::FORBIDDEN,
                "FORBIDDEN",
                "Forbidden".to_string(),
                vec![ErrorDetail {
                    field: "X-User-Role".to_string(),
                    message: msg,
                }],
            ),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, "NOT_FOUND", msg, Vec::new()),
            AppError::Conflict(details) => (
                StatusCode::CONFLICT,
                "DUPLICATE_SKU",
                "Duplicate value".to_string(),
                details,
            ),
            AppError::Database(err) => {
                // Raw driver detail stays in the log, never in the response
                error!(?err, "Database error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "DATABASE_ERROR",
                    "Database error occurred".to_string(),
                    Vec::new(),
                )
            }
        };

        let body = Json(json!({
            "success": false,
            "message": message,
            "error": {
                "code": code,
                "details": details,
            }
        }));

        (status, body).into_response()
    }
}

impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        AppError::Database(err)
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let mut details = Vec::new();
        for (field, field_errors) in errors.field_errors() {
            for err in field_errors {
                details.push(ErrorDetail {
                    field: field.to_string(),
                    message: err
                        .message
                        .as_ref()
                        .map(|m| m.to_string())
                        .unwrap_or_else(|| err.code.to_string()),
                });
            }
        }
        AppError::Validation(details)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maps_variants_to_status_codes() {
        assert_eq!(
            AppError::validation("price", "bad").into_response().status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            AppError::Unauthorized.into_response().status(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            AppError::forbidden("nope").into_response().status(),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            AppError::not_found("Product not found").into_response().status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            AppError::duplicate_sku().into_response().status(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            AppError::Database(sqlx::Error::RowNotFound).into_response().status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn duplicate_sku_carries_field_detail() {
        let AppError::Conflict(details) = AppError::duplicate_sku() else {
            panic!("expected conflict");
        };
        assert_eq!(
            details,
            vec![ErrorDetail {
                field: "sku".to_string(),
                message: "value already exists".to_string(),
            }]
        );
    }
}
