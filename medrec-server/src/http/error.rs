//! API error types with IntoResponse
//!
//! Errors are converted to JSON responses with appropriate status codes and
//! a `messageKey` the client can localize.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

use crate::db::repos::DbError;
use crate::models::ValidationError;
use crate::service::ServiceError;

/// API error type with automatic HTTP status mapping
#[derive(Debug)]
pub enum ApiError {
    /// Missing or unknown API token (401)
    Unauthenticated,

    /// Caller lacks the permission or tenant membership (403)
    Forbidden { reason: String },

    /// Validation failed (400)
    Validation(ValidationError),

    /// Malformed request body or query (400)
    BadRequest { message: String },

    /// Import hash missing (400)
    ImportHashRequired,

    /// Import hash already used (400)
    ImportHashExists,

    /// Resource not found (404)
    NotFound { resource: &'static str, id: String },

    /// Unique business field already taken (409)
    Duplicate {
        entity: &'static str,
        field: &'static str,
    },

    /// Database error (500, logged)
    Database(DbError),
}

impl ApiError {
    fn parts(&self) -> (StatusCode, &'static str, String, String) {
        match self {
            Self::Unauthenticated => (
                StatusCode::UNAUTHORIZED,
                "unauthenticated",
                "missing or invalid API token".to_owned(),
                "errors.unauthenticated.message".to_owned(),
            ),
            Self::Forbidden { reason } => (
                StatusCode::FORBIDDEN,
                "forbidden",
                reason.clone(),
                "errors.forbidden.message".to_owned(),
            ),
            Self::Validation(e) => (
                StatusCode::BAD_REQUEST,
                "validation_error",
                e.to_string(),
                "errors.validation.message".to_owned(),
            ),
            Self::BadRequest { message } => (
                StatusCode::BAD_REQUEST,
                "bad_request",
                message.clone(),
                "errors.validation.message".to_owned(),
            ),
            Self::ImportHashRequired => (
                StatusCode::BAD_REQUEST,
                "import_hash_required",
                "import hash is required".to_owned(),
                "importer.errors.importHashRequired".to_owned(),
            ),
            Self::ImportHashExists => (
                StatusCode::BAD_REQUEST,
                "import_hash_exists",
                "row was already imported".to_owned(),
                "importer.errors.importHashExistent".to_owned(),
            ),
            Self::NotFound { resource, id } => (
                StatusCode::NOT_FOUND,
                "not_found",
                format!("{} '{}' not found", resource, id),
                "errors.notFound.message".to_owned(),
            ),
            Self::Duplicate { entity, field } => (
                StatusCode::CONFLICT,
                "duplicate",
                format!("{} with this {} already exists", entity, field),
                format!("entities.{}.errors.unique.{}", entity, field),
            ),
            Self::Database(e) => {
                // Log the actual error, return generic message
                tracing::error!("Database error: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal_error",
                    "an internal error occurred".to_owned(),
                    "errors.internal.message".to_owned(),
                )
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error, message, message_key) = self.parts();
        let body = json!({
            "error": error,
            "message": message,
            "messageKey": message_key,
        });
        (status, Json(body)).into_response()
    }
}

impl From<ValidationError> for ApiError {
    fn from(e: ValidationError) -> Self {
        Self::Validation(e)
    }
}

impl From<DbError> for ApiError {
    fn from(e: DbError) -> Self {
        match e {
            DbError::NotFound { resource, id } => Self::NotFound { resource, id },
            DbError::Invalid(v) => Self::Validation(v),
            _ => Self::Database(e),
        }
    }
}

impl From<ServiceError> for ApiError {
    fn from(e: ServiceError) -> Self {
        match e {
            ServiceError::Forbidden(f) => Self::Forbidden {
                reason: f.to_string(),
            },
            ServiceError::NotFound { resource, id } => Self::NotFound { resource, id },
            ServiceError::Validation(v) => Self::Validation(v),
            ServiceError::ImportHashRequired => Self::ImportHashRequired,
            ServiceError::ImportHashExists => Self::ImportHashExists,
            ServiceError::Duplicate { entity, field } => Self::Duplicate { entity, field },
            ServiceError::Database(db) => Self::Database(db),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;

    async fn body(err: ApiError) -> (StatusCode, serde_json::Value) {
        let response = err.into_response();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn validation_error_is_400() {
        let (status, json) = body(ApiError::Validation(ValidationError::Empty { field: "name" })).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["messageKey"], "errors.validation.message");
    }

    #[tokio::test]
    async fn not_found_is_404() {
        let (status, json) = body(ApiError::NotFound {
            resource: "patient",
            id: "test".into(),
        })
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(json["messageKey"], "errors.notFound.message");
    }

    #[tokio::test]
    async fn duplicate_names_entity_and_field() {
        let (status, json) = body(ApiError::Duplicate {
            entity: "medicineEnum",
            field: "medicineName",
        })
        .await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(
            json["messageKey"],
            "entities.medicineEnum.errors.unique.medicineName"
        );
    }

    #[tokio::test]
    async fn import_hash_errors_are_400() {
        let (status, json) = body(ApiError::ImportHashExists).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["messageKey"], "importer.errors.importHashExistent");

        let (status, _) = body(ApiError::ImportHashRequired).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn unauthenticated_is_401() {
        let (status, _) = body(ApiError::Unauthenticated).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }
}
