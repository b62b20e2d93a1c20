//! Custom Axum extractors

use std::collections::HashMap;
use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::{FromRequest, FromRequestParts, Path};
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use uuid::Uuid;

use super::error::ApiError;
use super::server::AppState;
use crate::auth;
use crate::db::repos::{MembershipRepo, UserRepo};
use crate::models::{RequestContext, ValidationError};

/// Parse a path segment as a UUID.
pub fn parse_uuid(field: &'static str, raw: &str) -> Result<Uuid, ApiError> {
    Uuid::parse_str(raw.trim()).map_err(|_| {
        ApiError::Validation(ValidationError::InvalidFormat {
            field,
            reason: "invalid UUID format",
        })
    })
}

/// Caller context for `/tenant/{tenant_id}/...` routes.
///
/// Authenticates the bearer token, then loads the caller's roles in the
/// path's tenant. Non-members are rejected before any handler runs.
pub struct TenantContext(pub RequestContext);

impl FromRequestParts<Arc<AppState>> for TenantContext {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let Path(params): Path<HashMap<String, String>> =
            Path::from_request_parts(parts, state)
                .await
                .map_err(|_| ApiError::Validation(ValidationError::Missing { field: "tenantId" }))?;
        let raw_tenant = params
            .get("tenant_id")
            .ok_or(ApiError::Validation(ValidationError::Missing { field: "tenantId" }))?;
        let tenant_id = parse_uuid("tenantId", raw_tenant)?;

        let token = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .and_then(auth::bearer_token)
            .ok_or(ApiError::Unauthenticated)?;

        let user = UserRepo::new(&state.pool)
            .find_by_token(token)
            .await?
            .ok_or(ApiError::Unauthenticated)?;

        let roles = MembershipRepo::new(&state.pool)
            .roles(tenant_id, user.id)
            .await?
            .ok_or_else(|| {
                tracing::debug!(%tenant_id, user_id = %user.id, "not a tenant member");
                ApiError::Forbidden {
                    reason: "not a member of this tenant".to_owned(),
                }
            })?;

        Ok(Self(RequestContext::new(tenant_id, user.id, roles)))
    }
}

/// JSON body whose rejections render as [`ApiError`]
#[derive(FromRequest)]
#[from_request(via(axum::Json), rejection(ApiError))]
pub struct ApiJson<T>(pub T);

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::BadRequest {
            message: rejection.body_text(),
        }
    }
}

/// Extract and validate the `{id}` path segment
pub struct ValidUuid(pub Uuid);

impl<S> FromRequestParts<S> for ValidUuid
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(params): Path<HashMap<String, String>> = Path::from_request_parts(parts, state)
            .await
            .map_err(|_| ApiError::Validation(ValidationError::Empty { field: "id" }))?;

        let id = params
            .get("id")
            .ok_or(ApiError::Validation(ValidationError::Empty { field: "id" }))?;
        Ok(Self(parse_uuid("id", id)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_uuid_rejects_garbage() {
        assert!(parse_uuid("id", "nope").is_err());
        let id = Uuid::new_v4();
        assert_eq!(parse_uuid("id", &format!(" {id} ")).unwrap(), id);
    }
}
