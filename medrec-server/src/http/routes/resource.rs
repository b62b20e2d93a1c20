//! Tenant-scoped entity endpoints
//!
//! Every entity gets the same seven routes under
//! `/tenant/{tenant_id}/<segment>`:
//!
//! | Method | Path            | Operation             |
//! |--------|-----------------|-----------------------|
//! | POST   | `/`             | create                |
//! | PUT    | `/{id}`         | update                |
//! | DELETE | `/`             | destroy_all           |
//! | GET    | `/`             | find_and_count_all    |
//! | GET    | `/{id}`         | find_by_id            |
//! | GET    | `/autocomplete` | find_all_autocomplete |
//! | POST   | `/import`       | import                |

use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::{Query, State};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Deserialize;
use uuid::Uuid;

use crate::db::repos::TenantEntity;
use crate::http::error::ApiError;
use crate::http::extractors::{ApiJson, TenantContext, ValidUuid};
use crate::http::query::{ids_from_query, list_query};
use crate::http::server::AppState;
use crate::models::{AutocompleteItem, Page};
use crate::service::EntityService;

/// `{"data": {...}}`
#[derive(Deserialize)]
pub struct DataBody<T> {
    pub data: T,
}

/// `{"data": {...}, "importHash": "..."}`
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportBody<T> {
    pub data: T,
    #[serde(default)]
    pub import_hash: Option<String>,
}

/// `{"ids": [...]}`
#[derive(Deserialize, Default)]
pub struct IdsBody {
    #[serde(default)]
    pub ids: Vec<Uuid>,
}

#[derive(Deserialize)]
pub struct AutocompleteParams {
    pub query: Option<String>,
    pub limit: Option<u32>,
}

async fn create<E: TenantEntity>(
    State(state): State<Arc<AppState>>,
    TenantContext(ctx): TenantContext,
    ApiJson(body): ApiJson<DataBody<E::Input>>,
) -> Result<Json<E::View>, ApiError> {
    let view = EntityService::<E>::new(&state.pool)
        .create(&ctx, body.data)
        .await?;
    Ok(Json(view))
}

async fn update<E: TenantEntity>(
    State(state): State<Arc<AppState>>,
    TenantContext(ctx): TenantContext,
    ValidUuid(id): ValidUuid,
    ApiJson(body): ApiJson<DataBody<E::Input>>,
) -> Result<Json<E::View>, ApiError> {
    let view = EntityService::<E>::new(&state.pool)
        .update(&ctx, id, body.data)
        .await?;
    Ok(Json(view))
}

/// Ids come from the JSON body when one is sent, otherwise from the query.
async fn destroy<E: TenantEntity>(
    State(state): State<Arc<AppState>>,
    TenantContext(ctx): TenantContext,
    Query(pairs): Query<Vec<(String, String)>>,
    body: Bytes,
) -> Result<Json<bool>, ApiError> {
    let ids = if body.iter().all(u8::is_ascii_whitespace) {
        ids_from_query(&pairs)?
    } else {
        serde_json::from_slice::<IdsBody>(&body)
            .map_err(|e| ApiError::BadRequest {
                message: format!("invalid ids body: {e}"),
            })?
            .ids
    };

    EntityService::<E>::new(&state.pool)
        .destroy_all(&ctx, &ids)
        .await?;
    Ok(Json(true))
}

async fn list<E: TenantEntity>(
    State(state): State<Arc<AppState>>,
    TenantContext(ctx): TenantContext,
    Query(pairs): Query<Vec<(String, String)>>,
) -> Result<Json<Page<E::View>>, ApiError> {
    let query = list_query::<E::Filter>(&pairs)?;
    let page = EntityService::<E>::new(&state.pool)
        .find_and_count_all(&ctx, &query)
        .await?;
    Ok(Json(page))
}

async fn find<E: TenantEntity>(
    State(state): State<Arc<AppState>>,
    TenantContext(ctx): TenantContext,
    ValidUuid(id): ValidUuid,
) -> Result<Json<E::View>, ApiError> {
    let view = EntityService::<E>::new(&state.pool)
        .find_by_id(&ctx, id)
        .await?;
    Ok(Json(view))
}

async fn autocomplete<E: TenantEntity>(
    State(state): State<Arc<AppState>>,
    TenantContext(ctx): TenantContext,
    Query(params): Query<AutocompleteParams>,
) -> Result<Json<Vec<AutocompleteItem>>, ApiError> {
    let items = EntityService::<E>::new(&state.pool)
        .find_all_autocomplete(&ctx, params.query.as_deref(), params.limit)
        .await?;
    Ok(Json(items))
}

async fn import<E: TenantEntity>(
    State(state): State<Arc<AppState>>,
    TenantContext(ctx): TenantContext,
    ApiJson(body): ApiJson<ImportBody<E::Input>>,
) -> Result<Json<bool>, ApiError> {
    EntityService::<E>::new(&state.pool)
        .import(&ctx, body.data, body.import_hash.as_deref())
        .await?;
    Ok(Json(true))
}

/// Routes of one entity under `/tenant/{tenant_id}/<segment>`
pub fn router<E: TenantEntity>(segment: &str) -> Router<Arc<AppState>> {
    let base = format!("/tenant/{{tenant_id}}/{segment}");

    Router::new()
        .route(
            &base,
            post(create::<E>).get(list::<E>).delete(destroy::<E>),
        )
        .route(&format!("{base}/autocomplete"), get(autocomplete::<E>))
        .route(&format!("{base}/import"), post(import::<E>))
        .route(&format!("{base}/{{id}}"), get(find::<E>).put(update::<E>))
}
