//! Columns every tenant-scoped row carries

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Select list matching [`RowMeta`], unqualified.
pub const META_COLUMNS: &str =
    "id, tenant_id, import_hash, created_by_id, updated_by_id, created_at, updated_at";

/// Identity, ownership and timestamps of a row.
///
/// `deleted_at` is never selected: reads only ever see live rows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct RowMeta {
    pub id: Uuid,
    pub tenant_id: Uuid,
    pub import_hash: Option<String>,
    pub created_by_id: Uuid,
    pub updated_by_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Filter keys shared by every entity
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommonFilter {
    pub id: Option<String>,
    pub created_at_range: Option<Vec<String>>,
}
