//! Repository implementations for database access
//!
//! Each repository follows these patterns:
//! - Every entity query carries `tenant_id = ? AND deleted_at IS NULL`
//! - Uniqueness comes from partial indexes; violations are mapped, not pre-checked
//! - Mutations take `&mut SqliteConnection` so callers own the transaction
//!
//! Entities describe themselves through [`TenantEntity`]; the shared
//! operations in [`scoped`] do the rest.

pub mod audit;
pub mod catalog;
pub mod clauses;
pub mod facility;
pub mod files;
pub mod patient;
pub mod scoped;
pub mod stock;
pub mod tenants;
pub mod visit;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{Map, Value};
use sqlx::sqlite::SqliteRow;
use sqlx::{FromRow, SqliteConnection};
use uuid::Uuid;

use crate::models::{CommonFilter, RequestContext, Resource, ValidationError};

pub use audit::{AuditAction, AuditEntry};
pub use catalog::{DiagnosticEnums, MedicineEnums, SymptomsEnums};
pub use clauses::{Conditions, Param};
pub use facility::{Doctors, HealthCenters};
pub use files::FileRelation;
pub use patient::{MedicalHistories, Patients};
pub use stock::{MedicineInventories, MedicineSuppliesRepo};
pub use tenants::{MembershipRepo, TenantRepo, UserRepo};
pub use visit::{PatientDocuments, PatientVisits};

/// Database error type
#[derive(Debug, thiserror::Error)]
pub enum DbError {
    #[error("database error: {0}")]
    Sqlx(#[from] sqlx::Error),

    #[error("not found: {resource} '{id}'")]
    NotFound { resource: &'static str, id: String },

    #[error(transparent)]
    Invalid(#[from] ValidationError),

    #[error("failed to encode audit values: {0}")]
    Json(#[from] serde_json::Error),
}

impl DbError {
    pub fn not_found(resource: Resource, id: Uuid) -> Self {
        Self::NotFound {
            resource: resource.key(),
            id: id.to_string(),
        }
    }

    /// Message of a unique-constraint violation, if that is what this is.
    ///
    /// SQLite names the columns of the violated index, e.g.
    /// `UNIQUE constraint failed: doctors.tenant_id, doctors.name`.
    pub fn unique_violation(&self) -> Option<&str> {
        match self {
            Self::Sqlx(sqlx::Error::Database(e)) if e.is_unique_violation() => Some(e.message()),
            _ => None,
        }
    }
}

/// A tenant-scoped table with its record, view, payload and filter types.
///
/// Implementors are unit structs; all state lives in the connection and
/// the [`RequestContext`].
#[async_trait]
pub trait TenantEntity: Send + Sync + 'static {
    /// Row as selected by `META_COLUMNS, COLUMNS`
    type Record: for<'r> FromRow<'r, SqliteRow> + Serialize + Clone + Send + Sync + Unpin;
    /// Record with its associations filled in
    type View: Serialize + Send + Sync;
    /// Create/update/import payload
    type Input: DeserializeOwned + Send + Sync;
    /// `filter[...]` keys of a list query
    type Filter: DeserializeOwned + Default + Send + Sync;

    const RESOURCE: Resource;
    const TABLE: &'static str;
    /// Business columns selected after the meta columns
    const COLUMNS: &'static str;
    /// Column shown by autocomplete
    const LABEL_COLUMN: &'static str;
    /// `orderBy` field name to column
    const SORTABLE: &'static [(&'static str, &'static str)];
    /// Unique business column to its JSON field name
    const UNIQUE: &'static [(&'static str, &'static str)] = &[];

    fn validate(input: &Self::Input) -> Result<(), ValidationError>;

    /// Business column values written by insert and overwrite.
    fn values(input: &Self::Input) -> Vec<(&'static str, Param)>;

    fn common(filter: &Self::Filter) -> &CommonFilter;

    fn filter(conditions: &mut Conditions, filter: &Self::Filter) -> Result<(), ValidationError>;

    /// Association ids recorded in audit entries next to the row snapshot.
    fn audit_extra(_input: &Self::Input) -> Map<String, Value> {
        Map::new()
    }

    /// Check that referenced rows exist in the caller's tenant.
    async fn check_references(
        _conn: &mut SqliteConnection,
        _ctx: &RequestContext,
        _input: &Self::Input,
    ) -> Result<(), DbError> {
        Ok(())
    }

    /// Make the stored associations match the payload exactly.
    async fn replace_associations(
        _conn: &mut SqliteConnection,
        _ctx: &RequestContext,
        _id: Uuid,
        _input: &Self::Input,
    ) -> Result<(), DbError> {
        Ok(())
    }

    async fn fill(
        conn: &mut SqliteConnection,
        ctx: &RequestContext,
        record: Self::Record,
    ) -> Result<Self::View, DbError>;
}

/// Fail with `UnknownReference` unless `id` names a live row of `table`
/// in the caller's tenant.
pub async fn ensure_reference(
    conn: &mut SqliteConnection,
    ctx: &RequestContext,
    table: &'static str,
    field: &'static str,
    id: Option<Uuid>,
) -> Result<(), DbError> {
    let Some(id) = id else {
        return Ok(());
    };

    let found: i64 = sqlx::query_scalar(&format!(
        "SELECT COUNT(*) FROM {table} WHERE id = ? AND tenant_id = ? AND deleted_at IS NULL"
    ))
    .bind(id)
    .bind(ctx.tenant_id)
    .fetch_one(&mut *conn)
    .await?;

    if found == 0 {
        return Err(ValidationError::UnknownReference { field, id }.into());
    }
    Ok(())
}

/// Fail with `UnknownReference` unless `user_id` is a member of the
/// caller's tenant.
pub async fn ensure_member(
    conn: &mut SqliteConnection,
    ctx: &RequestContext,
    field: &'static str,
    user_id: Option<Uuid>,
) -> Result<(), DbError> {
    let Some(id) = user_id else {
        return Ok(());
    };

    let found: i64 =
        sqlx::query_scalar("SELECT COUNT(*) FROM tenant_users WHERE tenant_id = ? AND user_id = ?")
            .bind(ctx.tenant_id)
            .bind(id)
            .fetch_one(&mut *conn)
            .await?;

    if found == 0 {
        return Err(ValidationError::UnknownReference { field, id }.into());
    }
    Ok(())
}
