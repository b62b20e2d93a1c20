//! Tenant-scoped operations shared by every entity
//!
//! Each function runs on the caller's connection, normally a transaction
//! opened by the service layer. Lookups match `id`, `tenant_id` and
//! `deleted_at IS NULL` together, so rows of other tenants and deleted
//! rows behave exactly like missing ones.

use chrono::Utc;
use serde_json::Value;
use sqlx::{QueryBuilder, Sqlite, SqliteConnection};
use uuid::Uuid;

use super::audit::{self, AuditAction};
use super::clauses::{like_pattern, Conditions};
use super::{DbError, TenantEntity};
use crate::models::{AutocompleteItem, Ordering, Page, RequestContext, Window, META_COLUMNS};

fn select<E: TenantEntity>() -> String {
    format!(
        "SELECT {META_COLUMNS}, {} FROM {} WHERE tenant_id = ",
        E::COLUMNS,
        E::TABLE
    )
}

/// Load a live row of the caller's tenant.
pub async fn find_record<E: TenantEntity>(
    conn: &mut SqliteConnection,
    ctx: &RequestContext,
    id: Uuid,
) -> Result<E::Record, DbError> {
    let mut qb = QueryBuilder::<Sqlite>::new(select::<E>());
    qb.push_bind(ctx.tenant_id);
    qb.push(" AND deleted_at IS NULL AND id = ");
    qb.push_bind(id);

    qb.build_query_as::<E::Record>()
        .fetch_optional(&mut *conn)
        .await?
        .ok_or_else(|| DbError::not_found(E::RESOURCE, id))
}

/// Load a live row with its associations.
pub async fn find_by_id<E: TenantEntity>(
    conn: &mut SqliteConnection,
    ctx: &RequestContext,
    id: Uuid,
) -> Result<E::View, DbError> {
    let record = find_record::<E>(conn, ctx, id).await?;
    E::fill(conn, ctx, record).await
}

/// Insert a row, replace its associations and write the `create` audit entry.
pub async fn create<E: TenantEntity>(
    conn: &mut SqliteConnection,
    ctx: &RequestContext,
    input: &E::Input,
    import_hash: Option<&str>,
) -> Result<E::View, DbError> {
    E::validate(input)?;
    E::check_references(conn, ctx, input).await?;

    let id = Uuid::new_v4();
    let now = Utc::now();
    let values = E::values(input);

    let mut qb = QueryBuilder::<Sqlite>::new(format!(
        "INSERT INTO {} (id, tenant_id, import_hash, created_by_id, updated_by_id, created_at, updated_at",
        E::TABLE
    ));
    for (column, _) in &values {
        qb.push(", ").push(*column);
    }
    qb.push(") VALUES (");
    qb.push_bind(id);
    qb.push(", ").push_bind(ctx.tenant_id);
    qb.push(", ").push_bind(import_hash.map(str::to_owned));
    qb.push(", ").push_bind(ctx.user_id);
    qb.push(", ").push_bind(ctx.user_id);
    qb.push(", ").push_bind(now);
    qb.push(", ").push_bind(now);
    for (_, value) in values {
        qb.push(", ");
        value.push_to(&mut qb);
    }
    qb.push(")");
    qb.build().execute(&mut *conn).await?;

    E::replace_associations(conn, ctx, id, input).await?;

    let record = find_record::<E>(conn, ctx, id).await?;
    audit::log(
        conn,
        ctx,
        E::RESOURCE,
        id,
        AuditAction::Create,
        &snapshot::<E>(&record, input)?,
    )
    .await?;

    tracing::debug!(entity = E::RESOURCE.key(), %id, "created");
    E::fill(conn, ctx, record).await
}

/// Overwrite the business columns of a live row.
///
/// `created_by_id` and `import_hash` are left as they are.
pub async fn update<E: TenantEntity>(
    conn: &mut SqliteConnection,
    ctx: &RequestContext,
    id: Uuid,
    input: &E::Input,
) -> Result<E::View, DbError> {
    E::validate(input)?;
    find_record::<E>(conn, ctx, id).await?;
    E::check_references(conn, ctx, input).await?;

    let mut qb = QueryBuilder::<Sqlite>::new(format!("UPDATE {} SET updated_by_id = ", E::TABLE));
    qb.push_bind(ctx.user_id);
    qb.push(", updated_at = ").push_bind(Utc::now());
    for (column, value) in E::values(input) {
        qb.push(format!(", {column} = "));
        value.push_to(&mut qb);
    }
    qb.push(" WHERE id = ").push_bind(id);
    qb.push(" AND tenant_id = ").push_bind(ctx.tenant_id);
    qb.push(" AND deleted_at IS NULL");
    qb.build().execute(&mut *conn).await?;

    E::replace_associations(conn, ctx, id, input).await?;

    let record = find_record::<E>(conn, ctx, id).await?;
    audit::log(
        conn,
        ctx,
        E::RESOURCE,
        id,
        AuditAction::Update,
        &snapshot::<E>(&record, input)?,
    )
    .await?;

    tracing::debug!(entity = E::RESOURCE.key(), %id, "updated");
    E::fill(conn, ctx, record).await
}

/// Soft-delete a live row and write the `delete` audit entry.
pub async fn destroy<E: TenantEntity>(
    conn: &mut SqliteConnection,
    ctx: &RequestContext,
    id: Uuid,
) -> Result<(), DbError> {
    let record = find_record::<E>(conn, ctx, id).await?;
    let now = Utc::now();

    sqlx::query(&format!(
        "UPDATE {} SET deleted_at = ?, updated_by_id = ?, updated_at = ? \
         WHERE id = ? AND tenant_id = ? AND deleted_at IS NULL",
        E::TABLE
    ))
    .bind(now)
    .bind(ctx.user_id)
    .bind(now)
    .bind(id)
    .bind(ctx.tenant_id)
    .execute(&mut *conn)
    .await?;

    audit::log(
        conn,
        ctx,
        E::RESOURCE,
        id,
        AuditAction::Delete,
        &serde_json::to_value(&record)?,
    )
    .await?;

    tracing::debug!(entity = E::RESOURCE.key(), %id, "deleted");
    Ok(())
}

/// Count live rows of the caller's tenant carrying `import_hash`.
pub async fn count_import_hash<E: TenantEntity>(
    conn: &mut SqliteConnection,
    ctx: &RequestContext,
    import_hash: &str,
) -> Result<i64, DbError> {
    let count: i64 = sqlx::query_scalar(&format!(
        "SELECT COUNT(*) FROM {} WHERE tenant_id = ? AND import_hash = ? AND deleted_at IS NULL",
        E::TABLE
    ))
    .bind(ctx.tenant_id)
    .bind(import_hash)
    .fetch_one(&mut *conn)
    .await?;
    Ok(count)
}

/// Filtered, ordered window of live rows plus the total match count.
pub async fn find_and_count_all<E: TenantEntity>(
    conn: &mut SqliteConnection,
    ctx: &RequestContext,
    filter: &E::Filter,
    window: Window,
    ordering: Ordering,
) -> Result<Page<E::View>, DbError> {
    let mut conditions = Conditions::new();
    let common = E::common(filter);
    conditions.reference("id", common.id.as_deref());
    conditions.timestamp_between("created_at", "createdAtRange", common.created_at_range.as_deref())?;
    E::filter(&mut conditions, filter)?;

    let mut count_qb = QueryBuilder::<Sqlite>::new(format!(
        "SELECT COUNT(*) FROM {} WHERE tenant_id = ",
        E::TABLE
    ));
    count_qb.push_bind(ctx.tenant_id);
    count_qb.push(" AND deleted_at IS NULL");
    conditions.push_to(&mut count_qb);
    let count = count_qb
        .build_query_scalar::<i64>()
        .fetch_one(&mut *conn)
        .await?;

    let mut qb = QueryBuilder::<Sqlite>::new(select::<E>());
    qb.push_bind(ctx.tenant_id);
    qb.push(" AND deleted_at IS NULL");
    conditions.push_to(&mut qb);
    qb.push(format!(
        " ORDER BY {} {}, id {}",
        ordering.column,
        direction(ordering.descending),
        direction(ordering.descending)
    ));
    qb.push(" LIMIT ").push_bind(i64::from(window.limit));
    qb.push(" OFFSET ").push_bind(i64::from(window.offset));

    let records = qb
        .build_query_as::<E::Record>()
        .fetch_all(&mut *conn)
        .await?;

    let mut rows = Vec::with_capacity(records.len());
    for record in records {
        rows.push(E::fill(conn, ctx, record).await?);
    }

    Ok(Page { rows, count })
}

/// Id/label pairs whose id equals `query` or whose label contains it.
pub async fn autocomplete<E: TenantEntity>(
    conn: &mut SqliteConnection,
    ctx: &RequestContext,
    query: Option<&str>,
    limit: u32,
) -> Result<Vec<AutocompleteItem>, DbError> {
    let label = format!("COALESCE(CAST({} AS TEXT), '')", E::LABEL_COLUMN);

    let mut qb = QueryBuilder::<Sqlite>::new(format!(
        "SELECT id, {label} AS label FROM {} WHERE tenant_id = ",
        E::TABLE
    ));
    qb.push_bind(ctx.tenant_id);
    qb.push(" AND deleted_at IS NULL");

    if let Some(query) = query.map(str::trim).filter(|q| !q.is_empty()) {
        let pattern = like_pattern(query);
        match Uuid::parse_str(query) {
            Ok(id) => {
                qb.push(" AND (id = ").push_bind(id);
                qb.push(format!(" OR {label} LIKE "));
                qb.push_bind(pattern);
                qb.push(" ESCAPE '\\')");
            }
            Err(_) => {
                qb.push(format!(" AND {label} LIKE "));
                qb.push_bind(pattern);
                qb.push(" ESCAPE '\\'");
            }
        }
    }

    qb.push(" ORDER BY label ASC LIMIT ").push_bind(i64::from(limit));

    let items = qb
        .build_query_as::<AutocompleteItem>()
        .fetch_all(&mut *conn)
        .await?;
    Ok(items)
}

/// Clear or set a has-many foreign key so exactly `ids` point at `parent_id`.
///
/// Every id must name a live row of `table` in the caller's tenant.
pub async fn replace_children(
    conn: &mut SqliteConnection,
    ctx: &RequestContext,
    table: &'static str,
    fk_column: &'static str,
    field: &'static str,
    parent_id: Uuid,
    ids: &[Uuid],
) -> Result<(), DbError> {
    for id in ids {
        super::ensure_reference(conn, ctx, table, field, Some(*id)).await?;
    }

    let mut qb = QueryBuilder::<Sqlite>::new(format!("UPDATE {table} SET {fk_column} = NULL"));
    qb.push(" WHERE tenant_id = ").push_bind(ctx.tenant_id);
    qb.push(format!(" AND {fk_column} = ")).push_bind(parent_id);
    if !ids.is_empty() {
        qb.push(" AND id NOT IN (");
        let mut separated = qb.separated(", ");
        for id in ids {
            separated.push_bind(*id);
        }
        separated.push_unseparated(")");
    }
    qb.build().execute(&mut *conn).await?;

    for id in ids {
        sqlx::query(&format!(
            "UPDATE {table} SET {fk_column} = ? WHERE id = ? AND tenant_id = ?"
        ))
        .bind(parent_id)
        .bind(*id)
        .bind(ctx.tenant_id)
        .execute(&mut *conn)
        .await?;
    }

    Ok(())
}

/// Live rows of `table` whose `fk_column` points at `parent_id`.
pub async fn children<E: TenantEntity>(
    conn: &mut SqliteConnection,
    ctx: &RequestContext,
    fk_column: &'static str,
    parent_id: Uuid,
) -> Result<Vec<E::Record>, DbError> {
    let mut qb = QueryBuilder::<Sqlite>::new(select::<E>());
    qb.push_bind(ctx.tenant_id);
    qb.push(" AND deleted_at IS NULL");
    qb.push(format!(" AND {fk_column} = ")).push_bind(parent_id);
    qb.push(" ORDER BY created_at ASC, id ASC");

    let rows = qb
        .build_query_as::<E::Record>()
        .fetch_all(&mut *conn)
        .await?;
    Ok(rows)
}

fn direction(descending: bool) -> &'static str {
    if descending {
        "DESC"
    } else {
        "ASC"
    }
}

/// Row JSON merged with the association ids of the payload.
fn snapshot<E: TenantEntity>(record: &E::Record, input: &E::Input) -> Result<Value, DbError> {
    let mut value = serde_json::to_value(record)?;
    if let Value::Object(map) = &mut value {
        map.extend(E::audit_extra(input));
    }
    Ok(value)
}
