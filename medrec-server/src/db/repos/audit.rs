//! Audit log written alongside every mutation

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;
use sqlx::{FromRow, SqliteConnection};
use uuid::Uuid;

use super::DbError;
use crate::models::{RequestContext, Resource};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(rename_all = "lowercase")]
pub enum AuditAction {
    Create,
    Update,
    Delete,
}

/// Audit record as stored
#[derive(Debug, Clone, FromRow)]
pub struct AuditEntry {
    pub id: Uuid,
    pub entity_name: String,
    pub entity_id: Uuid,
    pub action: AuditAction,
    /// JSON snapshot of the row
    pub values: String,
    pub created_by_id: Uuid,
    pub timestamp: DateTime<Utc>,
}

impl AuditEntry {
    pub fn values(&self) -> Result<Value, serde_json::Error> {
        serde_json::from_str(&self.values)
    }
}

/// Append an entry on the caller's connection.
pub async fn log(
    conn: &mut SqliteConnection,
    ctx: &RequestContext,
    resource: Resource,
    entity_id: Uuid,
    action: AuditAction,
    values: &Value,
) -> Result<(), DbError> {
    sqlx::query(
        r#"
        INSERT INTO audit_logs
            (id, tenant_id, entity_name, entity_id, action, "values", created_by_id, timestamp)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(ctx.tenant_id)
    .bind(resource.key())
    .bind(entity_id)
    .bind(action)
    .bind(serde_json::to_string(values)?)
    .bind(ctx.user_id)
    .bind(Utc::now())
    .execute(&mut *conn)
    .await?;
    Ok(())
}

/// Entries for one row of the caller's tenant, oldest first.
pub async fn entries_for(
    conn: &mut SqliteConnection,
    ctx: &RequestContext,
    resource: Resource,
    entity_id: Uuid,
) -> Result<Vec<AuditEntry>, DbError> {
    let rows = sqlx::query_as::<_, AuditEntry>(
        r#"
        SELECT id, entity_name, entity_id, action, "values", created_by_id, timestamp
        FROM audit_logs
        WHERE tenant_id = ? AND entity_name = ? AND entity_id = ?
        ORDER BY timestamp ASC, rowid ASC
        "#,
    )
    .bind(ctx.tenant_id)
    .bind(resource.key())
    .bind(entity_id)
    .fetch_all(&mut *conn)
    .await?;
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{migrations, pool::memory_pool};
    use crate::models::Role;
    use serde_json::json;

    #[tokio::test]
    async fn entries_are_scoped_to_tenant() {
        let pool = memory_pool().await.unwrap();
        migrations::run(&pool).await.unwrap();
        let mut conn = pool.acquire().await.unwrap();

        let ctx = RequestContext::new(Uuid::new_v4(), Uuid::new_v4(), vec![Role::Admin]);
        let other = RequestContext::new(Uuid::new_v4(), ctx.user_id, vec![Role::Admin]);
        let entity_id = Uuid::new_v4();

        log(
            &mut conn,
            &ctx,
            Resource::Doctor,
            entity_id,
            AuditAction::Create,
            &json!({"name": "Dr Anand"}),
        )
        .await
        .unwrap();
        log(&mut conn, &ctx, Resource::Doctor, entity_id, AuditAction::Delete, &json!({}))
            .await
            .unwrap();

        let entries = entries_for(&mut conn, &ctx, Resource::Doctor, entity_id)
            .await
            .unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].action, AuditAction::Create);
        assert_eq!(entries[0].values().unwrap()["name"], "Dr Anand");
        assert_eq!(entries[1].action, AuditAction::Delete);

        let foreign = entries_for(&mut conn, &other, Resource::Doctor, entity_id)
            .await
            .unwrap();
        assert!(foreign.is_empty());
    }
}
