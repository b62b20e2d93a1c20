//! File attachments of an entity column

use chrono::Utc;
use sqlx::SqliteConnection;
use uuid::Uuid;

use super::DbError;
use crate::models::{FileInput, RequestContext, StoredFile, ValidationError};

/// Owner table and column a set of files hangs off
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FileRelation {
    pub belongs_to: &'static str,
    pub column: &'static str,
}

impl FileRelation {
    pub const fn new(belongs_to: &'static str, column: &'static str) -> Self {
        Self { belongs_to, column }
    }
}

async fn live_ids(
    conn: &mut SqliteConnection,
    ctx: &RequestContext,
    relation: FileRelation,
    owner_id: Uuid,
) -> Result<Vec<Uuid>, DbError> {
    let ids = sqlx::query_scalar(
        "SELECT id FROM files \
         WHERE tenant_id = ? AND belongs_to = ? AND belongs_to_column = ? AND belongs_to_id = ? \
         AND deleted_at IS NULL",
    )
    .bind(ctx.tenant_id)
    .bind(relation.belongs_to)
    .bind(relation.column)
    .bind(owner_id)
    .fetch_all(&mut *conn)
    .await?;
    Ok(ids)
}

/// Make the live files of a relation match `files`.
///
/// Files carrying an id must already belong to the relation and are kept.
/// Live files missing from `files` are soft-deleted; files without an id
/// are inserted.
pub async fn replace_relation_files(
    conn: &mut SqliteConnection,
    ctx: &RequestContext,
    relation: FileRelation,
    owner_id: Uuid,
    files: &[FileInput],
) -> Result<(), DbError> {
    let existing = live_ids(conn, ctx, relation, owner_id).await?;
    let keep: Vec<Uuid> = files.iter().filter_map(|f| f.id).collect();

    if let Some(id) = keep.iter().find(|id| !existing.contains(id)) {
        return Err(ValidationError::UnknownReference {
            field: relation.column,
            id: *id,
        }
        .into());
    }

    let now = Utc::now();
    for id in existing.iter().filter(|id| !keep.contains(id)) {
        sqlx::query("UPDATE files SET deleted_at = ? WHERE id = ? AND tenant_id = ?")
            .bind(now)
            .bind(*id)
            .bind(ctx.tenant_id)
            .execute(&mut *conn)
            .await?;
    }

    for file in files.iter().filter(|f| f.id.is_none()) {
        sqlx::query(
            r#"
            INSERT INTO files
                (id, tenant_id, belongs_to, belongs_to_column, belongs_to_id,
                 name, size_in_bytes, private_url, public_url, created_by_id, created_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(ctx.tenant_id)
        .bind(relation.belongs_to)
        .bind(relation.column)
        .bind(owner_id)
        .bind(file.name.trim())
        .bind(file.size_in_bytes)
        .bind(file.private_url.as_deref())
        .bind(file.public_url.as_deref())
        .bind(ctx.user_id)
        .bind(now)
        .execute(&mut *conn)
        .await?;
    }

    Ok(())
}

/// Live files of a relation, oldest first.
pub async fn list_files(
    conn: &mut SqliteConnection,
    ctx: &RequestContext,
    relation: FileRelation,
    owner_id: Uuid,
) -> Result<Vec<StoredFile>, DbError> {
    let files = sqlx::query_as::<_, StoredFile>(
        r#"
        SELECT id, name, size_in_bytes, private_url, public_url, created_at
        FROM files
        WHERE tenant_id = ? AND belongs_to = ? AND belongs_to_column = ? AND belongs_to_id = ?
          AND deleted_at IS NULL
        ORDER BY created_at ASC, id ASC
        "#,
    )
    .bind(ctx.tenant_id)
    .bind(relation.belongs_to)
    .bind(relation.column)
    .bind(owner_id)
    .fetch_all(&mut *conn)
    .await?;
    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{migrations, pool::memory_pool};
    use crate::models::Role;

    const PICTURE: FileRelation = FileRelation::new("patients", "picture");

    fn upload(name: &str) -> FileInput {
        FileInput {
            name: name.into(),
            private_url: Some(format!("uploads/{name}")),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn replaces_files_of_relation() {
        let pool = memory_pool().await.unwrap();
        migrations::run(&pool).await.unwrap();
        let mut conn = pool.acquire().await.unwrap();
        let ctx = RequestContext::new(Uuid::new_v4(), Uuid::new_v4(), vec![Role::Admin]);
        let owner = Uuid::new_v4();

        replace_relation_files(&mut conn, &ctx, PICTURE, owner, &[upload("a.png"), upload("b.png")])
            .await
            .unwrap();
        let stored = list_files(&mut conn, &ctx, PICTURE, owner).await.unwrap();
        assert_eq!(stored.len(), 2);

        let keep = stored.iter().find(|f| f.name == "b.png").unwrap().id;
        let payload = vec![
            FileInput {
                id: Some(keep),
                ..Default::default()
            },
            upload("c.png"),
        ];
        replace_relation_files(&mut conn, &ctx, PICTURE, owner, &payload)
            .await
            .unwrap();

        let mut names: Vec<_> = list_files(&mut conn, &ctx, PICTURE, owner)
            .await
            .unwrap()
            .into_iter()
            .map(|f| f.name)
            .collect();
        names.sort();
        assert_eq!(names, vec!["b.png", "c.png"]);

        replace_relation_files(&mut conn, &ctx, PICTURE, owner, &[])
            .await
            .unwrap();
        assert!(list_files(&mut conn, &ctx, PICTURE, owner).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn rejects_foreign_file_id() {
        let pool = memory_pool().await.unwrap();
        migrations::run(&pool).await.unwrap();
        let mut conn = pool.acquire().await.unwrap();
        let ctx = RequestContext::new(Uuid::new_v4(), Uuid::new_v4(), vec![Role::Admin]);

        let payload = vec![FileInput {
            id: Some(Uuid::new_v4()),
            ..Default::default()
        }];
        let err = replace_relation_files(&mut conn, &ctx, PICTURE, Uuid::new_v4(), &payload)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            DbError::Invalid(ValidationError::UnknownReference { field: "picture", .. })
        ));
    }
}
