//! Tenants, users and memberships
//!
//! These are global tables, not tenant-scoped entities: they are managed
//! from the CLI and read by request authentication.

use chrono::Utc;
use sqlx::SqlitePool;
use uuid::Uuid;

use super::DbError;
use crate::auth;
use crate::models::{Email, Role, Tenant, TenantName, User};

/// Tenant repository
pub struct TenantRepo<'a> {
    pool: &'a SqlitePool,
}

impl<'a> TenantRepo<'a> {
    pub fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn create(&self, name: TenantName) -> Result<Tenant, DbError> {
        let tenant = sqlx::query_as::<_, Tenant>(
            "INSERT INTO tenants (id, name, created_at) VALUES (?, ?, ?) \
             RETURNING id, name, created_at",
        )
        .bind(Uuid::new_v4())
        .bind(name.as_str())
        .bind(Utc::now())
        .fetch_one(self.pool)
        .await?;

        tracing::info!(tenant_id = %tenant.id, name = %tenant.name, "tenant created");
        Ok(tenant)
    }

    pub async fn get(&self, id: Uuid) -> Result<Tenant, DbError> {
        sqlx::query_as::<_, Tenant>("SELECT id, name, created_at FROM tenants WHERE id = ?")
            .bind(id)
            .fetch_optional(self.pool)
            .await?
            .ok_or_else(|| DbError::NotFound {
                resource: "tenant",
                id: id.to_string(),
            })
    }
}

/// User repository
pub struct UserRepo<'a> {
    pool: &'a SqlitePool,
}

impl<'a> UserRepo<'a> {
    pub fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// Create a user, returning the existing one on email conflict (idempotent).
    pub async fn upsert(&self, email: Email) -> Result<User, DbError> {
        let user = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (id, email, created_at) VALUES (?, ?, ?)
            ON CONFLICT (email) DO UPDATE SET email = excluded.email
            RETURNING id, email, created_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(email.as_str())
        .bind(Utc::now())
        .fetch_one(self.pool)
        .await?;
        Ok(user)
    }

    /// Replace the user's API token, returning the new plain token.
    pub async fn issue_token(&self, user_id: Uuid) -> Result<String, DbError> {
        let token = auth::generate_token();
        let updated = sqlx::query("UPDATE users SET api_token_hash = ? WHERE id = ?")
            .bind(auth::hash_token(&token))
            .bind(user_id)
            .execute(self.pool)
            .await?;

        if updated.rows_affected() == 0 {
            return Err(DbError::NotFound {
                resource: "user",
                id: user_id.to_string(),
            });
        }
        Ok(token)
    }

    pub async fn find_by_token(&self, token: &str) -> Result<Option<User>, DbError> {
        let user = sqlx::query_as::<_, User>(
            "SELECT id, email, created_at FROM users WHERE api_token_hash = ?",
        )
        .bind(auth::hash_token(token))
        .fetch_optional(self.pool)
        .await?;
        Ok(user)
    }
}

/// Tenant membership repository
pub struct MembershipRepo<'a> {
    pool: &'a SqlitePool,
}

impl<'a> MembershipRepo<'a> {
    pub fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// Add a user to a tenant, replacing the roles of an existing membership.
    pub async fn add(&self, tenant_id: Uuid, user_id: Uuid, roles: &[Role]) -> Result<(), DbError> {
        sqlx::query(
            r#"
            INSERT INTO tenant_users (tenant_id, user_id, roles, created_at) VALUES (?, ?, ?, ?)
            ON CONFLICT (tenant_id, user_id) DO UPDATE SET roles = excluded.roles
            "#,
        )
        .bind(tenant_id)
        .bind(user_id)
        .bind(Role::join(roles))
        .bind(Utc::now())
        .execute(self.pool)
        .await?;

        tracing::info!(%tenant_id, %user_id, roles = %Role::join(roles), "membership saved");
        Ok(())
    }

    /// Roles of a user in a tenant, `None` when not a member.
    pub async fn roles(&self, tenant_id: Uuid, user_id: Uuid) -> Result<Option<Vec<Role>>, DbError> {
        let raw: Option<String> =
            sqlx::query_scalar("SELECT roles FROM tenant_users WHERE tenant_id = ? AND user_id = ?")
                .bind(tenant_id)
                .bind(user_id)
                .fetch_optional(self.pool)
                .await?;
        Ok(raw.map(|r| Role::split(&r)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{migrations, pool::memory_pool};

    async fn pool() -> SqlitePool {
        let pool = memory_pool().await.unwrap();
        migrations::run(&pool).await.unwrap();
        pool
    }

    #[tokio::test]
    async fn upsert_user_is_idempotent() {
        let pool = pool().await;
        let users = UserRepo::new(&pool);

        let a = users.upsert(Email::new("asha@clinic.org").unwrap()).await.unwrap();
        let b = users.upsert(Email::new("ASHA@clinic.org").unwrap()).await.unwrap();
        assert_eq!(a.id, b.id);
    }

    #[tokio::test]
    async fn token_lookup() {
        let pool = pool().await;
        let users = UserRepo::new(&pool);
        let user = users.upsert(Email::new("asha@clinic.org").unwrap()).await.unwrap();

        let first = users.issue_token(user.id).await.unwrap();
        assert_eq!(users.find_by_token(&first).await.unwrap().unwrap().id, user.id);

        let second = users.issue_token(user.id).await.unwrap();
        assert!(users.find_by_token(&first).await.unwrap().is_none());
        assert!(users.find_by_token(&second).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn membership_roles() {
        let pool = pool().await;
        let tenant = TenantRepo::new(&pool)
            .create(TenantName::new("Rampur PHC").unwrap())
            .await
            .unwrap();
        let user = UserRepo::new(&pool)
            .upsert(Email::new("asha@clinic.org").unwrap())
            .await
            .unwrap();
        let members = MembershipRepo::new(&pool);

        assert_eq!(members.roles(tenant.id, user.id).await.unwrap(), None);

        members.add(tenant.id, user.id, &[Role::Viewer]).await.unwrap();
        members.add(tenant.id, user.id, &[Role::Editor]).await.unwrap();
        assert_eq!(
            members.roles(tenant.id, user.id).await.unwrap(),
            Some(vec![Role::Editor])
        );
        assert_eq!(members.roles(Uuid::new_v4(), user.id).await.unwrap(), None);
    }

    #[tokio::test]
    async fn missing_tenant() {
        let pool = pool().await;
        let err = TenantRepo::new(&pool).get(Uuid::new_v4()).await.unwrap_err();
        assert!(matches!(err, DbError::NotFound { resource: "tenant", .. }));
    }
}
