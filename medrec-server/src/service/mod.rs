//! Entity services
//!
//! A service checks the caller's permission, opens a transaction, runs the
//! tenant-scoped repository operation and commits, or rolls back and maps
//! the error. Every mutation is all-or-nothing, associations and audit
//! entries included.

pub mod error;

use std::marker::PhantomData;

use sqlx::{Sqlite, SqlitePool, Transaction};
use uuid::Uuid;

use crate::db::repos::{scoped, DbError, TenantEntity};
use crate::models::listing::DEFAULT_AUTOCOMPLETE_LIMIT;
use crate::models::{
    Action, AutocompleteItem, Ordering, Page, Permission, PermissionChecker, RequestContext,
    Window,
};

pub use error::{ServiceError, ServiceResult};

/// List request: filter plus window and ordering
#[derive(Debug, Clone, Default)]
pub struct ListQuery<F> {
    pub filter: F,
    pub limit: Option<u32>,
    pub offset: Option<u32>,
    pub order_by: Option<String>,
}

/// Operations on one entity type
pub struct EntityService<'a, E> {
    pool: &'a SqlitePool,
    _entity: PhantomData<fn() -> E>,
}

impl<'a, E: TenantEntity> EntityService<'a, E> {
    pub fn new(pool: &'a SqlitePool) -> Self {
        Self {
            pool,
            _entity: PhantomData,
        }
    }

    fn authorize(ctx: &RequestContext, action: Action) -> ServiceResult<()> {
        PermissionChecker::new(ctx).validate_has(Permission::new(E::RESOURCE, action))?;
        Ok(())
    }

    /// Open a write transaction.
    ///
    /// `BEGIN IMMEDIATE` takes the write lock up front, so a second writer
    /// waits out the busy timeout and then reads the first one's commit. A
    /// deferred transaction that read first would fail with `SQLITE_BUSY`
    /// when upgrading.
    async fn begin_write(&self) -> ServiceResult<Transaction<'static, Sqlite>> {
        Ok(self.pool.begin_with("BEGIN IMMEDIATE").await?)
    }

    /// Commit on success, roll back on failure.
    async fn finish<T>(
        tx: Transaction<'static, Sqlite>,
        result: Result<T, DbError>,
    ) -> ServiceResult<T> {
        match result {
            Ok(value) => {
                tx.commit().await?;
                Ok(value)
            }
            Err(e) => {
                if let Err(rollback) = tx.rollback().await {
                    tracing::warn!(error = %rollback, "rollback failed");
                }
                Err(ServiceError::from_db::<E>(e))
            }
        }
    }

    pub async fn create(&self, ctx: &RequestContext, input: E::Input) -> ServiceResult<E::View> {
        Self::authorize(ctx, Action::Create)?;

        let mut tx = self.begin_write().await?;
        let result = scoped::create::<E>(&mut tx, ctx, &input, None).await;
        Self::finish(tx, result).await
    }

    pub async fn update(
        &self,
        ctx: &RequestContext,
        id: Uuid,
        input: E::Input,
    ) -> ServiceResult<E::View> {
        Self::authorize(ctx, Action::Edit)?;

        let mut tx = self.begin_write().await?;
        let result = scoped::update::<E>(&mut tx, ctx, id, &input).await;
        Self::finish(tx, result).await
    }

    /// Soft-delete every id or none of them.
    pub async fn destroy_all(&self, ctx: &RequestContext, ids: &[Uuid]) -> ServiceResult<()> {
        Self::authorize(ctx, Action::Destroy)?;

        let mut tx = self.begin_write().await?;
        let mut result = Ok(());
        for id in ids {
            result = scoped::destroy::<E>(&mut tx, ctx, *id).await;
            if result.is_err() {
                break;
            }
        }
        Self::finish(tx, result).await?;

        tracing::info!(
            entity = E::RESOURCE.key(),
            tenant_id = %ctx.tenant_id,
            count = ids.len(),
            "destroyed"
        );
        Ok(())
    }

    pub async fn find_by_id(&self, ctx: &RequestContext, id: Uuid) -> ServiceResult<E::View> {
        Self::authorize(ctx, Action::Read)?;

        let mut conn = self.pool.acquire().await?;
        scoped::find_by_id::<E>(&mut conn, ctx, id)
            .await
            .map_err(ServiceError::from_db::<E>)
    }

    pub async fn find_and_count_all(
        &self,
        ctx: &RequestContext,
        query: &ListQuery<E::Filter>,
    ) -> ServiceResult<Page<E::View>> {
        Self::authorize(ctx, Action::Read)?;

        let window = Window::new(query.limit, query.offset);
        let ordering = Ordering::parse(query.order_by.as_deref(), E::SORTABLE)?;

        let mut conn = self.pool.acquire().await?;
        scoped::find_and_count_all::<E>(&mut conn, ctx, &query.filter, window, ordering)
            .await
            .map_err(ServiceError::from_db::<E>)
    }

    pub async fn find_all_autocomplete(
        &self,
        ctx: &RequestContext,
        query: Option<&str>,
        limit: Option<u32>,
    ) -> ServiceResult<Vec<AutocompleteItem>> {
        Self::authorize(ctx, Action::Autocomplete)?;

        let limit = limit
            .filter(|l| *l > 0)
            .unwrap_or(DEFAULT_AUTOCOMPLETE_LIMIT)
            .min(crate::models::listing::MAX_LIMIT);

        let mut conn = self.pool.acquire().await?;
        scoped::autocomplete::<E>(&mut conn, ctx, query, limit)
            .await
            .map_err(ServiceError::from_db::<E>)
    }

    /// Create a row once per import hash.
    ///
    /// The hash check and the insert share one write transaction, so
    /// concurrent imports of the same hash run one after the other and all
    /// but the first see `ImportHashExists`.
    pub async fn import(
        &self,
        ctx: &RequestContext,
        input: E::Input,
        import_hash: Option<&str>,
    ) -> ServiceResult<E::View> {
        Self::authorize(ctx, Action::Import)?;

        let import_hash = import_hash
            .map(str::trim)
            .filter(|h| !h.is_empty())
            .ok_or(ServiceError::ImportHashRequired)?;

        let mut tx = self.begin_write().await?;
        let existing = scoped::count_import_hash::<E>(&mut tx, ctx, import_hash).await;
        let result = match existing {
            Ok(0) => scoped::create::<E>(&mut tx, ctx, &input, Some(import_hash)).await,
            Ok(_) => {
                tx.rollback().await?;
                tracing::debug!(
                    entity = E::RESOURCE.key(),
                    import_hash,
                    "import hash already present"
                );
                return Err(ServiceError::ImportHashExists);
            }
            Err(e) => Err(e),
        };
        Self::finish(tx, result).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repos::audit::{self, AuditAction};
    use crate::db::repos::MedicineEnums;
    use crate::db::{migrations, pool::create_pool, pool::memory_pool};
    use crate::models::{MedicineEnumFilter, MedicineEnumInput, Resource, Role};

    async fn setup() -> SqlitePool {
        let pool = memory_pool().await.unwrap();
        migrations::run(&pool).await.unwrap();
        pool
    }

    fn ctx(tenant_id: Uuid, role: Role) -> RequestContext {
        RequestContext::new(tenant_id, Uuid::new_v4(), vec![role])
    }

    fn medicine(name: &str) -> MedicineEnumInput {
        MedicineEnumInput {
            medicine_name: name.into(),
            kept_in_stock: false,
        }
    }

    #[tokio::test]
    async fn duplicate_name_is_reported_by_field() {
        let pool = setup().await;
        let service = EntityService::<MedicineEnums>::new(&pool);
        let admin = ctx(Uuid::new_v4(), Role::Admin);

        service.create(&admin, medicine("Paracetamol")).await.unwrap();
        let err = service
            .create(&admin, medicine("Paracetamol"))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            ServiceError::Duplicate {
                entity: "medicineEnum",
                field: "medicineName"
            }
        ));

        // Other tenants have their own namespace
        let other = ctx(Uuid::new_v4(), Role::Admin);
        assert!(service.create(&other, medicine("Paracetamol")).await.is_ok());
    }

    #[tokio::test]
    async fn soft_deleted_name_can_be_reused() {
        let pool = setup().await;
        let service = EntityService::<MedicineEnums>::new(&pool);
        let admin = ctx(Uuid::new_v4(), Role::Admin);

        let first = service.create(&admin, medicine("Paracetamol")).await.unwrap();
        service.destroy_all(&admin, &[first.meta.id]).await.unwrap();

        let second = service.create(&admin, medicine("Paracetamol")).await.unwrap();
        assert_ne!(first.meta.id, second.meta.id);

        let err = service.find_by_id(&admin, first.meta.id).await.unwrap_err();
        assert!(matches!(err, ServiceError::NotFound { .. }));
    }

    #[tokio::test]
    async fn destroy_all_is_atomic() {
        let pool = setup().await;
        let service = EntityService::<MedicineEnums>::new(&pool);
        let admin = ctx(Uuid::new_v4(), Role::Admin);

        let kept = service.create(&admin, medicine("Paracetamol")).await.unwrap();
        let err = service
            .destroy_all(&admin, &[kept.meta.id, Uuid::new_v4()])
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::NotFound { .. }));

        assert!(service.find_by_id(&admin, kept.meta.id).await.is_ok());
    }

    #[tokio::test]
    async fn import_requires_fresh_hash() {
        let pool = setup().await;
        let service = EntityService::<MedicineEnums>::new(&pool);
        let admin = ctx(Uuid::new_v4(), Role::Admin);

        let err = service
            .import(&admin, medicine("Paracetamol"), Some("  "))
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::ImportHashRequired));

        let imported = service
            .import(&admin, medicine("Paracetamol"), Some("h1"))
            .await
            .unwrap();
        assert_eq!(imported.meta.import_hash.as_deref(), Some("h1"));

        let err = service
            .import(&admin, medicine("Amoxicillin"), Some("h1"))
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::ImportHashExists));

        let page = service
            .find_and_count_all(&admin, &ListQuery::<MedicineEnumFilter>::default())
            .await
            .unwrap();
        assert_eq!(page.count, 1);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn racing_imports_of_one_hash_keep_a_single_row() {
        let dir = tempfile::tempdir().unwrap();
        let url = format!("sqlite://{}", dir.path().join("race.db").display());
        let pool = create_pool(&url).await.unwrap();
        migrations::run(&pool).await.unwrap();
        let admin = ctx(Uuid::new_v4(), Role::Admin);

        for round in 0..10 {
            let hash = format!("h{round}");
            let tasks: Vec<_> = (0..4)
                .map(|n| {
                    let pool = pool.clone();
                    let admin = admin.clone();
                    let hash = hash.clone();
                    tokio::spawn(async move {
                        EntityService::<MedicineEnums>::new(&pool)
                            .import(&admin, medicine(&format!("Medicine {round}-{n}")), Some(&hash))
                            .await
                    })
                })
                .collect();

            let mut imported = 0;
            for task in tasks {
                match task.await.unwrap() {
                    Ok(_) => imported += 1,
                    Err(ServiceError::ImportHashExists) => {}
                    Err(other) => panic!("round {round}: unexpected error {other}"),
                }
            }
            assert_eq!(imported, 1, "round {round}");
        }

        let rows: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM medicine_enums")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(rows, 10);
        pool.close().await;
    }

    #[tokio::test]
    async fn failed_create_leaves_nothing_behind() {
        let pool = setup().await;
        let service = EntityService::<MedicineEnums>::new(&pool);
        let admin = ctx(Uuid::new_v4(), Role::Admin);

        let err = service.create(&admin, medicine("Para")).await.unwrap_err();
        assert!(matches!(err, ServiceError::Validation(_)));

        let rows: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM medicine_enums")
            .fetch_one(&pool)
            .await
            .unwrap();
        let audits: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM audit_logs")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!((rows, audits), (0, 0));
    }

    #[tokio::test]
    async fn roles_gate_operations() {
        let pool = setup().await;
        let service = EntityService::<MedicineEnums>::new(&pool);
        let tenant = Uuid::new_v4();
        let editor = ctx(tenant, Role::Editor);
        let viewer = ctx(tenant, Role::Viewer);

        let created = service.create(&editor, medicine("Paracetamol")).await.unwrap();

        let err = service.destroy_all(&editor, &[created.meta.id]).await.unwrap_err();
        assert!(matches!(err, ServiceError::Forbidden(_)));

        let err = service.create(&viewer, medicine("Amoxicillin")).await.unwrap_err();
        assert!(matches!(err, ServiceError::Forbidden(_)));

        let items = service
            .find_all_autocomplete(&viewer, Some("para"), None)
            .await
            .unwrap();
        assert_eq!(items.len(), 1);
    }

    #[tokio::test]
    async fn mutations_are_audited() {
        let pool = setup().await;
        let service = EntityService::<MedicineEnums>::new(&pool);
        let admin = ctx(Uuid::new_v4(), Role::Admin);

        let created = service.create(&admin, medicine("Paracetamol")).await.unwrap();
        service
            .update(&admin, created.meta.id, medicine("Paracetamol 500"))
            .await
            .unwrap();
        service.destroy_all(&admin, &[created.meta.id]).await.unwrap();

        let mut conn = pool.acquire().await.unwrap();
        let entries = audit::entries_for(&mut conn, &admin, Resource::MedicineEnum, created.meta.id)
            .await
            .unwrap();
        let actions: Vec<_> = entries.iter().map(|e| e.action).collect();
        assert_eq!(
            actions,
            vec![AuditAction::Create, AuditAction::Update, AuditAction::Delete]
        );
        assert_eq!(entries[1].values().unwrap()["medicineName"], "Paracetamol 500");
    }
}
