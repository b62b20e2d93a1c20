//! Schema migrations
//!
//! Every statement is idempotent so `run` is safe on each startup.
//! Entity tables share the same bookkeeping columns; uniqueness is enforced
//! by partial indexes over live rows only, so a soft-deleted row never
//! blocks a new one with the same natural key or import hash.

use sqlx::SqlitePool;

/// Bookkeeping columns every tenant-scoped entity table starts with
const ENTITY_PREFIX: &str = r#"
    id BLOB PRIMARY KEY NOT NULL,
    tenant_id BLOB NOT NULL,
    import_hash TEXT,
    created_by_id BLOB NOT NULL,
    updated_by_id BLOB NOT NULL,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL,
    deleted_at TEXT"#;

/// Entity tables: (table, own columns, unique business column)
const ENTITY_TABLES: &[(&str, &str, Option<&str>)] = &[
    (
        "health_centers",
        r#"
    name TEXT NOT NULL,
    address TEXT NOT NULL,
    phone_number TEXT,
    admin_name_id BLOB"#,
        None,
    ),
    (
        "doctors",
        r#"
    name TEXT NOT NULL,
    specialization TEXT NOT NULL,
    phone TEXT,
    user_id BLOB"#,
        Some("name"),
    ),
    (
        "medicine_enums",
        r#"
    medicine_name TEXT NOT NULL,
    kept_in_stock INTEGER NOT NULL DEFAULT 0"#,
        Some("medicine_name"),
    ),
    (
        "symptoms_enums",
        r#"
    symptom_name TEXT NOT NULL"#,
        Some("symptom_name"),
    ),
    (
        "diagnostic_enums",
        r#"
    diagnostic_name TEXT NOT NULL"#,
        Some("diagnostic_name"),
    ),
    (
        "medicine_inventories",
        r#"
    medicine_id BLOB,
    inventory_date TEXT NOT NULL,
    count INTEGER NOT NULL"#,
        None,
    ),
    (
        "medicine_supplies",
        r#"
    medicine_id BLOB,
    inventory_add_date TEXT NOT NULL,
    count INTEGER NOT NULL"#,
        None,
    ),
    (
        "medical_histories",
        r#"
    patient_id BLOB,
    smoking TEXT,
    drug_use INTEGER NOT NULL DEFAULT 0,
    drink TEXT,
    family_history TEXT"#,
        None,
    ),
    (
        "patients",
        r#"
    first_name TEXT NOT NULL,
    middle_name TEXT,
    last_name TEXT NOT NULL,
    full_name TEXT,
    gender TEXT NOT NULL,
    age INTEGER,
    locality_name TEXT,
    mobile_number TEXT,
    aadhar_number TEXT,
    date_of_birth TEXT,
    medical_history_id BLOB"#,
        None,
    ),
    (
        "patient_visits",
        r#"
    patient_id BLOB,
    medical_center_id BLOB,
    doctor_id BLOB,
    symptom1_id BLOB,
    symptom2_id BLOB,
    symptom3_id BLOB,
    medicine1_id BLOB,
    medicine2_id BLOB,
    medicine3_id BLOB,
    medicine4_id BLOB,
    visit_date TEXT NOT NULL,
    other_symptoms TEXT,
    vital_statistics TEXT,
    diagnosis TEXT NOT NULL,
    requested_labs TEXT,
    med1_qty INTEGER,
    med2_qty INTEGER,
    med3_qty INTEGER,
    med4_qty INTEGER,
    medicine_instructions TEXT,
    referral_lab TEXT,
    referral_hospital TEXT,
    referred_doctor TEXT,
    return_in TEXT,
    patient_copay INTEGER"#,
        None,
    ),
    (
        "patient_documents",
        r#"
    patient_id BLOB,
    report_name TEXT NOT NULL,
    report_date TEXT"#,
        None,
    ),
];

/// Statements for tenants, users, files and the audit log
const SUPPORT_TABLES: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS tenants (
        id BLOB PRIMARY KEY NOT NULL,
        name TEXT NOT NULL,
        created_at TEXT NOT NULL
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS users (
        id BLOB PRIMARY KEY NOT NULL,
        email TEXT NOT NULL UNIQUE,
        api_token_hash TEXT UNIQUE,
        created_at TEXT NOT NULL
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS tenant_users (
        tenant_id BLOB NOT NULL,
        user_id BLOB NOT NULL,
        roles TEXT NOT NULL,
        created_at TEXT NOT NULL,
        PRIMARY KEY (tenant_id, user_id)
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS files (
        id BLOB PRIMARY KEY NOT NULL,
        tenant_id BLOB NOT NULL,
        belongs_to TEXT NOT NULL,
        belongs_to_column TEXT NOT NULL,
        belongs_to_id BLOB NOT NULL,
        name TEXT NOT NULL,
        size_in_bytes INTEGER,
        private_url TEXT,
        public_url TEXT,
        created_by_id BLOB NOT NULL,
        created_at TEXT NOT NULL,
        deleted_at TEXT
    )
    "#,
    r#"
    CREATE INDEX IF NOT EXISTS files_relation
        ON files (tenant_id, belongs_to, belongs_to_column, belongs_to_id)
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS audit_logs (
        id BLOB PRIMARY KEY NOT NULL,
        tenant_id BLOB NOT NULL,
        entity_name TEXT NOT NULL,
        entity_id BLOB NOT NULL,
        action TEXT NOT NULL,
        "values" TEXT NOT NULL,
        created_by_id BLOB NOT NULL,
        timestamp TEXT NOT NULL
    )
    "#,
    r#"
    CREATE INDEX IF NOT EXISTS audit_logs_entity
        ON audit_logs (tenant_id, entity_name, entity_id)
    "#,
];

/// Build the statements for one entity table and its indexes.
fn entity_statements(table: &str, columns: &str, unique: Option<&str>) -> Vec<String> {
    let mut statements = vec![
        format!("CREATE TABLE IF NOT EXISTS {table} ({ENTITY_PREFIX},{columns}\n)"),
        format!(
            "CREATE UNIQUE INDEX IF NOT EXISTS {table}_import_hash \
             ON {table} (tenant_id, import_hash) WHERE deleted_at IS NULL"
        ),
        format!(
            "CREATE INDEX IF NOT EXISTS {table}_tenant_created \
             ON {table} (tenant_id, created_at)"
        ),
    ];

    if let Some(column) = unique {
        statements.push(format!(
            "CREATE UNIQUE INDEX IF NOT EXISTS {table}_{column} \
             ON {table} (tenant_id, {column}) WHERE deleted_at IS NULL"
        ));
    }

    statements
}

/// Run all migrations
pub async fn run(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    tracing::info!("Running migrations...");

    for statement in SUPPORT_TABLES {
        sqlx::query(statement).execute(pool).await?;
    }

    for (table, columns, unique) in ENTITY_TABLES {
        for statement in entity_statements(table, columns, *unique) {
            sqlx::query(&statement).execute(pool).await?;
        }
    }

    tracing::info!(tables = ENTITY_TABLES.len(), "Migrations complete");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::pool::memory_pool;

    #[tokio::test]
    async fn migrations_are_idempotent() {
        let pool = memory_pool().await.unwrap();
        run(&pool).await.unwrap();
        run(&pool).await.unwrap();

        let tables: Vec<String> =
            sqlx::query_scalar("SELECT name FROM sqlite_master WHERE type = 'table' ORDER BY name")
                .fetch_all(&pool)
                .await
                .unwrap();

        for (table, _, _) in ENTITY_TABLES {
            assert!(tables.iter().any(|t| t == table), "missing table {table}");
        }
        assert!(tables.iter().any(|t| t == "audit_logs"));
    }

    #[test]
    fn unique_index_is_partial() {
        let statements = entity_statements("doctors", "name TEXT", Some("name"));
        let unique = statements.last().unwrap();
        assert!(unique.contains("doctors_name"));
        assert!(unique.ends_with("WHERE deleted_at IS NULL"));
    }
}
