//! Medicine, symptom and diagnosis catalogs

use async_trait::async_trait;
use sqlx::SqliteConnection;

use super::{Conditions, DbError, Param, TenantEntity};
use crate::models::{
    CommonFilter, DiagnosticEnum, DiagnosticEnumFilter, DiagnosticEnumInput, MedicineEnum,
    MedicineEnumFilter, MedicineEnumInput, RequestContext, Resource, SymptomsEnum,
    SymptomsEnumFilter, SymptomsEnumInput, ValidationError,
};

pub struct MedicineEnums;

#[async_trait]
impl TenantEntity for MedicineEnums {
    type Record = MedicineEnum;
    type View = MedicineEnum;
    type Input = MedicineEnumInput;
    type Filter = MedicineEnumFilter;

    const RESOURCE: Resource = Resource::MedicineEnum;
    const TABLE: &'static str = "medicine_enums";
    const COLUMNS: &'static str = "medicine_name, kept_in_stock";
    const LABEL_COLUMN: &'static str = "medicine_name";
    const SORTABLE: &'static [(&'static str, &'static str)] = &[
        ("medicineName", "medicine_name"),
        ("keptInStock", "kept_in_stock"),
    ];
    const UNIQUE: &'static [(&'static str, &'static str)] = &[("medicine_name", "medicineName")];

    fn validate(input: &MedicineEnumInput) -> Result<(), ValidationError> {
        input.validate()
    }

    fn values(input: &MedicineEnumInput) -> Vec<(&'static str, Param)> {
        vec![
            ("medicine_name", Param::text(&input.medicine_name)),
            ("kept_in_stock", Param::Bool(input.kept_in_stock)),
        ]
    }

    fn common(filter: &MedicineEnumFilter) -> &CommonFilter {
        &filter.common
    }

    fn filter(c: &mut Conditions, f: &MedicineEnumFilter) -> Result<(), ValidationError> {
        c.contains("medicine_name", f.medicine_name.as_deref());
        c.flag("kept_in_stock", "keptInStock", f.kept_in_stock.as_deref())
    }

    async fn fill(
        _conn: &mut SqliteConnection,
        _ctx: &RequestContext,
        record: MedicineEnum,
    ) -> Result<MedicineEnum, DbError> {
        Ok(record)
    }
}

pub struct SymptomsEnums;

#[async_trait]
impl TenantEntity for SymptomsEnums {
    type Record = SymptomsEnum;
    type View = SymptomsEnum;
    type Input = SymptomsEnumInput;
    type Filter = SymptomsEnumFilter;

    const RESOURCE: Resource = Resource::SymptomsEnum;
    const TABLE: &'static str = "symptoms_enums";
    const COLUMNS: &'static str = "symptom_name";
    const LABEL_COLUMN: &'static str = "symptom_name";
    const SORTABLE: &'static [(&'static str, &'static str)] = &[("symptomName", "symptom_name")];
    const UNIQUE: &'static [(&'static str, &'static str)] = &[("symptom_name", "symptomName")];

    fn validate(input: &SymptomsEnumInput) -> Result<(), ValidationError> {
        input.validate()
    }

    fn values(input: &SymptomsEnumInput) -> Vec<(&'static str, Param)> {
        vec![("symptom_name", Param::text(&input.symptom_name))]
    }

    fn common(filter: &SymptomsEnumFilter) -> &CommonFilter {
        &filter.common
    }

    fn filter(c: &mut Conditions, f: &SymptomsEnumFilter) -> Result<(), ValidationError> {
        c.contains("symptom_name", f.symptom_name.as_deref());
        Ok(())
    }

    async fn fill(
        _conn: &mut SqliteConnection,
        _ctx: &RequestContext,
        record: SymptomsEnum,
    ) -> Result<SymptomsEnum, DbError> {
        Ok(record)
    }
}

pub struct DiagnosticEnums;

#[async_trait]
impl TenantEntity for DiagnosticEnums {
    type Record = DiagnosticEnum;
    type View = DiagnosticEnum;
    type Input = DiagnosticEnumInput;
    type Filter = DiagnosticEnumFilter;

    const RESOURCE: Resource = Resource::DiagnosticEnum;
    const TABLE: &'static str = "diagnostic_enums";
    const COLUMNS: &'static str = "diagnostic_name";
    const LABEL_COLUMN: &'static str = "diagnostic_name";
    const SORTABLE: &'static [(&'static str, &'static str)] =
        &[("diagnosticName", "diagnostic_name")];
    const UNIQUE: &'static [(&'static str, &'static str)] =
        &[("diagnostic_name", "diagnosticName")];

    fn validate(input: &DiagnosticEnumInput) -> Result<(), ValidationError> {
        input.validate()
    }

    fn values(input: &DiagnosticEnumInput) -> Vec<(&'static str, Param)> {
        vec![("diagnostic_name", Param::text(&input.diagnostic_name))]
    }

    fn common(filter: &DiagnosticEnumFilter) -> &CommonFilter {
        &filter.common
    }

    fn filter(c: &mut Conditions, f: &DiagnosticEnumFilter) -> Result<(), ValidationError> {
        c.contains("diagnostic_name", f.diagnostic_name.as_deref());
        Ok(())
    }

    async fn fill(
        _conn: &mut SqliteConnection,
        _ctx: &RequestContext,
        record: DiagnosticEnum,
    ) -> Result<DiagnosticEnum, DbError> {
        Ok(record)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repos::scoped;
    use crate::db::{migrations, pool::memory_pool};
    use crate::models::{Ordering, Role, Window};
    use uuid::Uuid;

    fn medicine(name: &str, in_stock: bool) -> MedicineEnumInput {
        MedicineEnumInput {
            medicine_name: name.into(),
            kept_in_stock: in_stock,
        }
    }

    #[tokio::test]
    async fn list_filters_and_orders() {
        let pool = memory_pool().await.unwrap();
        migrations::run(&pool).await.unwrap();
        let mut conn = pool.acquire().await.unwrap();
        let ctx = RequestContext::new(Uuid::new_v4(), Uuid::new_v4(), vec![Role::Admin]);

        for (name, stock) in [("Paracetamol", true), ("Amoxicillin", false), ("Cetirizine", true)] {
            scoped::create::<MedicineEnums>(&mut conn, &ctx, &medicine(name, stock), None)
                .await
                .unwrap();
        }

        let filter = MedicineEnumFilter {
            kept_in_stock: Some("true".into()),
            ..Default::default()
        };
        let ordering = Ordering::parse(Some("medicineName_ASC"), MedicineEnums::SORTABLE).unwrap();
        let page = scoped::find_and_count_all::<MedicineEnums>(
            &mut conn,
            &ctx,
            &filter,
            Window::default(),
            ordering,
        )
        .await
        .unwrap();
        assert_eq!(page.count, 2);
        let names: Vec<_> = page.rows.iter().map(|m| m.medicine_name.as_str()).collect();
        assert_eq!(names, vec!["Cetirizine", "Paracetamol"]);

        let filter = MedicineEnumFilter {
            medicine_name: Some("CILL".into()),
            ..Default::default()
        };
        let page = scoped::find_and_count_all::<MedicineEnums>(
            &mut conn,
            &ctx,
            &filter,
            Window::new(Some(1), Some(0)),
            Ordering::DEFAULT,
        )
        .await
        .unwrap();
        assert_eq!(page.count, 1);
        assert_eq!(page.rows[0].medicine_name, "Amoxicillin");
    }

    #[tokio::test]
    async fn autocomplete_by_label_and_id() {
        let pool = memory_pool().await.unwrap();
        migrations::run(&pool).await.unwrap();
        let mut conn = pool.acquire().await.unwrap();
        let ctx = RequestContext::new(Uuid::new_v4(), Uuid::new_v4(), vec![Role::Admin]);

        let fever = scoped::create::<SymptomsEnums>(
            &mut conn,
            &ctx,
            &SymptomsEnumInput {
                symptom_name: "Fever".into(),
            },
            None,
        )
        .await
        .unwrap();
        scoped::create::<SymptomsEnums>(
            &mut conn,
            &ctx,
            &SymptomsEnumInput {
                symptom_name: "Cough".into(),
            },
            None,
        )
        .await
        .unwrap();

        let all = scoped::autocomplete::<SymptomsEnums>(&mut conn, &ctx, None, 10)
            .await
            .unwrap();
        let labels: Vec<_> = all.iter().map(|i| i.label.as_str()).collect();
        assert_eq!(labels, vec!["Cough", "Fever"]);

        let hits = scoped::autocomplete::<SymptomsEnums>(&mut conn, &ctx, Some("ev"), 10)
            .await
            .unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].id, fever.meta.id);

        let id = fever.meta.id.to_string();
        let hits = scoped::autocomplete::<SymptomsEnums>(&mut conn, &ctx, Some(&id), 10)
            .await
            .unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].label, "Fever");
    }
}
