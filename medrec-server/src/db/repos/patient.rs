//! Patients and medical histories

use async_trait::async_trait;
use serde_json::{json, Map, Value};
use sqlx::SqliteConnection;
use uuid::Uuid;

use super::files::{self, FileRelation};
use super::scoped::{children, find_record, replace_children};
use super::visit::{PatientDocuments, PatientVisits};
use super::{ensure_reference, Conditions, DbError, Param, TenantEntity};
use crate::models::{
    CommonFilter, MedicalHistory, MedicalHistoryFilter, MedicalHistoryInput, Patient,
    PatientFilter, PatientInput, PatientView, RequestContext, Resource, ValidationError,
};

pub const PICTURE: FileRelation = FileRelation::new("patients", "picture");

pub struct Patients;

#[async_trait]
impl TenantEntity for Patients {
    type Record = Patient;
    type View = PatientView;
    type Input = PatientInput;
    type Filter = PatientFilter;

    const RESOURCE: Resource = Resource::Patient;
    const TABLE: &'static str = "patients";
    const COLUMNS: &'static str = "first_name, middle_name, last_name, full_name, gender, age, \
         locality_name, mobile_number, aadhar_number, date_of_birth, medical_history_id";
    const LABEL_COLUMN: &'static str = "full_name";
    const SORTABLE: &'static [(&'static str, &'static str)] = &[
        ("firstName", "first_name"),
        ("lastName", "last_name"),
        ("fullName", "full_name"),
        ("gender", "gender"),
        ("age", "age"),
        ("localityName", "locality_name"),
        ("dateOfBirth", "date_of_birth"),
    ];

    fn validate(input: &PatientInput) -> Result<(), ValidationError> {
        input.validate()
    }

    fn values(input: &PatientInput) -> Vec<(&'static str, Param)> {
        vec![
            ("first_name", Param::text(&input.first_name)),
            ("middle_name", Param::opt_text(input.middle_name.as_deref())),
            ("last_name", Param::text(&input.last_name)),
            ("full_name", Param::Text(input.full_name())),
            (
                "gender",
                Param::Text(input.gender.map(|g| g.as_str().to_owned())),
            ),
            ("age", Param::Int(input.age)),
            ("locality_name", Param::opt_text(input.locality_name.as_deref())),
            ("mobile_number", Param::opt_text(input.mobile_number.as_deref())),
            ("aadhar_number", Param::opt_text(input.aadhar_number.as_deref())),
            ("date_of_birth", Param::Date(input.date_of_birth)),
            ("medical_history_id", Param::Uuid(input.medical_history)),
        ]
    }

    fn common(filter: &PatientFilter) -> &CommonFilter {
        &filter.common
    }

    fn filter(c: &mut Conditions, f: &PatientFilter) -> Result<(), ValidationError> {
        c.contains("first_name", f.first_name.as_deref());
        c.contains("last_name", f.last_name.as_deref());
        c.contains("full_name", f.full_name.as_deref());
        c.text_equals("gender", f.gender.as_deref());
        c.contains("locality_name", f.locality_name.as_deref());
        c.contains("mobile_number", f.mobile_number.as_deref());
        c.contains("aadhar_number", f.aadhar_number.as_deref());
        c.date_between(
            "date_of_birth",
            "dateOfBirthRange",
            f.date_of_birth_range.as_deref(),
        )?;
        c.int_between("age", "ageRange", f.age_range.as_deref())
    }

    fn audit_extra(input: &PatientInput) -> Map<String, Value> {
        let mut extra = Map::new();
        extra.insert("medicalVisits".into(), json!(input.medical_visits));
        extra.insert("medicalDocs".into(), json!(input.medical_docs));
        extra
    }

    async fn check_references(
        conn: &mut SqliteConnection,
        ctx: &RequestContext,
        input: &PatientInput,
    ) -> Result<(), DbError> {
        ensure_reference(
            conn,
            ctx,
            MedicalHistories::TABLE,
            "medicalHistory",
            input.medical_history,
        )
        .await
    }

    async fn replace_associations(
        conn: &mut SqliteConnection,
        ctx: &RequestContext,
        id: Uuid,
        input: &PatientInput,
    ) -> Result<(), DbError> {
        replace_children(
            conn,
            ctx,
            PatientVisits::TABLE,
            "patient_id",
            "medicalVisits",
            id,
            &input.medical_visits,
        )
        .await?;
        replace_children(
            conn,
            ctx,
            PatientDocuments::TABLE,
            "patient_id",
            "medicalDocs",
            id,
            &input.medical_docs,
        )
        .await?;
        files::replace_relation_files(conn, ctx, PICTURE, id, &input.picture).await
    }

    async fn fill(
        conn: &mut SqliteConnection,
        ctx: &RequestContext,
        patient: Patient,
    ) -> Result<PatientView, DbError> {
        let id = patient.meta.id;

        let medical_history = match patient.medical_history_id {
            Some(history_id) => match find_record::<MedicalHistories>(conn, ctx, history_id).await {
                Ok(history) => Some(history),
                Err(DbError::NotFound { .. }) => None,
                Err(e) => return Err(e),
            },
            None => None,
        };
        let medical_visits = children::<PatientVisits>(conn, ctx, "patient_id", id).await?;
        let medical_docs = children::<PatientDocuments>(conn, ctx, "patient_id", id).await?;
        let picture = files::list_files(conn, ctx, PICTURE, id).await?;

        Ok(PatientView {
            patient,
            medical_history,
            medical_visits,
            medical_docs,
            picture,
        })
    }
}

pub struct MedicalHistories;

#[async_trait]
impl TenantEntity for MedicalHistories {
    type Record = MedicalHistory;
    type View = MedicalHistory;
    type Input = MedicalHistoryInput;
    type Filter = MedicalHistoryFilter;

    const RESOURCE: Resource = Resource::MedicalHistory;
    const TABLE: &'static str = "medical_histories";
    const COLUMNS: &'static str = "patient_id, smoking, drug_use, drink, family_history";
    const LABEL_COLUMN: &'static str = "family_history";
    const SORTABLE: &'static [(&'static str, &'static str)] = &[
        ("smoking", "smoking"),
        ("drugUse", "drug_use"),
        ("drink", "drink"),
        ("familyHistory", "family_history"),
    ];

    fn validate(input: &MedicalHistoryInput) -> Result<(), ValidationError> {
        input.validate()
    }

    fn values(input: &MedicalHistoryInput) -> Vec<(&'static str, Param)> {
        vec![
            ("patient_id", Param::Uuid(input.patient)),
            (
                "smoking",
                Param::Text(input.smoking.map(|s| s.as_str().to_owned())),
            ),
            ("drug_use", Param::Bool(input.drug_use)),
            ("drink", Param::Text(input.drink.map(|d| d.as_str().to_owned()))),
            ("family_history", Param::opt_text(input.family_history.as_deref())),
        ]
    }

    fn common(filter: &MedicalHistoryFilter) -> &CommonFilter {
        &filter.common
    }

    fn filter(c: &mut Conditions, f: &MedicalHistoryFilter) -> Result<(), ValidationError> {
        c.reference("patient_id", f.patient.as_deref());
        c.text_equals("smoking", f.smoking.as_deref());
        c.flag("drug_use", "drugUse", f.drug_use.as_deref())?;
        c.text_equals("drink", f.drink.as_deref());
        c.contains("family_history", f.family_history.as_deref());
        Ok(())
    }

    async fn check_references(
        conn: &mut SqliteConnection,
        ctx: &RequestContext,
        input: &MedicalHistoryInput,
    ) -> Result<(), DbError> {
        ensure_reference(conn, ctx, Patients::TABLE, "patient", input.patient).await
    }

    async fn fill(
        _conn: &mut SqliteConnection,
        _ctx: &RequestContext,
        record: MedicalHistory,
    ) -> Result<MedicalHistory, DbError> {
        Ok(record)
    }
}
