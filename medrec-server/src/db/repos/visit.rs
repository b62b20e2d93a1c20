//! Patient visits and documents

use async_trait::async_trait;
use sqlx::SqliteConnection;
use uuid::Uuid;

use super::catalog::{MedicineEnums, SymptomsEnums};
use super::facility::{Doctors, HealthCenters};
use super::files::{self, FileRelation};
use super::patient::Patients;
use super::{ensure_reference, Conditions, DbError, Param, TenantEntity};
use crate::models::{
    CommonFilter, PatientDocument, PatientDocumentFilter, PatientDocumentInput,
    PatientDocumentView, PatientVisit, PatientVisitFilter, PatientVisitInput, PatientVisitView,
    RequestContext, Resource, ValidationError,
};

pub const PRESCRIPTION: FileRelation = FileRelation::new("patient_visits", "prescription");
pub const IMAGE: FileRelation = FileRelation::new("patient_documents", "image");

pub struct PatientVisits;

#[async_trait]
impl TenantEntity for PatientVisits {
    type Record = PatientVisit;
    type View = PatientVisitView;
    type Input = PatientVisitInput;
    type Filter = PatientVisitFilter;

    const RESOURCE: Resource = Resource::PatientVisit;
    const TABLE: &'static str = "patient_visits";
    const COLUMNS: &'static str = "patient_id, medical_center_id, doctor_id, \
         symptom1_id, symptom2_id, symptom3_id, \
         medicine1_id, medicine2_id, medicine3_id, medicine4_id, \
         visit_date, other_symptoms, vital_statistics, diagnosis, requested_labs, \
         med1_qty, med2_qty, med3_qty, med4_qty, medicine_instructions, \
         referral_lab, referral_hospital, referred_doctor, return_in, patient_copay";
    const LABEL_COLUMN: &'static str = "visit_date";
    const SORTABLE: &'static [(&'static str, &'static str)] = &[
        ("visitDate", "visit_date"),
        ("diagnosis", "diagnosis"),
        ("returnIn", "return_in"),
        ("patientCopay", "patient_copay"),
    ];

    fn validate(input: &PatientVisitInput) -> Result<(), ValidationError> {
        input.validate()
    }

    fn values(input: &PatientVisitInput) -> Vec<(&'static str, Param)> {
        vec![
            ("patient_id", Param::Uuid(input.patient)),
            ("medical_center_id", Param::Uuid(input.medical_center)),
            ("doctor_id", Param::Uuid(input.doctor)),
            ("symptom1_id", Param::Uuid(input.symptom1)),
            ("symptom2_id", Param::Uuid(input.symptom2)),
            ("symptom3_id", Param::Uuid(input.symptom3)),
            ("medicine1_id", Param::Uuid(input.medicine1)),
            ("medicine2_id", Param::Uuid(input.medicine2)),
            ("medicine3_id", Param::Uuid(input.medicine3)),
            ("medicine4_id", Param::Uuid(input.medicine4)),
            ("visit_date", Param::Date(input.visit_date)),
            ("other_symptoms", Param::opt_text(input.other_symptoms.as_deref())),
            ("vital_statistics", Param::opt_text(input.vital_statistics.as_deref())),
            ("diagnosis", Param::text(&input.diagnosis)),
            ("requested_labs", Param::opt_text(input.requested_labs.as_deref())),
            ("med1_qty", Param::Int(input.med1_qty)),
            ("med2_qty", Param::Int(input.med2_qty)),
            ("med3_qty", Param::Int(input.med3_qty)),
            ("med4_qty", Param::Int(input.med4_qty)),
            (
                "medicine_instructions",
                Param::opt_text(input.medicine_instructions.as_deref()),
            ),
            ("referral_lab", Param::opt_text(input.referral_lab.as_deref())),
            ("referral_hospital", Param::opt_text(input.referral_hospital.as_deref())),
            ("referred_doctor", Param::opt_text(input.referred_doctor.as_deref())),
            (
                "return_in",
                Param::Text(input.return_in.map(|r| r.as_str().to_owned())),
            ),
            ("patient_copay", Param::Int(input.patient_copay)),
        ]
    }

    fn common(filter: &PatientVisitFilter) -> &CommonFilter {
        &filter.common
    }

    fn filter(c: &mut Conditions, f: &PatientVisitFilter) -> Result<(), ValidationError> {
        c.reference("patient_id", f.patient.as_deref());
        c.reference("medical_center_id", f.medical_center.as_deref());
        c.reference("doctor_id", f.doctor.as_deref());
        c.date_between("visit_date", "visitDateRange", f.visit_date_range.as_deref())?;
        c.contains("diagnosis", f.diagnosis.as_deref());
        c.contains("other_symptoms", f.other_symptoms.as_deref());
        c.contains("referral_hospital", f.referral_hospital.as_deref());
        c.text_equals("return_in", f.return_in.as_deref());
        Ok(())
    }

    async fn check_references(
        conn: &mut SqliteConnection,
        ctx: &RequestContext,
        input: &PatientVisitInput,
    ) -> Result<(), DbError> {
        ensure_reference(conn, ctx, Patients::TABLE, "patient", input.patient).await?;
        ensure_reference(
            conn,
            ctx,
            HealthCenters::TABLE,
            "medicalCenter",
            input.medical_center,
        )
        .await?;
        ensure_reference(conn, ctx, Doctors::TABLE, "doctor", input.doctor).await?;

        let symptoms = [
            ("symptom1", input.symptom1),
            ("symptom2", input.symptom2),
            ("symptom3", input.symptom3),
        ];
        for (field, id) in symptoms {
            ensure_reference(conn, ctx, SymptomsEnums::TABLE, field, id).await?;
        }

        let medicines = [
            ("medicine1", input.medicine1),
            ("medicine2", input.medicine2),
            ("medicine3", input.medicine3),
            ("medicine4", input.medicine4),
        ];
        for (field, id) in medicines {
            ensure_reference(conn, ctx, MedicineEnums::TABLE, field, id).await?;
        }
        Ok(())
    }

    async fn replace_associations(
        conn: &mut SqliteConnection,
        ctx: &RequestContext,
        id: Uuid,
        input: &PatientVisitInput,
    ) -> Result<(), DbError> {
        files::replace_relation_files(conn, ctx, PRESCRIPTION, id, &input.prescription).await
    }

    async fn fill(
        conn: &mut SqliteConnection,
        ctx: &RequestContext,
        visit: PatientVisit,
    ) -> Result<PatientVisitView, DbError> {
        let prescription = files::list_files(conn, ctx, PRESCRIPTION, visit.meta.id).await?;
        Ok(PatientVisitView {
            visit,
            prescription,
        })
    }
}

pub struct PatientDocuments;

#[async_trait]
impl TenantEntity for PatientDocuments {
    type Record = PatientDocument;
    type View = PatientDocumentView;
    type Input = PatientDocumentInput;
    type Filter = PatientDocumentFilter;

    const RESOURCE: Resource = Resource::PatientDocument;
    const TABLE: &'static str = "patient_documents";
    const COLUMNS: &'static str = "patient_id, report_name, report_date";
    const LABEL_COLUMN: &'static str = "report_name";
    const SORTABLE: &'static [(&'static str, &'static str)] =
        &[("reportName", "report_name"), ("reportDate", "report_date")];

    fn validate(input: &PatientDocumentInput) -> Result<(), ValidationError> {
        input.validate()
    }

    fn values(input: &PatientDocumentInput) -> Vec<(&'static str, Param)> {
        vec![
            ("patient_id", Param::Uuid(input.patient)),
            ("report_name", Param::text(&input.report_name)),
            ("report_date", Param::Date(input.report_date)),
        ]
    }

    fn common(filter: &PatientDocumentFilter) -> &CommonFilter {
        &filter.common
    }

    fn filter(c: &mut Conditions, f: &PatientDocumentFilter) -> Result<(), ValidationError> {
        c.reference("patient_id", f.patient.as_deref());
        c.contains("report_name", f.report_name.as_deref());
        c.date_between(
            "report_date",
            "reportDateRange",
            f.report_date_range.as_deref(),
        )
    }

    async fn check_references(
        conn: &mut SqliteConnection,
        ctx: &RequestContext,
        input: &PatientDocumentInput,
    ) -> Result<(), DbError> {
        ensure_reference(conn, ctx, Patients::TABLE, "patient", input.patient).await
    }

    async fn replace_associations(
        conn: &mut SqliteConnection,
        ctx: &RequestContext,
        id: Uuid,
        input: &PatientDocumentInput,
    ) -> Result<(), DbError> {
        files::replace_relation_files(conn, ctx, IMAGE, id, &input.image).await
    }

    async fn fill(
        conn: &mut SqliteConnection,
        ctx: &RequestContext,
        document: PatientDocument,
    ) -> Result<PatientDocumentView, DbError> {
        let image = files::list_files(conn, ctx, IMAGE, document.meta.id).await?;
        Ok(PatientDocumentView { document, image })
    }
}
