//! Patient visits and patient documents

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use super::file::{validate_files, FileInput, StoredFile};
use super::meta::{CommonFilter, RowMeta};
use super::{text, ValidationError};

/// Follow-up interval prescribed at the end of a visit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
pub enum ReturnIn {
    #[serde(rename = "1week")]
    #[sqlx(rename = "1week")]
    OneWeek,
    #[serde(rename = "2weeks")]
    #[sqlx(rename = "2weeks")]
    TwoWeeks,
    #[serde(rename = "3weeks")]
    #[sqlx(rename = "3weeks")]
    ThreeWeeks,
    #[serde(rename = "4weeks")]
    #[sqlx(rename = "4weeks")]
    FourWeeks,
    #[serde(rename = "6weeks")]
    #[sqlx(rename = "6weeks")]
    SixWeeks,
    #[serde(rename = "2months")]
    #[sqlx(rename = "2months")]
    TwoMonths,
    #[serde(rename = "3months")]
    #[sqlx(rename = "3months")]
    ThreeMonths,
    #[serde(rename = "4months")]
    #[sqlx(rename = "4months")]
    FourMonths,
    #[serde(rename = "6months")]
    #[sqlx(rename = "6months")]
    SixMonths,
    #[serde(rename = "1year")]
    #[sqlx(rename = "1year")]
    OneYear,
}

impl ReturnIn {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::OneWeek => "1week",
            Self::TwoWeeks => "2weeks",
            Self::ThreeWeeks => "3weeks",
            Self::FourWeeks => "4weeks",
            Self::SixWeeks => "6weeks",
            Self::TwoMonths => "2months",
            Self::ThreeMonths => "3months",
            Self::FourMonths => "4months",
            Self::SixMonths => "6months",
            Self::OneYear => "1year",
        }
    }
}

/// A single consultation
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct PatientVisit {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub meta: RowMeta,
    pub patient_id: Option<Uuid>,
    pub medical_center_id: Option<Uuid>,
    pub doctor_id: Option<Uuid>,
    pub symptom1_id: Option<Uuid>,
    pub symptom2_id: Option<Uuid>,
    pub symptom3_id: Option<Uuid>,
    pub medicine1_id: Option<Uuid>,
    pub medicine2_id: Option<Uuid>,
    pub medicine3_id: Option<Uuid>,
    pub medicine4_id: Option<Uuid>,
    pub visit_date: NaiveDate,
    pub other_symptoms: Option<String>,
    pub vital_statistics: Option<String>,
    pub diagnosis: String,
    pub requested_labs: Option<String>,
    pub med1_qty: Option<i64>,
    pub med2_qty: Option<i64>,
    pub med3_qty: Option<i64>,
    pub med4_qty: Option<i64>,
    pub medicine_instructions: Option<String>,
    pub referral_lab: Option<String>,
    pub referral_hospital: Option<String>,
    pub referred_doctor: Option<String>,
    pub return_in: Option<ReturnIn>,
    pub patient_copay: Option<i64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PatientVisitView {
    #[serde(flatten)]
    pub visit: PatientVisit,
    pub prescription: Vec<StoredFile>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PatientVisitInput {
    #[serde(default)]
    pub patient: Option<Uuid>,
    #[serde(default)]
    pub medical_center: Option<Uuid>,
    #[serde(default)]
    pub doctor: Option<Uuid>,
    #[serde(default)]
    pub symptom1: Option<Uuid>,
    #[serde(default)]
    pub symptom2: Option<Uuid>,
    #[serde(default)]
    pub symptom3: Option<Uuid>,
    #[serde(default)]
    pub medicine1: Option<Uuid>,
    #[serde(default)]
    pub medicine2: Option<Uuid>,
    #[serde(default)]
    pub medicine3: Option<Uuid>,
    #[serde(default)]
    pub medicine4: Option<Uuid>,
    #[serde(default)]
    pub visit_date: Option<NaiveDate>,
    #[serde(default)]
    pub other_symptoms: Option<String>,
    #[serde(default)]
    pub vital_statistics: Option<String>,
    #[serde(default)]
    pub diagnosis: String,
    #[serde(default)]
    pub requested_labs: Option<String>,
    #[serde(default)]
    pub med1_qty: Option<i64>,
    #[serde(default)]
    pub med2_qty: Option<i64>,
    #[serde(default)]
    pub med3_qty: Option<i64>,
    #[serde(default)]
    pub med4_qty: Option<i64>,
    #[serde(default)]
    pub medicine_instructions: Option<String>,
    #[serde(default)]
    pub referral_lab: Option<String>,
    #[serde(default)]
    pub referral_hospital: Option<String>,
    #[serde(default)]
    pub referred_doctor: Option<String>,
    #[serde(default)]
    pub return_in: Option<ReturnIn>,
    #[serde(default)]
    pub patient_copay: Option<i64>,
    #[serde(default)]
    pub prescription: Vec<FileInput>,
}

impl PatientVisitInput {
    pub fn validate(&self) -> Result<(), ValidationError> {
        text::present("visitDate", &self.visit_date)?;
        text::required("diagnosis", &self.diagnosis)?;
        validate_files("prescription", &self.prescription)
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PatientVisitFilter {
    #[serde(flatten)]
    pub common: CommonFilter,
    pub patient: Option<String>,
    pub medical_center: Option<String>,
    pub doctor: Option<String>,
    pub visit_date_range: Option<Vec<String>>,
    pub diagnosis: Option<String>,
    pub other_symptoms: Option<String>,
    pub referral_hospital: Option<String>,
    pub return_in: Option<String>,
}

/// Report or scan attached to a patient
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct PatientDocument {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub meta: RowMeta,
    pub patient_id: Option<Uuid>,
    pub report_name: String,
    pub report_date: Option<NaiveDate>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PatientDocumentView {
    #[serde(flatten)]
    pub document: PatientDocument,
    pub image: Vec<StoredFile>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PatientDocumentInput {
    #[serde(default)]
    pub patient: Option<Uuid>,
    #[serde(default)]
    pub report_name: String,
    #[serde(default)]
    pub report_date: Option<NaiveDate>,
    #[serde(default)]
    pub image: Vec<FileInput>,
}

impl PatientDocumentInput {
    pub fn validate(&self) -> Result<(), ValidationError> {
        text::required("reportName", &self.report_name)?;
        text::at_most("reportName", Some(&self.report_name), 200)?;
        validate_files("image", &self.image)
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PatientDocumentFilter {
    #[serde(flatten)]
    pub common: CommonFilter,
    pub patient: Option<String>,
    pub report_name: Option<String>,
    pub report_date_range: Option<Vec<String>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn return_in_uses_original_labels() {
        let r: ReturnIn = serde_json::from_str(r#""2weeks""#).unwrap();
        assert_eq!(r, ReturnIn::TwoWeeks);
        assert_eq!(serde_json::to_string(&ReturnIn::OneYear).unwrap(), r#""1year""#);
    }

    #[test]
    fn visit_requires_date_and_diagnosis() {
        let input: PatientVisitInput =
            serde_json::from_str(r#"{"diagnosis": "Fever"}"#).unwrap();
        assert_eq!(
            input.validate().unwrap_err(),
            ValidationError::Missing { field: "visitDate" }
        );

        let input: PatientVisitInput =
            serde_json::from_str(r#"{"visitDate": "2024-02-10", "diagnosis": " "}"#).unwrap();
        assert_eq!(
            input.validate().unwrap_err(),
            ValidationError::Empty { field: "diagnosis" }
        );
    }

    #[test]
    fn report_name_cap() {
        let input = PatientDocumentInput {
            report_name: "x".repeat(201),
            ..Default::default()
        };
        assert!(matches!(
            input.validate().unwrap_err(),
            ValidationError::TooLong { max: 200, .. }
        ));
    }
}
