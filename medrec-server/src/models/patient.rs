//! Patients and their medical history

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use super::file::{validate_files, FileInput, StoredFile};
use super::meta::{CommonFilter, RowMeta};
use super::visit::{PatientDocument, PatientVisit};
use super::{text, ValidationError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
pub enum Gender {
    Male,
    Female,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
pub enum Smoking {
    #[serde(rename = "None")]
    #[sqlx(rename = "None")]
    NonSmoker,
    Cigarette,
    Bidi,
    Ganja,
    Multiple,
    Other,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
pub enum Drink {
    Occasionally,
    Frequently,
    Daily,
}

impl Gender {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Male => "Male",
            Self::Female => "Female",
        }
    }
}

impl Smoking {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::NonSmoker => "None",
            Self::Cigarette => "Cigarette",
            Self::Bidi => "Bidi",
            Self::Ganja => "Ganja",
            Self::Multiple => "Multiple",
            Self::Other => "Other",
        }
    }
}

impl Drink {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Occasionally => "Occasionally",
            Self::Frequently => "Frequently",
            Self::Daily => "Daily",
        }
    }
}

/// Patient row
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Patient {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub meta: RowMeta,
    pub first_name: String,
    pub middle_name: Option<String>,
    pub last_name: String,
    pub full_name: Option<String>,
    pub gender: Gender,
    pub age: Option<i64>,
    pub locality_name: Option<String>,
    pub mobile_number: Option<String>,
    pub aadhar_number: Option<String>,
    pub date_of_birth: Option<NaiveDate>,
    pub medical_history_id: Option<Uuid>,
}

/// Patient as returned by reads, with its relations filled in
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PatientView {
    #[serde(flatten)]
    pub patient: Patient,
    pub medical_history: Option<MedicalHistory>,
    pub medical_visits: Vec<PatientVisit>,
    pub medical_docs: Vec<PatientDocument>,
    pub picture: Vec<StoredFile>,
}

/// Patient payload.
///
/// Association keys that are omitted clear the association: the payload
/// always describes the complete set.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PatientInput {
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub middle_name: Option<String>,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub gender: Option<Gender>,
    #[serde(default)]
    pub age: Option<i64>,
    #[serde(default)]
    pub locality_name: Option<String>,
    #[serde(default)]
    pub mobile_number: Option<String>,
    #[serde(default)]
    pub aadhar_number: Option<String>,
    #[serde(default)]
    pub date_of_birth: Option<NaiveDate>,
    #[serde(default)]
    pub medical_history: Option<Uuid>,
    #[serde(default)]
    pub medical_visits: Vec<Uuid>,
    #[serde(default)]
    pub medical_docs: Vec<Uuid>,
    #[serde(default)]
    pub picture: Vec<FileInput>,
}

impl PatientInput {
    /// Display name derived from the name parts; never taken from input.
    pub fn full_name(&self) -> Option<String> {
        text::build_full_name(&self.first_name, self.middle_name.as_deref(), &self.last_name)
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        text::bounded("firstName", &self.first_name, 2, 50)?;
        text::bounded("lastName", &self.last_name, 2, 100)?;
        if let Some(full_name) = self.full_name() {
            text::bounded("fullName", &full_name, 2, 255)?;
        }
        text::present("gender", &self.gender)?;
        validate_files("picture", &self.picture)
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PatientFilter {
    #[serde(flatten)]
    pub common: CommonFilter,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub full_name: Option<String>,
    pub gender: Option<String>,
    pub locality_name: Option<String>,
    pub mobile_number: Option<String>,
    pub aadhar_number: Option<String>,
    pub date_of_birth_range: Option<Vec<String>>,
    pub age_range: Option<Vec<String>>,
}

/// Lifestyle and family history of a patient
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct MedicalHistory {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub meta: RowMeta,
    pub patient_id: Option<Uuid>,
    pub smoking: Option<Smoking>,
    pub drug_use: bool,
    pub drink: Option<Drink>,
    pub family_history: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MedicalHistoryInput {
    #[serde(default)]
    pub patient: Option<Uuid>,
    #[serde(default)]
    pub smoking: Option<Smoking>,
    #[serde(default)]
    pub drug_use: bool,
    #[serde(default)]
    pub drink: Option<Drink>,
    #[serde(default)]
    pub family_history: Option<String>,
}

impl MedicalHistoryInput {
    pub fn validate(&self) -> Result<(), ValidationError> {
        Ok(())
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MedicalHistoryFilter {
    #[serde(flatten)]
    pub common: CommonFilter,
    pub patient: Option<String>,
    pub smoking: Option<String>,
    pub drug_use: Option<String>,
    pub drink: Option<String>,
    pub family_history: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn jo_doe() -> PatientInput {
        PatientInput {
            first_name: "Jo".into(),
            last_name: "Doe".into(),
            gender: Some(Gender::Female),
            ..Default::default()
        }
    }

    #[test]
    fn full_name_is_derived() {
        assert_eq!(jo_doe().full_name().as_deref(), Some("Jo Doe"));

        let mut input = jo_doe();
        input.middle_name = Some("Anne".into());
        assert_eq!(input.full_name().as_deref(), Some("Jo Anne Doe"));
    }

    #[test]
    fn supplied_full_name_is_ignored() {
        let input: PatientInput = serde_json::from_str(
            r#"{"firstName": "Jo", "lastName": "Doe", "fullName": "Someone Else", "gender": "Male"}"#,
        )
        .unwrap();
        assert_eq!(input.full_name().as_deref(), Some("Jo Doe"));
    }

    #[test]
    fn gender_is_required() {
        let mut input = jo_doe();
        input.gender = None;
        assert_eq!(
            input.validate().unwrap_err(),
            ValidationError::Missing { field: "gender" }
        );
    }

    #[test]
    fn first_name_minimum() {
        let mut input = jo_doe();
        input.first_name = "J".into();
        assert!(matches!(
            input.validate().unwrap_err(),
            ValidationError::TooShort { field: "firstName", min: 2 }
        ));
    }

    #[test]
    fn omitted_associations_are_empty() {
        let input: PatientInput =
            serde_json::from_str(r#"{"firstName": "Jo", "lastName": "Doe", "gender": "Male"}"#)
                .unwrap();
        assert!(input.medical_visits.is_empty());
        assert!(input.medical_docs.is_empty());
        assert!(input.picture.is_empty());
        assert!(input.medical_history.is_none());
    }

    #[test]
    fn smoking_none_variant_uses_original_label() {
        let s: Smoking = serde_json::from_str(r#""None""#).unwrap();
        assert_eq!(s, Smoking::NonSmoker);
        assert_eq!(serde_json::to_string(&Smoking::NonSmoker).unwrap(), r#""None""#);
    }
}
