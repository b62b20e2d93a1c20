//! Lookup catalogs: medicines, symptoms and diagnoses
//!
//! Each catalog name is unique per tenant among live rows.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use super::meta::{CommonFilter, RowMeta};
use super::{text, ValidationError};

/// Medicine catalog entry
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct MedicineEnum {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub meta: RowMeta,
    pub medicine_name: String,
    pub kept_in_stock: bool,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MedicineEnumInput {
    #[serde(default)]
    pub medicine_name: String,
    #[serde(default)]
    pub kept_in_stock: bool,
}

impl MedicineEnumInput {
    pub fn validate(&self) -> Result<(), ValidationError> {
        text::bounded("medicineName", &self.medicine_name, 5, 100)
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MedicineEnumFilter {
    #[serde(flatten)]
    pub common: CommonFilter,
    pub medicine_name: Option<String>,
    pub kept_in_stock: Option<String>,
}

/// Symptom catalog entry
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct SymptomsEnum {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub meta: RowMeta,
    pub symptom_name: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SymptomsEnumInput {
    #[serde(default)]
    pub symptom_name: String,
}

impl SymptomsEnumInput {
    pub fn validate(&self) -> Result<(), ValidationError> {
        text::bounded("symptomName", &self.symptom_name, 3, 100)
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SymptomsEnumFilter {
    #[serde(flatten)]
    pub common: CommonFilter,
    pub symptom_name: Option<String>,
}

/// Diagnosis catalog entry
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct DiagnosticEnum {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub meta: RowMeta,
    pub diagnostic_name: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiagnosticEnumInput {
    #[serde(default)]
    pub diagnostic_name: String,
}

impl DiagnosticEnumInput {
    pub fn validate(&self) -> Result<(), ValidationError> {
        text::bounded("diagnosticName", &self.diagnostic_name, 3, 100)
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiagnosticEnumFilter {
    #[serde(flatten)]
    pub common: CommonFilter,
    pub diagnostic_name: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn medicine_name_bounds() {
        let input = MedicineEnumInput {
            medicine_name: "Para".into(),
            kept_in_stock: true,
        };
        assert!(matches!(
            input.validate().unwrap_err(),
            ValidationError::TooShort { field: "medicineName", min: 5 }
        ));

        let input = MedicineEnumInput {
            medicine_name: "Paracetamol".into(),
            kept_in_stock: false,
        };
        assert!(input.validate().is_ok());
    }

    #[test]
    fn missing_name_defaults_to_empty() {
        let input: SymptomsEnumInput = serde_json::from_str("{}").unwrap();
        assert!(matches!(
            input.validate().unwrap_err(),
            ValidationError::Empty { field: "symptomName" }
        ));
    }

    #[test]
    fn diagnostic_name_minimum() {
        let input = DiagnosticEnumInput {
            diagnostic_name: "TB".into(),
        };
        assert!(input.validate().is_err());
        let input = DiagnosticEnumInput {
            diagnostic_name: "Malaria".into(),
        };
        assert!(input.validate().is_ok());
    }
}
