//! Health centers and doctors

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use super::meta::{CommonFilter, RowMeta};
use super::{text, ValidationError};

/// Health center run by a tenant
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct HealthCenter {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub meta: RowMeta,
    pub name: String,
    pub address: String,
    pub phone_number: Option<String>,
    /// Administering user
    pub admin_name_id: Option<Uuid>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthCenterInput {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub phone_number: Option<String>,
    #[serde(default)]
    pub admin_name: Option<Uuid>,
}

impl HealthCenterInput {
    pub fn validate(&self) -> Result<(), ValidationError> {
        text::required("name", &self.name)?;
        text::required("address", &self.address)
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthCenterFilter {
    #[serde(flatten)]
    pub common: CommonFilter,
    pub name: Option<String>,
    pub address: Option<String>,
    pub phone_number: Option<String>,
    pub admin_name: Option<String>,
}

/// Doctor practising for a tenant
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Doctor {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub meta: RowMeta,
    pub name: String,
    pub specialization: String,
    pub phone: Option<String>,
    /// Linked login, if the doctor uses the system
    pub user_id: Option<Uuid>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DoctorInput {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub specialization: String,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub user: Option<Uuid>,
}

impl DoctorInput {
    pub fn validate(&self) -> Result<(), ValidationError> {
        text::bounded("name", &self.name, 5, 100)?;
        text::required("specialization", &self.specialization)
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DoctorFilter {
    #[serde(flatten)]
    pub common: CommonFilter,
    pub name: Option<String>,
    pub specialization: Option<String>,
    pub phone: Option<String>,
    pub user: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn health_center_requires_name_and_address() {
        let input = HealthCenterInput {
            name: "PHC Rampur".into(),
            ..Default::default()
        };
        assert_eq!(
            input.validate().unwrap_err(),
            ValidationError::Empty { field: "address" }
        );
    }

    #[test]
    fn doctor_name_bounds() {
        let input = DoctorInput {
            name: "Dr A".into(),
            specialization: "General".into(),
            ..Default::default()
        };
        assert!(matches!(
            input.validate().unwrap_err(),
            ValidationError::TooShort { field: "name", .. }
        ));

        let input = DoctorInput {
            name: "Dr Anand".into(),
            specialization: "General".into(),
            ..Default::default()
        };
        assert!(input.validate().is_ok());
    }
}
