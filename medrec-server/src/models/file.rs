//! Attached file metadata (patient picture, prescriptions, report images)

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use super::{text, ValidationError};

/// Maximum length for file names
const MAX_FILE_NAME_LEN: usize = 255;

/// File reference as sent by the client.
///
/// Files that already exist carry their `id`; new uploads do not.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileInput {
    #[serde(default)]
    pub id: Option<Uuid>,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub size_in_bytes: Option<i64>,
    #[serde(default)]
    pub private_url: Option<String>,
    #[serde(default)]
    pub public_url: Option<String>,
}

impl FileInput {
    pub fn validate(&self, field: &'static str) -> Result<(), ValidationError> {
        if self.id.is_some() {
            return Ok(());
        }
        text::required(field, &self.name)?;
        text::at_most(field, Some(&self.name), MAX_FILE_NAME_LEN)?;
        if self.private_url.is_none() && self.public_url.is_none() {
            return Err(ValidationError::Missing { field });
        }
        Ok(())
    }
}

/// File row attached to an entity column
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct StoredFile {
    pub id: Uuid,
    pub name: String,
    pub size_in_bytes: Option<i64>,
    pub private_url: Option<String>,
    pub public_url: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Validate every file of a relation.
pub fn validate_files(field: &'static str, files: &[FileInput]) -> Result<(), ValidationError> {
    files.iter().try_for_each(|f| f.validate(field))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn existing_file_needs_only_id() {
        let f = FileInput {
            id: Some(Uuid::new_v4()),
            ..Default::default()
        };
        assert!(f.validate("picture").is_ok());
    }

    #[test]
    fn new_file_needs_name_and_url() {
        let f = FileInput {
            name: "scan.png".into(),
            ..Default::default()
        };
        assert_eq!(
            f.validate("picture").unwrap_err(),
            ValidationError::Missing { field: "picture" }
        );

        let f = FileInput {
            name: "scan.png".into(),
            private_url: Some("tenant/x/scan.png".into()),
            ..Default::default()
        };
        assert!(f.validate("picture").is_ok());
    }
}
