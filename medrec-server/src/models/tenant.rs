//! Tenants, users and memberships

use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use super::{text, ValidationError};

/// Maximum length for tenant names
const MAX_TENANT_NAME_LEN: usize = 255;

/// Loose address check: something@something.tld, no whitespace
static EMAIL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").expect("invalid email regex"));

/// Isolation boundary for all data and permissions
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Tenant {
    pub id: Uuid,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

/// Account that may belong to several tenants
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: Uuid,
    pub email: String,
    pub created_at: DateTime<Utc>,
}

/// Validated tenant name
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TenantName(String);

impl TenantName {
    pub fn new(s: &str) -> Result<Self, ValidationError> {
        text::bounded("tenant name", s, 1, MAX_TENANT_NAME_LEN)?;
        Ok(Self(s.trim().to_owned()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Validated, lowercased email address
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Email(String);

impl Email {
    pub fn new(s: &str) -> Result<Self, ValidationError> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(ValidationError::Empty { field: "email" });
        }
        if !EMAIL_RE.is_match(trimmed) {
            return Err(ValidationError::InvalidFormat {
                field: "email",
                reason: "must look like name@example.org",
            });
        }
        Ok(Self(trimmed.to_lowercase()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn email_is_normalized() {
        let email = Email::new("  Asha@Clinic.ORG ").unwrap();
        assert_eq!(email.as_str(), "asha@clinic.org");
    }

    #[test]
    fn rejects_bad_email() {
        assert!(matches!(
            Email::new("asha").unwrap_err(),
            ValidationError::InvalidFormat { .. }
        ));
        assert!(matches!(
            Email::new("").unwrap_err(),
            ValidationError::Empty { .. }
        ));
    }

    #[test]
    fn tenant_name_trimmed() {
        assert_eq!(TenantName::new(" Rampur PHC ").unwrap().as_str(), "Rampur PHC");
        assert!(TenantName::new("   ").is_err());
    }
}
