//! Roles, permissions and the permission checker
//!
//! A permission is a `(Resource, Action)` pair. Roles grant actions across
//! every resource; there are no per-resource role tables.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::{RequestContext, ValidationError};

/// Tenant-scoped resources exposed over the API
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Resource {
    HealthCenter,
    Doctor,
    MedicineEnum,
    SymptomsEnum,
    DiagnosticEnum,
    MedicineInventory,
    MedicineSupplies,
    MedicalHistory,
    Patient,
    PatientVisit,
    PatientDocument,
}

impl Resource {
    /// Entity key used in audit entries and message keys.
    pub fn key(self) -> &'static str {
        match self {
            Self::HealthCenter => "healthCenter",
            Self::Doctor => "doctor",
            Self::MedicineEnum => "medicineEnum",
            Self::SymptomsEnum => "symptomsEnum",
            Self::DiagnosticEnum => "diagnosticEnum",
            Self::MedicineInventory => "medicineInventory",
            Self::MedicineSupplies => "medicineSupplies",
            Self::MedicalHistory => "medicalHistory",
            Self::Patient => "patient",
            Self::PatientVisit => "patientVisit",
            Self::PatientDocument => "patientDocument",
        }
    }
}

/// Operation kinds guarded by a permission
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Action {
    Read,
    Autocomplete,
    Create,
    Edit,
    Destroy,
    Import,
}

impl Action {
    fn as_str(self) -> &'static str {
        match self {
            Self::Read => "Read",
            Self::Autocomplete => "Autocomplete",
            Self::Create => "Create",
            Self::Edit => "Edit",
            Self::Destroy => "Destroy",
            Self::Import => "Import",
        }
    }
}

/// A single capability, e.g. `patientImport`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Permission {
    pub resource: Resource,
    pub action: Action,
}

impl Permission {
    pub const fn new(resource: Resource, action: Action) -> Self {
        Self { resource, action }
    }
}

impl fmt::Display for Permission {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.resource.key(), self.action.as_str())
    }
}

/// Membership role within a tenant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Editor,
    Viewer,
}

impl Role {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Admin => "admin",
            Self::Editor => "editor",
            Self::Viewer => "viewer",
        }
    }

    /// Whether this role allows `action` on any resource.
    pub fn grants(self, action: Action) -> bool {
        match self {
            Self::Admin => true,
            Self::Editor => !matches!(action, Action::Destroy),
            Self::Viewer => matches!(action, Action::Read | Action::Autocomplete),
        }
    }

    /// Encode a role set for the `tenant_users.roles` column.
    pub fn join(roles: &[Role]) -> String {
        roles
            .iter()
            .map(|r| r.as_str())
            .collect::<Vec<_>>()
            .join(",")
    }

    /// Decode a `tenant_users.roles` value, skipping unknown entries.
    pub fn split(raw: &str) -> Vec<Role> {
        raw.split(',')
            .filter_map(|r| r.trim().parse().ok())
            .collect()
    }
}

impl FromStr for Role {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "admin" => Ok(Self::Admin),
            "editor" => Ok(Self::Editor),
            "viewer" => Ok(Self::Viewer),
            other => Err(ValidationError::InvalidVariant {
                field: "role",
                value: other.to_owned(),
            }),
        }
    }
}

/// Raised when the caller lacks a permission
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("missing permission {0}")]
pub struct Forbidden(pub Permission);

/// Gate checking a permission against the caller's roles
pub struct PermissionChecker<'a> {
    ctx: &'a RequestContext,
}

impl<'a> PermissionChecker<'a> {
    pub fn new(ctx: &'a RequestContext) -> Self {
        Self { ctx }
    }

    pub fn has(&self, permission: Permission) -> bool {
        self.ctx.roles.iter().any(|r| r.grants(permission.action))
    }

    pub fn validate_has(&self, permission: Permission) -> Result<(), Forbidden> {
        if self.has(permission) {
            Ok(())
        } else {
            tracing::debug!(
                tenant_id = %self.ctx.tenant_id,
                user_id = %self.ctx.user_id,
                %permission,
                "permission denied"
            );
            Err(Forbidden(permission))
        }
    }
}
