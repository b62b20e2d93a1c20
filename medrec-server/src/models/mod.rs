//! Domain models with validation at construction
//!
//! All user input is validated before it reaches a repository.
//! Invalid input returns ValidationError, not panic.

pub mod catalog;
pub mod context;
pub mod facility;
pub mod file;
pub mod listing;
pub mod meta;
pub mod patient;
pub mod permission;
pub mod stock;
pub mod tenant;
pub mod text;
pub mod validation;
pub mod visit;

pub use catalog::{
    DiagnosticEnum, DiagnosticEnumFilter, DiagnosticEnumInput, MedicineEnum, MedicineEnumFilter,
    MedicineEnumInput, SymptomsEnum, SymptomsEnumFilter, SymptomsEnumInput,
};
pub use context::RequestContext;
pub use facility::{
    Doctor, DoctorFilter, DoctorInput, HealthCenter, HealthCenterFilter, HealthCenterInput,
};
pub use file::{FileInput, StoredFile};
pub use listing::{AutocompleteItem, Ordering, Page, Window};
pub use meta::{CommonFilter, RowMeta, META_COLUMNS};
pub use patient::{
    Drink, Gender, MedicalHistory, MedicalHistoryFilter, MedicalHistoryInput, Patient,
    PatientFilter, PatientInput, PatientView, Smoking,
};
pub use permission::{Action, Forbidden, Permission, PermissionChecker, Resource, Role};
pub use stock::{
    MedicineInventory, MedicineInventoryFilter, MedicineInventoryInput, MedicineSupplies,
    MedicineSuppliesFilter, MedicineSuppliesInput,
};
pub use tenant::{Email, Tenant, TenantName, User};
pub use validation::ValidationError;
pub use visit::{
    PatientDocument, PatientDocumentFilter, PatientDocumentInput, PatientDocumentView,
    PatientVisit, PatientVisitFilter, PatientVisitInput, PatientVisitView, ReturnIn,
};
