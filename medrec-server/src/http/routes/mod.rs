//! Route handlers organized by resource

pub mod health;
pub mod resource;

use std::sync::Arc;

use axum::Router;

use crate::db::repos::{
    DiagnosticEnums, Doctors, HealthCenters, MedicalHistories, MedicineEnums,
    MedicineInventories, MedicineSuppliesRepo, PatientDocuments, PatientVisits, Patients,
    SymptomsEnums,
};
use crate::http::server::AppState;

/// Resource routes of every tenant-scoped entity
pub fn entities() -> Router<Arc<AppState>> {
    Router::new()
        .merge(resource::router::<HealthCenters>("health-center"))
        .merge(resource::router::<Doctors>("doctor"))
        .merge(resource::router::<MedicineEnums>("medicine-enum"))
        .merge(resource::router::<SymptomsEnums>("symptoms-enum"))
        .merge(resource::router::<DiagnosticEnums>("diagnostic-enum"))
        .merge(resource::router::<MedicineInventories>("medicine-inventory"))
        .merge(resource::router::<MedicineSuppliesRepo>("medicine-supplies"))
        .merge(resource::router::<MedicalHistories>("medical-history"))
        .merge(resource::router::<Patients>("patient"))
        .merge(resource::router::<PatientVisits>("patient-visit"))
        .merge(resource::router::<PatientDocuments>("patient-document"))
}
