//! Health centers and doctors

use async_trait::async_trait;
use sqlx::SqliteConnection;

use super::{ensure_member, Conditions, DbError, Param, TenantEntity};
use crate::models::{
    CommonFilter, Doctor, DoctorFilter, DoctorInput, HealthCenter, HealthCenterFilter,
    HealthCenterInput, RequestContext, Resource, ValidationError,
};

pub struct HealthCenters;

#[async_trait]
impl TenantEntity for HealthCenters {
    type Record = HealthCenter;
    type View = HealthCenter;
    type Input = HealthCenterInput;
    type Filter = HealthCenterFilter;

    const RESOURCE: Resource = Resource::HealthCenter;
    const TABLE: &'static str = "health_centers";
    const COLUMNS: &'static str = "name, address, phone_number, admin_name_id";
    const LABEL_COLUMN: &'static str = "name";
    const SORTABLE: &'static [(&'static str, &'static str)] = &[
        ("name", "name"),
        ("address", "address"),
        ("phoneNumber", "phone_number"),
    ];

    fn validate(input: &HealthCenterInput) -> Result<(), ValidationError> {
        input.validate()
    }

    fn values(input: &HealthCenterInput) -> Vec<(&'static str, Param)> {
        vec![
            ("name", Param::text(&input.name)),
            ("address", Param::text(&input.address)),
            ("phone_number", Param::opt_text(input.phone_number.as_deref())),
            ("admin_name_id", Param::Uuid(input.admin_name)),
        ]
    }

    fn common(filter: &HealthCenterFilter) -> &CommonFilter {
        &filter.common
    }

    fn filter(c: &mut Conditions, f: &HealthCenterFilter) -> Result<(), ValidationError> {
        c.contains("name", f.name.as_deref());
        c.contains("address", f.address.as_deref());
        c.contains("phone_number", f.phone_number.as_deref());
        c.reference("admin_name_id", f.admin_name.as_deref());
        Ok(())
    }

    async fn check_references(
        conn: &mut SqliteConnection,
        ctx: &RequestContext,
        input: &HealthCenterInput,
    ) -> Result<(), DbError> {
        ensure_member(conn, ctx, "adminName", input.admin_name).await
    }

    async fn fill(
        _conn: &mut SqliteConnection,
        _ctx: &RequestContext,
        record: HealthCenter,
    ) -> Result<HealthCenter, DbError> {
        Ok(record)
    }
}

pub struct Doctors;

#[async_trait]
impl TenantEntity for Doctors {
    type Record = Doctor;
    type View = Doctor;
    type Input = DoctorInput;
    type Filter = DoctorFilter;

    const RESOURCE: Resource = Resource::Doctor;
    const TABLE: &'static str = "doctors";
    const COLUMNS: &'static str = "name, specialization, phone, user_id";
    const LABEL_COLUMN: &'static str = "name";
    const SORTABLE: &'static [(&'static str, &'static str)] = &[
        ("name", "name"),
        ("specialization", "specialization"),
        ("phone", "phone"),
    ];
    const UNIQUE: &'static [(&'static str, &'static str)] = &[("name", "name")];

    fn validate(input: &DoctorInput) -> Result<(), ValidationError> {
        input.validate()
    }

    fn values(input: &DoctorInput) -> Vec<(&'static str, Param)> {
        vec![
            ("name", Param::text(&input.name)),
            ("specialization", Param::text(&input.specialization)),
            ("phone", Param::opt_text(input.phone.as_deref())),
            ("user_id", Param::Uuid(input.user)),
        ]
    }

    fn common(filter: &DoctorFilter) -> &CommonFilter {
        &filter.common
    }

    fn filter(c: &mut Conditions, f: &DoctorFilter) -> Result<(), ValidationError> {
        c.contains("name", f.name.as_deref());
        c.contains("specialization", f.specialization.as_deref());
        c.contains("phone", f.phone.as_deref());
        c.reference("user_id", f.user.as_deref());
        Ok(())
    }

    async fn check_references(
        conn: &mut SqliteConnection,
        ctx: &RequestContext,
        input: &DoctorInput,
    ) -> Result<(), DbError> {
        ensure_member(conn, ctx, "user", input.user).await
    }

    async fn fill(
        _conn: &mut SqliteConnection,
        _ctx: &RequestContext,
        record: Doctor,
    ) -> Result<Doctor, DbError> {
        Ok(record)
    }
}
