//! Medicine inventory counts and supplies

use async_trait::async_trait;
use sqlx::SqliteConnection;

use super::{ensure_reference, Conditions, DbError, Param, TenantEntity};
use crate::models::{
    CommonFilter, MedicineInventory, MedicineInventoryFilter, MedicineInventoryInput,
    MedicineSupplies, MedicineSuppliesFilter, MedicineSuppliesInput, RequestContext, Resource,
    ValidationError,
};

pub struct MedicineInventories;

#[async_trait]
impl TenantEntity for MedicineInventories {
    type Record = MedicineInventory;
    type View = MedicineInventory;
    type Input = MedicineInventoryInput;
    type Filter = MedicineInventoryFilter;

    const RESOURCE: Resource = Resource::MedicineInventory;
    const TABLE: &'static str = "medicine_inventories";
    const COLUMNS: &'static str = "medicine_id, inventory_date, count";
    const LABEL_COLUMN: &'static str = "inventory_date";
    const SORTABLE: &'static [(&'static str, &'static str)] =
        &[("inventoryDate", "inventory_date"), ("count", "count")];

    fn validate(input: &MedicineInventoryInput) -> Result<(), ValidationError> {
        input.validate()
    }

    fn values(input: &MedicineInventoryInput) -> Vec<(&'static str, Param)> {
        vec![
            ("medicine_id", Param::Uuid(input.medicine)),
            ("inventory_date", Param::Date(input.inventory_date)),
            ("count", Param::Int(input.count)),
        ]
    }

    fn common(filter: &MedicineInventoryFilter) -> &CommonFilter {
        &filter.common
    }

    fn filter(c: &mut Conditions, f: &MedicineInventoryFilter) -> Result<(), ValidationError> {
        c.reference("medicine_id", f.medicine.as_deref());
        c.date_between(
            "inventory_date",
            "inventoryDateRange",
            f.inventory_date_range.as_deref(),
        )?;
        c.int_between("count", "countRange", f.count_range.as_deref())
    }

    async fn check_references(
        conn: &mut SqliteConnection,
        ctx: &RequestContext,
        input: &MedicineInventoryInput,
    ) -> Result<(), DbError> {
        ensure_reference(conn, ctx, "medicine_enums", "medicine", input.medicine).await
    }

    async fn fill(
        _conn: &mut SqliteConnection,
        _ctx: &RequestContext,
        record: MedicineInventory,
    ) -> Result<MedicineInventory, DbError> {
        Ok(record)
    }
}

pub struct MedicineSuppliesRepo;

#[async_trait]
impl TenantEntity for MedicineSuppliesRepo {
    type Record = MedicineSupplies;
    type View = MedicineSupplies;
    type Input = MedicineSuppliesInput;
    type Filter = MedicineSuppliesFilter;

    const RESOURCE: Resource = Resource::MedicineSupplies;
    const TABLE: &'static str = "medicine_supplies";
    const COLUMNS: &'static str = "medicine_id, inventory_add_date, count";
    const LABEL_COLUMN: &'static str = "inventory_add_date";
    const SORTABLE: &'static [(&'static str, &'static str)] =
        &[("inventoryAddDate", "inventory_add_date"), ("count", "count")];

    fn validate(input: &MedicineSuppliesInput) -> Result<(), ValidationError> {
        input.validate()
    }

    fn values(input: &MedicineSuppliesInput) -> Vec<(&'static str, Param)> {
        vec![
            ("medicine_id", Param::Uuid(input.medicine)),
            ("inventory_add_date", Param::Date(input.inventory_add_date)),
            ("count", Param::Int(input.count)),
        ]
    }

    fn common(filter: &MedicineSuppliesFilter) -> &CommonFilter {
        &filter.common
    }

    fn filter(c: &mut Conditions, f: &MedicineSuppliesFilter) -> Result<(), ValidationError> {
        c.reference("medicine_id", f.medicine.as_deref());
        c.date_between(
            "inventory_add_date",
            "inventoryAddDateRange",
            f.inventory_add_date_range.as_deref(),
        )?;
        c.int_between("count", "countRange", f.count_range.as_deref())
    }

    async fn check_references(
        conn: &mut SqliteConnection,
        ctx: &RequestContext,
        input: &MedicineSuppliesInput,
    ) -> Result<(), DbError> {
        ensure_reference(conn, ctx, "medicine_enums", "medicine", input.medicine).await
    }

    async fn fill(
        _conn: &mut SqliteConnection,
        _ctx: &RequestContext,
        record: MedicineSupplies,
    ) -> Result<MedicineSupplies, DbError> {
        Ok(record)
    }
}
