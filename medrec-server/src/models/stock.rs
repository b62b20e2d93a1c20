//! Medicine stock: inventory counts and incoming supplies

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use super::meta::{CommonFilter, RowMeta};
use super::{text, ValidationError};

/// Stock count of a medicine on a given day
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct MedicineInventory {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub meta: RowMeta,
    pub medicine_id: Option<Uuid>,
    pub inventory_date: NaiveDate,
    pub count: i64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MedicineInventoryInput {
    #[serde(default)]
    pub medicine: Option<Uuid>,
    #[serde(default)]
    pub inventory_date: Option<NaiveDate>,
    #[serde(default)]
    pub count: Option<i64>,
}

impl MedicineInventoryInput {
    pub fn validate(&self) -> Result<(), ValidationError> {
        text::present("inventoryDate", &self.inventory_date)?;
        text::present("count", &self.count)
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MedicineInventoryFilter {
    #[serde(flatten)]
    pub common: CommonFilter,
    pub medicine: Option<String>,
    pub inventory_date_range: Option<Vec<String>>,
    pub count_range: Option<Vec<String>>,
}

/// Medicine delivered into stock
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct MedicineSupplies {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub meta: RowMeta,
    pub medicine_id: Option<Uuid>,
    pub inventory_add_date: NaiveDate,
    pub count: i64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MedicineSuppliesInput {
    #[serde(default)]
    pub medicine: Option<Uuid>,
    #[serde(default)]
    pub inventory_add_date: Option<NaiveDate>,
    #[serde(default)]
    pub count: Option<i64>,
}

impl MedicineSuppliesInput {
    pub fn validate(&self) -> Result<(), ValidationError> {
        text::present("inventoryAddDate", &self.inventory_add_date)?;
        text::present("count", &self.count)
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MedicineSuppliesFilter {
    #[serde(flatten)]
    pub common: CommonFilter,
    pub medicine: Option<String>,
    pub inventory_add_date_range: Option<Vec<String>>,
    pub count_range: Option<Vec<String>>,
}
