//! Stock movement ledger models

use chrono::{DateTime, Datelike, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Direction of a stock movement
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum OperationType {
    Add,
    Reduce,
}

/// Supplier details captured at movement time
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SupplierSnapshot {
    pub supplier_id: Uuid,
    pub name: String,
}

/// Item details captured at movement time
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ItemSnapshot {
    pub id: Uuid,
    pub name: String,
}

/// Admin who performed the movement
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PerformerSnapshot {
    pub id: Uuid,
    pub name: String,
}

/// Prices captured at movement time
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PriceSnapshot {
    pub cost_price: Decimal,
    pub selling_price: Decimal,
}

/// An append-only stock ledger record.
///
/// `quantity_in_base_units` is always positive; `operation_type` carries the
/// direction. `balance` is the item's stock level after this movement applied.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StockMovement {
    pub id: Uuid,
    pub inventory_item: ItemSnapshot,
    pub operation_type: OperationType,
    pub supplier: Option<SupplierSnapshot>,
    pub prices: Option<PriceSnapshot>,
    /// Stored as month/year only, normalized to the first of the month
    pub expiry_date: NaiveDate,
    pub quantity_in_base_units: Decimal,
    pub balance: Decimal,
    pub performer: PerformerSnapshot,
    pub created_at: DateTime<Utc>,
}

/// Normalize an expiry date to the first day of its month, so expiry is
/// tracked as month/year only.
pub fn normalize_expiry_date(date: NaiveDate) -> NaiveDate {
    NaiveDate::from_ymd_opt(date.year(), date.month(), 1).unwrap_or(date)
}
