//! Inventory item models

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::UnitLevel;

/// Whether an item's unit hierarchy has been fully specified
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum SetupStatus {
    /// Units may be partially specified; the item cannot hold stock yet
    Draft,
    /// Units and low-stock threshold are complete
    Ready,
}

/// Item lifecycle status
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ItemStatus {
    Active,
    Disabled,
    Deleted,
}

/// An inventory item with its unit hierarchy and running stock level
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InventoryItem {
    pub id: Uuid,
    pub name: String,
    pub category: String,
    pub setup_status: SetupStatus,
    pub status: ItemStatus,
    /// Ordered largest to smallest; the last level is the base unit
    pub units: Vec<UnitLevel>,
    /// Threshold in base units below which the item counts as low stock
    pub low_stock_value: Option<Decimal>,
    pub current_stock_in_base_units: Decimal,
    pub earliest_expiry_date: Option<NaiveDate>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl InventoryItem {
    pub fn new(name: &str, category: &str, units: Vec<UnitLevel>) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            name: name.to_string(),
            category: category.to_string(),
            setup_status: SetupStatus::Draft,
            status: ItemStatus::Active,
            units,
            low_stock_value: None,
            current_stock_in_base_units: Decimal::ZERO,
            earliest_expiry_date: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// The smallest unit, in which stock quantities are persisted
    pub fn base_unit(&self) -> Option<&UnitLevel> {
        self.units.last()
    }

    /// True when current stock has fallen to or below the low-stock threshold
    pub fn is_low_stock(&self) -> bool {
        match self.low_stock_value {
            Some(threshold) => self.current_stock_in_base_units <= threshold,
            None => false,
        }
    }
}
