//! Validation utilities for the CMHO Portal inventory core
//!
//! The conversion engine deliberately tolerates bad factors at runtime, so
//! hierarchy definitions are validated here instead, before an item is
//! allowed to leave draft state.

use std::collections::HashSet;

use rust_decimal::Decimal;

use crate::models::{InventoryItem, SetupStatus, UnitLevel};

// ============================================================================
// Unit Hierarchy Validations
// ============================================================================

/// Validate a unit hierarchy definition.
///
/// The hierarchy must contain at least the base unit; every level needs a
/// non-blank name and a unique id; every level below the top one needs a
/// conversion factor of at least 1 (the top level has no parent, so its
/// factor is ignored).
pub fn validate_unit_hierarchy(units: &[UnitLevel]) -> Result<(), &'static str> {
    if units.is_empty() {
        return Err("Unit hierarchy must contain at least the base unit");
    }

    let mut seen_ids = HashSet::new();
    for (index, unit) in units.iter().enumerate() {
        if unit.name.trim().is_empty() {
            return Err("Unit names cannot be blank");
        }
        if !seen_ids.insert(unit.id.as_str()) {
            return Err("Unit ids must be unique within a hierarchy");
        }
        if index > 0 {
            match unit.factor {
                Some(factor) if factor >= Decimal::ONE => {}
                _ => return Err("Units below the top level need a conversion factor of at least 1"),
            }
        }
    }

    Ok(())
}

/// Validate a unit definition for the settings catalog
pub fn validate_unit_definition(name: &str, plural: &str) -> Result<(), &'static str> {
    if name.trim().is_empty() {
        return Err("Unit name is required");
    }
    if plural.trim().is_empty() {
        return Err("Unit plural is required");
    }
    Ok(())
}

// ============================================================================
// Item Validations
// ============================================================================

/// Validate a low-stock threshold in base units
pub fn validate_low_stock_value(value: Decimal) -> Result<(), &'static str> {
    if value < Decimal::ZERO {
        return Err("Low-stock value cannot be negative");
    }
    Ok(())
}

/// Validate that an item is complete enough to be marked ready.
///
/// Ready items accept stock, so their hierarchy must be fully specified and a
/// low-stock threshold must be set.
pub fn validate_ready_item(item: &InventoryItem) -> Result<(), &'static str> {
    validate_unit_hierarchy(&item.units)?;
    match item.low_stock_value {
        Some(value) => validate_low_stock_value(value),
        None => Err("Ready items need a low-stock threshold"),
    }
}

/// True when the item may receive stock movements
pub fn can_hold_stock(item: &InventoryItem) -> bool {
    item.setup_status == SetupStatus::Ready
}
