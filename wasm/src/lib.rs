//! WebAssembly module for the CMHO Portal inventory manager
//!
//! Provides client-side computation for:
//! - Stock-entry forms: reducing per-unit quantities to a base-unit total
//! - Stock badges: expanding a stored total into a readable breakdown
//! - Unit label pluralization
//! - Offline unit-hierarchy validation

use rust_decimal::Decimal;
use wasm_bindgen::prelude::*;

// Re-export shared types for use in JavaScript
pub use cmho_inventory::convert::*;
pub use cmho_inventory::models::*;
pub use cmho_inventory::validation::*;

/// Initialize the WASM module
#[wasm_bindgen(start)]
pub fn init() {
    // Set up panic hook for better error messages in browser console
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();
}

fn parse_units(units_json: &str) -> Result<Vec<UnitLevel>, JsValue> {
    serde_json::from_str(units_json)
        .map_err(|e| JsValue::from_str(&format!("Invalid units JSON: {}", e)))
}

fn parse_mode(mode: &str) -> DisplayMode {
    // Unknown modes fall back to the default, matching the engine's
    // tolerance for form-supplied values
    serde_json::from_value(serde_json::Value::String(mode.to_string())).unwrap_or_default()
}

/// Reduce stock-entry form inputs to a single base-unit total
#[wasm_bindgen]
pub fn total_in_base_units(inputs_json: &str, units_json: &str) -> Result<f64, JsValue> {
    let inputs: Vec<QuantityInput> = serde_json::from_str(inputs_json)
        .map_err(|e| JsValue::from_str(&format!("Invalid inputs JSON: {}", e)))?;
    let units = parse_units(units_json)?;

    let total = to_base_units(&inputs, &units);
    Ok(total.to_string().parse().unwrap_or(0.0))
}

/// Render a stock movement quantity as badge text, e.g. `"+ 2 Packs, 3 Cards"`
#[wasm_bindgen]
pub fn render_stock_quantity(
    units_json: &str,
    quantity_in_base_units: f64,
    operation_type: &str,
    mode: &str,
) -> Result<String, JsValue> {
    let units = parse_units(units_json)?;
    let quantity = Decimal::try_from(quantity_in_base_units).unwrap_or(Decimal::ZERO);

    let sign = match operation_type {
        "add" => Some(Sign::Plus),
        "reduce" => Some(Sign::Minus),
        _ => None,
    };

    Ok(render_quantity_string(
        quantity,
        &units,
        parse_mode(mode),
        sign,
    ))
}

/// Decompose a base-unit total into per-level quantities, as JSON
#[wasm_bindgen]
pub fn breakdown_json(units_json: &str, total: f64, mode: &str) -> Result<String, JsValue> {
    let units = parse_units(units_json)?;
    let total = Decimal::try_from(total).unwrap_or(Decimal::ZERO);

    let breakdown = from_base_units(total, &units, parse_mode(mode));
    serde_json::to_string(&breakdown)
        .map_err(|e| JsValue::from_str(&format!("Serialization error: {}", e)))
}

/// Unit label for a raw form value: singular only for exactly 1
#[wasm_bindgen]
pub fn format_unit_label(unit_json: &str, raw_value: &str) -> Result<String, JsValue> {
    let unit: UnitLevel = serde_json::from_str(unit_json)
        .map_err(|e| JsValue::from_str(&format!("Invalid unit JSON: {}", e)))?;

    Ok(format_unit_name_raw(&unit, raw_value).to_string())
}

/// Validate a unit hierarchy; returns an empty string when valid, else the
/// failure message
#[wasm_bindgen]
pub fn validate_hierarchy_json(units_json: &str) -> Result<String, JsValue> {
    let units = parse_units(units_json)?;
    Ok(match validate_unit_hierarchy(&units) {
        Ok(()) => String::new(),
        Err(message) => message.to_string(),
    })
}

/// The badge display-mode toggle cycle: full -> skipOne -> baseOnly -> full
#[wasm_bindgen]
pub fn next_display_mode(mode: &str) -> String {
    match serde_json::to_value(parse_mode(mode).next()) {
        Ok(serde_json::Value::String(next)) => next,
        _ => "full".to_string(),
    }
}
