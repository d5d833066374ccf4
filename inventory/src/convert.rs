//! Base-unit conversion for hierarchical inventory quantities.
//!
//! An item's unit hierarchy (e.g. Pack of 10 Cards of 10 Tablets) is an
//! ordered list whose last level is the base unit, the one stock is persisted
//! in. This module converts between a flat base-unit total and a per-level
//! breakdown in both directions, and renders the human-readable quantity
//! strings shown on stock badges and entry forms.
//!
//! Every function here is pure: the hierarchy is passed in on each call and
//! never cached, since it is per-item configuration that can change between
//! items. Bad input degrades numerically (unparseable values count as zero,
//! unusable factors as one) instead of erroring, because these functions sit
//! behind live-typing form fields.

use std::collections::HashMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::models::{OperationType, UnitLevel};

/// How a base-unit total is decomposed for display
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub enum DisplayMode {
    /// Use every unit level
    #[default]
    Full,
    /// Omit the largest level; its share folds into the level below
    SkipOne,
    /// No decomposition; the whole total in the base unit
    BaseOnly,
}

impl DisplayMode {
    /// The toggle cycle used by clickable stock badges.
    pub fn next(self) -> Self {
        match self {
            DisplayMode::Full => DisplayMode::SkipOne,
            DisplayMode::SkipOne => DisplayMode::BaseOnly,
            DisplayMode::BaseOnly => DisplayMode::Full,
        }
    }
}

/// Sign prefix for rendered quantity strings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sign {
    Plus,
    Minus,
}

impl Sign {
    fn prefix(self) -> &'static str {
        match self {
            Sign::Plus => "+",
            Sign::Minus => "-",
        }
    }
}

impl From<OperationType> for Sign {
    fn from(op: OperationType) -> Self {
        match op {
            OperationType::Add => Sign::Plus,
            OperationType::Reduce => Sign::Minus,
        }
    }
}

/// A per-unit-level entry from a stock quantity form.
///
/// `value` stays a string so the form can hold partially-typed input; parsing
/// happens here, and anything unparseable counts as zero.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct QuantityInput {
    pub unit_id: String,
    pub value: String,
}

impl QuantityInput {
    pub fn new(unit_id: &str, value: &str) -> Self {
        Self {
            unit_id: unit_id.to_string(),
            value: value.to_string(),
        }
    }
}

/// One entry of a decomposed quantity breakdown
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct UnitQuantity {
    pub unit: UnitLevel,
    pub quantity: Decimal,
}

/// Multiplier to base units for each level of the hierarchy.
///
/// The multiplier of the level at index `i` is the product of the factors of
/// every level below it; the base unit's multiplier is always 1. Missing or
/// non-positive factors contribute nothing to the product.
pub fn compute_multipliers(units: &[UnitLevel]) -> HashMap<String, Decimal> {
    let mut multipliers = HashMap::with_capacity(units.len());
    for (index, unit) in units.iter().enumerate() {
        let mut multiplier = Decimal::ONE;
        for below in &units[index + 1..] {
            if let Some(factor) = below.effective_factor() {
                multiplier *= factor;
            }
        }
        multipliers.insert(unit.id.clone(), multiplier);
    }
    multipliers
}

fn parse_quantity(raw: &str) -> Decimal {
    raw.trim().parse::<Decimal>().unwrap_or(Decimal::ZERO)
}

/// Reduce per-level form inputs to a single base-unit total.
///
/// Levels with unparseable or non-positive values contribute nothing; inputs
/// for unknown unit ids are ignored; missing inputs default to zero. The
/// result is never negative.
pub fn to_base_units(inputs: &[QuantityInput], units: &[UnitLevel]) -> Decimal {
    let multipliers = compute_multipliers(units);
    let mut total = Decimal::ZERO;

    for unit in units {
        let raw = inputs
            .iter()
            .find(|input| input.unit_id == unit.id)
            .map(|input| input.value.as_str())
            .unwrap_or("0");
        let quantity = parse_quantity(raw);
        if quantity <= Decimal::ZERO {
            continue;
        }
        let multiplier = multipliers
            .get(&unit.id)
            .copied()
            .unwrap_or(Decimal::ONE);
        total += quantity * multiplier;
    }

    total.max(Decimal::ZERO)
}

/// Expand a base-unit total into a greedy largest-to-smallest breakdown.
///
/// Whatever remains after the greedy pass is emitted against the base unit,
/// so the breakdown always reconstitutes the exact total. A zero total yields
/// a single zero entry against the base unit in every mode; an empty
/// hierarchy yields an empty breakdown, there being no unit to attribute the
/// quantity to.
pub fn from_base_units(total: Decimal, units: &[UnitLevel], mode: DisplayMode) -> Vec<UnitQuantity> {
    let Some(base) = units.last() else {
        return Vec::new();
    };

    if total <= Decimal::ZERO {
        return vec![UnitQuantity {
            unit: base.clone(),
            quantity: Decimal::ZERO,
        }];
    }

    if mode == DisplayMode::BaseOnly {
        return vec![UnitQuantity {
            unit: base.clone(),
            quantity: total,
        }];
    }

    let multipliers = compute_multipliers(units);
    let levels = if mode == DisplayMode::SkipOne && units.len() > 1 {
        &units[1..]
    } else {
        units
    };

    let mut remaining = total;
    let mut breakdown = Vec::new();

    for unit in levels {
        let multiplier = multipliers
            .get(&unit.id)
            .copied()
            .unwrap_or(Decimal::ONE);
        if multiplier <= Decimal::ONE {
            continue;
        }
        let quantity = (remaining / multiplier).floor();
        if quantity > Decimal::ZERO {
            breakdown.push(UnitQuantity {
                unit: unit.clone(),
                quantity,
            });
            remaining -= quantity * multiplier;
        }
    }

    if remaining > Decimal::ZERO {
        breakdown.push(UnitQuantity {
            unit: base.clone(),
            quantity: remaining,
        });
    }

    breakdown
}

/// Singular name for a quantity of exactly 1, plural otherwise (including 0,
/// negatives and fractions). A blank plural falls back to the singular name.
pub fn format_unit_name(unit: &UnitLevel, quantity: Decimal) -> &str {
    if quantity == Decimal::ONE {
        return &unit.name;
    }
    if unit.plural.trim().is_empty() {
        &unit.name
    } else {
        &unit.plural
    }
}

/// String-tolerant variant of [`format_unit_name`] for raw form values;
/// unparseable input pluralizes.
pub fn format_unit_name_raw<'a>(unit: &'a UnitLevel, raw: &str) -> &'a str {
    match raw.trim().parse::<Decimal>() {
        Ok(quantity) => format_unit_name(unit, quantity),
        Err(_) => {
            if unit.plural.trim().is_empty() {
                &unit.name
            } else {
                &unit.plural
            }
        }
    }
}

/// Render a base-unit total as a human-readable quantity string, e.g.
/// `"+ 2 Packs, 3 Cards, 5 Tablets"`. Operates on the absolute value of
/// `total`; the sign, when given, becomes a `+`/`-` prefix. With no units to
/// attribute the quantity to, a literal `units` label is used.
pub fn render_quantity_string(
    total: Decimal,
    units: &[UnitLevel],
    mode: DisplayMode,
    sign: Option<Sign>,
) -> String {
    let magnitude = total.abs();

    let body = if units.is_empty() {
        format!("{} units", magnitude.normalize())
    } else {
        from_base_units(magnitude, units, mode)
            .iter()
            .map(|entry| {
                format!(
                    "{} {}",
                    entry.quantity.normalize(),
                    format_unit_name(&entry.unit, entry.quantity)
                )
            })
            .collect::<Vec<_>>()
            .join(", ")
    };

    match sign {
        Some(sign) => format!("{} {}", sign.prefix(), body),
        None => body,
    }
}
