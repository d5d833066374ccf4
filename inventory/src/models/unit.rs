//! Unit hierarchy and unit catalog models

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One rung of an inventory item's unit hierarchy.
///
/// Hierarchies are ordered largest to smallest; the last level is the base
/// unit, in which all stock quantities are persisted. `factor` is the count of
/// this unit contained in one instance of the level above it, so the first
/// (largest) level carries no meaningful factor.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct UnitLevel {
    pub id: String,
    pub name: String,
    pub plural: String,
    /// Forms submit this field as free text, so deserialization accepts
    /// numbers, numeric strings, or nothing at all.
    #[serde(default, deserialize_with = "flexible_factor")]
    pub factor: Option<Decimal>,
}

impl UnitLevel {
    pub fn new(id: &str, name: &str, plural: &str, factor: Option<Decimal>) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            plural: plural.to_string(),
            factor,
        }
    }

    /// Factor usable in multiplier products; non-positive factors are neutral.
    pub fn effective_factor(&self) -> Option<Decimal> {
        self.factor.filter(|f| *f > Decimal::ZERO)
    }
}

/// Tolerant deserializer for conversion factors: numbers and numeric strings
/// parse, everything else (null, blanks, garbage) becomes `None`.
fn flexible_factor<'de, D>(deserializer: D) -> Result<Option<Decimal>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(serde_json::Value::Number(n)) => n.to_string().parse::<Decimal>().ok(),
        Some(serde_json::Value::String(s)) => s.trim().parse::<Decimal>().ok(),
        _ => None,
    })
}

/// A reusable unit definition from the inventory settings catalog
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UnitDefinition {
    pub id: Uuid,
    pub name: String,
    pub plural: String,
    pub order: u32,
    pub is_deleted: bool,
    pub deleted_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl UnitDefinition {
    pub fn new(name: &str, plural: &str, order: u32) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            name: name.to_string(),
            plural: plural.to_string(),
            order,
            is_deleted: false,
            deleted_at: None,
            created_at: now,
            updated_at: now,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_factor_deserializes_from_number() {
        let unit: UnitLevel =
            serde_json::from_str(r#"{"id":"card","name":"Card","plural":"Cards","factor":10}"#)
                .unwrap();
        assert_eq!(unit.factor, Some(Decimal::from(10)));
    }

    #[test]
    fn test_factor_deserializes_from_string() {
        let unit: UnitLevel =
            serde_json::from_str(r#"{"id":"card","name":"Card","plural":"Cards","factor":"10"}"#)
                .unwrap();
        assert_eq!(unit.factor, Some(Decimal::from(10)));
    }

    #[test]
    fn test_factor_tolerates_garbage() {
        let unit: UnitLevel =
            serde_json::from_str(r#"{"id":"card","name":"Card","plural":"Cards","factor":"abc"}"#)
                .unwrap();
        assert_eq!(unit.factor, None);
    }

    #[test]
    fn test_factor_defaults_to_none() {
        let unit: UnitLevel =
            serde_json::from_str(r#"{"id":"pack","name":"Pack","plural":"Packs"}"#).unwrap();
        assert_eq!(unit.factor, None);
    }

    #[test]
    fn test_effective_factor_rejects_non_positive() {
        let mut unit = UnitLevel::new("card", "Card", "Cards", Some(Decimal::ZERO));
        assert_eq!(unit.effective_factor(), None);

        unit.factor = Some(Decimal::from(-3));
        assert_eq!(unit.effective_factor(), None);

        unit.factor = Some(Decimal::from(10));
        assert_eq!(unit.effective_factor(), Some(Decimal::from(10)));
    }
}
