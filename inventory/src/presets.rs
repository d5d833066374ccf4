//! Default unit groupings per inventory category
//!
//! Supports hierarchical catalog loading:
//! 1. Built-in defaults in code
//! 2. Configuration files (development.toml, production.toml)
//! 3. Environment variable overrides with CMHO_ prefix

use std::collections::HashMap;

use config::{ConfigError, Environment, File};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::models::UnitLevel;

/// A named default unit hierarchy offered when creating an item
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct UnitPreset {
    pub id: String,
    pub name: String,
    pub units: Vec<UnitLevel>,
}

/// Preset catalog keyed by inventory category
#[derive(Debug, Clone)]
pub struct PresetCatalog {
    presets: HashMap<String, UnitPreset>,
}

impl PresetCatalog {
    /// The built-in defaults shipped with the portal
    pub fn builtin() -> Self {
        let mut presets = HashMap::new();

        presets.insert(
            "Drug".to_string(),
            UnitPreset {
                id: "default-drug".to_string(),
                name: "Drug Default".to_string(),
                units: vec![
                    UnitLevel::new("pack", "Pack", "Packs", Some(Decimal::ONE)),
                    UnitLevel::new("card", "Card", "Cards", Some(Decimal::from(10))),
                    UnitLevel::new("tablet", "Tablet", "Tablets", Some(Decimal::from(10))),
                ],
            },
        );
        presets.insert(
            "Injection".to_string(),
            UnitPreset {
                id: "default-injection".to_string(),
                name: "Injection Default".to_string(),
                units: vec![
                    UnitLevel::new("pack", "Pack", "Packs", Some(Decimal::ONE)),
                    UnitLevel::new("bottle", "Bottle", "Bottles", Some(Decimal::from(10))),
                ],
            },
        );
        presets.insert(
            "Syrup".to_string(),
            UnitPreset {
                id: "default-syrup".to_string(),
                name: "Syrup Default".to_string(),
                units: vec![UnitLevel::new("bottle", "Bottle", "Bottles", Some(Decimal::ONE))],
            },
        );
        presets.insert(
            "Bottle".to_string(),
            UnitPreset {
                id: "default-bottle".to_string(),
                name: "Bottle Default".to_string(),
                units: vec![UnitLevel::new("bottle", "Bottle", "Bottles", Some(Decimal::ONE))],
            },
        );

        Self { presets }
    }

    /// Load the catalog: built-in defaults, then file and environment
    /// overrides merged on top per category.
    pub fn load() -> Result<Self, ConfigError> {
        let environment =
            std::env::var("CMHO_ENVIRONMENT").unwrap_or_else(|_| "development".into());

        let source = config::Config::builder()
            .add_source(File::with_name(&format!("config/{}", environment)).required(false))
            .add_source(
                Environment::with_prefix("CMHO")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let overrides: HashMap<String, UnitPreset> =
            source.get("presets").unwrap_or_default();

        let mut catalog = Self::builtin();
        catalog.presets.extend(overrides);
        Ok(catalog)
    }

    /// Default hierarchy for a category; categories like Equipment and
    /// Custom carry no preset.
    pub fn preset_for(&self, category: &str) -> Option<&UnitPreset> {
        self.presets.get(category)
    }

    pub fn categories(&self) -> Vec<&str> {
        self.presets.keys().map(String::as_str).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validation::validate_unit_hierarchy;

    #[test]
    fn test_builtin_drug_preset() {
        let catalog = PresetCatalog::builtin();
        let preset = catalog.preset_for("Drug").unwrap();
        assert_eq!(preset.units.len(), 3);
        assert_eq!(preset.units.last().unwrap().id, "tablet");
    }

    #[test]
    fn test_builtin_presets_pass_hierarchy_validation() {
        let catalog = PresetCatalog::builtin();
        for category in catalog.categories() {
            let preset = catalog.preset_for(category).unwrap();
            assert!(
                validate_unit_hierarchy(&preset.units).is_ok(),
                "preset for {} is invalid",
                category
            );
        }
    }

    #[test]
    fn test_unknown_category_has_no_preset() {
        let catalog = PresetCatalog::builtin();
        assert!(catalog.preset_for("Equipment").is_none());
        assert!(catalog.preset_for("Custom").is_none());
    }
}
