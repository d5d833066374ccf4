//! Unit definition catalog backing the inventory settings screen

use chrono::Utc;
use serde::Deserialize;
use uuid::Uuid;
use validator::{Validate, ValidationErrors};

use crate::error::{InventoryError, InventoryResult};
use crate::models::UnitDefinition;

/// Input for creating a unit definition
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateUnitDefinitionInput {
    #[validate(length(min = 1, message = "Name is required"))]
    pub name: String,
    #[validate(length(min = 1, message = "Plural is required"))]
    pub plural: String,
    pub order: Option<u32>,
}

/// Input for updating a unit definition; unset fields are left unchanged
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateUnitDefinitionInput {
    #[validate(length(min = 1, message = "Name cannot be blank"))]
    pub name: Option<String>,
    #[validate(length(min = 1, message = "Plural cannot be blank"))]
    pub plural: Option<String>,
    pub order: Option<u32>,
}

/// One entry of a reorder request
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UnitOrder {
    pub id: Uuid,
    pub order: u32,
}

fn first_validation_error(errors: &ValidationErrors) -> InventoryError {
    for (field, field_errors) in errors.field_errors() {
        if let Some(error) = field_errors.first() {
            let message = error
                .message
                .as_ref()
                .map(|m| m.to_string())
                .unwrap_or_else(|| "Invalid value".to_string());
            return InventoryError::validation(field, message);
        }
    }
    InventoryError::validation("input", "Invalid input")
}

/// In-memory catalog of reusable unit definitions.
///
/// Definitions are soft-deleted so existing item hierarchies that reference
/// them keep rendering.
#[derive(Debug, Default)]
pub struct UnitCatalog {
    definitions: Vec<UnitDefinition>,
}

impl UnitCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a definition; when no order is given it is appended after the
    /// current highest order.
    pub fn create(&mut self, input: CreateUnitDefinitionInput) -> InventoryResult<UnitDefinition> {
        input.validate().map_err(|e| first_validation_error(&e))?;

        let name = input.name.trim();
        let duplicate = self
            .definitions
            .iter()
            .any(|d| !d.is_deleted && d.name.eq_ignore_ascii_case(name));
        if duplicate {
            return Err(InventoryError::DuplicateEntry(name.to_string()));
        }

        let order = input.order.unwrap_or_else(|| {
            self.definitions
                .iter()
                .filter(|d| !d.is_deleted)
                .map(|d| d.order + 1)
                .max()
                .unwrap_or(0)
        });

        let definition = UnitDefinition::new(name, input.plural.trim(), order);
        self.definitions.push(definition.clone());
        Ok(definition)
    }

    pub fn update(
        &mut self,
        id: Uuid,
        input: UpdateUnitDefinitionInput,
    ) -> InventoryResult<UnitDefinition> {
        input.validate().map_err(|e| first_validation_error(&e))?;

        let definition = self
            .definitions
            .iter_mut()
            .find(|d| d.id == id && !d.is_deleted)
            .ok_or_else(|| InventoryError::NotFound("Unit definition".to_string()))?;

        if let Some(name) = input.name {
            definition.name = name.trim().to_string();
        }
        if let Some(plural) = input.plural {
            definition.plural = plural.trim().to_string();
        }
        if let Some(order) = input.order {
            definition.order = order;
        }
        definition.updated_at = Utc::now();
        Ok(definition.clone())
    }

    /// Apply a reorder request; every referenced definition must exist.
    pub fn reorder(&mut self, orders: &[UnitOrder]) -> InventoryResult<()> {
        for entry in orders {
            if !self
                .definitions
                .iter()
                .any(|d| d.id == entry.id && !d.is_deleted)
            {
                return Err(InventoryError::NotFound("Unit definition".to_string()));
            }
        }
        for entry in orders {
            if let Some(definition) = self
                .definitions
                .iter_mut()
                .find(|d| d.id == entry.id && !d.is_deleted)
            {
                definition.order = entry.order;
                definition.updated_at = Utc::now();
            }
        }
        Ok(())
    }

    /// Soft-delete a definition
    pub fn remove(&mut self, id: Uuid) -> InventoryResult<()> {
        let definition = self
            .definitions
            .iter_mut()
            .find(|d| d.id == id && !d.is_deleted)
            .ok_or_else(|| InventoryError::NotFound("Unit definition".to_string()))?;

        definition.is_deleted = true;
        definition.deleted_at = Some(Utc::now());
        definition.updated_at = Utc::now();
        Ok(())
    }

    /// Active definitions sorted by display order
    pub fn list(&self) -> Vec<&UnitDefinition> {
        let mut definitions: Vec<&UnitDefinition> =
            self.definitions.iter().filter(|d| !d.is_deleted).collect();
        definitions.sort_by_key(|d| d.order);
        definitions
    }

    pub fn get(&self, id: Uuid) -> Option<&UnitDefinition> {
        self.definitions.iter().find(|d| d.id == id && !d.is_deleted)
    }
}
