//! Stock ledger for tracking movements against inventory items
//!
//! The ledger applies add/reduce operations, keeps each item's running stock
//! and earliest expiry current, and answers the movement-history queries the
//! portal's stock pages are built on. Persistence lives behind the REST
//! layer; this is the arithmetic it delegates to.

use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::Deserialize;
use std::collections::HashMap;
use uuid::Uuid;

use crate::error::{InventoryError, InventoryResult};
use crate::models::{
    normalize_expiry_date, InventoryItem, ItemSnapshot, ItemStatus, OperationType,
    PerformerSnapshot, PriceSnapshot, StockMovement, SupplierSnapshot,
};
use crate::types::{PaginatedResponse, Pagination, PaginationMeta, SortOrder};
use crate::validation::can_hold_stock;

/// Input for an add-stock operation; prices and expiry are required because
/// new stock always enters with purchase details.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddStockInput {
    pub inventory_item_id: Uuid,
    pub supplier: Option<SupplierSnapshot>,
    pub cost_price: Decimal,
    pub selling_price: Decimal,
    pub expiry_date: NaiveDate,
    pub quantity_in_base_units: Decimal,
}

/// Input for a reduce-stock operation; prices and expiry are optional.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReduceStockInput {
    pub inventory_item_id: Uuid,
    pub supplier: Option<SupplierSnapshot>,
    pub cost_price: Option<Decimal>,
    pub selling_price: Option<Decimal>,
    pub expiry_date: Option<NaiveDate>,
    pub quantity_in_base_units: Decimal,
}

/// Filters for listing stock movements
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MovementQuery {
    pub inventory_item_id: Option<Uuid>,
    pub operation_type: Option<OperationType>,
    /// Case-insensitive match on item or performer name
    pub search: Option<String>,
    #[serde(default)]
    pub sort: SortOrder,
    #[serde(default)]
    pub pagination: Pagination,
}

/// Totals for one item across its ledger history
#[derive(Debug, Clone, PartialEq)]
pub struct StockSummary {
    pub total_in: Decimal,
    pub total_out: Decimal,
    pub balance: Decimal,
}

/// In-memory stock ledger over a set of registered items
#[derive(Debug, Default)]
pub struct StockLedger {
    items: HashMap<Uuid, InventoryItem>,
    movements: Vec<StockMovement>,
}

impl StockLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register or replace an item the ledger tracks stock for
    pub fn register_item(&mut self, item: InventoryItem) {
        self.items.insert(item.id, item);
    }

    pub fn item(&self, id: Uuid) -> Option<&InventoryItem> {
        self.items.get(&id).filter(|i| i.status != ItemStatus::Deleted)
    }

    pub fn items(&self) -> impl Iterator<Item = &InventoryItem> {
        self.items.values().filter(|i| i.status != ItemStatus::Deleted)
    }

    fn stockable_item(&mut self, id: Uuid) -> InventoryResult<&mut InventoryItem> {
        let item = self
            .items
            .get_mut(&id)
            .filter(|i| i.status != ItemStatus::Deleted)
            .ok_or_else(|| InventoryError::NotFound("Inventory item".to_string()))?;

        if !can_hold_stock(item) {
            return Err(InventoryError::InvalidStateTransition(format!(
                "item '{}' is still in draft setup",
                item.name
            )));
        }
        Ok(item)
    }

    fn validate_quantity(quantity: Decimal) -> InventoryResult<()> {
        if quantity <= Decimal::ZERO {
            return Err(InventoryError::validation(
                "quantityInBaseUnits",
                "Quantity must be positive",
            ));
        }
        Ok(())
    }

    /// Record incoming stock and return the created movement.
    pub fn add_stock(
        &mut self,
        input: AddStockInput,
        performer: PerformerSnapshot,
    ) -> InventoryResult<StockMovement> {
        Self::validate_quantity(input.quantity_in_base_units)?;

        let movement = {
            let item = self.stockable_item(input.inventory_item_id)?;

            let quantity = input.quantity_in_base_units;
            let expiry_date = normalize_expiry_date(input.expiry_date);
            let next_stock = item.current_stock_in_base_units + quantity;

            let movement = StockMovement {
                id: Uuid::new_v4(),
                inventory_item: ItemSnapshot {
                    id: item.id,
                    name: item.name.clone(),
                },
                operation_type: OperationType::Add,
                supplier: input.supplier,
                prices: Some(PriceSnapshot {
                    cost_price: input.cost_price,
                    selling_price: input.selling_price,
                }),
                expiry_date,
                quantity_in_base_units: quantity,
                balance: next_stock,
                performer,
                created_at: Utc::now(),
            };

            item.current_stock_in_base_units = next_stock;
            // Only an earlier expiry can displace the current one on add
            match item.earliest_expiry_date {
                Some(current) if current <= expiry_date => {}
                _ => item.earliest_expiry_date = Some(expiry_date),
            }
            item.updated_at = Utc::now();

            tracing::info!(
                item = %movement.inventory_item.name,
                quantity = %quantity,
                balance = %next_stock,
                "stock added"
            );
            movement
        };

        self.movements.push(movement.clone());
        Ok(movement)
    }

    /// Record outgoing stock and return the created movement. The balance
    /// clamps at zero; reducing past the current level never goes negative.
    pub fn reduce_stock(
        &mut self,
        input: ReduceStockInput,
        performer: PerformerSnapshot,
    ) -> InventoryResult<StockMovement> {
        Self::validate_quantity(input.quantity_in_base_units)?;

        let item = self.stockable_item(input.inventory_item_id)?;
        let item_id = item.id;

        let quantity = input.quantity_in_base_units;
        let current_stock = item.current_stock_in_base_units;
        let next_stock = current_stock - quantity;
        let final_stock = next_stock.max(Decimal::ZERO);

        if next_stock < Decimal::ZERO {
            tracing::warn!(
                item = %item.name,
                current = %current_stock,
                requested = %quantity,
                "reduction exceeds current stock, clamping balance at zero"
            );
        }

        let prices = match (input.cost_price, input.selling_price) {
            (Some(cost_price), Some(selling_price)) => Some(PriceSnapshot {
                cost_price,
                selling_price,
            }),
            _ => None,
        };
        let expiry_date = input
            .expiry_date
            .map(normalize_expiry_date)
            .unwrap_or_else(|| normalize_expiry_date(Utc::now().date_naive()));

        let movement = StockMovement {
            id: Uuid::new_v4(),
            inventory_item: ItemSnapshot {
                id: item.id,
                name: item.name.clone(),
            },
            operation_type: OperationType::Reduce,
            supplier: input.supplier,
            prices,
            expiry_date,
            quantity_in_base_units: quantity,
            balance: final_stock,
            performer,
            created_at: Utc::now(),
        };

        item.current_stock_in_base_units = final_stock;
        item.updated_at = Utc::now();

        tracing::info!(
            item = %movement.inventory_item.name,
            quantity = %quantity,
            balance = %final_stock,
            "stock reduced"
        );

        self.movements.push(movement.clone());

        // The consumed stock may have carried the earliest expiry
        let recalculated = if final_stock > Decimal::ZERO {
            self.recalculate_earliest_expiry(item_id)
        } else {
            None
        };
        if let Some(item) = self.items.get_mut(&item_id) {
            item.earliest_expiry_date = recalculated;
        }

        Ok(movement)
    }

    /// Earliest expiry across the item's add movements
    fn recalculate_earliest_expiry(&self, item_id: Uuid) -> Option<NaiveDate> {
        self.movements
            .iter()
            .filter(|m| {
                m.inventory_item.id == item_id && m.operation_type == OperationType::Add
            })
            .map(|m| m.expiry_date)
            .min()
    }

    /// Movement history with filtering, search, sorting and pagination
    pub fn list_movements(&self, query: &MovementQuery) -> PaginatedResponse<StockMovement> {
        let search = query
            .search
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_lowercase);

        let mut matches: Vec<&StockMovement> = self
            .movements
            .iter()
            .filter(|m| {
                query
                    .inventory_item_id
                    .is_none_or(|id| m.inventory_item.id == id)
            })
            .filter(|m| {
                query
                    .operation_type
                    .is_none_or(|op| m.operation_type == op)
            })
            .filter(|m| {
                search.as_deref().is_none_or(|needle| {
                    m.inventory_item.name.to_lowercase().contains(needle)
                        || m.performer.name.to_lowercase().contains(needle)
                })
            })
            .collect();

        match query.sort {
            SortOrder::Asc => matches.sort_by_key(|m| m.created_at),
            SortOrder::Desc => {
                matches.sort_by_key(|m| m.created_at);
                matches.reverse();
            }
        }

        let pagination = Pagination {
            page: query.pagination.page.max(1),
            per_page: query.pagination.per_page.max(1),
        };
        let total_items = matches.len() as u64;
        let skip = (pagination.page as usize - 1) * pagination.per_page as usize;
        let data: Vec<StockMovement> = matches
            .into_iter()
            .skip(skip)
            .take(pagination.per_page as usize)
            .cloned()
            .collect();

        PaginatedResponse {
            data,
            pagination: PaginationMeta::new(total_items, &pagination),
        }
    }

    pub fn movement(&self, id: Uuid) -> Option<&StockMovement> {
        self.movements.iter().find(|m| m.id == id)
    }

    /// Totals for one item across its full ledger history
    pub fn stock_summary(&self, item_id: Uuid) -> InventoryResult<StockSummary> {
        let item = self
            .item(item_id)
            .ok_or_else(|| InventoryError::NotFound("Inventory item".to_string()))?;

        let mut total_in = Decimal::ZERO;
        let mut total_out = Decimal::ZERO;
        for movement in self
            .movements
            .iter()
            .filter(|m| m.inventory_item.id == item_id)
        {
            match movement.operation_type {
                OperationType::Add => total_in += movement.quantity_in_base_units,
                OperationType::Reduce => total_out += movement.quantity_in_base_units,
            }
        }

        Ok(StockSummary {
            total_in,
            total_out,
            balance: item.current_stock_in_base_units,
        })
    }

    /// Items whose stock has fallen to or below their low-stock threshold
    pub fn low_stock_items(&self) -> Vec<&InventoryItem> {
        self.items()
            .filter(|i| i.status == ItemStatus::Active && i.is_low_stock())
            .collect()
    }
}
