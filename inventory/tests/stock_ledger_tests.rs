//! Stock ledger integration tests
//!
//! Exercises the full add/reduce flow against registered items, including
//! balance clamping, expiry tracking, low-stock detection and the
//! movement-history queries.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use uuid::Uuid;

use cmho_inventory::convert::{render_quantity_string, DisplayMode, QuantityInput, Sign};
use cmho_inventory::ledger::{AddStockInput, MovementQuery, ReduceStockInput, StockLedger};
use cmho_inventory::models::{
    InventoryItem, OperationType, PerformerSnapshot, SetupStatus, UnitLevel,
};
use cmho_inventory::types::{Pagination, SortOrder};
use cmho_inventory::InventoryError;

fn init_tracing() {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();
}

fn drug_units() -> Vec<UnitLevel> {
    vec![
        UnitLevel::new("pack", "Pack", "Packs", Some(Decimal::ONE)),
        UnitLevel::new("card", "Card", "Cards", Some(Decimal::from(10))),
        UnitLevel::new("tablet", "Tablet", "Tablets", Some(Decimal::from(10))),
    ]
}

fn ready_item(name: &str) -> InventoryItem {
    let mut item = InventoryItem::new(name, "Drug", drug_units());
    item.setup_status = SetupStatus::Ready;
    item.low_stock_value = Some(Decimal::from(20));
    item
}

fn performer(name: &str) -> PerformerSnapshot {
    PerformerSnapshot {
        id: Uuid::new_v4(),
        name: name.to_string(),
    }
}

fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).unwrap()
}

fn add_input(item_id: Uuid, quantity: i64, expiry: NaiveDate) -> AddStockInput {
    AddStockInput {
        inventory_item_id: item_id,
        supplier: None,
        cost_price: Decimal::from(5),
        selling_price: Decimal::from(8),
        expiry_date: expiry,
        quantity_in_base_units: Decimal::from(quantity),
    }
}

fn reduce_input(item_id: Uuid, quantity: i64) -> ReduceStockInput {
    ReduceStockInput {
        inventory_item_id: item_id,
        supplier: None,
        cost_price: None,
        selling_price: None,
        expiry_date: None,
        quantity_in_base_units: Decimal::from(quantity),
    }
}

#[test]
fn test_add_then_reduce_flow() {
    init_tracing();
    let mut ledger = StockLedger::new();
    let item = ready_item("Paracetamol");
    let item_id = item.id;
    ledger.register_item(item);

    let added = ledger
        .add_stock(add_input(item_id, 235, date(2027, 5, 14)), performer("Nurse Joy"))
        .unwrap();
    assert_eq!(added.operation_type, OperationType::Add);
    assert_eq!(added.balance, Decimal::from(235));
    assert!(added.prices.is_some());

    let reduced = ledger
        .reduce_stock(reduce_input(item_id, 35), performer("Nurse Joy"))
        .unwrap();
    assert_eq!(reduced.operation_type, OperationType::Reduce);
    assert_eq!(reduced.balance, Decimal::from(200));
    assert!(reduced.prices.is_none());

    let item = ledger.item(item_id).unwrap();
    assert_eq!(item.current_stock_in_base_units, Decimal::from(200));

    let summary = ledger.stock_summary(item_id).unwrap();
    assert_eq!(summary.total_in, Decimal::from(235));
    assert_eq!(summary.total_out, Decimal::from(35));
    assert_eq!(summary.balance, Decimal::from(200));
}

#[test]
fn test_reduce_clamps_balance_at_zero() {
    init_tracing();
    let mut ledger = StockLedger::new();
    let item = ready_item("Ibuprofen");
    let item_id = item.id;
    ledger.register_item(item);

    ledger
        .add_stock(add_input(item_id, 50, date(2027, 1, 1)), performer("Admin"))
        .unwrap();
    let reduced = ledger
        .reduce_stock(reduce_input(item_id, 80), performer("Admin"))
        .unwrap();

    // The movement records the requested quantity but the balance floors at 0
    assert_eq!(reduced.quantity_in_base_units, Decimal::from(80));
    assert_eq!(reduced.balance, Decimal::ZERO);
    assert_eq!(
        ledger.item(item_id).unwrap().current_stock_in_base_units,
        Decimal::ZERO
    );
}

#[test]
fn test_draft_item_cannot_hold_stock() {
    let mut ledger = StockLedger::new();
    let item = InventoryItem::new("Unfinished", "Drug", drug_units());
    let item_id = item.id;
    ledger.register_item(item);

    let err = ledger
        .add_stock(add_input(item_id, 10, date(2027, 1, 1)), performer("Admin"))
        .unwrap_err();
    assert!(matches!(err, InventoryError::InvalidStateTransition(_)));
}

#[test]
fn test_unknown_item_is_not_found() {
    let mut ledger = StockLedger::new();
    let err = ledger
        .add_stock(
            add_input(Uuid::new_v4(), 10, date(2027, 1, 1)),
            performer("Admin"),
        )
        .unwrap_err();
    assert!(matches!(err, InventoryError::NotFound(_)));
}

#[test]
fn test_non_positive_quantity_is_rejected() {
    let mut ledger = StockLedger::new();
    let item = ready_item("Paracetamol");
    let item_id = item.id;
    ledger.register_item(item);

    let err = ledger
        .add_stock(add_input(item_id, 0, date(2027, 1, 1)), performer("Admin"))
        .unwrap_err();
    assert!(matches!(err, InventoryError::Validation { .. }));

    let err = ledger
        .reduce_stock(reduce_input(item_id, -5), performer("Admin"))
        .unwrap_err();
    assert!(matches!(err, InventoryError::Validation { .. }));
}

#[test]
fn test_expiry_tracking_across_movements() {
    init_tracing();
    let mut ledger = StockLedger::new();
    let item = ready_item("Amoxicillin");
    let item_id = item.id;
    ledger.register_item(item);

    // Expiry dates are normalized to the first of their month
    ledger
        .add_stock(add_input(item_id, 100, date(2027, 6, 23)), performer("Admin"))
        .unwrap();
    assert_eq!(
        ledger.item(item_id).unwrap().earliest_expiry_date,
        Some(date(2027, 6, 1))
    );

    // An earlier expiry displaces the current one
    ledger
        .add_stock(add_input(item_id, 50, date(2027, 2, 10)), performer("Admin"))
        .unwrap();
    assert_eq!(
        ledger.item(item_id).unwrap().earliest_expiry_date,
        Some(date(2027, 2, 1))
    );

    // A later expiry does not
    ledger
        .add_stock(add_input(item_id, 50, date(2027, 9, 1)), performer("Admin"))
        .unwrap();
    assert_eq!(
        ledger.item(item_id).unwrap().earliest_expiry_date,
        Some(date(2027, 2, 1))
    );

    // Reducing with stock remaining recomputes from add history
    ledger
        .reduce_stock(reduce_input(item_id, 60), performer("Admin"))
        .unwrap();
    assert_eq!(
        ledger.item(item_id).unwrap().earliest_expiry_date,
        Some(date(2027, 2, 1))
    );

    // Draining the item clears the expiry
    ledger
        .reduce_stock(reduce_input(item_id, 500), performer("Admin"))
        .unwrap();
    assert_eq!(ledger.item(item_id).unwrap().earliest_expiry_date, None);
}

#[test]
fn test_list_movements_filters_and_pagination() {
    init_tracing();
    let mut ledger = StockLedger::new();
    let paracetamol = ready_item("Paracetamol");
    let ibuprofen = ready_item("Ibuprofen");
    let paracetamol_id = paracetamol.id;
    let ibuprofen_id = ibuprofen.id;
    ledger.register_item(paracetamol);
    ledger.register_item(ibuprofen);

    for _ in 0..3 {
        ledger
            .add_stock(
                add_input(paracetamol_id, 10, date(2027, 1, 1)),
                performer("Alice"),
            )
            .unwrap();
    }
    ledger
        .reduce_stock(reduce_input(paracetamol_id, 5), performer("Bob"))
        .unwrap();
    ledger
        .add_stock(add_input(ibuprofen_id, 20, date(2027, 1, 1)), performer("Bob"))
        .unwrap();

    // Filter by item
    let query = MovementQuery {
        inventory_item_id: Some(paracetamol_id),
        ..Default::default()
    };
    let page = ledger.list_movements(&query);
    assert_eq!(page.pagination.total_items, 4);

    // Filter by operation type
    let query = MovementQuery {
        operation_type: Some(OperationType::Reduce),
        ..Default::default()
    };
    let page = ledger.list_movements(&query);
    assert_eq!(page.pagination.total_items, 1);
    assert_eq!(page.data[0].performer.name, "Bob");

    // Case-insensitive search over item and performer names
    let query = MovementQuery {
        search: Some("ibupro".to_string()),
        ..Default::default()
    };
    assert_eq!(ledger.list_movements(&query).pagination.total_items, 1);

    let query = MovementQuery {
        search: Some("ALICE".to_string()),
        ..Default::default()
    };
    assert_eq!(ledger.list_movements(&query).pagination.total_items, 3);

    // Pagination windows the newest-first ordering
    let query = MovementQuery {
        pagination: Pagination {
            page: 1,
            per_page: 2,
        },
        ..Default::default()
    };
    let page = ledger.list_movements(&query);
    assert_eq!(page.data.len(), 2);
    assert_eq!(page.pagination.total_items, 5);
    assert_eq!(page.pagination.total_pages, 3);
    assert_eq!(page.data[0].inventory_item.name, "Ibuprofen");

    // Oldest-first flips the ordering
    let query = MovementQuery {
        sort: SortOrder::Asc,
        ..Default::default()
    };
    let page = ledger.list_movements(&query);
    assert_eq!(page.data[0].inventory_item.name, "Paracetamol");
}

#[test]
fn test_low_stock_items() {
    init_tracing();
    let mut ledger = StockLedger::new();
    let item = ready_item("Paracetamol");
    let item_id = item.id;
    ledger.register_item(item);

    ledger
        .add_stock(add_input(item_id, 100, date(2027, 1, 1)), performer("Admin"))
        .unwrap();
    assert!(ledger.low_stock_items().is_empty());

    // Threshold is 20; dropping to it flags the item
    ledger
        .reduce_stock(reduce_input(item_id, 80), performer("Admin"))
        .unwrap();
    let low: Vec<&str> = ledger
        .low_stock_items()
        .iter()
        .map(|i| i.name.as_str())
        .collect();
    assert_eq!(low, vec!["Paracetamol"]);
}

#[test]
fn test_form_to_ledger_to_badge() {
    init_tracing();
    let mut ledger = StockLedger::new();
    let item = ready_item("Paracetamol");
    let item_id = item.id;
    ledger.register_item(item);

    // A stock-entry form collects 2 packs, 3 cards, 5 tablets
    let units = drug_units();
    let inputs = vec![
        QuantityInput::new("pack", "2"),
        QuantityInput::new("card", "3"),
        QuantityInput::new("tablet", "5"),
    ];
    let total = cmho_inventory::convert::to_base_units(&inputs, &units);

    let movement = ledger
        .add_stock(
            AddStockInput {
                inventory_item_id: item_id,
                supplier: None,
                cost_price: Decimal::from(5),
                selling_price: Decimal::from(8),
                expiry_date: date(2027, 5, 1),
                quantity_in_base_units: total,
            },
            performer("Admin"),
        )
        .unwrap();

    // The badge renders the stored total back into the same breakdown
    let badge = render_quantity_string(
        movement.quantity_in_base_units,
        &units,
        DisplayMode::Full,
        Some(Sign::from(movement.operation_type)),
    );
    assert_eq!(badge, "+ 2 Packs, 3 Cards, 5 Tablets");
}
