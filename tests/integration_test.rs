//! 集成測試

use ibp::ibp_core::{RequirementLine, StockAlert};
use ibp::prelude::*;
use rstest::rstest;
use rust_decimal::Decimal;

fn dec(value: &str) -> Decimal {
    value.parse().unwrap()
}

fn latte() -> Recipe {
    Recipe::new("Latte".to_string(), Vec::new()).with_ingredient("Milk", "L", dec("0.2"))
}

/// 建立基本情境：配方、採購價、損益與需求（Latte × 100）
fn seed<S: DocumentStore>(service: &PlanningService<S>) {
    service.upsert_recipe(latte()).unwrap();
    service
        .save_purchase_prices(vec![PurchasePrice::new("Milk", "L", dec("1.5"))])
        .unwrap();
    service
        .save_pnl(
            PnlState::new(Decimal::from(1000), dec("0.3"), dec("0.1"))
                .with_fixed("Rent", Decimal::from(200)),
        )
        .unwrap();
    service
        .save_demand(vec![DemandEntry::new("Latte".to_string(), Decimal::from(100))])
        .unwrap();
}

fn memory_service() -> PlanningService<MemoryStore> {
    PlanningService::new(MemoryStore::new(), PlanningConfig::default())
}

#[test]
fn test_latte_scenario_end_to_end() {
    let service = memory_service();
    seed(&service);

    // 1. 採購需求
    let purchasing = service.purchasing().unwrap();
    assert_eq!(purchasing.items.len(), 1);
    let milk = purchasing.line("Milk").unwrap();
    assert_eq!(milk.unit, "L");
    assert_eq!(milk.required, Decimal::from(20));
    assert_eq!(milk.unit_cost, dec("1.5"));
    assert_eq!(milk.total_cost, Decimal::from(30));
    assert_eq!(purchasing.total_materials_cost, Decimal::from(30));

    // 2. 損益：1000 - 300 - 100 - 30 = 570；570 - 200 = 370
    let pnl = service.pnl().unwrap();
    assert_eq!(pnl.materials_cost, Decimal::from(30));
    assert_eq!(pnl.fixed_total, Decimal::from(200));
    assert_eq!(pnl.gross_margin, Decimal::from(570));
    assert_eq!(pnl.net_profit, Decimal::from(370));
}

#[test]
fn test_inventory_alert_and_receiving_order() {
    let service = memory_service();
    seed(&service);
    service
        .save_inventory(vec![InventoryRecord::new(
            "Milk",
            "L",
            Decimal::from(5),
            Decimal::from(10),
        )])
        .unwrap();

    let report = service.inventory();
    let row = &report.items[0];
    assert_eq!(row.required, Decimal::from(20));
    assert_eq!(row.suggested_purchase, Decimal::from(25));
    assert_eq!(row.alert, StockAlert::LowStock);

    let order = service.generate_purchase_order(OrderMode::Receiving).unwrap();
    assert_eq!(order.total_items, 1);
    assert_eq!(order.items[0].quantity, Decimal::from(25));
    assert_eq!(order.total_order_value, dec("37.5"));

    // 收貨後庫存增加、建議採購量歸零
    let records = service.inventory_records();
    assert_eq!(records[0].stock, Decimal::from(30));
    assert_eq!(records[0].suggested_purchase, Some(Decimal::ZERO));
    assert_eq!(records[0].alert, Some(StockAlert::Ok));

    assert_eq!(service.current_purchase_order().unwrap().id, order.id);
}

#[test]
fn test_draft_order_leaves_inventory() {
    let service = memory_service();
    seed(&service);
    service
        .save_inventory(vec![InventoryRecord::new(
            "Milk",
            "L",
            Decimal::from(5),
            Decimal::from(10),
        )])
        .unwrap();

    service.generate_purchase_order(OrderMode::Draft).unwrap();

    assert_eq!(service.inventory_records()[0].stock, Decimal::from(5));
}

#[test]
fn test_order_falls_back_to_purchasing_document() {
    let service = memory_service();
    seed(&service);

    // 沒有庫存紀錄時以採購需求建立採購單
    let order = service.generate_purchase_order(OrderMode::Draft).unwrap();

    assert_eq!(order.items.len(), 1);
    assert_eq!(order.items[0].quantity, Decimal::from(20));
    assert_eq!(order.total_order_value, Decimal::from(30));
}

#[test]
fn test_manual_to_buy_drives_order() {
    let service = memory_service();
    seed(&service);

    let mut edited = service.purchasing().unwrap();
    edited.items[0] = edited.items[0].clone().with_to_buy(Decimal::from(8));
    service.save_purchasing(edited).unwrap();

    let order = service.generate_purchase_order(OrderMode::Draft).unwrap();

    assert_eq!(order.items.len(), 1);
    assert_eq!(order.items[0].item, "Milk");
    assert_eq!(order.items[0].quantity, Decimal::from(8));
    assert_eq!(order.total_order_value, Decimal::from(12));
}

#[test]
fn test_manual_purchasing_line_needs_item() {
    let service = memory_service();
    let document = PurchasingDocument::new(
        vec![RequirementLine::new("", "L", Decimal::ONE, Decimal::ONE)],
        Decimal::ZERO,
    );

    let err = service.save_purchasing(document).unwrap_err();

    assert_eq!(err.field(), Some("items[0].item"));
}

#[test]
fn test_empty_store_produces_empty_order() {
    let service = memory_service();

    let order = service.generate_purchase_order(OrderMode::Draft).unwrap();

    assert!(order.is_empty());
    assert_eq!(order.total_order_value, Decimal::ZERO);
    assert_eq!(service.purchase_order_history().len(), 1);
}

#[test]
fn test_order_history_newest_first() {
    let service = memory_service();
    seed(&service);

    let first = service.generate_purchase_order(OrderMode::Draft).unwrap();
    let second = service.generate_purchase_order(OrderMode::Draft).unwrap();
    assert_ne!(first.id, second.id);

    let history = service.purchase_order_history();
    assert_eq!(history.len(), 2);
    assert_eq!(history[0].id, second.id);
    assert_eq!(history[1].id, first.id);

    assert_eq!(service.purchase_order(&first.id).unwrap(), first);
}

#[test]
fn test_order_write_failure_is_surfaced() {
    let service = memory_service();
    seed(&service);
    service.store().reject_writes(Collection::PurchaseOrderHistory);

    let err = service.generate_purchase_order(OrderMode::Draft).unwrap_err();

    assert!(matches!(err, IbpError::Storage(_)));
}

#[test]
fn test_failed_recalculation_keeps_upstream_write() {
    let service = memory_service();
    seed(&service);
    service.store().reject_writes(Collection::Purchasing);

    let outcome = service
        .save_demand(vec![DemandEntry::new("Latte".to_string(), Decimal::from(50))])
        .unwrap();

    assert!(outcome.is_failed());
    assert_eq!(service.demand()[0].quantity, Decimal::from(50));
}

#[rstest]
#[case(SalePriceInput::new(Some("SKU-NEW"), None, Some(Decimal::from(4))), "name")]
#[case(SalePriceInput::new(None, None, Some(Decimal::from(4))), "name")]
#[case(SalePriceInput::new(None, Some("Mocha"), Some(Decimal::from(-1))), "unitPrice")]
fn test_sale_price_validation_names_field(#[case] input: SalePriceInput, #[case] field: &str) {
    let service = memory_service();

    let err = service.upsert_sale_price(input).unwrap_err();

    assert_eq!(err.field(), Some(field));
    assert!(service.sale_prices().is_empty());
}

#[test]
fn test_bulk_sale_price_rejected_as_a_whole() {
    let service = memory_service();

    let err = service
        .bulk_upsert_sale_prices(vec![
            SalePriceInput::new(None, Some("Latte"), Some(Decimal::from(4))),
            SalePriceInput::new(Some("SKU-GHOST"), None, None),
        ])
        .unwrap_err();

    assert_eq!(err.field(), Some("rows[1].name"));
    assert!(service.sale_prices().is_empty());
}

#[test]
fn test_sale_price_change_refreshes_monthly_sales() {
    let service = memory_service();
    seed(&service);

    let outcome = service
        .upsert_sale_price(SalePriceInput::new(None, Some("Latte"), Some(Decimal::from(4))))
        .unwrap();

    let report = outcome.report().unwrap();
    assert!(report.revenue_refreshed);
    assert_eq!(report.pnl.monthly_sales, Decimal::from(400));

    // 既有 SKU 未提供名稱時保留原名稱
    service
        .upsert_sale_price(SalePriceInput::new(Some("SKU-LATTE"), None, Some(Decimal::from(5))))
        .unwrap();
    let prices = service.sale_prices();
    assert_eq!(prices.len(), 1);
    assert_eq!(prices[0].name, "Latte");
    assert_eq!(prices[0].unit_price, Decimal::from(5));
}

#[test]
fn test_pricing_margin() {
    let service = memory_service();
    seed(&service);
    service
        .upsert_sale_price(SalePriceInput::new(None, Some("Latte"), Some(Decimal::from(4))))
        .unwrap();
    service
        .upsert_sale_price(SalePriceInput::new(None, Some("Water"), Some(Decimal::ZERO)))
        .unwrap();

    let report = service.pricing();

    let latte = report.items.iter().find(|row| row.name == "Latte").unwrap();
    assert_eq!(latte.unit_cost, dec("0.3"));
    assert_eq!(latte.margin_pct, dec("92.5"));

    let water = report.items.iter().find(|row| row.name == "Water").unwrap();
    assert_eq!(water.margin_pct, Decimal::ZERO);
}

#[test]
fn test_forecast_apply_replaces_demand() {
    let service = memory_service();
    seed(&service);

    let kept = service
        .save_sales_history(vec![
            SalesHistoryRow::new("Latte", "2024-01-01", Decimal::from(10)),
            SalesHistoryRow::new("Latte", "2024-02-01", Decimal::from(20)),
            SalesHistoryRow::new("", "2024-03-01", Decimal::from(99)),
        ])
        .unwrap();
    assert_eq!(kept, 2);

    let preview = service.forecast(None, false).unwrap();
    assert_eq!(preview.window, 4);
    assert!(!preview.applied);
    assert_eq!(service.demand()[0].quantity, Decimal::from(100));

    let result = service.forecast(None, true).unwrap();
    assert_eq!(
        result.forecast,
        vec![DemandEntry::new("Latte".to_string(), Decimal::from(15))]
    );
    assert!(result.recalculation.as_ref().unwrap().is_completed());

    assert_eq!(service.demand(), result.forecast);
    assert_eq!(
        service.purchasing().unwrap().total_materials_cost,
        Decimal::new(45, 1)
    );
}

#[test]
fn test_what_if_preview_then_apply() {
    let service = memory_service();
    seed(&service);
    let overrides = WhatIfOverrides::default().with_sales_uplift(Decimal::from(10));

    let preview = service.what_if(&overrides).unwrap();
    assert_eq!(preview.sales, Decimal::from(1100));
    // 1100 - 330 - 110 - 30 = 630
    assert_eq!(preview.gross, Decimal::from(630));
    assert_eq!(service.pnl().unwrap().monthly_sales, Decimal::from(1000));

    let applied = service.apply_what_if(&overrides).unwrap();
    assert_eq!(applied.monthly_sales, Decimal::from(1100));
    assert_eq!(applied.net_profit, Decimal::from(430));
    assert_eq!(service.pnl().unwrap().net_profit, Decimal::from(430));
}

#[test]
fn test_deferred_writes_recalculate_once() {
    let service = memory_service();
    service.defer_recalculation();
    seed(&service);
    assert!(service.store().snapshot(Collection::Purchasing).is_none());

    let outcome = service.flush();

    let report = outcome.report().unwrap();
    assert_eq!(
        report.sources,
        vec![
            Collection::Bom,
            Collection::Demand,
            Collection::PurchasePrices,
            Collection::Pnl
        ]
    );
    assert_eq!(report.pnl.net_profit, Decimal::from(370));
}

#[test]
fn test_integrated_summary() {
    let service = memory_service();
    seed(&service);
    service
        .upsert_sale_price(SalePriceInput::new(None, Some("Latte"), Some(Decimal::from(4))))
        .unwrap();

    let summary = service.integrated_summary();

    assert_eq!(summary.total_revenue, Decimal::from(400));
    assert_eq!(summary.fixed_total, Decimal::from(200));
    assert_eq!(summary.net_profit, summary.gross_margin - summary.fixed_total);
}

#[test]
fn test_json_file_store_persists_between_services() {
    let dir = tempfile::tempdir().unwrap();
    let config = PlanningConfig::new(dir.path());

    {
        let service = PlanningService::new(JsonFileStore::new(dir.path()), config.clone());
        seed(&service);
        service.generate_purchase_order(OrderMode::Draft).unwrap();
    }

    let store = JsonFileStore::new(dir.path());
    assert!(store.path_of(Collection::Pnl).exists());
    assert!(store.path_of(Collection::PurchaseOrderHistory).exists());

    let service = PlanningService::new(store, config);
    let pnl: PnlState = service.store().read_or(Collection::Pnl, PnlState::default());
    assert_eq!(pnl.net_profit, Decimal::from(370));
    assert_eq!(service.purchase_order_history().len(), 1);

    let csv = OrderExporter::to_csv(&service.current_purchase_order().unwrap()).unwrap();
    assert!(csv.starts_with("Item,Unit,Quantity,Unit Cost,Total Cost"));
}

#[test]
fn test_corrupt_document_reads_as_empty() {
    let dir = tempfile::tempdir().unwrap();
    let store = JsonFileStore::new(dir.path());
    std::fs::write(store.path_of(Collection::Bom), "{ not json").unwrap();
    let service = PlanningService::new(store, PlanningConfig::new(dir.path()));

    assert!(service.recipes().is_empty());
    assert_eq!(service.purchasing().unwrap().total_materials_cost, Decimal::ZERO);
}
