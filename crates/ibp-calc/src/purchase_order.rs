//! 採購單產生

use std::sync::atomic::{AtomicI64, Ordering};

use chrono::{DateTime, Utc};
use ibp_core::{InventoryRecord, InventoryRow, OrderLine, PurchaseOrder, PurchasePrice, PurchasingDocument};
use rust_decimal::Decimal;

/// 最近一次核發的採購單時間戳（毫秒）
static LAST_ORDER_MILLIS: AtomicI64 = AtomicI64::new(0);

/// 採購單產生器
pub struct PurchaseOrderGenerator;

impl PurchaseOrderGenerator {
    /// 以目前時間產生採購單
    pub fn generate(
        rows: &[InventoryRow],
        purchase_prices: &[PurchasePrice],
        fallback: Option<&PurchasingDocument>,
    ) -> PurchaseOrder {
        let now = Utc::now();
        Self::generate_at(Self::next_order_id(now), now, rows, purchase_prices, fallback)
    }

    /// 以指定編號與時間產生採購單
    pub fn generate_at(
        id: String,
        date: DateTime<Utc>,
        rows: &[InventoryRow],
        purchase_prices: &[PurchasePrice],
        fallback: Option<&PurchasingDocument>,
    ) -> PurchaseOrder {
        let items = Self::select_lines(rows, purchase_prices, fallback);
        let order = PurchaseOrder::new(id, date, items);

        tracing::debug!(
            "產生採購單 {}：{} 項，總金額 {}",
            order.id,
            order.total_items,
            order.total_order_value
        );

        order
    }

    /// 選取採購明細
    ///
    /// 優先採用建議採購量 > 0 的庫存列（以採購價計價）；若沒有，
    /// 改用採購需求文件（數量 toBuy → required，單價沿用文件內的單位成本）。
    pub fn select_lines(
        rows: &[InventoryRow],
        purchase_prices: &[PurchasePrice],
        fallback: Option<&PurchasingDocument>,
    ) -> Vec<OrderLine> {
        let suggested: Vec<OrderLine> = rows
            .iter()
            .filter(|row| row.suggested_purchase > Decimal::ZERO)
            .map(|row| {
                OrderLine::new(
                    &row.item,
                    &row.unit,
                    row.suggested_purchase,
                    PurchasePrice::cost_of(purchase_prices, &row.item),
                )
            })
            .collect();

        if !suggested.is_empty() {
            return suggested;
        }

        let Some(document) = fallback else {
            return Vec::new();
        };

        tracing::debug!("沒有建議採購量，改用採購需求文件（{} 項）", document.items.len());

        document
            .items
            .iter()
            .map(|line| OrderLine::new(&line.item, &line.unit, line.order_quantity(), line.unit_cost))
            .collect()
    }

    /// 產生採購單編號 `PO-<毫秒時間戳>`，同一行程內嚴格遞增
    pub fn next_order_id(now: DateTime<Utc>) -> String {
        let now_millis = now.timestamp_millis();
        let previous = LAST_ORDER_MILLIS
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |last| {
                Some(now_millis.max(last + 1))
            })
            .unwrap_or_else(|last| last);
        format!("PO-{}", now_millis.max(previous + 1))
    }

    /// 收貨入庫：依採購單增加庫存、建議採購量歸零並重新判斷警示
    ///
    /// 庫存中沒有的原料會新增一筆安全庫存為 0 的紀錄。
    pub fn receive(records: &mut Vec<InventoryRecord>, order: &PurchaseOrder) {
        for line in &order.items {
            match records.iter_mut().find(|record| record.item == line.item) {
                Some(record) => record.receive(line.quantity),
                None => {
                    let mut record =
                        InventoryRecord::new(&line.item, &line.unit, Decimal::ZERO, Decimal::ZERO);
                    record.receive(line.quantity);
                    records.push(record);
                }
            }
        }

        tracing::debug!("採購單 {} 已入庫：{} 項", order.id, order.items.len());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use ibp_core::money::round_money;
    use ibp_core::{RequirementLine, StockAlert};
    use proptest::prelude::*;

    fn row(item: &str, suggested: i64) -> InventoryRow {
        InventoryRow {
            item: item.to_string(),
            unit: "L".to_string(),
            stock: Decimal::from(5),
            safety_stock: Decimal::from(10),
            required: Decimal::from(20),
            alert: StockAlert::LowStock,
            suggested_purchase: Decimal::from(suggested),
        }
    }

    fn fixed_date() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 1, 8, 0, 0).unwrap()
    }

    #[test]
    fn test_suggested_lines_priced_from_purchase_prices() {
        let rows = vec![row("Milk", 25), row("Sugar", 0)];
        let prices = vec![PurchasePrice::new("Milk", "L", Decimal::new(15, 1))];

        let order =
            PurchaseOrderGenerator::generate_at("PO-1".into(), fixed_date(), &rows, &prices, None);

        assert_eq!(order.total_items, 1);
        assert_eq!(order.items[0].quantity, Decimal::from(25));
        assert_eq!(order.items[0].total_cost, Decimal::new(375, 1));
        assert_eq!(order.total_order_value, Decimal::new(375, 1));
    }

    #[test]
    fn test_fallback_to_purchasing_document() {
        let document = PurchasingDocument::new(
            vec![
                RequirementLine::new("Milk", "L", Decimal::from(20), Decimal::new(15, 1)),
                RequirementLine::new("Beans", "kg", Decimal::from(2), Decimal::from(20))
                    .with_to_buy(Decimal::from(3)),
            ],
            Decimal::from(999),
        );

        let order = PurchaseOrderGenerator::generate_at(
            "PO-2".into(),
            fixed_date(),
            &[row("Milk", 0)],
            &[],
            Some(&document),
        );

        assert_eq!(order.total_items, 2);
        assert_eq!(order.items[1].quantity, Decimal::from(3));
        // 30 + 60，不採用文件內的總額
        assert_eq!(order.total_order_value, Decimal::from(90));
    }

    #[test]
    fn test_empty_inputs_give_empty_order() {
        let order = PurchaseOrderGenerator::generate(&[], &[], None);
        assert!(order.is_empty());
        assert_eq!(order.total_order_value, Decimal::ZERO);
        assert!(order.id.starts_with("PO-"));
    }

    #[test]
    fn test_order_ids_strictly_increase() {
        let now = fixed_date();
        let first = PurchaseOrderGenerator::next_order_id(now);
        let second = PurchaseOrderGenerator::next_order_id(now);

        let millis = |id: &str| id.trim_start_matches("PO-").parse::<i64>().unwrap();
        assert!(millis(&second) > millis(&first));
    }

    #[test]
    fn test_receive_updates_and_appends() {
        let mut records = vec![InventoryRecord::new("Milk", "L", Decimal::from(5), Decimal::from(10))];
        let order = PurchaseOrder::new(
            "PO-3".into(),
            fixed_date(),
            vec![
                OrderLine::new("Milk", "L", Decimal::from(25), Decimal::ONE),
                OrderLine::new("Cups", "pcs", Decimal::from(100), Decimal::ONE),
            ],
        );

        PurchaseOrderGenerator::receive(&mut records, &order);

        assert_eq!(records[0].stock, Decimal::from(30));
        assert_eq!(records[0].suggested_purchase, Some(Decimal::ZERO));
        assert_eq!(records[0].alert, Some(StockAlert::Ok));
        assert_eq!(records[1].item, "Cups");
        assert_eq!(records[1].stock, Decimal::from(100));
        assert_eq!(records[1].safety_stock, Decimal::ZERO);
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        #[test]
        fn prop_order_total_matches_lines(
            quantities in proptest::collection::vec((1i64..=1000i64).prop_map(|n| Decimal::new(n, 1)), 1..8),
            cost in (0i64..=100000i64).prop_map(|n| Decimal::new(n, 4))
        ) {
            let lines: Vec<RequirementLine> = quantities
                .iter()
                .enumerate()
                .map(|(i, q)| RequirementLine::new(&format!("Item{}", i), "kg", *q, cost))
                .collect();
            let document = PurchasingDocument::new(lines, Decimal::from(-1));

            let order = PurchaseOrderGenerator::generate_at(
                "PO-P".into(),
                fixed_date(),
                &[],
                &[],
                Some(&document),
            );

            let expected: Decimal = order
                .items
                .iter()
                .map(|line| round_money(line.quantity * line.unit_cost))
                .sum();
            prop_assert_eq!(order.total_order_value, round_money(expected));
        }
    }
}
