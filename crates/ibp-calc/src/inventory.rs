//! 庫存評估

use ibp_core::{InventoryRecord, InventoryRow, RequirementLine, StockAlert};
use serde::Serialize;

/// 庫存評估報表
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InventoryReport {
    pub items: Vec<InventoryRow>,
    pub low_stock_count: usize,
    pub out_of_stock_count: usize,
}

/// 庫存評估器（唯讀投影，不修改庫存紀錄）
pub struct InventoryEvaluator;

impl InventoryEvaluator {
    /// 依原料需求評估每筆庫存的警示與建議採購量
    pub fn evaluate(records: &[InventoryRecord], requirements: &[RequirementLine]) -> InventoryReport {
        let items: Vec<InventoryRow> = records
            .iter()
            .map(|record| Self::evaluate_record(record, requirements))
            .collect();

        let low_stock_count = items
            .iter()
            .filter(|row| row.alert == StockAlert::LowStock)
            .count();
        let out_of_stock_count = items
            .iter()
            .filter(|row| row.alert == StockAlert::OutOfStock)
            .count();

        tracing::debug!(
            "庫存評估完成：{} 筆，低庫存 {}，缺貨 {}",
            items.len(),
            low_stock_count,
            out_of_stock_count
        );

        InventoryReport {
            items,
            low_stock_count,
            out_of_stock_count,
        }
    }

    /// 評估單筆庫存
    pub fn evaluate_record(record: &InventoryRecord, requirements: &[RequirementLine]) -> InventoryRow {
        let required = requirements
            .iter()
            .find(|line| line.item == record.item)
            .map(|line| line.required)
            .unwrap_or_default();

        InventoryRow {
            item: record.item.clone(),
            unit: record.unit.clone(),
            stock: record.stock,
            safety_stock: record.safety_stock,
            required,
            alert: StockAlert::classify(record.stock, record.safety_stock),
            suggested_purchase: record.deficit(required),
        }
    }
}
