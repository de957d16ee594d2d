//! 採購單模型

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::lenient;
use crate::money::{line_total, sum_money};

/// 採購單產生模式
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderMode {
    /// 僅產生採購單
    #[default]
    Draft,
    /// 產生採購單並立即入庫
    Receiving,
}

/// 採購單明細
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderLine {
    #[serde(default, deserialize_with = "lenient::text")]
    pub item: String,

    #[serde(default, deserialize_with = "lenient::text")]
    pub unit: String,

    /// 採購數量
    #[serde(default, deserialize_with = "lenient::decimal")]
    pub quantity: Decimal,

    #[serde(default, deserialize_with = "lenient::decimal")]
    pub unit_cost: Decimal,

    /// 小計 = round(數量 × 單位成本, 2)
    #[serde(default, deserialize_with = "lenient::decimal")]
    pub total_cost: Decimal,
}

impl OrderLine {
    /// 創建新的採購明細（小計由數量與單位成本計算）
    pub fn new(item: &str, unit: &str, quantity: Decimal, unit_cost: Decimal) -> Self {
        Self {
            item: item.to_string(),
            unit: unit.to_string(),
            quantity,
            unit_cost,
            total_cost: line_total(quantity, unit_cost),
        }
    }
}

/// 採購單（建立後不可變）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PurchaseOrder {
    /// 採購單編號（`PO-<毫秒時間戳>`）
    #[serde(default, deserialize_with = "lenient::text")]
    pub id: String,

    /// 建立時間（ISO-8601）
    pub date: DateTime<Utc>,

    #[serde(default, deserialize_with = "lenient::count")]
    pub total_items: usize,

    #[serde(default, deserialize_with = "lenient::decimal")]
    pub total_order_value: Decimal,

    #[serde(default, deserialize_with = "lenient::seq")]
    pub items: Vec<OrderLine>,
}

impl PurchaseOrder {
    /// 創建新的採購單
    ///
    /// 明細數與總金額一律由明細重新計算。
    pub fn new(id: String, date: DateTime<Utc>, items: Vec<OrderLine>) -> Self {
        let total_order_value = sum_money(items.iter().map(|line| line.total_cost));
        Self {
            id,
            date,
            total_items: items.len(),
            total_order_value,
            items,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}
