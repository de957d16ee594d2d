//! 庫存模型

use std::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::lenient;

/// 庫存警示
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StockAlert {
    #[serde(rename = "OK")]
    Ok,
    #[serde(rename = "Low Stock")]
    LowStock,
    #[serde(rename = "Out of Stock")]
    OutOfStock,
}

impl StockAlert {
    /// 依現有庫存與安全庫存判斷警示
    ///
    /// 缺貨優先於低庫存：庫存為 0 時一律為 `Out of Stock`。
    pub fn classify(stock: Decimal, safety_stock: Decimal) -> Self {
        if stock.is_zero() {
            StockAlert::OutOfStock
        } else if stock < safety_stock {
            StockAlert::LowStock
        } else {
            StockAlert::Ok
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            StockAlert::Ok => "OK",
            StockAlert::LowStock => "Low Stock",
            StockAlert::OutOfStock => "Out of Stock",
        }
    }
}

impl fmt::Display for StockAlert {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 庫存紀錄
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct InventoryRecord {
    /// 原料名稱
    #[serde(default, deserialize_with = "lenient::text")]
    #[validate(length(min = 1, message = "原料名稱不得為空"))]
    pub item: String,

    #[serde(default, deserialize_with = "lenient::text")]
    pub unit: String,

    /// 現有庫存
    #[serde(default, deserialize_with = "lenient::decimal")]
    #[validate(custom(function = "crate::non_negative"))]
    pub stock: Decimal,

    /// 安全庫存
    #[serde(default, deserialize_with = "lenient::decimal")]
    #[validate(custom(function = "crate::non_negative"))]
    pub safety_stock: Decimal,

    /// 收貨時寫回的警示（一般讀取不會持久化）
    #[serde(
        default,
        deserialize_with = "optional_alert",
        skip_serializing_if = "Option::is_none"
    )]
    pub alert: Option<StockAlert>,

    /// 收貨時寫回的建議採購量
    #[serde(
        default,
        deserialize_with = "lenient::optional_decimal",
        skip_serializing_if = "Option::is_none"
    )]
    pub suggested_purchase: Option<Decimal>,
}

impl InventoryRecord {
    /// 創建新的庫存紀錄
    pub fn new(item: &str, unit: &str, stock: Decimal, safety_stock: Decimal) -> Self {
        Self {
            item: item.to_string(),
            unit: unit.to_string(),
            stock,
            safety_stock,
            alert: None,
            suggested_purchase: None,
        }
    }

    /// 缺口 = max(0, 安全庫存 + 需求量 - 現有庫存)
    pub fn deficit(&self, required: Decimal) -> Decimal {
        self.safety_stock
            .saturating_add(required)
            .saturating_sub(self.stock)
            .max(Decimal::ZERO)
    }

    /// 收貨：增加庫存、建議採購量歸零並重新判斷警示
    pub fn receive(&mut self, quantity: Decimal) {
        self.stock = self.stock.saturating_add(quantity);
        self.suggested_purchase = Some(Decimal::ZERO);
        self.alert = Some(StockAlert::classify(self.stock, self.safety_stock));
    }
}

/// 無法辨識的警示字串視為未提供
fn optional_alert<'de, D>(deserializer: D) -> Result<Option<StockAlert>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(serde_json::from_value(value).ok())
}

/// 庫存評估結果列（讀取時計算，不持久化）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InventoryRow {
    pub item: String,
    pub unit: String,
    pub stock: Decimal,
    pub safety_stock: Decimal,
    /// 需求量（來自採購需求）
    pub required: Decimal,
    pub alert: StockAlert,
    /// 建議採購量
    pub suggested_purchase: Decimal,
}
