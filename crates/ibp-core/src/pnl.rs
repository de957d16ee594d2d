//! 損益（P&L）模型

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::lenient;

/// 固定成本項目
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct FixedCost {
    #[serde(default, deserialize_with = "lenient::text")]
    #[validate(length(min = 1, message = "項目名稱不得為空"))]
    pub label: String,

    /// 金額（非數字視為 0）
    #[serde(default, deserialize_with = "lenient::decimal")]
    pub amount: Decimal,
}

impl FixedCost {
    /// 創建新的固定成本
    pub fn new(label: &str, amount: Decimal) -> Self {
        Self {
            label: label.to_string(),
            amount,
        }
    }
}

/// 損益狀態（全域唯一文件）
///
/// `materials_cost`、`fixed_total`、`gross_margin`、`net_profit` 為衍生欄位，
/// 每次寫入前由損益彙總器重新計算。
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct PnlState {
    /// 月營收
    #[serde(default, deserialize_with = "lenient::decimal")]
    pub monthly_sales: Decimal,

    /// 銷貨成本比例（0–1）
    #[serde(default, deserialize_with = "lenient::decimal")]
    #[validate(custom(function = "crate::non_negative"))]
    pub cogs_pct: Decimal,

    /// 外送成本比例（0–1）
    #[serde(default, deserialize_with = "lenient::decimal")]
    #[validate(custom(function = "crate::non_negative"))]
    pub delivery_pct: Decimal,

    /// 固定成本（保持輸入順序）
    #[serde(default, deserialize_with = "lenient::seq")]
    #[validate(nested)]
    pub fixed: Vec<FixedCost>,

    #[serde(default, deserialize_with = "lenient::decimal")]
    pub materials_cost: Decimal,

    #[serde(default, deserialize_with = "lenient::decimal")]
    pub fixed_total: Decimal,

    #[serde(default, deserialize_with = "lenient::decimal")]
    pub gross_margin: Decimal,

    #[serde(default, deserialize_with = "lenient::decimal")]
    pub net_profit: Decimal,
}

impl PnlState {
    /// 創建新的損益狀態（衍生欄位為 0）
    pub fn new(monthly_sales: Decimal, cogs_pct: Decimal, delivery_pct: Decimal) -> Self {
        Self {
            monthly_sales,
            cogs_pct,
            delivery_pct,
            ..Default::default()
        }
    }

    /// 建構器模式：添加固定成本
    pub fn with_fixed(mut self, label: &str, amount: Decimal) -> Self {
        self.fixed.push(FixedCost::new(label, amount));
        self
    }
}

/// 假設情境覆寫值
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WhatIfOverrides {
    /// 營收增減百分比（10 表示 +10%）
    #[serde(default, deserialize_with = "lenient::decimal")]
    pub sales_uplift_pct: Decimal,

    /// 覆寫銷貨成本比例（未提供時沿用損益狀態）
    #[serde(default, deserialize_with = "lenient::optional_decimal")]
    pub cogs_pct_override: Option<Decimal>,

    /// 覆寫外送成本比例
    #[serde(default, deserialize_with = "lenient::optional_decimal")]
    pub delivery_pct_override: Option<Decimal>,

    /// 原料成本倍數（未提供時為 1）
    #[serde(default, deserialize_with = "lenient::optional_decimal")]
    pub materials_multiplier: Option<Decimal>,
}

impl WhatIfOverrides {
    /// 建構器模式：設置營收增減百分比
    pub fn with_sales_uplift(mut self, pct: Decimal) -> Self {
        self.sales_uplift_pct = pct;
        self
    }

    /// 建構器模式：覆寫銷貨成本比例
    pub fn with_cogs_pct(mut self, pct: Decimal) -> Self {
        self.cogs_pct_override = Some(pct);
        self
    }

    /// 建構器模式：覆寫外送成本比例
    pub fn with_delivery_pct(mut self, pct: Decimal) -> Self {
        self.delivery_pct_override = Some(pct);
        self
    }

    /// 建構器模式：設置原料成本倍數
    pub fn with_materials_multiplier(mut self, multiplier: Decimal) -> Self {
        self.materials_multiplier = Some(multiplier);
        self
    }
}

/// 假設情境預覽（不持久化）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WhatIfPreview {
    pub sales: Decimal,
    pub cogs_pct: Decimal,
    pub delivery_pct: Decimal,
    pub materials: Decimal,
    pub gross: Decimal,
    pub net: Decimal,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_pnl_lenient_parse() {
        let state: PnlState = serde_json::from_value(json!({
            "monthlySales": "1000",
            "cogsPct": 0.3,
            "fixed": [{ "label": "Rent", "amount": "200" }, { "label": "Wifi", "amount": null }],
            "grossMargin": "bogus"
        }))
        .unwrap();

        assert_eq!(state.monthly_sales, Decimal::from(1000));
        assert_eq!(state.delivery_pct, Decimal::ZERO);
        assert_eq!(state.fixed[0].amount, Decimal::from(200));
        assert_eq!(state.fixed[1].amount, Decimal::ZERO);
        assert_eq!(state.gross_margin, Decimal::ZERO);
    }

    #[test]
    fn test_pnl_builder() {
        let state = PnlState::new(Decimal::from(1000), Decimal::new(3, 1), Decimal::new(1, 1))
            .with_fixed("Rent", Decimal::from(200));
        assert_eq!(state.fixed.len(), 1);
        assert!(state.validate().is_ok());
    }

    #[test]
    fn test_negative_pct_rejected() {
        let state = PnlState::new(Decimal::from(1000), Decimal::from(-1), Decimal::ZERO);
        assert!(state.validate().is_err());
    }

    #[test]
    fn test_overrides_default_to_none() {
        let overrides: WhatIfOverrides =
            serde_json::from_value(json!({ "salesUpliftPct": 10 })).unwrap();
        assert_eq!(overrides.sales_uplift_pct, Decimal::from(10));
        assert!(overrides.cogs_pct_override.is_none());
        assert!(overrides.materials_multiplier.is_none());
    }
}
