//! 採購需求模型

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::lenient;
use crate::money::{line_total, sum_money};

/// 採購需求列（需求計算結果，每次整批重算）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase", from = "RequirementRow")]
pub struct RequirementLine {
    /// 原料名稱
    #[validate(length(min = 1, message = "原料名稱不得為空"))]
    pub item: String,

    pub unit: String,

    /// 需求量
    #[validate(custom(function = "crate::non_negative"))]
    pub required: Decimal,

    /// 單位成本
    #[validate(custom(function = "crate::non_negative"))]
    pub unit_cost: Decimal,

    /// 總成本 = round(需求量 × 單位成本, 2)
    pub total_cost: Decimal,

    /// 手動指定的採購量（覆蓋需求量）
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(custom(function = "crate::non_negative"))]
    pub to_buy: Option<Decimal>,
}

impl RequirementLine {
    /// 創建新的採購需求列（總成本由需求量與單位成本計算）
    pub fn new(item: &str, unit: &str, required: Decimal, unit_cost: Decimal) -> Self {
        Self {
            item: item.to_string(),
            unit: unit.to_string(),
            required,
            unit_cost,
            total_cost: line_total(required, unit_cost),
            to_buy: None,
        }
    }

    /// 建構器模式：設置手動採購量
    pub fn with_to_buy(mut self, to_buy: Decimal) -> Self {
        self.to_buy = Some(to_buy);
        self
    }

    /// 下單數量解析順序：toBuy → required
    pub fn order_quantity(&self) -> Decimal {
        self.to_buy.unwrap_or(self.required)
    }
}

/// 採購需求文件列的原始形狀（相容 `toBuy`、`cost` 等欄位名稱）
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RequirementRow {
    #[serde(default, deserialize_with = "lenient::text")]
    item: String,
    #[serde(default, deserialize_with = "lenient::text")]
    unit: String,
    #[serde(default, deserialize_with = "lenient::optional_decimal")]
    required: Option<Decimal>,
    #[serde(default, deserialize_with = "lenient::optional_decimal")]
    to_buy: Option<Decimal>,
    #[serde(default, deserialize_with = "lenient::optional_decimal")]
    unit_cost: Option<Decimal>,
    #[serde(default, deserialize_with = "lenient::optional_decimal")]
    cost: Option<Decimal>,
}

impl From<RequirementRow> for RequirementLine {
    fn from(row: RequirementRow) -> Self {
        // 單位成本解析順序：unitCost → cost → 0；總成本一律重算
        let unit_cost = row.unit_cost.or(row.cost).unwrap_or(Decimal::ZERO);
        let required = row.required.unwrap_or(Decimal::ZERO);
        RequirementLine {
            to_buy: row.to_buy,
            ..RequirementLine::new(&row.item, &row.unit, required, unit_cost)
        }
    }
}

/// 採購需求文件（`purchasing` 集合）
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PurchasingDocument {
    #[serde(default, deserialize_with = "lenient::decimal")]
    pub total_materials_cost: Decimal,

    #[serde(default, deserialize_with = "lenient::seq")]
    pub items: Vec<RequirementLine>,
}

impl PurchasingDocument {
    /// 創建新的採購需求文件
    pub fn new(items: Vec<RequirementLine>, total_materials_cost: Decimal) -> Self {
        Self {
            total_materials_cost,
            items,
        }
    }

    /// 由明細重新計算原料總成本
    pub fn recompute_total(&mut self) {
        self.total_materials_cost = sum_money(self.items.iter().map(|line| line.total_cost));
    }

    /// 依原料名稱查詢需求列
    pub fn line(&self, item: &str) -> Option<&RequirementLine> {
        self.items.iter().find(|line| line.item == item)
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}
