//! 價格模型（採購價、售價、配方成本快取）

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::lenient;

/// 採購價（每單位原料成本）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct PurchasePrice {
    /// 原料名稱（唯一）
    #[serde(default, deserialize_with = "lenient::text")]
    #[validate(length(min = 1, message = "原料名稱不得為空"))]
    pub item: String,

    #[serde(default, deserialize_with = "lenient::text")]
    pub unit: String,

    /// 每單位成本
    #[serde(default, deserialize_with = "lenient::decimal")]
    #[validate(custom(function = "crate::non_negative"))]
    pub cost: Decimal,
}

impl PurchasePrice {
    /// 創建新的採購價
    pub fn new(item: &str, unit: &str, cost: Decimal) -> Self {
        Self {
            item: item.to_string(),
            unit: unit.to_string(),
            cost,
        }
    }

    /// 查詢原料單價（完全比對，找不到時為 0）
    pub fn cost_of(prices: &[PurchasePrice], item: &str) -> Decimal {
        prices
            .iter()
            .find(|price| price.item == item)
            .map(|price| price.cost)
            .unwrap_or(Decimal::ZERO)
    }
}

/// 售價
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SalePrice {
    /// SKU（唯一）
    pub sku: String,

    /// 成品名稱
    pub name: String,

    /// 單價
    pub unit_price: Decimal,
}

impl SalePrice {
    /// 創建新的售價
    pub fn new(sku: &str, name: &str, unit_price: Decimal) -> Self {
        Self {
            sku: sku.to_string(),
            name: name.to_string(),
            unit_price,
        }
    }

    /// 由成品名稱推導 SKU：`SKU-` + 大寫名稱，空白以 `-` 連接
    pub fn derive_sku(name: &str) -> String {
        let joined = name
            .split_whitespace()
            .map(|part| part.to_uppercase())
            .collect::<Vec<_>>()
            .join("-");
        format!("SKU-{}", joined)
    }

    /// 正規化售價文件（支援舊格式 `{product, price}`）
    pub fn normalize_all(rows: Vec<SalePriceInput>) -> Vec<SalePrice> {
        rows.into_iter()
            .enumerate()
            .map(|(index, row)| {
                let name = row
                    .resolved_name()
                    .unwrap_or_else(|| format!("SKU-{}", index));
                let sku = row.sku.clone().unwrap_or_else(|| Self::derive_sku(&name));
                let unit_price = row.resolved_unit_price().unwrap_or(Decimal::ZERO);
                SalePrice {
                    sku,
                    name,
                    unit_price,
                }
            })
            .collect()
    }

    /// 依成品名稱查詢單價（找不到時為 0）
    pub fn price_of(prices: &[SalePrice], product: &str) -> Decimal {
        prices
            .iter()
            .find(|price| price.name == product)
            .map(|price| price.unit_price)
            .unwrap_or(Decimal::ZERO)
    }
}

/// 售價輸入（單筆更新、批量匯入或舊格式文件列）
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SalePriceInput {
    #[serde(default, deserialize_with = "lenient::optional_text")]
    pub sku: Option<String>,

    #[serde(default, deserialize_with = "lenient::optional_text")]
    pub name: Option<String>,

    /// 舊格式的成品名稱欄位
    #[serde(default, deserialize_with = "lenient::optional_text")]
    pub product: Option<String>,

    #[serde(default, deserialize_with = "lenient::optional_decimal")]
    pub unit_price: Option<Decimal>,

    /// 舊格式的單價欄位
    #[serde(default, deserialize_with = "lenient::optional_decimal")]
    pub price: Option<Decimal>,
}

impl SalePriceInput {
    /// 創建新的售價輸入
    pub fn new(sku: Option<&str>, name: Option<&str>, unit_price: Option<Decimal>) -> Self {
        Self {
            sku: sku.map(str::to_string),
            name: name.map(str::to_string),
            product: None,
            unit_price,
            price: None,
        }
    }

    /// 名稱解析順序：name → product
    pub fn resolved_name(&self) -> Option<String> {
        self.name.clone().or_else(|| self.product.clone())
    }

    /// 單價解析順序：unitPrice → price
    pub fn resolved_unit_price(&self) -> Option<Decimal> {
        self.unit_price.or(self.price)
    }

    /// SKU 解析順序：sku → 由名稱推導
    pub fn resolved_sku(&self) -> Option<String> {
        self.sku
            .clone()
            .or_else(|| self.resolved_name().map(|name| SalePrice::derive_sku(&name)))
    }
}

/// 配方單位成本快取
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecipeCost {
    #[serde(default, deserialize_with = "lenient::text")]
    pub product: String,

    #[serde(default, deserialize_with = "lenient::decimal")]
    pub total_cost: Decimal,
}

impl RecipeCost {
    /// 創建新的配方成本
    pub fn new(product: &str, total_cost: Decimal) -> Self {
        Self {
            product: product.to_string(),
            total_cost,
        }
    }
}
