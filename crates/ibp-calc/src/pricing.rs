//! 定價與毛利計算

use ibp_core::money::{round_money, round_unit_cost};
use ibp_core::{IbpError, PurchasePrice, Recipe, RecipeCost, Result, SalePrice, SalePriceInput};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::recipe_cost::RecipeCostCalculator;

/// 單一 SKU 的毛利
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PricingRow {
    pub sku: String,
    pub name: String,
    pub unit_price: Decimal,
    pub unit_cost: Decimal,
    /// 毛利率（百分比）
    pub margin_pct: Decimal,
}

/// 定價報表
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PricingReport {
    /// 平均毛利率（空清單為 0）
    pub avg_margin_pct: Decimal,
    pub items: Vec<PricingRow>,
}

/// 定價與毛利計算器
pub struct PricingCalculator;

impl PricingCalculator {
    /// 計算每個 SKU 的單位成本與毛利率
    pub fn compute(
        sale_prices: &[SalePrice],
        recipes: &[Recipe],
        purchase_prices: &[PurchasePrice],
        cached_costs: Option<&[RecipeCost]>,
    ) -> PricingReport {
        let items: Vec<PricingRow> = sale_prices
            .iter()
            .map(|sale| {
                let unit_cost = Self::unit_cost(&sale.name, recipes, purchase_prices, cached_costs);
                PricingRow {
                    sku: sale.sku.clone(),
                    name: sale.name.clone(),
                    unit_price: round_money(sale.unit_price),
                    unit_cost: round_money(unit_cost),
                    margin_pct: round_money(Self::margin_pct(sale.unit_price, unit_cost)),
                }
            })
            .collect();

        let avg_margin_pct = if items.is_empty() {
            Decimal::ZERO
        } else {
            let total: Decimal = items.iter().map(|row| row.margin_pct).sum();
            round_money(total / Decimal::from(items.len()))
        };

        tracing::debug!("定價計算完成：{} 個 SKU，平均毛利率 {}%", items.len(), avg_margin_pct);

        PricingReport {
            avg_margin_pct,
            items,
        }
    }

    /// 成品單位成本
    ///
    /// 成本快取中有該成品時直接採用，否則由配方重新計算（4 位小數，無配方時為 0）。
    pub fn unit_cost(
        product: &str,
        recipes: &[Recipe],
        purchase_prices: &[PurchasePrice],
        cached_costs: Option<&[RecipeCost]>,
    ) -> Decimal {
        if let Some(cached) = cached_costs
            .and_then(|costs| costs.iter().find(|cost| cost.product == product))
        {
            return cached.total_cost;
        }

        Recipe::find(recipes, product)
            .map(|recipe| round_unit_cost(RecipeCostCalculator::unit_cost(recipe, purchase_prices)))
            .unwrap_or(Decimal::ZERO)
    }

    /// 毛利率 = (售價 - 成本) / 售價 × 100，售價非正數時為 0
    pub fn margin_pct(unit_price: Decimal, unit_cost: Decimal) -> Decimal {
        if unit_price > Decimal::ZERO {
            let spread = unit_price.saturating_sub(unit_cost);
            match spread.checked_div(unit_price) {
                Some(ratio) => ratio.saturating_mul(Decimal::ONE_HUNDRED),
                None if spread.is_sign_negative() => Decimal::MIN,
                None => Decimal::MAX,
            }
        } else {
            Decimal::ZERO
        }
    }

    /// 以 SKU 新增或更新單筆售價，回傳是否為新增
    ///
    /// - 未提供 SKU 時由名稱推導
    /// - 既有 SKU 未提供名稱或單價時保留原值
    /// - 新 SKU 必須提供名稱，單價預設為 0
    pub fn upsert(current: &mut Vec<SalePrice>, input: &SalePriceInput) -> Result<bool> {
        let Some(sku) = input.resolved_sku() else {
            return Err(IbpError::validation("name", "必須提供 SKU 或名稱"));
        };

        let unit_price = input.resolved_unit_price();
        if let Some(price) = unit_price {
            if price.is_sign_negative() && !price.is_zero() {
                return Err(IbpError::validation("unitPrice", "單價不得為負數"));
            }
        }

        if let Some(existing) = current.iter_mut().find(|price| price.sku == sku) {
            if let Some(name) = input.resolved_name() {
                existing.name = name;
            }
            if let Some(price) = unit_price {
                existing.unit_price = price;
            }
            return Ok(false);
        }

        let Some(name) = input.resolved_name() else {
            return Err(IbpError::validation("name", format!("新 SKU {} 必須提供名稱", sku)));
        };

        current.push(SalePrice {
            sku,
            name,
            unit_price: unit_price.unwrap_or(Decimal::ZERO),
        });
        Ok(true)
    }

    /// 批量新增或更新售價
    ///
    /// 任一筆無效時整批拒絕，原清單不變；錯誤欄位標示 `rows[索引]`。
    pub fn bulk_upsert(current: &mut Vec<SalePrice>, inputs: &[SalePriceInput]) -> Result<usize> {
        let mut merged = current.clone();
        for (index, input) in inputs.iter().enumerate() {
            Self::upsert(&mut merged, input).map_err(|err| match err {
                IbpError::Validation { field, message } => {
                    IbpError::validation(format!("rows[{}].{}", index, field), message)
                }
                other => other,
            })?;
        }

        *current = merged;
        Ok(inputs.len())
    }
}
