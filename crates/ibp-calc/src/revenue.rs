//! 營收彙總（需求 × 售價）

use ibp_core::money::{line_total, sum_money};
use ibp_core::{DemandEntry, SalePrice};
use rust_decimal::Decimal;
use serde::Serialize;

/// 單一成品的營收
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RevenueLine {
    pub product: String,
    pub units: Decimal,
    pub price: Decimal,
    pub revenue: Decimal,
}

/// 營收彙總結果
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SalesRevenue {
    pub lines: Vec<RevenueLine>,
    pub total_revenue: Decimal,
}

/// 營收計算器
pub struct RevenueCalculator;

impl RevenueCalculator {
    /// 月營收 = Σ 需求量 × 售價（以售價名稱比對成品，找不到時售價為 0）
    pub fn compute(demand: &[DemandEntry], sale_prices: &[SalePrice]) -> SalesRevenue {
        let lines: Vec<RevenueLine> = demand
            .iter()
            .map(|entry| {
                let price = SalePrice::price_of(sale_prices, &entry.product);
                RevenueLine {
                    product: entry.product.clone(),
                    units: entry.quantity,
                    price,
                    revenue: line_total(entry.quantity, price),
                }
            })
            .collect();

        let total_revenue = sum_money(demand.iter().map(|entry| {
            entry
                .quantity
                .saturating_mul(SalePrice::price_of(sale_prices, &entry.product))
        }));

        SalesRevenue {
            lines,
            total_revenue,
        }
    }
}
