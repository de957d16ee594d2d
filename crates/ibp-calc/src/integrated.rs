//! 整合摘要：營收、原料成本、固定成本與利潤

use ibp_core::money::{round_money, sum_money};
use ibp_core::{DemandEntry, PnlState, PurchasePrice, Recipe, RecipeCost, SalePrice};
use rust_decimal::Decimal;
use serde::Serialize;

use crate::recipe_cost::RecipeCostCalculator;
use crate::revenue::{RevenueCalculator, RevenueLine};
use crate::PnlAggregator;

/// 整合摘要
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IntegratedSummary {
    pub total_revenue: Decimal,
    /// 各配方單位成本合計
    pub total_material_cost: Decimal,
    pub fixed_total: Decimal,
    /// 營收 - 原料成本
    pub gross_margin: Decimal,
    /// 毛利 - 固定成本
    pub net_profit: Decimal,
    pub sales: Vec<RevenueLine>,
    pub costs: Vec<RecipeCost>,
}

/// 整合摘要計算器
pub struct IntegratedCalculator;

impl IntegratedCalculator {
    pub fn summarize(
        demand: &[DemandEntry],
        recipes: &[Recipe],
        sale_prices: &[SalePrice],
        purchase_prices: &[PurchasePrice],
        pnl: &PnlState,
    ) -> IntegratedSummary {
        let revenue = RevenueCalculator::compute(demand, sale_prices);

        let raw_costs: Vec<(String, Decimal)> = recipes
            .iter()
            .map(|recipe| {
                (
                    recipe.product.clone(),
                    RecipeCostCalculator::unit_cost(recipe, purchase_prices),
                )
            })
            .collect();
        let total_material_cost = sum_money(raw_costs.iter().map(|(_, cost)| *cost));
        let costs = raw_costs
            .into_iter()
            .map(|(product, cost)| RecipeCost::new(&product, round_money(cost)))
            .collect();

        let fixed_total = PnlAggregator::fixed_total(pnl);
        let gross_margin = revenue.total_revenue - total_material_cost;

        IntegratedSummary {
            total_revenue: revenue.total_revenue,
            total_material_cost,
            fixed_total,
            gross_margin,
            net_profit: gross_margin - fixed_total,
            sales: revenue.lines,
            costs,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_summary() {
        let demand = vec![DemandEntry::new("Latte".to_string(), Decimal::from(100))];
        let recipes = vec![Recipe::new("Latte".to_string(), Vec::new()).with_ingredient(
            "Milk",
            "L",
            Decimal::new(2, 1),
        )];
        let sales = vec![SalePrice::new("SKU-LATTE", "Latte", Decimal::from(4))];
        let purchases = vec![PurchasePrice::new("Milk", "L", Decimal::new(15, 1))];
        let pnl = PnlState::default().with_fixed("Rent", Decimal::from(200));

        let summary = IntegratedCalculator::summarize(&demand, &recipes, &sales, &purchases, &pnl);

        assert_eq!(summary.total_revenue, Decimal::from(400));
        assert_eq!(summary.total_material_cost, Decimal::new(3, 1));
        assert_eq!(summary.gross_margin, Decimal::new(3997, 1));
        assert_eq!(summary.net_profit, Decimal::new(1997, 1));
        assert_eq!(summary.costs[0].total_cost, Decimal::new(3, 1));
    }
}
