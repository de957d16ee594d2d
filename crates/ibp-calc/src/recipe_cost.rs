//! 配方單位成本

use ibp_core::money::{round_money, saturating_sum};
use ibp_core::{PurchasePrice, Recipe, RecipeCost};
use rust_decimal::Decimal;

/// 配方成本計算器
pub struct RecipeCostCalculator;

impl RecipeCostCalculator {
    /// 一單位成品的原料成本 Σ(用量 × 採購價)，未進位（溢位時取上下限）
    pub fn unit_cost(recipe: &Recipe, purchase_prices: &[PurchasePrice]) -> Decimal {
        saturating_sum(recipe.ingredients.iter().map(|ingredient| {
            ingredient
                .quantity
                .saturating_mul(PurchasePrice::cost_of(purchase_prices, &ingredient.item))
        }))
    }

    /// 計算所有配方的單位成本（2 位小數），作為成本快取寫入
    pub fn compute(recipes: &[Recipe], purchase_prices: &[PurchasePrice]) -> Vec<RecipeCost> {
        recipes
            .iter()
            .map(|recipe| {
                RecipeCost::new(
                    &recipe.product,
                    round_money(Self::unit_cost(recipe, purchase_prices)),
                )
            })
            .collect()
    }
}
