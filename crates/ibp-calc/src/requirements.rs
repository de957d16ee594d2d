//! 原料需求計算
//!
//! 需求 × 配方 → 每項原料的需求量與成本。

use std::collections::{HashMap, HashSet};

use ibp_core::money::{checked_product, line_total, round_money, round_unit_cost, sum_money};
use ibp_core::{DemandEntry, PurchasePrice, PurchasingDocument, Recipe, RequirementLine};
use rust_decimal::Decimal;

use crate::CalcWarning;

/// 原料需求計算結果
#[derive(Debug, Clone, PartialEq)]
pub struct Requirements {
    /// 需求列（依原料首次出現順序）
    pub items: Vec<RequirementLine>,

    /// 原料總成本 = Σ 需求列總成本
    pub total_materials_cost: Decimal,

    pub warnings: Vec<CalcWarning>,
}

impl Requirements {
    /// 創建空的計算結果
    pub fn empty() -> Self {
        Self {
            items: Vec::new(),
            total_materials_cost: Decimal::ZERO,
            warnings: Vec::new(),
        }
    }

    /// 轉為可持久化的採購需求文件
    pub fn to_document(&self) -> PurchasingDocument {
        PurchasingDocument::new(self.items.clone(), self.total_materials_cost)
    }
}

/// 累加中的原料需求（未進位）
struct Accumulated {
    item: String,
    unit: String,
    required: Decimal,
    unit_cost: Decimal,
}

/// 原料需求計算器
pub struct RequirementsCalculator;

impl RequirementsCalculator {
    /// 計算原料需求
    ///
    /// - 每筆需求以成品名稱完全比對配方，第一筆配方優先；找不到配方時略過
    /// - 原料單價以名稱完全比對採購價，找不到時為 0
    /// - 同一原料的單位與單價以最後處理者為準，單位不一致時附加警告
    /// - 數值溢位時取 Decimal 上下限並附加警告
    pub fn compute(
        recipes: &[Recipe],
        demand: &[DemandEntry],
        purchase_prices: &[PurchasePrice],
    ) -> Requirements {
        tracing::debug!(
            "開始計算原料需求：配方 {} 筆，需求 {} 筆，採購價 {} 筆",
            recipes.len(),
            demand.len(),
            purchase_prices.len()
        );

        let mut accumulated: Vec<Accumulated> = Vec::new();
        let mut index: HashMap<String, usize> = HashMap::new();
        let mut warned: HashSet<String> = HashSet::new();
        let mut warnings = Vec::new();

        for entry in demand {
            let Some(recipe) = Recipe::find(recipes, &entry.product) else {
                tracing::debug!("成品 {} 沒有配方，略過", entry.product);
                continue;
            };

            for ingredient in &recipe.ingredients {
                let cost = PurchasePrice::cost_of(purchase_prices, &ingredient.item);
                let contribution = match checked_product(ingredient.quantity, entry.quantity) {
                    Some(contribution) => contribution,
                    None => {
                        let message = format!(
                            "成品 {} 的原料 {} 需求量溢位（{} × {}）",
                            entry.product, ingredient.item, ingredient.quantity, entry.quantity
                        );
                        tracing::warn!("{}", message);
                        warnings.push(CalcWarning::new(ingredient.item.clone(), message));
                        ingredient.quantity.saturating_mul(entry.quantity)
                    }
                };

                match index.get(&ingredient.item) {
                    Some(&position) => {
                        let line = &mut accumulated[position];
                        if line.unit != ingredient.unit && warned.insert(line.item.clone()) {
                            let message = format!(
                                "原料 {} 的單位不一致：{} 與 {}，以 {} 為準",
                                line.item, line.unit, ingredient.unit, ingredient.unit
                            );
                            tracing::warn!("{}", message);
                            warnings.push(CalcWarning::new(line.item.clone(), message));
                        }
                        line.required = line.required.saturating_add(contribution);
                        line.unit = ingredient.unit.clone();
                        line.unit_cost = cost;
                    }
                    None => {
                        index.insert(ingredient.item.clone(), accumulated.len());
                        accumulated.push(Accumulated {
                            item: ingredient.item.clone(),
                            unit: ingredient.unit.clone(),
                            required: contribution,
                            unit_cost: cost,
                        });
                    }
                }
            }
        }

        let items: Vec<RequirementLine> = accumulated
            .into_iter()
            .map(|line| {
                if checked_product(line.required, line.unit_cost).is_none() {
                    let message = format!("原料 {} 的總成本溢位", line.item);
                    tracing::warn!("{}", message);
                    warnings.push(CalcWarning::new(line.item.clone(), message));
                }
                RequirementLine {
                    total_cost: line_total(line.required, line.unit_cost),
                    required: round_money(line.required),
                    unit_cost: round_unit_cost(line.unit_cost),
                    item: line.item,
                    unit: line.unit,
                    to_buy: None,
                }
            })
            .collect();

        let total_materials_cost = sum_money(items.iter().map(|line| line.total_cost));

        tracing::debug!(
            "原料需求計算完成：{} 項原料，總成本 {}",
            items.len(),
            total_materials_cost
        );

        Requirements {
            items,
            total_materials_cost,
            warnings,
        }
    }
}
