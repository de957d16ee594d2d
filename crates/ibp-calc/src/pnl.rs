//! 損益彙總

use ibp_core::money::{round_money, sum_money};
use ibp_core::{PnlState, WhatIfOverrides, WhatIfPreview};
use rust_decimal::Decimal;

/// 損益彙總器
pub struct PnlAggregator;

impl PnlAggregator {
    /// 以原料成本重新計算損益衍生欄位
    ///
    /// - fixedTotal = Σ 固定成本
    /// - grossMargin = 營收 - 營收×銷貨成本比例 - 營收×外送成本比例 - 原料成本
    /// - netProfit = grossMargin - fixedTotal
    pub fn compute(state: &PnlState, materials_cost: Decimal) -> PnlState {
        let fixed_total = Self::fixed_total(state);
        let gross_margin = round_money(Self::gross(
            state.monthly_sales,
            state.cogs_pct,
            state.delivery_pct,
            materials_cost,
        ));

        // 淨利以進位後的毛利與固定成本相減
        PnlState {
            materials_cost: round_money(materials_cost),
            fixed_total,
            gross_margin,
            net_profit: gross_margin.saturating_sub(fixed_total),
            ..state.clone()
        }
    }

    /// 假設情境預覽（不持久化）
    pub fn preview_what_if(state: &PnlState, overrides: &WhatIfOverrides) -> WhatIfPreview {
        let uplift = Decimal::ONE.saturating_add(overrides.sales_uplift_pct / Decimal::ONE_HUNDRED);
        let sales = state.monthly_sales.saturating_mul(uplift);
        let cogs_pct = overrides.cogs_pct_override.unwrap_or(state.cogs_pct);
        let delivery_pct = overrides.delivery_pct_override.unwrap_or(state.delivery_pct);
        let materials = state
            .materials_cost
            .saturating_mul(overrides.materials_multiplier.unwrap_or(Decimal::ONE));

        let gross = round_money(Self::gross(sales, cogs_pct, delivery_pct, materials));

        WhatIfPreview {
            sales: round_money(sales),
            cogs_pct,
            delivery_pct,
            materials: round_money(materials),
            gross,
            net: gross.saturating_sub(Self::fixed_total(state)),
        }
    }

    /// 套用假設情境：將預覽值寫回損益狀態並重新計算衍生欄位
    pub fn apply_what_if(state: &PnlState, overrides: &WhatIfOverrides) -> PnlState {
        let preview = Self::preview_what_if(state, overrides);
        let applied = PnlState {
            monthly_sales: preview.sales,
            cogs_pct: preview.cogs_pct,
            delivery_pct: preview.delivery_pct,
            ..state.clone()
        };
        Self::compute(&applied, preview.materials)
    }

    /// 固定成本合計（2 位小數）
    pub fn fixed_total(state: &PnlState) -> Decimal {
        sum_money(state.fixed.iter().map(|cost| cost.amount))
    }

    fn gross(sales: Decimal, cogs_pct: Decimal, delivery_pct: Decimal, materials: Decimal) -> Decimal {
        sales
            .saturating_sub(sales.saturating_mul(cogs_pct))
            .saturating_sub(sales.saturating_mul(delivery_pct))
            .saturating_sub(materials)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn base_state() -> PnlState {
        PnlState::new(Decimal::from(1000), Decimal::new(3, 1), Decimal::new(1, 1))
            .with_fixed("Rent", Decimal::from(200))
    }

    #[test]
    fn test_pnl_scenario() {
        let result = PnlAggregator::compute(&base_state(), Decimal::from(30));

        assert_eq!(result.materials_cost, Decimal::from(30));
        assert_eq!(result.fixed_total, Decimal::from(200));
        assert_eq!(result.gross_margin, Decimal::from(570));
        assert_eq!(result.net_profit, Decimal::from(370));
        assert_eq!(result.fixed, base_state().fixed);
    }

    #[test]
    fn test_huge_sales_saturate() {
        let state = PnlState::new(Decimal::MAX, Decimal::ZERO, Decimal::ZERO)
            .with_fixed("Rent", Decimal::MAX)
            .with_fixed("Lease", Decimal::MAX);

        let pnl = PnlAggregator::compute(&state, Decimal::ZERO);
        assert_eq!(pnl.fixed_total, Decimal::MAX);
        assert_eq!(pnl.gross_margin, Decimal::MAX);
        assert_eq!(pnl.net_profit, Decimal::ZERO);

        let preview = PnlAggregator::preview_what_if(
            &state,
            &WhatIfOverrides::default().with_sales_uplift(Decimal::from(50)),
        );
        assert_eq!(preview.sales, Decimal::MAX);
    }

    #[test]
    fn test_empty_state() {
        let result = PnlAggregator::compute(&PnlState::default(), Decimal::ZERO);
        assert_eq!(result.gross_margin, Decimal::ZERO);
        assert_eq!(result.net_profit, Decimal::ZERO);
    }

    #[test]
    fn test_what_if_preview() {
        let state = PnlAggregator::compute(&base_state(), Decimal::from(30));
        let overrides = WhatIfOverrides::default()
            .with_sales_uplift(Decimal::from(10))
            .with_cogs_pct(Decimal::new(25, 2))
            .with_materials_multiplier(Decimal::new(2, 0));

        let preview = PnlAggregator::preview_what_if(&state, &overrides);

        // 1100 - 275 - 110 - 60 = 655
        assert_eq!(preview.sales, Decimal::from(1100));
        assert_eq!(preview.delivery_pct, Decimal::new(1, 1));
        assert_eq!(preview.materials, Decimal::from(60));
        assert_eq!(preview.gross, Decimal::from(655));
        assert_eq!(preview.net, Decimal::from(455));
    }

    #[test]
    fn test_neutral_what_if_matches_state() {
        let state = PnlAggregator::compute(&base_state(), Decimal::from(30));
        let preview = PnlAggregator::preview_what_if(&state, &WhatIfOverrides::default());

        assert_eq!(preview.gross, state.gross_margin);
        assert_eq!(preview.net, state.net_profit);
    }

    #[test]
    fn test_apply_what_if() {
        let state = PnlAggregator::compute(&base_state(), Decimal::from(30));
        let overrides = WhatIfOverrides::default().with_sales_uplift(Decimal::from(-50));

        let applied = PnlAggregator::apply_what_if(&state, &overrides);

        // 500 - 150 - 50 - 30 = 270
        assert_eq!(applied.monthly_sales, Decimal::from(500));
        assert_eq!(applied.gross_margin, Decimal::from(270));
        assert_eq!(applied.net_profit, Decimal::from(70));
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        #[test]
        fn prop_net_is_gross_minus_fixed(
            sales in (0i64..=1_000_000i64).prop_map(|n| Decimal::new(n, 2)),
            cogs in (0i64..=100i64).prop_map(|n| Decimal::new(n, 2)),
            rent in (0i64..=100_000i64).prop_map(|n| Decimal::new(n, 2)),
            materials in (0i64..=100_000i64).prop_map(|n| Decimal::new(n, 2))
        ) {
            let state = PnlState::new(sales, cogs, Decimal::ZERO).with_fixed("Rent", rent);
            let result = PnlAggregator::compute(&state, materials);

            prop_assert_eq!(result.net_profit, result.gross_margin - result.fixed_total);
        }
    }
}
