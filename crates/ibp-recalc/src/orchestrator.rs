//! 重新計算協調器
//!
//! 上游文件（需求、配方、採購價、售價、損益）寫入後，依固定順序重跑計算器並寫回衍生文件：
//!
//! 1. 原料需求 → `purchasing`
//! 2. 售價變動時重算月營收
//! 3. 損益衍生欄位 → `pnl`
//!
//! 重新計算失敗只會回報，不會回滾已成功的上游寫入。

use ibp_calc::{PnlAggregator, Requirements, RequirementsCalculator, RevenueCalculator};
use ibp_core::{DemandEntry, PnlState, PurchasePrice, Recipe, Result, SalePrice, SalePriceInput};
use ibp_store::{Collection, DocumentStore, DocumentStoreExt};
use rust_decimal::Decimal;

/// 一次重新計算的結果
#[derive(Debug, Clone, PartialEq)]
pub struct RecalcReport {
    /// 觸發來源
    pub sources: Vec<Collection>,
    pub requirements: Requirements,
    /// 寫回後的損益狀態
    pub pnl: PnlState,
    /// 是否重算了月營收
    pub revenue_refreshed: bool,
}

/// 重新計算結果
#[derive(Debug, Clone, PartialEq)]
pub enum RecalcOutcome {
    /// 完成
    Completed(RecalcReport),
    /// 失敗（上游寫入仍然有效）
    Failed {
        sources: Vec<Collection>,
        error: String,
    },
    /// 沒有需要處理的變更（或延後至批次處理）
    Skipped,
}

impl RecalcOutcome {
    pub fn is_completed(&self) -> bool {
        matches!(self, RecalcOutcome::Completed(_))
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, RecalcOutcome::Failed { .. })
    }

    /// 完成時的報表
    pub fn report(&self) -> Option<&RecalcReport> {
        match self {
            RecalcOutcome::Completed(report) => Some(report),
            _ => None,
        }
    }
}

/// 重新計算協調器
pub struct Recalculator;

impl Recalculator {
    /// 執行重新計算並寫回衍生文件，錯誤直接回傳
    pub fn run<S: DocumentStore + ?Sized>(store: &S, sources: &[Collection]) -> Result<RecalcReport> {
        tracing::debug!("開始重新計算，來源: {:?}", sources);

        // Step 1: 原料需求
        let recipes: Vec<Recipe> = store.read_list(Collection::Bom);
        let demand: Vec<DemandEntry> = store.read_list(Collection::Demand);
        let purchase_prices: Vec<PurchasePrice> = store.read_list(Collection::PurchasePrices);

        let requirements = RequirementsCalculator::compute(&recipes, &demand, &purchase_prices);
        store.write(Collection::Purchasing, &requirements.to_document())?;

        // Step 2: 售價變動時重算月營收
        let mut pnl: PnlState = store.read_or(Collection::Pnl, PnlState::default());
        let revenue_refreshed = sources.contains(&Collection::SalePrices);
        if revenue_refreshed {
            let inputs: Vec<SalePriceInput> = store.read_list(Collection::SalePrices);
            let sale_prices = SalePrice::normalize_all(inputs);
            let revenue = RevenueCalculator::compute(&demand, &sale_prices);
            tracing::debug!("月營收更新: {} → {}", pnl.monthly_sales, revenue.total_revenue);
            pnl.monthly_sales = revenue.total_revenue;
        }

        // Step 3: 損益衍生欄位
        let pnl = PnlAggregator::compute(&pnl, requirements.total_materials_cost);
        store.write(Collection::Pnl, &pnl)?;

        tracing::info!(
            "重新計算完成：{} 項原料，原料成本 {}，淨利 {}",
            requirements.items.len(),
            requirements.total_materials_cost,
            pnl.net_profit
        );

        Ok(RecalcReport {
            sources: sources.to_vec(),
            requirements,
            pnl,
            revenue_refreshed,
        })
    }

    /// 上游寫入後的重新計算：失敗時記錄錯誤並回報，不向上拋出
    pub fn after_write<S: DocumentStore + ?Sized>(store: &S, sources: &[Collection]) -> RecalcOutcome {
        if sources.is_empty() {
            return RecalcOutcome::Skipped;
        }

        match Self::run(store, sources) {
            Ok(report) => RecalcOutcome::Completed(report),
            Err(err) => {
                tracing::error!("重新計算失敗（來源 {:?}）: {}", sources, err);
                RecalcOutcome::Failed {
                    sources: sources.to_vec(),
                    error: err.to_string(),
                }
            }
        }
    }

    /// 目前儲存的原料成本與需求計算結果是否一致
    pub fn is_consistent<S: DocumentStore + ?Sized>(store: &S) -> bool {
        let recipes: Vec<Recipe> = store.read_list(Collection::Bom);
        let demand: Vec<DemandEntry> = store.read_list(Collection::Demand);
        let purchase_prices: Vec<PurchasePrice> = store.read_list(Collection::PurchasePrices);
        let expected: Decimal =
            RequirementsCalculator::compute(&recipes, &demand, &purchase_prices).total_materials_cost;

        let pnl: PnlState = store.read_or(Collection::Pnl, PnlState::default());
        let recomputed = PnlAggregator::compute(&pnl, expected);
        pnl == recomputed
    }
}
