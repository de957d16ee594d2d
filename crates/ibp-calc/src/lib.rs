//! # IBP Calculation Engine
//!
//! 純計算器：需求、定價毛利、庫存評估、採購單、損益、預測

pub mod export;
pub mod forecast;
pub mod integrated;
pub mod inventory;
pub mod pnl;
pub mod pricing;
pub mod purchase_order;
pub mod recipe_cost;
pub mod requirements;
pub mod revenue;

// Re-export 主要類型
pub use export::OrderExporter;
pub use forecast::ForecastEngine;
pub use integrated::{IntegratedCalculator, IntegratedSummary};
pub use inventory::{InventoryEvaluator, InventoryReport};
pub use pnl::PnlAggregator;
pub use pricing::{PricingCalculator, PricingReport, PricingRow};
pub use purchase_order::PurchaseOrderGenerator;
pub use recipe_cost::RecipeCostCalculator;
pub use requirements::{Requirements, RequirementsCalculator};
pub use revenue::{RevenueCalculator, RevenueLine, SalesRevenue};

/// 計算警告（不中斷計算，隨結果回報）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CalcWarning {
    pub subject: String,
    pub message: String,
}

impl CalcWarning {
    pub fn new(subject: String, message: String) -> Self {
        Self { subject, message }
    }
}
