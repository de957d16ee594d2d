//! # IBP
//!
//! 咖啡店整合營運規劃引擎：配方、需求、價格、庫存與損益的整合計算。
//!
//! ## 快速開始
//!
//! ```no_run
//! use ibp::prelude::*;
//!
//! let service = PlanningService::new(JsonFileStore::new("data"), PlanningConfig::default());
//! let purchasing = service.purchasing()?;
//! println!("原料成本: {}", purchasing.total_materials_cost);
//! # Ok::<(), ibp::IbpError>(())
//! ```

pub mod config;

pub use ibp_calc;
pub use ibp_core;
pub use ibp_recalc;
pub use ibp_store;

pub use ibp_core::{IbpError, PlanningConfig, Result};

/// 常用型別
pub mod prelude {
    pub use ibp_calc::{
        IntegratedSummary, InventoryReport, OrderExporter, PricingReport, Requirements, SalesRevenue,
    };
    pub use ibp_core::{
        CatalogProduct, DemandEntry, IbpError, InventoryRecord, OrderMode, PlanningConfig, PnlState,
        PurchaseOrder, PurchasePrice, PurchasingDocument, Recipe, SalePrice, SalePriceInput,
        SalesHistoryRow, WhatIfOverrides, WhatIfPreview,
    };
    pub use ibp_recalc::{ForecastResult, PlanningService, RecalcOutcome, RecalcReport};
    pub use ibp_store::{Collection, DocumentStore, DocumentStoreExt, JsonFileStore, MemoryStore};
}
