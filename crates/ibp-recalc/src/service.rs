//! 規劃服務：所有讀寫入口
//!
//! 每個寫入上游文件的入口在寫入成功後交由 [`Recalculator`] 重新計算衍生文件。
//! 寫入本身失敗（驗證或儲存錯誤）時回傳錯誤；重新計算的結果以 [`RecalcOutcome`] 回報。

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use ibp_calc::{
    ForecastEngine, IntegratedCalculator, IntegratedSummary, InventoryEvaluator, InventoryReport,
    PnlAggregator, PricingCalculator, PricingReport, PurchaseOrderGenerator, RecipeCostCalculator,
    RevenueCalculator, SalesRevenue,
};
use ibp_core::{
    validate_each, CatalogProduct, DemandEntry, IbpError, InventoryRecord, OrderMode, PlanningConfig,
    PnlState, PurchaseOrder, PurchasePrice, PurchasingDocument, Recipe, RecipeCost, Result,
    SalePrice, SalePriceInput, SalesHistoryRow, WhatIfOverrides, WhatIfPreview,
};
use ibp_store::{Collection, DocumentStore, DocumentStoreExt};
use serde::Serialize;
use serde_json::Value;
use validator::Validate;

use crate::dirty_tracking::DirtyTracker;
use crate::orchestrator::{RecalcOutcome, Recalculator};

/// 需求預測結果
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ForecastResult {
    /// 實際使用的視窗
    pub window: usize,
    pub forecast: Vec<DemandEntry>,
    /// 是否已寫入需求
    pub applied: bool,
    /// 寫入需求後的重新計算結果
    #[serde(skip)]
    pub recalculation: Option<RecalcOutcome>,
}

/// 規劃服務
pub struct PlanningService<S: DocumentStore> {
    store: S,
    config: PlanningConfig,
    tracker: Mutex<DirtyTracker>,
    deferred: AtomicBool,
}

impl<S: DocumentStore> PlanningService<S> {
    /// 創建新的規劃服務
    pub fn new(store: S, config: PlanningConfig) -> Self {
        Self {
            store,
            config,
            tracker: Mutex::new(DirtyTracker::new()),
            deferred: AtomicBool::new(false),
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn config(&self) -> &PlanningConfig {
        &self.config
    }

    // ===== 重新計算 =====

    /// 延後重新計算，直到呼叫 [`Self::flush`]
    pub fn defer_recalculation(&self) {
        self.deferred.store(true, Ordering::SeqCst);
    }

    /// 以一次重新計算處理所有累積的變更，並恢復即時重新計算
    pub fn flush(&self) -> RecalcOutcome {
        self.deferred.store(false, Ordering::SeqCst);
        let sources = match self.tracker.lock() {
            Ok(mut tracker) => tracker.take_dirty(),
            Err(_) => {
                tracing::error!("髒標記鎖已損毀，無法重新計算");
                return RecalcOutcome::Failed {
                    sources: Vec::new(),
                    error: "髒標記鎖已損毀".to_string(),
                };
            }
        };
        Recalculator::after_write(&self.store, &sources)
    }

    /// 全部重新計算（不論是否有變更）
    pub fn recalculate_all(&self) -> RecalcOutcome {
        if let Ok(mut tracker) = self.tracker.lock() {
            tracker.clear();
        }
        Recalculator::after_write(&self.store, &[Collection::Demand, Collection::SalePrices])
    }

    /// 儲存的損益是否已反映目前的配方、需求與採購價
    pub fn is_consistent(&self) -> bool {
        Recalculator::is_consistent(&self.store)
    }

    fn propagate(&self, collection: Collection) -> RecalcOutcome {
        match self.tracker.lock() {
            Ok(mut tracker) => {
                tracker.mark_dirty(collection);
            }
            Err(_) => tracing::error!("髒標記鎖已損毀，{} 的變更未記錄", collection),
        }

        if self.deferred.load(Ordering::SeqCst) {
            tracing::debug!("{} 已變更，延後重新計算", collection);
            return RecalcOutcome::Skipped;
        }
        self.flush()
    }

    fn write_upstream<T: Serialize + ?Sized>(
        &self,
        collection: Collection,
        document: &T,
    ) -> Result<RecalcOutcome> {
        self.store.write(collection, document)?;
        tracing::info!("{} 已更新", collection);
        Ok(self.propagate(collection))
    }

    // ===== 配方 =====

    pub fn recipes(&self) -> Vec<Recipe> {
        self.store.read_list(Collection::Bom)
    }

    /// 依成品名稱新增或取代配方
    pub fn upsert_recipe(&self, recipe: Recipe) -> Result<RecalcOutcome> {
        recipe.validate()?;
        let mut recipes = self.recipes();
        if Recipe::upsert(&mut recipes, recipe) {
            tracing::debug!("新增配方，共 {} 筆", recipes.len());
        }
        self.write_upstream(Collection::Bom, &recipes)
    }

    /// 整批取代配方
    pub fn replace_bom(&self, recipes: Vec<Recipe>) -> Result<RecalcOutcome> {
        validate_each("bom", &recipes)?;
        self.write_upstream(Collection::Bom, &recipes)
    }

    /// 配方單位成本，並寫入成本快取
    pub fn refresh_recipe_costs(&self) -> Result<Vec<RecipeCost>> {
        let costs = RecipeCostCalculator::compute(&self.recipes(), &self.purchase_prices());
        self.store.write(Collection::RecipeCosts, &costs)?;
        tracing::info!("配方成本已更新：{} 筆", costs.len());
        Ok(costs)
    }

    // ===== 需求 =====

    pub fn demand(&self) -> Vec<DemandEntry> {
        self.store.read_list(Collection::Demand)
    }

    /// 整批取代需求
    pub fn save_demand(&self, demand: Vec<DemandEntry>) -> Result<RecalcOutcome> {
        validate_each("demand", &demand)?;
        self.write_upstream(Collection::Demand, &demand)
    }

    // ===== 價格 =====

    pub fn purchase_prices(&self) -> Vec<PurchasePrice> {
        self.store.read_list(Collection::PurchasePrices)
    }

    /// 整批取代採購價
    pub fn save_purchase_prices(&self, prices: Vec<PurchasePrice>) -> Result<RecalcOutcome> {
        validate_each("prices", &prices)?;
        self.write_upstream(Collection::PurchasePrices, &prices)
    }

    /// 正規化後的售價
    pub fn sale_prices(&self) -> Vec<SalePrice> {
        let inputs: Vec<SalePriceInput> = self.store.read_list(Collection::SalePrices);
        SalePrice::normalize_all(inputs)
    }

    /// 定價與毛利報表（優先使用配方成本快取）
    pub fn pricing(&self) -> PricingReport {
        let cached: Option<Vec<RecipeCost>> = match self.store.read_raw(Collection::RecipeCosts) {
            Ok(Some(value)) => Some(ibp_core::lenient::collection(value)),
            Ok(None) => None,
            Err(err) => {
                tracing::warn!("讀取配方成本快取失敗，改由配方計算: {}", err);
                None
            }
        };

        PricingCalculator::compute(
            &self.sale_prices(),
            &self.recipes(),
            &self.purchase_prices(),
            cached.as_deref(),
        )
    }

    /// 新增或更新單筆售價
    pub fn upsert_sale_price(&self, input: SalePriceInput) -> Result<RecalcOutcome> {
        let mut prices = self.sale_prices();
        PricingCalculator::upsert(&mut prices, &input)?;
        self.write_upstream(Collection::SalePrices, &prices)
    }

    /// 批量新增或更新售價（任一筆無效時整批拒絕）
    pub fn bulk_upsert_sale_prices(&self, rows: Vec<SalePriceInput>) -> Result<RecalcOutcome> {
        let mut prices = self.sale_prices();
        let count = PricingCalculator::bulk_upsert(&mut prices, &rows)?;
        tracing::debug!("批量更新售價 {} 筆", count);
        self.write_upstream(Collection::SalePrices, &prices)
    }

    /// 以需求 × 售價重算月營收並寫入損益
    pub fn refresh_sales_revenue(&self) -> Result<SalesRevenue> {
        let revenue = RevenueCalculator::compute(&self.demand(), &self.sale_prices());
        Recalculator::run(&self.store, &[Collection::SalePrices])?;
        Ok(revenue)
    }

    // ===== 採購需求與損益 =====

    /// 重新計算並回傳採購需求（同步更新損益的原料成本）
    pub fn purchasing(&self) -> Result<PurchasingDocument> {
        let report = Recalculator::run(&self.store, &[])?;
        Ok(report.requirements.to_document())
    }

    /// 儲存手動編輯的採購需求（例如指定 toBuy），不觸發重新計算
    ///
    /// 總成本由明細重算；下一次重新計算會以需求結果整份取代此文件。
    pub fn save_purchasing(&self, mut document: PurchasingDocument) -> Result<()> {
        validate_each("items", &document.items)?;
        document.recompute_total();
        self.store.write(Collection::Purchasing, &document)?;
        tracing::info!("採購需求已手動更新：{} 項", document.items.len());
        Ok(())
    }

    /// 重新計算並回傳損益
    pub fn pnl(&self) -> Result<PnlState> {
        Ok(Recalculator::run(&self.store, &[])?.pnl)
    }

    /// 直接編輯損益輸入（營收、比例、固定成本）
    pub fn save_pnl(&self, state: PnlState) -> Result<RecalcOutcome> {
        state.validate()?;
        self.write_upstream(Collection::Pnl, &state)
    }

    /// 假設情境預覽（不寫入）
    pub fn what_if(&self, overrides: &WhatIfOverrides) -> Result<WhatIfPreview> {
        let state = self.pnl()?;
        Ok(PnlAggregator::preview_what_if(&state, overrides))
    }

    /// 套用假設情境並寫入損益
    pub fn apply_what_if(&self, overrides: &WhatIfOverrides) -> Result<PnlState> {
        let state = self.pnl()?;
        let applied = PnlAggregator::apply_what_if(&state, overrides);
        self.store.write(Collection::Pnl, &applied)?;
        tracing::info!("已套用假設情境：淨利 {} → {}", state.net_profit, applied.net_profit);
        Ok(applied)
    }

    // ===== 庫存 =====

    pub fn inventory_records(&self) -> Vec<InventoryRecord> {
        self.store.read_list(Collection::Inventory)
    }

    /// 以最近一次的採購需求評估庫存
    pub fn inventory(&self) -> InventoryReport {
        let purchasing: PurchasingDocument =
            self.store.read_or(Collection::Purchasing, PurchasingDocument::default());
        InventoryEvaluator::evaluate(&self.inventory_records(), &purchasing.items)
    }

    /// 整批取代庫存紀錄
    pub fn save_inventory(&self, records: Vec<InventoryRecord>) -> Result<()> {
        validate_each("inventory", &records)?;
        self.store.write(Collection::Inventory, &records)?;
        tracing::info!("庫存已更新：{} 筆", records.len());
        Ok(())
    }

    // ===== 預測 =====

    pub fn sales_history(&self) -> Vec<SalesHistoryRow> {
        self.store.read_list(Collection::SalesHistory)
    }

    /// 清理並覆寫歷史銷售，回傳保留筆數
    pub fn save_sales_history(&self, rows: Vec<SalesHistoryRow>) -> Result<usize> {
        let rows = ForecastEngine::sanitize(rows);
        self.store.write(Collection::SalesHistory, &rows)?;
        tracing::info!("歷史銷售已更新：{} 筆", rows.len());
        Ok(rows.len())
    }

    /// 需求預測；`apply` 時整批取代需求並重新計算
    pub fn forecast(&self, window: Option<usize>, apply: bool) -> Result<ForecastResult> {
        let window = window
            .map(|window| window.max(1))
            .unwrap_or_else(|| self.config.effective_window());
        let history = self.sales_history();
        if history.is_empty() {
            return Err(IbpError::not_found("歷史銷售", Collection::SalesHistory.name()));
        }

        let forecast = ForecastEngine::forecast(&history, window);

        let recalculation = if apply {
            let outcome = self.write_upstream(Collection::Demand, &forecast)?;
            tracing::info!("預測已套用為需求：{} 項", forecast.len());
            Some(outcome)
        } else {
            None
        };

        Ok(ForecastResult {
            window,
            forecast,
            applied: apply,
            recalculation,
        })
    }

    // ===== 採購單 =====

    /// 產生採購單，寫入目前採購單與歷史；收貨模式同時更新庫存
    pub fn generate_purchase_order(&self, mode: OrderMode) -> Result<PurchaseOrder> {
        let report = self.inventory();
        let fallback: PurchasingDocument =
            self.store.read_or(Collection::Purchasing, PurchasingDocument::default());

        let mut history = self.raw_order_history()?;

        let order =
            PurchaseOrderGenerator::generate(&report.items, &self.purchase_prices(), Some(&fallback));
        let entry = serde_json::to_value(&order).map_err(|err| IbpError::Storage(err.to_string()))?;

        self.store.write(Collection::PurchaseOrder, &order)?;

        history.insert(0, entry);
        self.store.write(Collection::PurchaseOrderHistory, &history)?;

        if mode == OrderMode::Receiving {
            let mut records = self.inventory_records();
            PurchaseOrderGenerator::receive(&mut records, &order);
            self.store.write(Collection::Inventory, &records)?;
        }

        tracing::info!(
            "採購單 {} 已建立（{:?}）：{} 項，總金額 {}",
            order.id,
            mode,
            order.total_items,
            order.total_order_value
        );
        Ok(order)
    }

    /// 原樣讀取採購單歷史，無法解析的舊紀錄一併保留
    fn raw_order_history(&self) -> Result<Vec<Value>> {
        match self.store.read_raw(Collection::PurchaseOrderHistory)? {
            Some(Value::Array(entries)) => Ok(entries),
            Some(_) => Err(IbpError::Storage(format!(
                "{} 不是清單，拒絕覆寫",
                Collection::PurchaseOrderHistory
            ))),
            None => Ok(Vec::new()),
        }
    }

    /// 依編號查詢採購單
    pub fn purchase_order(&self, id: &str) -> Result<PurchaseOrder> {
        let history: Vec<PurchaseOrder> = self.store.read_list(Collection::PurchaseOrderHistory);
        history
            .into_iter()
            .find(|order| order.id == id)
            .or_else(|| self.current_purchase_order().filter(|order| order.id == id))
            .ok_or_else(|| IbpError::not_found("採購單", id))
    }

    /// 目前採購單
    pub fn current_purchase_order(&self) -> Option<PurchaseOrder> {
        self.store.read_or(Collection::PurchaseOrder, None)
    }

    /// 採購單歷史（依日期由新到舊）
    pub fn purchase_order_history(&self) -> Vec<PurchaseOrder> {
        let mut history: Vec<PurchaseOrder> = self.store.read_list(Collection::PurchaseOrderHistory);
        history.sort_by(|a, b| b.date.cmp(&a.date));
        history
    }

    // ===== 商品目錄 =====

    pub fn catalog(&self) -> Vec<CatalogProduct> {
        self.store.read_list(Collection::Catalog)
    }

    /// 依 SKU 新增或更新目錄商品，缺少 SKU 或名稱的項目略過；回傳處理筆數
    pub fn upsert_catalog(&self, products: Vec<CatalogProduct>) -> Result<usize> {
        let mut catalog = self.catalog();
        let mut applied = 0;

        for product in products {
            if !product.is_identified() {
                tracing::warn!("目錄商品缺少 SKU 或名稱，略過: {:?}", product);
                continue;
            }
            match catalog.iter_mut().find(|existing| existing.sku == product.sku) {
                Some(existing) => existing.merge(product),
                None => catalog.push(product),
            }
            applied += 1;
        }

        self.store.write(Collection::Catalog, &catalog)?;
        tracing::info!("商品目錄已更新：{} 筆", applied);
        Ok(applied)
    }

    // ===== 整合摘要 =====

    pub fn integrated_summary(&self) -> IntegratedSummary {
        let pnl: PnlState = self.store.read_or(Collection::Pnl, PnlState::default());
        IntegratedCalculator::summarize(
            &self.demand(),
            &self.recipes(),
            &self.sale_prices(),
            &self.purchase_prices(),
            &pnl,
        )
    }
}
