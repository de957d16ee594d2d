//! # IBP Store
//!
//! 文件儲存：每個集合為一份可整份讀寫的 JSON 文件

pub mod json_file;
pub mod memory;

use std::fmt;

use ibp_core::IbpError;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

// Re-export 主要類型
pub use json_file::JsonFileStore;
pub use memory::MemoryStore;

/// 文件集合
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Collection {
    /// 配方（BOM）
    Bom,
    Demand,
    PurchasePrices,
    SalePrices,
    Inventory,
    /// 採購需求（衍生）
    Purchasing,
    Pnl,
    /// 目前採購單
    PurchaseOrder,
    /// 採購單歷史（最新在前）
    PurchaseOrderHistory,
    Catalog,
    SalesHistory,
    /// 配方成本快取
    RecipeCosts,
}

impl Collection {
    pub const ALL: [Collection; 12] = [
        Collection::Bom,
        Collection::Demand,
        Collection::PurchasePrices,
        Collection::SalePrices,
        Collection::Inventory,
        Collection::Purchasing,
        Collection::Pnl,
        Collection::PurchaseOrder,
        Collection::PurchaseOrderHistory,
        Collection::Catalog,
        Collection::SalesHistory,
        Collection::RecipeCosts,
    ];

    /// 集合名稱（亦為檔名主體）
    pub fn name(&self) -> &'static str {
        match self {
            Collection::Bom => "bom",
            Collection::Demand => "demand",
            Collection::PurchasePrices => "prices_purchase",
            Collection::SalePrices => "prices_sales",
            Collection::Inventory => "inventory",
            Collection::Purchasing => "purchasing",
            Collection::Pnl => "pnl",
            Collection::PurchaseOrder => "purchase_order",
            Collection::PurchaseOrderHistory => "purchase_orders_history",
            Collection::Catalog => "catalog",
            Collection::SalesHistory => "history_sales",
            Collection::RecipeCosts => "costs_recipes",
        }
    }

    pub fn file_name(&self) -> String {
        format!("{}.json", self.name())
    }
}

impl fmt::Display for Collection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// 儲存錯誤
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("讀寫 {collection} 失敗: {source}")]
    Io {
        collection: Collection,
        #[source]
        source: std::io::Error,
    },

    #[error("{collection} 不是有效的 JSON: {source}")]
    Parse {
        collection: Collection,
        #[source]
        source: serde_json::Error,
    },

    #[error("{collection} 序列化失敗: {source}")]
    Serialize {
        collection: Collection,
        #[source]
        source: serde_json::Error,
    },

    #[error("{0} 拒絕寫入")]
    Rejected(Collection),

    #[error("儲存鎖已損毀")]
    Poisoned,
}

impl From<StoreError> for IbpError {
    fn from(err: StoreError) -> Self {
        IbpError::Storage(err.to_string())
    }
}

/// 文件儲存介面
///
/// 每次操作整份讀取或整份覆寫一個集合；不提供跨集合交易。
pub trait DocumentStore: Send + Sync {
    /// 讀取集合，不存在時回傳 `None`
    fn read_raw(&self, collection: Collection) -> Result<Option<Value>, StoreError>;

    /// 整份覆寫集合
    fn write_raw(&self, collection: Collection, document: Value) -> Result<(), StoreError>;
}

/// 具型別的讀寫輔助
pub trait DocumentStoreExt: DocumentStore {
    /// 讀取並解析文件；不存在、讀取失敗或格式錯誤時回傳 `fallback`
    fn read_or<T: DeserializeOwned>(&self, collection: Collection, fallback: T) -> T {
        match self.read_raw(collection) {
            Ok(Some(value)) => match serde_json::from_value(value) {
                Ok(document) => document,
                Err(err) => {
                    tracing::warn!("{} 格式錯誤，改用預設值: {}", collection, err);
                    fallback
                }
            },
            Ok(None) => fallback,
            Err(err) => {
                tracing::warn!("讀取 {} 失敗，改用預設值: {}", collection, err);
                fallback
            }
        }
    }

    /// 讀取清單文件；非陣列視為空清單，無法解析的元素略過
    fn read_list<T: DeserializeOwned>(&self, collection: Collection) -> Vec<T> {
        match self.read_raw(collection) {
            Ok(Some(value)) => {
                if !value.is_array() {
                    tracing::warn!("{} 不是清單，視為空清單", collection);
                }
                ibp_core::lenient::collection(value)
            }
            Ok(None) => Vec::new(),
            Err(err) => {
                tracing::warn!("讀取 {} 失敗，視為空清單: {}", collection, err);
                Vec::new()
            }
        }
    }

    /// 序列化並整份覆寫文件
    fn write<T: Serialize + ?Sized>(&self, collection: Collection, document: &T) -> Result<(), StoreError> {
        let value = serde_json::to_value(document)
            .map_err(|source| StoreError::Serialize { collection, source })?;
        self.write_raw(collection, value)?;
        tracing::debug!("已寫入 {}", collection);
        Ok(())
    }
}

impl<S: DocumentStore + ?Sized> DocumentStoreExt for S {}
