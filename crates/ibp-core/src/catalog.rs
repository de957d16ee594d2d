//! 商品目錄模型

use serde::{Deserialize, Serialize};

use crate::lenient;

fn default_active() -> bool {
    true
}

/// 目錄商品（以 SKU 為唯一鍵）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogProduct {
    #[serde(default, deserialize_with = "lenient::text")]
    pub sku: String,

    #[serde(default, deserialize_with = "lenient::text")]
    pub name: String,

    #[serde(
        default,
        deserialize_with = "lenient::optional_text",
        skip_serializing_if = "Option::is_none"
    )]
    pub category: Option<String>,

    /// 是否上架（接受布林、"true"/"false" 字串或 0/1）
    #[serde(default = "default_active", deserialize_with = "lenient::flag")]
    pub is_active: bool,
}

impl CatalogProduct {
    /// 創建新的目錄商品（預設為上架）
    pub fn new(sku: &str, name: &str) -> Self {
        Self {
            sku: sku.to_string(),
            name: name.to_string(),
            category: None,
            is_active: true,
        }
    }

    /// 建構器模式：設置分類
    pub fn with_category(mut self, category: &str) -> Self {
        self.category = Some(category.to_string());
        self
    }

    /// 建構器模式：設置上架狀態
    pub fn with_active(mut self, is_active: bool) -> Self {
        self.is_active = is_active;
        self
    }

    /// 是否具備 SKU 與名稱
    pub fn is_identified(&self) -> bool {
        !self.sku.is_empty() && !self.name.is_empty()
    }

    /// 以新資料覆蓋既有商品（未提供分類時保留原分類）
    pub fn merge(&mut self, incoming: CatalogProduct) {
        self.name = incoming.name;
        if incoming.category.is_some() {
            self.category = incoming.category;
        }
        self.is_active = incoming.is_active;
    }
}
