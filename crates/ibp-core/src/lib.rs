//! # IBP Core
//!
//! 核心資料模型與類型定義

pub mod catalog;
pub mod config;
pub mod demand;
pub mod inventory;
pub mod lenient;
pub mod money;
pub mod order;
pub mod pnl;
pub mod price;
pub mod recipe;
pub mod requirement;

// Re-export 主要類型
pub use catalog::CatalogProduct;
pub use config::PlanningConfig;
pub use demand::{DemandEntry, SalesHistoryRow};
pub use inventory::{InventoryRecord, InventoryRow, StockAlert};
pub use order::{OrderLine, OrderMode, PurchaseOrder};
pub use pnl::{FixedCost, PnlState, WhatIfOverrides, WhatIfPreview};
pub use price::{PurchasePrice, RecipeCost, SalePrice, SalePriceInput};
pub use recipe::{Ingredient, Recipe};
pub use requirement::{PurchasingDocument, RequirementLine};

use validator::{Validate, ValidationErrors, ValidationErrorsKind};

/// IBP 錯誤類型
#[derive(Debug, thiserror::Error)]
pub enum IbpError {
    #[error("欄位 {field} 無效: {message}")]
    Validation { field: String, message: String },

    #[error("找不到{entity}: {id}")]
    NotFound { entity: String, id: String },

    #[error("儲存錯誤: {0}")]
    Storage(String),

    #[error("重新計算失敗: {0}")]
    Recalculation(String),

    #[error("匯出錯誤: {0}")]
    Export(String),
}

impl IbpError {
    /// 建立驗證錯誤
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Validation {
            field: field.into(),
            message: message.into(),
        }
    }

    /// 建立查無資料錯誤
    pub fn not_found(entity: impl Into<String>, id: impl Into<String>) -> Self {
        Self::NotFound {
            entity: entity.into(),
            id: id.into(),
        }
    }

    /// 驗證錯誤的欄位名稱（其他錯誤回傳 None）
    pub fn field(&self) -> Option<&str> {
        match self {
            Self::Validation { field, .. } => Some(field),
            _ => None,
        }
    }
}

impl From<ValidationErrors> for IbpError {
    fn from(errors: ValidationErrors) -> Self {
        Self::Validation {
            field: first_invalid_field(&errors),
            message: errors.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, IbpError>;

/// 逐筆驗證集合，錯誤欄位加上 `collection[index].` 前綴
pub fn validate_each<T: Validate>(collection: &str, items: &[T]) -> Result<()> {
    for (index, item) in items.iter().enumerate() {
        if let Err(errors) = item.validate() {
            return Err(IbpError::Validation {
                field: format!("{}[{}].{}", collection, index, first_invalid_field(&errors)),
                message: errors.to_string(),
            });
        }
    }
    Ok(())
}

/// 取得第一個（依名稱排序）驗證失敗的欄位路徑
fn first_invalid_field(errors: &ValidationErrors) -> String {
    let mut entries: Vec<_> = errors.errors().iter().collect();
    entries.sort_by(|a, b| a.0.cmp(b.0));

    let Some((name, kind)) = entries.first() else {
        return String::new();
    };

    match kind {
        ValidationErrorsKind::Field(_) => name.to_string(),
        ValidationErrorsKind::Struct(inner) => format!("{}.{}", name, first_invalid_field(inner)),
        ValidationErrorsKind::List(items) => match items.iter().next() {
            Some((index, inner)) => format!("{}[{}].{}", name, index, first_invalid_field(inner)),
            None => name.to_string(),
        },
    }
}

/// 自訂驗證：數值不得為負
pub(crate) fn non_negative(
    value: &rust_decimal::Decimal,
) -> std::result::Result<(), validator::ValidationError> {
    if value.is_sign_negative() && !value.is_zero() {
        let mut error = validator::ValidationError::new("non_negative");
        error.message = Some("不得為負數".into());
        return Err(error);
    }
    Ok(())
}
