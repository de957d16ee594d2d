//! 配方（BOM）模型

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::lenient;

/// 配方原料（每單位成品的用量）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct Ingredient {
    /// 原料名稱（同一配方內唯一）
    #[serde(default, deserialize_with = "lenient::text")]
    #[validate(length(min = 1, message = "原料名稱不得為空"))]
    pub item: String,

    /// 單位
    #[serde(default, deserialize_with = "lenient::text")]
    pub unit: String,

    /// 每單位成品用量
    #[serde(default, deserialize_with = "lenient::decimal")]
    #[validate(custom(function = "crate::non_negative"))]
    pub quantity: Decimal,
}

impl Ingredient {
    /// 創建新的配方原料
    pub fn new(item: String, unit: String, quantity: Decimal) -> Self {
        Self {
            item,
            unit,
            quantity,
        }
    }
}

/// 配方（以成品名稱為唯一鍵）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct Recipe {
    /// 成品名稱
    #[serde(default, deserialize_with = "lenient::text")]
    #[validate(length(min = 1, message = "成品名稱不得為空"))]
    pub product: String,

    /// 原料清單（保持輸入順序）
    #[serde(default, deserialize_with = "lenient::seq")]
    #[validate(nested)]
    pub ingredients: Vec<Ingredient>,
}

impl Recipe {
    /// 創建新的配方
    pub fn new(product: String, ingredients: Vec<Ingredient>) -> Self {
        Self {
            product,
            ingredients,
        }
    }

    /// 建構器模式：添加原料
    pub fn with_ingredient(mut self, item: &str, unit: &str, quantity: Decimal) -> Self {
        self.ingredients
            .push(Ingredient::new(item.to_string(), unit.to_string(), quantity));
        self
    }

    /// 依成品名稱找配方（完全比對，第一筆優先）
    pub fn find<'a>(recipes: &'a [Recipe], product: &str) -> Option<&'a Recipe> {
        recipes.iter().find(|recipe| recipe.product == product)
    }

    /// 依成品名稱新增或取代配方，回傳是否為新增
    pub fn upsert(recipes: &mut Vec<Recipe>, recipe: Recipe) -> bool {
        match recipes.iter_mut().find(|r| r.product == recipe.product) {
            Some(existing) => {
                *existing = recipe;
                false
            }
            None => {
                recipes.push(recipe);
                true
            }
        }
    }
}
