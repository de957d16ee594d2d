//! 需求模型

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::lenient;

/// 需求（本計劃期間每項成品的需求數量）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct DemandEntry {
    /// 成品名稱
    #[serde(default, deserialize_with = "lenient::text")]
    #[validate(length(min = 1, message = "成品名稱不得為空"))]
    pub product: String,

    /// 需求數量
    #[serde(default, deserialize_with = "lenient::decimal")]
    #[validate(custom(function = "crate::non_negative"))]
    pub quantity: Decimal,
}

impl DemandEntry {
    /// 創建新的需求
    pub fn new(product: String, quantity: Decimal) -> Self {
        Self { product, quantity }
    }
}

/// 歷史銷售紀錄（預測輸入）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SalesHistoryRow {
    #[serde(default, deserialize_with = "lenient::text")]
    pub product: String,

    /// 日期（`YYYY-MM-DD` 或 RFC 3339）
    #[serde(default, deserialize_with = "lenient::text")]
    pub date: String,

    /// 銷售數量（非數字視為 0）
    #[serde(default, deserialize_with = "lenient::decimal")]
    pub qty: Decimal,
}

impl SalesHistoryRow {
    /// 創建新的歷史銷售紀錄
    pub fn new(product: &str, date: &str, qty: Decimal) -> Self {
        Self {
            product: product.to_string(),
            date: date.to_string(),
            qty,
        }
    }

    /// 解析日期，無法解析時回傳 None
    pub fn parsed_date(&self) -> Option<NaiveDateTime> {
        let date = self.date.trim();
        if let Ok(day) = NaiveDate::parse_from_str(date, "%Y-%m-%d") {
            return day.and_hms_opt(0, 0, 0);
        }
        if let Ok(stamp) = DateTime::parse_from_rfc3339(date) {
            return Some(stamp.naive_utc());
        }
        NaiveDateTime::parse_from_str(date, "%Y-%m-%dT%H:%M:%S").ok()
    }

    /// 是否具備成品名稱與可解析日期
    pub fn is_usable(&self) -> bool {
        !self.product.trim().is_empty() && self.parsed_date().is_some()
    }
}
