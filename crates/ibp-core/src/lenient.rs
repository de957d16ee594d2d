//! 寬鬆輸入轉換
//!
//! 文件內的欄位可能缺漏、型別錯誤或為數字字串。每個欄位只有一種預設解析順序：
//! - 數字：JSON 數字 → 數字字串 → 預設值 0
//! - 字串：JSON 字串 → 數字/布林轉字串 → 預設值 ""
//! - 計數：非負整數 → 數字字串 → 預設值 0
//! - 旗標：JSON 布林 → "true"/"false"/"1"/"0" 字串 → 數字（非 0 為真）→ 預設值 true
//! - 序列：JSON 陣列（逐筆轉換，無法解析的元素略過）→ 預設值 []

use std::str::FromStr;

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// 將 JSON 值轉為數值（無法解析時回傳 None）
pub fn to_decimal(value: &Value) -> Option<Decimal> {
    match value {
        Value::Number(number) => parse_decimal(&number.to_string()),
        Value::String(text) => parse_decimal(text.trim()),
        _ => None,
    }
}

fn parse_decimal(text: &str) -> Option<Decimal> {
    if text.is_empty() {
        return None;
    }
    Decimal::from_str(text)
        .or_else(|_| Decimal::from_scientific(text))
        .ok()
}

/// 將 JSON 值轉為布林（無法辨識時回傳 None）
pub fn to_flag(value: &Value) -> Option<bool> {
    match value {
        Value::Bool(flag) => Some(*flag),
        Value::Number(_) => to_decimal(value).map(|number| !number.is_zero()),
        Value::String(text) => match text.trim().to_ascii_lowercase().as_str() {
            "true" | "1" | "yes" => Some(true),
            "false" | "0" | "no" => Some(false),
            _ => None,
        },
        _ => None,
    }
}

/// 將 JSON 值轉為字串（null、物件、陣列視為缺漏）
pub fn to_text(value: &Value) -> Option<String> {
    match value {
        Value::String(text) => Some(text.trim().to_string()),
        Value::Number(number) => Some(number.to_string()),
        Value::Bool(flag) => Some(flag.to_string()),
        _ => None,
    }
}

/// 數值欄位：非數字視為 0
pub fn decimal<'de, D>(deserializer: D) -> Result<Decimal, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(to_decimal(&value).unwrap_or(Decimal::ZERO))
}

/// 計數欄位：負數、小數或非數字視為 0
pub fn count<'de, D>(deserializer: D) -> Result<usize, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(to_decimal(&value)
        .filter(|number| number.fract().is_zero() && !number.is_sign_negative())
        .and_then(|number| number.to_usize())
        .unwrap_or(0))
}

/// 旗標欄位：無法辨識時視為 true
pub fn flag<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(to_flag(&value).unwrap_or(true))
}

/// 可選數值欄位：null 或非數字視為未提供
pub fn optional_decimal<'de, D>(deserializer: D) -> Result<Option<Decimal>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(to_decimal(&value))
}

/// 字串欄位：缺漏視為空字串
pub fn text<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(to_text(&value).unwrap_or_default())
}

/// 可選字串欄位：空字串視為未提供
pub fn optional_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(to_text(&value).filter(|text| !text.is_empty()))
}

/// 序列欄位：非陣列視為空，無法解析的元素略過
pub fn seq<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::Array(items) => items
            .into_iter()
            .filter_map(|item| serde_json::from_value(item).ok())
            .collect(),
        _ => Vec::new(),
    })
}

/// 將整份文件解析為清單（非陣列視為空清單）
pub fn collection<T: DeserializeOwned>(value: Value) -> Vec<T> {
    match value {
        Value::Array(items) => items
            .into_iter()
            .filter_map(|item| serde_json::from_value(item).ok())
            .collect(),
        _ => Vec::new(),
    }
}
