//! 需求預測（固定視窗移動平均）

use std::collections::HashMap;

use chrono::NaiveDateTime;
use ibp_core::money::{round_whole, saturating_sum};
use ibp_core::{DemandEntry, SalesHistoryRow};
use rust_decimal::Decimal;

/// 需求預測引擎
pub struct ForecastEngine;

impl ForecastEngine {
    /// 以最近 `window` 筆歷史銷售的平均值預測每項成品的需求
    ///
    /// - 缺少成品名稱或日期（含無法解析的日期）的紀錄先行剔除
    /// - 依成品首次出現順序輸出，同日期保持原順序
    /// - 歷史不足視窗長度時以現有筆數平均，不補 0
    /// - 預測值四捨五入為整數，最小為 0
    pub fn forecast(history: &[SalesHistoryRow], window: usize) -> Vec<DemandEntry> {
        let window = window.max(1);

        let mut order: Vec<String> = Vec::new();
        let mut grouped: HashMap<String, Vec<(NaiveDateTime, Decimal)>> = HashMap::new();

        for row in history {
            let product = row.product.trim();
            if product.is_empty() {
                continue;
            }
            let Some(date) = row.parsed_date() else {
                continue;
            };

            grouped
                .entry(product.to_string())
                .or_insert_with(|| {
                    order.push(product.to_string());
                    Vec::new()
                })
                .push((date, row.qty));
        }

        let forecast: Vec<DemandEntry> = order
            .into_iter()
            .filter_map(|product| {
                let mut series = grouped.remove(&product)?;
                // sort_by_key 為穩定排序
                series.sort_by_key(|(date, _)| *date);

                let recent = &series[series.len().saturating_sub(window)..];
                if recent.is_empty() {
                    return None;
                }
                let total = saturating_sum(recent.iter().map(|(_, qty)| *qty));
                let mean = total / Decimal::from(recent.len());

                Some(DemandEntry::new(product, round_whole(mean).max(Decimal::ZERO)))
            })
            .collect();

        tracing::debug!("需求預測完成：視窗 {}，{} 項成品", window, forecast.len());
        forecast
    }

    /// 清理歷史銷售資料：剔除缺少成品名稱或日期無法解析的紀錄
    pub fn sanitize(rows: Vec<SalesHistoryRow>) -> Vec<SalesHistoryRow> {
        let before = rows.len();
        let kept: Vec<SalesHistoryRow> = rows.into_iter().filter(SalesHistoryRow::is_usable).collect();
        if kept.len() < before {
            tracing::debug!("剔除 {} 筆無效歷史銷售", before - kept.len());
        }
        kept
    }
}
