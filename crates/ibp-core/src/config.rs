//! 規劃引擎設定

use std::path::PathBuf;

use serde::Deserialize;

/// 預設移動平均視窗
pub const DEFAULT_FORECAST_WINDOW: usize = 4;

/// 規劃引擎設定
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct PlanningConfig {
    /// JSON 文件存放目錄
    pub data_dir: PathBuf,

    /// 預測視窗（最小為 1）
    pub forecast_window: usize,

    /// 日誌過濾條件（`tracing_subscriber::EnvFilter` 語法）
    pub log_filter: String,

    /// 文字版採購單每頁明細行數
    pub order_page_lines: usize,
}

impl Default for PlanningConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("data"),
            forecast_window: DEFAULT_FORECAST_WINDOW,
            log_filter: "ibp=info".to_string(),
            order_page_lines: 40,
        }
    }
}

impl PlanningConfig {
    /// 創建新的設定
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
            ..Default::default()
        }
    }

    /// 建構器模式：設置預測視窗
    pub fn with_forecast_window(mut self, window: usize) -> Self {
        self.forecast_window = window;
        self
    }

    /// 建構器模式：設置日誌過濾條件
    pub fn with_log_filter(mut self, filter: &str) -> Self {
        self.log_filter = filter.to_string();
        self
    }

    /// 建構器模式：設置每頁明細行數
    pub fn with_order_page_lines(mut self, lines: usize) -> Self {
        self.order_page_lines = lines;
        self
    }

    /// 實際使用的預測視窗（至少為 1）
    pub fn effective_window(&self) -> usize {
        self.forecast_window.max(1)
    }
}
