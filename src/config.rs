//! 設定載入
//!
//! 依序疊加：
//! 1. 程式內預設值
//! 2. 設定檔（預設 `config/ibp.toml`，可不存在）
//! 3. `IBP_` 前綴的環境變數（例如 `IBP_DATA_DIR`、`IBP_FORECAST_WINDOW`）

use std::path::Path;

use config::{ConfigError, Environment, File};
use ibp_core::config::DEFAULT_FORECAST_WINDOW;
use ibp_core::PlanningConfig;

/// 預設設定檔（不含副檔名）
pub const DEFAULT_CONFIG_FILE: &str = "config/ibp";

/// 載入規劃引擎設定
pub fn load(path: Option<&Path>) -> Result<PlanningConfig, ConfigError> {
    let defaults = PlanningConfig::default();

    let file = match path {
        Some(path) => File::from(path).required(true),
        None => File::with_name(DEFAULT_CONFIG_FILE).required(false),
    };

    let settings = config::Config::builder()
        .set_default("data_dir", defaults.data_dir.to_string_lossy().to_string())?
        .set_default("forecast_window", DEFAULT_FORECAST_WINDOW as u64)?
        .set_default("log_filter", defaults.log_filter.clone())?
        .set_default("order_page_lines", defaults.order_page_lines as u64)?
        .add_source(file)
        .add_source(
            Environment::with_prefix("IBP")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        )
        .build()?;

    settings.try_deserialize()
}
