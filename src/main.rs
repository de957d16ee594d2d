//! ibp - 咖啡店整合營運規劃命令列工具
//!
//! 讀寫 `data_dir` 下的 JSON 文件，結果以 JSON 輸出至 stdout，日誌輸出至 stderr。

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use ibp::prelude::*;
use rust_decimal::Decimal;
use serde::Serialize;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

/// ibp - 咖啡店整合營運規劃
#[derive(Parser, Debug)]
#[command(name = "ibp")]
#[command(version, about, long_about = None)]
struct Cli {
    /// 設定檔路徑（預設讀取 config/ibp.toml，若存在）
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// JSON 文件目錄（覆寫設定檔）
    #[arg(long)]
    data_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// 全部重新計算（採購需求、月營收、損益）
    Recalc,

    /// 損益表
    Pnl,

    /// 假設情境試算
    WhatIf {
        /// 營收增減百分比（例如 10 代表 +10%）
        #[arg(long, default_value = "0", allow_hyphen_values = true)]
        sales_uplift: Decimal,

        /// 覆寫銷貨成本比例
        #[arg(long)]
        cogs_pct: Option<Decimal>,

        /// 覆寫外送成本比例
        #[arg(long)]
        delivery_pct: Option<Decimal>,

        /// 原料成本倍數
        #[arg(long)]
        materials_multiplier: Option<Decimal>,

        /// 寫入損益
        #[arg(long)]
        apply: bool,
    },

    /// 定價與毛利
    Pricing,

    /// 庫存與警示
    Inventory,

    /// 以移動平均預測需求
    Forecast {
        /// 移動平均視窗
        #[arg(short, long)]
        window: Option<usize>,

        /// 以預測結果取代需求
        #[arg(long)]
        apply: bool,
    },

    /// 產生採購單
    Order {
        /// 收貨模式：同時將數量加入庫存
        #[arg(long)]
        receive: bool,
    },

    /// 採購單歷史
    History,

    /// 匯出採購單
    ExportOrder {
        /// 採購單編號（預設為目前採購單）
        #[arg(long)]
        id: Option<String>,

        /// 匯出格式
        #[arg(long, value_enum, default_value = "csv")]
        format: ExportFormat,
    },

    /// 整合摘要（營收、原料成本、淨利）
    Summary,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum ExportFormat {
    Csv,
    Text,
}

fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let mut config = ibp::config::load(cli.config.as_deref()).context("載入設定失敗")?;
    if let Some(data_dir) = cli.data_dir {
        config.data_dir = data_dir;
    }

    init_tracing(&config.log_filter);
    tracing::debug!("資料目錄: {}", config.data_dir.display());

    let store = JsonFileStore::new(config.data_dir.clone());
    let service = PlanningService::new(store, config);

    run(&service, cli.command)
}

fn init_tracing(default_filter: &str) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_filter))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .with(filter)
        .init();
}

fn run(service: &PlanningService<JsonFileStore>, command: Commands) -> Result<()> {
    match command {
        Commands::Recalc => {
            if service.is_consistent() {
                tracing::info!("損益已是最新，仍全部重新計算");
            } else {
                tracing::info!("損益與上游文件不一致，重新計算");
            }
            recalc(service)
        }

        Commands::Pnl => print_json(&service.pnl()?),

        Commands::WhatIf {
            sales_uplift,
            cogs_pct,
            delivery_pct,
            materials_multiplier,
            apply,
        } => {
            let overrides = WhatIfOverrides {
                sales_uplift_pct: sales_uplift,
                cogs_pct_override: cogs_pct,
                delivery_pct_override: delivery_pct,
                materials_multiplier,
            };
            if apply {
                print_json(&service.apply_what_if(&overrides)?)
            } else {
                print_json(&service.what_if(&overrides)?)
            }
        }

        Commands::Pricing => print_json(&service.pricing()),

        Commands::Inventory => print_json(&service.inventory()),

        Commands::Forecast { window, apply } => {
            let result = service.forecast(window, apply)?;
            if let Some(RecalcOutcome::Failed { error, .. }) = &result.recalculation {
                eprintln!("需求已更新，但重新計算失敗: {}", error);
            }
            print_json(&result)
        }

        Commands::Order { receive } => {
            let mode = if receive {
                OrderMode::Receiving
            } else {
                OrderMode::Draft
            };
            let order = service.generate_purchase_order(mode)?;
            if order.is_empty() {
                eprintln!("沒有需要採購的項目");
            }
            print_json(&order)
        }

        Commands::History => print_json(&service.purchase_order_history()),

        Commands::ExportOrder { id, format } => {
            let order = match id {
                Some(id) => service.purchase_order(&id)?,
                None => service
                    .current_purchase_order()
                    .context("尚未產生任何採購單")?,
            };

            match format {
                ExportFormat::Csv => print!("{}", OrderExporter::to_csv(&order)?),
                ExportFormat::Text => {
                    let pages = OrderExporter::to_pages(&order, service.config().order_page_lines);
                    println!("{}", pages.join("\n\x0c\n"));
                }
            }
            Ok(())
        }

        Commands::Summary => print_json(&service.integrated_summary()),
    }
}

fn recalc(service: &PlanningService<JsonFileStore>) -> Result<()> {
    match service.recalculate_all() {
        RecalcOutcome::Completed(report) => {
            for warning in &report.requirements.warnings {
                eprintln!("警告 [{}]: {}", warning.subject, warning.message);
            }
            print_json(&report.requirements.to_document())?;
            print_json(&report.pnl)
        }
        RecalcOutcome::Failed { error, .. } => bail!("重新計算失敗: {}", error),
        RecalcOutcome::Skipped => Ok(()),
    }
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
