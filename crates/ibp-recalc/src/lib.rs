//! # IBP Recalc
//!
//! 上游文件寫入後的重新計算，以及對外的規劃服務入口。

pub mod dirty_tracking;
pub mod orchestrator;
pub mod service;

pub use dirty_tracking::DirtyTracker;
pub use orchestrator::{RecalcOutcome, RecalcReport, Recalculator};
pub use service::{ForecastResult, PlanningService};
