//! # Reorder Core
//!
//! 補貨預測的核心資料模型與類型定義

pub mod config;
pub mod forecast;
pub mod rounding;
pub mod sales;
pub mod sheet;
pub mod stock;

// Re-export 主要類型
pub use config::{CategoryParameters, ForecastConfig, HeaderAliases};
pub use forecast::{ForecastResult, ProductGroup, ProductTag, ReorderDecision};
pub use sales::{SalesAggregate, SalesLedger, WeeklySalesPeriod, WEEKS_TRACKED};
pub use sheet::{LogicalField, SheetRow};
pub use stock::{StockReading, StockSnapshotEntry};

/// 補貨預測錯誤類型
#[derive(Debug, thiserror::Error)]
pub enum ForecastError {
    #[error("無效的配置: {0}")]
    InvalidConfig(String),

    #[error("欄位 {field} 無法解析: {value}")]
    MalformedField { field: &'static str, value: String },

    #[error("無效的日期: {0}")]
    InvalidDate(String),

    #[error("週次索引超出範圍: {0}")]
    WeekOutOfRange(usize),

    #[error("欄位 {field} 累計溢位: {value}")]
    Overflow { field: &'static str, value: String },
}

pub type Result<T> = std::result::Result<T, ForecastError>;
