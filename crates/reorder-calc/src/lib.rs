//! # Reorder Calculation Engine
//!
//! 核心補貨計算引擎：彙總 → 庫存確認 → 預測 → 排序分組

pub mod aggregation;
pub mod engine;
pub mod forecasting;
pub mod prioritize;
pub mod reconcile;

// Re-export 主要類型
pub use aggregation::RecordAggregator;
pub use engine::{ForecastInput, ReorderEngine};
pub use forecasting::{ForecastCalculator, ForecastMetrics};
pub use prioritize::Prioritizer;
pub use reconcile::StockReconciler;

use chrono::NaiveDate;
use reorder_core::{ForecastResult, ProductGroup};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// 補貨報表
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReorderReport {
    /// 執行ID
    pub run_id: Uuid,

    /// 計算基準日
    pub as_of: NaiveDate,

    /// 所有 SKU 的補貨建議（依名次排序）
    pub results: Vec<ForecastResult>,

    /// 需要下單的分組
    pub buckets: Vec<ReportBucket>,

    /// 執行統計
    pub summary: RunSummary,

    /// 警告信息
    pub warnings: Vec<ForecastWarning>,

    /// 計算耗時（毫秒）
    pub calculation_time_ms: Option<u64>,
}

impl ReorderReport {
    /// 創建空的報表
    pub fn empty(as_of: NaiveDate) -> Self {
        Self {
            run_id: Uuid::new_v4(),
            as_of,
            results: Vec::new(),
            buckets: Vec::new(),
            summary: RunSummary::default(),
            warnings: Vec::new(),
            calculation_time_ms: None,
        }
    }

    /// 取得某個分組
    pub fn bucket(&self, group: ProductGroup) -> Option<&ReportBucket> {
        self.buckets.iter().find(|b| b.group == group)
    }

    /// 需要下單的總列數
    pub fn rows_to_order(&self) -> usize {
        self.buckets.iter().map(|b| b.rows.len()).sum()
    }
}

/// 報表分組
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportBucket {
    pub group: ProductGroup,
    pub rows: Vec<BucketRow>,
}

/// 分組內的一列
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BucketRow {
    /// 分組內名次（依 12 週總銷量）
    pub bucket_rank: u32,

    #[serde(flatten)]
    pub result: ForecastResult,
}

/// 執行統計
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunSummary {
    /// 成功載入的週數
    pub periods_loaded: usize,
    /// 略過的週（名稱）
    pub periods_skipped: Vec<String>,
    /// 處理的銷售列數
    pub sales_rows_processed: usize,
    /// 有銷售紀錄的 SKU 數
    pub unique_skus: usize,
    /// 由最近一期設定庫存的 SKU 數
    pub stock_values_set: usize,
    /// 最近一期庫存為標記值的 SKU 數
    pub stock_sentinel_count: usize,
    /// 最近一期庫存無效的 SKU 數
    pub stock_invalid_count: usize,
    /// 可用的庫存快照項目數
    pub snapshot_entries_usable: usize,
    /// 由庫存快照補齊的 SKU 數
    pub stock_patched_from_snapshot: usize,
    /// 套用的採購單數
    pub purchase_orders_applied: usize,
    /// 有銷量但零庫存的 SKU 數
    pub zero_stock_with_sales: usize,
    /// 評估的商品數
    pub products_evaluated: usize,
    /// 標記為補貨的商品數
    pub products_flagged: usize,
    /// 需要下單的商品數
    pub products_to_order: usize,
    /// 是否注入了診斷測試列
    pub diagnostic_row_injected: bool,
}

/// 執行期間的診斷資訊（統計與警告）
#[derive(Debug, Clone, Default)]
pub struct RunDiagnostics {
    pub summary: RunSummary,
    pub warnings: Vec<ForecastWarning>,
}

impl RunDiagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    /// 添加警告（同時寫入日誌）
    pub fn add_warning(&mut self, warning: ForecastWarning) {
        match warning.severity {
            WarningSeverity::Info => {
                tracing::info!(sku = ?warning.sku, "{}", warning.message)
            }
            WarningSeverity::Warning => {
                tracing::warn!(sku = ?warning.sku, "{}", warning.message)
            }
            WarningSeverity::Error => {
                tracing::error!(sku = ?warning.sku, "{}", warning.message)
            }
        }
        self.warnings.push(warning);
    }
}

/// 補貨計算警告
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForecastWarning {
    pub sku: Option<String>,
    pub message: String,
    pub severity: WarningSeverity,
}

impl ForecastWarning {
    pub fn new(sku: Option<String>, message: String, severity: WarningSeverity) -> Self {
        Self {
            sku,
            message,
            severity,
        }
    }

    pub fn warning(sku: Option<String>, message: String) -> Self {
        Self::new(sku, message, WarningSeverity::Warning)
    }

    pub fn error(sku: Option<String>, message: String) -> Self {
        Self::new(sku, message, WarningSeverity::Error)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WarningSeverity {
    Info,
    Warning,
    Error,
}
