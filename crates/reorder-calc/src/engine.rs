//! 補貨主計算器

use chrono::NaiveDate;
use reorder_core::{ForecastConfig, ForecastResult, SheetRow, StockSnapshotEntry, WeeklySalesPeriod};
use serde::{Deserialize, Serialize};

use crate::{
    ForecastCalculator, ForecastWarning, Prioritizer, RecordAggregator, ReorderReport,
    RunDiagnostics, StockReconciler,
};

/// 一次計算所需的全部輸入（已由外部來源取得）
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ForecastInput {
    /// 計算基準日（採購單天數以此計算）
    pub as_of: NaiveDate,

    /// 商品目錄庫存快照
    #[serde(default)]
    pub stock_snapshot: Vec<StockSnapshotEntry>,

    /// 各週銷售資料
    #[serde(default)]
    pub weekly_sales: Vec<WeeklySalesPeriod>,

    /// 最近一期的庫存列；`None` 表示無法取得
    #[serde(default)]
    pub latest_stock: Option<Vec<SheetRow>>,

    /// 採購單列；`None` 表示無法取得
    #[serde(default)]
    pub purchase_orders: Option<Vec<SheetRow>>,
}

impl ForecastInput {
    /// 創建空的輸入
    pub fn new(as_of: NaiveDate) -> Self {
        Self {
            as_of,
            stock_snapshot: Vec::new(),
            weekly_sales: Vec::new(),
            latest_stock: None,
            purchase_orders: None,
        }
    }

    /// 建構器模式：設置庫存快照
    pub fn with_stock_snapshot(mut self, snapshot: Vec<StockSnapshotEntry>) -> Self {
        self.stock_snapshot = snapshot;
        self
    }

    /// 建構器模式：加入一週銷售資料
    pub fn with_period(mut self, period: WeeklySalesPeriod) -> Self {
        self.weekly_sales.push(period);
        self
    }

    /// 建構器模式：設置最近一期庫存列
    pub fn with_latest_stock(mut self, rows: Vec<SheetRow>) -> Self {
        self.latest_stock = Some(rows);
        self
    }

    /// 建構器模式：設置採購單列
    pub fn with_purchase_orders(mut self, rows: Vec<SheetRow>) -> Self {
        self.purchase_orders = Some(rows);
        self
    }
}

/// 補貨計算器
pub struct ReorderEngine {
    config: ForecastConfig,
}

impl ReorderEngine {
    /// 創建新的補貨計算器（驗證配置）
    pub fn new(config: ForecastConfig) -> reorder_core::Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    /// 主計算入口
    ///
    /// 不會失敗：無法解析的列與缺失的來源都記為警告，報表可能為空。
    pub fn run(&self, input: &ForecastInput) -> ReorderReport {
        tracing::info!(
            "開始補貨計算：{} 週銷售資料，庫存快照 {} 筆，基準日 {}",
            input.weekly_sales.len(),
            input.stock_snapshot.len(),
            input.as_of
        );

        let start_time = std::time::Instant::now();
        let mut diagnostics = RunDiagnostics::new();

        // Step 1: 彙總銷售與採購紀錄
        tracing::debug!("Step 1: 彙總銷售紀錄");
        let aggregator = RecordAggregator::new(&self.config);
        let mut ledger = aggregator.aggregate_sales(&input.weekly_sales, &mut diagnostics);

        match &input.purchase_orders {
            Some(rows) => {
                aggregator.apply_purchase_orders(&mut ledger, rows, input.as_of, &mut diagnostics)
            }
            None => diagnostics.add_warning(ForecastWarning::warning(
                None,
                "無法取得採購單資料，近期已訂購量以 0 計".to_string(),
            )),
        }

        // Step 2: 確認庫存
        tracing::debug!("Step 2: 確認庫存");
        let reconciler = StockReconciler::new(&self.config);
        match &input.latest_stock {
            Some(rows) => reconciler.apply_latest_period(&mut ledger, rows, &mut diagnostics),
            None => diagnostics.add_warning(ForecastWarning::warning(
                None,
                "無法取得最近一期庫存資料".to_string(),
            )),
        }
        reconciler.patch_from_snapshot(&mut ledger, &input.stock_snapshot, &mut diagnostics);

        // Step 3: 逐 SKU 預測
        tracing::debug!("Step 3: 逐 SKU 預測（{} 個 SKU）", ledger.len());
        let calculator = ForecastCalculator::new(&self.config);
        let mut results: Vec<ForecastResult> = ledger
            .iter()
            .map(|aggregate| calculator.evaluate(aggregate))
            .collect();

        // Step 4: 排序、診斷列、分組
        tracing::debug!("Step 4: 排序與分組");
        let prioritizer = Prioritizer::new(&self.config);
        prioritizer.rank(&mut results);
        diagnostics.summary.diagnostic_row_injected = prioritizer.inject_diagnostic_row(&mut results);
        let buckets = prioritizer.group(&results);

        let summary = &mut diagnostics.summary;
        summary.products_evaluated = results.len();
        summary.products_flagged = results
            .iter()
            .filter(|r| r.reorder_decision.is_reorder())
            .count();
        summary.products_to_order = results.iter().filter(|r| r.needs_order()).count();

        tracing::info!(
            "補貨計算完成，耗時 {:?}：評估 {} 項，標記補貨 {} 項，需下單 {} 項",
            start_time.elapsed(),
            summary.products_evaluated,
            summary.products_flagged,
            summary.products_to_order
        );
        for bucket in &buckets {
            tracing::info!("  {}: {} 項", bucket.group, bucket.rows.len());
        }

        let mut report = ReorderReport::empty(input.as_of);
        report.results = results;
        report.buckets = buckets;
        report.summary = diagnostics.summary;
        report.warnings = diagnostics.warnings;
        report.calculation_time_ms = Some(start_time.elapsed().as_millis() as u64);
        report
    }
}
