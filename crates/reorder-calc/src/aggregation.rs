//! 銷售與採購紀錄彙總

use chrono::NaiveDate;
use reorder_core::{
    ForecastConfig, ForecastError, LogicalField, SalesAggregate, SalesLedger, SheetRow, WeeklySalesPeriod,
    WEEKS_TRACKED,
};
use rust_decimal::Decimal;

use crate::{ForecastWarning, RunDiagnostics};

/// 紀錄彙總器
pub struct RecordAggregator<'a> {
    config: &'a ForecastConfig,
}

impl<'a> RecordAggregator<'a> {
    pub fn new(config: &'a ForecastConfig) -> Self {
        Self { config }
    }

    /// 將各週銷售列彙總為每個 SKU 一筆
    ///
    /// 缺失的週整週略過；SKU 為空的列直接捨棄。
    pub fn aggregate_sales(
        &self,
        periods: &[WeeklySalesPeriod],
        diagnostics: &mut RunDiagnostics,
    ) -> SalesLedger {
        let headers = &self.config.headers;
        let mut ledger = SalesLedger::new();

        for period in periods {
            let label = period.display_label();

            if period.week_index >= WEEKS_TRACKED {
                diagnostics.add_warning(ForecastWarning::warning(
                    None,
                    format!(
                        "{}：{}，略過",
                        label,
                        ForecastError::WeekOutOfRange(period.week_index)
                    ),
                ));
                diagnostics.summary.periods_skipped.push(label);
                continue;
            }

            let rows = match &period.rows {
                Some(rows) => rows,
                None => {
                    diagnostics.add_warning(ForecastWarning::warning(
                        None,
                        format!("找不到 {} 的銷售資料，略過", label),
                    ));
                    diagnostics.summary.periods_skipped.push(label);
                    continue;
                }
            };

            tracing::debug!("處理 {}：{} 列", label, rows.len());
            diagnostics.summary.periods_loaded += 1;

            for row in rows {
                let sku = row.sku(headers);
                if sku.is_empty() {
                    continue;
                }

                let sold = row.probe_integer(headers, LogicalField::Sold).unwrap_or(0);
                let revenue = row
                    .probe_decimal(headers, LogicalField::Revenue)
                    .unwrap_or(Decimal::ZERO);

                let recorded = ledger
                    .entry_or_insert_with(&sku, || {
                        SalesAggregate::new(
                            sku.clone(),
                            row.text(headers, LogicalField::Title),
                            row.text(headers, LogicalField::Category),
                        )
                    })
                    .record_week(period.week_index, sold, revenue);

                match recorded {
                    Ok(()) => diagnostics.summary.sales_rows_processed += 1,
                    Err(e) => diagnostics.add_warning(ForecastWarning::error(
                        Some(sku),
                        format!("{} 的銷售列略過：{}", label, e),
                    )),
                }
            }
        }

        diagnostics.summary.unique_skus = ledger.len();
        tracing::info!(
            "彙總完成：載入 {} 週，{} 列，{} 個 SKU",
            diagnostics.summary.periods_loaded,
            diagnostics.summary.sales_rows_processed,
            ledger.len()
        );

        ledger
    }

    /// 套用採購單，累計近期已訂購量
    ///
    /// 未知 SKU 與空日期的列直接略過；日期或數量無法解析的列記錄警告後略過。
    pub fn apply_purchase_orders(
        &self,
        ledger: &mut SalesLedger,
        rows: &[SheetRow],
        as_of: NaiveDate,
        diagnostics: &mut RunDiagnostics,
    ) {
        let headers = &self.config.headers;
        let mut applied = 0;

        for row in rows {
            let sku = row.sku(headers);
            if sku.is_empty() || !ledger.contains(&sku) {
                continue;
            }

            let order_date = match row.date(headers, LogicalField::OrderDate) {
                Ok(Some(date)) => date,
                Ok(None) => continue,
                Err(e) => {
                    diagnostics.add_warning(ForecastWarning::warning(
                        Some(sku),
                        format!("採購單略過：{}", e),
                    ));
                    continue;
                }
            };

            let quantity = match row.integer(headers, LogicalField::QuantityOrdered) {
                Ok(quantity) => quantity,
                Err(e) => {
                    diagnostics.add_warning(ForecastWarning::warning(
                        Some(sku),
                        format!("採購單略過：{}", e),
                    ));
                    continue;
                }
            };

            let age_days = (as_of - order_date).num_days();
            if let Some(aggregate) = ledger.get_mut(&sku) {
                aggregate.record_purchase_order(
                    quantity,
                    age_days,
                    self.config.order_window_days,
                    self.config.recent_order_window_days,
                );
                applied += 1;
            }
        }

        diagnostics.summary.purchase_orders_applied = applied;
        tracing::info!("套用採購單 {} 筆", applied);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use serde_json::json;

    fn sales_row(sku: &str, sold: i64, revenue: f64) -> SheetRow {
        SheetRow::new()
            .with("SKU", sku)
            .with("Product title", format!("Product {}", sku))
            .with("Category", "Plants")
            .with("Items sold", sold)
            .with("Revenue", revenue)
    }

    fn po_row(sku: &str, date: &str, qty: serde_json::Value) -> SheetRow {
        SheetRow::new()
            .with("SKU", sku)
            .with("Purchase Order Date", date)
            .with("QuantityOrdered", qty)
    }

    #[test]
    fn test_aggregate_across_weeks() {
        let config = ForecastConfig::default();
        let aggregator = RecordAggregator::new(&config);
        let mut diagnostics = RunDiagnostics::new();

        let periods = vec![
            WeeklySalesPeriod::loaded(0, vec![sales_row("A", 3, 30.0)]),
            WeeklySalesPeriod::loaded(
                11,
                vec![
                    sales_row("A", 5, 50.0),
                    sales_row("B", 1, 12.5),
                    sales_row("  ", 9, 90.0),
                ],
            ),
        ];

        let ledger = aggregator.aggregate_sales(&periods, &mut diagnostics);

        assert_eq!(ledger.len(), 2);

        let a = ledger.get("A").unwrap();
        assert_eq!(a.weekly_sales[0], 3);
        assert_eq!(a.weekly_sales[11], 5);
        assert_eq!(a.total_sold, 8);
        assert_eq!(a.revenue, Decimal::from(80));
        assert_eq!(a.title, "Product A");

        assert_eq!(diagnostics.summary.sales_rows_processed, 3);
        assert_eq!(diagnostics.summary.unique_skus, 2);
    }

    #[test]
    fn test_first_row_sets_title_and_category() {
        let config = ForecastConfig::default();
        let aggregator = RecordAggregator::new(&config);
        let mut diagnostics = RunDiagnostics::new();

        let periods = vec![
            WeeklySalesPeriod::loaded(
                3,
                vec![SheetRow::new()
                    .with("SKU", "X")
                    .with("Product title", "Original")
                    .with("Category", "Seeds")],
            ),
            WeeklySalesPeriod::loaded(
                4,
                vec![SheetRow::new()
                    .with("SKU", "X")
                    .with("Product title", "Renamed")
                    .with("Category", "Plants")],
            ),
        ];

        let ledger = aggregator.aggregate_sales(&periods, &mut diagnostics);
        let x = ledger.get("X").unwrap();

        assert_eq!(x.title, "Original");
        assert_eq!(x.category, "Seeds");
        assert_eq!(x.total_sold, 0);
    }

    #[test]
    fn test_unparsable_sold_defaults_to_zero() {
        let config = ForecastConfig::default();
        let aggregator = RecordAggregator::new(&config);
        let mut diagnostics = RunDiagnostics::new();

        let row = SheetRow::new()
            .with("SKU", "Y")
            .with("Items sold", "many")
            .with("N. Revenue", "19.99");
        let periods = vec![WeeklySalesPeriod::loaded(11, vec![row])];

        let ledger = aggregator.aggregate_sales(&periods, &mut diagnostics);
        let y = ledger.get("Y").unwrap();

        assert_eq!(y.total_sold, 0);
        assert_eq!(y.revenue, Decimal::new(1999, 2));
    }

    #[test]
    fn test_overflowing_revenue_skips_row_with_warning() {
        let config = ForecastConfig::default();
        let aggregator = RecordAggregator::new(&config);
        let mut diagnostics = RunDiagnostics::new();

        let huge = |sold: i64| {
            SheetRow::new()
                .with("SKU", "BULK")
                .with("Items sold", sold)
                .with("Revenue", "5e28")
        };
        let periods = vec![
            WeeklySalesPeriod::loaded(10, vec![huge(3)]),
            WeeklySalesPeriod::loaded(11, vec![huge(4), sales_row("A", 1, 1.0)]),
        ];

        let ledger = aggregator.aggregate_sales(&periods, &mut diagnostics);
        let bulk = ledger.get("BULK").unwrap();

        assert_eq!(bulk.total_sold, 3);
        assert_eq!(bulk.weekly_sales[11], 0);
        assert_eq!(bulk.revenue, Decimal::from_scientific("5e28").unwrap());
        assert_eq!(ledger.get("A").unwrap().total_sold, 1);

        assert_eq!(diagnostics.summary.sales_rows_processed, 2);
        assert_eq!(diagnostics.warnings.len(), 1);
        assert_eq!(diagnostics.warnings[0].sku.as_deref(), Some("BULK"));
        assert_eq!(diagnostics.warnings[0].severity, crate::WarningSeverity::Error);
    }

    #[test]
    fn test_missing_periods_do_not_change_other_weeks() {
        let config = ForecastConfig::default();
        let aggregator = RecordAggregator::new(&config);
        let mut diagnostics = RunDiagnostics::new();

        let mut periods: Vec<_> = (0..5).map(WeeklySalesPeriod::missing).collect();
        for (week, sold) in [(5, 10), (6, 10), (7, 10), (8, 10), (9, 10), (10, 4), (11, 6)] {
            periods.push(WeeklySalesPeriod::loaded(week, vec![sales_row("S", sold, 0.0)]));
        }

        let ledger = aggregator.aggregate_sales(&periods, &mut diagnostics);
        let s = ledger.get("S").unwrap();

        assert_eq!(s.weekly_sales, [0, 0, 0, 0, 0, 10, 10, 10, 10, 10, 4, 6]);
        assert_eq!(s.trailing_sales(8), 60);
        assert_eq!(diagnostics.summary.periods_loaded, 7);
        assert_eq!(diagnostics.summary.periods_skipped.len(), 5);
    }

    #[test]
    fn test_missing_and_out_of_range_periods_are_skipped() {
        let config = ForecastConfig::default();
        let aggregator = RecordAggregator::new(&config);
        let mut diagnostics = RunDiagnostics::new();

        let periods = vec![
            WeeklySalesPeriod::missing(4),
            WeeklySalesPeriod::loaded(12, vec![sales_row("Z", 1, 1.0)]),
            WeeklySalesPeriod::loaded(5, vec![sales_row("A", 2, 2.0)]),
        ];

        let ledger = aggregator.aggregate_sales(&periods, &mut diagnostics);

        assert_eq!(ledger.len(), 1);
        assert_eq!(
            diagnostics.summary.periods_skipped,
            vec!["Week 5".to_string(), "Week 13".to_string()]
        );
        assert_eq!(diagnostics.warnings.len(), 2);
    }

    #[test]
    fn test_purchase_order_windows() {
        let config = ForecastConfig::default();
        let aggregator = RecordAggregator::new(&config);
        let mut diagnostics = RunDiagnostics::new();

        let periods = vec![WeeklySalesPeriod::loaded(11, vec![sales_row("A", 5, 50.0)])];
        let mut ledger = aggregator.aggregate_sales(&periods, &mut diagnostics);

        let as_of = NaiveDate::from_ymd_opt(2025, 11, 30).unwrap();
        let orders = vec![
            po_row("A", "2025-11-25", json!(10)), // 5 天
            po_row("A", "2025-11-16", json!("4")), // 14 天
            po_row("A", "2025-10-31", json!(6)),  // 30 天
            po_row("A", "2025-10-30", json!(100)), // 31 天
            po_row("UNKNOWN", "2025-11-29", json!(50)),
            po_row("A", "", json!(50)),
            po_row("A", "30/11/2025", json!(50)),
            po_row("A", "2025-11-29", json!("lots")),
        ];

        aggregator.apply_purchase_orders(&mut ledger, &orders, as_of, &mut diagnostics);
        let a = ledger.get("A").unwrap();

        assert_eq!(a.recent_ordered_qty_30d, 20);
        assert_eq!(a.recent_ordered_qty_14d, 14);
        assert_eq!(diagnostics.summary.purchase_orders_applied, 4);
        // 只有日期格式錯誤與數量錯誤會產生警告
        assert_eq!(diagnostics.warnings.len(), 2);
    }

    proptest! {
        #[test]
        fn prop_total_sold_matches_weekly_sum(
            entries in proptest::collection::vec((0usize..12, 0usize..5, 0i64..50), 0..80)
        ) {
            let config = ForecastConfig::default();
            let aggregator = RecordAggregator::new(&config);
            let mut diagnostics = RunDiagnostics::new();

            let mut periods: Vec<WeeklySalesPeriod> =
                (0..WEEKS_TRACKED).map(|i| WeeklySalesPeriod::loaded(i, Vec::new())).collect();
            for (week, sku, sold) in &entries {
                if let Some(rows) = periods[*week].rows.as_mut() {
                    rows.push(sales_row(&format!("SKU-{}", sku), *sold, 1.0));
                }
            }

            let ledger = aggregator.aggregate_sales(&periods, &mut diagnostics);

            let distinct: std::collections::HashSet<_> = entries.iter().map(|e| e.1).collect();
            prop_assert_eq!(ledger.len(), distinct.len());
            for aggregate in ledger.iter() {
                prop_assert_eq!(aggregate.total_sold, aggregate.weekly_sales.iter().sum::<i64>());
            }
        }
    }
}
