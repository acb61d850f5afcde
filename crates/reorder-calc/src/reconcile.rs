//! 庫存確認

use std::collections::HashMap;

use reorder_core::{ForecastConfig, LogicalField, SalesLedger, SheetRow, StockReading, StockSnapshotEntry};

use crate::{ForecastWarning, RunDiagnostics};

/// 庫存確認器
///
/// 先以最近一期報表的庫存為準，標記為不可用者再以商品目錄快照補齊。
pub struct StockReconciler<'a> {
    config: &'a ForecastConfig,
}

impl<'a> StockReconciler<'a> {
    pub fn new(config: &'a ForecastConfig) -> Self {
        Self { config }
    }

    /// 以最近一期的庫存列設定庫存
    pub fn apply_latest_period(
        &self,
        ledger: &mut SalesLedger,
        rows: &[SheetRow],
        diagnostics: &mut RunDiagnostics,
    ) {
        let headers = &self.config.headers;

        for row in rows {
            let sku = row.sku(headers);
            let aggregate = match ledger.get_mut(&sku) {
                Some(aggregate) => aggregate,
                None => continue,
            };

            let reading = StockReading::from_cell(row.cell(headers, LogicalField::Stock), self.config);

            match reading {
                StockReading::Quantity(qty) => {
                    aggregate.stock = qty;
                    aggregate.stock_needs_external_update = false;
                    diagnostics.summary.stock_values_set += 1;
                }
                StockReading::Unavailable => {
                    aggregate.stock_needs_external_update = true;
                    diagnostics.summary.stock_sentinel_count += 1;
                }
                StockReading::Invalid(value) => {
                    aggregate.stock = 0;
                    aggregate.stock_needs_external_update = false;
                    diagnostics.summary.stock_invalid_count += 1;
                    diagnostics.add_warning(ForecastWarning::warning(
                        Some(sku.clone()),
                        format!("無效的庫存值 '{}'，以 0 計", value),
                    ));
                }
            }
        }

        tracing::info!(
            "最近一期庫存：設定 {} 筆，{} 筆需由商品目錄補齊",
            diagnostics.summary.stock_values_set,
            diagnostics.summary.stock_sentinel_count
        );
    }

    /// 以商品目錄快照補齊標記為不可用的庫存
    ///
    /// 找不到快照的 SKU 保持庫存 0；標題為空時一併補上。
    pub fn patch_from_snapshot(
        &self,
        ledger: &mut SalesLedger,
        snapshot: &[StockSnapshotEntry],
        diagnostics: &mut RunDiagnostics,
    ) {
        let lookup: HashMap<&str, (&StockSnapshotEntry, u64)> = snapshot
            .iter()
            .filter_map(|entry| entry.usable_stock().map(|qty| (entry.sku.trim(), (entry, qty))))
            .collect();
        diagnostics.summary.snapshot_entries_usable = lookup.len();

        let mut patched = 0;
        for aggregate in ledger.iter_mut() {
            if !aggregate.stock_needs_external_update {
                continue;
            }

            match lookup.get(aggregate.sku.as_str()) {
                Some((entry, qty)) => {
                    aggregate.stock = *qty;
                    if aggregate.title.trim().is_empty() {
                        aggregate.title = entry.name.clone();
                    }
                    patched += 1;
                }
                None => {
                    tracing::debug!("SKU {} 在商品目錄中找不到庫存，以 0 計", aggregate.sku);
                }
            }
        }

        diagnostics.summary.stock_patched_from_snapshot = patched;
        diagnostics.summary.zero_stock_with_sales = ledger
            .iter()
            .filter(|a| a.stock == 0 && a.total_sold > 0)
            .count();

        tracing::info!("由商品目錄補齊庫存 {} 筆", patched);
        tracing::info!(
            "有銷售紀錄但零庫存的商品 {} 筆",
            diagnostics.summary.zero_stock_with_sales
        );
    }
}
