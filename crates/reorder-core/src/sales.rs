//! 銷售彙總模型

use std::collections::HashMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::sheet::{LogicalField, SheetRow};
use crate::{ForecastError, Result};

/// 追蹤的週數（索引 0 = 最舊，11 = 最近一週）
pub const WEEKS_TRACKED: usize = 12;

/// 單週銷售資料來源
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeeklySalesPeriod {
    /// 週次索引（0..12）
    pub week_index: usize,

    /// 來源名稱（如 "Week 3"）
    #[serde(default)]
    pub label: Option<String>,

    /// 資料列；`None` 表示該週資料缺失或無法讀取
    #[serde(default)]
    pub rows: Option<Vec<SheetRow>>,
}

impl WeeklySalesPeriod {
    /// 創建已載入的週資料
    pub fn loaded(week_index: usize, rows: Vec<SheetRow>) -> Self {
        Self {
            week_index,
            label: None,
            rows: Some(rows),
        }
    }

    /// 創建缺失的週資料
    pub fn missing(week_index: usize) -> Self {
        Self {
            week_index,
            label: None,
            rows: None,
        }
    }

    /// 建構器模式：設置來源名稱
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// 顯示名稱，未設置時為 "Week N"
    pub fn display_label(&self) -> String {
        self.label
            .clone()
            .unwrap_or_else(|| format!("Week {}", self.week_index + 1))
    }
}

/// 單一 SKU 的銷售彙總
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SalesAggregate {
    pub sku: String,
    pub title: String,
    pub category: String,

    /// 現有庫存（確認前為 0）
    pub stock: u64,

    /// 最近一期庫存為標記值，需由外部庫存來源補齊
    pub stock_needs_external_update: bool,

    /// 每週銷量
    pub weekly_sales: [i64; WEEKS_TRACKED],

    /// 累計營收
    pub revenue: Decimal,

    /// 累計銷量（恆等於 `weekly_sales` 之和）
    pub total_sold: i64,

    /// 近 30 天採購量
    pub recent_ordered_qty_30d: i64,

    /// 近 14 天採購量
    pub recent_ordered_qty_14d: i64,
}

impl SalesAggregate {
    /// 創建新的彙總（首次出現的列決定標題與分類）
    pub fn new(sku: impl Into<String>, title: impl Into<String>, category: impl Into<String>) -> Self {
        Self {
            sku: sku.into(),
            title: title.into(),
            category: category.into(),
            stock: 0,
            stock_needs_external_update: false,
            weekly_sales: [0; WEEKS_TRACKED],
            revenue: Decimal::ZERO,
            total_sold: 0,
            recent_ordered_qty_30d: 0,
            recent_ordered_qty_14d: 0,
        }
    }

    /// 記錄一週的銷量與營收
    ///
    /// 同一週重複出現的 SKU 會累加到同一格。任一累計溢位時整列不記錄。
    pub fn record_week(&mut self, week_index: usize, sold: i64, revenue: Decimal) -> Result<()> {
        if week_index >= WEEKS_TRACKED {
            return Err(ForecastError::WeekOutOfRange(week_index));
        }

        let sold_overflow = || ForecastError::Overflow {
            field: LogicalField::Sold.name(),
            value: sold.to_string(),
        };
        let week_sold = self.weekly_sales[week_index]
            .checked_add(sold)
            .ok_or_else(sold_overflow)?;
        let total_sold = self.total_sold.checked_add(sold).ok_or_else(sold_overflow)?;
        let total_revenue = self
            .revenue
            .checked_add(revenue)
            .ok_or_else(|| ForecastError::Overflow {
                field: LogicalField::Revenue.name(),
                value: revenue.to_string(),
            })?;

        self.weekly_sales[week_index] = week_sold;
        self.total_sold = total_sold;
        self.revenue = total_revenue;
        Ok(())
    }

    /// 記錄一筆採購單（`age_days` 為距今天數）
    pub fn record_purchase_order(
        &mut self,
        quantity: i64,
        age_days: i64,
        order_window_days: i64,
        recent_window_days: i64,
    ) {
        if age_days <= order_window_days {
            self.recent_ordered_qty_30d = self.recent_ordered_qty_30d.saturating_add(quantity);
        }
        if age_days <= recent_window_days {
            self.recent_ordered_qty_14d = self.recent_ordered_qty_14d.saturating_add(quantity);
        }
    }

    /// 最近一週銷量
    pub fn last_week_sales(&self) -> i64 {
        self.weekly_sales[WEEKS_TRACKED - 1]
    }

    /// 最近 `weeks` 週的銷量合計
    pub fn trailing_sales(&self, weeks: usize) -> i64 {
        let weeks = weeks.min(WEEKS_TRACKED);
        self.weekly_sales[WEEKS_TRACKED - weeks..]
            .iter()
            .fold(0i64, |sum, &sold| sum.saturating_add(sold))
    }
}

/// 依 SKU 索引的銷售彙總集合，保留首次出現順序
#[derive(Debug, Clone, Default)]
pub struct SalesLedger {
    aggregates: Vec<SalesAggregate>,
    index: HashMap<String, usize>,
}

impl SalesLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// 取得 SKU 的彙總，不存在時以 `init` 建立
    pub fn entry_or_insert_with<F>(&mut self, sku: &str, init: F) -> &mut SalesAggregate
    where
        F: FnOnce() -> SalesAggregate,
    {
        let position = match self.index.get(sku) {
            Some(&position) => position,
            None => {
                self.aggregates.push(init());
                let position = self.aggregates.len() - 1;
                self.index.insert(sku.to_string(), position);
                position
            }
        };
        &mut self.aggregates[position]
    }

    pub fn get(&self, sku: &str) -> Option<&SalesAggregate> {
        self.index.get(sku).map(|&i| &self.aggregates[i])
    }

    pub fn get_mut(&mut self, sku: &str) -> Option<&mut SalesAggregate> {
        self.index.get(sku).map(|&i| &mut self.aggregates[i])
    }

    pub fn contains(&self, sku: &str) -> bool {
        self.index.contains_key(sku)
    }

    /// 依首次出現順序迭代
    pub fn iter(&self) -> impl Iterator<Item = &SalesAggregate> {
        self.aggregates.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut SalesAggregate> {
        self.aggregates.iter_mut()
    }

    pub fn len(&self) -> usize {
        self.aggregates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.aggregates.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_week_keeps_totals_consistent() {
        let mut aggregate = SalesAggregate::new("ROSE-01", "Red Rose", "Plants");

        aggregate.record_week(10, 8, Decimal::new(8000, 2)).unwrap();
        aggregate.record_week(11, 10, Decimal::new(10000, 2)).unwrap();
        aggregate.record_week(11, 2, Decimal::new(2000, 2)).unwrap();

        assert_eq!(aggregate.weekly_sales[10], 8);
        assert_eq!(aggregate.weekly_sales[11], 12);
        assert_eq!(aggregate.total_sold, 20);
        assert_eq!(aggregate.total_sold, aggregate.weekly_sales.iter().sum::<i64>());
        assert_eq!(aggregate.revenue, Decimal::from(200));
        assert_eq!(aggregate.last_week_sales(), 12);
        assert_eq!(aggregate.trailing_sales(2), 20);
    }

    #[test]
    fn test_record_week_overflow_leaves_totals_untouched() {
        let mut aggregate = SalesAggregate::new("BULK-01", "Bulk Soil", "Other");
        let huge = Decimal::from_scientific("5e28").unwrap();

        aggregate.record_week(3, 2, huge).unwrap();
        assert!(matches!(
            aggregate.record_week(4, 1, huge),
            Err(ForecastError::Overflow { field: "revenue", .. })
        ));
        assert!(matches!(
            aggregate.record_week(11, i64::MAX, Decimal::ZERO),
            Err(ForecastError::Overflow { field: "sold", .. })
        ));
        assert!(matches!(
            aggregate.record_week(WEEKS_TRACKED, 1, Decimal::ZERO),
            Err(ForecastError::WeekOutOfRange(12))
        ));

        assert_eq!(aggregate.weekly_sales[4], 0);
        assert_eq!(aggregate.weekly_sales[11], 0);
        assert_eq!(aggregate.total_sold, 2);
        assert_eq!(aggregate.revenue, huge);
    }

    #[test]
    fn test_purchase_order_windows() {
        let mut aggregate = SalesAggregate::new("SEED-01", "Basil Seeds", "Seeds");

        aggregate.record_purchase_order(10, 5, 30, 14);
        aggregate.record_purchase_order(7, 14, 30, 14);
        aggregate.record_purchase_order(4, 30, 30, 14);
        aggregate.record_purchase_order(100, 31, 30, 14);

        assert_eq!(aggregate.recent_ordered_qty_30d, 21);
        assert_eq!(aggregate.recent_ordered_qty_14d, 17);
    }

    #[test]
    fn test_ledger_preserves_encounter_order() {
        let mut ledger = SalesLedger::new();

        for sku in ["B", "A", "C", "A"] {
            ledger
                .entry_or_insert_with(sku, || SalesAggregate::new(sku, "", ""))
                .record_week(0, 1, Decimal::ZERO)
                .unwrap();
        }

        let order: Vec<_> = ledger.iter().map(|a| a.sku.as_str()).collect();
        assert_eq!(order, vec!["B", "A", "C"]);
        assert_eq!(ledger.get("A").map(|a| a.total_sold), Some(2));
        assert!(!ledger.contains("D"));
    }

    #[test]
    fn test_period_label() {
        assert_eq!(WeeklySalesPeriod::missing(2).display_label(), "Week 3");
        assert_eq!(
            WeeklySalesPeriod::loaded(0, Vec::new())
                .with_label("Sheet A")
                .display_label(),
            "Sheet A"
        );
    }
}
