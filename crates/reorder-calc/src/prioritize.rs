//! 排序與分組

use reorder_core::{ForecastConfig, ForecastResult, ProductGroup, ReorderDecision};

use crate::{BucketRow, ReportBucket};

/// 排序與分組器
pub struct Prioritizer<'a> {
    config: &'a ForecastConfig,
}

impl<'a> Prioritizer<'a> {
    pub fn new(config: &'a ForecastConfig) -> Self {
        Self { config }
    }

    /// 依優先分數由高到低排序並指定名次
    ///
    /// 使用穩定排序，分數相同時保留彙總時的出現順序。
    pub fn rank(&self, results: &mut [ForecastResult]) {
        results.sort_by(|a, b| b.priority_score.cmp(&a.priority_score));
        for (i, result) in results.iter_mut().enumerate() {
            result.rank = (i + 1) as u32;
        }
    }

    /// 診斷模式：沒有任何品項需要下單時，把第一名改為測試列
    ///
    /// 回傳是否注入。
    pub fn inject_diagnostic_row(&self, results: &mut [ForecastResult]) -> bool {
        if !self.config.diagnostic_mode || results.iter().any(ForecastResult::needs_order) {
            return false;
        }

        match results.first_mut() {
            Some(first) => {
                first.reorder_decision = ReorderDecision::YesTest;
                first.qty_to_order = self.config.diagnostic_qty;
                first.priority_score = self.config.diagnostic_priority;
                tracing::warn!(
                    "沒有需要補貨的商品，注入診斷測試列：{} (SKU: {})",
                    first.title,
                    first.sku
                );
                true
            }
            None => false,
        }
    }

    /// 將需要下單的品項依分組整理
    ///
    /// 分組順序：先依配置的優先順序，其餘依首次出現順序；組內依 12 週總銷量由高到低。
    pub fn group(&self, results: &[ForecastResult]) -> Vec<ReportBucket> {
        let mut seen: Vec<ProductGroup> = Vec::new();
        let mut grouped: Vec<(ProductGroup, Vec<ForecastResult>)> = Vec::new();

        for result in results.iter().filter(|r| r.needs_order()) {
            match grouped.iter_mut().find(|(group, _)| *group == result.major_group) {
                Some((_, rows)) => rows.push(result.clone()),
                None => {
                    seen.push(result.major_group);
                    grouped.push((result.major_group, vec![result.clone()]));
                }
            }
        }

        let mut order: Vec<ProductGroup> = self
            .config
            .bucket_priority
            .iter()
            .copied()
            .filter(|group| seen.contains(group))
            .collect();
        order.dedup();
        for group in seen {
            if !order.contains(&group) {
                order.push(group);
            }
        }

        order
            .into_iter()
            .filter_map(|group| {
                let position = grouped.iter().position(|(g, _)| *g == group)?;
                let (_, mut rows) = grouped.swap_remove(position);
                rows.sort_by(|a, b| b.total_sold_12w.cmp(&a.total_sold_12w));

                let rows = rows
                    .into_iter()
                    .enumerate()
                    .map(|(i, result)| BucketRow {
                        bucket_rank: (i + 1) as u32,
                        result,
                    })
                    .collect();

                Some(ReportBucket { group, rows })
            })
            .collect()
    }
}
