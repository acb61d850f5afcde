//! 需求預測與補貨量計算
//!
//! 一般公式：
//! - 補貨點 = 最近一週銷量 × (回看天數 / 7)
//! - 預測需求 = 最近兩週銷量 × (預測週期 / 14)
//!
//! 種子公式：
//! - 補貨點 = 最近兩週銷量 × (回看天數 / 7)
//! - 預測需求 = 最近 N 週平均銷量 × 倍數
//!
//! 補貨量 = 預測需求 - 現有庫存 - 近 30 天已訂購量（下限 0）

use reorder_core::rounding::{round_half_even, round_non_negative};
use reorder_core::{
    CategoryParameters, ForecastConfig, ForecastResult, ProductGroup, ProductTag, ReorderDecision,
    SalesAggregate,
};
use rust_decimal::Decimal;

/// 使用的預測公式
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ForecastFormula {
    Standard,
    Seed,
}

/// 預測中間值（未取整）
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ForecastMetrics {
    pub reorder_point: Decimal,
    pub forecasted_demand: Decimal,
    pub formula: ForecastFormula,
}

/// 預測計算器
pub struct ForecastCalculator<'a> {
    config: &'a ForecastConfig,
}

impl<'a> ForecastCalculator<'a> {
    pub fn new(config: &'a ForecastConfig) -> Self {
        Self { config }
    }

    /// 依標籤取得品類參數
    pub fn parameters_for(&self, tag: ProductTag) -> CategoryParameters {
        match tag {
            ProductTag::Plants => self.config.plant_parameters,
            ProductTag::Seeds | ProductTag::NonPlants => self.config.default_parameters,
        }
    }

    /// 計算補貨點與預測需求
    ///
    /// 週銷量固定為 12 格，缺失的週以 0 計，不影響公式選擇。
    pub fn metrics(&self, aggregate: &SalesAggregate, tag: ProductTag) -> ForecastMetrics {
        let params = self.parameters_for(tag);
        let lookback = Decimal::from(params.reorder_lookback_days);
        let seven = Decimal::from(7);

        if tag == ProductTag::Seeds {
            let weeks = self.config.seed_average_weeks;
            let average = Decimal::from(aggregate.trailing_sales(weeks)) / Decimal::from(weeks as u64);
            let recent_two_weeks = Decimal::from(aggregate.trailing_sales(2));

            return ForecastMetrics {
                reorder_point: recent_two_weeks * lookback / seven,
                forecasted_demand: average * Decimal::from(self.config.seed_demand_multiplier),
                formula: ForecastFormula::Seed,
            };
        }

        let last_week = aggregate.last_week_sales();
        let recent_two_weeks = aggregate.trailing_sales(2);

        ForecastMetrics {
            reorder_point: Decimal::from(last_week) * lookback / seven,
            forecasted_demand: Decimal::from(recent_two_weeks)
                * Decimal::from(params.forecast_period_days)
                / Decimal::from(14),
            formula: ForecastFormula::Standard,
        }
    }

    /// 補貨決策
    ///
    /// 庫存低於補貨點為 YES；否則若庫存不超過低庫存門檻且曾有銷量，強制為低庫存補貨。
    pub fn decide(&self, stock: u64, total_sold: i64, reorder_point: Decimal) -> ReorderDecision {
        if Decimal::from(stock) < reorder_point {
            ReorderDecision::Yes
        } else if stock <= self.config.low_stock_threshold && total_sold > 0 {
            ReorderDecision::YesLowStock
        } else {
            ReorderDecision::No
        }
    }

    /// 補貨量
    pub fn quantity_to_order(
        &self,
        decision: ReorderDecision,
        forecasted_demand: Decimal,
        stock: u64,
        recent_ordered_30d: i64,
    ) -> u64 {
        match decision {
            ReorderDecision::Yes | ReorderDecision::YesLowStock => {
                let qty = round_non_negative(
                    forecasted_demand - Decimal::from(stock) - Decimal::from(recent_ordered_30d),
                );
                if decision == ReorderDecision::YesLowStock {
                    qty.max(self.config.low_stock_min_order)
                } else {
                    qty
                }
            }
            ReorderDecision::No | ReorderDecision::YesTest => 0,
        }
    }

    /// 優先分數
    pub fn priority_score(&self, decision: ReorderDecision, qty_to_order: u64) -> u64 {
        match decision {
            ReorderDecision::No => 0,
            ReorderDecision::YesLowStock => {
                qty_to_order.saturating_add(self.config.low_stock_priority_bonus)
            }
            ReorderDecision::Yes | ReorderDecision::YesTest => qty_to_order,
        }
    }

    /// 為單一 SKU 產生補貨建議
    pub fn evaluate(&self, aggregate: &SalesAggregate) -> ForecastResult {
        let tag = ProductTag::classify(&aggregate.category);
        let group = ProductGroup::classify(&aggregate.category);
        let metrics = self.metrics(aggregate, tag);

        let decision = self.decide(aggregate.stock, aggregate.total_sold, metrics.reorder_point);
        let qty_to_order = self.quantity_to_order(
            decision,
            metrics.forecasted_demand,
            aggregate.stock,
            aggregate.recent_ordered_qty_30d,
        );
        let priority_score = self.priority_score(decision, qty_to_order);

        tracing::debug!(
            sku = %aggregate.sku,
            %tag,
            formula = ?metrics.formula,
            stock = aggregate.stock,
            reorder_point = %metrics.reorder_point,
            forecasted_demand = %metrics.forecasted_demand,
            decision = decision.code(),
            qty_to_order,
            "預測完成"
        );

        ForecastResult {
            title: aggregate.title.clone(),
            sku: aggregate.sku.clone(),
            total_sold_12w: aggregate.total_sold,
            forecasted_demand: round_half_even(metrics.forecasted_demand),
            reorder_point: round_half_even(metrics.reorder_point),
            current_stock: aggregate.stock,
            recent_ordered_14d: aggregate.recent_ordered_qty_14d,
            reorder_decision: decision,
            qty_to_order,
            priority_score,
            revenue_estimate: round_half_even(aggregate.revenue),
            category: aggregate.category.clone(),
            product_tag: tag,
            major_group: group,
            rank: 0,
        }
    }
}
