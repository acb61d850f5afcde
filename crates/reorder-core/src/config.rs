//! 補貨預測配置模型

use serde::{Deserialize, Serialize};

use crate::forecast::ProductGroup;
use crate::sales::WEEKS_TRACKED;
use crate::sheet::LogicalField;
use crate::{ForecastError, Result};

/// 品類參數（回看天數與預測週期）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryParameters {
    /// 補貨點回看天數
    pub reorder_lookback_days: u32,

    /// 需求預測週期（天）
    pub forecast_period_days: u32,
}

impl CategoryParameters {
    pub const fn new(reorder_lookback_days: u32, forecast_period_days: u32) -> Self {
        Self {
            reorder_lookback_days,
            forecast_period_days,
        }
    }
}

/// 欄位別名表：每個邏輯欄位對應一組依序嘗試的表頭拼寫
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HeaderAliases {
    pub sku: Vec<String>,
    pub title: Vec<String>,
    pub category: Vec<String>,
    pub sold: Vec<String>,
    pub revenue: Vec<String>,
    pub stock: Vec<String>,
    pub order_date: Vec<String>,
    pub quantity_ordered: Vec<String>,
}

impl HeaderAliases {
    /// 取得某個邏輯欄位的別名（依優先順序）
    pub fn for_field(&self, field: LogicalField) -> &[String] {
        match field {
            LogicalField::Sku => &self.sku,
            LogicalField::Title => &self.title,
            LogicalField::Category => &self.category,
            LogicalField::Sold => &self.sold,
            LogicalField::Revenue => &self.revenue,
            LogicalField::Stock => &self.stock,
            LogicalField::OrderDate => &self.order_date,
            LogicalField::QuantityOrdered => &self.quantity_ordered,
        }
    }

    /// 建構器模式：覆寫某個邏輯欄位的別名
    pub fn with_aliases(mut self, field: LogicalField, aliases: &[&str]) -> Self {
        let aliases = aliases.iter().map(|a| a.to_string()).collect();
        match field {
            LogicalField::Sku => self.sku = aliases,
            LogicalField::Title => self.title = aliases,
            LogicalField::Category => self.category = aliases,
            LogicalField::Sold => self.sold = aliases,
            LogicalField::Revenue => self.revenue = aliases,
            LogicalField::Stock => self.stock = aliases,
            LogicalField::OrderDate => self.order_date = aliases,
            LogicalField::QuantityOrdered => self.quantity_ordered = aliases,
        }
        self
    }
}

fn owned(aliases: &[&str]) -> Vec<String> {
    aliases.iter().map(|a| a.to_string()).collect()
}

impl Default for HeaderAliases {
    fn default() -> Self {
        Self {
            sku: owned(&["SKU"]),
            title: owned(&["Product title"]),
            category: owned(&["Category"]),
            sold: owned(&["Items sold", "Items Sold", "sold", "Sold", "Items_Sold", "items_sold"]),
            revenue: owned(&["Revenue", "N. Revenue", "revenue", "N._Revenue"]),
            stock: owned(&["Stock"]),
            order_date: owned(&["Purchase Order Date"]),
            quantity_ordered: owned(&["QuantityOrdered"]),
        }
    }
}

/// 補貨預測配置
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ForecastConfig {
    /// 表頭別名
    pub headers: HeaderAliases,

    /// 植物類參數
    pub plant_parameters: CategoryParameters,

    /// 其他品類參數（含種子）
    pub default_parameters: CategoryParameters,

    /// 種子平均銷量的週數
    pub seed_average_weeks: usize,

    /// 種子預測需求 = 平均週銷量 × 此倍數
    pub seed_demand_multiplier: u32,

    /// 低庫存門檻（含）
    pub low_stock_threshold: u64,

    /// 低庫存強制補貨的最小訂購量
    pub low_stock_min_order: u64,

    /// 低庫存強制補貨的優先分數加成
    pub low_stock_priority_bonus: u64,

    /// 採購單計入「近期已訂購」的天數
    pub order_window_days: i64,

    /// 報表顯示用的短期已訂購天數
    pub recent_order_window_days: i64,

    /// 表示庫存需由外部來源補齊的標記值（不分大小寫）
    pub stock_unavailable_sentinel: String,

    /// 報表分組的優先順序，其餘分組依首次出現順序排在後面
    pub bucket_priority: Vec<ProductGroup>,

    /// 診斷模式：沒有任何品項需要補貨時，注入一筆測試列
    pub diagnostic_mode: bool,

    /// 診斷測試列的訂購量
    pub diagnostic_qty: u64,

    /// 診斷測試列的優先分數
    pub diagnostic_priority: u64,
}

impl Default for ForecastConfig {
    fn default() -> Self {
        Self {
            headers: HeaderAliases::default(),
            plant_parameters: CategoryParameters::new(5, 14),
            default_parameters: CategoryParameters::new(15, 30),
            seed_average_weeks: 8,
            seed_demand_multiplier: 2,
            low_stock_threshold: 3,
            low_stock_min_order: 5,
            low_stock_priority_bonus: 50,
            order_window_days: 30,
            recent_order_window_days: 14,
            stock_unavailable_sentinel: "N/A".to_string(),
            bucket_priority: vec![ProductGroup::Plants, ProductGroup::Seeds, ProductGroup::Manures],
            diagnostic_mode: false,
            diagnostic_qty: 10,
            diagnostic_priority: 1000,
        }
    }
}

impl ForecastConfig {
    /// 建構器模式：設置表頭別名
    pub fn with_headers(mut self, headers: HeaderAliases) -> Self {
        self.headers = headers;
        self
    }

    /// 建構器模式：設置植物類參數
    pub fn with_plant_parameters(mut self, parameters: CategoryParameters) -> Self {
        self.plant_parameters = parameters;
        self
    }

    /// 建構器模式：設置其他品類參數
    pub fn with_default_parameters(mut self, parameters: CategoryParameters) -> Self {
        self.default_parameters = parameters;
        self
    }

    /// 建構器模式：設置種子平均週數
    pub fn with_seed_average_weeks(mut self, weeks: usize) -> Self {
        self.seed_average_weeks = weeks;
        self
    }

    /// 建構器模式：設置低庫存規則（門檻、最小訂購量、優先加成）
    pub fn with_low_stock_rule(mut self, threshold: u64, min_order: u64, bonus: u64) -> Self {
        self.low_stock_threshold = threshold;
        self.low_stock_min_order = min_order;
        self.low_stock_priority_bonus = bonus;
        self
    }

    /// 建構器模式：設置分組優先順序
    pub fn with_bucket_priority(mut self, priority: Vec<ProductGroup>) -> Self {
        self.bucket_priority = priority;
        self
    }

    /// 建構器模式：啟用或關閉診斷模式
    pub fn with_diagnostic_mode(mut self, enabled: bool) -> Self {
        self.diagnostic_mode = enabled;
        self
    }

    /// 檢查某個值是否為「庫存不可用」標記
    pub fn is_stock_sentinel(&self, value: &str) -> bool {
        value.trim().eq_ignore_ascii_case(&self.stock_unavailable_sentinel)
    }

    /// 驗證配置
    pub fn validate(&self) -> Result<()> {
        for (name, params) in [
            ("plant_parameters", self.plant_parameters),
            ("default_parameters", self.default_parameters),
        ] {
            if params.reorder_lookback_days == 0 || params.forecast_period_days == 0 {
                return Err(ForecastError::InvalidConfig(format!(
                    "{} 的回看天數與預測週期必須大於 0",
                    name
                )));
            }
        }

        if self.seed_average_weeks == 0 || self.seed_average_weeks > WEEKS_TRACKED {
            return Err(ForecastError::InvalidConfig(format!(
                "seed_average_weeks 必須介於 1 到 {}，目前為 {}",
                WEEKS_TRACKED, self.seed_average_weeks
            )));
        }

        if self.recent_order_window_days > self.order_window_days {
            return Err(ForecastError::InvalidConfig(
                "recent_order_window_days 不可大於 order_window_days".to_string(),
            ));
        }

        for field in LogicalField::ALL {
            if self.headers.for_field(field).is_empty() {
                return Err(ForecastError::InvalidConfig(format!(
                    "欄位 {} 沒有任何表頭別名",
                    field.name()
                )));
            }
        }

        Ok(())
    }
}
