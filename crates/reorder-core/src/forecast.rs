//! 補貨建議模型

use serde::{Deserialize, Serialize};

/// 補貨決策
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReorderDecision {
    /// 不需補貨
    No,
    /// 庫存低於補貨點
    Yes,
    /// 低庫存強制補貨
    YesLowStock,
    /// 診斷模式注入的測試列
    YesTest,
}

impl ReorderDecision {
    /// 是否為補貨決策（所有 YES 開頭者）
    pub fn is_reorder(&self) -> bool {
        !matches!(self, ReorderDecision::No)
    }

    /// 識別碼
    pub fn code(&self) -> &'static str {
        match self {
            ReorderDecision::No => "NO",
            ReorderDecision::Yes => "YES",
            ReorderDecision::YesLowStock => "YES_LOW_STOCK",
            ReorderDecision::YesTest => "YES_TEST",
        }
    }

    /// 報表顯示文字
    pub fn label(&self) -> &'static str {
        match self {
            ReorderDecision::No => "NO",
            ReorderDecision::Yes => "YES",
            ReorderDecision::YesLowStock => "YES (Low Stock)",
            ReorderDecision::YesTest => "YES (TEST)",
        }
    }
}

impl std::fmt::Display for ReorderDecision {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// 商品標籤，同時決定預測公式與參數
///
/// 分類文字同時含 "seed" 與 "plant" 時以種子為準。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ProductTag {
    Plants,
    Seeds,
    NonPlants,
}

impl ProductTag {
    /// 依分類文字判定（不分大小寫的子字串比對）
    pub fn classify(category: &str) -> Self {
        let category = category.to_lowercase();
        if category.contains("seed") {
            ProductTag::Seeds
        } else if category.contains("plant") {
            ProductTag::Plants
        } else {
            ProductTag::NonPlants
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ProductTag::Plants => "PLANTS",
            ProductTag::Seeds => "SEEDS",
            ProductTag::NonPlants => "NON_PLANTS",
        }
    }
}

impl std::fmt::Display for ProductTag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// 報表分組
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ProductGroup {
    #[serde(rename = "plants")]
    Plants,
    #[serde(rename = "bulbs")]
    Bulbs,
    #[serde(rename = "seeds")]
    Seeds,
    #[serde(rename = "manures")]
    Manures,
    #[serde(rename = "gardening essentials")]
    GardeningEssentials,
    #[serde(rename = "miniature garden")]
    MiniatureGarden,
    #[serde(rename = "other")]
    Other,
}

impl ProductGroup {
    /// 關鍵字比對順序，先符合者優先
    const KEYWORDS: [(&'static str, ProductGroup); 5] = [
        ("bulb", ProductGroup::Bulbs),
        ("seed", ProductGroup::Seeds),
        ("manure", ProductGroup::Manures),
        ("gardening", ProductGroup::GardeningEssentials),
        ("miniature", ProductGroup::MiniatureGarden),
    ];

    /// 依分類文字判定分組
    pub fn classify(category: &str) -> Self {
        let category = category.to_lowercase();
        Self::KEYWORDS
            .iter()
            .find(|(keyword, _)| category.contains(keyword))
            .map(|&(_, group)| group)
            .unwrap_or(if category.contains("plant") {
                ProductGroup::Plants
            } else {
                ProductGroup::Other
            })
    }

    pub fn name(&self) -> &'static str {
        match self {
            ProductGroup::Plants => "plants",
            ProductGroup::Bulbs => "bulbs",
            ProductGroup::Seeds => "seeds",
            ProductGroup::Manures => "manures",
            ProductGroup::GardeningEssentials => "gardening essentials",
            ProductGroup::MiniatureGarden => "miniature garden",
            ProductGroup::Other => "other",
        }
    }
}

impl std::fmt::Display for ProductGroup {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// 單一 SKU 的補貨建議（建立後除 `rank` 外不再變動）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForecastResult {
    pub title: String,
    pub sku: String,

    /// 12 週總銷量
    pub total_sold_12w: i64,

    /// 預測需求（取整）
    pub forecasted_demand: i64,

    /// 補貨點（取整）
    pub reorder_point: i64,

    pub current_stock: u64,

    /// 近 14 天已訂購量
    pub recent_ordered_14d: i64,

    pub reorder_decision: ReorderDecision,

    pub qty_to_order: u64,

    pub priority_score: u64,

    /// 營收估計（取整）
    pub revenue_estimate: i64,

    pub category: String,

    pub product_tag: ProductTag,

    pub major_group: ProductGroup,

    /// 排序後的名次（從 1 開始，排序前為 0）
    pub rank: u32,
}

impl ForecastResult {
    /// 是否需要下單（補貨決策且數量大於 0）
    pub fn needs_order(&self) -> bool {
        self.reorder_decision.is_reorder() && self.qty_to_order > 0
    }
}
