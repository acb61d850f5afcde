//! 庫存模型

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::config::ForecastConfig;
use crate::sheet::cell_text;

/// 商品目錄的庫存快照（每次執行重新取得）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StockSnapshotEntry {
    /// SKU
    pub sku: String,

    /// 商品名稱
    #[serde(default)]
    pub name: String,

    /// 現有庫存；缺值的項目不參與比對
    #[serde(default)]
    pub stock_quantity: Option<i64>,

    /// 第一個分類，無分類時為 "Other"
    #[serde(default = "default_category")]
    pub category: String,
}

fn default_category() -> String {
    "Other".to_string()
}

impl StockSnapshotEntry {
    /// 創建新的快照項目
    pub fn new(sku: impl Into<String>, name: impl Into<String>, stock_quantity: Option<i64>) -> Self {
        Self {
            sku: sku.into().trim().to_string(),
            name: name.into(),
            stock_quantity,
            category: default_category(),
        }
    }

    /// 建構器模式：設置分類
    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = category.into();
        self
    }

    /// 可用於補齊的庫存值（缺 SKU 或缺庫存時為 `None`，負值視為 0）
    pub fn usable_stock(&self) -> Option<u64> {
        if self.sku.trim().is_empty() {
            return None;
        }
        self.stock_quantity.map(|qty| qty.max(0) as u64)
    }
}

/// 最近一期報表上的庫存讀值
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StockReading {
    /// 數值庫存
    Quantity(u64),
    /// 標記值（如 "N/A"），需由外部庫存來源補齊
    Unavailable,
    /// 其他無法使用的值
    Invalid(String),
}

impl StockReading {
    /// 解析儲存格；標記值依配置比對（不分大小寫）
    pub fn from_cell(value: Option<&Value>, config: &ForecastConfig) -> Self {
        let value = match value {
            // 缺欄位視為 0
            None => return StockReading::Quantity(0),
            Some(value) => value,
        };

        match value {
            Value::Number(n) => match n
                .as_i64()
                .or_else(|| n.as_f64().filter(|f| f.is_finite()).map(|f| f.trunc() as i64))
            {
                Some(qty) if qty >= 0 => StockReading::Quantity(qty as u64),
                _ => StockReading::Invalid(n.to_string()),
            },
            Value::String(s) => {
                if config.is_stock_sentinel(s) {
                    return StockReading::Unavailable;
                }
                match s.trim().parse::<i64>() {
                    Ok(qty) if qty >= 0 => StockReading::Quantity(qty as u64),
                    _ => StockReading::Invalid(s.clone()),
                }
            }
            other => StockReading::Invalid(cell_text(other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_create_snapshot_entry() {
        let entry = StockSnapshotEntry::new("  TULIP-01 ", "Tulip Bulbs", Some(12))
            .with_category("Bulbs");

        assert_eq!(entry.sku, "TULIP-01");
        assert_eq!(entry.category, "Bulbs");
        assert_eq!(entry.usable_stock(), Some(12));
    }

    #[test]
    fn test_snapshot_entry_without_stock_is_unusable() {
        let entry = StockSnapshotEntry::new("FERN-01", "Fern", None);
        assert_eq!(entry.usable_stock(), None);

        let blank_sku = StockSnapshotEntry::new("  ", "Nameless", Some(4));
        assert_eq!(blank_sku.usable_stock(), None);

        let negative = StockSnapshotEntry::new("FERN-02", "Fern", Some(-3));
        assert_eq!(negative.usable_stock(), Some(0));
    }

    #[test]
    fn test_snapshot_entry_defaults_category() {
        let entry: StockSnapshotEntry =
            serde_json::from_str(r#"{ "sku": "X-1", "name": "X", "stock_quantity": 3 }"#).unwrap();
        assert_eq!(entry.category, "Other");
    }

    #[test]
    fn test_stock_reading() {
        let config = ForecastConfig::default();
        assert_eq!(
            StockReading::from_cell(Some(&json!(14)), &config),
            StockReading::Quantity(14)
        );
        assert_eq!(
            StockReading::from_cell(Some(&json!(" 6 ")), &config),
            StockReading::Quantity(6)
        );
        assert_eq!(
            StockReading::from_cell(Some(&json!("n/a")), &config),
            StockReading::Unavailable
        );
        assert_eq!(
            StockReading::from_cell(Some(&json!("out")), &config),
            StockReading::Invalid("out".to_string())
        );
        assert_eq!(
            StockReading::from_cell(Some(&json!(-2)), &config),
            StockReading::Invalid("-2".to_string())
        );
        assert_eq!(StockReading::from_cell(None, &config), StockReading::Quantity(0));
    }

    #[test]
    fn test_stock_reading_uses_configured_sentinel() {
        let mut config = ForecastConfig::default();
        config.stock_unavailable_sentinel = "Unknown".to_string();

        assert_eq!(
            StockReading::from_cell(Some(&json!(" UNKNOWN ")), &config),
            StockReading::Unavailable
        );
        assert_eq!(
            StockReading::from_cell(Some(&json!("N/A")), &config),
            StockReading::Invalid("N/A".to_string())
        );
    }
}
