//! 試算表列模型與欄位正規化
//!
//! 一列資料是「表頭 → 儲存格」的映射。同一個邏輯欄位可能出現在多種表頭拼寫下，
//! 解析時依 [`HeaderAliases`] 的順序逐一嘗試。

use std::collections::BTreeMap;
use std::str::FromStr;

use chrono::NaiveDate;
use rust_decimal::prelude::FromPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::config::HeaderAliases;
use crate::{ForecastError, Result};

/// 邏輯欄位
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogicalField {
    Sku,
    Title,
    Category,
    Sold,
    Revenue,
    Stock,
    OrderDate,
    QuantityOrdered,
}

impl LogicalField {
    pub const ALL: [LogicalField; 8] = [
        LogicalField::Sku,
        LogicalField::Title,
        LogicalField::Category,
        LogicalField::Sold,
        LogicalField::Revenue,
        LogicalField::Stock,
        LogicalField::OrderDate,
        LogicalField::QuantityOrdered,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            LogicalField::Sku => "sku",
            LogicalField::Title => "title",
            LogicalField::Category => "category",
            LogicalField::Sold => "sold",
            LogicalField::Revenue => "revenue",
            LogicalField::Stock => "stock",
            LogicalField::OrderDate => "order_date",
            LogicalField::QuantityOrdered => "quantity_ordered",
        }
    }
}

/// 試算表的一列
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SheetRow(pub BTreeMap<String, Value>);

impl SheetRow {
    pub fn new() -> Self {
        Self(BTreeMap::new())
    }

    /// 建構器模式：加入一個儲存格
    pub fn with(mut self, header: &str, value: impl Into<Value>) -> Self {
        self.0.insert(header.to_string(), value.into());
        self
    }

    /// 第一個存在的別名所對應的儲存格
    pub fn cell(&self, aliases: &HeaderAliases, field: LogicalField) -> Option<&Value> {
        aliases
            .for_field(field)
            .iter()
            .find_map(|header| self.0.get(header))
    }

    /// 文字欄位：數字轉為文字，空值或缺欄位為空字串
    pub fn text(&self, aliases: &HeaderAliases, field: LogicalField) -> String {
        self.cell(aliases, field).map(cell_text).unwrap_or_default()
    }

    /// SKU（去除前後空白）
    pub fn sku(&self, aliases: &HeaderAliases) -> String {
        self.text(aliases, LogicalField::Sku).trim().to_string()
    }

    /// 整數欄位：依序嘗試別名，取第一個可解析者；都不可解析時為 `None`
    pub fn probe_integer(&self, aliases: &HeaderAliases, field: LogicalField) -> Option<i64> {
        aliases
            .for_field(field)
            .iter()
            .filter_map(|header| self.0.get(header))
            .find_map(cell_integer)
    }

    /// 小數欄位：依序嘗試別名，取第一個可解析者
    pub fn probe_decimal(&self, aliases: &HeaderAliases, field: LogicalField) -> Option<Decimal> {
        aliases
            .for_field(field)
            .iter()
            .filter_map(|header| self.0.get(header))
            .find_map(cell_decimal)
    }

    /// 嚴格的整數欄位：缺欄位視為 0，存在但無法解析則回報錯誤
    pub fn integer(&self, aliases: &HeaderAliases, field: LogicalField) -> Result<i64> {
        match self.cell(aliases, field) {
            None => Ok(0),
            Some(value) => cell_integer(value).ok_or_else(|| ForecastError::MalformedField {
                field: field.name(),
                value: cell_text(value),
            }),
        }
    }

    /// 日期欄位（`YYYY-MM-DD`）；空值為 `None`
    pub fn date(&self, aliases: &HeaderAliases, field: LogicalField) -> Result<Option<NaiveDate>> {
        let text = self.text(aliases, field);
        let text = text.trim();
        if text.is_empty() {
            return Ok(None);
        }
        NaiveDate::parse_from_str(text, "%Y-%m-%d")
            .map(Some)
            .map_err(|_| ForecastError::InvalidDate(text.to_string()))
    }
}

/// 儲存格轉文字
pub fn cell_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// 儲存格轉整數
///
/// 空值為 0；帶小數的數字截斷；文字去空白後須為整數。
pub fn cell_integer(value: &Value) -> Option<i64> {
    match value {
        Value::Null => Some(0),
        Value::Bool(b) => Some(i64::from(*b)),
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().filter(|f| f.is_finite()).map(|f| f.trunc() as i64)),
        Value::String(s) => {
            let s = s.trim();
            if s.is_empty() {
                Some(0)
            } else {
                s.parse::<i64>().ok()
            }
        }
        _ => None,
    }
}

/// 儲存格轉小數
pub fn cell_decimal(value: &Value) -> Option<Decimal> {
    match value {
        Value::Null => Some(Decimal::ZERO),
        Value::Bool(b) => Some(Decimal::from(u8::from(*b))),
        Value::Number(n) => match n.as_i64() {
            Some(i) => Some(Decimal::from(i)),
            None => n.as_f64().and_then(Decimal::from_f64),
        },
        Value::String(s) => {
            let s = s.trim();
            if s.is_empty() {
                return Some(Decimal::ZERO);
            }
            Decimal::from_str(s)
                .or_else(|_| Decimal::from_scientific(s))
                .ok()
        }
        _ => None,
    }
}
