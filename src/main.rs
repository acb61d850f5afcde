//! 補貨建議命令列工具
//!
//! 用法：`reorder <input.json> [config.json]`
//!
//! 輸入檔為 `ForecastInput` 的 JSON；未提供 `as_of` 時以本地日期為準。
//! 報表以 JSON 輸出到 stdout。

mod logging;

use std::path::{Path, PathBuf};

use anyhow::{bail, Context};
use reorder_calc::{ForecastInput, ReorderEngine};
use reorder_core::ForecastConfig;
use serde_json::Value;

fn main() -> anyhow::Result<()> {
    logging::init();

    let mut args = std::env::args_os().skip(1).map(PathBuf::from);
    let input_path = match args.next() {
        Some(path) => path,
        None => bail!("用法: reorder <input.json> [config.json]"),
    };
    let config = match args.next() {
        Some(path) => load_config(&path)?,
        None => ForecastConfig::default(),
    };

    let input = load_input(&input_path, chrono::Local::now().date_naive())?;
    let engine = ReorderEngine::new(config).context("配置無效")?;
    let report = engine.run(&input);

    tracing::info!(
        "報表 {}：{} 個分組，{} 項需下單，{} 則警告",
        report.run_id,
        report.buckets.len(),
        report.rows_to_order(),
        report.warnings.len()
    );

    let json = serde_json::to_string_pretty(&report).context("報表序列化失敗")?;
    println!("{}", json);
    Ok(())
}

fn read_json(path: &Path) -> anyhow::Result<Value> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("無法讀取 {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("{} 不是有效的 JSON", path.display()))
}

fn load_config(path: &Path) -> anyhow::Result<ForecastConfig> {
    let value = read_json(path)?;
    serde_json::from_value(value).with_context(|| format!("無法解析配置 {}", path.display()))
}

/// 讀取輸入檔，缺少 `as_of` 時補上 `today`
fn load_input(path: &Path, today: chrono::NaiveDate) -> anyhow::Result<ForecastInput> {
    let mut value = read_json(path)?;
    with_default_as_of(&mut value, today);
    serde_json::from_value(value).with_context(|| format!("無法解析輸入 {}", path.display()))
}

fn with_default_as_of(value: &mut Value, today: chrono::NaiveDate) {
    if let Value::Object(map) = value {
        let missing = map.get("as_of").map_or(true, Value::is_null);
        if missing {
            map.insert("as_of".to_string(), Value::String(today.to_string()));
        }
    }
}
