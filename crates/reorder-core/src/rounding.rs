//! 報表數值取整
//!
//! 所有整數輸出一律採用銀行家捨入（四捨六入五成雙），中間比較保留原始小數。

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};

/// 取整到最接近的整數（.5 取偶數）
pub fn round_half_even(value: Decimal) -> i64 {
    value
        .round_dp_with_strategy(0, RoundingStrategy::MidpointNearestEven)
        .to_i64()
        .unwrap_or(if value.is_sign_negative() { i64::MIN } else { i64::MAX })
}

/// 取整後下限為 0
pub fn round_non_negative(value: Decimal) -> u64 {
    round_half_even(value).max(0) as u64
}
