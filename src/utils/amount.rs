//! 金额换算
//!
//! 显示单位 → 最小单位的换算只在提取阶段做一次，由注册表的精度表驱动。

use std::str::FromStr;

use rust_decimal::{Decimal, RoundingStrategy};

use crate::{
    domain::{Amount, Coin, CoinRegistry, StaticCoinRegistry},
    error::{IncomingDataError, Result},
};

/// 解析十进制数（支持科学计数法与小数逗号）
pub fn parse_decimal(value: &str) -> Result<Decimal> {
    let normalized = value.trim().replace(',', ".");
    if normalized.is_empty() {
        return Err(IncomingDataError::InvalidAmount(value.to_string()));
    }
    let parsed = Decimal::from_str(&normalized)
        .or_else(|_| Decimal::from_scientific(&normalized))
        .map_err(|_| IncomingDataError::InvalidAmount(value.to_string()))?;
    if parsed.is_sign_negative() && !parsed.is_zero() {
        return Err(IncomingDataError::InvalidAmount(value.to_string()));
    }
    Ok(parsed)
}

/// 显示单位金额 → 最小单位（四舍五入到整数）
///
/// 中间值受 `Decimal` 的 96 位尾数限制，超出时返回 `InvalidAmount`。
pub fn to_smallest_unit(value: &str, coin: Coin) -> Result<Amount> {
    let precision = StaticCoinRegistry.precision_of(coin);
    let display = parse_decimal(value)?;
    let unit = Decimal::from_i128_with_scale(precision.unit_to_satoshi as i128, 0);
    let scaled = display
        .checked_mul(unit)
        .ok_or_else(|| IncomingDataError::InvalidAmount(value.to_string()))?;
    decimal_to_amount(scaled, value)
}

/// 已是最小单位的数值串 → 整数（小数部分四舍五入）
pub fn parse_smallest_unit(value: &str) -> Result<Amount> {
    let parsed = parse_decimal(value)?;
    decimal_to_amount(parsed, value)
}

/// 最小单位 → 显示单位
///
/// 超过 96 位的金额无法用 `Decimal` 表示，返回 `InvalidAmount`。
pub fn from_smallest_unit(amount: Amount, coin: Coin) -> Result<Decimal> {
    let precision = StaticCoinRegistry.precision_of(coin);
    i128::try_from(amount)
        .ok()
        .and_then(|value| Decimal::try_from_i128_with_scale(value, precision.decimals).ok())
        .ok_or_else(|| IncomingDataError::InvalidAmount(amount.to_string()))
}

fn decimal_to_amount(value: Decimal, original: &str) -> Result<Amount> {
    let rounded = value.round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero);
    rounded
        .trunc()
        .to_string()
        .parse::<Amount>()
        .map_err(|_| IncomingDataError::InvalidAmount(original.to_string()))
}
