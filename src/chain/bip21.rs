//! BIP21 风格支付 URI 解析（BTC / BCH 共用）
//!
//! 规则：
//! - 协议名不区分大小写，必须在允许列表中
//! - 地址必填且必须有效
//! - `amount` 必须可解析，解析后换算为最小单位
//! - 出现未知的 `req-*` 参数视为无效
//! - `r` 参数表示支付协议 URL

use super::ParsedUri;
use crate::{
    domain::Coin,
    error::{IncomingDataError, Result},
    utils::{amount::to_smallest_unit, query::parse_query},
};

/// 拆分 `scheme:[//]address[?query]`
pub(crate) fn split_uri(data: &str) -> Option<(String, &str, Option<&str>)> {
    let (scheme, rest) = data.split_once(':')?;
    let rest = rest.strip_prefix('/').unwrap_or(rest);
    let rest = rest.strip_prefix('/').unwrap_or(rest);
    let (address, query) = match rest.split_once('?') {
        Some((address, query)) => (address, Some(query.split('#').next().unwrap_or_default())),
        None => (rest, None),
    };
    Some((scheme.to_ascii_lowercase(), address, query))
}

/// 解析 BIP21 URI
///
/// `normalize_address(address, scheme)` 校验地址并返回规范形式，无效时返回 None。
pub(crate) fn parse<F>(data: &str, schemes: &[&str], coin: Coin, normalize_address: F) -> Result<ParsedUri>
where
    F: Fn(&str, &str) -> Option<String>,
{
    let (scheme, address, query) =
        split_uri(data).ok_or_else(|| IncomingDataError::malformed_uri("missing scheme"))?;
    if !schemes.contains(&scheme.as_str()) {
        return Err(IncomingDataError::malformed_uri(format!(
            "unexpected scheme: {}",
            scheme
        )));
    }
    if address.is_empty() {
        return Err(IncomingDataError::malformed_address(address));
    }
    let address = normalize_address(address, &scheme)
        .ok_or_else(|| IncomingDataError::malformed_address(address))?;

    let mut parsed = ParsedUri {
        address: Some(address),
        ..Default::default()
    };
    for (key, value) in parse_query(query.unwrap_or_default()) {
        match key.as_str() {
            "amount" if !value.is_empty() => parsed.amount = Some(to_smallest_unit(&value, coin)?),
            "message" => parsed.message = Some(value),
            "r" => parsed.payment_url = Some(value),
            k if k.starts_with("req-") => {
                return Err(IncomingDataError::malformed_uri(format!(
                    "unknown required parameter: {}",
                    k
                )))
            }
            _ => {}
        }
    }
    Ok(parsed)
}
