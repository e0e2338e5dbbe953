//! 查询参数工具
//!
//! 与浏览器 `decodeURIComponent` / `querystring` 行为保持一致：
//! `+` 视为空格，百分号编码按 UTF-8 解码（非法序列有损替换）。

use percent_encoding::percent_decode_str;
use regex::Regex;

/// 解码单个查询参数值
pub fn decode_component(value: &str) -> String {
    let replaced = value.replace('+', " ");
    percent_decode_str(&replaced).decode_utf8_lossy().into_owned()
}

/// 仅做百分号解码（不处理 `+`）
pub fn decode_uri_component(value: &str) -> String {
    percent_decode_str(value).decode_utf8_lossy().into_owned()
}

/// 解析查询串为有序键值对，忽略空段
pub fn parse_query(query: &str) -> Vec<(String, String)> {
    query
        .split('&')
        .filter(|segment| !segment.is_empty())
        .map(|segment| match segment.split_once('=') {
            Some((key, value)) => (decode_component(key), decode_component(value)),
            None => (decode_component(segment), String::new()),
        })
        .collect()
}

/// 按名称读取 URL 中的参数
///
/// - 参数不存在：`None`
/// - 参数存在但无值（`?otp&...`）：`Some("")`
/// - 否则返回解码后的值
pub fn get_parameter_by_name(name: &str, url: &str) -> Option<String> {
    if url.is_empty() {
        return None;
    }
    let pattern = format!(r"[?&]{}(=([^&#]*)|&|#|$)", regex::escape(name));
    let re = Regex::new(&pattern).ok()?;
    let caps = re.captures(url)?;
    match caps.get(2) {
        Some(value) if !value.as_str().is_empty() => Some(decode_component(value.as_str())),
        _ => Some(String::new()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_parameter_by_name() {
        let url = "bitpay://bitpay?secret=xyz&email=a%40b.com&otp&r=0";
        assert_eq!(get_parameter_by_name("secret", url), Some("xyz".into()));
        assert_eq!(get_parameter_by_name("email", url), Some("a@b.com".into()));
        assert_eq!(get_parameter_by_name("otp", url), Some(String::new()));
        assert_eq!(get_parameter_by_name("r", url), Some("0".into()));
        assert_eq!(get_parameter_by_name("missing", url), None);
    }

    #[test]
    fn test_plus_decodes_to_space() {
        assert_eq!(
            get_parameter_by_name("code", "copay://coinbase?code=a+b%20c"),
            Some("a b c".into())
        );
    }

    #[test]
    fn test_parse_query_keeps_order() {
        let params = parse_query("amount=1.5&message=Hello+World&&label");
        assert_eq!(
            params,
            vec![
                ("amount".to_string(), "1.5".to_string()),
                ("message".to_string(), "Hello World".to_string()),
                ("label".to_string(), String::new()),
            ]
        );
    }

    #[test]
    fn test_decode_uri_component_keeps_plus() {
        assert_eq!(
            decode_uri_component("https%3A%2F%2Fbitpay.com%2Fi%2Fa+b"),
            "https://bitpay.com/i/a+b"
        );
    }
}
