// 日志脱敏模块 - 防止私钥与邀请码泄露到日志

use regex::Regex;
use std::sync::LazyLock;

// WIF 私钥（51/52 位 base58，5/K/L/9/c 开头）
static WIF_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b[5KL9c][1-9A-HJ-NP-Za-km-z]{50,51}\b").unwrap()
});

// BIP38 加密私钥（58 位，6P 开头）
static BIP38_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b6P[1-9A-HJ-NP-Za-km-z]{56}\b").unwrap());

// 钱包邀请码（76 位 base58，可带 <app>: 前缀）
static JOIN_CODE_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b[1-9A-HJ-NP-Za-km-z]{70,80}T?(btc|bch|eth)?\b").unwrap());

// 导入令牌（1|/2|/3| 开头，含助记词，脱敏到行尾）
static IMPORT_TOKEN_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b[123]\|[^\n]*").unwrap());

// 十六进制私钥（64位）
static HEX_KEY_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\b(0x)?[a-f0-9]{64}\b").unwrap());

/// 脱敏短标识（保留前4位和后4位）
pub fn sanitize_token(token: &str) -> String {
    if token.len() < 12 || !token.is_ascii() {
        return "***".to_string();
    }
    let prefix = &token[..4];
    let suffix = &token[token.len() - 4..];
    format!("{}...{}", prefix, suffix)
}

/// 脱敏字符串中的敏感信息
pub fn sanitize_log_message(msg: &str) -> String {
    let mut sanitized = IMPORT_TOKEN_REGEX
        .replace_all(msg, "***IMPORT_TOKEN***")
        .into_owned();

    sanitized = BIP38_REGEX
        .replace_all(&sanitized, "***PRIVATE_KEY***")
        .into_owned();

    sanitized = WIF_REGEX
        .replace_all(&sanitized, "***PRIVATE_KEY***")
        .into_owned();

    sanitized = HEX_KEY_REGEX
        .replace_all(&sanitized, "***PRIVATE_KEY***")
        .into_owned();

    // 邀请码只保留首尾
    sanitized = JOIN_CODE_REGEX
        .replace_all(&sanitized, |caps: &regex::Captures| {
            caps.get(0)
                .map(|m| sanitize_token(m.as_str()))
                .unwrap_or_else(|| "***".to_string())
        })
        .into_owned();

    sanitized
}
