//! Ethereum 地址与 URI
//!
//! 地址校验：`0x` 前缀可选，40 位十六进制；大小写混合时必须通过 EIP-55 校验。

use std::sync::LazyLock;

use regex::Regex;
use sha3::{Digest, Keccak256};

use super::{ChainCodec, ParsedUri};
use crate::{
    domain::{Coin, CoinRegistry, Network, StaticCoinRegistry},
    error::{IncomingDataError, Result},
    utils::amount::parse_smallest_unit,
};

static URI_PREFIX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)^[a-z]+:").unwrap());

static URI_PARAMS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)([\?\&](value|gas|gasPrice|gasLimit)=([0-9]+([\,\.][0-9]+)?))+").unwrap()
});

static VALUE_PARAM: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)[\?\&]value=([0-9]+([\,\.][0-9]+)?)").unwrap());

static GAS_PRICE_PARAM: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)[\?\&]gasPrice=([0-9]+([\,\.][0-9]+)?)").unwrap());

static HEX_ADDRESS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^(0x)?[0-9a-f]{40}$").unwrap());

#[derive(Debug, Clone)]
pub struct EthereumCodec {
    schemes: Vec<&'static str>,
}

impl EthereumCodec {
    pub fn new(registry: &dyn CoinRegistry) -> Self {
        Self {
            schemes: registry.uri_scheme_prefixes(Coin::Eth),
        }
    }

    pub fn schemes(&self) -> &[&'static str] {
        &self.schemes
    }
}

impl Default for EthereumCodec {
    fn default() -> Self {
        Self::new(&StaticCoinRegistry)
    }
}

/// 地址校验（`0x` 可选，混合大小写时校验 EIP-55）
pub fn is_address(address: &str) -> bool {
    if !HEX_ADDRESS.is_match(address) {
        return false;
    }
    let hex_part = &address[address.len() - 40..];
    let all_lower = !hex_part.chars().any(|c| c.is_ascii_uppercase());
    let all_upper = !hex_part.chars().any(|c| c.is_ascii_lowercase());
    if all_lower || all_upper {
        return true;
    }
    verify_eip55_checksum(hex_part)
}

/// 验证EIP-55 Checksum
/// https://eips.ethereum.org/EIPS/eip-55
fn verify_eip55_checksum(hex_part: &str) -> bool {
    let hash = Keccak256::digest(hex_part.to_lowercase().as_bytes());

    hex_part.chars().enumerate().all(|(i, ch)| {
        if !ch.is_ascii_alphabetic() {
            return true;
        }
        let hash_byte = hash[i / 2];
        let hash_nibble = if i % 2 == 0 {
            hash_byte >> 4
        } else {
            hash_byte & 0x0f
        };
        ch.is_ascii_uppercase() == (hash_nibble >= 8)
    })
}

/// 去掉协议名与已知的交易参数
fn strip_uri(data: &str) -> String {
    let without_prefix = URI_PREFIX.replace(data, "");
    URI_PARAMS.replace(&without_prefix, "").into_owned()
}

/// 取地址部分（去掉协议名与整个查询串）
pub fn extract_address(data: &str) -> String {
    let without_prefix = URI_PREFIX.replace(data, "");
    without_prefix
        .split('?')
        .next()
        .unwrap_or_default()
        .to_string()
}

fn capture_number(re: &Regex, data: &str) -> Option<String> {
    re.captures(data)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().replace(',', "."))
}

impl ChainCodec for EthereumCodec {
    fn coin(&self) -> Coin {
        Coin::Eth
    }

    fn is_valid_uri(&self, data: &str) -> bool {
        let lower = data.to_ascii_lowercase();
        if data.is_empty() || !self.schemes.iter().any(|scheme| lower.contains(scheme)) {
            return false;
        }
        is_address(&strip_uri(data))
    }

    /// `value` 为 wei，原样保留；`gasPrice` 作为指定费率
    fn parse_uri(&self, data: &str) -> Result<ParsedUri> {
        if !self.is_valid_uri(data) {
            return Err(IncomingDataError::malformed_uri("invalid ethereum uri"));
        }
        let address = extract_address(data);
        if address.is_empty() {
            return Err(IncomingDataError::malformed_address(data));
        }
        let amount = capture_number(&VALUE_PARAM, data)
            .map(|value| parse_smallest_unit(&value))
            .transpose()?;
        let gas_price = GAS_PRICE_PARAM
            .captures(data)
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str().to_string());
        Ok(ParsedUri {
            address: Some(address),
            amount,
            gas_price,
            ..Default::default()
        })
    }

    /// 只有主网
    fn is_valid_address(&self, address: &str, network: Network) -> bool {
        network == Network::Livenet && is_address(address)
    }
}
