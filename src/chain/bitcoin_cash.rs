//! Bitcoin Cash：CashAddr 地址与 URI
//!
//! 原生 URI 只接受 CashAddr；旧格式地址的 URI 由分类器的专门规则处理，
//! 见 [`legacy_uri_to_cashaddr`]。

use super::{
    base58::LegacyAddress,
    bip21,
    cashaddr::{prefix_for, CashAddress},
    codec_for, ChainCodec, ParsedUri, BITCOIN, BITCOIN_CASH,
};
use crate::{
    domain::{Coin, CoinRegistry, Network, StaticCoinRegistry},
    error::{IncomingDataError, Result},
};

/// 主网与测试网协议前缀取自币种注册表
#[derive(Debug, Clone)]
pub struct BitcoinCashCodec {
    schemes: Vec<&'static str>,
}

impl BitcoinCashCodec {
    pub fn new(registry: &dyn CoinRegistry) -> Self {
        Self {
            schemes: registry.uri_scheme_prefixes(Coin::Bch),
        }
    }

    pub fn schemes(&self) -> &[&'static str] {
        &self.schemes
    }

    /// 将协议前缀替换为 Bitcoin 协议前缀；不是 BCH 协议前缀时返回 None
    pub fn rewrite_as_bitcoin_uri(&self, data: &str) -> Option<String> {
        let bitcoin_scheme = BITCOIN.schemes().first()?;
        self.schemes.iter().find_map(|scheme| {
            data.strip_prefix(scheme)
                .and_then(|rest| rest.strip_prefix(':'))
                .map(|rest| format!("{}:{}", bitcoin_scheme, rest))
        })
    }
}

impl Default for BitcoinCashCodec {
    fn default() -> Self {
        Self::new(&StaticCoinRegistry)
    }
}

impl ChainCodec for BitcoinCashCodec {
    fn coin(&self) -> Coin {
        Coin::Bch
    }

    fn parse_uri(&self, data: &str) -> Result<ParsedUri> {
        bip21::parse(data, &self.schemes, Coin::Bch, |address, scheme| {
            CashAddress::decode(address, scheme).map(|addr| addr.encode())
        })
    }

    fn is_valid_address(&self, address: &str, network: Network) -> bool {
        let expected = prefix_for(network);
        CashAddress::decode(address, expected)
            .map(|addr| addr.prefix == expected)
            .unwrap_or(false)
    }
}

/// 使用旧格式地址的 BCH URI：按 Bitcoin 规则解析后把地址转换为 CashAddr
pub fn legacy_uri_to_cashaddr(data: &str) -> Result<ParsedUri> {
    let rewritten = BITCOIN_CASH
        .rewrite_as_bitcoin_uri(data)
        .ok_or_else(|| IncomingDataError::malformed_uri("not a bitcoin cash uri"))?;
    let mut parsed = codec_for(Coin::Btc).parse_uri(&rewritten)?;
    let legacy = parsed
        .address
        .as_deref()
        .and_then(LegacyAddress::decode)
        .ok_or_else(|| IncomingDataError::malformed_address(data))?;
    parsed.address = Some(CashAddress::from_legacy(&legacy).encode());
    // 金额按 BTC 精度换算，与 BCH 相同
    Ok(parsed)
}
