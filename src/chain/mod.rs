//! 链编解码器
//!
//! 每条链提供 URI 校验/解析与地址校验；代币（ERC20）复用所在链的编解码器。

pub mod base58;
pub mod bip21;
pub mod bitcoin;
pub mod bitcoin_cash;
pub mod cashaddr;
pub mod ethereum;

use std::sync::LazyLock;

use crate::{
    domain::{Amount, Coin, Network, StaticCoinRegistry},
    error::Result,
};

pub use self::{bitcoin::BitcoinCodec, bitcoin_cash::BitcoinCashCodec, ethereum::EthereumCodec};

/// 链 URI 解析结果
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParsedUri {
    pub address: Option<String>,
    /// 最小单位
    pub amount: Option<Amount>,
    pub message: Option<String>,
    /// `r` 参数（支付协议 URL）
    pub payment_url: Option<String>,
    /// `gasPrice` 参数原文
    pub gas_price: Option<String>,
}

/// 链编解码器接口
pub trait ChainCodec: Send + Sync {
    fn coin(&self) -> Coin;

    fn parse_uri(&self, data: &str) -> Result<ParsedUri>;

    fn is_valid_uri(&self, data: &str) -> bool {
        self.parse_uri(data).is_ok()
    }

    fn is_valid_address(&self, address: &str, network: Network) -> bool;

    /// 在任一网络上有效
    fn is_valid_address_any(&self, address: &str) -> bool {
        Network::ALL
            .iter()
            .any(|network| self.is_valid_address(address, *network))
    }
}

pub(crate) static BITCOIN: LazyLock<BitcoinCodec> =
    LazyLock::new(|| BitcoinCodec::new(&StaticCoinRegistry));
pub(crate) static BITCOIN_CASH: LazyLock<BitcoinCashCodec> =
    LazyLock::new(|| BitcoinCashCodec::new(&StaticCoinRegistry));
pub(crate) static ETHEREUM: LazyLock<EthereumCodec> =
    LazyLock::new(|| EthereumCodec::new(&StaticCoinRegistry));

/// 币种对应的编解码器（代币取所在链）
pub fn codec_for(coin: Coin) -> &'static dyn ChainCodec {
    match coin.chain() {
        Coin::Bch => &*BITCOIN_CASH,
        Coin::Eth | Coin::Pax | Coin::Usdc | Coin::Gusd => &*ETHEREUM,
        Coin::Btc => &*BITCOIN,
    }
}

/// 所有链的 URI 协议前缀（去重，按链顺序）
pub fn payment_uri_schemes() -> Vec<&'static str> {
    let mut schemes: Vec<&'static str> = Vec::new();
    let all = BITCOIN
        .schemes()
        .iter()
        .chain(BITCOIN_CASH.schemes())
        .chain(ETHEREUM.schemes());
    for scheme in all {
        if !schemes.contains(scheme) {
            schemes.push(scheme);
        }
    }
    schemes
}

/// 协议前缀组成的正则分支，如 `bitcoin|ethereum`
pub fn payment_uri_scheme_pattern() -> String {
    payment_uri_schemes()
        .into_iter()
        .map(regex::escape)
        .collect::<Vec<_>>()
        .join("|")
}
