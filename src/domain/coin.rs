//! 币种注册表
//!
//! 每个币种静态关联精度与 URI 协议前缀，以及 UTXO/ERC20 标记。
//! 注册表在进程启动时初始化，之后只读。

use std::{fmt, str::FromStr};

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

/// 支持的币种
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Coin {
    Btc,
    Bch,
    Eth,
    Pax,
    Usdc,
    Gusd,
}

/// 网络
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Network {
    Livenet,
    Testnet,
}

impl Network {
    pub const ALL: [Network; 2] = [Network::Livenet, Network::Testnet];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Livenet => "livenet",
            Self::Testnet => "testnet",
        }
    }
}

/// 精度信息
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UnitInfo {
    /// 每个显示单位对应的最小单位数量
    pub unit_to_satoshi: u128,
    pub unit_decimals: u32,
    pub unit_code: &'static str,
}

/// 币种属性
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CoinProperties {
    pub is_utxo: bool,
    pub is_erc_token: bool,
}

/// 支付信息
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PaymentInfo {
    pub protocol_prefix_livenet: &'static str,
    pub protocol_prefix_testnet: &'static str,
}

/// 币种配置
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CoinOpts {
    pub coin: Coin,
    pub unit_info: UnitInfo,
    pub properties: CoinProperties,
    pub payment_info: PaymentInfo,
}

static AVAILABLE_COINS: Lazy<Vec<CoinOpts>> = Lazy::new(|| {
    fn erc20(coin: Coin, code: &'static str, decimals: u32) -> CoinOpts {
        CoinOpts {
            coin,
            unit_info: UnitInfo {
                unit_to_satoshi: 10u128.pow(decimals),
                unit_decimals: decimals,
                unit_code: code,
            },
            properties: CoinProperties {
                is_utxo: false,
                is_erc_token: true,
            },
            payment_info: PaymentInfo {
                protocol_prefix_livenet: "ethereum",
                protocol_prefix_testnet: "ethereum",
            },
        }
    }

    vec![
        CoinOpts {
            coin: Coin::Btc,
            unit_info: UnitInfo {
                unit_to_satoshi: 100_000_000,
                unit_decimals: 8,
                unit_code: "btc",
            },
            properties: CoinProperties {
                is_utxo: true,
                is_erc_token: false,
            },
            payment_info: PaymentInfo {
                protocol_prefix_livenet: "bitcoin",
                protocol_prefix_testnet: "bitcoin",
            },
        },
        CoinOpts {
            coin: Coin::Bch,
            unit_info: UnitInfo {
                unit_to_satoshi: 100_000_000,
                unit_decimals: 8,
                unit_code: "bch",
            },
            properties: CoinProperties {
                is_utxo: true,
                is_erc_token: false,
            },
            payment_info: PaymentInfo {
                protocol_prefix_livenet: "bitcoincash",
                protocol_prefix_testnet: "bchtest",
            },
        },
        CoinOpts {
            coin: Coin::Eth,
            unit_info: UnitInfo {
                unit_to_satoshi: 1_000_000_000_000_000_000,
                unit_decimals: 18,
                unit_code: "eth",
            },
            properties: CoinProperties {
                is_utxo: false,
                is_erc_token: false,
            },
            payment_info: PaymentInfo {
                protocol_prefix_livenet: "ethereum",
                protocol_prefix_testnet: "ethereum",
            },
        },
        erc20(Coin::Pax, "pax", 18),
        erc20(Coin::Usdc, "usdc", 6),
        erc20(Coin::Gusd, "gusd", 2),
    ]
});

impl Coin {
    pub fn opts(&self) -> &'static CoinOpts {
        AVAILABLE_COINS
            .iter()
            .find(|opts| opts.coin == *self)
            .unwrap_or_else(|| unreachable!("coin {:?} is not registered", self))
    }

    /// 小写代码（btc/bch/eth/...）
    pub fn code(&self) -> &'static str {
        self.opts().unit_info.unit_code
    }

    pub fn is_utxo(&self) -> bool {
        self.opts().properties.is_utxo
    }

    pub fn is_erc_token(&self) -> bool {
        self.opts().properties.is_erc_token
    }

    /// 所在链（ERC20 代币属于 ETH 链）
    pub fn chain(&self) -> Coin {
        if self.is_erc_token() {
            Coin::Eth
        } else {
            *self
        }
    }
}

impl fmt::Display for Coin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// 未登记的币种标识
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownCoin(pub String);

impl fmt::Display for UnknownCoin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown coin identifier: {}", self.0)
    }
}

impl std::error::Error for UnknownCoin {}

impl FromStr for Coin {
    type Err = UnknownCoin;

    /// 只接受注册表中的代码（不区分大小写），名称与别名不被识别
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let ticker = s.trim();
        AVAILABLE_COINS
            .iter()
            .find(|opts| opts.unit_info.unit_code.eq_ignore_ascii_case(ticker))
            .map(|opts| opts.coin)
            .ok_or_else(|| UnknownCoin(ticker.to_string()))
    }
}

/// 精度
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Precision {
    pub unit_to_satoshi: u128,
    pub decimals: u32,
}

/// 币种注册表接口
pub trait CoinRegistry: Send + Sync {
    fn precision_of(&self, coin: Coin) -> Precision;
    fn is_utxo(&self, coin: Coin) -> bool;
    fn uri_scheme_prefixes(&self, coin: Coin) -> Vec<&'static str>;
}

/// 静态注册表（默认实现）
#[derive(Debug, Clone, Copy, Default)]
pub struct StaticCoinRegistry;

impl CoinRegistry for StaticCoinRegistry {
    fn precision_of(&self, coin: Coin) -> Precision {
        let unit = coin.opts().unit_info;
        Precision {
            unit_to_satoshi: unit.unit_to_satoshi,
            decimals: unit.unit_decimals,
        }
    }

    fn is_utxo(&self, coin: Coin) -> bool {
        coin.is_utxo()
    }

    fn uri_scheme_prefixes(&self, coin: Coin) -> Vec<&'static str> {
        let info = coin.opts().payment_info;
        let mut prefixes = vec![info.protocol_prefix_livenet];
        if info.protocol_prefix_testnet != info.protocol_prefix_livenet {
            prefixes.push(info.protocol_prefix_testnet);
        }
        prefixes
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_precision_table() {
        let registry = StaticCoinRegistry;
        assert_eq!(registry.precision_of(Coin::Btc).unit_to_satoshi, 100_000_000);
        assert_eq!(registry.precision_of(Coin::Eth).decimals, 18);
        assert_eq!(registry.precision_of(Coin::Usdc).unit_to_satoshi, 1_000_000);
        assert_eq!(registry.precision_of(Coin::Gusd).decimals, 2);
    }

    #[test]
    fn test_utxo_flags() {
        assert!(Coin::Btc.is_utxo());
        assert!(Coin::Bch.is_utxo());
        assert!(!Coin::Eth.is_utxo());
        assert!(!Coin::Usdc.is_utxo());
        assert!(Coin::Pax.is_erc_token());
        assert_eq!(Coin::Gusd.chain(), Coin::Eth);
    }

    #[test]
    fn test_scheme_prefixes() {
        let registry = StaticCoinRegistry;
        assert_eq!(registry.uri_scheme_prefixes(Coin::Btc), vec!["bitcoin"]);
        assert_eq!(
            registry.uri_scheme_prefixes(Coin::Bch),
            vec!["bitcoincash", "bchtest"]
        );
    }

    #[test]
    fn test_coin_tickers() {
        assert_eq!("BTC".parse::<Coin>().unwrap(), Coin::Btc);
        assert_eq!(" eth ".parse::<Coin>().unwrap(), Coin::Eth);
        assert_eq!("USDC".parse::<Coin>().unwrap(), Coin::Usdc);
        assert!("doge".parse::<Coin>().is_err());
        // 名称与别名不是代码
        assert!("bitcoin".parse::<Coin>().is_err());
        assert!("Bitcoin Cash".parse::<Coin>().is_err());
        assert!("usdp".parse::<Coin>().is_err());
    }

    #[test]
    fn test_coin_serde() {
        assert_eq!(serde_json::to_string(&Coin::Bch).unwrap(), "\"bch\"");
        let coin: Coin = serde_json::from_str("\"gusd\"").unwrap();
        assert_eq!(coin, Coin::Gusd);
    }
}
