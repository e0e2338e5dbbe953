//! Bitcoin 地址、BIP21 URI 与 WIF 私钥

use std::str::FromStr;

use bitcoin::{address::NetworkUnchecked, Address, PrivateKey};

use super::{bip21, ChainCodec, ParsedUri};
use crate::{
    domain::{Coin, CoinRegistry, Network, StaticCoinRegistry},
    error::Result,
};

/// BIP21 协议前缀取自币种注册表
#[derive(Debug, Clone)]
pub struct BitcoinCodec {
    schemes: Vec<&'static str>,
}

impl BitcoinCodec {
    pub fn new(registry: &dyn CoinRegistry) -> Self {
        Self {
            schemes: registry.uri_scheme_prefixes(Coin::Btc),
        }
    }

    pub fn schemes(&self) -> &[&'static str] {
        &self.schemes
    }
}

impl Default for BitcoinCodec {
    fn default() -> Self {
        Self::new(&StaticCoinRegistry)
    }
}

fn to_bitcoin_network(network: Network) -> bitcoin::Network {
    match network {
        Network::Livenet => bitcoin::Network::Bitcoin,
        Network::Testnet => bitcoin::Network::Testnet,
    }
}

impl ChainCodec for BitcoinCodec {
    fn coin(&self) -> Coin {
        Coin::Btc
    }

    fn parse_uri(&self, data: &str) -> Result<ParsedUri> {
        bip21::parse(data, &self.schemes, Coin::Btc, |address, _| {
            self.is_valid_address_any(address)
                .then(|| address.to_string())
        })
    }

    fn is_valid_address(&self, address: &str, network: Network) -> bool {
        Address::<NetworkUnchecked>::from_str(address)
            .map(|addr| addr.is_valid_for_network(to_bitcoin_network(network)))
            .unwrap_or(false)
    }
}

/// 主网 WIF 私钥
pub fn is_livenet_wif(key: &str) -> bool {
    PrivateKey::from_wif(key)
        .map(|pk| pk.network == bitcoin::Network::Bitcoin)
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    const GENESIS: &str = "1A1zP1eP5QGefi2DMPTfTL5SLmv7DivfNa";

    #[test]
    fn test_addresses() {
        let codec = BitcoinCodec::default();
        assert!(codec.is_valid_address(GENESIS, Network::Livenet));
        assert!(!codec.is_valid_address(GENESIS, Network::Testnet));
        assert!(codec.is_valid_address("mipcBbFg9gMiCh81Kj8tqqdgoZub1ZJRfn", Network::Testnet));
        assert!(codec.is_valid_address(
            "bc1qw508d6qejxtdg4y5r3zarvary0c5xw7kv8f3t4",
            Network::Livenet
        ));
        assert!(!codec.is_valid_address_any("1A1zP1eP5QGefi2DMPTfTL5SLmv7DivfNb"));
        assert!(!codec.is_valid_address_any("qpm2qsznhks23z7629mms6s4cwef74vcwvy22gdx6a"));
    }

    #[test]
    fn test_uri() {
        let codec = BitcoinCodec::default();
        assert_eq!(codec.schemes(), ["bitcoin"]);
        let parsed = codec
            .parse_uri("bitcoin:1A1zP1eP5QGefi2DMPTfTL5SLmv7DivfNa?amount=0.001&message=Coffee")
            .unwrap();
        assert_eq!(parsed.address.as_deref(), Some(GENESIS));
        assert_eq!(parsed.amount, Some(100_000));
        assert_eq!(parsed.message.as_deref(), Some("Coffee"));
        assert!(codec.is_valid_uri("BITCOIN:1A1zP1eP5QGefi2DMPTfTL5SLmv7DivfNa"));
        assert!(!codec.is_valid_uri("bitcoin:1A1zP1eP5QGefi2DMPTfTL5SLmv7DivfNb"));
        assert!(!codec.is_valid_uri("bitcoincash:1A1zP1eP5QGefi2DMPTfTL5SLmv7DivfNa"));
    }

    #[test]
    fn test_wif() {
        assert!(is_livenet_wif("5HueCGU8rMjxEXxiPuD5BDku4MkFqeZyd4dZ1jvhTVqvbTLvyTJ"));
        assert!(is_livenet_wif("KwdMAjGmerYanjeui5SHS7JkmpZvVipYvB2LJGU1ZxJwYvP98617"));
        assert!(!is_livenet_wif("5HueCGU8rMjxEXxiPuD5BDku4MkFqeZyd4dZ1jvhTVqvbTLvyTK"));
        assert!(!is_livenet_wif("cVt4o7BGAig1UXywgGSmARhxMdzP5qvQsxKkSsc1XEkw3tDTQFpy"));
    }
}
