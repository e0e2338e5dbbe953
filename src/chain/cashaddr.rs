//! CashAddr 编解码
//!
//! 仅支持 160 位哈希（P2PKH 版本字节 0，P2SH 版本字节 8）。

use bech32::Fe32;

use super::base58::{AddressKind, LegacyAddress};
use crate::domain::Network;

const GENERATORS: [u64; 5] = [
    0x98f2bc8e61,
    0x79b76d99e2,
    0xf33e5fb3c4,
    0xae2eabe2a8,
    0x1e4f43e470,
];

const CHECKSUM_LEN: usize = 8;
/// 21 字节负载（版本 + 20 字节哈希）按 5 位分组后的长度
const PAYLOAD_LEN: usize = 34;

/// 解码后的 CashAddr 地址
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CashAddress {
    pub prefix: String,
    pub kind: AddressKind,
    pub hash: [u8; 20],
}

/// 网络对应的前缀
pub fn prefix_for(network: Network) -> &'static str {
    match network {
        Network::Livenet => "bitcoincash",
        Network::Testnet => "bchtest",
    }
}

fn network_of(prefix: &str) -> Option<Network> {
    Network::ALL
        .into_iter()
        .find(|network| prefix_for(*network) == prefix)
}

fn polymod(values: &[u8]) -> u64 {
    let mut c: u64 = 1;
    for value in values {
        let c0 = (c >> 35) as u8;
        c = ((c & 0x07_ffff_ffff) << 5) ^ u64::from(*value);
        for (i, generator) in GENERATORS.iter().enumerate() {
            if c0 & (1 << i) != 0 {
                c ^= generator;
            }
        }
    }
    c ^ 1
}

fn checksum_input(prefix: &str, payload: &[u8]) -> Vec<u8> {
    let mut input: Vec<u8> = prefix.bytes().map(|b| b & 0x1f).collect();
    input.push(0);
    input.extend_from_slice(payload);
    input
}

fn convert_bits(data: &[u8], from: u32, to: u32, pad: bool) -> Option<Vec<u8>> {
    let mut acc: u32 = 0;
    let mut bits: u32 = 0;
    let max_value = (1u32 << to) - 1;
    let max_acc = (1u32 << (from + to - 1)) - 1;
    let mut out = Vec::with_capacity(data.len() * from as usize / to as usize + 1);
    for value in data {
        let v = u32::from(*value);
        if v >> from != 0 {
            return None;
        }
        acc = ((acc << from) | v) & max_acc;
        bits += from;
        while bits >= to {
            bits -= to;
            out.push(((acc >> bits) & max_value) as u8);
        }
    }
    if pad {
        if bits > 0 {
            out.push(((acc << (to - bits)) & max_value) as u8);
        }
    } else if bits >= from || ((acc << (to - bits)) & max_value) != 0 {
        return None;
    }
    Some(out)
}

impl CashAddress {
    /// 解码；地址不带前缀时使用 `default_prefix`
    pub fn decode(input: &str, default_prefix: &str) -> Option<Self> {
        let has_lower = input.chars().any(|c| c.is_ascii_lowercase());
        let has_upper = input.chars().any(|c| c.is_ascii_uppercase());
        if has_lower && has_upper {
            return None;
        }

        let lowered = input.to_ascii_lowercase();
        let (prefix, payload) = match lowered.split_once(':') {
            Some((prefix, payload)) => (prefix.to_string(), payload),
            None => (default_prefix.to_ascii_lowercase(), lowered.as_str()),
        };
        if prefix.is_empty() || payload.len() != PAYLOAD_LEN + CHECKSUM_LEN {
            return None;
        }

        let values = payload
            .chars()
            .map(|c| Fe32::from_char(c).ok().map(Fe32::to_u8))
            .collect::<Option<Vec<u8>>>()?;
        if polymod(&checksum_input(&prefix, &values)) != 0 {
            return None;
        }

        let data = convert_bits(&values[..PAYLOAD_LEN], 5, 8, false)?;
        if data.len() != 21 {
            return None;
        }
        let kind = match data[0] {
            0x00 => AddressKind::PubKeyHash,
            0x08 => AddressKind::ScriptHash,
            _ => return None,
        };
        let mut hash = [0u8; 20];
        hash.copy_from_slice(&data[1..]);
        Some(Self { prefix, kind, hash })
    }

    /// 带前缀的小写编码
    pub fn encode(&self) -> String {
        let version = match self.kind {
            AddressKind::PubKeyHash => 0x00,
            AddressKind::ScriptHash => 0x08,
        };
        let mut raw = Vec::with_capacity(21);
        raw.push(version);
        raw.extend_from_slice(&self.hash);
        let mut payload = convert_bits(&raw, 8, 5, true).unwrap_or_default();

        let mut input = checksum_input(&self.prefix, &payload);
        input.extend_from_slice(&[0u8; CHECKSUM_LEN]);
        let poly = polymod(&input);
        payload.extend((0..CHECKSUM_LEN).map(|i| ((poly >> (5 * (7 - i))) & 0x1f) as u8));

        let body: String = payload
            .into_iter()
            .filter_map(|v| Fe32::try_from(v).ok())
            .map(Fe32::to_char)
            .collect();
        format!("{}:{}", self.prefix, body)
    }

    pub fn network(&self) -> Option<Network> {
        network_of(&self.prefix)
    }

    /// 由旧格式地址转换，前缀由地址所属网络决定
    pub fn from_legacy(legacy: &LegacyAddress) -> Self {
        Self {
            prefix: prefix_for(legacy.network).to_string(),
            kind: legacy.kind,
            hash: legacy.hash,
        }
    }

    pub fn to_legacy(&self) -> Option<LegacyAddress> {
        Some(LegacyAddress {
            network: self.network()?,
            kind: self.kind,
            hash: self.hash,
        })
    }
}

/// 旧格式地址 → CashAddr（带前缀）
pub fn legacy_to_cashaddr(address: &str) -> Option<String> {
    LegacyAddress::decode(address).map(|legacy| CashAddress::from_legacy(&legacy).encode())
}
