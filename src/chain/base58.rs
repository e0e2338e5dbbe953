//! Base58Check 旧格式地址（P2PKH / P2SH）

use sha2::{Digest, Sha256};

use crate::domain::Network;

/// 地址类型
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddressKind {
    PubKeyHash,
    ScriptHash,
}

/// 解码后的旧格式地址
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LegacyAddress {
    pub network: Network,
    pub kind: AddressKind,
    pub hash: [u8; 20],
}

const VERSIONS: [(u8, Network, AddressKind); 4] = [
    (0x00, Network::Livenet, AddressKind::PubKeyHash),
    (0x05, Network::Livenet, AddressKind::ScriptHash),
    (0x6f, Network::Testnet, AddressKind::PubKeyHash),
    (0xc4, Network::Testnet, AddressKind::ScriptHash),
];

fn checksum(payload: &[u8]) -> [u8; 4] {
    let first = Sha256::digest(payload);
    let second = Sha256::digest(first);
    let mut out = [0u8; 4];
    out.copy_from_slice(&second[..4]);
    out
}

impl LegacyAddress {
    /// 解码 Base58Check 地址，校验和或版本字节不符时返回 None
    pub fn decode(address: &str) -> Option<Self> {
        let bytes = bs58::decode(address).into_vec().ok()?;
        if bytes.len() != 25 {
            return None;
        }
        let (payload, check) = bytes.split_at(21);
        if checksum(payload) != check {
            return None;
        }
        let (_, network, kind) = VERSIONS.iter().find(|(v, _, _)| *v == payload[0])?;
        let mut hash = [0u8; 20];
        hash.copy_from_slice(&payload[1..]);
        Some(Self {
            network: *network,
            kind: *kind,
            hash,
        })
    }

    pub fn version(&self) -> u8 {
        VERSIONS
            .iter()
            .find(|(_, network, kind)| *network == self.network && *kind == self.kind)
            .map(|(v, _, _)| *v)
            .unwrap_or_default()
    }

    pub fn encode(&self) -> String {
        let mut payload = Vec::with_capacity(25);
        payload.push(self.version());
        payload.extend_from_slice(&self.hash);
        let check = checksum(&payload);
        payload.extend_from_slice(&check);
        bs58::encode(payload).into_string()
    }
}
