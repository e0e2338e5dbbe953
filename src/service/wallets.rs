//! 钱包目录（只读视图）
//!
//! 加入共享钱包时需要知道本地已有多少把密钥，钱包按 key id 分组。

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::domain::Coin;

/// 查询条件
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WalletFilter {
    pub show_hidden: bool,
    pub can_add_new_account: bool,
}

impl WalletFilter {
    /// 加入钱包时使用的条件：包含隐藏钱包
    pub fn for_join() -> Self {
        Self {
            show_hidden: true,
            can_add_new_account: true,
        }
    }
}

/// 钱包摘要
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WalletSummary {
    pub wallet_id: String,
    #[serde(default)]
    pub key_id: Option<String>,
    pub coin: Coin,
    #[serde(default)]
    pub hidden: bool,
    /// 密钥是否还能派生新账户
    #[serde(default = "default_true")]
    pub can_add_account: bool,
}

fn default_true() -> bool {
    true
}

/// 钱包目录接口
pub trait WalletDirectory: Send + Sync {
    fn list_wallets(&self, filter: &WalletFilter) -> Vec<WalletSummary>;
}

/// 钱包按 key id 分组后的组数（缺少 key id 的钱包归为同一组）
pub fn count_keys(wallets: &[WalletSummary]) -> usize {
    wallets
        .iter()
        .map(|w| w.key_id.as_deref())
        .collect::<BTreeSet<_>>()
        .len()
}

/// 内存中的钱包目录
#[derive(Debug, Clone, Default)]
pub struct StaticWalletDirectory {
    wallets: Vec<WalletSummary>,
}

impl StaticWalletDirectory {
    pub fn new(wallets: Vec<WalletSummary>) -> Self {
        Self { wallets }
    }

    pub fn empty() -> Self {
        Self::default()
    }
}

impl WalletDirectory for StaticWalletDirectory {
    fn list_wallets(&self, filter: &WalletFilter) -> Vec<WalletSummary> {
        self.wallets
            .iter()
            .filter(|w| filter.show_hidden || !w.hidden)
            .filter(|w| !filter.can_add_new_account || w.can_add_account)
            .cloned()
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn wallet(id: &str, key: Option<&str>, hidden: bool) -> WalletSummary {
        WalletSummary {
            wallet_id: id.to_string(),
            key_id: key.map(str::to_string),
            coin: Coin::Btc,
            hidden,
            can_add_account: true,
        }
    }

    #[test]
    fn test_count_keys_groups_by_key_id() {
        let wallets = vec![
            wallet("w1", Some("k1"), false),
            wallet("w2", Some("k1"), false),
            wallet("w3", Some("k2"), false),
        ];
        assert_eq!(count_keys(&wallets), 2);
        assert_eq!(count_keys(&[]), 0);
        assert_eq!(count_keys(&[wallet("w4", None, false), wallet("w5", None, false)]), 1);
    }

    #[test]
    fn test_hidden_wallets_filtered() {
        let dir = StaticWalletDirectory::new(vec![
            wallet("w1", Some("k1"), false),
            wallet("w2", Some("k2"), true),
        ]);
        assert_eq!(dir.list_wallets(&WalletFilter::for_join()).len(), 2);
        let visible = WalletFilter {
            show_hidden: false,
            can_add_new_account: false,
        };
        assert_eq!(dir.list_wallets(&visible).len(), 1);
    }
}
