//! 输入分类结果

use std::fmt;

use serde::{Deserialize, Serialize};

use super::Coin;

/// 应用内/关联服务的深度链接类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ServiceKind {
    /// `<app>://coinbase?code=...`
    Coinbase,
    /// `<app>://shapeshift?code=...`
    ShapeShift,
    /// `bitpay://bitpay?secret=...&email=...&otp=...`
    BitPayCard,
    /// `bitpay:<address>?coin=<ticker>&amount=...`
    BitPayUri,
}

/// 识别出的输入类型（封闭集合）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", content = "value")]
pub enum ClassificationKind {
    /// 托管发票 URL
    InvoiceUrl,
    /// 不含地址的支付协议 URI（`bitcoin:?r=...`）
    PaymentProtocolUri,
    /// 带有效地址的链 URI
    ChainUri(Coin),
    /// 使用旧格式地址的链 URI（如 `bitcoincash:` + base58 地址）
    ChainUriLegacyAddress(Coin),
    /// 普通 http(s) URL
    PlainUrl,
    /// 裸地址
    ChainAddress(Coin),
    /// 服务深度链接
    ServiceUri(ServiceKind),
    /// 加入共享钱包的邀请码
    JoinCode,
    /// 无前缀的旧版邀请码
    JoinCodeLegacy,
    /// 私钥（WIF 或 BIP38 加密）
    PrivateKey,
    /// 导出钱包二维码（`1|`/`2|`/`3|` 前缀）
    ImportPrivateKey,
    /// 无法识别
    Unrecognized,
}

impl ClassificationKind {
    pub fn is_recognized(&self) -> bool {
        !matches!(self, Self::Unrecognized)
    }

    /// 关联的币种（如有）
    pub fn coin(&self) -> Option<Coin> {
        match self {
            Self::ChainUri(coin) | Self::ChainUriLegacyAddress(coin) | Self::ChainAddress(coin) => {
                Some(*coin)
            }
            _ => None,
        }
    }

    /// 展示用类型名
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::InvoiceUrl => "InvoiceUri",
            Self::PaymentProtocolUri => "PayPro",
            Self::ChainUri(Coin::Bch) | Self::ChainUriLegacyAddress(_) => "BitcoinCashUri",
            Self::ChainUri(Coin::Btc) => "BitcoinUri",
            Self::ChainUri(_) => "EthereumUri",
            Self::PlainUrl => "PlainUrl",
            Self::ChainAddress(Coin::Btc) => "BitcoinAddress",
            Self::ChainAddress(Coin::Bch) => "BitcoinCashAddress",
            Self::ChainAddress(_) => "EthereumAddress",
            Self::ServiceUri(ServiceKind::Coinbase) => "Coinbase",
            Self::ServiceUri(ServiceKind::ShapeShift) => "ShapeShift",
            Self::ServiceUri(ServiceKind::BitPayCard) => "BitPayCard",
            Self::ServiceUri(ServiceKind::BitPayUri) => "BitPayUri",
            Self::JoinCode | Self::JoinCodeLegacy => "JoinWallet",
            Self::PrivateKey => "PrivateKey",
            Self::ImportPrivateKey => "ImportPrivateKey",
            Self::Unrecognized => "Unrecognized",
        }
    }

    /// 展示用标题（未翻译，由调用方负责本地化）
    pub fn title(&self) -> &'static str {
        match self {
            Self::InvoiceUrl => "Invoice URL",
            Self::PaymentProtocolUri => "Payment URL",
            Self::ChainUri(Coin::Bch) | Self::ChainUriLegacyAddress(_) => "Bitcoin Cash URI",
            Self::ChainUri(Coin::Btc) => "Bitcoin URI",
            Self::ChainUri(_) => "Ethereum URI",
            Self::PlainUrl => "Plain URL",
            Self::ChainAddress(Coin::Btc) => "Bitcoin Address",
            Self::ChainAddress(Coin::Bch) => "Bitcoin Cash Address",
            Self::ChainAddress(_) => "Ethereum Address",
            Self::ServiceUri(ServiceKind::Coinbase) => "Coinbase URI",
            Self::ServiceUri(ServiceKind::ShapeShift) => "ShapeShift URI",
            Self::ServiceUri(ServiceKind::BitPayCard) => "BitPay Card URI",
            Self::ServiceUri(ServiceKind::BitPayUri) => "BitPay URI",
            Self::JoinCode | Self::JoinCodeLegacy => "Invitation Code",
            Self::PrivateKey => "Private Key",
            Self::ImportPrivateKey => "Import Words",
            Self::Unrecognized => "Unrecognized",
        }
    }
}

impl fmt::Display for ClassificationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.coin() {
            Some(coin) => write!(f, "{}({})", self.type_name(), coin),
            None => f.write_str(self.type_name()),
        }
    }
}

/// 无副作用的展示用分类结果
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Description {
    pub data: String,
    pub kind: ClassificationKind,
    pub title: &'static str,
}
