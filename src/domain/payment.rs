//! 支付请求与支付协议（PayPro）数据模型

use std::fmt;

use serde::{Deserialize, Serialize};
use zeroize::{Zeroize, ZeroizeOnDrop};

use super::Coin;

/// 最小单位金额（satoshi / wei）
pub type Amount = u128;

/// 最小单位金额的序列化：输出十进制字符串，输入为任意大小的 JSON 整数
///
/// `serde_json::Value` 无法表示超过 `u64::MAX` 的整数，18 位精度的代币很容易超出。
pub mod amount_serde {
    use serde::{Deserialize, Deserializer, Serializer};

    use super::Amount;

    pub fn serialize<S: Serializer>(amount: &Amount, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(amount)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Amount, D::Error> {
        Amount::deserialize(deserializer)
    }

    /// `Option<Amount>` 版本
    pub mod option {
        use serde::{Deserialize, Deserializer, Serializer};

        use super::Amount;

        pub fn serialize<S: Serializer>(
            amount: &Option<Amount>,
            serializer: S,
        ) -> Result<S::Ok, S::Error> {
            match amount {
                Some(amount) => serializer.collect_str(amount),
                None => serializer.serialize_none(),
            }
        }

        pub fn deserialize<'de, D: Deserializer<'de>>(
            deserializer: D,
        ) -> Result<Option<Amount>, D::Error> {
            #[derive(Deserialize)]
            struct Wrapper(#[serde(with = "crate::domain::payment::amount_serde")] Amount);

            Ok(Option::<Wrapper>::deserialize(deserializer)?.map(|Wrapper(amount)| amount))
        }
    }
}

/// 从 URI 中解析出的支付请求
///
/// `amount` 离开提取器时已经是最小单位，下游不得再次换算。
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ParsedPaymentRequest {
    pub address: String,
    #[serde(with = "amount_serde::option")]
    pub amount: Option<Amount>,
    pub message: Option<String>,
    pub coin: Coin,
    /// 指定的手续费率（`gasPrice` 参数原样保留）
    pub required_fee_rate: Option<String>,
}

/// 发票中的一个支付选项
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentOption {
    #[serde(default)]
    pub chain: Option<String>,
    pub currency: String,
    #[serde(default)]
    pub network: Option<String>,
    /// 最小单位
    #[serde(default, with = "amount_serde")]
    pub estimated_amount: Amount,
    #[serde(default)]
    pub decimals: Option<u32>,
    #[serde(default)]
    pub required_fee_rate: Option<f64>,
    #[serde(default)]
    pub selected: bool,
}

impl PaymentOption {
    /// 选项币种是否与给定币种一致（不区分大小写）
    pub fn matches(&self, coin: Coin) -> bool {
        self.currency.eq_ignore_ascii_case(coin.code())
    }
}

/// 发票支付选项列表（payment-options 响应）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PayProOptions {
    #[serde(default)]
    pub payment_url: Option<String>,
    #[serde(default)]
    pub memo: Option<String>,
    #[serde(default)]
    pub payment_id: Option<String>,
    #[serde(default)]
    pub payment_options: Vec<PaymentOption>,
}

impl PayProOptions {
    /// 标记为已选中的选项
    pub fn selected(&self) -> Vec<&PaymentOption> {
        self.payment_options.iter().filter(|o| o.selected).collect()
    }
}

/// 支付指令
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentInstruction {
    pub to_address: String,
    #[serde(default, with = "amount_serde::option")]
    pub amount: Option<Amount>,
    #[serde(default)]
    pub data: Option<String>,
}

/// 选定币种后的发票详情
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PayProDetails {
    #[serde(default)]
    pub payment_options: Vec<PaymentOption>,
    /// 非空
    pub instructions: Vec<PaymentInstruction>,
    #[serde(default)]
    pub memo: Option<String>,
    #[serde(default)]
    pub network: Option<String>,
    /// 远端约定为每 KB 的费率
    #[serde(default)]
    pub required_fee_rate: Option<f64>,
}

impl PayProDetails {
    pub fn first_instruction(&self) -> Option<&PaymentInstruction> {
        self.instructions.first()
    }
}

/// 私钥材料，drop 时清零
#[derive(Clone, PartialEq, Eq, Zeroize, ZeroizeOnDrop)]
pub struct KeyMaterial {
    key: String,
    encrypted: bool,
}

impl KeyMaterial {
    pub fn new(key: impl Into<String>) -> Self {
        let key = key.into();
        let encrypted = key.starts_with("6P");
        Self { key, encrypted }
    }

    pub fn expose(&self) -> &str {
        &self.key
    }

    /// BIP38 加密私钥
    pub fn is_encrypted(&self) -> bool {
        self.encrypted
    }
}

impl fmt::Debug for KeyMaterial {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyMaterial")
            .field("key", &"<redacted>")
            .field("encrypted", &self.encrypted)
            .finish()
    }
}

/// 服务深度链接参数
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "service", rename_all = "camelCase")]
pub enum ServiceParams {
    Coinbase {
        code: Option<String>,
    },
    ShapeShift {
        code: Option<String>,
    },
    BitPayCard {
        secret: Option<String>,
        email: Option<String>,
        otp: Option<String>,
        reason: Option<String>,
    },
}
