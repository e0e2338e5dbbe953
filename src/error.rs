//! 错误定义模块
//!
//! 识别流程中的所有错误都是非致命的：通过通知通道发布一次错误事件，
//! 当前输入的处理流程随即结束，不影响后续输入的识别。

use serde::Serialize;
use thiserror::Error;

use crate::domain::Coin;

/// 识别/解析/支付协议错误
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IncomingDataError {
    /// 规则已匹配，但无法从 URI 中解析出地址
    #[error("Could not parse address from {input}")]
    MalformedAddress { input: String },

    /// 规则已匹配，但 URI 结构无法解析
    #[error("Malformed URI: {reason}")]
    MalformedUri { reason: String },

    /// 金额无法转换为最小单位
    #[error("Invalid amount: {0}")]
    InvalidAmount(String),

    /// 支付协议发票获取失败（不自动重试）
    #[error("Could not fetch invoice from {url}: {reason}")]
    InvoiceFetchError { url: String, reason: String },

    /// 发票获取成功，但没有可用的支付选项
    #[error("No payment options available for {url}")]
    NoPaymentOptionsAvailable { url: String },

    /// 币种未在注册表中登记
    #[error("Unsupported coin: {0}")]
    UnsupportedCoin(String),
}

pub type Result<T> = std::result::Result<T, IncomingDataError>;

impl IncomingDataError {
    pub fn malformed_address(input: impl Into<String>) -> Self {
        Self::MalformedAddress {
            input: input.into(),
        }
    }

    pub fn malformed_uri(reason: impl Into<String>) -> Self {
        Self::MalformedUri {
            reason: reason.into(),
        }
    }

    pub fn invoice_fetch(url: impl Into<String>, reason: impl ToString) -> Self {
        Self::InvoiceFetchError {
            url: url.into(),
            reason: reason.to_string(),
        }
    }

    pub fn no_payment_options(url: impl Into<String>) -> Self {
        Self::NoPaymentOptionsAvailable { url: url.into() }
    }

    /// 稳定的错误码（用于错误事件，供调用方做本地化映射）
    pub fn code(&self) -> &'static str {
        match self {
            Self::MalformedAddress { .. } => "malformed_address",
            Self::MalformedUri { .. } => "malformed_uri",
            Self::InvalidAmount(_) => "invalid_amount",
            Self::InvoiceFetchError { .. } => "invoice_fetch_error",
            Self::NoPaymentOptionsAvailable { .. } => "no_payment_options_available",
            Self::UnsupportedCoin(_) => "unsupported_coin",
        }
    }

    /// 是否由远端发票服务引起
    pub fn is_remote(&self) -> bool {
        matches!(
            self,
            Self::InvoiceFetchError { .. } | Self::NoPaymentOptionsAvailable { .. }
        )
    }

    /// 转换为可序列化的错误事件负载
    pub fn to_body(&self) -> ErrorBody {
        ErrorBody {
            code: self.code(),
            message: self.to_string(),
        }
    }
}

/// 错误事件负载
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrorBody {
    pub code: &'static str,
    pub message: String,
}

impl From<rust_decimal::Error> for IncomingDataError {
    fn from(err: rust_decimal::Error) -> Self {
        Self::InvalidAmount(err.to_string())
    }
}

impl From<crate::domain::coin::UnknownCoin> for IncomingDataError {
    fn from(err: crate::domain::coin::UnknownCoin) -> Self {
        Self::UnsupportedCoin(err.0)
    }
}

/// 便于日志输出的币种标签
pub(crate) fn coin_label(coin: Option<Coin>) -> &'static str {
    coin.map(|c| c.code()).unwrap_or("-")
}
