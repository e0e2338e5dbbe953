//! 支付协议（PayPro）解析
//!
//! 远端获取发票的支付选项与详情，决定是直接确认支付，还是让用户选择币种。
//! 不重试，不缓存；超时由传输层负责。

use std::{str::FromStr, sync::Arc};

use async_trait::async_trait;
use tracing::{debug, error};

use crate::{
    domain::{Coin, CoinRegistry, PayProDetails, PayProOptions, PaymentOption},
    error::{IncomingDataError, Result},
};

/// 发票传输层
#[async_trait]
pub trait InvoiceTransport: Send + Sync {
    /// 获取发票支持的支付选项
    async fn fetch_options(&self, url: &str) -> Result<PayProOptions>;

    /// 获取指定币种的支付详情
    async fn fetch_details(&self, url: &str, coin: Coin) -> Result<PayProDetails>;
}

/// 解析结果
#[derive(Debug, Clone, PartialEq)]
pub enum PayProResolution {
    /// 币种已确定，可以直接确认
    Resolved(ResolvedInvoice),
    /// 需要用户选择币种
    SelectionRequired(PayProOptions),
    Failed(IncomingDataError),
}

/// 已确定币种的发票
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedInvoice {
    pub url: String,
    pub coin: Coin,
    pub details: PayProDetails,
    pub option: PaymentOption,
    /// 已按币种规则换算的费率
    pub required_fee_rate: Option<f64>,
}

/// 远端费率为每 KB，UTXO 币种换算为每字节整数：`ceil(rate × 1024)`
pub fn normalize_fee_rate(rate: f64, is_utxo: bool) -> f64 {
    if is_utxo {
        (rate * 1024.0).ceil()
    } else {
        rate
    }
}

/// 支付协议解析器
#[derive(Clone)]
pub struct PayProResolver {
    transport: Arc<dyn InvoiceTransport>,
    registry: Arc<dyn CoinRegistry>,
}

impl PayProResolver {
    pub fn new(transport: Arc<dyn InvoiceTransport>, registry: Arc<dyn CoinRegistry>) -> Self {
        Self {
            transport,
            registry,
        }
    }

    /// 解析发票；失败以 `Failed` 返回，不会 panic
    pub async fn resolve(&self, url: &str, coin: Option<Coin>) -> PayProResolution {
        let result = match coin {
            Some(coin) => self.resolve_for_coin(url, coin).await,
            None => self.resolve_options(url).await,
        };
        match result {
            Ok(resolution) => resolution,
            Err(e) => {
                error!(url = %url, code = e.code(), "Payment protocol resolution failed: {}", e);
                PayProResolution::Failed(e)
            }
        }
    }

    async fn resolve_options(&self, url: &str) -> Result<PayProResolution> {
        debug!(url = %url, "Handling bitpay invoice");
        let mut options = self.transport.fetch_options(url).await?;
        if options.payment_options.is_empty() {
            return Err(IncomingDataError::no_payment_options(url));
        }

        let selected: Vec<PaymentOption> = options.selected().into_iter().cloned().collect();
        match selected.len() {
            1 => {
                let coin = Coin::from_str(&selected[0].currency)?;
                self.resolve_for_coin(url, coin).await
            }
            0 => Ok(PayProResolution::SelectionRequired(options)),
            _ => {
                options.payment_options = selected;
                Ok(PayProResolution::SelectionRequired(options))
            }
        }
    }

    async fn resolve_for_coin(&self, url: &str, coin: Coin) -> Result<PayProResolution> {
        debug!(url = %url, coin = %coin, "Fetching payment request details");
        let details = self.transport.fetch_details(url, coin).await?;
        if details.first_instruction().is_none() {
            return Err(IncomingDataError::invoice_fetch(
                url,
                "payment request has no instructions",
            ));
        }

        let required_fee_rate = details
            .required_fee_rate
            .filter(|rate| *rate != 0.0)
            .map(|rate| normalize_fee_rate(rate, self.registry.is_utxo(coin)));

        let options = self.transport.fetch_options(url).await?;
        let option = options
            .payment_options
            .into_iter()
            .find(|option| option.matches(coin))
            .ok_or_else(|| IncomingDataError::no_payment_options(url))?;

        Ok(PayProResolution::Resolved(ResolvedInvoice {
            url: url.to_string(),
            coin,
            details,
            option,
            required_fee_rate,
        }))
    }
}
