//! BitPay JSON Payment Protocol v2 客户端
//!
//! 两个请求都是对发票 URL 的 `POST`：
//! - `application/payment-options`：列出发票支持的币种
//! - `application/payment-request`：获取指定币种的支付指令

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::{
    config::PayProConfig,
    domain::{Coin, PayProDetails, PayProOptions, PaymentInstruction},
    error::{IncomingDataError, Result},
    service::paypro::InvoiceTransport,
};

const PAYPRO_VERSION: &str = "2";
const PAYMENT_OPTIONS: &str = "application/payment-options";
const PAYMENT_REQUEST: &str = "application/payment-request";

/// payment-request 请求体
#[derive(Debug, Serialize)]
struct PaymentRequestBody<'a> {
    chain: &'a str,
    currency: &'a str,
}

/// payment-request 响应中的输出
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct JppOutput {
    #[serde(default)]
    amount: Option<u128>,
    address: String,
}

/// payment-request 响应中的指令（UTXO 用 outputs，EVM 用 toAddress/value）
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct JppInstruction {
    #[serde(default)]
    outputs: Vec<JppOutput>,
    #[serde(default)]
    to_address: Option<String>,
    #[serde(default)]
    value: Option<u128>,
    #[serde(default)]
    data: Option<String>,
    #[serde(default)]
    required_fee_rate: Option<f64>,
    #[serde(default)]
    gas_price: Option<f64>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct JppPaymentRequest {
    #[serde(default)]
    memo: Option<String>,
    #[serde(default)]
    network: Option<String>,
    #[serde(default)]
    instructions: Vec<JppInstruction>,
}

impl JppPaymentRequest {
    fn into_details(self) -> PayProDetails {
        let required_fee_rate = self
            .instructions
            .first()
            .and_then(|i| i.required_fee_rate.or(i.gas_price));
        let instructions = self
            .instructions
            .into_iter()
            .filter_map(|i| {
                let first = i.outputs.into_iter().next();
                let amount = i.value.or_else(|| first.as_ref().and_then(|o| o.amount));
                let to_address = i.to_address.or_else(|| first.map(|o| o.address))?;
                Some(PaymentInstruction {
                    to_address,
                    amount,
                    data: i.data,
                })
            })
            .collect();
        PayProDetails {
            payment_options: vec![],
            instructions,
            memo: self.memo,
            network: self.network,
            required_fee_rate,
        }
    }
}

/// 基于 reqwest 的发票传输层
pub struct HttpInvoiceTransport {
    client: reqwest::Client,
}

impl HttpInvoiceTransport {
    pub fn new(config: &PayProConfig) -> anyhow::Result<Self> {
        use anyhow::Context;

        Ok(Self {
            client: reqwest::Client::builder()
                .timeout(Duration::from_secs(config.request_timeout_secs))
                .user_agent(config.user_agent.clone())
                .build()
                .context("Failed to create HTTP client")?,
        })
    }

    async fn post(
        &self,
        url: &str,
        content_type: &str,
        body: serde_json::Value,
    ) -> Result<reqwest::Response> {
        let body = serde_json::to_vec(&body).map_err(|e| IncomingDataError::invoice_fetch(url, e))?;
        let response = self
            .client
            .post(url)
            .header(reqwest::header::ACCEPT, "application/json")
            .header(reqwest::header::CONTENT_TYPE, content_type)
            .header("x-paypro-version", PAYPRO_VERSION)
            .body(body)
            .send()
            .await
            .map_err(|e| IncomingDataError::invoice_fetch(url, e))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            tracing::error!(url = %url, status = %status, "Payment protocol request failed: {}", error_text);
            return Err(IncomingDataError::invoice_fetch(
                url,
                format!("HTTP {}", status.as_u16()),
            ));
        }
        Ok(response)
    }
}

#[async_trait]
impl InvoiceTransport for HttpInvoiceTransport {
    async fn fetch_options(&self, url: &str) -> Result<PayProOptions> {
        self.post(url, PAYMENT_OPTIONS, serde_json::json!({}))
            .await?
            .json::<PayProOptions>()
            .await
            .map_err(|e| IncomingDataError::invoice_fetch(url, e))
    }

    async fn fetch_details(&self, url: &str, coin: Coin) -> Result<PayProDetails> {
        let currency = coin.code().to_uppercase();
        let chain = coin.chain().code().to_uppercase();
        let body = serde_json::to_value(PaymentRequestBody {
            chain: &chain,
            currency: &currency,
        })
        .map_err(|e| IncomingDataError::invoice_fetch(url, e))?;

        let request = self
            .post(url, PAYMENT_REQUEST, body)
            .await?
            .json::<JppPaymentRequest>()
            .await
            .map_err(|e| IncomingDataError::invoice_fetch(url, e))?;
        Ok(request.into_details())
    }
}
