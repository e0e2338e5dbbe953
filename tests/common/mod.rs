//! 测试辅助模块
//! 提供 mock 传输层与路由器构造函数

#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use incoming_data::{
    config::AppConfig,
    domain::{Coin, PayProDetails, PayProOptions, PaymentInstruction, PaymentOption, StaticCoinRegistry},
    error::{IncomingDataError, Result},
    infrastructure::notification::{BroadcastNotificationChannel, EventEnvelope},
    service::{
        IncomingDataRouter, InvoiceTransport, PayProResolver, StaticWalletDirectory,
        WalletSummary,
    },
};
use tokio::sync::broadcast;

pub const BTC_ADDRESS: &str = "1A1zP1eP5QGefi2DMPTfTL5SLmv7DivfNa";
pub const ETH_ADDRESS: &str = "0x5aAeb6053F3E94C9b9A09f33669435E7Ef1BeAed";
pub const INVOICE_URL: &str = "https://bitpay.com/i/KSjQ2MovgTT4kN3EFcJdUH";

/// 可配置的发票传输层
pub struct MockTransport {
    pub options: Result<PayProOptions>,
    pub details: Result<PayProDetails>,
    pub calls: Mutex<Vec<String>>,
}

impl MockTransport {
    pub fn new(options: Result<PayProOptions>, details: Result<PayProDetails>) -> Self {
        Self {
            options,
            details,
            calls: Mutex::new(vec![]),
        }
    }

    pub fn unreachable() -> Self {
        Self::new(
            Err(IncomingDataError::invoice_fetch(INVOICE_URL, "connection refused")),
            Err(IncomingDataError::invoice_fetch(INVOICE_URL, "connection refused")),
        )
    }
}

#[async_trait]
impl InvoiceTransport for MockTransport {
    async fn fetch_options(&self, url: &str) -> Result<PayProOptions> {
        self.calls.lock().unwrap().push(format!("options {}", url));
        self.options.clone()
    }

    async fn fetch_details(&self, url: &str, coin: Coin) -> Result<PayProDetails> {
        self.calls
            .lock()
            .unwrap()
            .push(format!("details {} {}", url, coin));
        self.details.clone()
    }
}

pub fn payment_option(currency: &str, estimated_amount: u128, selected: bool) -> PaymentOption {
    PaymentOption {
        chain: Some(currency.to_string()),
        currency: currency.to_string(),
        network: Some("main".into()),
        estimated_amount,
        decimals: Some(8),
        required_fee_rate: None,
        selected,
    }
}

pub fn payment_options(options: Vec<PaymentOption>) -> PayProOptions {
    PayProOptions {
        payment_url: Some(INVOICE_URL.into()),
        memo: Some("Payment request for BitPay invoice KSjQ2MovgTT4kN3EFcJdUH".into()),
        payment_id: Some("KSjQ2MovgTT4kN3EFcJdUH".into()),
        payment_options: options,
    }
}

pub fn payment_details(to_address: &str, fee: Option<f64>) -> PayProDetails {
    PayProDetails {
        payment_options: vec![],
        instructions: vec![PaymentInstruction {
            to_address: to_address.to_string(),
            amount: Some(10_800),
            data: None,
        }],
        memo: Some("Payment request for BitPay invoice KSjQ2MovgTT4kN3EFcJdUH".into()),
        network: Some("main".into()),
        required_fee_rate: fee,
    }
}

pub fn wallet(id: &str, key_id: &str) -> WalletSummary {
    WalletSummary {
        wallet_id: id.to_string(),
        key_id: Some(key_id.to_string()),
        coin: Coin::Btc,
        hidden: false,
        can_add_account: true,
    }
}

/// 测试用路由器及其事件订阅
pub struct TestRouter {
    pub router: IncomingDataRouter,
    pub events: broadcast::Receiver<EventEnvelope>,
}

pub fn build_router(transport: MockTransport, wallets: Vec<WalletSummary>) -> TestRouter {
    build_router_with(transport, wallets, vec!["debitcard".into()])
}

pub fn build_router_with(
    transport: MockTransport,
    wallets: Vec<WalletSummary>,
    extensions: Vec<String>,
) -> TestRouter {
    let channel = BroadcastNotificationChannel::default();
    let events = channel.subscribe();
    let config = AppConfig {
        name: "copay".into(),
        enabled_extensions: extensions,
    };
    let router = IncomingDataRouter::new(
        &config,
        PayProResolver::new(Arc::new(transport), Arc::new(StaticCoinRegistry)),
        Arc::new(StaticWalletDirectory::new(wallets)),
        Arc::new(channel),
    );
    TestRouter { router, events }
}
