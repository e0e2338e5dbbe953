//! 导航意图构建
//!
//! 纯函数：分类结果 + 提取数据 (+ 支付协议解析结果) + 上下文 → 最终结果。
//! 不做 I/O，不发布事件。

use serde::Serialize;
use serde_json::Value;
use tracing::warn;

use super::{
    extractor::ExtractedData,
    paypro::{PayProResolution, ResolvedInvoice},
    wallets::{count_keys, WalletDirectory, WalletFilter},
};
use crate::{
    domain::{
        ClassificationKind, Coin, Destination, MenuKind, MenuRequest, MenuSelection,
        NavigationIntent, ParsedPaymentRequest, RedirectContext, RouteOutcome, ServiceKind,
        ServiceParams,
    },
    error::IncomingDataError,
};

/// 构建所需的上下文
pub struct BuildContext<'a> {
    pub redirect: &'a RedirectContext,
    pub wallets: &'a dyn WalletDirectory,
    /// `debitcard` 扩展是否启用
    pub debit_card_enabled: bool,
}

fn coin_value(coin: Coin) -> Value {
    Value::from(coin.code())
}

/// 发票数据转为意图参数；金额已按字符串序列化，失败说明发票内容无法处理
fn invoice_param<T: Serialize>(value: &T, url: &str) -> Result<Value, IncomingDataError> {
    serde_json::to_value(value).map_err(|e| IncomingDataError::invoice_fetch(url, e))
}

fn go_send(
    address: &str,
    amount: Option<String>,
    message: Option<String>,
    coin: Coin,
    required_fee_rate: Option<String>,
) -> RouteOutcome {
    let intent = match amount {
        Some(amount) => NavigationIntent::new(Destination::ConfirmPage)
            .with("amount", amount)
            .with("toAddress", address)
            .with_opt("description", message)
            .with("coin", coin_value(coin))
            .with_some("requiredFeeRate", required_fee_rate),
        None => NavigationIntent::new(Destination::AmountPage)
            .with("toAddress", address)
            .with_opt("description", message)
            .with("coin", coin_value(coin)),
    };
    RouteOutcome::Navigate(intent)
}

fn go_to_amount_page(address: &str, coin: Coin) -> RouteOutcome {
    RouteOutcome::Navigate(
        NavigationIntent::new(Destination::AmountPage)
            .with("toAddress", address)
            .with("coin", coin_value(coin)),
    )
}

/// 裸地址：预设金额优先，其次扫码菜单，最后进入金额页
fn address_flow(address: &str, coin: Coin, ctx: &BuildContext<'_>) -> RouteOutcome {
    if let Some(amount) = ctx.redirect.preset_amount() {
        return go_send(address, Some(amount.to_string()), None, coin, None);
    }
    if ctx.redirect.is_scanning() {
        let kind = if coin.chain() == Coin::Eth {
            MenuKind::EthereumAddress
        } else {
            MenuKind::BitcoinAddress
        };
        return RouteOutcome::Menu(MenuRequest::new(address, kind).with_coin(coin));
    }
    go_to_amount_page(address, coin)
}

fn payment_flow(
    kind: ClassificationKind,
    request: &ParsedPaymentRequest,
    ctx: &BuildContext<'_>,
) -> RouteOutcome {
    let parsed_amount = request.amount.map(|amount| amount.to_string());
    let preset = || ctx.redirect.preset_amount().map(str::to_string);
    match kind {
        ClassificationKind::ChainUri(Coin::Eth) => match parsed_amount.or_else(preset) {
            Some(amount) => go_send(
                &request.address,
                Some(amount),
                None,
                request.coin,
                request.required_fee_rate.clone(),
            ),
            None => address_flow(&request.address, request.coin, ctx),
        },
        ClassificationKind::ChainUri(_) => go_send(
            &request.address,
            parsed_amount.or_else(preset),
            request.message.clone(),
            request.coin,
            request.required_fee_rate.clone(),
        ),
        ClassificationKind::ServiceUri(ServiceKind::BitPayUri) if parsed_amount.is_none() => {
            go_to_amount_page(&request.address, request.coin)
        }
        _ => go_send(
            &request.address,
            parsed_amount,
            request.message.clone(),
            request.coin,
            request.required_fee_rate.clone(),
        ),
    }
}

fn join_flow(code: &str, ctx: &BuildContext<'_>) -> RouteOutcome {
    let wallets = ctx.wallets.list_wallets(&WalletFilter::for_join());
    let intent = match count_keys(&wallets) {
        0 => NavigationIntent::new(Destination::JoinWalletPage).with("url", code),
        1 => NavigationIntent::new(Destination::JoinWalletPage)
            .with_opt("keyId", wallets.first().and_then(|w| w.key_id.clone()))
            .with("url", code),
        _ => NavigationIntent::new(Destination::AddWalletPage)
            .with("url", code)
            .with("isJoin", true),
    };
    RouteOutcome::Navigate(intent)
}

fn service_flow(params: &ServiceParams, ctx: &BuildContext<'_>) -> RouteOutcome {
    match params {
        ServiceParams::Coinbase { code } => RouteOutcome::Navigate(
            NavigationIntent::new(Destination::CoinbasePage).with_opt("code", code.clone()),
        ),
        ServiceParams::ShapeShift { code } => RouteOutcome::Navigate(
            NavigationIntent::new(Destination::ShapeshiftPage).with_opt("code", code.clone()),
        ),
        ServiceParams::BitPayCard {
            secret, email, otp, ..
        } => {
            if !ctx.debit_card_enabled {
                warn!("BitPay Card has been disabled for this build");
                return RouteOutcome::Skipped {
                    reason: "debitcard extension disabled".to_string(),
                };
            }
            // 目前只有卡片绑定一种原因（r=0 或缺省）
            RouteOutcome::Navigate(
                NavigationIntent::new(Destination::BitPayCardIntroPage)
                    .with_opt("secret", secret.clone())
                    .with_opt("email", email.clone())
                    .with_opt("otp", otp.clone()),
            )
        }
    }
}

fn confirm_invoice(invoice: ResolvedInvoice) -> RouteOutcome {
    let instruction = match invoice.details.first_instruction() {
        Some(instruction) => instruction.clone(),
        None => {
            return RouteOutcome::Error(IncomingDataError::invoice_fetch(
                invoice.url,
                "payment request has no instructions",
            ))
        }
    };
    let paypro = match invoice_param(&invoice.details, &invoice.url) {
        Ok(paypro) => paypro,
        Err(e) => return RouteOutcome::Error(e),
    };
    RouteOutcome::Navigate(
        NavigationIntent::new(Destination::ConfirmPage)
            .with("amount", invoice.option.estimated_amount.to_string())
            .with("toAddress", instruction.to_address)
            .with_opt("description", invoice.details.memo.clone())
            .with_opt("data", instruction.data)
            .with("paypro", paypro)
            .with("coin", coin_value(invoice.coin))
            .with_opt("network", invoice.details.network.clone())
            .with("payProUrl", invoice.url)
            .with_some("requiredFeeRate", invoice.required_fee_rate),
    )
}

/// 支付协议解析结果 → 最终结果
pub fn from_resolution(resolution: PayProResolution) -> RouteOutcome {
    match resolution {
        PayProResolution::Resolved(invoice) => confirm_invoice(invoice),
        PayProResolution::SelectionRequired(options) => {
            let url = options.payment_url.clone().unwrap_or_default();
            match invoice_param(&options, &url) {
                Ok(options) => RouteOutcome::Navigate(
                    NavigationIntent::new(Destination::SelectInvoicePage)
                        .with("payProOptions", options),
                ),
                Err(e) => RouteOutcome::Error(e),
            }
        }
        PayProResolution::Failed(e) => RouteOutcome::Error(e),
    }
}

/// 构建最终结果
///
/// 支付协议请求必须带上解析结果，否则视为获取失败。
pub fn build(
    kind: ClassificationKind,
    data: &ExtractedData,
    resolution: Option<PayProResolution>,
    ctx: &BuildContext<'_>,
) -> RouteOutcome {
    match data {
        ExtractedData::PaymentProtocol { url, .. } => match resolution {
            Some(resolution) => from_resolution(resolution),
            None => RouteOutcome::Error(IncomingDataError::invoice_fetch(
                url.clone(),
                "payment request not resolved",
            )),
        },
        ExtractedData::Payment(request) => payment_flow(kind, request, ctx),
        ExtractedData::Address { address, coin } => address_flow(address, *coin, ctx),
        ExtractedData::Service(params) => service_flow(params, ctx),
        ExtractedData::PrivateKey(key) => RouteOutcome::Menu(
            MenuRequest::new(key.expose(), MenuKind::PrivateKey)
                .from_home_card(ctx.redirect.from_home_card),
        ),
        ExtractedData::Raw(raw) => match kind {
            ClassificationKind::PlainUrl => {
                RouteOutcome::Menu(MenuRequest::new(raw.as_str(), MenuKind::Url))
            }
            ClassificationKind::JoinCode | ClassificationKind::JoinCodeLegacy => {
                join_flow(raw, ctx)
            }
            ClassificationKind::ImportPrivateKey => RouteOutcome::Navigate(
                NavigationIntent::new(Destination::ImportWalletPage).with("code", raw.as_str()),
            ),
            _ => unrecognized(raw, ctx.redirect),
        },
    }
}

/// 无法识别：扫码场景展示文本菜单，否则不产生事件
pub fn unrecognized(raw: &str, redirect: &RedirectContext) -> RouteOutcome {
    if redirect.is_scanning() {
        RouteOutcome::Menu(MenuRequest::new(raw, MenuKind::Text))
    } else {
        RouteOutcome::Unrecognized
    }
}

/// 菜单关闭后的结果
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MenuFinished {
    pub redir_to: Option<String>,
    pub value: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub coin: Option<Coin>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum MenuCompletion {
    Navigate(NavigationIntent),
    Finished(MenuFinished),
}

/// 处理菜单选择
pub fn finish_menu(selection: Option<MenuSelection>) -> MenuCompletion {
    let MenuSelection {
        redir_to,
        value,
        coin,
    } = selection.unwrap_or(MenuSelection {
        redir_to: None,
        value: None,
        coin: None,
    });
    match redir_to.as_deref() {
        Some("AmountPage") => MenuCompletion::Finished(MenuFinished {
            redir_to,
            value,
            coin: Some(coin.unwrap_or(Coin::Btc)),
        }),
        Some("PaperWalletPage") => MenuCompletion::Navigate(
            NavigationIntent::new(Destination::PaperWalletPage).with_opt("privateKey", value),
        ),
        _ => MenuCompletion::Finished(MenuFinished {
            redir_to,
            value,
            coin: None,
        }),
    }
}
