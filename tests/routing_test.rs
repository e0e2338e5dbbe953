//! 端到端路由测试
//!
//! 覆盖：
//! - 链 URI / 裸地址 / 支付协议 / 邀请码 / 私钥 / 服务链接
//! - 每个输入至多一个事件
//! - 菜单完成

mod common;

use std::time::Duration;

use common::*;
use incoming_data::{
    domain::{Coin, Destination, MenuKind, MenuSelection, RedirectContext, RouteOutcome},
    infrastructure::notification::IncomingDataEvent,
    service::MenuCompletion,
};
use serde_json::Value;
use tokio::time::timeout;

fn expect_redir(event: IncomingDataEvent) -> incoming_data::domain::NavigationIntent {
    match event {
        IncomingDataEvent::IncomingDataRedir(intent) => intent,
        other => panic!("expected redirect, got {:?}", other),
    }
}

#[tokio::test]
async fn test_bitcoin_uri_with_comma_amount() {
    let mut t = build_router(MockTransport::unreachable(), vec![]);

    let outcome = t
        .router
        .route(&format!("bitcoin:{}?amount=0,001", BTC_ADDRESS), None)
        .await;
    let intent = outcome.intent().cloned().unwrap();
    assert_eq!(intent.name, Destination::ConfirmPage);
    assert_eq!(intent.param_str("amount"), Some("100000"));
    assert_eq!(intent.param_str("toAddress"), Some(BTC_ADDRESS));
    assert_eq!(intent.param_str("coin"), Some("btc"));

    let published = expect_redir(t.events.recv().await.unwrap().event);
    assert_eq!(published, intent);
    assert!(t.events.try_recv().is_err());
}

#[tokio::test]
async fn test_bare_address_without_context() {
    let mut t = build_router(MockTransport::unreachable(), vec![]);

    assert!(t.router.classify_and_route(BTC_ADDRESS, None));
    let intent = expect_redir(t.events.recv().await.unwrap().event);
    assert_eq!(intent.name, Destination::AmountPage);
    assert_eq!(intent.param_str("toAddress"), Some(BTC_ADDRESS));
    assert_eq!(intent.param_str("coin"), Some("btc"));
}

#[tokio::test]
async fn test_bare_address_scan_and_preset_amount() {
    let mut t = build_router(MockTransport::unreachable(), vec![]);

    t.router
        .route(ETH_ADDRESS, Some(RedirectContext::scan()))
        .await;
    match t.events.recv().await.unwrap().event {
        IncomingDataEvent::IncomingDataMenu(menu) => {
            assert_eq!(menu.kind, MenuKind::EthereumAddress);
            assert_eq!(menu.coin, Some(Coin::Eth));
        }
        other => panic!("unexpected {:?}", other),
    }

    let mut ctx = RedirectContext::scan();
    ctx.amount = Some("150000".into());
    let outcome = t.router.route(BTC_ADDRESS, Some(ctx)).await;
    let intent = outcome.intent().unwrap();
    assert_eq!(intent.name, Destination::ConfirmPage);
    assert_eq!(intent.param_str("amount"), Some("150000"));
}

#[tokio::test]
async fn test_payment_protocol_with_two_selected_options() {
    let transport = MockTransport::new(
        Ok(payment_options(vec![
            payment_option("BTC", 10_800, true),
            payment_option("BCH", 520_000, true),
            payment_option("ETH", 3_000_000_000_000_000, false),
        ])),
        Ok(payment_details(BTC_ADDRESS, None)),
    );
    let mut t = build_router(transport, vec![]);

    assert!(t
        .router
        .classify_and_route("bitcoin:?r=https://merchant/i/abc", None));

    let envelope = timeout(Duration::from_secs(5), t.events.recv())
        .await
        .unwrap()
        .unwrap();
    let intent = expect_redir(envelope.event);
    assert_eq!(intent.name, Destination::SelectInvoicePage);
    let options = intent.param("payProOptions").unwrap();
    let currencies: Vec<&str> = options["paymentOptions"]
        .as_array()
        .unwrap()
        .iter()
        .filter_map(|o| o["currency"].as_str())
        .collect();
    assert_eq!(currencies, vec!["BTC", "BCH"]);
}

#[tokio::test]
async fn test_invoice_url_single_selected_confirms() {
    let transport = MockTransport::new(
        Ok(payment_options(vec![
            payment_option("BTC", 10_800, true),
            payment_option("BCH", 520_000, false),
        ])),
        Ok(payment_details(BTC_ADDRESS, Some(10.1))),
    );
    let t = build_router(transport, vec![]);

    let outcome = t.router.route(INVOICE_URL, None).await;
    let intent = outcome.intent().unwrap();
    assert_eq!(intent.name, Destination::ConfirmPage);
    assert_eq!(intent.param_str("amount"), Some("10800"));
    assert_eq!(intent.param_str("toAddress"), Some(BTC_ADDRESS));
    assert_eq!(intent.param_str("payProUrl"), Some(INVOICE_URL));
    assert_eq!(intent.param("requiredFeeRate"), Some(&Value::from(10343.0)));
}

#[tokio::test]
async fn test_invoice_fetch_failure_publishes_error() {
    let mut t = build_router(MockTransport::unreachable(), vec![]);

    let outcome = t.router.route(INVOICE_URL, None).await;
    assert!(matches!(outcome, RouteOutcome::Error(_)));
    match t.events.recv().await.unwrap().event {
        IncomingDataEvent::IncomingDataError(body) => assert_eq!(body.code, "invoice_fetch_error"),
        other => panic!("unexpected {:?}", other),
    }
}

#[tokio::test]
async fn test_join_code_routing() {
    let code = format!("copay:{}", &"RkUx9hVqg5".repeat(8)[..76]);

    let mut t = build_router(MockTransport::unreachable(), vec![]);
    assert!(t.router.classify_and_route(&code, None));
    let intent = expect_redir(t.events.recv().await.unwrap().event);
    assert_eq!(intent.name, Destination::JoinWalletPage);
    assert_eq!(intent.param_str("url"), Some(code.as_str()));

    let t = build_router(
        MockTransport::unreachable(),
        vec![wallet("w1", "k1"), wallet("w2", "k2")],
    );
    let outcome = t.router.route(&code, None).await;
    let intent = outcome.intent().unwrap();
    assert_eq!(intent.name, Destination::AddWalletPage);
    assert_eq!(intent.param("isJoin"), Some(&Value::Bool(true)));
}

#[tokio::test]
async fn test_unrecognized_without_scan() {
    let mut t = build_router(MockTransport::unreachable(), vec![]);

    assert!(!t.router.classify_and_route("just some words", None));
    assert!(t.events.try_recv().is_err());

    assert!(t
        .router
        .classify_and_route("just some words", Some(RedirectContext::scan())));
    match t.events.recv().await.unwrap().event {
        IncomingDataEvent::IncomingDataMenu(menu) => assert_eq!(menu.kind, MenuKind::Text),
        other => panic!("unexpected {:?}", other),
    }
}

#[tokio::test]
async fn test_ethereum_uri_with_value() {
    let t = build_router(MockTransport::unreachable(), vec![]);

    let outcome = t
        .router
        .route(
            &format!(
                "ethereum:{}?value=1000000000000000000&gasPrice=2000000000",
                ETH_ADDRESS
            ),
            None,
        )
        .await;
    let intent = outcome.intent().unwrap();
    assert_eq!(intent.name, Destination::ConfirmPage);
    assert_eq!(intent.param_str("amount"), Some("1000000000000000000"));
    assert_eq!(intent.param_str("coin"), Some("eth"));
    assert_eq!(intent.param_str("requiredFeeRate"), Some("2000000000"));
}

#[tokio::test]
async fn test_bitcoin_cash_legacy_uri_translated() {
    let t = build_router(MockTransport::unreachable(), vec![]);

    let outcome = t
        .router
        .route("bitcoincash:1BpEi6DfDAUFd7GtittLSdBeYJvcoaVggu?amount=0.5", None)
        .await;
    let intent = outcome.intent().unwrap();
    assert_eq!(intent.name, Destination::ConfirmPage);
    assert_eq!(
        intent.param_str("toAddress"),
        Some("bitcoincash:qpm2qsznhks23z7629mms6s4cwef74vcwvy22gdx6a")
    );
    assert_eq!(intent.param_str("amount"), Some("50000000"));
    assert_eq!(intent.param_str("coin"), Some("bch"));
}

#[tokio::test]
async fn test_private_key_menu() {
    let mut t = build_router(MockTransport::unreachable(), vec![]);

    let mut ctx = RedirectContext::scan();
    ctx.from_home_card = true;
    assert!(t.router.classify_and_route(
        "5HueCGU8rMjxEXxiPuD5BDku4MkFqeZyd4dZ1jvhTVqvbTLvyTJ",
        Some(ctx)
    ));
    match t.events.recv().await.unwrap().event {
        IncomingDataEvent::IncomingDataMenu(menu) => {
            assert_eq!(menu.kind, MenuKind::PrivateKey);
            assert!(menu.from_home_card);
        }
        other => panic!("unexpected {:?}", other),
    }
}

#[tokio::test]
async fn test_bitpay_card_respects_extension() {
    let uri = "bitpay://bitpay?secret=abc&email=me%40example.com&otp=123456";

    let mut enabled = build_router(MockTransport::unreachable(), vec![]);
    assert!(enabled.router.classify_and_route(uri, None));
    let intent = expect_redir(enabled.events.recv().await.unwrap().event);
    assert_eq!(intent.name, Destination::BitPayCardIntroPage);
    assert_eq!(intent.param_str("email"), Some("me@example.com"));

    let mut disabled = build_router_with(MockTransport::unreachable(), vec![], vec![]);
    assert!(disabled.router.classify_and_route(uri, None));
    assert!(disabled.events.try_recv().is_err());
}

#[tokio::test]
async fn test_service_deep_links() {
    let t = build_router(MockTransport::unreachable(), vec![]);

    let coinbase = t.router.route("copay://coinbase?code=c0d3", None).await;
    let intent = coinbase.intent().unwrap();
    assert_eq!(intent.name, Destination::CoinbasePage);
    assert_eq!(intent.param_str("code"), Some("c0d3"));

    let import = t.router.route("1|seed words here|null|null|false|null", None).await;
    let intent = import.intent().unwrap();
    assert_eq!(intent.name, Destination::ImportWalletPage);
    assert_eq!(
        intent.param_str("code"),
        Some("1|seed words here|null|null|false|null")
    );
}

#[tokio::test]
async fn test_finish_menu_events() {
    let mut t = build_router(MockTransport::unreachable(), vec![]);

    let completion = t.router.finish_menu(Some(MenuSelection {
        redir_to: Some("AmountPage".into()),
        value: Some(BTC_ADDRESS.into()),
        coin: None,
    }));
    assert!(matches!(completion, MenuCompletion::Finished(_)));
    match t.events.recv().await.unwrap().event {
        IncomingDataEvent::FinishIncomingDataMenu { redir_to, coin, .. } => {
            assert_eq!(redir_to.as_deref(), Some("AmountPage"));
            assert_eq!(coin, Some(Coin::Btc));
        }
        other => panic!("unexpected {:?}", other),
    }

    t.router.finish_menu(Some(MenuSelection {
        redir_to: Some("PaperWalletPage".into()),
        value: Some("6PYNKZ1EAgYgmQfmNVamxyXVWHzK5s6DGhwP4J5o44cvXdoY7sRzhtpUeo".into()),
        coin: None,
    }));
    let intent = expect_redir(t.events.recv().await.unwrap().event);
    assert_eq!(intent.name, Destination::PaperWalletPage);
}

#[test]
fn test_describe_has_no_side_effects() {
    let mut t = build_router(MockTransport::unreachable(), vec![]);

    let description = t.router.describe(INVOICE_URL).unwrap();
    assert_eq!(description.data, INVOICE_URL);
    assert!(t.router.describe("not a payment").is_none());
    assert!(t.events.try_recv().is_err());
}

#[tokio::test]
async fn test_extraction_failure_publishes_single_error() {
    let mut t = build_router(MockTransport::unreachable(), vec![]);

    let uri = format!("bitpay:{}?coin=doge&amount=1", ETH_ADDRESS);
    assert!(t.router.classify_and_route(&uri, None));
    match t.events.recv().await.unwrap().event {
        IncomingDataEvent::IncomingDataError(body) => assert_eq!(body.code, "unsupported_coin"),
        other => panic!("unexpected {:?}", other),
    }
    assert!(t.events.try_recv().is_err());
}

#[test]
fn test_payment_protocol_without_runtime_reports_error() {
    let mut t = build_router(MockTransport::unreachable(), vec![]);

    assert!(t.router.classify_and_route(INVOICE_URL, None));
    match t.events.try_recv().unwrap().event {
        IncomingDataEvent::IncomingDataError(body) => {
            assert_eq!(body.code, "invoice_fetch_error");
            assert!(body.message.contains(INVOICE_URL));
        }
        other => panic!("unexpected {:?}", other),
    }
    assert!(t.events.try_recv().is_err());
}

#[tokio::test]
async fn test_unrecognized_text_menu_keeps_raw_input() {
    let mut t = build_router(MockTransport::unreachable(), vec![]);

    let raw = "note?amount=1,5";
    assert!(!t.router.classify_and_route(raw, Some(RedirectContext::scan())));
    match t.events.recv().await.unwrap().event {
        IncomingDataEvent::IncomingDataMenu(menu) => {
            assert_eq!(menu.kind, MenuKind::Text);
            assert_eq!(menu.data.as_str(), raw);
        }
        other => panic!("unexpected {:?}", other),
    }
}
