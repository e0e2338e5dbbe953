//! 输入分类器
//!
//! 规则表按固定优先级逐条求值，第一条命中的规则决定分类结果。
//! 所有谓词都是全函数：任何解析/构造失败都视为不匹配。

use std::sync::LazyLock;

use regex::Regex;

use super::{
    extractor::{first_param, split_bitpay_uri},
    sanitizer::sanitize,
};
use crate::{
    chain::{
        bitcoin::is_livenet_wif, bitcoin_cash::legacy_uri_to_cashaddr, codec_for,
        payment_uri_scheme_pattern,
    },
    domain::{ClassificationKind, Coin, Description, ServiceKind},
};

static INVOICE_URL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^https://(www.)?(test.)?bitpay.com/i/[A-Za-z0-9_]+").unwrap()
});

static PAYMENT_PROTOCOL_URI: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(
        r"^({})?:\?r=[A-Za-z0-9_+]",
        payment_uri_scheme_pattern()
    ))
    .unwrap()
});

static PLAIN_URL: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^https?://").unwrap());

static JOIN_CODE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^copay:[0-9A-HJ-NP-Za-km-z]{70,80}$").unwrap());

static JOIN_CODE_LEGACY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9A-HJ-NP-Za-km-z]{70,80}$").unwrap());

static WIF_KEY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[5KL][1-9A-HJ-NP-Za-km-z]{50,51}$").unwrap());

/// 分类上下文
#[derive(Debug, Clone)]
pub struct ClassifierContext {
    /// 应用协议名（`<app>://coinbase`）
    pub app_name: String,
}

impl ClassifierContext {
    pub fn new(app_name: impl Into<String>) -> Self {
        Self {
            app_name: app_name.into(),
        }
    }
}

impl Default for ClassifierContext {
    fn default() -> Self {
        Self::new("copay")
    }
}

pub type Predicate = fn(&ClassifierContext, &str) -> bool;

/// 分类规则
pub struct ClassificationRule {
    pub name: &'static str,
    pub kind: ClassificationKind,
    pub predicate: Predicate,
}

fn is_invoice_url(_: &ClassifierContext, data: &str) -> bool {
    INVOICE_URL.is_match(data)
}

fn is_payment_protocol_uri(_: &ClassifierContext, data: &str) -> bool {
    PAYMENT_PROTOCOL_URI.is_match(data)
}

fn is_bitcoin_uri(_: &ClassifierContext, data: &str) -> bool {
    codec_for(Coin::Btc).is_valid_uri(data)
}

fn is_bitcoin_cash_uri(_: &ClassifierContext, data: &str) -> bool {
    codec_for(Coin::Bch).is_valid_uri(data)
}

fn is_ethereum_uri(_: &ClassifierContext, data: &str) -> bool {
    codec_for(Coin::Eth).is_valid_uri(data)
}

fn is_bitcoin_cash_legacy_uri(_: &ClassifierContext, data: &str) -> bool {
    legacy_uri_to_cashaddr(data).is_ok()
}

fn is_plain_url(ctx: &ClassifierContext, data: &str) -> bool {
    !is_invoice_url(ctx, data) && PLAIN_URL.is_match(data)
}

fn is_bitcoin_address(_: &ClassifierContext, data: &str) -> bool {
    codec_for(Coin::Btc).is_valid_address_any(data)
}

fn is_bitcoin_cash_address(_: &ClassifierContext, data: &str) -> bool {
    codec_for(Coin::Bch).is_valid_address_any(data)
}

fn is_ethereum_address(_: &ClassifierContext, data: &str) -> bool {
    codec_for(Coin::Eth).is_valid_address_any(data)
}

fn is_coinbase_uri(ctx: &ClassifierContext, data: &str) -> bool {
    data.starts_with(&format!("{}://coinbase", ctx.app_name))
}

fn is_shapeshift_uri(ctx: &ClassifierContext, data: &str) -> bool {
    data.starts_with(&format!("{}://shapeshift", ctx.app_name))
}

fn is_bitpay_card_uri(_: &ClassifierContext, data: &str) -> bool {
    data.starts_with("bitpay://bitpay")
}

fn is_bitpay_uri(_: &ClassifierContext, data: &str) -> bool {
    split_bitpay_uri(data)
        .map(|(_, params)| first_param(&params, "coin").is_some_and(|coin| !coin.is_empty()))
        .unwrap_or(false)
}

fn is_join_code(_: &ClassifierContext, data: &str) -> bool {
    JOIN_CODE.is_match(data)
}

fn is_join_code_legacy(_: &ClassifierContext, data: &str) -> bool {
    JOIN_CODE_LEGACY.is_match(data)
}

/// BIP38 加密私钥，或可构造为主网 WIF 的私钥
fn is_private_key(_: &ClassifierContext, data: &str) -> bool {
    data.starts_with("6P") || (WIF_KEY.is_match(data) && is_livenet_wif(data))
}

fn is_import_private_key(_: &ClassifierContext, data: &str) -> bool {
    ["1|", "2|", "3|"].iter().any(|prefix| data.starts_with(prefix))
}

/// 按优先级排列的规则表
pub static RULES: &[ClassificationRule] = &[
    ClassificationRule {
        name: "invoice_url",
        kind: ClassificationKind::InvoiceUrl,
        predicate: is_invoice_url,
    },
    ClassificationRule {
        name: "payment_protocol_uri",
        kind: ClassificationKind::PaymentProtocolUri,
        predicate: is_payment_protocol_uri,
    },
    ClassificationRule {
        name: "bitcoin_uri",
        kind: ClassificationKind::ChainUri(Coin::Btc),
        predicate: is_bitcoin_uri,
    },
    ClassificationRule {
        name: "bitcoin_cash_uri",
        kind: ClassificationKind::ChainUri(Coin::Bch),
        predicate: is_bitcoin_cash_uri,
    },
    ClassificationRule {
        name: "ethereum_uri",
        kind: ClassificationKind::ChainUri(Coin::Eth),
        predicate: is_ethereum_uri,
    },
    ClassificationRule {
        name: "bitcoin_cash_legacy_uri",
        kind: ClassificationKind::ChainUriLegacyAddress(Coin::Bch),
        predicate: is_bitcoin_cash_legacy_uri,
    },
    ClassificationRule {
        name: "plain_url",
        kind: ClassificationKind::PlainUrl,
        predicate: is_plain_url,
    },
    ClassificationRule {
        name: "bitcoin_address",
        kind: ClassificationKind::ChainAddress(Coin::Btc),
        predicate: is_bitcoin_address,
    },
    ClassificationRule {
        name: "bitcoin_cash_address",
        kind: ClassificationKind::ChainAddress(Coin::Bch),
        predicate: is_bitcoin_cash_address,
    },
    ClassificationRule {
        name: "ethereum_address",
        kind: ClassificationKind::ChainAddress(Coin::Eth),
        predicate: is_ethereum_address,
    },
    ClassificationRule {
        name: "coinbase_uri",
        kind: ClassificationKind::ServiceUri(ServiceKind::Coinbase),
        predicate: is_coinbase_uri,
    },
    ClassificationRule {
        name: "shapeshift_uri",
        kind: ClassificationKind::ServiceUri(ServiceKind::ShapeShift),
        predicate: is_shapeshift_uri,
    },
    ClassificationRule {
        name: "bitpay_card_uri",
        kind: ClassificationKind::ServiceUri(ServiceKind::BitPayCard),
        predicate: is_bitpay_card_uri,
    },
    ClassificationRule {
        name: "bitpay_uri",
        kind: ClassificationKind::ServiceUri(ServiceKind::BitPayUri),
        predicate: is_bitpay_uri,
    },
    ClassificationRule {
        name: "join_code",
        kind: ClassificationKind::JoinCode,
        predicate: is_join_code,
    },
    ClassificationRule {
        name: "join_code_legacy",
        kind: ClassificationKind::JoinCodeLegacy,
        predicate: is_join_code_legacy,
    },
    ClassificationRule {
        name: "private_key",
        kind: ClassificationKind::PrivateKey,
        predicate: is_private_key,
    },
    ClassificationRule {
        name: "import_private_key",
        kind: ClassificationKind::ImportPrivateKey,
        predicate: is_import_private_key,
    },
];

/// 对已规范化的数据求值规则表
pub fn classify_sanitized(ctx: &ClassifierContext, data: &str) -> ClassificationKind {
    if data.is_empty() {
        return ClassificationKind::Unrecognized;
    }
    RULES
        .iter()
        .find(|rule| (rule.predicate)(ctx, data))
        .map(|rule| rule.kind)
        .unwrap_or(ClassificationKind::Unrecognized)
}

/// 分类原始输入
pub fn classify(ctx: &ClassifierContext, raw: &str) -> ClassificationKind {
    classify_sanitized(ctx, &sanitize(raw))
}

/// 展示用分类结果；无法识别时返回 None
pub fn describe(ctx: &ClassifierContext, raw: &str) -> Option<Description> {
    let kind = classify(ctx, raw);
    kind.is_recognized().then(|| Description {
        data: raw.to_string(),
        kind,
        title: kind.title(),
    })
}
