//! 结构化数据提取
//!
//! 输入已经分类；这里只负责从数据中取出地址、金额、备注、费率与服务参数。
//! 金额在此换算为最小单位，下游不再换算。

use std::{str::FromStr, sync::LazyLock};

use regex::Regex;
use tracing::warn;

use crate::{
    chain::{
        bitcoin_cash::legacy_uri_to_cashaddr, codec_for, payment_uri_scheme_pattern, ParsedUri,
    },
    domain::{
        ClassificationKind, Coin, KeyMaterial, ParsedPaymentRequest, ServiceKind, ServiceParams,
    },
    error::{IncomingDataError, Result},
    utils::{
        amount::to_smallest_unit,
        query::{decode_uri_component, get_parameter_by_name, parse_query},
    },
};

static SCHEME: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)^[a-z]+:").unwrap());

static TRAILING_PARAMS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)([\?\&]+[a-z]+=([0-9]+([\,\.][0-9]+)?))+").unwrap()
});

static PAYPRO_MARKER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(r"({})?:\?r=", payment_uri_scheme_pattern())).unwrap()
});

/// 提取结果
#[derive(Debug, Clone, PartialEq)]
pub enum ExtractedData {
    /// 链上支付请求
    Payment(ParsedPaymentRequest),
    /// 需要远端解析的支付协议请求
    PaymentProtocol { url: String, coin: Option<Coin> },
    /// 裸地址
    Address { address: String, coin: Coin },
    Service(ServiceParams),
    PrivateKey(KeyMaterial),
    /// 原样数据
    Raw(String),
}

/// 去掉协议名与查询串，得到地址部分
pub fn extract_address(data: &str) -> String {
    let without_scheme = SCHEME.replace(data, "");
    let address = without_scheme.split('?').next().unwrap_or_default();
    TRAILING_PARAMS.replace(address, "").into_owned()
}

/// 支付协议 URI 中的发票 URL
pub fn payment_protocol_url(data: &str) -> String {
    decode_uri_component(&PAYPRO_MARKER.replace(data, ""))
}

/// `bitpay:<address>?coin=...` 拆分为地址与参数
pub fn split_bitpay_uri(data: &str) -> Option<(String, Vec<(String, String)>)> {
    if !data.starts_with("bitpay:") {
        return None;
    }
    let address = extract_address(data);
    if address.is_empty() {
        return None;
    }
    let rest = data.replacen(&format!("bitpay:{}", address), "", 1);
    let query = rest.strip_prefix('?').unwrap_or(&rest);
    Some((address, parse_query(query)))
}

/// 取第一个同名参数
pub fn first_param<'a>(params: &'a [(String, String)], name: &str) -> Option<&'a str> {
    params
        .iter()
        .find(|(key, _)| key == name)
        .map(|(_, value)| value.as_str())
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.is_empty())
}

fn from_chain_uri(parsed: ParsedUri, coin: Coin, data: &str) -> Result<ExtractedData> {
    if let Some(url) = parsed.payment_url {
        return Ok(ExtractedData::PaymentProtocol {
            url,
            coin: Some(coin),
        });
    }
    let address = parsed
        .address
        .filter(|a| !a.is_empty())
        .ok_or_else(|| IncomingDataError::malformed_address(data))?;
    Ok(ExtractedData::Payment(ParsedPaymentRequest {
        address,
        amount: parsed.amount,
        message: parsed.message,
        coin,
        required_fee_rate: parsed.gas_price,
    }))
}

fn extract_bitpay_uri(data: &str) -> Result<ExtractedData> {
    let (address, params) =
        split_bitpay_uri(data).ok_or_else(|| IncomingDataError::malformed_address(data))?;
    let ticker = non_empty(first_param(&params, "coin"))
        .ok_or_else(|| IncomingDataError::malformed_uri("missing coin parameter"))?;
    let coin = Coin::from_str(ticker)?;
    let amount = non_empty(first_param(&params, "amount"))
        .map(|amount| to_smallest_unit(amount, coin))
        .transpose()?;
    let required_fee_rate = non_empty(first_param(&params, "gasPrice")).map(str::to_string);
    Ok(ExtractedData::Payment(ParsedPaymentRequest {
        address,
        amount,
        message: first_param(&params, "message").map(str::to_string),
        coin,
        required_fee_rate,
    }))
}

fn extract_service(data: &str, service: ServiceKind) -> Result<ExtractedData> {
    let params = match service {
        ServiceKind::Coinbase => ServiceParams::Coinbase {
            code: get_parameter_by_name("code", data),
        },
        ServiceKind::ShapeShift => ServiceParams::ShapeShift {
            code: get_parameter_by_name("code", data),
        },
        ServiceKind::BitPayCard => ServiceParams::BitPayCard {
            secret: get_parameter_by_name("secret", data),
            email: get_parameter_by_name("email", data),
            otp: get_parameter_by_name("otp", data),
            reason: get_parameter_by_name("r", data),
        },
        ServiceKind::BitPayUri => return extract_bitpay_uri(data),
    };
    Ok(ExtractedData::Service(params))
}

/// 按分类结果提取结构化数据
pub fn extract(data: &str, kind: ClassificationKind) -> Result<ExtractedData> {
    match kind {
        ClassificationKind::InvoiceUrl => Ok(ExtractedData::PaymentProtocol {
            url: data.to_string(),
            coin: None,
        }),
        ClassificationKind::PaymentProtocolUri => Ok(ExtractedData::PaymentProtocol {
            url: payment_protocol_url(data),
            coin: None,
        }),
        ClassificationKind::ChainUri(coin) => {
            let parsed = codec_for(coin).parse_uri(data)?;
            from_chain_uri(parsed, coin, data)
        }
        ClassificationKind::ChainUriLegacyAddress(coin) => {
            let parsed = legacy_uri_to_cashaddr(data)?;
            if let Some(address) = parsed.address.as_deref() {
                warn!(address = %address, "Legacy Bitcoin Address translated");
            }
            from_chain_uri(parsed, coin, data)
        }
        ClassificationKind::ChainAddress(coin) => Ok(ExtractedData::Address {
            address: data.to_string(),
            coin,
        }),
        ClassificationKind::ServiceUri(service) => extract_service(data, service),
        ClassificationKind::PrivateKey => Ok(ExtractedData::PrivateKey(KeyMaterial::new(data))),
        ClassificationKind::PlainUrl
        | ClassificationKind::JoinCode
        | ClassificationKind::JoinCodeLegacy
        | ClassificationKind::ImportPrivateKey
        | ClassificationKind::Unrecognized => Ok(ExtractedData::Raw(data.to_string())),
    }
}
