//! Domain 模块
//!
//! 币种注册表、分类结果、支付请求与导航意图等领域模型

pub mod classification;
pub mod coin;
pub mod intent;
pub mod payment;

// 重新导出常用类型
pub use classification::{ClassificationKind, Description, ServiceKind};
pub use coin::{Coin, CoinRegistry, Network, Precision, StaticCoinRegistry};
pub use intent::{
    ActivePage, Destination, MenuKind, MenuRequest, MenuSelection, NavigationIntent, OriginHandle,
    OriginToken, RedirectContext, RouteOutcome,
};
pub use payment::{
    Amount, KeyMaterial, ParsedPaymentRequest, PayProDetails, PayProOptions, PaymentInstruction,
    PaymentOption, ServiceParams,
};
