//! 导航意图、菜单请求与重定向上下文

use std::{
    collections::BTreeMap,
    fmt,
    sync::{Arc, Weak},
};

use serde::{Deserialize, Serialize, Serializer};
use serde_json::Value;
use zeroize::Zeroizing;

use super::Coin;
use crate::error::IncomingDataError;

/// 导航目的地（封闭集合）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Destination {
    ConfirmPage,
    AmountPage,
    SelectInvoicePage,
    JoinWalletPage,
    AddWalletPage,
    ImportWalletPage,
    PaperWalletPage,
    CoinbasePage,
    ShapeshiftPage,
    BitPayCardIntroPage,
}

impl Destination {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ConfirmPage => "ConfirmPage",
            Self::AmountPage => "AmountPage",
            Self::SelectInvoicePage => "SelectInvoicePage",
            Self::JoinWalletPage => "JoinWalletPage",
            Self::AddWalletPage => "AddWalletPage",
            Self::ImportWalletPage => "ImportWalletPage",
            Self::PaperWalletPage => "PaperWalletPage",
            Self::CoinbasePage => "CoinbasePage",
            Self::ShapeshiftPage => "ShapeshiftPage",
            Self::BitPayCardIntroPage => "BitPayCardIntroPage",
        }
    }
}

impl fmt::Display for Destination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 导航意图：目的地 + 参数；产生后不可变
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NavigationIntent {
    pub name: Destination,
    pub params: BTreeMap<String, Value>,
}

impl NavigationIntent {
    pub fn new(name: Destination) -> Self {
        Self {
            name,
            params: BTreeMap::new(),
        }
    }

    /// 添加参数
    pub fn with(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.params.insert(key.to_string(), value.into());
        self
    }

    /// 值为 None 时写入 null，与缺省字段区分
    pub fn with_opt<T: Into<Value>>(self, key: &str, value: Option<T>) -> Self {
        match value {
            Some(v) => self.with(key, v),
            None => self.with(key, Value::Null),
        }
    }

    /// 仅当有值时添加
    pub fn with_some<T: Into<Value>>(self, key: &str, value: Option<T>) -> Self {
        match value {
            Some(v) => self.with(key, v),
            None => self,
        }
    }

    pub fn param(&self, key: &str) -> Option<&Value> {
        self.params.get(key)
    }

    pub fn param_str(&self, key: &str) -> Option<&str> {
        self.params.get(key).and_then(Value::as_str)
    }
}

/// 菜单类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum MenuKind {
    Url,
    BitcoinAddress,
    EthereumAddress,
    PrivateKey,
    Text,
}

/// 请求调用方展示消歧菜单
///
/// 私钥菜单的 `data` 就是私钥本身，drop 时清零。
#[derive(Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MenuRequest {
    #[serde(serialize_with = "serialize_secret")]
    pub data: Zeroizing<String>,
    #[serde(rename = "type")]
    pub kind: MenuKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub coin: Option<Coin>,
    pub from_home_card: bool,
}

impl MenuRequest {
    pub fn new(data: impl Into<String>, kind: MenuKind) -> Self {
        Self {
            data: Zeroizing::new(data.into()),
            kind,
            coin: None,
            from_home_card: false,
        }
    }

    pub fn with_coin(mut self, coin: Coin) -> Self {
        self.coin = Some(coin);
        self
    }

    pub fn from_home_card(mut self, from_home_card: bool) -> Self {
        self.from_home_card = from_home_card;
        self
    }
}

fn serialize_secret<S: Serializer>(
    data: &Zeroizing<String>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(data)
}

impl fmt::Debug for MenuRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let data: &str = if self.kind == MenuKind::PrivateKey {
            "<redacted>"
        } else {
            self.data.as_str()
        };
        f.debug_struct("MenuRequest")
            .field("data", &data)
            .field("kind", &self.kind)
            .field("coin", &self.coin)
            .field("from_home_card", &self.from_home_card)
            .finish()
    }
}

/// 菜单关闭后用户的选择
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MenuSelection {
    pub redir_to: Option<String>,
    pub value: Option<String>,
    pub coin: Option<Coin>,
}

/// 输入来源页面
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ActivePage {
    /// 扫码页面（交互式）
    ScanPage,
    Other,
}

/// 调用方持有的来源令牌；drop 后未完成的解析结果将被丢弃
#[derive(Debug, Default)]
pub struct OriginToken(Arc<()>);

impl OriginToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn handle(&self) -> OriginHandle {
        OriginHandle(Arc::downgrade(&self.0))
    }
}

/// 来源令牌的弱引用
#[derive(Debug, Clone)]
pub struct OriginHandle(Weak<()>);

impl OriginHandle {
    pub fn is_alive(&self) -> bool {
        self.0.strong_count() > 0
    }
}

/// 调用方提供的重定向上下文
#[derive(Debug, Clone, Default)]
pub struct RedirectContext {
    pub active_page: Option<ActivePage>,
    /// 预设金额（最小单位）
    pub amount: Option<String>,
    pub coin: Option<Coin>,
    pub from_home_card: bool,
    pub origin: Option<OriginHandle>,
}

impl RedirectContext {
    /// 扫码页面上下文
    pub fn scan() -> Self {
        Self {
            active_page: Some(ActivePage::ScanPage),
            ..Default::default()
        }
    }

    /// 带预设金额的上下文
    pub fn with_amount(amount: impl Into<String>) -> Self {
        Self {
            amount: Some(amount.into()),
            ..Default::default()
        }
    }

    pub fn origin(mut self, handle: OriginHandle) -> Self {
        self.origin = Some(handle);
        self
    }

    pub fn is_scanning(&self) -> bool {
        self.active_page == Some(ActivePage::ScanPage)
    }

    /// 非空的预设金额
    pub fn preset_amount(&self) -> Option<&str> {
        self.amount.as_deref().filter(|a| !a.is_empty())
    }

    /// 来源是否仍然存在（未设置来源视为存在）
    pub fn is_origin_alive(&self) -> bool {
        self.origin.as_ref().map(OriginHandle::is_alive).unwrap_or(true)
    }
}

/// 单个输入的最终结果（至多一个）
#[derive(Debug, Clone, PartialEq)]
pub enum RouteOutcome {
    Navigate(NavigationIntent),
    Menu(MenuRequest),
    Error(IncomingDataError),
    /// 已识别但不产生事件（如功能被禁用）
    Skipped { reason: String },
    Unrecognized,
}

impl RouteOutcome {
    /// 输入是否被识别（用于入口的布尔返回值）
    pub fn is_recognized(&self) -> bool {
        !matches!(self, Self::Unrecognized)
    }

    pub fn intent(&self) -> Option<&NavigationIntent> {
        match self {
            Self::Navigate(intent) => Some(intent),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_intent_builder_helpers() {
        let intent = NavigationIntent::new(Destination::AmountPage)
            .with("toAddress", "1A1zP1eP5QGefi2DMPTfTL5SLmv7DivfNa")
            .with_opt::<String>("description", None)
            .with_some::<String>("requiredFeeRate", None);
        assert_eq!(
            intent.param_str("toAddress"),
            Some("1A1zP1eP5QGefi2DMPTfTL5SLmv7DivfNa")
        );
        assert_eq!(intent.param("description"), Some(&Value::Null));
        assert!(intent.param("requiredFeeRate").is_none());
    }

    #[test]
    fn test_origin_token_lifecycle() {
        let token = OriginToken::new();
        let ctx = RedirectContext::default().origin(token.handle());
        assert!(ctx.is_origin_alive());
        drop(token);
        assert!(!ctx.is_origin_alive());
        assert!(RedirectContext::default().is_origin_alive());
    }

    #[test]
    fn test_preset_amount_ignores_empty() {
        assert_eq!(RedirectContext::with_amount("").preset_amount(), None);
        assert_eq!(RedirectContext::with_amount("1500").preset_amount(), Some("1500"));
    }

    #[test]
    fn test_menu_request_serialization() {
        let menu = MenuRequest::new("1A1zP1eP5QGefi2DMPTfTL5SLmv7DivfNa", MenuKind::BitcoinAddress)
            .with_coin(Coin::Btc);
        let json = serde_json::to_value(&menu).unwrap();
        assert_eq!(json["type"], "bitcoinAddress");
        assert_eq!(json["coin"], "btc");
        assert_eq!(json["fromHomeCard"], false);
        assert_eq!(json["data"], "1A1zP1eP5QGefi2DMPTfTL5SLmv7DivfNa");
    }

    #[test]
    fn test_private_key_menu_debug_redacted() {
        let wif = "5HueCGU8rMjxEXxiPuD5BDku4MkFqeZyd4dZ1jvhTVqvbTLvyTJ";
        let menu = MenuRequest::new(wif, MenuKind::PrivateKey);
        assert_eq!(menu.data.as_str(), wif);
        assert!(!format!("{:?}", menu).contains(wif));

        let text = MenuRequest::new("hello", MenuKind::Text);
        assert!(format!("{:?}", text).contains("hello"));
    }
}
