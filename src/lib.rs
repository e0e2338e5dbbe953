//! incoming-data - 外部数据识别与路由
//!
//! 扫码、粘贴或深度链接得到的文本，识别为地址、支付 URI、发票、邀请码、
//! 私钥或服务链接，并转换为单一的导航意图事件。

pub mod chain;
pub mod config;
pub mod domain;
pub mod error;
pub mod infrastructure;
pub mod service;
pub mod utils;

// 重新导出常用类型
pub use error::{IncomingDataError, Result};
pub use service::IncomingDataRouter;

// 统一模块导出
pub mod prelude {
    pub use crate::{
        domain::{
            ClassificationKind, Coin, Destination, MenuSelection, NavigationIntent,
            RedirectContext, RouteOutcome,
        },
        error::IncomingDataError,
        infrastructure::notification::{
            BroadcastNotificationChannel, IncomingDataEvent, NotificationChannel,
        },
        service::{IncomingDataRouter, PayProResolver, WalletDirectory},
    };
}
