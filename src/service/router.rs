//! 外部数据路由
//!
//! 入口：规范化 → 分类 → 提取 → (支付协议解析) → 构建意图 → 发布事件。
//! 每个输入至多发布一个事件；支付协议解析在独立任务中完成。

use std::sync::Arc;

use tracing::{debug, error, warn};

use super::{
    classifier::{self, ClassifierContext},
    extractor::{self, ExtractedData},
    intent_builder::{self, BuildContext, MenuCompletion},
    paypro::PayProResolver,
    sanitizer::sanitize,
    wallets::WalletDirectory,
};
use crate::{
    config::AppConfig,
    domain::{ClassificationKind, Coin, Description, MenuSelection, RedirectContext, RouteOutcome},
    error::{coin_label, IncomingDataError},
    infrastructure::{
        log_sanitizer::sanitize_log_message,
        notification::{IncomingDataEvent, NotificationChannel},
    },
};

/// 需要远端解析的输入
struct PendingResolution {
    kind: ClassificationKind,
    data: ExtractedData,
    url: String,
    coin: Option<Coin>,
}

enum Prepared {
    Ready(RouteOutcome),
    Pending(PendingResolution),
}

/// 外部数据路由器
#[derive(Clone)]
pub struct IncomingDataRouter {
    classifier: Arc<ClassifierContext>,
    resolver: PayProResolver,
    wallets: Arc<dyn WalletDirectory>,
    notifier: Arc<dyn NotificationChannel>,
    debit_card_enabled: bool,
}

impl IncomingDataRouter {
    pub fn new(
        config: &AppConfig,
        resolver: PayProResolver,
        wallets: Arc<dyn WalletDirectory>,
        notifier: Arc<dyn NotificationChannel>,
    ) -> Self {
        Self {
            classifier: Arc::new(ClassifierContext::new(config.name.clone())),
            resolver,
            wallets,
            notifier,
            debit_card_enabled: config.is_extension_enabled("debitcard"),
        }
    }

    /// 展示用分类，无副作用
    pub fn describe(&self, raw: &str) -> Option<Description> {
        classifier::describe(&self.classifier, raw)
    }

    /// 分类并路由；返回输入是否被识别
    ///
    /// 支付协议请求立即返回 `true`，解析结果稍后发布。
    pub fn classify_and_route(&self, raw: &str, ctx: Option<RedirectContext>) -> bool {
        let ctx = ctx.unwrap_or_default();
        match self.prepare(raw, &ctx) {
            Prepared::Ready(outcome) => {
                let recognized = outcome.is_recognized();
                self.emit(&outcome, &ctx);
                recognized
            }
            Prepared::Pending(pending) => {
                match tokio::runtime::Handle::try_current() {
                    Ok(handle) => {
                        let router = self.clone();
                        handle.spawn(async move {
                            let outcome = router.resolve_pending(pending, &ctx).await;
                            router.emit(&outcome, &ctx);
                        });
                    }
                    Err(e) => {
                        let outcome =
                            RouteOutcome::Error(IncomingDataError::invoice_fetch(pending.url, e));
                        self.emit(&outcome, &ctx);
                    }
                }
                true
            }
        }
    }

    /// 分类并路由，等待支付协议解析完成后返回最终结果
    pub async fn route(&self, raw: &str, ctx: Option<RedirectContext>) -> RouteOutcome {
        let ctx = ctx.unwrap_or_default();
        let outcome = match self.prepare(raw, &ctx) {
            Prepared::Ready(outcome) => outcome,
            Prepared::Pending(pending) => self.resolve_pending(pending, &ctx).await,
        };
        self.emit(&outcome, &ctx);
        outcome
    }

    /// 菜单关闭后的处理
    pub fn finish_menu(&self, selection: Option<MenuSelection>) -> MenuCompletion {
        let completion = intent_builder::finish_menu(selection);
        let event = match &completion {
            MenuCompletion::Navigate(intent) => IncomingDataEvent::IncomingDataRedir(intent.clone()),
            MenuCompletion::Finished(finished) => IncomingDataEvent::FinishIncomingDataMenu {
                redir_to: finished.redir_to.clone(),
                value: finished.value.clone(),
                coin: finished.coin,
            },
        };
        self.notifier.publish(event);
        completion
    }

    fn build_context<'a>(&'a self, ctx: &'a RedirectContext) -> BuildContext<'a> {
        BuildContext {
            redirect: ctx,
            wallets: self.wallets.as_ref(),
            debit_card_enabled: self.debit_card_enabled,
        }
    }

    fn prepare(&self, raw: &str, ctx: &RedirectContext) -> Prepared {
        let data = sanitize(raw);
        let kind = classifier::classify_sanitized(&self.classifier, &data);

        if !kind.is_recognized() {
            if !ctx.is_scanning() {
                warn!("Unknown information");
            }
            // 文本菜单展示用户原始输入
            return Prepared::Ready(intent_builder::unrecognized(raw, ctx));
        }

        debug!(
            kind = %kind,
            coin = coin_label(kind.coin()),
            data = %sanitize_log_message(&data),
            "Incoming data recognized"
        );

        let extracted = match extractor::extract(&data, kind) {
            Ok(extracted) => extracted,
            Err(e) => {
                warn!(kind = %kind, code = e.code(), "Incoming data extraction failed: {}", e);
                return Prepared::Ready(RouteOutcome::Error(e));
            }
        };

        if let ExtractedData::PaymentProtocol { url, coin } = &extracted {
            return Prepared::Pending(PendingResolution {
                kind,
                url: url.clone(),
                coin: *coin,
                data: extracted,
            });
        }

        Prepared::Ready(intent_builder::build(
            kind,
            &extracted,
            None,
            &self.build_context(ctx),
        ))
    }

    async fn resolve_pending(
        &self,
        pending: PendingResolution,
        ctx: &RedirectContext,
    ) -> RouteOutcome {
        let resolution = self.resolver.resolve(&pending.url, pending.coin).await;
        intent_builder::build(
            pending.kind,
            &pending.data,
            Some(resolution),
            &self.build_context(ctx),
        )
    }

    fn emit(&self, outcome: &RouteOutcome, ctx: &RedirectContext) {
        if !ctx.is_origin_alive() {
            debug!("Origin released, discarding incoming data result");
            return;
        }
        let event = match outcome {
            RouteOutcome::Navigate(intent) => IncomingDataEvent::IncomingDataRedir(intent.clone()),
            RouteOutcome::Menu(menu) => IncomingDataEvent::IncomingDataMenu(menu.clone()),
            RouteOutcome::Error(e) => {
                if e.is_remote() {
                    error!(code = e.code(), "Invoice resolution failed: {}", e);
                }
                IncomingDataEvent::IncomingDataError(e.to_body())
            }
            RouteOutcome::Skipped { .. } | RouteOutcome::Unrecognized => return,
        };
        self.notifier.publish(event);
    }
}
