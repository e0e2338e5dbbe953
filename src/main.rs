//! incoming-data 命令行入口
//!
//! 用法：
//!   incoming-data describe <text>
//!   incoming-data route <text> [--scan] [--amount <最小单位>] [--home-card] [--wallets <file.json>]
//!
//! 发布的事件以 JSON 输出到 stdout，日志输出到 stderr。

use std::sync::Arc;

use anyhow::{Context, Result};
use incoming_data::{
    config::Config,
    domain::{ActivePage, RedirectContext, StaticCoinRegistry},
    infrastructure::{
        logging::init_logging, notification::BroadcastNotificationChannel,
        paypro_client::HttpInvoiceTransport,
    },
    service::{IncomingDataRouter, PayProResolver, StaticWalletDirectory, WalletSummary},
};

enum Command {
    Describe(String),
    Route {
        data: String,
        ctx: RedirectContext,
        wallets: Option<String>,
    },
}

fn usage() -> anyhow::Error {
    anyhow::anyhow!(
        "usage: incoming-data describe <text> | route <text> [--scan] [--amount N] [--home-card] [--wallets FILE]"
    )
}

fn parse_args() -> Result<Command> {
    let mut args = std::env::args().skip(1);
    let command = args.next().ok_or_else(usage)?;
    let data = args.next().ok_or_else(usage)?;

    match command.as_str() {
        "describe" => Ok(Command::Describe(data)),
        "route" => {
            let mut ctx = RedirectContext::default();
            let mut wallets = None;
            while let Some(arg) = args.next() {
                match arg.as_str() {
                    "--scan" => ctx.active_page = Some(ActivePage::ScanPage),
                    "--home-card" => ctx.from_home_card = true,
                    "--amount" => ctx.amount = Some(args.next().ok_or_else(usage)?),
                    "--wallets" => wallets = Some(args.next().ok_or_else(usage)?),
                    other => anyhow::bail!("unknown option: {}", other),
                }
            }
            Ok(Command::Route { data, ctx, wallets })
        }
        _ => Err(usage()),
    }
}

fn load_wallets(path: Option<&str>) -> Result<StaticWalletDirectory> {
    let Some(path) = path else {
        return Ok(StaticWalletDirectory::empty());
    };
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read wallets file: {}", path))?;
    let wallets: Vec<WalletSummary> =
        serde_json::from_str(&content).with_context(|| "Failed to parse wallets file as JSON")?;
    Ok(StaticWalletDirectory::new(wallets))
}

#[tokio::main]
async fn main() -> Result<()> {
    // 1. 加载环境变量与配置
    dotenvy::dotenv().ok();
    let config_path = std::env::var("CONFIG_PATH").ok();
    let config = Config::from_env_and_file(config_path.as_deref())?;
    config.validate()?;

    // 2. 初始化日志
    if let Err(e) = init_logging(&config.logging) {
        eprintln!("Failed to initialize logging: {}", e);
    }

    let command = parse_args()?;

    // 3. 组装路由器
    let channel = BroadcastNotificationChannel::default();
    let mut events = channel.subscribe();
    let transport = HttpInvoiceTransport::new(&config.paypro)?;
    let resolver = PayProResolver::new(Arc::new(transport), Arc::new(StaticCoinRegistry));

    match command {
        Command::Describe(data) => {
            let router = IncomingDataRouter::new(
                &config.app,
                resolver,
                Arc::new(StaticWalletDirectory::empty()),
                Arc::new(channel),
            );
            let description = router.describe(&data);
            println!("{}", serde_json::to_string_pretty(&description)?);
        }
        Command::Route { data, ctx, wallets } => {
            let wallets = load_wallets(wallets.as_deref())?;
            let router =
                IncomingDataRouter::new(&config.app, resolver, Arc::new(wallets), Arc::new(channel));
            let outcome = router.route(&data, Some(ctx)).await;

            while let Ok(envelope) = events.try_recv() {
                println!("{}", serde_json::to_string_pretty(&envelope)?);
            }
            if !outcome.is_recognized() {
                tracing::info!("Input not recognized, no event published");
            }
        }
    }

    Ok(())
}
