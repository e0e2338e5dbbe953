//! 配置管理模块
//! 支持从环境变量和配置文件加载配置

use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// 应用配置结构体
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub app: AppConfig,
    #[serde(default)]
    pub paypro: PayProConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// 应用配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// 应用名称，同时是加入钱包邀请码的 URI 前缀
    pub name: String,
    /// 已启用的扩展（如 `debitcard`）
    #[serde(default)]
    pub enabled_extensions: Vec<String>,
}

impl AppConfig {
    pub fn is_extension_enabled(&self, extension: &str) -> bool {
        self.enabled_extensions
            .iter()
            .any(|e| e.eq_ignore_ascii_case(extension))
    }
}

/// 支付协议客户端配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PayProConfig {
    pub request_timeout_secs: u64,
    pub user_agent: String,
}

/// 日志配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
    pub format: String, // "json" or "text"
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            name: std::env::var("APP_NAME").unwrap_or_else(|_| "copay".into()),
            enabled_extensions: std::env::var("ENABLED_EXTENSIONS")
                .map(|v| {
                    v.split(',')
                        .map(str::trim)
                        .filter(|s| !s.is_empty())
                        .map(str::to_string)
                        .collect()
                })
                .unwrap_or_else(|_| vec!["debitcard".to_string()]),
        }
    }
}

impl Default for PayProConfig {
    fn default() -> Self {
        Self {
            request_timeout_secs: std::env::var("PAYPRO_TIMEOUT_SECS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(30),
            user_agent: std::env::var("PAYPRO_USER_AGENT")
                .unwrap_or_else(|_| concat!("incoming-data/", env!("CARGO_PKG_VERSION")).into()),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: std::env::var("LOG_LEVEL").unwrap_or_else(|_| "info".into()),
            format: std::env::var("LOG_FORMAT").unwrap_or_else(|_| "text".into()),
        }
    }
}

impl Config {
    /// 从环境变量加载配置
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            app: AppConfig::default(),
            paypro: PayProConfig::default(),
            logging: LoggingConfig::default(),
        })
    }

    /// 从配置文件加载配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read config file: {:?}", path.as_ref()))?;

        let config: Config =
            toml::from_str(&content).with_context(|| "Failed to parse config file as TOML")?;

        Ok(config)
    }

    /// 从环境变量和配置文件合并加载（配置文件优先级更高）
    pub fn from_env_and_file<P: AsRef<Path>>(path: Option<P>) -> Result<Self> {
        let mut config = Self::from_env()?;

        if let Some(path) = path {
            if path.as_ref().exists() {
                // 文件中缺省的段落回落到环境变量默认值
                config = Self::from_file(path)?;
            }
        }

        Ok(config)
    }

    /// 验证配置有效性
    pub fn validate(&self) -> Result<()> {
        if self.app.name.is_empty()
            || !self
                .app
                .name
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-')
        {
            anyhow::bail!("APP_NAME must be a non-empty URI scheme (alphanumeric or '-')");
        }

        if self.paypro.request_timeout_secs == 0 {
            anyhow::bail!("PAYPRO_TIMEOUT_SECS must be greater than 0");
        }

        // 验证日志级别
        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.logging.level.to_lowercase().as_str()) {
            anyhow::bail!("LOG_LEVEL must be one of: {:?}", valid_levels);
        }

        // 验证日志格式
        if self.logging.format != "json" && self.logging.format != "text" {
            anyhow::bail!("LOG_FORMAT must be 'json' or 'text'");
        }

        Ok(())
    }
}
