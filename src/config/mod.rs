#[cfg(feature = "cli")]
pub mod cli;
pub mod environment;
pub mod toml_config;

use crate::core::catalog::{AssetCatalog, DEFAULT_SELECTION_SIZE};
use crate::utils::error::{Result, TradingError};
use crate::utils::validation::{
    validate_non_empty_string, validate_path, validate_port, validate_range, validate_url,
    Validate,
};
use environment::{Platform, RunMode};
use std::path::PathBuf;
use toml_config::TomlConfig;

pub const DEFAULT_PORT: u16 = 5000;
pub const DEFAULT_STATIC_DIR: &str = "../frontend";
pub const DEFAULT_YAHOO_BASE_URL: &str = "https://query1.finance.yahoo.com";
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36";

#[derive(Debug, Clone)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
    pub static_dir: PathBuf,
    pub platform: Platform,
    pub run_mode: RunMode,
}

impl ServerSettings {
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[derive(Debug, Clone)]
pub struct MarketDataSettings {
    pub base_url: String,
    pub user_agent: String,
    pub timeout_seconds: u64,
}

impl Default for MarketDataSettings {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_YAHOO_BASE_URL.to_string(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            timeout_seconds: 10,
        }
    }
}

#[derive(Debug, Clone)]
pub struct EngineSettings {
    pub concurrent_requests: usize,
    pub default_asset_limit: usize,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            concurrent_requests: 5,
            default_asset_limit: DEFAULT_SELECTION_SIZE,
        }
    }
}

/// Values given on the command line; they take precedence over everything else.
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub host: Option<String>,
    pub port: Option<u16>,
    pub static_dir: Option<String>,
    pub base_url: Option<String>,
    pub monitor: Option<bool>,
}

/// Fully resolved configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub server: ServerSettings,
    pub market_data: MarketDataSettings,
    pub engine: EngineSettings,
    pub catalog: AssetCatalog,
    pub monitoring: bool,
}

impl AppConfig {
    /// 依序套用：預設值 < TOML 檔案 < 環境變數 < 命令列參數
    pub fn resolve(
        file: Option<TomlConfig>,
        env: &dyn Fn(&str) -> Option<String>,
        platform: Platform,
        overrides: ConfigOverrides,
    ) -> Result<Self> {
        let file = file.unwrap_or_default();
        let server = file.server.unwrap_or_default();
        let market = file.market_data.unwrap_or_default();
        let engine = file.engine.unwrap_or_default();

        let env_port = match env("PORT") {
            Some(raw) => Some(raw.trim().parse::<u16>().map_err(|_| {
                TradingError::InvalidConfigValueError {
                    field: "PORT".to_string(),
                    value: raw.clone(),
                    reason: "PORT must be a number between 1 and 65535".to_string(),
                }
            })?),
            None => None,
        };

        let port = overrides
            .port
            .or(env_port)
            .or(server.port)
            .unwrap_or(DEFAULT_PORT);

        let host = overrides
            .host
            .or_else(|| env("HOST"))
            .or(server.host)
            .unwrap_or_else(|| platform.default_host().to_string());

        let static_dir = overrides
            .static_dir
            .or_else(|| env("STATIC_DIR"))
            .or(server.static_dir)
            .unwrap_or_else(|| DEFAULT_STATIC_DIR.to_string());

        let run_mode = RunMode::from_env(env)
            .or(server.environment)
            .unwrap_or(if platform.is_hosted() {
                RunMode::Production
            } else {
                RunMode::Development
            });

        let defaults = MarketDataSettings::default();
        let market_data = MarketDataSettings {
            base_url: overrides
                .base_url
                .or_else(|| env("YAHOO_BASE_URL"))
                .or(market.base_url)
                .unwrap_or(defaults.base_url),
            user_agent: market.user_agent.unwrap_or(defaults.user_agent),
            timeout_seconds: market.timeout_seconds.unwrap_or(defaults.timeout_seconds),
        };

        let engine_defaults = EngineSettings::default();
        let engine = EngineSettings {
            concurrent_requests: market
                .concurrent_requests
                .unwrap_or(engine_defaults.concurrent_requests),
            default_asset_limit: engine
                .default_asset_limit
                .unwrap_or(engine_defaults.default_asset_limit),
        };

        let catalog = file
            .assets
            .map(AssetCatalog::new)
            .unwrap_or_default();

        let monitoring = overrides
            .monitor
            .unwrap_or_else(|| file.monitoring.map(|m| m.enabled).unwrap_or(false));

        Ok(Self {
            server: ServerSettings {
                host,
                port,
                static_dir: PathBuf::from(static_dir),
                platform,
                run_mode,
            },
            market_data,
            engine,
            catalog,
            monitoring,
        })
    }

    /// Resolves against the real process environment.
    pub fn load(file: Option<TomlConfig>, overrides: ConfigOverrides) -> Result<Self> {
        let env = |key: &str| std::env::var(key).ok();
        let platform = Platform::from_system(&env);
        Self::resolve(file, &env, platform, overrides)
    }
}

impl Validate for AppConfig {
    fn validate(&self) -> Result<()> {
        validate_non_empty_string("server.host", &self.server.host)?;
        validate_port("server.port", self.server.port)?;
        validate_path(
            "server.static_dir",
            &self.server.static_dir.to_string_lossy(),
        )?;

        validate_url("market_data.base_url", &self.market_data.base_url)?;
        validate_non_empty_string("market_data.user_agent", &self.market_data.user_agent)?;
        validate_range(
            "market_data.timeout_seconds",
            self.market_data.timeout_seconds as usize,
            1,
            300,
        )?;
        validate_range(
            "market_data.concurrent_requests",
            self.engine.concurrent_requests,
            1,
            32,
        )?;
        validate_range(
            "engine.default_asset_limit",
            self.engine.default_asset_limit,
            1,
            self.catalog.len().max(1),
        )?;

        if self.catalog.is_empty() {
            return Err(TradingError::ConfigValidationError {
                field: "assets".to_string(),
                message: "At least one asset must be configured".to_string(),
            });
        }
        self.catalog.validate()?;

        tracing::debug!("✅ Configuration validation passed");
        Ok(())
    }
}
