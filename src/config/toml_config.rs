use crate::config::environment::RunMode;
use crate::domain::model::Asset;
use crate::utils::error::{Result, TradingError};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// On-disk configuration. Every section is optional; missing values keep
/// their defaults.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TomlConfig {
    pub server: Option<ServerSection>,
    pub market_data: Option<MarketDataSection>,
    pub engine: Option<EngineSection>,
    pub monitoring: Option<MonitoringSection>,
    pub assets: Option<Vec<Asset>>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ServerSection {
    pub host: Option<String>,
    pub port: Option<u16>,
    pub static_dir: Option<String>,
    pub environment: Option<RunMode>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MarketDataSection {
    pub base_url: Option<String>,
    pub user_agent: Option<String>,
    pub timeout_seconds: Option<u64>,
    pub concurrent_requests: Option<usize>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EngineSection {
    pub default_asset_limit: Option<usize>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MonitoringSection {
    pub enabled: bool,
}

impl TomlConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| TradingError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 替換環境變數 (例如 ${YAHOO_BASE_URL})，未設定的保留原樣
    fn substitute_env_vars(content: &str) -> Result<String> {
        let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| TradingError::ConfigError {
            message: e.to_string(),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::AssetType;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_parse_full_config() {
        let toml_content = r#"
[server]
host = "0.0.0.0"
port = 8080
static_dir = "./public"
environment = "production"

[market_data]
base_url = "https://query2.finance.yahoo.com"
timeout_seconds = 5
concurrent_requests = 3

[engine]
default_asset_limit = 4

[monitoring]
enabled = true

[[assets]]
symbol = "AAPL"
name = "Apple Inc."
type = "stock"

[[assets]]
symbol = "BTC-USD"
name = "Bitcoin USD"
type = "crypto"
"#;

        let config = TomlConfig::from_toml_str(toml_content).unwrap();
        let server = config.server.unwrap();
        let assets = config.assets.unwrap();

        assert_eq!(server.port, Some(8080));
        assert_eq!(server.environment, Some(RunMode::Production));
        assert_eq!(config.market_data.unwrap().concurrent_requests, Some(3));
        assert_eq!(config.engine.unwrap().default_asset_limit, Some(4));
        assert!(config.monitoring.unwrap().enabled);
        assert_eq!(assets.len(), 2);
        assert_eq!(assets[1].asset_type, AssetType::Crypto);
    }

    #[test]
    fn test_empty_config_is_valid() {
        let config = TomlConfig::from_toml_str("").unwrap();
        assert!(config.server.is_none());
        assert!(config.assets.is_none());
    }

    #[test]
    fn test_env_var_substitution() {
        std::env::set_var("TRADING_API_TEST_BASE_URL", "http://127.0.0.1:9999");

        let toml_content = r#"
[market_data]
base_url = "${TRADING_API_TEST_BASE_URL}"
user_agent = "${TRADING_API_TEST_UNSET_VAR}"
"#;

        let config = TomlConfig::from_toml_str(toml_content).unwrap();
        let market = config.market_data.unwrap();
        assert_eq!(market.base_url.as_deref(), Some("http://127.0.0.1:9999"));
        assert_eq!(
            market.user_agent.as_deref(),
            Some("${TRADING_API_TEST_UNSET_VAR}")
        );

        std::env::remove_var("TRADING_API_TEST_BASE_URL");
    }

    #[test]
    fn test_invalid_toml_is_rejected() {
        let err = TomlConfig::from_toml_str("[server\nport = ").unwrap_err();
        assert!(matches!(err, TradingError::ConfigValidationError { .. }));
    }

    #[test]
    fn test_unknown_asset_type_is_rejected() {
        let toml_content = r#"
[[assets]]
symbol = "EURUSD=X"
name = "EUR/USD"
type = "bond"
"#;
        assert!(TomlConfig::from_toml_str(toml_content).is_err());
    }

    #[test]
    fn test_config_from_file() {
        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file
            .write_all(b"[server]\nport = 7000\n")
            .unwrap();

        let config = TomlConfig::from_file(temp_file.path()).unwrap();
        assert_eq!(config.server.unwrap().port, Some(7000));
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let err = TomlConfig::from_file("/nonexistent/trading-api.toml").unwrap_err();
        assert!(matches!(err, TradingError::IoError(_)));
    }
}
