use thiserror::Error;

#[derive(Error, Debug)]
pub enum TradingError {
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Configuration error in '{field}': {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Invalid value '{value}' for '{field}': {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Market data unavailable for {symbol}: {message}")]
    MarketDataError { symbol: String, message: String },

    #[error("Upstream returned HTTP {status} for {symbol}")]
    UpstreamStatusError { symbol: String, status: u16 },

    #[error("Analysis failed for {symbol}: {message}")]
    AnalysisError { symbol: String, message: String },

    #[error("Malformed HTTP request: {message}")]
    ProtocolError { message: String },
}

pub type Result<T> = std::result::Result<T, TradingError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Configuration,
    Network,
    MarketData,
    Analysis,
    Protocol,
    System,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl TradingError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            TradingError::HttpError(_) | TradingError::UpstreamStatusError { .. } => {
                ErrorCategory::Network
            }
            TradingError::IoError(_) => ErrorCategory::System,
            TradingError::SerializationError(_) | TradingError::MarketDataError { .. } => {
                ErrorCategory::MarketData
            }
            TradingError::ConfigError { .. }
            | TradingError::ConfigValidationError { .. }
            | TradingError::InvalidConfigValueError { .. } => ErrorCategory::Configuration,
            TradingError::AnalysisError { .. } => ErrorCategory::Analysis,
            TradingError::ProtocolError { .. } => ErrorCategory::Protocol,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self {
            // 單一資產失敗只會讓該資產被略過
            TradingError::MarketDataError { .. }
            | TradingError::AnalysisError { .. }
            | TradingError::ProtocolError { .. } => ErrorSeverity::Low,
            TradingError::HttpError(_)
            | TradingError::UpstreamStatusError { .. }
            | TradingError::SerializationError(_) => ErrorSeverity::Medium,
            TradingError::ConfigError { .. }
            | TradingError::ConfigValidationError { .. }
            | TradingError::InvalidConfigValueError { .. } => ErrorSeverity::High,
            TradingError::IoError(_) => ErrorSeverity::Critical,
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self.category() {
            ErrorCategory::Configuration => {
                "Check the config file, PORT and APP_ENV/FLASK_ENV environment variables"
            }
            ErrorCategory::Network => {
                "Check network connectivity to the market data provider and retry later"
            }
            ErrorCategory::MarketData => {
                "Verify the symbol is listed by the market data provider"
            }
            ErrorCategory::Analysis => "The price series was incomplete; retry on the next request",
            ErrorCategory::Protocol => "Send a well-formed HTTP/1.1 request",
            ErrorCategory::System => {
                "Check that the port is free and the static directory is readable"
            }
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            TradingError::ConfigError { message } => format!("Invalid configuration: {}", message),
            TradingError::ConfigValidationError { field, message } => {
                format!("Invalid configuration for {}: {}", field, message)
            }
            TradingError::InvalidConfigValueError { field, reason, .. } => {
                format!("Invalid value for {}: {}", field, reason)
            }
            TradingError::IoError(e) => format!("System error: {}", e),
            TradingError::HttpError(_) | TradingError::UpstreamStatusError { .. } => {
                "Market data provider is unreachable".to_string()
            }
            other => other.to_string(),
        }
    }
}
