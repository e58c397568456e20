use crate::utils::error::{Result, TradingError};
use std::collections::HashSet;
use url::Url;

pub trait Validate {
    fn validate(&self) -> Result<()>;
}

pub fn validate_url(field_name: &str, url_str: &str) -> Result<()> {
    if url_str.is_empty() {
        return Err(TradingError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: url_str.to_string(),
            reason: "URL cannot be empty".to_string(),
        });
    }

    match Url::parse(url_str) {
        Ok(url) => match url.scheme() {
            "http" | "https" => Ok(()),
            scheme => Err(TradingError::InvalidConfigValueError {
                field: field_name.to_string(),
                value: url_str.to_string(),
                reason: format!("Unsupported URL scheme: {}", scheme),
            }),
        },
        Err(e) => Err(TradingError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: url_str.to_string(),
            reason: format!("Invalid URL format: {}", e),
        }),
    }
}

pub fn validate_path(field_name: &str, path: &str) -> Result<()> {
    if path.is_empty() {
        return Err(TradingError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: path.to_string(),
            reason: "Path cannot be empty".to_string(),
        });
    }

    if path.contains('\0') {
        return Err(TradingError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: path.to_string(),
            reason: "Path contains null bytes".to_string(),
        });
    }

    Ok(())
}

pub fn validate_range(field_name: &str, value: usize, min: usize, max: usize) -> Result<()> {
    if value < min || value > max {
        return Err(TradingError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: format!("Value must be between {} and {}", min, max),
        });
    }
    Ok(())
}

pub fn validate_port(field_name: &str, port: u16) -> Result<()> {
    if port == 0 {
        return Err(TradingError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: port.to_string(),
            reason: "Port must be between 1 and 65535".to_string(),
        });
    }
    Ok(())
}

pub fn validate_non_empty_string(field_name: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(TradingError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: "Value cannot be empty".to_string(),
        });
    }
    Ok(())
}

/// 檢查資產代號不重複
pub fn validate_unique<'a>(
    field_name: &str,
    values: impl IntoIterator<Item = &'a str>,
) -> Result<()> {
    let mut seen = HashSet::new();
    for value in values {
        if !seen.insert(value) {
            return Err(TradingError::InvalidConfigValueError {
                field: field_name.to_string(),
                value: value.to_string(),
                reason: "Duplicate entry".to_string(),
            });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_url() {
        assert!(validate_url("market_data.base_url", "https://query1.finance.yahoo.com").is_ok());
        assert!(validate_url("market_data.base_url", "http://127.0.0.1:9000").is_ok());
        assert!(validate_url("market_data.base_url", "").is_err());
        assert!(validate_url("market_data.base_url", "ftp://example.com").is_err());
        assert!(validate_url("market_data.base_url", "not a url").is_err());
    }

    #[test]
    fn test_validate_port() {
        assert!(validate_port("server.port", 5000).is_ok());
        assert!(validate_port("server.port", 0).is_err());
    }

    #[test]
    fn test_validate_range() {
        assert!(validate_range("market_data.concurrent_requests", 5, 1, 32).is_ok());
        assert!(validate_range("market_data.concurrent_requests", 0, 1, 32).is_err());
        assert!(validate_range("market_data.concurrent_requests", 33, 1, 32).is_err());
    }

    #[test]
    fn test_validate_unique() {
        assert!(validate_unique("assets", ["AAPL", "MSFT"]).is_ok());

        let err = validate_unique("assets", ["AAPL", "MSFT", "AAPL"]).unwrap_err();
        match err {
            TradingError::InvalidConfigValueError { value, .. } => assert_eq!(value, "AAPL"),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_validate_path() {
        assert!(validate_path("server.static_dir", "./frontend").is_ok());
        assert!(validate_path("server.static_dir", "").is_err());
        assert!(validate_path("server.static_dir", "bad\0path").is_err());
    }
}
