use crate::domain::model::{Asset, AssetInfo, AssetType};
use crate::utils::error::Result;
use crate::utils::validation::{validate_non_empty_string, validate_unique, Validate};
use std::collections::BTreeMap;

/// Number of assets analysed when a request names none.
pub const DEFAULT_SELECTION_SIZE: usize = 8;

const DEFAULT_ASSETS: &[(&str, &str, AssetType)] = &[
    ("AAPL", "Apple Inc.", AssetType::Stock),
    ("MSFT", "Microsoft Corporation", AssetType::Stock),
    ("AMZN", "Amazon.com Inc.", AssetType::Stock),
    ("GOOGL", "Alphabet Inc.", AssetType::Stock),
    ("META", "Meta Platforms Inc.", AssetType::Stock),
    ("TSLA", "Tesla Inc.", AssetType::Stock),
    ("NVDA", "NVIDIA Corporation", AssetType::Stock),
    ("EURUSD=X", "EUR/USD", AssetType::Forex),
    ("GBPUSD=X", "GBP/USD", AssetType::Forex),
    ("USDJPY=X", "USD/JPY", AssetType::Forex),
    ("AUDUSD=X", "AUD/USD", AssetType::Forex),
    ("BTC-USD", "Bitcoin USD", AssetType::Crypto),
    ("ETH-USD", "Ethereum USD", AssetType::Crypto),
    ("XRP-USD", "Ripple USD", AssetType::Crypto),
    ("SOL-USD", "Solana USD", AssetType::Crypto),
    ("GC=F", "Gold", AssetType::Commodity),
    ("SI=F", "Silver", AssetType::Commodity),
    ("CL=F", "Crude Oil", AssetType::Commodity),
    ("NG=F", "Natural Gas", AssetType::Commodity),
];

/// Ordered set of supported assets. Order drives the default selection.
#[derive(Debug, Clone, PartialEq)]
pub struct AssetCatalog {
    assets: Vec<Asset>,
}

impl AssetCatalog {
    pub fn new(assets: Vec<Asset>) -> Self {
        Self { assets }
    }

    pub fn get(&self, symbol: &str) -> Option<&Asset> {
        self.assets.iter().find(|a| a.symbol == symbol)
    }

    pub fn default_selection(&self, limit: usize) -> Vec<&Asset> {
        self.assets.iter().take(limit).collect()
    }

    /// 只保留目錄內的代號（完全相符），維持請求順序，重複的照樣保留
    pub fn select(&self, symbols: &[String]) -> Vec<&Asset> {
        symbols.iter().filter_map(|s| self.get(s)).collect()
    }

    pub fn len(&self) -> usize {
        self.assets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.assets.is_empty()
    }

    /// `/api/assets` 回傳格式：symbol → {name, type}
    pub fn listing(&self) -> BTreeMap<&str, AssetInfo<'_>> {
        self.assets
            .iter()
            .map(|a| {
                (
                    a.symbol.as_str(),
                    AssetInfo {
                        name: &a.name,
                        asset_type: a.asset_type,
                    },
                )
            })
            .collect()
    }
}

impl Default for AssetCatalog {
    fn default() -> Self {
        Self::new(
            DEFAULT_ASSETS
                .iter()
                .map(|(symbol, name, asset_type)| Asset {
                    symbol: symbol.to_string(),
                    name: name.to_string(),
                    asset_type: *asset_type,
                })
                .collect(),
        )
    }
}

impl Validate for AssetCatalog {
    fn validate(&self) -> Result<()> {
        for asset in &self.assets {
            validate_non_empty_string("assets.symbol", &asset.symbol)?;
            validate_non_empty_string("assets.name", &asset.name)?;
        }
        validate_unique("assets.symbol", self.assets.iter().map(|a| a.symbol.as_str()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_catalog_contents() {
        let catalog = AssetCatalog::default();

        assert_eq!(catalog.len(), 19);
        assert_eq!(catalog.get("GC=F").map(|a| a.name.as_str()), Some("Gold"));
        assert_eq!(
            catalog.get("EURUSD=X").map(|a| a.asset_type),
            Some(AssetType::Forex)
        );
        assert!(catalog.get("DOGE-USD").is_none());
        assert!(catalog.validate().is_ok());
    }

    #[test]
    fn test_default_selection_takes_first_entries() {
        let catalog = AssetCatalog::default();
        let symbols: Vec<&str> = catalog
            .default_selection(DEFAULT_SELECTION_SIZE)
            .iter()
            .map(|a| a.symbol.as_str())
            .collect();

        assert_eq!(
            symbols,
            vec!["AAPL", "MSFT", "AMZN", "GOOGL", "META", "TSLA", "NVDA", "EURUSD=X"]
        );
    }

    #[test]
    fn test_select_filters_unknown_and_keeps_duplicates() {
        let catalog = AssetCatalog::default();
        let requested = vec![
            "BTC-USD".to_string(),
            "UNKNOWN".to_string(),
            " AAPL ".to_string(),
            "aapl".to_string(),
            "BTC-USD".to_string(),
            "MSFT".to_string(),
        ];

        let symbols: Vec<&str> = catalog
            .select(&requested)
            .iter()
            .map(|a| a.symbol.as_str())
            .collect();

        assert_eq!(symbols, vec!["BTC-USD", "BTC-USD", "MSFT"]);
    }

    #[test]
    fn test_listing_serializes_as_object() {
        let catalog = AssetCatalog::default();
        let json = serde_json::to_value(catalog.listing()).unwrap();

        assert_eq!(json["AAPL"]["name"], "Apple Inc.");
        assert_eq!(json["SOL-USD"]["type"], "crypto");
        assert_eq!(json.as_object().unwrap().len(), 19);
    }

    #[test]
    fn test_duplicate_symbols_fail_validation() {
        let asset = Asset {
            symbol: "AAPL".to_string(),
            name: "Apple Inc.".to_string(),
            asset_type: AssetType::Stock,
        };
        let catalog = AssetCatalog::new(vec![asset.clone(), asset]);

        assert!(catalog.validate().is_err());
    }
}
