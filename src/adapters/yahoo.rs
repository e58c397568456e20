//! Yahoo Finance market data client.
//!
//! Talks to the public `v8/finance/chart` and `v1/finance/insights` endpoints.
//! The base URL is configurable so tests can point it at a mock server.

use crate::config::MarketDataSettings;
use crate::domain::model::{OutlookDirection, PriceSeries, TechnicalInsights, Timeframe};
use crate::domain::ports::MarketDataSource;
use crate::utils::error::{Result, TradingError};
use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::time::Duration;

#[derive(Debug, Deserialize)]
struct ChartResponse {
    chart: ChartEnvelope,
}

#[derive(Debug, Deserialize)]
struct ChartEnvelope {
    #[serde(default)]
    result: Option<Vec<ChartResult>>,
    #[serde(default)]
    error: Option<YahooApiError>,
}

#[derive(Debug, Deserialize)]
struct YahooApiError {
    #[serde(default)]
    code: String,
    #[serde(default)]
    description: String,
}

#[derive(Debug, Default, Deserialize)]
struct ChartResult {
    #[serde(default)]
    meta: ChartMeta,
    #[serde(default)]
    timestamp: Option<Vec<i64>>,
    #[serde(default)]
    indicators: ChartIndicators,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ChartMeta {
    regular_market_price: Option<f64>,
    currency: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct ChartIndicators {
    #[serde(default)]
    quote: Vec<QuoteSeries>,
}

#[derive(Debug, Default, Deserialize)]
struct QuoteSeries {
    #[serde(default)]
    close: Vec<Option<f64>>,
}

#[derive(Debug, Default, Deserialize)]
struct InsightsResponse {
    finance: Option<InsightsFinance>,
}

#[derive(Debug, Default, Deserialize)]
struct InsightsFinance {
    result: Option<InsightsResult>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct InsightsResult {
    instrument_info: Option<InstrumentInfo>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct InstrumentInfo {
    technical_events: Option<TechnicalEvents>,
    key_technicals: Option<KeyTechnicals>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TechnicalEvents {
    short_term_outlook: Option<Outlook>,
}

#[derive(Debug, Default, Deserialize)]
struct Outlook {
    direction: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct KeyTechnicals {
    support: Option<f64>,
    resistance: Option<f64>,
}

impl ChartResponse {
    fn into_series(self, symbol: &str) -> Result<PriceSeries> {
        if let Some(error) = self.chart.error {
            return Err(TradingError::MarketDataError {
                symbol: symbol.to_string(),
                message: format!("{} - {}", error.code, error.description),
            });
        }

        let result = self
            .chart
            .result
            .and_then(|r| r.into_iter().next())
            .ok_or_else(|| TradingError::MarketDataError {
                symbol: symbol.to_string(),
                message: "empty chart result".to_string(),
            })?;

        let closes = result
            .indicators
            .quote
            .into_iter()
            .next()
            .map(|q| q.close)
            .unwrap_or_default();

        Ok(PriceSeries {
            symbol: symbol.to_string(),
            // 缺價格時交給分析階段拒絕
            price: result.meta.regular_market_price.unwrap_or(0.0),
            currency: result.meta.currency.unwrap_or_else(|| "USD".to_string()),
            timestamps: result.timestamp.unwrap_or_default(),
            closes,
        })
    }
}

impl From<InsightsResponse> for TechnicalInsights {
    fn from(response: InsightsResponse) -> Self {
        let info = response
            .finance
            .and_then(|f| f.result)
            .and_then(|r| r.instrument_info);

        let Some(info) = info else {
            return TechnicalInsights::default();
        };

        let direction = info
            .technical_events
            .and_then(|e| e.short_term_outlook)
            .and_then(|o| o.direction)
            .map(|d| OutlookDirection::parse(&d));
        let key = info.key_technicals.unwrap_or_default();

        TechnicalInsights {
            short_term_direction: direction,
            support: key.support,
            resistance: key.resistance,
        }
    }
}

pub struct YahooFinanceClient {
    client: Client,
    base_url: String,
}

impl YahooFinanceClient {
    pub fn new(settings: &MarketDataSettings) -> Result<Self> {
        let client = Client::builder()
            .user_agent(settings.user_agent.clone())
            .timeout(Duration::from_secs(settings.timeout_seconds))
            .build()?;

        Ok(Self {
            client,
            base_url: settings.base_url.trim_end_matches('/').to_string(),
        })
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        symbol: &str,
        url: &str,
        query: &[(&str, &str)],
    ) -> Result<T> {
        tracing::debug!("Requesting {} for {}", url, symbol);
        let response = self.client.get(url).query(query).send().await?;

        let status = response.status();
        tracing::debug!("Response status for {}: {}", symbol, status);

        if !status.is_success() {
            return Err(TradingError::UpstreamStatusError {
                symbol: symbol.to_string(),
                status: status.as_u16(),
            });
        }

        Ok(response.json::<T>().await?)
    }
}

#[async_trait]
impl MarketDataSource for YahooFinanceClient {
    async fn price_series(&self, symbol: &str, timeframe: Timeframe) -> Result<PriceSeries> {
        let (interval, range) = timeframe.chart_params();
        let url = format!("{}/v8/finance/chart/{}", self.base_url, symbol);

        let response: ChartResponse = self
            .get_json(
                symbol,
                &url,
                &[
                    ("interval", interval),
                    ("range", range),
                    ("includePrePost", "true"),
                ],
            )
            .await?;

        response.into_series(symbol)
    }

    async fn insights(&self, symbol: &str) -> Result<TechnicalInsights> {
        let url = format!("{}/v1/finance/insights", self.base_url);
        let response: InsightsResponse = self.get_json(symbol, &url, &[("symbol", symbol)]).await?;
        Ok(response.into())
    }
}
