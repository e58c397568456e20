use chrono::{DateTime, Duration, Local, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Display format shared by report timestamps and expirations, e.g. `03:07 PM 10/18/2026`.
pub const DISPLAY_TIME_FORMAT: &str = "%I:%M %p %m/%d/%Y";

pub fn format_display_time<Tz: TimeZone>(time: &DateTime<Tz>) -> String
where
    Tz::Offset: fmt::Display,
{
    time.format(DISPLAY_TIME_FORMAT).to_string()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Timeframe {
    #[serde(rename = "12h")]
    TwelveHours,
    #[default]
    #[serde(rename = "24h")]
    TwentyFourHours,
    #[serde(rename = "3d")]
    ThreeDays,
    #[serde(rename = "1w")]
    OneWeek,
}

impl Timeframe {
    pub const ALL: [Timeframe; 4] = [
        Timeframe::TwelveHours,
        Timeframe::TwentyFourHours,
        Timeframe::ThreeDays,
        Timeframe::OneWeek,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Timeframe::TwelveHours => "12h",
            Timeframe::TwentyFourHours => "24h",
            Timeframe::ThreeDays => "3d",
            Timeframe::OneWeek => "1w",
        }
    }

    /// Unknown or missing timeframes fall back to `24h`.
    pub fn parse_or_default(value: &str) -> Self {
        value.parse().unwrap_or_default()
    }

    /// Chart `(interval, range)` query parameters for this horizon.
    pub fn chart_params(&self) -> (&'static str, &'static str) {
        match self {
            Timeframe::TwelveHours => ("5m", "1d"),
            Timeframe::TwentyFourHours => ("15m", "1d"),
            Timeframe::ThreeDays => ("1h", "3d"),
            Timeframe::OneWeek => ("1d", "1wk"),
        }
    }

    pub fn risk_multiplier(&self) -> f64 {
        match self {
            Timeframe::TwelveHours => 1.0,
            Timeframe::TwentyFourHours => 1.5,
            Timeframe::ThreeDays => 2.0,
            Timeframe::OneWeek => 3.0,
        }
    }

    pub fn horizon(&self) -> Duration {
        match self {
            Timeframe::TwelveHours => Duration::hours(12),
            Timeframe::TwentyFourHours => Duration::hours(24),
            Timeframe::ThreeDays => Duration::days(3),
            Timeframe::OneWeek => Duration::weeks(1),
        }
    }
}

impl FromStr for Timeframe {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Timeframe::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| format!("Unsupported timeframe: {}", s))
    }
}

impl fmt::Display for Timeframe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Trend {
    Bullish,
    Bearish,
    Neutral,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Confidence {
    High,
    Medium,
    Low,
}

impl Confidence {
    /// Sort key: High first.
    pub fn rank(&self) -> u8 {
        match self {
            Confidence::High => 0,
            Confidence::Medium => 1,
            Confidence::Low => 2,
        }
    }

    pub fn from_score(score: u32) -> Self {
        match score {
            s if s >= 4 => Confidence::High,
            s if s >= 2 => Confidence::Medium,
            _ => Confidence::Low,
        }
    }

    pub fn is_actionable(&self) -> bool {
        matches!(self, Confidence::High | Confidence::Medium)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Signal {
    Buy,
    Sell,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AssetType {
    Stock,
    Forex,
    Crypto,
    Commodity,
}

impl AssetType {
    pub fn as_str(&self) -> &'static str {
        match self {
            AssetType::Stock => "stock",
            AssetType::Forex => "forex",
            AssetType::Crypto => "crypto",
            AssetType::Commodity => "commodity",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Asset {
    pub symbol: String,
    pub name: String,
    #[serde(rename = "type")]
    pub asset_type: AssetType,
}

/// Entry of the `/api/assets` listing.
#[derive(Debug, Clone, Serialize)]
pub struct AssetInfo<'a> {
    pub name: &'a str,
    #[serde(rename = "type")]
    pub asset_type: AssetType,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Indicators {
    pub sma_short: f64,
    pub sma_medium: f64,
    pub rsi: f64,
    pub macd: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PriceSeries {
    pub symbol: String,
    pub price: f64,
    pub currency: String,
    pub timestamps: Vec<i64>,
    pub closes: Vec<Option<f64>>,
}

impl PriceSeries {
    /// Time of the most recent bar (unix seconds in the chart payload).
    pub fn last_bar_time(&self) -> Option<DateTime<Utc>> {
        self.timestamps
            .last()
            .and_then(|ts| DateTime::from_timestamp(*ts, 0))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutlookDirection {
    Up,
    Down,
    Neutral,
}

impl OutlookDirection {
    /// Only the exact `up` / `down` values count; anything else is neutral.
    pub fn parse(value: &str) -> Self {
        match value {
            "up" => OutlookDirection::Up,
            "down" => OutlookDirection::Down,
            _ => OutlookDirection::Neutral,
        }
    }

    pub fn agrees_with(&self, trend: Trend) -> bool {
        matches!(
            (self, trend),
            (OutlookDirection::Up, Trend::Bullish) | (OutlookDirection::Down, Trend::Bearish)
        )
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct TechnicalInsights {
    pub short_term_direction: Option<OutlookDirection>,
    pub support: Option<f64>,
    pub resistance: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MarketAnalysis {
    pub price: f64,
    pub currency: String,
    pub trend: Trend,
    pub signal: Signal,
    pub confidence: Confidence,
    pub stop_loss: f64,
    pub take_profit: f64,
    pub potential: f64,
    pub support: f64,
    pub resistance: f64,
    pub expiration: String,
    pub indicators: Option<Indicators>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recommendation {
    pub symbol: String,
    pub name: String,
    #[serde(rename = "type")]
    pub asset_type: AssetType,
    pub price: f64,
    pub currency: String,
    pub recommendation: Signal,
    pub confidence: Confidence,
    pub entry: f64,
    pub stop_loss: f64,
    pub take_profit: f64,
    pub potential: f64,
    pub expiration: String,
    pub timeframe: Timeframe,
}

impl Recommendation {
    pub fn from_analysis(asset: &Asset, analysis: MarketAnalysis, timeframe: Timeframe) -> Self {
        Self {
            symbol: asset.symbol.clone(),
            name: asset.name.clone(),
            asset_type: asset.asset_type,
            price: analysis.price,
            currency: analysis.currency,
            recommendation: analysis.signal,
            confidence: analysis.confidence,
            entry: analysis.price,
            stop_loss: analysis.stop_loss,
            take_profit: analysis.take_profit,
            potential: round2(analysis.potential),
            expiration: analysis.expiration,
            timeframe,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecommendationReport {
    pub timestamp: String,
    pub timeframe: Timeframe,
    pub count: usize,
    pub recommendations: Vec<Recommendation>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthStatus {
    pub status: String,
    pub timestamp: String,
}

impl HealthStatus {
    pub fn healthy_at(now: DateTime<Local>) -> Self {
        Self {
            status: "healthy".to_string(),
            timestamp: now.to_rfc3339(),
        }
    }
}

pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
