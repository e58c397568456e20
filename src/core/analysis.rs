//! Technical analysis over a close-price series.
//!
//! Every function here is pure so the engine can be tested without a network.
//! Null closes (gaps reported by the data provider) are skipped.

use crate::domain::model::{
    format_display_time, round2, Confidence, Indicators, MarketAnalysis, OutlookDirection,
    PriceSeries, Signal, TechnicalInsights, Timeframe, Trend,
};
use crate::utils::error::{Result, TradingError};
use chrono::{DateTime, Local};

const MIN_INDICATOR_POINTS: usize = 10;
const RSI_WINDOW: usize = 14;
const DEFAULT_VOLATILITY: f64 = 0.02;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RiskLevels {
    pub stop_loss: f64,
    pub take_profit: f64,
}

fn present(closes: &[Option<f64>]) -> Vec<f64> {
    closes.iter().flatten().copied().collect()
}

fn mean_of_last(prices: &[f64], window: usize) -> f64 {
    let tail = if prices.len() >= window {
        &prices[prices.len() - window..]
    } else {
        prices
    };
    tail.iter().sum::<f64>() / tail.len() as f64
}

pub fn calculate_indicators(closes: &[Option<f64>]) -> Option<Indicators> {
    // 長度檢查在過濾空值之前
    if closes.len() < MIN_INDICATOR_POINTS {
        return None;
    }

    let prices = present(closes);
    let n = prices.len();
    if n == 0 {
        return None;
    }

    let sma_short = mean_of_last(&prices, 5);
    let sma_medium = mean_of_last(&prices, 10);

    let mut gains = 0.0;
    let mut losses = 0.0;
    for i in 1..RSI_WINDOW.min(n) {
        let diff = prices[n - i] - prices[n - i - 1];
        if diff > 0.0 {
            gains += diff;
        } else {
            losses -= diff;
        }
    }

    let rsi = if gains + losses > 0.0 {
        let rs = if losses > 0.0 { gains / losses } else { 100.0 };
        100.0 - (100.0 / (1.0 + rs))
    } else {
        50.0
    };

    let last = prices[n - 1];
    let ema12 = if n >= 12 { mean_of_last(&prices, 12) } else { last };
    let ema26 = if n >= 26 { mean_of_last(&prices, 26) } else { last };

    Some(Indicators {
        sma_short,
        sma_medium,
        rsi,
        macd: ema12 - ema26,
    })
}

/// Mean absolute fractional change between consecutive closes.
pub fn calculate_volatility(closes: &[Option<f64>]) -> f64 {
    let prices = present(closes);
    if prices.len() < 2 {
        return DEFAULT_VOLATILITY;
    }

    let changes: Vec<f64> = prices
        .windows(2)
        .filter(|w| w[0] > 0.0)
        .map(|w| ((w[1] - w[0]) / w[0]).abs())
        .collect();

    if changes.is_empty() {
        return DEFAULT_VOLATILITY;
    }

    changes.iter().sum::<f64>() / changes.len() as f64
}

pub fn determine_trend(closes: &[Option<f64>]) -> Trend {
    let mut values = closes.iter().flatten();
    let (Some(first), Some(last)) = (values.next(), values.last()) else {
        return Trend::Neutral;
    };

    if last > first {
        Trend::Bullish
    } else if last < first {
        Trend::Bearish
    } else {
        Trend::Neutral
    }
}

pub fn calculate_risk_levels(
    price: f64,
    volatility: f64,
    trend: Trend,
    timeframe: Timeframe,
) -> RiskLevels {
    let adjusted = volatility * timeframe.risk_multiplier();
    let stop_pct = adjusted * 2.0;

    // 非多頭趨勢一律以空方設定停損停利
    if trend == Trend::Bullish {
        RiskLevels {
            stop_loss: round2(price * (1.0 - stop_pct)),
            take_profit: round2(price * (1.0 + adjusted * 4.0)),
        }
    } else {
        RiskLevels {
            stop_loss: round2(price * (1.0 + stop_pct)),
            take_profit: round2(price * (1.0 - adjusted * 3.0)),
        }
    }
}

fn indicator_values(indicators: Option<&Indicators>) -> (f64, f64, f64, f64) {
    indicators
        .map(|i| (i.rsi, i.sma_short, i.sma_medium, i.macd))
        .unwrap_or((50.0, 0.0, 0.0, 0.0))
}

pub fn calculate_confidence(
    indicators: Option<&Indicators>,
    trend: Trend,
    outlook: Option<OutlookDirection>,
) -> Confidence {
    let (rsi, sma_short, sma_medium, macd) = indicator_values(indicators);
    let bullish = trend == Trend::Bullish;
    let bearish = trend == Trend::Bearish;
    let mut score = 0;

    if (bullish && rsi < 40.0) || (bearish && rsi > 60.0) {
        score += 1;
    }
    if (bullish && sma_short > sma_medium) || (bearish && sma_short < sma_medium) {
        score += 1;
    }
    if (bullish && macd > 0.0) || (bearish && macd < 0.0) {
        score += 1;
    }
    if outlook.is_some_and(|o| o.agrees_with(trend)) {
        score += 2;
    }

    Confidence::from_score(score)
}

pub fn determine_signal(
    trend: Trend,
    indicators: Option<&Indicators>,
    confidence: Confidence,
) -> Signal {
    if confidence.is_actionable() {
        match trend {
            Trend::Bullish => return Signal::Buy,
            Trend::Bearish => return Signal::Sell,
            Trend::Neutral => {}
        }
    }

    let (rsi, _, _, macd) = indicator_values(indicators);
    if rsi < 30.0 && macd > 0.0 {
        Signal::Buy
    } else if rsi > 70.0 && macd < 0.0 {
        Signal::Sell
    } else if trend == Trend::Bullish {
        Signal::Buy
    } else {
        Signal::Sell
    }
}

/// Expected move to the take-profit level, in percent of the entry price.
pub fn potential_return(signal: Signal, price: f64, take_profit: f64) -> f64 {
    match signal {
        Signal::Buy => (take_profit - price) / price * 100.0,
        Signal::Sell => (price - take_profit) / price * 100.0,
    }
}

pub fn expiration(timeframe: Timeframe, now: DateTime<Local>) -> String {
    format_display_time(&(now + timeframe.horizon()))
}

pub fn analyze(
    series: &PriceSeries,
    insights: Option<&TechnicalInsights>,
    timeframe: Timeframe,
    now: DateTime<Local>,
) -> Result<MarketAnalysis> {
    let price = series.price;
    if !price.is_finite() || price <= 0.0 {
        return Err(TradingError::AnalysisError {
            symbol: series.symbol.clone(),
            message: format!("invalid market price {}", price),
        });
    }

    let indicators = calculate_indicators(&series.closes);
    let trend = determine_trend(&series.closes);
    let outlook = insights.and_then(|i| i.short_term_direction);
    let confidence = calculate_confidence(indicators.as_ref(), trend, outlook);

    let volatility = calculate_volatility(&series.closes);
    let risk = calculate_risk_levels(price, volatility, trend, timeframe);
    let signal = determine_signal(trend, indicators.as_ref(), confidence);

    let support = insights
        .and_then(|i| i.support)
        .unwrap_or(price * 0.95);
    let resistance = insights
        .and_then(|i| i.resistance)
        .unwrap_or(price * 1.05);

    tracing::debug!(
        symbol = %series.symbol,
        points = series.closes.len(),
        last_bar = ?series.last_bar_time(),
        ?trend,
        ?confidence,
        volatility,
        "analysis complete"
    );

    Ok(MarketAnalysis {
        price,
        currency: series.currency.clone(),
        trend,
        signal,
        confidence,
        stop_loss: risk.stop_loss,
        take_profit: risk.take_profit,
        potential: potential_return(signal, price, risk.take_profit),
        support,
        resistance,
        expiration: expiration(timeframe, now),
        indicators,
    })
}
