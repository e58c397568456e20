use anyhow::Result;
use chrono::{Local, TimeZone};
use httpmock::prelude::*;
use serde_json::json;
use trading_api::config::{EngineSettings, MarketDataSettings};
use trading_api::domain::model::{Confidence, Signal, Timeframe};
use trading_api::{AssetCatalog, RecommendationEngine, YahooFinanceClient};

fn engine_for(server: &MockServer) -> Result<RecommendationEngine<YahooFinanceClient>> {
    let settings = MarketDataSettings {
        base_url: server.base_url(),
        ..Default::default()
    };
    let client = YahooFinanceClient::new(&settings)?;
    Ok(RecommendationEngine::new(
        client,
        AssetCatalog::default(),
        EngineSettings::default(),
    ))
}

fn chart_body(price: f64, closes: Vec<f64>) -> serde_json::Value {
    let timestamps: Vec<i64> = (0..closes.len() as i64).map(|i| 1718000000 + i * 900).collect();
    json!({
        "chart": {
            "result": [{
                "meta": {"regularMarketPrice": price, "currency": "USD"},
                "timestamp": timestamps,
                "indicators": {"quote": [{"close": closes}]}
            }],
            "error": null
        }
    })
}

fn insights_body(direction: &str) -> serde_json::Value {
    json!({
        "finance": {
            "result": {
                "instrumentInfo": {
                    "technicalEvents": {"shortTermOutlook": {"direction": direction}},
                    "keyTechnicals": {"support": 100.0, "resistance": 140.0}
                }
            }
        }
    })
}

fn mock_chart(server: &MockServer, symbol: &str, price: f64, closes: Vec<f64>) {
    let path = format!("/v8/finance/chart/{}", symbol);
    server.mock(|when, then| {
        when.method(GET).path(path);
        then.status(200).json_body(chart_body(price, closes));
    });
}

fn mock_insights(server: &MockServer, symbol: &str, direction: &str) {
    server.mock(|when, then| {
        when.method(GET)
            .path("/v1/finance/insights")
            .query_param("symbol", symbol);
        then.status(200).json_body(insights_body(direction));
    });
}

fn rising(from: f64, n: usize) -> Vec<f64> {
    (0..n).map(|i| from + i as f64).collect()
}

/// 完整流程：行情、洞察、排序與欄位
#[tokio::test]
async fn test_recommendations_end_to_end() -> Result<()> {
    let server = MockServer::start();
    let engine = engine_for(&server)?;

    // AAPL 上漲且洞察同向 → High
    mock_chart(&server, "AAPL", 129.0, rising(100.0, 30));
    mock_insights(&server, "AAPL", "up");

    // MSFT 上漲但沒有洞察資料 → Medium
    mock_chart(&server, "MSFT", 429.0, rising(400.0, 30));
    server.mock(|when, then| {
        when.method(GET)
            .path("/v1/finance/insights")
            .query_param("symbol", "MSFT");
        then.status(503);
    });

    // AMZN 行情失敗 → 略過
    server.mock(|when, then| {
        when.method(GET).path("/v8/finance/chart/AMZN");
        then.status(500);
    });

    let now = Local
        .with_ymd_and_hms(2026, 6, 10, 9, 30, 0)
        .single()
        .ok_or_else(|| anyhow::anyhow!("ambiguous local time"))?;
    let report = engine
        .recommendations_at(
            Timeframe::TwentyFourHours,
            Some(vec!["AMZN".into(), "MSFT".into(), "AAPL".into()]),
            now,
        )
        .await;

    assert_eq!(report.timeframe, Timeframe::TwentyFourHours);
    assert_eq!(report.timestamp, "09:30 AM 06/10/2026");
    assert_eq!(report.count, 2);

    let symbols: Vec<&str> = report
        .recommendations
        .iter()
        .map(|r| r.symbol.as_str())
        .collect();
    assert_eq!(symbols, vec!["AAPL", "MSFT"]);

    let aapl = &report.recommendations[0];
    assert_eq!(aapl.name, "Apple Inc.");
    assert_eq!(aapl.confidence, Confidence::High);
    assert_eq!(aapl.recommendation, Signal::Buy);
    assert_eq!(aapl.entry, 129.0);
    assert!(aapl.stop_loss < aapl.entry);
    assert!(aapl.take_profit > aapl.entry);
    assert!(aapl.potential > 0.0);
    assert_eq!(aapl.expiration, "09:30 AM 06/11/2026");

    let msft = &report.recommendations[1];
    assert_eq!(msft.confidence, Confidence::Medium);
    assert_eq!(msft.recommendation, Signal::Buy);

    Ok(())
}

#[tokio::test]
async fn test_unknown_symbols_are_ignored() -> Result<()> {
    let server = MockServer::start();
    let engine = engine_for(&server)?;

    mock_chart(&server, "TSLA", 129.0, rising(100.0, 30));
    mock_insights(&server, "TSLA", "up");

    let report = engine
        .recommendations(
            Timeframe::TwelveHours,
            Some(vec!["DOGE".into(), "TSLA".into()]),
        )
        .await;

    assert_eq!(report.count, 1);
    assert_eq!(report.recommendations[0].symbol, "TSLA");
    assert_eq!(report.recommendations[0].timeframe, Timeframe::TwelveHours);

    Ok(())
}

#[tokio::test]
async fn test_default_selection_uses_first_catalog_entries() -> Result<()> {
    let server = MockServer::start();
    let engine = engine_for(&server)?;

    // 只有第九個資產有資料，不在預設選取範圍內
    mock_chart(&server, "GBPUSD=X", 1.27, rising(1.0, 30));
    let chart_calls = server.mock(|when, then| {
        when.method(GET).path_contains("/v8/finance/chart/");
        then.status(404);
    });

    let report = engine.recommendations(Timeframe::ThreeDays, None).await;

    assert_eq!(report.count, 0);
    assert!(report.recommendations.is_empty());
    chart_calls.assert_hits(8);

    Ok(())
}

/// 洞察方向只認小寫 up / down
#[tokio::test]
async fn test_outlook_direction_must_match_exactly() -> Result<()> {
    let server = MockServer::start();
    let engine = engine_for(&server)?;

    mock_chart(&server, "AAPL", 129.0, rising(100.0, 30));
    mock_insights(&server, "AAPL", "Bullish");
    mock_chart(&server, "MSFT", 429.0, rising(400.0, 30));
    mock_insights(&server, "MSFT", "up");

    let report = engine
        .recommendations(
            Timeframe::TwentyFourHours,
            Some(vec!["AAPL".into(), "MSFT".into()]),
        )
        .await;

    let order: Vec<(&str, Confidence)> = report
        .recommendations
        .iter()
        .map(|r| (r.symbol.as_str(), r.confidence))
        .collect();
    assert_eq!(
        order,
        vec![("MSFT", Confidence::High), ("AAPL", Confidence::Medium)]
    );

    Ok(())
}

#[tokio::test]
async fn test_duplicate_symbols_are_analysed_each_time() -> Result<()> {
    let server = MockServer::start();
    let engine = engine_for(&server)?;

    let chart = server.mock(|when, then| {
        when.method(GET).path("/v8/finance/chart/AAPL");
        then.status(200)
            .json_body(chart_body(129.0, rising(100.0, 30)));
    });
    mock_insights(&server, "AAPL", "up");

    let report = engine
        .recommendations(
            Timeframe::TwentyFourHours,
            Some(vec!["AAPL".into(), "AAPL".into(), " MSFT".into()]),
        )
        .await;

    let symbols: Vec<&str> = report
        .recommendations
        .iter()
        .map(|r| r.symbol.as_str())
        .collect();
    assert_eq!(symbols, vec!["AAPL", "AAPL"]);
    chart.assert_hits(2);

    Ok(())
}
