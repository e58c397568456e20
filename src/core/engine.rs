use crate::config::EngineSettings;
use crate::core::analysis;
use crate::core::catalog::AssetCatalog;
use crate::domain::model::{
    format_display_time, Asset, MarketAnalysis, Recommendation, RecommendationReport, Timeframe,
};
use crate::domain::ports::MarketDataSource;
use crate::utils::error::Result;
use crate::utils::monitor::SystemMonitor;
use chrono::{DateTime, Local};
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;

pub struct RecommendationEngine<S: MarketDataSource> {
    source: Arc<S>,
    catalog: AssetCatalog,
    settings: EngineSettings,
    monitor: SystemMonitor,
}

impl<S: MarketDataSource + 'static> RecommendationEngine<S> {
    pub fn new(source: S, catalog: AssetCatalog, settings: EngineSettings) -> Self {
        Self::new_with_monitoring(source, catalog, settings, false)
    }

    pub fn new_with_monitoring(
        source: S,
        catalog: AssetCatalog,
        settings: EngineSettings,
        monitor_enabled: bool,
    ) -> Self {
        Self {
            source: Arc::new(source),
            catalog,
            settings,
            monitor: SystemMonitor::new(monitor_enabled),
        }
    }

    pub fn supported_assets(&self) -> &AssetCatalog {
        &self.catalog
    }

    pub async fn recommendations(
        &self,
        timeframe: Timeframe,
        assets: Option<Vec<String>>,
    ) -> RecommendationReport {
        self.recommendations_at(timeframe, assets, Local::now()).await
    }

    /// Same as [`recommendations`](Self::recommendations) with an explicit clock.
    pub async fn recommendations_at(
        &self,
        timeframe: Timeframe,
        assets: Option<Vec<String>>,
        now: DateTime<Local>,
    ) -> RecommendationReport {
        let selected: Vec<Asset> = match &assets {
            Some(symbols) => self.catalog.select(symbols),
            None => self
                .catalog
                .default_selection(self.settings.default_asset_limit),
        }
        .into_iter()
        .cloned()
        .collect();

        tracing::info!(
            "Generating {} recommendations for {} assets",
            timeframe,
            selected.len()
        );

        let analyses = self.analyze_all(&selected, timeframe, now).await;

        let mut recommendations: Vec<Recommendation> = selected
            .iter()
            .zip(analyses)
            .filter_map(|(asset, analysis)| {
                analysis.map(|a| Recommendation::from_analysis(asset, a, timeframe))
            })
            .collect();

        // 穩定排序：信心等級優先，其次潛在報酬由高至低
        recommendations.sort_by(|a, b| {
            a.confidence
                .rank()
                .cmp(&b.confidence.rank())
                .then_with(|| b.potential.total_cmp(&a.potential))
        });

        tracing::info!(
            "Generated {}/{} recommendations",
            recommendations.len(),
            selected.len()
        );
        self.monitor.log_stats("recommendations");

        RecommendationReport {
            timestamp: format_display_time(&now),
            timeframe,
            count: recommendations.len(),
            recommendations,
        }
    }

    /// Results are returned in the order of `assets`; failed assets are `None`.
    async fn analyze_all(
        &self,
        assets: &[Asset],
        timeframe: Timeframe,
        now: DateTime<Local>,
    ) -> Vec<Option<MarketAnalysis>> {
        let permits = Arc::new(Semaphore::new(self.settings.concurrent_requests.max(1)));
        let mut tasks = JoinSet::new();

        for (index, asset) in assets.iter().enumerate() {
            let source = Arc::clone(&self.source);
            let permits = Arc::clone(&permits);
            let symbol = asset.symbol.clone();

            tasks.spawn(async move {
                let _permit = permits.acquire_owned().await.ok();
                let result = analyze_symbol(source.as_ref(), &symbol, timeframe, now).await;
                (index, symbol, result)
            });
        }

        let mut results: Vec<Option<MarketAnalysis>> = vec![None; assets.len()];
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((index, _, Ok(analysis))) => results[index] = Some(analysis),
                Ok((_, symbol, Err(e))) => {
                    tracing::warn!("⚠️ Skipping {}: {}", symbol, e);
                }
                Err(e) => tracing::error!("Analysis task failed: {}", e),
            }
        }

        results
    }
}

async fn analyze_symbol<S: MarketDataSource + ?Sized>(
    source: &S,
    symbol: &str,
    timeframe: Timeframe,
    now: DateTime<Local>,
) -> Result<MarketAnalysis> {
    let series = source.price_series(symbol, timeframe).await?;

    // 洞察資料只影響信心分數，失敗時照常分析
    let insights = match source.insights(symbol).await {
        Ok(insights) => Some(insights),
        Err(e) => {
            tracing::warn!("Insights unavailable for {}: {}", symbol, e);
            None
        }
    };

    analysis::analyze(&series, insights.as_ref(), timeframe, now)
}
