use crate::domain::model::{PriceSeries, TechnicalInsights, Timeframe};
use crate::utils::error::Result;
use async_trait::async_trait;

/// 行情資料來源
#[async_trait]
pub trait MarketDataSource: Send + Sync {
    async fn price_series(&self, symbol: &str, timeframe: Timeframe) -> Result<PriceSeries>;
    async fn insights(&self, symbol: &str) -> Result<TechnicalInsights>;
}

#[async_trait]
impl<T: MarketDataSource + ?Sized> MarketDataSource for std::sync::Arc<T> {
    async fn price_series(&self, symbol: &str, timeframe: Timeframe) -> Result<PriceSeries> {
        (**self).price_series(symbol, timeframe).await
    }

    async fn insights(&self, symbol: &str) -> Result<TechnicalInsights> {
        (**self).insights(symbol).await
    }
}
