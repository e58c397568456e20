pub mod analysis;
pub mod catalog;
pub mod engine;

pub use crate::domain::model::{Recommendation, RecommendationReport, Timeframe};
pub use crate::domain::ports::MarketDataSource;
pub use crate::utils::error::Result;
