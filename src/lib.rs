pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod server;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::cli::CliArgs;

pub use adapters::YahooFinanceClient;
pub use crate::config::{AppConfig, ConfigOverrides};
pub use crate::core::{catalog::AssetCatalog, engine::RecommendationEngine};
pub use server::{routes::AppState, Server};
pub use utils::error::{Result, TradingError};
