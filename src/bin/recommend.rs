use clap::Parser;
use trading_api::config::toml_config::TomlConfig;
use trading_api::domain::model::Timeframe;
use trading_api::server::routes::parse_asset_filter;
use trading_api::utils::{logger, validation::Validate};
use trading_api::{AppConfig, ConfigOverrides, RecommendationEngine, YahooFinanceClient};

#[derive(Parser)]
#[command(name = "recommend")]
#[command(about = "Print trading recommendations once, without starting the server")]
struct Args {
    /// Analysis horizon: 12h, 24h, 3d or 1w
    #[arg(short, long, default_value = "24h")]
    timeframe: String,

    /// Comma separated symbols (defaults to the first catalog entries)
    #[arg(short, long)]
    assets: Option<String>,

    /// Path to a TOML configuration file
    #[arg(short, long)]
    config: Option<String>,

    /// Market data base URL
    #[arg(long)]
    base_url: Option<String>,

    /// Print the catalog instead of recommendations
    #[arg(long)]
    list_assets: bool,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    logger::init_logger(args.verbose, false);

    let file = args.config.as_deref().map(TomlConfig::from_file).transpose()?;
    let config = AppConfig::load(
        file,
        ConfigOverrides {
            base_url: args.base_url.clone(),
            ..Default::default()
        },
    )?;
    config.validate()?;

    let client = YahooFinanceClient::new(&config.market_data)?;
    let engine = RecommendationEngine::new(client, config.catalog, config.engine);

    if args.list_assets {
        println!(
            "{}",
            serde_json::to_string_pretty(&engine.supported_assets().listing())?
        );
        return Ok(());
    }

    let timeframe: Timeframe = args.timeframe.parse().unwrap_or_else(|e| {
        tracing::warn!("{}; using 24h", e);
        Timeframe::default()
    });
    let assets = parse_asset_filter(args.assets.as_deref());

    let report = engine.recommendations(timeframe, assets).await;
    println!("{}", serde_json::to_string_pretty(&report)?);

    if report.count == 0 {
        eprintln!("⚠️ No recommendations produced; check connectivity with --verbose");
    }
    Ok(())
}
