use clap::Parser;
use trading_api::config::toml_config::TomlConfig;
use trading_api::utils::error::ErrorSeverity;
use trading_api::utils::{logger, validation::Validate};
use trading_api::{
    AppConfig, AppState, CliArgs, RecommendationEngine, Server, TradingError, YahooFinanceClient,
};

fn exit_with(e: &TradingError) -> ! {
    tracing::error!(
        "❌ {} (Category: {:?}, Severity: {:?})",
        e,
        e.category(),
        e.severity()
    );
    tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());

    eprintln!("❌ {}", e.user_friendly_message());
    eprintln!("💡 {}", e.recovery_suggestion());

    let exit_code = match e.severity() {
        ErrorSeverity::Low | ErrorSeverity::High => 1,
        ErrorSeverity::Medium => 2,
        ErrorSeverity::Critical => 3,
    };
    std::process::exit(exit_code);
}

fn load_config(args: &CliArgs) -> trading_api::Result<AppConfig> {
    let file = match &args.config {
        Some(path) => Some(TomlConfig::from_file(path)?),
        None => None,
    };
    AppConfig::load(file, args.overrides())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = CliArgs::parse();

    // 日誌格式取決於執行模式，所以先解析配置
    let config = match load_config(&args) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("❌ Failed to load configuration: {}", e);
            eprintln!("💡 {}", e.recovery_suggestion());
            std::process::exit(1);
        }
    };

    logger::init_logger(args.verbose, config.server.run_mode.json_logs());

    tracing::info!(
        "Starting trading-api v{} ({} mode, platform: {})",
        env!("CARGO_PKG_VERSION"),
        config.server.run_mode,
        config.server.platform
    );
    if args.verbose {
        tracing::debug!("Resolved config: {:?}", config);
    }

    if let Err(e) = config.validate() {
        exit_with(&e);
    }

    if !config.server.static_dir.join("index.html").exists() {
        tracing::warn!(
            "⚠️ No index.html under {}; only the API will be served",
            config.server.static_dir.display()
        );
    }

    let client = match YahooFinanceClient::new(&config.market_data) {
        Ok(client) => client,
        Err(e) => exit_with(&e),
    };
    let engine = RecommendationEngine::new_with_monitoring(
        client,
        config.catalog.clone(),
        config.engine.clone(),
        config.monitoring,
    );
    if config.monitoring {
        tracing::info!("🔍 Process monitoring enabled");
    }

    let state = AppState::new(engine, config.server.static_dir.clone());
    let server = match Server::bind(&config.server.bind_address(), state).await {
        Ok(server) => server,
        Err(e) => exit_with(&e),
    };

    if let Err(e) = server.run().await {
        exit_with(&e);
    }

    tracing::info!("👋 Server stopped");
    Ok(())
}
