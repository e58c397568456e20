use crate::config::ConfigOverrides;
use clap::Parser;

#[derive(Debug, Clone, Parser)]
#[command(name = "trading-api")]
#[command(about = "Trading recommendation API backed by Yahoo Finance")]
pub struct CliArgs {
    /// Path to a TOML configuration file
    #[arg(short, long, env = "TRADING_API_CONFIG")]
    pub config: Option<String>,

    /// Bind address (defaults to 0.0.0.0 on hosted platforms)
    #[arg(long)]
    pub host: Option<String>,

    /// Listen port (overrides PORT)
    #[arg(short, long)]
    pub port: Option<u16>,

    /// Directory holding the frontend bundle
    #[arg(long)]
    pub static_dir: Option<String>,

    /// Market data base URL
    #[arg(long)]
    pub base_url: Option<String>,

    #[arg(short, long, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, help = "Log process CPU and memory after each recommendation run")]
    pub monitor: bool,
}

impl CliArgs {
    pub fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            host: self.host.clone(),
            port: self.port,
            static_dir: self.static_dir.clone(),
            base_url: self.base_url.clone(),
            monitor: self.monitor.then_some(true),
        }
    }
}
