pub mod cli;
pub mod dotenv;
pub mod toml_config;

pub use toml_config::ShopperConfig;

#[cfg(feature = "cli")]
use clap::Parser;

#[cfg(feature = "cli")]
#[derive(Debug, Clone, Parser)]
#[command(name = "smart-shopper")]
#[command(about = "Plan a purchase: budget from your finances, web search, deal alert")]
pub struct CliConfig {
    /// Purchase goal in plain language; prompted for when omitted
    #[arg(short, long)]
    pub goal: Option<String>,

    /// Financial spreadsheet (.xlsx or .csv); prompted for when needed
    #[arg(short, long)]
    pub financials: Option<String>,

    /// Email address for the deal notification
    #[arg(long)]
    pub contact: Option<String>,

    /// Path to TOML configuration file
    #[arg(short, long, default_value = toml_config::DEFAULT_CONFIG_FILE)]
    pub config: String,

    /// Directory to save the agent results JSON into
    #[arg(long)]
    pub save: Option<String>,

    /// Skip the final "Proceed?" confirmation
    #[arg(short, long)]
    pub yes: bool,

    #[arg(long, help = "Enable system monitoring")]
    pub monitor: bool,

    #[arg(long, default_value = "compact", value_parser = ["compact", "json"])]
    pub log_format: String,

    #[arg(short, long, help = "Enable verbose output")]
    pub verbose: bool,
}

#[cfg(feature = "cli")]
impl CliConfig {
    /// A non-default `--config` must exist.
    pub fn config_required(&self) -> bool {
        self.config != toml_config::DEFAULT_CONFIG_FILE
    }
}
