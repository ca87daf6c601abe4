use clap::Parser;
use smart_shopper::adapters::openai::OpenAiClient;
use smart_shopper::config::dotenv;
use smart_shopper::core::search::{SearchSession, SearchSettings};
use smart_shopper::utils::{logger, validation::Validate};
use smart_shopper::{Result, SearchResult, ShopperConfig};
use std::sync::Arc;
use std::time::Duration;

#[derive(Parser)]
#[command(name = "web-search")]
#[command(about = "Watch the web for a product at or below a price cap")]
struct Args {
    /// Product to look for
    #[arg(short, long)]
    product: String,

    /// Highest acceptable price in USD
    #[arg(long)]
    cap: f64,

    /// Number of daily search cycles (defaults to search.duration_days)
    #[arg(short, long)]
    days: Option<u32>,

    /// Hours between cycles (defaults to search.interval_hours)
    #[arg(long)]
    interval_hours: Option<u64>,

    /// Path to TOML configuration file
    #[arg(short, long, default_value = smart_shopper::config::toml_config::DEFAULT_CONFIG_FILE)]
    config: String,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() {
    let args = Args::parse();

    let dotenv_loaded = dotenv::load_dotenv();
    logger::init_cli_logger(args.verbose);
    if let Err(e) = dotenv_loaded {
        tracing::warn!("⚠️ Could not read .env: {}", e);
    }

    match run(&args).await {
        Ok(result) => match serde_json::to_string_pretty(&result) {
            Ok(rendered) => println!("{}", rendered),
            Err(e) => {
                eprintln!("❌ {}", e);
                std::process::exit(1);
            }
        },
        Err(e) => {
            tracing::error!("❌ Web search failed: {}", e);
            eprintln!("❌ {}", e.user_friendly_message());
            eprintln!("💡 Suggestion: {}", e.recovery_suggestion());
            std::process::exit(e.exit_code().max(1));
        }
    }
}

async fn run(args: &Args) -> Result<SearchResult> {
    let config = ShopperConfig::load(&args.config, false)?;
    config.validate()?;

    let client = Arc::new(OpenAiClient::from_config(&config)?);
    let mut session = SearchSession::new(client, SearchSettings::from_config(&config));

    let days = args.days.unwrap_or(config.search.duration_days);
    let interval = Duration::from_secs(args.interval_hours.unwrap_or(config.search.interval_hours) * 3600);

    Ok(session.watch(&args.product, args.cap, days, interval).await)
}
