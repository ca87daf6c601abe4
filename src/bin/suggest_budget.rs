use clap::Parser;
use smart_shopper::adapters::openai::OpenAiClient;
use smart_shopper::config::dotenv;
use smart_shopper::core::budget::{format_usd, suggest_budget};
use smart_shopper::core::financials::{load_financials, validate_financials_path};
use smart_shopper::utils::logger;
use smart_shopper::{Result, ShopperConfig};
use std::path::Path;

#[derive(Parser)]
#[command(name = "suggest-budget")]
#[command(about = "Suggest an affordable budget for a purchase from your recent finances")]
struct Args {
    /// Financial spreadsheet (.xlsx or .csv)
    #[arg(short, long)]
    financials: String,

    /// What you want to buy
    #[arg(short, long)]
    product: String,

    /// Purchase date or timeframe
    #[arg(short, long)]
    timeframe: String,

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
        Ok(amount) => println!("{}", format_usd(amount)),
        Err(e) => {
            tracing::error!("❌ Budget suggestion failed: {}", e);
            eprintln!("❌ {}", e.user_friendly_message());
            eprintln!("💡 Suggestion: {}", e.recovery_suggestion());
            std::process::exit(e.exit_code().max(1));
        }
    }
}

async fn run(args: &Args) -> Result<f64> {
    let config = ShopperConfig::load(&args.config, false)?;
    let client = OpenAiClient::from_config(&config)?;

    let path = Path::new(&args.financials);
    validate_financials_path(path)?;
    let finances = load_financials(path)?;
    eprintln!("📥 Loaded {} rows from {}", finances.len(), path.display());

    eprintln!("🔎 Asking for the typical price of \"{}\"...", args.product);
    let suggestion = suggest_budget(
        &client,
        &config.openai.budget_model,
        &args.product,
        &args.timeframe,
        &finances,
    )
    .await?;

    if let Some(cap) = suggestion.max_price {
        eprintln!("🏷️ Typical retail price: {}", format_usd(cap));
    }
    if suggestion.clamped {
        eprintln!("⚠️ Recommendation was above the retail price and has been capped");
    }

    Ok(suggestion.amount)
}
