use anyhow::Context;
use clap::Parser;
use smart_shopper::adapters::resend::ResendMailer;
use smart_shopper::config::dotenv;
use smart_shopper::core::notify::Notifier;
use smart_shopper::domain::ports::Mailer;
use smart_shopper::utils::logger;
use smart_shopper::{DealNotification, ShopperConfig};
use std::io::Read;
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Parser)]
#[command(name = "notify")]
#[command(about = "Send a deal notification from a JSON payload (file or stdin)")]
struct Args {
    /// JSON payload file; stdin when omitted
    #[arg(short, long)]
    input: Option<PathBuf>,

    /// Override the payload's user_contact
    #[arg(long)]
    contact: Option<String>,

    /// Print to stdout instead of sending email
    #[arg(long)]
    no_email: bool,

    /// Path to TOML configuration file
    #[arg(short, long, default_value = smart_shopper::config::toml_config::DEFAULT_CONFIG_FILE)]
    config: String,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,
}

fn read_payload(input: Option<&PathBuf>) -> anyhow::Result<DealNotification> {
    let raw = match input {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("reading payload from {}", path.display()))?,
        None => {
            let mut buf = String::new();
            std::io::stdin()
                .read_to_string(&mut buf)
                .context("reading payload from stdin")?;
            buf
        }
    };
    serde_json::from_str(&raw).context("payload is not a valid notification")
}

async fn run(args: &Args) -> anyhow::Result<bool> {
    let config = ShopperConfig::load(&args.config, false)?;

    let mut notification = read_payload(args.input.as_ref())?;
    if let Some(contact) = args.contact.clone() {
        notification.user_contact = Some(contact);
    }

    let mailer = ResendMailer::from_config(&config.notify).map(|m| Arc::new(m) as Arc<dyn Mailer>);
    let notifier = Notifier::new(mailer, config.openai.api_key.clone(), &config.notify.from_email);

    Ok(notifier.send(&notification, !args.no_email).await)
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
        Ok(true) => {}
        Ok(false) => std::process::exit(1),
        Err(e) => {
            tracing::error!("❌ Notification failed: {:#}", e);
            eprintln!("❌ {:#}", e);
            std::process::exit(1);
        }
    }
}
