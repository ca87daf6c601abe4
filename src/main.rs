use clap::Parser;
use smart_shopper::adapters::openai::OpenAiClient;
use smart_shopper::adapters::terminal::TerminalPrompter;
use smart_shopper::config::dotenv;
use smart_shopper::core::financials::validate_financials_path;
use smart_shopper::core::intent::{ask_missing, parse_intent, parse_timeframe_to_date, render_summary};
use smart_shopper::domain::ports::{ChatClient, Prompter, Storage};
use smart_shopper::utils::{logger, validation::Validate};
use smart_shopper::{AgentGraph, CliConfig, LocalStorage, Result, ShopperConfig, ShopperState};
use std::path::Path;
use std::sync::Arc;

const RESULT_FILE: &str = "shopper_result.json";

#[tokio::main]
async fn main() {
    let cli = CliConfig::parse();

    // .env may carry RUST_LOG, so it is read before the subscriber is built.
    let dotenv_loaded = dotenv::load_dotenv();
    logger::init_logger(&cli.log_format, cli.verbose);
    match dotenv_loaded {
        Ok(Some(path)) => tracing::debug!("🔑 Loaded environment from {}", path.display()),
        Ok(None) => {}
        Err(e) => tracing::warn!("⚠️ Could not read .env: {}", e),
    }

    tracing::info!("Starting smart-shopper");
    if cli.verbose {
        tracing::debug!("CLI config: {:?}", cli);
    }

    if let Err(e) = run(cli).await {
        tracing::error!(
            "❌ smart-shopper failed: {} (Category: {:?}, Severity: {:?})",
            e,
            e.category(),
            e.severity()
        );
        tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());

        eprintln!("❌ {}", e.user_friendly_message());
        eprintln!("💡 Suggestion: {}", e.recovery_suggestion());

        let exit_code = e.exit_code();
        if exit_code > 0 {
            std::process::exit(exit_code);
        }
    }
}

async fn run(cli: CliConfig) -> Result<()> {
    let mut config = ShopperConfig::load(&cli.config, cli.config_required())?;
    if let Err(e) = config.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        return Err(e);
    }

    if cli.monitor {
        tracing::info!("🔍 System monitoring enabled");
    }

    let client: Arc<dyn ChatClient> = Arc::new(OpenAiClient::from_config(&config)?);
    let mut prompter = TerminalPrompter::new()?;

    let goal = match cli.goal.clone() {
        Some(goal) => goal,
        None => prompter.ask("Tell me in natural language what you'd like to do", None)?,
    };

    let intent = match parse_intent(client.as_ref(), &config.openai.intent_model, &goal).await {
        Ok(intent) => intent,
        Err(e) => {
            tracing::error!("❌ Intent extraction failed: {}", e);
            println!("Error extracting intent: {}", e);
            std::process::exit(1);
        }
    };

    let mut intent = ask_missing(intent, &mut prompter)?;
    intent.timeframe = parse_timeframe_to_date(&intent.timeframe, chrono::Local::now().date_naive());

    let financials_path = if intent.provide_financials {
        let path = match cli.financials.clone() {
            Some(path) => path,
            None => prompter.ask("Path to your financial .xlsx", None)?,
        };
        if let Err(e) = validate_financials_path(Path::new(&path)) {
            tracing::warn!("⚠️ Rejected financials path: {}", e);
            println!("File not found or wrong format! Try again.");
            std::process::exit(1);
        }
        Some(path)
    } else {
        None
    };

    println!("{}", render_summary(&intent, financials_path.as_deref())?);

    if !cli.yes && !prompter.confirm("Proceed with these details?")? {
        return Ok(());
    }

    println!("\nRunning agents (SuggestBudget → WebSearch)...");
    config.monitoring.enabled |= cli.monitor;

    let graph = AgentGraph::shopper(client, &config, cli.contact.clone());
    let (state, runs) = graph
        .run(ShopperState::new(&intent.product, &intent.timeframe, financials_path))
        .await?;

    let summary = AgentGraph::execution_summary(&runs);
    tracing::info!("📊 Execution summary: {:?}", summary);

    let rendered = serde_json::to_string_pretty(&state)?;
    println!("\n--- Agent Results ---");
    println!("{}", rendered);

    if let Some(dir) = cli.save.as_deref() {
        let storage = LocalStorage::new(dir);
        storage.write_file(RESULT_FILE, rendered.as_bytes()).await?;
        tracing::info!("📁 Results saved to: {}", storage.full_path(RESULT_FILE).display());
    }

    println!("✅ Done – the agents are on it!");
    Ok(())
}
