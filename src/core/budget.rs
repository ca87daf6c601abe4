use crate::core::financials::load_financials;
use crate::domain::chat::{ChatMessage, ChatRequest};
use crate::domain::model::{FinanceRecord, ShopperState};
use crate::domain::ports::{Agent, ChatClient};
use crate::utils::error::{Result, ShopperError};
use async_trait::async_trait;
use std::path::Path;
use std::sync::Arc;

pub const AGENT_NAME: &str = "SuggestBudgetAgent";

/// Outcome of a budget suggestion, before it is folded into the state.
#[derive(Debug, Clone, PartialEq)]
pub struct BudgetSuggestion {
    pub amount: f64,
    pub max_price: Option<f64>,
    pub clamped: bool,
}

/// `1234.5` -> `$1,234.50`.
pub fn format_usd(amount: f64) -> String {
    let fixed = format!("{:.2}", amount.abs());
    let (whole, cents) = fixed.split_once('.').unwrap_or((fixed.as_str(), "00"));

    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (idx, ch) in whole.chars().enumerate() {
        if idx > 0 && (whole.len() - idx) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    let sign = if amount < 0.0 { "-" } else { "" };
    format!("{}${}.{}", sign, grouped, cents)
}

/// Parses replies like `$1,299.00` or `850`.
pub fn parse_dollar_amount(raw: &str) -> Result<f64> {
    let cleaned: String = raw
        .trim()
        .chars()
        .filter(|c| !matches!(c, '$' | ',') && !c.is_whitespace())
        .collect();

    match cleaned.parse::<f64>() {
        Ok(value) if value.is_finite() => Ok(value),
        _ => Err(ShopperError::UnexpectedResponse {
            raw: raw.trim().to_string(),
        }),
    }
}

/// Asks the model for the product's typical retail price. `None` when the reply is not a number.
pub async fn lookup_max_price(client: &dyn ChatClient, model: &str, product: &str) -> Result<Option<f64>> {
    let system = "You are a retail-pricing assistant. \
        When asked for the current average retail price of a product, \
        respond with exactly one number (no currency symbols) \
        representing the price in USD.";
    let user = format!("What is the current average retail price of an {} in USD?", product);

    let request = ChatRequest::new(model, vec![ChatMessage::system(system), ChatMessage::user(user)]);
    let reply = client.complete(request).await?;

    match parse_dollar_amount(reply.text()) {
        Ok(price) => Ok(Some(price)),
        Err(_) => {
            tracing::warn!("⚠️ could not parse price from LLM: {}", reply.text());
            Ok(None)
        }
    }
}

pub fn build_budget_messages(
    product: &str,
    timeframe: &str,
    finances: &[FinanceRecord],
    max_price: Option<f64>,
) -> Result<Vec<ChatMessage>> {
    let cap = match max_price {
        Some(price) => format!(
            " Do not recommend more than {}, the product's typical retail cost.",
            format_usd(price)
        ),
        None => String::new(),
    };

    let system = format!(
        "You are a financial-planning assistant.\n\
        Given the user's last three months of income and expenses and their purchase goal, \
        recommend a single dollar amount they can comfortably afford. \
        Respond with exactly one number formatted as a dollar value (e.g. \"$850\"), \
        with no additional text or explanation.{}",
        cap
    );
    let user = format!(
        "My goal: buy an {} by {}.\nHere are my last three months of finances:\n{}",
        product,
        timeframe,
        serde_json::to_string(finances)?
    );

    Ok(vec![ChatMessage::system(system), ChatMessage::user(user)])
}

/// Market-price lookup, then an affordability recommendation capped at that price.
pub async fn suggest_budget(
    client: &dyn ChatClient,
    model: &str,
    product: &str,
    timeframe: &str,
    finances: &[FinanceRecord],
) -> Result<BudgetSuggestion> {
    let max_price = lookup_max_price(client, model, product).await?;
    match max_price {
        Some(price) => tracing::info!("✅ LLM suggests typical price: {}", format_usd(price)),
        None => tracing::warn!("⚠️ proceeding without a hard cap"),
    }

    let messages = build_budget_messages(product, timeframe, finances, max_price)?;
    let reply = client.complete(ChatRequest::new(model, messages)).await?;
    let recommended = parse_dollar_amount(reply.text())?;

    let (amount, clamped) = match max_price {
        Some(cap) if recommended > cap => (cap, true),
        _ => (recommended, false),
    };
    if clamped {
        tracing::debug!("💰 Clamped {} to the retail cap {}", format_usd(recommended), format_usd(amount));
    }

    Ok(BudgetSuggestion {
        amount,
        max_price,
        clamped,
    })
}

/// First graph node: reads financials and stores `suggested_budget`.
pub struct SuggestBudgetAgent {
    client: Arc<dyn ChatClient>,
    model: String,
}

impl SuggestBudgetAgent {
    pub fn new(client: Arc<dyn ChatClient>, model: &str) -> Self {
        Self {
            client,
            model: model.to_string(),
        }
    }
}

#[async_trait]
impl Agent for SuggestBudgetAgent {
    fn name(&self) -> &str {
        AGENT_NAME
    }

    async fn run(&self, mut state: ShopperState) -> Result<ShopperState> {
        let finances = match state.financials_path.as_deref() {
            Some(path) => load_financials(Path::new(path))?,
            None => Vec::new(),
        };

        tracing::info!("🔎 Asking LLM for price of \"{}\"", state.product);
        let suggestion = suggest_budget(
            self.client.as_ref(),
            &self.model,
            &state.product,
            &state.timeframe,
            &finances,
        )
        .await?;

        tracing::info!("💰 Suggested budget: {}", format_usd(suggestion.amount));
        state.suggested_budget = Some(suggestion.amount);
        Ok(state)
    }
}
