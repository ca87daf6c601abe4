use crate::config::ShopperConfig;
use crate::domain::chat::{ChatMessage, ChatRequest, ToolCall, ToolChoice, ToolDefinition};
use crate::domain::model::{ProductListing, SearchResult, ShopperState};
use crate::domain::ports::{Agent, ChatClient};
use crate::utils::error::{Result, ShopperError};
use async_trait::async_trait;
use regex::Regex;
use serde::Deserialize;
use serde_json::json;
use std::sync::{Arc, OnceLock};
use std::time::Duration;

pub const AGENT_NAME: &str = "WebSearchAgent";
pub const RECORD_PRODUCT_TOOL: &str = "record_product_found";

#[derive(Debug, Clone)]
pub struct SearchSettings {
    pub model: String,
    pub max_tokens: u32,
    pub temperature: f32,
    pub blocked_domains: Vec<String>,
}

impl SearchSettings {
    pub fn from_config(config: &ShopperConfig) -> Self {
        Self {
            model: config.openai.search_model.clone(),
            max_tokens: config.search.max_tokens,
            temperature: config.search.temperature,
            blocked_domains: config.search.blocked_domains.clone(),
        }
    }
}

impl Default for SearchSettings {
    fn default() -> Self {
        Self::from_config(&ShopperConfig::default())
    }
}

pub fn record_product_tool() -> ToolDefinition {
    ToolDefinition::function(
        RECORD_PRODUCT_TOOL,
        "Records details of a product found during a web search that meets the specified criteria.",
        json!({
            "type": "object",
            "properties": {
                "product_name": {
                    "type": "string",
                    "description": "The exact name of the product found, e.g., 'Sony WH-1000XM5 headphones'."
                },
                "price": {
                    "type": "number",
                    "description": "The numeric price of the product found, e.g., 299.99."
                },
                "url": {
                    "type": "string",
                    "description": "The URL of the product listing."
                }
            },
            "required": ["product_name", "price", "url"]
        }),
    )
}

#[derive(Debug, Deserialize)]
struct RecordedProduct {
    product_name: Option<String>,
    price: Option<f64>,
    url: Option<String>,
}

fn url_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"https?://\S+").expect("url pattern is valid"))
}

pub fn search_prompt(product: &str, cap: f64) -> String {
    format!(
        "Please search the web for a product listing that matches '{}' at or below ${:.2}.",
        product, cap
    )
}

fn search_instructions(product: &str, cap: f64) -> String {
    format!(
        "The user is searching for '{}' at or below ${:.2}. \
        If you find a suitable product listing, use the '{}' tool with the exact product name, its price, and the URL. \
        Only call the tool if the price is at or below the specified cap. Otherwise, respond in natural language.",
        product, cap, RECORD_PRODUCT_TOOL
    )
}

/// Conversation with the search model, kept across cycles of a watch.
pub struct SearchSession {
    client: Arc<dyn ChatClient>,
    settings: SearchSettings,
    history: Vec<ChatMessage>,
}

impl SearchSession {
    pub fn new(client: Arc<dyn ChatClient>, settings: SearchSettings) -> Self {
        Self {
            client,
            settings,
            history: Vec::new(),
        }
    }

    pub fn history(&self) -> &[ChatMessage] {
        &self.history
    }

    pub fn is_blocked(&self, url: &str) -> bool {
        self.settings
            .blocked_domains
            .iter()
            .any(|domain| !domain.is_empty() && url.contains(domain.as_str()))
    }

    /// One search round trip. Failures are reported as a note, never as an error.
    pub async fn search_once(&mut self, product: &str, cap: f64) -> SearchResult {
        let prompt = ChatMessage::user(search_prompt(product, cap));

        let mut messages = self.history.clone();
        messages.push(prompt.clone());
        messages.push(ChatMessage::system(search_instructions(product, cap)));

        let request = ChatRequest::new(&self.settings.model, messages)
            .with_tools(vec![record_product_tool()], ToolChoice::Auto)
            .with_sampling(self.settings.max_tokens, self.settings.temperature);

        let reply = match self.client.complete(request).await {
            Ok(reply) => reply,
            Err(e) => {
                tracing::error!("❌ Web search request failed: {}", e);
                return SearchResult::Note(format!("Error during OpenAI web search: {}", e));
            }
        };

        self.history.push(prompt);
        self.history.push(reply.clone());

        if reply.tool_calls().is_empty() {
            return self.resolve_text(product, reply.text());
        }

        let mut outcomes = Vec::new();
        for call in reply.tool_calls() {
            let (result, tool_output) = self.resolve_tool_call(call, cap);
            tracing::debug!("🛠️ {} -> {}", call.function.name, tool_output);
            self.history.push(ChatMessage::tool(call, tool_output));
            outcomes.push(result);
        }

        let first_listing = outcomes.iter().position(SearchResult::is_price_match);
        outcomes.swap_remove(first_listing.unwrap_or(0))
    }

    fn resolve_tool_call(&self, call: &ToolCall, cap: f64) -> (SearchResult, String) {
        if call.function.name != RECORD_PRODUCT_TOOL {
            let note = format!("AI requested an unknown tool: {}", call.function.name);
            return (SearchResult::Note(note.clone()), note);
        }

        let args: RecordedProduct = match serde_json::from_str(&call.function.arguments) {
            Ok(args) => args,
            Err(e) => {
                let note = format!("Error parsing tool call arguments: {}", e);
                return (SearchResult::Note(note.clone()), note);
            }
        };

        let name = args.product_name.unwrap_or_default();
        let url = args.url.filter(|u| !u.trim().is_empty());

        match (args.price, url) {
            (Some(price), Some(url)) if price <= cap => {
                if self.is_blocked(&url) {
                    let note = format!(
                        "Product '{}' found at ${:.2}, but the URL is blocked ({}). Skipping.",
                        name, price, url
                    );
                    return (SearchResult::Note(note.clone()), note);
                }

                tracing::info!("🎯 Price match: {} for ${:.2} at {}", name, price, url);
                let message = format!("Found {} for ${:.2} at {}", name, price, url);
                let listing = ProductListing {
                    product_name: name,
                    price: Some(price),
                    url,
                    message: message.clone(),
                };
                (SearchResult::Listing(listing), message)
            }
            (price, _) => {
                let shown = price.map(|p| format!("${:.2}", p)).unwrap_or_else(|| "an unknown price".to_string());
                let note = format!(
                    "Product '{}' found at {}, but it's above the cap of ${:.2}.",
                    name, shown, cap
                );
                (SearchResult::Note(note.clone()), note)
            }
        }
    }

    fn resolve_text(&self, product: &str, text: &str) -> SearchResult {
        if text.is_empty() {
            return SearchResult::Note("The model returned an empty reply.".to_string());
        }

        let Some(found) = url_regex().find(text) else {
            return SearchResult::Note(text.to_string());
        };
        let url = found
            .as_str()
            .trim_end_matches(['.', ',', ')', ']', '"', '\''])
            .to_string();

        if self.is_blocked(&url) {
            return SearchResult::Note(format!("Found a link, but it is blocked: {}", url));
        }

        SearchResult::Listing(ProductListing {
            product_name: product.to_string(),
            price: None,
            url,
            message: text.to_string(),
        })
    }

    /// Repeats the search once per `interval` until a priced listing turns up
    /// or `duration_days` cycles have run. Returns the last cycle's result.
    pub async fn watch(
        &mut self,
        product: &str,
        cap: f64,
        duration_days: u32,
        interval: Duration,
    ) -> SearchResult {
        let cycles = duration_days.max(1);
        tracing::info!(
            "🔍 Starting product search for '{}' at or below ${:.2} for {} days",
            product,
            cap,
            cycles
        );

        let mut cycle = 1;
        loop {
            let result = self.search_once(product, cap).await;
            tracing::info!("🔍 Search cycle {}/{} completed: {:?}", cycle, cycles, result);

            if result.is_price_match() || cycle >= cycles {
                tracing::info!("🏁 Search finished after {} cycle(s)", cycle);
                return result;
            }

            tracing::info!(
                "⏳ Waiting {:?} before next search cycle ({} remaining)",
                interval,
                cycles - cycle
            );
            tokio::time::sleep(interval).await;
            cycle += 1;
        }
    }
}

/// Second graph node: one search at the suggested budget.
pub struct WebSearchAgent {
    client: Arc<dyn ChatClient>,
    settings: SearchSettings,
}

impl WebSearchAgent {
    pub fn new(client: Arc<dyn ChatClient>, settings: SearchSettings) -> Self {
        Self { client, settings }
    }
}

#[async_trait]
impl Agent for WebSearchAgent {
    fn name(&self) -> &str {
        AGENT_NAME
    }

    fn should_execute(&self, state: &ShopperState) -> bool {
        state.suggested_budget.is_some()
    }

    async fn run(&self, mut state: ShopperState) -> Result<ShopperState> {
        let cap = state.suggested_budget.ok_or_else(|| ShopperError::MissingConfigError {
            field: "suggested_budget".to_string(),
        })?;

        let mut session = SearchSession::new(self.client.clone(), self.settings.clone());
        state.search_result = Some(session.search_once(&state.product, cap).await);
        Ok(state)
    }
}
