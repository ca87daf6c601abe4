use serde::{Deserialize, Deserializer, Serialize};

/// Structured purchase goal pulled out of the user's free-form request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PurchaseIntent {
    /// Desired product or service
    #[serde(default)]
    pub product: String,
    /// When they want to buy
    #[serde(default)]
    pub timeframe: String,
    /// Target or max price
    #[serde(default, deserialize_with = "string_or_number")]
    pub desired_price: Option<String>,
    /// Physical or online region
    #[serde(default)]
    pub location: Option<String>,
    /// Whether they will upload data
    pub provide_financials: bool,
}

impl PurchaseIntent {
    pub fn is_complete(&self) -> bool {
        !self.product.trim().is_empty() && !self.timeframe.trim().is_empty()
    }
}

fn string_or_number<'de, D>(deserializer: D) -> std::result::Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(serde_json::Value::String(s)) => Some(s),
        Some(serde_json::Value::Number(n)) => Some(n.to_string()),
        _ => None,
    })
}

/// One spreadsheet row keyed by column header, in column order.
pub type FinanceRecord = serde_json::Map<String, serde_json::Value>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductListing {
    pub product_name: String,
    pub price: Option<f64>,
    pub url: String,
    pub message: String,
}

/// Outcome of a web search cycle. A listing serializes as an object, a note as a plain string.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SearchResult {
    Listing(ProductListing),
    Note(String),
}

impl SearchResult {
    pub fn listing(&self) -> Option<&ProductListing> {
        match self {
            SearchResult::Listing(listing) => Some(listing),
            SearchResult::Note(_) => None,
        }
    }

    /// A priced listing counts as a match; a bare link scraped from prose does not.
    pub fn is_price_match(&self) -> bool {
        matches!(self, SearchResult::Listing(ProductListing { price: Some(_), .. }))
    }
}

/// State threaded through the agent graph.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ShopperState {
    pub product: String,
    pub timeframe: String,
    pub financials_path: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggested_budget: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub search_result: Option<SearchResult>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notification_sent: Option<bool>,
}

impl ShopperState {
    pub fn new(product: &str, timeframe: &str, financials_path: Option<String>) -> Self {
        Self {
            product: product.to_string(),
            timeframe: timeframe.to_string(),
            financials_path,
            ..Default::default()
        }
    }
}

/// Payload accepted by the notifier, from the graph or from a JSON file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DealNotification {
    pub product: String,
    pub price: f64,
    #[serde(default, deserialize_with = "one_or_many")]
    pub links: Vec<String>,
    #[serde(default)]
    pub user_contact: Option<String>,
    #[serde(default)]
    pub api_key: Option<String>,
}

fn one_or_many<'de, D>(deserializer: D) -> std::result::Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum OneOrMany {
        One(String),
        Many(Vec<String>),
    }

    Ok(match Option::<OneOrMany>::deserialize(deserializer)? {
        Some(OneOrMany::One(link)) => vec![link],
        Some(OneOrMany::Many(links)) => links,
        None => Vec::new(),
    })
}

/// Outgoing email as handed to a `Mailer`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Email {
    pub from: String,
    pub to: String,
    pub subject: String,
    pub html: String,
    pub text: String,
}
