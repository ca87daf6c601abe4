use crate::utils::error::{Result, ShopperError};
use crate::utils::validation::{self, Validate};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::OnceLock;

pub const DEFAULT_CONFIG_FILE: &str = "smart-shopper.toml";
pub const DEFAULT_OPENAI_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_RESEND_BASE_URL: &str = "https://api.resend.com";
pub const DEFAULT_FROM_EMAIL: &str = "Notifier <onboarding@resend.dev>";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ShopperConfig {
    pub openai: OpenAiConfig,
    pub search: SearchConfig,
    pub notify: NotifyConfig,
    pub monitoring: MonitoringConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OpenAiConfig {
    pub base_url: String,
    pub api_key: Option<String>,
    pub intent_model: String,
    pub budget_model: String,
    pub search_model: String,
    pub timeout_seconds: u64,
}

impl Default for OpenAiConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_OPENAI_BASE_URL.to_string(),
            api_key: None,
            intent_model: "gpt-4.1-mini".to_string(),
            budget_model: "gpt-4.1-mini".to_string(),
            search_model: "gpt-4.1".to_string(),
            timeout_seconds: 60,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    pub max_tokens: u32,
    pub temperature: f32,
    /// Listings whose URL contains any of these are skipped.
    pub blocked_domains: Vec<String>,
    pub interval_hours: u64,
    pub duration_days: u32,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            max_tokens: 250,
            temperature: 0.7,
            blocked_domains: Vec::new(),
            interval_hours: 24,
            duration_days: 1,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NotifyConfig {
    pub use_email: bool,
    pub contact: Option<String>,
    pub resend_base_url: String,
    pub resend_api_key: Option<String>,
    pub from_email: String,
}

impl Default for NotifyConfig {
    fn default() -> Self {
        Self {
            use_email: false,
            contact: None,
            resend_base_url: DEFAULT_RESEND_BASE_URL.to_string(),
            resend_api_key: None,
            from_email: DEFAULT_FROM_EMAIL.to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct MonitoringConfig {
    pub enabled: bool,
}

fn placeholder_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\$\{([^}]+)\}").expect("placeholder pattern is valid"))
}

impl ShopperConfig {
    /// Loads `path` if it exists. A missing file is an error only when `required`.
    pub fn load<P: AsRef<Path>>(path: P, required: bool) -> Result<Self> {
        let path = path.as_ref();
        let mut config = if path.exists() {
            tracing::debug!("📁 Loading configuration from {}", path.display());
            Self::from_file(path)?
        } else if required {
            return Err(ShopperError::ConfigError {
                message: format!("config file '{}' not found", path.display()),
            });
        } else {
            tracing::debug!("📁 No {} found, using defaults", path.display());
            Self::default()
        };

        config.apply_overrides(|key| std::env::var(key).ok());
        Ok(config)
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path)?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed = Self::substitute_env_vars(content);
        Ok(toml::from_str(&processed)?)
    }

    /// Replaces `${VAR}` with the environment value; unknown variables are left as written.
    fn substitute_env_vars(content: &str) -> String {
        placeholder_regex()
            .replace_all(content, |caps: &regex::Captures| {
                let var_name = &caps[1];
                std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
            })
            .into_owned()
    }

    /// Environment wins over the file. Secrets still holding a `${...}` placeholder are dropped.
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(key) = non_empty("OPENAI_API_KEY") {
            self.openai.api_key = Some(key);
        }
        if let Some(url) = non_empty("OPENAI_BASE_URL") {
            self.openai.base_url = url;
        }
        if let Some(key) = non_empty("RESEND_API_KEY") {
            self.notify.resend_api_key = Some(key);
        }
        if let Some(from) = non_empty("RESEND_FROM_EMAIL") {
            self.notify.from_email = from;
        }

        for secret in [&mut self.openai.api_key, &mut self.notify.resend_api_key] {
            if secret
                .as_deref()
                .is_some_and(|v| v.trim().is_empty() || placeholder_regex().is_match(v))
            {
                *secret = None;
            }
        }
    }

    pub fn api_key(&self) -> Result<&str> {
        self.openai
            .api_key
            .as_deref()
            .ok_or(ShopperError::MissingApiKey)
    }

    pub fn validate_config(&self) -> Result<()> {
        validation::validate_url("openai.base_url", &self.openai.base_url)?;
        validation::validate_url("notify.resend_base_url", &self.notify.resend_base_url)?;
        validation::validate_non_empty_string("openai.intent_model", &self.openai.intent_model)?;
        validation::validate_non_empty_string("openai.budget_model", &self.openai.budget_model)?;
        validation::validate_non_empty_string("openai.search_model", &self.openai.search_model)?;
        validation::validate_positive_number("openai.timeout_seconds", self.openai.timeout_seconds, 1)?;
        validation::validate_positive_number("search.max_tokens", self.search.max_tokens as u64, 1)?;
        validation::validate_positive_number("search.duration_days", self.search.duration_days as u64, 1)?;
        validation::validate_range("search.temperature", self.search.temperature, 0.0, 2.0)?;

        if self.notify.use_email {
            validation::validate_required_field("notify.resend_api_key", &self.notify.resend_api_key)?;
        }

        Ok(())
    }
}

impl Validate for ShopperConfig {
    fn validate(&self) -> Result<()> {
        self.validate_config()
    }
}
