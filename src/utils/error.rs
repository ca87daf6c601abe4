use thiserror::Error;

#[derive(Error, Debug)]
pub enum ShopperError {
    #[error("API request failed: {0}")]
    ApiError(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Spreadsheet archive error: {0}")]
    ZipError(#[from] zip::result::ZipError),

    #[error("CSV processing error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Missing configuration: {field}")]
    MissingConfigError { field: String },

    #[error("Invalid value for {field}: '{value}' ({reason})")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("OPENAI_API_KEY is not set")]
    MissingApiKey,

    #[error("LLM request failed: {message}")]
    LlmError { message: String },

    #[error("LLM did not return a function call")]
    NoToolCall,

    #[error("Unexpected response: {raw}")]
    UnexpectedResponse { raw: String },

    #[error("ERROR reading financials from {path}: {message}")]
    FinancialsError { path: String, message: String },

    #[error("Unsupported financials format: {extension}")]
    UnsupportedFormat { extension: String },

    #[error("Prompt failed: {message}")]
    PromptError { message: String },

    #[error("API key mismatch - notification aborted.")]
    Unauthorized,

    #[error("Notification failed: {message}")]
    NotificationError { message: String },

    #[error("Agent '{agent}' failed: {details}")]
    AgentFailed { agent: String, details: String },

    #[error("Aborted by user")]
    Aborted,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Configuration,
    Network,
    Llm,
    Data,
    User,
    Notification,
    System,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl ShopperError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            ShopperError::ConfigError { .. }
            | ShopperError::MissingConfigError { .. }
            | ShopperError::InvalidConfigValueError { .. }
            | ShopperError::TomlError(_)
            | ShopperError::MissingApiKey => ErrorCategory::Configuration,
            ShopperError::ApiError(_) => ErrorCategory::Network,
            ShopperError::LlmError { .. }
            | ShopperError::NoToolCall
            | ShopperError::UnexpectedResponse { .. } => ErrorCategory::Llm,
            ShopperError::SerializationError(_)
            | ShopperError::ZipError(_)
            | ShopperError::CsvError(_)
            | ShopperError::FinancialsError { .. }
            | ShopperError::UnsupportedFormat { .. } => ErrorCategory::Data,
            ShopperError::PromptError { .. } | ShopperError::Aborted => ErrorCategory::User,
            ShopperError::Unauthorized | ShopperError::NotificationError { .. } => {
                ErrorCategory::Notification
            }
            ShopperError::IoError(_) => ErrorCategory::System,
            ShopperError::AgentFailed { .. } => ErrorCategory::System,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self {
            ShopperError::Aborted => ErrorSeverity::Low,
            ShopperError::ApiError(_)
            | ShopperError::LlmError { .. }
            | ShopperError::NoToolCall
            | ShopperError::UnexpectedResponse { .. } => ErrorSeverity::Medium,
            ShopperError::IoError(_) => ErrorSeverity::Critical,
            _ => ErrorSeverity::High,
        }
    }

    /// Process exit code for a failure of this severity.
    pub fn exit_code(&self) -> i32 {
        match self.severity() {
            ErrorSeverity::Low => 0,
            ErrorSeverity::Medium => 2,
            ErrorSeverity::High => 1,
            ErrorSeverity::Critical => 3,
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self {
            ShopperError::MissingApiKey => {
                "Export OPENAI_API_KEY or add it to a .env file in the working directory"
            }
            ShopperError::ConfigError { .. }
            | ShopperError::MissingConfigError { .. }
            | ShopperError::InvalidConfigValueError { .. }
            | ShopperError::TomlError(_) => "Check smart-shopper.toml and the environment overrides",
            ShopperError::ApiError(_) => "Check your network connection and try again",
            ShopperError::LlmError { .. }
            | ShopperError::NoToolCall
            | ShopperError::UnexpectedResponse { .. } => {
                "The model returned something unusable; rephrase your request and retry"
            }
            ShopperError::FinancialsError { .. }
            | ShopperError::ZipError(_)
            | ShopperError::CsvError(_) => {
                "Make sure the spreadsheet opens correctly and its first row holds column names"
            }
            ShopperError::UnsupportedFormat { .. } => "Save the spreadsheet as .xlsx or .csv",
            ShopperError::Unauthorized => "Pass the same API key that is configured on this machine",
            ShopperError::NotificationError { .. } => {
                "Check RESEND_API_KEY or run with --no-email to print to stdout"
            }
            ShopperError::PromptError { .. } | ShopperError::Aborted => "Run the command again",
            ShopperError::SerializationError(_) => "Check that the input is valid JSON",
            ShopperError::IoError(_) => "Check file permissions and available disk space",
            ShopperError::AgentFailed { .. } => "Re-run with --verbose to see which step failed",
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            ShopperError::ApiError(e) if e.is_timeout() => {
                "The request to the AI service timed out".to_string()
            }
            ShopperError::ApiError(_) => "Could not reach the AI service".to_string(),
            ShopperError::AgentFailed { agent, details } => {
                format!("The {} step failed: {}", agent, details)
            }
            other => other.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, ShopperError>;
