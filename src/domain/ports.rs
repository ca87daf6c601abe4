use crate::domain::chat::{ChatMessage, ChatRequest};
use crate::domain::model::{Email, ShopperState};
use crate::utils::error::Result;
use async_trait::async_trait;

/// Chat-completions backend. Returns the first choice's message.
#[async_trait]
pub trait ChatClient: Send + Sync {
    async fn complete(&self, request: ChatRequest) -> Result<ChatMessage>;
}

/// Interactive questions asked when the LLM left something out.
pub trait Prompter {
    /// Asks a free-text question. An empty answer yields `default` when one is given.
    fn ask(&mut self, question: &str, default: Option<&str>) -> Result<String>;
    fn confirm(&mut self, question: &str) -> Result<bool>;
}

#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, email: &Email) -> Result<()>;
}

pub trait Storage: Send + Sync {
    fn read_file(&self, path: &str) -> impl std::future::Future<Output = Result<Vec<u8>>> + Send;
    fn write_file(
        &self,
        path: &str,
        data: &[u8],
    ) -> impl std::future::Future<Output = Result<()>> + Send;
}

/// One node of the agent graph.
#[async_trait]
pub trait Agent: Send + Sync {
    fn name(&self) -> &str;

    fn should_execute(&self, _state: &ShopperState) -> bool {
        true
    }

    async fn run(&self, state: ShopperState) -> Result<ShopperState>;
}
